// ==========================================
// 高校选课注册系统 - 参照实体
// ==========================================
// 说明: 学期/学生/课程/教师/教室的 CRUD 由外部子系统负责，
//       本核心只读取并在结转时翻转 academic_semester.is_current
// ==========================================

use serde::{Deserialize, Serialize};

/// 学年学期
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicSemester {
    pub id: String,
    pub title: String,
    pub year: i32,
    /// 是否为当前学期（由学期结转翻转，全系统至多一个为 true）
    pub is_current: bool,
}

/// 学生
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    /// 学号（认证协作方传入的身份标识）
    pub student_code: String,
    pub academic_department_id: String,
}

/// 课程
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub code: String,
    pub credits: i32,
    /// 先修课程 id 列表
    pub prerequisite_ids: Vec<String>,
}

/// 教师
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faculty {
    pub id: String,
    pub faculty_code: String,
}

/// 教室
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub room_code: String,
}
