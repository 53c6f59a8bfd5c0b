// ==========================================
// 高校选课注册系统 - 注册周期实体
// ==========================================
// 不变量:
// - 全系统至多一个 UPCOMING/ONGOING 注册周期
// - 每个学生在一个周期内至多一条 StudentSemesterRegistration
// - (周期, 学生, 开设课程) 复合键是选课的唯一事实记录
// ==========================================

use crate::domain::types::SemesterRegistrationStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 学期注册周期
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemesterRegistration {
    pub id: String,
    pub academic_semester_id: String,
    pub status: SemesterRegistrationStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 确认注册时允许的最低总学分
    pub min_credit: i32,
    /// 确认注册时允许的最高总学分
    pub max_credit: i32,
}

/// 学生在一个注册周期内的注册记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSemesterRegistration {
    pub id: String,
    pub student_id: String,
    pub semester_registration_id: String,
    /// 已选课程学分累计（由选课/退课维护）
    pub total_credits_taken: i32,
    /// 确认注册后置位，一次性
    pub is_confirmed: bool,
}

/// 学生对一门开设课程的选课记录
///
/// 复合键 (semester_registration_id, student_id, offered_course_id)，
/// 该行的存在即"本周期已选该课"的唯一事实
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSemesterRegistrationCourse {
    pub semester_registration_id: String,
    pub student_id: String,
    pub offered_course_id: String,
    pub offered_course_section_id: String,
}
