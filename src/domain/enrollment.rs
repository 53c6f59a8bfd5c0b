// ==========================================
// 高校选课注册系统 - 结转产出实体
// ==========================================
// 由学期结转批处理一次性生成，成绩录入流程更新
// ==========================================

use crate::domain::types::{ExamType, StudentEnrolledCourseStatus};
use serde::{Deserialize, Serialize};

/// 修读记录（每学生每课程每学期一条）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentEnrolledCourse {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub academic_semester_id: String,
    pub status: StudentEnrolledCourseStatus,
    pub grade: Option<String>,
    pub point: Option<f64>,
    pub total_marks: Option<f64>,
}

/// 单场考试成绩（每条修读记录恰好两条: MIDTERM/FINAL）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentEnrolledCourseMark {
    pub id: String,
    pub student_id: String,
    pub student_enrolled_course_id: String,
    pub academic_semester_id: String,
    pub exam_type: ExamType,
    pub marks: Option<i32>,
    pub grade: Option<String>,
}

/// 学期缴费单（每学生每学期一条，结转幂等生成）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSemesterPayment {
    pub id: String,
    pub student_id: String,
    pub academic_semester_id: String,
    pub full_payment_amount: f64,
    /// 全额的 50%
    pub partial_payment_amount: f64,
    /// 初始等于全额
    pub total_due_amount: f64,
}

/// 学生学业汇总（成绩定档后整体重算 upsert）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAcademicInfo {
    pub student_id: String,
    pub total_completed_credit: i32,
    pub cgpa: f64,
}
