// ==========================================
// 高校选课注册系统 - 成绩接口
// ==========================================
// 职责: 单场成绩录入、总评定档、学生成绩查询
// 红线: 定档三写（修读记录置 COMPLETED、学业汇总重算 upsert）
//       同一事务；CGPA 按学分加权整体重算，不做增量维护
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::db;
use crate::domain::enrollment::{StudentEnrolledCourse, StudentEnrolledCourseMark};
use crate::domain::enrollment::StudentAcademicInfo;
use crate::domain::types::ExamType;
use crate::engine::grading::{
    cumulative_gpa, grade_from_marks, total_completed_credits, weighted_total,
};
use crate::config::ConfigManager;
use crate::repository::academic_repo::StudentRepository;
use crate::repository::enrolled_course_repo::{
    StudentEnrolledCourseMarkRepository, StudentEnrolledCourseRepository,
};
use crate::repository::payment_repo::StudentAcademicInfoRepository;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;

/// 成绩接口
pub struct MarksApi {
    conn: Arc<Mutex<Connection>>,
    config: ConfigManager,
}

impl MarksApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(Self { conn, config })
    }

    fn lock_conn(&self) -> ApiResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::Internal(format!("锁获取失败: {e}")))
    }

    fn resolve_enrolled_tx(
        tx: &Connection,
        student_id: &str,
        course_id: &str,
        academic_semester_id: &str,
    ) -> ApiResult<StudentEnrolledCourse> {
        StudentEnrolledCourseRepository::find_by_student_course_semester_tx(
            tx,
            student_id,
            course_id,
            academic_semester_id,
        )?
        .ok_or_else(|| {
            ApiError::InvalidState(format!(
                "学生 {student_id} 在学期 {academic_semester_id} 无课程 {course_id} 的修读记录"
            ))
        })
    }

    /// 录入单场考试成绩（0-100），同时按档位表回填档位
    pub fn update_student_marks(
        &self,
        student_id: &str,
        course_id: &str,
        academic_semester_id: &str,
        exam_type: ExamType,
        marks: i32,
    ) -> ApiResult<StudentEnrolledCourseMark> {
        if !(0..=100).contains(&marks) {
            return Err(ApiError::Validation(format!(
                "分数必须在 [0, 100] 内: {marks}"
            )));
        }

        let mut conn = self.lock_conn()?;

        let updated = db::with_transaction(&mut conn, |tx| {
            let enrolled =
                Self::resolve_enrolled_tx(tx, student_id, course_id, academic_semester_id)?;

            let mark = StudentEnrolledCourseMarkRepository::find_by_enrolled_course_and_exam_tx(
                tx,
                &enrolled.id,
                exam_type,
            )?
            .ok_or_else(|| {
                ApiError::InvalidState(format!(
                    "修读记录 {} 缺少 {} 成绩行",
                    enrolled.id, exam_type
                ))
            })?;

            let grade = grade_from_marks(f64::from(marks));
            StudentEnrolledCourseMarkRepository::update_marks_tx(tx, &mark.id, marks, grade.grade)?;

            Ok::<_, ApiError>(StudentEnrolledCourseMark {
                marks: Some(marks),
                grade: Some(grade.grade.to_string()),
                ..mark
            })
        })?;

        info!(
            student_id = %student_id,
            course_id = %course_id,
            exam_type = %exam_type,
            marks = marks,
            "单场成绩已录入"
        );

        Ok(updated)
    }

    /// 总评定档: 期中/期末加权出总分与档位，
    /// 修读记录置 COMPLETED 并整体重算学业汇总
    pub fn update_final_marks(
        &self,
        student_id: &str,
        course_id: &str,
        academic_semester_id: &str,
    ) -> ApiResult<StudentEnrolledCourse> {
        let midterm_weight = self
            .config
            .get_midterm_weight()
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let final_weight = self
            .config
            .get_final_weight()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let mut conn = self.lock_conn()?;

        let completed = db::with_transaction(&mut conn, |tx| {
            let enrolled =
                Self::resolve_enrolled_tx(tx, student_id, course_id, academic_semester_id)?;

            // 缺失的单场成绩按 0 计
            let midterm = StudentEnrolledCourseMarkRepository::find_by_enrolled_course_and_exam_tx(
                tx,
                &enrolled.id,
                ExamType::Midterm,
            )?
            .and_then(|m| m.marks)
            .unwrap_or(0);
            let final_marks = StudentEnrolledCourseMarkRepository::find_by_enrolled_course_and_exam_tx(
                tx,
                &enrolled.id,
                ExamType::Final,
            )?
            .and_then(|m| m.marks)
            .unwrap_or(0);

            let total = weighted_total(midterm, final_marks, midterm_weight, final_weight);
            let grade = grade_from_marks(total);

            StudentEnrolledCourseRepository::complete_tx(
                tx,
                &enrolled.id,
                grade.grade,
                grade.point,
                total,
            )?;

            // 学业汇总整体重算（含刚定档的这一门）
            let all_completed =
                StudentEnrolledCourseRepository::list_completed_by_student_tx(tx, student_id)?;
            StudentAcademicInfoRepository::upsert_tx(
                tx,
                &StudentAcademicInfo {
                    student_id: student_id.to_string(),
                    total_completed_credit: total_completed_credits(&all_completed),
                    cgpa: cumulative_gpa(&all_completed),
                },
            )?;

            Ok::<_, ApiError>(StudentEnrolledCourse {
                status: crate::domain::types::StudentEnrolledCourseStatus::Completed,
                grade: Some(grade.grade.to_string()),
                point: Some(grade.point),
                total_marks: Some(total),
                ..enrolled
            })
        })?;

        info!(
            student_id = %student_id,
            course_id = %course_id,
            grade = %completed.grade.as_deref().unwrap_or("-"),
            "总评已定档"
        );

        Ok(completed)
    }

    /// 学生查询自己某门课程的全部成绩行
    pub fn my_marks(
        &self,
        student_code: &str,
        course_id: &str,
        academic_semester_id: &str,
    ) -> ApiResult<Vec<StudentEnrolledCourseMark>> {
        let conn = self.lock_conn()?;

        let student = StudentRepository::find_by_code_tx(&conn, student_code)?.ok_or_else(
            || ApiError::NotFound {
                entity: "Student".to_string(),
                id: student_code.to_string(),
            },
        )?;

        let enrolled =
            Self::resolve_enrolled_tx(&conn, &student.id, course_id, academic_semester_id)?;

        let marks =
            StudentEnrolledCourseMarkRepository::list_by_enrolled_course_tx(&conn, &enrolled.id)?;

        Ok(marks)
    }
}
