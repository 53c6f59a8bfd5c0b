// ==========================================
// 高校选课注册系统 - 注册周期接口
// ==========================================
// 职责: 注册周期生命周期管理、可选课程视图、学期结转
// 红线:
// - 全系统至多一个 UPCOMING/ONGOING 周期
// - 状态只能 UPCOMING→ONGOING→ENDED 单调推进，ENDED 为终态
// - 学期结转整体在一个事务内，重复执行幂等
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::db;
use crate::domain::enrollment::{
    StudentEnrolledCourse, StudentEnrolledCourseMark, StudentSemesterPayment,
};
use crate::domain::registration::SemesterRegistration;
use crate::domain::types::{ExamType, SemesterRegistrationStatus, StudentEnrolledCourseStatus};
use crate::engine::eligibility::{available_courses, AvailableCourse};
use crate::repository::academic_repo::{AcademicSemesterRepository, CourseRepository, StudentRepository};
use crate::repository::offered_course_repo::{OfferedCourseRepository, SectionRepository};
use crate::repository::semester_registration_repo::SemesterRegistrationRepository;
use crate::repository::student_registration_repo::{
    StudentSemesterRegistrationCourseRepository, StudentSemesterRegistrationRepository,
};
use crate::repository::enrolled_course_repo::{
    StudentEnrolledCourseMarkRepository, StudentEnrolledCourseRepository,
};
use crate::repository::payment_repo::StudentSemesterPaymentRepository;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// 创建注册周期入参
#[derive(Debug, Clone)]
pub struct CreateSemesterRegistrationInput {
    pub academic_semester_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_credit: i32,
    pub max_credit: i32,
}

/// 更新注册周期入参（None 表示不变更）
#[derive(Debug, Clone, Default)]
pub struct UpdateSemesterRegistrationInput {
    pub status: Option<SemesterRegistrationStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_credit: Option<i32>,
    pub max_credit: Option<i32>,
}

/// 注册周期接口
pub struct SemesterRegistrationApi {
    conn: Arc<Mutex<Connection>>,
    config: ConfigManager,
}

impl SemesterRegistrationApi {
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

    // ==========================================
    // 周期生命周期
    // ==========================================

    /// 创建注册周期
    ///
    /// 已存在 UPCOMING/ONGOING 周期时拒绝（事务内判定 + 部分唯一索引兜底）
    pub fn create_semester_registration(
        &self,
        input: &CreateSemesterRegistrationInput,
    ) -> ApiResult<SemesterRegistration> {
        if input.end_date < input.start_date {
            return Err(ApiError::Validation("end_date 早于 start_date".to_string()));
        }
        if input.min_credit < 0 || input.max_credit < input.min_credit {
            return Err(ApiError::Validation(
                "学分上下限必须满足 0 <= min <= max".to_string(),
            ));
        }

        let mut conn = self.lock_conn()?;

        let reg = db::with_transaction(&mut conn, |tx| {
            if let Some(active) = SemesterRegistrationRepository::find_active_tx(tx)? {
                return Err(ApiError::Conflict(format!(
                    "已存在活跃注册周期: {} ({})",
                    active.id, active.status
                )));
            }

            AcademicSemesterRepository::find_by_id_tx(tx, &input.academic_semester_id)?
                .ok_or_else(|| ApiError::NotFound {
                    entity: "AcademicSemester".to_string(),
                    id: input.academic_semester_id.clone(),
                })?;

            let reg = SemesterRegistration {
                id: Uuid::new_v4().to_string(),
                academic_semester_id: input.academic_semester_id.clone(),
                status: SemesterRegistrationStatus::Upcoming,
                start_date: input.start_date,
                end_date: input.end_date,
                min_credit: input.min_credit,
                max_credit: input.max_credit,
            };
            SemesterRegistrationRepository::insert_tx(tx, &reg)?;

            Ok(reg)
        })?;

        info!(registration_id = %reg.id, "注册周期已创建");

        Ok(reg)
    }

    /// 更新注册周期（状态只允许 UPCOMING→ONGOING、ONGOING→ENDED）
    pub fn update_semester_registration(
        &self,
        id: &str,
        input: &UpdateSemesterRegistrationInput,
    ) -> ApiResult<SemesterRegistration> {
        let mut conn = self.lock_conn()?;

        let updated = db::with_transaction(&mut conn, |tx| {
            let existing = SemesterRegistrationRepository::find_by_id_tx(tx, id)?.ok_or_else(
                || ApiError::NotFound {
                    entity: "SemesterRegistration".to_string(),
                    id: id.to_string(),
                },
            )?;

            let status = match input.status {
                Some(next) if next != existing.status => {
                    if !existing.status.can_transition_to(next) {
                        return Err(ApiError::InvalidState(format!(
                            "不允许的状态转换: {} → {}",
                            existing.status, next
                        )));
                    }
                    next
                }
                _ => existing.status,
            };

            let updated = SemesterRegistration {
                status,
                start_date: input.start_date.unwrap_or(existing.start_date),
                end_date: input.end_date.unwrap_or(existing.end_date),
                min_credit: input.min_credit.unwrap_or(existing.min_credit),
                max_credit: input.max_credit.unwrap_or(existing.max_credit),
                ..existing
            };

            SemesterRegistrationRepository::update_tx(tx, &updated)?;

            Ok(updated)
        })?;

        info!(registration_id = %id, status = %updated.status, "注册周期已更新");

        Ok(updated)
    }

    /// 删除注册周期（管理端破坏性操作）
    pub fn delete_semester_registration(&self, id: &str) -> ApiResult<()> {
        let repo = SemesterRegistrationRepository::from_connection(self.conn.clone());
        repo.delete(id)?;
        info!(registration_id = %id, "注册周期已删除");
        Ok(())
    }

    /// 按 id 查询注册周期
    pub fn get_semester_registration(&self, id: &str) -> ApiResult<Option<SemesterRegistration>> {
        let repo = SemesterRegistrationRepository::from_connection(self.conn.clone());
        Ok(repo.find_by_id(id)?)
    }

    // ==========================================
    // 可选课程视图
    // ==========================================

    /// 学生在活跃周期内的可选课程集合
    ///
    /// 过滤规则见 engine::eligibility，本方法负责组装三路输入:
    /// 院系范围内的开设课程目录、已完成课程集合、本周期已选记录
    pub fn get_my_semester_reg_courses(
        &self,
        student_code: &str,
    ) -> ApiResult<Vec<AvailableCourse>> {
        let conn = self.lock_conn()?;

        let student = StudentRepository::find_by_code_tx(&conn, student_code)?.ok_or_else(
            || ApiError::NotFound {
                entity: "Student".to_string(),
                id: student_code.to_string(),
            },
        )?;

        let reg = SemesterRegistrationRepository::find_active_tx(&conn)?.ok_or_else(|| {
            ApiError::NotFound {
                entity: "SemesterRegistration".to_string(),
                id: "UPCOMING/ONGOING".to_string(),
            }
        })?;

        // 目录: 本周期对学生院系开设的课程 + 各自教学班
        let offered_rows = OfferedCourseRepository::list_by_registration_and_department_tx(
            &conn,
            &reg.id,
            &student.academic_department_id,
        )?;

        let mut catalog = Vec::with_capacity(offered_rows.len());
        for offered in offered_rows {
            let course = CourseRepository::find_by_id_tx(&conn, &offered.course_id)?.ok_or_else(
                || ApiError::NotFound {
                    entity: "Course".to_string(),
                    id: offered.course_id.clone(),
                },
            )?;
            let sections = SectionRepository::list_by_offered_course_tx(&conn, &offered.id)?;
            catalog.push((offered, course, sections));
        }

        // 已完成课程集合
        let completed: HashSet<String> =
            StudentEnrolledCourseRepository::list_completed_course_ids_tx(&conn, &student.id)?
                .into_iter()
                .collect();

        // 本周期已选记录
        let taken = StudentSemesterRegistrationCourseRepository::list_by_student_and_registration_tx(
            &conn, &student.id, &reg.id,
        )?;

        Ok(available_courses(&catalog, &completed, &taken))
    }

    // ==========================================
    // 学期结转
    // ==========================================

    /// 学期结转: 注册周期 ENDED 后开启对应学期
    ///
    /// 单事务完成: 翻转 is_current、为每个已确认注册的学生
    /// 幂等生成缴费单、修读记录与两条空白成绩行。
    /// 重复执行对已生成的行是 no-op。
    pub fn start_new_semester(&self, registration_id: &str) -> ApiResult<()> {
        let payment_per_credit = self
            .config
            .get_payment_per_credit()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let mut conn = self.lock_conn()?;

        let (students, enrollments) = db::with_transaction(&mut conn, |tx| {
            let reg = SemesterRegistrationRepository::find_by_id_tx(tx, registration_id)?
                .ok_or_else(|| ApiError::NotFound {
                    entity: "SemesterRegistration".to_string(),
                    id: registration_id.to_string(),
                })?;

            if reg.status != SemesterRegistrationStatus::Ended {
                return Err(ApiError::InvalidState(format!(
                    "注册周期尚未结束，当前状态: {}",
                    reg.status
                )));
            }

            let semester =
                AcademicSemesterRepository::find_by_id_tx(tx, &reg.academic_semester_id)?
                    .ok_or_else(|| ApiError::NotFound {
                        entity: "AcademicSemester".to_string(),
                        id: reg.academic_semester_id.clone(),
                    })?;

            if semester.is_current {
                return Err(ApiError::InvalidState(format!(
                    "学期 {} 已是当前学期",
                    semester.id
                )));
            }

            AcademicSemesterRepository::clear_current_tx(tx)?;
            AcademicSemesterRepository::set_current_tx(tx, &semester.id)?;

            let confirmed =
                StudentSemesterRegistrationRepository::list_confirmed_by_registration_tx(
                    tx, &reg.id,
                )?;

            let mut enrollments_created = 0usize;
            for student_reg in &confirmed {
                // 缴费单（幂等；零学分不产生缴费单）
                if student_reg.total_credits_taken > 0
                    && !StudentSemesterPaymentRepository::exists_tx(
                        tx,
                        &student_reg.student_id,
                        &semester.id,
                    )?
                {
                    let full = f64::from(student_reg.total_credits_taken) * payment_per_credit;
                    StudentSemesterPaymentRepository::insert_tx(
                        tx,
                        &StudentSemesterPayment {
                            id: Uuid::new_v4().to_string(),
                            student_id: student_reg.student_id.clone(),
                            academic_semester_id: semester.id.clone(),
                            full_payment_amount: full,
                            partial_payment_amount: full / 2.0,
                            total_due_amount: full,
                        },
                    )?;
                }

                // 修读记录 + 空白成绩行（幂等）
                let courses =
                    StudentSemesterRegistrationCourseRepository::list_by_student_and_registration_tx(
                        tx,
                        &student_reg.student_id,
                        &reg.id,
                    )?;

                for record in &courses {
                    let offered =
                        OfferedCourseRepository::find_by_id_tx(tx, &record.offered_course_id)?
                            .ok_or_else(|| ApiError::NotFound {
                                entity: "OfferedCourse".to_string(),
                                id: record.offered_course_id.clone(),
                            })?;

                    let enrolled_id = match StudentEnrolledCourseRepository::find_by_student_course_semester_tx(
                        tx,
                        &student_reg.student_id,
                        &offered.course_id,
                        &semester.id,
                    )? {
                        Some(existing) => existing.id,
                        None => {
                            let enrolled = StudentEnrolledCourse {
                                id: Uuid::new_v4().to_string(),
                                student_id: student_reg.student_id.clone(),
                                course_id: offered.course_id.clone(),
                                academic_semester_id: semester.id.clone(),
                                status: StudentEnrolledCourseStatus::Ongoing,
                                grade: None,
                                point: None,
                                total_marks: None,
                            };
                            StudentEnrolledCourseRepository::insert_tx(tx, &enrolled)?;
                            enrollments_created += 1;
                            enrolled.id
                        }
                    };

                    for exam_type in [ExamType::Midterm, ExamType::Final] {
                        if !StudentEnrolledCourseMarkRepository::exists_tx(
                            tx,
                            &enrolled_id,
                            exam_type,
                        )? {
                            StudentEnrolledCourseMarkRepository::insert_tx(
                                tx,
                                &StudentEnrolledCourseMark {
                                    id: Uuid::new_v4().to_string(),
                                    student_id: student_reg.student_id.clone(),
                                    student_enrolled_course_id: enrolled_id.clone(),
                                    academic_semester_id: semester.id.clone(),
                                    exam_type,
                                    marks: None,
                                    grade: None,
                                },
                            )?;
                        }
                    }
                }
            }

            Ok((confirmed.len(), enrollments_created))
        })?;

        info!(
            registration_id = %registration_id,
            confirmed_students = students,
            enrollments_created = enrollments,
            "学期结转完成"
        );

        Ok(())
    }
}
