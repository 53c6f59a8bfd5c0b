// ==========================================
// 高校选课注册系统 - 学生选课接口
// ==========================================
// 职责: 学生注册启动、选课/退课、确认注册
// 红线:
// - 选课三写（选课记录、容量计数、学分累计）同一事务
// - 容量只经条件自增修改，满班绝不超额
// - 重复选课由复合主键拒绝
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::db;
use crate::domain::academic::Student;
use crate::domain::registration::{
    SemesterRegistration, StudentSemesterRegistration, StudentSemesterRegistrationCourse,
};
use crate::domain::types::SemesterRegistrationStatus;
use crate::repository::academic_repo::{CourseRepository, StudentRepository};
use crate::repository::offered_course_repo::{OfferedCourseRepository, SectionRepository};
use crate::repository::semester_registration_repo::SemesterRegistrationRepository;
use crate::repository::student_registration_repo::{
    StudentSemesterRegistrationCourseRepository, StudentSemesterRegistrationRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// 学生注册视图（活跃周期 + 学生自己的注册行）
#[derive(Debug, Clone)]
pub struct MyRegistration {
    pub semester_registration: SemesterRegistration,
    pub student_registration: Option<StudentSemesterRegistration>,
}

/// 学生选课接口
pub struct EnrollmentApi {
    conn: Arc<Mutex<Connection>>,
}

impl EnrollmentApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock_conn(&self) -> ApiResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::Internal(format!("锁获取失败: {e}")))
    }

    fn resolve_student(conn: &Connection, student_code: &str) -> ApiResult<Student> {
        StudentRepository::find_by_code_tx(conn, student_code)?.ok_or_else(|| {
            ApiError::NotFound {
                entity: "Student".to_string(),
                id: student_code.to_string(),
            }
        })
    }

    /// 解析处于 ONGOING 状态的注册周期
    fn resolve_ongoing_registration(conn: &Connection) -> ApiResult<SemesterRegistration> {
        let reg = SemesterRegistrationRepository::find_active_tx(conn)?.ok_or_else(|| {
            ApiError::NotFound {
                entity: "SemesterRegistration".to_string(),
                id: "ONGOING".to_string(),
            }
        })?;

        if reg.status != SemesterRegistrationStatus::Ongoing {
            return Err(ApiError::InvalidState(format!(
                "注册周期尚未开放选课，当前状态: {}",
                reg.status
            )));
        }

        Ok(reg)
    }

    // ==========================================
    // 注册启动与查询
    // ==========================================

    /// 学生进入注册流程（首次调用时懒创建注册行）
    pub fn start_my_registration(&self, student_code: &str) -> ApiResult<MyRegistration> {
        let mut conn = self.lock_conn()?;

        let result = db::with_transaction(&mut conn, |tx| {
            let student = Self::resolve_student(tx, student_code)?;
            let reg = SemesterRegistrationRepository::find_active_tx(tx)?.ok_or_else(|| {
                ApiError::NotFound {
                    entity: "SemesterRegistration".to_string(),
                    id: "UPCOMING/ONGOING".to_string(),
                }
            })?;

            if reg.status == SemesterRegistrationStatus::Upcoming {
                return Err(ApiError::InvalidState(format!(
                    "注册尚未开始，开放日期: {}",
                    reg.start_date
                )));
            }

            let existing = StudentSemesterRegistrationRepository::find_by_student_and_registration_tx(
                tx, &student.id, &reg.id,
            )?;

            let student_reg = match existing {
                Some(row) => row,
                None => {
                    let row = StudentSemesterRegistration {
                        id: Uuid::new_v4().to_string(),
                        student_id: student.id.clone(),
                        semester_registration_id: reg.id.clone(),
                        total_credits_taken: 0,
                        is_confirmed: false,
                    };
                    StudentSemesterRegistrationRepository::insert_tx(tx, &row)?;
                    row
                }
            };

            Ok(MyRegistration {
                semester_registration: reg,
                student_registration: Some(student_reg),
            })
        })?;

        info!(student_code = %student_code, "学生注册流程已启动");

        Ok(result)
    }

    /// 学生注册视图（只读）
    pub fn get_my_registration(&self, student_code: &str) -> ApiResult<MyRegistration> {
        let conn = self.lock_conn()?;

        let student = Self::resolve_student(&conn, student_code)?;
        let reg = SemesterRegistrationRepository::find_active_tx(&conn)?.ok_or_else(|| {
            ApiError::NotFound {
                entity: "SemesterRegistration".to_string(),
                id: "UPCOMING/ONGOING".to_string(),
            }
        })?;

        let student_reg = StudentSemesterRegistrationRepository::find_by_student_and_registration_tx(
            &conn, &student.id, &reg.id,
        )?;

        Ok(MyRegistration {
            semester_registration: reg,
            student_registration: student_reg,
        })
    }

    // ==========================================
    // 选课 / 退课
    // ==========================================

    /// 选课
    ///
    /// 单事务内: 写选课记录（复合主键防重）、条件自增容量计数
    /// （满班时事务整体回滚）、累计学分
    pub fn enroll_into_course(
        &self,
        student_code: &str,
        offered_course_id: &str,
        offered_course_section_id: &str,
    ) -> ApiResult<()> {
        let mut conn = self.lock_conn()?;

        db::with_transaction(&mut conn, |tx| {
            let reg = Self::resolve_ongoing_registration(tx)?;
            let student = Self::resolve_student(tx, student_code)?;

            let offered = OfferedCourseRepository::find_by_id_tx(tx, offered_course_id)?
                .ok_or_else(|| ApiError::NotFound {
                    entity: "OfferedCourse".to_string(),
                    id: offered_course_id.to_string(),
                })?;

            let section = SectionRepository::find_by_id_tx(tx, offered_course_section_id)?
                .ok_or_else(|| ApiError::NotFound {
                    entity: "OfferedCourseSection".to_string(),
                    id: offered_course_section_id.to_string(),
                })?;

            if section.offered_course_id != offered.id {
                return Err(ApiError::Validation(format!(
                    "教学班 {} 不属于开设课程 {}",
                    section.id, offered.id
                )));
            }

            if section.currently_enrolled >= section.max_capacity {
                return Err(ApiError::CapacityExceeded(section.id.clone()));
            }

            let course = CourseRepository::find_by_id_tx(tx, &offered.course_id)?.ok_or_else(
                || ApiError::NotFound {
                    entity: "Course".to_string(),
                    id: offered.course_id.clone(),
                },
            )?;

            let student_reg = StudentSemesterRegistrationRepository::find_by_student_and_registration_tx(
                tx, &student.id, &reg.id,
            )?
            .ok_or_else(|| {
                ApiError::InvalidState("学生尚未启动本周期注册".to_string())
            })?;

            // 复合主键冲突（同周期重复选同一门课）→ Conflict
            StudentSemesterRegistrationCourseRepository::insert_tx(
                tx,
                &StudentSemesterRegistrationCourse {
                    semester_registration_id: reg.id.clone(),
                    student_id: student.id.clone(),
                    offered_course_id: offered.id.clone(),
                    offered_course_section_id: section.id.clone(),
                },
            )?;

            // 条件自增: 预检查之后、提交之前被抢满时在此兜住
            if !SectionRepository::try_increment_enrolled_tx(tx, &section.id)? {
                return Err(ApiError::CapacityExceeded(section.id.clone()));
            }

            StudentSemesterRegistrationRepository::adjust_credits_tx(
                tx,
                &student_reg.id,
                course.credits,
            )?;

            Ok(())
        })?;

        info!(
            student_code = %student_code,
            offered_course_id = %offered_course_id,
            section_id = %offered_course_section_id,
            "选课成功"
        );

        Ok(())
    }

    /// 退课（选课的逆操作，同一事务）
    pub fn withdraw_from_course(
        &self,
        student_code: &str,
        offered_course_id: &str,
    ) -> ApiResult<()> {
        let mut conn = self.lock_conn()?;

        db::with_transaction(&mut conn, |tx| {
            let reg = Self::resolve_ongoing_registration(tx)?;
            let student = Self::resolve_student(tx, student_code)?;

            let record = StudentSemesterRegistrationCourseRepository::find_tx(
                tx,
                &reg.id,
                &student.id,
                offered_course_id,
            )?
            .ok_or_else(|| ApiError::NotFound {
                entity: "StudentSemesterRegistrationCourse".to_string(),
                id: offered_course_id.to_string(),
            })?;

            let offered = OfferedCourseRepository::find_by_id_tx(tx, offered_course_id)?
                .ok_or_else(|| ApiError::NotFound {
                    entity: "OfferedCourse".to_string(),
                    id: offered_course_id.to_string(),
                })?;
            let course = CourseRepository::find_by_id_tx(tx, &offered.course_id)?.ok_or_else(
                || ApiError::NotFound {
                    entity: "Course".to_string(),
                    id: offered.course_id.clone(),
                },
            )?;

            let student_reg = StudentSemesterRegistrationRepository::find_by_student_and_registration_tx(
                tx, &student.id, &reg.id,
            )?
            .ok_or_else(|| {
                ApiError::InvalidState("学生尚未启动本周期注册".to_string())
            })?;

            StudentSemesterRegistrationCourseRepository::delete_tx(
                tx,
                &reg.id,
                &student.id,
                offered_course_id,
            )?;

            // 计数永不为负，0 时自减是 no-op
            SectionRepository::try_decrement_enrolled_tx(tx, &record.offered_course_section_id)?;

            StudentSemesterRegistrationRepository::adjust_credits_tx(
                tx,
                &student_reg.id,
                -course.credits,
            )?;

            Ok::<_, ApiError>(())
        })?;

        info!(
            student_code = %student_code,
            offered_course_id = %offered_course_id,
            "退课成功"
        );

        Ok(())
    }

    // ==========================================
    // 确认注册
    // ==========================================

    /// 确认本周期注册（学分总数必须落在周期允许区间内）
    pub fn confirm_my_registration(&self, student_code: &str) -> ApiResult<()> {
        let mut conn = self.lock_conn()?;

        db::with_transaction(&mut conn, |tx| {
            let reg = Self::resolve_ongoing_registration(tx)?;
            let student = Self::resolve_student(tx, student_code)?;

            let student_reg = StudentSemesterRegistrationRepository::find_by_student_and_registration_tx(
                tx, &student.id, &reg.id,
            )?
            .ok_or_else(|| ApiError::NotFound {
                entity: "StudentSemesterRegistration".to_string(),
                id: student.id.clone(),
            })?;

            if student_reg.total_credits_taken == 0 {
                return Err(ApiError::InvalidState(
                    "尚未选择任何课程，无法确认注册".to_string(),
                ));
            }

            if student_reg.total_credits_taken < reg.min_credit
                || student_reg.total_credits_taken > reg.max_credit
            {
                return Err(ApiError::InvalidState(format!(
                    "总学分 {} 超出允许区间 [{}, {}]",
                    student_reg.total_credits_taken, reg.min_credit, reg.max_credit
                )));
            }

            StudentSemesterRegistrationRepository::set_confirmed_tx(tx, &student_reg.id)?;

            Ok(())
        })?;

        info!(student_code = %student_code, "注册已确认");

        Ok(())
    }
}
