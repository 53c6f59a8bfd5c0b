// ==========================================
// 高校选课注册系统 - 开设课程管理接口
// ==========================================
// 职责: 批量为注册周期开课
// 说明: (课程, 院系, 周期) 三元组幂等，已存在的静默跳过，
//       返回本次实际创建的集合
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::db;
use crate::domain::offering::OfferedCourse;
use crate::repository::academic_repo::CourseRepository;
use crate::repository::offered_course_repo::OfferedCourseRepository;
use crate::repository::semester_registration_repo::SemesterRegistrationRepository;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// 开设课程管理接口
pub struct OfferedCourseApi {
    conn: Arc<Mutex<Connection>>,
}

impl OfferedCourseApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock_conn(&self) -> ApiResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::Internal(format!("锁获取失败: {e}")))
    }

    /// 批量开课（单事务，幂等）
    pub fn create_offered_courses(
        &self,
        course_ids: &[String],
        academic_department_id: &str,
        semester_registration_id: &str,
    ) -> ApiResult<Vec<OfferedCourse>> {
        if course_ids.is_empty() {
            return Err(ApiError::Validation("课程列表不能为空".to_string()));
        }

        let mut conn = self.lock_conn()?;

        let created = db::with_transaction(&mut conn, |tx| {
            SemesterRegistrationRepository::find_by_id_tx(tx, semester_registration_id)?
                .ok_or_else(|| ApiError::NotFound {
                    entity: "SemesterRegistration".to_string(),
                    id: semester_registration_id.to_string(),
                })?;

            let mut created = Vec::new();
            for course_id in course_ids {
                CourseRepository::find_by_id_tx(tx, course_id)?.ok_or_else(|| {
                    ApiError::NotFound {
                        entity: "Course".to_string(),
                        id: course_id.clone(),
                    }
                })?;

                if OfferedCourseRepository::exists_triple_tx(
                    tx,
                    course_id,
                    academic_department_id,
                    semester_registration_id,
                )? {
                    continue;
                }

                let offered = OfferedCourse {
                    id: Uuid::new_v4().to_string(),
                    course_id: course_id.clone(),
                    academic_department_id: academic_department_id.to_string(),
                    semester_registration_id: semester_registration_id.to_string(),
                };
                OfferedCourseRepository::insert_tx(tx, &offered)?;
                created.push(offered);
            }

            Ok::<_, ApiError>(created)
        })?;

        info!(
            requested = course_ids.len(),
            created = created.len(),
            registration_id = %semester_registration_id,
            "批量开课完成"
        );

        Ok(created)
    }

    /// 按周期与院系列出开设课程
    pub fn list_offered_courses(
        &self,
        semester_registration_id: &str,
        academic_department_id: &str,
    ) -> ApiResult<Vec<OfferedCourse>> {
        let conn = self.lock_conn()?;
        let offered = OfferedCourseRepository::list_by_registration_and_department_tx(
            &conn,
            semester_registration_id,
            academic_department_id,
        )?;
        Ok(offered)
    }
}
