// ==========================================
// 高校选课注册系统 - 教学班排课接口
// ==========================================
// 职责: 教学班创建与课表调整
// 红线: 任一时段的教室/教师冲突即整体失败，
//       教学班与课表条目在同一事务内落库
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::db;
use crate::domain::offering::{
    ClassScheduleSlot, OfferedCourseClassSchedule, OfferedCourseSection,
};
use crate::domain::types::WeekDay;
use crate::engine::availability::AvailabilityChecker;
use crate::repository::class_schedule_repo::ClassScheduleRepository;
use crate::repository::offered_course_repo::{OfferedCourseRepository, SectionRepository};
use chrono::NaiveTime;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// 课表条目入参（周循环时段 + 教室 + 教师）
#[derive(Debug, Clone)]
pub struct ClassScheduleInput {
    pub day_of_week: WeekDay,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: String,
    pub faculty_id: String,
}

impl ClassScheduleInput {
    fn slot(&self) -> ClassScheduleSlot {
        ClassScheduleSlot {
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// 教学班排课接口
pub struct SectionApi {
    conn: Arc<Mutex<Connection>>,
}

impl SectionApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock_conn(&self) -> ApiResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::Internal(format!("锁获取失败: {e}")))
    }

    /// 校验时段本身合法（end 必须晚于 start）
    fn validate_slots(schedules: &[ClassScheduleInput]) -> ApiResult<()> {
        if schedules.is_empty() {
            return Err(ApiError::Validation("课表条目不能为空".to_string()));
        }
        for s in schedules {
            if s.end_time <= s.start_time {
                return Err(ApiError::Validation(format!(
                    "时段结束必须晚于开始: {} {} - {}",
                    s.day_of_week, s.start_time, s.end_time
                )));
            }
        }
        Ok(())
    }

    /// 在事务作用域内逐一判定教室与教师可用性
    fn ensure_slot_available(
        tx: &Connection,
        input: &ClassScheduleInput,
        exclude_schedule_id: Option<&str>,
    ) -> ApiResult<()> {
        let slot = input.slot();

        let room = AvailabilityChecker::check_room_available(
            tx,
            &input.room_id,
            &slot,
            exclude_schedule_id,
        )?;
        if !room.is_available() {
            return Err(ApiError::Conflict(format!(
                "教室 {} 在 {} {} - {} 已被占用",
                input.room_id, input.day_of_week, input.start_time, input.end_time
            )));
        }

        let faculty = AvailabilityChecker::check_faculty_available(
            tx,
            &input.faculty_id,
            &slot,
            exclude_schedule_id,
        )?;
        if !faculty.is_available() {
            return Err(ApiError::Conflict(format!(
                "教师 {} 在 {} {} - {} 已有课程",
                input.faculty_id, input.day_of_week, input.start_time, input.end_time
            )));
        }

        Ok(())
    }

    /// 创建教学班（含全部课表条目，单事务）
    ///
    /// 任一时段冲突或标题重复时整体失败，不留下半成品
    pub fn create_section(
        &self,
        offered_course_id: &str,
        title: &str,
        max_capacity: i32,
        schedules: &[ClassScheduleInput],
    ) -> ApiResult<OfferedCourseSection> {
        Self::validate_slots(schedules)?;
        if max_capacity <= 0 {
            return Err(ApiError::Validation("max_capacity 必须为正".to_string()));
        }

        let mut conn = self.lock_conn()?;

        let section = db::with_transaction(&mut conn, |tx| {
            let offered = OfferedCourseRepository::find_by_id_tx(tx, offered_course_id)?
                .ok_or_else(|| ApiError::NotFound {
                    entity: "OfferedCourse".to_string(),
                    id: offered_course_id.to_string(),
                })?;

            for input in schedules {
                Self::ensure_slot_available(tx, input, None)?;
            }

            let section = OfferedCourseSection {
                id: Uuid::new_v4().to_string(),
                title: title.to_string(),
                max_capacity,
                currently_enrolled: 0,
                offered_course_id: offered.id.clone(),
                semester_registration_id: offered.semester_registration_id.clone(),
            };
            // (title, offered_course) 重复由唯一约束拒绝 → Conflict
            SectionRepository::insert_tx(tx, &section)?;

            for input in schedules {
                let schedule = OfferedCourseClassSchedule {
                    id: Uuid::new_v4().to_string(),
                    day_of_week: input.day_of_week,
                    start_time: input.start_time,
                    end_time: input.end_time,
                    room_id: input.room_id.clone(),
                    faculty_id: input.faculty_id.clone(),
                    offered_course_section_id: section.id.clone(),
                    semester_registration_id: offered.semester_registration_id.clone(),
                };
                ClassScheduleRepository::insert_tx(tx, &schedule)?;
            }

            Ok::<_, ApiError>(section)
        })?;

        info!(
            section_id = %section.id,
            offered_course_id = %offered_course_id,
            slots = schedules.len(),
            "教学班已创建"
        );

        Ok(section)
    }

    /// 调整单条课表条目（排除自身后重新判定可用性）
    pub fn update_class_schedule(
        &self,
        schedule_id: &str,
        input: &ClassScheduleInput,
    ) -> ApiResult<OfferedCourseClassSchedule> {
        Self::validate_slots(std::slice::from_ref(input))?;

        let mut conn = self.lock_conn()?;

        let updated = db::with_transaction(&mut conn, |tx| {
            let existing = ClassScheduleRepository::find_by_id_tx(tx, schedule_id)?.ok_or_else(
                || ApiError::NotFound {
                    entity: "OfferedCourseClassSchedule".to_string(),
                    id: schedule_id.to_string(),
                },
            )?;

            Self::ensure_slot_available(tx, input, Some(schedule_id))?;

            let updated = OfferedCourseClassSchedule {
                day_of_week: input.day_of_week,
                start_time: input.start_time,
                end_time: input.end_time,
                room_id: input.room_id.clone(),
                faculty_id: input.faculty_id.clone(),
                ..existing
            };
            ClassScheduleRepository::update_tx(tx, &updated)?;

            Ok::<_, ApiError>(updated)
        })?;

        info!(schedule_id = %schedule_id, "课表条目已调整");

        Ok(updated)
    }

    /// 按教学班列出课表条目
    pub fn list_section_schedules(
        &self,
        offered_course_section_id: &str,
    ) -> ApiResult<Vec<OfferedCourseClassSchedule>> {
        let conn = self.lock_conn()?;
        let schedules =
            ClassScheduleRepository::list_by_section_tx(&conn, offered_course_section_id)
                .map_err(ApiError::from)?;
        Ok(schedules)
    }
}
