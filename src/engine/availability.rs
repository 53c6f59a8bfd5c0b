// ==========================================
// 高校选课注册系统 - 教室/教师可用性判定
// ==========================================
// 职责: 在调用方事务作用域内取出同资源同星期的既有时段，
//       逐一与请求时段做重叠判定
// 说明: exclude_schedule_id 用于更新场景排除自身，
//       否则任何对既有条目的原地修改都会与自己冲突
// ==========================================

use crate::domain::offering::ClassScheduleSlot;
use crate::engine::time_slot::slots_overlap;
use crate::repository::class_schedule_repo::ClassScheduleRepository;
use crate::repository::error::RepositoryResult;
use rusqlite::Connection;

/// 可用性判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    /// 与之冲突的既有课表条目 id
    ConflictsWith(String),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// 教室/教师可用性判定器
pub struct AvailabilityChecker;

impl AvailabilityChecker {
    /// 判定教室在指定时段是否空闲（事务作用域）
    pub fn check_room_available(
        conn: &Connection,
        room_id: &str,
        slot: &ClassScheduleSlot,
        exclude_schedule_id: Option<&str>,
    ) -> RepositoryResult<Availability> {
        let existing =
            ClassScheduleRepository::list_by_room_and_day_tx(conn, room_id, slot.day_of_week)?;

        for schedule in &existing {
            if exclude_schedule_id == Some(schedule.id.as_str()) {
                continue;
            }
            if slots_overlap(&schedule.slot(), slot) {
                return Ok(Availability::ConflictsWith(schedule.id.clone()));
            }
        }

        Ok(Availability::Available)
    }

    /// 判定教师在指定时段是否空闲（事务作用域）
    pub fn check_faculty_available(
        conn: &Connection,
        faculty_id: &str,
        slot: &ClassScheduleSlot,
        exclude_schedule_id: Option<&str>,
    ) -> RepositoryResult<Availability> {
        let existing =
            ClassScheduleRepository::list_by_faculty_and_day_tx(conn, faculty_id, slot.day_of_week)?;

        for schedule in &existing {
            if exclude_schedule_id == Some(schedule.id.as_str()) {
                continue;
            }
            if slots_overlap(&schedule.slot(), slot) {
                return Ok(Availability::ConflictsWith(schedule.id.clone()));
            }
        }

        Ok(Availability::Available)
    }
}
