// ==========================================
// 高校选课注册系统 - 课表仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 时段重叠判定在 engine::availability，本层只负责
//       按教室/教师 + 星期取出候选集（命中复合索引）
// ==========================================

use crate::domain::offering::OfferedCourseClassSchedule;
use crate::domain::types::WeekDay;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = "id, day_of_week, start_time, end_time, room_id, faculty_id, \
                              offered_course_section_id, semester_registration_id";

fn parse_time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .unwrap_or_else(|_| NaiveTime::from_hms_opt(0, 0, 0).unwrap())
}

/// 课表条目仓储
pub struct ClassScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ClassScheduleRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<OfferedCourseClassSchedule> {
        Ok(OfferedCourseClassSchedule {
            id: row.get(0)?,
            day_of_week: WeekDay::from_str(&row.get::<_, String>(1)?)
                .unwrap_or(WeekDay::Saturday), // 默认值
            start_time: parse_time(&row.get::<_, String>(2)?),
            end_time: parse_time(&row.get::<_, String>(3)?),
            room_id: row.get(4)?,
            faculty_id: row.get(5)?,
            offered_course_section_id: row.get(6)?,
            semester_registration_id: row.get(7)?,
        })
    }

    /// 按 id 查询课表条目
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<OfferedCourseClassSchedule>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 按 id 查询课表条目（事务作用域）
    pub fn find_by_id_tx(
        conn: &Connection,
        id: &str,
    ) -> RepositoryResult<Option<OfferedCourseClassSchedule>> {
        let schedule = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM offered_course_class_schedule WHERE id = ?1"),
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(schedule)
    }

    /// 取出同教室同星期的全部课表条目（事务作用域）
    pub fn list_by_room_and_day_tx(
        conn: &Connection,
        room_id: &str,
        day_of_week: WeekDay,
    ) -> RepositoryResult<Vec<OfferedCourseClassSchedule>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM offered_course_class_schedule
             WHERE room_id = ?1 AND day_of_week = ?2"
        ))?;

        let schedules = stmt
            .query_map(params![room_id, day_of_week.as_str()], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(schedules)
    }

    /// 取出同教师同星期的全部课表条目（事务作用域）
    pub fn list_by_faculty_and_day_tx(
        conn: &Connection,
        faculty_id: &str,
        day_of_week: WeekDay,
    ) -> RepositoryResult<Vec<OfferedCourseClassSchedule>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM offered_course_class_schedule
             WHERE faculty_id = ?1 AND day_of_week = ?2"
        ))?;

        let schedules = stmt
            .query_map(params![faculty_id, day_of_week.as_str()], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(schedules)
    }

    /// 按教学班列出课表条目
    pub fn list_by_section(
        &self,
        offered_course_section_id: &str,
    ) -> RepositoryResult<Vec<OfferedCourseClassSchedule>> {
        let conn = self.get_conn()?;
        Self::list_by_section_tx(&conn, offered_course_section_id)
    }

    /// 按教学班列出课表条目（事务作用域）
    pub fn list_by_section_tx(
        conn: &Connection,
        offered_course_section_id: &str,
    ) -> RepositoryResult<Vec<OfferedCourseClassSchedule>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM offered_course_class_schedule
             WHERE offered_course_section_id = ?1
             ORDER BY day_of_week, start_time"
        ))?;

        let schedules = stmt
            .query_map(params![offered_course_section_id], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(schedules)
    }

    /// 插入课表条目（事务作用域，与教学班创建同事务）
    pub fn insert_tx(
        conn: &Connection,
        schedule: &OfferedCourseClassSchedule,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO offered_course_class_schedule (
                id, day_of_week, start_time, end_time, room_id, faculty_id,
                offered_course_section_id, semester_registration_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                schedule.id,
                schedule.day_of_week.as_str(),
                schedule.start_time.format("%H:%M").to_string(),
                schedule.end_time.format("%H:%M").to_string(),
                schedule.room_id,
                schedule.faculty_id,
                schedule.offered_course_section_id,
                schedule.semester_registration_id,
            ],
        )?;

        Ok(())
    }

    /// 更新课表条目（事务作用域，可用性判定由 API 层先行完成）
    pub fn update_tx(
        conn: &Connection,
        schedule: &OfferedCourseClassSchedule,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"
            UPDATE offered_course_class_schedule
            SET day_of_week = ?2, start_time = ?3, end_time = ?4,
                room_id = ?5, faculty_id = ?6
            WHERE id = ?1
            "#,
            params![
                schedule.id,
                schedule.day_of_week.as_str(),
                schedule.start_time.format("%H:%M").to_string(),
                schedule.end_time.format("%H:%M").to_string(),
                schedule.room_id,
                schedule.faculty_id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "OfferedCourseClassSchedule".to_string(),
                id: schedule.id.clone(),
            });
        }

        Ok(())
    }
}
