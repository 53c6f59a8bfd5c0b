// ==========================================
// 高校选课注册系统 - 开课仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 不变量兜底:
// - (course, department, registration) 三元组唯一索引
// - 容量计数只能经 try_increment/try_decrement 条件更新修改，
//   CHECK 约束作为最后一道防线
// ==========================================

use crate::domain::offering::{OfferedCourse, OfferedCourseSection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// OfferedCourseRepository - 开设课程仓储
// ==========================================

/// 开设课程仓储
pub struct OfferedCourseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OfferedCourseRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<OfferedCourse> {
        Ok(OfferedCourse {
            id: row.get(0)?,
            course_id: row.get(1)?,
            academic_department_id: row.get(2)?,
            semester_registration_id: row.get(3)?,
        })
    }

    /// 按 id 查询开设课程
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<OfferedCourse>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 按 id 查询开设课程（事务作用域）
    pub fn find_by_id_tx(conn: &Connection, id: &str) -> RepositoryResult<Option<OfferedCourse>> {
        let offered = conn
            .query_row(
                "SELECT id, course_id, academic_department_id, semester_registration_id
                 FROM offered_course WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(offered)
    }

    /// 三元组是否已存在（事务作用域，批量开课的幂等判定）
    pub fn exists_triple_tx(
        conn: &Connection,
        course_id: &str,
        academic_department_id: &str,
        semester_registration_id: &str,
    ) -> RepositoryResult<bool> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM offered_course
                 WHERE course_id = ?1 AND academic_department_id = ?2
                   AND semester_registration_id = ?3",
                params![course_id, academic_department_id, semester_registration_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        Ok(exists)
    }

    /// 插入开设课程
    pub fn insert(&self, offered: &OfferedCourse) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_tx(&conn, offered)
    }

    /// 插入开设课程（事务作用域）
    pub fn insert_tx(conn: &Connection, offered: &OfferedCourse) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO offered_course (
                id, course_id, academic_department_id, semester_registration_id
            ) VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                offered.id,
                offered.course_id,
                offered.academic_department_id,
                offered.semester_registration_id,
            ],
        )?;

        Ok(())
    }

    /// 按周期与院系列出开设课程（学生可选课程视图的基础查询）
    pub fn list_by_registration_and_department(
        &self,
        semester_registration_id: &str,
        academic_department_id: &str,
    ) -> RepositoryResult<Vec<OfferedCourse>> {
        let conn = self.get_conn()?;
        Self::list_by_registration_and_department_tx(
            &conn,
            semester_registration_id,
            academic_department_id,
        )
    }

    /// 按周期与院系列出开设课程（事务作用域）
    pub fn list_by_registration_and_department_tx(
        conn: &Connection,
        semester_registration_id: &str,
        academic_department_id: &str,
    ) -> RepositoryResult<Vec<OfferedCourse>> {
        let mut stmt = conn.prepare(
            "SELECT id, course_id, academic_department_id, semester_registration_id
             FROM offered_course
             WHERE semester_registration_id = ?1 AND academic_department_id = ?2
             ORDER BY id",
        )?;

        let offered = stmt
            .query_map(
                params![semester_registration_id, academic_department_id],
                Self::map_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(offered)
    }
}

// ==========================================
// SectionRepository - 教学班仓储
// ==========================================

/// 教学班仓储（容量计数的唯一写入口）
pub struct SectionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SectionRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<OfferedCourseSection> {
        Ok(OfferedCourseSection {
            id: row.get(0)?,
            title: row.get(1)?,
            max_capacity: row.get(2)?,
            currently_enrolled: row.get(3)?,
            offered_course_id: row.get(4)?,
            semester_registration_id: row.get(5)?,
        })
    }

    /// 按 id 查询教学班
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<OfferedCourseSection>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 按 id 查询教学班（事务作用域）
    pub fn find_by_id_tx(
        conn: &Connection,
        id: &str,
    ) -> RepositoryResult<Option<OfferedCourseSection>> {
        let section = conn
            .query_row(
                "SELECT id, title, max_capacity, currently_enrolled,
                        offered_course_id, semester_registration_id
                 FROM offered_course_section WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(section)
    }

    /// 按开设课程列出教学班
    pub fn list_by_offered_course(
        &self,
        offered_course_id: &str,
    ) -> RepositoryResult<Vec<OfferedCourseSection>> {
        let conn = self.get_conn()?;
        Self::list_by_offered_course_tx(&conn, offered_course_id)
    }

    /// 按开设课程列出教学班（事务作用域）
    pub fn list_by_offered_course_tx(
        conn: &Connection,
        offered_course_id: &str,
    ) -> RepositoryResult<Vec<OfferedCourseSection>> {
        let mut stmt = conn.prepare(
            "SELECT id, title, max_capacity, currently_enrolled,
                    offered_course_id, semester_registration_id
             FROM offered_course_section
             WHERE offered_course_id = ?1
             ORDER BY title",
        )?;

        let sections = stmt
            .query_map(params![offered_course_id], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(sections)
    }

    /// 插入教学班（事务作用域，与其课表条目同事务创建）
    pub fn insert_tx(conn: &Connection, section: &OfferedCourseSection) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO offered_course_section (
                id, title, max_capacity, currently_enrolled,
                offered_course_id, semester_registration_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                section.id,
                section.title,
                section.max_capacity,
                section.currently_enrolled,
                section.offered_course_id,
                section.semester_registration_id,
            ],
        )?;

        Ok(())
    }

    /// 条件自增已选人数（事务作用域）
    ///
    /// 返回 false 表示教学班已满（或 id 不存在），调用方据此拒绝选课。
    /// WHERE 子句内嵌容量判定，计数更新是原子的。
    pub fn try_increment_enrolled_tx(conn: &Connection, id: &str) -> RepositoryResult<bool> {
        let affected = conn.execute(
            "UPDATE offered_course_section
             SET currently_enrolled = currently_enrolled + 1
             WHERE id = ?1 AND currently_enrolled < max_capacity",
            params![id],
        )?;

        Ok(affected == 1)
    }

    /// 条件自减已选人数（事务作用域）
    ///
    /// 返回 false 表示计数已为 0（或 id 不存在），计数永不降为负数。
    pub fn try_decrement_enrolled_tx(conn: &Connection, id: &str) -> RepositoryResult<bool> {
        let affected = conn.execute(
            "UPDATE offered_course_section
             SET currently_enrolled = currently_enrolled - 1
             WHERE id = ?1 AND currently_enrolled > 0",
            params![id],
        )?;

        Ok(affected == 1)
    }
}
