// ==========================================
// 高校选课注册系统 - 学生注册仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: total_credits_taken 只经 adjust_credits_tx 增减，
//       与选课记录的插入/删除同事务
// ==========================================

use crate::domain::registration::{
    StudentSemesterRegistration, StudentSemesterRegistrationCourse,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// StudentSemesterRegistrationRepository - 学生周期注册仓储
// ==========================================

/// 学生周期注册仓储
pub struct StudentSemesterRegistrationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentSemesterRegistrationRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<StudentSemesterRegistration> {
        Ok(StudentSemesterRegistration {
            id: row.get(0)?,
            student_id: row.get(1)?,
            semester_registration_id: row.get(2)?,
            total_credits_taken: row.get(3)?,
            is_confirmed: row.get::<_, i64>(4)? != 0,
        })
    }

    /// 查询学生在指定周期内的注册记录
    pub fn find_by_student_and_registration(
        &self,
        student_id: &str,
        semester_registration_id: &str,
    ) -> RepositoryResult<Option<StudentSemesterRegistration>> {
        let conn = self.get_conn()?;
        Self::find_by_student_and_registration_tx(&conn, student_id, semester_registration_id)
    }

    /// 查询学生在指定周期内的注册记录（事务作用域）
    pub fn find_by_student_and_registration_tx(
        conn: &Connection,
        student_id: &str,
        semester_registration_id: &str,
    ) -> RepositoryResult<Option<StudentSemesterRegistration>> {
        let reg = conn
            .query_row(
                "SELECT id, student_id, semester_registration_id, total_credits_taken, is_confirmed
                 FROM student_semester_registration
                 WHERE student_id = ?1 AND semester_registration_id = ?2",
                params![student_id, semester_registration_id],
                Self::map_row,
            )
            .optional()?;

        Ok(reg)
    }

    /// 插入注册记录（同一学生同一周期重复时由唯一约束拒绝）
    pub fn insert(&self, reg: &StudentSemesterRegistration) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_tx(&conn, reg)
    }

    /// 插入注册记录（事务作用域）
    pub fn insert_tx(conn: &Connection, reg: &StudentSemesterRegistration) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO student_semester_registration (
                id, student_id, semester_registration_id, total_credits_taken, is_confirmed
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                reg.id,
                reg.student_id,
                reg.semester_registration_id,
                reg.total_credits_taken,
                reg.is_confirmed as i64,
            ],
        )?;

        Ok(())
    }

    /// 增减学分累计（事务作用域，delta 为课程学分的正/负值）
    pub fn adjust_credits_tx(conn: &Connection, id: &str, delta: i32) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE student_semester_registration
             SET total_credits_taken = total_credits_taken + ?2
             WHERE id = ?1",
            params![id, delta],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "StudentSemesterRegistration".to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }

    /// 置确认标记（事务作用域，一次性不可逆）
    pub fn set_confirmed_tx(conn: &Connection, id: &str) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE student_semester_registration SET is_confirmed = 1 WHERE id = ?1",
            params![id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "StudentSemesterRegistration".to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }

    /// 列出周期内全部已确认注册（事务作用域，结转批处理的输入）
    pub fn list_confirmed_by_registration_tx(
        conn: &Connection,
        semester_registration_id: &str,
    ) -> RepositoryResult<Vec<StudentSemesterRegistration>> {
        let mut stmt = conn.prepare(
            "SELECT id, student_id, semester_registration_id, total_credits_taken, is_confirmed
             FROM student_semester_registration
             WHERE semester_registration_id = ?1 AND is_confirmed = 1
             ORDER BY student_id",
        )?;

        let regs = stmt
            .query_map(params![semester_registration_id], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(regs)
    }
}

// ==========================================
// StudentSemesterRegistrationCourseRepository - 选课记录仓储
// ==========================================

/// 选课记录仓储
pub struct StudentSemesterRegistrationCourseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentSemesterRegistrationCourseRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<StudentSemesterRegistrationCourse> {
        Ok(StudentSemesterRegistrationCourse {
            semester_registration_id: row.get(0)?,
            student_id: row.get(1)?,
            offered_course_id: row.get(2)?,
            offered_course_section_id: row.get(3)?,
        })
    }

    /// 按复合键查询选课记录（事务作用域）
    pub fn find_tx(
        conn: &Connection,
        semester_registration_id: &str,
        student_id: &str,
        offered_course_id: &str,
    ) -> RepositoryResult<Option<StudentSemesterRegistrationCourse>> {
        let record = conn
            .query_row(
                "SELECT semester_registration_id, student_id, offered_course_id, offered_course_section_id
                 FROM student_semester_registration_course
                 WHERE semester_registration_id = ?1 AND student_id = ?2 AND offered_course_id = ?3",
                params![semester_registration_id, student_id, offered_course_id],
                Self::map_row,
            )
            .optional()?;

        Ok(record)
    }

    /// 插入选课记录（事务作用域，复合主键拒绝重复选课）
    pub fn insert_tx(
        conn: &Connection,
        record: &StudentSemesterRegistrationCourse,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO student_semester_registration_course (
                semester_registration_id, student_id, offered_course_id, offered_course_section_id
            ) VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.semester_registration_id,
                record.student_id,
                record.offered_course_id,
                record.offered_course_section_id,
            ],
        )?;

        Ok(())
    }

    /// 删除选课记录（事务作用域，返回是否确有记录被删）
    pub fn delete_tx(
        conn: &Connection,
        semester_registration_id: &str,
        student_id: &str,
        offered_course_id: &str,
    ) -> RepositoryResult<bool> {
        let affected = conn.execute(
            "DELETE FROM student_semester_registration_course
             WHERE semester_registration_id = ?1 AND student_id = ?2 AND offered_course_id = ?3",
            params![semester_registration_id, student_id, offered_course_id],
        )?;

        Ok(affected == 1)
    }

    /// 列出学生在周期内的全部选课记录
    pub fn list_by_student_and_registration(
        &self,
        student_id: &str,
        semester_registration_id: &str,
    ) -> RepositoryResult<Vec<StudentSemesterRegistrationCourse>> {
        let conn = self.get_conn()?;
        Self::list_by_student_and_registration_tx(&conn, student_id, semester_registration_id)
    }

    /// 列出学生在周期内的全部选课记录（事务作用域）
    pub fn list_by_student_and_registration_tx(
        conn: &Connection,
        student_id: &str,
        semester_registration_id: &str,
    ) -> RepositoryResult<Vec<StudentSemesterRegistrationCourse>> {
        let mut stmt = conn.prepare(
            "SELECT semester_registration_id, student_id, offered_course_id, offered_course_section_id
             FROM student_semester_registration_course
             WHERE student_id = ?1 AND semester_registration_id = ?2
             ORDER BY offered_course_id",
        )?;

        let records = stmt
            .query_map(params![student_id, semester_registration_id], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }
}
