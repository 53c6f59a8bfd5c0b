// ==========================================
// 高校选课注册系统 - 参照实体仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 学期/学生/课程由外部子系统维护，本核心只读，
//       例外是结转时翻转 academic_semester.is_current
// ==========================================

use crate::domain::academic::{AcademicSemester, Course, Student};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// AcademicSemesterRepository - 学期仓储
// ==========================================

/// 学期仓储
pub struct AcademicSemesterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AcademicSemesterRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 id 查询学期
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<AcademicSemester>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 按 id 查询学期（事务作用域）
    pub fn find_by_id_tx(conn: &Connection, id: &str) -> RepositoryResult<Option<AcademicSemester>> {
        let semester = conn
            .query_row(
                "SELECT id, title, year, is_current FROM academic_semester WHERE id = ?1",
                params![id],
                |row| {
                    Ok(AcademicSemester {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        year: row.get(2)?,
                        is_current: row.get::<_, i64>(3)? != 0,
                    })
                },
            )
            .optional()?;

        Ok(semester)
    }

    /// 清除所有学期的当前标记（事务作用域）
    pub fn clear_current_tx(conn: &Connection) -> RepositoryResult<usize> {
        let affected = conn.execute(
            "UPDATE academic_semester SET is_current = 0 WHERE is_current = 1",
            [],
        )?;
        Ok(affected)
    }

    /// 将指定学期标记为当前学期（事务作用域）
    pub fn set_current_tx(conn: &Connection, id: &str) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE academic_semester SET is_current = 1 WHERE id = ?1",
            params![id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "AcademicSemester".to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

// ==========================================
// StudentRepository - 学生仓储
// ==========================================

/// 学生仓储（只读）
pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &rusqlite::Row<'_>) -> SqliteResult<Student> {
        Ok(Student {
            id: row.get(0)?,
            student_code: row.get(1)?,
            academic_department_id: row.get(2)?,
        })
    }

    /// 按学号查询学生（认证协作方传入的是学号，不是主键）
    pub fn find_by_code(&self, student_code: &str) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        Self::find_by_code_tx(&conn, student_code)
    }

    /// 按学号查询学生（事务作用域）
    pub fn find_by_code_tx(conn: &Connection, student_code: &str) -> RepositoryResult<Option<Student>> {
        let student = conn
            .query_row(
                "SELECT id, student_code, academic_department_id FROM student WHERE student_code = ?1",
                params![student_code],
                Self::map_row,
            )
            .optional()?;

        Ok(student)
    }

    /// 按主键查询学生
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;

        let student = conn
            .query_row(
                "SELECT id, student_code, academic_department_id FROM student WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(student)
    }
}

// ==========================================
// CourseRepository - 课程仓储
// ==========================================

/// 课程仓储（只读，含先修课程图）
pub struct CourseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CourseRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 id 查询课程（含先修课程 id 列表）
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Course>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 按 id 查询课程（事务作用域）
    pub fn find_by_id_tx(conn: &Connection, id: &str) -> RepositoryResult<Option<Course>> {
        let base = conn
            .query_row(
                "SELECT id, title, code, credits FROM course WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i32>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((course_id, title, code, credits)) = base else {
            return Ok(None);
        };

        let prerequisite_ids = Self::prerequisite_ids_tx(conn, &course_id)?;

        Ok(Some(Course {
            id: course_id,
            title,
            code,
            credits,
            prerequisite_ids,
        }))
    }

    /// 查询一门课程的先修课程 id 列表（事务作用域）
    pub fn prerequisite_ids_tx(conn: &Connection, course_id: &str) -> RepositoryResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT prerequisite_id FROM course_prerequisite WHERE course_id = ?1 ORDER BY prerequisite_id",
        )?;

        let ids = stmt
            .query_map(params![course_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<String>>>()?;

        Ok(ids)
    }
}
