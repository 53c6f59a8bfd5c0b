// ==========================================
// 高校选课注册系统 - 修读与成绩仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 成绩档位换算在 engine::grading，本层只负责行级读写
// ==========================================

use crate::domain::enrollment::{StudentEnrolledCourse, StudentEnrolledCourseMark};
use crate::domain::types::{ExamType, StudentEnrolledCourseStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 已完成课程的学分与绩点（CGPA 重算的输入行）
#[derive(Debug, Clone)]
pub struct CompletedCourse {
    pub credits: i32,
    pub point: f64,
}

// ==========================================
// StudentEnrolledCourseRepository - 修读记录仓储
// ==========================================

/// 修读记录仓储
pub struct StudentEnrolledCourseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentEnrolledCourseRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<StudentEnrolledCourse> {
        Ok(StudentEnrolledCourse {
            id: row.get(0)?,
            student_id: row.get(1)?,
            course_id: row.get(2)?,
            academic_semester_id: row.get(3)?,
            status: StudentEnrolledCourseStatus::from_str(&row.get::<_, String>(4)?)
                .unwrap_or(StudentEnrolledCourseStatus::Ongoing), // 默认值
            grade: row.get(5)?,
            point: row.get(6)?,
            total_marks: row.get(7)?,
        })
    }

    /// 按 (学生, 课程, 学期) 查询修读记录
    pub fn find_by_student_course_semester(
        &self,
        student_id: &str,
        course_id: &str,
        academic_semester_id: &str,
    ) -> RepositoryResult<Option<StudentEnrolledCourse>> {
        let conn = self.get_conn()?;
        Self::find_by_student_course_semester_tx(&conn, student_id, course_id, academic_semester_id)
    }

    /// 按 (学生, 课程, 学期) 查询修读记录（事务作用域）
    pub fn find_by_student_course_semester_tx(
        conn: &Connection,
        student_id: &str,
        course_id: &str,
        academic_semester_id: &str,
    ) -> RepositoryResult<Option<StudentEnrolledCourse>> {
        let enrolled = conn
            .query_row(
                "SELECT id, student_id, course_id, academic_semester_id,
                        status, grade, point, total_marks
                 FROM student_enrolled_course
                 WHERE student_id = ?1 AND course_id = ?2 AND academic_semester_id = ?3",
                params![student_id, course_id, academic_semester_id],
                Self::map_row,
            )
            .optional()?;

        Ok(enrolled)
    }

    /// 插入修读记录（事务作用域，结转批处理写入）
    pub fn insert_tx(conn: &Connection, enrolled: &StudentEnrolledCourse) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO student_enrolled_course (
                id, student_id, course_id, academic_semester_id,
                status, grade, point, total_marks
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                enrolled.id,
                enrolled.student_id,
                enrolled.course_id,
                enrolled.academic_semester_id,
                enrolled.status.as_str(),
                enrolled.grade,
                enrolled.point,
                enrolled.total_marks,
            ],
        )?;

        Ok(())
    }

    /// 成绩定档: 写入总分/档位/绩点并置 COMPLETED（事务作用域）
    pub fn complete_tx(
        conn: &Connection,
        id: &str,
        grade: &str,
        point: f64,
        total_marks: f64,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE student_enrolled_course
             SET status = ?2, grade = ?3, point = ?4, total_marks = ?5
             WHERE id = ?1",
            params![
                id,
                StudentEnrolledCourseStatus::Completed.as_str(),
                grade,
                point,
                total_marks,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "StudentEnrolledCourse".to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }

    /// 学生已完成课程的 course_id 集合（事务作用域，先修判定的输入）
    pub fn list_completed_course_ids_tx(
        conn: &Connection,
        student_id: &str,
    ) -> RepositoryResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT course_id FROM student_enrolled_course
             WHERE student_id = ?1 AND status = 'COMPLETED'",
        )?;

        let ids = stmt
            .query_map(params![student_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<String>>>()?;

        Ok(ids)
    }

    /// 学生全部已完成课程的学分与绩点（事务作用域，CGPA 重算输入）
    pub fn list_completed_by_student_tx(
        conn: &Connection,
        student_id: &str,
    ) -> RepositoryResult<Vec<CompletedCourse>> {
        let mut stmt = conn.prepare(
            "SELECT c.credits, e.point
             FROM student_enrolled_course e
             JOIN course c ON c.id = e.course_id
             WHERE e.student_id = ?1 AND e.status = 'COMPLETED' AND e.point IS NOT NULL",
        )?;

        let completed = stmt
            .query_map(params![student_id], |row| {
                Ok(CompletedCourse {
                    credits: row.get(0)?,
                    point: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(completed)
    }
}

// ==========================================
// StudentEnrolledCourseMarkRepository - 单场成绩仓储
// ==========================================

/// 单场成绩仓储
pub struct StudentEnrolledCourseMarkRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentEnrolledCourseMarkRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<StudentEnrolledCourseMark> {
        Ok(StudentEnrolledCourseMark {
            id: row.get(0)?,
            student_id: row.get(1)?,
            student_enrolled_course_id: row.get(2)?,
            academic_semester_id: row.get(3)?,
            exam_type: ExamType::from_str(&row.get::<_, String>(4)?)
                .unwrap_or(ExamType::Midterm), // 默认值
            marks: row.get(5)?,
            grade: row.get(6)?,
        })
    }

    /// 成绩行是否已存在（事务作用域，结转幂等判定）
    pub fn exists_tx(
        conn: &Connection,
        student_enrolled_course_id: &str,
        exam_type: ExamType,
    ) -> RepositoryResult<bool> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM student_enrolled_course_mark
                 WHERE student_enrolled_course_id = ?1 AND exam_type = ?2",
                params![student_enrolled_course_id, exam_type.as_str()],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        Ok(exists)
    }

    /// 插入空白成绩行（事务作用域，结转批处理写入）
    pub fn insert_tx(conn: &Connection, mark: &StudentEnrolledCourseMark) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO student_enrolled_course_mark (
                id, student_id, student_enrolled_course_id, academic_semester_id,
                exam_type, marks, grade
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                mark.id,
                mark.student_id,
                mark.student_enrolled_course_id,
                mark.academic_semester_id,
                mark.exam_type.as_str(),
                mark.marks,
                mark.grade,
            ],
        )?;

        Ok(())
    }

    /// 按 (修读记录, 考试类型) 查询成绩行（事务作用域）
    pub fn find_by_enrolled_course_and_exam_tx(
        conn: &Connection,
        student_enrolled_course_id: &str,
        exam_type: ExamType,
    ) -> RepositoryResult<Option<StudentEnrolledCourseMark>> {
        let mark = conn
            .query_row(
                "SELECT id, student_id, student_enrolled_course_id, academic_semester_id,
                        exam_type, marks, grade
                 FROM student_enrolled_course_mark
                 WHERE student_enrolled_course_id = ?1 AND exam_type = ?2",
                params![student_enrolled_course_id, exam_type.as_str()],
                Self::map_row,
            )
            .optional()?;

        Ok(mark)
    }

    /// 回填单场分数与档位（事务作用域）
    pub fn update_marks_tx(
        conn: &Connection,
        id: &str,
        marks: i32,
        grade: &str,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE student_enrolled_course_mark SET marks = ?2, grade = ?3 WHERE id = ?1",
            params![id, marks, grade],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "StudentEnrolledCourseMark".to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }

    /// 列出一条修读记录的全部成绩行（学生查询自己的成绩）
    pub fn list_by_enrolled_course(
        &self,
        student_enrolled_course_id: &str,
    ) -> RepositoryResult<Vec<StudentEnrolledCourseMark>> {
        let conn = self.get_conn()?;
        Self::list_by_enrolled_course_tx(&conn, student_enrolled_course_id)
    }

    /// 列出一条修读记录的全部成绩行（事务作用域）
    pub fn list_by_enrolled_course_tx(
        conn: &Connection,
        student_enrolled_course_id: &str,
    ) -> RepositoryResult<Vec<StudentEnrolledCourseMark>> {
        let mut stmt = conn.prepare(
            "SELECT id, student_id, student_enrolled_course_id, academic_semester_id,
                    exam_type, marks, grade
             FROM student_enrolled_course_mark
             WHERE student_enrolled_course_id = ?1
             ORDER BY exam_type",
        )?;

        let marks = stmt
            .query_map(params![student_enrolled_course_id], Self::map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(marks)
    }
}
