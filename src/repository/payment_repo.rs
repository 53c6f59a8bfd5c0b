// ==========================================
// 高校选课注册系统 - 缴费与学业汇总仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 金额计算与 CGPA 计算分别在 API 层与 engine::grading
// ==========================================

use crate::domain::enrollment::{StudentAcademicInfo, StudentSemesterPayment};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// StudentSemesterPaymentRepository - 学期缴费仓储
// ==========================================

/// 学期缴费仓储
pub struct StudentSemesterPaymentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentSemesterPaymentRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 缴费单是否已存在（事务作用域，结转幂等判定）
    pub fn exists_tx(
        conn: &Connection,
        student_id: &str,
        academic_semester_id: &str,
    ) -> RepositoryResult<bool> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM student_semester_payment
                 WHERE student_id = ?1 AND academic_semester_id = ?2",
                params![student_id, academic_semester_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        Ok(exists)
    }

    /// 插入缴费单（事务作用域，结转批处理写入）
    pub fn insert_tx(conn: &Connection, payment: &StudentSemesterPayment) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO student_semester_payment (
                id, student_id, academic_semester_id,
                full_payment_amount, partial_payment_amount, total_due_amount
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                payment.id,
                payment.student_id,
                payment.academic_semester_id,
                payment.full_payment_amount,
                payment.partial_payment_amount,
                payment.total_due_amount,
            ],
        )?;

        Ok(())
    }
}

// ==========================================
// StudentAcademicInfoRepository - 学业汇总仓储
// ==========================================

/// 学业汇总仓储
pub struct StudentAcademicInfoRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentAcademicInfoRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 整体覆盖式 upsert（事务作用域，成绩定档后由整体重算结果写入）
    pub fn upsert_tx(conn: &Connection, info: &StudentAcademicInfo) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO student_academic_info (student_id, total_completed_credit, cgpa)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (student_id) DO UPDATE SET
                total_completed_credit = excluded.total_completed_credit,
                cgpa = excluded.cgpa
            "#,
            params![info.student_id, info.total_completed_credit, info.cgpa],
        )?;

        Ok(())
    }

    /// 按学生查询学业汇总
    pub fn find_by_student(&self, student_id: &str) -> RepositoryResult<Option<StudentAcademicInfo>> {
        let conn = self.get_conn()?;

        let info = conn
            .query_row(
                "SELECT student_id, total_completed_credit, cgpa
                 FROM student_academic_info WHERE student_id = ?1",
                params![student_id],
                |row| {
                    Ok(StudentAcademicInfo {
                        student_id: row.get(0)?,
                        total_completed_credit: row.get(1)?,
                        cgpa: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(info)
    }
}
