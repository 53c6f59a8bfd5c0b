// ==========================================
// 高校选课注册系统 - 注册周期仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 不变量兜底: 活跃周期唯一性由部分唯一索引
//             idx_semester_registration_active 在存储层保证
// ==========================================

use crate::domain::registration::SemesterRegistration;
use crate::domain::types::SemesterRegistrationStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str =
    "id, academic_semester_id, status, start_date, end_date, min_credit, max_credit";

/// 注册周期仓储
pub struct SemesterRegistrationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SemesterRegistrationRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<SemesterRegistration> {
        Ok(SemesterRegistration {
            id: row.get(0)?,
            academic_semester_id: row.get(1)?,
            status: SemesterRegistrationStatus::from_str(&row.get::<_, String>(2)?)
                .unwrap_or(SemesterRegistrationStatus::Ended), // 默认值
            start_date: NaiveDate::parse_from_str(&row.get::<_, String>(3)?, "%Y-%m-%d")
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            end_date: NaiveDate::parse_from_str(&row.get::<_, String>(4)?, "%Y-%m-%d")
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            min_credit: row.get(5)?,
            max_credit: row.get(6)?,
        })
    }

    /// 按 id 查询注册周期
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<SemesterRegistration>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 按 id 查询注册周期（事务作用域）
    pub fn find_by_id_tx(
        conn: &Connection,
        id: &str,
    ) -> RepositoryResult<Option<SemesterRegistration>> {
        let reg = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM semester_registration WHERE id = ?1"),
                params![id],
                Self::map_row,
            )
            .optional()?;

        Ok(reg)
    }

    /// 查询活跃周期（UPCOMING 或 ONGOING，全系统至多一个）
    pub fn find_active(&self) -> RepositoryResult<Option<SemesterRegistration>> {
        let conn = self.get_conn()?;
        Self::find_active_tx(&conn)
    }

    /// 查询活跃周期（事务作用域）
    pub fn find_active_tx(conn: &Connection) -> RepositoryResult<Option<SemesterRegistration>> {
        let reg = conn
            .query_row(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM semester_registration
                     WHERE status IN ('UPCOMING', 'ONGOING')"
                ),
                [],
                Self::map_row,
            )
            .optional()?;

        Ok(reg)
    }

    /// 插入注册周期（事务作用域）
    ///
    /// 活跃周期重复时由部分唯一索引拒绝，错误被分类为 UniqueConstraintViolation
    pub fn insert_tx(conn: &Connection, reg: &SemesterRegistration) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO semester_registration (
                id, academic_semester_id, status, start_date, end_date, min_credit, max_credit
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                reg.id,
                reg.academic_semester_id,
                reg.status.as_str(),
                reg.start_date.format("%Y-%m-%d").to_string(),
                reg.end_date.format("%Y-%m-%d").to_string(),
                reg.min_credit,
                reg.max_credit,
            ],
        )?;

        Ok(())
    }

    /// 整行更新（状态转换合法性由 API 层判定后调用）
    pub fn update(&self, reg: &SemesterRegistration) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_tx(&conn, reg)
    }

    /// 整行更新（事务作用域）
    pub fn update_tx(conn: &Connection, reg: &SemesterRegistration) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"
            UPDATE semester_registration
            SET academic_semester_id = ?2, status = ?3, start_date = ?4,
                end_date = ?5, min_credit = ?6, max_credit = ?7
            WHERE id = ?1
            "#,
            params![
                reg.id,
                reg.academic_semester_id,
                reg.status.as_str(),
                reg.start_date.format("%Y-%m-%d").to_string(),
                reg.end_date.format("%Y-%m-%d").to_string(),
                reg.min_credit,
                reg.max_credit,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "SemesterRegistration".to_string(),
                id: reg.id.clone(),
            });
        }

        Ok(())
    }

    /// 删除注册周期（管理端破坏性操作）
    pub fn delete(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "DELETE FROM semester_registration WHERE id = ?1",
            params![id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "SemesterRegistration".to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
