// ==========================================
// 高校选课注册系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供统一的事务原语 with_transaction（任何失败路径都会回滚）
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{Connection, TransactionBehavior};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 在单个事务作用域内执行 f
///
/// - 使用 BEGIN IMMEDIATE，写事务在入口处即取得写锁
/// - f 返回 Err 或 panic 时自动回滚（Transaction 的 Drop 行为）
/// - 多表变更必须经由此原语，禁止裸写 BEGIN/COMMIT
/// - 错误类型对 From<RepositoryError> 泛化，API 层闭包可直接返回自身错误
pub fn with_transaction<T, E, F>(conn: &mut Connection, f: F) -> Result<T, E>
where
    E: From<RepositoryError>,
    F: FnOnce(&Connection) -> Result<T, E>,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    let result = f(&tx)?;

    tx.commit()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

    Ok(result)
}

/// 初始化数据库 schema（幂等）
///
/// 关键约束（不变量的存储层兜底）:
/// - semester_registration: 部分唯一索引保证全系统至多一个 UPCOMING/ONGOING 注册周期
/// - offered_course_section: CHECK 保证 0 <= currently_enrolled <= max_capacity
/// - student_semester_registration_course: 复合主键防止同一门开设课程重复选课
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- ===== 参照实体（CRUD 由外部子系统负责）=====

        CREATE TABLE IF NOT EXISTS academic_semester (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            year INTEGER NOT NULL,
            is_current INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS student (
            id TEXT PRIMARY KEY,
            student_code TEXT NOT NULL UNIQUE,
            academic_department_id TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS course (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            code TEXT NOT NULL,
            credits INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS course_prerequisite (
            course_id TEXT NOT NULL REFERENCES course(id),
            prerequisite_id TEXT NOT NULL REFERENCES course(id),
            PRIMARY KEY (course_id, prerequisite_id)
        );

        CREATE TABLE IF NOT EXISTS faculty (
            id TEXT PRIMARY KEY,
            faculty_code TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS room (
            id TEXT PRIMARY KEY,
            room_code TEXT NOT NULL UNIQUE
        );

        -- ===== 注册周期 =====

        CREATE TABLE IF NOT EXISTS semester_registration (
            id TEXT PRIMARY KEY,
            academic_semester_id TEXT NOT NULL REFERENCES academic_semester(id),
            status TEXT NOT NULL DEFAULT 'UPCOMING',
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            min_credit INTEGER NOT NULL DEFAULT 0,
            max_credit INTEGER NOT NULL DEFAULT 0
        );

        -- 全系统至多一个活跃注册周期
        CREATE UNIQUE INDEX IF NOT EXISTS idx_semester_registration_active
            ON semester_registration ((status IN ('UPCOMING', 'ONGOING')))
            WHERE status IN ('UPCOMING', 'ONGOING');

        CREATE TABLE IF NOT EXISTS offered_course (
            id TEXT PRIMARY KEY,
            course_id TEXT NOT NULL REFERENCES course(id),
            academic_department_id TEXT NOT NULL,
            semester_registration_id TEXT NOT NULL REFERENCES semester_registration(id),
            UNIQUE (course_id, academic_department_id, semester_registration_id)
        );

        CREATE TABLE IF NOT EXISTS offered_course_section (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            max_capacity INTEGER NOT NULL,
            currently_enrolled INTEGER NOT NULL DEFAULT 0,
            offered_course_id TEXT NOT NULL REFERENCES offered_course(id),
            semester_registration_id TEXT NOT NULL REFERENCES semester_registration(id),
            UNIQUE (title, offered_course_id),
            CHECK (currently_enrolled >= 0 AND currently_enrolled <= max_capacity)
        );

        CREATE TABLE IF NOT EXISTS offered_course_class_schedule (
            id TEXT PRIMARY KEY,
            day_of_week TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            room_id TEXT NOT NULL REFERENCES room(id),
            faculty_id TEXT NOT NULL REFERENCES faculty(id),
            offered_course_section_id TEXT NOT NULL REFERENCES offered_course_section(id),
            semester_registration_id TEXT NOT NULL REFERENCES semester_registration(id)
        );

        CREATE INDEX IF NOT EXISTS idx_class_schedule_room_day
            ON offered_course_class_schedule (room_id, day_of_week);
        CREATE INDEX IF NOT EXISTS idx_class_schedule_faculty_day
            ON offered_course_class_schedule (faculty_id, day_of_week);

        -- ===== 学生注册与选课 =====

        CREATE TABLE IF NOT EXISTS student_semester_registration (
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL REFERENCES student(id),
            semester_registration_id TEXT NOT NULL REFERENCES semester_registration(id),
            total_credits_taken INTEGER NOT NULL DEFAULT 0,
            is_confirmed INTEGER NOT NULL DEFAULT 0,
            UNIQUE (student_id, semester_registration_id)
        );

        CREATE TABLE IF NOT EXISTS student_semester_registration_course (
            semester_registration_id TEXT NOT NULL REFERENCES semester_registration(id),
            student_id TEXT NOT NULL REFERENCES student(id),
            offered_course_id TEXT NOT NULL REFERENCES offered_course(id),
            offered_course_section_id TEXT NOT NULL REFERENCES offered_course_section(id),
            PRIMARY KEY (semester_registration_id, student_id, offered_course_id)
        );

        -- ===== 学期结转产出 =====

        CREATE TABLE IF NOT EXISTS student_enrolled_course (
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL REFERENCES student(id),
            course_id TEXT NOT NULL REFERENCES course(id),
            academic_semester_id TEXT NOT NULL REFERENCES academic_semester(id),
            status TEXT NOT NULL DEFAULT 'ONGOING',
            grade TEXT,
            point REAL,
            total_marks REAL,
            UNIQUE (student_id, course_id, academic_semester_id)
        );

        CREATE TABLE IF NOT EXISTS student_enrolled_course_mark (
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL REFERENCES student(id),
            student_enrolled_course_id TEXT NOT NULL REFERENCES student_enrolled_course(id),
            academic_semester_id TEXT NOT NULL REFERENCES academic_semester(id),
            exam_type TEXT NOT NULL,
            marks INTEGER,
            grade TEXT,
            UNIQUE (student_enrolled_course_id, exam_type)
        );

        CREATE TABLE IF NOT EXISTS student_semester_payment (
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL REFERENCES student(id),
            academic_semester_id TEXT NOT NULL REFERENCES academic_semester(id),
            full_payment_amount REAL NOT NULL,
            partial_payment_amount REAL NOT NULL,
            total_due_amount REAL NOT NULL,
            UNIQUE (student_id, academic_semester_id)
        );

        CREATE TABLE IF NOT EXISTS student_academic_info (
            student_id TEXT PRIMARY KEY REFERENCES student(id),
            total_completed_credit INTEGER NOT NULL DEFAULT 0,
            cgpa REAL NOT NULL DEFAULT 0.0
        );

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    use rusqlite::OptionalExtension;

    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
