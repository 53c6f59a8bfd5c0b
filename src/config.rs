// ==========================================
// 高校选课注册系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置默认值
// ==========================================

/// 每学分学费（学期结转时生成缴费单的单价）
pub const DEFAULT_PAYMENT_PER_CREDIT: f64 = 5000.0;

/// 期中成绩权重
pub const DEFAULT_MIDTERM_WEIGHT: f64 = 0.4;

/// 期末成绩权重
pub const DEFAULT_FINAL_WEIGHT: f64 = 0.6;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = crate::db::open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（upsert）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;

        Ok(())
    }

    fn get_f64_or_default(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        match self.get_config_value(key)? {
            Some(v) => Ok(v.parse::<f64>().unwrap_or(default)),
            None => Ok(default),
        }
    }

    /// 每学分学费
    pub fn get_payment_per_credit(&self) -> Result<f64, Box<dyn Error>> {
        self.get_f64_or_default("payment_per_credit", DEFAULT_PAYMENT_PER_CREDIT)
    }

    /// 期中成绩权重
    pub fn get_midterm_weight(&self) -> Result<f64, Box<dyn Error>> {
        self.get_f64_or_default("midterm_weight", DEFAULT_MIDTERM_WEIGHT)
    }

    /// 期末成绩权重
    pub fn get_final_weight(&self) -> Result<f64, Box<dyn Error>> {
        self.get_f64_or_default("final_weight", DEFAULT_FINAL_WEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = setup();
        assert_eq!(config.get_payment_per_credit().unwrap(), 5000.0);
        assert_eq!(config.get_midterm_weight().unwrap(), 0.4);
        assert_eq!(config.get_final_weight().unwrap(), 0.6);
    }

    #[test]
    fn test_override_payment_per_credit() {
        let config = setup();
        config.set_config_value("payment_per_credit", "6500").unwrap();
        assert_eq!(config.get_payment_per_credit().unwrap(), 6500.0);
    }
}
