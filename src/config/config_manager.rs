// ==========================================
// 成衣生产问答系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope), 表不存在时全部取默认值
// ==========================================

use crate::config::pipeline_config::PipelineConfig;
use crate::db::{open_sqlite_connection, table_exists};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

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
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 读取 global scope 的全部配置
    ///
    /// # 返回
    /// - 空 HashMap: config_kv 表不存在
    fn read_global_values(&self) -> Result<HashMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        if !table_exists(&conn, "config_kv")? {
            return Ok(HashMap::new());
        }

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut values = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            values.insert(key, value);
        }
        Ok(values)
    }

    /// 读取单个 global 配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        if !table_exists(&conn, "config_kv")? {
            return Ok(None);
        }

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 加载流水线配置 (默认值 + config_kv 覆写)
    ///
    /// # 说明
    /// - 非法值记录 warn 并保留默认值,不中断启动
    /// - 非正的窗口/数量类配置同样视为非法
    pub fn load_pipeline_config(&self) -> Result<PipelineConfig, Box<dyn Error>> {
        let values = self.read_global_values()?;
        let mut cfg = PipelineConfig::default();

        override_positive(&values, config_keys::MONTH_DAYS, &mut cfg.month_days);
        override_positive(&values, config_keys::VOCAB_RECENT_ROWS, &mut cfg.vocab_recent_rows);
        override_positive(&values, config_keys::VOCAB_STYLE_CAP, &mut cfg.vocab_style_cap);
        override_positive(&values, config_keys::RISK_RECENT_ROWS, &mut cfg.risk_recent_rows);
        override_positive(&values, config_keys::RISK_SAMPLE_SIZE, &mut cfg.risk_sample_size);
        override_positive(&values, config_keys::MIN_DAILY_RATE, &mut cfg.min_daily_rate);
        override_positive(&values, config_keys::RISK_HIGH_DAYS, &mut cfg.risk_high_days);
        override_positive(&values, config_keys::RISK_MEDIUM_DAYS, &mut cfg.risk_medium_days);
        override_positive(
            &values,
            config_keys::EFFICIENCY_TREND_WINDOW,
            &mut cfg.efficiency_trend_window,
        );
        override_positive(&values, config_keys::EFFICIENCY_ALERT_PCT, &mut cfg.efficiency_alert_pct);
        override_positive(&values, config_keys::WASTAGE_ALERT_PCT, &mut cfg.wastage_alert_pct);
        override_positive(&values, config_keys::WASTAGE_BREACH_PCT, &mut cfg.wastage_breach_pct);
        override_positive(&values, config_keys::TABLE_ROW_LIMIT, &mut cfg.table_row_limit);

        if cfg.risk_medium_days > cfg.risk_high_days {
            tracing::warn!(
                medium = cfg.risk_medium_days,
                high = cfg.risk_high_days,
                "风险阈值倒置, 恢复默认值"
            );
            let defaults = PipelineConfig::default();
            cfg.risk_high_days = defaults.risk_high_days;
            cfg.risk_medium_days = defaults.risk_medium_days;
        }

        Ok(cfg)
    }
}

/// 用 config_kv 中的值覆写目标字段 (必须可解析且为正数)
fn override_positive<T>(values: &HashMap<String, String>, key: &str, target: &mut T)
where
    T: FromStr + PartialOrd + Default + Copy + std::fmt::Display,
{
    let Some(raw) = values.get(key) else {
        return;
    };

    match raw.trim().parse::<T>() {
        Ok(v) if v > T::default() => {
            tracing::debug!(key, value = %v, "配置覆写");
            *target = v;
        }
        _ => {
            tracing::warn!(key, raw = %raw, default = %target, "配置值非法, 使用默认值");
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 日期解析
    pub const MONTH_DAYS: &str = "month_days";

    // 词表
    pub const VOCAB_RECENT_ROWS: &str = "vocab_recent_rows";
    pub const VOCAB_STYLE_CAP: &str = "vocab_style_cap";

    // 风险总览
    pub const RISK_RECENT_ROWS: &str = "risk_recent_rows";
    pub const RISK_SAMPLE_SIZE: &str = "risk_sample_size";

    // 预测
    pub const MIN_DAILY_RATE: &str = "min_daily_rate";
    pub const RISK_HIGH_DAYS: &str = "risk_high_days";
    pub const RISK_MEDIUM_DAYS: &str = "risk_medium_days";
    pub const EFFICIENCY_TREND_WINDOW: &str = "efficiency_trend_window";

    // 摘要
    pub const EFFICIENCY_ALERT_PCT: &str = "efficiency_alert_pct";
    pub const WASTAGE_ALERT_PCT: &str = "wastage_alert_pct";
    pub const WASTAGE_BREACH_PCT: &str = "wastage_breach_pct";
    pub const TABLE_ROW_LIMIT: &str = "table_row_limit";
}
