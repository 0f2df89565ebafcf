// ==========================================
// 成衣生产问答系统 - 流水线配置
// ==========================================
// 职责: 把魔法常量收敛为具名、可覆写的配置项
// 存储: config_kv 表 (可选), 缺失时使用默认值
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ==========================================
// 默认值
// ==========================================
pub const DEFAULT_MONTH_DAYS: i64 = 30;
pub const DEFAULT_VOCAB_RECENT_ROWS: usize = 2000;
pub const DEFAULT_VOCAB_STYLE_CAP: usize = 500;
pub const DEFAULT_RISK_RECENT_ROWS: usize = 1000;
pub const DEFAULT_RISK_SAMPLE_SIZE: usize = 5;
pub const DEFAULT_MIN_DAILY_RATE: f64 = 10.0;
pub const DEFAULT_RISK_HIGH_DAYS: f64 = 7.0;
pub const DEFAULT_RISK_MEDIUM_DAYS: f64 = 3.0;
pub const DEFAULT_EFFICIENCY_TREND_WINDOW: usize = 7;
pub const DEFAULT_EFFICIENCY_ALERT_PCT: f64 = 60.0;
pub const DEFAULT_WASTAGE_ALERT_PCT: f64 = 2.0;
pub const DEFAULT_WASTAGE_BREACH_PCT: f64 = 5.0;
pub const DEFAULT_TABLE_ROW_LIMIT: usize = 50;

// ==========================================
// PipelineConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    // ===== 日期解析 =====
    /// "N months" 按 N*month_days 天计算 (非日历月)
    pub month_days: i64,

    // ===== 词表 =====
    pub vocab_recent_rows: usize,
    pub vocab_style_cap: usize,

    // ===== 风险总览 =====
    pub risk_recent_rows: usize,
    pub risk_sample_size: usize,

    // ===== 预测 =====
    /// 预测日产能下限 (件/天)
    pub min_daily_rate: f64,
    pub risk_high_days: f64,
    pub risk_medium_days: f64,
    /// 效率趋势滚动窗口 (记录条数); 1 表示直接使用当日效率
    pub efficiency_trend_window: usize,

    // ===== 摘要 =====
    pub efficiency_alert_pct: f64,
    pub wastage_alert_pct: f64,
    pub wastage_breach_pct: f64,
    pub table_row_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            month_days: DEFAULT_MONTH_DAYS,
            vocab_recent_rows: DEFAULT_VOCAB_RECENT_ROWS,
            vocab_style_cap: DEFAULT_VOCAB_STYLE_CAP,
            risk_recent_rows: DEFAULT_RISK_RECENT_ROWS,
            risk_sample_size: DEFAULT_RISK_SAMPLE_SIZE,
            min_daily_rate: DEFAULT_MIN_DAILY_RATE,
            risk_high_days: DEFAULT_RISK_HIGH_DAYS,
            risk_medium_days: DEFAULT_RISK_MEDIUM_DAYS,
            efficiency_trend_window: DEFAULT_EFFICIENCY_TREND_WINDOW,
            efficiency_alert_pct: DEFAULT_EFFICIENCY_ALERT_PCT,
            wastage_alert_pct: DEFAULT_WASTAGE_ALERT_PCT,
            wastage_breach_pct: DEFAULT_WASTAGE_BREACH_PCT,
            table_row_limit: DEFAULT_TABLE_ROW_LIMIT,
        }
    }
}

// ==========================================
// ArtifactPaths - 模型制品路径
// ==========================================
pub const CLASSIFIER_FILE: &str = "nlp_model.json";
pub const REGRESSOR_FILE: &str = "model_order_completion.onnx";
pub const ENCODERS_FILE: &str = "encoders.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub classifier: PathBuf,
    pub regressor: PathBuf,
    pub encoders: PathBuf,
}

impl ArtifactPaths {
    /// 以目录为根的默认文件名
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            classifier: dir.join(CLASSIFIER_FILE),
            regressor: dir.join(REGRESSOR_FILE),
            encoders: dir.join(ENCODERS_FILE),
        }
    }

    /// 从环境变量 GARMENT_INSIGHT_MODEL_DIR 解析, 缺省为当前目录
    pub fn from_env() -> Self {
        let dir = std::env::var("GARMENT_INSIGHT_MODEL_DIR")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| ".".to_string());
        Self::in_dir(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.month_days, 30);
        assert_eq!(cfg.vocab_recent_rows, 2000);
        assert_eq!(cfg.vocab_style_cap, 500);
        assert_eq!(cfg.risk_sample_size, 5);
        assert_eq!(cfg.min_daily_rate, 10.0);
    }

    #[test]
    fn test_artifact_paths_in_dir() {
        let paths = ArtifactPaths::in_dir("/opt/models");
        assert_eq!(paths.classifier, PathBuf::from("/opt/models/nlp_model.json"));
        assert_eq!(paths.encoders, PathBuf::from("/opt/models/encoders.json"));
    }
}
