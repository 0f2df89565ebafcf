// ==========================================
// 成衣生产问答系统 - 交期预测结果
// ==========================================

use crate::domain::types::RiskLevel;
use serde::{Deserialize, Serialize};

// ==========================================
// PredictionResult - 单款交期预测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub style_no: String,
    pub estimated_days: f64,        // 预计剩余天数 (一位小数)
    pub remaining_qty: i64,         // 剩余数量
    pub predicted_daily_rate: f64,  // 预测日产能 (已应用下限)
    pub risk: RiskLevel,
    pub avg_efficiency: f64,        // 效率趋势 (百分比, 一位小数)
}

impl PredictionResult {
    /// 是否仍在生产中
    pub fn is_in_progress(&self) -> bool {
        self.remaining_qty > 0
    }
}

// ==========================================
// RiskReport - 在产款风险总览
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub styles: Vec<PredictionResult>,
}

impl RiskReport {
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// 最高风险等级
    pub fn highest_risk(&self) -> Option<RiskLevel> {
        self.styles.iter().map(|p| p.risk).max()
    }
}
