// ==========================================
// 成衣生产问答系统 - 生产快照与特征向量
// ==========================================
// 职责: 款号最新日报快照 + 模型输入特征
// 红线: 特征顺序必须与训练时一致
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ProductionSnapshot - 款号最新日报
// ==========================================
// 说明: 累计产量不在这里,它来自全历史聚合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSnapshot {
    pub order_no: Option<String>,     // 订单号
    pub buyer_name: Option<String>,   // 客户
    pub style_no: String,             // 款号
    pub order_quantity: i64,          // 订单数量
    pub production_date: NaiveDate,   // 生产日期

    // ===== 当日产出 =====
    pub day_target: i64,              // 当日目标
    pub day_achieved: i64,            // 当日完成
    pub hourly_output: [i64; 8],      // hour_1..hour_8

    // ===== 面料 =====
    pub fabric_type: Option<String>,
    pub planned_fabric_meters: f64,   // 计划用布(米)
    pub actual_fabric_used: f64,      // 实际用布(米)

    // ===== 质量 =====
    pub rejection: i64,               // 次品
    pub rework: i64,                  // 返工

    pub line_no: i64,                 // 线号
}

impl ProductionSnapshot {
    /// 当日效率 (比值, 目标为 0 时记 0)
    pub fn daily_efficiency(&self) -> f64 {
        if self.day_target == 0 {
            0.0
        } else {
            self.day_achieved as f64 / self.day_target as f64
        }
    }

    /// 面料偏差 (比值, 计划为 0 时记 0)
    pub fn fabric_variance(&self) -> f64 {
        if self.planned_fabric_meters == 0.0 {
            0.0
        } else {
            (self.actual_fabric_used - self.planned_fabric_meters) / self.planned_fabric_meters
        }
    }

    /// 8 个小时产出之和
    pub fn hour_output(&self) -> i64 {
        self.hourly_output.iter().sum()
    }
}

// ==========================================
// FeatureVector - 模型输入特征 (11维)
// ==========================================
pub const FEATURE_COUNT: usize = 11;

/// 训练时的特征列顺序
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "style_encoded",
    "buyer_encoded",
    "order_quantity",
    "cumulative_achieved",
    "remaining_qty",
    "daily_efficiency",
    "efficiency_trend",
    "fabric_variance",
    "hour_output",
    "rejection",
    "line_no",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub style_encoded: i64,
    pub buyer_encoded: i64,
    pub order_quantity: i64,
    pub cumulative_achieved: i64,
    pub remaining_qty: i64,
    pub daily_efficiency: f64,
    pub efficiency_trend: f64,
    pub fabric_variance: f64,
    pub hour_output: i64,
    pub rejection: i64,
    pub line_no: i64,
}

impl FeatureVector {
    /// 按 FEATURE_NAMES 顺序输出 f32 数组
    pub fn to_array(&self) -> [f32; FEATURE_COUNT] {
        [
            self.style_encoded as f32,
            self.buyer_encoded as f32,
            self.order_quantity as f32,
            self.cumulative_achieved as f32,
            self.remaining_qty as f32,
            self.daily_efficiency as f32,
            self.efficiency_trend as f32,
            self.fabric_variance as f32,
            self.hour_output as f32,
            self.rejection as f32,
            self.line_no as f32,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ProductionSnapshot {
        ProductionSnapshot {
            order_no: Some("ORD10001".to_string()),
            buyer_name: Some("Nike".to_string()),
            style_no: "ST120".to_string(),
            order_quantity: 20000,
            production_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            day_target: 1000,
            day_achieved: 800,
            hourly_output: [100; 8],
            fabric_type: Some("Rib".to_string()),
            planned_fabric_meters: 200.0,
            actual_fabric_used: 210.0,
            rejection: 12,
            rework: 3,
            line_no: 7,
        }
    }

    #[test]
    fn test_derived_ratios() {
        let s = snapshot();
        assert!((s.daily_efficiency() - 0.8).abs() < 1e-9);
        assert!((s.fabric_variance() - 0.05).abs() < 1e-9);
        assert_eq!(s.hour_output(), 800);
    }

    #[test]
    fn test_zero_denominators() {
        let mut s = snapshot();
        s.day_target = 0;
        s.planned_fabric_meters = 0.0;
        assert_eq!(s.daily_efficiency(), 0.0);
        assert_eq!(s.fabric_variance(), 0.0);
    }

    #[test]
    fn test_feature_array_order() {
        let fv = FeatureVector {
            style_encoded: 1,
            buyer_encoded: 2,
            order_quantity: 3,
            cumulative_achieved: 4,
            remaining_qty: 5,
            daily_efficiency: 6.0,
            efficiency_trend: 7.0,
            fabric_variance: 8.0,
            hour_output: 9,
            rejection: 10,
            line_no: 11,
        };
        let arr = fv.to_array();
        let expected: Vec<f32> = (1..=11).map(|v| v as f32).collect();
        assert_eq!(arr.to_vec(), expected);
        assert_eq!(FEATURE_NAMES[4], "remaining_qty");
    }
}
