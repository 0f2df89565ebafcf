// ==========================================
// 成衣生产问答系统 - 交期预测引擎
// ==========================================
// 职责: 款号快照 + 累计产量 -> 特征 -> 日产能回归 -> 剩余天数与风险
// 输入: production_data (只读) + 回归模型 + 标签编码表
// 输出: PredictionResult
// ==========================================

use crate::config::PipelineConfig;
use crate::domain::prediction::PredictionResult;
use crate::domain::production::{FeatureVector, ProductionSnapshot};
use crate::domain::types::RiskLevel;
use crate::engine::error::{EngineError, EngineResult};
use crate::model::encoders::LabelEncoders;
use crate::model::regressor::OutputRegressor;
use crate::repository::ProductionDataRepository;
use std::sync::Arc;

// ==========================================
// PredictionEngine
// ==========================================
pub struct PredictionEngine {
    repo: Arc<ProductionDataRepository>,
    regressor: Option<Arc<dyn OutputRegressor>>,
    encoders: Option<Arc<LabelEncoders>>,
    config: PipelineConfig,
}

impl PredictionEngine {
    /// 创建预测引擎
    ///
    /// # 参数
    /// - repo: 生产日报仓储
    /// - regressor: 日产能回归模型 (缺失时 predict 返回 ModelUnavailable)
    /// - encoders: 训练期标签编码表 (同上)
    /// - config: 流水线配置
    pub fn new(
        repo: Arc<ProductionDataRepository>,
        regressor: Option<Arc<dyn OutputRegressor>>,
        encoders: Option<Arc<LabelEncoders>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            repo,
            regressor,
            encoders,
            config,
        }
    }

    /// 模型与编码表是否都已加载
    pub fn is_ready(&self) -> bool {
        self.regressor.is_some() && self.encoders.is_some()
    }

    /// 单款交期预测
    ///
    /// # 返回
    /// - Err(ModelUnavailable): 模型或编码表未加载
    /// - Err(StyleNotFound): 款号无历史记录
    /// - Err(StorageUnavailable): 存储读取失败
    pub fn predict(&self, style_no: &str) -> EngineResult<PredictionResult> {
        let (regressor, encoders) = match (&self.regressor, &self.encoders) {
            (Some(r), Some(e)) => (r, e),
            _ => {
                return Err(EngineError::ModelUnavailable(
                    "回归模型或编码表未加载".to_string(),
                ))
            }
        };

        // 1. 最新快照 + 全历史累计
        let snapshot = self
            .repo
            .find_latest_snapshot(style_no)?
            .ok_or_else(|| EngineError::StyleNotFound(style_no.to_string()))?;
        let cumulative = self.repo.cumulative_achieved(style_no)?;

        // 2. 效率趋势 (最近 N 条记录的当日效率均值)
        let recent = self
            .repo
            .recent_daily_efficiencies(style_no, self.config.efficiency_trend_window)?;
        let trend = efficiency_trend(&recent, snapshot.daily_efficiency());

        // 3. 特征 + 推理
        let features = build_features(&snapshot, cumulative, trend, encoders);
        let raw_rate = regressor.predict(&features.to_array())?;
        let rate = apply_rate_floor(raw_rate, self.config.min_daily_rate);

        // 4. 剩余天数 + 风险
        let estimated_days = round1(features.remaining_qty as f64 / rate);
        let risk = classify_risk(
            estimated_days,
            self.config.risk_high_days,
            self.config.risk_medium_days,
        );

        tracing::debug!(
            style_no,
            remaining = features.remaining_qty,
            raw_rate,
            rate,
            estimated_days,
            risk = %risk,
            "交期预测完成"
        );

        Ok(PredictionResult {
            style_no: style_no.to_string(),
            estimated_days,
            remaining_qty: features.remaining_qty,
            predicted_daily_rate: rate,
            risk,
            avg_efficiency: round1(trend * 100.0),
        })
    }
}

// ==========================================
// 纯函数 (特征与判定)
// ==========================================

/// 组装特征向量
pub fn build_features(
    snapshot: &ProductionSnapshot,
    cumulative_achieved: i64,
    efficiency_trend: f64,
    encoders: &LabelEncoders,
) -> FeatureVector {
    FeatureVector {
        style_encoded: encoders.encode_style(&snapshot.style_no),
        buyer_encoded: encoders.encode_buyer(snapshot.buyer_name.as_deref()),
        order_quantity: snapshot.order_quantity,
        cumulative_achieved,
        remaining_qty: (snapshot.order_quantity - cumulative_achieved).max(0),
        daily_efficiency: snapshot.daily_efficiency(),
        efficiency_trend,
        fabric_variance: snapshot.fabric_variance(),
        hour_output: snapshot.hour_output(),
        rejection: snapshot.rejection,
        line_no: snapshot.line_no,
    }
}

/// 效率趋势: 最近记录均值; 无记录时用当日效率
pub fn efficiency_trend(recent: &[f64], current: f64) -> f64 {
    if recent.is_empty() {
        current
    } else {
        recent.iter().sum::<f64>() / recent.len() as f64
    }
}

/// 日产能下限 (含 NaN)
pub fn apply_rate_floor(rate: f64, floor: f64) -> f64 {
    if rate > floor {
        rate
    } else {
        floor
    }
}

/// 风险判定: > high 为 High, > medium 为 Medium, 否则 Low
pub fn classify_risk(estimated_days: f64, high_days: f64, medium_days: f64) -> RiskLevel {
    if estimated_days > high_days {
        RiskLevel::High
    } else if estimated_days > medium_days {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// 保留一位小数
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot() -> ProductionSnapshot {
        ProductionSnapshot {
            order_no: None,
            buyer_name: Some("Nike".to_string()),
            style_no: "ST150".to_string(),
            order_quantity: 5000,
            production_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            day_target: 0,
            day_achieved: 300,
            hourly_output: [40; 8],
            fabric_type: None,
            planned_fabric_meters: 0.0,
            actual_fabric_used: 12.0,
            rejection: 4,
            rework: 1,
            line_no: 2,
        }
    }

    #[test]
    fn test_features_guard_zero_denominators() {
        let enc = LabelEncoders::default();
        let fv = build_features(&snapshot(), 5200, 0.0, &enc);
        assert_eq!(fv.remaining_qty, 0);
        assert_eq!(fv.daily_efficiency, 0.0);
        assert_eq!(fv.fabric_variance, 0.0);
        assert_eq!(fv.hour_output, 320);
        assert_eq!(fv.style_encoded, 0);
    }

    #[test]
    fn test_rate_floor() {
        assert_eq!(apply_rate_floor(3.2, 10.0), 10.0);
        assert_eq!(apply_rate_floor(10.0, 10.0), 10.0);
        assert_eq!(apply_rate_floor(-50.0, 10.0), 10.0);
        assert_eq!(apply_rate_floor(f64::NAN, 10.0), 10.0);
        assert_eq!(apply_rate_floor(250.5, 10.0), 250.5);
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(classify_risk(7.1, 7.0, 3.0), RiskLevel::High);
        assert_eq!(classify_risk(7.0, 7.0, 3.0), RiskLevel::Medium);
        assert_eq!(classify_risk(3.0, 7.0, 3.0), RiskLevel::Low);
        assert_eq!(classify_risk(0.0, 7.0, 3.0), RiskLevel::Low);
    }

    #[test]
    fn test_trend_and_rounding() {
        assert_eq!(efficiency_trend(&[], 0.75), 0.75);
        assert!((efficiency_trend(&[0.5, 1.0], 0.1) - 0.75).abs() < 1e-9);
        assert_eq!(round1(1234.0 / 250.0), 4.9);
        assert_eq!(round1(0.0), 0.0);
    }
}
