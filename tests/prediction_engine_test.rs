// ==========================================
// 交期预测 / 风险总览集成测试
// ==========================================
// 桩回归模型返回固定日产能, 记录输入特征
// ==========================================


use garment_insight::api::ApiError;
use garment_insight::app::{AppState, ModelBundle};
use garment_insight::domain::production::FEATURE_NAMES;
use garment_insight::RiskLevel;
use std::sync::Arc;
use test_helpers::*;

fn feature(features: &[f32], name: &str) -> f32 {
    let idx = FEATURE_NAMES.iter().position(|n| *n == name).unwrap();
    features[idx]
}

// ==========================================
// 单款预测
// ==========================================

#[test]
fn test_predict_active_style() {
    let (_tmp, state, regressor) = standard_state(250.0).unwrap();

    let result = state.insight_api.predict("ST120").unwrap();

    assert_eq!(result.style_no, "ST120");
    assert_eq!(result.remaining_qty, 18300);
    assert_eq!(result.predicted_daily_rate, 250.0);
    assert_eq!(result.estimated_days, 73.2);
    assert_eq!(result.risk, RiskLevel::High);
    // 最近两条效率 90% / 80%
    assert_eq!(result.avg_efficiency, 85.0);

    let features = regressor.last_features.lock().unwrap().unwrap();
    assert_eq!(feature(&features, "style_encoded"), 4.0);
    assert_eq!(feature(&features, "buyer_encoded"), 2.0);
    assert_eq!(feature(&features, "order_quantity"), 20000.0);
    assert_eq!(feature(&features, "cumulative_achieved"), 1700.0);
    assert_eq!(feature(&features, "remaining_qty"), 18300.0);
    assert!((feature(&features, "daily_efficiency") - 0.9).abs() < 1e-6);
    assert!((feature(&features, "efficiency_trend") - 0.85).abs() < 1e-6);
    assert!((feature(&features, "fabric_variance") - 0.01).abs() < 1e-6);
    assert_eq!(feature(&features, "hour_output"), 896.0);
    assert_eq!(feature(&features, "rejection"), 5.0);
    assert_eq!(feature(&features, "line_no"), 7.0);
}

#[test]
fn test_predict_completed_style() {
    let (_tmp, state, _reg) = standard_state(250.0).unwrap();

    let result = state.insight_api.predict("ST150").unwrap();

    assert_eq!(result.remaining_qty, 0);
    assert_eq!(result.estimated_days, 0.0);
    assert_eq!(result.risk, RiskLevel::Low);
    assert!(!result.is_in_progress());
}

#[test]
fn test_predict_unseen_labels_and_zero_denominators() {
    let (_tmp, state, regressor) = standard_state(250.0).unwrap();

    // ST130 / Zara 不在编码表; 目标与计划用布均为 0
    let result = state.insight_api.predict("ST130").unwrap();
    assert_eq!(result.estimated_days, 4.0);
    assert_eq!(result.risk, RiskLevel::Medium);
    assert_eq!(result.avg_efficiency, 0.0);

    let features = regressor.last_features.lock().unwrap().unwrap();
    assert_eq!(feature(&features, "style_encoded"), 0.0);
    assert_eq!(feature(&features, "buyer_encoded"), 0.0);
    assert_eq!(feature(&features, "daily_efficiency"), 0.0);
    assert_eq!(feature(&features, "fabric_variance"), 0.0);
}

#[test]
fn test_low_model_output_is_floored() {
    let (_tmp, state, _reg) = standard_state(3.0).unwrap();

    let result = state.insight_api.predict("ST130").unwrap();

    assert_eq!(result.predicted_daily_rate, 10.0);
    assert_eq!(result.estimated_days, 100.0);
    assert_eq!(result.risk, RiskLevel::High);
}

#[test]
fn test_negative_model_output_is_floored() {
    let (_tmp, state, _reg) = standard_state(-42.0).unwrap();

    let result = state.insight_api.predict("ST120").unwrap();
    assert_eq!(result.predicted_daily_rate, 10.0);
    assert_eq!(result.estimated_days, 1830.0);
}

#[test]
fn test_predict_unknown_style() {
    let (_tmp, state, _reg) = standard_state(250.0).unwrap();

    let err = state.insight_api.predict("ST999").unwrap_err();
    assert!(matches!(err, ApiError::StyleNotFound(ref s) if s == "ST999"));
    assert_eq!(err.to_string(), "Style ST999 not found in history.");
}

#[test]
fn test_predict_blank_style_is_invalid() {
    let (_tmp, state, _reg) = standard_state(250.0).unwrap();

    let err = state.insight_api.predict("  ").unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[test]
fn test_predict_without_models() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_standard_dataset(&db_path).unwrap();
    let state = AppState::with_models(db_path, ModelBundle::empty()).unwrap();

    let err = state.insight_api.predict("ST120").unwrap_err();
    assert!(matches!(err, ApiError::ModelUnavailable(_)));

    let err = state.insight_api.risk_overview().unwrap_err();
    assert!(matches!(err, ApiError::ModelUnavailable(_)));
}

#[test]
fn test_predict_with_regressor_but_no_encoders() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_standard_dataset(&db_path).unwrap();

    let mut models = stub_models(Arc::new(FixedRateRegressor::new(250.0)));
    models.encoders = None;
    let state = AppState::with_models(db_path, models).unwrap();

    let err = state.insight_api.predict("ST120").unwrap_err();
    assert!(matches!(err, ApiError::ModelUnavailable(_)));
}

// ==========================================
// 风险总览
// ==========================================

#[test]
fn test_risk_overview_excludes_completed_styles() {
    let (_tmp, state, _reg) = standard_state(250.0).unwrap();

    let report = state.insight_api.risk_overview().unwrap();

    let mut styles: Vec<&str> = report.styles.iter().map(|p| p.style_no.as_str()).collect();
    styles.sort();
    assert_eq!(styles, vec!["ST120", "ST130", "ST160"]);
    assert!(report.styles.iter().all(|p| p.remaining_qty > 0));
    assert_eq!(report.highest_risk(), Some(RiskLevel::High));
}

#[test]
fn test_risk_overview_respects_sample_size() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_standard_dataset(&db_path).unwrap();
    // 最近出现的款号排在前面, 2025-01 的两款独占样本
    insert_records(
        &db_path,
        &[
            ProductionRecord::new("Gap", "ST201", 900, "2025-01-05", 300, 300),
            ProductionRecord::new("Gap", "ST202", 900, "2025-01-04", 300, 300),
        ],
    )
    .unwrap();
    set_config(&db_path, "risk_sample_size", "2").unwrap();

    let state = AppState::with_models(
        db_path,
        stub_models(Arc::new(FixedRateRegressor::new(100.0))),
    )
    .unwrap();

    let report = state.insight_api.risk_overview().unwrap();
    let styles: Vec<&str> = report.styles.iter().map(|p| p.style_no.as_str()).collect();
    assert_eq!(styles, vec!["ST201", "ST202"]);
    assert!(report.styles.iter().all(|p| p.estimated_days == 6.0));
    assert!(report.styles.iter().all(|p| p.risk == RiskLevel::Medium));
}

#[test]
fn test_risk_thresholds_from_config() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_standard_dataset(&db_path).unwrap();
    set_config(&db_path, "risk_high_days", "80").unwrap();
    set_config(&db_path, "min_daily_rate", "500").unwrap();

    let state = AppState::with_models(
        db_path,
        stub_models(Arc::new(FixedRateRegressor::new(250.0))),
    )
    .unwrap();

    assert_eq!(state.config.risk_high_days, 80.0);
    assert_eq!(state.config.min_daily_rate, 500.0);

    let result = state.insight_api.predict("ST120").unwrap();
    // 250 < 500, 按下限计算
    assert_eq!(result.predicted_daily_rate, 500.0);
    assert_eq!(result.estimated_days, 36.6);
    assert_eq!(result.risk, RiskLevel::Medium);
}
