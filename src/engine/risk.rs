// ==========================================
// 成衣生产问答系统 - 在产款风险总览
// ==========================================
// 职责: 最近活跃款号抽样 -> 逐款预测 -> 仅保留在产款
// 约束: 单款失败记录 warn 后跳过; 抽样查询失败直接返回错误
// ==========================================

use crate::config::PipelineConfig;
use crate::domain::prediction::RiskReport;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::prediction::PredictionEngine;
use crate::engine::vocabulary_loader::distinct_in_order;
use crate::repository::ProductionDataRepository;
use std::sync::Arc;

pub struct RiskAggregator {
    repo: Arc<ProductionDataRepository>,
    predictor: Arc<PredictionEngine>,
    config: PipelineConfig,
}

impl RiskAggregator {
    pub fn new(
        repo: Arc<ProductionDataRepository>,
        predictor: Arc<PredictionEngine>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            repo,
            predictor,
            config,
        }
    }

    /// 生成风险总览
    ///
    /// # 返回
    /// RiskReport: 按最近活跃顺序排列的在产款预测
    pub fn overview(&self) -> EngineResult<RiskReport> {
        if !self.predictor.is_ready() {
            return Err(EngineError::ModelUnavailable(
                "回归模型或编码表未加载".to_string(),
            ));
        }

        let recent = self.repo.recent_style_refs(self.config.risk_recent_rows)?;
        let sample = distinct_in_order(recent, self.config.risk_sample_size);

        let mut report = RiskReport::default();
        for style_no in &sample {
            match self.predictor.predict(style_no) {
                Ok(result) if result.is_in_progress() => report.styles.push(result),
                Ok(_) => {
                    tracing::debug!(style_no = %style_no, "已完成款号, 不计入风险总览");
                }
                Err(e) => {
                    tracing::warn!(style_no = %style_no, error = %e, "单款预测失败, 跳过");
                }
            }
        }

        tracing::info!(
            sampled = sample.len(),
            in_progress = report.styles.len(),
            "风险总览生成完成"
        );
        Ok(report)
    }
}
