// ==========================================
// 成衣生产问答系统 - 问答 API
// ==========================================
// 职责: 自由文本问答 / 单款预测 / 风险总览 / 词表重载
// 并发: 解释器以 Arc 快照读取, 重载时整体替换
// ==========================================

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::PipelineConfig;
use crate::domain::prediction::{PredictionResult, RiskReport};
use crate::domain::query::{BuiltQuery, MetricRow, ParsedQuery};
use crate::domain::types::GroupBy;
use crate::domain::vocabulary::Vocabulary;
use crate::engine::error::EngineError;
use crate::engine::{
    IntentClassifier, Interpretation, PredictionEngine, QueryInterpreter, RiskAggregator,
    SummaryEngine, VocabularyLoader,
};
use crate::model::classifier::TextClassifier;
use crate::repository::ProductionDataRepository;

// ==========================================
// 响应 DTO
// ==========================================

/// 图表数据 (空查询或无分组时为空)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// 问答响应
#[derive(Debug, Clone, Serialize)]
pub struct InsightResponse {
    pub request_id: String,
    /// sql / prediction / risk_overview
    pub response_type: String,
    pub summary_text: String,
    pub recommendations: Vec<String>,
    pub table_data: Vec<Value>,
    pub chart_data: ChartData,
    pub parsed_query: ParsedQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_debug: Option<String>,
}

impl InsightResponse {
    fn new(kind: &str, parsed: ParsedQuery, summary_text: String) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            response_type: kind.to_string(),
            summary_text,
            recommendations: Vec::new(),
            table_data: Vec::new(),
            chart_data: ChartData::default(),
            parsed_query: parsed,
            sql_debug: None,
        }
    }
}

// ==========================================
// InsightApi
// ==========================================
pub struct InsightApi {
    interpreter: RwLock<Arc<QueryInterpreter>>,
    repo: Arc<ProductionDataRepository>,
    predictor: Arc<PredictionEngine>,
    risk: RiskAggregator,
    summary: SummaryEngine,
    intent_model: Option<Arc<dyn TextClassifier>>,
    config: PipelineConfig,
}

impl InsightApi {
    /// 创建 InsightApi 并完成首次词表加载
    ///
    /// # 参数
    /// - repo: 生产日报仓储
    /// - predictor: 交期预测引擎
    /// - intent_model: 意图分类模型 (None 时使用关键词)
    /// - config: 流水线配置
    pub fn new(
        repo: Arc<ProductionDataRepository>,
        predictor: Arc<PredictionEngine>,
        intent_model: Option<Arc<dyn TextClassifier>>,
        config: PipelineConfig,
    ) -> ApiResult<Self> {
        let interpreter = build_interpreter(&repo, intent_model.clone(), &config)?;
        let risk = RiskAggregator::new(repo.clone(), predictor.clone(), config.clone());
        let summary = SummaryEngine::new(&config);

        Ok(Self {
            interpreter: RwLock::new(Arc::new(interpreter)),
            repo,
            predictor,
            risk,
            summary,
            intent_model,
            config,
        })
    }

    fn current_interpreter(&self) -> ApiResult<Arc<QueryInterpreter>> {
        self.interpreter
            .read()
            .map(|guard| guard.clone())
            .map_err(|e| ApiError::InternalError(format!("解释器锁获取失败: {}", e)))
    }

    // ==========================================
    // 问答
    // ==========================================

    /// 自由文本问答
    ///
    /// # 参数
    /// - text: 用户问题
    ///
    /// # 返回
    /// - Ok(InsightResponse): 摘要 + 表格 + 图表
    /// - Err(ApiError): 输入为空或存储不可用
    pub fn ask(&self, text: &str) -> ApiResult<InsightResponse> {
        let _perf = crate::perf::PerfGuard::new("api.ask");

        if text.trim().is_empty() {
            return Err(ApiError::InvalidInput("问题不能为空".to_string()));
        }

        let interpreter = self.current_interpreter()?;
        let interpretation = interpreter.interpret(text);
        tracing::info!(kind = interpretation.kind(), "问答请求已解释");

        match interpretation {
            Interpretation::Sql { parsed, query } => self.answer_sql(parsed, query),
            Interpretation::Prediction { style_no, parsed } => {
                self.answer_prediction(&style_no, parsed)
            }
            Interpretation::RiskOverview { parsed } => self.answer_risk_overview(parsed),
        }
    }

    fn answer_sql(&self, parsed: ParsedQuery, query: BuiltQuery) -> ApiResult<InsightResponse> {
        let rows = self.repo.run_metric_query(&query)?;
        let insight = self.summary.summarize(&rows, parsed.metric, &parsed.filters);

        let mut response = InsightResponse::new("sql", parsed, insight.summary_text);
        response.recommendations = insight.recommendations;
        response.chart_data = chart_for(&rows, query.group_by);
        response.table_data = rows
            .iter()
            .take(self.config.table_row_limit)
            .map(|r| r.to_table_row(query.value_column))
            .collect();
        response.sql_debug = Some(query.sql);
        Ok(response)
    }

    fn answer_prediction(&self, style_no: &str, parsed: ParsedQuery) -> ApiResult<InsightResponse> {
        match self.predictor.predict(style_no) {
            Ok(result) => {
                let text = self.summary.summarize_prediction(&result);
                let mut response = InsightResponse::new("prediction", parsed, text);
                response.table_data = vec![to_json(&result)?];
                Ok(response)
            }
            Err(EngineError::StorageUnavailable(e)) => Err(e.into()),
            Err(e) => {
                tracing::warn!(style_no, error = %e, "单款预测失败");
                Ok(InsightResponse::new(
                    "prediction",
                    parsed,
                    format!("Error: {}", e),
                ))
            }
        }
    }

    fn answer_risk_overview(&self, parsed: ParsedQuery) -> ApiResult<InsightResponse> {
        match self.risk.overview() {
            Ok(report) => {
                let text = self.summary.summarize_risk_report(&report);
                let mut response = InsightResponse::new("risk_overview", parsed, text);
                response.table_data = report
                    .styles
                    .iter()
                    .map(to_json)
                    .collect::<ApiResult<Vec<_>>>()?;
                Ok(response)
            }
            Err(EngineError::StorageUnavailable(e)) => Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "风险总览生成失败");
                Ok(InsightResponse::new(
                    "risk_overview",
                    parsed,
                    format!("Error generating risk report: {}", e),
                ))
            }
        }
    }

    // ==========================================
    // 直接预测入口
    // ==========================================

    /// 单款交期预测
    pub fn predict(&self, style_no: &str) -> ApiResult<PredictionResult> {
        let _perf = crate::perf::PerfGuard::new("api.predict");

        let style_no = style_no.trim();
        if style_no.is_empty() {
            return Err(ApiError::InvalidInput("款号不能为空".to_string()));
        }

        Ok(self.predictor.predict(style_no)?)
    }

    /// 在产款风险总览
    pub fn risk_overview(&self) -> ApiResult<RiskReport> {
        let _perf = crate::perf::PerfGuard::new("api.risk_overview");
        Ok(self.risk.overview()?)
    }

    // ==========================================
    // 词表
    // ==========================================

    /// 当前词表
    pub fn vocabulary(&self) -> ApiResult<Vocabulary> {
        Ok(self.current_interpreter()?.vocabulary().clone())
    }

    /// 重新加载词表并整体替换解释器
    ///
    /// # 说明
    /// - 正在处理的请求继续使用旧快照
    pub fn reload_vocabulary(&self) -> ApiResult<Vocabulary> {
        let _perf = crate::perf::PerfGuard::new("api.reload_vocabulary");

        let fresh = Arc::new(build_interpreter(
            &self.repo,
            self.intent_model.clone(),
            &self.config,
        )?);
        let vocab = fresh.vocabulary().clone();

        let mut guard = self
            .interpreter
            .write()
            .map_err(|e| ApiError::InternalError(format!("解释器锁获取失败: {}", e)))?;
        *guard = fresh;

        tracing::info!(source = %vocab.source, anchor = %vocab.anchor_date, "词表已重新加载");
        Ok(vocab)
    }
}

fn build_interpreter(
    repo: &Arc<ProductionDataRepository>,
    intent_model: Option<Arc<dyn TextClassifier>>,
    config: &PipelineConfig,
) -> ApiResult<QueryInterpreter> {
    let vocabulary = VocabularyLoader::new(repo.clone(), config.clone()).load();
    let intent = IntentClassifier::new(intent_model);
    Ok(QueryInterpreter::new(vocabulary, intent, config)?)
}

/// 分组查询的图表数据: 按日期或按客户
fn chart_for(rows: &[MetricRow], group_by: GroupBy) -> ChartData {
    let labels: Vec<String> = match group_by {
        GroupBy::Date => rows
            .iter()
            .map(|r| r.production_date.map(|d| d.to_string()).unwrap_or_default())
            .collect(),
        GroupBy::Buyer => rows
            .iter()
            .map(|r| r.buyer_name.clone().unwrap_or_default())
            .collect(),
        GroupBy::None => return ChartData::default(),
    };

    ChartData {
        labels,
        values: rows.iter().map(|r| r.value).collect(),
    }
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::InternalError(e.to_string()))
}
