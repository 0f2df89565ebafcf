// ==========================================
// 成衣生产问答系统 - 引擎层
// ==========================================
// 职责: 查询解释 / 交期预测 / 风险总览 / 洞察摘要
// 红线: Engine 不直接执行 SQL, 存储访问只经过 Repository
// ==========================================

pub mod date_range;
pub mod error;
pub mod filter_extractor;
pub mod intent;
pub mod interpreter;
pub mod prediction;
pub mod query_builder;
pub mod risk;
pub mod sql_builder;
pub mod summary;
pub mod vocabulary_loader;

// 重导出核心引擎
pub use date_range::DateRangeResolver;
pub use error::{EngineError, EngineResult};
pub use filter_extractor::FilterExtractor;
pub use intent::IntentClassifier;
pub use interpreter::{Interpretation, QueryInterpreter};
pub use prediction::PredictionEngine;
pub use query_builder::QueryBuilder;
pub use risk::RiskAggregator;
pub use summary::{InsightSummary, SummaryEngine};
pub use vocabulary_loader::VocabularyLoader;
