// ==========================================
// 成衣生产问答系统 - 领域模型层
// ==========================================
// 职责: 定义词表、查询解析、生产快照、预测结果等实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod prediction;
pub mod production;
pub mod query;
pub mod types;
pub mod vocabulary;

// 重导出核心类型
pub use prediction::{PredictionResult, RiskReport};
pub use production::{FeatureVector, ProductionSnapshot, FEATURE_COUNT, FEATURE_NAMES};
pub use query::{BuiltQuery, DateRange, FilterValue, Filters, MetricRow, ParsedQuery, SqlParam};
pub use types::{FilterKind, GroupBy, Intent, RiskLevel, VocabularySource};
pub use vocabulary::Vocabulary;
