// ==========================================
// 成衣生产问答系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (+ ONNX Runtime, 可选)
// 系统定位: 生产日报问答 / 交期预测 / 风险总览
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 模型层 - 文本分类 / 日产能回归
pub mod model;

// 引擎层 - 解释 / 预测 / 摘要
pub mod engine;

// 配置层 - 流水线配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// API 层 - 服务边界
pub mod api;

// 应用层 - 组件装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FilterKind, GroupBy, Intent, RiskLevel, VocabularySource};

// 领域实体
pub use domain::{
    DateRange, FeatureVector, Filters, ParsedQuery, PredictionResult, ProductionSnapshot,
    RiskReport, Vocabulary,
};

// 引擎
pub use engine::{
    Interpretation, PredictionEngine, QueryInterpreter, RiskAggregator, SummaryEngine,
    VocabularyLoader,
};

// API
pub use api::{InsightApi, InsightResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "成衣生产问答系统";
