// ==========================================
// 成衣生产问答系统 - API层
// ==========================================
// 职责: 对外服务边界 (问答 / 预测 / 风险总览)
// 红线: 错误必须转换为 ApiError, 不向外暴露底层错误类型
// ==========================================

pub mod error;
pub mod insight_api;

// 重导出
pub use error::{ApiError, ApiResult};
pub use insight_api::{ChartData, InsightApi, InsightResponse};
