// ==========================================
// 成衣生产问答系统 - 应用层
// ==========================================
// 职责: 装配各层组件, 供 CLI 与集成测试使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, ModelBundle};
