// ==========================================
// 成衣生产问答系统 - 配置层
// ==========================================
// 职责: 流水线常量配置与模型制品路径
// 存储: config_kv 表 (可选)
// ==========================================

pub mod config_manager;
pub mod pipeline_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use pipeline_config::{ArtifactPaths, PipelineConfig};
