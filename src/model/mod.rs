// ==========================================
// 成衣生产问答系统 - 模型层
// ==========================================
// 职责: 模型制品加载 + 推理 (文本分类 / 日产能回归 / 标签编码)
// 红线: 模型层不访问数据库
// ==========================================

pub mod classifier;
pub mod encoders;
pub mod error;
pub mod regressor;

pub use classifier::{TextClassifier, TfidfLinearClassifier};
pub use encoders::LabelEncoders;
pub use error::ModelError;
pub use regressor::{OnnxRegressor, OutputRegressor};
