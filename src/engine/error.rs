// ==========================================
// 成衣生产问答系统 - 引擎层错误类型
// ==========================================
// 职责: 预测/风险/解析流程中的结构化错误
// ==========================================

use crate::model::error::ModelError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// 款号无历史记录
    #[error("Style {0} not found in history.")]
    StyleNotFound(String),

    /// 存储访问失败 (不重试)
    #[error("存储不可用: {0}")]
    StorageUnavailable(#[from] RepositoryError),

    /// 模型制品缺失或当前构建不支持
    #[error("Model not loaded: {0}")]
    ModelUnavailable(String),

    /// 推理失败
    #[error("推理失败: {0}")]
    Inference(String),

    /// 词表构建的正则非法
    #[error("过滤规则构建失败: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl From<ModelError> for EngineError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::ArtifactNotFound(_) | ModelError::Unavailable(_) => {
                EngineError::ModelUnavailable(err.to_string())
            }
            other => EngineError::Inference(other.to_string()),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
