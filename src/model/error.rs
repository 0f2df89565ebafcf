// ==========================================
// 成衣生产问答系统 - 模型层错误类型
// ==========================================
// 职责: 模型制品加载与推理错误
// ==========================================

use thiserror::Error;

/// 模型层错误类型
#[derive(Error, Debug)]
pub enum ModelError {
    /// 制品文件不存在
    #[error("模型制品不存在: {0}")]
    ArtifactNotFound(String),

    /// 制品读取失败
    #[error("模型制品读取失败: {0}")]
    Io(#[from] std::io::Error),

    /// 制品格式错误 (JSON 解析失败或维度不一致)
    #[error("模型制品格式错误: {0}")]
    InvalidArtifact(String),

    /// 推理失败
    #[error("模型推理失败: {0}")]
    Inference(String),

    /// 当前构建不支持该模型 (未启用 onnx feature)
    #[error("模型不可用: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::InvalidArtifact(err.to_string())
    }
}

/// 读取制品文件, 不存在时返回 ArtifactNotFound
pub(crate) fn read_artifact(path: &std::path::Path) -> Result<String, ModelError> {
    if !path.exists() {
        return Err(ModelError::ArtifactNotFound(path.display().to_string()));
    }
    Ok(std::fs::read_to_string(path)?)
}
