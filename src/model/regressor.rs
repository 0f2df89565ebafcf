// ==========================================
// 成衣生产问答系统 - 日产能回归模型
// ==========================================
// 职责: 11 维特征 -> 预测日产能 (件/天)
// 制品: model_order_completion.onnx (需启用 onnx feature)
// ==========================================

use crate::domain::production::FEATURE_COUNT;
use crate::model::error::ModelError;
use std::path::Path;

#[cfg(feature = "onnx")]
use ort::{session::builder::GraphOptimizationLevel, session::Session, value::Tensor};
#[cfg(feature = "onnx")]
use std::sync::Mutex;

/// 回归模型接口
pub trait OutputRegressor: Send + Sync {
    /// 单条样本推理
    ///
    /// # 参数
    /// - features: 按训练时顺序排列的特征
    fn predict(&self, features: &[f32; FEATURE_COUNT]) -> Result<f64, ModelError>;
}

// ==========================================
// OnnxRegressor
// ==========================================
/// ONNX Runtime 回归模型
///
/// 输入输出名从会话元数据读取, 不写死
pub struct OnnxRegressor {
    #[cfg(feature = "onnx")]
    session: Mutex<Session>,
    #[cfg(feature = "onnx")]
    input_name: String,
    #[cfg(feature = "onnx")]
    output_name: String,
}

impl OnnxRegressor {
    /// 加载 ONNX 模型
    #[cfg(feature = "onnx")]
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        if !model_path.exists() {
            return Err(ModelError::ArtifactNotFound(model_path.display().to_string()));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::InvalidArtifact(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::InvalidArtifact(e.to_string()))?
            .with_intra_threads(1)
            .map_err(|e| ModelError::InvalidArtifact(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| ModelError::InvalidArtifact(e.to_string()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| ModelError::InvalidArtifact("模型没有输入".to_string()))?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::InvalidArtifact("模型没有输出".to_string()))?;

        tracing::info!(
            path = %model_path.display(),
            input = %input_name,
            output = %output_name,
            "回归模型加载完成"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    /// 未启用 onnx feature 时始终返回 Unavailable
    #[cfg(not(feature = "onnx"))]
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        Err(ModelError::Unavailable(format!(
            "未启用 onnx feature, 无法加载 {}",
            model_path.display()
        )))
    }
}

#[cfg(feature = "onnx")]
impl OutputRegressor for OnnxRegressor {
    fn predict(&self, features: &[f32; FEATURE_COUNT]) -> Result<f64, ModelError> {
        let input = ndarray::Array2::from_shape_vec((1, FEATURE_COUNT), features.to_vec())
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        let input_tensor =
            Tensor::from_array(input).map_err(|e| ModelError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ModelError::Inference(format!("锁获取失败: {}", e)))?;
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let (_, data) = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| ModelError::Inference(format!("缺少输出: {}", self.output_name)))?
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        data.first()
            .map(|v| *v as f64)
            .ok_or_else(|| ModelError::Inference("输出为空".to_string()))
    }
}

#[cfg(not(feature = "onnx"))]
impl OutputRegressor for OnnxRegressor {
    fn predict(&self, _features: &[f32; FEATURE_COUNT]) -> Result<f64, ModelError> {
        Err(ModelError::Unavailable("未启用 onnx feature".to_string()))
    }
}
