// ==========================================
// 成衣生产问答系统 - 意图识别
// ==========================================
// 职责: 查询文本 -> Intent
// 主路径: 文本分类模型 + 标签映射表
// 回退: 有序关键词表 (模型缺失或推理失败)
// ==========================================

use crate::domain::types::Intent;
use crate::model::classifier::TextClassifier;
use std::sync::Arc;

/// 模型标签 -> 意图
const LABEL_TABLE: [(&str, Intent); 7] = [
    ("EFFICIENCY", Intent::Efficiency),
    ("WASTAGE", Intent::Wastage),
    ("PRODUCTION", Intent::Production),
    ("REJECTION", Intent::Rejection),
    ("TARGET_GAP", Intent::TargetGap),
    ("PREDICTION", Intent::Predict),
    ("GENERAL", Intent::Production),
];

/// 回退关键词 (按顺序, 首个命中即返回)
const KEYWORD_TABLE: [(&str, Intent); 10] = [
    ("efficiency", Intent::Efficiency),
    ("wastage", Intent::Wastage),
    ("performance", Intent::Production),
    ("target gap", Intent::TargetGap),
    ("rejection", Intent::Rejection),
    ("production", Intent::Production),
    ("predict", Intent::Predict),
    ("forecast", Intent::Predict),
    ("finish", Intent::Predict),
    ("complete", Intent::Predict),
];

// ==========================================
// IntentClassifier
// ==========================================
pub struct IntentClassifier {
    model: Option<Arc<dyn TextClassifier>>,
}

impl IntentClassifier {
    /// 创建意图识别器
    ///
    /// # 参数
    /// - model: 文本分类模型; None 时只用关键词
    pub fn new(model: Option<Arc<dyn TextClassifier>>) -> Self {
        Self { model }
    }

    /// 仅关键词模式
    pub fn keyword_only() -> Self {
        Self { model: None }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// 识别意图 (不会失败, 无法识别时为 Production)
    pub fn classify(&self, text: &str) -> Intent {
        let lowered = text.to_lowercase();

        let Some(model) = &self.model else {
            return keyword_intent(&lowered);
        };

        match model.predict_label(&lowered) {
            Ok(label) => label_to_intent(&label),
            Err(e) => {
                tracing::warn!(error = %e, "意图模型推理失败, 使用关键词回退");
                keyword_intent(&lowered)
            }
        }
    }
}

/// 标签映射; 未知标签为 Production
pub fn label_to_intent(label: &str) -> Intent {
    LABEL_TABLE
        .iter()
        .find(|(name, _)| *name == label.trim())
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Production)
}

/// 关键词回退
///
/// # 参数
/// - lowered: 已小写的查询文本
pub fn keyword_intent(lowered: &str) -> Intent {
    KEYWORD_TABLE
        .iter()
        .find(|(kw, _)| lowered.contains(kw))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Production)
}
