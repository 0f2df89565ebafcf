// ==========================================
// 成衣生产问答系统 - 训练期标签编码表
// ==========================================
// 制品: encoders.json {"style_map": {...}, "buyer_map": {...}}
// 约束: 未见过的标签编码为 0
// ==========================================

use crate::model::error::{read_artifact, ModelError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoders {
    #[serde(default)]
    pub style_map: HashMap<String, i64>,
    #[serde(default)]
    pub buyer_map: HashMap<String, i64>,
}

impl LabelEncoders {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = read_artifact(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn encode_style(&self, style_no: &str) -> i64 {
        self.style_map.get(style_no).copied().unwrap_or(0)
    }

    pub fn encode_buyer(&self, buyer_name: Option<&str>) -> i64 {
        buyer_name
            .and_then(|b| self.buyer_map.get(b).copied())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_labels_encode_to_zero() {
        let enc: LabelEncoders = serde_json::from_str(
            r#"{"style_map": {"ST100": 4, "ST150": 9}, "buyer_map": {"Nike": 3}}"#,
        )
        .unwrap();
        assert_eq!(enc.encode_style("ST150"), 9);
        assert_eq!(enc.encode_style("ST999"), 0);
        assert_eq!(enc.encode_buyer(Some("Nike")), 3);
        assert_eq!(enc.encode_buyer(Some("Zara")), 0);
        assert_eq!(enc.encode_buyer(None), 0);
    }

    #[test]
    fn test_missing_maps_default_empty() {
        let enc: LabelEncoders = serde_json::from_str("{}").unwrap();
        assert_eq!(enc.encode_style("ST100"), 0);
    }
}
