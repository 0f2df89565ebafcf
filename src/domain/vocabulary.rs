// ==========================================
// 成衣生产问答系统 - 词表
// ==========================================
// 职责: 已知客户/面料/款号 + 锚定日期
// 红线: 启动时构建,之后只读
// ==========================================

use crate::domain::types::VocabularySource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 内置客户列表 (词表加载失败时使用)
pub const DEFAULT_BUYERS: [&str; 7] = ["H&M", "Zara", "Gap", "Nike", "Adidas", "Puma", "Uniqlo"];

/// 内置面料列表
pub const DEFAULT_FABRICS: [&str; 5] = ["Single Jersey", "Fleece", "Rib", "Interlock", "Pique"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub buyers: Vec<String>,
    pub fabrics: Vec<String>,
    /// 最近活跃款号 (按最近出现顺序)
    pub styles: Vec<String>,
    /// 锚定日期: 相对日期的"今天"
    pub anchor_date: NaiveDate,
    pub source: VocabularySource,
}

impl Vocabulary {
    /// 内置默认词表
    pub fn defaults(anchor_date: NaiveDate) -> Self {
        Self {
            buyers: DEFAULT_BUYERS.iter().map(|s| s.to_string()).collect(),
            fabrics: DEFAULT_FABRICS.iter().map(|s| s.to_string()).collect(),
            styles: Vec::new(),
            anchor_date,
            source: VocabularySource::Defaults,
        }
    }

    /// 按给定值构建 (测试与重建场景)
    pub fn new(
        buyers: Vec<String>,
        fabrics: Vec<String>,
        styles: Vec<String>,
        anchor_date: NaiveDate,
    ) -> Self {
        Self {
            buyers,
            fabrics,
            styles,
            anchor_date,
            source: VocabularySource::Storage,
        }
    }
}
