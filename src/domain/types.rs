// ==========================================
// 成衣生产问答系统 - 领域类型定义
// ==========================================
// 职责: 意图、风险等级、过滤维度等封闭枚举
// 红线: 枚举集合封闭,不接受运行期扩展
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 查询意图 (Intent)
// ==========================================
// 序列化格式与对外 parsed_query.metric 保持一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    #[serde(rename = "efficiency")]
    Efficiency, // 线效率
    #[serde(rename = "wastage")]
    Wastage, // 面料损耗
    #[serde(rename = "production")]
    Production, // 产量
    #[serde(rename = "rejection")]
    Rejection, // 次品
    #[serde(rename = "target gap")]
    TargetGap, // 目标差额
    #[serde(rename = "predict")]
    Predict, // 交期预测
    #[serde(rename = "risk_overview")]
    RiskOverview, // 风险总览
}

impl Intent {
    /// 对外展示的指标名
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Efficiency => "efficiency",
            Intent::Wastage => "wastage",
            Intent::Production => "production",
            Intent::Rejection => "rejection",
            Intent::TargetGap => "target gap",
            Intent::Predict => "predict",
            Intent::RiskOverview => "risk_overview",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 交期风险等级 (Risk Level)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,    // 3天内可完成
    Medium, // 3~7天
    High,   // 超过7天
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

// ==========================================
// 过滤维度 (Filter Kind)
// ==========================================
// 声明顺序即 SQL 谓词追加顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    BuyerName,
    StyleNo,
    LineNo,
    FabricType,
}

impl FilterKind {
    /// 按声明顺序的全部过滤维度
    pub const ALL: [FilterKind; 4] = [
        FilterKind::BuyerName,
        FilterKind::StyleNo,
        FilterKind::LineNo,
        FilterKind::FabricType,
    ];

    /// 对应 production_data 列名
    pub fn column(&self) -> &'static str {
        match self {
            FilterKind::BuyerName => "buyer_name",
            FilterKind::StyleNo => "style_no",
            FilterKind::LineNo => "line_no",
            FilterKind::FabricType => "fabric_type",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

// ==========================================
// 分组维度 (Group By)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    None,
    Buyer, // 按客户
    Date,  // 按生产日期
}

impl GroupBy {
    /// 分组列名
    pub fn column(&self) -> Option<&'static str> {
        match self {
            GroupBy::None => None,
            GroupBy::Buyer => Some("buyer_name"),
            GroupBy::Date => Some("production_date"),
        }
    }
}

// ==========================================
// 词表来源 (Vocabulary Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VocabularySource {
    Storage,  // 从 production_data 加载
    Defaults, // 加载失败后的内置词表
}

impl fmt::Display for VocabularySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VocabularySource::Storage => write!(f, "STORAGE"),
            VocabularySource::Defaults => write!(f, "DEFAULTS"),
        }
    }
}
