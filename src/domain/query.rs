// ==========================================
// 成衣生产问答系统 - 查询解析领域模型
// ==========================================
// 职责: 过滤条件 / 日期范围 / 解析结果 / SQL 参数
// 红线: 只承载数据,不含解析规则
// ==========================================

use crate::domain::types::{FilterKind, GroupBy, Intent};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

// ==========================================
// Filters - 过滤条件
// ==========================================
// 只有命中的维度才有值; line_no 为整数,其余为字符串
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_no: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric_type: Option<String>,
}

/// 单个过滤值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
}

impl Filters {
    /// 读取某一维度的过滤值
    pub fn get(&self, kind: FilterKind) -> Option<FilterValue> {
        match kind {
            FilterKind::BuyerName => self.buyer_name.clone().map(FilterValue::Text),
            FilterKind::StyleNo => self.style_no.clone().map(FilterValue::Text),
            FilterKind::LineNo => self.line_no.map(FilterValue::Integer),
            FilterKind::FabricType => self.fabric_type.clone().map(FilterValue::Text),
        }
    }

    /// 按声明顺序列出已命中的过滤条件
    pub fn entries(&self) -> Vec<(FilterKind, FilterValue)> {
        FilterKind::ALL
            .iter()
            .filter_map(|kind| self.get(*kind).map(|v| (*kind, v)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 是否存在款号以外的过滤条件 (客户/线号/面料)
    ///
    /// 预测意图找不到款号时,据此区分"产量查询"和"风险总览"
    pub fn has_non_style_filter(&self) -> bool {
        self.buyer_name.is_some() || self.line_no.is_some() || self.fabric_type.is_some()
    }
}

// ==========================================
// DateRange - 闭区间日期范围
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// None 序列化为 "All Time"
fn serialize_date_scope<S>(range: &Option<DateRange>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match range {
        Some(r) => r.serialize(serializer),
        None => serializer.serialize_str("All Time"),
    }
}

// ==========================================
// ParsedQuery - 查询解析结果
// ==========================================
// 用途: 返回给调用方,便于排查解析过程
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQuery {
    pub metric: Intent,
    pub filters: Filters,
    #[serde(serialize_with = "serialize_date_scope")]
    pub date_range: Option<DateRange>,
    pub group_by: GroupBy,
}

// ==========================================
// SqlParam - 绑定参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

impl From<FilterValue> for SqlParam {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Text(s) => SqlParam::Text(s),
            FilterValue::Integer(i) => SqlParam::Integer(i),
        }
    }
}

// ==========================================
// BuiltQuery - 构建完成的参数化查询
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
    /// 聚合结果列别名 (efficiency / wastage / total_production ...)
    pub value_column: &'static str,
    pub group_by: GroupBy,
}

impl BuiltQuery {
    /// SQL 文本中的占位符数量
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

// ==========================================
// MetricRow - 聚合查询结果行
// ==========================================
// 聚合值为 NULL 的行在仓储层已剔除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub buyer_name: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub value: f64,
}

impl MetricRow {
    /// 只有聚合值的行
    pub fn value_only(value: f64) -> Self {
        Self {
            buyer_name: None,
            production_date: None,
            value,
        }
    }

    /// 转为表格行 (列名使用聚合别名)
    pub fn to_table_row(&self, value_column: &str) -> Value {
        let mut map = Map::new();
        if let Some(buyer) = &self.buyer_name {
            map.insert("buyer_name".to_string(), json!(buyer));
        }
        if let Some(date) = &self.production_date {
            map.insert("production_date".to_string(), json!(date.to_string()));
        }
        map.insert(value_column.to_string(), json!(self.value));
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_entries_follow_declaration_order() {
        let filters = Filters {
            buyer_name: Some("Nike".to_string()),
            style_no: None,
            line_no: Some(4),
            fabric_type: Some("Rib".to_string()),
        };

        let kinds: Vec<FilterKind> = filters.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![FilterKind::BuyerName, FilterKind::LineNo, FilterKind::FabricType]
        );
        assert!(filters.has_non_style_filter());
    }

    #[test]
    fn test_parsed_query_serializes_all_time() {
        let parsed = ParsedQuery {
            metric: Intent::Production,
            filters: Filters::default(),
            date_range: None,
            group_by: GroupBy::None,
        };

        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value["date_range"], json!("All Time"));
        assert_eq!(value["metric"], json!("production"));
        assert_eq!(value["filters"], json!({}));
    }

    #[test]
    fn test_parsed_query_serializes_range() {
        let parsed = ParsedQuery {
            metric: Intent::Efficiency,
            filters: Filters {
                line_no: Some(3),
                ..Default::default()
            },
            date_range: Some(DateRange::new(
                NaiveDate::from_ymd_opt(2024, 12, 24).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            )),
            group_by: GroupBy::None,
        };

        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value["date_range"]["start"], json!("2024-12-24"));
        assert_eq!(value["date_range"]["end"], json!("2024-12-31"));
        assert_eq!(value["filters"]["line_no"], json!(3));
    }

    #[test]
    fn test_metric_row_table_shape() {
        let row = MetricRow {
            buyer_name: Some("Zara".to_string()),
            production_date: None,
            value: 71.5,
        };
        let value = row.to_table_row("efficiency");
        assert_eq!(value, json!({"buyer_name": "Zara", "efficiency": 71.5}));
    }
}
