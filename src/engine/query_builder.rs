// ==========================================
// 成衣生产问答系统 - 指标查询构建器
// ==========================================
// 职责: 意图 + 过滤条件 + 日期范围 -> 参数化聚合 SQL
// 约束: 占位符个数 == 参数个数, 顺序一致
// ==========================================

use crate::db::PRODUCTION_TABLE;
use crate::domain::query::{BuiltQuery, ParsedQuery, SqlParam};
use crate::domain::types::{GroupBy, Intent};
use crate::engine::sql_builder::SqlQueryBuilder;

/// 单个指标的聚合表达式与结果列别名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    pub expression: &'static str,
    pub alias: &'static str,
}

// 分母为 0 时 NULLIF 产生 NULL, AVG 自动跳过
const EFFICIENCY: MetricSpec = MetricSpec {
    expression: "AVG(day_achieved * 100.0 / NULLIF(day_target, 0))",
    alias: "efficiency",
};
const WASTAGE: MetricSpec = MetricSpec {
    expression:
        "AVG((actual_fabric_used - planned_fabric_meters) * 100.0 / NULLIF(planned_fabric_meters, 0))",
    alias: "wastage",
};
const PRODUCTION: MetricSpec = MetricSpec {
    expression: "SUM(day_achieved)",
    alias: "total_production",
};
const TARGET_GAP: MetricSpec = MetricSpec {
    expression: "SUM(day_target - day_achieved)",
    alias: "target_gap",
};
const REJECTION: MetricSpec = MetricSpec {
    expression: "SUM(rejection)",
    alias: "total_rejection",
};

/// 意图对应的聚合; 非指标意图按产量处理
pub fn metric_spec(intent: Intent) -> MetricSpec {
    match intent {
        Intent::Efficiency => EFFICIENCY,
        Intent::Wastage => WASTAGE,
        Intent::TargetGap => TARGET_GAP,
        Intent::Rejection => REJECTION,
        Intent::Production | Intent::Predict | Intent::RiskOverview => PRODUCTION,
    }
}

// ==========================================
// 分组短语
// ==========================================
const BUYER_GROUP_PHRASES: [&str; 7] = [
    "by buyer",
    "per buyer",
    "each buyer",
    "buyer wise",
    "buyer-wise",
    "which buyer",
    "best buyer",
];
const DATE_GROUP_PHRASES: [&str; 6] = ["daily", "by day", "by date", "per day", "day wise", "trend"];

/// 识别分组短语 (客户优先于日期)
///
/// # 参数
/// - lowered: 已小写的查询文本
pub fn detect_group_by(lowered: &str) -> GroupBy {
    if BUYER_GROUP_PHRASES.iter().any(|p| lowered.contains(p)) {
        GroupBy::Buyer
    } else if DATE_GROUP_PHRASES.iter().any(|p| lowered.contains(p)) {
        GroupBy::Date
    } else {
        GroupBy::None
    }
}

// ==========================================
// QueryBuilder
// ==========================================
pub struct QueryBuilder {}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {}
    }

    /// 构建聚合查询
    ///
    /// # 参数
    /// - parsed: 解析结果 (指标 / 过滤条件 / 日期范围 / 分组)
    ///
    /// # 返回
    /// BuiltQuery: SQL + 按占位符顺序排列的参数
    pub fn build(&self, parsed: &ParsedQuery) -> BuiltQuery {
        let spec = metric_spec(parsed.metric);

        let select = match parsed.group_by.column() {
            Some(col) => format!(
                "SELECT {}, {} AS {} FROM {}",
                col, spec.expression, spec.alias, PRODUCTION_TABLE
            ),
            None => format!(
                "SELECT {} AS {} FROM {}",
                spec.expression, spec.alias, PRODUCTION_TABLE
            ),
        };

        let mut builder = SqlQueryBuilder::new(&select).where_clause("1=1");

        if let Some(range) = &parsed.date_range {
            builder = builder.and_params(
                "production_date BETWEEN ? AND ?",
                [SqlParam::Date(range.start), SqlParam::Date(range.end)],
            );
        }

        for (kind, value) in parsed.filters.entries() {
            builder = builder.and_param(&format!("{} = ?", kind.column()), value.into());
        }

        if let Some(col) = parsed.group_by.column() {
            builder = builder.group_by(col).order_by(&format!("{} ASC", col));
        }

        let (sql, params) = builder.build();

        BuiltQuery {
            sql,
            params,
            value_column: spec.alias,
            group_by: parsed.group_by,
        }
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{DateRange, Filters};
    use chrono::NaiveDate;

    fn parsed(metric: Intent, filters: Filters, date_range: Option<DateRange>) -> ParsedQuery {
        ParsedQuery {
            metric,
            filters,
            date_range,
            group_by: GroupBy::None,
        }
    }

    #[test]
    fn test_all_time_has_no_date_predicate() {
        let q = QueryBuilder::new().build(&parsed(Intent::Rejection, Filters::default(), None));
        assert_eq!(
            q.sql,
            "SELECT SUM(rejection) AS total_rejection FROM production_data WHERE 1=1"
        );
        assert!(q.params.is_empty());
        assert_eq!(q.value_column, "total_rejection");
    }

    #[test]
    fn test_date_then_filters_in_declaration_order() {
        let filters = Filters {
            buyer_name: Some("Adidas".to_string()),
            line_no: Some(4),
            fabric_type: Some("Rib".to_string()),
            ..Default::default()
        };
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 12, 24).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        let q = QueryBuilder::new().build(&parsed(Intent::Efficiency, filters, Some(range)));

        assert!(q.sql.ends_with(
            "WHERE 1=1 AND production_date BETWEEN ? AND ? AND buyer_name = ? AND line_no = ? AND fabric_type = ?"
        ));
        assert_eq!(q.placeholder_count(), q.params.len());
        assert_eq!(q.params[0], SqlParam::Date(range.start));
        assert_eq!(q.params[1], SqlParam::Date(range.end));
        assert_eq!(q.params[2], SqlParam::Text("Adidas".to_string()));
        assert_eq!(q.params[3], SqlParam::Integer(4));
    }

    #[test]
    fn test_non_metric_intent_uses_production() {
        let q = QueryBuilder::new().build(&parsed(Intent::Predict, Filters::default(), None));
        assert_eq!(q.value_column, "total_production");
    }

    #[test]
    fn test_grouping_adds_no_params() {
        let mut p = parsed(Intent::Efficiency, Filters::default(), None);
        p.group_by = GroupBy::Buyer;
        let q = QueryBuilder::new().build(&p);
        assert!(q.sql.starts_with("SELECT buyer_name, AVG("));
        assert!(q.sql.ends_with("GROUP BY buyer_name ORDER BY buyer_name ASC"));
        assert_eq!(q.placeholder_count(), 0);
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_detect_group_by() {
        assert_eq!(detect_group_by("efficiency by buyer last week"), GroupBy::Buyer);
        assert_eq!(detect_group_by("daily production for nike"), GroupBy::Date);
        assert_eq!(detect_group_by("total rejection"), GroupBy::None);
    }
}
