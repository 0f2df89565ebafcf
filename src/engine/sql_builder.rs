// ==========================================
// 成衣生产问答系统 - SQL 构建工具
// ==========================================
// 职责: 流式拼装 SELECT, 条件与参数同步追加
// 红线: 值只能走绑定参数, 不拼进 SQL 文本
// ==========================================

use crate::domain::query::SqlParam;

/// SQL 查询构建器 (流式 API)
///
/// # 示例
/// ```
/// use garment_insight::engine::sql_builder::SqlQueryBuilder;
/// use garment_insight::domain::query::SqlParam;
///
/// let (sql, params) = SqlQueryBuilder::new("SELECT SUM(rejection) FROM production_data")
///     .where_clause("1=1")
///     .and_param("buyer_name = ?", SqlParam::Text("Nike".to_string()))
///     .build();
///
/// assert_eq!(sql, "SELECT SUM(rejection) FROM production_data WHERE 1=1 AND buyer_name = ?");
/// assert_eq!(params.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SqlQueryBuilder {
    select_clause: String,
    where_clauses: Vec<String>,
    params: Vec<SqlParam>,
    group_by_clause: Option<String>,
    order_by_clause: Option<String>,
    limit_clause: Option<usize>,
}

impl SqlQueryBuilder {
    /// 创建新的 SQL 查询构建器
    pub fn new(select: &str) -> Self {
        Self {
            select_clause: select.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_clause: None,
            order_by_clause: None,
            limit_clause: None,
        }
    }

    /// 添加不带参数的 WHERE 条件
    pub fn where_clause(mut self, condition: &str) -> Self {
        self.where_clauses.push(condition.to_string());
        self
    }

    /// 添加带参数的条件; 条件中的 `?` 个数必须与参数个数一致
    pub fn and_params(mut self, condition: &str, params: impl IntoIterator<Item = SqlParam>) -> Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params);
        self
    }

    /// 添加单参数条件
    pub fn and_param(self, condition: &str, param: SqlParam) -> Self {
        self.and_params(condition, [param])
    }

    /// 添加 GROUP BY 子句
    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by_clause = Some(column.to_string());
        self
    }

    /// 添加 ORDER BY 子句
    pub fn order_by(mut self, order: &str) -> Self {
        self.order_by_clause = Some(order.to_string());
        self
    }

    /// 添加 LIMIT 子句
    pub fn limit(mut self, n: usize) -> Self {
        self.limit_clause = Some(n);
        self
    }

    /// 构建最终的 SQL 语句与绑定参数
    pub fn build(self) -> (String, Vec<SqlParam>) {
        let mut sql = self.select_clause;

        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(group) = &self.group_by_clause {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }

        if let Some(order) = &self.order_by_clause {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        if let Some(limit) = self.limit_clause {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        (sql, self.params)
    }
}
