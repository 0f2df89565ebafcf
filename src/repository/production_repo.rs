// ==========================================
// 成衣生产问答系统 - 生产日报数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化; 只读, 不建表不迁移
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::production::ProductionSnapshot;
use crate::domain::query::{BuiltQuery, MetricRow, SqlParam};
use crate::domain::types::GroupBy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::types::ToSqlOutput;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use std::sync::{Arc, Mutex};

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Text(s) => s.to_sql(),
            SqlParam::Integer(i) => i.to_sql(),
            SqlParam::Date(d) => d.to_sql(),
        }
    }
}

// ==========================================
// ProductionDataRepository - 生产日报仓储
// ==========================================
/// 生产日报仓储
/// 职责: production_data 表的只读查询
/// 用途: 词表加载 / 指标聚合 / 预测快照
pub struct ProductionDataRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionDataRepository {
    /// 创建新的 ProductionDataRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 词表相关
    // ==========================================

    /// 全部客户名 (去重, 排除空值)
    pub fn distinct_buyers(&self) -> RepositoryResult<Vec<String>> {
        self.distinct_text_column(
            "SELECT DISTINCT buyer_name FROM production_data WHERE buyer_name IS NOT NULL AND buyer_name <> '' ORDER BY buyer_name",
        )
    }

    /// 全部面料类型 (去重, 排除空值)
    pub fn distinct_fabrics(&self) -> RepositoryResult<Vec<String>> {
        self.distinct_text_column(
            "SELECT DISTINCT fabric_type FROM production_data WHERE fabric_type IS NOT NULL AND fabric_type <> '' ORDER BY fabric_type",
        )
    }

    fn distinct_text_column(&self, sql: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    /// 最近 N 条记录引用的款号 (按生产日期倒序, 未去重)
    ///
    /// # 说明
    /// - 去重与截断由调用方完成, 保持"最近出现"顺序
    pub fn recent_style_refs(&self, row_limit: usize) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT style_no
            FROM production_data
            WHERE style_no IS NOT NULL AND style_no <> ''
            ORDER BY production_date DESC
            LIMIT ?1
            "#,
        )?;
        let styles = stmt
            .query_map(params![row_limit as i64], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(styles)
    }

    /// 最大生产日期 (空表返回 None)
    pub fn max_production_date(&self) -> RepositoryResult<Option<NaiveDate>> {
        let conn = self.get_conn()?;
        let date = conn.query_row(
            "SELECT MAX(production_date) FROM production_data",
            [],
            |row| row.get::<_, Option<NaiveDate>>(0),
        )?;
        Ok(date)
    }

    // ==========================================
    // 预测相关
    // ==========================================

    /// 款号最新一条日报
    ///
    /// # 返回
    /// - Ok(None): 款号无历史记录
    pub fn find_latest_snapshot(&self, style_no: &str) -> RepositoryResult<Option<ProductionSnapshot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                order_no, buyer_name, style_no, order_quantity, production_date,
                day_target, day_achieved,
                hour_1, hour_2, hour_3, hour_4, hour_5, hour_6, hour_7, hour_8,
                fabric_type, planned_fabric_meters, actual_fabric_used,
                rejection, rework, line_no
            FROM production_data
            WHERE style_no = ?1
            ORDER BY production_date DESC
            LIMIT 1
            "#,
        )?;

        let snapshot = stmt
            .query_row(params![style_no], map_snapshot_row)
            .optional()?;
        Ok(snapshot)
    }

    /// 款号全历史累计完成数量
    pub fn cumulative_achieved(&self, style_no: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let total: Option<i64> = conn.query_row(
            "SELECT SUM(day_achieved) FROM production_data WHERE style_no = ?1",
            params![style_no],
            |row| row.get(0),
        )?;
        Ok(total.unwrap_or(0))
    }

    /// 款号最近 N 条记录的当日效率 (比值, 目标为 0 的记录记 0)
    pub fn recent_daily_efficiencies(
        &self,
        style_no: &str,
        window: usize,
    ) -> RepositoryResult<Vec<f64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                CASE WHEN IFNULL(day_target, 0) = 0 THEN 0.0
                     ELSE CAST(IFNULL(day_achieved, 0) AS REAL) / day_target END
            FROM production_data
            WHERE style_no = ?1
            ORDER BY production_date DESC
            LIMIT ?2
            "#,
        )?;
        let values = stmt
            .query_map(params![style_no, window as i64], |row| row.get::<_, f64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    // ==========================================
    // 指标聚合
    // ==========================================

    /// 执行 QueryBuilder 生成的聚合查询
    ///
    /// # 说明
    /// - 聚合值为 NULL 的行 (无匹配记录) 不返回
    /// - 列布局由 group_by 决定: [分组列,] 聚合值
    pub fn run_metric_query(&self, query: &BuiltQuery) -> RepositoryResult<Vec<MetricRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&query.sql)?;
        let group_by = query.group_by;

        let rows = stmt
            .query_map(params_from_iter(query.params.iter()), |row| {
                map_metric_row(row, group_by)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows.into_iter().flatten().collect())
    }
}

// ==========================================
// 行映射
// ==========================================

/// 映射 production_data 行
///
/// # 说明
/// - 数值列为 NULL 时按 0 处理, 仅此一处
fn map_snapshot_row(row: &Row<'_>) -> rusqlite::Result<ProductionSnapshot> {
    let int_or_zero = |idx: usize| -> rusqlite::Result<i64> {
        Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or(0))
    };
    let real_or_zero = |idx: usize| -> rusqlite::Result<f64> {
        Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or(0.0))
    };

    let mut hourly_output = [0i64; 8];
    for (i, slot) in hourly_output.iter_mut().enumerate() {
        *slot = int_or_zero(7 + i)?;
    }

    Ok(ProductionSnapshot {
        order_no: row.get(0)?,
        buyer_name: row.get(1)?,
        style_no: row.get(2)?,
        order_quantity: int_or_zero(3)?,
        production_date: row.get(4)?,
        day_target: int_or_zero(5)?,
        day_achieved: int_or_zero(6)?,
        hourly_output,
        fabric_type: row.get(15)?,
        planned_fabric_meters: real_or_zero(16)?,
        actual_fabric_used: real_or_zero(17)?,
        rejection: int_or_zero(18)?,
        rework: int_or_zero(19)?,
        line_no: int_or_zero(20)?,
    })
}

/// 映射聚合结果行; 聚合值为 NULL 时返回 None
fn map_metric_row(row: &Row<'_>, group_by: GroupBy) -> rusqlite::Result<Option<MetricRow>> {
    let (buyer_name, production_date, value_idx) = match group_by {
        GroupBy::None => (None, None, 0),
        GroupBy::Buyer => (row.get::<_, Option<String>>(0)?, None, 1),
        GroupBy::Date => (None, row.get::<_, Option<NaiveDate>>(0)?, 1),
    };

    let value: Option<f64> = row.get(value_idx)?;
    Ok(value.map(|value| MetricRow {
        buyer_name,
        production_date,
        value,
    }))
}
