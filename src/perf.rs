// ==========================================
// 成衣生产问答系统 - 性能统计
// ==========================================
// 职责: API 入口耗时 / SQL 语句计数 / 慢 SQL 与慢请求日志
// 开关: GARMENT_INSIGHT_PERF_SQL / GARMENT_INSIGHT_SLOW_SQL_MS / GARMENT_INSIGHT_SLOW_OP_MS
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static PERF_SQL_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);
static SLOW_OP_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static PERF_DEPTH: Cell<u32> = Cell::new(0);
    static SQL_COUNT: Cell<u64> = Cell::new(0);
    static SLOW_SQL_COUNT: Cell<u64> = Cell::new(0);
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

fn env_millis(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<u64>().ok())
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.trim().replace('\n', " ");
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s,
    }
}

/// 安装 SQLite 语句 trace/profile（用于 SQL 计数 + 慢查询日志）
///
/// 开关：
/// - Debug 默认开启；Release 默认关闭（可通过环境变量开启）
/// - `GARMENT_INSIGHT_PERF_SQL=1` 强制开启
/// - `GARMENT_INSIGHT_SLOW_SQL_MS=50` 配置慢 SQL 阈值（毫秒）
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = match std::env::var("GARMENT_INSIGHT_PERF_SQL") {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    };

    PERF_SQL_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        conn.trace(None);
        conn.profile(None);
        return;
    }

    // 聚合查询扫全表较常见, 默认阈值比点查宽松
    let slow_ms = env_millis("GARMENT_INSIGHT_SLOW_SQL_MS")
        .unwrap_or(if cfg!(debug_assertions) { 100 } else { 500 });
    SLOW_SQL_THRESHOLD_MS.store(slow_ms, Ordering::Relaxed);

    // 风险总览会逐款预测, 单次请求阈值按 SQL 阈值放大
    let slow_op_ms = env_millis("GARMENT_INSIGHT_SLOW_OP_MS").unwrap_or(slow_ms * 10);
    SLOW_OP_THRESHOLD_MS.store(slow_op_ms, Ordering::Relaxed);

    conn.trace(Some(sql_trace_callback));
    conn.profile(Some(sql_profile_callback));
}

fn sql_trace_callback(_sql: &str) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let active = PERF_DEPTH.with(|d| d.get() > 0);
    if !active {
        return;
    }
    SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
}

fn sql_profile_callback(sql: &str, duration: Duration) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold > 0 && ms >= threshold {
        let sql_short = truncate_sql(sql, 420);
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %sql_short,
            "slow sql"
        );
        let active = PERF_DEPTH.with(|d| d.get() > 0);
        if active {
            SLOW_SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
        }
    }
}

/// 阈值为 0 表示不判定慢请求
fn is_slow_op(elapsed_ms: u64, threshold_ms: u64) -> bool {
    threshold_ms > 0 && elapsed_ms >= threshold_ms
}

/// 性能统计 Guard：记录 elapsed_ms + SQL 语句数 + 慢 SQL 数
///
/// 使用方式：
/// ```ignore
/// let _perf = garment_insight::perf::PerfGuard::new("api.ask");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
    slow_sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        let sql_start = SQL_COUNT.with(|c| c.get());
        let slow_sql_start = SLOW_SQL_COUNT.with(|c| c.get());
        Self {
            op,
            start: Instant::now(),
            sql_start,
            slow_sql_start,
        }
    }

    /// 当前 guard 范围内已执行的 SQL 数
    pub fn sql_count(&self) -> u64 {
        SQL_COUNT
            .with(|c| c.get())
            .saturating_sub(self.sql_start)
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let slow_sql_end = SLOW_SQL_COUNT.with(|c| c.get());
        let sql_count = self.sql_count();
        let slow_sql_count = slow_sql_end.saturating_sub(self.slow_sql_start);

        if is_slow_op(elapsed_ms, SLOW_OP_THRESHOLD_MS.load(Ordering::Relaxed)) {
            tracing::warn!(
                target: "perf",
                op = self.op,
                elapsed_ms,
                sql_count,
                slow_sql_count,
                "请求耗时超过阈值"
            );
        } else {
            tracing::info!(
                target: "perf",
                op = self.op,
                elapsed_ms,
                sql_count,
                slow_sql_count,
                "done"
            );
        }

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_sql_keeps_short_statements() {
        assert_eq!(truncate_sql("SELECT 1\nFROM t", 100), "SELECT 1 FROM t");
        assert_eq!(truncate_sql("SELECT 12345", 6), "SELECT…");
    }

    #[test]
    fn test_slow_op_threshold() {
        assert!(!is_slow_op(5_000, 0));
        assert!(!is_slow_op(999, 1_000));
        assert!(is_slow_op(1_000, 1_000));
    }

    #[test]
    fn test_nested_guards_count_sql() {
        let outer = PerfGuard::new("test.outer");
        SQL_COUNT.with(|c| c.set(c.get() + 2));
        {
            let inner = PerfGuard::new("test.inner");
            SQL_COUNT.with(|c| c.set(c.get() + 1));
            assert_eq!(inner.sql_count(), 1);
        }
        assert_eq!(outer.sql_count(), 3);
    }

    #[test]
    fn test_is_true_variants() {
        assert!(is_true(" YES "));
        assert!(is_true("1"));
        assert!(!is_true("off"));
    }
}
