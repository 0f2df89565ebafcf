// ==========================================
// 成衣生产问答系统 - 日期范围解析
// ==========================================
// 职责: 相对日期短语 -> 闭区间 [start, end]
// 约束: 以锚定日期为"今天", 不读取系统时间
// 规则: 按顺序匹配, 命中即返回
// ==========================================

use crate::domain::query::DateRange;
use chrono::{Days, NaiveDate};
use regex::Regex;

// ==========================================
// DateRangeResolver
// ==========================================
pub struct DateRangeResolver {
    /// "N months" 的天数换算
    month_days: u64,
    numeric: Regex,
}

impl DateRangeResolver {
    /// 创建解析器
    ///
    /// # 参数
    /// - month_days: 一个月按多少天计算
    pub fn new(month_days: i64) -> Result<Self, regex::Error> {
        Ok(Self {
            month_days: month_days.max(1) as u64,
            numeric: Regex::new(r"(?i)\b(?:(?:last|past|for)\s+)?(\d+)\s*(day|week|month)s?\b")?,
        })
    }

    /// 解析日期范围
    ///
    /// # 返回
    /// - None: 未识别到日期短语 (全部历史)
    pub fn resolve(&self, text: &str, anchor: NaiveDate) -> Option<DateRange> {
        let lowered = text.to_lowercase();

        // 规则1: N day(s)/week(s)/month(s)
        if let Some(range) = self.resolve_numeric(&lowered, anchor) {
            return Some(range);
        }

        // 规则2: yesterday
        if lowered.contains("yesterday") {
            let day = anchor.checked_sub_days(Days::new(1))?;
            return Some(DateRange::new(day, day));
        }

        // 规则3: last week
        if lowered.contains("last week") {
            return span_back(anchor, 7);
        }

        // 规则4: last month
        if lowered.contains("last month") {
            return span_back(anchor, self.month_days);
        }

        None
    }

    fn resolve_numeric(&self, lowered: &str, anchor: NaiveDate) -> Option<DateRange> {
        let caps = self.numeric.captures(lowered)?;
        let amount: u64 = caps.get(1)?.as_str().parse().ok()?;
        let unit_days = match caps.get(2)?.as_str() {
            "day" => 1,
            "week" => 7,
            _ => self.month_days,
        };

        let days = amount.checked_mul(unit_days)?;
        span_back(anchor, days)
    }
}

/// [anchor - days, anchor]; 越界时返回 None
fn span_back(anchor: NaiveDate, days: u64) -> Option<DateRange> {
    let start = anchor.checked_sub_days(Days::new(days))?;
    Some(DateRange::new(start, anchor))
}
