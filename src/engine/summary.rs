// ==========================================
// 成衣生产问答系统 - 洞察摘要引擎
// ==========================================
// 职责: 查询结果 / 预测结果 -> 自然语言摘要 + 建议
// 输出: 面向用户的英文文本
// ==========================================

use crate::config::PipelineConfig;
use crate::domain::prediction::{PredictionResult, RiskReport};
use crate::domain::query::{Filters, MetricRow};
use crate::domain::types::Intent;
use serde::{Deserialize, Serialize};

pub const NO_DATA_MESSAGE: &str = "No data found for the given criteria.";
pub const NO_ACTIVE_RISKS_MESSAGE: &str = "No active order risks detected at the moment.";

/// 摘要结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub summary_text: String,
    pub recommendations: Vec<String>,
    pub data_points: usize,
}

// ==========================================
// SummaryEngine
// ==========================================
pub struct SummaryEngine {
    efficiency_alert_pct: f64,
    wastage_alert_pct: f64,
    wastage_breach_pct: f64,
}

impl SummaryEngine {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            efficiency_alert_pct: config.efficiency_alert_pct,
            wastage_alert_pct: config.wastage_alert_pct,
            wastage_breach_pct: config.wastage_breach_pct,
        }
    }

    /// 生成查询结果摘要
    ///
    /// # 参数
    /// - rows: 聚合结果 (已剔除 NULL)
    /// - metric: 指标意图
    /// - filters: 用于前缀说明的过滤条件
    pub fn summarize(&self, rows: &[MetricRow], metric: Intent, filters: &Filters) -> InsightSummary {
        if rows.is_empty() {
            return InsightSummary {
                summary_text: NO_DATA_MESSAGE.to_string(),
                recommendations: Vec::new(),
                data_points: 0,
            };
        }

        let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let total: f64 = values.iter().sum();

        let mut insights = Vec::new();
        let mut recommendations = Vec::new();

        match metric {
            Intent::Efficiency => {
                let max = values.iter().cloned().fold(f64::MIN, f64::max);
                let min = values.iter().cloned().fold(f64::MAX, f64::min);
                insights.push(format!("The average line efficiency was {:.2}%.", mean));
                insights.push(format!(
                    "The best performance was {:.2}% and the lowest was {:.2}%.",
                    max, min
                ));
                if let Some(buyer) = best_buyer(rows) {
                    insights.push(format!("The best performing buyer was {}.", buyer));
                }
                if mean < self.efficiency_alert_pct {
                    recommendations.push(format!(
                        "Efficiency is below {}%. Investigate line bottlenecks and operator training.",
                        self.efficiency_alert_pct
                    ));
                }
            }
            Intent::Wastage => {
                insights.push(format!("Average fabric wastage observed is {:.2}%.", mean));
                let breaches = values.iter().filter(|v| **v > self.wastage_breach_pct).count();
                if breaches > 0 {
                    insights.push(format!(
                        "Warning: {} instances detected with >{}% wastage.",
                        breaches, self.wastage_breach_pct
                    ));
                }
                if mean > self.wastage_alert_pct {
                    recommendations.push(format!(
                        "Fabric wastage > {}%. Check cutting markers and roll utilization.",
                        self.wastage_alert_pct
                    ));
                }
            }
            Intent::Rejection => {
                // 次品件数不加千分位
                insights.push(format!("Total rejected pieces found: {}.", total.round() as i64));
            }
            Intent::TargetGap => {
                insights.push(format!("Total target gap is {} pieces.", format_thousands(total)));
            }
            Intent::Production | Intent::Predict | Intent::RiskOverview => {
                insights.push(format!("Total production quantity is {}.", format_thousands(total)));
            }
        }

        if let Some(prefix) = context_prefix(filters) {
            insights.insert(0, prefix);
        }

        InsightSummary {
            summary_text: insights.join(" "),
            recommendations,
            data_points: rows.len(),
        }
    }

    /// 单款预测摘要
    pub fn summarize_prediction(&self, result: &PredictionResult) -> String {
        [
            format!("Prediction for {}:", result.style_no),
            format!("- Estimated Completion: In {:.1} days.", result.estimated_days),
            format!("- Risk Level: {}", result.risk),
            format!("- Remaining Qty: {} pcs", result.remaining_qty),
            format!("- Current Rate: {} pcs/day", result.predicted_daily_rate.trunc() as i64),
        ]
        .join("\n")
    }

    /// 风险总览摘要
    pub fn summarize_risk_report(&self, report: &RiskReport) -> String {
        if report.is_empty() {
            return NO_ACTIVE_RISKS_MESSAGE.to_string();
        }

        let mut lines = vec![
            "Risk Overview (Active Orders):".to_string(),
            "Here are the completion estimates for the currently active styles:".to_string(),
        ];
        for p in &report.styles {
            lines.push(format!(
                "- {}: {:.1} days, {} risk, {} pcs remaining",
                p.style_no, p.estimated_days, p.risk, p.remaining_qty
            ));
        }
        lines.join("\n")
    }
}

/// 按客户均值选出最佳客户 (并列时取先出现者)
fn best_buyer(rows: &[MetricRow]) -> Option<String> {
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();
    for row in rows {
        let Some(buyer) = row.buyer_name.as_deref() else {
            continue;
        };
        match groups.iter_mut().find(|(name, _, _)| *name == buyer) {
            Some(entry) => {
                entry.1 += row.value;
                entry.2 += 1;
            }
            None => groups.push((buyer, row.value, 1)),
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (name, sum, count) in groups {
        let avg = sum / count as f64;
        match best {
            Some((_, best_avg)) if avg <= best_avg => {}
            _ => best = Some((name, avg)),
        }
    }
    best.map(|(name, _)| name.to_string())
}

/// 过滤条件前缀: "For Buyer **X**, For Fabric **Y**:"
fn context_prefix(filters: &Filters) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(buyer) = &filters.buyer_name {
        parts.push(format!("For Buyer **{}**", buyer));
    }
    if let Some(fabric) = &filters.fabric_type {
        parts.push(format!("For Fabric **{}**", fabric));
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("{}:", parts.join(", ")))
    }
}

/// 整数千分位格式化 (四舍五入)
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if rounded < 0 {
        format!("-{}", out)
    } else {
        out
    }
}
