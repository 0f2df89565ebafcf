// ==========================================
// 成衣生产问答系统 - 查询解释器
// ==========================================
// 职责: 编排 意图识别 -> 过滤抽取 -> 日期解析 -> SQL 构建
// 输出: Interpretation (SQL 查询 / 单款预测 / 风险总览)
// 红线: 不访问存储; 词表在构建时固定
// ==========================================

use crate::config::PipelineConfig;
use crate::domain::query::{BuiltQuery, Filters, ParsedQuery};
use crate::domain::types::{GroupBy, Intent};
use crate::domain::vocabulary::Vocabulary;
use crate::engine::date_range::DateRangeResolver;
use crate::engine::error::EngineResult;
use crate::engine::filter_extractor::FilterExtractor;
use crate::engine::intent::IntentClassifier;
use crate::engine::query_builder::{detect_group_by, QueryBuilder};

/// 解释结果
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// 聚合查询
    Sql { parsed: ParsedQuery, query: BuiltQuery },
    /// 单款交期预测
    Prediction { style_no: String, parsed: ParsedQuery },
    /// 无款号无过滤条件的预测问题
    RiskOverview { parsed: ParsedQuery },
}

impl Interpretation {
    pub fn parsed(&self) -> &ParsedQuery {
        match self {
            Interpretation::Sql { parsed, .. }
            | Interpretation::Prediction { parsed, .. }
            | Interpretation::RiskOverview { parsed } => parsed,
        }
    }

    /// 对外 response_type
    pub fn kind(&self) -> &'static str {
        match self {
            Interpretation::Sql { .. } => "sql",
            Interpretation::Prediction { .. } => "prediction",
            Interpretation::RiskOverview { .. } => "risk_overview",
        }
    }
}

// ==========================================
// QueryInterpreter
// ==========================================
pub struct QueryInterpreter {
    vocabulary: Vocabulary,
    intent: IntentClassifier,
    filters: FilterExtractor,
    dates: DateRangeResolver,
    builder: QueryBuilder,
}

impl QueryInterpreter {
    /// 由词表构建解释器
    ///
    /// # 参数
    /// - vocabulary: 已加载的词表
    /// - intent: 意图识别器 (可带模型)
    /// - config: 流水线配置
    pub fn new(
        vocabulary: Vocabulary,
        intent: IntentClassifier,
        config: &PipelineConfig,
    ) -> EngineResult<Self> {
        let filters = FilterExtractor::from_vocabulary(&vocabulary)?;
        let dates = DateRangeResolver::new(config.month_days)?;

        Ok(Self {
            vocabulary,
            intent,
            filters,
            dates,
            builder: QueryBuilder::new(),
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// 解释查询文本
    pub fn interpret(&self, text: &str) -> Interpretation {
        let lowered = text.to_lowercase();
        let mut metric = self.intent.classify(text);
        let filters = self.filters.extract(text);

        if metric == Intent::Predict {
            let style = filters
                .style_no
                .clone()
                .or_else(|| self.filters.extract_style_permissive(text));

            match style {
                Some(style_no) => {
                    tracing::debug!(style_no = %style_no, "识别为单款预测");
                    return Interpretation::Prediction {
                        style_no,
                        parsed: ParsedQuery {
                            metric: Intent::Predict,
                            filters,
                            date_range: None,
                            group_by: GroupBy::None,
                        },
                    };
                }
                None if filters.has_non_style_filter() => {
                    tracing::debug!("预测意图无款号但有过滤条件, 按产量查询");
                    metric = Intent::Production;
                }
                None => {
                    tracing::debug!("预测意图无款号无过滤条件, 转风险总览");
                    return Interpretation::RiskOverview {
                        parsed: ParsedQuery {
                            metric: Intent::RiskOverview,
                            filters: Filters::default(),
                            date_range: None,
                            group_by: GroupBy::None,
                        },
                    };
                }
            }
        }

        let parsed = ParsedQuery {
            metric,
            filters,
            date_range: self.dates.resolve(&lowered, self.vocabulary.anchor_date),
            group_by: detect_group_by(&lowered),
        };
        let query = self.builder.build(&parsed);

        tracing::debug!(metric = %parsed.metric, sql = %query.sql, "查询解释完成");
        Interpretation::Sql { parsed, query }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{DateRange, SqlParam};
    use chrono::NaiveDate;

    fn interpreter() -> QueryInterpreter {
        let vocab = Vocabulary::new(
            vec!["Adidas".into(), "Nike".into()],
            vec!["Rib".into()],
            vec!["ST150".into(), "ST120".into()],
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        QueryInterpreter::new(vocab, IntentClassifier::keyword_only(), &PipelineConfig::default())
            .unwrap()
    }

    #[test]
    fn test_adidas_last_7_days() {
        let result = interpreter().interpret("Adidas last 7 days");
        let Interpretation::Sql { parsed, query } = result else {
            panic!("expected sql");
        };
        assert_eq!(parsed.metric, Intent::Production);
        assert_eq!(parsed.filters.buyer_name.as_deref(), Some("Adidas"));
        assert_eq!(
            parsed.date_range,
            Some(DateRange::new(
                NaiveDate::from_ymd_opt(2024, 12, 24).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            ))
        );
        assert_eq!(query.placeholder_count(), query.params.len());
        assert_eq!(query.params[2], SqlParam::Text("Adidas".to_string()));
    }

    #[test]
    fn test_generic_prediction_becomes_risk_overview() {
        let result = interpreter().interpret("Will we finish on time?");
        assert_eq!(result.kind(), "risk_overview");
        assert_eq!(result.parsed().metric, Intent::RiskOverview);
        assert!(result.parsed().filters.is_empty());
    }

    #[test]
    fn test_prediction_with_style() {
        let result = interpreter().interpret("predict completion for style ST150");
        match result {
            Interpretation::Prediction { style_no, parsed } => {
                assert_eq!(style_no, "ST150");
                assert_eq!(parsed.metric, Intent::Predict);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_prediction_permissive_style() {
        let result = interpreter().interpret("forecast order NEW_77");
        match result {
            Interpretation::Prediction { style_no, .. } => assert_eq!(style_no, "NEW_77"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_prediction_permissive_style_after_for() {
        for (text, expected) in [
            ("predict completion for style TEST_STYLE", "TEST_STYLE"),
            ("forecast for order TEST_X", "TEST_X"),
        ] {
            match interpreter().interpret(text) {
                Interpretation::Prediction { style_no, .. } => assert_eq!(style_no, expected),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_target_gap_keeps_named_buyer() {
        let vocab = Vocabulary::new(
            vec!["Gap".into(), "Nike".into()],
            vec![],
            vec![],
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        let interpreter =
            QueryInterpreter::new(vocab, IntentClassifier::keyword_only(), &PipelineConfig::default())
                .unwrap();

        let result = interpreter.interpret("target gap for nike");
        assert_eq!(result.parsed().metric, Intent::TargetGap);
        assert_eq!(result.parsed().filters.buyer_name.as_deref(), Some("Nike"));
    }

    #[test]
    fn test_prediction_with_buyer_becomes_production() {
        let result = interpreter().interpret("will nike finish line 4");
        let Interpretation::Sql { parsed, .. } = result else {
            panic!("expected sql");
        };
        assert_eq!(parsed.metric, Intent::Production);
        assert_eq!(parsed.filters.buyer_name.as_deref(), Some("Nike"));
        assert_eq!(parsed.filters.line_no, Some(4));
    }

    #[test]
    fn test_unmatched_text_degrades_to_production() {
        let result = interpreter().interpret("???");
        assert_eq!(result.kind(), "sql");
        assert_eq!(result.parsed().metric, Intent::Production);
        assert_eq!(result.parsed().date_range, None);
    }
}
