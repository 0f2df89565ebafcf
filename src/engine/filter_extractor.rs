// ==========================================
// 成衣生产问答系统 - 过滤条件抽取
// ==========================================
// 职责: 查询文本 -> Filters (客户 / 款号 / 线号 / 面料)
// 规则: 每个维度一条正则, 由词表生成; 不打分, 首个命中即采用
// 约束: 备选项按长度降序, 左侧命中即最长已知值
//       前后必须是非单词字符, 避免命中更长 token 的一部分
//       指标短语 (target gap) 不参与客户匹配
// ==========================================

use crate::domain::query::Filters;
use crate::domain::types::FilterKind;
use crate::domain::vocabulary::{Vocabulary, DEFAULT_BUYERS, DEFAULT_FABRICS};
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// 宽松款号前导词; 本身不能作为款号
const PERMISSIVE_KEYWORDS: [&str; 3] = ["style", "order", "for"];

/// 命中值的规范化方式
enum ValueForm {
    /// 小写 -> 词表原始写法
    Canonical(HashMap<String, String>),
    /// 款号模式 (无词表时) 统一大写
    Uppercase,
    Integer,
}

struct FilterRule {
    kind: FilterKind,
    pattern: Regex,
    form: ValueForm,
}

// ==========================================
// FilterExtractor
// ==========================================
pub struct FilterExtractor {
    rules: Vec<FilterRule>,
    permissive_style: Regex,
    /// 与客户名冲突的指标短语, 客户匹配前抹去
    metric_phrase: Regex,
    /// 已知客户/面料 (小写), 宽松款号匹配时排除
    known_entities: HashSet<String>,
}

impl FilterExtractor {
    /// 由词表构建规则表
    ///
    /// # 说明
    /// - 客户/面料词表为空时使用内置默认值
    /// - 款号词表为空时使用 `ST\d+` 模式
    pub fn from_vocabulary(vocab: &Vocabulary) -> Result<Self, regex::Error> {
        let buyers = non_empty_or_defaults(&vocab.buyers, &DEFAULT_BUYERS);
        let fabrics = non_empty_or_defaults(&vocab.fabrics, &DEFAULT_FABRICS);

        let mut rules = Vec::with_capacity(FilterKind::ALL.len());

        let (pattern, canonical) = vocabulary_rule(&buyers)?;
        rules.push(FilterRule {
            kind: FilterKind::BuyerName,
            pattern,
            form: ValueForm::Canonical(canonical),
        });

        if vocab.styles.is_empty() {
            rules.push(FilterRule {
                kind: FilterKind::StyleNo,
                pattern: Regex::new(r"(?i)\b(ST\d+)\b")?,
                form: ValueForm::Uppercase,
            });
        } else {
            let (pattern, canonical) = vocabulary_rule(&vocab.styles)?;
            rules.push(FilterRule {
                kind: FilterKind::StyleNo,
                pattern,
                form: ValueForm::Canonical(canonical),
            });
        }

        rules.push(FilterRule {
            kind: FilterKind::LineNo,
            pattern: Regex::new(r"(?i)\bline\s*(\d+)\b")?,
            form: ValueForm::Integer,
        });

        let (pattern, canonical) = vocabulary_rule(&fabrics)?;
        rules.push(FilterRule {
            kind: FilterKind::FabricType,
            pattern,
            form: ValueForm::Canonical(canonical),
        });

        let known_entities = buyers
            .iter()
            .chain(fabrics.iter())
            .map(|v| v.to_lowercase())
            .collect();

        Ok(Self {
            rules,
            permissive_style: Regex::new(
                r"(?i)\b(?:style|order|for)\s+(?:(?:style|order)\s+)?([A-Za-z0-9_]+)",
            )?,
            metric_phrase: Regex::new(r"(?i)\btarget\s+gap\b")?,
            known_entities,
        })
    }

    /// 抽取过滤条件 (幂等)
    pub fn extract(&self, text: &str) -> Filters {
        let mut filters = Filters::default();
        let without_metric = self.metric_phrase.replace_all(text, " ");

        for rule in &self.rules {
            let haystack = match rule.kind {
                FilterKind::BuyerName => &*without_metric,
                _ => text,
            };
            let Some(raw) = rule
                .pattern
                .captures(haystack)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
            else {
                continue;
            };

            match (&rule.form, rule.kind) {
                (ValueForm::Integer, FilterKind::LineNo) => match raw.parse::<i64>() {
                    Ok(n) => filters.line_no = Some(n),
                    Err(_) => tracing::debug!(raw, "线号超出范围, 忽略"),
                },
                (form, kind) => {
                    let value = match form {
                        ValueForm::Canonical(map) => map
                            .get(&raw.to_lowercase())
                            .cloned()
                            .unwrap_or_else(|| raw.to_string()),
                        ValueForm::Uppercase => raw.to_uppercase(),
                        ValueForm::Integer => raw.to_string(),
                    };
                    match kind {
                        FilterKind::BuyerName => filters.buyer_name = Some(value),
                        FilterKind::StyleNo => filters.style_no = Some(value),
                        FilterKind::FabricType => filters.fabric_type = Some(value),
                        FilterKind::LineNo => {}
                    }
                }
            }
        }

        filters
    }

    /// 宽松款号匹配: `style|order|for [style|order] <token>`, token 原样返回
    ///
    /// # 说明
    /// - 仅在预测意图且词表款号未命中时使用
    /// - 已知客户/面料名及前导词本身不视为款号
    pub fn extract_style_permissive(&self, text: &str) -> Option<String> {
        self.permissive_style
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .find(|token| {
                let lowered = token.to_lowercase();
                !PERMISSIVE_KEYWORDS.contains(&lowered.as_str())
                    && !self.known_entities.contains(&lowered)
            })
            .map(|token| token.to_string())
    }
}

fn non_empty_or_defaults(values: &[String], defaults: &[&str]) -> Vec<String> {
    if values.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        values.to_vec()
    }
}

/// 词表 -> (带边界的备选正则, 小写到原始写法的映射)
fn vocabulary_rule(values: &[String]) -> Result<(Regex, HashMap<String, String>), regex::Error> {
    let mut canonical: HashMap<String, String> = HashMap::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        canonical
            .entry(trimmed.to_lowercase())
            .or_insert_with(|| trimmed.to_string());
    }

    let mut alternatives: Vec<&String> = canonical.values().collect();
    alternatives.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });

    let alternation = alternatives
        .iter()
        .map(|v| regex::escape(v))
        .collect::<Vec<_>>()
        .join("|");

    // 空词表时生成一个永不匹配的模式
    let body = if alternation.is_empty() {
        r"[^\s\S]".to_string()
    } else {
        alternation
    };

    let pattern = Regex::new(&format!(r"(?i)(?:^|[^\w])({})(?:[^\w]|$)", body))?;
    Ok((pattern, canonical))
}
