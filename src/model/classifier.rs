// ==========================================
// 成衣生产问答系统 - 文本分类器
// ==========================================
// 职责: 查询文本 -> 意图标签 (原始标签字符串)
// 制品: nlp_model.json (TF-IDF 词表 + 线性模型权重)
// 红线: 标签到意图的映射不在这里, 由 IntentClassifier 负责
// ==========================================

use crate::model::error::{read_artifact, ModelError};
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// 文本分类器接口
pub trait TextClassifier: Send + Sync {
    /// 预测标签
    ///
    /// # 参数
    /// - text: 已小写的查询文本
    fn predict_label(&self, text: &str) -> Result<String, ModelError>;
}

// ==========================================
// 制品格式
// ==========================================
#[derive(Debug, Clone, Deserialize)]
struct ClassifierArtifact {
    classes: Vec<String>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    stop_words: Vec<String>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

// ==========================================
// TfidfLinearClassifier
// ==========================================
/// TF-IDF 特征 + 线性判别
///
/// 分词: `\b\w\w+\b`, 先去停用词再拼 n-gram, 特征 L2 归一化
pub struct TfidfLinearClassifier {
    classes: Vec<String>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    token_pattern: Regex,
}

impl TfidfLinearClassifier {
    /// 从制品文件加载
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = read_artifact(path)?;
        Self::from_json_str(&raw)
    }

    /// 从 JSON 文本构建
    pub fn from_json_str(raw: &str) -> Result<Self, ModelError> {
        let artifact: ClassifierArtifact = serde_json::from_str(raw)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(a: ClassifierArtifact) -> Result<Self, ModelError> {
        let n_features = a.idf.len();

        if a.classes.is_empty() {
            return Err(ModelError::InvalidArtifact("classes 为空".to_string()));
        }
        if let Some((term, idx)) = a.vocabulary.iter().find(|(_, idx)| **idx >= n_features) {
            return Err(ModelError::InvalidArtifact(format!(
                "词表索引越界: term={}, index={}, n_features={}",
                term, idx, n_features
            )));
        }
        let binary = a.classes.len() == 2 && a.coef.len() == 1;
        if !binary && a.coef.len() != a.classes.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "coef 行数 {} 与类别数 {} 不一致",
                a.coef.len(),
                a.classes.len()
            )));
        }
        if a.intercept.len() != a.coef.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "intercept 长度 {} 与 coef 行数 {} 不一致",
                a.intercept.len(),
                a.coef.len()
            )));
        }
        if a.coef.iter().any(|row| row.len() != n_features) {
            return Err(ModelError::InvalidArtifact(
                "coef 列数与 idf 长度不一致".to_string(),
            ));
        }
        let (min_n, max_n) = a.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::InvalidArtifact(format!(
                "ngram_range 非法: ({}, {})",
                min_n, max_n
            )));
        }

        let token_pattern = Regex::new(r"\b\w\w+\b")
            .map_err(|e| ModelError::InvalidArtifact(e.to_string()))?;

        Ok(Self {
            classes: a.classes,
            vocabulary: a.vocabulary,
            idf: a.idf,
            coef: a.coef,
            intercept: a.intercept,
            ngram_range: a.ngram_range,
            stop_words: a.stop_words.into_iter().collect(),
            token_pattern,
        })
    }

    /// 分词 + 去停用词 + n-gram
    fn analyze(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }

    /// 稀疏 TF-IDF 向量 (feature index -> 权重), 已 L2 归一化
    fn vectorize(&self, text: &str) -> HashMap<usize, f64> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for gram in self.analyze(text) {
            if let Some(&idx) = self.vocabulary.get(&gram) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        for (idx, value) in counts.iter_mut() {
            *value *= self.idf[*idx];
        }

        let norm = counts.values().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in counts.values_mut() {
                *value /= norm;
            }
        }
        counts
    }

    fn decision(&self, features: &HashMap<usize, f64>, row: usize) -> f64 {
        let weights = &self.coef[row];
        features
            .iter()
            .map(|(idx, value)| weights[*idx] * value)
            .sum::<f64>()
            + self.intercept[row]
    }
}

impl TextClassifier for TfidfLinearClassifier {
    fn predict_label(&self, text: &str) -> Result<String, ModelError> {
        let features = self.vectorize(text);

        // 二分类只保存一行权重: 正分为 classes[1]
        if self.coef.len() == 1 && self.classes.len() == 2 {
            let score = self.decision(&features, 0);
            let idx = if score > 0.0 { 1 } else { 0 };
            return Ok(self.classes[idx].clone());
        }

        let mut best: Option<(usize, f64)> = None;
        for row in 0..self.coef.len() {
            let score = self.decision(&features, row);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((row, score)),
            }
        }

        best.map(|(row, _)| self.classes[row].clone())
            .ok_or_else(|| ModelError::Inference("无可用类别".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_json() -> String {
        serde_json::json!({
            "classes": ["EFFICIENCY", "PREDICTION", "WASTAGE"],
            "vocabulary": {"efficiency": 0, "finish": 1, "wastage": 2, "on time": 3, "fabric": 4},
            "idf": [1.0, 1.0, 1.0, 1.5, 1.2],
            "coef": [
                [2.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 2.0, 0.0, 2.0, 0.0],
                [0.0, 0.0, 2.0, 0.0, 1.0]
            ],
            "intercept": [0.1, 0.0, 0.0],
            "ngram_range": [1, 2],
            "stop_words": ["we", "on"]
        })
        .to_string()
    }

    #[test]
    fn test_predicts_highest_scoring_class() {
        let clf = TfidfLinearClassifier::from_json_str(&artifact_json()).unwrap();
        assert_eq!(clf.predict_label("line efficiency today").unwrap(), "EFFICIENCY");
        assert_eq!(clf.predict_label("fabric wastage report").unwrap(), "WASTAGE");
        assert_eq!(clf.predict_label("will we finish").unwrap(), "PREDICTION");
    }

    #[test]
    fn test_stop_words_removed_before_ngrams() {
        let clf = TfidfLinearClassifier::from_json_str(&artifact_json()).unwrap();
        let grams = clf.analyze("finish on time");
        assert_eq!(grams, vec!["finish", "time", "finish time"]);
    }

    #[test]
    fn test_unknown_text_falls_to_intercept() {
        let clf = TfidfLinearClassifier::from_json_str(&artifact_json()).unwrap();
        assert_eq!(clf.predict_label("hello there").unwrap(), "EFFICIENCY");
    }

    #[test]
    fn test_binary_single_row() {
        let raw = serde_json::json!({
            "classes": ["GENERAL", "PREDICTION"],
            "vocabulary": {"forecast": 0},
            "idf": [1.0],
            "coef": [[3.0]],
            "intercept": [-1.0]
        })
        .to_string();
        let clf = TfidfLinearClassifier::from_json_str(&raw).unwrap();
        assert_eq!(clf.predict_label("forecast please").unwrap(), "PREDICTION");
        assert_eq!(clf.predict_label("totals").unwrap(), "GENERAL");
    }

    #[test]
    fn test_rejects_inconsistent_artifact() {
        let raw = serde_json::json!({
            "classes": ["A", "B", "C"],
            "vocabulary": {"x": 5},
            "idf": [1.0],
            "coef": [[1.0], [1.0], [1.0]],
            "intercept": [0.0, 0.0, 0.0]
        })
        .to_string();
        assert!(matches!(
            TfidfLinearClassifier::from_json_str(&raw),
            Err(ModelError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = TfidfLinearClassifier::load(Path::new("/nonexistent/nlp_model.json"));
        assert!(matches!(result, Err(ModelError::ArtifactNotFound(_))));
    }
}
