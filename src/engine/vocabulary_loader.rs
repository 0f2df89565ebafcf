// ==========================================
// 成衣生产问答系统 - 词表加载
// ==========================================
// 职责: 启动时从 production_data 构建词表与锚定日期
// 降级: 读取失败 -> 内置默认词表 + 系统日期
// 红线: 加载后只读, 不做后台刷新
// ==========================================

use crate::config::PipelineConfig;
use crate::domain::vocabulary::Vocabulary;
use crate::repository::error::RepositoryResult;
use crate::repository::ProductionDataRepository;
use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;

pub struct VocabularyLoader {
    repo: Arc<ProductionDataRepository>,
    config: PipelineConfig,
}

impl VocabularyLoader {
    pub fn new(repo: Arc<ProductionDataRepository>, config: PipelineConfig) -> Self {
        Self { repo, config }
    }

    /// 加载词表 (不会失败)
    pub fn load(&self) -> Vocabulary {
        match self.try_load() {
            Ok(vocab) => {
                tracing::info!(
                    buyers = vocab.buyers.len(),
                    fabrics = vocab.fabrics.len(),
                    styles = vocab.styles.len(),
                    anchor = %vocab.anchor_date,
                    "词表加载完成"
                );
                vocab
            }
            Err(e) => {
                let today = wall_clock_today();
                tracing::warn!(error = %e, anchor = %today, "词表加载失败, 使用内置默认词表");
                Vocabulary::defaults(today)
            }
        }
    }

    fn try_load(&self) -> RepositoryResult<Vocabulary> {
        let buyers = self.repo.distinct_buyers()?;
        let fabrics = self.repo.distinct_fabrics()?;
        let recent = self.repo.recent_style_refs(self.config.vocab_recent_rows)?;
        let styles = distinct_in_order(recent, self.config.vocab_style_cap);

        let anchor_date = match self.repo.max_production_date()? {
            Some(date) => date,
            None => {
                let today = wall_clock_today();
                tracing::warn!(anchor = %today, "production_data 为空, 锚定日期使用系统日期");
                today
            }
        };

        Ok(Vocabulary::new(buyers, fabrics, styles, anchor_date))
    }
}

/// 保序去重并截断
pub(crate) fn distinct_in_order(values: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .take(cap)
        .collect()
}

fn wall_clock_today() -> NaiveDate {
    Local::now().date_naive()
}
