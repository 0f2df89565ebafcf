// ==========================================
// 成衣生产问答系统 - 应用状态
// ==========================================
// 职责: 启动时装配 配置 / 仓储 / 模型 / 引擎 / API
// 约束: 模型与词表加载一次, 之后只读
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::InsightApi;
use crate::config::{ArtifactPaths, ConfigManager, PipelineConfig};
use crate::db::open_sqlite_connection;
use crate::engine::PredictionEngine;
use crate::model::{
    LabelEncoders, OnnxRegressor, OutputRegressor, TextClassifier, TfidfLinearClassifier,
};
use crate::repository::ProductionDataRepository;

// ==========================================
// ModelBundle - 已加载的模型制品
// ==========================================
#[derive(Clone, Default)]
pub struct ModelBundle {
    pub classifier: Option<Arc<dyn TextClassifier>>,
    pub regressor: Option<Arc<dyn OutputRegressor>>,
    pub encoders: Option<Arc<LabelEncoders>>,
}

impl ModelBundle {
    /// 不带任何模型 (关键词意图 + 预测不可用)
    pub fn empty() -> Self {
        Self::default()
    }

    /// 按路径加载, 单个制品失败只记录 warn
    pub fn load(paths: &ArtifactPaths) -> Self {
        let classifier = match TfidfLinearClassifier::load(&paths.classifier) {
            Ok(c) => Some(Arc::new(c) as Arc<dyn TextClassifier>),
            Err(e) => {
                tracing::warn!(error = %e, "意图模型未加载, 使用关键词回退");
                None
            }
        };

        let regressor = match OnnxRegressor::load(&paths.regressor) {
            Ok(r) => Some(Arc::new(r) as Arc<dyn OutputRegressor>),
            Err(e) => {
                tracing::warn!(error = %e, "回归模型未加载, 预测不可用");
                None
            }
        };

        let encoders = match LabelEncoders::load(&paths.encoders) {
            Ok(enc) => Some(Arc::new(enc)),
            Err(e) => {
                tracing::warn!(error = %e, "编码表未加载, 预测不可用");
                None
            }
        };

        Self {
            classifier,
            regressor,
            encoders,
        }
    }
}

// ==========================================
// AppState
// ==========================================

/// 应用状态
///
/// 包含 API 实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 生效中的流水线配置
    pub config: PipelineConfig,

    /// 问答 API
    pub insight_api: Arc<InsightApi>,
}

impl AppState {
    /// 创建 AppState, 从 artifacts 路径加载模型
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - artifacts: 模型制品路径
    pub fn new(db_path: String, artifacts: &ArtifactPaths) -> Result<Self, String> {
        Self::with_models(db_path, ModelBundle::load(artifacts))
    }

    /// 使用已加载的模型创建 AppState
    pub fn with_models(db_path: String, models: ModelBundle) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 共享连接
        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = ConfigManager::from_connection(conn.clone());
        let config = config_manager
            .load_pipeline_config()
            .map_err(|e| format!("无法加载配置: {}", e))?;

        // ==========================================
        // Repository / Engine / API
        // ==========================================
        let repo = Arc::new(ProductionDataRepository::from_connection(conn));

        let predictor = Arc::new(PredictionEngine::new(
            repo.clone(),
            models.regressor,
            models.encoders,
            config.clone(),
        ));

        let insight_api = Arc::new(
            InsightApi::new(repo, predictor, models.classifier, config.clone())
                .map_err(|e| format!("无法创建InsightApi: {}", e))?,
        );

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config,
            insight_api,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: GARMENT_INSIGHT_DB_PATH > 用户数据目录 > ./garment_insight.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("GARMENT_INSIGHT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./garment_insight.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("garment-insight");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("garment_insight.db");
        }
    }

    path.to_string_lossy().to_string()
}
