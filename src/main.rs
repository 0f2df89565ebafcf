// ==========================================
// 成衣生产问答系统 - 命令行入口
// ==========================================
// 用法:
//   garment-insight [--db PATH] [--models DIR] ask "efficiency for Nike last 7 days"
//   garment-insight [--db PATH] [--models DIR] predict ST150
//   garment-insight [--db PATH] [--models DIR] risk
//   garment-insight [--db PATH] vocab
// 输出: JSON (stdout), 日志走 stderr
// ==========================================

use anyhow::{anyhow, bail, Context};
use garment_insight::app::{get_default_db_path, AppState};
use garment_insight::config::ArtifactPaths;
use garment_insight::logging;

const USAGE: &str = "usage: garment-insight [--db PATH] [--models DIR] <ask TEXT | predict STYLE | risk | vocab>";

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut db_path: Option<String> = None;
    let mut model_dir: Option<String> = None;
    let mut rest: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => db_path = Some(args.next().ok_or_else(|| anyhow!("--db 缺少参数"))?),
            "--models" => {
                model_dir = Some(args.next().ok_or_else(|| anyhow!("--models 缺少参数"))?)
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => rest.push(arg),
        }
    }

    let Some((command, params)) = rest.split_first() else {
        bail!(USAGE);
    };

    let db_path = db_path.unwrap_or_else(get_default_db_path);
    let artifacts = match model_dir {
        Some(dir) => ArtifactPaths::in_dir(dir),
        None => ArtifactPaths::from_env(),
    };

    tracing::info!("{} v{}", garment_insight::APP_NAME, garment_insight::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path, &artifacts).map_err(|e| anyhow!(e))?;
    let api = &state.insight_api;

    let output = match command.as_str() {
        "ask" => {
            let text = params.join(" ");
            serde_json::to_string_pretty(&api.ask(&text)?)
        }
        "predict" => {
            let style = params.first().context("predict 需要款号参数")?;
            serde_json::to_string_pretty(&api.predict(style)?)
        }
        "risk" => serde_json::to_string_pretty(&api.risk_overview()?),
        "vocab" => serde_json::to_string_pretty(&api.vocabulary()?),
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }?;

    println!("{}", output);
    Ok(())
}
