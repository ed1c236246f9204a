use anyhow::Result;
use neuroscan_client::utils::logging;
use neuroscan_client::{App, Config};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：优先使用 NEUROSCAN_CONFIG 指定的 TOML 文件
    let config = match std::env::var("NEUROSCAN_CONFIG") {
        Ok(path) => Config::from_toml_file(Path::new(&path))?,
        Err(_) => Config::from_env(),
    };

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
