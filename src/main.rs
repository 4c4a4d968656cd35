use anyhow::Result;
use logo_remover::utils::logging;
use logo_remover::{App, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let _report = App::initialize(config)?.run().await?;

    Ok(())
}
