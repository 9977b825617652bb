use anyhow::Result;
use auto_take_exam::config::Config;
use auto_take_exam::logger;
use auto_take_exam::orchestrator::App;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
