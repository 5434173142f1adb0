use anyhow::Context;
use taskdeck_server::config::ServerConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().context("failed to load server configuration")?;
    taskdeck_server::run(config)
        .await
        .context("server terminated")
}
