use blogly_server::infrastructure::config::AppConfig;
use blogly_server::infrastructure::database::connect;
use blogly_server::infrastructure::logging::{LogFormat, init_logging};
use blogly_server::server::start_server;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LogFormat::Json);

    let config = AppConfig::from_env()?;
    let repos = connect(&config).await?;

    start_server(config, repos).await
}
