use linkpress::config::load_from_env;
use linkpress::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_from_env()?;
    server::init_tracing(&config);
    config.print_summary();

    server::run(config).await
}
