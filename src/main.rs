use dashboard::app;
use dashboard::config::AppConfig;
use env_logger::Env;
use std::env;

/// Main entry point for the dashboard web server
///
/// Settings come from `DASHBOARD_*` environment variables, overridden by
/// positional arguments `<data_path> [bind_addr]`. A workbook that cannot be
/// loaded stops the process before the server binds.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = AppConfig::from_env().with_args(&args);

    app::run(config).await
}
