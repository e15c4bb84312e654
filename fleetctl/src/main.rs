mod cli;
mod commands;

use clap::Parser;
use fleetlink::config::AppConfig;
use fleetlink::config::app_config::default_config_file;
use fleetlink::error_exit;
use fleetlink::logging::init_logging;
use fleetlink::resource_api::ResourceClient;
use fleetlink::session::ProductionSessionManager;

#[tokio::main]
async fn main() {
    init_logging();

    let cli = cli::CliConfig::parse();

    let config_file = cli
        .config_file
        .clone()
        .unwrap_or_else(default_config_file);
    let config = AppConfig::load(&config_file).unwrap_or_else(|e| {
        error_exit!("could not load the configuration: {e}")
    });

    let http = reqwest::Client::builder().build().unwrap_or_else(|e| {
        error_exit!("could not set up the http client: {e}")
    });

    let session = ProductionSessionManager::new(http.clone(), &config);
    session.restore().await;

    let resources =
        ResourceClient::new(http, &config.base_url, session.clone());

    if let Err(e) =
        commands::dispatch(cli.command, &config, &session, &resources).await
    {
        error_exit!("{e}");
    }
}
