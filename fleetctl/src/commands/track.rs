use std::time::Duration;
use log::{debug, info};
use tokio::fs::File;
use tokio::io::{stdin, AsyncBufRead, BufReader};
use tokio::sync::oneshot;

use fleetlink::config::AppConfig;
use fleetlink::session::ProductionSessionManager;
use fleetlink::tracker::{
    LocationReporter,
    LocationSink,
    NdjsonPositionSource,
    ReporterSettings,
};

use crate::cli::TrackArgs;
use crate::commands::{CliError, Resources};

pub async fn run(
    args: TrackArgs,
    config: &AppConfig,
    session: &ProductionSessionManager,
    resources: &Resources,
) -> Result<(), CliError> {
    let driver_id = session
        .identity()
        .map(|identity| identity.id)
        .ok_or(CliError::NotSignedIn)?;
    let settings = ReporterSettings {
        vehicle_id: args.vehicle_id,
        driver_id: Some(driver_id),
        interval: Duration::from_secs(
            args.interval_secs.unwrap_or(config.report_interval_secs),
        ),
    };

    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            let _ = stop_tx.send(());
        }
    });

    // the session manager keeps renewing the tokens in the background for
    // as long as this loop runs
    match args.fixes {
        Some(path) => {
            info!("reading fixes from {}", path.display());
            let file = File::open(&path).await?;
            report(BufReader::new(file), resources, settings, stop_rx).await;
        },
        None => {
            info!("reading fixes from standard input");
            report(BufReader::new(stdin()), resources, settings, stop_rx)
                .await;
        },
    }
    println!("tracking stopped");
    Ok(())
}

async fn report<R: AsyncBufRead + Unpin + Send>(
    reader: R,
    sink: impl LocationSink,
    settings: ReporterSettings,
    stop: oneshot::Receiver<()>,
) {
    LocationReporter::new(NdjsonPositionSource::new(reader), sink, settings)
        .run(stop)
        .await
}
