use std::time::Duration;
use async_trait::async_trait;
use log::{debug, info, trace, warn};
use time::OffsetDateTime;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::oneshot;
use tokio::time::{interval, MissedTickBehavior};
use uuid::Uuid;

use crate::model::NewLocationLog;
use crate::tracker::{
    LocationSink,
    PositionFix,
    PositionSource,
    PositionSourceError,
};

#[cfg(test)] mod tests;

#[derive(Clone, Debug)]
pub struct ReporterSettings {
    /// Vehicle the samples are attributed to.
    pub vehicle_id: Option<Uuid>,
    /// Driver the samples are attributed to, normally the signed-in user.
    pub driver_id: Option<Uuid>,
    pub interval: Duration,
}

/// Periodically samples the position source and publishes each fix as a
/// location-log record. One sample per tick; a failed tick is logged and
/// skipped, the loop keeps going.
pub struct LocationReporter<P: PositionSource, K: LocationSink> {
    source: P,
    sink: K,
    settings: ReporterSettings,
}

impl<P: PositionSource, K: LocationSink> LocationReporter<P, K> {
    pub fn new(
        source: P,
        sink: K,
        settings: ReporterSettings,
    ) -> LocationReporter<P, K> {
        LocationReporter { source, sink, settings }
    }

    /// Runs until the stop signal fires or the source runs dry.
    pub async fn run(mut self, mut stop: oneshot::Receiver<()>) {
        let mut ticker = interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "reporting the device location every {:?}",
            self.settings.interval,
        );
        loop {
            tokio::select! {
                biased;
                _ = &mut stop => {
                    debug!("location reporting stopped");
                    break;
                },
                _ = ticker.tick() => {
                    match self.source.sample().await {
                        Ok(fix) => self.publish(fix).await,
                        Err(PositionSourceError::Exhausted) => {
                            debug!("position source exhausted, stopping");
                            break;
                        },
                        Err(e) => {
                            warn!("could not sample the position: {e}");
                        },
                    }
                },
            }
        }
    }

    async fn publish(&self, fix: PositionFix) {
        let sample = NewLocationLog {
            vehicle_id: self.settings.vehicle_id,
            driver_id: self.settings.driver_id,
            latitude: fix.latitude,
            longitude: fix.longitude,
            timestamp: fix.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
            speed: fix.speed,
            heading: fix.heading,
        };
        match self.sink.publish(&sample).await {
            Ok(()) => trace!(
                "published a location sample at {}, {}",
                sample.latitude,
                sample.longitude,
            ),
            Err(e) => warn!("could not publish the location sample: {e}"),
        }
    }
}

/// Fixes as newline-delimited JSON from any buffered reader; the `track`
/// command feeds it a file or standard input. Blank lines are skipped.
pub struct NdjsonPositionSource<R: AsyncBufRead + Unpin + Send> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> NdjsonPositionSource<R> {
    pub fn new(reader: R) -> NdjsonPositionSource<R> {
        NdjsonPositionSource { lines: reader.lines() }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> PositionSource
    for NdjsonPositionSource<R>
{
    async fn sample(&mut self) -> Result<PositionFix, PositionSourceError> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Err(PositionSourceError::Exhausted);
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Ok(serde_json::from_str(line)?);
        }
    }
}
