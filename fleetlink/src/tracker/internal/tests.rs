use std::time::Duration as StdDuration;
use time::OffsetDateTime;
use tokio::sync::oneshot;
use tokio::time::sleep;
use uuid::Uuid;

use crate::tracker::{PositionFix, PositionSource, PositionSourceError};
use crate::tracker::internal::{
    LocationReporter,
    NdjsonPositionSource,
    ReporterSettings,
};
use crate::tracker::internal::tests::mocks::{
    QueuePositionSource,
    RecordingSink,
};


fn fix(latitude: f64, longitude: f64) -> PositionFix {
    PositionFix {
        latitude,
        longitude,
        speed: Some(12.5),
        heading: Some(180.0),
        timestamp: Some(
            OffsetDateTime::from_unix_timestamp(1_700_000_000)
                .expect("valid epoch"),
        ),
    }
}

fn settings(interval_secs: u64) -> ReporterSettings {
    ReporterSettings {
        vehicle_id: Some(Uuid::new_v4()),
        driver_id: Some(Uuid::new_v4()),
        interval: StdDuration::from_secs(interval_secs),
    }
}

#[tokio::test(start_paused = true)]
async fn publishes_one_attributed_sample_per_tick_until_exhausted() {
    let source = QueuePositionSource::with_fixes(vec![
        fix(52.0, 13.0),
        fix(52.1, 13.1),
        fix(52.2, 13.2),
    ]);
    let sink = RecordingSink::new();
    let settings = settings(10);
    let vehicle_id = settings.vehicle_id;
    let driver_id = settings.driver_id;
    let reporter = LocationReporter::new(source, sink.clone(), settings);
    let (_stop, stop_rx) = oneshot::channel();

    let task = tokio::spawn(reporter.run(stop_rx));
    sleep(StdDuration::from_secs(35)).await;
    task.await.expect("reporter finished");

    let samples = sink.samples();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].latitude, 52.0);
    assert_eq!(samples[2].longitude, 13.2);
    for sample in &samples {
        assert_eq!(sample.vehicle_id, vehicle_id);
        assert_eq!(sample.driver_id, driver_id);
        assert_eq!(
            sample.timestamp.unix_timestamp(),
            1_700_000_000,
        );
    }
}

#[tokio::test(start_paused = true)]
async fn failed_publishes_are_skipped_not_fatal() {
    let source = QueuePositionSource::with_fixes(vec![
        fix(52.0, 13.0),
        fix(52.1, 13.1),
    ]);
    let sink = RecordingSink::new();
    sink.fail_next_publish();
    let reporter = LocationReporter::new(source, sink.clone(), settings(10));
    let (_stop, stop_rx) = oneshot::channel();

    let task = tokio::spawn(reporter.run(stop_rx));
    sleep(StdDuration::from_secs(25)).await;
    task.await.expect("reporter finished");

    assert_eq!(sink.attempts(), 2);
    assert_eq!(sink.samples().len(), 1);
    assert_eq!(sink.samples()[0].latitude, 52.1);
}

#[tokio::test(start_paused = true)]
async fn sampling_errors_are_skipped_not_fatal() {
    let source = QueuePositionSource::with_results(vec![
        Err(unreadable_fix()),
        Ok(fix(52.1, 13.1)),
    ]);
    let sink = RecordingSink::new();
    let reporter = LocationReporter::new(source, sink.clone(), settings(10));
    let (_stop, stop_rx) = oneshot::channel();

    let task = tokio::spawn(reporter.run(stop_rx));
    sleep(StdDuration::from_secs(25)).await;
    task.await.expect("reporter finished");

    assert_eq!(sink.samples().len(), 1);
    assert_eq!(sink.samples()[0].latitude, 52.1);
}

#[tokio::test(start_paused = true)]
async fn stop_signal_ends_the_loop_between_ticks() {
    let fixes: Vec<PositionFix> =
        (0..100).map(|i| fix(52.0, f64::from(i))).collect();
    let source = QueuePositionSource::with_fixes(fixes);
    let sink = RecordingSink::new();
    let reporter = LocationReporter::new(source, sink.clone(), settings(10));
    let (stop, stop_rx) = oneshot::channel();

    let task = tokio::spawn(reporter.run(stop_rx));
    sleep(StdDuration::from_secs(15)).await;
    stop.send(()).expect("reporter is listening");
    task.await.expect("reporter finished");

    // ticks at 0s and 10s ran before the stop
    assert_eq!(sink.samples().len(), 2);
}

#[tokio::test]
async fn ndjson_source_parses_lines_and_skips_blanks() {
    let input = concat!(
        r#"{"latitude": 52.0, "longitude": 13.0}"#,
        "\n\n",
        r#"{"latitude": 52.1, "longitude": 13.1, "speed": 8.0}"#,
        "\n",
    );
    let mut source = NdjsonPositionSource::new(input.as_bytes());

    let first = source.sample().await.expect("first fix");
    assert_eq!(first.latitude, 52.0);
    assert_eq!(first.timestamp, None);

    let second = source.sample().await.expect("second fix");
    assert_eq!(second.speed, Some(8.0));

    assert!(matches!(
        source.sample().await,
        Err(PositionSourceError::Exhausted),
    ));
}

#[tokio::test]
async fn ndjson_source_reports_unreadable_lines() {
    let mut source = NdjsonPositionSource::new(&b"not json\n"[..]);
    assert!(matches!(
        source.sample().await,
        Err(PositionSourceError::Malformed(_)),
    ));
}

fn unreadable_fix() -> PositionSourceError {
    PositionSourceError::Malformed(
        serde_json::from_str::<PositionFix>("nope")
            .expect_err("invalid json"),
    )
}
