use super::*;
use crate::config::HuntConfig;
use crate::feeds::FeedRegistry;
use crate::scraper::MockScraper;
use crate::store::MockReadWriter;
use crate::types::{Feed, FeedItem};
use std::time::Duration;
use tokio::task::JoinHandle;

const INTERVAL: Duration = Duration::from_secs(60);

fn one_item_feed() -> Feed {
    Feed {
        title: "Test Feed".into(),
        items: vec![FeedItem {
            title: "Rust Engineer".into(),
            link: "https://example.com/jobs/1".into(),
            ..FeedItem::default()
        }],
    }
}

fn single_feed() -> FeedRegistry {
    FeedRegistry::new([("Board", "https://board.example.com/rss")])
}

fn config(shutdown_timeout: Option<Duration>) -> SchedulerConfig {
    SchedulerConfig {
        interval: INTERVAL,
        shutdown_timeout,
    }
}

fn start(
    scraper: Arc<MockScraper>,
    store: Arc<MockReadWriter>,
    config: SchedulerConfig,
) -> (CancellationToken, JoinHandle<Result<()>>) {
    let hunt = HuntConfig {
        feeds: single_feed(),
        ..HuntConfig::default()
    };
    let hunter = Arc::new(JobHunter::new(scraper, store, hunt));
    let stop = CancellationToken::new();
    let handle = tokio::spawn(CycleScheduler::new(hunter, config).start(stop.clone()));
    (stop, handle)
}

#[tokio::test(start_paused = true)]
async fn test_runs_immediately_then_every_interval() {
    let scraper = Arc::new(MockScraper::new().with_feed(one_item_feed()));
    let store = Arc::new(MockReadWriter::new());
    let (stop, handle) = start(scraper.clone(), store.clone(), config(None));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(store.reads().len(), 1, "first cycle runs at start");
    assert_eq!(store.write_calls(), 1);

    tokio::time::sleep(INTERVAL).await;
    assert_eq!(store.reads().len(), 2);

    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(store.reads().len(), 4);

    stop.cancel();
    handle.await.unwrap().unwrap();
    assert_eq!(scraper.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycles_do_not_stop_the_schedule() {
    let scraper = Arc::new(MockScraper::new());
    let store = Arc::new(MockReadWriter::new().with_read_error("sheet not found"));
    let (stop, handle) = start(scraper.clone(), store.clone(), config(None));

    tokio::time::sleep(INTERVAL * 2 + Duration::from_secs(1)).await;

    assert_eq!(store.reads().len(), 3);
    assert_eq!(scraper.calls(), 0);

    stop.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stop_waits_for_running_cycle() {
    let scraper = Arc::new(
        MockScraper::new()
            .with_feed(one_item_feed())
            .with_delay(Duration::from_secs(10)),
    );
    let store = Arc::new(MockReadWriter::new());
    let (stop, handle) = start(scraper, store.clone(), config(None));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(store.write_calls(), 0);

    stop.cancel();
    handle.await.unwrap().unwrap();

    assert_eq!(store.write_calls(), 1, "in-flight cycle finished its write");
}

#[tokio::test(start_paused = true)]
async fn test_no_cycles_start_after_stop() {
    let scraper = Arc::new(MockScraper::new());
    let store = Arc::new(MockReadWriter::new());
    let (stop, handle) = start(scraper, store.clone(), config(None));

    tokio::time::sleep(Duration::from_secs(1)).await;
    stop.cancel();
    handle.await.unwrap().unwrap();

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(store.reads().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_timeout_cancels_stuck_cycle() {
    let scraper = Arc::new(MockScraper::new().hang_until_cancelled());
    let store = Arc::new(MockReadWriter::new());
    let (stop, handle) = start(
        scraper,
        store.clone(),
        config(Some(Duration::from_secs(5))),
    );

    tokio::time::sleep(Duration::from_secs(1)).await;
    let stopped_at = Instant::now();
    stop.cancel();
    handle.await.unwrap().unwrap();

    assert!(stopped_at.elapsed() >= Duration::from_secs(5));
    assert_eq!(store.write_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_cycles_run_concurrently() {
    // Each cycle outlives the interval, so the next tick starts a second one
    let scraper = Arc::new(
        MockScraper::new()
            .with_feed(one_item_feed())
            .with_delay(INTERVAL + Duration::from_secs(30)),
    );
    let store = Arc::new(MockReadWriter::new());
    let (stop, handle) = start(scraper.clone(), store.clone(), config(None));

    tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;
    assert_eq!(scraper.calls(), 2, "second cycle started");
    assert_eq!(store.write_calls(), 0, "first cycle still running");

    stop.cancel();
    handle.await.unwrap().unwrap();

    // Neither cycle saw the other's rows, so both wrote the same posting
    assert_eq!(store.write_calls(), 2);
}
