// Polling controller - Drives fetch -> append -> publish on a fixed cadence
use crate::application::data_fetcher::DataFetcher;
use crate::domain::feed::{FeedSnapshot, FetchState, PollerPhase};
use crate::domain::solar_wind::Reading;
use crate::domain::time_series::TimeSeriesBuffer;
use chrono::Utc;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default time between the end of one fetch and the start of the next.
pub const FETCH_INTERVAL: Duration = Duration::from_millis(60_000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("polling controller is already running")]
    AlreadyRunning,
    #[error("polling controller has been stopped")]
    Stopped,
}

/// Read-only view of the live feed, cheap to clone into request handlers.
#[derive(Clone)]
pub struct FeedHandle {
    rx: watch::Receiver<FeedSnapshot>,
}

impl FeedHandle {
    pub fn snapshot(&self) -> FeedSnapshot {
        self.rx.borrow().clone()
    }

    /// Oldest first.
    pub fn current_buffer(&self) -> Vec<Reading> {
        self.rx.borrow().readings.to_vec()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.rx.borrow().fetch_state.clone()
    }

    pub fn phase(&self) -> PollerPhase {
        self.rx.borrow().phase
    }

    /// Receiver notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.rx.clone()
    }
}

/// Owns the polling task for one live session.
///
/// The loop runs on a single task: a fetch is awaited to completion before
/// the interval timer is armed, so two fetches are never in flight at once.
/// `stop()` marks the snapshot `Stopped` under the channel's lock before
/// cancelling the task, and the task refuses to publish into a stopped
/// snapshot, so nothing is appended after teardown.
pub struct PollingController {
    fetcher: DataFetcher,
    interval: Duration,
    snapshot_tx: Arc<watch::Sender<FeedSnapshot>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollingController {
    pub fn new(fetcher: DataFetcher, interval: Duration, max_data_points: NonZeroUsize) -> Self {
        let initial = FeedSnapshot::empty(TimeSeriesBuffer::new(max_data_points));
        let (snapshot_tx, _) = watch::channel(initial);

        Self {
            fetcher,
            interval,
            snapshot_tx: Arc::new(snapshot_tx),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    pub fn handle(&self) -> FeedHandle {
        FeedHandle {
            rx: self.snapshot_tx.subscribe(),
        }
    }

    pub fn current_buffer(&self) -> Vec<Reading> {
        self.snapshot_tx.borrow().readings.to_vec()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.snapshot_tx.borrow().fetch_state.clone()
    }

    pub fn phase(&self) -> PollerPhase {
        self.snapshot_tx.borrow().phase
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Spawn the polling task. The first fetch starts immediately.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.task.is_some() {
            return Err(ControllerError::AlreadyRunning);
        }
        if self.phase() == PollerPhase::Stopped {
            return Err(ControllerError::Stopped);
        }

        let fetcher = self.fetcher.clone();
        let snapshot_tx = self.snapshot_tx.clone();
        let interval = self.interval;

        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            max_data_points = self.snapshot_tx.borrow().readings.capacity(),
            "Starting solar wind polling"
        );

        self.task = Some(tokio::spawn(run_poll_loop(
            fetcher,
            interval,
            snapshot_tx,
            self.cancel.clone(),
        )));
        Ok(())
    }

    /// Cancel the pending timer and discard any in-flight fetch.
    ///
    /// The buffer is frozen at its current contents. Calling `stop` again is
    /// a no-op.
    pub async fn stop(&mut self) {
        self.snapshot_tx.send_modify(|s| s.phase = PollerPhase::Stopped);

        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Polling task ended abnormally: {}", e);
            }
            tracing::info!("Stopped solar wind polling");
        }
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.snapshot_tx.send_modify(|s| s.phase = PollerPhase::Stopped);
            self.cancel.cancel();
            task.abort();
        }
    }
}

async fn run_poll_loop(
    fetcher: DataFetcher,
    interval: Duration,
    snapshot_tx: Arc<watch::Sender<FeedSnapshot>>,
    cancel: CancellationToken,
) {
    loop {
        if !publish(&snapshot_tx, |s| {
            s.phase = PollerPhase::Fetching;
            s.fetch_state = FetchState::Loading;
        }) {
            break;
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = fetcher.fetch() => outcome,
        };

        let published = match outcome {
            Ok(reading) => {
                tracing::debug!(
                    bz = reading.bz,
                    speed = reading.speed,
                    density = reading.density,
                    "Received solar wind reading"
                );
                publish(&snapshot_tx, |s| {
                    s.readings = s.readings.append(reading);
                    s.fetch_state = FetchState::Success;
                    s.last_updated = Some(Utc::now());
                    s.phase = PollerPhase::Waiting;
                })
            }
            Err(e) => {
                tracing::warn!("Solar wind fetch failed: {}", e);
                publish(&snapshot_tx, |s| {
                    s.fetch_state = FetchState::Error(e.to_string());
                    s.phase = PollerPhase::Waiting;
                })
            }
        };
        if !published {
            break;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

/// Apply `update` unless the controller has been stopped. Returns `false`
/// once stopped.
fn publish(tx: &watch::Sender<FeedSnapshot>, update: impl FnOnce(&mut FeedSnapshot)) -> bool {
    let mut live = true;
    tx.send_if_modified(|s| {
        if s.phase == PollerPhase::Stopped {
            live = false;
            return false;
        }
        update(s);
        true
    });
    live
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::solar_wind_source::SolarWindSource;
    use crate::application::upstream::UpstreamResponse;
    use crate::domain::solar_wind::SolarWindData;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed script; falls back to an error payload once exhausted.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<f64, String>>>,
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<f64, String>>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                delay,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SolarWindSource for ScriptedSource {
        async fn fetch_latest(&self) -> anyhow::Result<UpstreamResponse<SolarWindData>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            Ok(match next {
                Some(Ok(bz)) => UpstreamResponse::ok(SolarWindData {
                    bz,
                    bt: 10.0,
                    speed: 450.0,
                    density: 5.0,
                    dst: -20.0,
                }),
                Some(Err(message)) => UpstreamResponse::err(message),
                None => UpstreamResponse::err("script exhausted"),
            })
        }
    }

    const INTERVAL: Duration = Duration::from_secs(60);

    fn controller(source: Arc<ScriptedSource>, cap: usize) -> PollingController {
        PollingController::new(
            DataFetcher::new(source),
            INTERVAL,
            NonZeroUsize::new(cap).unwrap(),
        )
    }

    fn bz_values(readings: &[Reading]) -> Vec<f64> {
        readings.iter().map(|r| r.bz).collect()
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let source = ScriptedSource::new(vec![Ok(-1.0)], Duration::ZERO);
        let mut ctl = controller(source.clone(), 30);
        assert_eq!(ctl.phase(), PollerPhase::Idle);
        assert_eq!(ctl.fetch_state(), FetchState::Idle);

        ctl.start().unwrap();
        advance(1).await;

        assert_eq!(source.calls(), 1);
        assert_eq!(bz_values(&ctl.current_buffer()), vec![-1.0]);
        assert_eq!(ctl.fetch_state(), FetchState::Success);
        assert_eq!(ctl.phase(), PollerPhase::Waiting);
        ctl.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_slides_over_cycles() {
        let source = ScriptedSource::new(vec![Ok(1.0), Ok(2.0), Ok(3.0), Ok(4.0)], Duration::ZERO);
        let mut ctl = controller(source.clone(), 3);
        ctl.start().unwrap();

        advance(1).await;
        for _ in 0..3 {
            advance(INTERVAL.as_millis() as u64).await;
        }

        assert_eq!(source.calls(), 4);
        assert_eq!(bz_values(&ctl.current_buffer()), vec![2.0, 3.0, 4.0]);
        ctl.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_last_good_buffer() {
        let source = ScriptedSource::new(
            vec![Ok(-4.0), Err("upstream unavailable".to_string()), Ok(-6.0)],
            Duration::ZERO,
        );
        let mut ctl = controller(source.clone(), 30);
        let handle = ctl.handle();
        ctl.start().unwrap();

        advance(1).await;
        assert_eq!(bz_values(&handle.current_buffer()), vec![-4.0]);

        advance(INTERVAL.as_millis() as u64).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(bz_values(&handle.current_buffer()), vec![-4.0]);
        assert_eq!(
            handle.fetch_state(),
            FetchState::Error("upstream unavailable".to_string())
        );

        // Cadence continues after an error
        advance(INTERVAL.as_millis() as u64).await;
        assert_eq!(source.calls(), 3);
        assert_eq!(bz_values(&handle.current_buffer()), vec![-4.0, -6.0]);
        assert_eq!(handle.fetch_state(), FetchState::Success);
        ctl.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_waiting_freezes_buffer() {
        let source = ScriptedSource::new(vec![Ok(1.0), Ok(2.0), Ok(3.0)], Duration::ZERO);
        let mut ctl = controller(source.clone(), 30);
        let handle = ctl.handle();
        ctl.start().unwrap();

        advance(1).await;
        assert_eq!(handle.phase(), PollerPhase::Waiting);

        ctl.stop().await;
        assert!(!ctl.is_running());
        advance(10 * INTERVAL.as_millis() as u64).await;

        assert_eq!(source.calls(), 1);
        assert_eq!(bz_values(&handle.current_buffer()), vec![1.0]);
        assert_eq!(handle.phase(), PollerPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_in_flight_result() {
        let source = ScriptedSource::new(vec![Ok(1.0)], Duration::from_secs(30));
        let mut ctl = controller(source.clone(), 30);
        let handle = ctl.handle();
        ctl.start().unwrap();

        advance(1_000).await;
        assert_eq!(handle.phase(), PollerPhase::Fetching);
        assert_eq!(handle.fetch_state(), FetchState::Loading);

        ctl.stop().await;
        advance(60_000).await;

        assert!(handle.current_buffer().is_empty());
        assert_eq!(handle.phase(), PollerPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_never_overlaps() {
        let source = ScriptedSource::new(vec![Ok(1.0), Ok(2.0)], Duration::from_secs(150));
        let mut ctl = controller(source.clone(), 30);
        ctl.start().unwrap();

        // Well past one interval, first fetch still outstanding
        advance(100_000).await;
        assert_eq!(source.calls(), 1);

        // First fetch completes at 150s; next starts 60s later
        advance(100_000).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(ctl.current_buffer().len(), 1);

        advance(20_000).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
        ctl.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_one_keeps_most_recent() {
        let source = ScriptedSource::new(vec![Ok(1.0), Ok(2.0), Ok(3.0)], Duration::ZERO);
        let mut ctl = controller(source, 1);
        ctl.start().unwrap();

        advance(1).await;
        assert_eq!(bz_values(&ctl.current_buffer()), vec![1.0]);
        advance(INTERVAL.as_millis() as u64).await;
        assert_eq!(bz_values(&ctl.current_buffer()), vec![2.0]);
        advance(INTERVAL.as_millis() as u64).await;
        assert_eq!(bz_values(&ctl.current_buffer()), vec![3.0]);
        ctl.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle_errors() {
        let source = ScriptedSource::new(vec![], Duration::ZERO);
        let mut ctl = controller(source, 30);

        ctl.start().unwrap();
        assert_eq!(ctl.start(), Err(ControllerError::AlreadyRunning));

        ctl.stop().await;
        ctl.stop().await;
        assert_eq!(ctl.start(), Err(ControllerError::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_each_publish() {
        let source = ScriptedSource::new(vec![Ok(5.0)], Duration::ZERO);
        let mut ctl = controller(source, 30);
        let mut rx = ctl.handle().subscribe();
        ctl.start().unwrap();

        loop {
            rx.changed().await.unwrap();
            if rx.borrow_and_update().fetch_state == FetchState::Success {
                break;
            }
        }
        assert_eq!(bz_values(&rx.borrow().readings.to_vec()), vec![5.0]);
        ctl.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_running_controller() {
        let source = ScriptedSource::new(vec![Ok(1.0), Ok(2.0), Ok(3.0)], Duration::ZERO);
        let mut ctl = controller(source.clone(), 30);
        let handle = ctl.handle();
        ctl.start().unwrap();

        advance(1).await;
        drop(ctl);
        advance(10 * INTERVAL.as_millis() as u64).await;

        assert_eq!(source.calls(), 1);
        assert_eq!(bz_values(&handle.current_buffer()), vec![1.0]);
        assert_eq!(handle.phase(), PollerPhase::Stopped);
    }

    /// Panics on the first call, then answers normally.
    struct PanicOnceSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SolarWindSource for PanicOnceSource {
        async fn fetch_latest(&self) -> anyhow::Result<UpstreamResponse<SolarWindData>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("source bug");
            }
            Ok(UpstreamResponse::ok(SolarWindData {
                bz: -2.0,
                bt: 6.0,
                speed: 380.0,
                density: 3.0,
                dst: -5.0,
            }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_source_does_not_kill_polling() {
        let source = Arc::new(PanicOnceSource {
            calls: AtomicUsize::new(0),
        });
        let mut ctl = PollingController::new(
            DataFetcher::new(source.clone()),
            INTERVAL,
            NonZeroUsize::new(30).unwrap(),
        );
        ctl.start().unwrap();

        advance(1).await;
        assert!(matches!(ctl.fetch_state(), FetchState::Error(_)));
        assert_eq!(ctl.phase(), PollerPhase::Waiting);

        advance(INTERVAL.as_millis() as u64).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(bz_values(&ctl.current_buffer()), vec![-2.0]);
        assert_eq!(ctl.fetch_state(), FetchState::Success);
        ctl.stop().await;
    }
}
