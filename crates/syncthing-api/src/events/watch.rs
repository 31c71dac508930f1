// Event watcher
//
// Primes a cursor from the newest event, then long-polls `/rest/events`
// in a spawned task, handing each event to a caller-supplied callback.
// The task owns the cursor; the caller owns a `Subscription` and stops
// the loop through its cancellation token.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::types::{Event, EventType};
use super::EventQuery;
use crate::client::SyncthingClient;
use crate::error::Error;

// ── Options ──────────────────────────────────────────────────────────

/// What the poll loop does when a request fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PollErrorPolicy {
    /// Stop the subscription; the error surfaces through
    /// [`Subscription::closed`].
    #[default]
    Halt,
    /// Wait with exponential backoff and poll again from the same cursor.
    Retry(BackoffConfig),
}

/// Backoff between failed poll attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay before the first retry. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on the delay. Default: 30s.
    pub max_delay: Duration,

    /// Consecutive failures tolerated before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

impl BackoffConfig {
    /// Exponential backoff with jitter.
    ///
    /// `delay = min(initial * 2^attempt, max) * (1 ± 0.25)`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.min(30)).unwrap_or(30);
        let base = self.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());

        // Deterministic jitter seeded from the attempt number.
        let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
        Duration::from_secs_f64((capped * jitter_factor).max(0.0))
    }
}

/// Tuning for [`SyncthingClient::watch_with`] and [`Events::stream`](super::Events::stream).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchOptions {
    /// `timeout` sent with each poll. `None` leaves the daemon default (60s).
    pub server_timeout: Option<Duration>,
    /// `limit` sent with each poll.
    pub limit: Option<u32>,
    pub on_error: PollErrorPolicy,
}

impl WatchOptions {
    pub fn retry(backoff: BackoffConfig) -> Self {
        Self {
            on_error: PollErrorPolicy::Retry(backoff),
            ..Self::default()
        }
    }
}

// ── EventCursor ──────────────────────────────────────────────────────

/// Highest event id handed to the consumer. Never moves backward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCursor {
    since: u64,
}

impl EventCursor {
    pub fn new(since: u64) -> Self {
        Self { since }
    }

    pub fn since(self) -> u64 {
        self.since
    }

    /// Move to `last_id` after a delivered batch.
    ///
    /// Returns `false` and keeps the current position when `last_id` is
    /// lower, which happens when the daemon restarted and its ids reset.
    pub fn advance(&mut self, last_id: u64) -> bool {
        if last_id < self.since {
            warn!(
                cursor = self.since,
                last_id, "event ids went backwards, daemon may have restarted"
            );
            return false;
        }
        self.since = last_id;
        true
    }
}

// ── Poller ───────────────────────────────────────────────────────────

/// Filter, options and cursor of one subscription.
pub(crate) struct Poller {
    client: SyncthingClient,
    filter: Vec<EventType>,
    options: WatchOptions,
    pub(crate) cursor: EventCursor,
}

impl Poller {
    /// Position the cursor at the newest existing event so the backlog is
    /// skipped. Not retried.
    pub(crate) async fn prime(
        client: SyncthingClient,
        filter: Vec<EventType>,
        options: WatchOptions,
    ) -> Result<Self, Error> {
        let since = client.events().latest_id(&filter).await?;
        debug!(since, "primed event cursor");
        Ok(Self {
            client,
            filter,
            options,
            cursor: EventCursor::new(since),
        })
    }

    fn next_query(&self) -> EventQuery {
        let mut query = EventQuery::after(&self.filter, self.cursor.since());
        query.limit = self.options.limit;
        query.timeout = self.options.server_timeout;
        query
    }

    /// Fetch the next batch, applying the error policy.
    ///
    /// `Ok(None)` means `cancel` fired; a response that arrives after
    /// cancellation is discarded.
    pub(crate) async fn poll(&self, cancel: &CancellationToken) -> Result<Option<Vec<Event>>, Error> {
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(None);
            }

            let result = self.client.events().fetch(&self.next_query()).await;

            if cancel.is_cancelled() {
                return Ok(None);
            }

            let err = match result {
                Ok(batch) => return Ok(Some(batch)),
                Err(e) => e,
            };

            let PollErrorPolicy::Retry(backoff) = &self.options.on_error else {
                error!(error = %err, since = self.cursor.since(), "event poll failed, stopping");
                return Err(err);
            };

            if let Some(max) = backoff.max_retries {
                if attempt >= max {
                    error!(
                        error = %err,
                        max_retries = max,
                        "event poll retry limit reached, giving up"
                    );
                    return Err(err);
                }
            }

            let delay = backoff.calculate_backoff(attempt);
            warn!(
                error = %err,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "event poll failed, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(None),
                () = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }
}

/// Poll until cancelled or halted, delivering each batch in server order.
async fn run<F, Fut>(
    mut poller: Poller,
    cancel: CancellationToken,
    mut callback: F,
) -> Result<(), Error>
where
    F: FnMut(Event) -> Fut,
    Fut: Future<Output = ()>,
{
    let outcome = loop {
        let batch = match poller.poll(&cancel).await {
            Ok(Some(batch)) => batch,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        };

        let Some(last_id) = batch.last().map(|e| e.id) else {
            continue;
        };

        for event in batch {
            callback(event).await;
        }
        poller.cursor.advance(last_id);
    };

    info!(
        since = poller.cursor.since(),
        failed = outcome.is_err(),
        "event subscription stopped"
    );
    outcome
}

// ── Subscription ─────────────────────────────────────────────────────

/// Handle to a running watch.
///
/// Dropping the handle detaches the task; call [`cancel`](Self::cancel) to
/// stop it.
#[derive(Debug)]
pub struct Subscription {
    cancel: CancellationToken,
    task: JoinHandle<Result<(), Error>>,
    initial_cursor: u64,
}

impl Subscription {
    /// Stop polling. Idempotent. A request already in flight is left to
    /// finish and its events are dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A clone of the token, for wiring into other shutdown paths.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cursor position right after priming.
    pub fn initial_cursor(&self) -> u64 {
        self.initial_cursor
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the poll loop to end and return how it ended.
    pub async fn closed(self) -> Result<(), Error> {
        self.task
            .await
            .map_err(|e| Error::WatchTask(e.to_string()))?
    }
}

// ── Client entry points ──────────────────────────────────────────────

impl SyncthingClient {
    /// Deliver every future event matching `filter` to `callback`.
    ///
    /// An empty filter means all event types. Priming happens before this
    /// returns, so events emitted afterwards are never missed.
    pub async fn watch<I, F>(&self, filter: I, mut callback: F) -> Result<Subscription, Error>
    where
        I: IntoIterator<Item = EventType>,
        F: FnMut(Event) + Send + 'static,
    {
        self.watch_with(filter, WatchOptions::default(), move |event| {
            callback(event);
            std::future::ready(())
        })
        .await
    }

    /// Like [`watch`](Self::watch), with options and an async callback.
    ///
    /// Each callback future is awaited before the next event is delivered.
    pub async fn watch_with<I, F, Fut>(
        &self,
        filter: I,
        options: WatchOptions,
        callback: F,
    ) -> Result<Subscription, Error>
    where
        I: IntoIterator<Item = EventType>,
        F: FnMut(Event) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let filter: Vec<EventType> = filter.into_iter().collect();
        let poller = Poller::prime(self.clone(), filter, options).await?;
        let initial_cursor = poller.cursor.since();

        info!(
            filter = ?poller.filter,
            since = initial_cursor,
            "event subscription started"
        );

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(poller, cancel.clone(), callback));

        Ok(Subscription {
            cancel,
            task,
            initial_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backoff_config() {
        let config = BackoffConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_grows_then_caps() {
        let config = BackoffConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };

        let first = config.calculate_backoff(0);
        let third = config.calculate_backoff(2);
        assert!(first <= Duration::from_millis(1250));
        assert!(third > first);

        // Jitter factor tops out at 1.25.
        for attempt in 4..40 {
            assert!(config.calculate_backoff(attempt) <= Duration::from_millis(12_500));
        }
    }

    #[test]
    fn cursor_moves_forward() {
        let mut cursor = EventCursor::new(10);
        assert!(cursor.advance(12));
        assert_eq!(cursor.since(), 12);
        assert!(cursor.advance(12));
        assert_eq!(cursor.since(), 12);
    }

    #[test]
    fn cursor_never_moves_backward() {
        let mut cursor = EventCursor::new(500);
        assert!(!cursor.advance(3));
        assert_eq!(cursor.since(), 500);
    }

    #[test]
    fn default_options_halt_on_error() {
        let options = WatchOptions::default();
        assert_eq!(options.on_error, PollErrorPolicy::Halt);
        assert!(options.server_timeout.is_none());
        assert!(options.limit.is_none());
    }
}
