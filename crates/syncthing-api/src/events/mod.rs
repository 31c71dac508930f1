//! Event log access: one-shot reads, callback subscriptions, and streams.
//!
//! The daemon exposes its event log as a long-poll endpoint. Everything
//! here is built from a single primitive, [`Events::fetch`]; the watcher in
//! [`watch`] layers a cursor and a cancellable loop on top of it.
//!
//! # Example
//!
//! ```rust,ignore
//! use syncthing_api::{EventType, SyncthingClient};
//!
//! let sub = client
//!     .watch([EventType::ItemFinished], |event| {
//!         println!("{} {}", event.id, event.data);
//!     })
//!     .await?;
//!
//! // later
//! sub.cancel();
//! sub.closed().await?;
//! ```

pub mod types;
pub mod watch;

use std::time::Duration;

use futures_core::Stream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::SyncthingClient;
use crate::error::Error;
use crate::query::Query;
use crate::transport::ApiRequest;

pub use types::{Event, EventPayload, EventType, ItemAction};
pub use watch::{BackoffConfig, EventCursor, PollErrorPolicy, Subscription, WatchOptions};

use watch::Poller;

/// Server-side long-poll timeout the daemon applies when none is requested.
pub const DEFAULT_SERVER_TIMEOUT: Duration = Duration::from_secs(60);

/// Slack added on top of the server-side timeout for the client-side one.
pub const LONG_POLL_GRACE: Duration = Duration::from_secs(15);

// ── EventQuery ───────────────────────────────────────────────────────

/// Parameters of one `GET /rest/events` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Empty means every event type.
    pub events: Vec<EventType>,
    /// Only events with a greater id are returned.
    pub since: Option<u64>,
    pub limit: Option<u32>,
    /// How long the daemon may hold the request open.
    pub timeout: Option<Duration>,
}

impl EventQuery {
    /// At most the single newest event, without blocking. Used for priming.
    pub fn latest(events: &[EventType]) -> Self {
        Self {
            events: events.to_vec(),
            since: None,
            limit: Some(1),
            timeout: Some(Duration::ZERO),
        }
    }

    /// Block until events newer than `since` exist.
    pub fn after(events: &[EventType], since: u64) -> Self {
        Self {
            events: events.to_vec(),
            since: Some(since),
            limit: None,
            timeout: None,
        }
    }

    pub fn to_query(&self) -> Query {
        Query::new()
            .list("events", self.events.iter().map(EventType::as_str))
            .opt("since", self.since)
            .opt("limit", self.limit)
            .opt("timeout", self.timeout.map(whole_seconds))
    }

    /// Client-side timeout that outlasts the server-side hold.
    fn request_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_SERVER_TIMEOUT) + LONG_POLL_GRACE
    }
}

/// The daemon takes whole seconds. Fractions round up so a short hold
/// never turns into a non-blocking poll.
fn whole_seconds(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

// ── Events ───────────────────────────────────────────────────────────

/// Borrowed handle over `/rest/events`.
#[derive(Debug, Clone, Copy)]
pub struct Events<'a> {
    client: &'a SyncthingClient,
}

impl<'a> Events<'a> {
    pub(crate) fn new(client: &'a SyncthingClient) -> Self {
        Self { client }
    }

    /// One read of the event log.
    ///
    /// `GET /rest/events?events=..&since=..&limit=..&timeout=..`
    pub async fn fetch(&self, query: &EventQuery) -> Result<Vec<Event>, Error> {
        let req = ApiRequest::get("events")
            .query(query.to_query())
            .timeout(query.request_timeout());
        let events: Vec<Event> = self.client.transport().request(req).await?.json()?;
        debug!(count = events.len(), since = ?query.since, "fetched events");
        Ok(events)
    }

    /// Id of the newest event matching `filter`, or `0` for an empty log.
    pub async fn latest_id(&self, filter: &[EventType]) -> Result<u64, Error> {
        let newest = self.fetch(&EventQuery::latest(filter)).await?;
        Ok(newest.last().map_or(0, |e| e.id))
    }

    /// Events newer than "now" as a `Stream`.
    ///
    /// Primes the cursor on first poll, then long-polls forever. Dropping the
    /// stream ends the subscription. A failure that the error policy does
    /// not absorb is yielded once and ends the stream.
    pub fn stream(
        &self,
        filter: Vec<EventType>,
        options: WatchOptions,
    ) -> impl Stream<Item = Result<Event, Error>> + Send + 'static {
        let client = self.client.clone();
        async_stream::try_stream! {
            let mut poller = Poller::prime(client, filter, options).await?;
            let never = CancellationToken::new();
            loop {
                let batch = match poller.poll(&never).await? {
                    Some(batch) => batch,
                    None => break,
                };
                let last_id = batch.last().map(|e| e.id);
                for event in batch {
                    yield event;
                }
                if let Some(id) = last_id {
                    poller.cursor.advance(id);
                }
            }
        }
    }
}
