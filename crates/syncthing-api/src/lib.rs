// syncthing-api: Async Rust client for the Syncthing REST API, with a long-poll event watcher

pub mod client;
pub mod error;
pub mod events;
pub mod query;
pub mod system;
pub mod transport;
pub mod types;

pub use client::{ClientConfig, SyncthingClient};
pub use error::Error;
pub use events::{
    BackoffConfig, Event, EventCursor, EventPayload, EventQuery, EventType, Events, ItemAction,
    PollErrorPolicy, Subscription, WatchOptions,
};
pub use query::Query;
pub use system::System;
pub use transport::{
    ApiRequest, RequestBody, Response, ResponseBody, TlsMode, Transport, TransportConfig,
};
