pub mod admin;
pub mod applications;
pub mod auth;
pub mod chat;
pub mod checklist;
pub mod events;
pub mod inquiries;
pub mod pages;
pub mod session;

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// `?confirm=true` for irreversible deletes.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Streams live snapshots as server-sent events.
///
/// Each snapshot is one `snapshot` event with a JSON payload. A failed fetch
/// becomes an `error` event and the stream keeps going.
pub fn live<S, T>(snapshots: S) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: Stream<Item = Result<T, AppError>> + Send + 'static,
    T: Serialize + 'static,
{
    let events = snapshots.map(|snapshot| {
        let event = match snapshot {
            Ok(value) => Event::default()
                .event("snapshot")
                .json_data(&value)
                .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())),
            Err(e) => {
                tracing::error!(error = %e, "live snapshot failed");
                Event::default().event("error").data(e.to_string())
            }
        };
        Ok(event)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
