//! Event-stream response for reload subscriptions.
//!
//! # Data Flow
//! ```text
//! ReloadChannel::subscribe
//!     → Subscription (receiver)
//!     → Sse body (one frame per ReloadEvent)
//!     → closed when the channel drops the sender
//! ```

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures_util::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::reload::{ReloadEvent, Subscription};

/// Wire frame for a reload event.
pub fn frame(event: ReloadEvent) -> Event {
    Event::default().event(event.name()).data(event.data())
}

/// Hold the connection open, streaming events until the subscription closes.
pub fn subscription_response(subscription: Subscription, heartbeat: Option<Duration>) -> Response {
    tracing::debug!(subscription = %subscription.id(), "Event stream opened");

    let stream = UnboundedReceiverStream::new(subscription.into_receiver())
        .map(|event| Ok::<_, Infallible>(frame(event)));
    let headers = [(header::CONNECTION, "keep-alive")];

    match heartbeat {
        Some(interval) => (
            headers,
            Sse::new(stream).keep_alive(KeepAlive::new().interval(interval)),
        )
            .into_response(),
        None => (headers, Sse::new(stream)).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::ReloadChannel;

    #[tokio::test]
    async fn stream_carries_frames_until_closed() {
        let channel = ReloadChannel::default();
        let response = subscription_response(channel.subscribe(), None);

        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        assert_eq!(response.headers()[header::CONNECTION], "keep-alive");

        assert_eq!(channel.trigger(), 1);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            "event: connected\ndata: ready\n\nevent: message\ndata: reload\n\n"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_sends_comment_frames() {
        let channel = ReloadChannel::default();
        let response = subscription_response(channel.subscribe(), Some(Duration::from_secs(10)));
        let mut body = response.into_body().into_data_stream();

        let connected = body.next().await.unwrap().unwrap();
        assert_eq!(&connected[..], b"event: connected\ndata: ready\n\n");

        let heartbeat = tokio::time::timeout(Duration::from_secs(11), body.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(heartbeat.starts_with(b":"), "got {:?}", heartbeat);

        assert_eq!(channel.trigger(), 1);
        let reload = body.next().await.unwrap().unwrap();
        assert_eq!(&reload[..], b"event: message\ndata: reload\n\n");
    }
}
