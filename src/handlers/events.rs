use axum::{
    extract::State,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use crate::services::AppState;

const CLIENT_RETRY: Duration = Duration::from_millis(5000);
const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Streams bus events as Server-Sent Events. The subscription lives as long
/// as the response stream, so a disconnecting client unsubscribes.
pub async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let subscription = state.dispatcher.subscribe();

    let events = stream::unfold(subscription, |mut subscription| async move {
        let event = subscription.recv().await?;
        let frame = match SseEvent::default().json_data(&event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, kind = event.kind(), "failed to encode event");
                SseEvent::default().comment("encode error")
            }
        };
        Some((Ok(frame), subscription))
    });

    let retry = stream::once(async { Ok(SseEvent::default().retry(CLIENT_RETRY)) });

    Sse::new(retry.chain(events)).keep_alive(KeepAlive::new().interval(KEEP_ALIVE))
}
