//! # Eventos SSE do Pipeline
//!
//! Converte o canal broadcast de [`PipelineEvent`] num stream SSE. O nome
//! do evento SSE é o discriminador `type`, então o cliente pode assinar só
//! o que interessa:
//!
//! ```text
//! event: stage_entered
//! data: {"type":"stage_entered","request_id":"...","stage":"reasoning"}
//!
//! event: completed
//! data: {"type":"completed","request_id":"...","confidence":0.71,...}
//! ```
//!
//! Assinantes atrasados perdem eventos (`Lagged`) silenciosamente.

use std::convert::Infallible;

use axum::response::sse::Event as SseEvent;
use futures_util::stream::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::orchestrator::PipelineEvent;

/// Nome do evento SSE para cada variante.
pub fn event_name(event: &PipelineEvent) -> &'static str {
    match event {
        PipelineEvent::StageEntered { .. } => "stage_entered",
        PipelineEvent::Degraded { .. } => "degraded",
        PipelineEvent::LearningApplied { .. } => "learning_applied",
        PipelineEvent::Completed { .. } => "completed",
    }
}

pub fn to_sse(event: &PipelineEvent) -> Option<SseEvent> {
    let data = serde_json::to_string(event).ok()?;
    Some(SseEvent::default().event(event_name(event)).data(data))
}

pub fn pipeline_stream(
    rx: broadcast::Receiver<PipelineEvent>,
) -> impl Stream<Item = Result<SseEvent, Infallible>> {
    BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => to_sse(&event).map(Ok),
            Err(_) => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::orchestrator::Stage;

    #[tokio::test]
    async fn broadcast_events_reach_the_stream() {
        let (tx, rx) = broadcast::channel(8);
        let stream = pipeline_stream(rx);
        tx.send(PipelineEvent::StageEntered {
            request_id: Uuid::nil(),
            stage: Stage::Extracting,
        })
        .unwrap();
        drop(tx);

        let events: Vec<_> = stream.collect().await;
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn event_names_match_the_json_tag() {
        let event = PipelineEvent::StageEntered {
            request_id: Uuid::nil(),
            stage: Stage::Complete,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event_name(&event));
    }
}
