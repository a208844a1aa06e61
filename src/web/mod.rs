//! # Módulo Web: API HTTP da SophIA
//!
//! Front-end fino em **Axum** + **SSE** sobre o orquestrador.
//!
//! ## Rotas
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Cliente (chat, CLI, curl)                                    │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo, CORS permissivo)                   │
//! │  ├── GET  /status                       → capacidades        │
//! │  ├── POST /ask                          → Response           │
//! │  ├── GET  /events                       → SSE do pipeline    │
//! │  ├── GET  /knowledge/stats              → estatísticas       │
//! │  ├── GET  /knowledge/graph              → grafo JSON         │
//! │  ├── GET  /knowledge/consistency        → relatório          │
//! │  ├── POST /knowledge/train              → treino em lote     │
//! │  ├── GET  /session/summary              → resumo             │
//! │  ├── GET  /session/history              → respostas          │
//! │  ├── GET  /session/history/{id}/explain → explicação         │
//! │  └── POST /session/save                 → snapshot em disco  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`events`] | Conversão de eventos do pipeline em SSE |
//! | [`handlers`] | Handlers Axum para cada rota |

pub mod events;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // ── Pipeline ──────────────────────────────────────────
        .route("/status", get(handlers::status))
        .route("/ask", post(handlers::ask))
        .route("/events", get(handlers::sse_events))
        // ── Conhecimento ─────────────────────────────────────
        .route("/knowledge/stats", get(handlers::knowledge_stats))
        .route("/knowledge/graph", get(handlers::graph_data))
        .route("/knowledge/consistency", get(handlers::consistency))
        .route("/knowledge/train", post(handlers::train))
        // ── Sessão ────────────────────────────────────────────
        .route("/session/summary", get(handlers::session_summary))
        .route("/session/history", get(handlers::session_history))
        .route("/session/history/{id}/explain", get(handlers::explain))
        .route("/session/save", post(handlers::save_session))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::OrchestratorConfig;
    use crate::knowledge::{KnowledgeState, SharedKnowledge};
    use crate::orchestrator::{Capabilities, ReasoningOrchestrator};
    use crate::persistence::SnapshotStore;

    fn app(dir: &std::path::Path) -> (Router, AppState) {
        let orchestrator = ReasoningOrchestrator::new(
            SharedKnowledge::new(KnowledgeState::seeded()),
            Capabilities::local(),
            OrchestratorConfig {
                seed: Some(1),
                ..OrchestratorConfig::default()
            },
        );
        let state = AppState::new(Arc::new(orchestrator), SnapshotStore::new(dir), 2);
        (create_router(state.clone()), state)
    }

    async fn call(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn status_reports_local_capabilities() {
        let dir = tempfile::tempdir().unwrap();
        let (router, _) = app(dir.path());
        let (status, body) = call(router, "GET", "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["capabilities"]["extractors"], json!(["lexical", "keyword"]));
        assert_eq!(body["capabilities"]["generator"], Value::Null);
        assert!(body["concepts"].as_u64().unwrap() > 0);
    }

    /// Sem gerador a resposta é a padrão, mas a análise vem completa.
    #[tokio::test]
    async fn ask_then_explain() {
        let dir = tempfile::tempdir().unwrap();
        let (router, _) = app(dir.path());
        let (status, body) = call(
            router.clone(),
            "POST",
            "/ask",
            Some(json!({ "question": "La justice peut-elle être injuste ?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generation_mode"], "canned");
        assert_eq!(body["confidence"], 0.0);
        assert!(body["analysis"]["concepts"]
            .as_array()
            .unwrap()
            .contains(&json!("JUSTICE")));

        let id = body["id"].as_str().unwrap();
        let (status, explanation) = call(router.clone(), "GET", &format!("/session/history/{id}/explain"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(explanation["steps"][0]["title"], "Détection des concepts");

        let (_, summary) = call(router, "GET", "/session/summary", None).await;
        assert_eq!(summary["total_interactions"], 1);
    }

    #[tokio::test]
    async fn empty_question_and_unknown_id_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (router, _) = app(dir.path());
        let (status, _) = call(router.clone(), "POST", "/ask", Some(json!({ "question": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/session/history/{}/explain", uuid::Uuid::nil());
        let (status, _) = call(router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn train_updates_transitions_and_rejects_unknown_names() {
        let dir = tempfile::tempdir().unwrap();
        let (router, state) = app(dir.path());
        let (status, stats) = call(
            router.clone(),
            "POST",
            "/knowledge/train",
            Some(json!({ "sequences": [["JUSTICE", "BIEN"]], "epochs": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["transitions_learned"], 3);
        assert_eq!(state.knowledge().snapshot().model.get("JUSTICE", "BIEN").unwrap().frequency, 3);

        let (status, _) = call(
            router,
            "POST",
            "/knowledge/train",
            Some(json!({ "sequences": [["JUSTICE", "LICORNE"]] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn save_writes_and_prunes_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let (router, state) = app(dir.path());
        for _ in 0..3 {
            let (status, body) = call(router.clone(), "POST", "/session/save", None).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body["path"].as_str().unwrap().ends_with(".json"));
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(state.store.list().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn graph_and_consistency_are_served() {
        let dir = tempfile::tempdir().unwrap();
        let (router, _) = app(dir.path());
        let (status, graph) = call(router.clone(), "GET", "/knowledge/graph", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!graph["concepts"].as_array().unwrap().is_empty());
        assert!(!graph["relations"].as_array().unwrap().is_empty());

        let (status, report) = call(router, "GET", "/knowledge/consistency", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(report.get("is_consistent").is_some());
    }
}
