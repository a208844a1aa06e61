//! # Handlers HTTP
//!
//! Camada fina sobre o [`ReasoningOrchestrator`](crate::orchestrator::ReasoningOrchestrator)
//! e o conhecimento compartilhado. Toda resposta é JSON, exceto `/events`.
//!
//! | Handler | Método | Rota | Resposta |
//! |---------|--------|------|----------|
//! | `status` | GET | `/status` | capacidades e tamanhos |
//! | `ask` | POST | `/ask` | [`Response`] completa |
//! | `sse_events` | GET | `/events` | stream SSE de [`PipelineEvent`](crate::orchestrator::PipelineEvent) |
//! | `knowledge_stats` | GET | `/knowledge/stats` | ontologia + modelo + treino |
//! | `graph_data` | GET | `/knowledge/graph` | nós, relações e transições |
//! | `consistency` | GET | `/knowledge/consistency` | [`ConsistencyReport`] |
//! | `train` | POST | `/knowledge/train` | [`BatchStats`] |
//! | `session_summary` | GET | `/session/summary` | [`SessionSummary`] |
//! | `session_history` | GET | `/session/history` | respostas da sessão |
//! | `explain` | GET | `/session/history/{id}/explain` | [`Explanation`] |
//! | `save_session` | POST | `/session/save` | caminho do snapshot |
//!
//! Erros seguem `(StatusCode, String)`.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::pipeline_stream;
use super::state::AppState;
use crate::core::{ConceptType, ConsistencyReport, OntologyStats, RelationType};
use crate::error::SophiaError;
use crate::lcm::{BatchStats, ModelStats, TrainingSummary};
use crate::orchestrator::{CapabilityStatus, Explanation, Response, SessionSummary};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

// ─── Status ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub ready: bool,
    pub capabilities: CapabilityStatus,
    pub concepts: usize,
    pub relations: usize,
    pub transitions: usize,
    pub interactions: usize,
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.knowledge().snapshot();
    Json(StatusResponse {
        ready: true,
        capabilities: state.orchestrator.capabilities().status(),
        concepts: snapshot.ontology.concept_count(),
        relations: snapshot.ontology.relation_count(),
        transitions: snapshot.model.transition_count(),
        interactions: state.orchestrator.history().len(),
    })
}

// ─── Perguntas ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// POST `/ask`: roda o pipeline completo.
///
/// Só uma pergunta vazia é recusada; qualquer outra recebe uma resposta,
/// mesmo degradada.
pub async fn ask(State(state): State<AppState>, Json(request): Json<AskRequest>) -> ApiResult<Response> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "pergunta vazia".into()));
    }
    let context = request.context.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let response = state.orchestrator.ask(question, context).await;
    Ok(Json(Response::clone(&response)))
}

/// GET `/events`: eventos do pipeline em tempo real.
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>> {
    Sse::new(pipeline_stream(state.orchestrator.subscribe())).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// ─── Conhecimento ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct KnowledgeStats {
    pub ontology: OntologyStats,
    pub model: ModelStats,
    pub training: TrainingSummary,
}

pub async fn knowledge_stats(State(state): State<AppState>) -> Json<KnowledgeStats> {
    let snapshot = state.knowledge().snapshot();
    Json(KnowledgeStats {
        ontology: snapshot.ontology.stats(),
        model: snapshot.model.stats(&snapshot.ontology),
        training: snapshot.training.summary.clone(),
    })
}

/// Grafo para visualização: conceitos como nós, relações e transições como arestas.
#[derive(Serialize)]
pub struct GraphData {
    pub concepts: Vec<GraphConcept>,
    pub relations: Vec<GraphRelation>,
    pub transitions: Vec<GraphTransition>,
}

#[derive(Serialize)]
pub struct GraphConcept {
    pub name: String,
    pub concept_type: ConceptType,
    pub learning_weight: f64,
}

#[derive(Serialize)]
pub struct GraphRelation {
    pub source: String,
    pub target: String,
    pub relation: RelationType,
}

#[derive(Serialize)]
pub struct GraphTransition {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub frequency: u64,
}

pub async fn graph_data(State(state): State<AppState>) -> Json<GraphData> {
    let snapshot = state.knowledge().snapshot();
    let concepts = snapshot
        .ontology
        .concepts
        .values()
        .map(|c| GraphConcept {
            name: c.name.clone(),
            concept_type: c.concept_type,
            learning_weight: c.learning_weight,
        })
        .collect();
    let relations = snapshot
        .ontology
        .relations()
        .map(|r| GraphRelation {
            source: r.from,
            target: r.to,
            relation: r.relation_type,
        })
        .collect();
    let transitions = snapshot
        .model
        .transitions
        .values()
        .map(|t| GraphTransition {
            source: t.from.clone(),
            target: t.to.clone(),
            weight: t.weight,
            frequency: t.frequency,
        })
        .collect();
    Json(GraphData {
        concepts,
        relations,
        transitions,
    })
}

pub async fn consistency(State(state): State<AppState>) -> Json<ConsistencyReport> {
    Json(state.knowledge().snapshot().ontology.validate_consistency())
}

#[derive(Deserialize)]
pub struct TrainRequest {
    pub sequences: Vec<Vec<String>>,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
}

fn default_epochs() -> usize {
    1
}

/// POST `/knowledge/train`: treino em lote; nomes desconhecidos dão 422.
pub async fn train(State(state): State<AppState>, Json(request): Json<TrainRequest>) -> ApiResult<BatchStats> {
    match state.knowledge().train(&request.sequences, request.epochs) {
        Ok(stats) => Ok(Json(stats)),
        Err(e @ (SophiaError::UnknownConcept(_) | SophiaError::EmptyConceptName)) => {
            Err((StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

// ─── Sessão ──────────────────────────────────────────────────────

pub async fn session_summary(State(state): State<AppState>) -> Json<SessionSummary> {
    Json(state.orchestrator.summary())
}

pub async fn session_history(State(state): State<AppState>) -> Json<Vec<Response>> {
    Json(
        state
            .orchestrator
            .history()
            .iter()
            .map(|r| Response::clone(r))
            .collect(),
    )
}

pub async fn explain(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Explanation> {
    let response = state
        .orchestrator
        .find(id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("resposta {id} não encontrada")))?;
    Ok(Json(state.orchestrator.explain(&response)))
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub path: String,
}

/// POST `/session/save`: grava um snapshot e poda os antigos.
pub async fn save_session(State(state): State<AppState>) -> ApiResult<SaveResponse> {
    let saver = state.clone();
    let path = tokio::task::spawn_blocking(move || saver.save_snapshot())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::error!(error = %e, "Falha ao salvar snapshot");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
        })?;
    Ok(Json(SaveResponse {
        path: path.display().to_string(),
    }))
}
