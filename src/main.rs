#![allow(dead_code)]
#![allow(rustdoc::broken_intra_doc_links)]
//! # SophIA: Núcleo de Raciocínio Conceitual
//!
//! **Ponto de entrada** do servidor de perguntas filosóficas.
//!
//! Uma pergunta passa por extração de conceitos, raciocínio sobre
//! transições aprendidas, geração de texto com restrições, validação e
//! aprendizado online. O texto vem de um gerador externo (Ollama); sem ele
//! o sistema continua de pé e responde com a análise e uma resposta padrão.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG, padrão info)
//!   ├── Carrega Config (sophia.toml + ambiente)
//!   ├── Carrega o snapshot mais recente (ou semeia o conjunto curado)
//!   ├── Sonda o Ollama → Capabilities (com ou sem LLM)
//!   ├── Monta ReasoningOrchestrator, AppState e Router
//!   ├── Serve HTTP até Ctrl-C
//!   └── Salva um snapshot final
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Executar com logs padrão (info)
//! cargo run
//!
//! # Logs detalhados, modelo alternativo, sem Ollama
//! RUST_LOG=debug SOPHIA_MODEL=mistral cargo run
//!
//! curl -X POST localhost:3000/ask -H 'content-type: application/json' \
//!      -d '{"question": "La justice peut-elle être injuste ?"}'
//! ```

/// Módulo `config`: configuração em camadas (padrões, TOML, ambiente).
mod config;

/// Módulo `constraints`: validação de texto gerado por regras ponderadas.
mod constraints;

/// Módulo `core`: ontologia de conceitos filosóficos tipados.
mod core;

/// Módulo `error`: taxonomia de erros e degradações.
mod error;

/// Módulo `knowledge`: estado compartilhado com escritor único.
mod knowledge;

/// Módulo `lcm`: modelo de transições conceituais.
mod lcm;

/// Módulo `llm`: contrato de geração e cliente Ollama.
mod llm;

/// Módulo `nlu`: extração de conceitos (LLM, léxico, palavras-chave).
mod nlu;

/// Módulo `orchestrator`: pipeline pergunta → resposta.
mod orchestrator;

/// Módulo `persistence`: snapshots versionados da sessão.
mod persistence;

/// Módulo `web`: servidor axum, handlers JSON e SSE.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, OllamaConfig};
use crate::knowledge::{KnowledgeState, SharedKnowledge};
use crate::llm::{OllamaClient, ProbeStatus};
use crate::orchestrator::{Capabilities, ReasoningOrchestrator};
use crate::persistence::SnapshotStore;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("SophIA: iniciando...");
    let config = Config::load()?;

    let store = SnapshotStore::new(&config.storage.data_dir);
    let state = match store.load_latest() {
        Ok(Some(state)) => state,
        Ok(None) => {
            tracing::info!("Semeando o conjunto curado de conceitos");
            KnowledgeState::seeded()
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "Snapshot ilegível, semeando o conjunto curado");
            KnowledgeState::seeded()
        }
    };

    let capabilities = build_capabilities(&config.ollama).await;
    let orchestrator = Arc::new(ReasoningOrchestrator::new(
        SharedKnowledge::new(state),
        capabilities,
        config.orchestrator.clone(),
    ));
    let app_state = AppState::new(orchestrator, store, config.storage.keep_snapshots);
    let app = web::create_router(app_state.clone());

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("falha ao escutar em {}", config.server.addr))?;
    tracing::info!(addr = %config.server.addr, "Servidor no ar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let path = app_state.save_snapshot()?;
    tracing::info!(path = %path.display(), "Sessão salva, até logo");
    Ok(())
}

/// Sonda o Ollama uma vez; qualquer problema cai nas estratégias locais.
async fn build_capabilities(config: &OllamaConfig) -> Capabilities {
    if !config.enabled {
        tracing::info!("Ollama desativado na configuração, modo local");
        return Capabilities::local();
    }
    let client = match OllamaClient::new(
        config.host.as_str(),
        config.model.as_str(),
        config.request_timeout(),
        config.constrained_attempts,
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Cliente Ollama indisponível, modo local");
            return Capabilities::local();
        }
    };
    match client.probe().await {
        ProbeStatus::Ready(model) => {
            tracing::info!(model = %model, "Ollama pronto");
            Capabilities::with_ollama(client.with_model(model))
        }
        ProbeStatus::ModelMissing { available } => {
            tracing::warn!(model = %config.model, available = ?available, "Modelo não instalado no Ollama, modo local");
            Capabilities::local()
        }
        ProbeStatus::Unreachable(reason) => {
            tracing::warn!(host = %config.host, reason = %reason, "Ollama fora do ar, modo local");
            Capabilities::local()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Falha ao instalar o handler de Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Encerrando...");
}
