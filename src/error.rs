//! # Taxonomia de Erros
//!
//! Erros de domínio do núcleo de raciocínio conceitual. Só
//! [`SophiaError::UnknownConcept`] e [`SophiaError::InconsistentRelation`]
//! são fatais para quem chama a ontologia ou o modelo de transições; os
//! demais descrevem **degradações** que o orquestrador absorve e registra
//! na resposta (nunca propagam além dele).
//!
//! | Variante | Origem | Efeito no pipeline |
//! |----------|--------|--------------------|
//! | `ExtractionDegraded` | estratégia de extração | passa para a próxima da cascata |
//! | `ReasoningEmpty` | modelo de transições | caminho trivial `[conceito]` |
//! | `GenerationUnavailable` | backend de geração | retry simplificado, depois resposta padrão |
//! | `UnknownConcept` | ontologia / LCM | erro ao chamador (o orquestrador nunca o provoca) |
//! | `InconsistentRelation` | ontologia | relação rejeitada, estado intacto |
//!
//! Bordas de infraestrutura (snapshot, configuração, servidor) usam
//! `anyhow::Result` com contexto, como o resto do binário.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Erro de domínio. Serializável para aparecer em `Response::degradations`.
#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SophiaError {
    /// Nome fora do vocabulário da ontologia.
    #[error("conceito desconhecido: {0}")]
    UnknownConcept(String),

    /// Nome vazio após normalização.
    #[error("nome de conceito vazio")]
    EmptyConceptName,

    /// Relação recusada pela guarda de consistência da ontologia.
    #[error("relação inconsistente {from} {relation} {to}: {reason}")]
    InconsistentRelation {
        from: String,
        relation: String,
        to: String,
        reason: String,
    },

    /// Estratégia de extração falhou ou não reconheceu nada.
    #[error("extração degradada: {0}")]
    ExtractionDegraded(String),

    /// Conceito sem transições de saída.
    #[error("nenhuma transição a partir de {0}")]
    ReasoningEmpty(String),

    /// Backend de geração indisponível, lento ou com saída inválida.
    #[error("geração indisponível: {0}")]
    GenerationUnavailable(String),
}

/// Atalho para resultados de domínio.
pub type Result<T> = std::result::Result<T, SophiaError>;
