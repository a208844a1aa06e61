//! # Cliente Ollama
//!
//! Fala com um servidor Ollama local por HTTP e implementa os dois
//! colaboradores externos do pipeline:
//!
//! | Trait | Endpoint | Uso |
//! |-------|----------|-----|
//! | [`TextGenerator`] | `POST /api/generate` | resposta à pergunta |
//! | [`ConceptExtractor`] | `POST /api/generate` | extração JSON de conceitos |
//!
//! `GET /api/tags` serve de sonda na inicialização: o orquestrador só
//! registra o cliente como capacidade quando o modelo está instalado.
//!
//! ## Geração com Restrições
//!
//! ```text
//! tentativa 1: T = 0.8 → texto → restrições ok? → fim
//! tentativa 2: T = 0.6, prompt + "ATTENTION ... Corrige-toi !"
//! tentativa 3: T = 0.4 ...
//! ```
//!
//! Se nenhuma tentativa satisfaz, devolve o último texto com
//! `constraints_satisfied = Some(false)` e o orquestrador decide.

use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GeneratedText, GenerationRequest, TextGenerator};
use crate::error::{Result, SophiaError};
use crate::nlu::{ConceptExtractor, ExtractionResult, RawExtraction};

const TOP_P: f64 = 0.9;
const REPEAT_PENALTY: f64 = 1.1;
const EXTRACTION_TEMPERATURE: f64 = 0.3;
const EXTRACTION_MAX_TOKENS: u32 = 300;
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Temperatura da tentativa `attempt` (a partir de 0).
pub fn attempt_temperature(base: f64, attempt: u32) -> f64 {
    (base - 0.2 * f64::from(attempt)).max(0.3)
}

/// Resultado da sonda de disponibilidade.
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeStatus {
    /// Servidor fora do ar.
    Unreachable(String),
    /// Servidor no ar, modelo não instalado.
    ModelMissing { available: Vec<String> },
    /// Pronto; nome exato do modelo instalado.
    Ready(String),
}

/// Cliente HTTP assíncrono do Ollama.
#[derive(Clone, Debug)]
pub struct OllamaClient {
    http: reqwest::Client,
    host: String,
    model: String,
    max_attempts: u32,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
    top_p: f64,
    repeat_penalty: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsReply {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

impl OllamaClient {
    pub fn new(
        host: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        max_attempts: u32,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("não foi possível criar o cliente HTTP do Ollama")?;
        Ok(Self {
            http,
            host: host.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_attempts: max_attempts.max(1),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Troca o modelo pelo nome exato encontrado na sonda.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Consulta `GET /api/tags` e procura o modelo configurado
    /// (casamento parcial nos dois sentidos: `llama3.1` ↔ `llama3.1:latest`).
    pub async fn probe(&self) -> ProbeStatus {
        let url = format!("{}/api/tags", self.host);
        let reply = self
            .http
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status());
        let tags: TagsReply = match reply {
            Ok(r) => match r.json().await {
                Ok(tags) => tags,
                Err(e) => return ProbeStatus::Unreachable(e.to_string()),
            },
            Err(e) => return ProbeStatus::Unreachable(e.to_string()),
        };
        let available: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        match match_model(&self.model, &available) {
            Some(name) => ProbeStatus::Ready(name.to_string()),
            None => ProbeStatus::ModelMissing { available },
        }
    }

    /// Uma chamada `POST /api/generate` sem streaming.
    pub async fn complete(&self, prompt: &str, temperature: f64, max_tokens: u32) -> Result<String> {
        let body = GenerateBody {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature,
                num_predict: max_tokens,
                top_p: TOP_P,
                repeat_penalty: REPEAT_PENALTY,
            },
        };
        let unavailable = |e: reqwest::Error| SophiaError::GenerationUnavailable(e.to_string());
        let reply: GenerateReply = self
            .http
            .post(format!("{}/api/generate", self.host))
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        let text = reply.response.trim().to_string();
        if text.is_empty() {
            return Err(SophiaError::GenerationUnavailable("resposta vazia".into()));
        }
        Ok(text)
    }
}

/// Primeiro nome instalado compatível com `wanted`.
fn match_model<'a>(wanted: &str, available: &'a [String]) -> Option<&'a str> {
    available
        .iter()
        .find(|name| name.contains(wanted) || wanted.contains(name.as_str()))
        .map(String::as_str)
}

/// Prompt com o bloco de restrições obrigatórias.
fn constrained_prompt(question: &str, instructions: &str) -> String {
    format!(
        "Tu es SophIA, une IA philosophique. Réponds à cette question en respectant \
         ABSOLUMENT les contraintes données.\n\n\
         {question}\n\n\
         CONTRAINTES OBLIGATOIRES:\n{instructions}\n\n\
         Réponds de manière naturelle et philosophiquement cohérente en respectant \
         toutes ces contraintes.\n"
    )
}

/// Prompt de extração JSON.
fn extraction_prompt(question: &str, vocabulary: &BTreeSet<String>) -> String {
    let names: Vec<&str> = vocabulary.iter().map(String::as_str).collect();
    format!(
        "Tu es un expert en philosophie. Analyse ce texte et identifie quels concepts \
         philosophiques y sont présents.\n\n\
         TEXTE À ANALYSER:\n\"{question}\"\n\n\
         CONCEPTS DISPONIBLES:\n{}\n\n\
         INSTRUCTIONS:\n\
         1. Identifie SEULEMENT les concepts de la liste qui sont réellement présents dans le texte\n\
         2. Détermine les relations logiques entre ces concepts\n\
         3. Réponds EXACTEMENT en format JSON comme ceci:\n\
         {{\"concepts\": [\"CONCEPT1\", \"CONCEPT2\"], \
         \"impliedRelations\": [{{\"from\": \"CONCEPT1\", \"relation\": \"IMPLIES\", \"to\": \"CONCEPT2\"}}], \
         \"confidence\": 0.85}}\n\n\
         Types de relations possibles: IMPLIES, CONTRADICTS, IS_A, DEFINES, EXPLAINS, OPPOSES\n\
         Réponds uniquement avec le JSON, sans autre texte.",
        names.join(", ")
    )
}

/// Primeiro bloco `{ ... }` do texto (do primeiro `{` ao último `}`).
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[async_trait]
impl TextGenerator for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedText> {
        let Some(constraints) = &request.constraints else {
            let text = self
                .complete(&request.prompt, request.temperature, request.max_tokens)
                .await?;
            return Ok(GeneratedText::new(text));
        };

        let mut prompt = constrained_prompt(&request.prompt, &constraints.instructions());
        let mut last = String::new();
        for attempt in 0..self.max_attempts {
            let temperature = attempt_temperature(request.temperature, attempt);
            last = self.complete(&prompt, temperature, request.max_tokens).await?;
            let satisfaction = constraints.check_satisfaction(&last);
            if satisfaction.satisfied {
                tracing::debug!(attempt = attempt + 1, "Ollama: restrições satisfeitas");
                return Ok(GeneratedText {
                    text: last,
                    constraints_satisfied: Some(true),
                    attempts: attempt + 1,
                });
            }
            tracing::debug!(
                attempt = attempt + 1,
                failures = ?satisfaction.failures,
                "Ollama: restrições não satisfeitas"
            );
            prompt.push_str(&format!(
                "\n\nATTENTION (Tentative {}): Tu as échoué sur ces contraintes : {}. Corrige-toi !",
                attempt + 2,
                satisfaction.failures.join("; ")
            ));
        }
        Ok(GeneratedText {
            text: last,
            constraints_satisfied: Some(false),
            attempts: self.max_attempts,
        })
    }
}

#[async_trait]
impl ConceptExtractor for OllamaClient {
    fn name(&self) -> &str {
        "llm"
    }

    async fn extract(&self, question: &str, vocabulary: &BTreeSet<String>) -> Result<ExtractionResult> {
        let degraded = |reason: String| SophiaError::ExtractionDegraded(reason);
        let reply = self
            .complete(
                &extraction_prompt(question, vocabulary),
                EXTRACTION_TEMPERATURE,
                EXTRACTION_MAX_TOKENS,
            )
            .await
            .map_err(|e| degraded(e.to_string()))?;

        let block = extract_json_block(&reply)
            .ok_or_else(|| degraded("nenhum JSON na resposta do LLM".into()))?;
        let raw: RawExtraction =
            serde_json::from_str(block).map_err(|e| degraded(format!("JSON inválido: {e}")))?;
        let result = raw.into_result(ConceptExtractor::name(self), vocabulary);
        if result.is_empty() {
            return Err(degraded("LLM não reconheceu conceitos do vocabulário".into()));
        }
        Ok(result)
    }
}
