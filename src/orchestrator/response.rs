//! # Resposta, Estágios e Resumo da Sessão
//!
//! Tipos produzidos pelo orquestrador. Uma [`Response`] é imutável depois
//! de devolvida e circula como `Arc<Response>` entre histórico, web e SSE.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constraints::ValidationReport;
use crate::core::Relation;
use crate::error::SophiaError;
use crate::knowledge::LearningOutcome;
use crate::lcm::ReasoningPath;

use super::adaptation::{LearningInsights, QuestionType};

/// Estágio do pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Extracting,
    Reasoning,
    Generating,
    Validating,
    Learning,
    Complete,
    Error,
}

/// Como o texto final foi obtido.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Geração com restrições satisfeitas.
    Constrained,
    /// Retry sem restrições.
    Simplified,
    /// Texto de desculpas fixo.
    Canned,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Constrained => "constrained",
            GenerationMode::Simplified => "simplified",
            GenerationMode::Canned => "canned",
        }
    }
}

/// Evento emitido a cada passo, consumido pelo endpoint SSE.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageEntered {
        request_id: Uuid,
        stage: Stage,
    },
    Degraded {
        request_id: Uuid,
        error: SophiaError,
    },
    LearningApplied {
        request_id: Uuid,
        outcome: LearningOutcome,
    },
    Completed {
        request_id: Uuid,
        confidence: f64,
        mode: GenerationMode,
        duration_ms: u64,
    },
}

/// Fotografia da análise conceitual de uma pergunta.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptAnalysis {
    /// Estratégia de extração que respondeu.
    pub extraction_strategy: String,
    pub concepts: Vec<String>,
    /// Confiança da extração em `[0, 1]`.
    pub confidence: f64,
    pub implied_relations: Vec<Relation>,
    pub reasoning_paths: Vec<ReasoningPath>,
    /// Média das probabilidades dos caminhos não triviais.
    pub reasoning_confidence: f64,
    #[serde(default)]
    pub reasoning_hints: Vec<String>,
}

impl ConceptAnalysis {
    pub fn non_trivial_paths(&self) -> impl Iterator<Item = &ReasoningPath> {
        self.reasoning_paths.iter().filter(|p| !p.is_trivial())
    }
}

/// Resposta completa a uma pergunta.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    pub question: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub question_type: QuestionType,
    pub text: String,
    pub analysis: ConceptAnalysis,
    /// `0.6 × extração + 0.4 × validação`, em `[0, 1]`.
    pub confidence: f64,
    pub validation: ValidationReport,
    pub generation_mode: GenerationMode,
    /// Falhas absorvidas pelo pipeline, em ordem.
    pub degradations: Vec<SophiaError>,
    pub learning_triggered: bool,
    pub learning: Option<LearningOutcome>,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Resumo da sessão corrente.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_interactions: usize,
    /// Até 5 conceitos mais discutidos, do mais ao menos frequente.
    pub most_discussed_concepts: Vec<(String, usize)>,
    pub average_confidence: f64,
    pub learning_events: usize,
    /// Tendências, adaptações e recomendações do aprendiz.
    #[serde(default)]
    pub learning: LearningInsights,
}

impl SessionSummary {
    pub fn from_history<'a>(history: impl IntoIterator<Item = &'a Response>) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut total = 0;
        let mut confidence = 0.0;
        let mut learning_events = 0;
        for response in history {
            total += 1;
            confidence += response.confidence;
            if response.learning_triggered {
                learning_events += 1;
            }
            for concept in &response.analysis.concepts {
                *counts.entry(concept.as_str()).or_default() += 1;
            }
        }
        let mut most_discussed: Vec<(String, usize)> =
            counts.into_iter().map(|(c, n)| (c.to_string(), n)).collect();
        // Estável: empates ficam em ordem alfabética.
        most_discussed.sort_by(|a, b| b.1.cmp(&a.1));
        most_discussed.truncate(5);

        Self {
            total_interactions: total,
            most_discussed_concepts: most_discussed,
            average_confidence: if total == 0 { 0.0 } else { confidence / total as f64 },
            learning_events,
            learning: LearningInsights::default(),
        }
    }
}

/// Explicação legível do raciocínio por trás de uma resposta.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub question: String,
    pub steps: Vec<ExplanationStep>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplanationStep {
    pub title: String,
    pub details: Vec<String>,
}

impl Explanation {
    pub fn of(response: &Response) -> Self {
        let analysis = &response.analysis;
        let mut steps = Vec::new();

        let mut detection = vec![
            format!("Type de question : {}", response.question_type.as_str()),
            format!(
                "Méthode : {} (confiance {:.2})",
                analysis.extraction_strategy, analysis.confidence
            ),
        ];
        if analysis.concepts.is_empty() {
            detection.push("Aucun concept de l'ontologie reconnu".into());
        } else {
            detection.push(format!("Concepts : {}", analysis.concepts.join(", ")));
        }
        detection.extend(analysis.reasoning_hints.iter().cloned());
        steps.push(ExplanationStep {
            title: "Détection des concepts".into(),
            details: detection,
        });

        let mut reasoning: Vec<String> = analysis.reasoning_paths.iter().map(|p| p.to_string()).collect();
        if reasoning.is_empty() {
            reasoning.push("Aucun chemin de raisonnement".into());
        }
        steps.push(ExplanationStep {
            title: "Raisonnement conceptuel (LCM)".into(),
            details: reasoning,
        });

        if !analysis.implied_relations.is_empty() {
            steps.push(ExplanationStep {
                title: "Relations ontologiques".into(),
                details: analysis.implied_relations.iter().map(|r| r.to_string()).collect(),
            });
        }

        let mut synthesis = vec![
            format!("Mode de génération : {}", response.generation_mode.as_str()),
            format!(
                "Validation : {:.2} ({} violation(s))",
                response.validation.global_score,
                response.validation.violations.len()
            ),
            format!("Confiance globale : {:.2}", response.confidence),
        ];
        if let Some(learning) = &response.learning {
            synthesis.push(format!(
                "Apprentissage : {} transition(s), {} relation(s) ajoutée(s)",
                learning.transitions_updated,
                learning.relations_added.len()
            ));
        }
        synthesis.extend(response.degradations.iter().map(|d| format!("Dégradation : {d}")));
        steps.push(ExplanationStep {
            title: "Synthèse".into(),
            details: synthesis,
        });

        Self {
            question: response.question.clone(),
            steps,
        }
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Question : {}", self.question)?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, step.title)?;
            for detail in &step.details {
                writeln!(f, "   - {detail}")?;
            }
        }
        Ok(())
    }
}
