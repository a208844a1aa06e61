//! # Módulo LLM: Colaborador de Geração
//!
//! Contrato do gerador de texto e das **restrições de geração** que o
//! orquestrador deriva da análise conceitual.
//!
//! ```text
//! GenerationRequest
//!   ├── prompt             (pergunta enriquecida)
//!   ├── constraints?       (conceitos e relações exigidos, tom, orçamento)
//!   ├── temperature
//!   └── max_tokens
//!          │
//!          ▼  TextGenerator::generate
//! GeneratedText { text, constraints_satisfied? }
//! ```
//!
//! Sem `constraints` o pedido é o modo simplificado, usado no retry.
//!
//! | Módulo | Responsabilidade |
//! |--------|-----------------|
//! | [`ollama`] | Cliente HTTP do Ollama (geração e extração JSON) |

/// Sub-módulo com o cliente Ollama.
pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::Relation;
use crate::error::Result;
use crate::nlu::text::{concept_tokens, find_phrase, tokens};

pub use ollama::{OllamaClient, ProbeStatus};

/// Colaborador de geração de texto.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Falha com `GenerationUnavailable` quando o backend não responde
    /// ou devolve texto vazio.
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedText>;
}

/// Restrições que o texto gerado deve respeitar.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConstraints {
    pub required_concepts: Vec<String>,
    pub required_relations: Vec<Relation>,
    #[serde(default)]
    pub forbidden_concepts: Vec<String>,
    pub tone: String,
    pub max_tokens: u32,
}

/// Resultado de [`GenerationConstraints::check_satisfaction`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Satisfaction {
    pub satisfied: bool,
    /// Descrição das restrições não cumpridas, em francês, pronta para
    /// voltar ao prompt como correção.
    pub failures: Vec<String>,
}

impl GenerationConstraints {
    /// Instruções em francês para o bloco de restrições do prompt.
    pub fn instructions(&self) -> String {
        let mut lines = Vec::new();
        if !self.required_concepts.is_empty() {
            lines.push(format!(
                "• Tu DOIS mentionner ces concepts : {}",
                self.required_concepts.join(", ")
            ));
        }
        if !self.forbidden_concepts.is_empty() {
            lines.push(format!(
                "• Tu NE DOIS PAS mentionner : {}",
                self.forbidden_concepts.join(", ")
            ));
        }
        for relation in &self.required_relations {
            lines.push(format!(
                "• Établis cette relation : {} {} {}",
                relation.from, relation.relation_type, relation.to
            ));
        }
        if !self.tone.is_empty() {
            lines.push(format!("• Ton : {}", self.tone));
        }
        if lines.is_empty() {
            "• Réponds de manière cohérente et philosophique".to_string()
        } else {
            lines.join("\n")
        }
    }

    /// Verifica conceitos exigidos e proibidos no texto (casamento por
    /// tokens, sem acentos). Relações não são verificadas.
    pub fn check_satisfaction(&self, text: &str) -> Satisfaction {
        let words = tokens(text);
        let mentions = |name: &str| find_phrase(&words, &concept_tokens(name)).is_some();

        let missing: Vec<&str> = self
            .required_concepts
            .iter()
            .filter(|c| !mentions(c.as_str()))
            .map(String::as_str)
            .collect();
        let present: Vec<&str> = self
            .forbidden_concepts
            .iter()
            .filter(|c| mentions(c.as_str()))
            .map(String::as_str)
            .collect();

        let mut failures = Vec::new();
        if !missing.is_empty() {
            failures.push(format!("concepts manquants : {}", missing.join(", ")));
        }
        if !present.is_empty() {
            failures.push(format!("concepts interdits présents : {}", present.join(", ")));
        }
        Satisfaction {
            satisfied: failures.is_empty(),
            failures,
        }
    }
}

/// Pedido de geração.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub constraints: Option<GenerationConstraints>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn constrained(prompt: String, constraints: GenerationConstraints, temperature: f64) -> Self {
        let max_tokens = constraints.max_tokens;
        Self {
            prompt,
            constraints: Some(constraints),
            temperature,
            max_tokens,
        }
    }

    /// Pedido sem restrições.
    pub fn simplified(prompt: String, temperature: f64, max_tokens: u32) -> Self {
        Self {
            prompt,
            constraints: None,
            temperature,
            max_tokens,
        }
    }

    pub fn is_constrained(&self) -> bool {
        self.constraints.is_some()
    }
}

/// Texto devolvido pelo gerador.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedText {
    pub text: String,
    /// `None` quando o pedido não tinha restrições.
    pub constraints_satisfied: Option<bool>,
    #[serde(default = "one")]
    pub attempts: u32,
}

fn one() -> u32 {
    1
}

impl GeneratedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            constraints_satisfied: None,
            attempts: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RelationType;

    fn constraints() -> GenerationConstraints {
        GenerationConstraints {
            required_concepts: vec!["JUSTICE".into(), "LIBERTÉ_POLITIQUE".into()],
            required_relations: vec![Relation::new("JUSTICE", RelationType::Opposes, "INJUSTICE")],
            forbidden_concepts: vec!["MAL".into()],
            tone: "philosophique et analytique".into(),
            max_tokens: 400,
        }
    }

    #[test]
    fn instructions_list_every_constraint() {
        let text = constraints().instructions();
        assert!(text.contains("Tu DOIS mentionner ces concepts : JUSTICE, LIBERTÉ_POLITIQUE"));
        assert!(text.contains("Établis cette relation : JUSTICE opposes INJUSTICE"));
        assert!(text.contains("Ton : philosophique et analytique"));
        assert_eq!(
            GenerationConstraints::default().instructions(),
            "• Réponds de manière cohérente et philosophique"
        );
    }

    #[test]
    fn satisfaction_ignores_accents_and_case() {
        let ok = constraints().check_satisfaction("La justice et la liberté politique vont ensemble.");
        assert!(ok.satisfied);

        let ko = constraints().check_satisfaction("La justice combat le mal.");
        assert!(!ko.satisfied);
        assert_eq!(ko.failures.len(), 2);
        assert!(ko.failures[0].contains("LIBERTÉ_POLITIQUE"));
    }

    #[test]
    fn constrained_request_takes_budget_from_constraints() {
        let req = GenerationRequest::constrained("Q".into(), constraints(), 0.7);
        assert_eq!(req.max_tokens, 400);
        assert!(req.is_constrained());
        assert!(!GenerationRequest::simplified("Q".into(), 0.7, 200).is_constrained());
    }
}
