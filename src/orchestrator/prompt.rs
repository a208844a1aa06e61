//! # Construção do Prompt
//!
//! A pergunta é enriquecida com a análise conceitual antes de ir ao gerador:
//!
//! ```text
//! Tu es SophIA, ...
//!
//! QUESTION: La justice peut-elle être injuste ?
//!
//! CONCEPTS IDENTIFIÉS: JUSTICE, INJUSTICE
//!
//! CHEMINS DE RAISONNEMENT CONCEPTUEL:
//! 1. JUSTICE → BIEN → VERTU (p=0.25)
//!
//! RELATIONS CONCEPTUELLES:
//! - JUSTICE opposes INJUSTICE
//! ```
//!
//! No máximo 2 caminhos não triviais e 3 relações; as restrições exigem os
//! 3 primeiros conceitos e as 2 primeiras relações.

use super::response::ConceptAnalysis;
use crate::config::OrchestratorConfig;
use crate::llm::GenerationConstraints;

const MAX_PROMPT_PATHS: usize = 2;
const MAX_PROMPT_RELATIONS: usize = 3;
const MAX_REQUIRED_CONCEPTS: usize = 3;
const MAX_REQUIRED_RELATIONS: usize = 2;

const PREAMBLE: &str =
    "Tu es SophIA, une IA philosophique qui combine raisonnement conceptuel et expression naturelle.";

/// Texto fixo devolvido quando nenhuma geração deu certo.
pub const CANNED_RESPONSE: &str = "Je suis désolée, je ne parviens pas à formuler une réponse pour le moment. \
     Pourriez-vous reformuler votre question ?";

/// Prompt enriquecido para a geração com restrições.
pub fn enriched_prompt(question: &str, context: Option<&str>, analysis: &ConceptAnalysis) -> String {
    let mut prompt = format!("{PREAMBLE}\n\nQUESTION: {question}");
    if let Some(context) = context {
        prompt.push_str(&format!("\nCONTEXTE: {context}"));
    }

    if !analysis.concepts.is_empty() {
        prompt.push_str(&format!("\n\nCONCEPTS IDENTIFIÉS: {}", analysis.concepts.join(", ")));
    }

    let paths: Vec<_> = analysis.non_trivial_paths().take(MAX_PROMPT_PATHS).collect();
    if !paths.is_empty() {
        prompt.push_str("\n\nCHEMINS DE RAISONNEMENT CONCEPTUEL:");
        for (i, path) in paths.iter().enumerate() {
            prompt.push_str(&format!("\n{}. {}", i + 1, path));
        }
    }

    if !analysis.implied_relations.is_empty() {
        prompt.push_str("\n\nRELATIONS CONCEPTUELLES:");
        for relation in analysis.implied_relations.iter().take(MAX_PROMPT_RELATIONS) {
            prompt.push_str(&format!("\n- {relation}"));
        }
    }

    prompt.push_str(
        "\n\nRéponds en intégrant ces éléments conceptuels de manière naturelle et \
         philosophiquement rigoureuse.",
    );
    prompt
}

/// Prompt do retry: só a pergunta.
pub fn simplified_prompt(question: &str, context: Option<&str>) -> String {
    let mut prompt = format!("{PREAMBLE}\n\nQUESTION: {question}");
    if let Some(context) = context {
        prompt.push_str(&format!("\nCONTEXTE: {context}"));
    }
    prompt.push_str("\n\nRéponds de manière claire et philosophiquement rigoureuse.");
    prompt
}

/// Restrições derivadas da análise.
pub fn constraints_for(analysis: &ConceptAnalysis, config: &OrchestratorConfig) -> GenerationConstraints {
    GenerationConstraints {
        required_concepts: analysis.concepts.iter().take(MAX_REQUIRED_CONCEPTS).cloned().collect(),
        required_relations: analysis
            .implied_relations
            .iter()
            .take(MAX_REQUIRED_RELATIONS)
            .cloned()
            .collect(),
        forbidden_concepts: Vec::new(),
        tone: config.tone.clone(),
        max_tokens: config.max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Relation, RelationType};
    use crate::lcm::ReasoningPath;

    fn analysis() -> ConceptAnalysis {
        let path = |names: &[&str], p: f64| ReasoningPath {
            start: names[0].to_string(),
            concepts: names.iter().map(|s| s.to_string()).collect(),
            probability: p,
        };
        ConceptAnalysis {
            extraction_strategy: "lexical".into(),
            concepts: ["JUSTICE", "INJUSTICE", "BIEN", "MAL"].iter().map(|s| s.to_string()).collect(),
            confidence: 0.8,
            implied_relations: vec![
                Relation::new("JUSTICE", RelationType::Opposes, "INJUSTICE"),
                Relation::new("BIEN", RelationType::Opposes, "MAL"),
                Relation::new("JUSTICE", RelationType::IsA, "BIEN"),
                Relation::new("INJUSTICE", RelationType::IsA, "MAL"),
            ],
            reasoning_paths: vec![
                path(&["JUSTICE", "BIEN", "VERTU"], 0.25),
                path(&["INJUSTICE"], 1.0),
                path(&["BIEN", "VERTU"], 0.5),
                path(&["MAL", "VICE"], 0.5),
            ],
            reasoning_confidence: 0.4,
            reasoning_hints: vec![],
        }
    }

    #[test]
    fn prompt_has_every_section_with_limits() {
        let prompt = enriched_prompt("La justice peut-elle être injuste ?", None, &analysis());
        assert!(prompt.contains("QUESTION: La justice peut-elle être injuste ?"));
        assert!(prompt.contains("CONCEPTS IDENTIFIÉS: JUSTICE, INJUSTICE, BIEN, MAL"));
        assert!(prompt.contains("1. JUSTICE → BIEN → VERTU (p=0.25)"));
        assert!(prompt.contains("2. BIEN → VERTU"));
        assert!(!prompt.contains("MAL → VICE"));
        assert!(prompt.contains("- JUSTICE opposes INJUSTICE"));
        assert!(!prompt.contains("INJUSTICE is_a MAL"));
        assert!(!prompt.contains("CONTEXTE"));
    }

    #[test]
    fn empty_analysis_keeps_only_the_question() {
        let prompt = enriched_prompt("Bonjour", Some("salutations"), &ConceptAnalysis::default());
        assert!(prompt.contains("CONTEXTE: salutations"));
        assert!(!prompt.contains("CONCEPTS IDENTIFIÉS"));
        assert!(!prompt.contains("CHEMINS"));
        assert!(!prompt.contains("RELATIONS CONCEPTUELLES"));
    }

    #[test]
    fn constraints_take_leading_concepts_and_relations() {
        let constraints = constraints_for(&analysis(), &OrchestratorConfig::default());
        assert_eq!(constraints.required_concepts, vec!["JUSTICE", "INJUSTICE", "BIEN"]);
        assert_eq!(constraints.required_relations.len(), 2);
        assert_eq!(constraints.tone, "philosophique et analytique");
        assert_eq!(constraints.max_tokens, 2048);
    }
}
