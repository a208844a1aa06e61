//! # Módulo Constraints: Validação de Respostas
//!
//! Dá uma nota à resposta gerada, comparando o texto com a ontologia e com
//! um conjunto fixo de regras filosóficas.
//!
//! ## Analogia: A Banca Examinadora
//!
//! Cada regra é um examinador com peso próprio. Todos leem o mesmo texto,
//! cada um dá sua nota, e a média ponderada é a nota final. Dois examinadores
//! têm **poder de veto** (obrigatórios): se reprovam, a resposta não é válida
//! por melhor que seja a média.
//!
//! ```text
//! texto + conceitos + relações implicadas + ontologia
//!   │
//!   ├── conceptual_coherence    (0.8, obrigatória)
//!   ├── contradiction_avoidance (0.8, obrigatória)
//!   ├── concept_relevance       (0.7)
//!   ├── ...
//!   └── appropriate_length      (0.2)
//!          │
//!          ▼
//!   ValidationReport { global_score, violations, scores, is_valid }
//! ```
//!
//! A validação nunca falha e nunca muta estado: a mesma entrada sempre produz
//! o mesmo relatório.

/// Sub-módulo com as funções de pontuação.
pub mod rules;

use serde::{Deserialize, Serialize};

use crate::core::{ConceptOntology, Relation};
use rules::TextFeatures;

/// Nota global mínima para uma resposta válida.
pub const VALIDITY_THRESHOLD: f64 = 0.6;

/// Identificador de cada restrição.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintId {
    ConceptualCoherence,
    ContradictionAvoidance,
    ConceptRelevance,
    ArgumentativeStructure,
    PhilosophicalDepth,
    NuancePresence,
    Clarity,
    AcademicTone,
    AppropriateLength,
}

impl ConstraintId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintId::ConceptualCoherence => "conceptual_coherence",
            ConstraintId::ContradictionAvoidance => "contradiction_avoidance",
            ConstraintId::ConceptRelevance => "concept_relevance",
            ConstraintId::ArgumentativeStructure => "argumentative_structure",
            ConstraintId::PhilosophicalDepth => "philosophical_depth",
            ConstraintId::NuancePresence => "nuance_presence",
            ConstraintId::Clarity => "clarity",
            ConstraintId::AcademicTone => "academic_tone",
            ConstraintId::AppropriateLength => "appropriate_length",
        }
    }

    /// Sugestão exibida quando a restrição é violada.
    pub fn recommendation(&self) -> &'static str {
        match self {
            ConstraintId::ConceptualCoherence => "Améliorer la cohérence entre les concepts utilisés",
            ConstraintId::ContradictionAvoidance => {
                "Éviter d'identifier des concepts que l'ontologie oppose"
            }
            ConstraintId::ConceptRelevance => "Répondre plus directement aux concepts de la question",
            ConstraintId::ArgumentativeStructure => {
                "Structurer davantage l'argumentation avec des connecteurs logiques"
            }
            ConstraintId::PhilosophicalDepth => "Approfondir l'analyse philosophique",
            ConstraintId::NuancePresence => "Nuancer le propos en envisageant d'autres perspectives",
            ConstraintId::Clarity => "Améliorer la clarté en raccourcissant les phrases",
            ConstraintId::AcademicTone => "Adopter un ton plus académique",
            ConstraintId::AppropriateLength => "Ajuster la longueur de la réponse",
        }
    }
}

impl std::fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uma restrição configurada.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: ConstraintId,
    /// Peso na média global.
    pub weight: f64,
    /// Abaixo deste score a restrição gera uma [`Violation`].
    pub threshold: f64,
    /// Violação obrigatória invalida a resposta.
    pub mandatory: bool,
    pub description: String,
}

impl Constraint {
    fn new(id: ConstraintId, weight: f64, threshold: f64, mandatory: bool, description: &str) -> Self {
        Self {
            id,
            weight,
            threshold,
            mandatory,
            description: description.to_string(),
        }
    }
}

/// Tudo que as regras podem consultar além do texto.
#[derive(Clone, Copy, Debug)]
pub struct ValidationContext<'a> {
    pub question: &'a str,
    /// Nomes normalizados detectados na pergunta.
    pub concepts: &'a [String],
    pub implied_relations: &'a [Relation],
    pub ontology: &'a ConceptOntology,
}

impl<'a> ValidationContext<'a> {
    pub fn new(
        question: &'a str,
        concepts: &'a [String],
        implied_relations: &'a [Relation],
        ontology: &'a ConceptOntology,
    ) -> Self {
        Self {
            question,
            concepts,
            implied_relations,
            ontology,
        }
    }
}

/// Restrição cujo score ficou abaixo do limiar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub constraint: ConstraintId,
    pub score: f64,
    pub mandatory: bool,
    pub description: String,
}

/// Resultado da validação.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Média ponderada em `[0, 1]`.
    pub global_score: f64,
    /// Violações na ordem das restrições.
    pub violations: Vec<Violation>,
    /// Score de cada restrição, na ordem em que foram avaliadas.
    pub scores: Vec<(ConstraintId, f64)>,
    pub is_valid: bool,
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    /// Relatório de uma resposta que não foi validada (ex.: resposta enlatada).
    pub fn empty() -> Self {
        Self {
            global_score: 0.0,
            violations: Vec::new(),
            scores: Vec::new(),
            is_valid: false,
            recommendations: Vec::new(),
        }
    }

    pub fn score_of(&self, id: ConstraintId) -> Option<f64> {
        self.scores.iter().find(|(c, _)| *c == id).map(|(_, s)| *s)
    }

    pub fn mandatory_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.mandatory)
    }
}

/// Conjunto fixo de restrições e seu avaliador.
#[derive(Clone, Debug)]
pub struct ConstraintManager {
    constraints: Vec<Constraint>,
}

impl Default for ConstraintManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintManager {
    pub fn new() -> Self {
        use ConstraintId::*;
        let constraints = vec![
            Constraint::new(ConceptualCoherence, 0.8, 0.6, true, "Cohérence des concepts avec l'ontologie"),
            Constraint::new(ContradictionAvoidance, 0.8, 0.5, true, "Absence de contradiction conceptuelle"),
            Constraint::new(ConceptRelevance, 0.7, 0.5, false, "Pertinence des concepts pour la question"),
            Constraint::new(ArgumentativeStructure, 0.6, 0.3, false, "Structure argumentative"),
            Constraint::new(PhilosophicalDepth, 0.5, 0.2, false, "Profondeur philosophique"),
            Constraint::new(NuancePresence, 0.5, 0.3, false, "Présence de nuances"),
            Constraint::new(Clarity, 0.4, 0.5, false, "Clarté de l'expression"),
            Constraint::new(AcademicTone, 0.3, 0.2, false, "Ton académique"),
            Constraint::new(AppropriateLength, 0.2, 0.4, false, "Longueur appropriée"),
        ];
        Self { constraints }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    fn score(id: ConstraintId, raw: &str, text: &TextFeatures, ctx: &ValidationContext<'_>) -> f64 {
        let score = match id {
            ConstraintId::ConceptualCoherence => rules::conceptual_coherence(ctx),
            ConstraintId::ContradictionAvoidance => rules::contradiction_avoidance(text, ctx),
            ConstraintId::ConceptRelevance => rules::concept_relevance(text, ctx),
            ConstraintId::ArgumentativeStructure => rules::argumentative_structure(text),
            ConstraintId::PhilosophicalDepth => rules::philosophical_depth(text),
            ConstraintId::NuancePresence => rules::nuance_presence(text),
            ConstraintId::Clarity => rules::clarity(raw, text),
            ConstraintId::AcademicTone => rules::academic_tone(text),
            ConstraintId::AppropriateLength => rules::appropriate_length(text, ctx.concepts.len()),
        };
        score.clamp(0.0, 1.0)
    }

    /// Avalia `text` contra todas as restrições.
    pub fn validate(&self, text: &str, ctx: &ValidationContext<'_>) -> ValidationReport {
        let features = TextFeatures::new(text);
        let mut scores = Vec::with_capacity(self.constraints.len());
        let mut violations = Vec::new();
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for constraint in &self.constraints {
            let score = Self::score(constraint.id, text, &features, ctx);
            weighted += score * constraint.weight;
            total_weight += constraint.weight;
            scores.push((constraint.id, score));
            if score < constraint.threshold {
                violations.push(Violation {
                    constraint: constraint.id,
                    score,
                    mandatory: constraint.mandatory,
                    description: format!(
                        "{} : {:.2} < {:.2}",
                        constraint.description, score, constraint.threshold
                    ),
                });
            }
        }

        let global_score = if total_weight > 0.0 {
            (weighted / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let is_valid = global_score >= VALIDITY_THRESHOLD && !violations.iter().any(|v| v.mandatory);
        let recommendations = violations
            .iter()
            .map(|v| v.constraint.recommendation().to_string())
            .collect();

        tracing::debug!(
            global_score,
            violations = violations.len(),
            is_valid,
            "Validação concluída"
        );

        ValidationReport {
            global_score,
            violations,
            scores,
            is_valid,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConceptType, RelationType};

    const GOOD_ANSWER: &str = "Tout d'abord, la justice désigne selon Aristote une vertu \
        qui ordonne la cité. En effet, son essence tient au principe d'égalité. \
        Cependant, l'injustice s'y oppose, car elle rompt cet équilibre. \
        Néanmoins, dans une certaine mesure, la justice humaine reste relative \
        et peut-être imparfaite. Par conséquent, il convient de distinguer la \
        justice comme idéal universel de ses applications particulières. \
        Ensuite, la question de sa définition renvoie au fondement du droit. \
        Enfin, la justice apparaît comme une exigence de la raison.";

    fn ontology() -> ConceptOntology {
        let mut onto = ConceptOntology::new();
        onto.add_concept("JUSTICE", ConceptType::Moral).unwrap();
        onto.add_concept("INJUSTICE", ConceptType::Moral).unwrap();
        onto.add_relation("JUSTICE", RelationType::Opposes, "INJUSTICE").unwrap();
        onto
    }

    fn concepts() -> Vec<String> {
        vec!["JUSTICE".into(), "INJUSTICE".into()]
    }

    #[test]
    fn report_lists_every_constraint_in_order() {
        let onto = ontology();
        let concepts = concepts();
        let ctx = ValidationContext::new("La justice peut-elle être injuste ?", &concepts, &[], &onto);
        let report = ConstraintManager::new().validate(GOOD_ANSWER, &ctx);
        let ids: Vec<_> = report.scores.iter().map(|(id, _)| *id).collect();
        let expected: Vec<_> = ConstraintManager::new().constraints().iter().map(|c| c.id).collect();
        assert_eq!(ids, expected);
        assert!(report.scores.iter().all(|(_, s)| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn well_formed_answer_is_valid() {
        let onto = ontology();
        let concepts = concepts();
        let ctx = ValidationContext::new("La justice peut-elle être injuste ?", &concepts, &[], &onto);
        let report = ConstraintManager::new().validate(GOOD_ANSWER, &ctx);
        assert!(report.global_score >= 0.6, "global = {}", report.global_score);
        assert_eq!(report.mandatory_violations().count(), 0);
        assert!(report.is_valid);
    }

    #[test]
    fn validation_is_idempotent() {
        let onto = ontology();
        let concepts = concepts();
        let ctx = ValidationContext::new("La justice peut-elle être injuste ?", &concepts, &[], &onto);
        let manager = ConstraintManager::new();
        assert_eq!(manager.validate(GOOD_ANSWER, &ctx), manager.validate(GOOD_ANSWER, &ctx));
    }

    /// Sem conceitos, o relatório continua bem formado.
    #[test]
    fn no_concepts_yields_degraded_report() {
        let onto = ConceptOntology::new();
        let none: Vec<String> = Vec::new();
        let ctx = ValidationContext::new("Bonjour !", &none, &[], &onto);
        let report = ConstraintManager::new().validate("", &ctx);
        assert_eq!(report.score_of(ConstraintId::ConceptualCoherence), Some(0.7));
        assert_eq!(report.score_of(ConstraintId::ConceptRelevance), Some(0.3));
        assert!(report.global_score > 0.0 && report.global_score < 0.6);
        assert!(!report.is_valid);
        assert_eq!(report.recommendations.len(), report.violations.len());
    }

    #[test]
    fn conflicting_implied_relation_is_a_mandatory_violation() {
        let onto = ontology();
        let concepts = concepts();
        let implied = vec![
            Relation::new("JUSTICE", RelationType::Implies, "INJUSTICE"),
            Relation::new("JUSTICE", RelationType::IsEquivalent, "INJUSTICE"),
        ];
        let ctx = ValidationContext::new("", &concepts, &implied, &onto);
        let report = ConstraintManager::new().validate(GOOD_ANSWER, &ctx);
        assert_eq!(report.score_of(ConstraintId::ContradictionAvoidance), Some(0.0));
        assert!(report
            .mandatory_violations()
            .any(|v| v.constraint == ConstraintId::ContradictionAvoidance));
        assert!(!report.is_valid);
    }

    #[test]
    fn constraint_ids_serialize_snake_case() {
        let json = serde_json::to_string(&ConstraintId::ContradictionAvoidance).unwrap();
        assert_eq!(json, "\"contradiction_avoidance\"");
    }
}
