//! # Métricas de Treino
//!
//! Cada sequência aprendida gera uma [`TrainingMetrics`]; o [`TrainingLog`]
//! guarda o histórico recente e o [`TrainingSummary`] agregado que vai para
//! o snapshot da sessão.
//!
//! ## Fórmulas
//!
//! | Métrica | Definição |
//! |---------|-----------|
//! | loss | `-ln(max(P, 1e-10)) / (n - 1)`, com `P` a probabilidade da sequência após o update |
//! | coerência | `Σ (peso da relação + 0.2 se tipos compatíveis) / (1.2 × transições)`, em `[0, 1]` |
//! | violações | pares consecutivos em que a origem `contradicts` o destino |
//!
//! Pesos de relação: implies 1.0, is_a 0.8, enables 0.7, defines 0.6,
//! contradicts −1.0, opposes −0.5, demais 0.3, sem relação 0.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::TransitionModel;
use crate::core::{ConceptOntology, RelationType};

/// Tamanho máximo do histórico mantido em memória e no snapshot.
pub const TRAINING_HISTORY_CAPACITY: usize = 500;

const MIN_PROBABILITY: f64 = 1e-10;
const TYPE_COMPATIBILITY_BONUS: f64 = 0.2;

/// Métricas de uma sequência aprendida.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub epoch: u64,
    pub loss: f64,
    pub coherence: f64,
    pub violations: usize,
    pub transitions_learned: usize,
    pub coverage: f64,
    pub timestamp: DateTime<Utc>,
}

impl TrainingMetrics {
    /// Mede uma sequência já aprendida pelo `model`.
    ///
    /// `sequence` deve conter apenas nomes normalizados da ontologia.
    pub fn measure(
        ontology: &ConceptOntology,
        model: &TransitionModel,
        sequence: &[String],
        epoch: u64,
        transitions_learned: usize,
    ) -> Self {
        Self {
            epoch,
            loss: sequence_loss(ontology, model, sequence),
            coherence: sequence_coherence(ontology, sequence),
            violations: ontological_violations(ontology, sequence),
            transitions_learned,
            coverage: model.stats(ontology).coverage_ratio,
            timestamp: Utc::now(),
        }
    }
}

/// Perda média por transição; 0.0 para sequências com menos de 2 conceitos.
pub fn sequence_loss(ontology: &ConceptOntology, model: &TransitionModel, sequence: &[String]) -> f64 {
    if sequence.len() < 2 {
        return 0.0;
    }
    let p = model
        .evaluate_sequence_probability(ontology, sequence)
        .unwrap_or(0.0);
    -p.max(MIN_PROBABILITY).ln() / (sequence.len() - 1) as f64
}

/// Coerência ontológica em `[0, 1]`; 0.0 sem transições.
pub fn sequence_coherence(ontology: &ConceptOntology, sequence: &[String]) -> f64 {
    let pairs = sequence.len().saturating_sub(1);
    if pairs == 0 {
        return 0.0;
    }
    let total: f64 = sequence
        .windows(2)
        .map(|pair| {
            let relation = ontology
                .relation_between(&pair[0], &pair[1])
                .map_or(0.0, |r| r.coherence_weight());
            let compatible = match (ontology.get(&pair[0]), ontology.get(&pair[1])) {
                (Some(a), Some(b)) if a.concept_type.is_compatible_with(b.concept_type) => {
                    TYPE_COMPATIBILITY_BONUS
                }
                _ => 0.0,
            };
            relation + compatible
        })
        .sum();
    (total / ((1.0 + TYPE_COMPATIBILITY_BONUS) * pairs as f64)).clamp(0.0, 1.0)
}

/// Pares consecutivos ligados por `contradicts`.
pub fn ontological_violations(ontology: &ConceptOntology, sequence: &[String]) -> usize {
    sequence
        .windows(2)
        .filter(|pair| ontology.has_relation(&pair[0], RelationType::Contradicts, &pair[1]))
        .count()
}

/// Resumo agregado gravado no snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub epochs: u64,
    pub last_loss: f64,
    pub best_loss: f64,
    pub last_coherence: f64,
    pub best_coherence: f64,
    pub total_violations: usize,
    pub total_transitions_learned: usize,
}

impl Default for TrainingSummary {
    fn default() -> Self {
        Self {
            epochs: 0,
            last_loss: 0.0,
            best_loss: f64::MAX,
            last_coherence: 0.0,
            best_coherence: 0.0,
            total_violations: 0,
            total_transitions_learned: 0,
        }
    }
}

/// Histórico de treino com resumo incremental.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingLog {
    #[serde(default)]
    pub history: VecDeque<TrainingMetrics>,
    #[serde(default)]
    pub summary: TrainingSummary,
}

impl TrainingLog {
    /// Próximo índice de época.
    pub fn next_epoch(&self) -> u64 {
        self.summary.epochs + 1
    }

    pub fn record(&mut self, metrics: TrainingMetrics) {
        let s = &mut self.summary;
        s.epochs = s.epochs.max(metrics.epoch);
        s.last_loss = metrics.loss;
        s.best_loss = s.best_loss.min(metrics.loss);
        s.last_coherence = metrics.coherence;
        s.best_coherence = s.best_coherence.max(metrics.coherence);
        s.total_violations += metrics.violations;
        s.total_transitions_learned += metrics.transitions_learned;

        tracing::debug!(
            epoch = metrics.epoch,
            loss = metrics.loss,
            coherence = metrics.coherence,
            violations = metrics.violations,
            "Treino: métricas registradas"
        );
        if self.history.len() == TRAINING_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConceptType;

    fn seq(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn ontology() -> ConceptOntology {
        let mut onto = ConceptOntology::new();
        onto.add_concept("JUSTICE", ConceptType::Moral).unwrap();
        onto.add_concept("BIEN", ConceptType::Moral).unwrap();
        onto.add_concept("VERTU", ConceptType::Value).unwrap();
        onto.add_concept("PARADOXE", ConceptType::Logical).unwrap();
        onto.add_concept("TAUTOLOGIE", ConceptType::Logical).unwrap();
        onto.add_relation("JUSTICE", RelationType::Implies, "BIEN").unwrap();
        onto.add_relation("PARADOXE", RelationType::Contradicts, "TAUTOLOGIE").unwrap();
        onto
    }

    /// Uma observação: P = 0.5, loss = ln 2
    #[test]
    fn loss_is_negative_log_likelihood_per_step() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        let s = seq(&["JUSTICE", "BIEN"]);
        model.learn(&onto, &s).unwrap();
        assert!((sequence_loss(&onto, &model, &s) - 2f64.ln()).abs() < 1e-9);
        assert_eq!(sequence_loss(&onto, &model, &seq(&["JUSTICE"])), 0.0);
    }

    #[test]
    fn loss_of_unseen_sequence_is_capped() {
        let onto = ontology();
        let model = TransitionModel::new();
        let loss = sequence_loss(&onto, &model, &seq(&["JUSTICE", "VERTU"]));
        assert!((loss - (-(1e-10f64).ln())).abs() < 1e-9);
    }

    #[test]
    fn coherence_rewards_implication_and_clamps() {
        let onto = ontology();
        // implies 1.0 + nenhum bônus (moral/moral) → 1.0 / 1.2
        let c = sequence_coherence(&onto, &seq(&["JUSTICE", "BIEN"]));
        assert!((c - 1.0 / 1.2).abs() < 1e-9);
        // moral/value compatível, sem relação → 0.2 / 1.2
        let c = sequence_coherence(&onto, &seq(&["BIEN", "VERTU"]));
        assert!((c - 0.2 / 1.2).abs() < 1e-9);
        // contradição → negativa, limitada a 0
        assert_eq!(sequence_coherence(&onto, &seq(&["PARADOXE", "TAUTOLOGIE"])), 0.0);
    }

    #[test]
    fn violations_count_contradicting_steps() {
        let onto = ontology();
        assert_eq!(ontological_violations(&onto, &seq(&["PARADOXE", "TAUTOLOGIE", "PARADOXE"])), 2);
        assert_eq!(ontological_violations(&onto, &seq(&["JUSTICE", "BIEN"])), 0);
    }

    #[test]
    fn log_tracks_best_values() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        let mut log = TrainingLog::default();
        let s = seq(&["JUSTICE", "BIEN"]);
        for _ in 0..3 {
            let learned = model.learn(&onto, &s).unwrap();
            let epoch = log.next_epoch();
            log.record(TrainingMetrics::measure(&onto, &model, &s, epoch, learned));
        }
        assert_eq!(log.summary.epochs, 3);
        assert_eq!(log.summary.total_transitions_learned, 3);
        assert!(log.summary.best_loss <= log.summary.last_loss);
        assert_eq!(log.history.len(), 3);
    }
}
