//! # Conhecimento Compartilhado
//!
//! [`KnowledgeState`] junta a ontologia, o modelo de transições e o
//! histórico de treino. [`SharedKnowledge`] é a única porta de escrita.
//!
//! ## Disciplina de Escritor Único
//!
//! ```text
//! Arc<RwLock<Arc<KnowledgeState>>>
//!
//! leitor:  read lock curto → clona o Arc interno → solta o lock
//!          (extração, raciocínio e validação usam essa foto inteira)
//!
//! escritor: write lock → Arc::make_mut → aplica TODA a sequência → solta
//!           (quem segurava a foto antiga continua vendo a antiga)
//! ```
//!
//! Um leitor nunca observa metade de um aprendizado: ou vê o estado antes
//! da sequência, ou depois dela.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::{normalize_name, ConceptOntology, Relation};
use crate::error::{Result, SophiaError};
use crate::lcm::{BatchStats, TrainingLog, TrainingMetrics, TransitionModel};

/// Ontologia + modelo + histórico de treino.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeState {
    pub ontology: ConceptOntology,
    pub model: TransitionModel,
    pub training: TrainingLog,
}

impl KnowledgeState {
    pub fn new(ontology: ConceptOntology, model: TransitionModel, training: TrainingLog) -> Self {
        Self {
            ontology,
            model,
            training,
        }
    }

    /// Estado inicial com o conjunto curado de conceitos e nenhum aprendizado.
    pub fn seeded() -> Self {
        Self::new(ConceptOntology::with_core_set(), TransitionModel::new(), TrainingLog::default())
    }

    /// Vocabulário entregue aos extratores.
    pub fn vocabulary(&self) -> BTreeSet<String> {
        self.ontology.all_concepts()
    }
}

/// Relação implicada que a ontologia recusou.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RejectedRelation {
    pub relation: Relation,
    pub reason: String,
}

/// O que um passo de aprendizado mudou.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningOutcome {
    /// Pares observados no modelo de transições.
    pub transitions_updated: usize,
    pub relations_added: Vec<Relation>,
    pub relations_rejected: Vec<RejectedRelation>,
    pub metrics: Option<TrainingMetrics>,
}

/// Conhecimento compartilhado entre requisições.
#[derive(Clone, Debug, Default)]
pub struct SharedKnowledge(Arc<RwLock<Arc<KnowledgeState>>>);

impl SharedKnowledge {
    pub fn new(state: KnowledgeState) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(state))))
    }

    /// Foto consistente do estado atual.
    pub fn snapshot(&self) -> Arc<KnowledgeState> {
        Arc::clone(&self.0.read())
    }

    /// Substitui o estado inteiro (ex.: após carregar um snapshot).
    pub fn replace(&self, state: KnowledgeState) {
        *self.0.write() = Arc::new(state);
    }

    /// Aprende uma sequência de conceitos e as relações implicadas, sob o
    /// write lock.
    ///
    /// Relações já presentes são ignoradas; as recusadas pela guarda de
    /// consistência vão para `relations_rejected` sem mudar nada.
    pub fn learn(&self, sequence: &[String], relations: &[Relation], context: Option<&str>) -> LearningOutcome {
        let mut guard = self.0.write();
        let state = Arc::make_mut(&mut *guard);
        let mut outcome = LearningOutcome::default();

        for relation in relations {
            if state.ontology.has_relation(&relation.from, relation.relation_type, &relation.to) {
                continue;
            }
            match state
                .ontology
                .add_relation(&relation.from, relation.relation_type, &relation.to)
            {
                Ok(true) => outcome.relations_added.push(relation.clone()),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(relation = %relation, error = %e, "Aprendizado: relação recusada");
                    outcome.relations_rejected.push(RejectedRelation {
                        relation: relation.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        match state.model.learn_in_context(&state.ontology, sequence, context) {
            Ok(n) => outcome.transitions_updated = n,
            Err(e) => tracing::warn!(error = %e, "Aprendizado: sequência ignorada"),
        }

        for name in sequence {
            if let Err(e) = state.ontology.reinforce(name) {
                tracing::debug!(concept = %name, error = %e, "Aprendizado: reforço ignorado");
            }
        }

        if outcome.transitions_updated > 0 {
            let epoch = state.training.next_epoch();
            let metrics = TrainingMetrics::measure(
                &state.ontology,
                &state.model,
                &normalized(sequence),
                epoch,
                outcome.transitions_updated,
            );
            state.training.record(metrics.clone());
            outcome.metrics = Some(metrics);
        }

        tracing::info!(
            transitions = outcome.transitions_updated,
            added = outcome.relations_added.len(),
            rejected = outcome.relations_rejected.len(),
            "Aprendizado aplicado"
        );
        outcome
    }

    /// Treino em lote sob um único write lock.
    ///
    /// Falha sem mudar nada se alguma sequência tem nome desconhecido.
    pub fn train(&self, sequences: &[Vec<String>], epochs: usize) -> Result<BatchStats> {
        let mut guard = self.0.write();
        for sequence in sequences {
            for name in sequence {
                if !guard.ontology.contains(name) {
                    return Err(SophiaError::UnknownConcept(name.clone()));
                }
            }
        }
        let state = Arc::make_mut(&mut *guard);
        let stats = state
            .model
            .train_on_sequences(&state.ontology, sequences, epochs)?;

        for sequence in sequences {
            let names = normalized(sequence);
            if names.len() < 2 {
                continue;
            }
            let epoch = state.training.next_epoch();
            let learned = names.windows(2).filter(|p| p[0] != p[1]).count() * epochs;
            let metrics = TrainingMetrics::measure(&state.ontology, &state.model, &names, epoch, learned);
            state.training.record(metrics);
        }
        Ok(stats)
    }
}

/// Nomes normalizados, sem os vazios.
fn normalized(sequence: &[String]) -> Vec<String> {
    sequence.iter().filter_map(|n| normalize_name(n).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConceptType, RelationType};

    fn shared() -> SharedKnowledge {
        let mut onto = ConceptOntology::new();
        for name in ["JUSTICE", "INJUSTICE", "BIEN", "MAL"] {
            onto.add_concept(name, ConceptType::Moral).unwrap();
        }
        onto.add_relation("BIEN", RelationType::Implies, "JUSTICE").unwrap();
        SharedKnowledge::new(KnowledgeState::new(onto, TransitionModel::new(), TrainingLog::default()))
    }

    fn seq(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn snapshot_taken_before_learning_is_unchanged() {
        let knowledge = shared();
        let before = knowledge.snapshot();
        let outcome = knowledge.learn(
            &seq(&["JUSTICE", "INJUSTICE"]),
            &[Relation::new("JUSTICE", RelationType::Opposes, "INJUSTICE")],
            None,
        );
        assert_eq!(outcome.transitions_updated, 1);
        assert_eq!(outcome.relations_added.len(), 1);
        assert!(outcome.metrics.is_some());

        assert!(!before.ontology.has_relation("JUSTICE", RelationType::Opposes, "INJUSTICE"));
        assert_eq!(before.model.transition_count(), 0);
        let after = knowledge.snapshot();
        assert!(after.ontology.has_relation("JUSTICE", RelationType::Opposes, "INJUSTICE"));
        assert_eq!(after.training.summary.epochs, 1);
    }

    #[test]
    fn inconsistent_relation_is_rejected_and_existing_one_skipped() {
        let knowledge = shared();
        let outcome = knowledge.learn(
            &seq(&["BIEN", "JUSTICE"]),
            &[
                Relation::new("BIEN", RelationType::Implies, "JUSTICE"),
                Relation::new("BIEN", RelationType::Contradicts, "JUSTICE"),
            ],
            Some("test"),
        );
        assert!(outcome.relations_added.is_empty());
        assert_eq!(outcome.relations_rejected.len(), 1);
        let state = knowledge.snapshot();
        assert!(!state.ontology.has_relation("BIEN", RelationType::Contradicts, "JUSTICE"));
        assert_eq!(state.model.get("BIEN", "JUSTICE").unwrap().context.as_deref(), Some("test"));
    }

    /// Escritas concorrentes não perdem observações.
    #[test]
    fn concurrent_learning_is_serialized() {
        let knowledge = shared();
        std::thread::scope(|s| {
            for _ in 0..8 {
                let k = knowledge.clone();
                s.spawn(move || {
                    for _ in 0..25 {
                        k.learn(&seq(&["BIEN", "MAL"]), &[], None);
                    }
                });
            }
        });
        let state = knowledge.snapshot();
        assert_eq!(state.model.get("BIEN", "MAL").unwrap().frequency, 200);
        assert_eq!(state.model.sequences_seen, 200);
    }

    #[test]
    fn train_rejects_unknown_names_without_mutation() {
        let knowledge = shared();
        let err = knowledge.train(&[seq(&["BIEN", "LICORNE"])], 2).unwrap_err();
        assert!(matches!(err, SophiaError::UnknownConcept(_)));
        assert_eq!(knowledge.snapshot().model.transition_count(), 0);

        let stats = knowledge.train(&[seq(&["BIEN", "JUSTICE", "MAL"])], 2).unwrap();
        assert_eq!(stats.transitions_learned, 4);
        assert_eq!(knowledge.snapshot().training.summary.epochs, 1);
    }

    /// `bien`, `BIEN` é um par repetido depois da normalização.
    #[test]
    fn train_counts_only_pairs_the_model_observes() {
        let knowledge = shared();
        let stats = knowledge.train(&[seq(&["bien", "BIEN", "justice"])], 1).unwrap();
        assert_eq!(stats.transitions_learned, 1);
        let state = knowledge.snapshot();
        let last = state.training.history.back().unwrap();
        assert_eq!(last.transitions_learned, 1);
        assert_eq!(state.training.summary.total_transitions_learned, 1);
    }
}
