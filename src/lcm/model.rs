//! # TransitionModel: Modelo de Transições Conceituais (LCM)
//!
//! Grafo dirigido e ponderado sobre os nomes da ontologia. Aprende com
//! sequências de conceitos observadas e gera caminhos de raciocínio por
//! caminhada aleatória ponderada.
//!
//! ## Armazenamento
//!
//! - **Transições**: `BTreeMap<String, Transition>` com chave `"DE->PARA"`
//! - **Índice de saída**: `BTreeMap<String, BTreeSet<String>>`, "para onde posso ir a partir daqui?"
//!
//! O índice de saída **não é serializado** e deve ser reconstruído via
//! [`rebuild_index()`](TransitionModel::rebuild_index) após desserialização.
//!
//! ## Amostragem com Temperatura
//!
//! ```text
//! logit_i = ln(w_i) / T
//! p_i     = exp(logit_i - max) / Σ exp(logit_j - max)
//!
//! T → 0  : arg-max (empates resolvidos pelo nome)
//! T = 1  : proporcional ao peso
//! T → ∞  : uniforme
//! ```
//!
//! Conceitos já visitados saem dos candidatos; se não sobra nenhum,
//! a caminhada termina.
//!
//! ## Ontologia Vinculada
//!
//! O modelo não guarda a ontologia: toda operação que recebe nomes também
//! recebe `&ConceptOntology`, e nomes fora do vocabulário falham com
//! [`SophiaError::UnknownConcept`].

use std::collections::{BTreeMap, BTreeSet};

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::transition::{transition_key, ReasoningPath, Transition, DEFAULT_PRIOR_STRENGTH};
use crate::core::{normalize_name, ConceptOntology};
use crate::error::{Result, SophiaError};

/// Temperaturas abaixo deste limite escolhem sempre o maior peso.
const GREEDY_TEMPERATURE: f64 = 1e-6;

fn default_prior_strength() -> f64 {
    DEFAULT_PRIOR_STRENGTH
}

/// Modelo de transições aprendido.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionModel {
    /// Transições por chave `"DE->PARA"`.
    pub transitions: BTreeMap<String, Transition>,

    /// Força `k` do prior em `w = f / (f + k)`.
    #[serde(default = "default_prior_strength")]
    pub prior_strength: f64,

    /// Sequências (com pelo menos 2 conceitos) já aprendidas.
    #[serde(default)]
    pub sequences_seen: u64,

    /// Índice de saída: origem → destinos.
    ///
    /// **Não serializado**, reconstruído em memória após load.
    #[serde(skip, default)]
    outgoing: BTreeMap<String, BTreeSet<String>>,
}

impl Default for TransitionModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Estatísticas de um treino em lote.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BatchStats {
    pub epochs: usize,
    pub sequences_processed: usize,
    /// Observações de pares aplicadas (com repetição).
    pub transitions_learned: usize,
    /// Pares distintos tocados no lote.
    pub unique_transitions: usize,
}

/// Estatísticas do modelo para observabilidade.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ModelStats {
    pub total_transitions: usize,
    pub concepts_with_outgoing: usize,
    pub concepts_with_incoming: usize,
    /// Fração dos conceitos da ontologia tocados por alguma transição.
    pub coverage_ratio: f64,
    pub sequences_seen: u64,
    pub total_observations: u64,
}

impl TransitionModel {
    pub fn new() -> Self {
        Self::with_prior_strength(DEFAULT_PRIOR_STRENGTH)
    }

    pub fn with_prior_strength(prior_strength: f64) -> Self {
        Self {
            transitions: BTreeMap::new(),
            prior_strength,
            sequences_seen: 0,
            outgoing: BTreeMap::new(),
        }
    }

    /// Reconstrói o índice de saída. **Deve ser chamado após desserialização.**
    pub fn rebuild_index(&mut self) {
        self.outgoing.clear();
        for t in self.transitions.values() {
            self.outgoing
                .entry(t.from.clone())
                .or_default()
                .insert(t.to.clone());
        }
    }

    /// Normaliza todos os nomes e exige que existam na ontologia.
    fn resolve_all(ontology: &ConceptOntology, names: &[String]) -> Result<Vec<String>> {
        names
            .iter()
            .map(|raw| {
                let name = normalize_name(raw)?;
                if ontology.concepts.contains_key(&name) {
                    Ok(name)
                } else {
                    Err(SophiaError::UnknownConcept(name))
                }
            })
            .collect()
    }

    // ─── Aprendizado ─────────────────────────────────────────────────

    /// Aprende uma sequência observada: cada par consecutivo ganha uma
    /// observação e tem o peso recalculado.
    ///
    /// Atômico: os nomes são validados antes de qualquer escrita. Pares
    /// repetidos (`A, A`) são ignorados; sequências com menos de 2
    /// conceitos não mudam nada. Retorna quantos pares foram observados.
    pub fn learn(&mut self, ontology: &ConceptOntology, sequence: &[String]) -> Result<usize> {
        self.learn_in_context(ontology, sequence, None)
    }

    /// Como [`learn`](TransitionModel::learn), marcando as transições com um contexto.
    pub fn learn_in_context(
        &mut self,
        ontology: &ConceptOntology,
        sequence: &[String],
        context: Option<&str>,
    ) -> Result<usize> {
        let names = Self::resolve_all(ontology, sequence)?;
        if names.len() < 2 {
            return Ok(0);
        }

        let mut observed = 0;
        for pair in names.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            if from == to {
                continue;
            }
            let transition = self
                .transitions
                .entry(transition_key(from, to))
                .or_insert_with(|| Transition::new(from.clone(), to.clone()));
            transition.observe(self.prior_strength);
            transition.relation_type = ontology.relation_between(from, to);
            if let Some(ctx) = context {
                transition.context = Some(ctx.to_string());
            }
            self.outgoing
                .entry(from.clone())
                .or_default()
                .insert(to.clone());
            observed += 1;
            tracing::debug!(
                from = %from,
                to = %to,
                frequency = transition.frequency,
                weight = transition.weight,
                "LCM: transição observada"
            );
        }
        self.sequences_seen += 1;
        Ok(observed)
    }

    /// Treino em lote: `epochs` passadas sobre todas as sequências.
    ///
    /// Todas as sequências são validadas antes da primeira escrita.
    pub fn train_on_sequences(
        &mut self,
        ontology: &ConceptOntology,
        sequences: &[Vec<String>],
        epochs: usize,
    ) -> Result<BatchStats> {
        for sequence in sequences {
            Self::resolve_all(ontology, sequence)?;
        }

        let mut stats = BatchStats {
            epochs,
            ..Default::default()
        };
        let mut touched = BTreeSet::new();
        for epoch in 0..epochs {
            for sequence in sequences {
                stats.transitions_learned += self.learn(ontology, sequence)?;
                stats.sequences_processed += 1;
                let names = Self::resolve_all(ontology, sequence)?;
                for pair in names.windows(2).filter(|p| p[0] != p[1]) {
                    touched.insert(transition_key(&pair[0], &pair[1]));
                }
            }
            tracing::debug!(epoch, "LCM: época concluída");
        }
        stats.unique_transitions = touched.len();
        tracing::info!(
            sequences = stats.sequences_processed,
            transitions = stats.transitions_learned,
            unique = stats.unique_transitions,
            "LCM: treino em lote concluído"
        );
        Ok(stats)
    }

    // ─── Consulta ────────────────────────────────────────────────────

    pub fn get(&self, from: &str, to: &str) -> Option<&Transition> {
        self.transitions.get(&transition_key(from, to))
    }

    /// Peso de `from → to`, 0.0 se a transição não existe.
    pub fn weight(&self, from: &str, to: &str) -> f64 {
        self.get(from, to).map_or(0.0, |t| t.weight)
    }

    /// Transições de saída de `from`, em ordem de nome do destino.
    pub fn successors(&self, from: &str) -> Vec<&Transition> {
        self.outgoing
            .get(from)
            .into_iter()
            .flatten()
            .filter_map(|to| self.get(from, to))
            .collect()
    }

    /// Até `top_k` sucessores com probabilidade normalizada por origem,
    /// do mais provável ao menos provável.
    pub fn next_concepts(
        &self,
        ontology: &ConceptOntology,
        name: &str,
        top_k: usize,
    ) -> Result<Vec<(String, f64)>> {
        let name = Self::resolve_all(ontology, &[name.to_string()])?.remove(0);
        let successors = self.successors(&name);
        let total: f64 = successors.iter().map(|t| t.weight).sum();
        if total <= 0.0 {
            return Ok(Vec::new());
        }
        let mut ranked: Vec<(String, f64)> = successors
            .into_iter()
            .map(|t| (t.to.clone(), t.weight / total))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(top_k);
        Ok(ranked)
    }

    // ─── Geração ─────────────────────────────────────────────────────

    /// Caminhada ponderada a partir de `start` com no máximo `length` conceitos.
    ///
    /// - sem transições de saída → `[start]` com probabilidade 1.0
    /// - `length` 0 é tratado como 1
    /// - a probabilidade é o produto dos pesos percorridos
    pub fn generate_sequence<R: Rng + ?Sized>(
        &self,
        ontology: &ConceptOntology,
        start: &str,
        length: usize,
        temperature: f64,
        rng: &mut R,
    ) -> Result<ReasoningPath> {
        let start = Self::resolve_all(ontology, &[start.to_string()])?.remove(0);
        let mut path = ReasoningPath::trivial(start.clone());
        let mut visited = BTreeSet::from([start.clone()]);
        let mut current = start;

        while path.concepts.len() < length.max(1) {
            let candidates: Vec<&Transition> = self
                .successors(&current)
                .into_iter()
                .filter(|t| t.weight > 0.0 && !visited.contains(&t.to))
                .collect();
            let Some(next) = sample(&candidates, temperature, rng) else {
                break;
            };
            path.probability *= next.weight;
            path.concepts.push(next.to.clone());
            visited.insert(next.to.clone());
            current = next.to.clone();
        }

        tracing::debug!(
            start = %path.start,
            steps = path.concepts.len(),
            probability = path.probability,
            "LCM: caminho gerado"
        );
        Ok(path)
    }

    /// Produto dos pesos ao longo da sequência.
    ///
    /// 1.0 para sequência vazia ou de um conceito; 0.0 se falta alguma transição.
    pub fn evaluate_sequence_probability(
        &self,
        ontology: &ConceptOntology,
        sequence: &[String],
    ) -> Result<f64> {
        let names = Self::resolve_all(ontology, sequence)?;
        Ok(names
            .windows(2)
            .map(|pair| self.weight(&pair[0], &pair[1]))
            .product())
    }

    // ─── Estatísticas ────────────────────────────────────────────────

    pub fn stats(&self, ontology: &ConceptOntology) -> ModelStats {
        let sources: BTreeSet<&str> = self.transitions.values().map(|t| t.from.as_str()).collect();
        let targets: BTreeSet<&str> = self.transitions.values().map(|t| t.to.as_str()).collect();
        let touched = sources.union(&targets).count();
        let coverage_ratio = if ontology.concept_count() == 0 {
            0.0
        } else {
            touched as f64 / ontology.concept_count() as f64
        };
        ModelStats {
            total_transitions: self.transitions.len(),
            concepts_with_outgoing: sources.len(),
            concepts_with_incoming: targets.len(),
            coverage_ratio,
            sequences_seen: self.sequences_seen,
            total_observations: self.transitions.values().map(|t| t.frequency).sum(),
        }
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

/// Escolhe um candidato segundo os pesos e a temperatura.
fn sample<'a, R: Rng + ?Sized>(
    candidates: &[&'a Transition],
    temperature: f64,
    rng: &mut R,
) -> Option<&'a Transition> {
    if candidates.is_empty() {
        return None;
    }
    if temperature <= GREEDY_TEMPERATURE {
        return greedy(candidates);
    }

    let logits: Vec<f64> = candidates.iter().map(|t| t.weight.ln() / temperature).collect();
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(candidates[dist.sample(rng)]),
        Err(e) => {
            tracing::debug!(error = %e, "LCM: pesos degenerados, usando arg-max");
            greedy(candidates)
        }
    }
}

/// Maior peso; em empate, o menor nome (candidatos já vêm ordenados por nome).
fn greedy<'a>(candidates: &[&'a Transition]) -> Option<&'a Transition> {
    candidates.iter().copied().fold(None, |best, t| match best {
        Some(b) if b.weight >= t.weight => Some(b),
        _ => Some(t),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConceptType, RelationType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seq(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn ontology() -> ConceptOntology {
        let mut onto = ConceptOntology::new();
        for name in ["A", "B", "C", "D"] {
            onto.add_concept(name, ConceptType::Logical).unwrap();
        }
        onto
    }

    /// Dois aprendizados de [A, B] seguidos aumentam o peso de A → B
    #[test]
    fn repeated_learning_strictly_increases_weight() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        model.learn(&onto, &seq(&["A", "B"])).unwrap();
        let first = model.weight("A", "B");
        model.learn(&onto, &seq(&["A", "B"])).unwrap();
        let second = model.weight("A", "B");
        assert!(second > first);
        assert!(second <= 1.0 && first > 0.0);
    }

    #[test]
    fn learn_rejects_unknown_names_without_mutating() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        let err = model.learn(&onto, &seq(&["A", "B", "LICORNE"])).unwrap_err();
        assert_eq!(err, SophiaError::UnknownConcept("LICORNE".into()));
        assert_eq!(model.transition_count(), 0);
        assert_eq!(model.sequences_seen, 0);
    }

    #[test]
    fn short_sequences_and_self_loops_are_ignored() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        assert_eq!(model.learn(&onto, &seq(&["A"])).unwrap(), 0);
        assert_eq!(model.learn(&onto, &seq(&["A", "A", "B"])).unwrap(), 1);
        assert!(model.get("A", "A").is_none());
    }

    #[test]
    fn learn_labels_transition_with_ontology_relation() {
        let mut onto = ontology();
        onto.add_relation("A", RelationType::Implies, "B").unwrap();
        let mut model = TransitionModel::new();
        model
            .learn_in_context(&onto, &seq(&["a", "b"]), Some("dialogue"))
            .unwrap();
        let t = model.get("A", "B").unwrap();
        assert_eq!(t.relation_type, Some(RelationType::Implies));
        assert_eq!(t.context.as_deref(), Some("dialogue"));
    }

    #[test]
    fn singleton_and_missing_edge_probabilities() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        model.learn(&onto, &seq(&["A", "B"])).unwrap();
        assert_eq!(model.evaluate_sequence_probability(&onto, &seq(&["C"])).unwrap(), 1.0);
        assert_eq!(model.evaluate_sequence_probability(&onto, &seq(&["A", "C"])).unwrap(), 0.0);
        assert!((model.evaluate_sequence_probability(&onto, &seq(&["A", "B"])).unwrap() - 0.5).abs() < 1e-12);
        assert!(model.evaluate_sequence_probability(&onto, &seq(&["X"])).is_err());
    }

    #[test]
    fn start_without_transitions_yields_trivial_path() {
        let onto = ontology();
        let model = TransitionModel::new();
        let mut rng = StdRng::seed_from_u64(7);
        let path = model.generate_sequence(&onto, "d", 4, 0.8, &mut rng).unwrap();
        assert_eq!(path.concepts, vec!["D"]);
        assert_eq!(path.probability, 1.0);
    }

    /// Caminhada nunca excede `length`, nunca sai da ontologia e não repete conceitos
    #[test]
    fn generated_paths_are_bounded_and_known() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        model.learn(&onto, &seq(&["A", "B", "C", "D", "A", "C", "B"])).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for length in 0..6 {
            for _ in 0..20 {
                let path = model.generate_sequence(&onto, "A", length, 1.0, &mut rng).unwrap();
                assert!(path.concepts.len() <= length.max(1));
                assert!(path.concepts.iter().all(|c| onto.contains(c)));
                let unique: BTreeSet<_> = path.concepts.iter().collect();
                assert_eq!(unique.len(), path.concepts.len());
                assert!((0.0..=1.0).contains(&path.probability));
            }
        }
    }

    #[test]
    fn zero_temperature_is_greedy() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        model.learn(&onto, &seq(&["A", "C"])).unwrap();
        model.learn(&onto, &seq(&["A", "C"])).unwrap();
        model.learn(&onto, &seq(&["A", "B"])).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            let path = model.generate_sequence(&onto, "A", 2, 0.0, &mut rng).unwrap();
            assert_eq!(path.concepts, vec!["A", "C"]);
        }
    }

    #[test]
    fn greedy_breaks_ties_by_name() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        model.learn(&onto, &seq(&["A", "C"])).unwrap();
        model.learn(&onto, &seq(&["A", "B"])).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let path = model.generate_sequence(&onto, "A", 2, 0.0, &mut rng).unwrap();
        assert_eq!(path.concepts, vec!["A", "B"]);
    }

    #[test]
    fn next_concepts_are_normalized() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        model.learn(&onto, &seq(&["A", "B"])).unwrap();
        model.learn(&onto, &seq(&["A", "C"])).unwrap();
        let next = model.next_concepts(&onto, "A", 5).unwrap();
        let total: f64 = next.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(model.next_concepts(&onto, "D", 5).unwrap(), vec![]);
    }

    #[test]
    fn batch_training_reports_unique_pairs() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        let stats = model
            .train_on_sequences(&onto, &[seq(&["A", "B", "C"]), seq(&["A", "B"])], 2)
            .unwrap();
        assert_eq!(stats.sequences_processed, 4);
        assert_eq!(stats.transitions_learned, 6);
        assert_eq!(stats.unique_transitions, 2);
        assert_eq!(model.get("A", "B").unwrap().frequency, 4);
    }

    /// Frequências e índice sobrevivem à serialização
    #[test]
    fn index_is_rebuilt_after_load() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        model.learn(&onto, &seq(&["A", "B"])).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let mut loaded: TransitionModel = serde_json::from_str(&json).unwrap();
        assert!(loaded.successors("A").is_empty());
        loaded.rebuild_index();
        assert_eq!(loaded.successors("A").len(), 1);

        loaded.learn(&onto, &seq(&["A", "B"])).unwrap();
        assert_eq!(loaded.get("A", "B").unwrap().frequency, 2);
    }

    #[test]
    fn stats_report_coverage() {
        let onto = ontology();
        let mut model = TransitionModel::new();
        model.learn(&onto, &seq(&["A", "B"])).unwrap();
        let stats = model.stats(&onto);
        assert_eq!(stats.total_transitions, 1);
        assert!((stats.coverage_ratio - 0.5).abs() < 1e-12);
        assert_eq!(stats.total_observations, 1);
    }
}
