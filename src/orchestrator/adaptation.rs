//! # Adaptação do Aprendizado
//!
//! O [`AdaptiveLearner`] acompanha o desempenho recente do orquestrador e,
//! quando ele cai (ou periodicamente), revisa o limiar de confiança que
//! abre o portão de aprendizado.
//!
//! ## Janela Deslizante
//!
//! ```text
//! interações:  ... │ 10 anteriores │ 10 recentes │
//!                        média A        média B
//!
//! variação = (B − A) / A × 100
//!   > +5%  → Rising
//!   < −5%  → Falling
//!   senão  → Stable      (menos de 20 amostras: sempre Stable)
//! ```
//!
//! ## Quando Adaptar
//!
//! | Condição | Motivo |
//! |----------|--------|
//! | ≥ 20 amostras e confiança ou validação em queda | [`AdaptationReason::FallingPerformance`] |
//! | ≥ 20 amostras e `interações % adaptation_interval == 0` | [`AdaptationReason::Periodic`] |
//!
//! Uma adaptação propõe como novo limiar o ponto médio entre a confiança
//! de extração média das respostas bem validadas (> 0.7) e a das mal
//! validadas (< 0.5), limitado a `[0.5, 0.9]`. Com `adaptive_thresholds`
//! desligado a proposta é registrada mas o limiar não muda.
//!
//! Respostas padrão entram nas tendências, mas não na calibração do limiar.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::OrchestratorConfig;
use crate::nlu::text::fold;

use super::response::{GenerationMode, Response};

/// Amostras mínimas para calcular uma tendência.
const MIN_TREND_SAMPLES: usize = 20;
/// Tamanho de cada metade comparada.
const TREND_HALF: usize = 10;
/// Variação percentual que conta como mudança.
const TREND_CHANGE_PERCENT: f64 = 5.0;

/// Exemplos guardados para calibrar o limiar.
const EXAMPLE_CAPACITY: usize = 500;
const MIN_CALIBRATION_EXAMPLES: usize = 10;
const SUCCESS_VALIDATION: f64 = 0.7;
const FAILURE_VALIDATION: f64 = 0.5;
const MIN_THRESHOLD: f64 = 0.5;
const MAX_THRESHOLD: f64 = 0.9;

/// Usos mínimos de um tipo de pergunta antes de julgar suas respostas.
const MIN_STRATEGY_USES: u64 = 5;
const REINFORCE_RATE: f64 = 0.8;
const REVISE_RATE: f64 = 0.5;

/// Respostas acima disso (ms) em média pedem otimização.
const SLOW_RESPONSE_MS: f64 = 10_000.0;

// ─── Classificação ───────────────────────────────────────────────

/// Forma da pergunta filosófica.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// "Qu'est-ce que la justice ?"
    Definition,
    /// "Pourquoi ..."
    Causal,
    /// "Comment ..."
    Processual,
    /// "Peut-on ...", "Est-il possible ..."
    Possibility,
    /// "Doit-on ...", "Faut-il ..."
    Normative,
    /// Pergunta sobre a relação ou o lien entre noções.
    Relational,
    /// "... existe ..."
    Existential,
    #[default]
    General,
}

impl QuestionType {
    pub fn classify(question: &str) -> Self {
        let q = fold(question.trim());
        let has_word = |word: &str| q.split(|c: char| !c.is_alphanumeric()).any(|w| w == word);

        if ["qu'est-ce que", "qu'est-ce qu'", "que signifie"].iter().any(|p| q.starts_with(p)) {
            Self::Definition
        } else if has_word("pourquoi") {
            Self::Causal
        } else if has_word("comment") {
            Self::Processual
        } else if ["peut-on", "est-il possible"].iter().any(|p| q.starts_with(p)) {
            Self::Possibility
        } else if ["doit-on", "faut-il"].iter().any(|p| q.starts_with(p)) {
            Self::Normative
        } else if q.contains('?') && (q.contains("relation") || q.contains("lien")) {
            Self::Relational
        } else if q.contains("existe") {
            Self::Existential
        } else {
            Self::General
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Causal => "causal",
            Self::Processual => "processual",
            Self::Possibility => "possibility",
            Self::Normative => "normative",
            Self::Relational => "relational",
            Self::Existential => "existential",
            Self::General => "general",
        }
    }
}

/// Grande área da filosofia.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhilosophicalDomain {
    Epistemology,
    Ethics,
    Metaphysics,
    Aesthetics,
    Logic,
}

const DOMAINS: &[(PhilosophicalDomain, &[&str])] = &[
    (
        PhilosophicalDomain::Epistemology,
        &["VÉRITÉ", "CONNAISSANCE", "CROYANCE", "JUSTIFICATION", "CERTITUDE", "DOUTE", "OPINION"],
    ),
    (
        PhilosophicalDomain::Ethics,
        &["BIEN", "MAL", "JUSTICE", "VERTU", "DEVOIR", "RESPONSABILITÉ", "VICE"],
    ),
    (
        PhilosophicalDomain::Metaphysics,
        &["ÊTRE", "EXISTENCE", "ESSENCE", "SUBSTANCE", "CONTINGENCE", "NÉCESSITÉ"],
    ),
    (
        PhilosophicalDomain::Aesthetics,
        &["BEAUTÉ", "ART", "SUBLIME", "HARMONIE", "GOÛT", "LAIDEUR"],
    ),
    (
        PhilosophicalDomain::Logic,
        &["ARGUMENT", "VALIDITÉ", "COHÉRENCE", "SYLLOGISME", "DÉDUCTION", "INFÉRENCE", "PARADOXE"],
    ),
];

impl PhilosophicalDomain {
    /// Área com mais conceitos em comum; empate fica com a primeira da lista.
    pub fn detect(concepts: &[String]) -> Option<Self> {
        let mut best: Option<(Self, usize)> = None;
        for (domain, names) in DOMAINS {
            let score = concepts.iter().filter(|c| names.contains(&c.as_str())).count();
            if score > 0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((*domain, score));
            }
        }
        best.map(|(domain, _)| domain)
    }
}

// ─── Tendências ──────────────────────────────────────────────────

/// Direção de uma métrica na janela.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    #[default]
    Stable,
    Falling,
}

impl Trend {
    /// Compara as 10 amostras mais recentes com as 10 anteriores.
    pub fn of(values: &VecDeque<f64>) -> Self {
        if values.len() < MIN_TREND_SAMPLES {
            return Self::Stable;
        }
        let mut newest_first = values.iter().rev();
        let recent: f64 = newest_first.by_ref().take(TREND_HALF).sum::<f64>() / TREND_HALF as f64;
        let previous: f64 = newest_first.take(TREND_HALF).sum::<f64>() / TREND_HALF as f64;

        if previous.abs() < f64::EPSILON {
            return if recent > f64::EPSILON { Self::Rising } else { Self::Stable };
        }
        let change = (recent - previous) / previous * 100.0;
        if change > TREND_CHANGE_PERCENT {
            Self::Rising
        } else if change < -TREND_CHANGE_PERCENT {
            Self::Falling
        } else {
            Self::Stable
        }
    }
}

/// Um valor por métrica acompanhada.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricSet<T> {
    pub confidence: T,
    pub validation: T,
    pub duration_ms: T,
    pub concept_accuracy: T,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTrends {
    pub sample_size: usize,
    pub averages: MetricSet<f64>,
    pub trends: MetricSet<Trend>,
}

/// Janela deslizante das últimas `capacity` interações.
#[derive(Clone, Debug)]
pub struct PerformanceWindow {
    capacity: usize,
    confidence: VecDeque<f64>,
    validation: VecDeque<f64>,
    duration_ms: VecDeque<f64>,
    concept_accuracy: VecDeque<f64>,
}

impl PerformanceWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            confidence: VecDeque::new(),
            validation: VecDeque::new(),
            duration_ms: VecDeque::new(),
            concept_accuracy: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.confidence.len()
    }

    pub fn record(&mut self, interaction: &Interaction) {
        let capacity = self.capacity;
        let push = |values: &mut VecDeque<f64>, value: f64| {
            if values.len() == capacity {
                values.pop_front();
            }
            values.push_back(value);
        };
        push(&mut self.confidence, interaction.confidence);
        push(&mut self.validation, interaction.validation);
        push(&mut self.duration_ms, interaction.duration_ms as f64);
        push(&mut self.concept_accuracy, interaction.concept_accuracy());
    }

    /// `None` enquanto a janela está vazia.
    pub fn trends(&self) -> Option<PerformanceTrends> {
        if self.confidence.is_empty() {
            return None;
        }
        let mean = |values: &VecDeque<f64>| values.iter().sum::<f64>() / values.len() as f64;
        Some(PerformanceTrends {
            sample_size: self.len(),
            averages: MetricSet {
                confidence: mean(&self.confidence),
                validation: mean(&self.validation),
                duration_ms: mean(&self.duration_ms),
                concept_accuracy: mean(&self.concept_accuracy),
            },
            trends: MetricSet {
                confidence: Trend::of(&self.confidence),
                validation: Trend::of(&self.validation),
                duration_ms: Trend::of(&self.duration_ms),
                concept_accuracy: Trend::of(&self.concept_accuracy),
            },
        })
    }
}

// ─── Interações e adaptações ─────────────────────────────────────

/// O que o aprendiz guarda de uma resposta.
#[derive(Clone, Debug, PartialEq)]
pub struct Interaction {
    pub question_type: QuestionType,
    pub concepts: Vec<String>,
    pub extraction_confidence: f64,
    /// Confiança global da resposta.
    pub confidence: f64,
    pub validation: f64,
    pub duration_ms: u64,
    /// `false` para a resposta padrão.
    pub generated: bool,
}

impl Interaction {
    pub fn from_response(response: &Response) -> Self {
        Self {
            question_type: response.question_type,
            concepts: response.analysis.concepts.clone(),
            extraction_confidence: response.analysis.confidence,
            confidence: response.confidence,
            validation: response.validation.global_score,
            duration_ms: response.duration_ms,
            generated: response.generation_mode != GenerationMode::Canned,
        }
    }

    /// Média de confiança e validação; 0.0 sem conceitos.
    pub fn concept_accuracy(&self) -> f64 {
        if self.concepts.is_empty() {
            0.0
        } else {
            (self.confidence + self.validation) / 2.0
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationReason {
    FallingPerformance,
    Periodic,
}

/// Proposta de novo limiar de confiança para o aprendizado.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAdaptation {
    pub previous: f64,
    pub proposed: f64,
    pub applied: bool,
    pub successful_examples: usize,
    pub failed_examples: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyAction {
    Reinforce,
    Revise,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyReview {
    pub question_type: QuestionType,
    pub action: StrategyAction,
    pub success_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Adaptation {
    /// 1 para a primeira adaptação da sessão.
    pub index: u64,
    pub reason: AdaptationReason,
    pub threshold: Option<ThresholdAdaptation>,
    pub strategies: Vec<StrategyReview>,
}

/// Desempenho acumulado de um tipo de pergunta.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionTypeStats {
    pub question_type: QuestionType,
    pub uses: u64,
    /// Média móvel da validação.
    pub success_rate: f64,
}

// ─── Recomendações ───────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Performance,
    Efficiency,
    Data,
    Diversity,
    Strategy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub recommendation: String,
    pub action: String,
}

impl Recommendation {
    fn new(kind: RecommendationKind, priority: Priority, recommendation: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            kind,
            priority,
            recommendation: recommendation.into(),
            action: action.into(),
        }
    }
}

/// Visão do aprendizado exposta no resumo da sessão.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningInsights {
    pub total_interactions: u64,
    pub adaptations: u64,
    /// Confiança do próprio aprendiz em `[0, 1]`.
    pub learning_confidence: f64,
    /// Limiar de confiança de extração em vigor no portão de aprendizado.
    pub confidence_threshold: f64,
    pub trends: Option<PerformanceTrends>,
    pub question_types: Vec<QuestionTypeStats>,
    /// Até 3 áreas, da mais à menos frequente.
    pub domains: Vec<(PhilosophicalDomain, u64)>,
    pub last_adaptation: Option<Adaptation>,
    pub recommendations: Vec<Recommendation>,
}

// ─── Aprendiz ────────────────────────────────────────────────────

/// Estado adaptativo de uma sessão. Não é persistido nos snapshots.
#[derive(Clone, Debug)]
pub struct AdaptiveLearner {
    adaptive_thresholds: bool,
    adaptation_interval: u64,
    threshold: f64,
    window: PerformanceWindow,
    /// `(confiança de extração, validação)` das respostas geradas.
    examples: VecDeque<(f64, f64)>,
    interactions: u64,
    adaptations: u64,
    last_adaptation: Option<Adaptation>,
    question_types: BTreeMap<QuestionType, QuestionTypeStats>,
    domains: BTreeMap<PhilosophicalDomain, u64>,
    concepts_seen: BTreeSet<String>,
}

impl AdaptiveLearner {
    pub fn new(config: &OrchestratorConfig) -> Self {
        Self {
            adaptive_thresholds: config.adaptive_thresholds,
            adaptation_interval: config.adaptation_interval.max(1),
            threshold: config.learning_confidence_threshold,
            window: PerformanceWindow::new(config.trend_window),
            examples: VecDeque::new(),
            interactions: 0,
            adaptations: 0,
            last_adaptation: None,
            question_types: BTreeMap::new(),
            domains: BTreeMap::new(),
            concepts_seen: BTreeSet::new(),
        }
    }

    /// Limiar de confiança de extração em vigor.
    pub fn confidence_threshold(&self) -> f64 {
        self.threshold
    }

    /// Registra uma interação; devolve a adaptação, se uma foi disparada.
    pub fn observe(&mut self, interaction: &Interaction) -> Option<Adaptation> {
        self.interactions += 1;
        self.window.record(interaction);
        self.concepts_seen.extend(interaction.concepts.iter().cloned());

        if interaction.generated {
            if self.examples.len() == EXAMPLE_CAPACITY {
                self.examples.pop_front();
            }
            self.examples
                .push_back((interaction.extraction_confidence, interaction.validation));

            let stats = self
                .question_types
                .entry(interaction.question_type)
                .or_insert_with(|| QuestionTypeStats {
                    question_type: interaction.question_type,
                    ..QuestionTypeStats::default()
                });
            stats.success_rate =
                (stats.success_rate * stats.uses as f64 + interaction.validation) / (stats.uses + 1) as f64;
            stats.uses += 1;
        }

        if let Some(domain) = PhilosophicalDomain::detect(&interaction.concepts) {
            *self.domains.entry(domain).or_default() += 1;
        }

        let reason = self.adaptation_reason()?;
        Some(self.adapt(reason))
    }

    fn adaptation_reason(&self) -> Option<AdaptationReason> {
        let trends = self.window.trends()?;
        if trends.sample_size < MIN_TREND_SAMPLES {
            return None;
        }
        if trends.trends.confidence == Trend::Falling || trends.trends.validation == Trend::Falling {
            Some(AdaptationReason::FallingPerformance)
        } else if self.interactions % self.adaptation_interval == 0 {
            Some(AdaptationReason::Periodic)
        } else {
            None
        }
    }

    fn adapt(&mut self, reason: AdaptationReason) -> Adaptation {
        self.adaptations += 1;
        let threshold = self.calibrate_threshold();
        if let Some(t) = threshold.as_ref().filter(|t| t.applied) {
            self.threshold = t.proposed;
        }
        let adaptation = Adaptation {
            index: self.adaptations,
            reason,
            threshold,
            strategies: self.review_strategies(),
        };
        tracing::info!(
            index = adaptation.index,
            reason = ?reason,
            threshold = self.threshold,
            strategies = adaptation.strategies.len(),
            "Aprendizado: adaptação aplicada"
        );
        self.last_adaptation = Some(adaptation.clone());
        adaptation
    }

    /// Ponto médio entre as confianças de respostas boas e ruins.
    fn calibrate_threshold(&self) -> Option<ThresholdAdaptation> {
        if self.examples.len() < MIN_CALIBRATION_EXAMPLES {
            return None;
        }
        let mean_confidence = |keep: &dyn Fn(f64) -> bool| -> Option<(f64, usize)> {
            let confidences: Vec<f64> = self
                .examples
                .iter()
                .filter(|(_, validation)| keep(*validation))
                .map(|(confidence, _)| *confidence)
                .collect();
            let n = confidences.len();
            (n > 0).then(|| (confidences.iter().sum::<f64>() / n as f64, n))
        };
        let (good, successful_examples) = mean_confidence(&|v: f64| v > SUCCESS_VALIDATION)?;
        let (bad, failed_examples) = mean_confidence(&|v: f64| v < FAILURE_VALIDATION)?;

        Some(ThresholdAdaptation {
            previous: self.threshold,
            proposed: ((good + bad) / 2.0).clamp(MIN_THRESHOLD, MAX_THRESHOLD),
            applied: self.adaptive_thresholds,
            successful_examples,
            failed_examples,
        })
    }

    fn review_strategies(&self) -> Vec<StrategyReview> {
        self.question_types
            .values()
            .filter(|s| s.uses >= MIN_STRATEGY_USES)
            .filter_map(|s| {
                let action = if s.success_rate > REINFORCE_RATE {
                    StrategyAction::Reinforce
                } else if s.success_rate < REVISE_RATE {
                    StrategyAction::Revise
                } else {
                    return None;
                };
                Some(StrategyReview {
                    question_type: s.question_type,
                    action,
                    success_rate: s.success_rate,
                })
            })
            .collect()
    }

    /// `0.3 × volume + 0.4 × validação recente + 0.2 × diversidade + 0.1 × adaptações`.
    pub fn learning_confidence(&self) -> f64 {
        if self.examples.is_empty() {
            return 0.0;
        }
        let volume = (self.examples.len() as f64 / 100.0).min(1.0);
        let recent = if self.examples.len() >= TREND_HALF {
            self.examples
                .iter()
                .rev()
                .take(TREND_HALF)
                .map(|(_, validation)| validation)
                .sum::<f64>()
                / TREND_HALF as f64
        } else {
            0.0
        };
        let diversity = (self.concepts_seen.len() as f64 / 20.0).min(1.0);
        let adaptations = (self.adaptations as f64 / 5.0).min(1.0);
        0.3 * volume + 0.4 * recent + 0.2 * diversity + 0.1 * adaptations
    }

    pub fn insights(&self) -> LearningInsights {
        let mut domains: Vec<(PhilosophicalDomain, u64)> = self.domains.iter().map(|(d, n)| (*d, *n)).collect();
        domains.sort_by(|a, b| b.1.cmp(&a.1));
        domains.truncate(3);

        LearningInsights {
            total_interactions: self.interactions,
            adaptations: self.adaptations,
            learning_confidence: self.learning_confidence(),
            confidence_threshold: self.threshold,
            trends: self.window.trends(),
            question_types: self.question_types.values().cloned().collect(),
            domains,
            last_adaptation: self.last_adaptation.clone(),
            recommendations: self.recommendations(),
        }
    }

    fn recommendations(&self) -> Vec<Recommendation> {
        let mut out = Vec::new();
        if let Some(trends) = self.window.trends() {
            if trends.trends.confidence == Trend::Falling {
                out.push(Recommendation::new(
                    RecommendationKind::Performance,
                    Priority::High,
                    "Améliorer la précision conceptuelle",
                    "Réviser la détection des concepts et le lexique",
                ));
            }
            if trends.averages.duration_ms > SLOW_RESPONSE_MS {
                out.push(Recommendation::new(
                    RecommendationKind::Efficiency,
                    Priority::Medium,
                    "Optimiser les temps de réponse",
                    "Réduire la longueur des réponses ou le délai du générateur",
                ));
            }
        }
        for review in self.review_strategies() {
            if review.action == StrategyAction::Revise {
                out.push(Recommendation::new(
                    RecommendationKind::Strategy,
                    Priority::Medium,
                    format!("Revoir les réponses aux questions « {} »", review.question_type.as_str()),
                    format!("Taux de réussite de {:.0} %", review.success_rate * 100.0),
                ));
            }
        }
        if self.interactions < 50 {
            out.push(Recommendation::new(
                RecommendationKind::Data,
                Priority::Medium,
                "Augmenter le volume d'apprentissage",
                "Encourager des interactions plus nombreuses et variées",
            ));
        }
        if self.concepts_seen.len() < 10 {
            out.push(Recommendation::new(
                RecommendationKind::Diversity,
                Priority::Low,
                "Diversifier les domaines philosophiques",
                "Explorer des questions dans de nouveaux domaines",
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            adaptation_interval: 1000,
            ..OrchestratorConfig::default()
        }
    }

    fn interaction(extraction: f64, validation: f64) -> Interaction {
        Interaction {
            question_type: QuestionType::Definition,
            concepts: vec!["JUSTICE".into()],
            extraction_confidence: extraction,
            confidence: 0.6 * extraction + 0.4 * validation,
            validation,
            duration_ms: 100,
            generated: true,
        }
    }

    #[test]
    fn classifies_question_forms() {
        let cases = [
            ("Qu'est-ce que la justice ?", QuestionType::Definition),
            ("Qu\u{2019}est-ce qu\u{2019}un concept ?", QuestionType::Definition),
            ("Pourquoi obéir aux lois ?", QuestionType::Causal),
            ("Comment connaître le vrai ?", QuestionType::Processual),
            ("Peut-on tout savoir ?", QuestionType::Possibility),
            ("Faut-il craindre la mort ?", QuestionType::Normative),
            ("Quel lien entre art et vérité ?", QuestionType::Relational),
            ("Dieu existe-t-il ?", QuestionType::Existential),
            ("La justice peut-elle être injuste ?", QuestionType::General),
        ];
        for (question, expected) in cases {
            assert_eq!(QuestionType::classify(question), expected, "{question}");
        }
    }

    #[test]
    fn trend_compares_last_two_decades() {
        let falling: VecDeque<f64> = [0.8; 10].into_iter().chain([0.4; 10]).collect();
        assert_eq!(Trend::of(&falling), Trend::Falling);
        let rising: VecDeque<f64> = [0.4; 10].into_iter().chain([0.8; 10]).collect();
        assert_eq!(Trend::of(&rising), Trend::Rising);
        let flat: VecDeque<f64> = [0.5; 10].into_iter().chain([0.51; 10]).collect();
        assert_eq!(Trend::of(&flat), Trend::Stable);
        let short: VecDeque<f64> = [0.9; 5].into_iter().chain([0.1; 5]).collect();
        assert_eq!(Trend::of(&short), Trend::Stable);
        let from_zero: VecDeque<f64> = [0.0; 10].into_iter().chain([0.3; 10]).collect();
        assert_eq!(Trend::of(&from_zero), Trend::Rising);
    }

    #[test]
    fn window_is_bounded() {
        let mut window = PerformanceWindow::new(3);
        for v in [0.1, 0.2, 0.3, 0.4] {
            window.record(&interaction(v, v));
        }
        let trends = window.trends().unwrap();
        assert_eq!(trends.sample_size, 3);
        assert!((trends.averages.validation - 0.3).abs() < 1e-9);
    }

    /// Validação despenca: o limiar vai para o ponto médio das confianças.
    #[test]
    fn falling_validation_recalibrates_threshold() {
        let mut learner = AdaptiveLearner::new(&config());
        for _ in 0..10 {
            assert!(learner.observe(&interaction(0.9, 0.9)).is_none());
        }
        for _ in 0..9 {
            assert!(learner.observe(&interaction(0.6, 0.3)).is_none());
        }
        let adaptation = learner.observe(&interaction(0.6, 0.3)).unwrap();

        assert_eq!(adaptation.index, 1);
        assert_eq!(adaptation.reason, AdaptationReason::FallingPerformance);
        let threshold = adaptation.threshold.unwrap();
        assert_eq!((threshold.successful_examples, threshold.failed_examples), (10, 10));
        assert!((threshold.previous - 0.7).abs() < 1e-9);
        assert!((threshold.proposed - 0.75).abs() < 1e-9);
        assert!(threshold.applied);
        assert!((learner.confidence_threshold() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn disabled_adaptation_only_proposes() {
        let mut learner = AdaptiveLearner::new(&OrchestratorConfig {
            adaptive_thresholds: false,
            ..config()
        });
        let mut last = None;
        for i in 0..20 {
            let sample = if i < 10 { interaction(0.9, 0.9) } else { interaction(0.6, 0.3) };
            last = learner.observe(&sample).or(last);
        }
        let threshold = last.unwrap().threshold.unwrap();
        assert!(!threshold.applied);
        assert_eq!(learner.confidence_threshold(), 0.7);
    }

    #[test]
    fn proposal_is_clamped() {
        let mut learner = AdaptiveLearner::new(&config());
        for i in 0..20 {
            let sample = if i < 10 { interaction(1.0, 0.95) } else { interaction(1.0, 0.1) };
            learner.observe(&sample);
        }
        assert_eq!(learner.confidence_threshold(), MAX_THRESHOLD);
    }

    #[test]
    fn stable_performance_adapts_periodically() {
        let mut learner = AdaptiveLearner::new(&OrchestratorConfig {
            adaptation_interval: 25,
            ..config()
        });
        let adaptations: Vec<u64> = (1..=50)
            .filter_map(|i| learner.observe(&interaction(0.8, 0.85)).map(|_| i))
            .collect();
        assert_eq!(adaptations, vec![25, 50]);

        let last = learner.insights().last_adaptation.unwrap();
        assert_eq!(last.reason, AdaptationReason::Periodic);
        // Sem respostas ruins não há o que calibrar.
        assert!(last.threshold.is_none());
        assert_eq!(last.strategies.len(), 1);
        assert_eq!(last.strategies[0].question_type, QuestionType::Definition);
        assert_eq!(last.strategies[0].action, StrategyAction::Reinforce);
        assert!((last.strategies[0].success_rate - 0.85).abs() < 1e-9);
    }

    #[test]
    fn canned_answers_feed_trends_but_not_calibration() {
        let mut learner = AdaptiveLearner::new(&config());
        let canned = Interaction {
            generated: false,
            concepts: vec![],
            ..interaction(0.0, 0.0)
        };
        learner.observe(&canned);
        let insights = learner.insights();
        assert_eq!(insights.total_interactions, 1);
        assert_eq!(insights.trends.unwrap().sample_size, 1);
        assert!(insights.question_types.is_empty());
        assert_eq!(insights.learning_confidence, 0.0);
    }

    #[test]
    fn insights_recommend_revising_weak_question_types() {
        let mut learner = AdaptiveLearner::new(&config());
        for _ in 0..5 {
            learner.observe(&Interaction {
                question_type: QuestionType::Causal,
                ..interaction(0.7, 0.3)
            });
        }
        let insights = learner.insights();
        let kinds: Vec<RecommendationKind> = insights.recommendations.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RecommendationKind::Strategy, RecommendationKind::Data, RecommendationKind::Diversity]
        );
        assert!(insights.recommendations[0].recommendation.contains("causal"));
        assert_eq!(insights.domains, vec![(PhilosophicalDomain::Ethics, 5)]);
        // 0.3 × 5/100 + 0 (menos de 10 exemplos) + 0.2 × 1/20
        assert!((insights.learning_confidence - 0.025).abs() < 1e-9);
    }

    #[test]
    fn domain_detection_prefers_larger_overlap() {
        let concepts = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            PhilosophicalDomain::detect(&concepts(&["BEAUTÉ", "ART", "JUSTICE"])),
            Some(PhilosophicalDomain::Aesthetics)
        );
        assert_eq!(PhilosophicalDomain::detect(&concepts(&["TEMPS"])), None);
    }
}
