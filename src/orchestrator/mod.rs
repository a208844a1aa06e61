//! # Orquestrador de Raciocínio
//!
//! O [`ReasoningOrchestrator`] leva uma pergunta do texto cru até uma
//! [`Response`] completa, passando por todos os subsistemas.
//!
//! ## Analogia: Seminário de Filosofia
//!
//! Primeiro se identifica **do que** a pergunta fala (extração), depois se
//! lembra **como** esses temas costumam se encadear (LCM), escreve-se a
//! resposta (geração), o professor corrige (restrições) e, se a aula foi
//! boa, o caderno é atualizado (aprendizado).
//!
//! ## Máquina de Estados
//!
//! ```text
//! RECEIVED → EXTRACTING → REASONING → GENERATING → VALIDATING → (LEARNING) → COMPLETE
//!                                          │
//!                                          └── nada gerado → ERROR → COMPLETE (resposta padrão)
//! ```
//!
//! | Estágio | Falha | Degradação |
//! |---------|-------|------------|
//! | Extracting | estratégia falha, expira ou não acha nada | próxima da cascata; por fim palavras-chave |
//! | Reasoning | conceito sem transições | caminho trivial `[conceito]` |
//! | Generating | gerador falha, expira ou ignora as restrições | retry simplificado, depois resposta padrão |
//!
//! Nenhum erro atravessa [`ReasoningOrchestrator::ask`]: toda falha vira
//! uma resposta bem formada de baixa confiança, com as degradações listadas.
//!
//! ## Concorrência
//!
//! Cada pergunta trabalha sobre **uma** foto do conhecimento, tirada no
//! início. O aprendizado passa pelo escritor único de [`SharedKnowledge`],
//! então perguntas simultâneas nunca veem meio aprendizado.

/// Sub-módulo com tendências de desempenho e adaptação do limiar de aprendizado.
pub mod adaptation;

/// Sub-módulo com o registro de colaboradores disponíveis.
pub mod capabilities;

/// Sub-módulo com a construção do prompt e das restrições de geração.
pub mod prompt;

/// Sub-módulo com [`Response`], eventos, resumo e explicação.
pub mod response;

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::broadcast;
use tokio::time::timeout;
use uuid::Uuid;

use crate::config::OrchestratorConfig;
use crate::constraints::{ConstraintManager, ValidationContext, ValidationReport};
use crate::error::{Result, SophiaError};
use crate::knowledge::{KnowledgeState, SharedKnowledge};
use crate::lcm::ReasoningPath;
use crate::llm::{GeneratedText, GenerationRequest, TextGenerator};
use crate::nlu::ExtractionResult;

pub use adaptation::{AdaptiveLearner, Interaction, LearningInsights, QuestionType};
pub use capabilities::{Capabilities, CapabilityStatus};
pub use prompt::CANNED_RESPONSE;
pub use response::{
    ConceptAnalysis, Explanation, ExplanationStep, GenerationMode, PipelineEvent, Response, SessionSummary,
    Stage,
};

/// Capacidade do canal de eventos; assinantes lentos perdem os mais antigos.
const EVENT_CAPACITY: usize = 256;

/// Identidade e degradações de uma pergunta em andamento.
struct RequestTrace<'a> {
    id: Uuid,
    events: &'a broadcast::Sender<PipelineEvent>,
    degradations: Vec<SophiaError>,
}

impl<'a> RequestTrace<'a> {
    fn new(events: &'a broadcast::Sender<PipelineEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            events,
            degradations: Vec::new(),
        }
    }

    fn enter(&self, stage: Stage) {
        tracing::debug!(request = %self.id, stage = ?stage, "Pipeline: estágio");
        // Sem assinantes o envio falha, e tudo bem.
        let _ = self.events.send(PipelineEvent::StageEntered {
            request_id: self.id,
            stage,
        });
    }

    fn degrade(&mut self, error: SophiaError) {
        tracing::warn!(request = %self.id, error = %error, "Pipeline: degradação");
        let _ = self.events.send(PipelineEvent::Degraded {
            request_id: self.id,
            error: error.clone(),
        });
        self.degradations.push(error);
    }
}

/// Coordena extração, raciocínio, geração, validação e aprendizado.
pub struct ReasoningOrchestrator {
    knowledge: SharedKnowledge,
    capabilities: Capabilities,
    constraints: ConstraintManager,
    config: OrchestratorConfig,
    /// Só é travado durante o raciocínio (síncrono).
    rng: Mutex<StdRng>,
    /// Mais antigas saem primeiro quando a capacidade é atingida.
    history: Mutex<VecDeque<Arc<Response>>>,
    /// Dono do limiar de confiança do portão de aprendizado.
    learner: Mutex<AdaptiveLearner>,
    events: broadcast::Sender<PipelineEvent>,
}

impl ReasoningOrchestrator {
    pub fn new(knowledge: SharedKnowledge, capabilities: Capabilities, config: OrchestratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        tracing::info!(
            extractors = ?capabilities.status().extractors,
            generator = ?capabilities.status().generator,
            seeded = config.seed.is_some(),
            "Orquestrador pronto"
        );
        Self {
            knowledge,
            capabilities,
            constraints: ConstraintManager::new(),
            history: Mutex::new(VecDeque::new()),
            learner: Mutex::new(AdaptiveLearner::new(&config)),
            config,
            rng: Mutex::new(rng),
            events,
        }
    }

    // ─── Pipeline ────────────────────────────────────────────────────

    /// Responde a uma pergunta. Nunca falha.
    pub async fn ask(&self, question: &str, context: Option<&str>) -> Arc<Response> {
        let started = Instant::now();
        let mut trace = RequestTrace::new(&self.events);
        trace.enter(Stage::Received);
        let question_type = QuestionType::classify(question);
        tracing::info!(
            request = %trace.id,
            question = %question,
            question_type = question_type.as_str(),
            "Pergunta recebida"
        );

        let snapshot = self.knowledge.snapshot();
        let vocabulary = snapshot.vocabulary();

        trace.enter(Stage::Extracting);
        let extraction = self.extract(question, &vocabulary, &mut trace).await;
        tracing::debug!(
            request = %trace.id,
            strategy = %extraction.strategy,
            concepts = ?extraction.concepts,
            confidence = extraction.confidence,
            "Extração concluída"
        );

        trace.enter(Stage::Reasoning);
        let (reasoning_paths, reasoning_confidence) = self.reason(&snapshot, &extraction.concepts, &mut trace);
        let analysis = ConceptAnalysis {
            extraction_strategy: extraction.strategy,
            concepts: extraction.concepts,
            confidence: extraction.confidence,
            implied_relations: extraction.implied_relations,
            reasoning_paths,
            reasoning_confidence,
            reasoning_hints: extraction.reasoning_hints,
        };

        trace.enter(Stage::Generating);
        let (text, mode) = self.generate(question, context, &analysis, &mut trace).await;

        let validation = if mode == GenerationMode::Canned {
            trace.enter(Stage::Error);
            ValidationReport::empty()
        } else {
            trace.enter(Stage::Validating);
            let ctx = ValidationContext::new(
                question,
                &analysis.concepts,
                &analysis.implied_relations,
                &snapshot.ontology,
            );
            self.constraints.validate(&text, &ctx)
        };

        let learning = if self.should_learn(mode, &analysis, &validation) {
            trace.enter(Stage::Learning);
            let outcome = self
                .knowledge
                .learn(&analysis.concepts, &analysis.implied_relations, context);
            let _ = self.events.send(PipelineEvent::LearningApplied {
                request_id: trace.id,
                outcome: outcome.clone(),
            });
            Some(outcome)
        } else {
            None
        };

        let confidence = match mode {
            GenerationMode::Canned => 0.0,
            _ => (0.6 * analysis.confidence + 0.4 * validation.global_score).clamp(0.0, 1.0),
        };

        trace.enter(Stage::Complete);
        let duration_ms = started.elapsed().as_millis() as u64;
        let response = Arc::new(Response {
            id: trace.id,
            question: question.to_string(),
            context: context.map(str::to_string),
            question_type,
            text,
            analysis,
            confidence,
            validation,
            generation_mode: mode,
            degradations: trace.degradations,
            learning_triggered: learning.is_some(),
            learning,
            timestamp: Utc::now(),
            duration_ms,
        });

        let _ = self.events.send(PipelineEvent::Completed {
            request_id: response.id,
            confidence,
            mode,
            duration_ms,
        });
        tracing::info!(
            request = %response.id,
            confidence = confidence,
            mode = mode.as_str(),
            degradations = response.degradations.len(),
            learned = response.learning_triggered,
            duration_ms,
            "Resposta concluída"
        );
        if let Some(adaptation) = self.learner.lock().observe(&Interaction::from_response(&response)) {
            tracing::debug!(request = %response.id, adaptation = ?adaptation, "Aprendiz adaptado");
        }
        self.remember(Arc::clone(&response));
        response
    }

    /// Cascata de extração: estratégias registradas, depois palavras-chave.
    async fn extract(
        &self,
        question: &str,
        vocabulary: &BTreeSet<String>,
        trace: &mut RequestTrace<'_>,
    ) -> ExtractionResult {
        for extractor in self.capabilities.extractors() {
            let name = extractor.name();
            let failure = match timeout(self.config.extraction_timeout(), extractor.extract(question, vocabulary)).await
            {
                Ok(Ok(result)) => {
                    let result = result.validated(vocabulary);
                    if !result.is_empty() {
                        return result;
                    }
                    SophiaError::ExtractionDegraded(format!("{name}: nenhum conceito reconhecido"))
                }
                Ok(Err(e @ SophiaError::ExtractionDegraded(_))) => e,
                Ok(Err(e)) => SophiaError::ExtractionDegraded(format!("{name}: {e}")),
                Err(_) => SophiaError::ExtractionDegraded(format!("{name}: tempo esgotado")),
            };
            trace.degrade(failure);
        }
        self.capabilities
            .fallback()
            .analyze(question, vocabulary)
            .validated(vocabulary)
    }

    /// Um caminho por conceito, até `max_reasoning_concepts`.
    fn reason(
        &self,
        state: &KnowledgeState,
        concepts: &[String],
        trace: &mut RequestTrace<'_>,
    ) -> (Vec<ReasoningPath>, f64) {
        let mut rng = self.rng.lock();
        let mut paths = Vec::new();
        for concept in concepts.iter().take(self.config.max_reasoning_concepts) {
            if state.model.successors(concept).is_empty() {
                trace.degrade(SophiaError::ReasoningEmpty(concept.clone()));
                paths.push(ReasoningPath::trivial(concept.clone()));
                continue;
            }
            match state.model.generate_sequence(
                &state.ontology,
                concept,
                self.config.path_length,
                self.config.reasoning_temperature,
                &mut *rng,
            ) {
                Ok(path) => paths.push(path),
                Err(e) => {
                    tracing::debug!(concept = %concept, error = %e, "Raciocínio: caminho trivial");
                    trace.degrade(SophiaError::ReasoningEmpty(concept.clone()));
                    paths.push(ReasoningPath::trivial(concept.clone()));
                }
            }
        }

        let probabilities: Vec<f64> = paths
            .iter()
            .filter(|p| !p.is_trivial())
            .map(|p| p.probability)
            .collect();
        let confidence = if probabilities.is_empty() {
            0.0
        } else {
            probabilities.iter().sum::<f64>() / probabilities.len() as f64
        };
        (paths, confidence)
    }

    /// Com restrições → simplificado → resposta padrão.
    async fn generate(
        &self,
        question: &str,
        context: Option<&str>,
        analysis: &ConceptAnalysis,
        trace: &mut RequestTrace<'_>,
    ) -> (String, GenerationMode) {
        let Some(generator) = self.capabilities.generator() else {
            trace.degrade(SophiaError::GenerationUnavailable("nenhum gerador configurado".into()));
            return (CANNED_RESPONSE.to_string(), GenerationMode::Canned);
        };

        let constrained = GenerationRequest::constrained(
            prompt::enriched_prompt(question, context, analysis),
            prompt::constraints_for(analysis, &self.config),
            self.config.generation_temperature,
        );
        match self.call_generator(generator.as_ref(), &constrained).await {
            Ok(generated) if generated.constraints_satisfied == Some(false) => {
                trace.degrade(SophiaError::GenerationUnavailable(format!(
                    "{}: restrições não satisfeitas após {} tentativa(s)",
                    generator.name(),
                    generated.attempts
                )));
            }
            Ok(generated) => return (generated.text, GenerationMode::Constrained),
            Err(e) => trace.degrade(e),
        }

        let simplified = GenerationRequest::simplified(
            prompt::simplified_prompt(question, context),
            self.config.generation_temperature,
            self.config.max_tokens,
        );
        match self.call_generator(generator.as_ref(), &simplified).await {
            Ok(generated) => (generated.text, GenerationMode::Simplified),
            Err(e) => {
                trace.degrade(e);
                tracing::error!(request = %trace.id, "Geração: nenhuma tentativa deu certo, resposta padrão");
                (CANNED_RESPONSE.to_string(), GenerationMode::Canned)
            }
        }
    }

    async fn call_generator(&self, generator: &dyn TextGenerator, request: &GenerationRequest) -> Result<GeneratedText> {
        let name = generator.name();
        match timeout(self.config.generation_timeout(), generator.generate(request)).await {
            Ok(Ok(generated)) if generated.text.trim().is_empty() => {
                Err(SophiaError::GenerationUnavailable(format!("{name}: texto vazio")))
            }
            Ok(Ok(generated)) => Ok(generated),
            Ok(Err(e @ SophiaError::GenerationUnavailable(_))) => Err(e),
            Ok(Err(e)) => Err(SophiaError::GenerationUnavailable(format!("{name}: {e}"))),
            Err(_) => Err(SophiaError::GenerationUnavailable(format!("{name}: tempo esgotado"))),
        }
    }

    /// Aprende só com respostas geradas, extração confiante e validação mínima.
    fn should_learn(&self, mode: GenerationMode, analysis: &ConceptAnalysis, validation: &ValidationReport) -> bool {
        mode != GenerationMode::Canned
            && analysis.confidence >= self.learning_threshold()
            && analysis.concepts.len() >= self.config.learning_min_concepts.max(1)
            && validation.global_score >= self.config.learning_validation_threshold
    }

    fn remember(&self, response: Arc<Response>) {
        let mut history = self.history.lock();
        while history.len() >= self.config.history_capacity {
            history.pop_front();
        }
        history.push_back(response);
    }

    /// Limiar de confiança de extração em vigor; começa em
    /// `learning_confidence_threshold` e pode ser recalibrado.
    pub fn learning_threshold(&self) -> f64 {
        self.learner.lock().confidence_threshold()
    }

    // ─── Sessão ──────────────────────────────────────────────────────

    pub fn summary(&self) -> SessionSummary {
        let summary = {
            let history = self.history.lock();
            SessionSummary::from_history(history.iter().map(Arc::as_ref))
        };
        SessionSummary {
            learning: self.learner.lock().insights(),
            ..summary
        }
    }

    /// Respostas da sessão, da mais antiga à mais recente.
    pub fn history(&self) -> Vec<Arc<Response>> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn find(&self, id: Uuid) -> Option<Arc<Response>> {
        self.history.lock().iter().find(|r| r.id == id).cloned()
    }

    pub fn explain(&self, response: &Response) -> Explanation {
        Explanation::of(response)
    }

    /// Novo assinante dos eventos do pipeline.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    pub fn knowledge(&self) -> &SharedKnowledge {
        &self.knowledge
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::core::{ConceptOntology, ConceptType, RelationType};
    use crate::knowledge::KnowledgeState;
    use crate::lcm::{TrainingLog, TransitionModel};
    use crate::nlu::ConceptExtractor;

    const ANSWER: &str = "Tout d'abord, la justice désigne selon Aristote une vertu \
        qui ordonne la cité. En effet, son essence tient au principe d'égalité. \
        Cependant, l'injustice s'y oppose, car elle rompt cet équilibre. \
        Néanmoins, dans une certaine mesure, la justice humaine reste relative \
        et peut-être imparfaite. Par conséquent, il convient de distinguer la \
        justice comme idéal universel de ses applications particulières. \
        Ensuite, la question de sa définition renvoie au fondement du droit. \
        Enfin, la justice apparaît comme une exigence de la raison.";

    /// Gerador de teste: texto fixo, falha, ou ignora as restrições.
    enum StubGenerator {
        Answers(&'static str),
        Offline,
        IgnoresConstraints(&'static str),
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedText> {
            let satisfied = |ok: bool| request.is_constrained().then_some(ok);
            match self {
                StubGenerator::Answers(text) => Ok(GeneratedText {
                    constraints_satisfied: satisfied(true),
                    ..GeneratedText::new(*text)
                }),
                StubGenerator::Offline => Err(SophiaError::GenerationUnavailable("offline".into())),
                StubGenerator::IgnoresConstraints(text) => Ok(GeneratedText {
                    constraints_satisfied: satisfied(false),
                    attempts: 3,
                    ..GeneratedText::new(*text)
                }),
            }
        }
    }

    struct SlowExtractor;

    #[async_trait]
    impl ConceptExtractor for SlowExtractor {
        fn name(&self) -> &str {
            "slow"
        }

        async fn extract(&self, _question: &str, _vocabulary: &BTreeSet<String>) -> Result<ExtractionResult> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(ExtractionResult::empty("slow"))
        }
    }

    fn knowledge() -> SharedKnowledge {
        let mut onto = ConceptOntology::new();
        for name in ["JUSTICE", "INJUSTICE", "BIEN", "VERTU"] {
            onto.add_concept(name, ConceptType::Moral).unwrap();
        }
        SharedKnowledge::new(KnowledgeState::new(onto, TransitionModel::new(), TrainingLog::default()))
    }

    fn orchestrator(capabilities: Capabilities) -> ReasoningOrchestrator {
        let config = OrchestratorConfig {
            seed: Some(42),
            ..OrchestratorConfig::default()
        };
        ReasoningOrchestrator::new(knowledge(), capabilities, config)
    }

    fn answering() -> Capabilities {
        Capabilities::local().with_generator(Arc::new(StubGenerator::Answers(ANSWER)))
    }

    #[tokio::test]
    async fn opposition_is_learned_from_a_good_answer() {
        let orch = orchestrator(answering());
        assert!(!orch
            .knowledge()
            .snapshot()
            .ontology
            .has_relation("JUSTICE", RelationType::Opposes, "INJUSTICE"));

        let response = orch.ask("La justice peut-elle être injuste ?", None).await;

        assert_eq!(response.analysis.concepts, vec!["JUSTICE", "INJUSTICE"]);
        assert_eq!(response.generation_mode, GenerationMode::Constrained);
        assert!(response.learning_triggered, "validação = {}", response.validation.global_score);
        let learning = response.learning.as_ref().unwrap();
        assert_eq!(learning.relations_added.len(), 1);
        assert_eq!(learning.transitions_updated, 1);
        assert!(orch
            .knowledge()
            .snapshot()
            .ontology
            .has_relation("JUSTICE", RelationType::Opposes, "INJUSTICE"));
        assert!(response.confidence > 0.5);
    }

    #[tokio::test]
    async fn small_talk_gets_a_low_confidence_answer_without_learning() {
        let orch = orchestrator(answering());
        let response = orch.ask("Salut, ça va ?", None).await;

        assert!(response.analysis.concepts.is_empty());
        assert_eq!(response.analysis.extraction_strategy, "keyword");
        assert_eq!(response.analysis.confidence, 0.0);
        assert!(response.analysis.reasoning_paths.is_empty());
        assert!(!response.learning_triggered);
        assert!(response.confidence < 0.5);
        assert!(matches!(response.degradations[0], SophiaError::ExtractionDegraded(_)));
        assert_eq!(orch.knowledge().snapshot().model.transition_count(), 0);
    }

    /// Conversa fiada contra o conjunto curado inteiro, não só um vocabulário mínimo.
    #[tokio::test]
    async fn small_talk_against_the_core_set_learns_nothing() {
        let config = OrchestratorConfig {
            seed: Some(42),
            ..OrchestratorConfig::default()
        };
        let orch = ReasoningOrchestrator::new(SharedKnowledge::new(KnowledgeState::seeded()), answering(), config);
        for question in [
            "Bonjour, il fait beau aujourd'hui",
            "Merci beaucoup, à demain !",
            "Salut, comment ça va ?",
            "Je vais bien, et toi ?",
        ] {
            let response = orch.ask(question, None).await;
            assert!(response.analysis.concepts.is_empty(), "{question} → {:?}", response.analysis.concepts);
            assert_eq!(response.analysis.confidence, 0.0);
            assert!(!response.learning_triggered, "{question}");
        }
        assert_eq!(orch.knowledge().snapshot().model.transition_count(), 0);
        assert_eq!(orch.knowledge().snapshot().training.summary.epochs, 0);
    }

    #[tokio::test]
    async fn summary_carries_learning_insights() {
        let orch = orchestrator(answering());
        let response = orch.ask("Qu'est-ce que la vertu ?", None).await;
        assert_eq!(response.question_type, QuestionType::Definition);
        orch.ask("Salut, ça va ?", None).await;

        let learning = orch.summary().learning;
        assert_eq!(learning.total_interactions, 2);
        assert_eq!(learning.confidence_threshold, 0.7);
        assert_eq!(learning.trends.unwrap().sample_size, 2);
        assert!(learning.question_types.iter().any(|t| t.question_type == QuestionType::Definition));
        assert!(!learning.recommendations.is_empty());
    }

    /// O portão consulta o limiar mantido pelo aprendiz.
    #[tokio::test]
    async fn learning_gate_reads_the_learner_threshold() {
        let config = OrchestratorConfig {
            seed: Some(42),
            learning_confidence_threshold: 0.9,
            ..OrchestratorConfig::default()
        };
        let orch = ReasoningOrchestrator::new(knowledge(), answering(), config);
        assert_eq!(orch.learning_threshold(), 0.9);
        let response = orch.ask("La justice peut-elle être injuste ?", None).await;
        // Extração léxica com 2 conceitos: 0.75 < 0.9.
        assert!(!response.learning_triggered);
    }

    #[tokio::test]
    async fn unavailable_generator_yields_canned_answer() {
        let orch = orchestrator(Capabilities::local().with_generator(Arc::new(StubGenerator::Offline)));
        let response = orch.ask("La justice peut-elle être injuste ?", None).await;

        assert_eq!(response.text, CANNED_RESPONSE);
        assert_eq!(response.generation_mode, GenerationMode::Canned);
        assert_eq!(response.confidence, 0.0);
        assert_eq!(response.validation, ValidationReport::empty());
        assert!(!response.learning_triggered);
        let generation_failures = response
            .degradations
            .iter()
            .filter(|d| matches!(d, SophiaError::GenerationUnavailable(_)))
            .count();
        assert_eq!(generation_failures, 2);
    }

    #[tokio::test]
    async fn missing_generator_yields_canned_answer() {
        let response = orchestrator(Capabilities::local()).ask("Qu'est-ce que la vertu ?", None).await;
        assert_eq!(response.generation_mode, GenerationMode::Canned);
        assert_eq!(response.analysis.concepts, vec!["VERTU"]);
    }

    #[tokio::test]
    async fn ignored_constraints_fall_back_to_simplified_prompt() {
        let caps = Capabilities::local().with_generator(Arc::new(StubGenerator::IgnoresConstraints(ANSWER)));
        let response = orchestrator(caps).ask("La justice peut-elle être injuste ?", None).await;

        assert_eq!(response.generation_mode, GenerationMode::Simplified);
        assert_eq!(response.text, ANSWER);
        assert!(response
            .degradations
            .iter()
            .any(|d| matches!(d, SophiaError::GenerationUnavailable(m) if m.contains("3 tentativa"))));
    }

    /// Extrator lento expira e a cascata continua.
    #[tokio::test(start_paused = true)]
    async fn slow_extractor_times_out_and_cascade_continues() {
        let caps = answering().with_primary_extractor(Arc::new(SlowExtractor));
        let response = orchestrator(caps).ask("La justice peut-elle être injuste ?", None).await;

        assert_eq!(response.analysis.extraction_strategy, "lexical");
        assert_eq!(
            response.degradations[0],
            SophiaError::ExtractionDegraded("slow: tempo esgotado".into())
        );
    }

    #[tokio::test]
    async fn concepts_without_transitions_get_trivial_paths() {
        let response = orchestrator(answering()).ask("La justice peut-elle être injuste ?", None).await;
        let paths = &response.analysis.reasoning_paths;
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.is_trivial()));
        assert_eq!(response.analysis.reasoning_confidence, 0.0);
        assert!(response
            .degradations
            .contains(&SophiaError::ReasoningEmpty("JUSTICE".into())));
    }

    #[tokio::test]
    async fn seeded_orchestrators_reason_identically() {
        let trained = || {
            let orch = orchestrator(answering());
            let seq = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
            orch.knowledge()
                .train(&[seq(&["JUSTICE", "BIEN", "VERTU"]), seq(&["JUSTICE", "VERTU"])], 2)
                .unwrap();
            orch
        };
        let a = trained().ask("Qu'est-ce que la justice ?", None).await;
        let b = trained().ask("Qu'est-ce que la justice ?", None).await;

        assert_eq!(a.analysis.reasoning_paths, b.analysis.reasoning_paths);
        assert!(!a.analysis.reasoning_paths[0].is_trivial());
        assert!(a.analysis.reasoning_confidence > 0.0);
    }

    #[tokio::test]
    async fn events_follow_the_stage_order() {
        let orch = orchestrator(answering());
        let mut rx = orch.subscribe();
        let response = orch.ask("La justice peut-elle être injuste ?", None).await;

        let mut stages = Vec::new();
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            if let PipelineEvent::StageEntered { request_id, stage } = &event {
                assert_eq!(*request_id, response.id);
                stages.push(*stage);
            }
            last = Some(event);
        }
        assert_eq!(
            stages,
            vec![
                Stage::Received,
                Stage::Extracting,
                Stage::Reasoning,
                Stage::Generating,
                Stage::Validating,
                Stage::Learning,
                Stage::Complete,
            ]
        );
        assert!(matches!(last, Some(PipelineEvent::Completed { .. })));
    }

    #[tokio::test]
    async fn history_is_bounded_and_summarized() {
        let config = OrchestratorConfig {
            history_capacity: 2,
            ..OrchestratorConfig::default()
        };
        let orch = ReasoningOrchestrator::new(knowledge(), answering(), config);
        let first = orch.ask("Qu'est-ce que la vertu ?", None).await;
        orch.ask("La justice peut-elle être injuste ?", None).await;
        let last = orch.ask("Qu'est-ce que la justice ?", Some("cours")).await;

        assert_eq!(orch.history().len(), 2);
        assert!(orch.find(first.id).is_none());
        assert_eq!(orch.find(last.id).unwrap().context.as_deref(), Some("cours"));

        let summary = orch.summary();
        assert_eq!(summary.total_interactions, 2);
        assert_eq!(summary.most_discussed_concepts[0], ("JUSTICE".to_string(), 2));
        assert!(orch.explain(&last).to_string().contains("JUSTICE"));
    }
}
