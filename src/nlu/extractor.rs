//! # Estratégias Locais de Extração
//!
//! Duas estratégias que não dependem de rede:
//!
//! | Estratégia | Casamento | Relações | Confiança |
//! |-----------|-----------|----------|-----------|
//! | [`LexicalExtractor`] | tokens inteiros de nomes e sinônimos | pistas + antonímia por prefixo | 0.7 + 0.05/conceito extra, máx. 0.85 |
//! | [`KeywordExtractor`] | início de palavra + desinência no texto dobrado | nenhuma | 0.5 com acerto, 0.0 sem |
//!
//! A léxica falha com `ExtractionDegraded` quando não reconhece nada; a de
//! palavras-chave sempre responde e fecha a cascata.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::lexicon::{is_lexical_antonym, needs_determiner, synonyms_of, CUE_WINDOW, RELATION_CUES};
use super::text::{concept_tokens, contains_phrase, fold, tokens};
use super::{ConceptExtractor, ExtractionResult};
use crate::core::{Relation, RelationType};
use crate::error::{Result, SophiaError};

const LEXICAL_BASE_CONFIDENCE: f64 = 0.7;
const LEXICAL_STEP: f64 = 0.05;
const LEXICAL_MAX_CONFIDENCE: f64 = 0.85;
const KEYWORD_CONFIDENCE: f64 = 0.5;

/// Ocorrência de um conceito na pergunta.
#[derive(Clone, Debug)]
struct Mention {
    concept: String,
    /// Índice do primeiro token.
    start: usize,
    /// Número de tokens casados.
    len: usize,
    form: String,
}

/// Extrator por casamento de tokens, sinônimos e pistas lexicais.
#[derive(Clone, Debug, Default)]
pub struct LexicalExtractor;

impl LexicalExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Todas as menções do vocabulário em `question`, ordenadas por posição.
    fn mentions(question_tokens: &[String], vocabulary: &BTreeSet<String>) -> Vec<Mention> {
        let mut mentions = Vec::new();
        for concept in vocabulary {
            let mut forms = vec![concept_tokens(concept)];
            forms.extend(synonyms_of(concept).iter().map(|s| tokens(s)));

            for form in forms.iter().filter(|f| !f.is_empty()) {
                for start in 0..question_tokens.len().saturating_sub(form.len() - 1) {
                    if question_tokens[start..start + form.len()] != form[..] {
                        continue;
                    }
                    let previous = start.checked_sub(1).map(|i| question_tokens[i].as_str());
                    if form.len() == 1 && needs_determiner(&form[0], previous) {
                        continue;
                    }
                    mentions.push(Mention {
                        concept: concept.clone(),
                        start,
                        len: form.len(),
                        form: form.join(" "),
                    });
                }
            }
        }
        // Menções mais longas primeiro na mesma posição.
        mentions.sort_by(|a, b| a.start.cmp(&b.start).then(b.len.cmp(&a.len)));
        mentions
    }

    /// Relações sugeridas por pistas entre menções consecutivas.
    fn cue_relations(question_tokens: &[String], mentions: &[Mention]) -> Vec<Relation> {
        let mut relations = Vec::new();
        for pair in mentions.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let gap_start = a.start + a.len;
            if a.concept == b.concept || b.start < gap_start || b.start - gap_start > CUE_WINDOW {
                continue;
            }
            let between = &question_tokens[gap_start..b.start];
            let cue = RELATION_CUES
                .iter()
                .find(|(_, cues)| cues.iter().any(|cue| contains_phrase(between, cue)));
            if let Some((relation_type, _)) = cue {
                relations.push(Relation::new(a.concept.clone(), *relation_type, b.concept.clone()));
            }
        }
        relations
    }

    /// `JUSTICE`/`INJUSTICE` → `JUSTICE opposes INJUSTICE`.
    fn antonym_relations(concepts: &[String]) -> Vec<Relation> {
        let folded: Vec<String> = concepts.iter().map(|c| fold(c)).collect();
        let mut relations = Vec::new();
        for (i, positive) in folded.iter().enumerate() {
            for (j, negative) in folded.iter().enumerate() {
                if i != j && is_lexical_antonym(positive, negative) {
                    relations.push(Relation::new(
                        concepts[i].clone(),
                        RelationType::Opposes,
                        concepts[j].clone(),
                    ));
                }
            }
        }
        relations
    }

    /// Versão síncrona de [`ConceptExtractor::extract`].
    pub fn analyze(&self, question: &str, vocabulary: &BTreeSet<String>) -> Result<ExtractionResult> {
        let question_tokens = tokens(question);
        let mentions = Self::mentions(&question_tokens, vocabulary);
        if mentions.is_empty() {
            return Err(SophiaError::ExtractionDegraded(
                "nenhum conceito reconhecido pelo léxico".into(),
            ));
        }

        let mut concepts: Vec<String> = Vec::new();
        for m in &mentions {
            if !concepts.contains(&m.concept) {
                concepts.push(m.concept.clone());
            }
        }

        let mut implied_relations = Self::cue_relations(&question_tokens, &mentions);
        implied_relations.extend(Self::antonym_relations(&concepts));

        let reasoning_hints = mentions
            .iter()
            .filter(|m| fold(&m.concept.replace('_', " ")) != m.form)
            .map(|m| format!("« {} » → {}", m.form, m.concept))
            .collect();

        let confidence = (LEXICAL_BASE_CONFIDENCE + LEXICAL_STEP * (concepts.len() - 1) as f64)
            .min(LEXICAL_MAX_CONFIDENCE);

        tracing::debug!(
            concepts = concepts.len(),
            relations = implied_relations.len(),
            confidence,
            "Extração léxica"
        );

        Ok(ExtractionResult {
            strategy: self.name().to_string(),
            concepts,
            confidence,
            implied_relations,
            reasoning_hints,
        }
        .validated(vocabulary))
    }
}

#[async_trait]
impl ConceptExtractor for LexicalExtractor {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn extract(&self, question: &str, vocabulary: &BTreeSet<String>) -> Result<ExtractionResult> {
        self.analyze(question, vocabulary)
    }
}

/// Último recurso: procura o início de cada nome ou sinônimo no texto dobrado.
///
/// Depois da forma só se aceita uma desinência de flexão (`libertés`,
/// `beaux`), nunca outra palavra (`beaucoup` não é `beau`).
#[derive(Clone, Debug, Default)]
pub struct KeywordExtractor;

/// Desinências aceitas depois de uma forma casada pelo início.
const INFLECTIONS: &[&str] = &["", "s", "e", "es", "x"];

impl KeywordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Primeira posição em que `needle` começa uma palavra de `haystack`,
    /// seguida apenas de uma desinência e, se ambígua, precedida de um
    /// determinante.
    fn word_start(haystack: &str, needle: &str) -> Option<usize> {
        haystack.match_indices(needle).map(|(i, _)| i).find(|&i| {
            let before = &haystack[..i];
            if before.chars().next_back().is_some_and(char::is_alphanumeric) {
                return false;
            }
            let rest = &haystack[i + needle.len()..];
            let suffix = rest.split(|c: char| !c.is_alphanumeric()).next().unwrap_or("");
            if !INFLECTIONS.contains(&suffix) {
                return false;
            }
            let previous = before
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .next_back();
            !needs_determiner(needle, previous)
        })
    }

    /// Versão síncrona de [`ConceptExtractor::extract`]; nunca falha.
    pub fn analyze(&self, question: &str, vocabulary: &BTreeSet<String>) -> ExtractionResult {
        let folded = fold(question);
        let mut hits: Vec<(usize, String)> = Vec::new();
        for concept in vocabulary {
            let mut forms = vec![fold(&concept.replace('_', " "))];
            forms.extend(synonyms_of(concept).iter().map(|s| fold(s)));
            let position = forms
                .iter()
                .filter(|f| !f.is_empty())
                .filter_map(|f| Self::word_start(&folded, f))
                .min();
            if let Some(position) = position {
                hits.push((position, concept.clone()));
            }
        }
        hits.sort();

        let concepts: Vec<String> = hits.into_iter().map(|(_, c)| c).collect();
        let confidence = if concepts.is_empty() { 0.0 } else { KEYWORD_CONFIDENCE };
        tracing::debug!(concepts = concepts.len(), "Extração por palavras-chave");

        ExtractionResult {
            strategy: self.name().to_string(),
            concepts,
            confidence,
            implied_relations: Vec::new(),
            reasoning_hints: Vec::new(),
        }
        .validated(vocabulary)
    }
}

#[async_trait]
impl ConceptExtractor for KeywordExtractor {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn extract(&self, question: &str, vocabulary: &BTreeSet<String>) -> Result<ExtractionResult> {
        Ok(self.analyze(question, vocabulary))
    }
}
