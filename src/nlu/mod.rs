//! # Módulo NLU: Extração de Conceitos
//!
//! Transforma a pergunta do usuário em **conceitos da ontologia** e nas
//! relações que a pergunta sugere entre eles.
//!
//! ## Analogia: Peneiras Sobrepostas
//!
//! A pergunta passa por uma série de peneiras, da mais fina para a mais
//! grossa. Se a mais fina (o LLM) entope ou não retém nada, tenta-se a
//! seguinte. A última (palavras-chave) nunca falha: no pior caso devolve
//! uma peneira vazia com confiança zero.
//!
//! ```text
//! "La justice peut-elle être injuste ?"
//!   ├── LLM (se disponível)   → JSON validado contra o vocabulário
//!   ├── LexicalExtractor      → {JUSTICE, INJUSTICE}, JUSTICE opposes INJUSTICE
//!   └── KeywordExtractor      → sempre responde
//! ```
//!
//! ## Fronteira com os Colaboradores
//!
//! Toda saída de extrator passa por [`ExtractionResult::validated`]: nomes
//! normalizados e filtrados ao vocabulário, relações só entre conceitos
//! conhecidos, confiança em `[0, 1]`. Assim o resto do pipeline nunca vê um
//! nome fora da ontologia.
//!
//! ## Sub-módulos
//!
//! | Módulo | Responsabilidade |
//! |--------|-----------------|
//! | [`extractor`] | Estratégias léxica e por palavras-chave |
//! | [`lexicon`] | Sinônimos, pistas de relação, prefixos de negação |
//! | [`text`] | Dobra de acentos e tokenização |

/// Sub-módulo com as estratégias locais de extração.
pub mod extractor;

/// Sub-módulo com o léxico francês.
pub mod lexicon;

/// Sub-módulo com a normalização de texto.
pub mod text;

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{normalize_name, Relation, RelationType};
use crate::error::Result;

pub use extractor::{KeywordExtractor, LexicalExtractor};

/// Colaborador de extração.
///
/// Uma implementação devolve `Err(ExtractionDegraded)` quando não consegue
/// ou não reconhece nada; o orquestrador então tenta a próxima.
#[async_trait]
pub trait ConceptExtractor: Send + Sync {
    /// Nome curto da estratégia (`"llm"`, `"lexical"`, `"keyword"`).
    fn name(&self) -> &str;

    async fn extract(&self, question: &str, vocabulary: &BTreeSet<String>) -> Result<ExtractionResult>;
}

/// Resultado de extração já validado contra o vocabulário.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Estratégia que produziu o resultado.
    pub strategy: String,
    /// Nomes normalizados, na ordem em que aparecem, sem repetição.
    pub concepts: Vec<String>,
    /// Confiança em `[0, 1]`.
    pub confidence: f64,
    pub implied_relations: Vec<Relation>,
    #[serde(default)]
    pub reasoning_hints: Vec<String>,
}

impl ExtractionResult {
    /// Resultado vazio com confiança zero.
    pub fn empty(strategy: &str) -> Self {
        Self {
            strategy: strategy.to_string(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Aplica as regras de fronteira: normaliza, filtra ao vocabulário,
    /// remove duplicatas e relações com extremidade desconhecida.
    pub fn validated(mut self, vocabulary: &BTreeSet<String>) -> Self {
        let mut seen = BTreeSet::new();
        self.concepts = self
            .concepts
            .iter()
            .filter_map(|raw| normalize_name(raw).ok())
            .filter(|name| vocabulary.contains(name))
            .filter(|name| seen.insert(name.clone()))
            .collect();

        let mut kept = BTreeSet::new();
        self.implied_relations = self
            .implied_relations
            .into_iter()
            .filter_map(|r| {
                let from = normalize_name(&r.from).ok()?;
                let to = normalize_name(&r.to).ok()?;
                (from != to && vocabulary.contains(&from) && vocabulary.contains(&to))
                    .then(|| Relation::new(from, r.relation_type, to))
            })
            .filter(|r| kept.insert(r.clone()))
            .collect();

        self.confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}

/// Formato cru devolvido por um extrator externo (JSON).
///
/// Campos ausentes viram vazios; relações com tipo desconhecido são
/// descartadas em [`RawExtraction::into_result`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawExtraction {
    #[serde(default, alias = "concepts_detected")]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, alias = "impliedRelations", alias = "relations_implied", alias = "relations")]
    pub implied_relations: Vec<RawRelation>,
    #[serde(default, alias = "reasoningHints")]
    pub reasoning_hints: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawRelation {
    pub from: String,
    #[serde(alias = "relationType", alias = "type")]
    pub relation: String,
    pub to: String,
}

impl RawExtraction {
    pub fn into_result(self, strategy: &str, vocabulary: &BTreeSet<String>) -> ExtractionResult {
        let implied_relations = self
            .implied_relations
            .into_iter()
            .filter_map(|r| {
                let relation_type = r.relation.parse::<RelationType>().ok()?;
                Some(Relation::new(r.from, relation_type, r.to))
            })
            .collect();
        ExtractionResult {
            strategy: strategy.to_string(),
            concepts: self.concepts,
            confidence: self.confidence.unwrap_or(0.0),
            implied_relations,
            reasoning_hints: self.reasoning_hints,
        }
        .validated(vocabulary)
    }
}
