//! # Regras de Validação
//!
//! Cada regra é uma **função pura** de `(texto, contexto)` que devolve um
//! score em `[0, 1]`. Nada aqui consulta a rede ou guarda cache: chamar duas
//! vezes com a mesma entrada dá o mesmo resultado.
//!
//! ## Heurísticas de Texto
//!
//! | Regra | Sinal | Score |
//! |-------|-------|-------|
//! | estrutura | conectores argumentativos | `min(n/3, 1)`, +0.2 acima de 100 palavras |
//! | profundidade | marcadores de profundidade | `min(n/5, 1)` |
//! | nuance | marcadores de nuance | `min(n/3, 1)` |
//! | tom | acadêmicos − informais | `min(a/3, 1) − 0.2·i`, ≥ 0 |
//! | clareza | tamanho médio das frases + conectores lógicos | `1 − pena + min(0.1·c, 0.3)` |
//! | tamanho | palavras vs. faixa esperada | 1 dentro da faixa |
//!
//! Texto vazio zera todas as heurísticas de texto.
//!
//! ## Regras Conceituais
//!
//! - **Coerência**: fração dos pares de conceitos ligados por um cluster
//!   filosófico ou pela ontologia
//! - **Contradição**: relações implicadas que contrariam a ontologia e
//!   afirmações de identidade no texto entre conceitos que a ontologia opõe
//! - **Pertinência**: sobreposição de palavras entre pergunta e conceito

use regex::Regex;

use super::ValidationContext;
use crate::core::{ConceptOntology, Relation};
use crate::nlu::text::{concept_tokens, count_phrases, find_phrase, fold, tokens, word_count};

// ─── Léxicos ─────────────────────────────────────────────────────────

const STRUCTURE_MARKERS: &[&str] = &[
    "tout d'abord",
    "premièrement",
    "en premier lieu",
    "ensuite",
    "deuxièmement",
    "par ailleurs",
    "enfin",
    "finalement",
    "en conclusion",
    "cependant",
    "néanmoins",
    "toutefois",
    "donc",
    "ainsi",
    "par conséquent",
];

const DEPTH_MARKERS: &[&str] = &[
    "essence",
    "nature",
    "fondement",
    "principe",
    "définition",
    "concept",
    "signification",
    "pourquoi",
    "comment",
    "dans quelle mesure",
    "dialectique",
    "paradoxe",
    "contradiction",
    "absolu",
    "relatif",
    "universel",
    "particulier",
];

const NUANCE_MARKERS: &[&str] = &[
    "cependant",
    "néanmoins",
    "toutefois",
    "pourtant",
    "en revanche",
    "d'un autre côté",
    "dans une certaine mesure",
    "peut-être",
    "il semble",
    "relatif",
    "relative",
    "complexe",
    "nuancer",
    "à condition",
];

const ACADEMIC_MARKERS: &[&str] = &[
    "selon",
    "d'après",
    "conformément à",
    "il convient de",
    "il est important de",
    "nous pouvons observer",
    "il apparaît que",
    "en effet",
    "néanmoins",
    "toutefois",
];

const INFORMAL_MARKERS: &[&str] = &[
    "bon",
    "eh bien",
    "voilà",
    "quoi",
    "franchement",
    "carrément",
    "super",
];

const LOGICAL_CONNECTORS: &[&str] = &[
    "car",
    "parce que",
    "puisque",
    "étant donné",
    "donc",
    "ainsi",
    "par conséquent",
    "c'est pourquoi",
];

/// Verbos que afirmam identidade ou consequência entre dois conceitos,
/// já dobrados.
const IDENTITY_VERBS: &str = r"(?:est|sont|implique|impliquent|equivaut a|signifie|revient a)";

/// Clusters filosóficos: conceitos do mesmo cluster contam como relacionados.
const PHILOSOPHICAL_CLUSTERS: &[(&str, &[&str])] = &[
    (
        "Épistémologie",
        &[
            "VÉRITÉ", "CONNAISSANCE", "CROYANCE", "DOUTE", "CERTITUDE", "JUSTIFICATION",
            "SAVOIR", "PERCEPTION", "ÉVIDENCE", "EXPLICATION", "INTERPRÉTATION",
            "OBJECTIVITÉ", "SUBJECTIVITÉ", "OPINION", "IGNORANCE", "FAUSSETÉ",
        ],
    ),
    (
        "Éthique",
        &[
            "BIEN", "MAL", "JUSTICE", "INJUSTICE", "VERTU", "VICE", "DEVOIR",
            "RESPONSABILITÉ", "VALEUR", "CONSCIENCE", "LIBERTÉ", "DROIT", "ALTRUISME",
            "ÉGOÏSME", "RESPECT", "BONHEUR",
        ],
    ),
    (
        "Métaphysique",
        &[
            "ÊTRE", "EXISTENCE", "ESSENCE", "TEMPS", "ESPACE", "SUBSTANCE", "IDENTITÉ",
            "CHANGEMENT", "CAUSALITÉ", "CONTINGENCE", "NÉCESSITÉ", "MONDE", "CORPS",
            "DUALISME", "MONISME", "INFINI", "FINI",
        ],
    ),
    (
        "Philosophie politique",
        &[
            "LIBERTÉ", "AUTORITÉ", "POUVOIR", "ÉGALITÉ", "SOCIÉTÉ", "ÉTAT", "LOI", "DROIT",
            "JUSTICE", "DÉMOCRATIE", "LÉGITIMITÉ", "CITOYENNETÉ", "CONTRAT_SOCIAL",
            "OBÉISSANCE", "ANARCHIE",
        ],
    ),
    (
        "Logique",
        &[
            "CAUSE", "EFFET", "NÉCESSITÉ", "POSSIBILITÉ", "CONTRADICTION", "ARGUMENT",
            "VALIDITÉ", "PRÉMISSE", "CONCLUSION", "SYLLOGISME", "PARADOXE", "DÉDUCTION",
            "INDUCTION", "INFÉRENCE", "COHÉRENCE",
        ],
    ),
    (
        "Esthétique",
        &[
            "BEAUTÉ", "ART", "HARMONIE", "JUGEMENT", "SUBLIME", "GOÛT", "SYMBOLISME",
            "STYLE", "EXPRESSION", "INTERPRÉTATION", "CRÉATIVITÉ", "LAIDEUR",
        ],
    ),
    (
        "Philosophie des sciences",
        &[
            "SCIENCE", "EXPLICATION", "THÉORIE", "MODÈLE", "OBSERVATION", "EXPÉRIENCE",
            "LOI", "HYPOTHÈSE", "VÉRIFICATION", "OBJECTIVITÉ", "CAUSALITÉ", "PROGRÈS",
        ],
    ),
    (
        "Philosophie de l'esprit",
        &[
            "CONSCIENCE", "PENSÉE", "ESPRIT", "SUBJECTIVITÉ", "QUALIA", "INTENTIONNALITÉ",
            "PERCEPTION", "SENSATION", "DUALISME", "RAISON",
        ],
    ),
    (
        "Philosophie du langage",
        &[
            "LANGAGE", "SIGNIFICATION", "RÉFÉRENCE", "COMMUNICATION", "INTERPRÉTATION",
            "SYMBOLISME", "PRAGMATIQUE", "SÉMANTIQUE", "SYNTAXE", "ÉNONCÉ", "DISCOURS",
            "VÉRITÉ",
        ],
    ),
];

/// `true` se os dois conceitos aparecem juntos em algum cluster.
pub fn share_cluster(a: &str, b: &str) -> bool {
    PHILOSOPHICAL_CLUSTERS
        .iter()
        .any(|(_, members)| members.contains(&a) && members.contains(&b))
}

/// Texto pré-processado uma vez por validação.
pub struct TextFeatures {
    pub tokens: Vec<String>,
    pub folded: String,
    pub words: usize,
}

impl TextFeatures {
    pub fn new(text: &str) -> Self {
        Self {
            tokens: tokens(text),
            folded: fold(text),
            words: word_count(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// ─── Regras conceituais ──────────────────────────────────────────────

/// Coerência entre os conceitos detectados.
pub fn conceptual_coherence(ctx: &ValidationContext<'_>) -> f64 {
    let concepts = ctx.concepts;
    if concepts.len() < 2 {
        return 0.7;
    }
    let mut related = 0usize;
    let mut pairs = 0usize;
    for (i, a) in concepts.iter().enumerate() {
        for b in &concepts[i + 1..] {
            pairs += 1;
            if share_cluster(a, b) || ctx.ontology.are_related(a, b) {
                related += 1;
            }
        }
    }
    related as f64 / pairs as f64
}

/// `1 − 0.5 × conflitos`, limitado a 0.
pub fn contradiction_avoidance(text: &TextFeatures, ctx: &ValidationContext<'_>) -> f64 {
    let conflicts = relation_conflicts(ctx.ontology, ctx.implied_relations)
        + textual_identity_conflicts(text, ctx);
    (1.0 - 0.5 * conflicts as f64).max(0.0)
}

/// Relações implicadas cuja polaridade contraria a ontologia.
pub fn relation_conflicts(ontology: &ConceptOntology, implied: &[Relation]) -> usize {
    implied
        .iter()
        .filter(|r| {
            let existing: Vec<_> = [(&r.from, &r.to), (&r.to, &r.from)]
                .into_iter()
                .filter_map(|(a, b)| ontology.get(a).map(|c| c.relations_to(b)))
                .flatten()
                .collect();
            if r.relation_type.is_affirmative() {
                existing.iter().any(|e| e.is_oppositional())
            } else if r.relation_type.is_oppositional() {
                existing.iter().any(|e| e.is_affirmative())
            } else {
                false
            }
        })
        .count()
}

/// Afirmações "X est Y" no texto entre conceitos que a ontologia opõe.
///
/// O padrão é montado a partir dos nomes; se não compilar, o par é ignorado.
pub fn textual_identity_conflicts(text: &TextFeatures, ctx: &ValidationContext<'_>) -> usize {
    if text.is_empty() {
        return 0;
    }
    let mut conflicts = 0;
    for a in ctx.concepts {
        for b in ctx.concepts {
            if a == b {
                continue;
            }
            let opposed = ctx
                .ontology
                .get(a)
                .is_some_and(|c| c.relations_to(b).iter().any(|r| r.is_oppositional()));
            if !opposed {
                continue;
            }
            let pattern = format!(
                r"\b{}\s+{}\s+(?:(?:la|le|les|l'|un|une|du|de la)\s*)?{}\b",
                regex::escape(&fold(&a.replace('_', " "))),
                IDENTITY_VERBS,
                regex::escape(&fold(&b.replace('_', " "))),
            );
            match Regex::new(&pattern) {
                Ok(re) if re.is_match(&text.folded) => {
                    tracing::debug!(a = %a, b = %b, "Validação: afirmação de identidade entre opostos");
                    conflicts += 1;
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "Validação: padrão ignorado"),
            }
        }
    }
    conflicts
}

/// Sobreposição de palavras entre pergunta e conceitos, +0.3 se o conceito
/// aparece na resposta.
pub fn concept_relevance(text: &TextFeatures, ctx: &ValidationContext<'_>) -> f64 {
    if ctx.concepts.is_empty() {
        return 0.3;
    }
    let question = tokens(ctx.question);
    let total: f64 = ctx
        .concepts
        .iter()
        .map(|concept| {
            let words = concept_tokens(concept);
            if words.is_empty() {
                return 0.0;
            }
            let overlap = words.iter().filter(|w| question.contains(w)).count();
            let mut relevance = overlap as f64 / words.len() as f64;
            if find_phrase(&text.tokens, &words).is_some() {
                relevance += 0.3;
            }
            relevance.min(1.0)
        })
        .sum();
    total / ctx.concepts.len() as f64
}

// ─── Heurísticas de texto ────────────────────────────────────────────

pub fn argumentative_structure(text: &TextFeatures) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let mut score = (count_phrases(&text.tokens, STRUCTURE_MARKERS) as f64 / 3.0).min(1.0);
    if text.words > 100 {
        score += 0.2;
    }
    score.min(1.0)
}

pub fn philosophical_depth(text: &TextFeatures) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    (count_phrases(&text.tokens, DEPTH_MARKERS) as f64 / 5.0).min(1.0)
}

pub fn nuance_presence(text: &TextFeatures) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    (count_phrases(&text.tokens, NUANCE_MARKERS) as f64 / 3.0).min(1.0)
}

pub fn academic_tone(text: &TextFeatures) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let academic = count_phrases(&text.tokens, ACADEMIC_MARKERS) as f64;
    let informal = count_phrases(&text.tokens, INFORMAL_MARKERS) as f64;
    ((academic / 3.0).min(1.0) - 0.2 * informal).max(0.0)
}

/// Frases longas penalizam; conectores lógicos bonificam.
pub fn clarity(raw: &str, text: &TextFeatures) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let sentences: Vec<usize> = raw
        .split(['.', '!', '?'])
        .map(word_count)
        .filter(|n| *n > 0)
        .collect();
    let avg = if sentences.is_empty() {
        0.0
    } else {
        sentences.iter().sum::<usize>() as f64 / sentences.len() as f64
    };
    let mut score = 1.0;
    if avg > 35.0 {
        score -= 0.5;
    } else if avg > 25.0 {
        score -= 0.3;
    }
    score += (0.1 * count_phrases(&text.tokens, LOGICAL_CONNECTORS) as f64).min(0.3);
    score.clamp(0.0, 1.0)
}

/// Faixa esperada de palavras para `concepts` conceitos.
pub fn expected_length(concepts: usize) -> (usize, usize) {
    let min = (30 * concepts).max(50);
    let max = (100 * concepts).min(500).max(2 * min);
    (min, max)
}

pub fn appropriate_length(text: &TextFeatures, concepts: usize) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let (min, max) = expected_length(concepts);
    let words = text.words;
    if words < min {
        words as f64 / min as f64
    } else if words > max {
        (max as f64 / words as f64).max(0.5)
    } else {
        1.0
    }
}
