//! # Concept: Nó da Ontologia Filosófica
//!
//! Um [`Concept`] é a unidade da ontologia: um nome único (chave), um tipo
//! ([`ConceptType`]) e o mapa de relações de saída. Os nomes seguem a
//! convenção do conjunto curado: **maiúsculas, com acentos** (`VÉRITÉ`,
//! `LIBERTÉ_POLITIQUE`).
//!
//! ## Campos Principais
//!
//! | Campo | Tipo | Descrição |
//! |-------|------|-----------|
//! | `name` | String | Chave normalizada (trim + NFC + maiúsculas) |
//! | `concept_type` | [ConceptType] | Família filosófica do conceito |
//! | `relations` | BTreeMap<RelationType, BTreeSet<String>> | Relações de saída |
//! | `learning_weight` | f64 | Peso de aprendizado em [0, 1] |
//! | `provenance` | [Provenance] | `core`, `learned` ou `user_defined` |
//!
//! Mapas ordenados (`BTreeMap`/`BTreeSet`) mantêm a serialização e a
//! validação determinísticas.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::relation::RelationType;
use crate::error::{Result, SophiaError};

/// Família filosófica de um conceito.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptType {
    /// Metafísica: ÊTRE, SUBSTANCE, TEMPS
    Entity,
    /// Qualidades e atributos: ESSENCE, NÉCESSITÉ
    Property,
    /// Relações ontológicas: CAUSALITÉ, DIFFÉRENCE
    Relation,
    /// Epistemologia: VÉRITÉ, CONNAISSANCE
    Epistemic,
    /// Lógica: ARGUMENT, PRÉMISSE
    Logical,
    /// Ética: BIEN, JUSTICE
    Moral,
    /// Valores: VERTU, LIBERTÉ
    Value,
    /// Estética: BEAUTÉ, ART
    Aesthetic,
    /// Filosofia política: ÉTAT, DÉMOCRATIE
    Political,
    /// Domínios inteiros (Métaphysique, Éthique)
    Domain,
    /// Conceito aprendido durante a conversa
    Learned,
    /// Conceito definido pelo usuário
    UserDefined,
}

impl ConceptType {
    /// Label legível em PT-BR.
    pub fn label(&self) -> &'static str {
        match self {
            ConceptType::Entity => "Entidade",
            ConceptType::Property => "Propriedade",
            ConceptType::Relation => "Relação",
            ConceptType::Epistemic => "Epistêmico",
            ConceptType::Logical => "Lógico",
            ConceptType::Moral => "Moral",
            ConceptType::Value => "Valor",
            ConceptType::Aesthetic => "Estético",
            ConceptType::Political => "Político",
            ConceptType::Domain => "Domínio",
            ConceptType::Learned => "Aprendido",
            ConceptType::UserDefined => "Definido pelo usuário",
        }
    }

    /// Pares de tipos considerados compatíveis numa transição de raciocínio
    /// (usado na métrica de coerência do treino). Simétrico.
    pub fn is_compatible_with(&self, other: ConceptType) -> bool {
        use ConceptType::*;
        let pair = |a, b| (*self == a && other == b) || (*self == b && other == a);
        pair(Entity, Property)
            || pair(Entity, Epistemic)
            || pair(Epistemic, Logical)
            || pair(Moral, Value)
    }
}

/// Origem de um conceito.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Conjunto curado semeado na criação da ontologia.
    #[default]
    Core,
    /// Criado pelo passo de aprendizado.
    Learned,
    /// Criado explicitamente por um usuário.
    UserDefined,
}

/// Normaliza um nome de conceito: trim, NFC e maiúsculas.
///
/// ```text
/// "  liberté " → "LIBERTÉ"
/// ```
pub fn normalize_name(raw: &str) -> Result<String> {
    let name: String = raw.trim().nfc().collect::<String>().to_uppercase();
    if name.is_empty() {
        return Err(SophiaError::EmptyConceptName);
    }
    Ok(name)
}

/// Conceito filosófico com suas relações de saída.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Chave única, já normalizada por [`normalize_name`].
    pub name: String,

    /// Família filosófica.
    pub concept_type: ConceptType,

    /// Domínio opcional (ex: "éthique").
    #[serde(default)]
    pub domain: Option<String>,

    /// Relações de saída: tipo → nomes de destino.
    ///
    /// Invariante: todo destino é um conceito existente na ontologia dona.
    #[serde(default)]
    pub relations: BTreeMap<RelationType, BTreeSet<String>>,

    /// Propriedades livres.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    #[serde(default)]
    pub definitions: Vec<String>,

    #[serde(default)]
    pub examples: Vec<String>,

    /// Peso de aprendizado em [0, 1]. Conceitos curados começam em 1.0,
    /// aprendidos em 0.5 e ganham peso a cada reforço.
    pub learning_weight: f64,

    /// Origem do conceito.
    #[serde(default)]
    pub provenance: Provenance,

    /// Última modificação (criação, relação nova ou reforço).
    pub last_updated: DateTime<Utc>,
}

impl Concept {
    /// Cria um conceito sem relações. O nome já deve estar normalizado.
    pub fn new(name: String, concept_type: ConceptType, provenance: Provenance) -> Self {
        let learning_weight = match provenance {
            Provenance::Core => 1.0,
            Provenance::Learned | Provenance::UserDefined => 0.5,
        };
        Self {
            name,
            concept_type,
            domain: None,
            relations: BTreeMap::new(),
            properties: BTreeMap::new(),
            definitions: Vec::new(),
            examples: Vec::new(),
            learning_weight,
            provenance,
            last_updated: Utc::now(),
        }
    }

    /// Registra `self tipo target`. Retorna `true` se a relação é nova.
    pub(crate) fn insert_relation(&mut self, relation_type: RelationType, target: &str) -> bool {
        let inserted = self
            .relations
            .entry(relation_type)
            .or_default()
            .insert(target.to_string());
        if inserted {
            self.last_updated = Utc::now();
        }
        inserted
    }

    /// Verifica se `self tipo target` existe.
    pub fn has_relation(&self, relation_type: RelationType, target: &str) -> bool {
        self.relations
            .get(&relation_type)
            .is_some_and(|targets| targets.contains(target))
    }

    /// Destinos das relações de saída, opcionalmente filtrados por tipo.
    pub fn related(&self, relation_type: Option<RelationType>) -> BTreeSet<String> {
        match relation_type {
            Some(rel) => self.relations.get(&rel).cloned().unwrap_or_default(),
            None => self.relations.values().flatten().cloned().collect(),
        }
    }

    /// Tipos de relação que ligam `self` a `target`.
    pub fn relations_to(&self, target: &str) -> Vec<RelationType> {
        self.relations
            .iter()
            .filter(|(_, targets)| targets.contains(target))
            .map(|(rel, _)| *rel)
            .collect()
    }

    /// Número de arestas de saída.
    pub fn degree(&self) -> usize {
        self.relations.values().map(BTreeSet::len).sum()
    }

    /// Reforço por aprendizado: +0.1 no peso, limitado a 1.0.
    pub fn reinforce(&mut self) {
        self.learning_weight = (self.learning_weight + 0.1).min(1.0);
        self.last_updated = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_name("  liberté ").unwrap(), "LIBERTÉ");
        assert_eq!(normalize_name("vérité").unwrap(), "VÉRITÉ");
    }

    /// "e" + acento combinante deve virar o mesmo nome que "é" pré-composto
    #[test]
    fn normalize_applies_nfc() {
        let decomposed = "verite\u{0301}";
        assert_eq!(normalize_name(decomposed).unwrap(), "VERITÉ");
    }

    #[test]
    fn normalize_rejects_blank() {
        assert_eq!(normalize_name("   "), Err(SophiaError::EmptyConceptName));
    }

    #[test]
    fn learned_concepts_start_with_half_weight() {
        let c = Concept::new("DOUTE".into(), ConceptType::Epistemic, Provenance::Learned);
        assert!((c.learning_weight - 0.5).abs() < f64::EPSILON);
        let core = Concept::new("ÊTRE".into(), ConceptType::Entity, Provenance::Core);
        assert!((core.learning_weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reinforce_is_capped() {
        let mut c = Concept::new("DOUTE".into(), ConceptType::Epistemic, Provenance::Learned);
        for _ in 0..10 {
            c.reinforce();
        }
        assert!(c.learning_weight <= 1.0);
    }

    #[test]
    fn insert_relation_reports_novelty() {
        let mut c = Concept::new("BIEN".into(), ConceptType::Moral, Provenance::Core);
        assert!(c.insert_relation(RelationType::Opposes, "MAL"));
        assert!(!c.insert_relation(RelationType::Opposes, "MAL"));
        assert!(c.has_relation(RelationType::Opposes, "MAL"));
        assert_eq!(c.relations_to("MAL"), vec![RelationType::Opposes]);
        assert_eq!(c.degree(), 1);
    }

    #[test]
    fn type_compatibility_is_symmetric() {
        assert!(ConceptType::Moral.is_compatible_with(ConceptType::Value));
        assert!(ConceptType::Value.is_compatible_with(ConceptType::Moral));
        assert!(!ConceptType::Aesthetic.is_compatible_with(ConceptType::Political));
    }
}
