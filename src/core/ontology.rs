//! # ConceptOntology: Grafo Tipado de Conceitos Filosóficos
//!
//! A [`ConceptOntology`] armazena todos os conceitos em memória, indexados
//! pelo nome normalizado, com as relações desnormalizadas no conceito de
//! origem. É a fonte de verdade para o vocabulário da extração, para os
//! nomes aceitos pelo modelo de transições e para a validação.
//!
//! ## Armazenamento
//!
//! - **Conceitos**: `BTreeMap<String, Concept>`, ordenado por nome
//! - **Índice reverso**: `BTreeMap<String, BTreeSet<String>>`, "quem aponta para este conceito?"
//!
//! O índice reverso **não é serializado** (`#[serde(skip)]`). Após
//! desserialização, deve ser reconstruído via
//! [`rebuild_index()`](ConceptOntology::rebuild_index).
//!
//! ## Guarda de Consistência
//!
//! `add_relation` recusa, sem alterar o estado:
//!
//! | Caso | Motivo |
//! |------|--------|
//! | `X opposes X`, `X contradicts X` | um conceito não se opõe a si mesmo |
//! | `A implies B` com `A contradicts B` | implicação e contradição no mesmo par |
//!
//! Relações nunca são removidas. Só crescem, pelo seed ou pelo aprendizado.
//!
//! ## Exemplo
//!
//! ```rust
//! let mut onto = ConceptOntology::new();
//! onto.add_concept("justice", ConceptType::Moral)?;
//! onto.add_concept("injustice", ConceptType::Moral)?;
//! onto.add_relation("JUSTICE", RelationType::Opposes, "INJUSTICE")?;
//! assert!(onto.has_relation("INJUSTICE", RelationType::Opposes, "JUSTICE"));
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::concept::{normalize_name, Concept, ConceptType, Provenance};
use super::relation::{Relation, RelationType};
use crate::error::{Result, SophiaError};

/// Versão do formato da ontologia gravada nos snapshots.
pub const ONTOLOGY_VERSION: &str = "1.0";

/// Metadados da ontologia.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OntologyMetadata {
    pub version: String,
    pub created_at: DateTime<Utc>,
    /// Atualizado a cada conceito ou relação nova.
    pub last_modified: DateTime<Utc>,
}

impl Default for OntologyMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            version: ONTOLOGY_VERSION.to_string(),
            created_at: now,
            last_modified: now,
        }
    }
}

/// Ontologia in-memory: contêiner de [Concept]s e das relações entre eles.
///
/// No servidor ela vive dentro de um
/// [`KnowledgeState`](crate::knowledge::KnowledgeState), compartilhada em
/// modo leitor-único-escritor.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConceptOntology {
    /// Mapa de conceitos: nome normalizado → Conceito.
    pub concepts: BTreeMap<String, Concept>,

    #[serde(default)]
    pub metadata: OntologyMetadata,

    /// Índice reverso: destino → conceitos que têm alguma relação com ele.
    ///
    /// **Não serializado**, reconstruído em memória após load.
    #[serde(skip, default)]
    incoming: BTreeMap<String, BTreeSet<String>>,
}

/// Resultado de [`ConceptOntology::validate_consistency`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConsistencyReport {
    /// Pares com `implies` e `contradicts` ao mesmo tempo.
    pub contradictions: Vec<Relation>,
    /// Relações cujo destino não existe.
    pub dangling: Vec<Relation>,
    /// Conceitos sem nenhuma relação, de entrada ou de saída.
    pub orphans: Vec<String>,
    pub is_consistent: bool,
}

/// Estatísticas para observabilidade.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OntologyStats {
    pub concept_count: usize,
    pub relation_count: usize,
    pub by_type: BTreeMap<ConceptType, usize>,
    pub by_provenance: BTreeMap<Provenance, usize>,
    pub by_relation: BTreeMap<RelationType, usize>,
    /// Top 10 por número de relações de saída.
    pub most_connected: Vec<(String, usize)>,
}

impl ConceptOntology {
    /// Cria uma ontologia vazia. Para o conjunto curado, use
    /// [`with_core_set()`](ConceptOntology::with_core_set).
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstrói o índice reverso `incoming` a partir das relações.
    ///
    /// **Deve ser chamado após desserialização.**
    pub fn rebuild_index(&mut self) {
        self.incoming.clear();
        for concept in self.concepts.values() {
            for target in concept.relations.values().flatten() {
                self.incoming
                    .entry(target.clone())
                    .or_default()
                    .insert(concept.name.clone());
            }
        }
    }

    // ─── Escrita ─────────────────────────────────────────────────────

    /// Adiciona (ou atualiza) um conceito curado. Retorna o nome normalizado.
    pub fn add_concept(&mut self, name: &str, concept_type: ConceptType) -> Result<String> {
        self.add_concept_with(name, concept_type, Provenance::Core)
    }

    /// Upsert com proveniência explícita.
    ///
    /// Um conceito existente mantém relações, peso e proveniência; só o tipo
    /// é atualizado.
    pub fn add_concept_with(
        &mut self,
        name: &str,
        concept_type: ConceptType,
        provenance: Provenance,
    ) -> Result<String> {
        let name = normalize_name(name)?;
        match self.concepts.get_mut(&name) {
            Some(existing) => {
                if existing.concept_type != concept_type {
                    existing.concept_type = concept_type;
                    existing.last_updated = Utc::now();
                }
            }
            None => {
                tracing::debug!(concept = %name, tipo = ?concept_type, "Ontologia: conceito armazenado");
                self.concepts
                    .insert(name.clone(), Concept::new(name.clone(), concept_type, provenance));
                self.metadata.last_modified = Utc::now();
            }
        }
        Ok(name)
    }

    /// Adiciona `from relation_type to` e sua inversa, quando existe.
    ///
    /// Retorna `Ok(true)` se a relação é nova e `Ok(false)` se já existia.
    ///
    /// # Erros
    ///
    /// - [`SophiaError::UnknownConcept`] se uma das pontas não existe
    /// - [`SophiaError::InconsistentRelation`] se a guarda de consistência recusa
    pub fn add_relation(
        &mut self,
        from: &str,
        relation_type: RelationType,
        to: &str,
    ) -> Result<bool> {
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;
        self.check_consistency(&from, relation_type, &to)?;

        let inserted = self.insert_edge(&from, relation_type, &to);
        if let Some(inverse) = relation_type.inverse() {
            self.insert_edge(&to, inverse, &from);
        }
        if inserted {
            tracing::debug!(from = %from, relation = %relation_type, to = %to, "Ontologia: relação armazenada");
            self.metadata.last_modified = Utc::now();
        }
        Ok(inserted)
    }

    /// Reforça o peso de aprendizado de um conceito existente.
    pub fn reinforce(&mut self, name: &str) -> Result<()> {
        let name = self.resolve(name)?;
        if let Some(concept) = self.concepts.get_mut(&name) {
            concept.reinforce();
        }
        Ok(())
    }

    fn insert_edge(&mut self, from: &str, relation_type: RelationType, to: &str) -> bool {
        let Some(concept) = self.concepts.get_mut(from) else {
            return false;
        };
        let inserted = concept.insert_relation(relation_type, to);
        if inserted {
            self.incoming
                .entry(to.to_string())
                .or_default()
                .insert(from.to_string());
        }
        inserted
    }

    fn check_consistency(&self, from: &str, relation_type: RelationType, to: &str) -> Result<()> {
        let reject = |reason: &str| {
            Err(SophiaError::InconsistentRelation {
                from: from.to_string(),
                relation: relation_type.to_string(),
                to: to.to_string(),
                reason: reason.to_string(),
            })
        };

        if from == to && relation_type.is_oppositional() {
            return reject("um conceito não pode se opor a si mesmo");
        }
        match relation_type {
            RelationType::Implies if self.has_relation(from, RelationType::Contradicts, to) => {
                reject("o par já está marcado como contraditório")
            }
            RelationType::Contradicts
                if self.has_relation(from, RelationType::Implies, to)
                    || self.has_relation(to, RelationType::Implies, from) =>
            {
                reject("o par já está ligado por implicação")
            }
            _ => Ok(()),
        }
    }

    /// Normaliza e exige que o conceito exista.
    fn resolve(&self, name: &str) -> Result<String> {
        let name = normalize_name(name)?;
        if self.concepts.contains_key(&name) {
            Ok(name)
        } else {
            Err(SophiaError::UnknownConcept(name))
        }
    }

    // ─── Leitura ─────────────────────────────────────────────────────

    /// Conceitos relacionados a `name`, opcionalmente filtrados por tipo.
    pub fn related_concepts(
        &self,
        name: &str,
        relation_type: Option<RelationType>,
    ) -> Result<BTreeSet<String>> {
        let name = self.resolve(name)?;
        Ok(self
            .concepts
            .get(&name)
            .map(|c| c.related(relation_type))
            .unwrap_or_default())
    }

    /// Vocabulário completo (nomes normalizados).
    pub fn all_concepts(&self) -> BTreeSet<String> {
        self.concepts.keys().cloned().collect()
    }

    /// Busca por nome; aceita qualquer grafia que normalize para a chave.
    pub fn get(&self, name: &str) -> Option<&Concept> {
        let name = normalize_name(name).ok()?;
        self.concepts.get(&name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn has_relation(&self, from: &str, relation_type: RelationType, to: &str) -> bool {
        match (self.get(from), normalize_name(to)) {
            (Some(concept), Ok(to)) => concept.has_relation(relation_type, &to),
            _ => false,
        }
    }

    /// `true` se existe qualquer relação entre `a` e `b`, em qualquer direção.
    pub fn are_related(&self, a: &str, b: &str) -> bool {
        self.relation_between(a, b).is_some() || self.relation_between(b, a).is_some()
    }

    /// Relação preferida de `from` para `to`, se houver.
    ///
    /// Quando o par tem várias, escolhe a de maior prioridade
    /// (implies > is_a > enables > defines > ...).
    pub fn relation_between(&self, from: &str, to: &str) -> Option<RelationType> {
        let concept = self.get(from)?;
        let to = normalize_name(to).ok()?;
        concept
            .relations_to(&to)
            .into_iter()
            .min_by_key(RelationType::priority)
    }

    /// Conceitos que têm alguma relação apontando para `name`.
    pub fn sources_of(&self, name: &str) -> BTreeSet<String> {
        normalize_name(name)
            .ok()
            .and_then(|n| self.incoming.get(&n).cloned())
            .unwrap_or_default()
    }

    pub fn concepts_by_type(&self, concept_type: ConceptType) -> Vec<&Concept> {
        self.concepts
            .values()
            .filter(|c| c.concept_type == concept_type)
            .collect()
    }

    /// Todas as relações como triplas, em ordem determinística.
    pub fn relations(&self) -> impl Iterator<Item = Relation> + '_ {
        self.concepts.values().flat_map(|c| {
            c.relations.iter().flat_map(move |(rel, targets)| {
                targets
                    .iter()
                    .map(move |t| Relation::new(c.name.clone(), *rel, t.clone()))
            })
        })
    }

    /// Caminho mais curto (BFS) de `from` até `to` seguindo relações de
    /// saída de qualquer tipo, com no máximo `max_depth` arestas.
    ///
    /// `Ok(None)` quando não há caminho dentro do limite.
    pub fn find_path(&self, from: &str, to: &str, max_depth: usize) -> Result<Option<Vec<String>>> {
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;
        if from == to {
            return Ok(Some(vec![from]));
        }

        let mut queue = VecDeque::from([vec![from.clone()]]);
        let mut visited = BTreeSet::from([from]);
        while let Some(path) = queue.pop_front() {
            if path.len() > max_depth {
                continue;
            }
            let Some(last) = path.last().and_then(|n| self.concepts.get(n)) else {
                continue;
            };
            for next in last.related(None) {
                if !visited.insert(next.clone()) {
                    continue;
                }
                let mut extended = path.clone();
                extended.push(next.clone());
                if next == to {
                    return Ok(Some(extended));
                }
                queue.push_back(extended);
            }
        }
        Ok(None)
    }

    /// Verificação de integridade: contradições, destinos pendentes e órfãos.
    pub fn validate_consistency(&self) -> ConsistencyReport {
        let mut report = ConsistencyReport::default();
        for relation in self.relations() {
            if !self.concepts.contains_key(&relation.to) {
                report.dangling.push(relation.clone());
            }
            if relation.relation_type == RelationType::Implies
                && self.has_relation(&relation.from, RelationType::Contradicts, &relation.to)
            {
                report.contradictions.push(relation);
            }
        }
        report.orphans = self
            .concepts
            .values()
            .filter(|c| c.degree() == 0 && !self.incoming.contains_key(&c.name))
            .map(|c| c.name.clone())
            .collect();
        report.is_consistent = report.contradictions.is_empty() && report.dangling.is_empty();
        report
    }

    pub fn stats(&self) -> OntologyStats {
        let mut stats = OntologyStats {
            concept_count: self.concept_count(),
            relation_count: self.relation_count(),
            ..Default::default()
        };
        for concept in self.concepts.values() {
            *stats.by_type.entry(concept.concept_type).or_default() += 1;
            *stats.by_provenance.entry(concept.provenance).or_default() += 1;
            for (rel, targets) in &concept.relations {
                *stats.by_relation.entry(*rel).or_default() += targets.len();
            }
        }
        let mut connected: Vec<(String, usize)> = self
            .concepts
            .values()
            .map(|c| (c.name.clone(), c.degree()))
            .filter(|(_, degree)| *degree > 0)
            .collect();
        connected.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        connected.truncate(10);
        stats.most_connected = connected;
        stats
    }

    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// Número de arestas armazenadas (inversas incluídas).
    pub fn relation_count(&self) -> usize {
        self.concepts.values().map(Concept::degree).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moral_ontology() -> ConceptOntology {
        let mut onto = ConceptOntology::new();
        for name in ["JUSTICE", "INJUSTICE", "BIEN", "MAL", "VERTU"] {
            onto.add_concept(name, ConceptType::Moral).unwrap();
        }
        onto
    }

    #[test]
    fn add_concept_normalizes_and_upserts() {
        let mut onto = ConceptOntology::new();
        let name = onto.add_concept(" liberté ", ConceptType::Value).unwrap();
        assert_eq!(name, "LIBERTÉ");
        onto.add_concept("BIEN", ConceptType::Moral).unwrap();
        onto.add_relation("LIBERTÉ", RelationType::Enables, "BIEN").unwrap();

        onto.add_concept("Liberté", ConceptType::Political).unwrap();
        let concept = onto.get("liberté").unwrap();
        assert_eq!(concept.concept_type, ConceptType::Political);
        assert!(concept.has_relation(RelationType::Enables, "BIEN"));
        assert_eq!(onto.concept_count(), 2);
    }

    #[test]
    fn add_relation_requires_known_endpoints() {
        let mut onto = moral_ontology();
        let err = onto
            .add_relation("JUSTICE", RelationType::Implies, "LICORNE")
            .unwrap_err();
        assert_eq!(err, SophiaError::UnknownConcept("LICORNE".into()));
        assert_eq!(onto.relation_count(), 0);
    }

    /// Relação repetida é no-op e reporta `false`
    #[test]
    fn add_relation_is_idempotent() {
        let mut onto = moral_ontology();
        assert!(onto.add_relation("JUSTICE", RelationType::IsA, "BIEN").unwrap());
        assert!(!onto.add_relation("JUSTICE", RelationType::IsA, "BIEN").unwrap());
        // is_a + has_property inversa
        assert_eq!(onto.relation_count(), 2);
    }

    #[test]
    fn symmetric_relations_get_inverse() {
        let mut onto = moral_ontology();
        onto.add_relation("justice", RelationType::Opposes, "injustice").unwrap();
        assert!(onto.has_relation("INJUSTICE", RelationType::Opposes, "JUSTICE"));
        assert!(onto.are_related("INJUSTICE", "JUSTICE"));
        assert_eq!(onto.sources_of("JUSTICE"), BTreeSet::from(["INJUSTICE".to_string()]));
    }

    #[test]
    fn self_opposition_is_rejected() {
        let mut onto = moral_ontology();
        let err = onto
            .add_relation("BIEN", RelationType::Opposes, "BIEN")
            .unwrap_err();
        assert!(matches!(err, SophiaError::InconsistentRelation { .. }));
        assert_eq!(onto.relation_count(), 0);
    }

    #[test]
    fn implies_and_contradicts_cannot_coexist() {
        let mut onto = moral_ontology();
        onto.add_relation("BIEN", RelationType::Contradicts, "MAL").unwrap();
        assert!(onto.add_relation("BIEN", RelationType::Implies, "MAL").is_err());
        assert!(onto.add_relation("MAL", RelationType::Implies, "BIEN").is_err());

        onto.add_relation("VERTU", RelationType::Implies, "BIEN").unwrap();
        assert!(onto.add_relation("BIEN", RelationType::Contradicts, "VERTU").is_err());
        assert!(onto.validate_consistency().is_consistent);
    }

    #[test]
    fn related_concepts_filters_by_type() {
        let mut onto = moral_ontology();
        onto.add_relation("JUSTICE", RelationType::IsA, "BIEN").unwrap();
        onto.add_relation("JUSTICE", RelationType::Opposes, "INJUSTICE").unwrap();

        let all = onto.related_concepts("JUSTICE", None).unwrap();
        assert_eq!(all.len(), 2);
        let opp = onto
            .related_concepts("JUSTICE", Some(RelationType::Opposes))
            .unwrap();
        assert_eq!(opp, BTreeSet::from(["INJUSTICE".to_string()]));
        assert!(onto.related_concepts("LICORNE", None).is_err());
    }

    /// Integridade referencial: todo destino é um conceito conhecido
    #[test]
    fn every_target_is_a_known_concept() {
        let onto = ConceptOntology::with_core_set();
        for relation in onto.relations() {
            assert!(onto.contains(&relation.to), "destino pendente: {relation}");
        }
        assert!(onto.validate_consistency().dangling.is_empty());
    }

    #[test]
    fn relation_between_prefers_implies() {
        let mut onto = moral_ontology();
        onto.add_relation("VERTU", RelationType::Enables, "BIEN").unwrap();
        onto.add_relation("VERTU", RelationType::Implies, "BIEN").unwrap();
        assert_eq!(onto.relation_between("VERTU", "BIEN"), Some(RelationType::Implies));
        assert_eq!(onto.relation_between("BIEN", "VERTU"), None);
    }

    #[test]
    fn find_path_respects_depth() {
        let mut onto = ConceptOntology::new();
        for name in ["A", "B", "C", "D", "E"] {
            onto.add_concept(name, ConceptType::Logical).unwrap();
        }
        onto.add_relation("A", RelationType::Implies, "B").unwrap();
        onto.add_relation("B", RelationType::Implies, "C").unwrap();
        onto.add_relation("C", RelationType::Implies, "D").unwrap();
        onto.add_relation("D", RelationType::Implies, "E").unwrap();

        let path = onto.find_path("A", "D", 3).unwrap().unwrap();
        assert_eq!(path, vec!["A", "B", "C", "D"]);
        assert_eq!(onto.find_path("A", "E", 3).unwrap(), None);
        assert_eq!(onto.find_path("A", "A", 3).unwrap(), Some(vec!["A".to_string()]));
    }

    #[test]
    fn orphans_are_reported() {
        let mut onto = moral_ontology();
        onto.add_relation("JUSTICE", RelationType::Opposes, "INJUSTICE").unwrap();
        let report = onto.validate_consistency();
        assert!(report.orphans.contains(&"VERTU".to_string()));
        assert!(!report.orphans.contains(&"JUSTICE".to_string()));
    }

    /// O índice reverso some na serialização e volta com rebuild_index
    #[test]
    fn reverse_index_survives_serde_after_rebuild() {
        let mut onto = moral_ontology();
        onto.add_relation("JUSTICE", RelationType::IsA, "BIEN").unwrap();
        let json = serde_json::to_string(&onto).unwrap();

        let mut loaded: ConceptOntology = serde_json::from_str(&json).unwrap();
        assert!(loaded.sources_of("BIEN").is_empty());
        loaded.rebuild_index();
        assert_eq!(loaded.sources_of("BIEN"), BTreeSet::from(["JUSTICE".to_string()]));
        assert_eq!(loaded.relation_count(), onto.relation_count());
    }

    #[test]
    fn stats_count_types_and_connections() {
        let mut onto = moral_ontology();
        onto.add_concept_with("DOUTE", ConceptType::Epistemic, Provenance::Learned)
            .unwrap();
        onto.add_relation("JUSTICE", RelationType::Opposes, "INJUSTICE").unwrap();
        let stats = onto.stats();
        assert_eq!(stats.concept_count, 6);
        assert_eq!(stats.relation_count, 2);
        assert_eq!(stats.by_type[&ConceptType::Moral], 5);
        assert_eq!(stats.by_provenance[&Provenance::Learned], 1);
        assert_eq!(stats.most_connected[0], ("INJUSTICE".to_string(), 1));
    }
}
