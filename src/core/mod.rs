//! # Módulo Core: Ontologia de Conceitos Filosóficos
//!
//! Este módulo agrupa os **tipos fundamentais** do raciocínio conceitual.
//! Tudo no SophIA gira em torno destes tipos:
//!
//! - [`Concept`]: Conceito filosófico nomeado (ex: "JUSTICE", "VÉRITÉ")
//! - [`ConceptType`]: Família do conceito (moral, epistêmico, lógico, ...)
//! - [`Provenance`]: Origem: curado, aprendido ou definido pelo usuário
//! - [`RelationType`] / [`Relation`]: Aresta tipada e dirigida entre conceitos
//! - [`ConceptOntology`]: Grafo que armazena conceitos e relações
//!
//! ## Analogia com o Mundo Real
//!
//! Pense na [`ConceptOntology`] como um **mapa de uma biblioteca de filosofia**:
//! - Cada [`Concept`] é uma **estante** com nome fixo
//! - Cada [`Relation`] é uma **remissão** ("ver também", "oposto de")
//! - O seed curado é o **catálogo de fundação**; o aprendizado só acrescenta remissões
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crate::core::{ConceptOntology, RelationType};
//!
//! let onto = ConceptOntology::with_core_set();
//! let opostos = onto.related_concepts("bien", Some(RelationType::Opposes))?;
//! assert!(opostos.contains("MAL"));
//! ```

/// Sub-módulo com [`Concept`], [`ConceptType`], [`Provenance`] e a normalização de nomes.
pub mod concept;

/// Sub-módulo com [`RelationType`] e [`Relation`].
pub mod relation;

/// Sub-módulo com [`ConceptOntology`]: contêiner central.
pub mod ontology;

/// Sub-módulo com o conjunto curado de conceitos e relações.
pub mod seed;

// Re-exports para conveniência: permite usar `crate::core::Concept` diretamente.
pub use concept::{normalize_name, Concept, ConceptType, Provenance};
pub use ontology::{ConceptOntology, ConsistencyReport, OntologyMetadata, OntologyStats};
pub use relation::{Relation, RelationType};
