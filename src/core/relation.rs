//! # Relation: Aresta Tipada Entre Conceitos
//!
//! Uma [`Relation`] é uma aresta **dirigida e tipada** `(origem, tipo, destino)`
//! entre dois conceitos da ontologia. Na ontologia ela não vive como objeto
//! próprio: é desnormalizada no mapa `relations` do conceito de origem.
//! A struct existe para atravessar fronteiras (extração, prompt, validação).
//!
//! ## Tipos de Relação ([`RelationType`])
//!
//! | Família | Tipos | Exemplo |
//! |---------|-------|---------|
//! | Lógica | `Implies`, `Contradicts`, `IsEquivalent` | CONNAISSANCE ⇒ VÉRITÉ |
//! | Ontológica | `IsA`, `PartOf`, `HasProperty` | JUSTICE é um BIEN |
//! | Causal | `Causes`, `Enables`, `Prevents` | LIBERTÉ permite RESPONSABILITÉ |
//! | Epistêmica | `Defines`, `Explains`, `Evidences` | ESSENCE define ÊTRE |
//! | Temporal | `Precedes`, `Follows` | INTENTION precede ACTION |
//! | Oposição | `Opposes`, `Complements` | BIEN se opõe a MAL |
//! | Livre | `Custom` | qualquer outra |
//!
//! ## Inversas Automáticas
//!
//! Ao inserir `A tipo B`, a ontologia também insere a inversa quando ela existe:
//!
//! ```text
//! IsA          → HasProperty (B tem A)
//! Precedes     ↔ Follows
//! Contradicts  ↔ Contradicts   (simétrica)
//! IsEquivalent ↔ IsEquivalent  (simétrica)
//! Opposes      ↔ Opposes       (simétrica)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tipo de relação entre conceitos.
///
/// Serializado em `snake_case` (`"is_a"`, `"has_property"`), o mesmo formato
/// dos snapshots. [`FromStr`] também aceita a forma em maiúsculas vinda dos
/// extratores (`"IS_A"`, `"OPPOSES"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Implies,
    Contradicts,
    IsEquivalent,
    IsA,
    PartOf,
    HasProperty,
    Causes,
    Enables,
    Prevents,
    Defines,
    Explains,
    Evidences,
    Precedes,
    Follows,
    Opposes,
    Complements,
    Custom,
}

impl RelationType {
    /// Todos os tipos, na ordem de declaração.
    pub const ALL: [RelationType; 17] = [
        RelationType::Implies,
        RelationType::Contradicts,
        RelationType::IsEquivalent,
        RelationType::IsA,
        RelationType::PartOf,
        RelationType::HasProperty,
        RelationType::Causes,
        RelationType::Enables,
        RelationType::Prevents,
        RelationType::Defines,
        RelationType::Explains,
        RelationType::Evidences,
        RelationType::Precedes,
        RelationType::Follows,
        RelationType::Opposes,
        RelationType::Complements,
        RelationType::Custom,
    ];

    /// Identificador estável em `snake_case` (mesmo do JSON).
    pub fn label(&self) -> &'static str {
        match self {
            RelationType::Implies => "implies",
            RelationType::Contradicts => "contradicts",
            RelationType::IsEquivalent => "is_equivalent",
            RelationType::IsA => "is_a",
            RelationType::PartOf => "part_of",
            RelationType::HasProperty => "has_property",
            RelationType::Causes => "causes",
            RelationType::Enables => "enables",
            RelationType::Prevents => "prevents",
            RelationType::Defines => "defines",
            RelationType::Explains => "explains",
            RelationType::Evidences => "evidences",
            RelationType::Precedes => "precedes",
            RelationType::Follows => "follows",
            RelationType::Opposes => "opposes",
            RelationType::Complements => "complements",
            RelationType::Custom => "custom",
        }
    }

    /// Relação inversa inserida automaticamente pela ontologia, se houver.
    pub fn inverse(&self) -> Option<RelationType> {
        match self {
            RelationType::IsA => Some(RelationType::HasProperty),
            RelationType::Precedes => Some(RelationType::Follows),
            RelationType::Follows => Some(RelationType::Precedes),
            RelationType::Contradicts => Some(RelationType::Contradicts),
            RelationType::IsEquivalent => Some(RelationType::IsEquivalent),
            RelationType::Opposes => Some(RelationType::Opposes),
            _ => None,
        }
    }

    /// `true` para relações que afirmam oposição ou incompatibilidade.
    pub fn is_oppositional(&self) -> bool {
        matches!(self, RelationType::Contradicts | RelationType::Opposes)
    }

    /// `true` para relações que afirmam identidade, inclusão ou consequência.
    ///
    /// Uma relação afirmativa entre dois conceitos que a ontologia opõe
    /// é tratada como contradição pela validação.
    pub fn is_affirmative(&self) -> bool {
        matches!(
            self,
            RelationType::Implies | RelationType::IsEquivalent | RelationType::IsA
        )
    }

    /// Peso de coerência usado no resumo de treino.
    ///
    /// Relações de oposição penalizam a sequência.
    pub fn coherence_weight(&self) -> f64 {
        match self {
            RelationType::Implies => 1.0,
            RelationType::IsA => 0.8,
            RelationType::Enables => 0.7,
            RelationType::Defines => 0.6,
            RelationType::Contradicts => -1.0,
            RelationType::Opposes => -0.5,
            _ => 0.3,
        }
    }

    /// Prioridade ao escolher qual relação rotula uma transição
    /// quando o par de conceitos tem mais de uma. Menor = preferida.
    pub(crate) fn priority(&self) -> u8 {
        match self {
            RelationType::Implies => 0,
            RelationType::IsA => 1,
            RelationType::Enables => 2,
            RelationType::Defines => 3,
            RelationType::Explains => 4,
            RelationType::HasProperty => 5,
            RelationType::Opposes | RelationType::Contradicts => 6,
            _ => 7,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RelationType {
    type Err = String;

    /// Aceita `"is_a"`, `"IS_A"`, `"is-a"` e `"IsA"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        RelationType::ALL
            .iter()
            .find(|r| r.label().replace('_', "") == key)
            .copied()
            .ok_or_else(|| format!("tipo de relação desconhecido: {s}"))
    }
}

/// Aresta tipada `(from, relation_type, to)` entre dois conceitos.
///
/// No JSON dos colaboradores o tipo aparece como `"relation"`
/// (aceita também `"relationType"` e `"type"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relation {
    /// Conceito de origem (nome normalizado).
    pub from: String,
    /// Tipo da relação.
    #[serde(rename = "relation", alias = "relationType", alias = "type")]
    pub relation_type: RelationType,
    /// Conceito de destino (nome normalizado).
    pub to: String,
}

impl Relation {
    pub fn new(from: impl Into<String>, relation_type: RelationType, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            relation_type,
            to: to.into(),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.relation_type, self.to)
    }
}
