//! # Transition e ReasoningPath
//!
//! Uma [`Transition`] é a aresta ponderada `de → para` do modelo de
//! transições conceituais. O peso vem da frequência de observação,
//! suavizada por um prior:
//!
//! ```text
//! w(f) = f / (f + k)        k = força do prior (padrão 1.0)
//!
//! f = 1 → 0.50
//! f = 2 → 0.67
//! f = 3 → 0.75
//! f = 9 → 0.90
//! ```
//!
//! A função é estritamente crescente em `f` e limitada a `(0, 1)`, então
//! cada nova observação aumenta o peso sem nunca alcançar 1.
//!
//! Um [`ReasoningPath`] é o resultado de uma caminhada pelo modelo.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::RelationType;

/// Força do prior padrão na suavização de pesos.
pub const DEFAULT_PRIOR_STRENGTH: f64 = 1.0;

/// Peso suavizado para `frequency` observações.
///
/// Retorna 0.0 para frequência zero; caso contrário um valor em `(0, 1)`.
pub fn smoothed_weight(frequency: u64, prior_strength: f64) -> f64 {
    if frequency == 0 {
        return 0.0;
    }
    let f = frequency as f64;
    f / (f + prior_strength.max(f64::EPSILON))
}

/// Chave estável de uma transição no mapa do modelo: `"DE->PARA"`.
pub fn transition_key(from: &str, to: &str) -> String {
    format!("{from}->{to}")
}

/// Aresta ponderada entre dois conceitos conhecidos.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
    /// Peso em `[0, 1]`, derivado de `frequency`.
    pub weight: f64,
    /// Relação da ontologia que liga as pontas, quando existe.
    #[serde(default)]
    pub relation_type: Option<RelationType>,
    /// Marcador de contexto opcional (ex: "dialogue").
    #[serde(default)]
    pub context: Option<String>,
    /// Número de observações.
    pub frequency: u64,
    pub last_observed: DateTime<Utc>,
}

impl Transition {
    pub(crate) fn new(from: String, to: String) -> Self {
        Self {
            from,
            to,
            weight: 0.0,
            relation_type: None,
            context: None,
            frequency: 0,
            last_observed: Utc::now(),
        }
    }

    /// Registra mais uma observação e recalcula o peso.
    pub(crate) fn observe(&mut self, prior_strength: f64) {
        self.frequency += 1;
        self.weight = smoothed_weight(self.frequency, prior_strength);
        self.last_observed = Utc::now();
    }
}

/// Caminho de raciocínio: conceito inicial, sequência percorrida e probabilidade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReasoningPath {
    pub start: String,
    /// Sempre começa por `start`; tamanho 1 quando não há transições.
    pub concepts: Vec<String>,
    /// Produto dos pesos percorridos; 1.0 para o caminho trivial.
    pub probability: f64,
}

impl ReasoningPath {
    /// Caminho de um só conceito, probabilidade 1.0.
    pub fn trivial(start: String) -> Self {
        Self {
            concepts: vec![start.clone()],
            start,
            probability: 1.0,
        }
    }

    /// `true` quando o caminho não saiu do conceito inicial.
    pub fn is_trivial(&self) -> bool {
        self.concepts.len() <= 1
    }
}

impl fmt::Display for ReasoningPath {
    /// `JUSTICE → BIEN → VERTU (p=0.25)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (p={:.2})", self.concepts.join(" → "), self.probability)
    }
}
