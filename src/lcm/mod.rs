//! # Módulo LCM: Modelo de Transições Conceituais
//!
//! Aprende **quais conceitos costumam seguir quais** nas conversas e usa
//! esse conhecimento para propor caminhos de raciocínio.
//!
//! ## Analogia: Trilhas num Campo
//!
//! Cada vez que a conversa passa de JUSTICE para BIEN, a trilha entre os
//! dois fica um pouco mais marcada. Ao raciocinar, o sistema tende a seguir
//! as trilhas mais marcadas, mas a temperatura decide quanto se arrisca
//! pelas menos usadas.
//!
//! ```text
//! aprender [JUSTICE, BIEN, VERTU]
//!   └── JUSTICE→BIEN  f=1 w=0.50
//!   └── BIEN→VERTU    f=1 w=0.50
//!
//! gerar(JUSTICE, length=3) → JUSTICE → BIEN → VERTU (p=0.25)
//! ```
//!
//! Veja [`TransitionModel`] para o contrato completo.

/// Sub-módulo com [`TransitionModel`].
pub mod model;

/// Sub-módulo com métricas e resumo de treino.
pub mod training;

/// Sub-módulo com [`Transition`], [`ReasoningPath`] e a suavização de pesos.
pub mod transition;

pub use model::{BatchStats, ModelStats, TransitionModel};
pub use training::{TrainingLog, TrainingMetrics, TrainingSummary};
pub use transition::{smoothed_weight, ReasoningPath, Transition};
