//! # Estado da Aplicação Web
//!
//! Tudo que os handlers compartilham, montado uma vez em `main`:
//!
//! ```text
//! AppState (Clone, barato)
//!   ├── orchestrator: Arc<ReasoningOrchestrator>  ← pipeline + sessão + eventos
//!   ├── store:        Arc<SnapshotStore>          ← snapshots em disco
//!   └── keep_snapshots                            ← poda após cada gravação
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::knowledge::SharedKnowledge;
use crate::orchestrator::ReasoningOrchestrator;
use crate::persistence::SnapshotStore;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ReasoningOrchestrator>,
    pub store: Arc<SnapshotStore>,
    /// Quantos snapshots sobrevivem a cada `/session/save`.
    pub keep_snapshots: usize,
}

impl AppState {
    pub fn new(orchestrator: Arc<ReasoningOrchestrator>, store: SnapshotStore, keep_snapshots: usize) -> Self {
        Self {
            orchestrator,
            store: Arc::new(store),
            keep_snapshots,
        }
    }

    pub fn knowledge(&self) -> &SharedKnowledge {
        self.orchestrator.knowledge()
    }

    /// Grava o estado atual e poda os antigos.
    pub fn save_snapshot(&self) -> anyhow::Result<PathBuf> {
        let path = self.store.save(&self.knowledge().snapshot())?;
        self.store.prune(self.keep_snapshots)?;
        Ok(path)
    }
}
