//! # Persistência: Snapshots da Sessão
//!
//! Serializa o [`KnowledgeState`] inteiro como um documento JSON versionado
//! em `data/sessions/`.
//!
//! ## Formato
//!
//! ```text
//! snapshot_20261019_142501_337.json
//! {
//!   "version": 1,
//!   "saved_at": "...",
//!   "ontology": { "concepts": { ... } },        ← conceitos + relações
//!   "model": { "transitions": { "A->B": ... } }, ← frequências e pesos
//!   "training_log": [ ... ],
//!   "training_summary": { "epochs": ..., ... }
//! }
//! ```
//!
//! Os índices em memória (`incoming` da ontologia, `outgoing` do modelo)
//! não vão para o disco e são reconstruídos no carregamento. Frequências e
//! pesos voltam exatamente como estavam, então o aprendizado continua de
//! onde parou.
//!
//! ## Atomicidade
//!
//! A escrita vai para um arquivo temporário no mesmo diretório e depois é
//! renomeada: um crash no meio nunca deixa um snapshot pela metade.

use std::collections::VecDeque;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ConceptOntology;
use crate::knowledge::KnowledgeState;
use crate::lcm::{TrainingLog, TrainingMetrics, TrainingSummary, TransitionModel};

/// Versão do formato gravada em todo snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

const PREFIX: &str = "snapshot_";
const EXTENSION: &str = ".json";

/// Documento gravado em disco.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub ontology: ConceptOntology,
    pub model: TransitionModel,
    #[serde(default)]
    pub training_log: VecDeque<TrainingMetrics>,
    #[serde(default)]
    pub training_summary: TrainingSummary,
}

impl SessionSnapshot {
    pub fn capture(state: &KnowledgeState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            ontology: state.ontology.clone(),
            model: state.model.clone(),
            training_log: state.training.history.clone(),
            training_summary: state.training.summary.clone(),
        }
    }

    /// Reconstrói o estado em memória, índices incluídos.
    pub fn into_state(self) -> Result<KnowledgeState> {
        if self.version != SNAPSHOT_VERSION {
            bail!(
                "versão de snapshot não suportada: {} (esperada {})",
                self.version,
                SNAPSHOT_VERSION
            );
        }
        let mut ontology = self.ontology;
        ontology.rebuild_index();
        let mut model = self.model;
        model.rebuild_index();
        let training = TrainingLog {
            history: self.training_log,
            summary: self.training_summary,
        };
        Ok(KnowledgeState::new(ontology, model, training))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("snapshot com JSON inválido")
    }
}

/// Diretório de snapshots.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Grava um snapshot novo e devolve o caminho.
    pub fn save(&self, state: &KnowledgeState) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("falha ao criar {}", self.dir.display()))?;

        let snapshot = SessionSnapshot::capture(state);
        let name = format!(
            "{PREFIX}{}{EXTENSION}",
            snapshot.saved_at.format("%Y%m%d_%H%M%S_%3f")
        );
        let path = self.dir.join(&name);
        let tmp = self.dir.join(format!(".{name}.tmp"));

        let json = serde_json::to_string_pretty(&snapshot).context("falha ao serializar snapshot")?;
        let mut file = fs::File::create(&tmp).with_context(|| format!("falha ao criar {}", tmp.display()))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.sync_all())
            .with_context(|| format!("falha ao escrever {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("falha ao publicar {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            concepts = snapshot.ontology.concept_count(),
            transitions = snapshot.model.transition_count(),
            "Snapshot salvo"
        );
        Ok(path)
    }

    pub fn load(&self, path: &Path) -> Result<KnowledgeState> {
        let json = fs::read_to_string(path).with_context(|| format!("falha ao ler {}", path.display()))?;
        let state = SessionSnapshot::from_json(&json)
            .and_then(SessionSnapshot::into_state)
            .with_context(|| format!("snapshot inválido em {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            concepts = state.ontology.concept_count(),
            transitions = state.model.transition_count(),
            epochs = state.training.summary.epochs,
            "Snapshot carregado"
        );
        Ok(state)
    }

    /// Snapshot mais recente, ou `None` se o diretório está vazio ou não existe.
    pub fn load_latest(&self) -> Result<Option<KnowledgeState>> {
        match self.list()?.pop() {
            Some(path) => self.load(&path).map(Some),
            None => {
                tracing::info!(dir = %self.dir.display(), "Nenhum snapshot encontrado");
                Ok(None)
            }
        }
    }

    /// Snapshots do mais antigo ao mais recente.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir).with_context(|| format!("falha ao listar {}", self.dir.display()))? {
            let path = entry?.path();
            let is_snapshot = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(PREFIX) && n.ends_with(EXTENSION));
            if is_snapshot {
                paths.push(path);
            }
        }
        // O nome carrega o timestamp, então a ordem alfabética é a cronológica.
        paths.sort();
        Ok(paths)
    }

    /// Mantém só os `keep` mais recentes. Devolve quantos foram apagados.
    pub fn prune(&self, keep: usize) -> Result<usize> {
        let paths = self.list()?;
        let excess = paths.len().saturating_sub(keep);
        for path in &paths[..excess] {
            fs::remove_file(path).with_context(|| format!("falha ao apagar {}", path.display()))?;
        }
        if excess > 0 {
            tracing::debug!(removed = excess, keep, "Snapshots antigos apagados");
        }
        Ok(excess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConceptType, RelationType};
    use crate::knowledge::SharedKnowledge;

    fn learned_state() -> KnowledgeState {
        let mut onto = ConceptOntology::new();
        for name in ["JUSTICE", "BIEN", "VERTU"] {
            onto.add_concept(name, ConceptType::Moral).unwrap();
        }
        onto.add_relation("JUSTICE", RelationType::Implies, "BIEN").unwrap();
        let shared = SharedKnowledge::new(KnowledgeState::new(onto, TransitionModel::new(), TrainingLog::default()));
        let seq = vec!["JUSTICE".to_string(), "BIEN".to_string()];
        shared.learn(&seq, &[], None);
        shared.learn(&seq, &[], None);
        (*shared.snapshot()).clone()
    }

    #[test]
    fn reload_restores_frequencies_and_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let state = learned_state();
        store.save(&state).unwrap();

        let loaded = store.load_latest().unwrap().unwrap();
        assert_eq!(loaded.model.get("JUSTICE", "BIEN").unwrap().frequency, 2);
        assert_eq!(loaded.model.successors("JUSTICE").len(), 1);
        assert!(loaded.ontology.are_related("BIEN", "JUSTICE"));
        assert_eq!(loaded.training.summary, state.training.summary);

        // O aprendizado continua a partir das frequências restauradas.
        let shared = SharedKnowledge::new(loaded);
        shared.learn(&["JUSTICE".to_string(), "BIEN".to_string()], &[], None);
        assert_eq!(shared.snapshot().model.get("JUSTICE", "BIEN").unwrap().frequency, 3);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut snapshot = SessionSnapshot::capture(&learned_state());
        snapshot.version = 99;
        let err = snapshot.into_state().unwrap_err();
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn empty_directory_has_no_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("missing"));
        assert!(store.load_latest().unwrap().is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn prune_keeps_the_newest() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let state = learned_state();
        let mut saved = Vec::new();
        for _ in 0..3 {
            saved.push(store.save(&state).unwrap());
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(store.list().unwrap(), saved);
        assert_eq!(store.prune(1).unwrap(), 2);
        assert_eq!(store.list().unwrap(), vec![saved[2].clone()]);
        assert!(dir.path().join("notes.txt").exists());
    }
}
