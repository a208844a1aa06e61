//! # Configuração
//!
//! Valores padrão embutidos, sobrescritos por um arquivo TOML e depois por
//! variáveis de ambiente:
//!
//! ```text
//! Config::default()
//!   └── arquivo TOML ($SOPHIA_CONFIG, ou ./sophia.toml se existir)
//!         └── SOPHIA_ADDR, OLLAMA_HOST, SOPHIA_MODEL, SOPHIA_DATA_DIR
//! ```
//!
//! Toda seção é opcional no arquivo (`#[serde(default)]`).
//!
//! ```toml
//! [server]
//! addr = "0.0.0.0:3000"
//!
//! [ollama]
//! model = "llama3.1:latest"
//!
//! [orchestrator]
//! learning_confidence_threshold = 0.7
//! seed = 42
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Arquivo procurado quando `SOPHIA_CONFIG` não está definido.
pub const DEFAULT_CONFIG_FILE: &str = "sophia.toml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub ollama: OllamaConfig,
    pub orchestrator: OrchestratorConfig,
    pub storage: StorageConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// `false` desliga a sonda e usa só as estratégias locais.
    pub enabled: bool,
    pub host: String,
    pub model: String,
    pub request_timeout_secs: u64,
    /// Tentativas da geração com restrições.
    pub constrained_attempts: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "http://localhost:11434".into(),
            model: "llama3.1:latest".into(),
            request_timeout_secs: 120,
            constrained_attempts: 3,
        }
    }
}

impl OllamaConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub learning_confidence_threshold: f64,
    pub learning_min_concepts: usize,
    pub learning_validation_threshold: f64,
    /// Quantos conceitos detectados recebem um caminho de raciocínio.
    pub max_reasoning_concepts: usize,
    pub path_length: usize,
    pub reasoning_temperature: f64,
    pub generation_temperature: f64,
    pub max_tokens: u32,
    pub tone: String,
    pub extraction_timeout_secs: u64,
    pub generation_timeout_secs: u64,
    /// Semente fixa para caminhos reproduzíveis.
    pub seed: Option<u64>,
    pub history_capacity: usize,
    /// Recalibra `learning_confidence_threshold` a partir das tendências.
    pub adaptive_thresholds: bool,
    /// Interações na janela de tendências.
    pub trend_window: usize,
    /// Adaptação periódica a cada N interações.
    pub adaptation_interval: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            learning_confidence_threshold: 0.7,
            learning_min_concepts: 1,
            learning_validation_threshold: 0.4,
            max_reasoning_concepts: 3,
            path_length: 4,
            reasoning_temperature: 0.8,
            generation_temperature: 0.7,
            max_tokens: 2048,
            tone: "philosophique et analytique".into(),
            extraction_timeout_secs: 30,
            generation_timeout_secs: 180,
            seed: None,
            history_capacity: 200,
            adaptive_thresholds: true,
            trend_window: 50,
            adaptation_interval: 50,
        }
    }
}

impl OrchestratorConfig {
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Snapshots mantidos após cada gravação.
    pub keep_snapshots: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/sessions"),
            keep_snapshots: 10,
        }
    }
}

impl Config {
    /// Carrega a configuração do processo: arquivo + ambiente.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var("SOPHIA_CONFIG").ok().map(PathBuf::from);
        let mut config = match &explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("falha ao ler configuração {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("configuração inválida em {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("TOML inválido")
    }

    /// Aplica variáveis de ambiente; `lookup` é `std::env::var` fora dos testes.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("SOPHIA_ADDR") {
            self.server.addr = addr;
        }
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Some(model) = lookup("SOPHIA_MODEL") {
            self.ollama.model = model;
        }
        if let Some(dir) = lookup("SOPHIA_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let o = &self.orchestrator;
        for (name, value) in [
            ("learning_confidence_threshold", o.learning_confidence_threshold),
            ("learning_validation_threshold", o.learning_validation_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} deve estar em [0, 1], recebido {value}");
            }
        }
        if o.path_length == 0 {
            bail!("path_length deve ser pelo menos 1");
        }
        if o.reasoning_temperature < 0.0 || o.generation_temperature < 0.0 {
            bail!("temperaturas não podem ser negativas");
        }
        if o.history_capacity == 0 {
            bail!("history_capacity deve ser pelo menos 1");
        }
        if o.trend_window < 20 {
            bail!("trend_window deve ser pelo menos 20, recebido {}", o.trend_window);
        }
        if o.adaptation_interval == 0 {
            bail!("adaptation_interval deve ser pelo menos 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [ollama]
            model = "mistral"

            [orchestrator]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.ollama.model, "mistral");
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.orchestrator.seed, Some(7));
        assert_eq!(config.orchestrator.max_reasoning_concepts, 3);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn environment_overrides_file() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "SOPHIA_MODEL" => Some("phi3".into()),
            "SOPHIA_DATA_DIR" => Some("/tmp/sophia".into()),
            _ => None,
        });
        assert_eq!(config.ollama.model, "phi3");
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/sophia"));
        assert_eq!(config.server.addr, "0.0.0.0:3000");
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let config = Config::from_toml("[orchestrator]\nlearning_confidence_threshold = 1.5\n").unwrap();
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn adaptation_settings_are_read_and_checked() {
        let config = Config::from_toml("[orchestrator]\nadaptive_thresholds = false\nadaptation_interval = 30\n").unwrap();
        assert!(!config.orchestrator.adaptive_thresholds);
        assert_eq!(config.orchestrator.adaptation_interval, 30);
        assert_eq!(config.orchestrator.trend_window, 50);

        let short = Config::from_toml("[orchestrator]\ntrend_window = 5\n").unwrap();
        assert!(short.validate().is_err());
    }
}
