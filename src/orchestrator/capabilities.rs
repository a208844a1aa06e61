//! # Registro de Capacidades
//!
//! Quais colaboradores opcionais estão disponíveis, decidido **uma vez** na
//! inicialização e injetado no orquestrador.
//!
//! ```text
//! Capabilities
//!   ├── extractors: [llm?, lexical]   ← ordem da cascata
//!   ├── fallback:   KeywordExtractor  ← sempre presente, nunca falha
//!   └── generator:  Option<TextGenerator>
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::llm::{OllamaClient, TextGenerator};
use crate::nlu::{ConceptExtractor, KeywordExtractor, LexicalExtractor};

/// Colaboradores disponíveis.
#[derive(Clone)]
pub struct Capabilities {
    extractors: Vec<Arc<dyn ConceptExtractor>>,
    fallback: KeywordExtractor,
    generator: Option<Arc<dyn TextGenerator>>,
}

/// Resumo serializável para `/status`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CapabilityStatus {
    pub extractors: Vec<String>,
    pub generator: Option<String>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::local()
    }
}

impl Capabilities {
    /// Sem colaboradores externos: extração léxica e por palavras-chave.
    pub fn local() -> Self {
        Self {
            extractors: vec![Arc::new(LexicalExtractor::new())],
            fallback: KeywordExtractor::new(),
            generator: None,
        }
    }

    /// Cascata vazia: só o extrator por palavras-chave.
    pub fn keyword_only() -> Self {
        Self {
            extractors: Vec::new(),
            ..Self::local()
        }
    }

    /// Local + Ollama como primeiro extrator e como gerador.
    pub fn with_ollama(client: OllamaClient) -> Self {
        let client = Arc::new(client);
        Self::local()
            .with_primary_extractor(client.clone())
            .with_generator(client)
    }

    /// Coloca `extractor` na frente da cascata.
    pub fn with_primary_extractor(mut self, extractor: Arc<dyn ConceptExtractor>) -> Self {
        self.extractors.insert(0, extractor);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Estratégias falíveis, na ordem.
    pub fn extractors(&self) -> &[Arc<dyn ConceptExtractor>] {
        &self.extractors
    }

    pub fn fallback(&self) -> &KeywordExtractor {
        &self.fallback
    }

    pub fn generator(&self) -> Option<&Arc<dyn TextGenerator>> {
        self.generator.as_ref()
    }

    pub fn status(&self) -> CapabilityStatus {
        let mut extractors: Vec<String> = self.extractors.iter().map(|e| e.name().to_string()).collect();
        extractors.push(self.fallback.name().to_string());
        CapabilityStatus {
            extractors,
            generator: self.generator.as_ref().map(|g| g.name().to_string()),
        }
    }
}
