//! # Normalização de Texto em Francês
//!
//! Utilitários compartilhados pela extração e pela validação. Todo casamento
//! de palavras acontece sobre o texto **dobrado**:
//!
//! ```text
//! "La Justice peut-elle être INJUSTE ?"
//!   ├── NFD + remoção de diacríticos → "La Justice peut-elle etre INJUSTE ?"
//!   ├── minúsculas                   → "la justice peut-elle etre injuste ?"
//!   └── tokens                       → [la, justice, peut, elle, etre, injuste]
//! ```
//!
//! Frases-chave (`"d'après"`, `"par conséquent"`) são dobradas do mesmo jeito
//! e casadas como sequência contígua de tokens, então `"bon"` não casa dentro
//! de `"bonheur"`.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Remove diacríticos, expande ligaduras e passa para minúsculas.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'œ' | 'Œ' => out.push_str("oe"),
            'æ' | 'Æ' => out.push_str("ae"),
            // apóstrofos tipográficos
            '\u{2019}' | '\u{02BC}' => out.push('\''),
            _ => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// Tokens alfanuméricos do texto dobrado.
pub fn tokens(text: &str) -> Vec<String> {
    fold(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Forma dobrada de um nome de conceito: `LIBERTÉ_POLITIQUE` → `["liberte", "politique"]`.
pub fn concept_tokens(name: &str) -> Vec<String> {
    tokens(&name.replace('_', " "))
}

/// Posição do primeiro casamento de `needle` como sequência contígua em `haystack`.
pub fn find_phrase(haystack: &[String], needle: &[String]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// `true` se a frase (ainda não dobrada) aparece em `haystack`.
pub fn contains_phrase(haystack: &[String], phrase: &str) -> bool {
    find_phrase(haystack, &tokens(phrase)).is_some()
}

/// Quantas frases da lista aparecem pelo menos uma vez.
pub fn count_phrases(haystack: &[String], phrases: &[&str]) -> usize {
    phrases
        .iter()
        .filter(|p| contains_phrase(haystack, p))
        .count()
}

/// Número de palavras separadas por espaço.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
