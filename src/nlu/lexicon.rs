//! # Léxico Francês
//!
//! Sinônimos e formas derivadas dos conceitos mais frequentes, pistas
//! lexicais de relação e prefixos de negação.
//!
//! Todas as entradas são escritas com acento; o casamento acontece sobre a
//! forma dobrada (veja [`super::text::fold`]).

use crate::core::RelationType;

/// Formas que também denotam o conceito.
pub const SYNONYMS: &[(&str, &[&str])] = &[
    ("JUSTICE", &["juste", "équitable", "équité"]),
    ("INJUSTICE", &["injuste", "injustes", "inéquitable"]),
    ("VÉRITÉ", &["vrai", "vraie", "véracité", "véridique"]),
    ("FAUSSETÉ", &["faux", "fausse", "erroné"]),
    ("LIBERTÉ", &["libre", "libres", "affranchissement", "émancipation"]),
    ("BEAUTÉ", &["beau", "belle", "beaux"]),
    ("LAIDEUR", &["laid", "laide"]),
    ("BIEN", &["bonté"]),
    ("MAL", &["mauvais", "méchanceté"]),
    ("ÊTRE", &["étant"]),
    ("EXISTENCE", &["exister", "existe", "existant"]),
    ("CONNAISSANCE", &["connaître", "savoir"]),
    ("CONSCIENCE", &["conscient", "consciente"]),
    ("TEMPS", &["temporel", "temporalité", "durée"]),
    ("BONHEUR", &["heureux", "heureuse", "félicité"]),
    ("DEVOIR", &["obligation"]),
    ("RAISON", &["rationnel", "rationalité", "raisonnable"]),
    ("PENSÉE", &["penser", "pense"]),
    ("ART", &["artistique", "artiste", "œuvre"]),
    ("LANGAGE", &["langue", "parole"]),
    ("SCIENCE", &["scientifique"]),
    ("POUVOIR", &["puissance"]),
    ("ÉTAT", &["étatique"]),
    ("MORALE", &["moral", "éthique"]),
    ("CROYANCE", &["croire", "croyances"]),
    ("DOUTE", &["douter"]),
    ("RESPONSABILITÉ", &["responsable"]),
    ("NÉCESSITÉ", &["nécessaire"]),
    ("CONTINGENCE", &["contingent"]),
    ("ÉGALITÉ", &["égal", "égaux"]),
];

/// Formas que são também palavras gramaticais ou de conversa frequentes; só
/// contam como conceito quando precedidas de um determinante (`l'être`,
/// `le bien`, `la belle`).
pub const AMBIGUOUS_FORMS: &[&str] = &[
    "etre", "bien", "mal", "temps", "savoir", "pouvoir", "devoir", "fin", "beau", "belle", "beaux",
];

/// `true` se `form` (dobrada) é ambígua e `previous` não é um determinante.
pub fn needs_determiner(form: &str, previous: Option<&str>) -> bool {
    AMBIGUOUS_FORMS.contains(&form) && !previous.is_some_and(|p| DETERMINERS.contains(&p))
}

/// Determinantes que desambiguam as formas acima (já dobrados).
pub const DETERMINERS: &[&str] = &["l", "le", "la", "les", "un", "une", "du", "au", "ce", "son", "sa"];

/// Pistas de relação entre duas menções consecutivas.
pub const RELATION_CUES: &[(RelationType, &[&str])] = &[
    (RelationType::Contradicts, &["contredit", "contredisent", "contradictoire", "incompatible"]),
    (RelationType::Opposes, &["oppose", "opposent", "opposé", "contraire", "contre", "versus"]),
    (RelationType::Implies, &["implique", "impliquent", "entraîne", "suppose", "nécessite", "conduit à", "mène à"]),
    (RelationType::Enables, &["permet", "permettent", "rend possible"]),
    (RelationType::Causes, &["cause", "provoque", "engendre"]),
    (RelationType::Prevents, &["empêche", "interdit"]),
    (RelationType::Defines, &["définit", "caractérise", "consiste"]),
    (RelationType::IsA, &["est une forme de", "est une sorte de", "est un", "est une"]),
    (RelationType::Explains, &["explique"]),
];

/// Distância máxima, em tokens, entre duas menções para aceitar uma pista.
pub const CUE_WINDOW: usize = 8;

/// Prefixos de negação (já dobrados): `INJUSTICE` = `in` + `JUSTICE`.
pub const NEGATIVE_PREFIXES: &[&str] = &["in", "im", "ir", "il", "des", "dis", "de", "a", "non"];

/// Sinônimos cadastrados para `concept` (nome normalizado).
pub fn synonyms_of(concept: &str) -> &'static [&'static str] {
    SYNONYMS
        .iter()
        .find(|(name, _)| *name == concept)
        .map_or(&[], |(_, forms)| *forms)
}

/// `true` se `negative` é `positive` com um prefixo de negação, comparando
/// as formas dobradas.
pub fn is_lexical_antonym(positive: &str, negative: &str) -> bool {
    NEGATIVE_PREFIXES.iter().any(|prefix| {
        negative
            .strip_prefix(prefix)
            .is_some_and(|rest| rest == positive || rest.strip_prefix('-') == Some(positive))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antonymy_by_prefix() {
        assert!(is_lexical_antonym("justice", "injustice"));
        assert!(is_lexical_antonym("moral", "amoral"));
        assert!(is_lexical_antonym("etre", "non-etre"));
        assert!(!is_lexical_antonym("justice", "justice"));
        assert!(!is_lexical_antonym("verite", "injustice"));
    }

    #[test]
    fn ambiguous_forms_need_a_determiner_before_them() {
        assert!(needs_determiner("beau", Some("fait")));
        assert!(needs_determiner("bien", None));
        assert!(!needs_determiner("belle", Some("la")));
        assert!(!needs_determiner("justice", Some("fait")));
    }

    #[test]
    fn synonyms_lookup() {
        assert!(synonyms_of("INJUSTICE").contains(&"injuste"));
        assert!(synonyms_of("LICORNE").is_empty());
    }
}
