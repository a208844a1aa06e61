//! # Conjunto Curado: Conceitos e Relações Fundamentais
//!
//! Vocabulário filosófico semeado em toda ontologia nova, agrupado por
//! domínio. Cada grupo vira o campo `domain` dos seus conceitos.
//!
//! | Domínio | Exemplos |
//! |---------|----------|
//! | métaphysique | ÊTRE, ESSENCE, CAUSE, TEMPS |
//! | épistémologie | VÉRITÉ, CONNAISSANCE, DOUTE |
//! | logique | ARGUMENT, SYLLOGISME, PARADOXE |
//! | éthique | BIEN, JUSTICE, LIBERTÉ |
//! | esthétique | BEAUTÉ, ART, SUBLIME |
//! | politique | ÉTAT, DÉMOCRATIE, POUVOIR |
//! | esprit | CONSCIENCE, CORPS, QUALIA |
//! | langage | SIGNIFIANT, DISCOURS |
//! | sciences | MODÈLE, OBJECTIVITÉ, PROGRÈS |
//!
//! Toda relação aqui referencia conceitos do próprio conjunto e passa pela
//! guarda de consistência da ontologia.

use super::concept::{ConceptType, Provenance};
use super::ontology::ConceptOntology;
use super::relation::RelationType;

use ConceptType::*;
use RelationType::*;

type Group = (&'static str, &'static [(&'static str, ConceptType)]);

const CORE_CONCEPTS: &[Group] = &[
    (
        "métaphysique",
        &[
            ("ÊTRE", Entity),
            ("EXISTENCE", Entity),
            ("ESSENCE", Property),
            ("SUBSTANCE", Entity),
            ("ACCIDENT", Property),
            ("NÉCESSITÉ", Property),
            ("POSSIBILITÉ", Property),
            ("ACTUALITÉ", Property),
            ("IDENTITÉ", Entity),
            ("DIFFÉRENCE", Relation),
            ("CAUSALITÉ", Relation),
            ("TEMPS", Entity),
            ("ESPACE", Entity),
            ("INFINI", Property),
            ("FINI", Property),
            ("LIMITÉ", Property),
            ("CONTINGENCE", Property),
            ("UNIVERSALITÉ", Property),
            ("PARTICULARITÉ", Property),
            ("MONDE", Entity),
            ("OBJET", Entity),
            ("SUJET", Entity),
            ("PROCESSUS", Entity),
            ("CHANGEMENT", Relation),
            ("CAUSE", Relation),
            ("EFFET", Relation),
            ("CONCEPT", Entity),
        ],
    ),
    (
        "épistémologie",
        &[
            ("VÉRITÉ", Epistemic),
            ("FAUSSETÉ", Epistemic),
            ("CONNAISSANCE", Epistemic),
            ("SAVOIR", Epistemic),
            ("IGNORANCE", Epistemic),
            ("CROYANCE", Epistemic),
            ("OPINION", Epistemic),
            ("DOUTE", Epistemic),
            ("CERTITUDE", Epistemic),
            ("ÉVIDENCE", Epistemic),
            ("RAISON", Epistemic),
            ("SENSATION", Epistemic),
            ("PERCEPTION", Epistemic),
            ("INTUITION", Epistemic),
            ("EXPLICATION", Epistemic),
            ("JUSTIFICATION", Epistemic),
            ("COMPRÉHENSION", Epistemic),
            ("RÉFLEXION", Epistemic),
            ("PROBABILITÉ", Epistemic),
        ],
    ),
    (
        "logique",
        &[
            ("ARGUMENT", Logical),
            ("PRÉMISSE", Logical),
            ("CONCLUSION", Logical),
            ("VALIDITÉ", Logical),
            ("SOLIDITÉ", Logical),
            ("CONTRADICTION", Logical),
            ("COHÉRENCE", Logical),
            ("SYLLOGISME", Logical),
            ("PARADOXE", Logical),
            ("TAUTOLOGIE", Logical),
            ("ANTINOMIE", Logical),
            ("NÉGATION", Logical),
            ("AFFIRMATION", Logical),
            ("IMPLICATION", Logical),
            ("CONJONCTION", Logical),
            ("DISJONCTION", Logical),
            ("INFÉRENCE", Logical),
            ("DÉDUCTION", Logical),
            ("INDUCTION", Logical),
            ("ABDUCTION", Logical),
        ],
    ),
    (
        "éthique",
        &[
            ("BIEN", Moral),
            ("MAL", Moral),
            ("JUSTICE", Moral),
            ("INJUSTICE", Moral),
            ("DEVOIR", Moral),
            ("DROIT", Moral),
            ("RESPONSABILITÉ", Moral),
            ("LOI", Moral),
            ("SANCTION", Moral),
            ("PUNITION", Moral),
            ("RÉCOMPENSE", Moral),
            ("TRANSGRESSION", Moral),
            ("ACTION", Moral),
            ("VERTU", Value),
            ("VICE", Value),
            ("LIBERTÉ", Value),
            ("VALEUR", Value),
            ("BONHEUR", Value),
            ("UTILITÉ", Value),
            ("CONSÉQUENCE", Value),
            ("INTENTION", Value),
            ("AUTONOMIE", Value),
            ("RESPECT", Value),
            ("ÉGALITÉ", Value),
            ("SOLIDARITÉ", Value),
            ("ALTRUISME", Value),
            ("ÉGOÏSME", Value),
        ],
    ),
    (
        "esthétique",
        &[
            ("BEAUTÉ", Aesthetic),
            ("LAIDEUR", Aesthetic),
            ("ART", Aesthetic),
            ("GOÛT", Aesthetic),
            ("SUBLIME", Aesthetic),
            ("JUGEMENT", Aesthetic),
            ("HARMONIE", Aesthetic),
            ("STYLE", Aesthetic),
            ("SYMBOLISME", Aesthetic),
            ("IMITATION", Aesthetic),
            ("CRÉATIVITÉ", Aesthetic),
            ("INTERPRÉTATION", Aesthetic),
        ],
    ),
    (
        "politique",
        &[
            ("ÉTAT", Political),
            ("SOCIÉTÉ", Political),
            ("POUVOIR", Political),
            ("CONTRE-POUVOIR", Political),
            ("AUTORITÉ", Political),
            ("OBÉISSANCE", Political),
            ("LÉGITIMITÉ", Political),
            ("DÉMOCRATIE", Political),
            ("ANARCHIE", Political),
            ("LIBERTÉ_POLITIQUE", Political),
            ("DROIT_NATUREL", Political),
            ("CONTRAT_SOCIAL", Political),
            ("CITOYENNETÉ", Political),
        ],
    ),
    (
        "esprit",
        &[
            ("CONSCIENCE", Entity),
            ("PENSÉE", Entity),
            ("ESPRIT", Entity),
            ("CORPS", Entity),
            ("DUALISME", Relation),
            ("MONISME", Relation),
            ("INTENTIONNALITÉ", Property),
            ("QUALIA", Property),
        ],
    ),
    (
        "langage",
        &[
            ("LANGAGE", Epistemic),
            ("SIGNIFICATION", Epistemic),
            ("RÉFÉRENCE", Epistemic),
            ("COMMUNICATION", Epistemic),
            ("EXPRESSION", Epistemic),
            ("SIGNIFIANT", Entity),
            ("SIGNIFIÉ", Entity),
            ("ÉNONCÉ", Entity),
            ("DISCOURS", Entity),
            ("PRAGMATIQUE", Property),
            ("SÉMANTIQUE", Property),
            ("SYNTAXE", Property),
        ],
    ),
    (
        "sciences",
        &[
            ("SCIENCE", Epistemic),
            ("THÉORIE", Epistemic),
            ("HYPOTHÈSE", Epistemic),
            ("EXPÉRIENCE", Epistemic),
            ("OBSERVATION", Epistemic),
            ("MODÈLE", Epistemic),
            ("EXPLICATION_SCIENTIFIQUE", Epistemic),
            ("LOI_SCIENTIFIQUE", Epistemic),
            ("PRÉDICTION", Epistemic),
            ("VÉRIFICATION", Epistemic),
            ("PROGRÈS", Epistemic),
            ("OBJECTIVITÉ", Epistemic),
            ("SUBJECTIVITÉ", Epistemic),
            ("RÉALISME", Epistemic),
            ("ANTIRÉALISME", Epistemic),
            ("RÉDUCTION", Relation),
            ("ÉMERGENCE", Relation),
        ],
    ),
];

const CORE_RELATIONS: &[(&str, RelationType, &str)] = &[
    // métaphysique
    ("EXISTENCE", Implies, "ÊTRE"),
    ("ESSENCE", Defines, "ÊTRE"),
    ("ESSENCE", Defines, "SUBSTANCE"),
    ("IDENTITÉ", IsEquivalent, "ÊTRE"),
    ("DIFFÉRENCE", Contradicts, "IDENTITÉ"),
    ("CAUSALITÉ", Defines, "CAUSE"),
    ("CAUSE", Causes, "EFFET"),
    ("CAUSE", Precedes, "EFFET"),
    ("CHANGEMENT", Enables, "PROCESSUS"),
    ("PROCESSUS", Enables, "CHANGEMENT"),
    ("TEMPS", PartOf, "MONDE"),
    ("ESPACE", PartOf, "MONDE"),
    ("ESPACE", Complements, "TEMPS"),
    ("OBJET", PartOf, "MONDE"),
    ("SUJET", PartOf, "MONDE"),
    ("INFINI", Complements, "FINI"),
    ("INFINI", Opposes, "LIMITÉ"),
    ("CONTINGENCE", Opposes, "NÉCESSITÉ"),
    ("UNIVERSALITÉ", Opposes, "PARTICULARITÉ"),
    ("OBJET", Opposes, "SUJET"),
    ("ACTUALITÉ", Opposes, "POSSIBILITÉ"),
    ("SUBSTANCE", HasProperty, "ESSENCE"),
    ("SUBSTANCE", HasProperty, "ACCIDENT"),
    ("ACCIDENT", PartOf, "SUBSTANCE"),
    ("MONDE", HasProperty, "CONTINGENCE"),
    ("MONDE", HasProperty, "NÉCESSITÉ"),
    // épistémologie
    ("CONNAISSANCE", Implies, "VÉRITÉ"),
    ("VÉRITÉ", Opposes, "FAUSSETÉ"),
    ("CONNAISSANCE", Prevents, "IGNORANCE"),
    ("CROYANCE", Precedes, "CONNAISSANCE"),
    ("OPINION", Opposes, "SAVOIR"),
    ("DOUTE", Opposes, "CERTITUDE"),
    ("CERTITUDE", Enables, "CONNAISSANCE"),
    ("ÉVIDENCE", Enables, "CERTITUDE"),
    ("RAISON", Enables, "CONNAISSANCE"),
    ("SENSATION", Enables, "PERCEPTION"),
    ("PERCEPTION", Enables, "CONNAISSANCE"),
    ("INTUITION", Enables, "CONNAISSANCE"),
    ("JUSTIFICATION", HasProperty, "VÉRITÉ"),
    ("JUSTIFICATION", Enables, "CROYANCE"),
    // logique
    ("ARGUMENT", HasProperty, "VALIDITÉ"),
    ("ARGUMENT", HasProperty, "SOLIDITÉ"),
    ("PRÉMISSE", Enables, "CONCLUSION"),
    ("PRÉMISSE", PartOf, "ARGUMENT"),
    ("CONTRADICTION", Opposes, "COHÉRENCE"),
    ("CONTRADICTION", Prevents, "VALIDITÉ"),
    ("COHÉRENCE", Enables, "VALIDITÉ"),
    ("SYLLOGISME", IsA, "ARGUMENT"),
    ("SYLLOGISME", Enables, "DÉDUCTION"),
    ("PARADOXE", Contradicts, "TAUTOLOGIE"),
    ("PARADOXE", Prevents, "CONCLUSION"),
    ("NÉGATION", Opposes, "AFFIRMATION"),
    ("NÉGATION", Contradicts, "AFFIRMATION"),
    ("IMPLICATION", Implies, "CONCLUSION"),
    ("IMPLICATION", Enables, "DÉDUCTION"),
    ("CONJONCTION", Complements, "DISJONCTION"),
    ("INFÉRENCE", Enables, "CONCLUSION"),
    ("INFÉRENCE", Enables, "ARGUMENT"),
    ("DÉDUCTION", IsA, "INFÉRENCE"),
    ("INDUCTION", IsA, "INFÉRENCE"),
    ("ABDUCTION", IsA, "INFÉRENCE"),
    ("DÉDUCTION", Enables, "CERTITUDE"),
    ("INDUCTION", Enables, "PROBABILITÉ"),
    ("ABDUCTION", Enables, "HYPOTHÈSE"),
    // éthique
    ("BIEN", Opposes, "MAL"),
    ("JUSTICE", IsA, "BIEN"),
    ("JUSTICE", Opposes, "INJUSTICE"),
    ("VERTU", Enables, "BIEN"),
    ("VICE", Enables, "MAL"),
    ("BIEN", Complements, "VERTU"),
    ("MAL", Complements, "VICE"),
    ("LIBERTÉ", Enables, "RESPONSABILITÉ"),
    ("LIBERTÉ", Enables, "AUTONOMIE"),
    ("AUTONOMIE", Enables, "RESPONSABILITÉ"),
    ("RESPONSABILITÉ", Enables, "JUSTICE"),
    ("DEVOIR", Enables, "JUSTICE"),
    ("DROIT", Enables, "JUSTICE"),
    ("DROIT", Enables, "LIBERTÉ"),
    ("DEVOIR", Opposes, "DROIT"),
    ("RESPECT", Enables, "JUSTICE"),
    ("ÉGALITÉ", Enables, "JUSTICE"),
    ("SOLIDARITÉ", Enables, "JUSTICE"),
    ("LOI", Enables, "JUSTICE"),
    ("BONHEUR", Enables, "BIEN"),
    ("BONHEUR", Enables, "VERTU"),
    ("UTILITÉ", Enables, "BONHEUR"),
    ("CONSÉQUENCE", Follows, "ACTION"),
    ("INTENTION", Precedes, "ACTION"),
    ("ALTRUISME", Opposes, "ÉGOÏSME"),
    ("SANCTION", Follows, "TRANSGRESSION"),
    ("PUNITION", IsA, "SANCTION"),
    ("RÉCOMPENSE", Opposes, "PUNITION"),
    // esthétique
    ("BEAUTÉ", IsA, "VALEUR"),
    ("BEAUTÉ", Opposes, "LAIDEUR"),
    ("ART", Enables, "BEAUTÉ"),
    ("HARMONIE", Enables, "BEAUTÉ"),
    ("SUBLIME", Complements, "BEAUTÉ"),
    ("GOÛT", Enables, "JUGEMENT"),
    ("STYLE", HasProperty, "ART"),
    ("IMITATION", Enables, "ART"),
    ("CRÉATIVITÉ", Enables, "ART"),
    ("SYMBOLISME", Enables, "INTERPRÉTATION"),
    ("INTERPRÉTATION", Enables, "JUGEMENT"),
    // politique
    ("ÉTAT", PartOf, "SOCIÉTÉ"),
    ("ÉTAT", HasProperty, "AUTORITÉ"),
    ("ÉTAT", Opposes, "ANARCHIE"),
    ("SOCIÉTÉ", PartOf, "MONDE"),
    ("POUVOIR", Enables, "AUTORITÉ"),
    ("POUVOIR", Opposes, "CONTRE-POUVOIR"),
    ("AUTORITÉ", Enables, "LÉGITIMITÉ"),
    ("LÉGITIMITÉ", Enables, "OBÉISSANCE"),
    ("DÉMOCRATIE", IsA, "ÉTAT"),
    ("LIBERTÉ_POLITIQUE", Enables, "CITOYENNETÉ"),
    ("DROIT_NATUREL", Defines, "CONTRAT_SOCIAL"),
    ("CONTRAT_SOCIAL", Enables, "ÉTAT"),
    ("CITOYENNETÉ", PartOf, "SOCIÉTÉ"),
    ("CHANGEMENT", Precedes, "ÉTAT"),
    // esprit
    ("CONSCIENCE", PartOf, "ESPRIT"),
    ("PENSÉE", PartOf, "ESPRIT"),
    ("ESPRIT", Opposes, "CORPS"),
    ("DUALISME", Opposes, "MONISME"),
    ("INTENTIONNALITÉ", HasProperty, "CONSCIENCE"),
    ("QUALIA", HasProperty, "CONSCIENCE"),
    ("ESPRIT", Enables, "PENSÉE"),
    ("CORPS", Enables, "SENSATION"),
    ("CONSCIENCE", Enables, "RÉFLEXION"),
    ("PENSÉE", Enables, "ACTION"),
    // langage
    ("LANGAGE", Enables, "SIGNIFICATION"),
    ("LANGAGE", Enables, "COMMUNICATION"),
    ("LANGAGE", Enables, "PENSÉE"),
    ("SIGNIFICATION", HasProperty, "RÉFÉRENCE"),
    ("SIGNIFICATION", Enables, "COMPRÉHENSION"),
    ("RÉFÉRENCE", Enables, "SIGNIFICATION"),
    ("SIGNIFIANT", Defines, "SIGNIFIÉ"),
    ("SIGNIFIANT", Enables, "EXPRESSION"),
    ("SIGNIFIÉ", Enables, "COMPRÉHENSION"),
    ("PRAGMATIQUE", HasProperty, "LANGAGE"),
    ("SÉMANTIQUE", HasProperty, "LANGAGE"),
    ("SYNTAXE", HasProperty, "LANGAGE"),
    ("ÉNONCÉ", PartOf, "DISCOURS"),
    ("DISCOURS", Enables, "COMMUNICATION"),
    // sciences
    ("SCIENCE", Defines, "THÉORIE"),
    ("SCIENCE", Enables, "CONNAISSANCE"),
    ("SCIENCE", Enables, "PROGRÈS"),
    ("THÉORIE", Enables, "EXPLICATION"),
    ("THÉORIE", Enables, "PRÉDICTION"),
    ("HYPOTHÈSE", Precedes, "THÉORIE"),
    ("OBSERVATION", Enables, "EXPÉRIENCE"),
    ("OBSERVATION", Enables, "THÉORIE"),
    ("EXPÉRIENCE", Enables, "CONNAISSANCE"),
    ("EXPÉRIENCE", Enables, "VÉRIFICATION"),
    ("VÉRIFICATION", Enables, "CONNAISSANCE"),
    ("PRÉDICTION", Enables, "EXPLICATION"),
    ("EXPLICATION_SCIENTIFIQUE", IsA, "EXPLICATION"),
    ("LOI_SCIENTIFIQUE", IsA, "LOI"),
    ("MODÈLE", Enables, "EXPLICATION_SCIENTIFIQUE"),
    ("RÉDUCTION", Opposes, "ÉMERGENCE"),
    ("OBJECTIVITÉ", Opposes, "SUBJECTIVITÉ"),
    ("RÉALISME", Opposes, "ANTIRÉALISME"),
];

impl ConceptOntology {
    /// Cria uma ontologia com o conjunto curado de conceitos e relações.
    ///
    /// Uma relação recusada pela ontologia é registrada em `warn!` e
    /// ignorada; o resto do seed continua.
    pub fn with_core_set() -> Self {
        let mut onto = ConceptOntology::new();
        for (domain, concepts) in CORE_CONCEPTS {
            for (name, concept_type) in *concepts {
                match onto.add_concept_with(name, *concept_type, Provenance::Core) {
                    Ok(key) => {
                        if let Some(concept) = onto.concepts.get_mut(&key) {
                            concept.domain = Some((*domain).to_string());
                        }
                    }
                    Err(e) => tracing::warn!(concept = %name, "Seed: conceito ignorado: {e}"),
                }
            }
        }
        for (from, relation, to) in CORE_RELATIONS {
            if let Err(e) = onto.add_relation(from, *relation, to) {
                tracing::warn!(from = %from, to = %to, "Seed: relação ignorada: {e}");
            }
        }
        tracing::info!(
            concepts = onto.concept_count(),
            relations = onto.relation_count(),
            "Ontologia: conjunto curado carregado"
        );
        onto
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_set_accepts_every_relation() {
        let onto = ConceptOntology::with_core_set();
        for (from, relation, to) in CORE_RELATIONS {
            assert!(onto.has_relation(from, *relation, to), "{from} {relation} {to}");
        }
    }

    #[test]
    fn core_set_is_large_and_consistent() {
        let onto = ConceptOntology::with_core_set();
        assert!(onto.concept_count() >= 150);
        let report = onto.validate_consistency();
        assert!(report.is_consistent, "{report:?}");
    }

    #[test]
    fn core_concepts_carry_domain() {
        let onto = ConceptOntology::with_core_set();
        let justice = onto.get("JUSTICE").unwrap();
        assert_eq!(justice.domain.as_deref(), Some("éthique"));
        assert_eq!(justice.provenance, Provenance::Core);
        assert!(onto.has_relation("INJUSTICE", Opposes, "JUSTICE"));
    }
}
