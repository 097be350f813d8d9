use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CATEGORY_THRESHOLD;

/// One keyword rule: any keyword found in the text selects `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    category: String,
    keywords: Vec<String>,
}

impl KeywordRule {
    /// Creates a rule; keywords are lowercased once here.
    pub fn new<S, I, K>(category: S, keywords: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        Self {
            category: category.into(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns the first keyword contained in `lowered`.
    fn first_match<'a>(&'a self, lowered: &str) -> Option<&'a str> {
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
    }
}

/// Ordered keyword rules. Earlier rules win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRules {
    rules: Vec<KeywordRule>,
}

/// A keyword hit: the winning category and the keyword that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch<'a> {
    pub category: &'a str,
    pub keyword: &'a str,
}

impl KeywordRules {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// No rules; every question goes through the probability path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// French retail-banking rules, in priority order.
    pub fn french_banking() -> Self {
        Self::new(vec![
            KeywordRule::new(
                "Salutation",
                [
                    "salut",
                    "bonjour",
                    "bonsoir",
                    "bonne journée",
                    "bonne soirée",
                    "salutations",
                    "cher",
                    "madame",
                    "monsieur",
                    "messieurs",
                    "mesdames",
                    "merci",
                    "au revoir",
                    "cordialement",
                    "bien à vous",
                    "sincèrement",
                    "pouvez-vous",
                    "pourriez-vous",
                    "auriez-vous",
                    "serait-il possible",
                    "je souhaite",
                    "je voudrais",
                    "j'aimerais",
                    "je désire",
                ],
            ),
            KeywordRule::new(
                "Sécurité",
                [
                    "vol",
                    "perdu",
                    "égaré",
                    "disparu",
                    "manquant",
                    "trouvé",
                    "piratage",
                    "fraude",
                    "arnaque",
                    "escroquerie",
                    "usurpation",
                    "bloquer",
                    "débloquer",
                    "verrouiller",
                    "déverrouiller",
                    "activer",
                    "désactiver",
                    "code",
                    "cvv",
                    "cvc",
                    "pin",
                    "mot de passe",
                    "identifiant",
                    "alerte",
                    "notification",
                    "suspicion",
                    "anomalie",
                    "douteux",
                    "protection",
                    "sécuriser",
                    "sécurité",
                    "confidentiel",
                    "privé",
                ],
            ),
            KeywordRule::new(
                "Transaction",
                [
                    "paiement",
                    "achat",
                    "transaction",
                    "dépense",
                    "retrait",
                    "virement",
                    "transfert",
                    "achat en ligne",
                    "paiement en ligne",
                    "retrait d'argent",
                    "virement bancaire",
                    "échoué",
                    "refusé",
                    "accepté",
                    "validé",
                    "annulé",
                    "en cours",
                    "montant",
                    "plafond",
                    "limite",
                    "seuil",
                    "maximum",
                    "minimum",
                    "date",
                    "heure",
                    "lieu",
                    "commerçant",
                    "marchand",
                    "boutique",
                ],
            ),
            KeywordRule::new(
                "Compte",
                [
                    "compte",
                    "compte bancaire",
                    "compte courant",
                    "compte épargne",
                    "solde",
                    "relevé",
                    "historique",
                    "débit",
                    "crédit",
                    "opération",
                    "rib",
                    "iban",
                    "numéro de compte",
                    "titulaire",
                    "propriétaire",
                    "ouvrir",
                    "fermer",
                    "modifier",
                    "changer",
                    "mettre à jour",
                    "conseiller",
                    "service client",
                ],
            ),
            KeywordRule::new(
                "Prépayée",
                [
                    "carte prépayée",
                    "carte rechargeable",
                    "carte à recharger",
                    "recharger",
                    "recharge",
                    "crédit",
                    "solde",
                    "activer",
                    "désactiver",
                    "bloquer",
                    "débloquer",
                    "perdu",
                    "plafond",
                    "limite",
                    "maximum",
                    "seuil",
                    "restriction",
                    "recharge en ligne",
                    "recharge en agence",
                    "recharge automatique",
                ],
            ),
            KeywordRule::new(
                "Générale",
                [
                    "comment",
                    "où",
                    "quand",
                    "pourquoi",
                    "quel",
                    "quelle",
                    "quels",
                    "quelles",
                    "pouvez-vous",
                    "pourriez-vous",
                    "auriez-vous",
                    "serait-il possible",
                    "je souhaite",
                    "je voudrais",
                    "j'aimerais",
                    "je désire",
                    "j'ai besoin",
                    "il me faut",
                    "je cherche",
                    "je recherche",
                    "je ne comprends pas",
                    "je ne sais pas",
                    "je suis perdu",
                    "agence",
                    "banque",
                    "horaires",
                    "ouverture",
                    "fermeture",
                    "heures",
                    "jours",
                ],
            ),
            KeywordRule::new("Autre", std::iter::empty::<&str>()),
        ])
    }

    /// First rule (in list order) with a keyword that is a case-insensitive
    /// substring of `text`.
    pub fn find_match(&self, text: &str) -> Option<KeywordMatch<'_>> {
        let lowered = text.to_lowercase();
        self.rules.iter().find_map(|rule| {
            rule.first_match(&lowered).map(|keyword| KeywordMatch {
                category: rule.category(),
                keyword,
            })
        })
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(KeywordRule::category)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Per-category confidence thresholds with a fallback default.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryThresholds {
    table: HashMap<String, f64>,
    default: f64,
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self {
            table: HashMap::new(),
            default: DEFAULT_CATEGORY_THRESHOLD,
        }
    }
}

impl CategoryThresholds {
    pub fn new(default: f64) -> Self {
        Self {
            table: HashMap::new(),
            default,
        }
    }

    /// Per-category thresholds for the French banking categories.
    pub fn french_banking() -> Self {
        Self::default()
            .with("Sécurité", 0.95)
            .with("Transaction", 0.90)
            .with("Compte", 0.85)
            .with("Prépayée", 0.85)
            .with("Générale", 0.75)
            .with("Autre", 0.75)
            .with("Salutation", 0.75)
    }

    pub fn with(mut self, category: impl Into<String>, threshold: f64) -> Self {
        self.table.insert(category.into(), threshold);
        self
    }

    /// Threshold for `category`, or the default when absent.
    #[inline]
    pub fn get(&self, category: &str) -> f64 {
        self.table.get(category).copied().unwrap_or(self.default)
    }

    pub fn default_threshold(&self) -> f64 {
        self.default
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}
