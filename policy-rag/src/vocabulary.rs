//! The keyword vocabulary that defines the feature space.

/// Built-in HR keywords, in feature-vector order.
///
/// Keywords are matched as substrings in both directions, so short function
/// words such as "of" or "is" must not appear inside any entry.
pub const HR_KEYWORDS: &[&str] = &[
    "leave",
    "vacation",
    "sick",
    "holiday",
    "annual",
    "days",
    "maternity",
    "paternity",
    "parental",
    "remote",
    "home",
    "hybrid",
    "conduct",
    "harassment",
    "ethics",
    "dress",
    "benefits",
    "insurance",
    "health",
    "dental",
    "retirement",
    "pension",
    "performance",
    "review",
    "appraisal",
    "goals",
    "expense",
    "reimbursement",
    "travel",
    "training",
    "learning",
    "course",
    "certification",
    "salary",
    "payroll",
    "bonus",
    "overtime",
    "hours",
    "schedule",
    "security",
    "password",
    "equipment",
    "laptop",
    "resignation",
    "notice",
    "termination",
    "promotion",
    "grievance",
    "complaint",
    "safety",
];

/// A fixed, ordered list of lower-case keywords.
///
/// The position of a keyword is the index of its component in every
/// [`FeatureVector`](crate::FeatureVector).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    keywords: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(HR_KEYWORDS.iter().copied())
    }
}

impl Vocabulary {
    /// Build a vocabulary from keywords. Keywords are lower-cased; blank
    /// entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// The keywords in feature order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Number of dimensions of every vector over this vocabulary.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the vocabulary has no keywords.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary_is_lowercase_and_unique() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.len(), HR_KEYWORDS.len());
        let mut seen = std::collections::HashSet::new();
        for k in vocab.keywords() {
            assert_eq!(k, &k.to_lowercase());
            assert!(seen.insert(k.clone()), "duplicate keyword {k}");
        }
    }

    #[test]
    fn new_normalizes_and_drops_blanks() {
        let vocab = Vocabulary::new(["Leave", "  ", " Remote "]);
        assert_eq!(vocab.keywords(), &["leave".to_string(), "remote".to_string()]);
    }
}
