//! Query variant expansion
//!
//! A campaign runs the seed query first, then the seed joined with each
//! modifier term in file order. The sequence is built once and never changes.

/// One concrete query string of a campaign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryVariant {
    /// The query text sent to the backend
    pub text: String,

    /// `None` for the unmodified seed, `Some(i)` for the i-th modifier
    pub modifier_index: Option<usize>,
}

impl QueryVariant {
    /// The unmodified seed variant
    pub fn seed(seed: &str) -> Self {
        Self {
            text: seed.trim().to_string(),
            modifier_index: None,
        }
    }

    /// Returns true for the unmodified seed
    pub fn is_seed(&self) -> bool {
        self.modifier_index.is_none()
    }
}

/// Expands a seed query and its modifiers into the ordered variant list
///
/// # Example
///
/// ```
/// use query_harvest::campaign::build_variants;
///
/// let variants = build_variants("cats", &["images".to_string(), "gifs".to_string()]);
/// assert_eq!(variants.len(), 3);
/// assert_eq!(variants[2].text, "cats gifs");
/// assert_eq!(variants[2].modifier_index, Some(1));
/// ```
pub fn build_variants(seed: &str, modifiers: &[String]) -> Vec<QueryVariant> {
    let seed_variant = QueryVariant::seed(seed);
    let modified = modifiers
        .iter()
        .enumerate()
        .map(|(index, modifier)| QueryVariant {
            text: format!("{} {}", seed_variant.text, modifier.trim()),
            modifier_index: Some(index),
        })
        .collect::<Vec<_>>();

    let mut variants = Vec::with_capacity(modified.len() + 1);
    variants.push(seed_variant);
    variants.extend(modified);
    variants
}
