//! Name matching between resource key remainders and method property names

/// One way a key remainder (`active_label` in `OrderPmo_active_label`) can
/// refer to a method's property name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// The remainder is the property name
    Exact,
    /// The remainder is a sub-key of the property (`active_label` for `active`)
    SuffixedKey,
    /// Ignoring underscores and case, the remainder starts with the property name
    NormalizedPrefix,
}

impl MatchStrategy {
    /// Strategies in evaluation order
    pub const ALL: [MatchStrategy; 3] = [
        MatchStrategy::Exact,
        MatchStrategy::SuffixedKey,
        MatchStrategy::NormalizedPrefix,
    ];

    /// Strategy name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::SuffixedKey => "suffixed-key",
            MatchStrategy::NormalizedPrefix => "normalized-prefix",
        }
    }

    /// Whether `remainder` refers to `property`
    pub fn matches(&self, remainder: &str, property: &str) -> bool {
        match self {
            MatchStrategy::Exact => remainder == property,
            MatchStrategy::SuffixedKey => remainder
                .strip_prefix(property)
                .map_or(false, |rest| rest.starts_with('_')),
            MatchStrategy::NormalizedPrefix => {
                let remainder = remainder.replace('_', "").to_lowercase();
                let property = property.to_lowercase();
                remainder.starts_with(&property)
            }
        }
    }

    /// First strategy under which `remainder` refers to `property`
    pub fn first_match(remainder: &str, property: &str) -> Option<MatchStrategy> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.matches(remainder, property))
    }
}
