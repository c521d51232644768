/// Name-similarity thresholds for reconciliation.
///
/// Ratios come from `strsim::normalized_levenshtein` in [0, 1],
/// computed case-insensitively. Higher = stricter.

/// Minimum ratio for a fuzzy candidate to be suggested to the user.
/// Below this, a fresh record is created without asking.
pub const SUGGEST_SIM: f64 = 0.80;
