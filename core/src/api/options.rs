//! Configuration options for the engine.

/// Configuration options for the engine.
///
/// # Example
///
/// ```
/// use reckon_core::api::EngineOptions;
///
/// let options = EngineOptions {
///     seed: Some(7),
///     ..EngineOptions::default()
/// };
/// assert_eq!(options.max_depth, 64);
/// ```
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Maximum nesting of on-demand reevaluation of impure or out-of-date
    /// references.
    ///
    /// Default: 64
    pub max_depth: usize,

    /// Seed for the random source used by `random` and `roll`.
    ///
    /// Set to `None` to seed from the operating system.
    ///
    /// Default: None
    pub seed: Option<u64>,

    /// Largest number of dice a single `roll` may throw.
    ///
    /// Default: 10 000
    pub max_roll_count: i64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            seed: None,
            max_roll_count: 10_000,
        }
    }
}
