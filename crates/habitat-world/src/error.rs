//! Error types for the `habitat-world` crate.
//!
//! Queries on the registries are total: unknown ids yield `false` or empty
//! results and unreachable goals yield empty paths. The only fallible step
//! is construction, which rejects configurations the spatial index cannot
//! work with.

/// Errors that can occur while building a registry.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A configuration value is outside its usable range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}
