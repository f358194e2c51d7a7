//! Configuration - collector tuning parameters.

/// Tuning parameters for the collector.
///
/// The defaults match the interpreter's shipping behavior; tests shrink the
/// threshold to force collections early.
///
/// # Examples
///
/// ```
/// use rgc::GcConfig;
///
/// let config = GcConfig::default();
/// assert_eq!(config.initial_threshold, 100);
/// assert_eq!(config.max_roots, 64);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct GcConfig {
    /// Object count that triggers the first collection.
    ///
    /// The threshold doubles whenever a collection leaves at least 87.5%
    /// of it alive.
    pub initial_threshold: usize,

    /// Capacity of the root stack. Exceeding it is fatal.
    pub max_roots: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            initial_threshold: 100,
            max_roots: 64,
        }
    }
}
