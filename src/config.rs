/// Deepest bracket nesting accepted unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Settings for a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of brackets that may be open at once.
    pub max_depth: usize,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
