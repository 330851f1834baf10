/// Step ceiling used when the caller does not choose one.
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Per-run settings for the rewrite engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Report which rule fired at each step, not just the tape.
    pub verbose: bool,
    /// Maximum number of rule applications in one run.
    pub max_steps: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl RunConfig {
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}
