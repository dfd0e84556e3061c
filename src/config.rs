//! Tunable constants for a [`Program`](crate::program::Program).
//!
//! Mirrors how the rest of the toolchain gathers its magic numbers into a
//! single `Config`-shaped struct with a `Default` impl instead of scattering
//! bare constants through the module tree.

/// Default cap on the number of distinct payloads a single `Variable` may
/// hold before further distinct payloads collapse onto `default_data`.
pub const MAX_VAR_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_var_size: usize,
}

impl EngineConfig {
    pub fn with_max_var_size(mut self, max_var_size: usize) -> Self {
        self.max_var_size = max_var_size;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_var_size: MAX_VAR_SIZE,
        }
    }
}
