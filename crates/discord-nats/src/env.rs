//! Environment access behind a trait so config loading can be tested.

/// Read one environment variable.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// Delegates to `std::env`.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}
