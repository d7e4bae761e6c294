//! Heap configuration

/// Default semispace size: 2 MiB per space.
pub const DEFAULT_SEMISPACE_SIZE: usize = 2 * 1024 * 1024;

/// Smallest accepted semispace size.
pub const MIN_SEMISPACE_SIZE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapConfig {
    /// Capacity of each of the two semispaces, in bytes.
    pub semispace_size: usize,
    /// Collect before every allocation.
    pub stress: bool,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            semispace_size: DEFAULT_SEMISPACE_SIZE,
            stress: false,
        }
    }
}

impl HeapConfig {
    pub fn with_semispace_size(semispace_size: usize) -> Self {
        Self {
            semispace_size,
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `SANYA_HEAP_SIZE`: semispace size in bytes, `k`/`m` suffixes allowed
    /// - `SANYA_GC_STRESS`: `1`/`true` collects on every allocation
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(size) = std::env::var("SANYA_HEAP_SIZE") {
            match parse_size(&size) {
                Some(bytes) => config.semispace_size = bytes,
                None => tracing::warn!(value = %size, "ignoring malformed SANYA_HEAP_SIZE"),
            }
        }

        if let Ok(stress) = std::env::var("SANYA_GC_STRESS") {
            config.stress = matches!(stress.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        config
    }

    /// Semispace size after applying the lower bound.
    pub(crate) fn effective_semispace_size(&self) -> usize {
        self.semispace_size.max(MIN_SEMISPACE_SIZE)
    }
}

fn parse_size(s: &str) -> Option<usize> {
    let s = s.trim().to_lowercase();
    let (digits, scale) = if let Some(d) = s.strip_suffix('m') {
        (d, 1024 * 1024)
    } else if let Some(d) = s.strip_suffix('k') {
        (d, 1024)
    } else {
        (s.as_str(), 1)
    };
    digits.trim().parse::<usize>().ok()?.checked_mul(scale)
}
