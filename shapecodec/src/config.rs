//! Runtime configuration for encoders and decoders.

pub const DEFAULT_PREALLOCATION_SIZE_LIMIT: usize = 4 << 20; // 4 MiB
pub const PREALLOCATION_SIZE_LIMIT_DISABLED: usize = usize::MAX;
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Limits applied while decoding. Encoding is unbounded.
///
/// Defaults:
/// - Preallocation size limit is 4 MiB.
/// - Max decoding depth through recursive codecs is 1024.
///
/// ```
/// use shapecodec::Config;
///
/// const CONFIG: Config = Config::new()
///     .with_preallocation_size_limit(1024)
///     .with_max_depth(16);
/// assert_eq!(CONFIG.preallocation_size_limit(), 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    preallocation_size_limit: usize,
    max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            preallocation_size_limit: DEFAULT_PREALLOCATION_SIZE_LIMIT,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Upper bound, in bytes, on what a decoded length may make the decoder allocate up front.
    pub const fn with_preallocation_size_limit(mut self, limit: usize) -> Self {
        self.preallocation_size_limit = limit;
        self
    }

    pub const fn disable_preallocation_size_limit(self) -> Self {
        self.with_preallocation_size_limit(PREALLOCATION_SIZE_LIMIT_DISABLED)
    }

    /// Maximum nesting through recursive types accepted by the decoder.
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub const fn preallocation_size_limit(&self) -> usize {
        self.preallocation_size_limit
    }

    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }
}
