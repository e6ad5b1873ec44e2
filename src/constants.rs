//! Cross-cutting, shared constants.
//!
//! Runtime overrides live in [`crate::config::Config`]; these are the defaults it falls back to.

/// Number of nearest candidate-side nodes averaged per role-side node.
pub const DEFAULT_TOP_K: usize = 3;

/// Pseudo-count ("virtual trials") a similarity score is worth when seeding an arm.
pub const DEFAULT_WARM_START_CONFIDENCE: f64 = 10.0;

/// Max in-flight embedding requests per graph build.
pub const DEFAULT_EMBED_CONCURRENCY: usize = 8;

/// Per-attribute embedding timeout.
pub const DEFAULT_EMBED_TIMEOUT_MS: u64 = 2_000;

/// Output dimension of the local hashing embedder.
pub const DEFAULT_HASHING_DIM: usize = 256;

/// Pool scope used when none is configured.
pub const DEFAULT_POOL_SCOPE: &str = "default";

/// Version tag written into exported pool snapshots.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;
