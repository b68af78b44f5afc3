//! Deterministic mixture-of-experts routing.
//!
//! Simulates the sparse gate of an MoE layer for illustration: each token
//! is sent to a bounded set of experts derived purely from its text. There
//! is no gating network; a content hash, keyword categories and a seeded
//! shuffle stand in for learned routing.
//!
//! # Layer Layout
//!
//! ```text
//! expert 0        shared expert, always active, never routed
//! experts 1..N    routed experts, N = expert_count - 1 (max 31)
//! ```
//!
//! # Category Table
//!
//! | Category  | Experts       |
//! |-----------|---------------|
//! | math      | 8 16 24       |
//! | language  | 1 9 17 25     |
//! | vision    | 2 10 18 26    |
//! | logic     | 3 11 19 27    |
//! | code      | 4 12 20 28    |
//! | memory    | 5 13 21 29    |
//! | audio     | 6 14 22 30    |
//! | reasoning | 7 15 23 31    |
//!
//! # Guarantees
//!
//! - Same text and configuration, same result
//! - Expert 0 is never in the routed set
//! - Result size is exactly `min(routed_count, expert_count - 1)`
//! - Every routed expert is unique and below `expert_count`
//!
//! # Example
//!
//! ```
//! use moe_router::routing::{route, SemanticCategory};
//!
//! let result = route("the", 32, 8).unwrap();
//! assert_eq!(result.len(), 8);
//! assert_eq!(result.category, Some(SemanticCategory::Language));
//! assert!(!result.contains(0));
//!
//! assert!(route("test", 1, 8).is_err());
//! ```

mod category;
mod hash;
mod router;
mod shuffle;

pub use category::{expert_label, CategoryRule, SemanticCategory, RULES};
pub use hash::token_hash;
pub use router::{
    semantic_experts, ActivationSummary, ExpertRole, RoutingResult, SemanticPick,
    TokenExpertRouter,
};
pub use shuffle::seeded_shuffle;

use crate::error::Result;

/// Expert slot index
pub type ExpertIndex = usize;

/// Index of the always-active shared expert
pub const SHARED_EXPERT_INDEX: ExpertIndex = 0;

/// Default experts per layer
pub const DEFAULT_EXPERT_COUNT: usize = 32;

/// Experts per layer are clamped to this
pub const MAX_EXPERT_COUNT: usize = 32;

/// Shared expert plus one routed expert
pub const MIN_EXPERT_COUNT: usize = 2;

/// Default routed experts per token
pub const DEFAULT_ROUTED_COUNT: usize = 8;

/// Default number of semantic candidates admitted before scatter-fill
pub const DEFAULT_MAX_SEMANTIC: usize = 5;

/// Route `text` across `expert_count` experts, selecting `routed_count`.
///
/// Convenience wrapper over [`TokenExpertRouter`].
pub fn route(text: &str, expert_count: usize, routed_count: usize) -> Result<RoutingResult> {
    Ok(TokenExpertRouter::new(expert_count, routed_count)?.route(text))
}
