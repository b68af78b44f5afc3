//! # MoE Router - Deterministic Expert Routing Simulator
//!
//! Illustrative mixture-of-experts routing: every token is sent to the
//! always-active shared expert plus a bounded, reproducible set of routed
//! experts chosen from its text. No gating network is involved; the
//! selection is a pure function meant for teaching and visualization.
//!
//! ## Features
//!
//! - **Deterministic routing**: same token, same experts, on every platform
//! - **Semantic bias**: keyword categories (math, vision, code, ...) pull in
//!   their experts first
//! - **Scatter-fill**: remaining slots come from a hash-seeded shuffle
//! - **Playback**: frame-paced iteration over a token sequence for animated views
//!
//! ### Architecture
//!
//! ```text
//!  text ──> tokenizer ──> Token ──> TokenExpertRouter ──> RoutingResult
//!                                          ^                    |
//!                                   RoutingConfig               v
//!                                                     Playback ──> RoutingView
//! ```
//!
//! ### Routing Pipeline
//!
//! ```text
//!  token text
//!      │
//!      ├─ token_hash ─────────────── seed (u32)
//!      │                               │
//!      ├─ classify ── primary category │
//!      │                  │            │
//!      │        semantic candidates <──┤   (≤ 3 primary + ≤ 2 secondary)
//!      │                  │            │
//!      │             union, in range   │
//!      │                  │            │
//!      │        scatter-fill <─────────┘   (seeded Fisher–Yates over 1..N)
//!      v
//!  routed experts, |R| = min(routed_count, expert_count - 1)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use moe_router::{route, TokenExpertRouter};
//!
//! // One-off routing
//! let result = route("calculate", 32, 8).unwrap();
//! assert_eq!(result.len(), 8);
//! assert!(result.iter().all(|e| (1..32).contains(&e)));
//!
//! // Reusable router
//! let router = TokenExpertRouter::new(32, 8).unwrap();
//! assert_eq!(router.route("the"), router.route("the"));
//! ```
//!
//! ### Playback
//!
//! ```
//! use moe_router::{tokenize, Playback, PlaybackConfig, TokenExpertRouter, TraceRecorder};
//!
//! let router = TokenExpertRouter::default();
//! let tokens = tokenize("why is the sky blue");
//!
//! let mut recorder = TraceRecorder::new();
//! Playback::new(&router, &tokens, &PlaybackConfig::default())
//!     .unwrap()
//!     .drive(&mut recorder);
//!
//! assert_eq!(recorder.entries.len(), 5);
//! ```
//!
//! ## Modules
//!
//! - [`routing`]: Hashing, categories, shuffle and the router
//! - [`tokenizer`]: Whitespace tokenization
//! - [`playback`]: Frame iterator and view trait
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod error;
pub mod playback;
pub mod routing;
pub mod tokenizer;

// Re-exports for convenience
pub use config::{Config, PlaybackConfig, RoutingConfig};
pub use error::{Result, RouterError};
pub use playback::{Frame, Playback, PlaybackPhase, RoutingView, TraceEntry, TraceRecorder};
pub use routing::{
    route, token_hash, ExpertIndex, ExpertRole, RoutingResult, SemanticCategory,
    TokenExpertRouter, SHARED_EXPERT_INDEX,
};
pub use tokenizer::{tokenize, Token};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
