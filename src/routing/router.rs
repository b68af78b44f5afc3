//! Token-to-expert routing.
//!
//! Selection runs in two phases over a single hash seed:
//!
//! 1. **Semantic**: up to three experts from the token's primary category,
//!    then up to two from other categories for diversity.
//! 2. **Scatter-fill**: remaining slots come from a seeded shuffle of every
//!    non-shared expert.
//!
//! Out-of-range semantic candidates (when the expert count is below the
//! table's 32 slots) are dropped before the union, so the result stays
//! inside `[1, expert_count)`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::RoutingConfig;
use crate::error::{Result, RouterError};
use crate::tokenizer::Token;

use super::category::SemanticCategory;
use super::hash::token_hash;
use super::shuffle::seeded_shuffle;
use super::{
    ExpertIndex, DEFAULT_MAX_SEMANTIC, MAX_EXPERT_COUNT, MIN_EXPERT_COUNT, SHARED_EXPERT_INDEX,
};

/// Experts taken from the primary category
const PRIMARY_PICKS: usize = 3;
/// Secondary categories consulted for diversity
const SECONDARY_PICKS: usize = 2;
/// Rotation offset for the secondary expert within its category
const SECONDARY_OFFSET: usize = 7;
/// Semantic candidates stop growing at this size
const SEMANTIC_CAP: usize = 5;

/// Semantic-phase candidates for a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticPick {
    /// Primary category, if any rule matched
    pub category: Option<SemanticCategory>,
    /// Candidate experts in selection order (primary first)
    pub experts: Vec<ExpertIndex>,
}

/// Compute semantic-phase candidates for `text` under `hash`.
///
/// Candidates come straight from the category tables and are not filtered
/// by expert count.
pub fn semantic_experts(text: &str, hash: u32) -> SemanticPick {
    let category = SemanticCategory::classify(text);
    let mut experts = Vec::with_capacity(SEMANTIC_CAP);

    if let Some(primary) = category {
        let table = primary.experts();
        for i in 0..PRIMARY_PICKS.min(table.len()) {
            let expert = table[rotate(hash, i, table.len())];
            if expert != SHARED_EXPERT_INDEX && !experts.contains(&expert) {
                experts.push(expert);
            }
        }
    }

    let others: Vec<SemanticCategory> = SemanticCategory::ALL
        .into_iter()
        .filter(|c| Some(*c) != category)
        .collect();

    for i in 0..SECONDARY_PICKS {
        if experts.len() >= SEMANTIC_CAP {
            break;
        }
        let table = others[rotate(hash, i, others.len())].experts();
        let expert = table[rotate(hash, i + SECONDARY_OFFSET, table.len())];
        if expert != SHARED_EXPERT_INDEX && !experts.contains(&expert) {
            experts.push(expert);
        }
    }

    SemanticPick { category, experts }
}

/// `(hash + offset) mod len` without 32-bit overflow
#[inline]
fn rotate(hash: u32, offset: usize, len: usize) -> usize {
    ((u64::from(hash) + offset as u64) % len as u64) as usize
}

/// How an expert participates in a token's forward pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertRole {
    /// Always-active shared expert
    Shared,
    /// Selected by the router for this token
    Routed,
    /// Not participating
    Inactive,
}

/// Active-expert accounting for one routed token
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationSummary {
    /// Routed experts
    pub routed: usize,
    /// Shared experts (always 1)
    pub shared: usize,
    /// Routed plus shared
    pub active: usize,
    /// Total experts in the layer
    pub total: usize,
    /// `active / total` (0.0 - 1.0)
    pub active_ratio: f64,
}

/// Routed experts for one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingResult {
    /// Selected experts, semantic picks first then scatter-fill
    pub experts: Vec<ExpertIndex>,
    /// Hash seed derived from the token text
    pub hash: u32,
    /// Primary semantic category, if any
    pub category: Option<SemanticCategory>,
    /// Expert count the token was routed against (after clamping)
    pub expert_count: usize,
}

impl RoutingResult {
    /// Number of routed experts
    pub fn len(&self) -> usize {
        self.experts.len()
    }

    /// True when nothing was routed (only with a routed count of 0)
    pub fn is_empty(&self) -> bool {
        self.experts.is_empty()
    }

    /// Check whether `expert` was routed
    pub fn contains(&self, expert: ExpertIndex) -> bool {
        self.experts.contains(&expert)
    }

    /// Iterate routed experts in selection order
    pub fn iter(&self) -> impl Iterator<Item = ExpertIndex> + '_ {
        self.experts.iter().copied()
    }

    /// Routed experts as an ordered set
    pub fn to_set(&self) -> BTreeSet<ExpertIndex> {
        self.experts.iter().copied().collect()
    }

    /// Role of `expert` for this token
    pub fn role_of(&self, expert: ExpertIndex) -> ExpertRole {
        if expert == SHARED_EXPERT_INDEX {
            ExpertRole::Shared
        } else if self.contains(expert) {
            ExpertRole::Routed
        } else {
            ExpertRole::Inactive
        }
    }

    /// Roles for every expert slot `0..expert_count`
    pub fn roles(&self) -> Vec<ExpertRole> {
        (0..self.expert_count).map(|e| self.role_of(e)).collect()
    }

    /// Active-expert accounting
    pub fn activation(&self) -> ActivationSummary {
        let routed = self.len();
        let active = routed + 1;
        ActivationSummary {
            routed,
            shared: 1,
            active,
            total: self.expert_count,
            active_ratio: active as f64 / self.expert_count as f64,
        }
    }
}

/// Deterministic token-to-expert router
///
/// Holds only configuration; routing is a pure function of the token text,
/// so one router can be shared freely across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExpertRouter {
    expert_count: usize,
    routed_count: usize,
    max_semantic: usize,
}

impl TokenExpertRouter {
    /// Create a router over `expert_count` experts selecting `routed_count` per token.
    ///
    /// `expert_count` is clamped to [`MAX_EXPERT_COUNT`]. Fails with
    /// [`RouterError::InvalidConfiguration`] when it is below 2.
    pub fn new(expert_count: usize, routed_count: usize) -> Result<Self> {
        if expert_count < MIN_EXPERT_COUNT {
            return Err(RouterError::InvalidConfiguration(format!(
                "expert_count must be at least {MIN_EXPERT_COUNT} (shared expert plus one routed), got {expert_count}"
            )));
        }
        if expert_count > MAX_EXPERT_COUNT {
            tracing::debug!("Clamping expert count {expert_count} to {MAX_EXPERT_COUNT}");
        }

        Ok(Self {
            expert_count: expert_count.min(MAX_EXPERT_COUNT),
            routed_count,
            max_semantic: DEFAULT_MAX_SEMANTIC,
        })
    }

    /// Create a router from routing configuration
    pub fn from_config(config: &RoutingConfig) -> Result<Self> {
        Ok(Self::new(config.expert_count, config.routed_count)?
            .with_max_semantic(config.max_semantic))
    }

    /// Limit how many semantic candidates enter the union.
    pub fn with_max_semantic(mut self, max_semantic: usize) -> Self {
        self.max_semantic = max_semantic;
        self
    }

    /// Expert count after clamping
    pub fn expert_count(&self) -> usize {
        self.expert_count
    }

    /// Requested routed count
    pub fn routed_count(&self) -> usize {
        self.routed_count
    }

    /// Semantic candidates admitted into the union
    pub fn max_semantic(&self) -> usize {
        self.max_semantic
    }

    /// Size every result will have: `min(routed_count, expert_count - 1)`
    pub fn effective_routed_count(&self) -> usize {
        self.routed_count.min(self.expert_count - 1)
    }

    /// Route a token's text to its experts.
    pub fn route(&self, text: &str) -> RoutingResult {
        let hash = token_hash(text);
        let pick = semantic_experts(text, hash);
        let target = self.effective_routed_count();
        let mut experts = Vec::with_capacity(target);

        for &expert in pick.experts.iter().take(self.max_semantic) {
            if experts.len() >= target {
                break;
            }
            if expert != SHARED_EXPERT_INDEX
                && expert < self.expert_count
                && !experts.contains(&expert)
            {
                experts.push(expert);
            }
        }

        if experts.len() < target {
            let mut pool: Vec<ExpertIndex> = (1..self.expert_count).collect();
            seeded_shuffle(&mut pool, hash);
            for expert in pool {
                if experts.len() >= target {
                    break;
                }
                if !experts.contains(&expert) {
                    experts.push(expert);
                }
            }
        }

        tracing::trace!(
            text,
            hash,
            category = ?pick.category,
            experts = ?experts,
            "Routed token"
        );

        RoutingResult {
            experts,
            hash,
            category: pick.category,
            expert_count: self.expert_count,
        }
    }

    /// Route a tokenized item
    pub fn route_token(&self, token: &Token) -> RoutingResult {
        self.route(&token.text)
    }
}

impl Default for TokenExpertRouter {
    fn default() -> Self {
        Self {
            expert_count: super::DEFAULT_EXPERT_COUNT,
            routed_count: super::DEFAULT_ROUTED_COUNT,
            max_semantic: DEFAULT_MAX_SEMANTIC,
        }
    }
}
