//! Frame-paced playback of token routing.
//!
//! Replaces a self-rescheduling animation loop with a plain iterator: each
//! [`Frame`] says which token is on screen and which experts it uses.
//! Routing happens once per token, on the first frame that shows it, and
//! the router itself stays stateless.
//!
//! ```text
//! frame:   0 ........ fpt ....... 2*fpt ... n*fpt ....... n*fpt + tail
//! token:   0          1           2         n-1 (held)
//! phase:   Processing ............................ Complete ..........
//! ```
//!
//! Pacing is left to the consumer: [`Frame::elapsed`] gives the scheduled
//! offset of each frame, and views decide whether to sleep.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::PlaybackConfig;
use crate::error::Result;
use crate::routing::{RoutingResult, TokenExpertRouter};
use crate::tokenizer::Token;

/// Where playback is in the token sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// A token is being routed
    Processing,
    /// All tokens routed; holding the last one
    Complete,
}

/// One animation frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame number from 0
    pub index: usize,
    /// Token on screen
    pub token_index: usize,
    /// Processing or complete
    pub phase: PlaybackPhase,
    /// Experts for the token on screen
    pub routing: Arc<RoutingResult>,
    /// True on the first frame of a token
    pub changed: bool,
    /// Scheduled offset from playback start
    pub elapsed: Duration,
}

/// Consumer of playback frames
///
/// Only [`on_frame`](RoutingView::on_frame) is required; the rest default
/// to no-ops so views implement just what they draw.
pub trait RoutingView {
    /// Called for every frame
    fn on_frame(&mut self, frame: &Frame);

    /// Called once per token, when it is first routed
    fn on_token(&mut self, _token: &Token, _routing: &RoutingResult) {}

    /// Called after the last frame
    fn on_complete(&mut self) {}

    /// Layer size changed
    fn set_expert_count(&mut self, _count: usize) {}

    /// Playback speed multiplier changed
    fn set_animation_speed(&mut self, _speed: f32) {}
}

/// Iterator over playback frames for a token sequence
pub struct Playback<'a> {
    router: &'a TokenExpertRouter,
    tokens: &'a [Token],
    frames_per_token: usize,
    total_frames: usize,
    interval: Duration,
    next_frame: usize,
    current: Option<(usize, Arc<RoutingResult>)>,
}

impl<'a> Playback<'a> {
    /// Create playback over the first `config.max_tokens` of `tokens`.
    ///
    /// Fails if `config.frames_per_token` is zero. An empty token slice
    /// yields no frames.
    pub fn new(
        router: &'a TokenExpertRouter,
        tokens: &'a [Token],
        config: &PlaybackConfig,
    ) -> Result<Self> {
        config.validate()?;

        let tokens = &tokens[..tokens.len().min(config.max_tokens)];
        let total_frames = if tokens.is_empty() {
            0
        } else {
            tokens.len() * config.frames_per_token + config.tail_frames + 1
        };

        Ok(Self {
            router,
            tokens,
            frames_per_token: config.frames_per_token,
            total_frames,
            interval: config.frame_interval(),
            next_frame: 0,
            current: None,
        })
    }

    /// Frames this playback produces in total
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Tokens being played
    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    /// Feed every remaining frame to `view`.
    pub fn drive<V: RoutingView + ?Sized>(mut self, view: &mut V) {
        view.set_expert_count(self.router.expert_count());
        let tokens = self.tokens;

        for frame in self.by_ref() {
            if frame.changed {
                view.on_token(&tokens[frame.token_index], &frame.routing);
            }
            view.on_frame(&frame);
        }

        view.on_complete();
    }

    fn routing_for(&mut self, token_index: usize) -> (Arc<RoutingResult>, bool) {
        if let Some((index, routing)) = &self.current {
            if *index == token_index {
                return (Arc::clone(routing), false);
            }
        }

        let routing = Arc::new(self.router.route_token(&self.tokens[token_index]));
        tracing::debug!(
            token = token_index,
            experts = ?routing.experts,
            "Playback advanced"
        );
        self.current = Some((token_index, Arc::clone(&routing)));
        (routing, true)
    }
}

impl Iterator for Playback<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.next_frame >= self.total_frames {
            return None;
        }

        let index = self.next_frame;
        self.next_frame += 1;

        let token_index = (index / self.frames_per_token).min(self.tokens.len() - 1);
        let (routing, changed) = self.routing_for(token_index);
        let phase = if index < self.tokens.len() * self.frames_per_token {
            PlaybackPhase::Processing
        } else {
            PlaybackPhase::Complete
        };

        Some(Frame {
            index,
            token_index,
            phase,
            routing,
            changed,
            elapsed: self.interval * index as u32,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_frames - self.next_frame;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Playback<'_> {}

/// One routed token in a trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    /// Token routed
    pub token: Token,
    /// Its experts
    pub routing: RoutingResult,
}

/// View that records each token's routing
#[derive(Debug, Default)]
pub struct TraceRecorder {
    /// Routed tokens in order
    pub entries: Vec<TraceEntry>,
    /// Frames seen
    pub frames: usize,
    /// Set once playback finished
    pub completed: bool,
}

impl TraceRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoutingView for TraceRecorder {
    fn on_frame(&mut self, _frame: &Frame) {
        self.frames += 1;
    }

    fn on_token(&mut self, token: &Token, routing: &RoutingResult) {
        self.entries.push(TraceEntry {
            token: token.clone(),
            routing: routing.clone(),
        });
    }

    fn on_complete(&mut self) {
        self.completed = true;
    }
}

/// Route every token directly, without frames.
pub fn route_all(router: &TokenExpertRouter, tokens: &[Token]) -> Vec<TraceEntry> {
    tokens
        .iter()
        .map(|token| TraceEntry {
            token: token.clone(),
            routing: router.route_token(token),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn small_config() -> PlaybackConfig {
        PlaybackConfig {
            frames_per_token: 4,
            tail_frames: 2,
            max_tokens: 21,
            frame_interval_ms: 10,
        }
    }

    #[test]
    fn test_frame_count() {
        let router = TokenExpertRouter::default();
        let tokens = tokenize("the quick fox");
        let playback = Playback::new(&router, &tokens, &small_config()).unwrap();
        // 3 tokens * 4 frames + 2 tail frames + final frame
        assert_eq!(playback.total_frames(), 15);
        assert_eq!(playback.len(), 15);
        assert_eq!(playback.count(), 15);
    }

    #[test]
    fn test_empty_tokens_yield_nothing() {
        let router = TokenExpertRouter::default();
        let mut playback = Playback::new(&router, &[], &small_config()).unwrap();
        assert!(playback.next().is_none());
    }

    #[test]
    fn test_first_token_routed_on_first_frame() {
        let router = TokenExpertRouter::default();
        let tokens = tokenize("the fox");
        let mut playback = Playback::new(&router, &tokens, &small_config()).unwrap();

        let first = playback.next().unwrap();
        assert!(first.changed);
        assert_eq!(first.token_index, 0);
        assert_eq!(*first.routing, router.route("the"));
    }

    #[test]
    fn test_token_progression_and_phase() {
        let router = TokenExpertRouter::default();
        let tokens = tokenize("a b");
        let frames: Vec<Frame> = Playback::new(&router, &tokens, &small_config())
            .unwrap()
            .collect();

        let token_indices: Vec<usize> = frames.iter().map(|f| f.token_index).collect();
        assert_eq!(token_indices, vec![0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1]);

        assert!(frames[..8]
            .iter()
            .all(|f| f.phase == PlaybackPhase::Processing));
        assert!(frames[8..].iter().all(|f| f.phase == PlaybackPhase::Complete));

        let changes: Vec<usize> = frames.iter().filter(|f| f.changed).map(|f| f.index).collect();
        assert_eq!(changes, vec![0, 4]);

        assert_eq!(frames[5].elapsed, Duration::from_millis(50));
    }

    #[test]
    fn test_plays_at_most_max_tokens() {
        let router = TokenExpertRouter::default();
        let tokens = tokenize("one two three four five");
        let config = PlaybackConfig {
            max_tokens: 2,
            ..small_config()
        };

        let playback = Playback::new(&router, &tokens, &config).unwrap();
        assert_eq!(playback.tokens().len(), 2);
        // 2 tokens * 4 frames + 2 tail frames + final frame
        assert_eq!(playback.total_frames(), 11);

        let mut recorder = TraceRecorder::new();
        playback.drive(&mut recorder);
        assert_eq!(recorder.entries, route_all(&router, &tokens[..2]));

        let none = PlaybackConfig {
            max_tokens: 0,
            ..small_config()
        };
        assert_eq!(Playback::new(&router, &tokens, &none).unwrap().count(), 0);
    }

    #[test]
    fn test_rejects_zero_frames_per_token() {
        let router = TokenExpertRouter::default();
        let tokens = tokenize("a");
        let config = PlaybackConfig {
            frames_per_token: 0,
            ..small_config()
        };
        assert!(Playback::new(&router, &tokens, &config).is_err());
    }

    #[test]
    fn test_drive_records_each_token_once() {
        let router = TokenExpertRouter::new(16, 4).unwrap();
        let tokens = tokenize("why does the code add numbers");
        let playback = Playback::new(&router, &tokens, &small_config()).unwrap();
        let total = playback.total_frames();

        let mut recorder = TraceRecorder::new();
        playback.drive(&mut recorder);

        assert!(recorder.completed);
        assert_eq!(recorder.frames, total);
        assert_eq!(recorder.entries, route_all(&router, &tokens));
    }

    struct FrameCounter {
        frames: usize,
        expert_count: Option<usize>,
    }

    impl RoutingView for FrameCounter {
        fn on_frame(&mut self, _frame: &Frame) {
            self.frames += 1;
        }

        fn set_expert_count(&mut self, count: usize) {
            self.expert_count = Some(count);
        }
    }

    #[test]
    fn test_view_defaults_are_noops() {
        let router = TokenExpertRouter::default();
        let tokens = tokenize("one");
        let mut view = FrameCounter {
            frames: 0,
            expert_count: None,
        };
        view.set_animation_speed(2.0);

        Playback::new(&router, &tokens, &small_config())
            .unwrap()
            .drive(&mut view);

        assert_eq!(view.frames, 7);
        assert_eq!(view.expert_count, Some(32));
    }
}
