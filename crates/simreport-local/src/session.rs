//! Comparison session state.
//!
//! One explicit state value with named transitions, replacing ad-hoc flag
//! juggling around the request lifecycle. At most one comparison is in flight;
//! starting a new one cancels the previous token and bumps a generation
//! counter, and completions are applied only when their generation still
//! matches, so a stale response can never overwrite newer state.

use simreport_core::{word_count, Error, Mode, Report, Result, MAX_COMPARE_WORDS};
use tokio_util::sync::CancellationToken;

/// Which comparison input a transition targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    A,
    B,
}

#[derive(Debug)]
pub struct Session {
    pub content_a: String,
    pub content_b: String,
    pub mode: Mode,
    pub report: Option<Report>,
    pub error: Option<String>,
    /// Set when the last `set_input` was rejected for exceeding the word cap.
    pub limit_exceeded: bool,
    pub busy: bool,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Mode::Text)
    }
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            content_a: String::new(),
            content_b: String::new(),
            mode,
            report: None,
            error: None,
            limit_exceeded: false,
            busy: false,
            generation: 0,
            cancel: None,
        }
    }

    /// Update one input. Over-limit text is rejected outright: the stored
    /// content stays unchanged and the limit flag is raised instead.
    pub fn set_input(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if word_count(&value) > MAX_COMPARE_WORDS {
            self.limit_exceeded = true;
            return;
        }
        self.limit_exceeded = false;
        match field {
            Field::A => self.content_a = value,
            Field::B => self.content_b = value,
        }
    }

    /// Switch between text and code mode. Any displayed result belongs to the
    /// old mode, so it is cleared.
    pub fn switch_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            self.mode = mode;
            self.report = None;
            self.error = None;
        }
    }

    /// Begin a new comparison: cancel whatever was in flight, advance the
    /// generation, and hand back the token and generation the caller must use
    /// when running the request and delivering its outcome.
    pub fn start_comparison(&mut self) -> (u64, CancellationToken) {
        if let Some(prev) = self.cancel.take() {
            prev.cancel();
        }
        self.generation += 1;
        self.error = None;
        self.busy = true;
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        (self.generation, token)
    }

    /// Apply a finished comparison. Outcomes from superseded generations are
    /// discarded; cancellation is swallowed silently.
    pub fn receive_result(&mut self, generation: u64, outcome: Result<Report>) {
        if generation != self.generation {
            return;
        }
        self.busy = false;
        self.cancel = None;
        match outcome {
            Ok(report) => self.report = Some(report),
            Err(Error::Cancelled) => {}
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Abort the in-flight comparison, if any. No error is recorded.
    ///
    /// Advancing the generation here is what discards a reply that raced the
    /// token: the backend may have produced an `Ok` just before the token
    /// fired, and that reply must never reach displayed state.
    pub fn cancel(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.generation += 1;
        self.busy = false;
    }

    /// Clear everything back to a fresh session in the current mode. The
    /// generation counter survives so pre-reset requests stay stale.
    pub fn reset(&mut self) {
        self.cancel();
        let mode = self.mode;
        let generation = self.generation;
        *self = Self::new(mode);
        self.generation = generation;
    }
}
