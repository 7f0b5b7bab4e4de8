//! Speech dispatch for card taps.
//!
//! Interrupt policy: every request cancels whatever is being spoken, so at
//! most one utterance is active and rapid taps speak only the latest label.

use crate::config::CoreConfig;
use log::debug;

/// Text-to-speech capability provided by the host platform.
pub trait SpeechEngine {
    /// Stops any in-flight utterance. Must be a no-op when idle.
    fn cancel(&self);
    fn speak(&self, text: &str, rate: f32);
}

pub struct SpeechDispatcher<E: SpeechEngine> {
    engine: E,
    rate: f32,
    edit_mode: bool,
}

impl<E: SpeechEngine> SpeechDispatcher<E> {
    pub fn new(engine: E, rate: f32) -> Self {
        Self {
            engine,
            rate,
            edit_mode: false,
        }
    }

    pub fn from_config(engine: E, config: &CoreConfig) -> Self {
        Self::new(engine, config.speech.rate)
    }

    /// While editing, taps rearrange or delete cards instead of speaking.
    pub fn set_edit_mode(&mut self, editing: bool) {
        self.edit_mode = editing;
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Speaks `text`, interrupting any current utterance.
    ///
    /// Returns `false` when suppressed by edit mode or when `text` is blank
    /// (empty or whitespace only). A blank label has nothing audible to say,
    /// so the engine is left alone and any current utterance keeps playing.
    pub fn speak(&self, text: &str) -> bool {
        if self.edit_mode {
            return false;
        }
        if text.trim().is_empty() {
            debug!("event=speech_dispatch module=speech status=skipped reason=blank_text");
            return false;
        }
        self.engine.cancel();
        self.engine.speak(text, self.rate);
        debug!("event=speech_dispatch module=speech status=ok chars={}", text.chars().count());
        true
    }
}
