//! Compiled user patterns with viable-prefix detection.
//!
//! A [`CompiledPattern`] is compiled once, at configuration time, into two
//! machines over the same pattern text:
//!
//! - a [`regex::Regex`] for scanning complete matches, and
//! - an anchored dense DFA for answering "could this suffix still grow into
//!   a match once more text arrives?".
//!
//! The second question is what makes a regex scan resumable across chunk
//! boundaries: the shortest suffix that is still a viable match prefix must
//! be withheld in the source buffer rather than released downstream.

use regex::Regex;
use regex_automata::{
    dfa::{dense, Automaton, StartKind},
    Anchored, Input,
};
use thiserror::Error;

/// Rejection of a user-supplied pattern at configuration time.
///
/// Raised only when a pattern is (re)configured; stream processing itself
/// never fails. On rejection the previously active pattern stays in effect.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern is not valid regex syntax.
    #[error("invalid pattern {pattern:?}: {source}")]
    Syntax {
        /// The offending pattern text.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: Box<regex::Error>,
    },
    /// The pattern compiled as a regex but is too large for the streaming DFA.
    #[error("pattern {pattern:?} is too large to compile for streaming")]
    TooComplex {
        /// The offending pattern text.
        pattern: String,
    },
    /// Empty patterns match at every offset and are rejected outright.
    #[error("empty patterns are not accepted")]
    Empty,
}

/// A user pattern compiled for chunk-boundary-safe streaming scans.
#[derive(Debug)]
pub struct CompiledPattern {
    pattern: String,
    regex: Regex,
    prefix_dfa: dense::DFA<Vec<u32>>,
}

impl CompiledPattern {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the pattern is empty, syntactically
    /// invalid, or too large for the streaming DFA.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let regex = Regex::new(pattern).map_err(|source| PatternError::Syntax {
            pattern: pattern.to_string(),
            source: Box::new(source),
        })?;

        let prefix_dfa = dense::Builder::new()
            .configure(dense::Config::new().start_kind(StartKind::Anchored))
            .build(pattern)
            .map_err(|_| PatternError::TooComplex {
                pattern: pattern.to_string(),
            })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            prefix_dfa,
        })
    }

    /// The original pattern text.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// The complete-match scanner.
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Character offset of the earliest suffix of `text` that is still a
    /// viable match prefix at end of input, or `None` if no suffix could
    /// extend into a future match.
    ///
    /// Everything before the returned offset is safe to release; the suffix
    /// from it onward must be withheld until more text arrives.
    pub fn partial_match_start(&self, text: &str) -> Option<usize> {
        let bytes = text.as_bytes();
        for (char_offset, (byte_offset, _)) in text.char_indices().enumerate() {
            if self.suffix_is_viable(&bytes[byte_offset..]) {
                return Some(char_offset);
            }
        }
        None
    }

    /// Walk the anchored DFA over `bytes`; the suffix is viable if the
    /// automaton is still alive at end of input.
    fn suffix_is_viable(&self, bytes: &[u8]) -> bool {
        let input = Input::new(bytes).anchored(Anchored::Yes);
        let Ok(mut state) = self.prefix_dfa.start_state_forward(&input) else {
            // Cannot determine viability: withhold conservatively.
            return true;
        };
        for &byte in bytes {
            state = self.prefix_dfa.next_state(state, byte);
            if self.prefix_dfa.is_dead_state(state) {
                return false;
            }
            if self.prefix_dfa.is_quit_state(state) {
                return true;
            }
        }
        true
    }
}
