//! Counter Animator: eased count-up from 0 to a `data-count` target.
//!
//! One run per element. A run is advanced by frame requests stamped with the
//! run's token; requests carrying an older token are ignored, so re-triggering
//! restarts the progression instead of interleaving two of them.

use hashbrown::HashMap;
use log::{debug, trace};

use crate::easing::{ease_out_cubic, eased_value, progress};
use crate::format::CountFormat;
use crate::ids::{AnimationToken, ElementId};

/// Largest integer a JS number holds exactly.
const MAX_COUNT: u64 = 9_007_199_254_740_991;

/// Parse a `data-count` attribute the way a JS `Number()` cast reads it.
/// Absent, empty, negative, non-finite or non-numeric input coerces to 0;
/// fractions are truncated; `0x`, `0o` and `0b` integer literals are accepted.
pub fn parse_count(raw: Option<&str>) -> u64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    if let Some(value) = parse_prefixed(raw) {
        return value;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => (v.trunc() as u64).min(MAX_COUNT),
        _ => 0,
    }
}

/// Radix-prefixed integer literal. Some(0) for a prefix with bad digits.
fn parse_prefixed(raw: &str) -> Option<u64> {
    let radix = match raw.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &raw[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(0);
    }
    Some(
        u64::from_str_radix(digits, radix)
            .map_or(MAX_COUNT, |v| v.min(MAX_COUNT)),
    )
}

#[derive(Clone, Debug)]
pub struct CounterState {
    pub target: u64,
    pub start_ms: f64,
    pub token: AnimationToken,
}

/// Result of advancing one run by one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CounterFrame {
    pub value: u64,
    pub text: String,
    /// True on the final frame; no further frames should be requested.
    pub done: bool,
}

#[derive(Debug)]
pub struct CounterAnimator {
    duration_ms: f64,
    format: Box<dyn CountFormat>,
    runs: HashMap<ElementId, CounterState>,
}

impl CounterAnimator {
    pub fn new(duration_ms: f64, format: impl CountFormat + 'static) -> Self {
        Self {
            duration_ms,
            format: Box::new(format),
            runs: HashMap::new(),
        }
    }

    /// Start (or restart) a run. Returns the token of a run this one replaced.
    pub fn trigger(
        &mut self,
        element: ElementId,
        target: u64,
        now_ms: f64,
        token: AnimationToken,
    ) -> Option<AnimationToken> {
        debug!("counter {:?}: count to {target} (token {:?})", element, token);
        self.runs
            .insert(
                element,
                CounterState {
                    target,
                    start_ms: now_ms,
                    token,
                },
            )
            .map(|prev| prev.token)
    }

    /// Advance the run for `element` if `token` is still current.
    pub fn frame(
        &mut self,
        element: ElementId,
        token: AnimationToken,
        now_ms: f64,
    ) -> Option<CounterFrame> {
        let run = self.runs.get(&element)?;
        if run.token != token {
            trace!("counter {:?}: dropping stale frame {:?}", element, token);
            return None;
        }
        let p = progress(now_ms - run.start_ms, self.duration_ms);
        let value = eased_value(run.target, ease_out_cubic(p));
        let done = p >= 1.0;
        let frame = CounterFrame {
            value,
            text: self.format.format(value),
            done,
        };
        if done {
            self.runs.remove(&element);
        }
        Some(frame)
    }

    pub fn is_running(&self, element: ElementId) -> bool {
        self.runs.contains_key(&element)
    }
}
