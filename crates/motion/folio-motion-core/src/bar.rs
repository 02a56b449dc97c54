//! Bar Animator: skill-bar fill grows from zero to its captured width.
//!
//! The host stylesheet owns the visual transition; this module only decides
//! which width to write and when. The original width must be captured before
//! the bar is collapsed, otherwise the only width left to read is "0".

use hashbrown::HashMap;
use log::{debug, trace, warn};

use crate::ids::{AnimationToken, ElementId};

pub const COLLAPSED_WIDTH: &str = "0";

#[derive(Clone, Debug, Default)]
pub struct BarState {
    /// Width captured at load time; None when the fill had no inline width.
    pub original_width: Option<String>,
    /// Last width written to the element.
    pub current_width: String,
    /// Token of the most recent trigger.
    pub token: Option<AnimationToken>,
}

impl BarState {
    /// Width a trigger animates towards. Falls back to the current inline
    /// width, which after collapse is "0" and makes the animation a no-op.
    pub fn target_width(&self) -> &str {
        self.original_width
            .as_deref()
            .unwrap_or(self.current_width.as_str())
    }
}

#[derive(Clone, Debug)]
struct PendingWidth {
    element: ElementId,
    token: AnimationToken,
    due_ms: f64,
    width: String,
}

#[derive(Debug)]
pub struct BarAnimator {
    delay_ms: f64,
    bars: HashMap<ElementId, BarState>,
    pending: Vec<PendingWidth>,
}

impl BarAnimator {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            bars: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Record the bar's inline width and collapse it. Returns the width the
    /// host must write now.
    pub fn capture(&mut self, element: ElementId, inline_width: &str) -> &'static str {
        let trimmed = inline_width.trim();
        let original_width = (!trimmed.is_empty()).then(|| trimmed.to_string());
        if original_width.is_none() {
            warn!("bar {:?}: no inline width to capture", element);
        }
        self.bars.insert(
            element,
            BarState {
                original_width,
                current_width: COLLAPSED_WIDTH.to_string(),
                token: None,
            },
        );
        COLLAPSED_WIDTH
    }

    /// Reset the bar to zero and schedule the write of its target width
    /// `delay_ms` later. Returns the reset width, or None for an unknown bar.
    pub fn animate(
        &mut self,
        element: ElementId,
        token: AnimationToken,
        now_ms: f64,
    ) -> Option<&'static str> {
        let bar = self.bars.get_mut(&element)?;
        let width = bar.target_width().to_string();
        if bar.original_width.is_none() {
            debug!(
                "bar {:?}: no captured width, animating to current '{}'",
                element, width
            );
        }
        bar.token = Some(token);
        bar.current_width = COLLAPSED_WIDTH.to_string();
        self.pending.push(PendingWidth {
            element,
            token,
            due_ms: now_ms + self.delay_ms,
            width,
        });
        Some(COLLAPSED_WIDTH)
    }

    /// Pop every scheduled write due at `now_ms`. Writes whose token was
    /// superseded by a later trigger are dropped.
    pub fn due(&mut self, now_ms: f64) -> Vec<(ElementId, String)> {
        let mut ready = Vec::new();
        let mut keep = Vec::with_capacity(self.pending.len());
        for p in self.pending.drain(..) {
            if p.due_ms > now_ms {
                keep.push(p);
                continue;
            }
            match self.bars.get_mut(&p.element) {
                Some(bar) if bar.token == Some(p.token) => {
                    bar.current_width = p.width.clone();
                    ready.push((p.element, p.width));
                }
                _ => trace!("bar {:?}: dropping stale write {:?}", p.element, p.token),
            }
        }
        self.pending = keep;
        ready
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Earliest scheduled write, if any.
    pub fn next_due(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|p| p.due_ms)
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t))))
    }

    pub fn state(&self, element: ElementId) -> Option<&BarState> {
        self.bars.get(&element)
    }
}
