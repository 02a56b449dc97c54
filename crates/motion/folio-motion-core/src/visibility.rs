//! Visibility Monitor: per-element threshold crossing detection.
//!
//! Hosts feed visible fractions (from an intersection observer, or from
//! [`crate::geometry`] on scroll/resize) and receive a [`Notification`] only
//! when an element's intersecting state changes. The first report after
//! `observe` always notifies, matching an observer's initial callback.

use serde::{Deserialize, Serialize};

use crate::geometry::{visible_fraction, Rect};
use crate::ids::ElementId;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub element: ElementId,
    pub is_intersecting: bool,
    pub ratio: f64,
}

#[derive(Clone, Debug)]
struct Observation {
    element: ElementId,
    /// None until the first report.
    intersecting: Option<bool>,
}

#[derive(Debug)]
pub struct VisibilityMonitor {
    threshold: f32,
    running: bool,
    observed: Vec<Observation>,
}

impl VisibilityMonitor {
    /// New monitor, already running.
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            running: true,
            observed: Vec::new(),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Disconnect: stop reporting and forget every observation.
    /// Returns how many elements were being observed.
    pub fn stop(&mut self) -> usize {
        self.running = false;
        let dropped = self.observed.len();
        self.observed.clear();
        dropped
    }

    /// Register an element. Returns false if it was already observed.
    pub fn observe(&mut self, element: ElementId) -> bool {
        if self.is_observed(element) {
            return false;
        }
        self.observed.push(Observation {
            element,
            intersecting: None,
        });
        true
    }

    pub fn unobserve(&mut self, element: ElementId) -> bool {
        let before = self.observed.len();
        self.observed.retain(|o| o.element != element);
        before != self.observed.len()
    }

    pub fn is_observed(&self, element: ElementId) -> bool {
        self.observed.iter().any(|o| o.element == element)
    }

    pub fn observed(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.observed.iter().map(|o| o.element)
    }

    /// Whether `ratio` counts as intersecting for this monitor.
    #[inline]
    pub fn crosses(&self, ratio: f64) -> bool {
        if self.threshold <= 0.0 {
            ratio > 0.0
        } else {
            // compare at threshold precision so 0.15 counts for a 0.15 threshold
            ratio as f32 >= self.threshold
        }
    }

    /// Feed one visible fraction. Notifies on the first report and on every
    /// change of intersecting state; otherwise returns None.
    pub fn report(&mut self, element: ElementId, ratio: f64) -> Option<Notification> {
        if !self.running {
            return None;
        }
        let is_intersecting = self.crosses(ratio);
        let obs = self.observed.iter_mut().find(|o| o.element == element)?;
        if obs.intersecting == Some(is_intersecting) {
            return None;
        }
        obs.intersecting = Some(is_intersecting);
        Some(Notification {
            element,
            is_intersecting,
            ratio,
        })
    }

    /// Recompute every observed element against `viewport`, in registration
    /// order. Elements `rect_of` cannot place are skipped.
    pub fn recompute<F>(&mut self, viewport: &Rect, mut rect_of: F) -> Vec<Notification>
    where
        F: FnMut(ElementId) -> Option<Rect>,
    {
        if !self.running {
            return Vec::new();
        }
        let ids: Vec<ElementId> = self.observed().collect();
        ids.into_iter()
            .filter_map(|id| {
                let rect = rect_of(id)?;
                self.report(id, visible_fraction(&rect, viewport))
            })
            .collect()
    }
}
