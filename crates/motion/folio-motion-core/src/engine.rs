//! Engine: owns the two visibility monitors, the animators and the reveal
//! controller, and turns host observations into [`Outputs`].
//!
//! Methods:
//! - new, observe_* (register elements), start/stop (monitor lifetime)
//! - report / recompute (visibility input), tick (frame input), drain_outputs

use hashbrown::HashMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::bar::BarAnimator;
use crate::config::Config;
use crate::counter::{parse_count, CounterAnimator};
use crate::dispatch::{Dispatcher, Route};
use crate::element::{ElementSpec, ElementTable, ObservedElement, Role};
use crate::error::MotionError;
use crate::format::{CountFormat, NumberFormat};
use crate::geometry::Rect;
use crate::ids::{AnimationToken, ElementId, IdAllocator};
use crate::outputs::{Change, CoreEvent, Outputs};
use crate::reveal::RevealController;
use crate::visibility::{Notification, VisibilityMonitor};

/// Which of the two independently configured monitors a report belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorKind {
    /// Counters and bars (`dispatch_threshold`).
    Dispatch,
    /// Sections and project cards (`reveal_threshold`).
    Reveal,
}

impl MonitorKind {
    fn watches(self, role: Role) -> bool {
        match self {
            MonitorKind::Dispatch => matches!(role, Role::Counter | Role::Bar),
            MonitorKind::Reveal => role == Role::Section,
        }
    }
}

/// A pending "next paint" callback for one counter run.
#[derive(Copy, Clone, Debug)]
struct FrameRequest {
    element: ElementId,
    token: AnimationToken,
}

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    elements: ElementTable,

    dispatch_monitor: VisibilityMonitor,
    reveal_monitor: VisibilityMonitor,
    dispatcher: Dispatcher,

    counters: CounterAnimator,
    counter_targets: HashMap<ElementId, u64>,
    bars: BarAnimator,
    reveal: RevealController,

    frames: Vec<FrameRequest>,
    outputs: Outputs,
}

impl Engine {
    /// Create a new engine with the given config. Monitors start running.
    /// Counter text is grouped with `cfg.grouping_separator`.
    pub fn new(cfg: Config) -> Result<Self, MotionError> {
        let format = NumberFormat::new(cfg.grouping_separator.clone());
        Self::with_format(cfg, format)
    }

    /// Like [`Engine::new`], rendering counter text with `format`.
    pub fn with_format(
        cfg: Config,
        format: impl CountFormat + 'static,
    ) -> Result<Self, MotionError> {
        cfg.validate()?;
        Ok(Self {
            ids: IdAllocator::new(),
            elements: ElementTable::new(),
            dispatch_monitor: VisibilityMonitor::new(cfg.dispatch_threshold),
            reveal_monitor: VisibilityMonitor::new(cfg.reveal_threshold),
            dispatcher: Dispatcher,
            counters: CounterAnimator::new(cfg.counter_duration_ms, format),
            counter_targets: HashMap::new(),
            bars: BarAnimator::new(cfg.bar_delay_ms),
            reveal: RevealController::new(
                cfg.classes.reveal.clone(),
                cfg.classes.revealed.clone(),
            ),
            frames: Vec::new(),
            outputs: Outputs::default(),
            cfg,
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn elements(&self) -> &ElementTable {
        &self.elements
    }

    pub fn element_id(&self, handle: &str, role: Role) -> Option<ElementId> {
        self.elements.find(handle, role).map(|r| r.id)
    }

    /// Register an element described by the host.
    pub fn observe(&mut self, spec: ElementSpec) -> Result<ElementId, MotionError> {
        match spec.role {
            Role::Counter => self.observe_counter(&spec.handle, spec.count.as_deref()),
            Role::Bar => self.observe_bar(&spec.handle, spec.width.as_deref().unwrap_or("")),
            Role::Section => self.observe_section(&spec.handle),
        }
    }

    /// Register a counter. `count` is the raw `data-count` attribute.
    pub fn observe_counter(
        &mut self,
        handle: &str,
        count: Option<&str>,
    ) -> Result<ElementId, MotionError> {
        let id = self.register(handle, Role::Counter)?;
        self.counter_targets.insert(id, parse_count(count));
        self.dispatch_monitor.observe(id);
        Ok(id)
    }

    /// Register a skill bar: capture its inline width, then collapse it.
    pub fn observe_bar(
        &mut self,
        handle: &str,
        inline_width: &str,
    ) -> Result<ElementId, MotionError> {
        let id = self.register(handle, Role::Bar)?;
        let collapsed = self.bars.capture(id, inline_width);
        self.outputs.push_change(Change::Width {
            handle: handle.to_string(),
            width: collapsed.to_string(),
        });
        self.dispatch_monitor.observe(id);
        Ok(id)
    }

    /// Register a section or project card for reveal.
    pub fn observe_section(&mut self, handle: &str) -> Result<ElementId, MotionError> {
        let id = self.register(handle, Role::Section)?;
        self.outputs.push_change(self.reveal.prepare(handle));
        self.reveal_monitor.observe(id);
        Ok(id)
    }

    fn register(&mut self, handle: &str, role: Role) -> Result<ElementId, MotionError> {
        if self.elements.find(handle, role).is_some() {
            return Err(MotionError::DuplicateHandle {
                handle: handle.to_string(),
                role: role.as_str(),
            });
        }
        let id = self.ids.alloc_element();
        self.elements.insert(ObservedElement {
            id,
            handle: handle.to_string(),
            role,
        });
        debug!("observing '{handle}' as {} ({:?})", role.as_str(), id);
        Ok(id)
    }

    /// (Re)attach both monitors to every registered element.
    pub fn start(&mut self) {
        self.dispatch_monitor.start();
        self.reveal_monitor.start();
        for row in self.elements.iter() {
            if MonitorKind::Dispatch.watches(row.role) {
                self.dispatch_monitor.observe(row.id);
            } else {
                self.reveal_monitor.observe(row.id);
            }
        }
    }

    /// Disconnect both monitors. Registered elements and running animations
    /// are kept; no new notifications arrive until `start`.
    pub fn stop(&mut self) {
        let dropped = self.dispatch_monitor.stop() + self.reveal_monitor.stop();
        debug!("monitors stopped, {dropped} observations dropped");
    }

    pub fn is_running(&self) -> bool {
        self.dispatch_monitor.is_running() && self.reveal_monitor.is_running()
    }

    fn monitor_mut(&mut self, kind: MonitorKind) -> &mut VisibilityMonitor {
        match kind {
            MonitorKind::Dispatch => &mut self.dispatch_monitor,
            MonitorKind::Reveal => &mut self.reveal_monitor,
        }
    }

    /// Feed one visible fraction for `handle` to the `kind` monitor.
    pub fn report(
        &mut self,
        kind: MonitorKind,
        handle: &str,
        ratio: f64,
        now_ms: f64,
    ) -> Result<(), MotionError> {
        let ids: Vec<ElementId> = self
            .elements
            .by_handle(handle)
            .filter(|r| kind.watches(r.role))
            .map(|r| r.id)
            .collect();
        if ids.is_empty() {
            return Err(MotionError::UnknownHandle {
                handle: handle.to_string(),
            });
        }
        for id in ids {
            if let Some(n) = self.monitor_mut(kind).report(id, ratio) {
                self.on_notification(kind, n, now_ms);
            }
        }
        Ok(())
    }

    /// Recompute both monitors after a scroll or resize. `rect_of` maps a
    /// handle to its rect in viewport coordinates.
    pub fn recompute<F>(&mut self, viewport: &Rect, mut rect_of: F, now_ms: f64)
    where
        F: FnMut(&str) -> Option<Rect>,
    {
        for kind in [MonitorKind::Dispatch, MonitorKind::Reveal] {
            let elements = &self.elements;
            let monitor = match kind {
                MonitorKind::Dispatch => &mut self.dispatch_monitor,
                MonitorKind::Reveal => &mut self.reveal_monitor,
            };
            let notes =
                monitor.recompute(viewport, |id| rect_of(elements.get(id)?.handle.as_str()));
            for n in notes {
                self.on_notification(kind, n, now_ms);
            }
        }
    }

    fn on_notification(&mut self, kind: MonitorKind, n: Notification, now_ms: f64) {
        let Some(row) = self.elements.get(n.element).cloned() else {
            return;
        };
        trace!(
            "{:?} monitor: '{}' intersecting={} ratio={:.3}",
            kind,
            row.handle,
            n.is_intersecting,
            n.ratio
        );
        match kind {
            MonitorKind::Reveal => {
                let change = self.reveal.apply(&n, row.handle);
                self.outputs.push_change(change);
                self.outputs.push_event(CoreEvent::RevealChanged {
                    element: n.element,
                    revealed: n.is_intersecting,
                });
            }
            MonitorKind::Dispatch => match self.dispatcher.route(row.role, &n) {
                Some(Route::Counter) => self.start_counter(&row, now_ms),
                Some(Route::Bar) => self.start_bar(&row, now_ms),
                None => {}
            },
        }
    }

    fn start_counter(&mut self, row: &ObservedElement, now_ms: f64) {
        let token = self.ids.alloc_token();
        let target = self.counter_targets.get(&row.id).copied().unwrap_or(0);
        if let Some(prev) = self.counters.trigger(row.id, target, now_ms, token) {
            debug!("counter '{}' restarted, {:?} superseded", row.handle, prev);
        }
        self.frames.push(FrameRequest {
            element: row.id,
            token,
        });
        self.outputs.push_event(CoreEvent::CounterStarted {
            element: row.id,
            target,
        });
    }

    fn start_bar(&mut self, row: &ObservedElement, now_ms: f64) {
        let token = self.ids.alloc_token();
        let width = self
            .bars
            .state(row.id)
            .map(|b| b.target_width().to_string())
            .unwrap_or_default();
        if let Some(reset) = self.bars.animate(row.id, token, now_ms) {
            self.outputs.push_change(Change::Width {
                handle: row.handle.clone(),
                width: reset.to_string(),
            });
            self.outputs.push_event(CoreEvent::BarScheduled {
                element: row.id,
                width,
            });
        }
    }

    /// Run one display frame at `now_ms`: advance counters, flush due bar
    /// widths, and return everything produced since the last drain.
    pub fn tick(&mut self, now_ms: f64) -> Outputs {
        let frames = std::mem::take(&mut self.frames);
        for req in frames {
            let Some(handle) = self.elements.get(req.element).map(|r| r.handle.clone()) else {
                continue;
            };
            match self.counters.frame(req.element, req.token, now_ms) {
                Some(frame) => {
                    self.outputs.push_change(Change::Text {
                        handle,
                        text: frame.text,
                    });
                    if frame.done {
                        self.outputs.push_event(CoreEvent::CounterFinished {
                            element: req.element,
                            target: frame.value,
                        });
                    } else {
                        self.frames.push(req);
                    }
                }
                None => self.outputs.push_event(CoreEvent::StaleDropped {
                    element: req.element,
                }),
            }
        }

        for (id, width) in self.bars.due(now_ms) {
            let Some(row) = self.elements.get(id) else {
                continue;
            };
            self.outputs.push_change(Change::Width {
                handle: row.handle.clone(),
                width: width.clone(),
            });
            self.outputs
                .push_event(CoreEvent::BarSettled { element: id, width });
        }

        self.drain_outputs()
    }

    /// Take every change and event produced since the last drain.
    pub fn drain_outputs(&mut self) -> Outputs {
        std::mem::take(&mut self.outputs)
    }

    /// True while a counter needs another frame or a bar write is pending.
    pub fn wants_frame(&self) -> bool {
        !self.frames.is_empty() || self.bars.has_pending()
    }

    pub fn is_revealed(&self, handle: &str) -> bool {
        self.element_id(handle, Role::Section)
            .map(|id| self.reveal.is_revealed(id))
            .unwrap_or(false)
    }

    pub fn counter_running(&self, handle: &str) -> bool {
        self.element_id(handle, Role::Counter)
            .map(|id| self.counters.is_running(id))
            .unwrap_or(false)
    }

    /// Current width of a bar as last written by the engine.
    pub fn bar_width(&self, handle: &str) -> Option<&str> {
        let id = self.element_id(handle, Role::Bar)?;
        self.bars.state(id).map(|b| b.current_width.as_str())
    }
}
