//! Folio Motion Core (host-agnostic)
//!
//! Scroll-driven presentation logic for the portfolio page: visibility
//! monitoring, count-up counters, skill bars, section reveal, plus the small
//! page affordances (theme, navigation, project filter, contact form,
//! back-to-top, keyboard focus). Nothing here touches a document; the engine
//! emits [`Outputs`] keyed by opaque element handles and adapters apply them.

pub mod bar;
pub mod config;
pub mod counter;
pub mod dispatch;
pub mod easing;
pub mod element;
pub mod engine;
pub mod error;
pub mod filter;
pub mod form;
pub mod format;
pub mod geometry;
pub mod ids;
pub mod nav;
pub mod outputs;
pub mod reveal;
pub mod scroll;
pub mod theme;
pub mod visibility;

// Re-exports for consumers (adapters)
pub use bar::{BarAnimator, BarState};
pub use config::{ClassNames, Config};
pub use counter::{parse_count, CounterAnimator, CounterFrame, CounterState};
pub use dispatch::{Dispatcher, Route};
pub use easing::{ease_out_cubic, eased_value, progress};
pub use element::{ElementSpec, ElementTable, ObservedElement, Role, TargetHandle};
pub use engine::{Engine, MonitorKind};
pub use error::{ConfigError, MotionError, StoreError};
pub use filter::{FilterButton, ProjectCard, ProjectFilter, FILTER_ALL};
pub use form::{ContactForm, Field, FieldError, FieldReport, SubmissionFlow, SubmitStatus};
pub use format::{CountFormat, NumberFormat};
pub use geometry::{visible_fraction, Rect};
pub use ids::{AnimationToken, ElementId, IdAllocator};
pub use nav::NavToggle;
pub use outputs::{Change, CoreEvent, Outputs};
pub use reveal::RevealController;
pub use scroll::{BackToTop, KeyboardFocus};
pub use theme::{MemoryStore, PreferenceStore, Theme, ThemePreference};
pub use visibility::{Notification, VisibilityMonitor};
