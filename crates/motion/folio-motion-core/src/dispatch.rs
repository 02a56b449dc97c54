//! Animation Dispatcher: picks the animator for a visible element by role.

use crate::element::Role;
use crate::visibility::Notification;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Route {
    Counter,
    Bar,
}

/// Stateless router. Only entering notifications start an animation; leaving
/// the viewport never cancels one.
#[derive(Copy, Clone, Debug, Default)]
pub struct Dispatcher;

impl Dispatcher {
    pub fn route(&self, role: Role, n: &Notification) -> Option<Route> {
        if !n.is_intersecting {
            return None;
        }
        match role {
            Role::Counter => Some(Route::Counter),
            Role::Bar => Some(Route::Bar),
            Role::Section => None,
        }
    }
}
