//! Navigation layer: turns attendee input into supervisor calls.

pub mod controller;
pub mod route;

pub use controller::NavigationController;
pub use route::Route;

/// Discrete input event from the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskEvent {
    /// Arrow down: next game, wrapping to the first.
    Next,
    /// Arrow up: previous game, wrapping to the last.
    Previous,
    /// Click on a gallery entry.
    Select(usize),
    /// Enter or the "Play" button.
    Play,
    /// Route change requested by the front-end.
    Navigate(Route),
    /// The window is being closed.
    Close,
}
