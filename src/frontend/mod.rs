//! Front-end abstraction.
//!
//! Everything the attendee sees goes through [`Frontend`]: screens, modal
//! notices, watchdog alerts and the window itself. The crate ships a
//! terminal implementation in [`console`]; a graphical shell implements
//! the same trait and marshals each call onto its UI thread.

pub mod console;

use crate::catalog::GameCatalog;
use crate::orchestrator::watchdog::Alerter;

/// What the front-end should currently display.
#[derive(Debug, Clone, Copy)]
pub enum Screen<'a> {
    /// Title screen with the start button.
    Menu,
    /// Gallery list with one game highlighted.
    Gallery {
        /// Games to list.
        catalog: &'a GameCatalog,
        /// Highlighted index.
        selected: usize,
    },
}

/// Modal notice triggered by an attendee action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A game was started.
    Launched {
        /// Title of the started game.
        title: String,
    },
    /// Play was pressed while another game is still running.
    AlreadyRunning {
        /// Title of the game that is running.
        title: String,
    },
    /// The game executable could not be started.
    LaunchFailed {
        /// Title of the game that failed.
        title: String,
        /// Underlying error text.
        reason: String,
    },
}

/// Presentation surface of the kiosk.
pub trait Frontend: Alerter {
    /// Redraw for `screen`.
    fn render(&self, screen: &Screen<'_>);

    /// Show `notice` to the attendee.
    fn notice(&self, notice: &Notice);

    /// Destroy the kiosk window. Must be safe to call more than once.
    fn close(&self);
}
