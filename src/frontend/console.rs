//! Terminal front-end.
//!
//! Renders the menu and gallery as plain text and reads one command per
//! line. Closing the window cancels a [`CancellationToken`] that the control
//! loop watches.

use std::fmt::Write as _;
use std::io::Write;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::catalog::GameCatalog;
use crate::config::MessagesConfig;
use crate::frontend::{Frontend, Notice, Screen};
use crate::navigation::{KioskEvent, Route};
use crate::orchestrator::watchdog::{Alert, Alerter};

/// Help line printed under every screen.
pub const HELP: &str =
    "[up/k] previous  [down/j] next  [enter] play  [1-9] select  [menu] back  [q] quit";

/// Text front-end writing to stdout or any other writer.
pub struct ConsoleFrontend {
    messages: MessagesConfig,
    window: CancellationToken,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleFrontend {
    /// Front-end printing to stdout.
    #[must_use]
    pub fn new(messages: MessagesConfig, window: CancellationToken) -> Self {
        Self::with_writer(messages, window, Box::new(std::io::stdout()))
    }

    /// Front-end printing to `out`.
    #[must_use]
    pub fn with_writer(
        messages: MessagesConfig,
        window: CancellationToken,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            messages,
            window,
            out: Mutex::new(out),
        }
    }

    /// Token cancelled when the window closes.
    #[must_use]
    pub fn window(&self) -> &CancellationToken {
        &self.window
    }

    fn emit(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{text}");
            let _ = out.flush();
        }
    }
}

impl Alerter for ConsoleFrontend {
    fn alert(&self, alert: Alert) {
        let text = match alert {
            Alert::Warning { .. } => format!("!! WARNING: {}", self.messages.warning),
            Alert::Expired { .. } => format!("!! TIME UP: {}", self.messages.expired),
        };
        self.emit(&text);
    }
}

impl Frontend for ConsoleFrontend {
    fn render(&self, screen: &Screen<'_>) {
        let text = match screen {
            Screen::Menu => render_menu(&self.messages.title),
            Screen::Gallery { catalog, selected } => render_gallery(catalog, *selected),
        };
        self.emit(&text);
    }

    fn notice(&self, notice: &Notice) {
        self.emit(&format_notice(notice));
    }

    fn close(&self) {
        self.window.cancel();
    }
}

/// Title screen text.
#[must_use]
pub fn render_menu(title: &str) -> String {
    format!("\n==== {title} ====\n\n  press [enter] to start\n")
}

/// Gallery listing with the selected row marked and its details below.
#[must_use]
pub fn render_gallery(catalog: &GameCatalog, selected: usize) -> String {
    let mut text = String::from("\n---- games ----\n");
    for game in catalog.games() {
        let marker = if game.index == selected { '>' } else { ' ' };
        let _ = writeln!(
            text,
            "{marker} {}. {} (by {})",
            game.index + 1,
            game.title,
            game.author
        );
    }

    if let Some(game) = catalog.get(selected) {
        let _ = writeln!(text, "\n{}\n{}", game.title, game.description);
        if let Some(shot) = &game.screenshot {
            let _ = writeln!(text, "screenshot: {}", shot.display());
        }
    }
    text.push_str(HELP);
    text
}

/// One-line notice text.
#[must_use]
pub fn format_notice(notice: &Notice) -> String {
    match notice {
        Notice::Launched { title } => format!("** starting {title}"),
        Notice::AlreadyRunning { title } => {
            format!("** {title} is already running; close it before starting another game")
        }
        Notice::LaunchFailed { title, reason } => {
            format!("** {title} could not be started: {reason}")
        }
    }
}

/// Map one line of terminal input to an event.
#[must_use]
pub fn parse_input(line: &str) -> Option<KioskEvent> {
    let command = line.trim().to_ascii_lowercase();
    match command.as_str() {
        "" | "enter" | "play" | "p" => Some(KioskEvent::Play),
        "up" | "k" | "w" | "prev" => Some(KioskEvent::Previous),
        "down" | "j" | "s" | "next" => Some(KioskEvent::Next),
        "menu" | "back" | "esc" | "b" => Some(KioskEvent::Navigate(Route::Menu)),
        "q" | "quit" | "exit" | "close" => Some(KioskEvent::Close),
        other if other.starts_with('/') => Route::parse(other).map(KioskEvent::Navigate),
        other => other
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .map(KioskEvent::Select),
    }
}
