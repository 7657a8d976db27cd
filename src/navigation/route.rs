//! Kiosk routes: the main menu (`/`) and one gallery view per game
//! (`/games/<index>`).

use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

use regex::Regex;

/// Screen the kiosk is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Title screen; no watchdog and no game running.
    Menu,
    /// Gallery with the given game selected.
    Game(usize),
}

impl Route {
    /// Parse a route path. Unknown paths yield `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        if path == "/" || path.is_empty() {
            return Some(Self::Menu);
        }
        let captures = game_route()?.captures(path)?;
        captures.get(1)?.as_str().parse().ok().map(Self::Game)
    }

    /// Whether this is a gallery view.
    #[must_use]
    pub fn is_game(self) -> bool {
        matches!(self, Self::Game(_))
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Menu => write!(f, "/"),
            Self::Game(index) => write!(f, "/games/{index}"),
        }
    }
}

fn game_route() -> Option<&'static Regex> {
    static GAME_ROUTE: OnceLock<Option<Regex>> = OnceLock::new();
    GAME_ROUTE
        .get_or_init(|| Regex::new(r"^/games/(\d+)/?$").ok())
        .as_ref()
}
