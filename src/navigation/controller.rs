//! Navigation controller.
//!
//! Owns the catalog, the current selection and the current route. Entering
//! a gallery view arms the station watchdog; going back to the menu cancels
//! it and stops the running game; closing the window tears everything down.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::catalog::GameCatalog;
use crate::frontend::{Frontend, Notice, Screen};
use crate::models::game::Game;
use crate::navigation::{KioskEvent, Route};
use crate::orchestrator::supervisor::SessionSupervisor;
use crate::{AppError, Result};

/// Maps attendee input onto the session supervisor.
pub struct NavigationController {
    catalog: GameCatalog,
    selected: usize,
    route: Route,
    closed: bool,
    supervisor: Arc<SessionSupervisor>,
    frontend: Arc<dyn Frontend>,
}

impl NavigationController {
    /// Create a controller on the main menu.
    ///
    /// # Errors
    ///
    /// Returns `AppError::EmptyCatalog` if `catalog` has no games.
    pub fn new(
        catalog: GameCatalog,
        supervisor: Arc<SessionSupervisor>,
        frontend: Arc<dyn Frontend>,
    ) -> Result<Self> {
        if catalog.is_empty() {
            return Err(AppError::EmptyCatalog("no games installed".into()));
        }
        Ok(Self {
            catalog,
            selected: 0,
            route: Route::Menu,
            closed: false,
            supervisor,
            frontend,
        })
    }

    /// Current route.
    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    /// Index of the highlighted game.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Highlighted game.
    #[must_use]
    pub fn selected_game(&self) -> Option<&Game> {
        self.catalog.get(self.selected)
    }

    /// Catalog being shown.
    #[must_use]
    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    /// Whether the window has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Draw the current route.
    pub fn render(&self) {
        let screen = match self.route {
            Route::Menu => Screen::Menu,
            Route::Game(_) => Screen::Gallery {
                catalog: &self.catalog,
                selected: self.selected,
            },
        };
        self.frontend.render(&screen);
    }

    /// Dispatch one input event.
    ///
    /// # Errors
    ///
    /// Propagates unexpected supervisor errors. Rejected launches and
    /// termination failures are reported to the attendee or logged instead.
    pub async fn handle(&mut self, event: KioskEvent) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        match event {
            KioskEvent::Next => self.step(1).await,
            KioskEvent::Previous => self.step(-1).await,
            KioskEvent::Select(index) => self.navigate(Route::Game(index)).await,
            KioskEvent::Play => match self.route {
                Route::Menu => self.navigate(Route::Game(0)).await,
                Route::Game(_) => self.play().await?,
            },
            KioskEvent::Navigate(route) => self.navigate(route).await,
            KioskEvent::Close => self.close().await,
        }
        Ok(())
    }

    /// Switch to `route`.
    pub async fn navigate(&mut self, route: Route) {
        match route {
            Route::Menu => {
                if let Err(err) = self.supervisor.end_session().await {
                    error!(%err, "failed to stop game on return to menu");
                }
                self.route = Route::Menu;
                info!("returned to main menu");
            }
            Route::Game(index) => {
                if index >= self.catalog.len() {
                    warn!(index, count = self.catalog.len(), "ignoring selection outside catalog");
                    return;
                }
                self.selected = index;
                self.route = route;
                self.supervisor.ensure_watchdog().await;
            }
        }
        self.render();
    }

    /// Launch the highlighted game, reporting rejections to the attendee.
    ///
    /// # Errors
    ///
    /// Only errors other than `AlreadyRunning` and `Spawn` are returned.
    pub async fn play(&mut self) -> Result<()> {
        let Some(game) = self.selected_game().cloned() else {
            return Ok(());
        };

        match self.supervisor.start(&game).await {
            Ok(session) => {
                info!(session_id = %session.id, title = %session.title, "game launched");
                self.frontend.notice(&Notice::Launched { title: game.title });
                Ok(())
            }
            Err(AppError::AlreadyRunning(running)) => {
                self.frontend
                    .notice(&Notice::AlreadyRunning { title: running });
                Ok(())
            }
            Err(AppError::Spawn(reason)) => {
                error!(title = %game.title, %reason, "game failed to launch");
                self.frontend.notice(&Notice::LaunchFailed {
                    title: game.title,
                    reason,
                });
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Stop the game, cancel the watchdog and close the window.
    pub async fn close(&mut self) {
        if let Err(err) = self.supervisor.stop().await {
            error!(%err, "failed to stop game while closing");
        }
        self.supervisor.cancel_watchdog().await;
        self.frontend.close();
        self.closed = true;
        info!("kiosk window closed");
    }

    /// Swap in a freshly loaded catalog, keeping the selection in range.
    ///
    /// # Errors
    ///
    /// Returns `AppError::EmptyCatalog` and keeps the old catalog if
    /// `catalog` has no games.
    pub fn replace_catalog(&mut self, catalog: GameCatalog) -> Result<()> {
        if catalog.is_empty() {
            return Err(AppError::EmptyCatalog("reloaded catalog has no games".into()));
        }
        self.selected = self.selected.min(catalog.len() - 1);
        if self.route.is_game() {
            self.route = Route::Game(self.selected);
        }
        info!(count = catalog.len(), "catalog replaced");
        self.catalog = catalog;
        self.render();
        Ok(())
    }

    async fn step(&mut self, delta: isize) {
        if !self.route.is_game() {
            return;
        }
        let next = wrap_index(self.selected, delta, self.catalog.len());
        self.navigate(Route::Game(next)).await;
    }
}

/// Move `delta` positions from `current` in a ring of `len` entries.
#[must_use]
pub fn wrap_index(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len_i = isize::try_from(len).unwrap_or(isize::MAX);
    let current_i = isize::try_from(current % len).unwrap_or(0);
    usize::try_from((current_i + delta).rem_euclid(len_i)).unwrap_or(0)
}
