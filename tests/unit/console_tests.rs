use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use minigame_kiosk::catalog::GameCatalog;
use minigame_kiosk::config::MessagesConfig;
use minigame_kiosk::frontend::console::{
    format_notice, parse_input, render_gallery, render_menu, ConsoleFrontend, HELP,
};
use minigame_kiosk::frontend::{Frontend, Notice, Screen};
use minigame_kiosk::models::game::Game;
use minigame_kiosk::navigation::{KioskEvent, Route};
use minigame_kiosk::orchestrator::watchdog::{Alert, Alerter};

/// Writer that appends into a shared buffer.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn catalog() -> GameCatalog {
    let game = |title: &str, author: &str| Game {
        title: title.into(),
        description: format!("{title} description"),
        author: author.into(),
        executable: PathBuf::from(title),
        screenshot: None,
        index: 0,
    };
    GameCatalog::from_games(vec![game("Snake", "alice"), game("Pong", "bob")])
}

#[test]
fn parse_navigation_keys() {
    assert_eq!(parse_input("down"), Some(KioskEvent::Next));
    assert_eq!(parse_input("j"), Some(KioskEvent::Next));
    assert_eq!(parse_input("UP"), Some(KioskEvent::Previous));
    assert_eq!(parse_input(" k "), Some(KioskEvent::Previous));
}

#[test]
fn parse_enter_is_play() {
    assert_eq!(parse_input(""), Some(KioskEvent::Play));
    assert_eq!(parse_input("play"), Some(KioskEvent::Play));
}

#[test]
fn parse_numbers_select_one_based() {
    assert_eq!(parse_input("1"), Some(KioskEvent::Select(0)));
    assert_eq!(parse_input("3"), Some(KioskEvent::Select(2)));
    assert_eq!(parse_input("0"), None);
}

#[test]
fn parse_routes_and_window_commands() {
    assert_eq!(parse_input("menu"), Some(KioskEvent::Navigate(Route::Menu)));
    assert_eq!(
        parse_input("/games/1"),
        Some(KioskEvent::Navigate(Route::Game(1)))
    );
    assert_eq!(parse_input("/nowhere"), None);
    assert_eq!(parse_input("q"), Some(KioskEvent::Close));
    assert_eq!(parse_input("dance"), None);
}

#[test]
fn menu_shows_title() {
    let text = render_menu("Festival Arcade");
    assert!(text.contains("Festival Arcade"));
}

#[test]
fn gallery_marks_selection_and_shows_details() {
    let text = render_gallery(&catalog(), 1);

    assert!(text.contains("  1. Snake (by alice)"));
    assert!(text.contains("> 2. Pong (by bob)"));
    assert!(text.contains("Pong description"));
    assert!(!text.contains("Snake description"));
    assert!(text.ends_with(HELP));
}

#[test]
fn notices_name_the_game() {
    let running = format_notice(&Notice::AlreadyRunning {
        title: "Snake".into(),
    });
    assert!(running.contains("Snake is already running"));

    let failed = format_notice(&Notice::LaunchFailed {
        title: "Pong".into(),
        reason: "denied".into(),
    });
    assert!(failed.contains("Pong") && failed.contains("denied"));
}

#[test]
fn frontend_writes_screens_and_alerts() {
    let buf = SharedBuf::default();
    let messages = MessagesConfig::default();
    let frontend = ConsoleFrontend::with_writer(
        messages.clone(),
        CancellationToken::new(),
        Box::new(buf.clone()),
    );

    frontend.render(&Screen::Menu);
    frontend.alert(Alert::Warning {
        elapsed: std::time::Duration::from_secs(300),
    });
    frontend.alert(Alert::Expired {
        elapsed: std::time::Duration::from_secs(600),
    });

    let text = buf.text();
    assert!(text.contains(&messages.title));
    assert!(text.contains(&format!("!! WARNING: {}", messages.warning)));
    assert!(text.contains(&format!("!! TIME UP: {}", messages.expired)));
}

#[test]
fn close_cancels_window_and_is_repeatable() {
    let window = CancellationToken::new();
    let frontend = ConsoleFrontend::with_writer(
        MessagesConfig::default(),
        window.clone(),
        Box::new(SharedBuf::default()),
    );

    frontend.close();
    frontend.close();

    assert!(window.is_cancelled());
    assert!(frontend.window().is_cancelled());
}
