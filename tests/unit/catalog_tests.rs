use std::path::{Path, PathBuf};

use minigame_kiosk::catalog::manifest::{MANIFEST_FILE, SCREENSHOT_FILE};
use minigame_kiosk::catalog::GameCatalog;
use minigame_kiosk::models::game::Game;
use minigame_kiosk::AppError;

/// Create `root/<dir_name>` with a manifest and a placeholder executable.
fn install_game(root: &Path, dir_name: &str, title: &str) -> PathBuf {
    let dir = root.join(dir_name);
    std::fs::create_dir_all(&dir).expect("create game dir");
    std::fs::write(
        dir.join(MANIFEST_FILE),
        format!(
            "title = \"{title}\"\ndescription = \"about {title}\"\nauthor = \"team {dir_name}\"\ngame_exe_name = \"run\"\n"
        ),
    )
    .expect("write manifest");
    std::fs::write(
        dir.join(format!("run{}", std::env::consts::EXE_SUFFIX)),
        b"",
    )
    .expect("write executable");
    dir
}

#[test]
fn loads_games_in_directory_order() {
    let root = tempfile::tempdir().expect("tempdir");
    install_game(root.path(), "c_tetris", "Tetris");
    install_game(root.path(), "a_snake", "Snake");
    install_game(root.path(), "b_pong", "Pong");

    let catalog = GameCatalog::load(root.path()).expect("catalog should load");

    assert_eq!(catalog.len(), 3);
    let titles: Vec<&str> = catalog.games().iter().map(|g| g.title.as_str()).collect();
    assert_eq!(titles, ["Snake", "Pong", "Tetris"]);
    for (expected, game) in catalog.games().iter().enumerate() {
        assert_eq!(game.index, expected);
    }
}

#[test]
fn entries_carry_manifest_fields() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = install_game(root.path(), "pong", "Pong");

    let catalog = GameCatalog::load(root.path()).expect("catalog should load");
    let game = catalog.get(0).expect("one game");

    assert_eq!(game.description, "about Pong");
    assert_eq!(game.author, "team pong");
    assert_eq!(
        game.executable,
        dir.join(format!("run{}", std::env::consts::EXE_SUFFIX))
    );
    assert_eq!(game.directory(), Some(dir.as_path()));
    assert!(game.screenshot.is_none());
}

#[test]
fn picks_up_screenshot() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = install_game(root.path(), "pong", "Pong");
    std::fs::write(dir.join(SCREENSHOT_FILE), b"png").expect("write screenshot");

    let catalog = GameCatalog::load(root.path()).expect("catalog should load");
    assert_eq!(
        catalog.get(0).and_then(|g| g.screenshot.clone()),
        Some(dir.join(SCREENSHOT_FILE))
    );
}

#[test]
fn plain_files_are_not_games() {
    let root = tempfile::tempdir().expect("tempdir");
    install_game(root.path(), "pong", "Pong");
    std::fs::write(root.path().join("README.md"), "notes").expect("write file");

    let catalog = GameCatalog::load(root.path()).expect("catalog should load");
    assert_eq!(catalog.len(), 1);
}

#[test]
fn empty_directory_yields_empty_catalog() {
    let root = tempfile::tempdir().expect("tempdir");
    let catalog = GameCatalog::load(root.path()).expect("catalog should load");
    assert!(catalog.is_empty());
}

#[test]
fn directory_without_manifest_fails() {
    let root = tempfile::tempdir().expect("tempdir");
    install_game(root.path(), "pong", "Pong");
    std::fs::create_dir(root.path().join("broken")).expect("create dir");

    let result = GameCatalog::load(root.path());
    assert!(matches!(result, Err(AppError::MissingManifest(_))));
}

#[test]
fn missing_executable_fails() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = install_game(root.path(), "pong", "Pong");
    std::fs::remove_file(dir.join(format!("run{}", std::env::consts::EXE_SUFFIX)))
        .expect("remove executable");

    match GameCatalog::load(root.path()) {
        Err(AppError::MissingExecutable(msg)) => {
            assert!(msg.contains("run"), "message should name the executable: {msg}");
        }
        other => panic!("expected missing executable, got {other:?}"),
    }
}

#[test]
fn invalid_manifest_fails() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = install_game(root.path(), "pong", "Pong");
    std::fs::write(dir.join(MANIFEST_FILE), "title = ").expect("corrupt manifest");

    let result = GameCatalog::load(root.path());
    assert!(matches!(result, Err(AppError::InvalidManifest(_))));
}

#[test]
fn unreadable_games_directory_is_io_error() {
    let root = tempfile::tempdir().expect("tempdir");
    let result = GameCatalog::load(&root.path().join("nope"));
    assert!(matches!(result, Err(AppError::Io(_))));
}

#[test]
fn from_games_reassigns_indices() {
    let game = |title: &str, index| Game {
        title: title.into(),
        description: String::new(),
        author: String::new(),
        executable: PathBuf::from(title),
        screenshot: None,
        index,
    };

    let catalog = GameCatalog::from_games(vec![game("a", 7), game("b", 7)]);

    assert_eq!(catalog.get(0).map(|g| g.index), Some(0));
    assert_eq!(catalog.get(1).map(|g| g.index), Some(1));
    assert!(catalog.get(2).is_none());
}

#[test]
fn relative_games_directory_yields_absolute_paths() {
    let root = tempfile::Builder::new()
        .prefix("relative-games")
        .tempdir_in(".")
        .expect("tempdir in working directory");
    assert!(root.path().is_relative());
    install_game(root.path(), "pong", "Pong");

    let catalog = GameCatalog::load(root.path()).expect("catalog should load");
    let game = catalog.get(0).expect("one game");

    assert!(game.executable.is_absolute(), "{}", game.executable.display());
    assert!(game.executable.is_file());
    assert!(game.directory().is_some_and(Path::is_absolute));
}
