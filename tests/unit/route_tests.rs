use minigame_kiosk::navigation::controller::wrap_index;
use minigame_kiosk::navigation::Route;

#[test]
fn root_is_menu() {
    assert_eq!(Route::parse("/"), Some(Route::Menu));
    assert_eq!(Route::parse(""), Some(Route::Menu));
}

#[test]
fn game_paths_parse_index() {
    assert_eq!(Route::parse("/games/0"), Some(Route::Game(0)));
    assert_eq!(Route::parse("/games/12"), Some(Route::Game(12)));
    assert_eq!(Route::parse("/games/3/"), Some(Route::Game(3)));
}

#[test]
fn unknown_paths_are_rejected() {
    for path in ["/games", "/games/", "/games/x", "/games/-1", "/settings", "games/1"] {
        assert_eq!(Route::parse(path), None, "{path} should not parse");
    }
}

#[test]
fn display_round_trips() {
    for route in [Route::Menu, Route::Game(0), Route::Game(41)] {
        assert_eq!(Route::parse(&route.to_string()), Some(route));
    }
    assert_eq!(Route::Game(2).to_string(), "/games/2");
}

#[test]
fn only_game_routes_are_game_views() {
    assert!(Route::Game(0).is_game());
    assert!(!Route::Menu.is_game());
}

#[test]
fn wrap_index_moves_forward_and_wraps() {
    assert_eq!(wrap_index(0, 1, 3), 1);
    assert_eq!(wrap_index(1, 1, 3), 2);
    assert_eq!(wrap_index(2, 1, 3), 0);
}

#[test]
fn wrap_index_moves_backward_and_wraps() {
    assert_eq!(wrap_index(2, -1, 3), 1);
    assert_eq!(wrap_index(0, -1, 3), 2);
}

#[test]
fn wrap_index_single_entry_stays_put() {
    assert_eq!(wrap_index(0, 1, 1), 0);
    assert_eq!(wrap_index(0, -1, 1), 0);
}

#[test]
fn wrap_index_empty_ring_is_zero() {
    assert_eq!(wrap_index(0, 1, 0), 0);
}
