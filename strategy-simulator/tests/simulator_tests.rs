//! End-to-end loading and playing through the `Simulator`.

use std::fs;
use std::path::{Path, PathBuf};

use strategy_simulator::engine::{Binding, GameLogic, Participant, Phase, Simulation, State};
use strategy_simulator::games::gomoku::{Gomoku, Outcome};
use strategy_simulator::games::{self, empty};
use strategy_simulator::module::LoadStats;
use strategy_simulator::{ConfigError, LoadError, PluginRegistry, Simulator, SimulatorError};
use tempfile::TempDir;

const GOMOKU_ARCHIVE: &str = r#"{
  "format": 1,
  "units": [
    { "name": "gomoku.GameLogic", "symbol": "gomoku::engine" },
    { "name": "gomoku.ManagerInterface", "symbol": "gomoku::manager_interface" },
    { "name": "gomoku.PlayerManager", "symbol": "gomoku::manager" },
    { "name": "gomoku.Player", "symbol": "gomoku::player" },
    { "name": "gomoku.Players.CornerPlayer", "symbol": "gomoku::players::corner" },
    { "name": "gomoku.Players.SweepPlayer", "symbol": "gomoku::players::sweep" },
    { "name": "gomoku.Players.EmptyPlayer", "symbol": "empty::players::empty" }
  ]
}"#;

#[derive(Default)]
struct Quiet {
    binding: Binding,
}

impl Participant for Quiet {
    fn binding(&self) -> &Binding {
        &self.binding
    }
}

impl empty::Player for Quiet {
    fn step(&mut self) -> bool {
        true
    }
}

fn registry() -> PluginRegistry {
    let mut registry = games::bundled_registry();
    registry.register_participant::<dyn empty::Player>("test::quiet", "Quiet", || Box::new(Quiet::default()));
    registry
}

fn write(path: &Path, body: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
    path.to_path_buf()
}

fn unit(name: &str, symbol: &str) -> String {
    format!(r#"{{ "name": "{name}", "symbol": "{symbol}" }}"#)
}

/// Loose Empty Game units under `<dir>/units/empty`.
fn write_empty_units(dir: &Path) {
    let package = dir.join("units").join("empty");
    write(&package.join("GameLogic.unit"), &unit("empty.GameLogic", "empty::engine"));
    write(&package.join("ManagerInterface.unit"), &unit("empty.ManagerInterface", "empty::manager_interface"));
    write(&package.join("PlayerManager.unit"), &unit("empty.PlayerManager", "empty::manager"));
    write(&package.join("Player.unit"), &unit("empty.Player", "empty::player"));
    write(&package.join("Players").join("EmptyPlayer.unit"), &unit("empty.Players.EmptyPlayer", "empty::players::empty"));
    write(&package.join("Players").join("Quiet.unit"), &unit("empty.Players.Quiet", "test::quiet"));
}

fn gomoku_config(dir: &Path, players: &str) -> PathBuf {
    write(&dir.join("gomoku.json"), GOMOKU_ARCHIVE);
    write(
        &dir.join("gomoku.cfg"),
        &format!(
            "game.name = Gomoku\ngame.package = gomoku\ngame.type = jar\ngame.path = gomoku.json\n\
             game.width = 5\ngame.height = 5\n{players}"
        ),
    )
}

const CORNER_VS_SWEEP: &str = "\
player.1.class = CornerPlayer
player.1.character = X
player.2.class = SweepPlayer
player.2.character = O
";

fn gomoku(simulator: &Simulator) -> &GameLogic<Gomoku> {
    simulator
        .game()
        .and_then(|game| game.as_any().downcast_ref::<GameLogic<Gomoku>>())
        .unwrap()
}

// =============================================================================
// LOOSE UNITS
// =============================================================================

#[test]
fn test_ids_follow_group_order() {
    let dir = TempDir::new().unwrap();
    write_empty_units(dir.path());
    let config = write(
        &dir.path().join("empty.cfg"),
        "game.package = empty\ngame.type = class\ngame.path = units\n\
         player.10.class = EmptyPlayer\nplayer.10.instances = 3\n\
         player.2.class = Quiet\n\
         player.1.class = EmptyPlayer\nplayer.1.instances = 2\n",
    );

    let mut simulator = Simulator::new(registry());
    simulator.load_game(&config).unwrap();

    let game = simulator.game().unwrap();
    assert_eq!(game.name(), "EmptyGame");
    assert_eq!(
        game.player_identities(),
        vec![
            "1:EmptyPlayer",
            "2:EmptyPlayer",
            "3:Quiet",
            "4:EmptyPlayer",
            "5:EmptyPlayer",
            "6:EmptyPlayer",
        ]
    );
    // four game units plus one per distinct player class
    assert_eq!(
        simulator.load_stats(),
        Some(LoadStats {
            archive_reads: 0,
            unit_reads: 6,
            cache_hits: 0
        })
    );
}

#[test]
fn test_loose_units_reread_on_every_load() {
    let dir = TempDir::new().unwrap();
    write_empty_units(dir.path());
    let config = write(
        &dir.path().join("empty.cfg"),
        "game.package = empty\ngame.type = class\ngame.path = units\nplayer.1.class = EmptyPlayer\n",
    );

    let mut simulator = Simulator::new(registry());
    simulator.load_game(&config).unwrap();
    assert_eq!(simulator.load_stats().unwrap().unit_reads, 5);

    // a redefinition on disk is picked up by the next load
    write(
        &dir.path().join("units").join("empty").join("Players").join("EmptyPlayer.unit"),
        &unit("empty.Players.EmptyPlayer", "test::quiet"),
    );
    simulator.load_game(&config).unwrap();
    assert_eq!(simulator.load_stats().unwrap().unit_reads, 5);
    assert_eq!(simulator.game().unwrap().player_identities(), vec!["1:Quiet"]);
}

#[test]
fn test_empty_game_plays_through() {
    let dir = TempDir::new().unwrap();
    write_empty_units(dir.path());
    let config = write(
        &dir.path().join("empty.cfg"),
        "game.package = empty\ngame.type = class\ngame.path = units\n\
         player.1.class = EmptyPlayer\nplayer.1.instances = 3\n",
    );

    let mut simulator = Simulator::new(registry());
    simulator.load_game(&config).unwrap();
    simulator.play_game().unwrap();

    let game = simulator.game().unwrap();
    assert_eq!(game.state(), State::Finalised);
    assert_eq!(game.round(), 1);
    assert_eq!(game.player_count(), 3);
}

// =============================================================================
// ARCHIVES
// =============================================================================

#[test]
fn test_gomoku_corner_player_loses() {
    let dir = TempDir::new().unwrap();
    let config = gomoku_config(dir.path(), CORNER_VS_SWEEP);

    let mut simulator = Simulator::new(registry());
    simulator.load_game(&config).unwrap();
    assert_eq!(
        simulator.load_stats(),
        Some(LoadStats {
            archive_reads: 1,
            unit_reads: 0,
            cache_hits: 5
        })
    );

    simulator.play_game().unwrap();
    let game = gomoku(&simulator);
    assert_eq!(game.state(), State::Finalised);
    assert_eq!(game.round(), 3);
    assert_eq!(game.rules().outcome(), Outcome::Winner(2));
    assert_eq!(game.rules().board().at(0, 0), 'X');
    assert_eq!(game.rules().board().at(1, 0), 'O');
    assert_eq!(game.player_identities(), vec!["1:CornerPlayer(X)", "2:SweepPlayer(O)"]);
}

#[test]
fn test_gomoku_step_by_step() {
    let dir = TempDir::new().unwrap();
    let config = gomoku_config(dir.path(), CORNER_VS_SWEEP);

    let mut simulator = Simulator::new(registry());
    simulator.load_game(&config).unwrap();
    let mut logic = simulator_game(simulator);

    assert_eq!(logic.reset_wrapper(), Ok(true));
    assert_eq!(logic.initialise_wrapper(), Ok(true));
    assert_eq!(logic.step_wrapper(), Ok(true));
    assert_eq!(logic.state(), State::Started);
    assert_eq!(logic.step_wrapper(), Ok(true));
    assert_eq!(logic.step_wrapper(), Ok(false));
    assert_eq!(logic.state(), State::Finished);
    assert_eq!(logic.finalise_wrapper(), Ok(true));
    assert_eq!(logic.state(), State::Finalised);
}

fn simulator_game(mut simulator: Simulator) -> Box<dyn Simulation> {
    simulator.take_game().unwrap()
}

#[test]
fn test_archive_read_once_per_load() {
    let dir = TempDir::new().unwrap();
    let config = gomoku_config(dir.path(), CORNER_VS_SWEEP);

    let mut simulator = Simulator::new(registry());
    simulator.load_game(&config).unwrap();
    simulator.load_game(&config).unwrap();
    assert_eq!(simulator.load_stats().unwrap().archive_reads, 1);
}

#[test]
fn test_player_storage_override() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join("extra").join("SweepPlayer.unit"),
        &unit("gomoku.Players.SweepPlayer", "gomoku::players::sweep"),
    );
    let config = gomoku_config(
        dir.path(),
        "player.1.class = CornerPlayer\nplayer.1.character = X\n\
         player.2.class = SweepPlayer\nplayer.2.character = O\n\
         player.2.type = class\nplayer.2.path = extra\n",
    );

    let mut simulator = Simulator::new(registry());
    simulator.load_game(&config).unwrap();
    let stats = simulator.load_stats().unwrap();
    assert_eq!(stats.archive_reads, 1);
    assert_eq!(stats.unit_reads, 1);
}

// =============================================================================
// FAILURES
// =============================================================================

#[test]
fn test_play_without_load() {
    let mut simulator = Simulator::new(registry());
    assert!(matches!(simulator.play_game(), Err(SimulatorError::NoGameLoaded)));
}

#[test]
fn test_failed_load_drops_previous_game() {
    let dir = TempDir::new().unwrap();
    let config = gomoku_config(dir.path(), CORNER_VS_SWEEP);
    let mut simulator = Simulator::new(registry());
    simulator.load_game(&config).unwrap();
    assert!(simulator.game().is_some());

    let broken = write(&dir.path().join("broken.cfg"), "game.package = gomoku\n");
    assert!(simulator.load_game(&broken).is_err());
    assert!(simulator.game().is_none());
    assert!(matches!(simulator.play_game(), Err(SimulatorError::NoGameLoaded)));
}

#[test]
fn test_participant_from_another_game() {
    let dir = TempDir::new().unwrap();
    let config = gomoku_config(
        dir.path(),
        "player.1.class = CornerPlayer\nplayer.1.character = X\n\
         player.2.class = EmptyPlayer\nplayer.2.character = O\n",
    );

    let mut simulator = Simulator::new(registry());
    let err = simulator.load_game(&config).unwrap_err();
    assert!(
        matches!(err, SimulatorError::Module(LoadError::Contract { ref name, .. }) if name == "gomoku.Players.EmptyPlayer"),
        "{err}"
    );
    assert!(simulator.game().is_none());
}

fn mismatched_archive(dir: &Path, swap: (&str, &str)) -> PathBuf {
    let archive = GOMOKU_ARCHIVE.replace(swap.0, swap.1);
    write(&dir.join("gomoku.json"), &archive);
    write(
        &dir.join("gomoku.cfg"),
        &format!("game.package = gomoku\ngame.type = jar\ngame.path = gomoku.json\n{CORNER_VS_SWEEP}"),
    )
}

#[test]
fn test_contract_violations() {
    let cases = [
        // manager of another game's base player
        (r#""gomoku::manager""#, r#""empty::manager""#),
        // engine expecting another game's managers
        (r#""gomoku::engine""#, r#""empty::engine""#),
        // interface the manager does not provide
        (r#""gomoku::manager_interface""#, r#""empty::manager_interface""#),
        // unit resolving to the wrong kind of export
        (r#""gomoku::player""#, r#""gomoku::players::corner""#),
    ];
    for swap in cases {
        let dir = TempDir::new().unwrap();
        let config = mismatched_archive(dir.path(), swap);
        let mut simulator = Simulator::new(registry());
        let err = simulator.load_game(&config).unwrap_err();
        assert!(
            matches!(err, SimulatorError::Module(LoadError::Contract { .. })),
            "{swap:?}: {err}"
        );
    }
}

#[test]
fn test_unknown_symbol() {
    let dir = TempDir::new().unwrap();
    let config = mismatched_archive(dir.path(), (r#""gomoku::player""#, r#""gomoku::nobody""#));
    let mut simulator = Simulator::new(registry());
    assert!(matches!(
        simulator.load_game(&config),
        Err(SimulatorError::Module(LoadError::NotFound { .. }))
    ));
}

#[test]
fn test_zero_instances_rejected() {
    let dir = TempDir::new().unwrap();
    let config = gomoku_config(
        dir.path(),
        "player.1.class = CornerPlayer\nplayer.1.instances = 0\n",
    );
    let mut simulator = Simulator::new(registry());
    assert!(matches!(
        simulator.load_game(&config),
        Err(SimulatorError::Config(ConfigError::Invalid { ref key, .. })) if key == "player.1.instances"
    ));
}

#[test]
fn test_failed_reset_aborts_play() {
    let dir = TempDir::new().unwrap();
    let config = gomoku_config(
        dir.path(),
        "player.1.class = CornerPlayer\nplayer.1.character = X\nplayer.1.instances = 3\n",
    );
    let mut simulator = Simulator::new(registry());
    simulator.load_game(&config).unwrap();

    assert!(matches!(
        simulator.play_game(),
        Err(SimulatorError::PhaseFailed(Phase::Reset))
    ));
    assert_eq!(simulator.game().unwrap().state(), State::Unstable);
    assert_eq!(simulator.game().unwrap().round(), 0);
}

// =============================================================================
// DEMOS
// =============================================================================

fn demo(path: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(path)
}

#[test]
fn test_bundled_demos_play() {
    for config in ["empty/empty.cfg", "gomoku/gomoku.cfg"] {
        let mut simulator = Simulator::new(games::bundled_registry());
        simulator.load_game(&demo(config)).unwrap();
        simulator.play_game().unwrap();
        assert_eq!(simulator.game().unwrap().state(), State::Finalised, "{config}");
    }
}
