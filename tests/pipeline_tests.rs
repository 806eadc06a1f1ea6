mod common;

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use common::{default_pipeline, init_test_env};
use lasertag_results::{
    error::EngineError,
    model::{
        events::{codes, GameEvent},
        game::{Game, Winner},
        modes::{lasermaxx::register_lasermaxx, registry::GameModeRegistry, GameLoad, LoadPlayer},
        pipeline::ResultsPipeline,
        player_stats::kd,
        structures::{game_type::GameType, system::System, team_color::TeamColor},
        trophy::Trophy
    },
    utils::test_utils::{empty_baselines, generate_solo_game, generate_team_game}
};

#[test]
fn test_solo_deathmatch_worked_example() {
    init_test_env();
    let mut game = generate_solo_game(System::Evo5, &[(10, 5, 2), (12, 3, 4)]);
    game.scoring.hit_other = 100;
    game.scoring.death_other = -50;
    game.scoring.shot = 0;

    let processed = default_pipeline().process(&game).unwrap();
    let player = processed.game.player(1).unwrap();

    assert_eq!(player.score, 400);
    assert_abs_diff_eq!(player.accuracy, 50.0);
    assert_abs_diff_eq!(kd(processed.game.game_type, player), 2.5);
    assert_eq!(player.position, 1);
    assert_eq!(processed.winner, Some(Winner::Player(1)));
}

#[test]
fn test_csgo_win_by_remaining_lives() {
    init_test_env();
    let mut game = generate_team_game(System::Evo5, 2, 2);
    game.mode.name = "CSGO".to_string();
    game.start_lives = Some(3);
    // Red hits more but runs out of lives
    let lives = [0, 0, 2, 0];
    for (player, lives_rest) in game.players.iter_mut().zip(lives) {
        player.shots = 60;
        player.lives_rest = Some(lives_rest);
    }
    game.players[0].hits_other = 25;
    game.players[2].hits_other = 5;

    let processed = default_pipeline().process(&game).unwrap();

    assert_eq!(processed.game.mode.variant.as_deref(), Some("evo5:CSGO"));
    assert_eq!(processed.winner, Some(Winner::Team(TeamColor::Green)));
    assert!(processed.game.team(TeamColor::Red).unwrap().score > processed.game.team(TeamColor::Green).unwrap().score);
}

#[test]
fn test_team_skill_with_fallback_baselines() {
    init_test_env();
    let mut game = generate_team_game(System::Evo6, 2, 3);
    for player in game.players.iter_mut() {
        player.shots = 200;
        player.hits_other = 15;
        player.deaths_other = 15;
    }
    game.players[0].hits_other = 40;
    game.players[0].deaths_other = 5;
    game.players[3].hits_other = 2;
    game.players[3].deaths_other = 40;

    let processed = default_pipeline().process(&game).unwrap();
    let strong = processed.game.player(1).unwrap();
    let weak = processed.game.player(4).unwrap();

    assert!(strong.skill > weak.skill);
    assert!(processed.game.players.iter().all(|p| p.skill.abs() < 100_000));
}

#[test]
fn test_team_games_rescore_teams_and_positions() {
    init_test_env();
    let mut game = generate_team_game(System::LaserForce, 3, 2);
    game.mode.name = "Team deathmatch".to_string();
    for (i, player) in game.players.iter_mut().enumerate() {
        player.shots = 100;
        player.hits_other = (i as u32 + 1) * 3;
    }

    let processed = default_pipeline().process(&game).unwrap();

    let positions: Vec<(TeamColor, u32)> = processed.game.teams.iter().map(|t| (t.color, t.position)).collect();
    assert_eq!(
        positions,
        vec![(TeamColor::Red, 3), (TeamColor::Green, 2), (TeamColor::Blue, 1)]
    );
    for team in &processed.game.teams {
        assert_eq!(team.score, processed.game.team_score_sum(team.color));
    }
    assert_eq!(processed.winner, Some(Winner::Team(TeamColor::Blue)));
}

#[test]
fn test_replayed_goals_decide_laserball() {
    init_test_env();
    let pipeline = default_pipeline();
    let mut game = generate_team_game(System::Evo6, 2, 2);
    game.mode.name = "Laserball".to_string();
    game.players[2].hits_other = 10;

    let events: Vec<GameEvent> = [1, 2, 3]
        .into_iter()
        .map(|vest| GameEvent::Vendor {
            time_ms: 1000 * vest as u64,
            code: codes::BALL_GOAL.to_string(),
            actors: vec![vest]
        })
        .chain(std::iter::once(GameEvent::Shot {
            time_ms: 5000,
            shooter: 4
        }))
        .collect();

    let handled = pipeline.replay_events(&mut game, &events).unwrap();
    assert_eq!(handled, 4);

    let processed = pipeline.process(&game).unwrap();

    assert_eq!(processed.game.team_goals(TeamColor::Red), 2);
    assert_eq!(processed.game.player(1).unwrap().score, 500);
    assert_eq!(processed.game.player(4).unwrap().shots, 1);
    assert_eq!(processed.winner, Some(Winner::Team(TeamColor::Red)));
}

#[test]
fn test_trophy_precedence() {
    init_test_env();
    let mut game = generate_solo_game(System::Evo5, &[(100, 96, 20), (100, 40, 30), (100, 30, 20)]);
    game.mode.name = "Deathmatch".to_string();

    let processed = default_pipeline().process(&game).unwrap();
    let sniper = &processed.trophies[0];

    assert_eq!(sniper.vest, 1);
    assert_eq!(sniper.primary, Trophy::HundredPercent);
    assert!(sniper.all.contains(&Trophy::Best));
}

#[test]
fn test_processed_game_round_trip() {
    init_test_env();
    let mut game = generate_team_game(System::Evo6, 2, 2);
    game.mode.name = "Team survival".to_string();
    game.start_ammo = Some(300);
    game.add_hits(1, 3, 4);
    game.add_hits(3, 2, 2);
    game.players[0].shots = 120;
    game.players[2].shots = 80;
    game.players[2].lives_rest = Some(1);

    let processed = default_pipeline().process(&game).unwrap();
    let json = serde_json::to_string(&processed.game).unwrap();
    let restored: Game = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.mode, processed.game.mode);
    assert_eq!(restored.hits, processed.game.hits);
    for (restored, original) in restored.players.iter().zip(&processed.game.players) {
        assert_eq!(restored.score, original.score);
        assert_eq!(restored.skill, original.skill);
        assert_eq!(restored.counters, original.counters);
        assert_abs_diff_eq!(restored.accuracy, original.accuracy, epsilon = 1e-9);
    }
    assert_eq!(restored.mode.variant.as_deref(), Some("evo6:TeamSurvival"));
    assert_eq!(restored.player(1).unwrap().hits_other, 4);
    assert_eq!(restored.player(1).unwrap().ammo_rest, Some(180));
}

#[test]
fn test_batch_isolates_failures() {
    init_test_env();
    let mut registry = GameModeRegistry::new(vec![System::Evo5]);
    register_lasermaxx(&mut registry);
    let pipeline = ResultsPipeline::new(Arc::new(registry), Arc::new(empty_baselines()));

    let mut csgo = generate_team_game(System::Evo5, 2, 2);
    csgo.mode.name = "CSGO".to_string();
    let mut unknown = generate_team_game(System::Evo5, 2, 2);
    unknown.mode.name = "Hide and seek".to_string();

    let results = pipeline.process_batch(&[csgo.clone(), unknown, csgo]);

    assert!(results[0].is_ok());
    assert!(matches!(
        &results[1],
        Err(EngineError::GameModeNotFound { name, game_type: GameType::Team, .. }) if name == "Hide and seek"
    ));
    assert!(results[2].is_ok());
}

#[test]
fn test_prepare_load_is_seeded() {
    init_test_env();
    let pipeline = default_pipeline();
    let base = GameLoad {
        seed: 7,
        teams: vec![TeamColor::Red, TeamColor::Green, TeamColor::Blue],
        players: (1..=7)
            .map(|vest| LoadPlayer {
                vest,
                name: format!("Player {}", vest),
                team: None
            })
            .collect()
    };

    let mut first = base.clone();
    let mut second = base.clone();
    pipeline.prepare_load("Barvičky", System::Evo5, GameType::Team, &mut first).unwrap();
    pipeline.prepare_load("barvicky", System::Evo5, GameType::Team, &mut second).unwrap();

    assert_eq!(first, second);
    assert!(first.players.iter().all(|p| p.team.is_some()));

    // Modes without a load hook leave the assignment alone
    let mut untouched = base.clone();
    pipeline.prepare_load("CSGO", System::Evo5, GameType::Team, &mut untouched).unwrap();
    assert_eq!(untouched, base);
}
