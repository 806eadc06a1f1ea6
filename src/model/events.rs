use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{
    game::{Game, VendorCounters, VestId},
    modes::GameModeVariant,
    vendor::profile
};

/// Vendor event codes understood by the engine.
pub mod codes {
    pub const MINE_HIT: &str = "mine-hit";
    pub const PENALTY: &str = "penalty";
    pub const MISSILE: &str = "missile";
    pub const NUKE: &str = "nuke";
    pub const BASE_DESTROYED: &str = "base-destroyed";
    pub const BALL_GOAL: &str = "ball-goal";
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    Shot {
        time_ms: u64,
        shooter: VestId
    },
    Hit {
        time_ms: u64,
        shooter: VestId,
        target: VestId
    },
    /// Anything vendor or mode specific. `actors[0]` is the acting vest.
    Vendor {
        time_ms: u64,
        code: String,
        actors: Vec<VestId>
    }
}

impl GameEvent {
    pub fn time_ms(&self) -> u64 {
        match self {
            GameEvent::Shot { time_ms, .. } | GameEvent::Hit { time_ms, .. } | GameEvent::Vendor { time_ms, .. } => {
                *time_ms
            }
        }
    }

    pub fn actor(&self) -> Option<VestId> {
        match self {
            GameEvent::Shot { shooter, .. } | GameEvent::Hit { shooter, .. } => Some(*shooter),
            GameEvent::Vendor { actors, .. } => actors.first().copied()
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            GameEvent::Vendor { code, .. } => Some(code),
            _ => None
        }
    }
}

/// Applies one event to the raw counters. The mode's custom event handler
/// gets the first look; generic shots, hits and the vendor's own codes are
/// mapped afterwards. Returns `false` for events nobody handled.
pub fn apply_event(game: &mut Game, mode: Option<&dyn GameModeVariant>, event: &GameEvent) -> bool {
    if let Some(handler) = mode.and_then(|m| m.as_custom_events()) {
        if handler.process_event(game, event) {
            return true;
        }
    }

    let handled = match event {
        GameEvent::Shot { shooter, .. } => match game.player_mut(*shooter) {
            Some(player) => {
                player.shots += 1;
                true
            }
            None => false
        },
        GameEvent::Hit { shooter, target, .. } => {
            if game.player(*shooter).is_none() || game.player(*target).is_none() {
                false
            } else {
                game.add_hits(*shooter, *target, 1);
                if let Some(player) = game.player_mut(*shooter) {
                    player.hits += 1;
                }
                if let Some(player) = game.player_mut(*target) {
                    player.deaths += 1;
                }
                true
            }
        }
        GameEvent::Vendor { code, actors, .. } => apply_vendor_code(game, code, actors.first().copied())
    };

    if !handled {
        debug!("Ignoring unhandled event {:?} in game {}", event, game.code);
    }

    handled
}

pub fn apply_events(game: &mut Game, mode: Option<&dyn GameModeVariant>, events: &[GameEvent]) -> usize {
    events.iter().filter(|e| apply_event(game, mode, e)).count()
}

fn apply_vendor_code(game: &mut Game, code: &str, actor: Option<VestId>) -> bool {
    if !profile(game.system).event_codes().contains(&code) {
        return false;
    }

    let Some(player) = actor.and_then(|vest| game.player_mut(vest)) else {
        return false;
    };

    match (&mut player.counters, code) {
        (VendorCounters::Evo5(c), codes::MINE_HIT) => c.mines_hits += 1,
        (VendorCounters::Evo6(c), codes::MINE_HIT) => c.power_ups.mines_hits += 1,
        (VendorCounters::Evo6(c), codes::PENALTY) => c.penalty_count += 1,
        (VendorCounters::LaserForce(c), codes::MISSILE) => c.missiles += 1,
        (VendorCounters::LaserForce(c), codes::NUKE) => c.nukes += 1,
        // Known to the vendor but only meaningful to specific modes
        _ => return false
    }

    true
}

#[cfg(test)]
mod tests {
    use super::{apply_event, apply_events, codes, GameEvent};
    use crate::{
        model::{game::VendorCounters, structures::system::System},
        utils::test_utils::{generate_solo_game, generate_team_game}
    };

    fn vendor(code: &str, actor: u32) -> GameEvent {
        GameEvent::Vendor {
            time_ms: 0,
            code: code.to_string(),
            actors: vec![actor]
        }
    }

    #[test]
    fn test_shots_and_hits() {
        let mut game = generate_team_game(System::Evo5, 2, 1);
        let events = vec![
            GameEvent::Shot { time_ms: 10, shooter: 1 },
            GameEvent::Shot { time_ms: 20, shooter: 1 },
            GameEvent::Hit {
                time_ms: 20,
                shooter: 1,
                target: 2
            },
        ];

        assert_eq!(apply_events(&mut game, None, &events), 3);
        assert_eq!(game.player(1).unwrap().shots, 2);
        assert_eq!(game.player(1).unwrap().hits, 1);
        assert_eq!(game.player(2).unwrap().deaths, 1);
        assert_eq!(game.hits_between(1, 2), 1);
    }

    #[test]
    fn test_unknown_vest_is_ignored() {
        let mut game = generate_solo_game(System::Evo5, &[(0, 0, 0)]);
        let hit = GameEvent::Hit {
            time_ms: 0,
            shooter: 1,
            target: 99
        };

        assert!(!apply_event(&mut game, None, &hit));
        assert!(game.hits.is_empty());
        assert_eq!(game.players[0].hits, 0);
    }

    #[test]
    fn test_vendor_codes_follow_the_system() {
        let mut evo6 = generate_solo_game(System::Evo6, &[(0, 0, 0)]);
        assert!(apply_event(&mut evo6, None, &vendor(codes::PENALTY, 1)));
        assert!(apply_event(&mut evo6, None, &vendor(codes::MINE_HIT, 1)));
        assert!(!apply_event(&mut evo6, None, &vendor(codes::NUKE, 1)));

        match &evo6.players[0].counters {
            VendorCounters::Evo6(c) => {
                assert_eq!(c.penalty_count, 1);
                assert_eq!(c.power_ups.mines_hits, 1);
            }
            other => panic!("Unexpected counters {:?}", other)
        }

        let mut evo5 = generate_solo_game(System::Evo5, &[(0, 0, 0)]);
        assert!(!apply_event(&mut evo5, None, &vendor(codes::PENALTY, 1)));

        let mut laserforce = generate_solo_game(System::LaserForce, &[(0, 0, 0)]);
        assert!(apply_event(&mut laserforce, None, &vendor(codes::NUKE, 1)));
        assert!(apply_event(&mut laserforce, None, &vendor(codes::MISSILE, 1)));
    }

    #[test]
    fn test_mode_codes_need_a_mode() {
        let mut game = generate_team_game(System::Evo5, 2, 1);
        assert!(!apply_event(&mut game, None, &vendor(codes::BALL_GOAL, 1)));
        assert_eq!(game.players[0].goals, 0);
    }

    #[test]
    fn test_event_serde() {
        let json = r#"{"type":"vendor","timeMs":1500,"code":"ball-goal","actors":[3]}"#;
        let event: GameEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.time_ms(), 1500);
        assert_eq!(event.actor(), Some(3));
        assert_eq!(event.code(), Some(codes::BALL_GOAL));
    }
}
