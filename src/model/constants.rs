// Regression baselines
pub const MIN_REGRESSION_ROWS: usize = 10;
pub const R_SQUARED_TIE_EPSILON: f64 = 1e-9;
pub const SVD_EPSILON: f64 = 1e-10;
pub const MIN_TEAM_COUNT: u8 = 2;
pub const MAX_TEAM_COUNT: u8 = 6;
// Skill
pub const REFERENCE_GAME_LENGTH: f64 = 15.0;
pub const SKILL_HITS_WEIGHT: f64 = 400.0;
pub const SKILL_KD_WEIGHT: f64 = 150.0;
pub const SKILL_KD_CAP: f64 = 5.0;
pub const SKILL_KD_DEVIATION_WEIGHT: f64 = 100.0;
pub const SKILL_KD_DEVIATION_CAP: f64 = 2.0;
pub const SKILL_ACCURACY_WEIGHT: f64 = 2.0;
pub const SKILL_TEAM_HITS_WEIGHT: f64 = 100.0;
pub const SKILL_BONUS_WEIGHT: f64 = 10.0;
// Mode bonuses
pub const SURVIVOR_BONUS: i64 = 1000;
pub const LASERBALL_GOAL_POINTS: i64 = 500;
pub const SM5_BASE_POINTS: i64 = 1001;
pub const SM5_NUKE_POINTS: i64 = 500;
// Trophy thresholds
pub const TROPHY_SNIPER_ACCURACY: f64 = 95.0;
pub const TROPHY_HALF_ACCURACY: f64 = 50.0;
pub const TROPHY_LOW_ACCURACY: f64 = 5.0;
pub const TROPHY_UNTOUCHABLE_DEATHS: u32 = 10;
pub const TROPHY_FITNESS_SHOTS: u32 = 1000;
pub const TROPHY_FITNESS_MAX_LENGTH: f64 = 20.0;
pub const TROPHY_TEAM_SHARE: f64 = 0.5;
pub const TROPHY_TEAM_MIN_PLAYERS: usize = 3;
pub const TROPHY_FAVOURITE_SHARE: f64 = 0.45;
pub const TROPHY_FAVOURITE_MIN_COUNT: u32 = 10;
