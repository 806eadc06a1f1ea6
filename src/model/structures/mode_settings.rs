use serde::{Deserialize, Serialize};

/// Display and ranking switches stored with a game mode.
///
/// Every flag defaults to `true` except the ones describing vendor features
/// that most modes do not have (mines, lives, bases).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ModeSettings {
    pub public: bool,
    pub mines: bool,
    pub part_win: bool,
    pub part_teams: bool,
    pub part_players: bool,
    pub part_hits: bool,
    pub part_best: bool,
    pub part_best_day: bool,
    pub player_score: bool,
    pub player_shots: bool,
    pub player_miss: bool,
    pub player_accuracy: bool,
    pub player_mines: bool,
    pub player_players: bool,
    pub player_players_teams: bool,
    pub player_kd: bool,
    pub player_favourites: bool,
    pub player_lives: bool,
    pub team_score: bool,
    pub team_accuracy: bool,
    pub team_shots: bool,
    pub team_hits: bool,
    pub team_bases: bool,
    pub best_score: bool,
    pub best_hits: bool,
    pub best_deaths: bool,
    pub best_accuracy: bool,
    pub best_hits_own: bool,
    pub best_deaths_own: bool,
    pub best_shots: bool,
    pub best_miss: bool,
    pub best_mines: bool
}

impl Default for ModeSettings {
    fn default() -> Self {
        ModeSettings {
            public: true,
            mines: false,
            part_win: true,
            part_teams: true,
            part_players: true,
            part_hits: true,
            part_best: true,
            part_best_day: true,
            player_score: true,
            player_shots: true,
            player_miss: true,
            player_accuracy: true,
            player_mines: false,
            player_players: true,
            player_players_teams: true,
            player_kd: true,
            player_favourites: true,
            player_lives: false,
            team_score: true,
            team_accuracy: true,
            team_shots: true,
            team_hits: true,
            team_bases: false,
            best_score: true,
            best_hits: true,
            best_deaths: true,
            best_accuracy: true,
            best_hits_own: true,
            best_deaths_own: true,
            best_shots: true,
            best_miss: true,
            best_mines: false
        }
    }
}

impl ModeSettings {
    /// Settings for a mode played on a LaserMaxx arena with mines enabled.
    pub fn with_mines() -> Self {
        ModeSettings {
            mines: true,
            player_mines: true,
            best_mines: true,
            ..ModeSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ModeSettings;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: ModeSettings = serde_json::from_str(r#"{"bestHits": false, "mines": true}"#).unwrap();

        assert!(!settings.best_hits);
        assert!(settings.mines);
        assert!(settings.best_score);
        assert!(!settings.best_mines);
    }

    #[test]
    fn test_with_mines() {
        let settings = ModeSettings::with_mines();
        assert!(settings.mines && settings.player_mines && settings.best_mines);
        assert!(settings.best_accuracy);
    }
}
