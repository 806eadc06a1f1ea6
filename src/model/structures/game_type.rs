use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum GameType {
    Solo,
    Team
}

impl GameType {
    pub fn is_team(&self) -> bool {
        *self == GameType::Team
    }
}

#[cfg(test)]
mod tests {
    use super::GameType;
    use std::str::FromStr;

    #[test]
    fn test_display() {
        assert_eq!(GameType::Solo.to_string(), "SOLO");
        assert_eq!(GameType::Team.to_string(), "TEAM");
    }

    #[test]
    fn test_parse() {
        assert_eq!(GameType::from_str("team"), Ok(GameType::Team));
        assert_eq!(GameType::from_str("SOLO"), Ok(GameType::Solo));
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&GameType::Team).unwrap(), "\"TEAM\"");
        assert_eq!(serde_json::from_str::<GameType>("\"SOLO\"").unwrap(), GameType::Solo);
    }
}
