use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// A laser-tag hardware platform. Each one reports raw data in its own shape.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display, EnumString
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum System {
    #[strum(serialize = "evo5")]
    Evo5,
    #[strum(serialize = "evo6")]
    Evo6,
    #[strum(serialize = "laserforce")]
    LaserForce
}

impl System {
    /// Evo5 and Evo6 share the LaserMaxx counter set.
    pub fn is_lasermaxx(&self) -> bool {
        matches!(self, System::Evo5 | System::Evo6)
    }

    /// Parses a comma separated system list. Unknown names are skipped,
    /// duplicates keep their first position.
    pub fn parse_list(value: &str) -> Vec<System> {
        let mut systems = Vec::new();
        for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Ok(system) = System::from_str(name) {
                if !systems.contains(&system) {
                    systems.push(system);
                }
            }
        }

        systems
    }
}
