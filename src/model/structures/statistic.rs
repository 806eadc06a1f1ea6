use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// A per-player statistic with a regression baseline.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Statistic {
    Hits,
    Deaths,
    HitsOwn,
    DeathsOwn
}

impl Statistic {
    /// Own-team statistics only exist in team games.
    pub fn is_own_team(&self) -> bool {
        matches!(self, Statistic::HitsOwn | Statistic::DeathsOwn)
    }
}
