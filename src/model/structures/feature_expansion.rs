use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Feature set a baseline model was fitted on. Declaration order is the
/// preference order when two fits explain the data equally well.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FeatureExpansion {
    Linear,
    Interaction,
    Quadratic
}

impl FeatureExpansion {
    /// Expands (enemies, teammates, game length) into a feature row.
    pub fn expand(&self, enemies: f64, teammates: f64, length: f64) -> Vec<f64> {
        let mut row = vec![1.0, enemies, teammates, length];
        if *self == FeatureExpansion::Linear {
            return row;
        }

        row.extend([enemies * teammates, enemies * length, teammates * length]);
        if *self == FeatureExpansion::Interaction {
            return row;
        }

        row.extend([enemies * enemies, teammates * teammates, length * length]);
        row
    }

    pub fn width(&self) -> usize {
        match self {
            FeatureExpansion::Linear => 4,
            FeatureExpansion::Interaction => 7,
            FeatureExpansion::Quadratic => 10
        }
    }
}
