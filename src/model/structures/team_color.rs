use serde_repr::{Deserialize_repr, Serialize_repr};
use std::convert::TryFrom;
use strum_macros::EnumIter;

/// Vest color index as reported by the hardware.
#[derive(Deserialize_repr, Serialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
#[repr(u8)]
pub enum TeamColor {
    Red = 0,
    Green = 1,
    Blue = 2,
    Pink = 3,
    Yellow = 4,
    Ocean = 5
}

impl TeamColor {
    pub fn default_name(&self) -> &'static str {
        match self {
            TeamColor::Red => "Red team",
            TeamColor::Green => "Green team",
            TeamColor::Blue => "Blue team",
            TeamColor::Pink => "Pink team",
            TeamColor::Yellow => "Yellow team",
            TeamColor::Ocean => "Ocean team"
        }
    }
}

impl TryFrom<i32> for TeamColor {
    type Error = ();

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(TeamColor::Red),
            1 => Ok(TeamColor::Green),
            2 => Ok(TeamColor::Blue),
            3 => Ok(TeamColor::Pink),
            4 => Ok(TeamColor::Yellow),
            5 => Ok(TeamColor::Ocean),
            _ => Err(())
        }
    }
}
