//! Named faces of an axis-aligned box and the static tables that relabel them
//! under 90° rotations

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CycadError;

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in x, y, z order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index into a `DVec3`
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two axes swapped by a rotation that holds this axis fixed
    pub fn swapped_pair(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// The axis whose coordinate is mirrored (`max - c`) by one turn about `self`
    pub fn mirrored(self) -> Axis {
        match self {
            Axis::X => Axis::Z,
            Axis::Y => Axis::X,
            Axis::Z => Axis::Y,
        }
    }
}

/// One of the six faces of a rectangular part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
}

use Side::{Back, Bottom, Front, Left, Right, Top};

// Relabel tables, indexed by `Side as usize`. Entry `p` names the face that
// moves into position `p` after one quarter turn:
//   freeze Z (swap_xy): LEFT <- BACK <- RIGHT <- FRONT <- LEFT
//   freeze Y (swap_xz): LEFT <- BOTTOM <- RIGHT <- TOP <- LEFT
//   freeze X (swap_yz): TOP <- BACK <- BOTTOM <- FRONT <- TOP
const SWAP_XY_SOURCE: [Side; 6] = [Top, Bottom, Back, Front, Left, Right];
const SWAP_XZ_SOURCE: [Side; 6] = [Left, Right, Bottom, Top, Front, Back];
const SWAP_YZ_SOURCE: [Side; 6] = [Back, Front, Left, Right, Top, Bottom];

const OPPOSITE: [Side; 6] = [Bottom, Top, Right, Left, Back, Front];

impl Side {
    /// All sides in declaration order
    pub const ALL: [Side; 6] = [Top, Bottom, Left, Right, Front, Back];

    /// The face on the other end of the same axis
    pub fn opposite(self) -> Side {
        OPPOSITE[self as usize]
    }

    /// The axis this face is perpendicular to
    pub fn axis(self) -> Axis {
        match self {
            Top | Bottom => Axis::Z,
            Left | Right => Axis::X,
            Front | Back => Axis::Y,
        }
    }

    /// Whether this face lies on the maximum plane of its axis
    pub fn is_max(self) -> bool {
        matches!(self, Top | Right | Back)
    }

    /// Upper-case label used in exported records
    pub fn name(self) -> &'static str {
        match self {
            Top => "TOP",
            Bottom => "BOTTOM",
            Left => "LEFT",
            Right => "RIGHT",
            Front => "FRONT",
            Back => "BACK",
        }
    }

    /// The face holding this one's position after `turns` quarter turns with
    /// `frozen` held fixed
    pub fn rotated(self, frozen: Axis, turns: u8) -> Side {
        let table = match frozen {
            Axis::X => &SWAP_YZ_SOURCE,
            Axis::Y => &SWAP_XZ_SOURCE,
            Axis::Z => &SWAP_XY_SOURCE,
        };
        let mut side = self;
        for _ in 0..turns % 4 {
            side = Side::ALL
                .into_iter()
                .find(|position| table[*position as usize] == side)
                .unwrap_or(side);
        }
        side
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Side {
    type Err = CycadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TOP" => Ok(Top),
            "BOTTOM" => Ok(Bottom),
            "LEFT" => Ok(Left),
            "RIGHT" => Ok(Right),
            "FRONT" => Ok(Front),
            "BACK" => Ok(Back),
            _ => Err(CycadError::invalid(format!("unknown side '{s}'"))),
        }
    }
}
