//! Vehicle kinds and their static profiles.
//!
//! Every behavioural difference between vehicles is a lookup into
//! [`KindProfile`]: damage tolerance, traversal speed, movement pattern,
//! style class and capabilities (reversing, siren).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DerbyError;

// =============================================================================
// Axis / Direction
// =============================================================================

/// The coordinate an animation drives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// The `left` coordinate.
    Horizontal,
    /// The `top` coordinate.
    Vertical,
}

/// Edge-to-edge travel direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards `width`, wrapping to `-overhang`.
    Right,
    /// Towards `-overhang`, wrapping to `width`.
    Left,
    /// Towards `-overhang`, wrapping to `height`.
    Up,
    /// Towards `height`, wrapping to `0`.
    Down,
}

impl Direction {
    /// Returns the axis this direction animates.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Right | Self::Left => Axis::Horizontal,
            Self::Up | Self::Down => Axis::Vertical,
        }
    }

    /// Returns the direction travelling the other way along the same axis.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Right => write!(f, "right"),
            Self::Left => write!(f, "left"),
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

// =============================================================================
// Kind profiles
// =============================================================================

/// Static per-kind configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindProfile {
    /// Hits needed to destroy the vehicle.
    pub damage_tolerance: u32,
    /// Duration of one edge-to-edge traversal in milliseconds.
    pub speed_ms: u64,
    /// Directions driven while in forward gear.
    pub forward: &'static [Direction],
    /// Directions driven while in reverse. `None` for kinds without gears.
    pub reverse: Option<&'static [Direction]>,
    /// Style class applied to the visual.
    pub class_name: &'static str,
    /// Whether the vehicle carries a siren.
    pub has_siren: bool,
}

impl KindProfile {
    /// Returns `true` if the kind can shift into reverse.
    #[must_use]
    pub const fn can_reverse(&self) -> bool {
        self.reverse.is_some()
    }
}

const SEDAN: KindProfile = KindProfile {
    damage_tolerance: 2,
    speed_ms: 5000,
    forward: &[Direction::Right],
    reverse: Some(&[Direction::Left]),
    class_name: "car",
    has_siren: false,
};

const POLICE_CAR: KindProfile = KindProfile {
    damage_tolerance: 3,
    speed_ms: 5000,
    forward: &[Direction::Down],
    reverse: Some(&[Direction::Up]),
    class_name: "cop",
    has_siren: true,
};

const MOTORCYCLE: KindProfile = KindProfile {
    damage_tolerance: 1,
    speed_ms: 2500,
    forward: &[Direction::Right, Direction::Down],
    reverse: None,
    class_name: "motorcycle",
    has_siren: false,
};

const TANK: KindProfile = KindProfile {
    damage_tolerance: 10,
    speed_ms: 10_000,
    forward: &[Direction::Up, Direction::Left],
    reverse: None,
    class_name: "tank",
    has_siren: false,
};

/// The kinds of vehicle that can enter the derby.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    /// Plain car driving horizontally.
    #[serde(alias = "car")]
    Sedan,
    /// Car with a siren driving vertically.
    #[serde(alias = "police", alias = "cop")]
    PoliceCar,
    /// Fragile and fast, drives diagonally down-right.
    #[serde(alias = "moto")]
    Motorcycle,
    /// Slow and sturdy, drives diagonally up-left.
    Tank,
}

impl VehicleKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 4] = [Self::Sedan, Self::PoliceCar, Self::Motorcycle, Self::Tank];

    /// Returns the static profile for this kind.
    #[must_use]
    pub const fn profile(self) -> &'static KindProfile {
        match self {
            Self::Sedan => &SEDAN,
            Self::PoliceCar => &POLICE_CAR,
            Self::Motorcycle => &MOTORCYCLE,
            Self::Tank => &TANK,
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sedan => write!(f, "sedan"),
            Self::PoliceCar => write!(f, "police"),
            Self::Motorcycle => write!(f, "motorcycle"),
            Self::Tank => write!(f, "tank"),
        }
    }
}

impl FromStr for VehicleKind {
    type Err = DerbyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sedan" | "car" => Ok(Self::Sedan),
            "police" | "police_car" | "cop" => Ok(Self::PoliceCar),
            "motorcycle" | "moto" => Ok(Self::Motorcycle),
            "tank" => Ok(Self::Tank),
            _ => Err(DerbyError::UnknownKind(s.to_string())),
        }
    }
}
