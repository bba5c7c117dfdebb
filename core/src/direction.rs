//! The six directions of the hex lattice and edge classification.

use serde::{Deserialize, Serialize};

/// Direction from a cell toward one of its six neighbors.
///
/// Directions are ordered clockwise starting at north-east, matching the
/// bit order of persisted road masks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HexDirection {
    /// North-east.
    NE,
    /// East.
    E,
    /// South-east.
    SE,
    /// South-west.
    SW,
    /// West.
    W,
    /// North-west.
    NW,
}

impl HexDirection {
    /// All directions in clockwise order.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::NE,
        HexDirection::E,
        HexDirection::SE,
        HexDirection::SW,
        HexDirection::W,
        HexDirection::NW,
    ];

    /// Zero-based index of the direction in clockwise order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Resolves a direction from its clockwise index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self.index() + 3) % 6]
    }

    /// Next direction counter-clockwise.
    #[must_use]
    pub const fn previous(self) -> Self {
        Self::ALL[(self.index() + 5) % 6]
    }

    /// Next direction clockwise.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % 6]
    }
}

/// Classification of the boundary between two neighboring cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Both cells share the same elevation.
    Flat,
    /// Elevations differ by exactly one step.
    Slope,
    /// Elevations differ by more than one step.
    Cliff,
}

impl EdgeType {
    /// Classifies the edge between cells at the provided elevations.
    #[must_use]
    pub const fn between(elevation: i32, other: i32) -> Self {
        if elevation == other {
            return Self::Flat;
        }
        if elevation.abs_diff(other) == 1 {
            Self::Slope
        } else {
            Self::Cliff
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for direction in HexDirection::ALL {
            assert_ne!(direction.opposite(), direction);
            assert_eq!(direction.opposite().opposite(), direction);
        }
        assert_eq!(HexDirection::NE.opposite(), HexDirection::SW);
        assert_eq!(HexDirection::W.opposite(), HexDirection::E);
    }

    #[test]
    fn next_and_previous_wrap_around() {
        assert_eq!(HexDirection::NW.next(), HexDirection::NE);
        assert_eq!(HexDirection::NE.previous(), HexDirection::NW);
        for direction in HexDirection::ALL {
            assert_eq!(direction.next().previous(), direction);
        }
    }

    #[test]
    fn index_round_trips() {
        for (index, direction) in HexDirection::ALL.into_iter().enumerate() {
            assert_eq!(direction.index(), index);
            assert_eq!(HexDirection::from_index(index), Some(direction));
        }
        assert_eq!(HexDirection::from_index(6), None);
    }

    #[test]
    fn edge_type_follows_elevation_delta() {
        assert_eq!(EdgeType::between(2, 2), EdgeType::Flat);
        assert_eq!(EdgeType::between(2, 3), EdgeType::Slope);
        assert_eq!(EdgeType::between(3, 2), EdgeType::Slope);
        assert_eq!(EdgeType::between(0, 2), EdgeType::Cliff);
        assert_eq!(EdgeType::between(5, 1), EdgeType::Cliff);
    }
}
