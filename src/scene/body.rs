//! Body identifiers and the selection index mapping.

use std::fmt;

/// One drawable celestial body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyId {
    /// The central star. Selection index 0.
    Sun,
    /// Planet `i`, innermost first. Selection index `i + 1`.
    Planet(usize),
    /// The moon. Selection index `planet_count + 1`.
    Moon,
}

impl BodyId {
    /// Map a selection index onto a body. Anything outside
    /// `0..=planet_count + 1` selects nothing.
    pub fn from_selection(index: i32, planet_count: usize) -> Option<Self> {
        let index = usize::try_from(index).ok()?;
        match index {
            0 => Some(Self::Sun),
            i if i <= planet_count => Some(Self::Planet(i - 1)),
            i if i == planet_count + 1 => Some(Self::Moon),
            _ => None,
        }
    }

    /// Selection index of this body.
    pub fn selection_index(self, planet_count: usize) -> i32 {
        let index = match self {
            Self::Sun => 0,
            Self::Planet(i) => i + 1,
            Self::Moon => planet_count + 1,
        };
        i32::try_from(index).unwrap_or(i32::MAX)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sun => f.write_str("sun"),
            Self::Planet(i) => write!(f, "planet {i}"),
            Self::Moon => f.write_str("moon"),
        }
    }
}
