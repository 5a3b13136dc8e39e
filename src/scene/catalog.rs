//! Display names and short descriptions of the stock bodies.

use super::selection::{next_selection, previous_selection};

/// Catalog entry for one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyInfo {
    /// Display name.
    pub name: &'static str,
    /// One-paragraph description.
    pub description: &'static str,
}

/// Entries by selection index: sun, eight planets, moon.
pub const CATALOG: [BodyInfo; 10] = [
    BodyInfo {
        name: "Sun",
        description: "The star at the centre of the Solar System. About 1.39 million km across with a surface \
                      temperature near 5500 °C; the source of light and heat for every planet.",
    },
    BodyInfo {
        name: "Mercury",
        description: "The planet closest to the Sun, 4879 km across. Temperatures swing from +427 °C by day to \
                      -173 °C at night.",
    },
    BodyInfo {
        name: "Venus",
        description: "The second planet and the hottest, around 464 °C, because of a runaway greenhouse effect. \
                      Its atmosphere is almost entirely CO2.",
    },
    BodyInfo {
        name: "Earth",
        description: "The third planet and the only one known to host life. 12 742 km across, with 71% of the \
                      surface covered by water.",
    },
    BodyInfo {
        name: "Mars",
        description: "The fourth planet, 6779 km across. A thin atmosphere, polar ice caps and Olympus Mons, the \
                      tallest volcano in the Solar System.",
    },
    BodyInfo {
        name: "Jupiter",
        description: "The fifth and largest planet, a gas giant 318 times as massive as Earth. Its Great Red Spot \
                      is a storm larger than Earth.",
    },
    BodyInfo {
        name: "Saturn",
        description: "The sixth planet, famous for its ring system. A gas giant less dense than water.",
    },
    BodyInfo {
        name: "Uranus",
        description: "The seventh planet, an ice giant whose rotation axis is tilted by almost 98°. It has faint \
                      rings and 27 known moons.",
    },
    BodyInfo {
        name: "Neptune",
        description: "The eighth and most distant planet. An ice giant with the strongest winds in the Solar \
                      System, up to 2100 km/h; methane gives it its deep blue colour.",
    },
    BodyInfo {
        name: "Moon",
        description: "Earth's only natural satellite, about 3474 km across. Cratered and airless, from +127 °C by \
                      day to -173 °C at night, and tidally locked so the same side always faces Earth.",
    },
];

/// Catalog entry for a selection index, if any.
pub fn body_info(index: i32) -> Option<&'static BodyInfo> {
    usize::try_from(index).ok().and_then(|i| CATALOG.get(i))
}

/// Next catalog index, wrapping.
pub fn next_index(index: i32) -> i32 {
    next_selection(index, CATALOG.len() as i32)
}

/// Previous catalog index, wrapping.
pub fn previous_index(index: i32) -> i32 {
    previous_selection(index, CATALOG.len() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(body_info(0).map(|b| b.name), Some("Sun"));
        assert_eq!(body_info(3).map(|b| b.name), Some("Earth"));
        assert_eq!(body_info(9).map(|b| b.name), Some("Moon"));
        assert!(body_info(10).is_none());
        assert!(body_info(-1).is_none());
    }

    #[test]
    fn test_stepping_wraps() {
        assert_eq!(next_index(9), 0);
        assert_eq!(previous_index(0), 9);
        let mut index = 0;
        for _ in 0..CATALOG.len() {
            index = next_index(index);
        }
        assert_eq!(index, 0);
    }

    #[test]
    fn test_descriptions_are_single_spaced() {
        for info in &CATALOG {
            assert!(!info.description.contains("  "), "{}", info.name);
        }
    }
}
