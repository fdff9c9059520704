//! Button color palette

use rand::Rng;

/// One of the four game buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl ButtonColor {
    /// Fixed palette, in button order
    pub const ALL: [ButtonColor; 4] = [
        ButtonColor::Red,
        ButtonColor::Blue,
        ButtonColor::Green,
        ButtonColor::Yellow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonColor::Red => "red",
            ButtonColor::Blue => "blue",
            ButtonColor::Green => "green",
            ButtonColor::Yellow => "yellow",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "red" => Some(ButtonColor::Red),
            "blue" => Some(ButtonColor::Blue),
            "green" => Some(ButtonColor::Green),
            "yellow" => Some(ButtonColor::Yellow),
            _ => None,
        }
    }

    /// Uniform draw from the palette
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Next color in palette order, wrapping (title animation)
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for ButtonColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_parse_round_trips_names() {
        for color in ButtonColor::ALL {
            assert_eq!(ButtonColor::from_str(color.as_str()), Some(color));
        }
        assert_eq!(ButtonColor::from_str(" Yellow "), Some(ButtonColor::Yellow));
        assert_eq!(ButtonColor::from_str("purple"), None);
    }

    #[test]
    fn test_next_wraps_around_palette() {
        assert_eq!(ButtonColor::Red.next(), ButtonColor::Blue);
        assert_eq!(ButtonColor::Yellow.next(), ButtonColor::Red);
    }

    #[test]
    fn test_random_covers_palette() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(ButtonColor::random(&mut rng));
        }
        assert_eq!(seen.len(), ButtonColor::ALL.len());
    }
}
