use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A `#rrggbb` presentation color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{:02x}{:02x}{:02x}", r, g, b))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Bounded set of peer colors, generated once at startup.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Generate `size` random colors. A seed makes the palette reproducible.
    pub fn generate(size: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let colors = (0..size.max(1))
            .map(|_| {
                // Mid-range channels keep the cursor readable on white and black.
                Color::from_rgb(
                    rng.gen_range(48..=224),
                    rng.gen_range(48..=224),
                    rng.gen_range(48..=224),
                )
            })
            .collect();
        Self { colors }
    }

    /// Panics if `colors` is empty.
    pub fn from_colors(colors: Vec<Color>) -> Self {
        assert!(!colors.is_empty(), "palette needs at least one color");
        Self { colors }
    }

    /// Color of the peer at `rank`, cycling once the palette is exhausted.
    pub fn color_for_rank(&self, rank: usize) -> &Color {
        &self.colors[rank % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = Palette::generate(8, Some(7));
        let b = Palette::generate(8, Some(7));
        assert_eq!(a.len(), 8);
        for rank in 0..8 {
            assert_eq!(a.color_for_rank(rank), b.color_for_rank(rank));
            assert_eq!(a.color_for_rank(rank).as_str().len(), 7);
        }
    }

    #[test]
    fn test_rank_wraps_around() {
        let palette = Palette::from_colors(vec![
            Color::from_rgb(255, 0, 0),
            Color::from_rgb(0, 255, 0),
            Color::from_rgb(0, 0, 255),
        ]);
        assert_eq!(palette.color_for_rank(0).as_str(), "#ff0000");
        assert_eq!(palette.color_for_rank(3).as_str(), "#ff0000");
        assert_eq!(palette.color_for_rank(5).as_str(), "#0000ff");
    }

    #[test]
    fn test_empty_size_still_has_one_color() {
        assert_eq!(Palette::generate(0, Some(1)).len(), 1);
    }
}
