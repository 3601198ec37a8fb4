use multiview_common::Color;
use serde::{Deserialize, Serialize};

/// Alternating background colors for regions and cells.
///
/// Stateless and cosmetic: the color depends only on index parity and is
/// looked up at render time rather than stored in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearColorPolicy {
    pub even: Color,
    pub odd: Color,
}

impl Default for ClearColorPolicy {
    fn default() -> Self {
        Self {
            even: Color::from_hex(0xc0c0c0),
            odd: Color::from_hex(0xe0e0e0),
        }
    }
}

impl ClearColorPolicy {
    pub fn new(even: Color, odd: Color) -> Self {
        Self { even, odd }
    }

    /// Same color for every index.
    pub fn uniform(color: Color) -> Self {
        Self::new(color, color)
    }

    pub fn color_for(&self, index: usize) -> Color {
        if index % 2 == 0 { self.even } else { self.odd }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_alternate_by_parity() {
        let policy = ClearColorPolicy::default();
        let a = Color::from_hex(0xc0c0c0);
        let b = Color::from_hex(0xe0e0e0);
        let seen: Vec<Color> = (0..4).map(|i| policy.color_for(i)).collect();
        assert_eq!(seen, vec![a, b, a, b]);
    }

    #[test]
    fn uniform_policy_ignores_index() {
        let c = Color::from_hex(0xe0e0e0);
        let policy = ClearColorPolicy::uniform(c);
        assert!((0..7).all(|i| policy.color_for(i) == c));
    }
}
