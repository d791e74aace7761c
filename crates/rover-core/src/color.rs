#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{GarageColor, Rgb};

/// Named colours the course uses as landmarks.
///
/// Each colour is recognised by a fixed empirical rule over the filtered channels. The `*Sl` variants are the
/// parking-card colours seen from the slalom board; they use looser rules than the floor markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Color {
    JetBlack,
    JetBlackYmnk,
    Black,
    Blue,
    BlueSl,
    Blue2,
    Red,
    RedSl,
    Yellow,
    YellowSl,
    Green,
    GreenSl,
    Gray,
    White,
}

impl Color {
    pub fn matches(self, c: Rgb) -> bool {
        let Rgb { r, g, b } = c;
        match self {
            Color::JetBlack => r <= 35 && g <= 35 && b <= 50,
            Color::JetBlackYmnk => r <= 11 && g <= 13 && b <= 15,
            Color::Black => r <= 50 && g <= 45 && b <= 60,
            Color::Blue => b - r > 35 && g >= 55 && (70..=100).contains(&b),
            Color::BlueSl => b - r > 20 && g <= 100 && b <= 120,
            Color::Blue2 => r <= 20 && g <= 40 && b >= 44 && b - r > 20,
            Color::Red => r - b >= 30 && r > 80 && g < 45,
            Color::RedSl => r - b >= 25 && r > 85 && g < 60,
            Color::Yellow => r >= 90 && g >= 90 && b <= 75,
            Color::YellowSl => r >= 110 && g >= 90 && (50..=120).contains(&b),
            // The floor marker also accepts anything the card rule does.
            Color::Green => (g - r > 20 && g >= 40 && r <= 100) || Color::GreenSl.matches(c),
            Color::GreenSl => b - r < 30 && g >= 30 && b <= 80,
            Color::Gray => (45..=52).contains(&r) && g <= 60 && (53..=65).contains(&b),
            Color::White => r >= 100 && g >= 100 && b >= 100,
        }
    }

    /// The parking colour a card rule stands for, if this is one.
    pub fn garage(self) -> Option<GarageColor> {
        match self {
            Color::BlueSl => Some(GarageColor::Blue),
            Color::RedSl => Some(GarageColor::Red),
            Color::YellowSl => Some(GarageColor::Yellow),
            Color::GreenSl => Some(GarageColor::Green),
            _ => None,
        }
    }

    /// Card rules in the order the slalom board checks them.
    pub const CARDS: [Color; 4] = [Color::BlueSl, Color::RedSl, Color::YellowSl, Color::GreenSl];
}
