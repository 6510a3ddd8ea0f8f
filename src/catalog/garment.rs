use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Rgba8;
use crate::foundation::error::StudioError;

/// Garment product line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    /// Classic t-shirt.
    #[default]
    #[serde(rename = "t-shirt", alias = "T-Shirt")]
    TShirt,
    /// Hooded sweatshirt.
    #[serde(alias = "Hoodie")]
    Hoodie,
    /// Sleeveless top.
    #[serde(alias = "Tank Top")]
    TankTop,
    /// Long-sleeved shirt.
    #[serde(alias = "Long Sleeve")]
    LongSleeve,
}

impl ProductType {
    /// All product lines in storefront order.
    pub const ALL: [Self; 4] = [Self::TShirt, Self::Hoodie, Self::TankTop, Self::LongSleeve];

    /// Stable identifier used in config and documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TShirt => "t-shirt",
            Self::Hoodie => "hoodie",
            Self::TankTop => "tank-top",
            Self::LongSleeve => "long-sleeve",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::TShirt => "T-Shirt",
            Self::Hoodie => "Hoodie",
            Self::TankTop => "Tank Top",
            Self::LongSleeve => "Long Sleeve",
        }
    }
}

/// One of the eight named garment colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentColor {
    #[default]
    Black,
    White,
    Red,
    Blue,
    Green,
    Yellow,
    Pink,
    #[serde(alias = "grey")]
    Gray,
}

impl GarmentColor {
    /// All colors in swatch order.
    pub const ALL: [Self; 8] = [
        Self::Black,
        Self::White,
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Pink,
        Self::Gray,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Gray => "gray",
        }
    }

    /// Swatch color shown next to the garment picker.
    pub fn swatch(self) -> Rgba8 {
        match self {
            Self::Black => Rgba8::rgb(0x00, 0x00, 0x00),
            Self::White => Rgba8::rgb(0xff, 0xff, 0xff),
            Self::Red => Rgba8::rgb(0xff, 0x00, 0x00),
            Self::Blue => Rgba8::rgb(0x00, 0x00, 0xff),
            Self::Green => Rgba8::rgb(0x00, 0x80, 0x00),
            Self::Yellow => Rgba8::rgb(0xff, 0xff, 0x00),
            Self::Pink => Rgba8::rgb(0xff, 0x00, 0xff),
            Self::Gray => Rgba8::rgb(0x80, 0x80, 0x80),
        }
    }
}

/// Camera angle of the garment photo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewAngle {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

impl ViewAngle {
    pub const ALL: [Self; 4] = [Self::Front, Self::Back, Self::Left, Self::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// The garment a design is rendered onto.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GarmentSelection {
    /// Product line.
    pub product: ProductType,
    /// Garment color.
    pub color: GarmentColor,
    /// View angle.
    pub view: ViewAngle,
}

impl GarmentSelection {
    /// Build a selection from its three parts.
    pub fn new(product: ProductType, color: GarmentColor, view: ViewAngle) -> Self {
        Self {
            product,
            color,
            view,
        }
    }

    /// Same garment, different product line.
    pub fn with_product(self, product: ProductType) -> Self {
        Self { product, ..self }
    }

    /// Same garment, different color.
    pub fn with_color(self, color: GarmentColor) -> Self {
        Self { color, ..self }
    }

    /// Same garment, different view angle.
    pub fn with_view(self, view: ViewAngle) -> Self {
        Self { view, ..self }
    }
}

impl fmt::Display for GarmentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.product.as_str(),
            self.color.as_str(),
            self.view.as_str()
        )
    }
}

fn normalize_key(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            ' ' | '_' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

impl FromStr for ProductType {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        match key.as_str() {
            "t-shirt" | "tshirt" => Ok(Self::TShirt),
            "hoodie" => Ok(Self::Hoodie),
            "tank-top" | "tanktop" => Ok(Self::TankTop),
            "long-sleeve" | "longsleeve" => Ok(Self::LongSleeve),
            _ => Err(StudioError::validation(format!("unknown product '{s}'"))),
        }
    }
}

impl FromStr for GarmentColor {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        if key == "grey" {
            return Ok(Self::Gray);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| StudioError::validation(format!("unknown garment color '{s}'")))
    }
}

impl FromStr for ViewAngle {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == key)
            .ok_or_else(|| StudioError::validation(format!("unknown view angle '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/garment.rs"]
mod tests;
