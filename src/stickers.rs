//! Built-in sticker catalog.
//!
//! Each sticker is a small 64×64 SVG tinted with its catalog color and shipped
//! as a `data:image/svg+xml;base64,` URI, so stamping one needs no network
//! fetch. The color doubles as the fallback fill if the image cannot be
//! decoded.

#[cfg(test)]
#[path = "stickers_test.rs"]
mod stickers_test;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::doc::StickerData;

/// One catalog entry. `body` is SVG markup with `{color}` standing for the tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickerDef {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    body: &'static str,
}

const SVG_OPEN: &str = r#"<svg width="64" height="64" viewBox="0 0 64 64" xmlns="http://www.w3.org/2000/svg">"#;
const SVG_CLOSE: &str = "</svg>";

pub const CATALOG: &[StickerDef] = &[
    StickerDef {
        id: "heart",
        name: "Heart",
        color: "#ff6b6b",
        body: r##"<path d="M32 50c-8-6-20-16-20-24 0-6 4-10 10-10 3 0 6 2 10 6 4-4 7-6 10-6 6 0 10 4 10 10 0 8-12 18-20 24z" fill="{color}" stroke="#fff" stroke-width="2"/>"##,
    },
    StickerDef {
        id: "star",
        name: "Star",
        color: "#ffd93d",
        body: r##"<path d="M32 4l8 18 20 2-15 14 4 20-17-11-17 11 4-20-15-14 20-2z" fill="{color}" stroke="#fff" stroke-width="2"/>"##,
    },
    StickerDef {
        id: "smile",
        name: "Smile",
        color: "#ffa500",
        body: r##"<circle cx="32" cy="32" r="24" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="24" cy="26" r="3" fill="#fff"/><circle cx="40" cy="26" r="3" fill="#fff"/><path d="M20 38 Q32 44 44 38" stroke="#fff" stroke-width="3" fill="none" stroke-linecap="round"/>"##,
    },
    StickerDef {
        id: "flower",
        name: "Flower",
        color: "#ff69b4",
        body: r##"<circle cx="32" cy="32" r="12" fill="{color}" stroke="#fff" stroke-width="2"/><ellipse cx="32" cy="16" rx="8" ry="12" fill="{color}" stroke="#fff" stroke-width="2"/><ellipse cx="32" cy="48" rx="8" ry="12" fill="{color}" stroke="#fff" stroke-width="2"/><ellipse cx="16" cy="32" rx="12" ry="8" fill="{color}" stroke="#fff" stroke-width="2"/><ellipse cx="48" cy="32" rx="12" ry="8" fill="{color}" stroke="#fff" stroke-width="2"/>"##,
    },
    StickerDef {
        id: "balloon",
        name: "Balloon",
        color: "#4ecdc4",
        body: r##"<ellipse cx="32" cy="28" rx="14" ry="18" fill="{color}" stroke="#fff" stroke-width="2"/><path d="M32 46 L32 58 M28 54 L32 58 L36 54" stroke="#fff" stroke-width="2" fill="none" stroke-linecap="round"/>"##,
    },
    StickerDef {
        id: "cake",
        name: "Cake",
        color: "#ff9f9f",
        body: r##"<rect x="16" y="32" width="32" height="20" rx="2" fill="{color}" stroke="#fff" stroke-width="2"/><rect x="20" y="24" width="24" height="8" rx="2" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="28" cy="20" r="2" fill="#fff"/><circle cx="36" cy="20" r="2" fill="#fff"/><circle cx="32" cy="16" r="2" fill="#fff"/>"##,
    },
    StickerDef {
        id: "gift",
        name: "Gift",
        color: "#ff6b9d",
        body: r##"<rect x="20" y="24" width="24" height="28" rx="2" fill="{color}" stroke="#fff" stroke-width="2"/><rect x="20" y="38" width="24" height="4" fill="#fff" opacity="0.8"/><rect x="30" y="24" width="4" height="28" fill="#fff" opacity="0.8"/><path d="M32 20 L32 24 M28 22 L36 22" stroke="#fff" stroke-width="2" stroke-linecap="round"/>"##,
    },
    StickerDef {
        id: "party",
        name: "Party Hat",
        color: "#ffd93d",
        body: r##"<path d="M32 8 L28 32 L32 28 L36 32 Z" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="32" cy="40" r="12" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="26" cy="36" r="2" fill="#fff"/><circle cx="38" cy="36" r="2" fill="#fff"/><path d="M24 44 Q32 48 40 44" stroke="#fff" stroke-width="2" fill="none" stroke-linecap="round"/>"##,
    },
    StickerDef {
        id: "music",
        name: "Music Note",
        color: "#a8d5e2",
        body: r##"<path d="M20 16 L20 40 Q20 48 28 48 Q36 48 36 40 L36 20 L48 16 L48 36 Q48 44 40 44 Q32 44 32 36" fill="none" stroke="{color}" stroke-width="3" stroke-linecap="round" stroke-linejoin="round"/><circle cx="28" cy="48" r="4" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="40" cy="44" r="4" fill="{color}" stroke="#fff" stroke-width="2"/>"##,
    },
    StickerDef {
        id: "rainbow",
        name: "Rainbow",
        color: "#ff6b6b",
        body: r##"<path d="M8 40 Q32 20 56 40" stroke="#ff6b6b" stroke-width="4" fill="none" stroke-linecap="round"/><path d="M10 44 Q32 26 54 44" stroke="#ffd93d" stroke-width="4" fill="none" stroke-linecap="round"/><path d="M12 48 Q32 32 52 48" stroke="#b5e5cf" stroke-width="4" fill="none" stroke-linecap="round"/><path d="M14 52 Q32 38 50 52" stroke="#a8d5e2" stroke-width="4" fill="none" stroke-linecap="round"/>"##,
    },
    StickerDef {
        id: "sun",
        name: "Sun",
        color: "#ffd93d",
        body: r##"<circle cx="32" cy="32" r="16" fill="{color}" stroke="#fff" stroke-width="2"/><path d="M32 8 L32 4 M32 60 L32 56 M8 32 L4 32 M60 32 L56 32 M18 18 L15 15 M46 46 L49 49 M46 18 L49 15 M18 46 L15 49" stroke="{color}" stroke-width="3" stroke-linecap="round"/>"##,
    },
    StickerDef {
        id: "moon",
        name: "Moon",
        color: "#c4c4ff",
        body: r##"<path d="M32 12 Q20 20 20 32 Q20 44 32 52 Q44 44 44 32 Q44 20 32 12 Z" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="40" cy="24" r="4" fill="#fff" opacity="0.3"/><circle cx="36" cy="28" r="2" fill="#fff" opacity="0.2"/>"##,
    },
    StickerDef {
        id: "butterfly",
        name: "Butterfly",
        color: "#ff9f9f",
        body: r##"<ellipse cx="20" cy="32" rx="12" ry="16" fill="{color}" stroke="#fff" stroke-width="2"/><ellipse cx="44" cy="32" rx="12" ry="16" fill="{color}" stroke="#fff" stroke-width="2"/><ellipse cx="32" cy="28" rx="4" ry="8" fill="{color}" stroke="#fff" stroke-width="2"/><path d="M32 20 L32 44" stroke="#fff" stroke-width="2" stroke-linecap="round"/><circle cx="28" cy="24" r="2" fill="#fff"/><circle cx="36" cy="24" r="2" fill="#fff"/>"##,
    },
    StickerDef {
        id: "cloud",
        name: "Cloud",
        color: "#e0e0e0",
        body: r##"<path d="M20 40 Q12 40 12 32 Q12 24 20 24 Q22 18 28 18 Q34 18 36 24 Q44 24 44 32 Q44 40 36 40 Z" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="24" cy="28" r="3" fill="#fff" opacity="0.3"/><circle cx="36" cy="30" r="2" fill="#fff" opacity="0.3"/>"##,
    },
    StickerDef {
        id: "lightning",
        name: "Lightning",
        color: "#ffd93d",
        body: r##"<path d="M32 8 L24 32 L32 28 L40 52 L32 48 L24 56 Z" fill="{color}" stroke="#fff" stroke-width="2"/>"##,
    },
    StickerDef {
        id: "fire",
        name: "Fire",
        color: "#ff6b6b",
        body: r##"<path d="M32 56 Q28 52 28 48 Q28 44 32 40 Q36 36 36 32 Q36 28 32 24 Q28 20 28 16 Q28 12 32 8 Q36 12 36 16 Q36 20 40 24 Q44 28 44 32 Q44 36 40 40 Q36 44 36 48 Q36 52 32 56 Z" fill="{color}" stroke="#fff" stroke-width="2"/><path d="M28 40 Q32 36 36 40" fill="#ffd93d" opacity="0.6"/>"##,
    },
    StickerDef {
        id: "diamond",
        name: "Diamond",
        color: "#a8d5e2",
        body: r##"<path d="M32 8 L48 32 L32 56 L16 32 Z" fill="{color}" stroke="#fff" stroke-width="2"/><path d="M32 8 L32 56 M16 32 L48 32" stroke="#fff" stroke-width="1.5" opacity="0.5"/>"##,
    },
    StickerDef {
        id: "clover",
        name: "Clover",
        color: "#b5e5cf",
        body: r##"<circle cx="32" cy="32" r="8" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="20" cy="24" r="6" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="44" cy="24" r="6" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="20" cy="40" r="6" fill="{color}" stroke="#fff" stroke-width="2"/><circle cx="44" cy="40" r="6" fill="{color}" stroke="#fff" stroke-width="2"/><path d="M32 32 L32 56" stroke="#fff" stroke-width="2" stroke-linecap="round"/>"##,
    },
];

impl StickerDef {
    /// Full SVG document tinted with the catalog color.
    #[must_use]
    pub fn svg(&self) -> String {
        format!("{SVG_OPEN}{}{SVG_CLOSE}", self.body.replace("{color}", self.color))
    }

    /// `data:` URI of the tinted SVG.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:image/svg+xml;base64,{}", BASE64.encode(self.svg()))
    }

    /// Payload for a freshly stamped sticker.
    #[must_use]
    pub fn sticker_data(&self, scale: f64) -> StickerData {
        StickerData { url: self.data_url(), color: self.color.to_owned(), scale }
    }
}

/// Look up a catalog entry by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static StickerDef> {
    CATALOG.iter().find(|s| s.id == id)
}
