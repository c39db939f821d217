//! Static catalog data handed to callers of the scraper
//!
//! The muscle list is advisory: the scraper accepts any muscle or gender
//! string and simply lowercases it into the catalog URL.

use serde_json::{json, Value};

/// Canonical muscle names, in display order
pub const SUPPORTED_MUSCLES: [&str; 14] = [
    "Chest",
    "Back",
    "Shoulders",
    "Biceps",
    "Triceps",
    "Quadriceps",
    "Hamstrings",
    "Glutes",
    "Calves",
    "Abs",
    "Forearms",
    "Neck",
    "Traps",
    "Obliques",
];

pub fn supported_muscles() -> Vec<String> {
    SUPPORTED_MUSCLES.iter().map(|m| m.to_string()).collect()
}

/// Case-insensitive lookup of the canonical spelling of a muscle
pub fn match_muscle(name: &str) -> Option<&'static str> {
    let needle = name.trim();
    SUPPORTED_MUSCLES
        .iter()
        .copied()
        .find(|m| m.eq_ignore_ascii_case(needle))
}

/// Layout the downstream renderer expects: a `render` array of video and
/// text blocks. Exercise records map onto the `video_block` slots.
pub fn render_format() -> Value {
    json!({
        "render": [
            {
                "type": "video_block",
                "title": "<exercise name>",
                "props": {
                    "sideUrl": "<side view video URL>",
                    "frontUrl": "<front view video URL>"
                }
            },
            {
                "type": "text_block",
                "title": "<content_title>",
                "props": {
                    "content": "<content>"
                }
            }
        ]
    })
}
