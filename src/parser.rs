//! Filename grammar for catalog demonstration videos
//!
//! Catalog assets are named `<token>-<token>-<exercise-name>-<view>[_<suffix>]`,
//! e.g. `male-barbell-bench-press-front_alt.mp4`. Anything that does not fit
//! this shape (intro clips, banners) is not an exercise video.

use crate::models::{ParsedView, View};
use once_cell::sync::Lazy;
use regex::Regex;

static FILENAME_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^\w+-\w+-(.+)-(side|front)(_\w+)?$")
        .map_err(|e| log::error!("Filename grammar failed to compile: {}", e))
        .ok()
});

const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".mov", ".m4v"];

/// Drop a `#fragment` from `url`
pub fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

/// Bare filename of a video URL: no fragment, query, directories or extension
pub fn bare_filename(url: &str) -> &str {
    let path = strip_fragment(url);
    let path = path.split('?').next().unwrap_or(path);
    let name = path.rsplit('/').next().unwrap_or(path);

    let lower = name.to_ascii_lowercase();
    let cut = VIDEO_EXTENSIONS
        .iter()
        .filter_map(|ext| lower.find(ext))
        .min();

    match cut {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// "bench-press" -> "Bench Press"
///
/// Hyphens become spaces one for one. A letter is uppercased when it starts
/// the name or follows a non-letter, and lowercased otherwise, so
/// "21s-curl" -> "21S Curl" and "bench_press" -> "Bench_Press".
pub fn display_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    let mut after_letter = false;

    for c in key.chars() {
        let c = if c == '-' { ' ' } else { c };
        if c.is_alphabetic() {
            if after_letter {
                name.extend(c.to_lowercase());
            } else {
                name.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            name.push(c);
            after_letter = false;
        }
    }

    name
}

/// Parse a video URL into its exercise key, camera view and display name.
///
/// Returns `None` for URLs whose filename does not follow the catalog grammar.
pub fn parse_video_url(url: &str) -> Option<ParsedView> {
    let re = FILENAME_RE.as_ref()?;
    let filename = bare_filename(url);

    let caps = re.captures(filename)?;
    let key = caps.get(1)?.as_str().to_lowercase();
    let view = caps.get(2)?.as_str().parse::<View>().ok()?;

    Some(ParsedView {
        display_name: display_name(&key),
        canonical_key: key,
        view,
        url: strip_fragment(url).to_string(),
    })
}
