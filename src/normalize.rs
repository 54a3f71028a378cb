//! Filename and title normalization shared by the scanner and the matcher.
//!
//! CRITICAL: the matcher compares the output of `clean_title` against
//! `comparison_key`. Changing either one changes which records get images.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Placeholder and screenshot files that live in the images folder but never
/// belong to a movie. Matched against the full name and the extension-less name.
pub const SYSTEM_FILES: &[&str] = &[
    "Captura",
    "Captura.jpg",
    "Captura.png",
    "default",
    "default.jpg",
    "default.png",
    "Sin_título",
    "Sin_título.jpg",
    "Sin_título.png",
];

/// Extensions that are used as-is. Anything else goes through the converter.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Prefix some scraped posters carry in front of the title ("m_Inception.jpg").
pub const MOVIE_PREFIX: &str = "m_";

static SYSTEM_FILE_SET: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| SYSTEM_FILES.iter().copied().collect());

// ============================================================================
// FILENAMES
// ============================================================================

/// Split a filename into (stem, extension). The extension keeps its dot.
/// A leading dot does not start an extension: ".hidden" has none.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let body_start = filename.len() - filename.trim_start_matches('.').len();
    match filename[body_start..].rfind('.') {
        Some(idx) => filename.split_at(body_start + idx),
        None => (filename, ""),
    }
}

/// Check whether a file is a known placeholder that must be left alone.
pub fn should_skip_file(filename: &str) -> bool {
    let (stem, _) = split_extension(filename);
    SYSTEM_FILE_SET.contains(stem) || SYSTEM_FILE_SET.contains(filename)
}

/// Check whether the filename ends in one of the accepted image extensions.
pub fn has_accepted_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    ACCEPTED_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Stem used as the candidate title for a listed file.
///
/// A JPEG written by the converter keeps its old extension in the name
/// (`m_Matrix.bmp.jpg`), so that inner extension is dropped as well when it
/// is a short alphanumeric one outside the accepted set. "Mr. Smith.jpg"
/// keeps its dot because ". Smith" is not an extension.
pub fn title_stem(filename: &str) -> &str {
    let (stem, ext) = split_extension(filename);
    if !ext.eq_ignore_ascii_case(".jpg") {
        return stem;
    }
    let (inner_stem, inner_ext) = split_extension(stem);
    let inner = inner_ext.trim_start_matches('.');
    let looks_converted = (1..=5).contains(&inner.len())
        && inner.chars().all(|c| c.is_ascii_alphanumeric())
        && !ACCEPTED_EXTENSIONS.contains(&inner.to_ascii_lowercase().as_str());
    if looks_converted {
        inner_stem
    } else {
        stem
    }
}

// ============================================================================
// TITLES
// ============================================================================

/// Check if a character is a Unicode combining mark (diacritical mark).
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F)
}

/// Strip accents by NFKD decomposition and dropping combining marks.
/// e.g., "Amélie" → "Amelie". Non-Latin scripts are kept as they are.
pub fn strip_accents(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Title derived from a filename stem, as compared against record keys.
///
/// Every `m_` is removed, not only a leading one, so "Dark m_Knight" loses
/// its inner marker as well. Accents are left alone.
pub fn clean_title(stem: &str) -> String {
    stem.replace(MOVIE_PREFIX, "").trim().to_lowercase()
}

/// Comparison key for a stored title: the part before the first colon.
/// e.g., "Inception: The Beginning" → "inception"
pub fn comparison_key(title: &str) -> String {
    title
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Lowercased, trimmed and accent-free form of a title.
pub fn normalize_title(title: &str) -> String {
    strip_accents(title.trim()).to_lowercase().trim().to_string()
}

/// Secondary form used only to look up suggestions when nothing matched:
/// the first `m_` is removed before normalizing.
pub fn suggestion_form(stem: &str) -> String {
    normalize_title(&stem.trim().replacen(MOVIE_PREFIX, "", 1))
}

/// First whitespace-delimited token of the suggestion form, if any.
pub fn suggestion_token(stem: &str) -> Option<String> {
    suggestion_form(stem)
        .split_whitespace()
        .next()
        .map(str::to_string)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("default.png"), ("default", ".png"));
        assert_eq!(split_extension("poster.bmp.jpg"), ("poster.bmp", ".jpg"));
        assert_eq!(split_extension("default"), ("default", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension(".hidden.png"), (".hidden", ".png"));
    }

    #[test]
    fn test_should_skip_system_files() {
        for name in SYSTEM_FILES {
            assert!(should_skip_file(name), "{} should be skipped", name);
        }
        // Extension-stripped match
        assert!(should_skip_file("default.webp"));
        assert!(should_skip_file("Captura.bmp"));
        assert!(should_skip_file("Sin_título.gif"));
        // Case-sensitive, like the file system listing
        assert!(!should_skip_file("Default.png"));
        assert!(!should_skip_file("defaults.png"));
        assert!(!should_skip_file("Heat.jpg"));
    }

    #[test]
    fn test_accepted_extensions() {
        assert!(has_accepted_extension("Heat.jpg"));
        assert!(has_accepted_extension("Heat.JPEG"));
        assert!(has_accepted_extension("anim.Gif"));
        assert!(has_accepted_extension("poster.bmp.jpg"));
        assert!(!has_accepted_extension("m_Matrix.bmp"));
        assert!(!has_accepted_extension("noext"));
        assert!(!has_accepted_extension("png"));
    }

    #[test]
    fn test_title_stem_drops_converted_extension() {
        assert_eq!(title_stem("m_Matrix.bmp.jpg"), "m_Matrix");
        assert_eq!(title_stem("Heat.bin.JPG"), "Heat");
        assert_eq!(title_stem("m_Matrix.bmp"), "m_Matrix");
        assert_eq!(title_stem("Heat.jpg"), "Heat");
        // Not converter output
        assert_eq!(title_stem("Mr. Smith.jpg"), "Mr. Smith");
        assert_eq!(title_stem("poster.png.jpg"), "poster.png");
        assert_eq!(title_stem("Vol.1.png"), "Vol.1");
        assert_eq!(title_stem("Heat.tiff.png"), "Heat.tiff");
    }

    #[test]
    fn test_clean_title_strips_every_prefix() {
        assert_eq!(clean_title("m_Inception"), "inception");
        assert_eq!(clean_title("  m_The Matrix "), "the matrix");
        assert_eq!(clean_title("Dark m_Knight m_"), "dark knight");
        assert_eq!(clean_title("Amélie"), "amélie");
    }

    #[test]
    fn test_comparison_key() {
        assert_eq!(comparison_key("Inception: The Beginning"), "inception");
        assert_eq!(comparison_key("Heat"), "heat");
        assert_eq!(comparison_key("  Star Wars : Episode IV: A New Hope"), "star wars");
        assert_eq!(comparison_key(": Untitled"), "");
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Amélie "), "amelie");
        assert_eq!(normalize_title("El Laberinto del Fauno"), "el laberinto del fauno");
        assert_eq!(strip_accents("Pokémon Ñandú"), "Pokemon Nandu");
    }

    #[test]
    fn test_suggestion_token() {
        assert_eq!(suggestion_token("m_Matrix Reloaded"), Some("matrix".to_string()));
        assert_eq!(suggestion_token("m_Ámbar m_2"), Some("ambar".to_string()));
        assert_eq!(suggestion_token("m_"), None);
        assert_eq!(suggestion_token("   "), None);
    }
}
