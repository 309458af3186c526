//! Unicode normalization of relative paths.
//!
//! Library exports often carry decomposed (NFD) names while the device
//! filesystem returns composed (NFC) ones. Every comparison and every
//! destination path goes through [`normalize`].

use unicode_normalization::UnicodeNormalization;

/// Canonical composed (NFC) form, used for comparison and for writing.
pub fn normalize(path: &str) -> String {
    path.nfc().collect()
}

/// Fully decomposed (NFD) form.
pub fn denormalize(path: &str) -> String {
    path.nfd().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPOSED: &str = "\u{30AC}\u{30A4}.mp3"; // ガイ
    const DECOMPOSED: &str = "\u{30AB}\u{3099}\u{30A4}.mp3";

    #[test]
    fn decomposed_voice_mark_composes() {
        assert_eq!(normalize(DECOMPOSED), COMPOSED);
        assert_eq!(denormalize(COMPOSED), DECOMPOSED);
    }

    #[test]
    fn round_trip_is_stable() {
        for p in ["plain/ascii.mp3", COMPOSED, DECOMPOSED, "Bj\u{F6}rk/J\u{F3}ga.flac", "e\u{301}t\u{E9}.m4a"] {
            assert_eq!(normalize(&denormalize(p)), normalize(p), "{p}");
        }
    }

    #[test]
    fn ascii_is_untouched() {
        assert_eq!(normalize("Artist/Album/01 Track.mp3"), "Artist/Album/01 Track.mp3");
    }
}
