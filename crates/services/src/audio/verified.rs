//! Compiled-in table of pre-verified remote pronunciation recordings.
//!
//! A static asset keyed by normalized word, not a cache: every URL here has
//! been checked by hand against a native recording. Single words only;
//! sentences never match this table.

use url::Url;

const VERIFIED_PRONUNCIATIONS: &[(&str, &str)] = &[
    ("agir", "https://audio.peyv.app/verified/agir.mp3"),
    ("av", "https://audio.peyv.app/verified/av.mp3"),
    ("bajar", "https://audio.peyv.app/verified/bajar.mp3"),
    ("cav", "https://audio.peyv.app/verified/cav.mp3"),
    ("dil", "https://audio.peyv.app/verified/dil.mp3"),
    ("heval", "https://audio.peyv.app/verified/heval.mp3"),
    ("mal", "https://audio.peyv.app/verified/mal.mp3"),
    ("nan", "https://audio.peyv.app/verified/nan.mp3"),
    ("pirtuk", "https://audio.peyv.app/verified/pirtuk.mp3"),
    ("roj", "https://audio.peyv.app/verified/roj.mp3"),
    ("sev", "https://audio.peyv.app/verified/sev.mp3"),
    ("sir", "https://audio.peyv.app/verified/sir.mp3"),
    ("ziman", "https://audio.peyv.app/verified/ziman.mp3"),
];

/// Look up a known-good pronunciation URL for a normalized word.
///
/// The table is kept sorted by word; lookup is a binary search.
#[must_use]
pub fn verified_audio_url(word: &str) -> Option<Url> {
    VERIFIED_PRONUNCIATIONS
        .binary_search_by_key(&word, |&(entry, _)| entry)
        .ok()
        .and_then(|idx| Url::parse(VERIFIED_PRONUNCIATIONS[idx].1).ok())
}
