//! Mnemonic seed phrase generation and normalization.
//!
//! The wordlist is deliberately small and memorable; entropy comes from the
//! repetition count, not the list size (12 draws over ~180 words is about 90
//! bits). Draws are independent and with replacement, from the OS CSPRNG.
//!
//! The list is frozen content. Hashing and lookup-key derivation depend only
//! on the phrase text, so removing or editing entries would silently break
//! "does this look like one of ours" checks for phrases already issued.
//! Append-only changes are the only safe kind, and none are planned.

use rand::{rngs::OsRng, seq::SliceRandom};

pub(crate) const DEFAULT_SEED_WORDS: usize = 12;

#[rustfmt::skip]
static WORDS: &[&str] = &[
    "apple", "arch", "artist", "atom", "audit", "autumn", "bamboo", "beacon",
    "beaver", "bench", "biscuit", "blade", "blossom", "bonus", "border", "breeze",
    "bridge", "bronze", "buddy", "buffer", "cactus", "camera", "canvas", "carbon",
    "castle", "casual", "cello", "cement", "cherry", "chess", "circuit", "clover",
    "coffee", "comet", "copper", "corner", "cradle", "crisp", "crystal", "daisy",
    "dance", "delta", "denim", "desert", "detail", "dolphin", "dragon", "dream",
    "drift", "eagle", "earth", "echo", "ember", "engine", "fabric", "falcon",
    "feather", "fern", "festival", "finger", "fossil", "galaxy", "garden", "gentle",
    "glacier", "gold", "guitar", "hammer", "harbor", "hazel", "helmet", "honey",
    "ice", "icon", "idea", "jacket", "jungle", "karma", "kernel", "kitten",
    "ladder", "lagoon", "laser", "leaf", "lemon", "linen", "lotus", "lucky",
    "lunar", "magnet", "marble", "matrix", "meadow", "melon", "meteor", "mint",
    "mirror", "model", "monkey", "mosaic", "mountain", "museum", "myth", "nectar",
    "needle", "nebula", "night", "north", "nova", "oasis", "ocean", "olive",
    "opal", "orbit", "origin", "oxygen", "panda", "paper", "pearl", "pepper",
    "piano", "pixel", "planet", "plasma", "plume", "pocket", "pollen", "pond",
    "prairie", "prism", "pulse", "quartz", "quiet", "radar", "rain", "raven",
    "reef", "river", "robot", "rocket", "rose", "saffron", "sail", "scale",
    "scarlet", "shadow", "signal", "silver", "sketch", "snow", "solar", "sparrow",
    "spice", "spider", "spring", "stone", "storm", "sunset", "swallow", "symbol",
    "tango", "temple", "thunder", "timber", "tulip", "tunnel", "turquoise", "united",
    "valley", "velvet", "violin", "vision", "vivid", "walnut", "water", "whisper",
    "window", "winter", "wonder", "yellow", "zebra",];

/// Generate a mnemonic seed phrase of `words` words.
///
/// Words are drawn independently and uniformly, with replacement, so repeated
/// words are expected and fine.
pub(crate) fn generate_seed_phrase(words: usize) -> String {
    let mut rng = OsRng;
    let mut picked = Vec::with_capacity(words);
    for _ in 0..words {
        // `WORDS` is a non-empty static list, so `choose` cannot return None.
        if let Some(word) = WORDS.choose(&mut rng) {
            picked.push(*word);
        }
    }
    picked.join(" ")
}

/// Canonical form of a seed phrase: trimmed, lowercased, single-spaced.
///
/// Idempotent: `normalize_seed(normalize_seed(x)) == normalize_seed(x)`.
pub(crate) fn normalize_seed(seed_phrase: &str) -> String {
    seed_phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
