//! Acronym generation and phrase validation

use crate::types::Acronym;
use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Draw `len` letters uniformly from A-Z
pub fn generate_acronym<R: Rng>(len: usize, rng: &mut R) -> Acronym {
    let letters = (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    Acronym::new(letters)
}

/// Round number to actually play when `round` is requested.
///
/// Rounds whose acronym would exceed `max_letters` start over at round 1.
pub fn wrap_round(round: u32, max_letters: u32) -> u32 {
    if round + 2 > max_letters {
        1
    } else {
        round
    }
}

pub fn letters_for_round(round: u32) -> usize {
    round as usize + 2
}

/// A phrase matches when it has one word per letter and every word starts
/// with its letter (case-insensitive).
pub fn validate_phrase(text: &str, acronym: &Acronym) -> bool {
    let text = text.trim();
    if text.is_empty() || acronym.is_empty() {
        return false;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() != acronym.len() {
        return false;
    }

    words
        .iter()
        .zip(acronym.letters())
        .all(|(word, letter)| {
            word.chars()
                .next()
                .is_some_and(|c| c.to_uppercase().eq(std::iter::once(*letter)))
        })
}
