use std::borrow::Cow;

/// Normalizes the case of user text before it is measured or drawn.
///
/// Text made up only of Latin letters (optionally separated by
/// whitespace) is upper-cased. Anything else, including text with digits,
/// punctuation, or letters from other scripts, is returned unchanged.
pub fn normalize(text: &str) -> Cow<str> {
    if is_latin_only(text) {
        Cow::Owned(text.to_uppercase())
    } else {
        Cow::Borrowed(text)
    }
}

/// Returns whether `text` contains at least one Latin letter and
/// nothing besides Latin letters and whitespace.
pub fn is_latin_only(text: &str) -> bool {
    text.chars().any(is_latin_letter)
        && text
            .chars()
            .all(|c| is_latin_letter(c) || c.is_whitespace())
}

/// Latin letters in the Basic Latin, Latin-1 Supplement, Latin Extended-A/B
/// and Latin Extended Additional blocks.
pub fn is_latin_letter(c: char) -> bool {
    c.is_alphabetic()
        && matches!(
            c as u32,
            0x41..=0x5a
                | 0x61..=0x7a
                | 0xc0..=0xd6
                | 0xd8..=0xf6
                | 0xf8..=0x24f
                | 0x1e00..=0x1eff
        )
}
