//! URL helpers for canonical article links.

const SHORT_ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_SLUG_LEN: usize = 48;

/// Encode an id in base 36 (lowercase) for short article URLs.
pub fn shorten_id(mut id: u64) -> String {
    let base = SHORT_ID_ALPHABET.len() as u64;
    let mut digits = Vec::new();
    loop {
        digits.push(SHORT_ID_ALPHABET[(id % base) as usize]);
        id /= base;
        if id == 0 {
            break;
        }
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Turn a title into a URL-safe slug.
///
/// ASCII letters and digits are kept (lowercased); every other run of
/// characters collapses to one `-`. The result never starts or ends with `-`
/// and is at most 48 bytes long. A title with nothing usable yields `"-"`.
pub fn urlify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        slug.push('-');
    }
    slug
}
