//! ISBN-10 / ISBN-13 normalisation and conversion.
//!
//! Malformed input is an expected case for everything in here: functions
//! return `None` rather than an error.

pub(crate) fn only_digits(raw: &str) -> String {
    raw.chars().filter(|ch| ch.is_ascii_digit()).collect()
}

// digits plus an upper-cased `X`, separators dropped
pub(crate) fn compact(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == 'X' || *ch == 'x')
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

/// Returns the 13 digits when `raw` is a checksum-valid ISBN-13 in the `97x` range.
pub(crate) fn normalize_isbn13(raw: &str) -> Option<String> {
    let digits = only_digits(raw);
    if digits.len() != 13 || !digits.starts_with("97") {
        return None;
    }
    let values = digit_values(&digits);
    if isbn13_check_digit(&values[..12]) == values[12] {
        Some(digits)
    } else {
        None
    }
}

/// Returns the compact form when `raw` is a checksum-valid ISBN-10 (check character may be `X`).
pub(crate) fn normalize_isbn10(raw: &str) -> Option<String> {
    let cleaned = compact(raw);
    if cleaned.len() != 10 || cleaned[..9].contains('X') {
        return None;
    }
    let core = digit_values(&cleaned[..9]);
    let check = isbn10_check_char(&core);
    if cleaned.ends_with(check) {
        Some(cleaned)
    } else {
        None
    }
}

/// Derives the ISBN-10 of a valid `978` ISBN-13.
pub(crate) fn to_isbn10(isbn13: &str) -> Option<String> {
    let digits = normalize_isbn13(isbn13)?;
    if !digits.starts_with("978") {
        return None;
    }
    let core = &digits[3..12];
    let mut isbn10 = core.to_string();
    isbn10.push(isbn10_check_char(&digit_values(core)));
    Some(isbn10)
}

/// Derives the `978` ISBN-13 of a valid ISBN-10.
pub(crate) fn to_isbn13_from10(isbn10: &str) -> Option<String> {
    let cleaned = normalize_isbn10(isbn10)?;
    let mut isbn13 = format!("978{}", &cleaned[..9]);
    let check = isbn13_check_digit(&digit_values(&isbn13));
    isbn13.push(char::from(b'0' + check as u8));
    Some(isbn13)
}

/// Resolves the ISBN pair of a record so that `isbn13` always passes its checksum and
/// `isbn10`, when both are present, is the one derived from `isbn13`.
pub(crate) fn resolve_pair(isbn13: Option<&str>, isbn10: Option<&str>) -> (Option<String>, Option<String>) {
    let isbn10 = isbn10.and_then(normalize_isbn10);
    let isbn13 = isbn13.and_then(normalize_isbn13)
        .or_else(|| isbn10.as_deref().and_then(to_isbn13_from10));
    match isbn13 {
        Some(i13) => {
            let i10 = to_isbn10(&i13);
            (Some(i13), i10)
        }
        None => (None, isbn10),
    }
}

/// The ISBN carried by a query whose digit-only form has 10 or 13 digits, so that
/// "ISBN 0747532699" and "Harry Potter 9780747532699" both resolve to their digits.
/// Nine digits followed by a trailing `X` check character also count as an ISBN-10.
pub(crate) fn looks_like_isbn(query: &str) -> Option<String> {
    let digits = only_digits(query);
    match digits.len() {
        10 | 13 => Some(digits),
        9 if ends_with_check_x(query) => Some(format!("{}X", digits)),
        _ => None,
    }
}

// `X` as the last character, directly after a digit or a separator following one
fn ends_with_check_x(query: &str) -> bool {
    let trimmed = query.trim_end();
    match trimmed.strip_suffix(|ch: char| ch == 'X' || ch == 'x') {
        Some(rest) => rest.trim_end_matches(|ch: char| ch == '-' || ch == ' ')
            .ends_with(|ch: char| ch.is_ascii_digit()),
        None => false,
    }
}

/// Best-effort ISBN-13 key for store lookups: the validated ISBN-13, the ISBN-13
/// derived from a valid ISBN-10, or the bare digits.
pub(crate) fn lookup_key(raw: &str) -> String {
    normalize_isbn13(raw)
        .or_else(|| to_isbn13_from10(raw))
        .unwrap_or_else(|| only_digits(raw))
}

fn digit_values(digits: &str) -> Vec<u32> {
    digits.chars().filter_map(|ch| ch.to_digit(10)).collect()
}

// weights alternate 1, 3 over the first twelve digits
fn isbn13_check_digit(first12: &[u32]) -> u32 {
    let sum: u32 = first12.iter().enumerate()
        .map(|(i, d)| if i % 2 == 0 { *d } else { d * 3 })
        .sum();
    (10 - sum % 10) % 10
}

// weights 10 down to 2 over the first nine digits
fn isbn10_check_char(first9: &[u32]) -> char {
    let sum: u32 = first9.iter().enumerate()
        .map(|(i, d)| (10 - i as u32) * d)
        .sum();
    match 11 - sum % 11 {
        10 => 'X',
        11 => '0',
        rem => char::from(b'0' + rem as u8),
    }
}
