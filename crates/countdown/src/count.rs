//! Remaining-allowance arithmetic.
//!
//! Lengths are measured in normalized units (see [`input_core::normalized_len`]):
//! a line ending is two units however it is stored, so the count matches
//! what a server measures from submitted form data.

use input_core::normalized_len;

/// `max - normalized_len(text)`. Negative when the text overruns.
///
/// ```
/// use countdown::count::remaining;
///
/// assert_eq!(remaining("Hello", 10), 5);
/// assert_eq!(remaining("Hello World!", 10), -2);
/// assert_eq!(remaining("a\nb", 10), 6);
/// ```
pub fn remaining(text: &str, max: usize) -> i64 {
    to_i64(max) - to_i64(normalized_len(text))
}

/// Low state is inclusive of the threshold.
pub fn is_low(remaining: i64, low_chars: usize) -> bool {
    remaining <= to_i64(low_chars)
}

#[inline]
fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
