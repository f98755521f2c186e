//! Percent-encoding of free-form query values (service name, layer list).

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes escaped in query values: everything except ASCII letters, digits,
/// and `-`, `_`, `~`, `/`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// True for bytes that [`percent_encode`] passes through unchanged.
pub fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'~' | b'/')
}

/// Percent-encode `value` for use inside a query string.
///
/// Every byte of the UTF-8 encoding that is not [`is_unreserved`] becomes
/// `%XX` with upper-case hex digits.
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}
