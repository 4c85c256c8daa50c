//! Response link scheme.
//!
//! Each selectable option in a static email is a distinct hyperlink of the form
//! `{api_base}/r/{export_token}/{block_id}/{value}`. Clicking it records the
//! choice server-side without any script running in the mail client.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped inside a single path segment (RFC 3986 unreserved are kept).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the response link for one option.
///
/// The result is a pure function of its inputs, so rendering the same option
/// with the same token always yields the same bytes.
///
/// # Examples
///
/// ```
/// use bm_blocks::interaction_url;
///
/// assert_eq!(
///     interaction_url("https://api.example.com/", "tok1", "poll-1", "a"),
///     "https://api.example.com/r/tok1/poll-1/a"
/// );
/// ```
pub fn interaction_url(api_base: &str, export_token: &str, block_id: &str, value: &str) -> String {
    format!(
        "{}/r/{}/{}/{}",
        api_base.trim_end_matches('/'),
        utf8_percent_encode(export_token, SEGMENT),
        utf8_percent_encode(block_id, SEGMENT),
        utf8_percent_encode(value, SEGMENT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_segments_verbatim() {
        assert_eq!(
            interaction_url("https://api.test", "abc123", "block-7", "love"),
            "https://api.test/r/abc123/block-7/love"
        );
    }

    #[test]
    fn test_deterministic() {
        let a = interaction_url("https://api.test", "t", "b", "v");
        let b = interaction_url("https://api.test", "t", "b", "v");

        assert_eq!(a, b);
    }

    #[test]
    fn test_special_characters_encoded() {
        assert_eq!(
            interaction_url("https://api.test", "t/1", "b?x", "a b&c"),
            "https://api.test/r/t%2F1/b%3Fx/a%20b%26c"
        );
    }

    #[test]
    fn test_non_ascii_value_encoded() {
        assert_eq!(
            interaction_url("https://api.test", "t", "b", "\u{1F60D}"),
            "https://api.test/r/t/b/%F0%9F%98%8D"
        );
    }
}
