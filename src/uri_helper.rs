use std::collections::HashMap;

// Matched case-insensitively
const TOTP_URI_MARKER: &str = "otpauth://totp/";

pub const URI_SECRET_QUERY: &str = "secret";
pub const URI_DIGITS_QUERY: &str = "digits";

/// The raw pieces of an `otpauth://totp/<label>?<query>` occurrence
#[derive(Debug, PartialEq)]
pub struct OtpUriParts<'a> {
    pub label: &'a str,
    pub query: &'a str,
}

/// Finds the first `otpauth://totp/<label>?<query>` occurrence in `line`.
///
/// The label runs up to the first `?` or whitespace and must be followed by
/// `?`. The query runs up to the next whitespace. Both must be non-empty,
/// otherwise the next occurrence of the marker is tried.
pub fn otp_uri_parts(line: &str) -> Option<OtpUriParts<'_>> {
    // ASCII folding keeps byte offsets valid for `line`
    let folded = line.to_ascii_lowercase();
    let mut search_from = 0;

    while let Some(found) = folded[search_from..].find(TOTP_URI_MARKER) {
        let label_start = search_from + found + TOTP_URI_MARKER.len();

        if let Some(parts) = split_label_and_query(&line[label_start..]) {
            return Some(parts);
        }

        search_from = label_start;
    }

    None
}

fn split_label_and_query(rest: &str) -> Option<OtpUriParts<'_>> {
    let label_end = rest.find(|c: char| c == '?' || c.is_whitespace())?;
    if label_end == 0 || !rest[label_end..].starts_with('?') {
        return None;
    }

    let query = &rest[label_end + 1..];
    let query_end = query.find(char::is_whitespace).unwrap_or(query.len());
    if query_end == 0 {
        return None;
    }

    Some(OtpUriParts {
        label: &rest[..label_end],
        query: &query[..query_end],
    })
}

/// Splits `key=value&key=value` pairs on the first `=`.
///
/// Keys are lowercased, pairs without `=` are dropped and later duplicates
/// replace earlier ones. Values are kept verbatim, no percent-decoding.
pub fn query_pairs(query: &str) -> HashMap<String, &str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}
