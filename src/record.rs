use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use tracing::{debug, info};

use crate::{
    uri_helper::{self, URI_DIGITS_QUERY, URI_SECRET_QUERY},
    OtpError, DEFAULT_DIGITS, MAX_DIGITS,
};

/// A `(label, secret, digits)` tuple read from one `otpauth://totp/` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpDescriptor {
    label: String,
    secret: String,
    digits: u32,
}

impl OtpDescriptor {
    pub fn new(label: String, secret: String, digits: u32) -> Self {
        Self {
            label,
            secret,
            digits,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The base32 secret exactly as written in the source
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }
}

/// Tries to read a descriptor from a single line.
///
/// Returns `Ok(None)` when the line has no `otpauth://totp/` URI, when its
/// label does not contain `query` (case-insensitive) or when it has no
/// `secret`. Once the label matches, a `digits` value that is not an
/// integer, or is outside `1..=MAX_DIGITS`, is an error rather than a skip.
pub fn parse_descriptor(line: &str, query: &str) -> Result<Option<OtpDescriptor>, OtpError> {
    let Some(parts) = uri_helper::otp_uri_parts(line) else {
        return Ok(None);
    };

    if !parts.label.to_lowercase().contains(&query.to_lowercase()) {
        return Ok(None);
    }

    let params = uri_helper::query_pairs(parts.query);

    let secret = match params.get(URI_SECRET_QUERY) {
        Some(secret) if !secret.is_empty() => secret.to_string(),
        _ => {
            debug!(label = parts.label, "record has no secret, skipping");
            return Ok(None);
        }
    };

    let digits = match params.get(URI_DIGITS_QUERY) {
        Some(value) => {
            let parsed = i64::from_str(value).map_err(|e| OtpError::MalformedRecord {
                label: parts.label.to_string(),
                field: URI_DIGITS_QUERY.into(),
                value: value.to_string(),
                source: e,
            })?;

            match u32::try_from(parsed) {
                Ok(digits) if (1..=MAX_DIGITS).contains(&digits) => digits,
                _ => return Err(OtpError::InvalidDigits(parsed)),
            }
        }
        None => DEFAULT_DIGITS,
    };

    Ok(Some(OtpDescriptor::new(
        parts.label.to_string(),
        secret,
        digits,
    )))
}

/// Scans `source` line by line and returns the first record whose label
/// contains `query`.
///
/// Reading stops at the first match, so nothing after that line is pulled
/// from `source`. Running out of lines is `Ok(None)`.
pub fn find_descriptor<R: BufRead>(
    source: R,
    query: &str,
) -> Result<Option<OtpDescriptor>, OtpError> {
    for (index, line) in source.lines().enumerate() {
        let line = line.map_err(OtpError::SourceUnavailable)?;

        if let Some(descriptor) = parse_descriptor(&line, query)? {
            info!(
                line = index + 1,
                label = descriptor.label(),
                digits = descriptor.digits(),
                "found matching record"
            );
            return Ok(Some(descriptor));
        }
    }

    debug!(query, "no record matched");
    Ok(None)
}

/// Opens `path` and streams it through [`find_descriptor`]
pub fn find_descriptor_in_file(
    path: impl AsRef<Path>,
    query: &str,
) -> Result<Option<OtpDescriptor>, OtpError> {
    let file = File::open(path.as_ref()).map_err(OtpError::SourceUnavailable)?;

    find_descriptor(BufReader::new(file), query)
}
