pub mod clipboard;
pub mod hotp;
pub mod record;
pub mod report;
pub mod totp;
pub(crate) mod uri_helper;

use core::num;
use std::{fmt::Display, sync::LazyLock, time::SystemTimeError};

use data_encoding::{DecodeError, DecodeKind, Encoding};
use hmac::{Hmac, Mac};
use sha1::Sha1;

pub use record::{find_descriptor, find_descriptor_in_file, OtpDescriptor};

/// Code length used when a record does not carry a `digits` parameter
pub const DEFAULT_DIGITS: u32 = 6;
/// Longest code that can be produced from a 31-bit truncated digest
pub const MAX_DIGITS: u32 = 10;

type HmacSha1 = Hmac<Sha1>;

// Exports often carry secrets whose last symbol has stray low bits set
static BASE32_LENIENT: LazyLock<Encoding> = LazyLock::new(|| {
    let mut alphabet = data_encoding::BASE32.specification();
    alphabet.check_trailing_bits = false;
    alphabet.encoding().expect("RFC4648 base32 specification is valid")
});

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("Secret decode error: {0}")]
    InvalidSecret(DecodeError),
    #[error("Invalid digit count, found {0}. Expected a value between 1 and 10")]
    InvalidDigits(i64),
    #[error("Invalid digest")]
    InvalidDigest(Vec<u8>),
    #[error("Could not build the HMAC key")]
    InvalidKeyLength(hmac::digest::InvalidLength),
    #[error("Malformed record {label}: could not parse {field} from {value:?}")]
    MalformedRecord {
        label: String,
        field: String,
        value: String,
        #[source]
        source: num::ParseIntError,
    },
    #[error("Could not read the source")]
    SourceUnavailable(#[source] std::io::Error),
    #[error("The system clock is set before the UNIX epoch")]
    Clock(#[source] SystemTimeError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OtpCode {
    code: u32,
    digits: u32,
}

impl OtpCode {
    pub fn integer(&self) -> u32 {
        self.code
    }
}

impl Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:0padding$}",
            self.code,
            padding = (self.digits as usize)
        )
    }
}

pub trait Otp {
    /// The RFC4648 base32-encoded shared secret
    fn secret(&self) -> &str;

    /// How many digits the generated code has
    fn digits(&self) -> u32;

    /// Decodes a secret (given as an RFC4648 base32-encoded ASCII string)
    /// into a byte string.
    ///
    /// The alphabet is matched case-insensitively and missing `=` padding
    /// is added before decoding.
    fn decode_secret(secret: &str) -> Result<Vec<u8>, OtpError> {
        if secret.is_empty() {
            return Err(OtpError::InvalidSecret(DecodeError {
                position: 0,
                kind: DecodeKind::Length,
            }));
        }

        let mut normalized = secret.to_ascii_uppercase();

        // Base32 works on blocks of 8 symbols
        let remainder = normalized.len() % 8;
        if remainder != 0 {
            normalized.extend(std::iter::repeat('=').take(8 - remainder));
        }

        BASE32_LENIENT
            .decode(normalized.as_bytes())
            .map_err(OtpError::InvalidSecret)
    }

    /// Calculates the HMAC-SHA1 digest of the big-endian moving factor,
    /// keyed with the decoded secret.
    fn calc_digest(decoded_secret: &[u8], data: u64) -> Result<Vec<u8>, OtpError> {
        let mut mac =
            HmacSha1::new_from_slice(decoded_secret).map_err(OtpError::InvalidKeyLength)?;
        mac.update(&data.to_be_bytes());

        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Encodes the HMAC digest into a truncated integer.
    fn encode_digest_truncated(digest: &[u8], target_digits_count: u32) -> Result<u32, OtpError> {
        if target_digits_count == 0 || target_digits_count > MAX_DIGITS {
            return Err(OtpError::InvalidDigits(target_digits_count.into()));
        }

        // The last byte tells us the offset, whatever the digest length
        let offset = match digest.last() {
            Some(x) => *x & 0xf,
            None => return Err(OtpError::InvalidDigest(Vec::from(digest))),
        } as usize;

        // Gets the 4 bytes that will compose the code
        let code_bytes: [u8; 4] = match digest
            .get(offset..offset + 4)
            .and_then(|bytes| bytes.try_into().ok())
        {
            Some(x) => x,
            None => return Err(OtpError::InvalidDigest(Vec::from(digest))),
        };

        let code = u64::from(u32::from_be_bytes(code_bytes) & 0x7fff_ffff);
        let truncation_factor = 10u64.pow(target_digits_count);

        // Below 2^31, so it always fits back into a u32
        Ok((code % truncation_factor) as u32)
    }

    /// Runs the full HOTP computation for the given moving factor
    fn code_for(&self, moving_factor: u64) -> Result<OtpCode, OtpError> {
        let digits = self.digits();
        if digits == 0 || digits > MAX_DIGITS {
            return Err(OtpError::InvalidDigits(digits.into()));
        }

        let decoded = Self::decode_secret(self.secret())?;
        let digest = Self::calc_digest(decoded.as_slice(), moving_factor)?;
        let code = Self::encode_digest_truncated(digest.as_slice(), digits)?;

        Ok(OtpCode { code, digits })
    }
}
