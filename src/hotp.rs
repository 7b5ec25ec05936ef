use crate::{Otp, OtpCode, OtpError, DEFAULT_DIGITS};

#[derive(Debug, Clone, PartialEq)]
pub struct Hotp {
    secret: String,
    // How many digits to generate
    digits: u32,
}

impl Otp for Hotp {
    fn secret(&self) -> &str {
        &self.secret
    }

    fn digits(&self) -> u32 {
        self.digits
    }
}

impl Hotp {
    /// Creates the config for the [HMAC-based One-time Password Algorithm](http://en.wikipedia.org/wiki/HMAC-based_One-time_Password_Algorithm)
    /// (HOTP) given an RFC4648 base32 encoded secret
    ///
    /// Obs.: This method defaults to HMAC-SHA1 and a 6-digit code.
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            digits: DEFAULT_DIGITS,
        }
    }

    ///  Sets the number of digits to generate
    pub fn with_digits(&mut self, digits: u32) -> &mut Self {
        self.digits = digits;

        self
    }

    /// Generates a HOTP from the provided counter
    /// truncated to the specified number of digits
    pub fn generate(&self, counter: u64) -> Result<OtpCode, OtpError> {
        self.code_for(counter)
    }
}
