use std::time::{SystemTime, UNIX_EPOCH};

use crate::{hotp::Hotp, record::OtpDescriptor, OtpCode, OtpError};

/// Length of a time step in seconds. Exports do not carry a custom period.
pub const TOTP_PERIOD: u64 = 30;

/// A HOTP whose counter is the number of periods since the UNIX epoch
#[derive(Debug, Clone, PartialEq)]
pub struct Totp {
    hotp: Hotp,
}

impl From<&OtpDescriptor> for Totp {
    fn from(descriptor: &OtpDescriptor) -> Self {
        let mut totp = Self::new(descriptor.secret().to_string());
        totp.with_digits(descriptor.digits());

        totp
    }
}

impl Totp {
    /// Creates the config for the [Time-based One-time Password Algorithm](http://en.wikipedia.org/wiki/Time-based_One-time_Password_Algorithm)
    /// (TOTP) given an RFC4648 base32 encoded secret.
    ///
    /// Obs.: This method defaults to a 6-digit code. The hash is always SHA1
    /// and the period is always 30 seconds.
    pub fn new(secret: String) -> Self {
        Self {
            hotp: Hotp::new(secret),
        }
    }

    ///  Sets the number of digits to generate
    pub fn with_digits(&mut self, digits: u32) -> &mut Self {
        self.hotp.with_digits(digits);

        self
    }

    /// Generates a Totp from the provided seconds since the UNIX epoch
    /// truncated to the specified number of digits
    pub fn generate(&self, seconds_since_epoch: u64) -> Result<OtpCode, OtpError> {
        self.hotp.generate(Self::counter(seconds_since_epoch))
    }

    /// The HOTP counter for the step `seconds_since_epoch` falls in
    pub fn counter(seconds_since_epoch: u64) -> u64 {
        seconds_since_epoch / TOTP_PERIOD
    }

    /// Generates the code valid right now, according to the system clock
    pub fn generate_current(&self) -> Result<OtpCode, OtpError> {
        self.generate(seconds_since_epoch(SystemTime::now())?)
    }

    /// Seconds left before the code generated at `seconds_since_epoch` expires
    pub fn remaining_seconds(&self, seconds_since_epoch: u64) -> u64 {
        TOTP_PERIOD - seconds_since_epoch % TOTP_PERIOD
    }
}

/// Computes the code for `descriptor` valid at `at_time`.
///
/// The result only depends on the secret, the digit count and the time step
/// `at_time` falls in, so injecting a fixed instant gives a fixed code.
pub fn generate(descriptor: &OtpDescriptor, at_time: SystemTime) -> Result<OtpCode, OtpError> {
    Totp::from(descriptor).generate(seconds_since_epoch(at_time)?)
}

pub(crate) fn seconds_since_epoch(at_time: SystemTime) -> Result<u64, OtpError> {
    at_time
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(OtpError::Clock)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        hotp::Hotp,
        record::OtpDescriptor,
        totp::{self, Totp},
        OtpError,
    };

    // Base32 of the ASCII string "12345678901234567890"
    const SHA1_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[rstest]
    #[case(59, "94287082")]
    #[case(1111111109, "07081804")]
    #[case(1111111111, "14050471")]
    #[case(1234567890, "89005924")]
    #[case(2000000000, "69279037")]
    #[case(20000000000, "65353130")]
    #[case(1111111109, "081804")]
    #[case(20000000000, "353130")]
    fn totp_test(#[case] timestamp: u64, #[case] expected: &str) {
        let mut totp_base = Totp::new(SHA1_SECRET.to_string());
        totp_base.with_digits(expected.len() as u32);

        let generated_otp = totp_base.generate(timestamp).unwrap();
        assert_eq!(expected, generated_otp.to_string());
    }

    #[rstest]
    #[case(59, "94287082")]
    #[case(1111111109, "07081804")]
    fn generate_from_descriptor(#[case] timestamp: u64, #[case] expected: &str) {
        let descriptor = OtpDescriptor::new("rfc6238".into(), SHA1_SECRET.into(), 8);
        let at_time = UNIX_EPOCH + Duration::from_secs(timestamp);

        let first = totp::generate(&descriptor, at_time).unwrap();
        let second = totp::generate(&descriptor, at_time).unwrap();

        assert_eq!(expected, first.to_string());
        assert_eq!(first, second);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(59, 1)]
    #[case(1111111109, 37037036)]
    fn matches_hotp_at_step_counter(#[case] timestamp: u64, #[case] counter: u64) {
        let mut totp = Totp::new(SHA1_SECRET.to_string());
        totp.with_digits(8);
        let mut hotp = Hotp::new(SHA1_SECRET.to_string());
        hotp.with_digits(8);

        assert_eq!(counter, Totp::counter(timestamp));
        assert_eq!(hotp.generate(counter).unwrap(), totp.generate(timestamp).unwrap());
    }

    #[test]
    fn descriptor_carries_secret_and_digits() {
        let descriptor = OtpDescriptor::new("work".into(), SHA1_SECRET.to_string(), 8);
        let mut expected = Totp::new(SHA1_SECRET.to_string());
        expected.with_digits(8);

        assert_eq!(expected, Totp::from(&descriptor));
    }

    #[test]
    fn same_step_same_code() {
        let totp = Totp::new(SHA1_SECRET.to_string());

        assert_eq!(totp.generate(30).unwrap(), totp.generate(59).unwrap());
        assert_eq!(totp.generate(60).unwrap(), totp.generate(89).unwrap());
    }

    #[rstest]
    #[case(0, 30)]
    #[case(29, 1)]
    #[case(30, 30)]
    #[case(59, 1)]
    #[case(1111111109, 1)]
    fn remaining_seconds(#[case] timestamp: u64, #[case] expected: u64) {
        let totp = Totp::new(SHA1_SECRET.to_string());

        assert_eq!(expected, totp.remaining_seconds(timestamp));
    }

    #[test]
    fn generate_current_uses_configured_digits() {
        let mut totp = Totp::new(SHA1_SECRET.to_string());
        totp.with_digits(8);

        let code = totp.generate_current().unwrap();

        assert_eq!(8, code.to_string().len());
    }

    #[test]
    fn rejects_time_before_epoch() {
        let descriptor = OtpDescriptor::new("old".into(), SHA1_SECRET.to_string(), 6);
        let at_time = UNIX_EPOCH - Duration::from_secs(1);

        assert!(matches!(
            totp::generate(&descriptor, at_time),
            Err(OtpError::Clock(_))
        ));
    }

    #[rstest]
    #[case(0)]
    #[case(11)]
    fn rejects_digit_count(#[case] digits: u32) {
        let descriptor = OtpDescriptor::new("work".into(), SHA1_SECRET.to_string(), digits);

        assert!(matches!(
            totp::generate(&descriptor, SystemTime::now()),
            Err(OtpError::InvalidDigits(d)) if d == i64::from(digits)
        ));
    }

    #[test]
    fn rejects_invalid_secret() {
        let descriptor = OtpDescriptor::new("work".into(), "1NVAL1D".into(), 6);

        assert!(matches!(
            totp::generate(&descriptor, SystemTime::now()),
            Err(OtpError::InvalidSecret(_))
        ));
    }
}
