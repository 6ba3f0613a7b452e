//! Salt validation and generation for `$6$` hashes.
//! A salt is stored verbatim inside the crypt string, so it is restricted to
//! the crypt(3) alphabet and checked before any hashing work starts.

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::crypto::encoding::is_crypt_char;

pub const SALT_MIN_LEN: usize = 1;
pub const SALT_MAX_LEN: usize = 16;

/// Length used when the caller does not ask for a specific one.
pub const DEFAULT_SALT_LEN: usize = SALT_MAX_LEN;

/// Twelve random bytes encode to exactly sixteen crypt characters.
const MAX_RANDOM_BYTES: usize = SALT_MAX_LEN * 6 / 8;

const CRYPT_ENGINE: GeneralPurpose = GeneralPurpose::new(&alphabet::CRYPT, NO_PAD);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaltError {
    #[error("salt is empty")]
    Empty,
    #[error("salt is {len} bytes long; at most {} are allowed", SALT_MAX_LEN)]
    TooLong { len: usize },
    #[error("salt byte {byte:#04x} at position {position} is outside ./0-9A-Za-z")]
    InvalidCharacter { position: usize, byte: u8 },
    #[error("requested salt length {0} is outside {}..={}", SALT_MIN_LEN, SALT_MAX_LEN)]
    InvalidLength(usize),
    #[error("system random source failed: {0}")]
    RandomSource(String),
}

/// Checks length and alphabet of a candidate salt.
pub fn validate_salt(salt: &[u8]) -> Result<(), SaltError> {
    if salt.is_empty() {
        return Err(SaltError::Empty);
    }
    if salt.len() > SALT_MAX_LEN {
        return Err(SaltError::TooLong { len: salt.len() });
    }
    match salt.iter().position(|&b| !is_crypt_char(b)) {
        Some(position) => Err(SaltError::InvalidCharacter {
            position,
            byte: salt[position],
        }),
        None => Ok(()),
    }
}

/// Produces `len` characters drawn uniformly from the crypt(3) alphabet using
/// the operating system's CSPRNG.
pub fn generate_salt(len: usize) -> Result<String, SaltError> {
    if !(SALT_MIN_LEN..=SALT_MAX_LEN).contains(&len) {
        return Err(SaltError::InvalidLength(len));
    }

    // Each kept character covers six fully random bits.
    let mut raw = [0u8; MAX_RANDOM_BYTES];
    let needed = (len * 6 + 7) / 8;
    OsRng
        .try_fill_bytes(&mut raw[..needed])
        .map_err(|e| SaltError::RandomSource(format!("{e}")))?;

    let mut salt = CRYPT_ENGINE.encode(&raw[..needed]);
    salt.truncate(len);
    Ok(salt)
}

/// A salt known to satisfy the `$6$` length and alphabet rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Salt(String);

impl Salt {
    /// Validates `value` and wraps it. Fails with the first violated rule.
    pub fn new(value: &str) -> Result<Self, SaltError> {
        validate_salt(value.as_bytes())?;
        Ok(Self(value.to_owned()))
    }

    /// Generates a fresh random salt of `len` characters.
    pub fn generate(len: usize) -> Result<Self, SaltError> {
        generate_salt(len).map(Self)
    }

    /// The salt as it appears between the `$` separators.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw salt bytes fed to the mixing stage.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Number of salt characters, always in `1..=16`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed salt; present alongside [`Salt::len`]
    /// to satisfy clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Salt {
    type Err = SaltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Salt::new(s)
    }
}

impl AsRef<str> for Salt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_salt, validate_salt, Salt, SaltError, SALT_MAX_LEN};
    use crate::crypto::encoding::{is_crypt_char, CRYPT_ALPHABET};
    use std::collections::HashSet;

    #[test]
    fn generates_every_allowed_length() {
        for len in 1..=SALT_MAX_LEN {
            let salt = generate_salt(len).expect("length is in range");
            assert_eq!(salt.len(), len);
            assert!(salt.bytes().all(is_crypt_char), "unexpected character in {salt}");
        }
    }

    #[test]
    fn rejects_out_of_range_lengths() {
        assert_eq!(generate_salt(0).unwrap_err(), SaltError::InvalidLength(0));
        assert_eq!(generate_salt(17).unwrap_err(), SaltError::InvalidLength(17));
    }

    #[test]
    fn generated_salts_do_not_repeat() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let salt = generate_salt(16).expect("salt generation should succeed");
            assert!(seen.insert(salt), "duplicate salt generated");
        }
    }

    #[test]
    fn generated_salts_use_the_whole_alphabet() {
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            seen.extend(generate_salt(16).expect("salt").into_bytes());
        }
        assert_eq!(seen.len(), CRYPT_ALPHABET.len());
    }

    #[test]
    fn generated_salts_validate() {
        let salt = Salt::generate(11).expect("salt");
        assert_eq!(salt.len(), 11);
        assert!(!salt.is_empty());
        assert!(Salt::new(salt.as_str()).is_ok());
    }

    #[test]
    fn validation_names_the_violated_constraint() {
        assert_eq!(validate_salt(b""), Err(SaltError::Empty));
        assert_eq!(
            validate_salt(b"0123456789abcdefg"),
            Err(SaltError::TooLong { len: 17 })
        );
        assert_eq!(
            validate_salt(b"ab$cd"),
            Err(SaltError::InvalidCharacter { position: 2, byte: b'$' })
        );
        assert_eq!(
            validate_salt(b"abc\n"),
            Err(SaltError::InvalidCharacter { position: 3, byte: b'\n' })
        );
        assert!(validate_salt(b"./09AZaz").is_ok());
        assert!(validate_salt(b"0123456789abcdef").is_ok());
    }

    #[test]
    fn parses_and_displays() {
        let salt: Salt = "saltstring".parse().expect("valid salt");
        assert_eq!(salt.to_string(), "saltstring");
        assert!("salt string".parse::<Salt>().is_err());
    }

    #[test]
    fn errors_are_readable() {
        let err = Salt::new("").unwrap_err();
        assert!(format!("{err}").contains("empty"));
        let err = Salt::new(&"a".repeat(20)).unwrap_err();
        assert!(format!("{err}").contains("at most 16"));
    }
}
