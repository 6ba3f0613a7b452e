//! `$6$` (SHA-512 crypt) password hashing compatible with glibc `crypt(3)`.
//! The output can be written directly into shadow files, PAM user databases
//! and FTP virtual-user tables. Only the default 5000 rounds are supported.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::crypto::encoding::{encode_digest, is_crypt_char, ENCODED_LEN};
use crate::crypto::mixer::mix;
use crate::crypto::rounds::{apply_rounds, DEFAULT_ROUNDS};
use crate::crypto::salt::{Salt, SaltError, DEFAULT_SALT_LEN};

/// Scheme identifier of SHA-512 crypt.
pub const SCHEME_ID: &str = "6";

const PREFIX: &str = "$6$";
const ROUNDS_PARAM: &str = "rounds=";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptError {
    #[error("invalid salt: {0}")]
    InvalidSalt(#[from] SaltError),
    #[error("malformed crypt string: {0}")]
    Malformed(&'static str),
    #[error("unsupported crypt scheme identifier `{0}`")]
    UnsupportedScheme(String),
    #[error("rounds=N is not supported; only the default {} rounds are", DEFAULT_ROUNDS)]
    UnsupportedRounds,
    #[error("encoded hash is {0} characters long; expected {}", ENCODED_LEN)]
    InvalidHashLength(usize),
    #[error("encoded hash contains a character outside ./0-9A-Za-z")]
    InvalidHashCharacter,
}

/// Assembles `$6$<salt>$<encoded>`.
pub fn format_crypt(salt: &Salt, encoded: &str) -> String {
    let mut out = String::with_capacity(PREFIX.len() + salt.len() + 1 + encoded.len());
    out.push_str(PREFIX);
    out.push_str(salt.as_str());
    out.push('$');
    out.push_str(encoded);
    out
}

/// Runs the full pipeline for an already validated salt.
fn compute_encoded(secret: &[u8], salt: &Salt) -> String {
    log::debug!(
        "computing sha512-crypt with {} rounds and a {}-character salt",
        DEFAULT_ROUNDS,
        salt.len()
    );
    let mixed = mix(secret, salt.as_bytes());
    let digest = apply_rounds(&mixed, DEFAULT_ROUNDS);
    encode_digest(&digest)
}

/// Compares two byte strings without stopping at the first difference.
fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right.iter())
        .fold(0u8, |acc, (l, r)| acc | (l ^ r))
        == 0
}

/// A parsed or freshly computed `$6$` hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptString {
    salt: Salt,
    hash: String,
}

impl CryptString {
    /// Hashes `secret` with `salt`.
    pub fn compute(secret: &[u8], salt: Salt) -> Self {
        let hash = compute_encoded(secret, &salt);
        Self { salt, hash }
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// The 86-character encoded digest.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Recomputes the hash for `secret` with this salt and compares.
    pub fn matches(&self, secret: &[u8]) -> bool {
        let candidate = compute_encoded(secret, &self.salt);
        constant_time_eq(candidate.as_bytes(), self.hash.as_bytes())
    }
}

impl fmt::Display for CryptString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_crypt(&self.salt, &self.hash))
    }
}

impl FromStr for CryptString {
    type Err = CryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('$')
            .ok_or(CryptError::Malformed("missing leading `$`"))?;
        let (scheme, rest) = rest
            .split_once('$')
            .ok_or(CryptError::Malformed("missing `$` after scheme identifier"))?;
        if scheme != SCHEME_ID {
            return Err(CryptError::UnsupportedScheme(scheme.to_string()));
        }
        let (salt, hash) = rest
            .split_once('$')
            .ok_or(CryptError::Malformed("missing `$` after salt"))?;
        if salt.starts_with(ROUNDS_PARAM) {
            return Err(CryptError::UnsupportedRounds);
        }
        let salt = Salt::new(salt)?;
        if hash.len() != ENCODED_LEN {
            return Err(CryptError::InvalidHashLength(hash.len()));
        }
        if !hash.bytes().all(is_crypt_char) {
            return Err(CryptError::InvalidHashCharacter);
        }
        Ok(Self {
            salt,
            hash: hash.to_owned(),
        })
    }
}

/// Hashes a secret with a fresh random salt of the default length.
pub fn hash_password(secret: impl AsRef<[u8]>) -> Result<String, CryptError> {
    hash_password_with_salt_len(secret, DEFAULT_SALT_LEN)
}

/// Hashes a secret with a fresh random salt of `salt_len` characters.
pub fn hash_password_with_salt_len(
    secret: impl AsRef<[u8]>,
    salt_len: usize,
) -> Result<String, CryptError> {
    let salt = Salt::generate(salt_len)?;
    Ok(CryptString::compute(secret.as_ref(), salt).to_string())
}

/// Hashes a secret with a caller supplied salt. The salt is validated before
/// any hashing work starts.
pub fn hash_password_with_salt(secret: impl AsRef<[u8]>, salt: &str) -> Result<String, CryptError> {
    let salt = Salt::new(salt)?;
    Ok(CryptString::compute(secret.as_ref(), salt).to_string())
}

/// Verifies a secret against a stored `$6$` string. Unparseable strings never
/// match.
pub fn verify_password(secret: impl AsRef<[u8]>, stored: &str) -> bool {
    match stored.parse::<CryptString>() {
        Ok(parsed) => parsed.matches(secret.as_ref()),
        Err(err) => {
            log::warn!("rejecting stored hash: {err}");
            false
        }
    }
}
