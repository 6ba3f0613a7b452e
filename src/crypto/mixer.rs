//! Initial key mixing for SHA-512 crypt. This produces the seed digest and the
//! `P`/`S` byte sequences that the rounds stage consumes. The order of every
//! update below is part of the `$6$` format and must not be rearranged.

use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

/// SHA-512 output size; every intermediate digest has exactly this length.
pub const DIGEST_LEN: usize = 64;

pub type DigestBytes = [u8; DIGEST_LEN];

/// Material derived from a secret and salt, wiped from memory on drop.
pub struct MixedKey {
    /// Seed digest for round zero.
    pub alt: Zeroizing<DigestBytes>,
    /// Secret-derived sequence, same length as the secret.
    pub p_bytes: Zeroizing<Vec<u8>>,
    /// Salt-derived sequence, same length as the salt.
    pub s_bytes: Zeroizing<Vec<u8>>,
}

/// Finishes a SHA-512 context into `out`.
pub(crate) fn finalize_into(hasher: Sha512, out: &mut DigestBytes) {
    out.copy_from_slice(&hasher.finalize());
}

fn finalize(hasher: Sha512) -> Zeroizing<DigestBytes> {
    let mut out = Zeroizing::new([0u8; DIGEST_LEN]);
    finalize_into(hasher, &mut out);
    out
}

/// Repeats `digest` until exactly `len` bytes are produced.
fn stretch(digest: &DigestBytes, len: usize) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(digest.iter().copied().cycle().take(len).collect())
}

/// Runs the mixing stage. `salt` is expected to be validated already.
pub fn mix(secret: &[u8], salt: &[u8]) -> MixedKey {
    let key_len = secret.len();

    let mut hasher = Sha512::new();
    hasher.update(secret);
    hasher.update(salt);
    hasher.update(secret);
    let alternate = finalize(hasher);

    let mut hasher = Sha512::new();
    hasher.update(secret);
    hasher.update(salt);
    let mut remaining = key_len;
    while remaining > DIGEST_LEN {
        hasher.update(&alternate[..]);
        remaining -= DIGEST_LEN;
    }
    hasher.update(&alternate[..remaining]);

    let mut bits = key_len;
    while bits > 0 {
        if bits & 1 == 1 {
            hasher.update(&alternate[..]);
        } else {
            hasher.update(secret);
        }
        bits >>= 1;
    }
    let alt = finalize(hasher);

    let mut hasher = Sha512::new();
    for _ in 0..key_len {
        hasher.update(secret);
    }
    let p_digest = finalize(hasher);

    let mut hasher = Sha512::new();
    for _ in 0..16 + usize::from(alt[0]) {
        hasher.update(salt);
    }
    let s_digest = finalize(hasher);

    MixedKey {
        p_bytes: stretch(&p_digest, key_len),
        s_bytes: stretch(&s_digest, salt.len()),
        alt,
    }
}
