//! Key stretching rounds for SHA-512 crypt.

use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

use crate::crypto::mixer::{finalize_into, DigestBytes, MixedKey};

/// Round count used by crypt(3) when the hash carries no `rounds=` parameter.
pub const DEFAULT_ROUNDS: u32 = 5000;

/// Runs `rounds` SHA-512 transforms over the mixed key and returns the final
/// digest. Every round is executed; there is no early exit.
pub fn apply_rounds(mixed: &MixedKey, rounds: u32) -> Zeroizing<DigestBytes> {
    let p_bytes: &[u8] = &mixed.p_bytes;
    let s_bytes: &[u8] = &mixed.s_bytes;
    let mut alt = mixed.alt.clone();

    for round in 0..rounds {
        let odd = round & 1 == 1;
        let mut hasher = Sha512::new();
        if odd {
            hasher.update(p_bytes);
        } else {
            hasher.update(&alt[..]);
        }
        if round % 3 != 0 {
            hasher.update(s_bytes);
        }
        if round % 7 != 0 {
            hasher.update(p_bytes);
        }
        if odd {
            hasher.update(&alt[..]);
        } else {
            hasher.update(p_bytes);
        }
        finalize_into(hasher, &mut alt);
    }

    alt
}

#[cfg(test)]
mod tests {
    use super::{apply_rounds, DEFAULT_ROUNDS};
    use crate::crypto::mixer::mix;

    const REFERENCE_FINAL: &str = "2b209d0f3abe5abc1b24521555baa2b94d0943dae13e85666e7946e24de23237\
                                   33cc538877a227437ac5f8ede5986c71a987079aa165ef8a1bda94a5916aceff";

    #[test]
    fn stretches_reference_input() {
        let mixed = mix(b"Hello world!", b"saltstring");
        let digest = apply_rounds(&mixed, DEFAULT_ROUNDS);
        assert_eq!(hex::encode(&digest[..]), REFERENCE_FINAL);
    }

    #[test]
    fn zero_rounds_return_the_seed() {
        let mixed = mix(b"Hello world!", b"saltstring");
        let digest = apply_rounds(&mixed, 0);
        assert_eq!(*digest, *mixed.alt);
    }

    #[test]
    fn round_count_changes_the_digest() {
        let mixed = mix(b"Hello world!", b"saltstring");
        let reference = apply_rounds(&mixed, DEFAULT_ROUNDS);
        let fewer = apply_rounds(&mixed, DEFAULT_ROUNDS - 1);
        let more = apply_rounds(&mixed, DEFAULT_ROUNDS + 1);
        assert_ne!(*fewer, *reference);
        assert_ne!(*more, *reference);
        assert_ne!(*fewer, *more);
    }

    #[test]
    fn leaves_the_mixed_key_untouched() {
        let mixed = mix(b"pw", b"salt");
        let seed = *mixed.alt;
        let _ = apply_rounds(&mixed, 10);
        assert_eq!(*mixed.alt, seed);
    }
}
