//! crypt(3) base64 output encoding for SHA-512 crypt. The final digest is not
//! encoded in byte order: bytes are taken in the fixed triples below and each
//! 24-bit group is written least significant six bits first.

use crate::crypto::mixer::{DigestBytes, DIGEST_LEN};

/// The crypt(3) alphabet, `./0-9A-Za-z`.
pub const CRYPT_ALPHABET: &[u8; 64] =
    b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length of the encoded 64-byte digest: 21 full groups plus a 2-character tail.
pub const ENCODED_LEN: usize = 86;

/// Digest byte indices for each 4-character group, in emission order.
const PERMUTATION: [(usize, usize, usize); 21] = [
    (0, 21, 42),
    (22, 43, 1),
    (44, 2, 23),
    (3, 24, 45),
    (25, 46, 4),
    (47, 5, 26),
    (6, 27, 48),
    (28, 49, 7),
    (50, 8, 29),
    (9, 30, 51),
    (31, 52, 10),
    (53, 11, 32),
    (12, 33, 54),
    (34, 55, 13),
    (56, 14, 35),
    (15, 36, 57),
    (37, 58, 16),
    (59, 17, 38),
    (18, 39, 60),
    (40, 61, 19),
    (62, 20, 41),
];

/// Returns `true` for bytes of the crypt(3) alphabet.
pub fn is_crypt_char(byte: u8) -> bool {
    matches!(byte, b'.' | b'/' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z')
}

fn push_group(out: &mut String, b2: u8, b1: u8, b0: u8, chars: usize) {
    let mut value = (u32::from(b2) << 16) | (u32::from(b1) << 8) | u32::from(b0);
    for _ in 0..chars {
        out.push(CRYPT_ALPHABET[(value & 0x3f) as usize] as char);
        value >>= 6;
    }
}

/// Encodes a final SHA-512 crypt digest into its 86-character textual form.
pub fn encode_digest(digest: &DigestBytes) -> String {
    let mut out = String::with_capacity(ENCODED_LEN);
    for &(a, b, c) in PERMUTATION.iter() {
        push_group(&mut out, digest[a], digest[b], digest[c], 4);
    }
    // The last byte only fills the two low 6-bit groups.
    push_group(&mut out, 0, 0, digest[DIGEST_LEN - 1], 2);
    out
}
