//! SHA-256 hashing, HMAC-SHA256 and the 52-bit uniform fraction.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Number of leading digest bits turned into a uniform fraction.
///
/// 52 bits is the f64 mantissa width, so `r / 2^52` is exact.
pub const FRACTION_BITS: u32 = 52;

/// Compute the SHA-256 hash of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let result = Sha256::digest(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// `HMAC-SHA256(key, message)`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    let result = mac.finalize().into_bytes();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// The leading [`FRACTION_BITS`] bits of `digest` as an integer `r < 2^52`.
pub fn leading_bits(digest: &[u8; 32]) -> u64 {
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head) >> (64 - FRACTION_BITS)
}

/// `X = r / 2^52`, uniformly distributed in `[0, 1)`.
pub fn uniform_fraction(digest: &[u8; 32]) -> f64 {
    leading_bits(digest) as f64 / (1u64 << FRACTION_BITS) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_multi_equivalent() {
        assert_eq!(sha256(b"helloworld"), sha256_multi(&[b"hello", b"world"]));
    }

    #[test]
    fn hmac_rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hmac_differs_from_prefixed_hash() {
        let key = [7u8; 32];
        assert_ne!(hmac_sha256(&key, b"seed:0"), sha256_multi(&[&key, b"seed:0"]));
    }

    #[test]
    fn leading_bits_extremes() {
        assert_eq!(leading_bits(&[0u8; 32]), 0);
        assert_eq!(leading_bits(&[0xff; 32]), (1u64 << 52) - 1);

        let mut d = [0u8; 32];
        d[6] = 0x10; // lowest of the 52 leading bits
        assert_eq!(leading_bits(&d), 1);
        d[6] = 0x08; // first ignored bit
        assert_eq!(leading_bits(&d), 0);
    }

    #[test]
    fn uniform_fraction_range() {
        assert_eq!(uniform_fraction(&[0u8; 32]), 0.0);
        let top = uniform_fraction(&[0xff; 32]);
        assert!(top < 1.0 && top > 0.999_999);
        let mut half = [0u8; 32];
        half[0] = 0x80;
        assert_eq!(uniform_fraction(&half), 0.5);
    }
}
