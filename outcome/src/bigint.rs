//! Exact arithmetic on a signature read as one big-endian unsigned integer.
//!
//! Only division by small moduli is ever needed, so the value is kept as its
//! byte string and reduced with schoolbook long division, one byte at a time.

/// `bytes mod modulus`, with `bytes` read big-endian. `modulus` must be non-zero.
pub(crate) fn be_mod(bytes: &[u8], modulus: u64) -> u64 {
    let m = u128::from(modulus);
    let mut acc: u128 = 0;
    for byte in bytes {
        acc = ((acc << 8) | u128::from(*byte)) % m;
    }
    acc as u64
}

/// A big-endian integer consumed digit by digit in a mixed radix.
pub(crate) struct BigEndianValue {
    bytes: Vec<u8>,
}

impl BigEndianValue {
    pub(crate) fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Replace the value with `value / divisor` and return `value mod divisor`.
    /// `divisor` must be non-zero.
    pub(crate) fn div_rem(&mut self, divisor: u64) -> u64 {
        let d = u128::from(divisor);
        let mut rem: u128 = 0;
        for byte in self.bytes.iter_mut() {
            let current = (rem << 8) | u128::from(*byte);
            // current < d * 256, so the quotient digit fits in a byte
            *byte = (current / d) as u8;
            rem = current % d;
        }
        rem as u64
    }
}
