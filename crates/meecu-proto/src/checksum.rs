//! Fletcher-style two-accumulator checksum.
//!
//! Both accumulators are reduced modulo 255 after every byte. The result packs
//! the second accumulator into the high byte and the first into the low byte.
//! It catches transport corruption only; it is not collision resistant.

/// Incremental checksum state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum {
    a: u16,
    b: u16,
}

impl Checksum {
    /// Start a new checksum with both accumulators at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the running checksum.
    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.a = (self.a + u16::from(byte)) % 255;
            self.b = (self.b + self.a) % 255;
        }
    }

    /// The checksum of everything fed so far.
    pub fn finish(&self) -> u16 {
        (self.b << 8) | self.a
    }
}

/// Compute the checksum of a byte range in one call.
pub fn compute(bytes: &[u8]) -> u16 {
    let mut checksum = Checksum::new();
    checksum.update(bytes);
    checksum.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(compute(&[]), 0);
    }

    #[test]
    fn known_vectors() {
        // type, class, command (+ payload) of the canonical request messages
        assert_eq!(compute(&[0x00, 0x04, 0x00]), 0x0804);
        assert_eq!(compute(&[0x00, 0x04, 0x01, 0x01]), 0x0f06);
        assert_eq!(compute(&[0x00, 0x00, 0x02, 0x01]), 0x0503);
        assert_eq!(compute(&[0x00, 0x00, 0x01, 0x00]), 0x0201);
    }

    #[test]
    fn is_order_sensitive() {
        assert_ne!(compute(&[0x01, 0x02]), compute(&[0x02, 0x01]));
    }

    #[test]
    fn accumulators_wrap_at_255() {
        // 0xff reduces to zero in the first accumulator
        assert_eq!(compute(&[0xff]), 0);
        assert_eq!(compute(&[0xfe, 0x01]), 0xfe00);
        assert_eq!(compute(&[0x80, 0x80]), 0x8101);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = b"\x0f\x00\x02\x01\x02\x00\x01\x00\x00\x0e\x00\x04";
        let mut checksum = Checksum::new();
        checksum.update(&data[..3]);
        checksum.update(&data[3..]);
        assert_eq!(checksum.finish(), compute(data));
    }

    #[test]
    fn is_deterministic() {
        let data = vec![0xa5; 512];
        assert_eq!(compute(&data), compute(&data));
    }
}
