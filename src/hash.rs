/// Fast 2-value hash with xorshift
#[inline(always)]
pub fn hash2(a: u64, b: u64) -> u64 {
    let mut seed = a.wrapping_mul(2654435761).wrapping_add(b.wrapping_mul(2246822519));
    seed ^= seed << 13;
    seed ^= seed >> 7;
    seed ^= seed << 17;
    seed
}

/// Fingerprint a byte buffer by folding 8-byte words through `hash2`.
/// The length is mixed in last so zero padding cannot collide.
pub fn fingerprint(bytes: &[u8]) -> u64 {
    let mut seed = 0x9e3779b97f4a7c15;
    let mut chunks = bytes.chunks_exact(8);
    for chunk in &mut chunks {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        seed = hash2(seed, u64::from_le_bytes(word));
    }
    let mut tail = [0u8; 8];
    let rest = chunks.remainder();
    tail[..rest.len()].copy_from_slice(rest);
    seed = hash2(seed, u64::from_le_bytes(tail));
    hash2(seed, bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint(b"places"), fingerprint(b"places"));
    }

    #[test]
    fn test_fingerprint_distinguishes_content() {
        assert_ne!(fingerprint(b"places-a"), fingerprint(b"places-b"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abc\0"));
        assert_ne!(fingerprint(b""), fingerprint(b"\0"));
    }
}
