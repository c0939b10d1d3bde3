/// Fold `word` into `csum`, adding the carry back in on overflow.
#[inline(always)]
const fn fold(csum: u32, word: u32) -> u32 {
    let (sum, carry) = csum.overflowing_add(word);
    sum.wrapping_add(carry as u32)
}

/// Accumulating 32-bit checksum over big-endian words.
///
/// Starts from `csum`, so a large buffer can be processed in several calls.
/// A trailing partial word (1–3 bytes) is shifted in from the top byte down,
/// each new byte entering at bits 24..32 and pushing the earlier ones towards
/// bit 0, and then folded like a full word.
#[must_use]
pub fn cksum32(buf: &[u8], mut csum: u32) -> u32 {
    let mut words = buf.chunks_exact(4);
    for w in &mut words {
        csum = fold(csum, u32::from_be_bytes([w[0], w[1], w[2], w[3]]));
    }

    let tail = words.remainder();
    if !tail.is_empty() {
        let val = tail
            .iter()
            .fold(0u32, |val, &b| (val >> 8) | (u32::from(b) << 24));
        csum = fold(csum, val);
    }

    csum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word() {
        assert_eq!(cksum32(&[0x00, 0x00, 0x00, 0x01], 0), 1);
        assert_eq!(cksum32(&[0x12, 0x34, 0x56, 0x78], 0), 0x1234_5678);
    }

    #[test]
    fn end_around_carry() {
        assert_eq!(cksum32(&[0xFF, 0xFF, 0xFF, 0xFF], 1), 1);
        assert_eq!(cksum32(&[0x80, 0, 0, 0, 0x80, 0, 0, 0], 0), 1);
    }

    #[test]
    fn partial_tail() {
        assert_eq!(cksum32(&[0xAB], 0), 0xAB00_0000);
        assert_eq!(cksum32(&[0x01, 0x02], 0), 0x0201_0000);
        assert_eq!(cksum32(&[0, 0, 0, 1, 0x01, 0x02, 0x03], 0), 0x0302_0101);
    }

    #[test]
    fn incremental_equals_one_shot_on_word_boundary() {
        let data: [u8; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let once = cksum32(&data, 0);
        let split = cksum32(&data[8..], cksum32(&data[..8], 0));
        assert_eq!(once, split);
        assert_eq!(cksum32(&data, 0), once);
    }

    #[test]
    fn order_sensitive() {
        assert_ne!(cksum32(&[1, 2, 3, 4, 5], 0), cksum32(&[5, 4, 3, 2, 1], 0));
    }
}
