// SPDX-License-Identifier: MIT OR Apache-2.0
//! CRC32 (ISO-HDLC / zlib) and the algebra over its reflected polynomial
//! ring: `combine`, `multiply`, `zero_unpad`, `xpown`, `xpow8n`.
//!
//! The byte-wise update uses the standard reflected, table-driven algorithm
//! with polynomial `0xEDB8_8320`, initial state `0xFFFF_FFFF`, final XOR
//! `0xFFFF_FFFF`. The algebra functions operate directly on *finalized*
//! (already XORed-out) CRC32 values, the same convention zlib's own
//! `crc32_combine` uses — the multiplicative identity in this representation
//! is `0x8000_0000` (the reflected encoding of the polynomial `1`), not `1`.

/// A single zero byte's update operator, represented as `x^8` in the
/// reflected ring; `multiply`-ing by this value is equivalent to appending
/// one zero byte's worth of shift to a CRC.
const POLY: u32 = 0xEDB8_8320;

/// Multiplicative order of `x` in this ring (`2^32 - 1`): the polynomial is
/// primitive, so every nonzero element cycles with this period.
const ORDER: u64 = 0xFFFF_FFFF;

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { POLY ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

static TABLE: [u32; 256] = build_table();

/// Initial rolling state, before any bytes have been folded in.
pub const INITIAL_STATE: u32 = 0xFFFF_FFFF;

/// Folds `bytes` into the rolling `state` (table-driven, byte at a time).
///
/// `state` starts at [`INITIAL_STATE`]; call [`finalize`] once to get the
/// CRC32 callers expect to compare against wire footers.
#[must_use]
pub fn update(state: u32, bytes: &[u8]) -> u32 {
    let mut crc = state;
    for &b in bytes {
        crc = TABLE[((crc ^ u32::from(b)) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc
}

/// Applies the final XOR, turning a rolling state into the CRC32 value seen
/// on the wire.
#[must_use]
pub const fn finalize(state: u32) -> u32 {
    state ^ 0xFFFF_FFFF
}

/// One-shot CRC32 of `bytes`.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u32 {
    finalize(update(INITIAL_STATE, bytes))
}

/// Multiplies two finalized CRC32 values as elements of the reflected
/// polynomial ring (`a * b mod p(x)`).
///
/// Implemented as GF(2) "Russian peasant" multiplication: `b`'s bits (MSB
/// first, since bit `31-i` represents the coefficient of `x^i` in this
/// reflected encoding) select which powers of `x` times `a` to XOR together,
/// with `a` itself advanced one power of `x` per step via the same
/// shift-and-conditionally-XOR-the-polynomial step the byte-wise `update`
/// uses per bit.
#[must_use]
pub fn multiply(a: u32, b: u32) -> u32 {
    let mut result = 0u32;
    let mut a = a;
    let mut b = b;
    for _ in 0..32 {
        if b & 0x8000_0000 != 0 {
            result ^= a;
        }
        b <<= 1;
        a = if a & 1 != 0 { (a >> 1) ^ POLY } else { a >> 1 };
    }
    result
}

/// Multiplicative inverse of a nonzero ring element, via `a^(ORDER-1)`
/// (Fermat's little theorem over the `ORDER+1`-element field).
fn inverse(a: u32) -> u32 {
    pow_mod(a, ORDER - 1)
}

/// `base^exp mod p(x)`, exponent reduced mod `ORDER` first since `x`'s order
/// (and hence every nonzero element's order) divides `ORDER`.
fn pow_mod(base: u32, exp: u64) -> u32 {
    let mut exp = exp % ORDER;
    let mut result = 0x8000_0000u32; // multiplicative identity (x^0)
    let mut sq = base;
    while exp > 0 {
        if exp & 1 != 0 {
            result = multiply(result, sq);
        }
        sq = multiply(sq, sq);
        exp >>= 1;
    }
    result
}

/// `x^n mod p(x)`, `n` a bit count. Cyclic with period `2^32 - 1`.
#[must_use]
pub fn xpown(n: u64) -> u32 {
    pow_mod(0x4000_0000, n) // 0x4000_0000 is x^1 in this encoding
}

/// `x^(8n) mod p(x)`, `n` a byte count up to `u64::MAX`.
///
/// `n * 8` is computed with the same 64-bit wraparound a C `uint64_t`
/// shift-by-3 would silently produce for `n` near `u64::MAX`: the reference
/// implementation this crate's CRC32 algebra is grounded on (`sabctools`)
/// takes that shift in a 64-bit register with no overflow check, and
/// matching it bit-for-bit (rather than reducing `n` modulo the ring's
/// order before multiplying) is what makes this function agree with its
/// oracle test vectors at the `n` near `u64::MAX` boundary.
#[must_use]
pub fn xpow8n(n: u64) -> u32 {
    xpown(n.wrapping_mul(8))
}

/// Composes `CRC(A)` and `CRC(B)` (with `|B| = len_b` bytes) into
/// `CRC(A ++ B)`, without re-reading either span.
///
/// `len_b = 0` returns `crc_a ^ crc_b` (degenerate: no bytes shifted in from
/// `B`'s length, so only the two finalized values combine by XOR, matching
/// zlib's own degenerate-length behavior once expressed in closed form).
#[must_use]
pub fn combine(crc_a: u32, crc_b: u32, len_b: u64) -> u32 {
    multiply(xpow8n(len_b), crc_a) ^ crc_b
}

/// Inverse of appending `zeroes` zero bytes: recovers the CRC of the prefix
/// before those zero bytes were appended, given the CRC after.
#[must_use]
pub fn zero_unpad(crc: u32, zeroes: u64) -> u32 {
    multiply(crc, inverse(xpow8n(zeroes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_crc() {
        let data = b"Hello world!";
        assert_eq!(checksum(data), 0x1B85_1995);
    }

    #[rstest::rstest]
    #[case(0, 0, 0, 0)]
    #[case(u32::MAX, 0, 0, u32::MAX)]
    #[case(0, u32::MAX, 0, u32::MAX)]
    #[case(u32::MAX, u32::MAX, 0, 0)]
    #[case(4, 16, 256, 2_385_497_022)]
    #[case(100, 200, 300, 1_009_376_567)]
    fn combine_matches_reference_vectors(
        #[case] crc_a: u32,
        #[case] crc_b: u32,
        #[case] len_b: u64,
        #[case] expected: u32,
    ) {
        assert_eq!(combine(crc_a, crc_b, len_b), expected);
    }

    #[test]
    fn combine_accepts_maximal_len() {
        // Must not panic regardless of how large len_b is.
        let _ = combine(0, 0, u64::MAX);
    }

    #[rstest::rstest]
    #[case(0, 0, 0)]
    #[case(u32::MAX, 0, 0)]
    #[case(0, u32::MAX, 0)]
    #[case(u32::MAX, u32::MAX, 1_048_090_088)]
    #[case(100, 200, 4_155_012_749)]
    fn multiply_matches_reference_vectors(
        #[case] a: u32,
        #[case] b: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(multiply(a, b), expected);
    }

    #[rstest::rstest]
    #[case(0, 0, 0)]
    #[case(u32::MAX, 0, u32::MAX)]
    #[case(u32::MAX, u32::MAX, u32::MAX)]
    #[case(100, 200, 1_523_530_880)]
    fn zero_unpad_matches_reference_vectors(
        #[case] crc: u32,
        #[case] zeroes: u64,
        #[case] expected: u32,
    ) {
        assert_eq!(zero_unpad(crc, zeroes), expected);
    }

    #[rstest::rstest]
    #[case(0, 0x8000_0000)]
    #[case(1, 0x4000_0000)]
    #[case(8, 0x0080_0000)]
    #[case(30, 2)]
    #[case(31, 1)]
    #[case(u32::MAX as u64, 0x8000_0000)]
    #[case(u64::MAX, 0x8000_0000)]
    fn xpown_matches_reference_vectors(#[case] n: u64, #[case] expected: u32) {
        assert_eq!(xpown(n), expected);
    }

    #[rstest::rstest]
    #[case(0, 0x8000_0000)]
    #[case(1, 0x0080_0000)]
    #[case(u32::MAX as u64, 0x8000_0000)]
    #[case(u64::MAX, 3_742_066_410)]
    #[case(112_233_445_566, 1_480_064_961)]
    fn xpow8n_matches_reference_vectors(#[case] n: u64, #[case] expected: u32) {
        assert_eq!(xpow8n(n), expected);
    }

    #[test]
    fn zero_unpad_inverts_combine_with_zero_crc_b() {
        for &(crc, n) in &[(0u32, 0u64), (0x1234_5678, 17), (u32::MAX, 9_999)] {
            let padded = combine(crc, 0, n);
            assert_eq!(zero_unpad(padded, n), crc);
        }
    }

    #[test]
    fn combine_is_associative_over_concatenation() {
        // CRC(A ++ B ++ C) via two different groupings must agree.
        let a = b"feed the";
        let b = b" parser ";
        let c = b"bytes!!";
        let crc_a = checksum(a);
        let crc_b = checksum(b);
        let crc_c = checksum(c);
        let mut ab = a.to_vec();
        ab.extend_from_slice(b);
        let crc_ab = checksum(&ab);
        let mut abc = ab.clone();
        abc.extend_from_slice(c);
        let crc_abc_direct = checksum(&abc);

        let combined_left = combine(combine(crc_a, crc_b, b.len() as u64), crc_c, c.len() as u64);
        let combined_right = combine(crc_a, combine(crc_b, crc_c, c.len() as u64), (b.len() + c.len()) as u64);
        assert_eq!(combine(crc_a, crc_b, b.len() as u64), crc_ab);
        assert_eq!(combined_left, crc_abc_direct);
        assert_eq!(combined_right, crc_abc_direct);
    }
}
