// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Record boundary scanning and content fingerprinting.
//!
//! `scan` finds the next record in a byte slice and reduces its content to a
//! 64-bit fingerprint. The newline search is delegated to `memchr`, which
//! dispatches to AVX2/SSE2 on x86_64 and NEON on aarch64 at runtime; the
//! mixing step runs two rounds of AES-NI over 16-byte chunks when the host
//! supports it, matching the construction this engine is descended from,
//! and falls back to a scalar multiply-xor mix otherwise.

use std::sync::OnceLock;

use crate::hashset::EMPTY;

/// Fixed AES round key, split into the two 64-bit halves `_mm_set_epi64x` takes.
const ROUND_KEY_HI: u64 = 0x0c6ecc04_7ba9f765;
const ROUND_KEY_LO: u64 = 0x06755c7b_9e8bba13;

/// Scans the next record starting at the front of `data`.
///
/// Returns `(length, hash)` where `length` is the number of bytes before the
/// terminating `0x0A` (or before the end of `data`, if none is found) and
/// `hash` is never the sentinel value `HashSet` uses for empty slots.
///
/// Callers must ensure `data` is non-empty; an empty slice has no record to
/// produce (the partitioner only ever hands workers non-empty ranges, except
/// for the degenerate all-empty-range case that the driver short-circuits).
pub fn scan(data: &[u8]) -> (usize, u64) {
    let length = memchr::memchr(b'\n', data).unwrap_or(data.len());
    let hash = fingerprint(&data[..length]);
    (length, avoid_sentinel(hash))
}

#[inline]
fn avoid_sentinel(hash: u64) -> u64 {
    if hash == EMPTY {
        hash ^ 1
    } else {
        hash
    }
}

fn fingerprint(record: &[u8]) -> u64 {
    dispatch()(record)
}

type MixFn = fn(&[u8]) -> u64;

fn dispatch() -> MixFn {
    static DISPATCH: OnceLock<MixFn> = OnceLock::new();
    *DISPATCH.get_or_init(|| {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("aes") && is_x86_feature_detected!("sse2") {
                return mix_aesni_call;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("aes") {
                return mix_aes_aarch64_call;
            }
        }
        mix_scalar
    })
}

#[cfg(target_arch = "x86_64")]
fn mix_aesni_call(record: &[u8]) -> u64 {
    // Safety: only reached once the dispatcher has confirmed `aes`+`sse2`.
    unsafe { mix_aesni(record) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "aes,sse2")]
unsafe fn mix_aesni(record: &[u8]) -> u64 {
    use std::arch::x86_64::{_mm_aesenc_si128, _mm_loadu_si128, _mm_set_epi64x};

    let key = _mm_set_epi64x(ROUND_KEY_HI as i64, ROUND_KEY_LO as i64);
    let mut hash = 0u64;
    let mut chunks = record.chunks(16);
    for chunk in &mut chunks {
        let mut buf = [0u8; 16];
        buf[..chunk.len()].copy_from_slice(chunk);
        // Safety: `buf` is a fully-initialized, 16-byte-aligned-enough local array.
        let mut lanes = unsafe { _mm_loadu_si128(buf.as_ptr().cast()) };
        lanes = _mm_aesenc_si128(lanes, key);
        lanes = _mm_aesenc_si128(lanes, key);
        let halves: [u64; 2] = std::mem::transmute(lanes);
        hash ^= halves[0] ^ halves[1];
    }
    hash
}

#[cfg(target_arch = "aarch64")]
fn mix_aes_aarch64_call(record: &[u8]) -> u64 {
    // Safety: only reached once the dispatcher has confirmed aarch64 `aes`.
    unsafe { mix_aes_aarch64(record) }
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "aes")]
unsafe fn mix_aes_aarch64(record: &[u8]) -> u64 {
    use std::arch::aarch64::{vaeseq_u8, vaesmcq_u8, vdupq_n_u8, veorq_u8};

    let zero_key = vdupq_n_u8(0);
    let mut hash = 0u64;
    let mut chunks = record.chunks(16);
    for chunk in &mut chunks {
        let mut buf = [0u8; 16];
        buf[..chunk.len()].copy_from_slice(chunk);
        let mut lanes = std::mem::transmute::<[u8; 16], std::arch::aarch64::uint8x16_t>(buf);
        // `vaeseq_u8` XORs in its key argument before the SubBytes/ShiftRows
        // step, so a zero key plus the round-key XOR below reproduces a
        // fixed-round-key AES round.
        lanes = veorq_u8(lanes, std::mem::transmute(round_key_bytes()));
        lanes = vaesmcq_u8(vaeseq_u8(lanes, zero_key));
        lanes = veorq_u8(lanes, std::mem::transmute(round_key_bytes()));
        lanes = vaesmcq_u8(vaeseq_u8(lanes, zero_key));
        let halves: [u64; 2] = std::mem::transmute(lanes);
        hash ^= halves[0] ^ halves[1];
    }
    hash
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn round_key_bytes() -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&ROUND_KEY_HI.to_le_bytes());
    bytes[8..].copy_from_slice(&ROUND_KEY_LO.to_le_bytes());
    bytes
}

/// Portable two-round multiply-xor mix, used when no AES hardware is available.
///
/// Not bit-compatible with the AES-NI path; both are deterministic for a
/// given binary and target, which is the only cross-run guarantee the
/// fingerprint needs to make.
fn mix_scalar(record: &[u8]) -> u64 {
    const M1: u64 = 0xff51_afd7_ed55_8ccd;
    const M2: u64 = 0xc4ce_b9fe_1a85_ec53;

    let mut hash = 0u64;
    let mut chunks = record.chunks(16);
    for chunk in &mut chunks {
        let mut buf = [0u8; 16];
        buf[..chunk.len()].copy_from_slice(chunk);
        let mut lo = u64::from_le_bytes(buf[..8].try_into().unwrap());
        let mut hi = u64::from_le_bytes(buf[8..].try_into().unwrap());
        for _ in 0..2 {
            lo = (lo ^ ROUND_KEY_LO).wrapping_mul(M1).rotate_left(31) ^ hi;
            hi = (hi ^ ROUND_KEY_HI).wrapping_mul(M2).rotate_left(29) ^ lo;
        }
        hash ^= lo ^ hi;
    }
    hash
}
