// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Synthetic record generation for the CLI's `generate-corpus` subcommand,
//! the throughput benchmark, and property tests that need a large,
//! reproducible input without shipping one in the repository.

use std::collections::HashSet;
use std::io::{self, Write};

use ahash::RandomState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for a deterministic synthetic corpus.
///
/// The same `seed` always produces the same bytes, regardless of host or
/// thread count; nothing about generation is parallel.
#[derive(Debug, Clone, Copy)]
pub struct CorpusSpec {
    /// Size of the pool of distinct records to sample from.
    pub unique_count: usize,
    /// Number of records written to the output, sampled with replacement
    /// from the unique pool.
    pub total_lines: usize,
    /// Inclusive lower bound on a generated record's length, in bytes.
    pub min_len: usize,
    /// Inclusive upper bound on a generated record's length, in bytes.
    pub max_len: usize,
    /// Seed driving both pool generation and sampling.
    pub seed: u64,
}

impl CorpusSpec {
    /// A small corpus suitable for fast unit and property tests.
    pub fn small(seed: u64) -> Self {
        CorpusSpec {
            unique_count: 64,
            total_lines: 2_000,
            min_len: 1,
            max_len: 40,
            seed,
        }
    }
}

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Writes `spec.total_lines` newline-terminated records to `out`, one per
/// line, sampled with replacement from a pool of `spec.unique_count`
/// distinct records.
///
/// Distinctness within the pool is enforced with an `ahash`-backed set
/// during generation; duplicate draws are simply retried, so generation
/// time grows with how dense `unique_count` is relative to the space of
/// strings `[min_len, max_len]` can produce.
pub fn generate(spec: &CorpusSpec, out: &mut impl Write) -> io::Result<()> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let pool = build_pool(spec, &mut rng);

    for _ in 0..spec.total_lines {
        let index = rng.gen_range(0..pool.len());
        out.write_all(&pool[index])?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn build_pool(spec: &CorpusSpec, rng: &mut StdRng) -> Vec<Vec<u8>> {
    let mut seen: HashSet<Vec<u8>, RandomState> =
        HashSet::with_capacity_and_hasher(spec.unique_count, RandomState::new());
    let mut pool = Vec::with_capacity(spec.unique_count);

    while pool.len() < spec.unique_count {
        let record = random_record(spec, rng);
        if seen.insert(record.clone()) {
            pool.push(record);
        }
    }
    pool
}

fn random_record(spec: &CorpusSpec, rng: &mut StdRng) -> Vec<u8> {
    let len = if spec.min_len == spec.max_len {
        spec.min_len
    } else {
        rng.gen_range(spec.min_len..=spec.max_len)
    };
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_is_byte_identical() {
        let spec = CorpusSpec::small(7);
        let mut a = Vec::new();
        let mut b = Vec::new();
        generate(&spec, &mut a).unwrap();
        generate(&spec, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        generate(&CorpusSpec::small(1), &mut a).unwrap();
        generate(&CorpusSpec::small(2), &mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn emits_exactly_total_lines_records() {
        let spec = CorpusSpec::small(3);
        let mut buf = Vec::new();
        generate(&spec, &mut buf).unwrap();
        assert_eq!(buf.iter().filter(|&&b| b == b'\n').count(), spec.total_lines);
    }

    #[test]
    fn records_respect_length_bounds() {
        let spec = CorpusSpec {
            unique_count: 8,
            total_lines: 200,
            min_len: 3,
            max_len: 6,
            seed: 11,
        };
        let mut buf = Vec::new();
        generate(&spec, &mut buf).unwrap();
        for line in buf.split(|&b| b == b'\n').filter(|l| !l.is_empty()) {
            assert!(line.len() >= spec.min_len && line.len() <= spec.max_len);
        }
    }

    #[test]
    fn fixed_length_records_hit_the_exact_length() {
        let spec = CorpusSpec {
            unique_count: 4,
            total_lines: 20,
            min_len: 5,
            max_len: 5,
            seed: 42,
        };
        let mut buf = Vec::new();
        generate(&spec, &mut buf).unwrap();
        for line in buf.split(|&b| b == b'\n').filter(|l| !l.is_empty()) {
            assert_eq!(line.len(), 5);
        }
    }
}
