// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::Write;
use std::num::NonZeroUsize;

use tempfile::NamedTempFile;

fn write_input(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn distinct_count(bytes: &[u8], workers: usize) -> u32 {
    let file = write_input(bytes);
    let (count, _) =
        uniquify::uniquify_to_memory(file.path(), NonZeroUsize::new(workers).unwrap()).unwrap();
    count
}

#[test]
fn empty_input_has_no_records() {
    assert_eq!(distinct_count(b"", 1), 0);
}

#[test]
fn single_newline_is_one_empty_record() {
    assert_eq!(distinct_count(b"\n", 1), 1);
}

#[test]
fn runs_of_newlines_collapse_to_one_empty_record() {
    assert_eq!(distinct_count(b"\n\n\n\n\n", 1), 1);
}

#[test]
fn mixed_duplicates_and_lengths() {
    assert_eq!(distinct_count(b"a\na\nb\nbc\nc\nd\nd\n", 1), 5);
}

#[test]
fn empty_records_count_once_alongside_nonempty_ones() {
    assert_eq!(distinct_count(b"a\n\n\na\n\nb\nb\n\n", 1), 3);
}

#[test]
fn worker_count_does_not_change_the_distinct_count() {
    let input = {
        let mut data = Vec::new();
        for i in 0..5_000 {
            data.extend_from_slice(format!("record-{}\n", i % 731).as_bytes());
        }
        data
    };
    let file = write_input(&input);

    let baseline = {
        let (count, _) =
            uniquify::uniquify_to_memory(file.path(), NonZeroUsize::new(1).unwrap()).unwrap();
        count
    };

    for workers in [2, 3, 4, 8] {
        let (count, _) = uniquify::uniquify_to_memory(
            file.path(),
            NonZeroUsize::new(workers).unwrap(),
        )
        .unwrap();
        assert_eq!(count, baseline, "worker_count={workers}");
    }
}

#[test]
fn output_set_equals_input_set_regardless_of_worker_count() {
    use std::collections::BTreeSet;

    let input = {
        let mut data = Vec::new();
        for i in 0..2_000 {
            data.extend_from_slice(format!("row-{}\n", i % 300).as_bytes());
        }
        data
    };
    let file = write_input(&input);

    let expected: BTreeSet<&[u8]> = input.split(|&b| b == b'\n').filter(|l| !l.is_empty()).collect();

    for workers in [1, 2, 5] {
        let (_, output) = uniquify::uniquify_to_memory(
            file.path(),
            NonZeroUsize::new(workers).unwrap(),
        )
        .unwrap();
        let got: BTreeSet<&[u8]> =
            output.split(|&b| b == b'\n').filter(|l| !l.is_empty()).collect();
        assert_eq!(got, expected, "worker_count={workers}");
    }
}

#[test]
fn output_has_no_duplicate_records() {
    let input = b"x\ny\nx\nz\ny\nx\n".to_vec();
    let file = write_input(&input);
    let (_, output) =
        uniquify::uniquify_to_memory(file.path(), NonZeroUsize::new(3).unwrap()).unwrap();
    let records: Vec<&[u8]> = output.split(|&b| b == b'\n').filter(|l| !l.is_empty()).collect();
    let unique_count = records.iter().collect::<std::collections::HashSet<_>>().len();
    assert_eq!(unique_count, records.len());
}

#[test]
#[ignore = "runs a few hundred thousand synthetic records; too slow for the default test run"]
fn scenario_six_at_reduced_scale() {
    let spec = uniquify::corpus::CorpusSpec {
        unique_count: 50_000,
        total_lines: 300_000,
        min_len: 1,
        max_len: 16,
        seed: 99,
    };
    let mut buf = Vec::new();
    uniquify::corpus::generate(&spec, &mut buf).unwrap();
    let file = write_input(&buf);

    let (count, _) =
        uniquify::uniquify_to_memory(file.path(), NonZeroUsize::new(4).unwrap()).unwrap();
    assert_eq!(count as usize, spec.unique_count);
}
