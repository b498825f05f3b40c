// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Splits a mapped input into worker-aligned, newline-respecting byte ranges.

/// A half-open `[start, end)` byte range into the mapped input.
///
/// Either `start == end` (an empty range a worker skips entirely), or
/// `start` is the start of the file or immediately follows a `0x0A`, and
/// `end` is the end of the file or immediately follows a `0x0A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

/// Divides `data` into `worker_count` near-equal, newline-aligned ranges.
///
/// The union of the returned ranges is all of `data`, and they are pairwise
/// disjoint. If a cut point runs off the end of the file while searching for
/// the next newline, the worker under construction absorbs the remainder and
/// every later worker receives an empty range.
pub fn partition(data: &[u8], worker_count: usize) -> Vec<Range> {
    let worker_count = worker_count.max(1);
    let len = data.len();
    let mut ranges = Vec::with_capacity(worker_count);

    if len == 0 {
        ranges.resize(worker_count, Range { start: 0, end: 0 });
        return ranges;
    }

    let target_chunk = len / worker_count;
    let mut start = 0;

    for worker in 0..worker_count {
        if worker == worker_count - 1 {
            ranges.push(Range { start, end: len });
            break;
        }

        let cut = (start + target_chunk).min(len);
        match memchr::memchr(b'\n', &data[cut..]) {
            Some(offset) => {
                let end = cut + offset + 1;
                ranges.push(Range { start, end });
                start = end;
            }
            None => {
                // No more newlines: this worker takes the rest of the file
                // and everyone after it gets nothing.
                ranges.push(Range { start, end: len });
                ranges.resize(worker_count, Range { start: len, end: len });
                return ranges;
            }
        }
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(data: &[u8], ranges: &[Range]) {
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges.last().unwrap().end, data.len());
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for range in ranges {
            if range.start < range.end {
                assert!(range.start == 0 || data[range.start - 1] == b'\n');
                assert!(range.end == data.len() || data[range.end - 1] == b'\n');
            }
        }
    }

    #[test]
    fn empty_file_yields_all_empty_ranges() {
        let ranges = partition(b"", 4);
        assert_eq!(ranges.len(), 4);
        assert!(ranges.iter().all(|r| r.start == 0 && r.end == 0));
    }

    #[test]
    fn single_worker_takes_everything() {
        let data = b"a\nb\nc\n";
        let ranges = partition(data, 1);
        assert_eq!(ranges, vec![Range { start: 0, end: data.len() }]);
    }

    #[test]
    fn many_workers_fewer_newlines_than_workers() {
        let data = b"only-one-line-here\n";
        let ranges = partition(data, 8);
        assert_covers(data, &ranges);
        // exactly one non-empty range, absorbing the whole file
        assert_eq!(ranges.iter().filter(|r| r.start != r.end).count(), 1);
    }

    #[test]
    fn roughly_even_split_stays_newline_aligned() {
        let mut data = Vec::new();
        for i in 0..1000 {
            data.extend_from_slice(format!("line-{i}\n").as_bytes());
        }
        for worker_count in 1..=16 {
            let ranges = partition(&data, worker_count);
            assert_eq!(ranges.len(), worker_count);
            assert_covers(&data, &ranges);
        }
    }

    #[test]
    fn no_trailing_newline_last_worker_still_ends_at_eof() {
        let data = b"a\nb\nc-no-trailing-newline";
        let ranges = partition(data, 3);
        assert_covers(data, &ranges);
        assert_eq!(ranges.last().unwrap().end, data.len());
    }
}
