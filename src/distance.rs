//! Edit distances of counted sequences against the most abundant one.
//!
//! Input is one `sequence count` pair per line, most abundant first. The
//! first sequence is the reference every other line is measured against.

use std::io::{BufRead, Write};

use serde::Serialize;
use triple_accel::{hamming, levenshtein};

use crate::error::{IonVcfError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceDistance {
    pub sequence: String,
    pub counts: String,
    /// Only defined for sequences as long as the reference.
    pub hamming_distance: Option<u32>,
    pub levenshtein_distance: u32,
}

fn split_line(line: &str, line_no: usize) -> Result<(String, String)> {
    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(seq), Some(count)) => Ok((seq.to_string(), count.to_string())),
        _ => Err(IonVcfError::InvalidQuery(format!(
            "line {line_no}: expected '<sequence> <count>', got '{line}'"
        ))),
    }
}

pub fn measure(reference: &str, sequence: &str) -> (Option<u32>, u32) {
    let (r, s) = (reference.as_bytes(), sequence.as_bytes());
    let ham = (r.len() == s.len()).then(|| hamming(r, s));
    (ham, levenshtein(r, s))
}

/// Read a counts file and measure every sequence against the first.
pub fn distances<R: BufRead>(reader: R) -> Result<Vec<SequenceDistance>> {
    let mut reference: Option<String> = None;
    let mut results = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (sequence, counts) = split_line(&line, i + 1)?;
        let refseq = reference.get_or_insert_with(|| sequence.clone());
        let (hamming_distance, levenshtein_distance) = measure(refseq, &sequence);
        results.push(SequenceDistance {
            sequence,
            counts,
            hamming_distance,
            levenshtein_distance,
        });
    }

    Ok(results)
}

/// `sequence,counts,hamming_distance,levenshtein_distance`.
pub fn write_csv<W: Write>(writer: W, rows: &[SequenceDistance]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const COUNTS: &str = "ACGTACGT 1200\nACGTTCGT 40\n\nACGTACG 12\nTTTTACGTA 3\n";

    #[test]
    fn test_distances_against_first_line() {
        let rows = distances(COUNTS.as_bytes()).unwrap();
        let summary: Vec<(&str, Option<u32>, u32)> = rows
            .iter()
            .map(|r| (r.sequence.as_str(), r.hamming_distance, r.levenshtein_distance))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("ACGTACGT", Some(0), 0),
                ("ACGTTCGT", Some(1), 1),
                ("ACGTACG", None, 1),
                ("TTTTACGTA", None, 4),
            ]
        );
    }

    #[test]
    fn test_csv_leaves_hamming_empty_for_other_lengths() {
        let rows = distances(COUNTS.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "sequence,counts,hamming_distance,levenshtein_distance");
        assert_eq!(lines[1], "ACGTACGT,1200,0,0");
        assert_eq!(lines[3], "ACGTACG,12,,1");
    }

    #[test]
    fn test_malformed_line() {
        assert!(distances("ACGT\n".as_bytes()).is_err());
    }
}
