//! VCF data row parser.
//!
//! INFO values are kept as raw strings: TVC's `FUNC` block is a JSON list
//! that contains commas, so splitting has to wait until the field's meaning
//! is known. Typed access goes through the header definitions, per allele.

use std::collections::HashMap;

use crate::error::{IonVcfError, Result};

/// A parsed VCF data row.
#[derive(Debug, Clone)]
pub struct VcfRow {
    /// Chromosome (CHROM column).
    pub chrom: String,
    /// Position (POS column), 1-based.
    pub pos: u64,
    /// IDs from the ID column; empty when `.`.
    pub ids: Vec<String>,
    /// Reference allele (REF column).
    pub ref_allele: String,
    /// Alternate alleles (ALT column); empty when `.`.
    pub alt_alleles: Vec<String>,
    /// Quality score (QUAL column).
    pub qual: Option<f64>,
    /// Filter status (FILTER column).
    pub filter: Vec<String>,
    /// Raw INFO values. Flags map to an empty string.
    pub info: HashMap<String, String>,
    /// Raw FORMAT values of the first sample.
    pub format: HashMap<String, String>,
}

impl VcfRow {
    pub fn info_raw(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }

    pub fn format_raw(&self, key: &str) -> Option<&str> {
        self.format.get(key).map(String::as_str)
    }

    /// Raw value of a count field, FORMAT first and INFO second.
    ///
    /// TVC writes FAO/FDP/AO/DP to both columns; the sample column is the
    /// one that reflects the called sample.
    pub fn count_field(&self, key: &str) -> Option<&str> {
        self.format_raw(key)
            .filter(|v| *v != ".")
            .or_else(|| self.info_raw(key))
    }

    /// Genotype string of the first sample (`GT`).
    pub fn genotype(&self) -> Option<&str> {
        self.format_raw("GT").filter(|gt| *gt != ".")
    }
}

fn parse_info_column(info_str: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();

    if info_str == "." {
        return result;
    }

    for field in info_str.split(';') {
        if field.is_empty() {
            continue;
        }
        match field.split_once('=') {
            Some((key, value)) => result.insert(key.to_string(), value.to_string()),
            None => result.insert(field.to_string(), String::new()),
        };
    }

    result
}

/// Pair FORMAT keys with the first sample's values.
///
/// Trailing keys without a value are dropped.
fn parse_format_columns(format_str: &str, sample_str: &str) -> HashMap<String, String> {
    format_str
        .split(':')
        .zip(sample_str.split(':'))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn dot_list(column: &str, separator: char) -> Vec<String> {
    if column == "." || column.is_empty() {
        Vec::new()
    } else {
        column.split(separator).map(str::to_string).collect()
    }
}

/// Parse a single VCF data line.
pub fn parse_row(row: &str) -> Result<VcfRow> {
    let row = row.trim_end_matches(['\r', '\n']);
    let fields: Vec<&str> = row.split('\t').collect();

    if fields.len() < 8 {
        return Err(IonVcfError::RowParseError(format!(
            "Expected at least 8 columns, got {}",
            fields.len()
        )));
    }

    let pos = fields[1]
        .parse::<u64>()
        .map_err(|e| IonVcfError::RowParseError(format!("Invalid POS '{}': {e}", fields[1])))?;

    if fields[3].is_empty() || fields[3] == "." {
        return Err(IonVcfError::RowParseError(format!(
            "Missing REF at {}:{pos}",
            fields[0]
        )));
    }

    let qual = match fields[5] {
        "." => None,
        q => Some(q.parse::<f64>().map_err(|e| {
            IonVcfError::RowParseError(format!("Invalid QUAL '{q}': {e}"))
        })?),
    };

    let format = if fields.len() >= 10 {
        parse_format_columns(fields[8], fields[9])
    } else {
        HashMap::new()
    };

    Ok(VcfRow {
        chrom: fields[0].to_string(),
        pos,
        ids: dot_list(fields[2], ';'),
        ref_allele: fields[3].to_string(),
        alt_alleles: dot_list(fields[4], ','),
        qual,
        filter: dot_list(fields[6], ';'),
        info: parse_info_column(fields[7]),
        format,
    })
}
