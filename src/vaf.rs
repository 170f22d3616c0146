//! Variant allele frequency from raw count fields.
//!
//! TVC reports two sets of counts. The flow evaluator's FAO/FDP/FRO are the
//! ones TVC itself calls on, but alleles produced by the long indel
//! assembler carry no flow evaluation (FAO is `.` and FDP is 0). For those
//! the read counts AO/DP/RO are used instead.

use serde::Serialize;

use crate::row::VcfRow;

/// Which family of count fields produced an [`AlleleCounts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountSource {
    /// FAO / FDP / FRO.
    Flow,
    /// AO / DP / RO.
    Read,
}

/// Coverage supporting one alternate allele.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlleleCounts {
    pub ref_cov: u64,
    pub alt_cov: u64,
    pub total_cov: u64,
    pub source: CountSource,
}

impl AlleleCounts {
    /// Fraction of coverage supporting the allele, 0.0 at zero depth.
    pub fn vaf(&self) -> f64 {
        if self.total_cov == 0 {
            0.0
        } else {
            self.alt_cov as f64 / self.total_cov as f64
        }
    }

    pub fn vaf_percent(&self) -> f64 {
        if self.total_cov == 0 {
            0.0
        } else {
            self.alt_cov as f64 * 100.0 / self.total_cov as f64
        }
    }
}

/// Format a VAF fraction as a two-decimal percentage.
pub fn format_vaf(vaf: f64) -> String {
    format!("{:.2}", vaf * 100.0)
}

/// Element `index` of a comma list, parsed as a count.
fn nth_count(raw: &str, index: usize) -> Option<u64> {
    raw.split(',').nth(index).and_then(|v| v.parse().ok())
}

/// Sum of all parseable elements of a comma list.
fn sum_counts(raw: &str) -> u64 {
    raw.split(',').filter_map(|v| v.parse::<u64>().ok()).sum()
}

fn single_count(row: &VcfRow, key: &str) -> Option<u64> {
    row.count_field(key).and_then(|v| v.parse().ok())
}

fn flow_counts(row: &VcfRow, index: usize) -> Option<AlleleCounts> {
    let fao_raw = row.count_field("FAO")?;
    let alt_cov = nth_count(fao_raw, index)?;
    let total_cov = single_count(row, "FDP").filter(|d| *d > 0)?;
    let ref_cov = single_count(row, "FRO")
        .unwrap_or_else(|| total_cov.saturating_sub(sum_counts(fao_raw)));

    Some(AlleleCounts {
        ref_cov,
        alt_cov,
        total_cov,
        source: CountSource::Flow,
    })
}

fn read_counts(row: &VcfRow, index: usize) -> Option<AlleleCounts> {
    let ao_raw = row.count_field("AO")?;
    let alt_cov = nth_count(ao_raw, index)?;
    let ro = single_count(row, "RO");
    let total_cov = match single_count(row, "DP").filter(|d| *d > 0) {
        Some(dp) => dp,
        None => ro.unwrap_or(0) + sum_counts(ao_raw),
    };
    let ref_cov = ro.unwrap_or_else(|| total_cov.saturating_sub(sum_counts(ao_raw)));

    Some(AlleleCounts {
        ref_cov,
        alt_cov,
        total_cov,
        source: CountSource::Read,
    })
}

/// Counts for the alternate allele at 0-based `index` of the row's ALT list.
///
/// Flow counts win when the allele has an FAO value and FDP is positive;
/// otherwise read counts are used. `None` when neither family is present.
pub fn allele_counts(row: &VcfRow, index: usize) -> Option<AlleleCounts> {
    flow_counts(row, index).or_else(|| read_counts(row, index))
}
