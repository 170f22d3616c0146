//! Per-gene call counts and VAF histograms.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::call::VariantCall;
use crate::error::{IonVcfError, Result};
use crate::report::write_aligned;

/// Narrowest accepted bin, in percent.
pub const MIN_BIN_WIDTH: f64 = 0.01;

/// Calls in one VAF bin, `[low, high)` in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VafBin {
    pub low: f64,
    pub high: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub calls: usize,
    /// Calls per gene; unannotated calls are counted under `.`.
    pub genes: BTreeMap<String, usize>,
    pub bins: Vec<VafBin>,
    /// Calls without coverage counts, left out of the histogram.
    pub without_vaf: usize,
}

/// Bin VAFs into `width`-percent bins covering 0-100.
///
/// 100% falls into the last bin.
pub fn summarize<'a, I>(calls: I, width: f64) -> Result<Summary>
where
    I: IntoIterator<Item = &'a VariantCall>,
{
    if !(MIN_BIN_WIDTH..=100.0).contains(&width) {
        return Err(IonVcfError::InvalidQuery(format!(
            "Bin width must be in [{MIN_BIN_WIDTH}, 100], got {width}"
        )));
    }

    let n_bins = (100.0 / width).ceil() as usize;
    let mut bins: Vec<VafBin> = (0..n_bins)
        .map(|i| VafBin {
            low: i as f64 * width,
            high: ((i + 1) as f64 * width).min(100.0),
            count: 0,
        })
        .collect();

    let mut summary = Summary {
        calls: 0,
        genes: BTreeMap::new(),
        bins: Vec::new(),
        without_vaf: 0,
    };

    for call in calls {
        summary.calls += 1;
        *summary
            .genes
            .entry(call.gene().unwrap_or(".").to_string())
            .or_default() += 1;

        match call.counts {
            Some(counts) => {
                let idx = ((counts.vaf_percent() / width) as usize).min(n_bins - 1);
                bins[idx].count += 1;
            }
            None => summary.without_vaf += 1,
        }
    }

    summary.bins = bins;
    Ok(summary)
}

/// Text rendering: gene table, then the histogram with a bar per bin.
pub fn write_summary<W: Write>(writer: &mut W, summary: &Summary) -> Result<()> {
    let gene_rows: Vec<Vec<String>> = summary
        .genes
        .iter()
        .map(|(gene, n)| vec![gene.clone(), n.to_string()])
        .collect();
    write_aligned(writer, &["Gene", "Calls"], &gene_rows)?;
    writeln!(writer)?;

    let bin_rows: Vec<Vec<String>> = summary
        .bins
        .iter()
        .map(|bin| {
            vec![
                format!("{:.1}-{:.1}", bin.low, bin.high),
                bin.count.to_string(),
                "#".repeat(bin.count),
            ]
        })
        .collect();
    write_aligned(writer, &["VAF%", "Calls", ""], &bin_rows)?;

    writeln!(writer, "\n{} calls, {} without coverage", summary.calls, summary.without_vaf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extractor;
    use pretty_assertions::assert_eq;

    const VCF: &str = "##INFO=<ID=FAO,Number=A,Type=Integer,Description=\"Flow alt\">\n\
##INFO=<ID=FDP,Number=1,Type=Integer,Description=\"Flow depth\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
chr7\t55259515\t.\tT\tG\t50\tPASS\tFAO=50;FDP=1000;FUNC=[{'gene':'EGFR'}]\n\
chr7\t55249071\t.\tC\tT\t50\tPASS\tFAO=480;FDP=1000;FUNC=[{'gene':'EGFR'}]\n\
chr12\t25398284\t.\tC\tA\t50\tPASS\tFAO=1000;FDP=1000;FUNC=[{'gene':'KRAS'}]\n\
chr1\t100\t.\tA\tG\t50\tPASS\t.\n";

    #[test]
    fn test_summarize() {
        let extraction = Extractor::default().extract("x", VCF.as_bytes()).unwrap();
        let summary = summarize(&extraction.calls, 25.0).unwrap();

        assert_eq!(summary.calls, 4);
        assert_eq!(summary.without_vaf, 1);
        assert_eq!(
            summary.genes.into_iter().collect::<Vec<_>>(),
            vec![(".".to_string(), 1), ("EGFR".to_string(), 2), ("KRAS".to_string(), 1)]
        );
        let counts: Vec<usize> = summary.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 0, 1]);
    }

    #[test]
    fn test_uneven_width_caps_last_bin() {
        let summary = summarize(std::iter::empty(), 30.0).unwrap();
        assert_eq!(summary.bins.len(), 4);
        assert_eq!(summary.bins[3].low, 90.0);
        assert_eq!(summary.bins[3].high, 100.0);
    }

    #[test]
    fn test_bad_width() {
        assert!(summarize(std::iter::empty(), 0.0).is_err());
        assert!(summarize(std::iter::empty(), f64::NAN).is_err());
        assert!(summarize(std::iter::empty(), 1e-15).is_err());
        assert!(summarize(std::iter::empty(), 120.0).is_err());
    }

    #[test]
    fn test_narrowest_width() {
        let summary = summarize(std::iter::empty(), MIN_BIN_WIDTH).unwrap();
        assert_eq!(summary.bins.len(), 10_000);
    }
}
