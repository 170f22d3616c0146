//! Side-by-side comparison of two call sets on the normalized key.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use crate::call::VariantCall;
use crate::error::Result;
use crate::normalize::VariantKey;
use crate::report::write_aligned;
use crate::vaf::format_vaf;

/// Calls joined across two samples.
#[derive(Debug, Default)]
pub struct Comparison<'a> {
    /// Present in both, as (A, B).
    pub shared: Vec<(&'a VariantCall, &'a VariantCall)>,
    pub only_a: Vec<&'a VariantCall>,
    pub only_b: Vec<&'a VariantCall>,
}

/// Join two call lists. Order follows A, then the calls only B has.
///
/// When a key repeats within one list the first call wins.
pub fn compare<'a>(a: &'a [VariantCall], b: &'a [VariantCall]) -> Comparison<'a> {
    let mut by_key: HashMap<&VariantKey, &VariantCall> = HashMap::new();
    for call in b {
        by_key.entry(&call.key).or_insert(call);
    }

    let mut comparison = Comparison::default();
    let mut seen: HashSet<&VariantKey> = HashSet::new();
    for call in a {
        if !seen.insert(&call.key) {
            continue;
        }
        match by_key.get(&call.key) {
            Some(other) => comparison.shared.push((call, *other)),
            None => comparison.only_a.push(call),
        }
    }

    for call in b {
        if seen.insert(&call.key) {
            comparison.only_b.push(call);
        }
    }
    comparison
}

fn vaf_cell(call: Option<&VariantCall>) -> String {
    call.and_then(VariantCall::vaf)
        .map(format_vaf)
        .unwrap_or_else(|| ".".to_string())
}

/// One row per key: status, gene and both VAFs.
pub fn write_comparison<W: Write>(
    writer: &mut W,
    comparison: &Comparison<'_>,
    name_a: &str,
    name_b: &str,
) -> Result<()> {
    let mut rows = Vec::new();
    let mut push = |status: &str, a: Option<&VariantCall>, b: Option<&VariantCall>| {
        let Some(call) = a.or(b) else {
            return;
        };
        rows.push(vec![
            status.to_string(),
            call.key.to_string(),
            call.gene().unwrap_or(".").to_string(),
            vaf_cell(a),
            vaf_cell(b),
        ]);
    };

    for (a, b) in &comparison.shared {
        push("shared", Some(*a), Some(*b));
    }
    for a in &comparison.only_a {
        push(&format!("only_{name_a}"), Some(*a), None);
    }
    for b in &comparison.only_b {
        push(&format!("only_{name_b}"), None, Some(*b));
    }

    let vaf_a = format!("VAF_{name_a}");
    let vaf_b = format!("VAF_{name_b}");
    write_aligned(writer, &["Status", "Variant", "Gene", vaf_a.as_str(), vaf_b.as_str()], &rows)?;
    writeln!(
        writer,
        "\n{} shared, {} only in {name_a}, {} only in {name_b}",
        comparison.shared.len(),
        comparison.only_a.len(),
        comparison.only_b.len()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extractor;

    const HEADER: &str = "##INFO=<ID=FAO,Number=A,Type=Integer,Description=\"Flow alt\">\n\
##INFO=<ID=FDP,Number=1,Type=Integer,Description=\"Flow depth\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

    fn calls(rows: &str) -> Vec<VariantCall> {
        let text = format!("{HEADER}{rows}");
        Extractor::default().extract("x", text.as_bytes()).unwrap().calls
    }

    #[test]
    fn test_join_on_normalized_key() {
        // TVC pads the deletion, the other caller reports it minimally.
        let a = calls(
            "chr7\t55259515\t.\tT\tG\t50\tPASS\tFAO=100;FDP=400\n\
             chr17\t7579470\t.\tGCA\tGA\t50\tPASS\tFAO=10;FDP=100\n\
             chr1\t100\t.\tA\tC\t50\tPASS\t.\n",
        );
        let b = calls(
            "chr17\t7579470\t.\tGC\tG\t50\tPASS\tFAO=20;FDP=100\n\
             chr7\t55259515\t.\tT\tG\t50\tPASS\tFAO=50;FDP=400\n\
             chr2\t200\t.\tG\tT\t50\tPASS\t.\n",
        );

        let comparison = compare(&a, &b);
        assert_eq!(comparison.shared.len(), 2);
        assert_eq!(comparison.shared[0].0.key.to_string(), "chr7:55259515:T:G");
        assert_eq!(comparison.shared[1].1.raw_ref, "GC");
        assert_eq!(comparison.only_a.len(), 1);
        assert_eq!(comparison.only_a[0].key.chrom, "chr1");
        assert_eq!(comparison.only_b.len(), 1);
        assert_eq!(comparison.only_b[0].key.chrom, "chr2");
    }

    #[test]
    fn test_comparison_table() {
        let a = calls("chr7\t55259515\t.\tT\tG\t50\tPASS\tFAO=100;FDP=400\n");
        let b = calls("chr7\t55259515\t.\tT\tG\t50\tPASS\tFAO=50;FDP=400\n");
        let mut out = Vec::new();
        write_comparison(&mut out, &compare(&a, &b), "tumor", "normal").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Status  Variant            Gene  VAF_tumor  VAF_normal\n"));
        assert!(text.contains("shared  chr7:55259515:T:G  .     25.00      12.50"));
        assert!(text.ends_with("1 shared, 0 only in tumor, 0 only in normal\n"));
    }
}
