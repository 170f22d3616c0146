//! Splitting multi-allelic rows into per-allele views.

use std::collections::HashMap;

use crate::header::{InfoField, InfoNumber, VcfHeader};
use crate::normalize::VariantKey;
use crate::row::VcfRow;
use crate::value::Value;

/// One alternate allele of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Allele<'a> {
    /// 0-based position in the ALT list.
    pub index: usize,
    /// The ALT allele as written in the row.
    pub raw: &'a str,
    /// Normalized key of the allele.
    pub key: VariantKey,
}

/// One [`Allele`] per ALT; a row with ALT `.` has none.
pub fn split_alleles(row: &VcfRow) -> Vec<Allele<'_>> {
    row.alt_alleles
        .iter()
        .enumerate()
        .map(|(index, alt)| Allele {
            index,
            raw: alt,
            key: VariantKey::new(&row.chrom, row.pos, &row.ref_allele, alt),
        })
        .collect()
}

/// The slice of a raw value that belongs to allele `index`.
///
/// Number=A fields hold one element per ALT, Number=R fields lead with the
/// reference. Everything else is shared by all alleles.
pub fn allele_slice<'a>(raw: &'a str, number: Option<&InfoNumber>, index: usize) -> &'a str {
    let element = match number {
        Some(InfoNumber::PerAltAllele) => index,
        Some(InfoNumber::PerAllele) => index + 1,
        _ => return raw,
    };
    raw.split(',').nth(element).unwrap_or(".")
}

/// Typed INFO values as seen by allele `index`, then the sample's FORMAT
/// values for keys INFO does not carry.
///
/// `FUNC` is left out; annotations are reconciled separately.
pub fn allele_info(row: &VcfRow, header: &VcfHeader, index: usize) -> HashMap<String, Value> {
    let typed = |key: &String, raw: &String, def: Option<&InfoField>| {
        let slice = allele_slice(raw, def.map(|d| &d.number), index);
        (key.clone(), Value::from_vcf(slice, def))
    };
    let info = row
        .info
        .iter()
        .filter(|(key, _)| key.as_str() != "FUNC")
        .map(|(key, raw)| typed(key, raw, header.info.get(key)));
    let format = row
        .format
        .iter()
        .filter(|(key, _)| !row.info.contains_key(*key))
        .map(|(key, raw)| typed(key, raw, header.format.get(key)));
    info.chain(format).collect()
}

/// Hotspot IDs for allele `index`.
///
/// TVC lists the hotspots a site was evaluated against in OID, with the ALT
/// each one maps to in OMAPALT. When both are present only the IDs mapped to
/// this allele are returned; otherwise the ID column is used as-is.
pub fn hotspot_ids(row: &VcfRow, index: usize) -> Vec<String> {
    let Some(alt) = row.alt_alleles.get(index) else {
        return Vec::new();
    };

    match (row.info_raw("OID"), row.info_raw("OMAPALT")) {
        (Some(oid), Some(omapalt)) => oid
            .split(',')
            .zip(omapalt.split(','))
            .filter(|(id, mapped)| *id != "." && mapped == alt)
            .map(|(id, _)| id.to_string())
            .collect(),
        _ => row.ids.clone(),
    }
}

/// Whether the sample's genotype includes allele `index`.
///
/// Rows without a genotype count as called; a fully missing genotype
/// (`./.`) does not.
pub fn is_called(row: &VcfRow, index: usize) -> bool {
    let Some(gt) = row.genotype() else {
        return true;
    };
    let wanted = (index + 1).to_string();
    gt.split(['/', '|']).any(|allele| allele == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::parse_header;
    use crate::row::parse_row;

    const HEADER: &str = "##INFO=<ID=FAO,Number=A,Type=Integer,Description=\"Flow alt\">\n\
        ##INFO=<ID=FDP,Number=1,Type=Integer,Description=\"Flow depth\">\n\
        ##INFO=<ID=TYPE,Number=A,Type=String,Description=\"Type\">\n\
        ##INFO=<ID=AD,Number=R,Type=Integer,Description=\"Allele depths\">\n\
        ##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
        ##FORMAT=<ID=FDP,Number=1,Type=Integer,Description=\"Flow depth\">\n\
        ##FORMAT=<ID=FSAF,Number=A,Type=Integer,Description=\"Forward alt observations\">\n\
        #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1";

    #[test]
    fn test_split_and_normalize() {
        let row = parse_row("chr1\t100\t.\tATC\tAGC,A\t50\tPASS\t.").unwrap();
        let alleles = split_alleles(&row);
        assert_eq!(alleles.len(), 2);
        assert_eq!(alleles[0].key.to_string(), "chr1:101:T:G");
        assert_eq!(alleles[1].key.to_string(), "chr1:100:ATC:A");
        assert_eq!(alleles[1].raw, "A");

        let row = parse_row("chr1\t100\t.\tA\t.\t50\tPASS\t.").unwrap();
        assert!(split_alleles(&row).is_empty());
    }

    #[test]
    fn test_per_allele_info() {
        let header = parse_header(HEADER).unwrap();
        let row = parse_row(
            "chr1\t100\t.\tA\tG,T\t50\tPASS\tFAO=30,10;FDP=200;TYPE=snp,snp;AD=160,30,10;FUNC=[{'gene':'X'}]",
        )
        .unwrap();

        let second = allele_info(&row, &header, 1);
        assert_eq!(second.get("FAO"), Some(&Value::Number(10.0)));
        assert_eq!(second.get("FDP"), Some(&Value::Number(200.0)));
        assert_eq!(second.get("TYPE"), Some(&Value::String("snp".into())));
        assert_eq!(second.get("AD"), Some(&Value::Number(10.0)));
        assert!(!second.contains_key("FUNC"));
    }

    #[test]
    fn test_format_values_fill_in_after_info() {
        let header = parse_header(HEADER).unwrap();
        let row = parse_row(
            "chr1\t100\t.\tA\tG,T\t50\tPASS\tFDP=200\tGT:FDP:FSAF\t0/1:198:12,4",
        )
        .unwrap();

        let second = allele_info(&row, &header, 1);
        assert_eq!(second.get("FDP"), Some(&Value::Number(200.0)));
        assert_eq!(second.get("FSAF"), Some(&Value::Number(4.0)));
        assert_eq!(second.get("GT"), Some(&Value::String("0/1".into())));
    }

    #[test]
    fn test_hotspot_ids_follow_omapalt() {
        let row = parse_row(
            "chr7\t55259515\tCOSM6224;COSM12979\tT\tG,A\t50\tPASS\tOID=COSM6224,COSM12979,.;OMAPALT=G,A,A",
        )
        .unwrap();
        assert_eq!(hotspot_ids(&row, 0), vec!["COSM6224"]);
        assert_eq!(hotspot_ids(&row, 1), vec!["COSM12979"]);

        let row = parse_row("chr7\t55259515\tCOSM6224\tT\tG\t50\tPASS\t.").unwrap();
        assert_eq!(hotspot_ids(&row, 0), vec!["COSM6224"]);
    }

    #[test]
    fn test_is_called() {
        let row = parse_row("chr1\t100\t.\tA\tG,T\t50\tPASS\t.\tGT\t0/2").unwrap();
        assert!(!is_called(&row, 0));
        assert!(is_called(&row, 1));

        let row = parse_row("chr1\t100\t.\tA\tG\t50\tNOCALL\t.\tGT\t./.").unwrap();
        assert!(!is_called(&row, 0));

        let row = parse_row("chr1\t100\t.\tA\tG\t50\tPASS\t.").unwrap();
        assert!(is_called(&row, 0));
    }
}
