//! Codon and amino acid lookups (standard genetic code).

use serde::Serialize;

use crate::error::{IonVcfError, Result};

const SINGLE_LETTER: [char; 21] = [
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V',
    'W', 'Y', '*',
];

const THREE_LETTER: [&str; 21] = [
    "Ala", "Cys", "Asp", "Glu", "Phe", "Gly", "His", "Ile", "Lys", "Leu", "Met", "Asn", "Pro",
    "Gln", "Arg", "Ser", "Thr", "Val", "Trp", "Tyr", "Ter",
];

const BASES: [u8; 4] = *b"TCAG";

/// Amino acids of the 64 codons in TCAG order.
const CODE: &[u8; 64] = b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// Three-letter code of a one-letter amino acid (`*` is `Ter`).
pub fn three_letter(aa: char) -> Option<&'static str> {
    let aa = aa.to_ascii_uppercase();
    SINGLE_LETTER
        .iter()
        .position(|c| *c == aa)
        .map(|i| THREE_LETTER[i])
}

/// One-letter code of a three-letter amino acid, any case.
pub fn single_letter(aa: &str) -> Option<char> {
    THREE_LETTER
        .iter()
        .position(|t| t.eq_ignore_ascii_case(aa))
        .map(|i| SINGLE_LETTER[i])
}

fn codon_at(index: usize) -> String {
    [index / 16, (index / 4) % 4, index % 4]
        .iter()
        .map(|&b| BASES[b] as char)
        .collect()
}

/// Translate one codon. `U` is read as `T`.
pub fn translate(codon: &str) -> Option<char> {
    let codon = codon.to_ascii_uppercase().replace('U', "T");
    let bytes = codon.as_bytes();
    if bytes.len() != 3 {
        return None;
    }
    let mut index = 0;
    for b in bytes {
        index = index * 4 + BASES.iter().position(|base| base == b)?;
    }
    Some(CODE[index] as char)
}

/// Every codon for a one-letter amino acid, in TCAG order.
pub fn codons_for(aa: char) -> Vec<String> {
    let aa = aa.to_ascii_uppercase() as u8;
    CODE.iter()
        .enumerate()
        .filter(|(_, c)| **c == aa)
        .map(|(i, _)| codon_at(i))
        .collect()
}

/// One line of a codon lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodonLookup {
    pub single: char,
    pub three: &'static str,
    pub codons: Vec<String>,
}

fn is_codon(query: &str) -> bool {
    query.len() == 3
        && query
            .chars()
            .all(|c| matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'U'))
}

/// Resolve a codon, a one-letter or a three-letter amino acid.
///
/// A codon yields the amino acid it encodes; an amino acid yields every codon
/// for it.
pub fn lookup(query: &str) -> Result<CodonLookup> {
    let query = query.trim();
    let invalid = || IonVcfError::InvalidQuery(format!("'{query}' is not a codon or amino acid"));

    if is_codon(query) {
        let single = translate(query).ok_or_else(invalid)?;
        let three = three_letter(single).ok_or_else(invalid)?;
        let codon = query.to_ascii_uppercase().replace('U', "T");
        return Ok(CodonLookup {
            single,
            three,
            codons: vec![codon],
        });
    }

    let single = match query.chars().count() {
        1 => query.chars().next().map(|c| c.to_ascii_uppercase()),
        3 => single_letter(query),
        _ => None,
    }
    .ok_or_else(invalid)?;
    let three = three_letter(single).ok_or_else(invalid)?;

    Ok(CodonLookup {
        single,
        three,
        codons: codons_for(single),
    })
}

/// Look up every entry of a comma list.
pub fn lookup_all(queries: &str) -> Result<Vec<CodonLookup>> {
    queries
        .split(',')
        .filter(|q| !q.trim().is_empty())
        .map(lookup)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate() {
        assert_eq!(translate("ATG"), Some('M'));
        assert_eq!(translate("aug"), Some('M'));
        assert_eq!(translate("TGA"), Some('*'));
        assert_eq!(translate("GGG"), Some('G'));
        assert_eq!(translate("TTT"), Some('F'));
        assert_eq!(translate("AT"), None);
        assert_eq!(translate("ANG"), None);
    }

    #[test]
    fn test_codons_for() {
        assert_eq!(codons_for('M'), vec!["ATG"]);
        assert_eq!(codons_for('*'), vec!["TAA", "TAG", "TGA"]);
        assert_eq!(codons_for('L').len(), 6);
    }

    #[test]
    fn test_amino_acid_codes() {
        assert_eq!(three_letter('*'), Some("Ter"));
        assert_eq!(three_letter('w'), Some("Trp"));
        assert_eq!(single_letter("LEU"), Some('L'));
        assert_eq!(three_letter('B'), None);
    }

    #[test]
    fn test_lookup() {
        let codon = lookup("GCU").unwrap();
        assert_eq!((codon.single, codon.three), ('A', "Ala"));
        assert_eq!(codon.codons, vec!["GCT"]);

        let cys = lookup("cys").unwrap();
        assert_eq!(cys.codons, vec!["TGT", "TGC"]);

        let all = lookup_all("W,Ter").unwrap();
        assert_eq!(all[0].codons, vec!["TGG"]);
        assert_eq!(all[1].single, '*');

        assert!(lookup("Xyz").is_err());
        assert!(lookup("ACGT").is_err());
    }
}
