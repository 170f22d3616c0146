//! Indel normalization and variant keys.
//!
//! Callers report the same event with different padding: TVC pads a
//! multi-allelic site to the longest allele, Ion Reporter reports each allele
//! minimally. Trimming the shared suffix and then the shared prefix gives both
//! the same `chrom:pos:ref:alt` key.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{IonVcfError, Result};

/// Normalized identity of one allele.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VariantKey {
    pub chrom: String,
    pub pos: u64,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    #[serde(rename = "alt")]
    pub alt_allele: String,
}

impl VariantKey {
    /// Build a key from raw VCF fields, normalizing on the way in.
    pub fn new(chrom: &str, pos: u64, ref_allele: &str, alt_allele: &str) -> Self {
        let (pos, ref_allele, alt_allele) = normalize(pos, ref_allele, alt_allele);
        Self {
            chrom: chrom.to_string(),
            pos,
            ref_allele,
            alt_allele,
        }
    }

    /// `chrom:pos`, as used in reports.
    pub fn locus(&self) -> String {
        format!("{}:{}", self.chrom, self.pos)
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.chrom, self.pos, self.ref_allele, self.alt_allele
        )
    }
}

impl FromStr for VariantKey {
    type Err = IonVcfError;

    /// Parse `chrom:pos:ref:alt`. The alleles are normalized.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let [chrom, pos, ref_allele, alt_allele] = parts.as_slice() else {
            return Err(IonVcfError::InvalidQuery(format!(
                "'{s}' is not a chrom:pos:ref:alt key"
            )));
        };
        let pos = pos
            .parse::<u64>()
            .map_err(|_| IonVcfError::InvalidCoordinate(s.to_string()))?;
        Ok(Self::new(chrom, pos, ref_allele, alt_allele))
    }
}

/// Symbolic, missing and breakend alleles have no sequence to trim.
fn is_symbolic(allele: &str) -> bool {
    allele.is_empty()
        || allele == "."
        || allele == "*"
        || allele.starts_with('<')
        || allele.contains(['[', ']'])
}

/// Trim the common suffix, then the common prefix, of REF and ALT.
///
/// Each allele keeps at least one base. POS advances by the number of
/// prefix bases removed. The result is a fixed point: normalizing it again
/// changes nothing.
pub fn normalize(pos: u64, ref_allele: &str, alt_allele: &str) -> (u64, String, String) {
    if is_symbolic(ref_allele) || is_symbolic(alt_allele) {
        return (pos, ref_allele.to_string(), alt_allele.to_string());
    }

    let r = ref_allele.to_ascii_uppercase().into_bytes();
    let a = alt_allele.to_ascii_uppercase().into_bytes();

    let mut r_end = r.len();
    let mut a_end = a.len();
    while r_end > 1 && a_end > 1 && r[r_end - 1] == a[a_end - 1] {
        r_end -= 1;
        a_end -= 1;
    }

    let mut start = 0;
    while r_end - start > 1 && a_end - start > 1 && r[start] == a[start] {
        start += 1;
    }

    (
        pos + start as u64,
        String::from_utf8_lossy(&r[start..r_end]).into_owned(),
        String::from_utf8_lossy(&a[start..a_end]).into_owned(),
    )
}
