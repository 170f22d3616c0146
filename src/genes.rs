//! Gene lookups against a BED-style table: `chrom start end gene`.

use std::fmt;
use std::io::BufRead;
use std::path::Path;

use serde::Serialize;

use crate::error::{IonVcfError, Result};
use crate::extract::open_input;
use crate::select::{Locus, bare_chrom};

/// A gene interval, 0-based half-open like BED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneRegion {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub gene: String,
}

impl GeneRegion {
    /// Whether a 1-based position falls inside the interval.
    pub fn contains(&self, locus: &Locus) -> bool {
        bare_chrom(&self.chrom) == bare_chrom(&locus.chrom)
            && locus.pos > self.start
            && locus.pos <= self.end
    }
}

/// `chr7:55086725-55275031`, 1-based inclusive.
impl fmt::Display for GeneRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start + 1, self.end)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneTable {
    regions: Vec<GeneRegion>,
}

impl GeneTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(open_input(path.as_ref())?)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(reader);

        let mut regions = Vec::new();
        for (i, record) in csv.records().enumerate() {
            let record = record?;
            let fields: Vec<&str> = record.iter().map(str::trim).collect();
            match fields.as_slice() {
                [] | [""] => continue,
                [first, ..] if first.starts_with("track") || first.starts_with("browser") => continue,
                [chrom, start, end, gene, ..] => {
                    let coord = |field: &str| {
                        field.parse::<u64>().map_err(|_| {
                            IonVcfError::InvalidCoordinate(format!("gene table line {}: '{field}'", i + 1))
                        })
                    };
                    let (start, end) = (coord(*start)?, coord(*end)?);
                    if start > end {
                        return Err(IonVcfError::InvalidCoordinate(format!(
                            "gene table line {}: start {start} after end {end}",
                            i + 1
                        )));
                    }
                    regions.push(GeneRegion {
                        chrom: chrom.to_string(),
                        start,
                        end,
                        gene: gene.to_string(),
                    });
                }
                _ => {
                    return Err(IonVcfError::InvalidQuery(format!(
                        "gene table line {}: expected 'chrom start end gene'",
                        i + 1
                    )));
                }
            }
        }
        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Genes overlapping a position, in table order without repeats.
    pub fn genes_at(&self, locus: &Locus) -> Vec<&str> {
        let mut genes: Vec<&str> = Vec::new();
        for region in self.regions.iter().filter(|r| r.contains(locus)) {
            if !genes.contains(&region.gene.as_str()) {
                genes.push(&region.gene);
            }
        }
        genes
    }

    /// The span of every row for `gene` on its first chromosome.
    pub fn region_of(&self, gene: &str) -> Option<GeneRegion> {
        let mut rows = self
            .regions
            .iter()
            .filter(|r| r.gene.eq_ignore_ascii_case(gene));
        let first = rows.next()?.clone();
        let chrom = first.chrom.clone();
        Some(rows.filter(|r| r.chrom == chrom).fold(first, |mut span, r| {
            span.start = span.start.min(r.start);
            span.end = span.end.max(r.end);
            span
        }))
    }
}
