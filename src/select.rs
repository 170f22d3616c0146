//! Single-pass call selection.
//!
//! A [`Selection`] holds every user criterion at once. Criteria are AND-ed;
//! the values inside one criterion (several genes, several positions) are
//! OR-ed. An empty selection keeps everything.

use std::fmt;
use std::str::FromStr;

use crate::call::VariantCall;
use crate::error::{IonVcfError, Result};
use crate::eval;
use crate::filter::Expr;

/// A `chr:pos` query position. The `chr` prefix is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locus {
    pub chrom: String,
    pub pos: u64,
}

/// Chromosome name without a leading `chr`, for comparisons.
pub fn bare_chrom(chrom: &str) -> &str {
    match chrom.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &chrom[3..],
        _ => chrom,
    }
}

impl Locus {
    pub fn same_chrom(&self, chrom: &str) -> bool {
        bare_chrom(&self.chrom).eq_ignore_ascii_case(bare_chrom(chrom))
    }
}

impl FromStr for Locus {
    type Err = IonVcfError;

    fn from_str(s: &str) -> Result<Self> {
        let (chrom, pos) = s
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| IonVcfError::InvalidCoordinate(s.to_string()))?;
        let pos = pos
            .replace(',', "")
            .parse()
            .map_err(|_| IonVcfError::InvalidCoordinate(s.to_string()))?;
        if chrom.is_empty() {
            return Err(IonVcfError::InvalidCoordinate(s.to_string()));
        }
        Ok(Self {
            chrom: chrom.to_string(),
            pos,
        })
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chrom, self.pos)
    }
}

/// A comma list of positions, `chr7:55259515,chr12:25398284`.
///
/// A comma only starts a new position when the text after it has its own
/// `:`, so `chr7:55,259,515` stays one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loci(pub Vec<Locus>);

impl FromStr for Loci {
    type Err = IonVcfError;

    fn from_str(s: &str) -> Result<Self> {
        let mut items: Vec<String> = Vec::new();
        for piece in s.split(',') {
            match items.last_mut() {
                Some(item) if !piece.contains(':') => {
                    item.push(',');
                    item.push_str(piece);
                }
                _ => items.push(piece.to_string()),
            }
        }
        items
            .iter()
            .map(|item| item.parse())
            .collect::<Result<Vec<Locus>>>()
            .map(Loci)
    }
}

/// Every position of several lists, in order.
pub fn all_loci(lists: &[Loci]) -> impl Iterator<Item = &Locus> {
    lists.iter().flat_map(|list| list.0.iter())
}

/// The criteria a call must meet to be reported.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    genes: Vec<String>,
    hotspot_ids: Vec<String>,
    positions: Vec<Locus>,
    fuzzy_window: Option<u64>,
    ovat_only: bool,
    drop_ref_calls: bool,
    drop_nocalls: bool,
    min_vaf: Option<f64>,
    expression: Option<Expr>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_genes<I, S>(mut self, genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genes.extend(genes.into_iter().map(Into::into));
        self
    }

    pub fn with_hotspot_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hotspot_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_positions(mut self, positions: impl IntoIterator<Item = Locus>) -> Self {
        self.positions.extend(positions);
        self
    }

    /// Match positions within `window` bases instead of exactly.
    pub fn with_fuzzy_window(mut self, window: u64) -> Self {
        self.fuzzy_window = Some(window);
        self
    }

    /// Keep only calls whose annotation carries an Oncomine variant class.
    pub fn with_ovat_only(mut self, yes: bool) -> Self {
        self.ovat_only = yes;
        self
    }

    /// Drop alleles the sample genotype does not include.
    pub fn with_drop_ref_calls(mut self, yes: bool) -> Self {
        self.drop_ref_calls = yes;
        self
    }

    pub fn with_drop_nocalls(mut self, yes: bool) -> Self {
        self.drop_nocalls = yes;
        self
    }

    /// Minimum VAF, in percent.
    pub fn with_min_vaf(mut self, percent: f64) -> Self {
        self.min_vaf = Some(percent);
        self
    }

    pub fn with_expression(mut self, expr: Expr) -> Self {
        self.expression = Some(expr);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
            && self.hotspot_ids.is_empty()
            && self.positions.is_empty()
            && !self.ovat_only
            && !self.drop_ref_calls
            && !self.drop_nocalls
            && self.min_vaf.is_none()
            && self.expression.is_none()
    }

    fn position_matches(&self, call: &VariantCall) -> bool {
        let window = self.fuzzy_window.unwrap_or(0);
        self.positions.iter().any(|locus| {
            locus.same_chrom(&call.key.chrom)
                && [call.raw_pos, call.key.pos]
                    .iter()
                    .any(|pos| pos.abs_diff(locus.pos) <= window)
        })
    }

    /// Whether `call` passes every criterion.
    pub fn matches(&self, call: &VariantCall) -> Result<bool> {
        if self.drop_nocalls && call.is_nocall() {
            return Ok(false);
        }
        if self.drop_ref_calls && !call.called {
            return Ok(false);
        }
        if self.ovat_only && call.ovat_class().is_none() {
            return Ok(false);
        }
        if !self.genes.is_empty() {
            let Some(gene) = call.gene() else {
                return Ok(false);
            };
            if !self.genes.iter().any(|g| g.eq_ignore_ascii_case(gene)) {
                return Ok(false);
            }
        }
        if !self.hotspot_ids.is_empty()
            && !call
                .hotspot_ids
                .iter()
                .any(|id| self.hotspot_ids.iter().any(|want| want.eq_ignore_ascii_case(id)))
        {
            return Ok(false);
        }
        if !self.positions.is_empty() && !self.position_matches(call) {
            return Ok(false);
        }
        if let Some(min) = self.min_vaf {
            match call.counts {
                Some(counts) if counts.vaf_percent() >= min => {}
                _ => return Ok(false),
            }
        }
        match &self.expression {
            Some(expr) => eval::matches(expr, call),
            None => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allele::split_alleles;
    use crate::filter::parse_filter;
    use crate::func::parse_func;
    use crate::header::parse_header;
    use crate::row::parse_row;

    const HEADER: &str = "##INFO=<ID=FAO,Number=A,Type=Integer,Description=\"Flow alt\">\n\
        ##INFO=<ID=FDP,Number=1,Type=Integer,Description=\"Flow depth\">\n\
        #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1";

    fn calls(line: &str) -> Vec<VariantCall> {
        let header = parse_header(HEADER).unwrap();
        let row = parse_row(line).unwrap();
        let annotations = row
            .info_raw("FUNC")
            .map(|raw| parse_func(raw).unwrap())
            .unwrap_or_default();
        split_alleles(&row)
            .iter()
            .map(|a| VariantCall::from_allele("S1", &row, &header, a, &annotations))
            .collect()
    }

    fn egfr() -> VariantCall {
        calls("chr7\t55259515\tCOSM6224\tT\tG\t900\tPASS\tFAO=250;FDP=1000;FUNC=[{'gene':'EGFR','oncomineVariantClass':'Hotspot'}]\tGT\t0/1").remove(0)
    }

    fn tp53_deletion() -> VariantCall {
        // Normalizes to chr17:7579470:GC:G.
        calls("chr17\t7579470\t.\tGCA\tGA\t900\tPASS\tFAO=20;FDP=1000;FUNC=[{'gene':'TP53'}]\tGT\t0/1").remove(0)
    }

    #[test]
    fn test_empty_selection_keeps_everything() {
        let selection = Selection::new();
        assert!(selection.is_empty());
        assert!(selection.matches(&egfr()).unwrap());
        assert!(selection.matches(&tp53_deletion()).unwrap());
    }

    #[test]
    fn test_gene_is_case_insensitive_and_ored() {
        let selection = Selection::new().with_genes(["egfr", "KRAS"]);
        assert!(selection.matches(&egfr()).unwrap());
        assert!(!selection.matches(&tp53_deletion()).unwrap());
    }

    #[test]
    fn test_hotspot_ids() {
        let selection = Selection::new().with_hotspot_ids(["COSM6224"]);
        assert!(selection.matches(&egfr()).unwrap());
        assert!(!selection.matches(&tp53_deletion()).unwrap());
    }

    #[test]
    fn test_exact_and_fuzzy_positions() {
        let exact = Selection::new().with_positions(["7:55259515".parse::<Locus>().unwrap()]);
        assert!(exact.matches(&egfr()).unwrap());

        let near = Selection::new().with_positions(["chr7:55259520".parse::<Locus>().unwrap()]);
        assert!(!near.matches(&egfr()).unwrap());
        assert!(near.clone().with_fuzzy_window(5).matches(&egfr()).unwrap());
        assert!(!near.with_fuzzy_window(4).matches(&egfr()).unwrap());

        let other_chrom = Selection::new()
            .with_positions(["chr8:55259515".parse::<Locus>().unwrap()])
            .with_fuzzy_window(10);
        assert!(!other_chrom.matches(&egfr()).unwrap());
    }

    #[test]
    fn test_position_matches_raw_or_normalized() {
        let call = tp53_deletion();
        assert_eq!(call.key.pos, 7579470);
        let selection = Selection::new().with_positions(["chr17:7579470".parse::<Locus>().unwrap()]);
        assert!(selection.matches(&call).unwrap());
    }

    #[test]
    fn test_ovat_only() {
        let selection = Selection::new().with_ovat_only(true);
        assert!(selection.matches(&egfr()).unwrap());
        assert!(!selection.matches(&tp53_deletion()).unwrap());
    }

    #[test]
    fn test_min_vaf() {
        let selection = Selection::new().with_min_vaf(5.0);
        assert!(selection.matches(&egfr()).unwrap());
        assert!(!selection.matches(&tp53_deletion()).unwrap());

        let no_counts = calls("chr1\t100\t.\tA\tG\t50\tPASS\t.").remove(0);
        assert!(!selection.matches(&no_counts).unwrap());
    }

    #[test]
    fn test_ref_calls_and_nocalls() {
        let row = "chr1\t100\t.\tA\tG,T\t50\tPASS\tFAO=30,1;FDP=200\tGT\t0/1";
        let both = calls(row);
        let selection = Selection::new().with_drop_ref_calls(true);
        assert!(selection.matches(&both[0]).unwrap());
        assert!(!selection.matches(&both[1]).unwrap());

        let nocall = calls("chr1\t100\t.\tA\tG\t50\tNOCALL\tFAO=3;FDP=20\tGT\t./.").remove(0);
        assert!(!Selection::new().with_drop_nocalls(true).matches(&nocall).unwrap());
        assert!(Selection::new().matches(&nocall).unwrap());
    }

    #[test]
    fn test_criteria_are_anded() {
        let selection = Selection::new()
            .with_genes(["EGFR"])
            .with_min_vaf(30.0);
        assert!(!selection.matches(&egfr()).unwrap());

        let expr = parse_filter("ALTCOV > 100").unwrap();
        let selection = Selection::new().with_genes(["EGFR"]).with_expression(expr);
        assert!(selection.matches(&egfr()).unwrap());
    }

    #[test]
    fn test_parse_locus() {
        assert_eq!(
            "chr7:55,259,515".parse::<Locus>().unwrap(),
            Locus {
                chrom: "chr7".to_string(),
                pos: 55259515
            }
        );
        assert!("chr7".parse::<Locus>().is_err());
        assert!(":12".parse::<Locus>().is_err());
        assert!("chr7:abc".parse::<Locus>().is_err());
    }

    #[test]
    fn test_parse_locus_list() {
        let loci: Loci = "chr7:55,259,515,chr12:25398284".parse().unwrap();
        assert_eq!(
            loci.0,
            vec![
                Locus { chrom: "chr7".to_string(), pos: 55259515 },
                Locus { chrom: "chr12".to_string(), pos: 25398284 },
            ]
        );
        assert_eq!("17:7577120".parse::<Loci>().unwrap().0.len(), 1);
        assert!("55259515,chr7:1".parse::<Loci>().is_err());

    }
}
