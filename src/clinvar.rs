//! ClinVar variant tables from saved NCBI esummary documents.
//!
//! The input is the JSON returned by
//! `esummary.fcgi?db=clinvar&id=<ids>&retmode=json`, fetched ahead of time.

use std::collections::HashMap;
use std::io::Write;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{IonVcfError, Result};

/// `NM_000546.5(TP53):c.817C>T (p.Arg273Cys)`
const VARIATION_NAME: &str = r"(NM.*?)\((.*?)\):(c\..*?)(?: \((.*?)\))?$";

const MISSING: &str = "---";

#[derive(Debug, Deserialize)]
struct Esummary {
    result: EsummaryResult,
}

#[derive(Debug, Deserialize)]
struct EsummaryResult {
    #[serde(default)]
    uids: Vec<String>,
    #[serde(flatten)]
    entries: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Significance {
    #[serde(default)]
    description: String,
    #[serde(default)]
    review_status: String,
}

#[derive(Debug, Deserialize)]
struct Xref {
    db_source: String,
    db_id: String,
}

#[derive(Debug, Deserialize)]
struct VariationLoc {
    assembly_name: String,
    #[serde(default)]
    chr: String,
    #[serde(default)]
    start: String,
    #[serde(default)]
    stop: String,
    #[serde(default, rename = "ref")]
    ref_allele: String,
    #[serde(default, rename = "alt")]
    alt_allele: String,
}

#[derive(Debug, Deserialize)]
struct VariationSet {
    variation_name: String,
    #[serde(default)]
    variation_xrefs: Vec<Xref>,
    #[serde(default)]
    variation_loc: Vec<VariationLoc>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    variation_set: Vec<VariationSet>,
    clinical_significance: Option<Significance>,
    /// Newer documents moved the germline call here.
    germline_classification: Option<Significance>,
    pmid: Option<String>,
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinvarRecord {
    pub chr: String,
    pub start: String,
    pub stop: String,
    #[serde(rename = "ref")]
    pub ref_allele: String,
    #[serde(rename = "alt")]
    pub alt_allele: String,
    pub gene: String,
    pub transcript: String,
    pub cds: String,
    pub aa: String,
    pub functional: String,
    pub clinvar_id: String,
    pub dbsnp_id: String,
    pub clinical_significance: String,
    pub review_status: String,
    #[serde(rename = "PMIDs")]
    pub pmids: String,
}

/// Variant class implied by a protein change.
///
/// No protein change means a splice site; `...Ter` is nonsense and `...fs`
/// a frameshift. Anything else counts as missense.
pub fn classify(protein: &str) -> &'static str {
    if protein == MISSING {
        "splicesite"
    } else if protein.ends_with("Ter") {
        "nonsense"
    } else if protein.ends_with("fs") {
        "frameshift"
    } else {
        "missense"
    }
}

fn or_missing(value: &str) -> String {
    if value.is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

/// Pulls records for one genome assembly out of esummary documents.
#[derive(Debug, Clone)]
pub struct ClinvarParser {
    assembly: String,
    variation_name: Regex,
}

impl ClinvarParser {
    pub fn new(assembly: &str) -> Result<Self> {
        let variation_name = Regex::new(VARIATION_NAME)
            .map_err(|e| IonVcfError::InvalidQuery(format!("variation name pattern: {e}")))?;
        Ok(Self {
            assembly: assembly.to_string(),
            variation_name,
        })
    }

    /// Every variant of the document, in `uids` order.
    ///
    /// Malformed entries and entries without variation data are skipped
    /// with a warning.
    pub fn parse(&self, json: &str) -> Result<Vec<ClinvarRecord>> {
        let doc: Esummary = serde_json::from_str(json)?;
        let mut ids = doc.result.uids.clone();
        if ids.is_empty() {
            ids = doc.result.entries.keys().cloned().collect();
            ids.sort();
        }

        let mut records = Vec::new();
        for id in ids {
            let Some(value) = doc.result.entries.get(&id) else {
                warn!(clinvar_id = %id, "No esummary entry, skipping");
                continue;
            };
            let entry: Entry = match serde_json::from_value(value.clone()) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(clinvar_id = %id, "Malformed esummary entry, skipping: {e}");
                    continue;
                }
            };
            match self.record(&id, &entry) {
                Some(record) => records.push(record),
                None => warn!(clinvar_id = %id, assembly = %self.assembly, "Can not get data, skipping"),
            }
        }
        Ok(records)
    }

    fn record(&self, id: &str, entry: &Entry) -> Option<ClinvarRecord> {
        let set = entry.variation_set.first()?;
        let loc = set
            .variation_loc
            .iter()
            .find(|loc| loc.assembly_name.eq_ignore_ascii_case(&self.assembly))?;

        let name = set.variation_name.replace("&gt;", ">");
        let (transcript, gene, cds, aa) = match self.variation_name.captures(&name) {
            Some(caps) => {
                let group = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_string();
                (group(1), group(2), group(3), group(4))
            }
            None => Default::default(),
        };
        let aa = or_missing(&aa);

        let dbsnp_id = set
            .variation_xrefs
            .iter()
            .find(|x| x.db_source == "dbSNP")
            .map(|x| format!("rs{}", x.db_id))
            .unwrap_or_default();

        let significance = entry
            .clinical_significance
            .as_ref()
            .filter(|s| !s.description.is_empty())
            .or(entry.germline_classification.as_ref());
        let (description, review_status) = significance
            .map(|s| (s.description.as_str(), s.review_status.as_str()))
            .unwrap_or_default();

        Some(ClinvarRecord {
            chr: or_missing(&loc.chr),
            start: or_missing(&loc.start),
            stop: or_missing(&loc.stop),
            ref_allele: or_missing(&loc.ref_allele),
            alt_allele: or_missing(&loc.alt_allele),
            gene: or_missing(&gene),
            transcript: or_missing(&transcript),
            cds: or_missing(&cds),
            functional: classify(&aa).to_string(),
            aa,
            clinvar_id: id.to_string(),
            dbsnp_id: or_missing(&dbsnp_id),
            clinical_significance: or_missing(description),
            review_status: or_missing(review_status),
            pmids: or_missing(entry.pmid.as_deref().unwrap_or_default()),
        })
    }
}

/// Write records with a header line, tab or comma separated.
pub fn write_records<W: Write>(writer: W, records: &[ClinvarRecord], delimiter: u8) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    for record in records {
        out.serialize(record)?;
    }
    out.flush()?;
    Ok(())
}
