//! Per-allele variant calls, the unit every report works on.

use std::collections::HashMap;

use serde::Serialize;

use crate::allele::{Allele, allele_info, hotspot_ids, is_called};
use crate::func::{FuncAnnotation, reconcile};
use crate::header::VcfHeader;
use crate::normalize::VariantKey;
use crate::row::VcfRow;
use crate::vaf::{AlleleCounts, allele_counts};
use crate::value::Value;

/// One alternate allele of one sample, normalized and annotated.
#[derive(Debug, Clone, Serialize)]
pub struct VariantCall {
    pub sample: String,
    pub key: VariantKey,
    /// Allele as written in the VCF.
    pub raw_pos: u64,
    pub raw_ref: String,
    pub raw_alt: String,
    pub hotspot_ids: Vec<String>,
    pub filter: Vec<String>,
    pub genotype: Option<String>,
    /// Genotype includes this allele.
    pub called: bool,
    pub counts: Option<AlleleCounts>,
    pub annotation: Option<FuncAnnotation>,
    /// Every FUNC entry of the source row.
    #[serde(skip)]
    pub annotations: Vec<FuncAnnotation>,
    #[serde(skip)]
    pub info: HashMap<String, Value>,
}

impl VariantCall {
    /// Build the call for `allele` of `row`.
    ///
    /// `annotations` is the row's decoded FUNC block (possibly empty).
    pub fn from_allele(
        sample: &str,
        row: &VcfRow,
        header: &VcfHeader,
        allele: &Allele<'_>,
        annotations: &[FuncAnnotation],
    ) -> Self {
        let annotation = reconcile(
            annotations,
            (row.pos, row.ref_allele.as_str(), allele.raw),
            &allele.key,
            row.alt_alleles.len() == 1,
        )
        .cloned();

        Self {
            sample: sample.to_string(),
            key: allele.key.clone(),
            raw_pos: row.pos,
            raw_ref: row.ref_allele.clone(),
            raw_alt: allele.raw.to_string(),
            hotspot_ids: hotspot_ids(row, allele.index),
            filter: row.filter.clone(),
            genotype: row.genotype().map(str::to_string),
            called: is_called(row, allele.index),
            counts: allele_counts(row, allele.index),
            annotation,
            annotations: annotations.to_vec(),
            info: allele_info(row, header, allele.index),
        }
    }

    /// VAF as a fraction, if counts were available.
    pub fn vaf(&self) -> Option<f64> {
        self.counts.map(|c| c.vaf())
    }

    pub fn gene(&self) -> Option<&str> {
        self.annotation.as_ref().and_then(FuncAnnotation::gene)
    }

    /// Oncomine variant class of the reconciled annotation.
    pub fn ovat_class(&self) -> Option<&str> {
        self.annotation
            .as_ref()
            .and_then(FuncAnnotation::oncomine_variant_class)
    }

    pub fn is_nocall(&self) -> bool {
        self.filter.iter().any(|f| f == "NOCALL")
    }

    /// Get a value by field name, for filter expressions.
    ///
    /// Call-level names (VAF is a percentage) come first, then annotation
    /// fields of the reconciled FUNC entry, then the allele's INFO values.
    pub fn get(&self, field: &str) -> Value {
        let ann = |name: &str| -> Value {
            self.annotation
                .as_ref()
                .and_then(|a| a.get(name))
                .map(Value::from)
                .unwrap_or(Value::Missing)
        };
        let count = |f: fn(&AlleleCounts) -> u64| -> Value {
            self.counts.as_ref().map(|c| Value::from(f(c))).unwrap_or(Value::Missing)
        };

        match field {
            "SAMPLE" => Value::String(self.sample.clone()),
            "CHROM" => Value::String(self.key.chrom.clone()),
            "POS" => Value::from(self.key.pos),
            "REF" => Value::String(self.key.ref_allele.clone()),
            "ALT" => Value::String(self.key.alt_allele.clone()),
            "KEY" => Value::String(self.key.to_string()),
            "ID" => strings(&self.hotspot_ids),
            "FILTER" => strings(&self.filter),
            "GT" => self.genotype.as_deref().map(Value::from).unwrap_or(Value::Missing),
            "CALLED" => Value::Bool(self.called),
            "VAF" => self
                .counts
                .map(|c| Value::Number(c.vaf_percent()))
                .unwrap_or(Value::Missing),
            "TOTCOV" => count(|c| c.total_cov),
            "REFCOV" => count(|c| c.ref_cov),
            "ALTCOV" => count(|c| c.alt_cov),
            "GENE" => ann("gene"),
            "TRANSCRIPT" => ann("transcript"),
            "HGVS" => ann("coding"),
            "PROTEIN" => ann("protein"),
            "FUNCTION" => ann("function"),
            "EXON" => ann("exon"),
            "LOCATION" => ann("location"),
            "OGC" => ann("oncomineGeneClass"),
            "OVAT" => ann("oncomineVariantClass"),
            _ => self.info.get(field).cloned().unwrap_or(Value::Missing),
        }
    }
}

fn strings(items: &[String]) -> Value {
    match items {
        [] => Value::Missing,
        [one] => Value::String(one.clone()),
        many => Value::Array(many.iter().map(|s| Value::String(s.clone())).collect()),
    }
}
