//! TVC / Ion Reporter functional annotation (`FUNC`) blocks.
//!
//! The `FUNC` INFO value is a JSON list written with single quotes:
//!
//! ```text
//! FUNC=[{'origPos':'55259515','origRef':'T','normalizedRef':'T','gene':'EGFR',
//!        'normalizedPos':'55259515','normalizedAlt':'G','transcript':'NM_005228.3',
//!        'function':'missense','protein':'p.Leu858Arg','coding':'c.2573T>G',
//!        'origAlt':'G','exon':'21','oncomineGeneClass':'Gain-of-Function',
//!        'oncomineVariantClass':'Hotspot'}]
//! ```
//!
//! One entry per annotated allele. The entries have to be matched back to the
//! alleles of the row, which is what [`reconcile`] does.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{IonVcfError, Result};
use crate::normalize::{VariantKey, normalize};

/// One entry of a `FUNC` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FuncAnnotation {
    fields: BTreeMap<String, String>,
}

/// Placeholders the annotators write for "no value".
fn is_placeholder(value: &str) -> bool {
    matches!(value, "" | "." | "---" | "-")
}

impl FuncAnnotation {
    /// Value of a field, with placeholders treated as absent.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !is_placeholder(v))
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn gene(&self) -> Option<&str> {
        self.get("gene")
    }

    pub fn transcript(&self) -> Option<&str> {
        self.get("transcript")
    }

    pub fn coding(&self) -> Option<&str> {
        self.get("coding")
    }

    pub fn protein(&self) -> Option<&str> {
        self.get("protein")
    }

    pub fn function(&self) -> Option<&str> {
        self.get("function")
    }

    pub fn oncomine_gene_class(&self) -> Option<&str> {
        self.get("oncomineGeneClass")
    }

    pub fn oncomine_variant_class(&self) -> Option<&str> {
        self.get("oncomineVariantClass")
    }

    fn triple(&self, prefix: &str) -> Option<(u64, &str, &str)> {
        let pos = self.get(&format!("{prefix}Pos"))?.parse().ok()?;
        let r = self.get(&format!("{prefix}Ref"))?;
        let a = self.get(&format!("{prefix}Alt"))?;
        Some((pos, r, a))
    }

    /// `(origPos, origRef, origAlt)`, the allele as the caller wrote it.
    pub fn original(&self) -> Option<(u64, &str, &str)> {
        self.triple("orig")
    }

    /// `(normalizedPos, normalizedRef, normalizedAlt)`.
    pub fn normalized(&self) -> Option<(u64, &str, &str)> {
        self.triple("normalized")
    }
}

impl From<BTreeMap<String, String>> for FuncAnnotation {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(stringify)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn to_annotation(value: &serde_json::Value) -> Result<FuncAnnotation> {
    let serde_json::Value::Object(map) = value else {
        return Err(IonVcfError::AnnotationParseError(format!(
            "Expected an object in FUNC block, found {value}"
        )));
    };
    Ok(map
        .iter()
        .map(|(k, v)| (k.clone(), stringify(v)))
        .collect::<BTreeMap<_, _>>()
        .into())
}

/// Decode a raw `FUNC` value.
///
/// Accepts the single-quoted list TVC writes, a single object, or proper
/// JSON. An empty value or `.` yields no annotations.
pub fn parse_func(raw: &str) -> Result<Vec<FuncAnnotation>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "." {
        return Ok(Vec::new());
    }

    let json = raw.replace('\'', "\"");
    let decoded: serde_json::Value = serde_json::from_str(&json)
        .map_err(|e| IonVcfError::AnnotationParseError(format!("{e}: {raw}")))?;

    match &decoded {
        serde_json::Value::Array(items) => items.iter().map(to_annotation).collect(),
        single => Ok(vec![to_annotation(single)?]),
    }
}

/// Pick the annotation belonging to one allele.
///
/// `raw` is the allele as it appears in the row, `key` its normalized form.
/// Rules in order: normalized fields equal the key; original fields equal the
/// raw allele; original fields normalize to the key; finally, a single-ALT row
/// with exactly one annotation takes that annotation.
pub fn reconcile<'a>(
    annotations: &'a [FuncAnnotation],
    raw: (u64, &str, &str),
    key: &VariantKey,
    single_alt: bool,
) -> Option<&'a FuncAnnotation> {
    let key_triple = (key.pos, key.ref_allele.as_str(), key.alt_allele.as_str());
    let same = |a: (u64, &str, &str), b: (u64, &str, &str)| {
        a.0 == b.0 && a.1.eq_ignore_ascii_case(b.1) && a.2.eq_ignore_ascii_case(b.2)
    };

    annotations
        .iter()
        .find(|ann| ann.normalized().is_some_and(|n| same(n, key_triple)))
        .or_else(|| {
            annotations
                .iter()
                .find(|ann| ann.original().is_some_and(|o| same(o, raw)))
        })
        .or_else(|| {
            annotations.iter().find(|ann| {
                ann.original().is_some_and(|(pos, r, a)| {
                    let (npos, nref, nalt) = normalize(pos, r, a);
                    same((npos, nref.as_str(), nalt.as_str()), key_triple)
                })
            })
        })
        .or_else(|| match annotations {
            [only] if single_alt => Some(only),
            _ => None,
        })
}
