//! VCF header parser.
//!
//! Reads the `##` meta lines and the `#CHROM` column line. `##INFO` and
//! `##FORMAT` definitions are kept so per-allele values (Number=A / Number=R)
//! and typed comparisons can be resolved later.

use std::collections::HashMap;

use crate::error::{IonVcfError, Result};

/// The number of values a field can have.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoNumber {
    /// A fixed number of values.
    Count(usize),
    /// One value per alternate allele (A).
    PerAltAllele,
    /// One value per possible genotype (G).
    PerGenotype,
    /// One value per allele including reference (R).
    PerAllele,
    /// Variable number of values (.).
    Variable,
    /// Flag type (0 values, presence indicates true).
    Flag,
}

/// The data type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoType {
    Integer,
    Float,
    Flag,
    Character,
    String,
}

/// Metadata for a single `##INFO` or `##FORMAT` definition.
#[derive(Debug, Clone)]
pub struct InfoField {
    /// The field identifier (e.g., "FAO", "FUNC").
    pub id: String,
    /// The number of values this field can have.
    pub number: InfoNumber,
    /// The data type of the field.
    pub field_type: InfoType,
    /// The description from the header.
    pub description: String,
}

/// Map of field ID to its metadata.
pub type InfoMap = HashMap<String, InfoField>;

/// Columns that must open every `#CHROM` line.
const FIXED_COLUMNS: [&str; 8] = ["#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO"];

/// A parsed VCF header.
#[derive(Debug, Clone, Default)]
pub struct VcfHeader {
    /// `##INFO` definitions.
    pub info: InfoMap,
    /// `##FORMAT` definitions.
    pub format: InfoMap,
    /// Sample names from the `#CHROM` line.
    pub samples: Vec<String>,
    /// Value of `##source`, e.g. the TVC version string.
    pub source: Option<String>,
    /// Every `##` line, verbatim.
    pub meta: Vec<String>,
}

impl VcfHeader {
    /// True when the `##source` line names Ion Reporter rather than TVC.
    pub fn is_ion_reporter(&self) -> bool {
        self.source
            .as_deref()
            .is_some_and(|s| s.to_ascii_lowercase().contains("ionreporter"))
    }
}

fn parse_number(s: &str) -> InfoNumber {
    match s {
        "A" => InfoNumber::PerAltAllele,
        "G" => InfoNumber::PerGenotype,
        "R" => InfoNumber::PerAllele,
        "." => InfoNumber::Variable,
        "0" => InfoNumber::Flag,
        _ => InfoNumber::Count(s.parse().unwrap_or(1)),
    }
}

fn parse_type(s: &str) -> InfoType {
    match s {
        "Integer" => InfoType::Integer,
        "Float" => InfoType::Float,
        "Flag" => InfoType::Flag,
        "Character" => InfoType::Character,
        _ => InfoType::String,
    }
}

/// Parse the key=value pairs from inside the angle brackets.
fn parse_attrs(content: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    let mut remaining = content;

    while !remaining.is_empty() {
        let Some(eq_pos) = remaining.find('=') else {
            break;
        };
        let key = remaining[..eq_pos].trim();
        remaining = &remaining[eq_pos + 1..];

        let value = if let Some(quoted) = remaining.strip_prefix('"') {
            // Descriptions may carry escaped quotes.
            let mut end = quoted.len();
            let mut escaped = false;
            for (i, c) in quoted.char_indices() {
                match c {
                    '\\' if !escaped => escaped = true,
                    '"' if !escaped => {
                        end = i;
                        break;
                    }
                    _ => escaped = false,
                }
            }
            let val = &quoted[..end];
            remaining = &quoted[(end + 1).min(quoted.len())..];
            remaining = remaining.strip_prefix(',').unwrap_or(remaining);
            val.replace("\\\"", "\"")
        } else {
            let comma_pos = remaining.find(',').unwrap_or(remaining.len());
            let val = &remaining[..comma_pos];
            remaining = remaining.get(comma_pos + 1..).unwrap_or("");
            val.to_string()
        };

        attrs.insert(key.to_string(), value);
    }

    attrs
}

/// Parse the body of an `##INFO=<...>` or `##FORMAT=<...>` line.
fn parse_definition(line: &str, prefix: &str) -> Result<InfoField> {
    let body = line
        .strip_prefix(prefix)
        .and_then(|l| l.strip_suffix('>'))
        .ok_or_else(|| IonVcfError::HeaderParseError(format!("Unterminated definition: {line}")))?;

    let attrs = parse_attrs(body);
    let missing =
        |attr: &str| IonVcfError::HeaderParseError(format!("Missing {attr} in definition: {line}"));

    let id = attrs.get("ID").ok_or_else(|| missing("ID"))?.clone();
    let number = parse_number(attrs.get("Number").ok_or_else(|| missing("Number"))?);
    let field_type = parse_type(attrs.get("Type").ok_or_else(|| missing("Type"))?);
    let description = attrs.get("Description").cloned().unwrap_or_default();

    Ok(InfoField {
        id,
        number,
        field_type,
        description,
    })
}

/// Parse the `#CHROM` column line and return the sample names.
fn parse_column_line(line: &str) -> Result<Vec<String>> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() < FIXED_COLUMNS.len() {
        return Err(IonVcfError::HeaderParseError(format!(
            "#CHROM line has {} columns, expected at least {}",
            columns.len(),
            FIXED_COLUMNS.len()
        )));
    }
    for (found, expected) in columns.iter().zip(FIXED_COLUMNS) {
        if *found != expected {
            return Err(IonVcfError::HeaderParseError(format!(
                "Unexpected column '{found}' in #CHROM line, expected '{expected}'"
            )));
        }
    }
    // Column 9 is FORMAT, samples follow.
    Ok(columns.iter().skip(9).map(|s| s.to_string()).collect())
}

/// Parse a complete VCF header: all `##` lines plus the `#CHROM` line.
///
/// Fails when a field definition is malformed or when the `#CHROM` line is
/// missing or short.
pub fn parse_header(header: &str) -> Result<VcfHeader> {
    let mut parsed = VcfHeader::default();
    let mut saw_columns = false;

    for line in header.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if line.starts_with("##INFO=<") {
            let field = parse_definition(line, "##INFO=<")?;
            parsed.info.insert(field.id.clone(), field);
        } else if line.starts_with("##FORMAT=<") {
            let field = parse_definition(line, "##FORMAT=<")?;
            parsed.format.insert(field.id.clone(), field);
        } else if let Some(source) = line.strip_prefix("##source=") {
            parsed.source = Some(source.trim_matches('"').to_string());
        } else if line.starts_with("#CHROM") {
            parsed.samples = parse_column_line(line)?;
            saw_columns = true;
            continue;
        } else if !line.starts_with("##") {
            return Err(IonVcfError::HeaderParseError(format!(
                "Unexpected line in header: {line}"
            )));
        }
        parsed.meta.push(line.to_string());
    }

    if !saw_columns {
        return Err(IonVcfError::HeaderParseError(
            "Missing #CHROM column line".to_string(),
        ));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSample_1";

    #[test]
    fn test_parse_tvc_definitions() {
        let header = format!(
            "##fileformat=VCFv4.1\n\
             ##source=\"tvc 5.12-8 (rev) - Torrent Variant Caller\"\n\
             ##INFO=<ID=FAO,Number=A,Type=Integer,Description=\"Flow Evaluator Alternate allele observations\">\n\
             ##INFO=<ID=FDP,Number=1,Type=Integer,Description=\"Flow Evaluator read depth at the locus\">\n\
             ##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
             ##FORMAT=<ID=AD,Number=R,Type=Integer,Description=\"Allelic depths\">\n\
             {COLUMNS}"
        );
        let parsed = parse_header(&header).unwrap();

        let fao = parsed.info.get("FAO").unwrap();
        assert_eq!(fao.number, InfoNumber::PerAltAllele);
        assert_eq!(fao.field_type, InfoType::Integer);
        assert_eq!(parsed.info.get("FDP").unwrap().number, InfoNumber::Count(1));
        assert_eq!(parsed.format.get("AD").unwrap().number, InfoNumber::PerAllele);
        assert_eq!(parsed.samples, vec!["Sample_1"]);
        assert!(parsed.source.unwrap().starts_with("tvc"));
    }

    #[test]
    fn test_description_with_commas_and_quotes() {
        let header = format!(
            "##INFO=<ID=FUNC,Number=.,Type=String,Description=\"Functional Annotations, a \\\"JSON\\\" list\">\n{COLUMNS}"
        );
        let parsed = parse_header(&header).unwrap();
        let func = parsed.info.get("FUNC").unwrap();
        assert_eq!(func.number, InfoNumber::Variable);
        assert_eq!(func.description, "Functional Annotations, a \"JSON\" list");
    }

    #[test]
    fn test_ion_reporter_source() {
        let header = format!("##source=\"IonReporterSoftware v5.18\"\n{COLUMNS}");
        assert!(parse_header(&header).unwrap().is_ion_reporter());
    }

    #[test]
    fn test_missing_column_line_fails() {
        let header = "##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Depth\">";
        assert!(matches!(
            parse_header(header),
            Err(IonVcfError::HeaderParseError(_))
        ));
    }

    #[test]
    fn test_malformed_definition_fails() {
        let header = format!("##INFO=<ID=DP,Type=Integer,Description=\"Depth\">\n{COLUMNS}");
        assert!(parse_header(&header).is_err());

        let header = format!("##INFO=<ID=DP,Number=1,Type=Integer\n{COLUMNS}");
        assert!(parse_header(&header).is_err());
    }

    #[test]
    fn test_short_column_line_fails() {
        assert!(parse_header("#CHROM\tPOS\tID\tREF").is_err());
        assert!(parse_header("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tINFO\tFILTER").is_err());
    }

    #[test]
    fn test_sites_only_header_has_no_samples() {
        let parsed = parse_header("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO").unwrap();
        assert!(parsed.samples.is_empty());
    }
}
