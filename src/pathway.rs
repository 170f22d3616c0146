//! Gene and pathway membership from a JSON map of `{pathway: [genes]}`.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{IonVcfError, Result};
use crate::extract::open_input;

/// Metadata key some maps carry next to the pathways.
const FILE_INFO: &str = "file_info";

/// Written in place of an empty result.
pub const NO_RESULT: &str = "?????????????";

#[derive(Debug, Clone, Default)]
pub struct PathwayDb {
    pathways: BTreeMap<String, Vec<String>>,
}

impl PathwayDb {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(open_input(path.as_ref())?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_reader(reader)?;
        let mut pathways = BTreeMap::new();
        for (name, genes) in raw {
            if name == FILE_INFO {
                continue;
            }
            pathways.insert(name, serde_json::from_value(genes)?);
        }
        Ok(Self { pathways })
    }

    /// Pathway names, sorted.
    pub fn list(&self) -> Vec<&str> {
        self.pathways.keys().map(String::as_str).collect()
    }

    /// Pathways containing `gene`, matched exactly.
    pub fn pathways_for(&self, gene: &str) -> Vec<&str> {
        self.pathways
            .iter()
            .filter(|(_, genes)| genes.iter().any(|g| g == gene))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// One `(gene, pathways)` row per entry of a comma-separated list.
    pub fn lookup_genes(&self, genes: &str) -> Vec<(String, Vec<String>)> {
        genes
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(|g| {
                let found = self.pathways_for(g).into_iter().map(str::to_string).collect();
                (g.to_string(), found)
            })
            .collect()
    }

    pub fn genes_in(&self, pathway: &str) -> Result<&[String]> {
        self.pathways
            .get(pathway)
            .map(Vec::as_slice)
            .ok_or_else(|| IonVcfError::InvalidQuery(format!("no such pathway '{pathway}'")))
    }
}

/// CSV rows of `key,value,value...`; an empty row gets [`NO_RESULT`].
pub fn write_rows<W: Write>(writer: W, rows: &[(String, Vec<String>)]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for (key, values) in rows {
        let mut record = vec![key.as_str()];
        if values.is_empty() {
            record.push(NO_RESULT);
        } else {
            record.extend(values.iter().map(String::as_str));
        }
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DB: &str = r#"{
        "file_info": {"version": "2018-02"},
        "RTK/RAS": ["EGFR", "ERBB2", "KRAS", "NRAS", "BRAF"],
        "PI3K": ["PIK3CA", "PTEN", "AKT1"],
        "Cell cycle": ["CDKN2A", "CDK4"],
        "TP53": ["TP53", "MDM2"],
        "Growth signaling": ["EGFR", "PIK3CA"]
    }"#;

    fn db() -> PathwayDb {
        PathwayDb::from_reader(DB.as_bytes()).unwrap()
    }

    #[test]
    fn test_list_skips_file_info() {
        assert_eq!(
            db().list(),
            vec!["Cell cycle", "Growth signaling", "PI3K", "RTK/RAS", "TP53"]
        );
    }

    #[test]
    fn test_gene_lookup() {
        let rows = db().lookup_genes("EGFR, MDM2,FOO");
        assert_eq!(
            rows,
            vec![
                ("EGFR".to_string(), vec!["Growth signaling".to_string(), "RTK/RAS".to_string()]),
                ("MDM2".to_string(), vec!["TP53".to_string()]),
                ("FOO".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn test_pathway_lookup() {
        let db = db();
        assert_eq!(db.genes_in("PI3K").unwrap(), ["PIK3CA", "PTEN", "AKT1"]);
        assert!(matches!(db.genes_in("Hippo"), Err(IonVcfError::InvalidQuery(_))));
    }

    #[test]
    fn test_write_rows() {
        let rows = db().lookup_genes("CDK4,FOO");
        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "CDK4,Cell cycle\nFOO,?????????????\n");
    }
}
