//! Variant extraction: VCF in, selected per-allele calls out.
//!
//! One pass over the file. The header must parse; a bad data row is logged,
//! counted and skipped; a bad `FUNC` block leaves the row unannotated.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::allele::split_alleles;
use crate::call::VariantCall;
use crate::error::{IonVcfError, Result};
use crate::func::parse_func;
use crate::header::{VcfHeader, parse_header};
use crate::row::parse_row;
use crate::select::Selection;

/// Counters for one extracted file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractStats {
    /// Data rows read, including skipped ones.
    pub rows: usize,
    /// Alleles seen across all parsed rows.
    pub alleles: usize,
    /// Calls that passed the selection.
    pub kept: usize,
    pub skipped_rows: usize,
    pub annotation_warnings: usize,
}

/// Result of extracting one VCF.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub sample: String,
    pub header: VcfHeader,
    pub calls: Vec<VariantCall>,
    pub stats: ExtractStats,
}

/// Runs a [`Selection`] over VCF input.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    selection: Selection,
}

impl Extractor {
    pub fn new(selection: Selection) -> Self {
        Self { selection }
    }

    /// Extract calls from VCF text.
    ///
    /// The first sample of the `#CHROM` line names the calls; `fallback`
    /// is used for sites-only files.
    pub fn extract<R: BufRead>(&self, fallback: &str, reader: R) -> Result<Extraction> {
        let (header_text, rows) = split_header(reader)?;
        let header = parse_header(&header_text)?;
        let sample = header
            .samples
            .first()
            .cloned()
            .unwrap_or_else(|| fallback.to_string());
        debug!(
            sample = %sample,
            info_fields = header.info.len(),
            "Parsed VCF header"
        );

        let mut stats = ExtractStats::default();
        let mut calls = Vec::new();

        for (line_no, line) in rows {
            let line = line?;
            stats.rows += 1;

            let row = match parse_row(&line) {
                Ok(row) => row,
                Err(e) => {
                    warn!(sample = %sample, line = line_no, "Skipping record: {e}");
                    stats.skipped_rows += 1;
                    continue;
                }
            };

            let annotations = match row.info_raw("FUNC").map(parse_func).transpose() {
                Ok(annotations) => annotations.unwrap_or_default(),
                Err(e) => {
                    warn!(
                        sample = %sample,
                        locus = %format!("{}:{}", row.chrom, row.pos),
                        "Ignoring FUNC block: {e}"
                    );
                    stats.annotation_warnings += 1;
                    Vec::new()
                }
            };

            for allele in split_alleles(&row) {
                stats.alleles += 1;
                let call = VariantCall::from_allele(&sample, &row, &header, &allele, &annotations);
                if self.selection.matches(&call)? {
                    calls.push(call);
                }
            }
        }

        stats.kept = calls.len();
        info!(
            sample = %sample,
            rows = stats.rows,
            kept = stats.kept,
            skipped = stats.skipped_rows,
            "Extraction finished"
        );

        Ok(Extraction {
            sample,
            header,
            calls,
            stats,
        })
    }

    /// Extract calls from a plain or gzip-compressed (`.gz`) VCF file.
    pub fn extract_path<P: AsRef<Path>>(&self, path: P) -> Result<Extraction> {
        let path = path.as_ref();
        let reader = open_input(path)?;
        self.extract(&file_stem(path), reader)
    }

    /// Extract several files in parallel, one task per file.
    ///
    /// Results come back in input order.
    pub fn extract_paths(&self, paths: &[PathBuf]) -> Vec<Result<Extraction>> {
        paths.par_iter().map(|path| self.extract_path(path)).collect()
    }
}

/// A data line and its 1-based line number in the file.
type NumberedLine = (usize, std::io::Result<String>);

/// The header text, then the non-blank data lines.
fn split_header<R: BufRead>(reader: R) -> Result<(String, impl Iterator<Item = NumberedLine>)> {
    let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));
    let mut header_text = String::new();
    let mut first_row = None;

    for (line_no, line) in lines.by_ref() {
        let line = line?;
        if line.starts_with('#') {
            header_text.push_str(&line);
            header_text.push('\n');
        } else if !line.trim().is_empty() {
            first_row = Some((line_no, Ok(line)));
            break;
        }
    }

    let rest = lines.filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()));
    Ok((header_text, first_row.into_iter().chain(rest)))
}

/// Open a text input, decompressing `.gz` files on the fly.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).map_err(|e| {
        IonVcfError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })?;
    let inner: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(inner)))
}

/// File name without `.vcf` / `.vcf.gz`.
fn file_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    name.strip_suffix(".vcf").unwrap_or(name).to_string()
}
