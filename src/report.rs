//! Rendering extracted calls as text tables, TSV or JSON.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::call::VariantCall;
use crate::error::Result;
use crate::extract::{ExtractStats, Extraction};
use crate::func::FuncAnnotation;
use crate::vaf::{AlleleCounts, format_vaf};

/// Column names of the call report.
pub const COLUMNS: [&str; 15] = [
    "CHROM:POS",
    "REF",
    "ALT",
    "VAF",
    "TotCov",
    "RefCov",
    "AltCov",
    "VarID",
    "Gene",
    "Transcript",
    "HGVS",
    "Protein",
    "Function",
    "oncomineGeneClass",
    "oncomineVariantClass",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Space-aligned columns, one block per sample.
    #[default]
    Table,
    Tsv,
    Json,
}

fn or_dot(value: Option<&str>) -> String {
    value.unwrap_or(".").to_string()
}

/// The report cells of one call, in [`COLUMNS`] order.
pub fn report_row(call: &VariantCall) -> Vec<String> {
    let ann = |get: fn(&FuncAnnotation) -> Option<&str>| {
        or_dot(call.annotation.as_ref().and_then(get))
    };
    let count = |get: fn(&AlleleCounts) -> u64| {
        call.counts
            .as_ref()
            .map(|c| get(c).to_string())
            .unwrap_or_else(|| ".".to_string())
    };
    let ids = if call.hotspot_ids.is_empty() {
        ".".to_string()
    } else {
        call.hotspot_ids.join(",")
    };

    vec![
        call.key.locus(),
        call.key.ref_allele.clone(),
        call.key.alt_allele.clone(),
        call.vaf().map(format_vaf).unwrap_or_else(|| ".".to_string()),
        count(|c| c.total_cov),
        count(|c| c.ref_cov),
        count(|c| c.alt_cov),
        ids,
        ann(FuncAnnotation::gene),
        ann(FuncAnnotation::transcript),
        ann(FuncAnnotation::coding),
        ann(FuncAnnotation::protein),
        ann(FuncAnnotation::function),
        ann(FuncAnnotation::oncomine_gene_class),
        ann(FuncAnnotation::oncomine_variant_class),
    ]
}

/// Lay out rows so every column is as wide as its widest cell.
pub fn write_aligned<W: Write>(writer: &mut W, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(writer, "{}", line(header.to_vec()))?;
    for row in rows {
        writeln!(writer, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

fn write_table<W: Write>(writer: &mut W, extractions: &[Extraction]) -> Result<()> {
    for (i, extraction) in extractions.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "Sample: {}", extraction.sample)?;
        let rows: Vec<Vec<String>> = extraction.calls.iter().map(report_row).collect();
        write_aligned(writer, &COLUMNS, &rows)?;
    }
    Ok(())
}

fn write_tsv<W: Write>(writer: &mut W, extractions: &[Extraction]) -> Result<()> {
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);

    let mut header = vec!["Sample"];
    header.extend(COLUMNS);
    tsv.write_record(&header)?;

    for extraction in extractions {
        for call in &extraction.calls {
            let mut record = vec![extraction.sample.clone()];
            record.extend(report_row(call));
            tsv.write_record(&record)?;
        }
    }
    tsv.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    sample: &'a str,
    stats: ExtractStats,
    calls: &'a [VariantCall],
}

fn write_json<W: Write>(writer: &mut W, extractions: &[Extraction]) -> Result<()> {
    let reports: Vec<JsonReport<'_>> = extractions
        .iter()
        .map(|e| JsonReport {
            sample: &e.sample,
            stats: e.stats,
            calls: &e.calls,
        })
        .collect();
    serde_json::to_writer_pretty(&mut *writer, &reports)?;
    writeln!(writer)?;
    Ok(())
}

/// Write every extraction in the requested format.
pub fn write_report<W: Write>(
    writer: &mut W,
    extractions: &[Extraction],
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Table => write_table(writer, extractions),
        ReportFormat::Tsv => write_tsv(writer, extractions),
        ReportFormat::Json => write_json(writer, extractions),
    }
}
