//! Read-level views of BAM or SAM alignments.
//!
//! The format is picked from the stream: BGZF magic means BAM, anything
//! else is read as SAM text.

use std::io::{BufRead, Write};

use noodles::bam;
use noodles::sam;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value;
use serde::Serialize;
use tracing::debug;

use crate::error::{IonVcfError, Result};

const BGZF_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Tags reported by `softclip`.
pub const SOFTCLIP_TAGS: [&str; 2] = ["CS", "MB"];

/// The parts of an alignment used here, plus the requested aux tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamRead {
    pub name: String,
    pub cigar: Vec<(Kind, usize)>,
    pub seq: String,
    pub tags: Vec<(String, String)>,
}

impl SamRead {
    fn new(record: &RecordBuf, tags: &[(&str, Tag)]) -> Self {
        Self {
            name: record
                .name()
                .map_or_else(|| "*".to_string(), |name| name.to_string()),
            cigar: record
                .cigar()
                .as_ref()
                .iter()
                .map(|op| (op.kind(), op.len()))
                .collect(),
            seq: String::from_utf8_lossy(record.sequence().as_ref()).into_owned(),
            tags: tags
                .iter()
                .filter_map(|(name, tag)| {
                    record
                        .data()
                        .get(tag)
                        .map(|value| (name.to_string(), tag_text(value)))
                })
                .collect(),
        }
    }

    /// Value of an aux tag, without its type.
    pub fn tag(&self, tag: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, value)| value.as_str())
    }

    /// Bases in the final soft clip of the alignment.
    pub fn trailing_softclip(&self) -> &str {
        match self.cigar.last() {
            Some((Kind::SoftClip, n)) => self.seq.get(self.seq.len().saturating_sub(*n)..).unwrap_or(""),
            _ => "",
        }
    }

    /// CIGAR in SAM notation, `*` when unaligned.
    pub fn cigar_string(&self) -> String {
        if self.cigar.is_empty() {
            return "*".to_string();
        }
        self.cigar
            .iter()
            .map(|(kind, len)| format!("{len}{}", kind_symbol(*kind)))
            .collect()
    }
}

fn kind_symbol(kind: Kind) -> char {
    match kind {
        Kind::Match => 'M',
        Kind::Insertion => 'I',
        Kind::Deletion => 'D',
        Kind::Skip => 'N',
        Kind::SoftClip => 'S',
        Kind::HardClip => 'H',
        Kind::Pad => 'P',
        Kind::SequenceMatch => '=',
        Kind::SequenceMismatch => 'X',
    }
}

fn tag_text(value: &Value) -> String {
    match value {
        Value::Character(c) => char::from(*c).to_string(),
        Value::String(s) | Value::Hex(s) => s.to_string(),
        Value::Float(f) => f.to_string(),
        other => other
            .as_int()
            .map_or_else(|| format!("{other:?}"), |n| n.to_string()),
    }
}

/// A two-character aux tag such as `CS`.
pub fn parse_tag(tag: &str) -> Result<Tag> {
    match tag.as_bytes() {
        [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphanumeric() => Ok(Tag::from([*a, *b])),
        _ => Err(IonVcfError::InvalidQuery(format!(
            "'{tag}' is not a two-character SAM tag"
        ))),
    }
}

fn collect_reads<I>(records: I, tags: &[(&str, Tag)]) -> Result<Vec<SamRead>>
where
    I: Iterator<Item = std::io::Result<RecordBuf>>,
{
    let mut reads = Vec::new();
    for record in records {
        reads.push(SamRead::new(&record?, tags));
    }
    Ok(reads)
}

/// Every alignment of a BAM or SAM stream, keeping the named aux tags.
pub fn read_alignments<R: BufRead>(mut reader: R, tags: &[&str]) -> Result<Vec<SamRead>> {
    let tags = tags
        .iter()
        .map(|name| parse_tag(name).map(|tag| (*name, tag)))
        .collect::<Result<Vec<_>>>()?;

    let is_bam = reader.fill_buf()?.starts_with(&BGZF_MAGIC);
    let reads = if is_bam {
        let mut bam = bam::io::Reader::new(reader);
        let header = bam.read_header()?;
        collect_reads(bam.record_bufs(&header), &tags)?
    } else {
        let mut sam = sam::io::Reader::new(reader);
        let header = sam.read_header()?;
        collect_reads(sam.record_bufs(&header), &tags)?
    };
    debug!(reads = reads.len(), bam = is_bam, "Read alignments");
    Ok(reads)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftclipRow<'a> {
    pub name: &'a str,
    pub seq: &'a str,
    pub sc_seq: &'a str,
    pub cigar: String,
    pub cs: &'a str,
    pub mb: &'a str,
}

impl<'a> From<&'a SamRead> for SoftclipRow<'a> {
    fn from(read: &'a SamRead) -> Self {
        Self {
            name: &read.name,
            seq: &read.seq,
            sc_seq: read.trailing_softclip(),
            cigar: read.cigar_string(),
            cs: read.tag("CS").unwrap_or("."),
            mb: read.tag("MB").unwrap_or("."),
        }
    }
}

/// Tab-separated `name seq sc_seq cigar cs mb`, one line per read.
pub fn write_softclips<W: Write>(writer: W, reads: &[SamRead]) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    for read in reads {
        out.serialize(SoftclipRow::from(read))?;
    }
    out.flush()?;
    Ok(())
}

/// Values of one tag, one per read carrying it.
pub fn tag_values<'a>(reads: &'a [SamRead], tag: &str) -> Vec<&'a str> {
    let values: Vec<&str> = reads.iter().filter_map(|r| r.tag(tag)).collect();
    if values.len() < reads.len() {
        debug!(tag, missing = reads.len() - values.len(), "Reads without tag");
    }
    values
}
