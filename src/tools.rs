//! Wrappers around `samtools` for BAM indexing and reference retrieval.

use std::env;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::{IonVcfError, Result};

pub const SAMTOOLS: &str = "samtools";

fn find_in(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    env::split_paths(search_path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Locate an executable on `$PATH`.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    let search_path = env::var_os("PATH").unwrap_or_default();
    let found = find_in(name, &search_path).ok_or_else(|| IonVcfError::MissingTool(name.to_string()))?;
    debug!(tool = name, path = %found.display(), "Found external tool");
    Ok(found)
}

/// Run a tool to completion and return its stdout.
fn run(program: &Path, args: &[&OsStr]) -> Result<Vec<u8>> {
    let output = Command::new(program).args(args).output()?;
    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(IonVcfError::ToolFailed {
            tool: program.display().to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub indexed: usize,
    pub failed: Vec<PathBuf>,
}

/// `samtools index` every BAM on the current rayon pool.
///
/// A failure is logged and recorded; the other files still get indexed.
pub fn index_bams(samtools: &Path, bams: &[PathBuf]) -> IndexReport {
    let outcomes: Vec<(&PathBuf, Result<Vec<u8>>)> = bams
        .par_iter()
        .map(|bam| {
            info!(bam = %bam.display(), "Indexing");
            (bam, run(samtools, &[OsStr::new("index"), bam.as_os_str()]))
        })
        .collect();

    let mut report = IndexReport::default();
    for (bam, outcome) in outcomes {
        match outcome {
            Ok(_) => report.indexed += 1,
            Err(e) => {
                error!(bam = %bam.display(), "Can not index BAM file, it may be corrupt: {e}");
                report.failed.push(bam.clone());
            }
        }
    }
    report
}

/// A 1-based inclusive reference interval, `chr7:55259400-55259520`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl FromStr for Region {
    type Err = IonVcfError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || IonVcfError::InvalidCoordinate(s.to_string());
        let (chrom, span) = s.trim().rsplit_once(':').ok_or_else(invalid)?;
        let span = span.replace(',', "");
        let (start, end) = match span.split_once('-') {
            Some((start, end)) => (start.parse::<u64>(), end.parse::<u64>()),
            None => (span.parse::<u64>(), span.parse::<u64>()),
        };
        let (start, end) = (start.map_err(|_| invalid())?, end.map_err(|_| invalid())?);
        if chrom.is_empty() || start == 0 || start > end {
            return Err(invalid());
        }
        Ok(Self {
            chrom: chrom.to_string(),
            start,
            end,
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|base| match base {
            'A' => 'T',
            'T' => 'A',
            'C' => 'G',
            'G' => 'C',
            'a' => 't',
            't' => 'a',
            'c' => 'g',
            'g' => 'c',
            other => other,
        })
        .collect()
}

/// Sequence lines of FASTA text joined together.
fn fasta_sequence(fasta: &str) -> String {
    fasta
        .lines()
        .filter(|line| !line.starts_with('>'))
        .map(str::trim)
        .collect()
}

/// Reference sequence of `region` through `samtools faidx`.
pub fn fetch(samtools: &Path, reference: &Path, region: &Region, revcomp: bool) -> Result<String> {
    let region_arg = region.to_string();
    let stdout = run(
        samtools,
        &[OsStr::new("faidx"), reference.as_os_str(), OsStr::new(&region_arg)],
    )?;
    let seq = fasta_sequence(&String::from_utf8_lossy(&stdout));
    if seq.is_empty() {
        return Err(IonVcfError::ToolFailed {
            tool: SAMTOOLS.to_string(),
            message: format!("no sequence for {region} in {}", reference.display()),
        });
    }
    Ok(if revcomp { reverse_complement(&seq) } else { seq })
}
