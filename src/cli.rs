//! Command line interface of the `ionvcf` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::filter::compile_filter;
use crate::report::ReportFormat;
use crate::select::{Loci, Selection, all_loci};
use crate::tools::Region;

#[derive(Debug, Parser)]
#[command(name = "ionvcf", version, about = "Ion Torrent VCF variant extraction and genome utilities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Worker threads for multi-file commands
    #[arg(short = 't', long, global = true, env = "IONVCF_THREADS", value_name = "THREADS")]
    pub threads: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report variant calls from one or more TVC / Ion Reporter VCFs
    Extract(ExtractArgs),
    /// Join the calls of two VCFs on the normalized variant
    Compare(CompareArgs),
    /// Calls per gene and a VAF histogram
    Summary(SummaryArgs),
    /// Convert HGVS protein changes between one and three letter codes
    Hgvs(HgvsArgs),
    /// Codon to amino acid, or amino acid to its codons
    Codon(CodonArgs),
    /// Hamming and Levenshtein distances against the first sequence of a counts file
    Distance(DistanceArgs),
    /// Map positions between genome builds with a UCSC chain file
    Liftover(LiftoverArgs),
    /// Genes at a position, or the region of a gene
    Genes(GenesArgs),
    /// Pathways of genes, or genes of a pathway
    Pathway(PathwayArgs),
    /// Trailing soft-clipped bases of every read in a BAM or SAM file
    Softclip(SamArgs),
    /// Values of one aux tag in a BAM or SAM file
    Tags(TagArgs),
    /// Index BAM files with samtools, in parallel
    Index(IndexArgs),
    /// Reference sequence of regions through samtools faidx
    Fetch(FetchArgs),
    /// Variant table from a saved ClinVar esummary JSON document
    Clinvar(ClinvarArgs),
}

/// Call selection shared by the VCF commands.
#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    /// Gene symbols to keep
    #[arg(short, long = "gene", value_delimiter = ',', value_name = "GENE")]
    pub genes: Vec<String>,

    /// Hotspot / COSMIC IDs to keep
    #[arg(short = 'H', long = "hotspot", value_delimiter = ',', value_name = "ID")]
    pub hotspots: Vec<String>,

    /// Positions to keep, as chr:pos
    #[arg(short, long = "position", value_name = "CHR:POS")]
    pub positions: Vec<Loci>,

    /// Match positions within this many bases
    #[arg(short, long, value_name = "BASES")]
    pub fuzzy: Option<u64>,

    /// Only calls with an Oncomine variant class
    #[arg(short, long)]
    pub ovat: bool,

    /// Drop alleles the genotype does not carry
    #[arg(short = 'R', long)]
    pub drop_ref: bool,

    /// Drop no-calls
    #[arg(short = 'N', long)]
    pub drop_nocall: bool,

    /// Minimum VAF, in percent
    #[arg(short = 'm', long, value_name = "PERCENT")]
    pub min_vaf: Option<f64>,

    /// Filter expression, e.g. 'VAF >= 5 && FUNCTION contains "missense"'
    #[arg(short = 'F', long, value_name = "EXPR")]
    pub filter: Option<String>,
}

impl SelectionArgs {
    pub fn selection(&self) -> Result<Selection> {
        let mut selection = Selection::new()
            .with_genes(&self.genes)
            .with_hotspot_ids(&self.hotspots)
            .with_positions(all_loci(&self.positions).cloned())
            .with_ovat_only(self.ovat)
            .with_drop_ref_calls(self.drop_ref)
            .with_drop_nocalls(self.drop_nocall);
        if let Some(window) = self.fuzzy {
            selection = selection.with_fuzzy_window(window);
        }
        if let Some(vaf) = self.min_vaf {
            selection = selection.with_min_vaf(vaf);
        }
        if let Some(filter) = &self.filter {
            selection = selection.with_expression(compile_filter(filter)?);
        }
        Ok(selection)
    }
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// VCF files, plain or gzipped
    #[arg(required = true, value_name = "VCF")]
    pub vcfs: Vec<PathBuf>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub format: ReportFormat,

    /// Write the report here instead of stdout
    #[arg(short = 'O', long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    pub vcf_a: PathBuf,
    pub vcf_b: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[arg(required = true, value_name = "VCF")]
    pub vcfs: Vec<PathBuf>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Width of a VAF bin, in percent
    #[arg(short = 'w', long, default_value_t = 10.0)]
    pub bin_width: f64,
}

#[derive(Debug, Args)]
pub struct HgvsArgs {
    /// Protein changes such as p.L858R or p.Leu858Arg
    pub changes: Vec<String>,

    /// File with one protein change per line
    #[arg(short = 'b', long, value_name = "FILE")]
    pub batch: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CodonArgs {
    /// Comma list of codons or amino acids (single or three letter)
    pub query: String,
}

#[derive(Debug, Args)]
pub struct DistanceArgs {
    /// `sequence count` lines, most abundant first
    pub counts: PathBuf,
}

#[derive(Debug, Args)]
pub struct LiftoverArgs {
    /// UCSC chain file, plain or gzipped
    #[arg(short, long, value_name = "CHAIN")]
    pub chain: PathBuf,

    /// Positions as chr:pos, comma separated
    #[arg(value_name = "CHR:POS")]
    pub positions: Vec<Loci>,

    /// File with one chr:pos per line
    #[arg(short = 'b', long, value_name = "FILE")]
    pub batch: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct GenesArgs {
    /// Tab-delimited chrom, start, end, gene table
    #[arg(long, value_name = "TABLE")]
    pub table: PathBuf,

    /// Positions as chr:pos
    #[arg(short, long = "position", value_name = "CHR:POS")]
    pub positions: Vec<Loci>,

    /// Gene symbols to locate
    #[arg(short, long = "gene", value_delimiter = ',', value_name = "GENE")]
    pub genes: Vec<String>,
}

#[derive(Debug, Args)]
#[command(group(clap::ArgGroup::new("query").required(true).args(["gene", "pathway"])))]
pub struct PathwayArgs {
    /// JSON map of pathway to genes
    #[arg(short, long, env = "IONVCF_PATHWAYS", value_name = "JSON")]
    pub json: PathBuf,

    /// Gene or comma list of genes
    #[arg(short, long)]
    pub gene: Option<String>,

    /// Pathway name, or '?' to list them
    #[arg(short, long)]
    pub pathway: Option<String>,
}

#[derive(Debug, Args)]
pub struct SamArgs {
    /// BAM or SAM file, '-' for stdin
    #[arg(value_name = "BAM")]
    pub alignments: PathBuf,
}

#[derive(Debug, Args)]
pub struct TagArgs {
    /// BAM or SAM file, '-' for stdin
    #[arg(value_name = "BAM")]
    pub alignments: PathBuf,

    /// Two-letter tag, e.g. CS
    #[arg(long)]
    pub tag: String,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    #[arg(required = true, value_name = "BAM")]
    pub bams: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Indexed FASTA reference
    #[arg(short, long, env = "IONVCF_REFERENCE", value_name = "FASTA")]
    pub reference: PathBuf,

    /// Regions as chr:start-end
    #[arg(required = true, value_name = "REGION")]
    pub regions: Vec<Region>,

    /// Reverse complement the sequence
    #[arg(long)]
    pub revcomp: bool,
}

#[derive(Debug, Args)]
pub struct ClinvarArgs {
    /// esummary JSON (db=clinvar, retmode=json)
    pub json: PathBuf,

    #[arg(short, long, default_value = "GRCh37")]
    pub assembly: String,

    /// Comma-separated output instead of tabs
    #[arg(long)]
    pub csv: bool,
}
