//! The `ionvcf` command line tool.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ionvcf::cli::{
    Cli, ClinvarArgs, CodonArgs, Command, CompareArgs, ExtractArgs, FetchArgs, GenesArgs,
    HgvsArgs, IndexArgs, LiftoverArgs, PathwayArgs, SelectionArgs, SummaryArgs, TagArgs,
};
use ionvcf::clinvar::{ClinvarParser, write_records};
use ionvcf::codon::lookup_all;
use ionvcf::compare::{compare, write_comparison};
use ionvcf::distance::{distances, write_csv};
use ionvcf::extract::{Extraction, Extractor, open_input};
use ionvcf::genes::GeneTable;
use ionvcf::hgvs::convert;
use ionvcf::liftover::ChainMap;
use ionvcf::pathway::{PathwayDb, write_rows};
use ionvcf::report::{write_aligned, write_report};
use ionvcf::sam::{SOFTCLIP_TAGS, read_alignments, tag_values, write_softclips};
use ionvcf::select::{Locus, all_loci};
use ionvcf::summary::{summarize, write_summary};
use ionvcf::tools::{SAMTOOLS, fetch, index_bams, require_tool};

fn init_tracing(verbose: bool) {
    let default = if verbose { "ionvcf=debug" } else { "ionvcf=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// A file, or stdin for `-`.
fn open_text(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    Ok(open_input(path)?)
}

fn stdout() -> BufWriter<io::StdoutLock<'static>> {
    BufWriter::new(io::stdout().lock())
}

/// Non-blank lines of a batch file.
fn batch_lines(path: &Path) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in open_text(path)?.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}

/// Extract every VCF; the first unreadable file stops the run.
fn extract_all(paths: &[PathBuf], selection: &SelectionArgs) -> Result<Vec<Extraction>> {
    let extractor = Extractor::new(selection.selection()?);
    paths
        .iter()
        .zip(extractor.extract_paths(paths))
        .map(|(path, result)| result.with_context(|| format!("Failed to read {}", path.display())))
        .collect()
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let extractions = extract_all(&args.vcfs, &args.selection)?;
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Can not create {}", path.display()))?,
        )),
        None => Box::new(stdout()),
    };
    write_report(&mut out, &extractions, args.format)?;
    out.flush()?;
    Ok(())
}

fn run_compare(args: &CompareArgs) -> Result<()> {
    let paths = [args.vcf_a.clone(), args.vcf_b.clone()];
    let extractions = extract_all(&paths, &args.selection)?;
    let [a, b] = extractions.as_slice() else {
        bail!("Expected two extractions");
    };
    let comparison = compare(&a.calls, &b.calls);
    let mut out = stdout();
    write_comparison(&mut out, &comparison, &a.sample, &b.sample)?;
    out.flush()?;
    Ok(())
}

fn run_summary(args: &SummaryArgs) -> Result<()> {
    let extractions = extract_all(&args.vcfs, &args.selection)?;
    let summary = summarize(extractions.iter().flat_map(|e| &e.calls), args.bin_width)?;
    let mut out = stdout();
    write_summary(&mut out, &summary)?;
    out.flush()?;
    Ok(())
}

fn run_hgvs(args: &HgvsArgs) -> Result<()> {
    let mut changes = args.changes.clone();
    if let Some(batch) = &args.batch {
        changes.extend(batch_lines(batch)?);
    }
    if changes.is_empty() {
        bail!("No protein changes given");
    }
    let mut out = stdout();
    for change in &changes {
        writeln!(out, "{change}\t{}", convert(change))?;
    }
    out.flush()?;
    Ok(())
}

fn run_codon(args: &CodonArgs) -> Result<()> {
    let rows: Vec<Vec<String>> = lookup_all(&args.query)?
        .into_iter()
        .map(|hit| vec![hit.single.to_string(), hit.three.to_string(), hit.codons.join(",")])
        .collect();
    let mut out = stdout();
    write_aligned(&mut out, &["AA", "Code", "Codons"], &rows)?;
    out.flush()?;
    Ok(())
}

fn run_liftover(args: &LiftoverArgs) -> Result<()> {
    let chains = ChainMap::from_path(&args.chain)
        .with_context(|| format!("Failed to load {}", args.chain.display()))?;
    let mut positions: Vec<Locus> = all_loci(&args.positions).cloned().collect();
    if let Some(batch) = &args.batch {
        for line in batch_lines(batch)? {
            positions.push(line.parse::<Locus>()?);
        }
    }

    let mut out = csv::Writer::from_writer(stdout());
    out.write_record(["OrigChr", "OrigPos", "NewChr", "NewPos"])?;
    for locus in &positions {
        let lifted = chains.lift(locus);
        if lifted.is_empty() {
            warn!(position = %locus, "Position does not map");
            out.write_record([locus.chrom.as_str(), locus.pos.to_string().as_str(), ".", "."])?;
        }
        for hit in lifted {
            out.write_record([
                locus.chrom.clone(),
                locus.pos.to_string(),
                hit.chrom,
                hit.pos.to_string(),
            ])?;
        }
    }
    out.flush()?;
    Ok(())
}

fn run_genes(args: &GenesArgs) -> Result<()> {
    if args.positions.is_empty() && args.genes.is_empty() {
        bail!("Give at least one --position or --gene");
    }
    let table = GeneTable::from_path(&args.table)
        .with_context(|| format!("Failed to load {}", args.table.display()))?;
    debug!(regions = table.len(), "Loaded gene table");

    let mut rows = Vec::new();
    for locus in all_loci(&args.positions) {
        let genes = table.genes_at(locus);
        let found = if genes.is_empty() { ".".to_string() } else { genes.join(",") };
        rows.push(vec![locus.to_string(), found]);
    }
    for gene in &args.genes {
        let found = table.region_of(gene).map_or_else(|| ".".to_string(), |r| r.to_string());
        rows.push(vec![gene.clone(), found]);
    }
    let mut out = stdout();
    write_aligned(&mut out, &["Query", "Result"], &rows)?;
    out.flush()?;
    Ok(())
}

fn run_pathway(args: &PathwayArgs) -> Result<()> {
    let db = PathwayDb::from_path(&args.json)
        .with_context(|| format!("Failed to load {}", args.json.display()))?;
    let mut out = stdout();
    match (&args.gene, args.pathway.as_deref()) {
        (Some(genes), _) => write_rows(&mut out, &db.lookup_genes(genes))?,
        (None, Some("?")) => {
            eprintln!("Valid pathways are:");
            for name in db.list() {
                writeln!(out, "\t{name}")?;
            }
        }
        (None, Some(pathway)) => {
            let genes = db.genes_in(pathway)?.to_vec();
            write_rows(&mut out, &[(pathway.to_string(), genes)])?;
        }
        (None, None) => bail!("Give --gene or --pathway"),
    }
    out.flush()?;
    Ok(())
}

fn run_index(args: &IndexArgs) -> Result<()> {
    let samtools = require_tool(SAMTOOLS)?;
    let report = index_bams(&samtools, &args.bams);
    info!(indexed = report.indexed, failed = report.failed.len(), "Indexing finished");
    if !report.failed.is_empty() {
        bail!("{} of {} BAM files could not be indexed", report.failed.len(), args.bams.len());
    }
    Ok(())
}

fn run_fetch(args: &FetchArgs) -> Result<()> {
    let samtools = require_tool(SAMTOOLS)?;
    let mut out = stdout();
    for region in &args.regions {
        let seq = fetch(&samtools, &args.reference, region, args.revcomp)?;
        let strand = if args.revcomp { " (reverse complement)" } else { "" };
        writeln!(out, ">{region}{strand}\n{seq}")?;
    }
    out.flush()?;
    Ok(())
}

fn run_clinvar(args: &ClinvarArgs) -> Result<()> {
    let mut json = String::new();
    open_text(&args.json)?.read_to_string(&mut json)?;
    let records = ClinvarParser::new(&args.assembly)?.parse(&json)?;
    info!(records = records.len(), "Parsed ClinVar summary");
    let delimiter = if args.csv { b',' } else { b'\t' };
    write_records(stdout(), &records, delimiter)?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract(args) => run_extract(&args),
        Command::Compare(args) => run_compare(&args),
        Command::Summary(args) => run_summary(&args),
        Command::Hgvs(args) => run_hgvs(&args),
        Command::Codon(args) => run_codon(&args),
        Command::Distance(args) => {
            let rows = distances(open_text(&args.counts)?)?;
            write_csv(stdout(), &rows)?;
            Ok(())
        }
        Command::Liftover(args) => run_liftover(&args),
        Command::Genes(args) => run_genes(&args),
        Command::Pathway(args) => run_pathway(&args),
        Command::Softclip(args) => {
            let reads = read_alignments(open_text(&args.alignments)?, &SOFTCLIP_TAGS)?;
            write_softclips(stdout(), &reads)?;
            Ok(())
        }
        Command::Tags(TagArgs { alignments, tag }) => {
            let reads = read_alignments(open_text(&alignments)?, &[tag.as_str()])?;
            let mut out = stdout();
            for value in tag_values(&reads, &tag) {
                writeln!(out, "{value}")?;
            }
            out.flush()?;
            Ok(())
        }
        Command::Index(args) => run_index(&args),
        Command::Fetch(args) => run_fetch(&args),
        Command::Clinvar(args) => run_clinvar(&args),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the thread pool")?;
    }

    run(cli)
}
