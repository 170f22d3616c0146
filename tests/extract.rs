use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;

use ionvcf::compare::compare;
use ionvcf::report::{ReportFormat, write_report};
use ionvcf::{Extractor, IonVcfError, Selection, compile_filter};

const HEADER: &str = "##fileformat=VCFv4.1\n\
##INFO=<ID=AO,Number=A,Type=Integer,Description=\"Alternate allele observations\">\n\
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total read depth\">\n\
##INFO=<ID=FAO,Number=A,Type=Integer,Description=\"Flow alternate observations\">\n\
##INFO=<ID=FDP,Number=1,Type=Integer,Description=\"Flow depth\">\n\
##INFO=<ID=FRO,Number=1,Type=Integer,Description=\"Flow reference observations\">\n\
##INFO=<ID=OID,Number=.,Type=String,Description=\"Original hotspot IDs\">\n\
##INFO=<ID=FUNC,Number=.,Type=String,Description=\"Functional annotations\">\n";

fn vcf(sample: &str, rows: &[&str]) -> String {
    let mut text = format!(
        "{HEADER}#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\t{sample}\n"
    );
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

const EGFR: &str = "chr7\t55259515\tCOSM6224\tT\tG\t900\tPASS\t\
FAO=250;FDP=1000;FRO=750;OID=COSM6224;\
FUNC=[{'gene':'EGFR','protein':'p.Leu858Arg','function':'missense','oncomineVariantClass':'Hotspot'}]\tGT\t0/1";

const KRAS: &str = "chr12\t25398284\t.\tC\tA,T\t500\tPASS\t\
FAO=40,4;FDP=400;FRO=356;\
FUNC=[{'origPos':'25398284','origRef':'C','origAlt':'A','gene':'KRAS','protein':'p.Gly12Val','function':'missense'},\
{'origPos':'25398284','origRef':'C','origAlt':'T','gene':'KRAS','protein':'p.Gly12Asp','function':'missense'}]\tGT\t0/1";

const TP53: &str = "chr17\t7577120\t.\tC\tT\t50\tPASS\tAO=30;DP=600;\
FUNC=[{'gene':'TP53','protein':'p.Arg273His','function':'missense'}]\tGT\t0/1";

fn write_plain(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(text.as_bytes()).unwrap();
    path
}

fn write_gz(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

#[test]
fn extracts_plain_and_gzipped_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_gz(dir.path(), "IonXpress_001.vcf.gz", &vcf("Tumor_A", &[EGFR, KRAS])),
        write_plain(dir.path(), "IonXpress_002.vcf", &vcf("Tumor_B", &[TP53])),
    ];

    let results = Extractor::default().extract_paths(&paths);
    let samples: Vec<String> = results
        .iter()
        .map(|r| r.as_ref().unwrap().sample.clone())
        .collect();
    assert_eq!(samples, vec!["Tumor_A", "Tumor_B"]);

    let first = results[0].as_ref().unwrap();
    assert_eq!(first.stats.rows, 2);
    assert_eq!(first.stats.alleles, 3);
    assert_eq!(first.calls[0].vaf(), Some(0.25));
    assert_eq!(first.calls[0].hotspot_ids, vec!["COSM6224"]);

    let second = results[1].as_ref().unwrap();
    assert_eq!(second.calls[0].vaf(), Some(0.05));
}

#[test]
fn selection_and_expression_combine() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "run.vcf", &vcf("S1", &[EGFR, KRAS, TP53]));

    let selection = Selection::new()
        .with_min_vaf(2.0)
        .with_expression(compile_filter(r#"FUNCTION == "missense" && GENE != "TP53""#).unwrap());
    let extraction = Extractor::new(selection).extract_path(&path).unwrap();

    let keys: Vec<String> = extraction.calls.iter().map(|c| c.key.to_string()).collect();
    assert_eq!(keys, vec!["chr7:55259515:T:G", "chr12:25398284:C:A"]);
    assert_eq!(extraction.stats.kept, 2);
}

#[test]
fn genes_and_ovat_selection() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(dir.path(), "run.vcf", &vcf("S1", &[EGFR, KRAS, TP53]));

    let by_gene = Extractor::new(Selection::new().with_genes(["kras", "tp53"]))
        .extract_path(&path)
        .unwrap();
    assert_eq!(by_gene.calls.len(), 3);

    let ovat = Extractor::new(Selection::new().with_ovat_only(true))
        .extract_path(&path)
        .unwrap();
    assert_eq!(ovat.calls.len(), 1);
    assert_eq!(ovat.calls[0].gene(), Some("EGFR"));
}

#[test]
fn malformed_rows_are_skipped_and_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(
        dir.path(),
        "broken.vcf",
        &vcf("S1", &[EGFR, "chr7\t55259515\t.", TP53]),
    );
    let extraction = Extractor::default().extract_path(&path).unwrap();
    assert_eq!(extraction.stats.rows, 3);
    assert_eq!(extraction.stats.skipped_rows, 1);
    assert_eq!(extraction.calls.len(), 2);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Extractor::default().extract_path(dir.path().join("absent.vcf"));
    assert!(matches!(result, Err(IonVcfError::Io(_))));
}

#[test]
fn json_report_and_comparison() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_plain(dir.path(), "a.vcf", &vcf("A", &[EGFR, KRAS]));
    let b = write_plain(dir.path(), "b.vcf", &vcf("B", &[EGFR, TP53]));
    let extractor = Extractor::default();
    let a = extractor.extract_path(&a).unwrap();
    let b = extractor.extract_path(&b).unwrap();

    let comparison = compare(&a.calls, &b.calls);
    assert_eq!(comparison.shared.len(), 1);
    assert_eq!(comparison.only_a.len(), 2);
    assert_eq!(comparison.only_b.len(), 1);

    let mut out = Vec::new();
    write_report(&mut out, &[a], ReportFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json[0]["sample"], "A");
    assert_eq!(json[0]["stats"]["kept"], 3);
}

#[test]
fn filter_reads_sample_format_fields() {
    let dir = tempfile::tempdir().unwrap();
    let header = HEADER.to_string()
        + "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
##FORMAT=<ID=FSAF,Number=A,Type=Integer,Description=\"Flow forward alt observations\">\n";
    let text = format!(
        "{header}#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n\
chr12\t25398284\t.\tC\tA,T\t500\tPASS\tFAO=40,4;FDP=400\tGT:FSAF\t0/1:25,1\n"
    );
    let path = write_plain(dir.path(), "format.vcf", &text);

    let selection = Selection::new().with_expression(compile_filter("FSAF > 10").unwrap());
    let extraction = Extractor::new(selection).extract_path(&path).unwrap();
    let keys: Vec<String> = extraction.calls.iter().map(|c| c.key.to_string()).collect();
    assert_eq!(keys, vec!["chr12:25398284:C:A"]);
}
