//! # ionvcf
//!
//! Variant extraction for Ion Torrent VCFs (Torrent Variant Caller and Ion
//! Reporter), plus the small genome utilities that usually sit next to it.
//!
//! ## Features
//!
//! - Per-allele calls with flow-corrected (FAO/FDP) or read (AO/DP) VAFs
//! - Normalized variant keys for joining calls across files
//! - Decoding of the `FUNC` annotation block and Oncomine variant classes
//! - Single-pass selection by gene, hotspot ID, position and VAF
//! - Filter expressions over any call field, including `FUNC[*].gene`
//!
//! ## Example
//!
//! ```rust
//! use ionvcf::{Extractor, Selection};
//!
//! let vcf = concat!(
//!     "##INFO=<ID=FAO,Number=A,Type=Integer,Description=\"Flow alt\">\n",
//!     "##INFO=<ID=FDP,Number=1,Type=Integer,Description=\"Flow depth\">\n",
//!     "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tTumor\n",
//!     "chr7\t55259515\tCOSM6224\tT\tG\t900\tPASS\tFAO=250;FDP=1000;FUNC=[{'gene':'EGFR'}]\tGT\t0/1\n",
//!     "chr12\t25398284\t.\tC\tA\t500\tPASS\tFAO=4;FDP=400;FUNC=[{'gene':'KRAS'}]\tGT\t0/1\n",
//! );
//!
//! let selection = Selection::new().with_min_vaf(5.0);
//! let extraction = Extractor::new(selection).extract("fallback", vcf.as_bytes()).unwrap();
//!
//! assert_eq!(extraction.sample, "Tumor");
//! assert_eq!(extraction.calls.len(), 1);
//! assert_eq!(extraction.calls[0].gene(), Some("EGFR"));
//! ```
//!
//! ## Filter Expression Syntax
//!
//! ### Comparison Operators
//! - `==` Equal
//! - `!=` Not equal
//! - `>` `<` `>=` `<=` Ordering
//! - `contains` String containment
//! - `=~` Regular expression match
//!
//! ### Logical Operators
//! - `&&` Logical AND
//! - `||` Logical OR
//! - `!` Logical NOT
//!
//! ### Field Access
//! - `VAF`, `GENE`, `FUNCTION`, `PROTEIN` - Call fields
//! - `QUAL`, `FILTER`, `ID` - VCF columns
//! - `FDP` - Any INFO field, typed by its header definition
//! - `FSAF` - A FORMAT field of the sample, when INFO has no field of that name
//! - `FUNC[0].gene` - First annotation's gene
//! - `FUNC[*].oncomineVariantClass` - Any annotation's variant class
//!
//! ### Functions
//! - `exists(field)` - Check if a field exists

/// Embedded README.md documentation
const README: &str = include_str!("../README.md");

/// Returns the embedded README.md documentation.
///
/// # Example
///
/// ```rust
/// assert!(ionvcf::docs().contains("ionvcf extract"));
/// ```
pub fn docs() -> &'static str {
    README
}

pub mod allele;
pub mod call;
pub mod cli;
pub mod clinvar;
pub mod codon;
pub mod compare;
pub mod distance;
pub mod error;
pub mod eval;
pub mod extract;
pub mod filter;
pub mod func;
pub mod genes;
pub mod header;
pub mod hgvs;
pub mod liftover;
pub mod normalize;
pub mod pathway;
pub mod report;
pub mod row;
pub mod sam;
pub mod select;
pub mod summary;
pub mod tools;
pub mod vaf;
pub mod value;

pub use call::VariantCall;
pub use error::{IonVcfError, Result};
pub use extract::{ExtractStats, Extraction, Extractor};
pub use filter::{AccessPart, BinaryOp, Expr, UnaryOp, compile_filter};
pub use func::FuncAnnotation;
pub use header::{InfoField, InfoMap, InfoNumber, InfoType, VcfHeader};
pub use normalize::VariantKey;
pub use report::ReportFormat;
pub use row::VcfRow;
pub use select::{Loci, Locus, Selection};
pub use vaf::{AlleleCounts, CountSource};
pub use value::Value;
