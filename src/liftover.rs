//! Coordinate liftover with UCSC chain files.
//!
//! A chain section opens with
//!
//! ```text
//! chain score tName tSize tStrand tStart tEnd qName qSize qStrand qStart qEnd id
//! ```
//!
//! followed by `size dt dq` alignment lines and a final `size` line. All
//! coordinates are 0-based half-open; query coordinates on the `-` strand
//! count from the end of the query sequence.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{IonVcfError, Result};
use crate::extract::open_input;
use crate::select::{Locus, bare_chrom};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

/// One ungapped block: `size` bases starting at `target` and `query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    target: u64,
    query: u64,
    size: u64,
}

#[derive(Debug, Clone)]
struct Chain {
    score: f64,
    target_start: u64,
    target_end: u64,
    query_name: String,
    query_size: u64,
    query_strand: Strand,
    blocks: Vec<Block>,
}

impl Chain {
    /// Map a 0-based target offset; `None` inside a gap.
    fn map(&self, offset: u64) -> Option<u64> {
        if offset < self.target_start || offset >= self.target_end {
            return None;
        }
        let idx = self.blocks.partition_point(|b| b.target <= offset);
        let block = self.blocks.get(idx.checked_sub(1)?)?;
        if offset >= block.target + block.size {
            return None;
        }
        let query = block.query + (offset - block.target);
        Some(match self.query_strand {
            Strand::Forward => query,
            Strand::Reverse => self.query_size.checked_sub(query + 1)?,
        })
    }
}

/// A lifted position, 1-based like the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lifted {
    pub chrom: String,
    pub pos: u64,
    pub strand: Strand,
    pub score: f64,
}

/// Chains indexed by target chromosome.
#[derive(Debug, Default)]
pub struct ChainMap {
    chains: HashMap<String, Vec<Chain>>,
}

fn chain_error(line: usize, message: impl Into<String>) -> IonVcfError {
    IonVcfError::ChainParseError {
        line,
        message: message.into(),
    }
}

fn number<T: std::str::FromStr>(field: &str, what: &str, line: usize) -> Result<T> {
    field
        .parse()
        .map_err(|_| chain_error(line, format!("invalid {what} '{field}'")))
}

fn strand(field: &str, line: usize) -> Result<Strand> {
    match field {
        "+" => Ok(Strand::Forward),
        "-" => Ok(Strand::Reverse),
        other => Err(chain_error(line, format!("invalid strand '{other}'"))),
    }
}

/// A chain being read, with the cursor of the next block.
struct Open {
    target_name: String,
    target_size: u64,
    chain: Chain,
    target: u64,
    query: u64,
    query_end: u64,
}

impl ChainMap {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(open_input(path.as_ref())?)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut map = ChainMap::default();
        let mut open: Option<Open> = None;
        let mut line_no = 0;

        for line in reader.lines() {
            line_no += 1;
            let line = line?;
            let fields: Vec<&str> = line.split_whitespace().collect();

            match fields.as_slice() {
                [] => continue,
                [first, ..] if first.starts_with('#') => continue,
                ["chain", rest @ ..] => {
                    if open.is_some() {
                        return Err(chain_error(line_no, "previous chain has no closing block"));
                    }
                    let [score, t_name, t_size, t_strand, t_start, t_end, q_name, q_size, q_strand, q_start, q_end, ..] =
                        rest
                    else {
                        return Err(chain_error(line_no, "chain header needs 12 fields"));
                    };
                    if strand(t_strand, line_no)? != Strand::Forward {
                        return Err(chain_error(line_no, "target strand must be '+'"));
                    }
                    let target_start = number(t_start, "tStart", line_no)?;
                    let query_start = number(q_start, "qStart", line_no)?;
                    open = Some(Open {
                        target_name: t_name.to_string(),
                        target_size: number(t_size, "tSize", line_no)?,
                        chain: Chain {
                            score: number(score, "score", line_no)?,
                            target_start,
                            target_end: number(t_end, "tEnd", line_no)?,
                            query_name: q_name.to_string(),
                            query_size: number(q_size, "qSize", line_no)?,
                            query_strand: strand(q_strand, line_no)?,
                            blocks: Vec::new(),
                        },
                        target: target_start,
                        query: query_start,
                        query_end: number(q_end, "qEnd", line_no)?,
                    });
                }
                [size, gaps @ ..] => {
                    let Some(current) = open.as_mut() else {
                        return Err(chain_error(line_no, "alignment line outside a chain"));
                    };
                    let size: u64 = number(size, "block size", line_no)?;
                    current.chain.blocks.push(Block {
                        target: current.target,
                        query: current.query,
                        size,
                    });
                    current.target += size;
                    current.query += size;

                    match gaps {
                        [dt, dq] => {
                            current.target += number::<u64>(dt, "dt", line_no)?;
                            current.query += number::<u64>(dq, "dq", line_no)?;
                        }
                        [] => {
                            let Some(done) = open.take() else {
                                continue;
                            };
                            map.close(done, line_no)?;
                        }
                        _ => return Err(chain_error(line_no, "alignment line needs 1 or 3 fields")),
                    }
                }
            }
        }

        if open.is_some() {
            return Err(chain_error(line_no, "file ends inside a chain"));
        }
        for chains in map.chains.values_mut() {
            chains.sort_by(|a, b| b.score.total_cmp(&a.score));
        }
        debug!(chromosomes = map.chains.len(), "Loaded chain file");
        Ok(map)
    }

    fn close(&mut self, done: Open, line_no: usize) -> Result<()> {
        if done.target != done.chain.target_end || done.query != done.query_end {
            return Err(chain_error(
                line_no,
                format!(
                    "blocks end at {}/{}, header says {}/{}",
                    done.target, done.query, done.chain.target_end, done.query_end
                ),
            ));
        }
        if done.chain.target_end > done.target_size || done.query_end > done.chain.query_size {
            return Err(chain_error(
                line_no,
                format!(
                    "chain ends at {}/{}, past sequence sizes {}/{}",
                    done.chain.target_end, done.query_end, done.target_size, done.chain.query_size
                ),
            ));
        }
        self.chains.entry(done.target_name).or_default().push(done.chain);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Chains for `chrom`, accepting names with or without `chr`.
    fn chains_for(&self, chrom: &str) -> &[Chain] {
        if let Some(chains) = self.chains.get(chrom) {
            return chains;
        }
        let bare = bare_chrom(chrom);
        self.chains
            .iter()
            .find(|(name, _)| bare_chrom(name) == bare)
            .map(|(_, chains)| chains.as_slice())
            .unwrap_or(&[])
    }

    /// Every mapping of a 1-based position, best chain first.
    pub fn lift(&self, locus: &Locus) -> Vec<Lifted> {
        let Some(offset) = locus.pos.checked_sub(1) else {
            return Vec::new();
        };
        self.chains_for(&locus.chrom)
            .iter()
            .filter_map(|chain| {
                chain.map(offset).map(|q| Lifted {
                    chrom: chain.query_name.clone(),
                    pos: q + 1,
                    strand: chain.query_strand,
                    score: chain.score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // chr1:0-100 maps to chr1:1000-1100 with a 10 base deletion in the query
    // at 50; chr2:0-20 maps reversed onto chr3 (size 100) at 10-30.
    const CHAINS: &str = "chain 1000 chr1 5000 + 0 100 chr1 6000 + 1000 1090 1\n\
50\t10\t0\n\
40\n\
\n\
chain 500 chr2 300 + 0 20 chr3 100 - 10 30 2\n\
20\n";

    fn map() -> ChainMap {
        ChainMap::from_reader(CHAINS.as_bytes()).unwrap()
    }

    fn lift(map: &ChainMap, query: &str) -> Option<(String, u64)> {
        map.lift(&query.parse().unwrap())
            .into_iter()
            .next()
            .map(|l| (l.chrom, l.pos))
    }

    #[test]
    fn test_forward_blocks() {
        let map = map();
        assert_eq!(lift(&map, "chr1:1"), Some(("chr1".to_string(), 1001)));
        assert_eq!(lift(&map, "chr1:50"), Some(("chr1".to_string(), 1050)));
        // Inside the target gap.
        assert_eq!(lift(&map, "chr1:55"), None);
        assert_eq!(lift(&map, "chr1:61"), Some(("chr1".to_string(), 1051)));
        assert_eq!(lift(&map, "chr1:100"), Some(("chr1".to_string(), 1090)));
        assert_eq!(lift(&map, "chr1:101"), None);
    }

    #[test]
    fn test_reverse_strand() {
        let map = map();
        let lifted = map.lift(&"chr2:1".parse().unwrap());
        assert_eq!(lifted[0].strand, Strand::Reverse);
        // Offset 0 -> query offset 10 on the reverse strand -> 100 - 1 - 10.
        assert_eq!(lifted[0].pos, 90);
        assert_eq!(lift(&map, "chr2:20"), Some(("chr3".to_string(), 71)));
    }

    #[test]
    fn test_reverse_block_past_query_end() {
        let chain = Chain {
            score: 1.0,
            target_start: 0,
            target_end: 10,
            query_name: "chr2".to_string(),
            query_size: 5,
            query_strand: Strand::Reverse,
            blocks: vec![Block {
                target: 0,
                query: 0,
                size: 10,
            }],
        };
        assert_eq!(chain.map(0), Some(4));
        assert_eq!(chain.map(4), Some(0));
        assert_eq!(chain.map(5), None);
    }

    #[test]
    fn test_chr_prefix_is_optional() {
        assert_eq!(lift(&map(), "1:1"), Some(("chr1".to_string(), 1001)));
        assert_eq!(lift(&map(), "chrX:1"), None);
    }

    #[test]
    fn test_malformed_chains() {
        let truncated = "chain 1 chr1 10 + 0 10 chr1 10 + 0 10 1\n5\t0\t0\n";
        assert!(matches!(
            ChainMap::from_reader(truncated.as_bytes()),
            Err(IonVcfError::ChainParseError { .. })
        ));

        let short_header = "chain 1 chr1 10 +\n10\n";
        assert!(ChainMap::from_reader(short_header.as_bytes()).is_err());

        let wrong_total = "chain 1 chr1 10 + 0 10 chr1 10 + 0 10 1\n8\n";
        assert!(ChainMap::from_reader(wrong_total.as_bytes()).is_err());

        let orphan = "10\n";
        assert!(ChainMap::from_reader(orphan.as_bytes()).is_err());

        let past_query = "chain 1 chr1 100 + 0 10 chr2 5 - 0 10 1\n10\n";
        assert!(matches!(
            ChainMap::from_reader(past_query.as_bytes()),
            Err(IonVcfError::ChainParseError { line: 2, .. })
        ));

        let past_target = "chain 1 chr1 5 + 0 10 chr2 100 + 0 10 1\n10\n";
        assert!(ChainMap::from_reader(past_target.as_bytes()).is_err());
    }
}
