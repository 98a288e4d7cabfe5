//! Lengths of each chromosome in the genome assembly, used to keep regulatory
//! domains from running past the ends of a contig.

use std::{io::Read, path::Path};

use bio::io::fasta::Index;
use csv::{ReaderBuilder, StringRecord};
use fnv::FnvHashMap;

use crate::{
    error::{GreatError, Result},
    utils::open_maybe_gz,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChromLengths(FnvHashMap<String, u64>);

impl ChromLengths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load chromosome lengths, choosing the format from the file name.
    ///
    /// `.fai` files are read as samtools faidx indexes. Everything else is a
    /// tab separated table, optionally gzipped, with either `contig length`
    /// or `contig start end` rows.
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let chrom_lens = if path.extension().and_then(|s| s.to_str()) == Some("fai") {
            let index = Index::from_file(&path)
                .map_err(|e| GreatError::FastaIndex(e.to_string()))?;
            Self::from_index(&index)
        } else {
            Self::from_reader(open_maybe_gz(path)?)?
        };
        log::info!(
            "Loaded {} chromosome lengths from {}",
            chrom_lens.len(),
            path.display()
        );
        Ok(chrom_lens)
    }

    pub fn from_index(index: &Index) -> Self {
        index
            .sequences()
            .into_iter()
            .map(|sequence| (sequence.name, sequence.len))
            .collect()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut chrom_lens = ChromLengths::new();
        let mut record = StringRecord::new();
        let mut line = 0;
        while reader.read_record(&mut record)? {
            line += 1;
            if record.len() == 1 && record[0].trim().is_empty() {
                continue;
            }
            let (contig, length) = parse_row(&record).map_err(|reason| {
                GreatError::MalformedChromLengths { line, reason }
            })?;
            if let Some(old) = chrom_lens.insert(contig, length) {
                log::warn!("Chromosome length registered twice, replacing {old} with {length}");
            }
        }
        Ok(chrom_lens)
    }

    pub fn insert<S: Into<String>>(&mut self, contig: S, length: u64) -> Option<u64> {
        self.0.insert(contig.into(), length)
    }

    pub fn get(&self, contig: &str) -> Option<u64> {
        self.0.get(contig).copied()
    }

    pub fn contains(&self, contig: &str) -> bool {
        self.0.contains_key(contig)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for ChromLengths {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn parse_row(record: &StringRecord) -> std::result::Result<(String, u64), String> {
    let parse = |s: &str| {
        s.trim()
            .parse::<u64>()
            .map_err(|_| format!("{s:?} is not a valid coordinate"))
    };
    match record.len() {
        // contigs.bed: contig, start, end
        3 => Ok((record[0].to_string(), parse(&record[2])?)),
        2 => Ok((record[0].to_string(), parse(&record[1])?)),
        n => Err(format!("expected 2 or 3 columns, found {n}")),
    }
}
