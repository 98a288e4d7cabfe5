//! Gene footprints read from a gene set export, one record per gene.

use std::io::Read;

use csv::ReaderBuilder;
use fnv::FnvHashSet;
use serde::Deserialize;

use crate::{
    error::{GreatError, Result},
    strand::Strand,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneLocation {
    contig: String,
    start: u64,
    end: u64,
    strand: Strand,
    gene_id: String,
}

impl GeneLocation {
    pub fn new<S, T>(contig: S, start: u64, end: u64, strand: Strand, gene_id: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            contig: contig.into(),
            start,
            end,
            strand,
            gene_id: gene_id.into(),
        }
    }

    /// Build a location from untyped fields, rejecting unknown strand tokens
    /// and genes that end before they start.
    pub fn try_new<S, T>(contig: S, start: u64, end: u64, strand: &str, gene_id: T) -> Result<Self>
    where
        S: Into<String>,
        T: Into<String>,
    {
        let strand = strand.parse::<Strand>()?;
        let gene = Self::new(contig, start, end, strand, gene_id);
        gene.validate()?;
        Ok(gene)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.end < self.start {
            Err(GreatError::InvertedGene {
                gene_id: self.gene_id.clone(),
                start: self.start,
                end: self.end,
            })
        } else {
            Ok(())
        }
    }

    pub fn contig(&self) -> &str {
        &self.contig
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn gene_id(&self) -> &str {
        &self.gene_id
    }

    /// Transcription start site, the end coordinate for reverse strand genes.
    pub fn tss(&self) -> u64 {
        match self.strand {
            Strand::Forward => self.start,
            Strand::Reverse => self.end,
        }
    }
}

#[derive(Deserialize)]
struct GeneRow {
    contig: String,
    start: u64,
    end: u64,
    strand: String,
    gene_id: String,
}

const REQUIRED_COLUMNS: [&str; 5] = ["contig", "start", "end", "strand", "gene_id"];

/// Read a tab separated gene table with a header row.
///
/// Columns are matched by name so exports carrying extra fields such as
/// `gene_name` work unchanged. Repeated identical records are only kept once.
pub fn read_genes<R: Read>(reader: R) -> Result<Vec<GeneLocation>> {
    let mut reader = ReaderBuilder::new().delimiter(b'\t').from_reader(reader);
    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(GreatError::MissingColumn(column));
        }
    }

    let mut seen = FnvHashSet::default();
    let mut genes = Vec::new();
    for row in reader.deserialize() {
        let row: GeneRow = row?;
        let gene = GeneLocation::try_new(row.contig, row.start, row.end, &row.strand, row.gene_id)?;
        if seen.insert(gene.clone()) {
            genes.push(gene);
        } else {
            log::debug!("Skipping duplicate record for {}", gene.gene_id());
        }
    }
    log::info!("Read {} gene locations", genes.len());
    Ok(genes)
}

/// Drops contigs that should not get regulatory domains: unplaced `NT_`
/// scaffolds and the mitochondrial genome.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContigFilter {
    keep_all: bool,
}

impl ContigFilter {
    pub fn keep_all() -> Self {
        Self { keep_all: true }
    }

    pub fn keeps(&self, contig: &str) -> bool {
        if self.keep_all {
            return true;
        }
        let name = contig.strip_prefix("chr").unwrap_or(contig);
        !(name.starts_with("NT") || name == "M" || name == "MT")
    }

    pub fn apply(&self, genes: Vec<GeneLocation>) -> Vec<GeneLocation> {
        let before = genes.len();
        let genes: Vec<_> = genes.into_iter().filter(|g| self.keeps(g.contig())).collect();
        if genes.len() < before {
            log::info!("Filtered out {} genes on excluded contigs", before - genes.len());
        }
        genes
    }
}
