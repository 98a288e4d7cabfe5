use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GreatError {
    #[error("Not enough chromosome ends registered: found {found}, need at least {required}")]
    InsufficientChromosomeData { found: usize, required: usize },
    #[error("Strand not understood: {0:?}, expected one of +, -, 1, -1")]
    UnrecognizedStrand(String),
    #[error("No chromosome length registered for contig {0}")]
    MissingChromosomeLength(String),
    #[error("Gene {gene_id} ends ({end}) before it starts ({start})")]
    InvertedGene { gene_id: String, start: u64, end: u64 },
    #[error("Malformed line {line} in chromosome length table: {reason}")]
    MalformedChromLengths { line: usize, reason: String },
    #[error("Malformed peak on line {line}: {reason}")]
    MalformedPeak { line: usize, reason: String },
    #[error("Could not read fasta index: {0}")]
    FastaIndex(String),
    #[error("Gene table is missing the {0} column")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, GreatError>;
