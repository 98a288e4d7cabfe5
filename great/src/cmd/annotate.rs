use std::{io::BufWriter, path::PathBuf};

use clap::Parser;
use libgreat::{
    annotate::{annotate_peaks, closest_genes, read_peaks, write_annotations},
    utils,
};

use super::DomainArgs;
use crate::file::InputFile;

#[derive(Parser, Debug)]
pub struct AnnotateCmd {
    #[clap(flatten)]
    pub domain: DomainArgs,

    /// Peaks in bed format, the fourth column is used as the peak id
    #[clap(short, long)]
    pub peaks: InputFile,

    /// Only report the gene whose TSS is closest to each peak centre
    #[clap(long)]
    pub closest: bool,

    /// Output table, defaults to stdout if no argument provided.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

impl AnnotateCmd {
    pub fn run(self) -> eyre::Result<()> {
        let (genes, domains) = self.domain.build()?;
        let peaks = read_peaks(utils::open_maybe_gz(&self.peaks)?)?;
        let mut annotations = annotate_peaks(&peaks, &domains, &genes);
        if self.closest {
            annotations = closest_genes(annotations);
        }
        let mut writer = BufWriter::new(utils::stdout_or_file(self.output.as_ref())?);
        write_annotations(&mut writer, &annotations)?;
        Ok(())
    }
}
