use std::{io::BufWriter, path::PathBuf};

use clap::Parser;
use libgreat::{bed::write_tss, utils};

use super::load_genes;
use crate::file::InputFile;

#[derive(Parser, Debug)]
pub struct TssCmd {
    /// Tab separated gene table, same format as for great domains
    #[clap(short, long)]
    pub genes: InputFile,

    /// Output bed file, defaults to stdout if no argument provided.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

impl TssCmd {
    pub fn run(self) -> eyre::Result<()> {
        let genes = load_genes(&self.genes)?;
        let mut writer = BufWriter::new(utils::stdout_or_file(self.output.as_ref())?);
        write_tss(&mut writer, &genes)?;
        Ok(())
    }
}
