use std::{io::BufWriter, path::PathBuf};

use clap::Parser;
use libgreat::{bed::write_domains, utils};

use super::DomainArgs;

#[derive(Parser, Debug)]
pub struct DomainsCmd {
    #[clap(flatten)]
    pub domain: DomainArgs,

    /// Output bed file, defaults to stdout if no argument provided.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

impl DomainsCmd {
    pub fn run(self) -> eyre::Result<()> {
        let (_, domains) = self.domain.build()?;
        let mut writer = BufWriter::new(utils::stdout_or_file(self.output.as_ref())?);
        write_domains(&mut writer, &domains)?;
        Ok(())
    }
}
