pub mod annotate;
pub mod domains;
pub mod tss;

use clap::Args;
use libgreat::{
    domain::DEFAULT_MIN_CHROMS, gene::read_genes, utils::open_maybe_gz, ChromLengths,
    ContigFilter, GeneLocation, GreatOptions, RegulatoryDomain,
};

use crate::file::InputFile;

/// Options shared by every command that computes regulatory domains.
#[derive(Debug, Args)]
pub struct DomainArgs {
    /// Tab separated gene table with contig, start, end, strand and gene_id
    /// columns, optionally gzipped
    #[clap(short, long)]
    pub genes: InputFile,

    /// Chromosome lengths: two column chrom.sizes, three column contigs.bed
    /// (optionally gzipped) or a samtools .fai index
    #[clap(short, long)]
    pub chrom_sizes: InputFile,

    /// Basal domain size upstream of the TSS
    #[clap(long, default_value_t = 5_000)]
    pub basal_up: u64,

    /// Basal domain size downstream of the TSS
    #[clap(long, default_value_t = 1_000)]
    pub basal_down: u64,

    /// Maximum extension beyond the basal domain in each direction
    #[clap(long, default_value_t = 1_000_000)]
    pub max_extension: u64,

    /// Only extend halfway to the neighbouring gene's TSS
    #[clap(long)]
    pub half: bool,

    /// Fail unless at least this many contigs with genes have a registered
    /// length
    #[clap(long, default_value_t = DEFAULT_MIN_CHROMS)]
    pub min_chroms: usize,

    /// Keep genes on mitochondrial and unplaced NT_ contigs
    #[clap(long)]
    pub keep_all_contigs: bool,
}

impl DomainArgs {
    pub fn options(&self) -> GreatOptions {
        let mut options = GreatOptions::default();
        options
            .basal_up(self.basal_up)
            .basal_down(self.basal_down)
            .max_extension(self.max_extension)
            .half(self.half)
            .min_chroms(self.min_chroms);
        options
    }

    pub fn filter(&self) -> ContigFilter {
        if self.keep_all_contigs {
            ContigFilter::keep_all()
        } else {
            ContigFilter::default()
        }
    }

    pub fn build(&self) -> eyre::Result<(Vec<GeneLocation>, Vec<RegulatoryDomain>)> {
        let genes = load_genes(&self.genes)?;
        let genes = self.filter().apply(genes);
        let chrom_lens = ChromLengths::from_path(&self.chrom_sizes)?;
        let options = self.options();
        log::debug!("Domain options: {options:?}");
        let domains = options.build_domains(&genes, &chrom_lens)?;
        Ok((genes, domains))
    }
}

pub fn load_genes(path: &InputFile) -> eyre::Result<Vec<GeneLocation>> {
    let reader = open_maybe_gz(path)?;
    Ok(read_genes(reader)?)
}
