use std::io::Write;

use crate::{domain::RegulatoryDomain, error::Result, gene::GeneLocation};

fn to_bed_line(domain: &RegulatoryDomain) -> String {
    let contig = domain.contig();
    let start = domain.start();
    let end = domain.end();
    let gene_id = domain.gene_id();
    format!("{contig}\t{start}\t{end}\t{gene_id}")
}

/// Write regulatory domains as a headerless four column bed file.
pub fn write_domains<W: Write>(writer: &mut W, domains: &[RegulatoryDomain]) -> Result<()> {
    for domain in domains {
        writeln!(writer, "{}", to_bed_line(domain))?;
    }
    writer.flush()?;
    log::info!("Wrote {} regulatory domains", domains.len());
    Ok(())
}

/// Write a two base window around each gene's TSS.
pub fn write_tss<W: Write>(writer: &mut W, genes: &[GeneLocation]) -> Result<()> {
    for gene in genes {
        let tss = gene.tss();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            gene.contig(),
            tss.saturating_sub(1),
            tss + 1,
            gene.gene_id()
        )?;
    }
    writer.flush()?;
    Ok(())
}
