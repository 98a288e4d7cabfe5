//! Assign peaks to the genes whose regulatory domains they fall in.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord};
use fnv::FnvHashMap;
use itertools::Itertools;

use crate::{
    domain::RegulatoryDomain,
    error::{GreatError, Result},
    gene::GeneLocation,
    strand::Strand,
};

const HEADER: [&str; 7] = [
    "contig",
    "peak_start",
    "peak_end",
    "peak_id",
    "gene_id",
    "tss",
    "dist2peak",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peak {
    contig: String,
    start: u64,
    end: u64,
    name: String,
}

impl Peak {
    pub fn new<S: Into<String>>(contig: S, start: u64, end: u64, name: Option<String>) -> Self {
        let contig = contig.into();
        let name = name.unwrap_or_else(|| format!("{contig}:{start}-{end}"));
        Self {
            contig,
            start,
            end,
            name,
        }
    }

    pub fn centre(&self) -> u64 {
        (self.start + self.end) / 2
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeakAnnotation {
    pub contig: String,
    pub peak_start: u64,
    pub peak_end: u64,
    pub peak_id: String,
    pub gene_id: String,
    pub tss: u64,
    /// Distance from the peak centre to the TSS, positive when the peak lies
    /// upstream of the gene.
    pub dist2peak: i64,
}

/// Read peaks from a bed file, keeping the first four columns.
pub fn read_peaks<R: Read>(reader: R) -> Result<Vec<Peak>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut peaks = Vec::new();
    let mut record = StringRecord::new();
    let mut line = 0;
    while reader.read_record(&mut record)? {
        line += 1;
        if record[0].starts_with("track") || record[0].starts_with("browser") {
            continue;
        }
        if record.len() < 3 {
            return Err(GreatError::MalformedPeak {
                line,
                reason: format!("expected at least 3 columns, found {}", record.len()),
            });
        }
        let coord = |s: &str| {
            s.trim().parse::<u64>().map_err(|_| GreatError::MalformedPeak {
                line,
                reason: format!("{s:?} is not a valid coordinate"),
            })
        };
        let start = coord(&record[1])?;
        let end = coord(&record[2])?;
        if end < start {
            return Err(GreatError::MalformedPeak {
                line,
                reason: format!("peak ends ({end}) before it starts ({start})"),
            });
        }
        let name = record.get(3).map(|s| s.to_string());
        peaks.push(Peak::new(&record[0], start, end, name));
    }
    log::info!("Read {} peaks", peaks.len());
    Ok(peaks)
}

struct ContigDomains<'a> {
    // Sorted by start
    domains: Vec<&'a RegulatoryDomain>,
    longest: u64,
}

impl<'a> ContigDomains<'a> {
    fn overlapping(&self, start: u64, end: u64) -> impl Iterator<Item = &'a RegulatoryDomain> + '_ {
        let lower = self
            .domains
            .partition_point(|d| d.start() + self.longest <= start);
        let upper = self.domains.partition_point(|d| d.start() < end);
        self.domains[lower..upper.max(lower)]
            .iter()
            .copied()
            .filter(move |d| d.end() > start)
    }
}

/// Report every peak once for each regulatory domain it overlaps.
pub fn annotate_peaks(
    peaks: &[Peak],
    domains: &[RegulatoryDomain],
    genes: &[GeneLocation],
) -> Vec<PeakAnnotation> {
    let mut gene_lookup: FnvHashMap<(&str, &str), Vec<&GeneLocation>> = FnvHashMap::default();
    for gene in genes {
        gene_lookup
            .entry((gene.contig(), gene.gene_id()))
            .or_default()
            .push(gene);
    }

    let mut by_contig: FnvHashMap<&str, ContigDomains> = FnvHashMap::default();
    for domain in domains {
        let entry = by_contig
            .entry(domain.contig())
            .or_insert_with(|| ContigDomains {
                domains: Vec::new(),
                longest: 0,
            });
        entry.longest = entry.longest.max(domain.end() - domain.start());
        entry.domains.push(domain);
    }
    for contig in by_contig.values_mut() {
        contig.domains.sort_by_key(|d| d.start());
    }

    let mut annotations = Vec::new();
    for peak in peaks {
        let Some(contig) = by_contig.get(peak.contig.as_str()) else {
            continue;
        };
        for domain in contig.overlapping(peak.start, peak.end) {
            let Some(gene) = gene_lookup
                .get(&(domain.contig(), domain.gene_id()))
                .and_then(|loci| owning_gene(domain, loci))
            else {
                log::warn!("No gene record for domain of {}", domain.gene_id());
                continue;
            };
            let tss = gene.tss() as i64;
            let centre = peak.centre() as i64;
            let dist2peak = match gene.strand() {
                Strand::Forward => tss - centre,
                Strand::Reverse => centre - tss,
            };
            annotations.push(PeakAnnotation {
                contig: peak.contig.clone(),
                peak_start: peak.start,
                peak_end: peak.end,
                peak_id: peak.name.clone(),
                gene_id: domain.gene_id().to_string(),
                tss: gene.tss(),
                dist2peak,
            });
        }
    }
    log::info!(
        "Assigned {} peak-gene pairs from {} peaks",
        annotations.len(),
        peaks.len()
    );
    annotations
}

/// Pick the record a domain was built from when a gene id occurs at more than
/// one locus: a domain always contains its own TSS.
fn owning_gene<'g>(
    domain: &RegulatoryDomain,
    loci: &[&'g GeneLocation],
) -> Option<&'g GeneLocation> {
    if let [gene] = loci {
        return Some(*gene);
    }
    let mut inside = loci
        .iter()
        .copied()
        .filter(|g| (domain.start()..=domain.end()).contains(&g.tss()));
    let gene = inside.next();
    if inside.next().is_some() {
        log::warn!(
            "{} has several loci inside its domain on {}, using the first",
            domain.gene_id(),
            domain.contig()
        );
    }
    gene
}

/// Keep only the gene closest to each peak centre, the earliest reported one
/// on ties.
pub fn closest_genes(annotations: Vec<PeakAnnotation>) -> Vec<PeakAnnotation> {
    let mut closest = Vec::new();
    let groups = annotations.into_iter().group_by(|a| {
        (
            a.contig.clone(),
            a.peak_start,
            a.peak_end,
            a.peak_id.clone(),
        )
    });
    for (_, group) in &groups {
        if let Some(nearest) = group.min_by_key(|a| a.dist2peak.unsigned_abs()) {
            closest.push(nearest);
        }
    }
    log::info!("Kept the closest gene for {} peaks", closest.len());
    closest
}

pub fn write_annotations<W: Write>(writer: &mut W, annotations: &[PeakAnnotation]) -> Result<()> {
    writeln!(writer, "{}", HEADER.iter().join("\t"))?;
    for a in annotations {
        writeln!(
            writer,
            "{}",
            [
                a.contig.clone(),
                a.peak_start.to_string(),
                a.peak_end.to_string(),
                a.peak_id.clone(),
                a.gene_id.clone(),
                a.tss.to_string(),
                a.dist2peak.to_string(),
            ]
            .iter()
            .join("\t")
        )?;
    }
    writer.flush()?;
    Ok(())
}
