//! GREAT regulatory domains.
//!
//! Each gene is assigned a basal regulatory domain a minimum distance upstream
//! and downstream of its TSS, regardless of other nearby genes. The domain is
//! then extended in both directions toward the neighbouring genes, but no more
//! than the maximum extension in either direction. Neighbours stop the
//! extension at their own basal domain, or at the midpoint between the two
//! TSSs when only half the distance may be claimed.

use fnv::FnvHashMap;
use rayon::prelude::*;

use crate::{
    chrom::ChromLengths,
    error::{GreatError, Result},
    gene::GeneLocation,
    strand::Strand,
};

/// Number of chromosomes expected in a usable length table, enough to cover
/// the human autosomes plus a couple of sex chromosomes.
pub const DEFAULT_MIN_CHROMS: usize = 21;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegulatoryDomain {
    contig: String,
    start: u64,
    end: u64,
    gene_id: String,
}

impl RegulatoryDomain {
    pub fn new<S, T>(contig: S, start: u64, end: u64, gene_id: T) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            contig: contig.into(),
            start,
            end,
            gene_id: gene_id.into(),
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

    pub fn gene_id(&self) -> &str {
        &self.gene_id
    }
}

#[derive(Debug, Clone)]
pub struct GreatOptions {
    basal_up: u64,
    basal_down: u64,
    max_extension: u64,
    half: bool,
    min_chroms: usize,
}

impl Default for GreatOptions {
    fn default() -> Self {
        Self {
            basal_up: 5_000,
            basal_down: 1_000,
            max_extension: 1_000_000,
            half: false,
            min_chroms: DEFAULT_MIN_CHROMS,
        }
    }
}

impl GreatOptions {
    pub fn basal_up(&mut self, basal_up: u64) -> &mut Self {
        self.basal_up = basal_up;
        self
    }

    pub fn basal_down(&mut self, basal_down: u64) -> &mut Self {
        self.basal_down = basal_down;
        self
    }

    pub fn max_extension(&mut self, max_extension: u64) -> &mut Self {
        self.max_extension = max_extension;
        self
    }

    /// Only extend halfway to the neighbouring gene's TSS.
    pub fn half(&mut self, half: bool) -> &mut Self {
        self.half = half;
        self
    }

    /// Minimum number of referenced contigs that must have a registered
    /// length, guards against a truncated chromosome length table.
    pub fn min_chroms(&mut self, min_chroms: usize) -> &mut Self {
        self.min_chroms = min_chroms;
        self
    }

    /// Compute one regulatory domain per gene.
    ///
    /// Domains are grouped by contig, in the order each contig is first seen,
    /// and sorted by TSS within a contig. Genes sharing a TSS keep their input
    /// order.
    pub fn build_domains(
        &self,
        genes: &[GeneLocation],
        chrom_lens: &ChromLengths,
    ) -> Result<Vec<RegulatoryDomain>> {
        for gene in genes {
            gene.validate()?;
        }

        let contigs = group_by_contig(genes);
        let registered = contigs
            .iter()
            .filter(|(contig, _)| chrom_lens.contains(contig))
            .count();
        if registered < self.min_chroms {
            return Err(GreatError::InsufficientChromosomeData {
                found: registered,
                required: self.min_chroms,
            });
        }

        let mut bounded = Vec::with_capacity(contigs.len());
        for (contig, genes) in contigs {
            let contig_len = chrom_lens
                .get(contig)
                .ok_or_else(|| GreatError::MissingChromosomeLength(contig.to_string()))?;
            bounded.push((contig, contig_len, genes));
        }

        log::info!(
            "Building regulatory domains for {} genes across {} contigs",
            genes.len(),
            bounded.len()
        );

        let domains: Vec<Vec<RegulatoryDomain>> = bounded
            .into_par_iter()
            .map(|(contig, contig_len, genes)| self.contig_domains(contig, contig_len, genes))
            .collect();
        Ok(domains.into_iter().flatten().collect())
    }

    fn basal(&self, tss: i128, strand: Strand) -> (i128, i128) {
        let (up, down) = (self.basal_up as i128, self.basal_down as i128);
        match strand {
            Strand::Forward => (tss - up, tss + down),
            Strand::Reverse => (tss - down, tss + up),
        }
    }

    fn contig_domains(
        &self,
        contig: &str,
        contig_len: u64,
        mut genes: Vec<&GeneLocation>,
    ) -> Vec<RegulatoryDomain> {
        genes.sort_by_key(|g| g.tss());
        log::debug!("{contig}: {} genes, length {contig_len}", genes.len());

        let sites: Vec<(i128, Strand)> = genes
            .iter()
            .map(|g| (g.tss() as i128, g.strand()))
            .collect();
        let contig_end = contig_len as i128;
        let max_ext = self.max_extension as i128;
        let last = sites.len() - 1;

        genes
            .iter()
            .enumerate()
            .map(|(i, gene)| {
                let (tss, strand) = sites[i];
                let (basal_start, basal_end) = self.basal(tss, strand);

                let front_stop = if i == 0 {
                    0
                } else if self.half {
                    midpoint(sites[i - 1].0, tss)
                } else {
                    let (prev_tss, prev_strand) = sites[i - 1];
                    self.basal(prev_tss, prev_strand).1
                };
                let back_stop = if i == last {
                    contig_end
                } else if self.half {
                    midpoint(tss, sites[i + 1].0)
                } else {
                    let (next_tss, next_strand) = sites[i + 1];
                    self.basal(next_tss, next_strand).0
                };

                // The basal window is kept even when a neighbour crowds it.
                let start = (basal_start - max_ext).max(front_stop).min(basal_start);
                let end = (basal_end + max_ext).min(back_stop).max(basal_end);

                RegulatoryDomain::new(
                    contig,
                    start.clamp(0, contig_end) as u64,
                    end.clamp(0, contig_end) as u64,
                    gene.gene_id(),
                )
            })
            .collect()
    }
}

/// Shorthand for [`GreatOptions::build_domains`].
pub fn build_domains(
    genes: &[GeneLocation],
    options: &GreatOptions,
    chrom_lens: &ChromLengths,
) -> Result<Vec<RegulatoryDomain>> {
    options.build_domains(genes, chrom_lens)
}

fn midpoint(a: i128, b: i128) -> i128 {
    (a + b).div_euclid(2)
}

fn group_by_contig(genes: &[GeneLocation]) -> Vec<(&str, Vec<&GeneLocation>)> {
    let mut order: FnvHashMap<&str, usize> = FnvHashMap::default();
    let mut groups: Vec<(&str, Vec<&GeneLocation>)> = Vec::new();
    for gene in genes {
        let idx = *order.entry(gene.contig()).or_insert_with(|| {
            groups.push((gene.contig(), Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(gene);
    }
    groups
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

    use super::*;

    fn opts(half: bool) -> GreatOptions {
        let mut options = GreatOptions::default();
        options.half(half).min_chroms(1);
        options
    }

    fn lens(xs: &[(&str, u64)]) -> ChromLengths {
        xs.iter().map(|&(c, l)| (c, l)).collect()
    }

    fn plus(contig: &str, start: u64, end: u64, id: &str) -> GeneLocation {
        GeneLocation::new(contig, start, end, Strand::Forward, id)
    }

    fn minus(contig: &str, start: u64, end: u64, id: &str) -> GeneLocation {
        GeneLocation::new(contig, start, end, Strand::Reverse, id)
    }

    #[test]
    fn test_single_gene_clamped() {
        let genes = vec![plus("chr1", 1000, 2000, "geneA")];
        let domains = opts(false)
            .build_domains(&genes, &lens(&[("chr1", 1_000_000)]))
            .unwrap();
        assert_eq!(domains, vec![RegulatoryDomain::new("chr1", 0, 1_000_000, "geneA")]);
    }

    #[test]
    fn test_single_gene_max_extension() {
        let genes = vec![plus("chr1", 500_000, 501_000, "g")];
        let mut options = opts(false);
        options.max_extension(10_000);
        let domains = options
            .build_domains(&genes, &lens(&[("chr1", 1_000_000)]))
            .unwrap();
        assert_eq!(domains, vec![RegulatoryDomain::new("chr1", 485_000, 511_000, "g")]);
    }

    #[test]
    fn test_huge_max_extension() {
        let genes = vec![plus("chr1", 500_000, 501_000, "g")];
        let chrom_lens = lens(&[("chr1", 1_000_000)]);
        for max_extension in [u64::MAX, i64::MAX as u64, i64::MAX as u64 + 1] {
            let mut options = opts(false);
            options.max_extension(max_extension).basal_up(u64::MAX);
            let domains = options.build_domains(&genes, &chrom_lens).unwrap();
            assert_eq!(domains, vec![RegulatoryDomain::new("chr1", 0, 1_000_000, "g")]);
        }
    }

    #[test]
    fn test_half_extension_meets_at_midpoint() {
        let genes = vec![
            plus("chr1", 10_000, 12_000, "A"),
            plus("chr1", 20_000, 25_000, "B"),
        ];
        let domains = opts(true)
            .build_domains(&genes, &lens(&[("chr1", 1_000_000)]))
            .unwrap();
        assert_eq!(
            domains,
            vec![
                RegulatoryDomain::new("chr1", 0, 15_000, "A"),
                RegulatoryDomain::new("chr1", 15_000, 1_000_000, "B"),
            ]
        );
    }

    #[test]
    fn test_full_extension_stops_at_neighbour_basal() {
        let genes = vec![
            plus("chr1", 10_000, 12_000, "A"),
            plus("chr1", 20_000, 25_000, "B"),
        ];
        let domains = opts(false)
            .build_domains(&genes, &lens(&[("chr1", 1_000_000)]))
            .unwrap();
        // A runs up to B's basal start, B back to A's basal end.
        assert_eq!(
            domains,
            vec![
                RegulatoryDomain::new("chr1", 0, 15_000, "A"),
                RegulatoryDomain::new("chr1", 11_000, 1_000_000, "B"),
            ]
        );
    }

    #[test]
    fn test_reverse_strand_swaps_basal() {
        let genes = vec![minus("chr1", 40_000, 50_000, "R")];
        let mut options = opts(false);
        options.max_extension(0);
        let domains = options
            .build_domains(&genes, &lens(&[("chr1", 100_000)]))
            .unwrap();
        // TSS is the end coordinate, upstream lies to the right.
        assert_eq!(domains, vec![RegulatoryDomain::new("chr1", 49_000, 55_000, "R")]);
    }

    #[test]
    fn test_crowded_neighbour_keeps_basal() {
        let genes = vec![
            plus("chr1", 10_000, 10_500, "A"),
            plus("chr1", 10_200, 10_900, "B"),
        ];
        let domains = opts(true)
            .build_domains(&genes, &lens(&[("chr1", 100_000)]))
            .unwrap();
        assert_eq!(domains[0], RegulatoryDomain::new("chr1", 0, 11_000, "A"));
        assert_eq!(domains[1], RegulatoryDomain::new("chr1", 5_200, 100_000, "B"));
    }

    #[test]
    fn test_order_and_sorting() {
        let genes = vec![
            plus("chr2", 5_000, 6_000, "c"),
            plus("chr1", 90_000, 91_000, "b"),
            minus("chr1", 10_000, 30_000, "a"),
            plus("chr2", 1_000, 2_000, "d"),
        ];
        let domains = opts(false)
            .build_domains(&genes, &lens(&[("chr1", 100_000), ("chr2", 100_000)]))
            .unwrap();
        let ids: Vec<&str> = domains.iter().map(|d| d.gene_id()).collect();
        assert_eq!(ids, vec!["d", "c", "a", "b"]);
        assert_eq!(domains[0].contig(), "chr2");
        assert_eq!(domains[2].contig(), "chr1");
    }

    #[test]
    fn test_tied_tss_keep_input_order() {
        let genes = vec![
            plus("chr1", 1_000, 2_000, "first"),
            plus("chr1", 1_000, 3_000, "second"),
        ];
        let domains = opts(false)
            .build_domains(&genes, &lens(&[("chr1", 10_000)]))
            .unwrap();
        assert_eq!(domains[0].gene_id(), "first");
        assert_eq!(domains[1].gene_id(), "second");
    }

    #[test]
    fn test_failures() {
        let genes = vec![plus("chr1", 1, 2, "a"), plus("chr2", 1, 2, "b")];

        let err = GreatOptions::default()
            .build_domains(&genes, &lens(&[("chr1", 10), ("chr2", 10)]))
            .unwrap_err();
        assert!(matches!(
            err,
            GreatError::InsufficientChromosomeData { found: 2, required: 21 }
        ));

        let err = opts(false)
            .build_domains(&genes, &lens(&[("chr1", 10)]))
            .unwrap_err();
        assert!(matches!(err, GreatError::MissingChromosomeLength(c) if c == "chr2"));

        let inverted = vec![plus("chr1", 5, 2, "bad")];
        let err = opts(false)
            .build_domains(&inverted, &lens(&[("chr1", 10)]))
            .unwrap_err();
        assert!(matches!(err, GreatError::InvertedGene { .. }));
    }

    #[test]
    fn test_empty_input() {
        let mut options = GreatOptions::default();
        options.min_chroms(0);
        let domains = options.build_domains(&[], &ChromLengths::new()).unwrap();
        assert!(domains.is_empty());
    }

    #[derive(Debug, Clone)]
    struct Case {
        genes: Vec<GeneLocation>,
        contig_len: u64,
        basal_up: u64,
        basal_down: u64,
        max_extension: u64,
        half: bool,
    }

    impl Arbitrary for Case {
        fn arbitrary(g: &mut Gen) -> Self {
            let contig_len = u64::arbitrary(g) % 1_000_000 + 1;
            let n = usize::arbitrary(g) % 20 + 1;
            let genes = (0..n)
                .map(|i| {
                    let start = u64::arbitrary(g) % contig_len;
                    let end = (start + u64::arbitrary(g) % 50_000).min(contig_len);
                    let strand = if bool::arbitrary(g) {
                        Strand::Forward
                    } else {
                        Strand::Reverse
                    };
                    GeneLocation::new("chr1", start, end, strand, format!("g{i}"))
                })
                .collect();
            Case {
                genes,
                contig_len,
                basal_up: u64::arbitrary(g) % 10_000,
                basal_down: u64::arbitrary(g) % 10_000,
                max_extension: u64::arbitrary(g) % 2_000_000 + 1,
                half: bool::arbitrary(g),
            }
        }
    }

    impl Case {
        fn options(&self) -> GreatOptions {
            let mut options = GreatOptions::default();
            options
                .basal_up(self.basal_up)
                .basal_down(self.basal_down)
                .max_extension(self.max_extension)
                .half(self.half)
                .min_chroms(1);
            options
        }

        fn run(&self) -> Vec<RegulatoryDomain> {
            self.options()
                .build_domains(&self.genes, &lens(&[("chr1", self.contig_len)]))
                .unwrap()
        }

        fn sorted(&self) -> Vec<GeneLocation> {
            let mut genes = self.genes.clone();
            genes.sort_by_key(|g| g.tss());
            genes
        }
    }

    #[test]
    fn prop_domains_within_contig() {
        fn prop(case: Case) -> bool {
            let domains = case.run();
            domains.len() == case.genes.len()
                && domains
                    .iter()
                    .all(|d| d.start() <= d.end() && d.end() <= case.contig_len)
        }
        QuickCheck::new().quickcheck(prop as fn(Case) -> bool);
    }

    #[test]
    fn prop_extension_capped() {
        fn prop(case: Case) -> bool {
            let options = case.options();
            let max_ext = case.max_extension as i128;
            case.sorted().iter().zip(case.run()).all(|(gene, domain)| {
                let (bs, be) = options.basal(gene.tss() as i128, gene.strand());
                domain.start() as i128 >= bs - max_ext && domain.end() as i128 <= be + max_ext
            })
        }
        QuickCheck::new().quickcheck(prop as fn(Case) -> bool);
    }

    #[test]
    fn prop_half_stops_at_midpoint() {
        fn prop(mut case: Case) -> TestResult {
            case.half = true;
            let options = case.options();
            let genes = case.sorted();
            let domains = case.run();
            for i in 0..genes.len().saturating_sub(1) {
                let (a, b) = (genes[i].tss() as i128, genes[i + 1].tss() as i128);
                let mid = midpoint(a, b);
                let (_, a_basal_end) = options.basal(a, genes[i].strand());
                let (b_basal_start, _) = options.basal(b, genes[i + 1].strand());
                if domains[i].end() as i128 > mid.max(a_basal_end)
                    || (domains[i + 1].start() as i128) < mid.min(b_basal_start.max(0))
                {
                    return TestResult::failed();
                }
            }
            TestResult::passed()
        }
        QuickCheck::new().quickcheck(prop as fn(Case) -> TestResult);
    }

    #[test]
    fn prop_idempotent() {
        fn prop(case: Case) -> bool {
            case.run() == case.run()
        }
        QuickCheck::new().quickcheck(prop as fn(Case) -> bool);
    }
}
