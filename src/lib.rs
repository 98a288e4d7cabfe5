pub mod annotate;
pub mod bed;
pub mod chrom;
pub mod domain;
pub mod error;
pub mod gene;
pub mod strand;
pub mod utils;

pub use chrom::ChromLengths;
pub use domain::{build_domains, GreatOptions, RegulatoryDomain};
pub use error::GreatError;
pub use gene::{ContigFilter, GeneLocation};
pub use strand::Strand;
