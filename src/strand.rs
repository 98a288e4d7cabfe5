use std::{fmt, str::FromStr};

use crate::error::GreatError;

/// Orientation of a gene relative to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn is_forward(&self) -> bool {
        matches!(self, Strand::Forward)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
        }
    }
}

impl FromStr for Strand {
    type Err = GreatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" | "1" => Ok(Strand::Forward),
            "-" | "-1" => Ok(Strand::Reverse),
            other => Err(GreatError::UnrecognizedStrand(other.to_string())),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_strand() {
        assert_eq!("+".parse::<Strand>().unwrap(), Strand::Forward);
        assert_eq!("1".parse::<Strand>().unwrap(), Strand::Forward);
        assert_eq!("-".parse::<Strand>().unwrap(), Strand::Reverse);
        assert_eq!("-1".parse::<Strand>().unwrap(), Strand::Reverse);
        assert_eq!(" -1 ".parse::<Strand>().unwrap(), Strand::Reverse);

        let err = ".".parse::<Strand>();
        assert!(matches!(err, Err(GreatError::UnrecognizedStrand(s)) if s == "."));
        assert!("plus".parse::<Strand>().is_err());
        assert!("".parse::<Strand>().is_err());
        assert!("2".parse::<Strand>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Strand::Forward.to_string(), "+");
        assert_eq!(Strand::Reverse.to_string(), "-");
        assert!(Strand::Forward.is_forward());
        assert!(!Strand::Reverse.is_forward());
    }
}
