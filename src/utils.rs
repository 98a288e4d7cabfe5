use std::{
    fs::File,
    io::{self, stdout, BufRead, BufReader, Write},
    path::Path,
};

use flate2::read::MultiGzDecoder;

/// Allows for writing to File or Stdout depending on if a filename is given.
pub fn stdout_or_file<P>(filename: Option<&P>) -> io::Result<Box<dyn Write>>
where
    P: AsRef<Path>,
{
    if let Some(fp) = filename {
        let handle = File::create(fp)?;
        Ok(Box::new(handle))
    } else {
        let handle = stdout().lock();
        Ok(Box::new(handle))
    }
}

/// Open a text file for buffered reading, decompressing it on the fly when
/// the file name ends in `.gz`.
pub fn open_maybe_gz<P>(filename: P) -> io::Result<Box<dyn BufRead>>
where
    P: AsRef<Path>,
{
    let filename = filename.as_ref();
    let file = File::open(filename)?;
    if filename.extension().and_then(|s| s.to_str()) == Some("gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
