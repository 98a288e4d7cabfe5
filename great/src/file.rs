use std::{ffi::OsStr, path::PathBuf};

use clap::{builder::PathBufValueParser, error::ErrorKind};

/// Input file that is known to exist when the arguments are parsed.
#[derive(Clone, Debug)]
pub struct InputFile(pub PathBuf);

impl AsRef<std::path::Path> for InputFile {
    fn as_ref(&self) -> &std::path::Path {
        self.0.as_ref()
    }
}

impl clap::builder::ValueParserFactory for InputFile {
    type Parser = InputFileParser;
    fn value_parser() -> Self::Parser {
        InputFileParser
    }
}

#[derive(Clone)]
pub struct InputFileParser;

impl clap::builder::TypedValueParser for InputFileParser {
    type Value = InputFile;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let path = PathBufValueParser::new().parse_ref(cmd, arg, value)?;
        if !path.is_file() {
            let err = clap::Error::raw(
                ErrorKind::ValueValidation,
                format!("Input file {value:?} does not exist\n"),
            )
            .with_cmd(cmd);
            Err(err)
        } else {
            Ok(InputFile(path))
        }
    }
}
