// SPDX-License-Identifier: Apache-2.0

//! Stdin-to-stdout JSON filter: parse a stream of documents, pretty-print
//! them back out in canonical form.
//!
//! ```text
//! echo '{"b":1,"a":2}' | jsondoc-filter
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use jsondoc::{print, Document, KindSet};
use log::debug;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Types {
    /// Standard JSON top-level values: arrays and objects.
    Standard,
    /// Any JSON value at the top level.
    Extended,
}

#[derive(Debug, Parser)]
#[command(name = "jsondoc-filter", about = "Reformat JSON from stdin to stdout")]
struct Args {
    /// Parse exactly one top-level value instead of newline-separated
    /// records.
    #[arg(long)]
    single: bool,

    /// Which value kinds to accept at the top level.
    #[arg(long, value_enum, default_value = "extended")]
    types: Types,
}

fn run(args: &Args) -> Result<(), jsondoc::Error> {
    let kinds = match args.types {
        Types::Standard => KindSet::STANDARD,
        Types::Extended => KindSet::EXTENDED,
    };

    let stdin = io::stdin().lock();
    let doc = Document::parse_root(stdin, kinds, !args.single, None)?;
    let root = match doc.root() {
        Some(root) => root,
        None => return Ok(()),
    };
    debug!("parsed {} record(s)", doc.array_length(root)?);

    let mut stdout = io::BufWriter::new(io::stdout().lock());
    print::root(&mut stdout, &doc, root)?;
    stdout.write_all(b"\n").map_err(jsondoc::Error::Io)?;
    stdout.flush().map_err(jsondoc::Error::Io)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("jsondoc-filter: {err}");
            ExitCode::FAILURE
        }
    }
}
