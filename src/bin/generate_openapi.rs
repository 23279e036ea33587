//! Prints the bridge's OpenAPI document, or writes it to a file.
//!
//!   generate_openapi                  # JSON on stdout
//!   generate_openapi --output api.json

use std::{
    env, fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use cooling_system_bridge::api::handlers::ApiDoc;
use utoipa::OpenApi;

/// Where the document goes.
#[derive(Debug, PartialEq, Eq)]
enum Target {
    Stdout,
    File(PathBuf),
}

fn parse_target(mut args: impl Iterator<Item = String>) -> Result<Target> {
    let mut target = Target::Stdout;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                let path = args.next().with_context(|| format!("{arg} needs a path"))?;
                target = Target::File(PathBuf::from(path));
            }
            other => bail!("unexpected argument `{other}`; usage: generate_openapi [--output <path>]"),
        }
    }
    Ok(target)
}

fn main() -> Result<()> {
    let target = parse_target(env::args().skip(1))?;
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("failed to serialise OpenAPI document")?;

    match target {
        Target::File(path) => {
            fs::write(&path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        Target::Stdout => {
            let mut out = io::stdout().lock();
            writeln!(out, "{json}").context("failed to write to stdout")?;
        }
    }

    Ok(())
}
