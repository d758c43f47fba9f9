use std::env;
use std::io;
use std::process;

use anyhow::{bail, Context, Result};

use rxtrans::{enumerate, parse, render, Dialect, Target};

const USAGE: &str = "usage: rxtrans (-E|-P) (pcre|rx|sre|strings) [PATTERN]";

// Usage: echo <pattern> | rxtrans -E pcre
fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            eprintln!("rxtrans: {:#}", err);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<String> {
    let (flag, output) = match args {
        [flag, output] | [flag, output, _] => (flag.as_str(), output.as_str()),
        _ => bail!(USAGE),
    };
    let dialect = match flag {
        "-E" => Dialect::Emacs,
        "-P" => Dialect::Pcre,
        other => bail!("unknown input syntax `{}`\n{}", other, USAGE),
    };

    let pattern = match args.get(2) {
        Some(pattern) => pattern.clone(),
        None => {
            let mut line = String::new();
            io::stdin()
                .read_line(&mut line)
                .context("failed to read pattern from stdin")?;
            line.trim_end_matches(['\n', '\r']).to_string()
        }
    };

    let node = parse(&pattern, dialect).with_context(|| format!("cannot parse `{}`", pattern))?;
    if output == "strings" {
        let strings = enumerate(&node).context("cannot list matching strings")?;
        return Ok(strings.join("\n"));
    }
    let target: Target = output.parse()?;
    render(&node, target).with_context(|| format!("cannot render as {}", target))
}
