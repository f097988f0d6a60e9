use std::{
    fs::File,
    io::{BufRead, BufReader},
};

use anyhow::Result;
use clap::Parser;
use nfaregex::RegexBuilder;

/// Print the lines of a file that contain a match of the pattern.
#[derive(Parser)]
struct Cli {
    pattern: String,
    file: String,
    /// Print the compiled automaton and exit.
    #[arg(long)]
    dump: bool,
    /// Give up on a line after this many executor steps.
    #[arg(long)]
    step_limit: Option<usize>,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Matching is anchored at both ends, so look for the pattern anywhere.
    let pattern = format!("[^]*({})[^]*", args.pattern);
    let re = RegexBuilder::new()
        .step_limit(args.step_limit)
        .build(&pattern)?;

    if args.dump {
        print!("{}", re.automaton());
        return Ok(());
    }

    let file = File::open(args.file)?;
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line?;
        if re.is_match(&line) {
            println!("{line}");
        }
    }

    Ok(())
}
