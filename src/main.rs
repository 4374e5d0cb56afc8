use anyhow::bail;
use clap::Parser;

use bytepat::parse;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Patterns to parse
    #[arg(value_name = "PATTERN", required = true)]
    patterns: Vec<String>,

    /// Print the syntax tree instead of the normalised pattern
    #[arg(short = 't', long)]
    tree: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut failures = 0;

    for pattern in &args.patterns {
        match parse(pattern) {
            Ok(tree) if args.tree => println!("{tree:#?}"),
            Ok(tree) => println!("{tree}"),
            Err(err) => {
                eprintln!("{pattern}: {err}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!(
            "{} pattern{} failed to parse",
            failures,
            if failures == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
