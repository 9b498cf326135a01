use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use clap::Parser as ClapParser;
use polite_lang::cli::{run_source, CliError, RunOptions};

#[derive(ClapParser)]
#[command(name = "polite")]
#[command(about = "Polite - a conversational query language for SQL and NoSQL stores")]
#[command(version)]
struct Cli {
    /// The query to parse (reads --file, stdin, or starts a REPL if omitted)
    query: Option<String>,

    /// Read the query from a file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Print the token stream
    #[arg(long)]
    tokens: bool,

    /// Print the parsed tree
    #[arg(long)]
    ast: bool,

    /// Serialize the tree and print artifact details
    #[arg(long)]
    serialize: bool,

    /// Report errors as JSON instead of text
    #[arg(long)]
    json_errors: bool,
}

fn main() {
    let cli = Cli::parse();

    let result = match resolve_source(&cli) {
        Ok(Some(source)) => run_once(&cli, source),
        Ok(None) => repl(&cli),
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Pick the query source: positional argument, then --file, then piped
/// stdin. `None` means interactive.
fn resolve_source(cli: &Cli) -> Result<Option<String>, CliError> {
    if let Some(query) = &cli.query {
        return Ok(Some(query.clone()));
    }
    if let Some(path) = &cli.file {
        return Ok(Some(fs::read_to_string(path)?));
    }
    if !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        if buffer.trim().is_empty() {
            return Err(CliError::NoInput);
        }
        return Ok(Some(buffer));
    }
    Ok(None)
}

fn options_for(cli: &Cli, source: String) -> RunOptions {
    RunOptions {
        source,
        show_tokens: cli.tokens,
        // A plain invocation with no stage flags still shows the tree
        show_ast: cli.ast || (!cli.tokens && !cli.serialize),
        serialize: cli.serialize,
        json_errors: cli.json_errors,
    }
}

fn run_once(cli: &Cli, source: String) -> Result<(), CliError> {
    let report = run_source(&options_for(cli, source));
    print!("{}", report.output);
    if !report.succeeded {
        std::process::exit(1);
    }
    Ok(())
}

fn repl(cli: &Cli) -> Result<(), CliError> {
    println!("Polite interactive mode. Type 'exit' or 'quit' to leave.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("polite> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }

        let report = run_source(&options_for(cli, trimmed.to_string()));
        print!("{}", report.output);
    }

    Ok(())
}
