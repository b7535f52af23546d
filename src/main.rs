//! CLI tool to expand shell-style variables in files, text or stdin.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;
use shexp::runes::{is_ident_first, is_ident_more};
use shexp::{
    EnvResolver, ExpandError, ExpandErrorKind, Expander, MapResolver, Resolver, TokenKind, tokenize,
};

#[derive(Parser)]
#[command(name = "shexp", version)]
#[command(about = "Expand $name and ${name...} variables in text")]
struct Args {
    /// Expand this text instead of reading files (repeatable)
    #[arg(short, long = "expr", value_name = "TEXT", conflicts_with = "files")]
    expr: Vec<String>,

    /// Set a variable before expanding (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Resolve only variables given with --set, ignoring the environment
    #[arg(long)]
    no_env: bool,

    /// Print the token stream instead of expanding
    #[arg(long)]
    tokens: bool,

    /// Files to expand; reads standard input when neither files nor
    /// --expr are given
    files: Vec<PathBuf>,
}

enum Source<'a> {
    Expr(&'a str),
    File(&'a PathBuf),
    Stdin,
}

impl Source<'_> {
    fn name(&self) -> String {
        match self {
            Self::Expr(_) => "<expr>".to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Stdin => "<stdin>".to_string(),
        }
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(match self {
            Self::Expr(text) => Box::new(Cursor::new(text.as_bytes())),
            Self::File(path) => Box::new(BufReader::new(File::open(path)?)),
            Self::Stdin => Box::new(io::stdin().lock()),
        })
    }
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;

    let mut chars = key.chars();
    let valid = chars.next().is_some_and(is_ident_first) && chars.all(is_ident_more);
    if !valid {
        return Err(format!("invalid variable name '{key}'"));
    }

    Ok((key.to_string(), value.to_string()))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if args.no_env {
        run(&args, MapResolver::new())
    } else {
        run(&args, EnvResolver::new())
    }
}

fn sources(args: &Args) -> Vec<Source<'_>> {
    if !args.expr.is_empty() {
        args.expr.iter().map(|e| Source::Expr(e)).collect()
    } else if !args.files.is_empty() {
        args.files.iter().map(Source::File).collect()
    } else {
        vec![Source::Stdin]
    }
}

fn run<R: Resolver>(args: &Args, mut resolver: R) -> ExitCode {
    for (key, value) in &args.set {
        debug!("seeding {key}={value:?}");
        resolver.set(key, value);
    }

    let mut expander = Expander::new(resolver);
    let mut stdout = io::stdout().lock();
    let mut had_error = false;

    for source in sources(args) {
        let name = source.name();

        if let Err(e) = process_source(&mut expander, &source, args.tokens, &mut stdout) {
            eprintln!("{name}: {e}");
            had_error = true;
        }
    }

    if let Err(e) = stdout.flush() {
        eprintln!("Error: {e}");
        had_error = true;
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Expands or tokenizes one source. Expression output gets a
/// trailing newline.
fn process_source<R: Resolver>(
    expander: &mut Expander<R>,
    source: &Source<'_>,
    tokens: bool,
    out: &mut impl Write,
) -> Result<(), shexp::Error> {
    if tokens {
        print_tokens(source, out)?;
    } else {
        expand_source(expander, source, out)?;
    }

    if matches!(source, Source::Expr(_)) {
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the expansion of `source`. On failure the partial output is
/// still written before the error is returned.
fn expand_source<R: Resolver>(
    expander: &mut Expander<R>,
    source: &Source<'_>,
    out: &mut impl Write,
) -> Result<(), shexp::Error> {
    let input = source.open()?;
    match expander.expand(input) {
        Ok(text) => {
            out.write_all(text.as_bytes())?;
            Ok(())
        }
        Err(err) => {
            out.write_all(err.output.as_bytes())?;
            out.flush()?;
            Err(err.into())
        }
    }
}

fn print_tokens(source: &Source<'_>, out: &mut impl Write) -> Result<(), shexp::Error> {
    let input = source.open()?;
    let mut failed = None;

    for token in tokenize(input) {
        writeln!(out, "{}: {token}", token.position)?;
        if let TokenKind::Error(err) = token.kind {
            failed = Some(err);
        }
    }

    match failed {
        Some(err) => Err(ExpandError {
            kind: ExpandErrorKind::Lex(err),
            output: String::new(),
        }
        .into()),
        None => Ok(()),
    }
}
