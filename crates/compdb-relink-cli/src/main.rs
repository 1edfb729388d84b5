use anyhow::{Context, Result};
use clap::Parser;
use compdb_relink::{CompilationDatabase, ResolvedSymlink, RewriteOptions, RewriteReport};
use compdb_relink_cli::logging::{self, LoggingConfig};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "compdb-relink",
    version,
    about = "Rewrite compile_commands.json paths to go through a symbolic link"
)]
struct Cli {
    /// Compilation database to read
    input: PathBuf,
    /// Where to write the rewritten compilation database
    output: PathBuf,
    /// Symbolic link whose target prefix is replaced by the link path
    symlink: String,
    /// Also rewrite `directory` fields that live under the link target
    #[arg(long)]
    rewrite_directory: bool,
    /// Print the rewrite report as JSON
    #[arg(long)]
    json: bool,
    /// Log level or `tracing` filter directives (merged with RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Emit log lines as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(&LoggingConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let mut db = CompilationDatabase::load(&cli.input)?;
    let symlink = ResolvedSymlink::resolve(&cli.symlink)
        .with_context(|| format!("failed to resolve symlink {}", cli.symlink))?;

    if !cli.json {
        println!("symlink: {}", symlink.symlink());
        println!("symlink absolute path: {}", symlink.absolute_path());
        println!("symlink target: {}", symlink.target());
    }

    let options = RewriteOptions {
        rewrite_directory: cli.rewrite_directory,
    };
    let report = db.rewrite(&symlink, &options);

    db.write(&cli.output)?;
    tracing::debug!(output = %cli.output.display(), "wrote compilation database");

    print_report(&symlink, &report, cli.json)?;
    Ok(0)
}

#[derive(Serialize)]
struct ReportEnvelope<'a> {
    symlink: &'a str,
    absolute_path: &'a str,
    target: &'a str,
    #[serde(flatten)]
    report: &'a RewriteReport,
}

fn print_report(symlink: &ResolvedSymlink, report: &RewriteReport, json: bool) -> Result<()> {
    if json {
        let envelope = ReportEnvelope {
            symlink: symlink.symlink(),
            absolute_path: symlink.absolute_path(),
            target: symlink.target(),
            report,
        };
        let out = serde_json::to_string_pretty(&envelope)?;
        println!("{out}");
        return Ok(());
    }

    println!(
        "rewritten: {} of {} records ({} by prefix, {} canonicalized)",
        report.rewritten(),
        report.records,
        report.rewritten_prefix,
        report.rewritten_canonical,
    );
    if report.directories_rewritten > 0 {
        println!("directories rewritten: {}", report.directories_rewritten);
    }
    if !report.is_clean() {
        println!("left unchanged: {}", report.skipped.len());
    }
    Ok(())
}
