//! dprmine CLI
//!
//! Command-line front end for the extraction pipeline:
//! - `extract`: one report text file (or stdin) → record JSON
//! - `batch`: every `.txt` under a directory tree → one JSON per file

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use tracing::info;
use walkdir::WalkDir;

use dprmine_extract::{Extractor, StructuredRecord};

#[derive(Parser)]
#[command(name = "dprmine")]
#[command(
    author,
    version,
    about = "Structured fact extraction from project report text"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one report text file to a record JSON.
    Extract {
        /// Input text file ("-" reads stdin)
        input: PathBuf,
        /// Output JSON path (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Emit the legacy compatibility view with alias keys
        #[arg(long)]
        compat: bool,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Extract every `.txt` file under a directory tree.
    Batch {
        /// Input directory
        dir: PathBuf,
        /// Output directory for `<name>.json` files (defaults to the input directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// Emit the legacy compatibility view with alias keys
        #[arg(long)]
        compat: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract {
            input,
            out,
            compat,
            pretty,
        } => cmd_extract(&input, out.as_deref(), compat, pretty),
        Commands::Batch {
            dir,
            out_dir,
            compat,
        } => cmd_batch(&dir, out_dir.as_deref(), compat),
    }
}

fn cmd_extract(input: &Path, out: Option<&Path>, compat: bool, pretty: bool) -> Result<()> {
    let text = read_input(input)?;
    let report = Extractor::new().extract_with_report(&text);
    if report.repaired {
        info!(input = %input.display(), "quality gate failed, corrective pass applied");
    }
    let json = render_record(&report.record, compat, pretty)?;
    match out {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
            println!("{} {}", "wrote".green().bold(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_batch(dir: &Path, out_dir: Option<&Path>, compat: bool) -> Result<()> {
    let out_dir = out_dir.unwrap_or(dir);
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let inputs = collect_inputs(dir)?;
    if inputs.is_empty() {
        println!("{} no .txt files under {}", "note".yellow().bold(), dir.display());
        return Ok(());
    }

    let extractor = Extractor::new();
    let results: Vec<(PathBuf, Result<bool>)> = inputs
        .par_iter()
        .map(|path| {
            let outcome = extract_file(&extractor, path, out_dir, compat);
            (path.clone(), outcome)
        })
        .collect();

    let mut extracted = 0usize;
    let mut repaired = 0usize;
    let mut failed = 0usize;
    for (path, outcome) in &results {
        match outcome {
            Ok(was_repaired) => {
                extracted += 1;
                if *was_repaired {
                    repaired += 1;
                }
            }
            Err(err) => {
                failed += 1;
                eprintln!("{} {}: {err:#}", "failed".red().bold(), path.display());
            }
        }
    }
    println!(
        "{} {extracted} extracted ({repaired} repaired), {failed} failed",
        "done".green().bold()
    );
    if failed > 0 {
        bail!("{failed} file(s) failed");
    }
    Ok(())
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))
}

/// All `.txt` files under `dir`, sorted for stable output ordering.
fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().map_or(false, |ext| ext == "txt")
        {
            inputs.push(entry.into_path());
        }
    }
    inputs.sort();
    Ok(inputs)
}

fn extract_file(extractor: &Extractor, input: &Path, out_dir: &Path, compat: bool) -> Result<bool> {
    let text =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let report = extractor.extract_with_report(&text);
    let json = render_record(&report.record, compat, true)?;
    let name = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("record");
    let out_path = out_dir.join(format!("{name}.json"));
    fs::write(&out_path, json).with_context(|| format!("writing {}", out_path.display()))?;
    Ok(report.repaired)
}

fn render_record(record: &StructuredRecord, compat: bool, pretty: bool) -> Result<String> {
    let value = if compat {
        record.compat_json()
    } else {
        serde_json::to_value(record).context("serializing record")?
    };
    let json = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_compat_carries_alias_keys() {
        let record = StructuredRecord {
            estimated_cost: Some("₹45,00,000".into()),
            duration: Some("24 months".into()),
            ..Default::default()
        };
        let json = render_record(&record, true, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["budget"], "₹45,00,000");
        assert_eq!(value["timeline"], "24 months");

        let canonical = render_record(&record, false, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&canonical).unwrap();
        assert!(value.get("budget").is_none());
    }

    #[test]
    fn extract_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.txt");
        fs::write(&input, "Total Project Cost: ₹45,00,000\n").unwrap();
        let out = dir.path().join("doc.json");
        cmd_extract(&input, Some(&out), true, false).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["budget"], "₹45,00,000");
    }

    #[test]
    fn batch_writes_one_json_per_txt() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.txt"),
            "Project Title: Hill Road Upgrade\nPrepared by: Public Works Department\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.md"), "not a report").unwrap();
        let out = tempfile::tempdir().unwrap();

        cmd_batch(dir.path(), Some(out.path()), false).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.path().join("a.json")).unwrap()).unwrap();
        assert_eq!(value["project_title"], "Hill Road Upgrade");
        assert!(!out.path().join("notes.json").exists());
    }

    #[test]
    fn collect_inputs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("skip.json"), "{}").unwrap();
        let inputs = collect_inputs(dir.path()).unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(inputs[0].ends_with("a.txt"));
        assert!(inputs[1].ends_with("sub/b.txt"));
    }
}
