use anyhow::{Context, Result};
use cas_extract::source::{TextSource, source_for};
use cas_extract::{ExtractError, parse_statement};
use std::path::{Path, PathBuf};
use std::{env, io};
use walkdir::WalkDir;

const PASSWORD_VAR: &str = "CAS_PASSWORD";

/// Every `.pdf` / `.txt` file under `root` (or `root` itself), sorted by path.
fn statement_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && source_for(e.path()).is_some())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Parses one statement and writes its report as JSON to stdout.
fn process_file(source: &dyn TextSource, password: Option<&str>) -> Result<()> {
    let text = source.read_text(password)?;
    let report = parse_statement(&text);
    if !report.transactions.diagnostics.is_empty() {
        log::warn!(
            "{:?}: {} lines skipped or repaired",
            source.path(),
            report.transactions.diagnostics.len()
        );
    }
    serde_json::to_writer_pretty(io::stdout().lock(), &report)
        .with_context(|| format!("writing report for {:?}", source.path()))?;
    println!();
    Ok(())
}

/// Walks a file or folder; a failing statement does not stop the others.
fn process_path(root: &Path, password: Option<&str>) -> Result<usize> {
    let mut failures = 0;
    for path in statement_files(root) {
        let Some(source) = source_for(&path) else { continue };
        log::info!("Processing: {path:?}");
        if let Err(err) = process_file(source.as_ref(), password) {
            failures += 1;
            match err.downcast_ref::<ExtractError>() {
                Some(ExtractError::PasswordRequired) => {
                    log::error!(
                        "{path:?}: password required, pass it as second argument or set {PASSWORD_VAR}"
                    )
                }
                _ => log::error!("{path:?}: {err:#}"),
            }
        }
    }
    Ok(failures)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if !(2..=3).contains(&args.len()) {
        println!("Usage: cas_extract <file-or-folder> [password]");
        return Ok(());
    }
    let root = PathBuf::from(&args[1]);
    let password = args.get(2).cloned().or_else(|| env::var(PASSWORD_VAR).ok());

    let failures = process_path(&root, password.as_deref())?;
    if failures > 0 {
        anyhow::bail!("{failures} statement(s) could not be processed");
    }
    Ok(())
}
