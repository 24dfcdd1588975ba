use std::fs;
use std::net::IpAddr;
use std::path::Path;

use tracing::info;

use crate::config::Settings;
use crate::error::{Result, SpecterError};
use crate::output::ensure_readable_file;
use crate::runner::Scanner;
use crate::workdir::{OutputDir, Workdir};

pub const OPERATION: &str = "clean_list";

const REPORT_PREFIX: &str = "Nmap scan report for ";

/// Expand the target list with an nmap list scan (no probes are sent) into
/// individual addresses, minus the exclude list, and store them as the
/// masscan input of a new output directory.
pub fn execute(settings: &Settings, workdir: &Workdir, scanner: &dyn Scanner) -> Result<OutputDir> {
    let input = workdir.input_dir();
    let targets = input.join(&settings.clean_list.target_list_file_name);
    ensure_readable_file(&targets, "[clean_list].target_list_file_name")?;
    let excludes_path = input.join(&settings.clean_list.exclude_list_file_name);
    ensure_readable_file(&excludes_path, "[clean_list].exclude_list_file_name")?;
    let excludes = read_exclude_list(&excludes_path)?;

    let output = workdir.create_output_dir(&settings.general.sitename)?;

    // nmap can only write -oN to a file; the list is rebuilt from it afterwards.
    let scratch = tempfile::Builder::new()
        .prefix("specter")
        .tempfile()
        .map_err(|e| SpecterError::io(std::env::temp_dir(), e))?;

    scanner.run(&nmap_args(&targets, &excludes, scratch.path()))?;

    let text = fs::read_to_string(scratch.path()).map_err(|e| SpecterError::io(scratch.path(), e))?;
    let addresses = parse_list_scan(&text, scratch.path())?;

    let clean_list = output
        .path()
        .join(&settings.xml_scan.clean_target_list_file_name);
    let body: String = addresses.iter().map(|ip| format!("{ip}\n")).collect();
    fs::write(&clean_list, body).map_err(|e| SpecterError::io(&clean_list, e))?;
    info!(
        "Wrote {} targets to {}",
        addresses.len(),
        clean_list.display()
    );

    Ok(output)
}

pub fn nmap_args(targets: &Path, excludes: &[String], scratch: &Path) -> Vec<String> {
    let mut args = vec![
        "-sL".to_string(),
        "-n".to_string(),
        "-iL".to_string(),
        targets.display().to_string(),
        "-oN".to_string(),
        scratch.display().to_string(),
    ];
    if !excludes.is_empty() {
        args.push("--exclude".to_string());
        args.push(excludes.join(","));
    }
    args
}

/// Non-blank lines of the exclude file; `#` starts a comment.
pub fn read_exclude_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| SpecterError::io(path, e))?;
    Ok(content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Addresses listed by an `nmap -sL -n -oN` report, in report order.
pub fn parse_list_scan(text: &str, source: &Path) -> Result<Vec<IpAddr>> {
    text.lines()
        .filter_map(|line| line.strip_prefix(REPORT_PREFIX))
        .map(|rest| {
            let token = rest
                .split_whitespace()
                .last()
                .unwrap_or_default()
                .trim_matches(|c: char| c == '(' || c == ')');
            token.parse::<IpAddr>().map_err(|_| SpecterError::InvalidAddress {
                value: token.to_string(),
                path: source.to_path_buf(),
            })
        })
        .collect()
}
