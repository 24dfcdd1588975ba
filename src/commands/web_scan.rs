use std::path::Path;
use std::thread;

use crate::config::Settings;
use crate::error::Result;
use crate::output::{ensure_readable_file, ensure_writable_dir};
use crate::ports::{format_port_list, parse_port_list};
use crate::runner::Scanner;
use crate::workdir::Workdir;

use super::xml_scan::web_candidate_list;

pub const OPERATION: &str = "web_scan";

/// Screenshot every web candidate found by the last xml_scan with EyeWitness.
pub fn execute(settings: &Settings, workdir: &Workdir, scanner: &dyn Scanner) -> Result<()> {
    let output = workdir.latest_output_dir(&settings.general.sitename)?;

    let candidates = web_candidate_list(settings, &output);
    ensure_readable_file(&candidates, "[web_scan].clean_target_list_file_name")?;
    let report_dir = output.eyewitness_dir();
    ensure_writable_dir(&report_dir)?;

    scanner.run(&eyewitness_args(settings, &candidates, &report_dir, worker_threads())?)
}

pub fn eyewitness_args(
    settings: &Settings,
    candidates: &Path,
    report_dir: &Path,
    threads: usize,
) -> Result<Vec<String>> {
    let ports = format_port_list(&parse_port_list(&settings.web_scan.ports, "[web_scan].ports")?);
    Ok(vec![
        "--web".to_string(),
        "--add-http-ports".to_string(),
        ports.clone(),
        "--add-https-ports".to_string(),
        ports,
        "--no-prompt".to_string(),
        "--threads".to_string(),
        threads.to_string(),
        "--jitter".to_string(),
        settings.web_scan.jitter.to_string(),
        "-f".to_string(),
        candidates.display().to_string(),
        "-d".to_string(),
        report_dir.display().to_string(),
    ])
}

/// One less than the available CPUs, at least one.
fn worker_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}
