use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Settings;
use crate::decompose::decompose;
use crate::error::Result;
use crate::output::{ensure_readable_file, ensure_writable_dir, write_sorted};
use crate::ports::{format_port_list, parse_port_list};
use crate::runner::Scanner;
use crate::types::Decomposition;
use crate::workdir::{OutputDir, Workdir};

pub const OPERATION: &str = "xml_scan";

/// Run masscan against the clean target list of the latest output directory,
/// then split its XML report into the web candidate list and the per-port and
/// per-host files.
pub fn execute(
    settings: &Settings,
    workdir: &Workdir,
    scanner: &dyn Scanner,
    include_banners: bool,
) -> Result<Decomposition> {
    let output = workdir.latest_output_dir(&settings.general.sitename)?;

    let target_list = output
        .path()
        .join(&settings.xml_scan.clean_target_list_file_name);
    ensure_readable_file(&target_list, "[xml_scan].clean_target_list_file_name")?;

    let web_list = web_candidate_list(settings, &output);
    if let Some(parent) = web_list.parent() {
        ensure_writable_dir(parent)?;
    }

    let args = masscan_args(settings, &target_list, &output.masscan_xml(), include_banners)?;
    scanner.run(&args)?;

    write_indexes(&output, &web_list, &output.masscan_xml())
}

pub fn web_candidate_list(settings: &Settings, output: &OutputDir) -> PathBuf {
    output
        .path()
        .join(&settings.web_scan.clean_target_list_file_name)
}

pub fn masscan_args(
    settings: &Settings,
    target_list: &Path,
    xml_report: &Path,
    include_banners: bool,
) -> Result<Vec<String>> {
    let ports = parse_port_list(&settings.xml_scan.ports, "[xml_scan].ports")?;
    let mut args = vec![
        "--max-retries=1".to_string(),
        "--open".to_string(),
        "-e".to_string(),
        settings.xml_scan.interface.clone(),
        "--adapter-ip".to_string(),
        settings.xml_scan.masscan_ip.trim().to_string(),
        "-p".to_string(),
        format_port_list(&ports),
        "-iL".to_string(),
        target_list.display().to_string(),
        format!("--rate={}", settings.xml_scan.scan_rate),
        "-oX".to_string(),
        xml_report.display().to_string(),
    ];
    if include_banners {
        args.push("--banners".to_string());
    }
    Ok(args)
}

/// Decompose `report` and write every projection. Nothing is written when
/// decomposition fails.
pub fn write_indexes(output: &OutputDir, web_list: &Path, report: &Path) -> Result<Decomposition> {
    let decomposition = decompose(report)?;
    if decomposition.is_empty() {
        warn!("{} produced no results", report.display());
    }

    let (ports_dir, hosts_dir) = (output.ports_dir(), output.hosts_dir());
    if let Some(parent) = web_list.parent() {
        ensure_writable_dir(parent)?;
    }
    ensure_writable_dir(&ports_dir)?;
    ensure_writable_dir(&hosts_dir)?;

    write_sorted(web_list, &decomposition.web_candidates)?;
    info!(
        "Wrote {} web scan candidates to {}",
        decomposition.web_candidates.len(),
        web_list.display()
    );

    for (port, addresses) in &decomposition.ports {
        write_sorted(&ports_dir.join(format!("{port}.txt")), addresses)?;
    }
    info!(
        "Wrote {} port files to {}",
        decomposition.ports.len(),
        ports_dir.display()
    );

    for (address, lines) in &decomposition.hosts {
        write_sorted(&hosts_dir.join(format!("{address}.txt")), lines)?;
    }
    info!(
        "Wrote {} host files to {}",
        decomposition.hosts.len(),
        hosts_dir.display()
    );

    Ok(decomposition)
}
