use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use specter::commands::{clean_list, init, tree, web_scan, xml_scan};
use specter::config::Settings;
use specter::logging;
use specter::runner::{Application, ExternalTool};
use specter::workdir::Workdir;

/// specter — recon pipeline wrapper around nmap, masscan and EyeWitness.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "specter",
    version,
    about = "Recon pipeline wrapper around nmap, masscan and EyeWitness.",
    long_about = None
)]
struct Cli {
    /// Work directory. Defaults to ./specter_workdir, or the current directory if it is one.
    #[arg(long, global = true)]
    workdir: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Step,
}

#[derive(Debug, Clone, Subcommand)]
enum Step {
    /// Initialize specter directory structure and config file
    Init {
        /// Overwrite existing settings and input lists with the samples.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Generate a clean IP address list using nmap
    #[command(name = "clean_list")]
    CleanList,
    /// Execute an XML scan using masscan
    #[command(name = "xml_scan")]
    XmlScan {
        /// Whether to capture banners while performing scan.
        #[arg(long = "banners", default_value_t = false)]
        include_banners: bool,
    },
    /// Execute a web scan using EyeWitness after executing xml scan
    #[command(name = "web_scan")]
    WebScan,
    /// Pretty prints the specter directory as a tree
    Tree,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;
    print_banner();

    let workdir = Workdir::resolve(cli.workdir.as_deref())?;

    match cli.command {
        Step::Init { force } => init::execute(&workdir, force)?,
        Step::Tree => tree::execute(&workdir)?,
        Step::CleanList => {
            let settings = load_settings(&workdir)?;
            let nmap = ExternalTool::locate(Application::Nmap, clean_list::OPERATION)?;
            let output = clean_list::execute(&settings, &workdir, &nmap)?;
            info!("Output directory: {}", output.path().display());
        }
        Step::XmlScan { include_banners } => {
            let settings = load_settings(&workdir)?;
            let masscan = ExternalTool::locate(Application::Masscan, xml_scan::OPERATION)?;
            let results = xml_scan::execute(&settings, &workdir, &masscan, include_banners)?;
            info!(
                "xml_scan done: {} web candidates, {} ports, {} hosts",
                results.web_candidates.len(),
                results.ports.len(),
                results.hosts.len()
            );
        }
        Step::WebScan => {
            let settings = load_settings(&workdir)?;
            let eyewitness = ExternalTool::locate(Application::EyeWitness, web_scan::OPERATION)?;
            web_scan::execute(&settings, &workdir, &eyewitness)?;
        }
    }

    Ok(())
}

fn load_settings(workdir: &Workdir) -> Result<Settings> {
    let path = workdir.settings_path();
    Settings::load(&path).with_context(|| format!("failed to load settings from {}", path.display()))
}

fn print_banner() {
    println!(
        "{}",
        format!(
            "\
=================================================
* SPECTER RECON TOOL                            *
=================================================
Version {}

EXECUTION STEPS
---------------
0) specter init        // generates specter file structure
1) specter clean_list  // new output directory with a clean target list for xml_scan
2) specter xml_scan    // port scan with masscan, builds the web_scan target list
3) specter web_scan    // web scan with EyeWitness
4) specter tree        // view the specter file structure at any time
",
            env!("CARGO_PKG_VERSION")
        )
        .blue()
    );
}
