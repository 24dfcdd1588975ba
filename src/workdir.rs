//! Layout of the specter work directory:
//!
//! ```text
//! specter_workdir/
//!   settings.toml
//!   input/            target and exclude lists for clean_list
//!   output/
//!     <sitename>_<YYYY-MM-DD_HH-MM-SS>/
//!       hosts/  ports/  web_reports/eyewitness/  xml/
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, info};

use crate::config::SETTINGS_FILE_NAME;
use crate::error::{Result, SpecterError};

pub const WORKDIR_NAME: &str = "specter_workdir";
pub const MASSCAN_XML_FILE_NAME: &str = "masscan.xml";

pub const SAMPLE_SETTINGS: &str = include_str!("../samples/settings.sample.toml");
pub const SAMPLE_TARGETS: &str = include_str!("../samples/targets.txt");
pub const SAMPLE_EXCLUDES: &str = include_str!("../samples/exclude.txt");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workdir {
    root: PathBuf,
}

impl Workdir {
    /// Use `explicit` when given, otherwise the current directory if it is
    /// already the work directory, otherwise `./specter_workdir`.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Ok(Self::at(p));
        }
        let cwd = env::current_dir().map_err(|e| SpecterError::io(".", e))?;
        if cwd.file_name().is_some_and(|n| n == WORKDIR_NAME) {
            Ok(Self::at(cwd))
        } else {
            Ok(Self::at(cwd.join(WORKDIR_NAME)))
        }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE_NAME)
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join("input")
    }

    pub fn output_root(&self) -> PathBuf {
        self.root.join("output")
    }

    /// Create a fresh timestamped output directory for `sitename`.
    pub fn create_output_dir(&self, sitename: &str) -> Result<OutputDir> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let stamp = now
            .format(format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]"))
            .map_err(|e| SpecterError::Workdir {
                message: format!("could not format timestamp: {e}"),
            })?;
        let dir = OutputDir::new(self.output_root().join(format!("{sitename}_{stamp}")));
        dir.create_layout()?;
        Ok(dir)
    }

    /// The most recent output directory for `sitename`, with its
    /// subdirectories ensured.
    pub fn latest_output_dir(&self, sitename: &str) -> Result<OutputDir> {
        let root = self.output_root();
        let entries = fs::read_dir(&root).map_err(|e| SpecterError::io(&root, e))?;
        let prefix = format!("{sitename}_");

        let mut latest: Option<(PrimitiveDateTime, PathBuf)> = None;
        for entry in entries {
            let entry = entry.map_err(|e| SpecterError::io(&root, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(stamp) = name.strip_prefix(&prefix) else {
                continue;
            };
            let Some(at) = parse_stamp(stamp) else {
                debug!("ignoring output directory with unexpected name: {name}");
                continue;
            };
            if !entry.path().is_dir() {
                continue;
            }
            if latest.as_ref().map_or(true, |(best, _)| at > *best) {
                latest = Some((at, entry.path()));
            }
        }

        let (_, path) = latest.ok_or_else(|| SpecterError::Workdir {
            message: format!(
                "no output directory for site '{sitename}' under {}; run `specter clean_list` first",
                root.display()
            ),
        })?;
        let dir = OutputDir::new(path);
        dir.create_layout()?;
        Ok(dir)
    }
}

fn parse_stamp(stamp: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        stamp,
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]"),
    )
    .ok()
}

/// One per-site output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn hosts_dir(&self) -> PathBuf {
        self.root.join("hosts")
    }

    pub fn ports_dir(&self) -> PathBuf {
        self.root.join("ports")
    }

    pub fn xml_dir(&self) -> PathBuf {
        self.root.join("xml")
    }

    pub fn eyewitness_dir(&self) -> PathBuf {
        self.root.join("web_reports").join("eyewitness")
    }

    pub fn masscan_xml(&self) -> PathBuf {
        self.xml_dir().join(MASSCAN_XML_FILE_NAME)
    }

    pub fn create_layout(&self) -> Result<()> {
        for dir in [
            self.hosts_dir(),
            self.ports_dir(),
            self.eyewitness_dir(),
            self.xml_dir(),
        ] {
            if !dir.is_dir() {
                info!("Creating output sub-directory: {}", dir.display());
            }
            fs::create_dir_all(&dir).map_err(|e| SpecterError::io(&dir, e))?;
        }
        Ok(())
    }
}
