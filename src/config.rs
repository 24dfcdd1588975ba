//! `settings.toml` loading and validation.
//!
//! Settings are loaded once by the binary and handed to each command; nothing
//! reads them from global state.

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SpecterError};
use crate::ports::{parse_port_list, RawPort};

pub const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub general: General,
    pub clean_list: CleanListSettings,
    pub xml_scan: XmlScanSettings,
    pub web_scan: WebScanSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct General {
    /// Prefix of every output directory for this engagement.
    pub sitename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanListSettings {
    /// Under `<workdir>/input`.
    pub target_list_file_name: String,
    /// Under `<workdir>/input`.
    pub exclude_list_file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XmlScanSettings {
    /// Written by clean_list, read by masscan. Under the output directory.
    pub clean_target_list_file_name: String,
    pub masscan_ip: String,
    pub interface: String,
    pub ports: Vec<RawPort>,
    pub scan_rate: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebScanSettings {
    /// Written by xml_scan, read by EyeWitness. Under the output directory.
    pub clean_target_list_file_name: String,
    pub jitter: u32,
    pub ports: Vec<RawPort>,
}

impl Settings {
    /// Read, parse and validate the settings file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SpecterError::InputFile {
            path: path.to_path_buf(),
            reason: format!("settings could not be read ({e}); run `specter init` first"),
        })?;
        let settings = Self::from_toml(&content)?;
        debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| SpecterError::config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let sitename = self.general.sitename.trim();
        if sitename.is_empty() {
            return Err(SpecterError::config("[general].sitename must not be empty"));
        }
        if sitename.contains(['/', '\\']) {
            return Err(SpecterError::config(
                "[general].sitename must not contain path separators",
            ));
        }

        for (key, value) in [
            ("[clean_list].target_list_file_name", &self.clean_list.target_list_file_name),
            ("[clean_list].exclude_list_file_name", &self.clean_list.exclude_list_file_name),
            ("[xml_scan].clean_target_list_file_name", &self.xml_scan.clean_target_list_file_name),
            ("[web_scan].clean_target_list_file_name", &self.web_scan.clean_target_list_file_name),
        ] {
            if value.trim().is_empty() {
                return Err(SpecterError::config(format!("{key} must not be empty")));
            }
        }

        self.xml_scan
            .masscan_ip
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| {
                SpecterError::config(format!(
                    "[xml_scan].masscan_ip is not an IP address: {:?}",
                    self.xml_scan.masscan_ip
                ))
            })?;
        if self.xml_scan.interface.trim().is_empty() {
            return Err(SpecterError::config("[xml_scan].interface must not be empty"));
        }
        if self.xml_scan.scan_rate < 1 {
            return Err(SpecterError::config(format!(
                "[xml_scan].scan_rate must be >= 1, got {}",
                self.xml_scan.scan_rate
            )));
        }
        parse_port_list(&self.xml_scan.ports, "[xml_scan].ports")?;

        parse_port_list(&self.web_scan.ports, "[web_scan].ports")?;
        Ok(())
    }
}
