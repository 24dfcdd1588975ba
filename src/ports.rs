use std::fmt;

use serde::Deserialize;

use crate::error::{Result, SpecterError};

/// One entry of a `ports` list in settings.toml.
///
/// Accepted forms:
/// - integer: `80`
/// - string holding a single port: `"443"`
/// - string holding an inclusive range: `"8000-8010"`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawPort {
    Number(i64),
    Text(String),
}

/// A validated single port or inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpec {
    Single(u16),
    Range(u16, u16),
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpec::Single(p) => write!(f, "{p}"),
            PortSpec::Range(a, b) => write!(f, "{a}-{b}"),
        }
    }
}

/// Validate a settings `ports` list. `key` is used in error messages.
pub fn parse_port_list(raw: &[RawPort], key: &str) -> Result<Vec<PortSpec>> {
    if raw.is_empty() {
        return Err(SpecterError::config(format!("{key} must list at least one port")));
    }
    raw.iter()
        .map(|entry| parse_entry(entry).map_err(|why| SpecterError::config(format!("{key}: {why}"))))
        .collect()
}

/// Render for the `-p` style flags of masscan and EyeWitness: `80,443,8000-8010`.
pub fn format_port_list(specs: &[PortSpec]) -> String {
    specs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_entry(entry: &RawPort) -> std::result::Result<PortSpec, String> {
    match entry {
        RawPort::Number(n) => parse_port_num(*n).map(PortSpec::Single),
        RawPort::Text(s) => {
            let s = s.trim();
            if let Some((a, b)) = s.split_once('-') {
                let start = parse_port_str(a.trim())?;
                let end = parse_port_str(b.trim())?;
                if start > end {
                    return Err(format!("invalid range {start}-{end} (start > end)"));
                }
                Ok(PortSpec::Range(start, end))
            } else {
                parse_port_str(s).map(PortSpec::Single)
            }
        }
    }
}

fn parse_port_str(s: &str) -> std::result::Result<u16, String> {
    let val: i64 = s
        .parse()
        .map_err(|_| format!("invalid port value: {s:?}"))?;
    parse_port_num(val)
}

fn parse_port_num(val: i64) -> std::result::Result<u16, String> {
    if !(1..=65535).contains(&val) {
        return Err(format!("port out of range: {val}"));
    }
    Ok(val as u16)
}
