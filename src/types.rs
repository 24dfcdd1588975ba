use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

/// One `(host, port)` observation read from a masscan XML report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub ip_address: IpAddr,
    pub protocol: String,
    pub port_id: String,
    pub state: String,
    pub state_reason: Option<String>,
    pub state_reason_ttl: Option<String>,
    pub service_name: Option<String>,
    pub service_banner: Option<String>,
}

impl ScanRecord {
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }

    /// Comma-joined detail line; absent fields are skipped, not left blank.
    pub fn detail_line(&self) -> String {
        let fields = [
            Some(self.port_id.as_str()),
            Some(self.state.as_str()),
            self.state_reason.as_deref(),
            self.state_reason_ttl.as_deref(),
            self.service_name.as_deref(),
            self.service_banner.as_deref(),
        ];
        fields.into_iter().flatten().collect::<Vec<_>>().join(",")
    }
}

/// A `(protocol, portid)` pair a port record is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPort {
    pub protocol: &'static str,
    pub port_id: &'static str,
}

impl TargetPort {
    pub const fn tcp(port_id: &'static str) -> Self {
        Self {
            protocol: "tcp",
            port_id,
        }
    }

    pub fn matches(&self, record: &ScanRecord) -> bool {
        record.protocol == self.protocol && record.port_id == self.port_id
    }
}

/// Ports whose open hosts seed the web scan.
pub const WEB_PORTS: &[TargetPort] = &[
    TargetPort::tcp("443"),
    TargetPort::tcp("80"),
    TargetPort::tcp("8000"),
    TargetPort::tcp("8080"),
    TargetPort::tcp("8443"),
];

pub type WebCandidateSet = BTreeSet<IpAddr>;
pub type PortIndex = BTreeMap<String, BTreeSet<IpAddr>>;
pub type HostIndex = BTreeMap<IpAddr, Vec<String>>;

/// The three projections derived from one report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decomposition {
    pub web_candidates: WebCandidateSet,
    pub ports: PortIndex,
    pub hosts: HostIndex,
}

impl Decomposition {
    pub fn is_empty(&self) -> bool {
        self.web_candidates.is_empty() && self.ports.is_empty() && self.hosts.is_empty()
    }
}
