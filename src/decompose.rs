//! Splits a masscan XML report into the web candidate list, the per-port
//! index and the per-host index.
//!
//! Expected shape (masscan `-oX`):
//!
//! ```xml
//! <nmaprun>
//!   <host endtime="1600000000">
//!     <address addr="10.0.0.5" addrtype="ipv4"/>
//!     <ports>
//!       <port protocol="tcp" portid="443">
//!         <state state="open" reason="syn-ack" reason_ttl="64"/>
//!         <service name="https" banner="nginx"/>
//!       </port>
//!     </ports>
//!   </host>
//! </nmaprun>
//! ```
//!
//! masscan writes one `<host>` element per discovered port, so the same
//! address usually appears many times in a report.

use std::fs;
use std::net::IpAddr;
use std::path::Path;

use roxmltree::{Document, Node, ParsingOptions};
use tracing::{debug, warn};

use crate::error::{Result, SpecterError};
use crate::types::{
    Decomposition, HostIndex, PortIndex, ScanRecord, TargetPort, WebCandidateSet, WEB_PORTS,
};

/// Read and decompose the report at `path`.
///
/// A report that is not valid XML at all (empty, truncated) is logged and
/// yields empty results. Structural problems and malformed addresses are
/// errors.
pub fn decompose(path: &Path) -> Result<Decomposition> {
    let text = fs::read_to_string(path).map_err(|e| SpecterError::io(path, e))?;
    decompose_str(&text, path)
}

/// Same as [`decompose`] for an in-memory report; `source` is only used in
/// messages.
pub fn decompose_str(text: &str, source: &Path) -> Result<Decomposition> {
    let doc = match parse_report(text) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(
                "XML file [{}] could not be parsed because it is most likely empty. Skipping. ({e})",
                source.display()
            );
            return Ok(Decomposition::default());
        }
    };

    let decomposition = Decomposition {
        web_candidates: extract_web_candidates(&doc, source, WEB_PORTS)?,
        ports: build_port_index(&doc, source)?,
        hosts: build_host_index(&doc, source)?,
    };
    debug!(
        web_candidates = decomposition.web_candidates.len(),
        ports = decomposition.ports.len(),
        hosts = decomposition.hosts.len(),
        "decomposed {}",
        source.display()
    );
    Ok(decomposition)
}

pub fn parse_report(text: &str) -> std::result::Result<Document<'_>, roxmltree::Error> {
    let opts = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, opts)
}

/// Addresses with an open port matching any of `targets`.
pub fn extract_web_candidates(
    doc: &Document<'_>,
    source: &Path,
    targets: &[TargetPort],
) -> Result<WebCandidateSet> {
    let mut candidates = WebCandidateSet::new();
    for host in hosts(doc) {
        let ip = host_address(host, source)?;
        for port in port_nodes(host, source)? {
            let record = read_record(ip, port, source)?;
            if record.is_open() && targets.iter().any(|t| t.matches(&record)) {
                candidates.insert(ip);
            }
        }
    }
    Ok(candidates)
}

/// Every observed `portid` mapped to the addresses it was seen on, whatever
/// its state or protocol.
pub fn build_port_index(doc: &Document<'_>, source: &Path) -> Result<PortIndex> {
    let mut index = PortIndex::new();
    for host in hosts(doc) {
        let ip = host_address(host, source)?;
        for port in port_nodes(host, source)? {
            let record = read_record(ip, port, source)?;
            index.entry(record.port_id).or_default().insert(ip);
        }
    }
    Ok(index)
}

/// Detail lines per address, built from the first `<port>` of each `<host>`
/// only. Lines are ordered by their leading port id compared as text.
pub fn build_host_index(doc: &Document<'_>, source: &Path) -> Result<HostIndex> {
    let mut index = HostIndex::new();
    for host in hosts(doc) {
        let ip = host_address(host, source)?;
        let lines = index.entry(ip).or_default();
        if let Some(port) = port_nodes(host, source)?.next() {
            lines.push(read_record(ip, port, source)?.detail_line());
        }
    }

    for lines in index.values_mut() {
        lines.sort_by(|a, b| leading_field(a).cmp(leading_field(b)));
    }
    Ok(index)
}

fn leading_field(line: &str) -> &str {
    line.split(',').next().unwrap_or_default()
}

fn hosts<'a, 'input>(doc: &'a Document<'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.root_element()
        .children()
        .filter(|n| n.has_tag_name("host"))
}

fn child<'a, 'input>(
    node: Node<'a, 'input>,
    element: &'static str,
    parent: &'static str,
    source: &Path,
) -> Result<Node<'a, 'input>> {
    node.children()
        .find(|n| n.has_tag_name(element))
        .ok_or_else(|| SpecterError::MissingElement {
            element,
            parent,
            path: source.to_path_buf(),
        })
}

fn required_attr(
    node: Node<'_, '_>,
    attribute: &'static str,
    element: &'static str,
    source: &Path,
) -> Result<String> {
    node.attribute(attribute)
        .map(str::to_owned)
        .ok_or_else(|| SpecterError::MissingAttribute {
            attribute,
            element,
            path: source.to_path_buf(),
        })
}

fn host_address(host: Node<'_, '_>, source: &Path) -> Result<IpAddr> {
    let address = child(host, "address", "host", source)?;
    let value = required_attr(address, "addr", "address", source)?;
    value
        .parse::<IpAddr>()
        .map_err(|_| SpecterError::InvalidAddress {
            value,
            path: source.to_path_buf(),
        })
}

fn port_nodes<'a, 'input>(
    host: Node<'a, 'input>,
    source: &Path,
) -> Result<impl Iterator<Item = Node<'a, 'input>>> {
    let ports = child(host, "ports", "host", source)?;
    Ok(ports.children().filter(|n| n.has_tag_name("port")))
}

/// `portid` names an output file, so only plain port numbers are accepted.
fn port_id(port: Node<'_, '_>, source: &Path) -> Result<String> {
    let value = required_attr(port, "portid", "port", source)?;
    if value.parse::<u16>().is_err() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SpecterError::InvalidPort {
            value,
            path: source.to_path_buf(),
        });
    }
    Ok(value)
}

fn read_record(ip: IpAddr, port: Node<'_, '_>, source: &Path) -> Result<ScanRecord> {
    let state = child(port, "state", "port", source)?;
    let service = port.children().find(|n| n.has_tag_name("service"));

    Ok(ScanRecord {
        ip_address: ip,
        protocol: required_attr(port, "protocol", "port", source)?,
        port_id: port_id(port, source)?,
        state: required_attr(state, "state", "state", source)?,
        state_reason: state.attribute("reason").map(str::to_owned),
        state_reason_ttl: state.attribute("reason_ttl").map(str::to_owned),
        service_name: service.and_then(|s| s.attribute("name")).map(str::to_owned),
        service_banner: service
            .and_then(|s| s.attribute("banner"))
            .map(str::to_owned),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "masscan.xml";

    fn host(addr: &str, ports: &str) -> String {
        format!(r#"<host endtime="1"><address addr="{addr}" addrtype="ipv4"/><ports>{ports}</ports></host>"#)
    }

    fn port(proto: &str, id: &str, state: &str) -> String {
        format!(
            r#"<port protocol="{proto}" portid="{id}"><state state="{state}" reason="syn-ack" reason_ttl="64"/></port>"#
        )
    }

    fn report(hosts: &[String]) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<!-- masscan v1.0 scan -->\n<?xml-stylesheet href=\"\" type=\"text/xsl\"?>\n<nmaprun scanner=\"masscan\">{}<runstats/></nmaprun>",
            hosts.concat()
        )
    }

    #[test]
    fn web_candidates_require_open_tcp_web_port() {
        let xml = report(&[
            host("10.0.0.1", &port("tcp", "443", "open")),
            host("10.0.0.2", &port("tcp", "22", "open")),
            host("10.0.0.3", &port("udp", "80", "open")),
            host("10.0.0.4", &port("tcp", "8080", "closed")),
        ]);
        let doc = parse_report(&xml).unwrap();
        let got = extract_web_candidates(&doc, Path::new(SRC), WEB_PORTS).unwrap();
        assert_eq!(got.into_iter().collect::<Vec<_>>(), vec!["10.0.0.1".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn port_index_ignores_state_and_protocol() {
        let xml = report(&[
            host("10.0.0.1", &port("tcp", "22", "closed")),
            host("10.0.0.2", &port("udp", "22", "open")),
        ]);
        let doc = parse_report(&xml).unwrap();
        let index = build_port_index(&doc, Path::new(SRC)).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index["22"].len(), 2);
    }

    #[test]
    fn host_lines_sort_as_text() {
        let xml = report(&[
            host("10.0.0.1", &port("tcp", "9", "open")),
            host("10.0.0.1", &port("tcp", "10", "open")),
        ]);
        let doc = parse_report(&xml).unwrap();
        let index = build_host_index(&doc, Path::new(SRC)).unwrap();
        let lines = &index[&"10.0.0.1".parse::<IpAddr>().unwrap()];
        assert_eq!(lines, &vec!["10,open,syn-ack,64".to_string(), "9,open,syn-ack,64".to_string()]);
    }

    #[test]
    fn missing_state_is_structural_error() {
        let xml = report(&[host("10.0.0.1", r#"<port protocol="tcp" portid="80"/>"#)]);
        let doc = parse_report(&xml).unwrap();
        let err = build_port_index(&doc, Path::new(SRC)).unwrap_err();
        assert!(matches!(err, SpecterError::MissingElement { element: "state", .. }));
    }

    #[test]
    fn missing_ports_is_structural_error() {
        let xml = report(&[r#"<host><address addr="10.0.0.1"/></host>"#.to_string()]);
        let doc = parse_report(&xml).unwrap();
        let err = build_host_index(&doc, Path::new(SRC)).unwrap_err();
        assert!(matches!(err, SpecterError::MissingElement { element: "ports", .. }));
    }

    #[test]
    fn truncated_report_yields_empty_results() {
        let got = decompose_str("<nmaprun><host><address", Path::new(SRC)).unwrap();
        assert!(got.is_empty());
        let got = decompose_str("", Path::new(SRC)).unwrap();
        assert!(got.is_empty());
    }
}
