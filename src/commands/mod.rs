//! The operator-facing steps, run in order:
//! `init`, `clean_list`, `xml_scan`, `web_scan`; `tree` at any time.
pub mod clean_list;
pub mod init;
pub mod tree;
pub mod web_scan;
pub mod xml_scan;
