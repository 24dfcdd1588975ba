use std::fmt::Display;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SpecterError};

/// Write `values` to `path`, one per line, sorted as text. Sets arrive
/// already unique; lists are written as given. The final line has no
/// trailing newline and any existing content is replaced. The parent
/// directory must already exist.
pub fn write_sorted<I, T>(path: &Path, values: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let mut lines: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
    lines.sort();

    fs::write(path, lines.join("\n")).map_err(|e| SpecterError::io(path, e))?;
    debug!("wrote {} entries to {}", lines.len(), path.display());
    Ok(())
}

/// Fails unless `dir` is an existing directory the current user can create
/// files in. Checked by creating (and dropping) an anonymous temp file there.
pub fn ensure_writable_dir(dir: &Path) -> Result<()> {
    let not_writable = || SpecterError::NotWritable {
        path: dir.to_path_buf(),
    };
    if !dir.is_dir() {
        return Err(not_writable());
    }
    tempfile::tempfile_in(dir).map_err(|_| not_writable())?;
    Ok(())
}

/// Fails unless `path` is an existing regular file that can be opened for
/// reading. `setting` names the settings key the path came from.
pub fn ensure_readable_file(path: &Path, setting: &str) -> Result<()> {
    if !path.is_file() {
        return Err(SpecterError::InputFile {
            path: path.to_path_buf(),
            reason: format!("the \"{setting}\" option in settings.toml must exist and reference a file"),
        });
    }
    fs::File::open(path).map_err(|_| SpecterError::InputFile {
        path: path.to_path_buf(),
        reason: format!("the \"{setting}\" option in settings.toml must be a readable file"),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::net::IpAddr;

    #[test]
    fn sorts_as_text_and_has_no_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let ips: BTreeSet<IpAddr> = ["10.0.0.5", "10.0.0.10", "9.9.9.9"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();

        write_sorted(&path, &ips).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "10.0.0.10\n10.0.0.5\n9.9.9.9");
    }

    #[test]
    fn rewrite_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let lines = vec!["443,open", "80,open", "443,open"];

        write_sorted(&path, &lines).unwrap();
        let first = fs::read(&path).unwrap();
        write_sorted(&path, &lines).unwrap();
        assert_eq!(first, fs::read(&path).unwrap());
        assert_eq!(first, b"443,open\n443,open\n80,open");
    }

    #[test]
    fn empty_set_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "stale").unwrap();
        write_sorted(&path, Vec::<String>::new()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn missing_dir_is_not_writable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_writable_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, SpecterError::NotWritable { .. }));
        assert!(ensure_writable_dir(dir.path()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn read_only_dir_is_not_writable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // root ignores mode bits; nothing to check there.
        let can_write = fs::write(locked.join("x"), "").is_ok();
        let result = ensure_writable_dir(&locked);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if can_write {
            return;
        }

        assert!(matches!(result, Err(SpecterError::NotWritable { .. })));
        assert_eq!(fs::read_dir(&locked).unwrap().count(), 0);
    }

    #[test]
    fn readable_file_check_names_setting() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_readable_file(&dir.path().join("missing.txt"), "[web_scan].clean_target_list_file_name")
            .unwrap_err();
        assert!(err.to_string().contains("[web_scan].clean_target_list_file_name"));
    }
}
