use std::fs;
use std::path::Path;

use colored::Colorize;

use crate::error::{Result, SpecterError};
use crate::workdir::Workdir;

/// Print the work directory as a tree.
pub fn execute(workdir: &Workdir) -> Result<()> {
    print!("{}", render(workdir.root(), true)?);
    Ok(())
}

/// Directories first, then files, each group sorted by name.
pub fn render(root: &Path, color: bool) -> Result<String> {
    if !root.is_dir() {
        return Err(SpecterError::Workdir {
            message: format!(
                "{} does not exist; run `specter init` first",
                root.display()
            ),
        });
    }
    let mut out = String::new();
    out.push_str(&dir_label(&root.display().to_string(), color));
    out.push('\n');
    walk(root, "", color, &mut out)?;
    Ok(out)
}

fn walk(dir: &Path, prefix: &str, color: bool, out: &mut String) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| SpecterError::io(dir, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| SpecterError::io(dir, e))?;
    entries.sort_by_key(|e| (!e.path().is_dir(), e.file_name()));

    let count = entries.len();
    for (i, entry) in entries.into_iter().enumerate() {
        let last = i + 1 == count;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let branch = if last { "└── " } else { "├── " };

        out.push_str(prefix);
        out.push_str(branch);
        if path.is_dir() {
            out.push_str(&dir_label(&name, color));
            out.push('\n');
            let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
            walk(&path, &child_prefix, color, out)?;
        } else {
            out.push_str(&name);
            out.push('\n');
        }
    }
    Ok(())
}

fn dir_label(name: &str, color: bool) -> String {
    if color {
        name.blue().bold().to_string()
    } else {
        name.to_string()
    }
}
