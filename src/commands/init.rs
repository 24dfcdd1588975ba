use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{Result, SpecterError};
use crate::workdir::{Workdir, SAMPLE_EXCLUDES, SAMPLE_SETTINGS, SAMPLE_TARGETS};

/// Create the work directory skeleton and drop the sample settings and lists
/// into it. Existing files are left alone unless `force` is set.
pub fn execute(workdir: &Workdir, force: bool) -> Result<()> {
    info!(
        "Creating specter input & output directories under: \"{}\"",
        workdir.root().display()
    );
    for dir in [workdir.input_dir(), workdir.output_root()] {
        fs::create_dir_all(&dir).map_err(|e| SpecterError::io(&dir, e))?;
    }

    let input = workdir.input_dir();
    write_sample(&workdir.settings_path(), SAMPLE_SETTINGS, force)?;
    write_sample(&input.join("targets.txt"), SAMPLE_TARGETS, force)?;
    write_sample(&input.join("exclude.txt"), SAMPLE_EXCLUDES, force)?;
    Ok(())
}

fn write_sample(path: &Path, content: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        warn!(
            "Keeping existing \"{}\" (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }
    info!("Writing sample file to: \"{}\"", path.display());
    fs::write(path, content).map_err(|e| SpecterError::io(path, e))
}
