use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Fail when `output` names the same file as the capture being analyzed.
pub fn ensure_not_capture(output: &Path, capture: &Path) -> Result<()> {
    let capture_real = capture
        .canonicalize()
        .with_context(|| format!("cannot resolve capture path {}", capture.display()))?;
    let Some(output_real) = resolve_output(output)? else {
        return Ok(());
    };

    if output_real == capture_real {
        bail!(
            "{} is the capture being analyzed; choose another output path",
            output.display()
        );
    }
    Ok(())
}

/// Real path of an output file that may not exist yet.
///
/// The parent directory is resolved instead of the file itself, so `..` and
/// symlinked directories are followed. `None` when the parent does not exist,
/// in which case the output cannot alias the capture.
fn resolve_output(output: &Path) -> Result<Option<PathBuf>> {
    if output.exists() {
        return output
            .canonicalize()
            .map(Some)
            .with_context(|| format!("cannot resolve output path {}", output.display()));
    }

    let Some(name) = output.file_name() else {
        return Ok(None);
    };
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.is_dir() {
        return Ok(None);
    }
    let parent = parent
        .canonicalize()
        .with_context(|| format!("cannot resolve directory {}", parent.display()))?;
    Ok(Some(parent.join(name)))
}
