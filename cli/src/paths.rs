//! Default output naming.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use cryptool_core::constants::CONTAINER_EXTENSION;

/// `report.pdf` -> `report.pdf.crpt`
pub fn encrypt_output(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".");
    name.push(CONTAINER_EXTENSION);
    PathBuf::from(name)
}

/// `report.pdf.crpt` -> `report.pdf`
pub fn decrypt_output(input: &Path) -> Result<PathBuf> {
    match input.extension() {
        Some(ext) if ext == CONTAINER_EXTENSION && input.file_stem().is_some() => {
            Ok(input.with_extension(""))
        }
        _ => bail!(
            "{} has no .{} extension; pass --output",
            input.display(),
            CONTAINER_EXTENSION
        ),
    }
}
