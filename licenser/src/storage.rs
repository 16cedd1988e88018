//! File access and the license file encoding.
//!
//! Writes replace the whole file and are not atomic. A crash mid-write can
//! leave a truncated file, which decodes as a format error.

use crate::error::{LicenseError, LicenseResult};
use crate::license::SignedLicense;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Reads a whole file.
pub fn read_file(path: impl AsRef<Path>) -> LicenseResult<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| LicenseError::io(path, e))
}

/// Writes a whole file readable and writable by the owner only.
///
/// On non-Unix platforms the default permissions apply.
pub fn write_private_file(path: impl AsRef<Path>, bytes: &[u8]) -> LicenseResult<()> {
    let path = path.as_ref();
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| LicenseError::io(path, e))?;

    // `mode` only applies on creation. Tighten an existing file before any
    // bytes are written to it.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| LicenseError::io(path, e))?;
    }

    file.write_all(bytes).map_err(|e| LicenseError::io(path, e))?;

    debug!(path = %path.display(), len = bytes.len(), "Wrote file");
    Ok(())
}

/// Encodes a signed license as indented JSON.
pub fn encode_license(license: &SignedLicense) -> LicenseResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(license)?)
}

/// Decodes a signed license from JSON bytes.
pub fn decode_license(bytes: &[u8]) -> LicenseResult<SignedLicense> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Reads and decodes a license file.
pub fn read_license(path: impl AsRef<Path>) -> LicenseResult<SignedLicense> {
    let path = path.as_ref();
    let bytes = read_file(path)?;
    serde_json::from_slice(&bytes).map_err(|source| LicenseError::Format {
        path: path.to_path_buf(),
        source,
    })
}

/// Encodes and writes a license file.
pub fn write_license(license: &SignedLicense, path: impl AsRef<Path>) -> LicenseResult<()> {
    let bytes = encode_license(license)?;
    write_private_file(path, &bytes)
}
