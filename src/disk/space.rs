//! Volume capacity queries (`statvfs`)

use crate::error::{DiskError, DiskResult};
use std::path::Path;

/// Capacity of the volume containing a path, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeSpace {
    /// Total size of the volume
    pub total: u64,
    /// Free bytes, including blocks reserved for privileged users
    pub free: u64,
    /// Free bytes available to unprivileged users
    pub usable: u64,
}

/// Query the volume containing `path`
#[cfg(unix)]
pub fn volume_space(path: &Path) -> DiskResult<VolumeSpace> {
    use std::ffi::CString;
    use std::io;
    use std::os::unix::ffi::OsStrExt;

    let path_cstr = CString::new(path.as_os_str().as_bytes()).map_err(|_| DiskError::StatFailed {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path contains null bytes"),
    })?;

    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::statvfs(path_cstr.as_ptr(), &mut stat) };

    if result != 0 {
        return Err(DiskError::StatFailed {
            path: path.to_path_buf(),
            source: io::Error::last_os_error(),
        });
    }

    let fragment = stat.f_frsize as u64;
    Ok(VolumeSpace {
        total: stat.f_blocks as u64 * fragment,
        free: stat.f_bfree as u64 * fragment,
        usable: stat.f_bavail as u64 * fragment,
    })
}

/// Query the volume containing `path`
#[cfg(not(unix))]
pub fn volume_space(_path: &Path) -> DiskResult<VolumeSpace> {
    Err(DiskError::Unsupported {
        operation: "volume_space",
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_volume_space_of_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let space = volume_space(dir.path()).unwrap();
        assert!(space.total > 0);
        assert!(space.free <= space.total);
        assert!(space.usable <= space.free);
    }

    #[test]
    fn test_volume_space_missing_path() {
        let err = volume_space(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, DiskError::StatFailed { .. }));
    }
}
