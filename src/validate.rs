use crate::error::CommandError;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Check that a resolved path can be run as a program.
///
/// The checks run in a fixed order and stop at the first failure:
/// missing path, then execute permission, then directory. A directory the
/// process may not search therefore reports `PermissionDenied`.
pub fn validate<'a>(resolved: Option<&'a Path>, name: &str) -> Result<&'a Path, CommandError> {
    let Some(path) = resolved else {
        return Err(CommandError::NotFound { name: name.into() });
    };
    if !is_executable(path) {
        return Err(CommandError::PermissionDenied { name: name.into() });
    }
    if path.is_dir() {
        return Err(CommandError::IsADirectory { name: name.into() });
    }
    Ok(path)
}

/// Whether the calling process has execute permission on `path`, as `access(2)` sees it.
fn is_executable(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    unsafe { libc::access(c_path.as_ptr(), libc::X_OK) == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::os::unix::fs::PermissionsExt;

    fn file_with_mode(dir: &Path, name: &str, mode: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn unresolved_is_not_found() {
        let err = validate(None, "frobnicate").unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
        assert_eq!(err.exit_code(), Some(127));
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn executable_file_passes_unchanged() {
        let temp = tempfile::tempdir().unwrap();
        let path = file_with_mode(temp.path(), "tool", 0o755);
        assert_eq!(validate(Some(&path), "tool").unwrap(), path.as_path());
    }

    #[test]
    fn directory_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let err = validate(Some(temp.path()), "somedir").unwrap_err();
        assert!(matches!(err, CommandError::IsADirectory { .. }));
        assert_eq!(err.exit_code(), Some(126));
    }

    #[test]
    fn non_executable_file_is_denied() {
        // root passes access(X_OK) only when some execute bit is set, so a
        // mode without any still fails for every user
        let temp = tempfile::tempdir().unwrap();
        let path = file_with_mode(temp.path(), "data", 0o644);
        let err = validate(Some(&path), "data").unwrap_err();
        assert!(matches!(err, CommandError::PermissionDenied { .. }));
        assert_eq!(err.exit_code(), Some(126));
    }
}
