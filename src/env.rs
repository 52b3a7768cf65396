use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::{CStr, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Name of the variable holding the colon-separated executable search path.
pub const PATH_VAR: &str = "PATH";

/// Read-only view of the process context used by the interpreter.
///
/// The environment contains:
/// - `vars`: the process variables captured at start-up (only `PATH` and, as a
///   fallback for the prompt, the user name are consulted).
/// - `user` and `home_dir`: the invoking user's account record; `home_dir` is
///   the target of a bare `cd`.
/// - `current_dir`: the working directory, changed only by `cd` and inherited
///   by every spawned child.
///
/// Tests build it directly with fake values instead of touching the real
/// process environment.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Environment variables by name. Values are kept as the OS handed them over.
    pub vars: HashMap<String, OsString>,
    /// Login name of the invoking user, if the account record could be read.
    pub user: Option<String>,
    /// Home directory of the invoking user, if it could be determined.
    pub home_dir: Option<PathBuf>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// User name and home directory come from the password database entry of
    /// the real user id, like `getpwuid(getuid())`. When there is no entry the
    /// home directory falls back to [`dirs::home_dir`].
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let (user, home_dir) = match account_record() {
            Some(AccountRecord { name, home }) => (Some(name), Some(home)),
            None => {
                log::debug!("no password database entry for the current user");
                (None, dirs::home_dir())
            }
        };
        Self {
            vars: capture_vars(stdenv::vars_os()),
            user,
            home_dir,
            current_dir,
        }
    }

    /// Get the value of a captured environment variable.
    pub fn get_var(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(key).map(OsString::as_os_str)
    }

    #[cfg(test)]
    pub(crate) fn set_var(&mut self, key: impl Into<String>, val: impl Into<OsString>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The raw search path list, if `PATH` is set.
    pub fn search_path(&self) -> Option<&OsStr> {
        self.get_var(PATH_VAR)
    }

    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }

    /// Name of the invoking user: the account record, else `USER` or `LOGNAME`.
    pub fn user_name(&self) -> Option<&str> {
        self.user.as_deref().or_else(|| {
            ["USER", "LOGNAME"]
                .into_iter()
                .find_map(|key| self.get_var(key).and_then(OsStr::to_str))
        })
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep every variable whose name is valid UTF-8, whatever its value.
fn capture_vars(vars: impl Iterator<Item = (OsString, OsString)>) -> HashMap<String, OsString> {
    vars.filter_map(|(k, v)| Some((k.into_string().ok()?, v))).collect()
}

struct AccountRecord {
    name: String,
    home: PathBuf,
}

/// Password database entry of the real user id.
fn account_record() -> Option<AccountRecord> {
    // SAFETY: getuid has no preconditions and cannot fail.
    let uid = unsafe { libc::getuid() };
    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        // SAFETY: an all-zero passwd is a valid value for getpwuid_r to overwrite.
        let mut entry: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        // SAFETY: every pointer refers to a live local and `buf` is writable for its length.
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut entry, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < 1 << 20 {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 || result.is_null() {
            return None;
        }
        // SAFETY: on success pw_name and pw_dir point to NUL-terminated strings inside `buf`.
        let (name, home) = unsafe {
            (CStr::from_ptr(entry.pw_name), CStr::from_ptr(entry.pw_dir))
        };
        return Some(AccountRecord {
            name: name.to_string_lossy().into_owned(),
            home: PathBuf::from(OsStr::from_bytes(home.to_bytes())),
        });
    }
}
