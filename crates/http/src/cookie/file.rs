//! Cookie jar persisted to a JSON file
//!
//! Used by the command-line dashboard so a login survives between runs.
//! The file is written with restricted permissions (0600) because it holds
//! bearer credentials.

use super::{Cookie, CookieStore};
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Cookie jar backed by a JSON file, written through on every change
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    cookies: Mutex<BTreeMap<String, Cookie>>,
}

impl FileCookieJar {
    /// Open the jar at `path`, starting empty if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let cookies = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let mut cookies: BTreeMap<String, Cookie> = serde_json::from_str(&contents)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let now = Utc::now();
            cookies.retain(|_, cookie| !cookie.is_expired_at(now));
            cookies
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            cookies: Mutex::new(cookies),
        })
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, cookies: &BTreeMap<String, Cookie>) {
        if let Err(e) = write_private(&self.path, cookies) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist cookie jar");
        }
    }
}

fn write_private(path: &Path, cookies: &BTreeMap<String, Cookie>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = serde_json::to_string_pretty(cookies)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())
}

impl CookieStore for FileCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        cookies
            .get(name)
            .filter(|cookie| !cookie.is_expired_at(Utc::now()))
            .map(|cookie| cookie.value.clone())
    }

    fn set(&self, cookie: Cookie) {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        if cookie.is_expired_at(Utc::now()) {
            cookies.remove(&cookie.name);
        } else {
            cookies.insert(cookie.name.clone(), cookie);
        }
        self.persist(&cookies);
    }

    fn remove(&self, name: &str) {
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        if cookies.remove(name).is_some() {
            self.persist(&cookies);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cookies_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("cookies.json");

        let jar = FileCookieJar::open(&path).unwrap();
        jar.set(Cookie::persistent("auth_token", "abc", 1));
        jar.set(Cookie::persistent("refresh_token", "def", 7));
        drop(jar);

        let reopened = FileCookieJar::open(&path).unwrap();
        assert_eq!(reopened.get("auth_token").as_deref(), Some("abc"));
        assert_eq!(reopened.get("refresh_token").as_deref(), Some("def"));
    }

    #[test]
    fn removal_is_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");

        let jar = FileCookieJar::open(&path).unwrap();
        jar.set(Cookie::persistent("auth_token", "abc", 1));
        jar.remove("auth_token");

        let reopened = FileCookieJar::open(&path).unwrap();
        assert_eq!(reopened.get("auth_token"), None);
    }

    #[test]
    fn missing_file_is_empty_jar() {
        let dir = TempDir::new().unwrap();
        let jar = FileCookieJar::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(jar.get("auth_token"), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, "not json").unwrap();

        let err = FileCookieJar::open(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        let jar = FileCookieJar::open(&path).unwrap();
        jar.set(Cookie::persistent("auth_token", "abc", 1));

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
