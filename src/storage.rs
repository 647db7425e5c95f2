//! Session token persistence.
//!
//! The token lives in a single cookie-style file, `hexToken=<token>; expires=<date>`,
//! so an expired sign-in is dropped the same way a browser drops an expired cookie.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

pub const TOKEN_COOKIE: &str = "hexToken";

/// Default token location: `<config dir>/catalog-admin/hexToken`.
pub fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("catalog-admin")
        .join(TOKEN_COOKIE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub token: String,
    pub expires: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a token. `expired_ms` is the API's Unix-millisecond expiry; values that
    /// do not map to a date are stored without an `expires` attribute.
    pub fn save(&self, token: &str, expired_ms: i64) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let expires = OffsetDateTime::from_unix_timestamp_nanos(expired_ms as i128 * 1_000_000)
            .ok()
            .filter(|_| expired_ms > 0);
        let line = render_cookie(token, expires)?;
        let mut file = open_private(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Load the token if one is stored and has not expired.
    pub fn load(&self) -> Result<Option<String>> {
        self.load_at(OffsetDateTime::now_utc())
    }

    pub fn load_at(&self, now: OffsetDateTime) -> Result<Option<String>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        Ok(parse_cookie(&raw)
            .filter(|t| t.expires.map(|exp| exp > now).unwrap_or(true))
            .map(|t| t.token))
    }

    /// Remove the stored token. A missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", self.path.display())),
        }
    }
}

/// Open the token file for writing, readable by the owner only.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a file left by an older run too.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::File::create(path)
}

fn render_cookie(token: &str, expires: Option<OffsetDateTime>) -> Result<String> {
    let mut line = format!("{TOKEN_COOKIE}={token};");
    if let Some(exp) = expires {
        let date = exp.format(&Rfc2822).context("failed to format token expiry")?;
        line.push_str(&format!(" expires={date};"));
    }
    line.push('\n');
    Ok(line)
}

fn parse_cookie(raw: &str) -> Option<StoredToken> {
    let mut token = None;
    let mut expires = None;
    for part in raw.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim() {
            TOKEN_COOKIE => token = Some(value.trim().to_string()),
            k if k.eq_ignore_ascii_case("expires") => {
                expires = OffsetDateTime::parse(value.trim(), &Rfc2822).ok();
            }
            _ => {}
        }
    }
    token
        .filter(|t| !t.is_empty())
        .map(|token| StoredToken { token, expires })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_COOKIE);
        std::fs::write(&path, "hexToken=old;").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = TokenStore::new(&path);
        store.save("tok-abc", 0).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-abc"));
    }

    #[test]
    fn save_then_load_before_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join(TOKEN_COOKIE));
        // 2030-01-01T00:00:00Z
        store.save("tok-abc", 1_893_456_000_000).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("hexToken=tok-abc;"));
        assert!(raw.contains("expires="));

        let loaded = store.load_at(datetime!(2029-12-31 23:59 UTC)).unwrap();
        assert_eq!(loaded.as_deref(), Some("tok-abc"));
    }

    #[test]
    fn expired_cookie_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join(TOKEN_COOKIE));
        store.save("tok-old", 1_893_456_000_000).unwrap();

        let loaded = store.load_at(datetime!(2030-01-02 00:00 UTC)).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn missing_file_and_clear_are_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join(TOKEN_COOKIE));
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();

        store.save("tok", 0).unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn parses_cookie_with_extra_attributes() {
        let t = parse_cookie("hexToken=abc; expires=Tue, 01 Jan 2030 00:00:00 +0000; path=/")
            .unwrap();
        assert_eq!(t.token, "abc");
        assert_eq!(t.expires, Some(datetime!(2030-01-01 00:00 UTC)));
        assert!(parse_cookie("other=1").is_none());
        assert!(parse_cookie("hexToken=;").is_none());
    }
}
