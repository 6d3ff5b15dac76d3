//! Output naming policy.
//!
//! A merged checklist is named `{identifier}_{template file name}`, where the
//! identifier is the host name recorded in the old checklist, an explicit
//! prefix, or the old file's stem. Names are claimed in memory and checked
//! against the directory, so two merges into one directory never share a
//! name. Nothing is created on disk until the checklist itself is linked
//! into place by [`crate::store::save_new`], which refuses to replace a
//! file.

use crate::error::{CklbError, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default upper bound on numeric suffixes tried before giving up
pub const DEFAULT_MAX_SUFFIX: u32 = 9999;

/// Where the host identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    HostName,
    Prefix,
    FileStem,
}

/// Chosen host identifier and its source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostIdentity {
    pub identifier: String,
    pub source: IdentitySource,
}

impl HostIdentity {
    /// Pick an identifier: host name, then prefix, then the old file's stem.
    ///
    /// Falling back to the stem is never an error; callers surface it via
    /// [`NamingNotice::MissingHostIdentity`].
    #[must_use]
    pub fn resolve(host_name: Option<&str>, prefix: Option<&str>, old_path: &Path) -> Self {
        let non_blank = |s: &&str| !s.trim().is_empty();
        if let Some(host) = host_name.filter(non_blank) {
            return Self::new(host, IdentitySource::HostName);
        }
        if let Some(prefix) = prefix.filter(non_blank) {
            return Self::new(prefix, IdentitySource::Prefix);
        }
        let stem = old_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "checklist".to_string());
        Self::new(&stem, IdentitySource::FileStem)
    }

    fn new(raw: &str, source: IdentitySource) -> Self {
        Self {
            identifier: sanitize(raw.trim()),
            source,
        }
    }
}

/// Conditions resolved internally while naming an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NamingNotice {
    /// Neither a host name nor a prefix was available
    MissingHostIdentity { fallback: String },
    /// The first candidate name was taken and a suffix was appended
    OutputCollision { candidate: PathBuf, resolved: PathBuf },
}

/// A reserved output path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputName {
    pub path: PathBuf,
    pub identity: HostIdentity,
    pub notices: Vec<NamingNotice>,
}

/// Reserves collision-free output names in one directory.
///
/// Shared across threads; reservations are serialized through an internal
/// mutex. A reserved name stays claimed for the namer's lifetime unless it
/// is [released](Self::release).
#[derive(Debug)]
pub struct OutputNamer {
    dir: PathBuf,
    max_suffix: u32,
    claimed: Mutex<HashSet<PathBuf>>,
}

impl OutputNamer {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_suffix: DEFAULT_MAX_SUFFIX,
            claimed: Mutex::new(HashSet::new()),
        }
    }

    #[must_use]
    pub const fn with_max_suffix(mut self, max_suffix: u32) -> Self {
        self.max_suffix = max_suffix;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserve `{identifier}_{template_name}`, suffixing `_1`, `_2`, … before
    /// the extension until a free name is found.
    pub fn reserve(&self, identity: HostIdentity, template_name: &str) -> Result<OutputName> {
        let mut notices = Vec::new();
        if identity.source == IdentitySource::FileStem {
            tracing::warn!(
                "No host name or prefix available; naming output after '{}'",
                identity.identifier
            );
            notices.push(NamingNotice::MissingHostIdentity {
                fallback: identity.identifier.clone(),
            });
        }

        let base = format!("{}_{}", identity.identifier, template_name);
        let candidate = self.dir.join(&base);

        let mut claimed = self.claimed();

        for n in 0..=self.max_suffix {
            let path = if n == 0 {
                candidate.clone()
            } else {
                self.dir.join(suffixed(&base, n))
            };
            if claimed.contains(&path) {
                continue;
            }
            match fs::symlink_metadata(&path) {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    claimed.insert(path.clone());
                    if n > 0 {
                        tracing::debug!("{} exists, using {}", candidate.display(), path.display());
                        notices.push(NamingNotice::OutputCollision {
                            candidate: candidate.clone(),
                            resolved: path.clone(),
                        });
                    }
                    return Ok(OutputName {
                        path,
                        identity,
                        notices,
                    });
                }
                Err(e) => return Err(CklbError::io(&path, e)),
            }
        }

        Err(CklbError::io(
            candidate,
            std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("no free output name after {} attempts", self.max_suffix),
            ),
        ))
    }

    /// Give up a reserved name whose checklist was never written.
    pub fn release(&self, path: &Path) {
        self.claimed().remove(path);
    }

    // A poisoned set is still consistent
    fn claimed(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.claimed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Insert `_{n}` before the extension: `a_b.cklb` → `a_b_1.cklb`
fn suffixed(name: &str, n: u32) -> String {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            format!("{}_{n}.{}", stem.to_string_lossy(), ext.to_string_lossy())
        }
        _ => format!("{name}_{n}"),
    }
}

/// Keep an identifier from escaping the output directory
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_precedence() {
        let old = Path::new("/data/web01_RHEL_8_V1R1.cklb");
        let id = HostIdentity::resolve(Some("host-a"), Some("pre"), old);
        assert_eq!(id.identifier, "host-a");
        assert_eq!(id.source, IdentitySource::HostName);

        let id = HostIdentity::resolve(Some("  "), Some("pre"), old);
        assert_eq!(id.identifier, "pre");
        assert_eq!(id.source, IdentitySource::Prefix);

        let id = HostIdentity::resolve(None, None, old);
        assert_eq!(id.identifier, "web01_RHEL_8_V1R1");
        assert_eq!(id.source, IdentitySource::FileStem);
    }

    #[test]
    fn test_suffix_before_extension() {
        assert_eq!(suffixed("h_RHEL_8.cklb", 1), "h_RHEL_8_1.cklb");
        assert_eq!(suffixed("h_noext", 2), "h_noext_2");
    }

    #[test]
    fn test_sanitize_separators() {
        assert_eq!(sanitize("../etc/passwd"), ".._etc_passwd");
    }

    #[test]
    fn test_reserve_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let namer = OutputNamer::new(dir.path());
        let identity = HostIdentity::resolve(Some("web01"), None, Path::new("old.cklb"));

        let first = namer.reserve(identity.clone(), "RHEL_8.cklb").unwrap();
        let second = namer.reserve(identity.clone(), "RHEL_8.cklb").unwrap();
        let third = namer.reserve(identity, "RHEL_8.cklb").unwrap();

        assert_eq!(first.path, dir.path().join("web01_RHEL_8.cklb"));
        assert_eq!(second.path, dir.path().join("web01_RHEL_8_1.cklb"));
        assert_eq!(third.path, dir.path().join("web01_RHEL_8_2.cklb"));
        assert!(first.notices.is_empty());
        assert!(matches!(
            second.notices.as_slice(),
            [NamingNotice::OutputCollision { .. }]
        ));
    }

    #[test]
    fn test_reservation_leaves_directory_empty() {
        let dir = tempfile::tempdir().unwrap();
        let namer = OutputNamer::new(dir.path());
        let identity = HostIdentity::resolve(Some("web01"), None, Path::new("old.cklb"));

        let first = namer.reserve(identity.clone(), "T.cklb").unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        namer.release(&first.path);
        let again = namer.reserve(identity.clone(), "T.cklb").unwrap();
        assert_eq!(again.path, first.path);

        std::fs::write(dir.path().join("web01_T_1.cklb"), "prior").unwrap();
        let next = namer.reserve(identity, "T.cklb").unwrap();
        assert_eq!(next.path, dir.path().join("web01_T_2.cklb"));
    }

    #[test]
    fn test_missing_host_notice() {
        let dir = tempfile::tempdir().unwrap();
        let namer = OutputNamer::new(dir.path());
        let identity = HostIdentity::resolve(None, None, Path::new("/x/old_box.cklb"));
        let name = namer.reserve(identity, "T.cklb").unwrap();
        assert_eq!(name.path, dir.path().join("old_box_T.cklb"));
        assert_eq!(
            name.notices,
            vec![NamingNotice::MissingHostIdentity {
                fallback: "old_box".to_string()
            }]
        );
    }

    #[test]
    fn test_suffix_exhaustion() {
        let dir = tempfile::tempdir().unwrap();
        let namer = OutputNamer::new(dir.path()).with_max_suffix(1);
        let identity = HostIdentity::resolve(Some("h"), None, Path::new("o.cklb"));
        namer.reserve(identity.clone(), "T.cklb").unwrap();
        namer.reserve(identity.clone(), "T.cklb").unwrap();
        assert!(namer.reserve(identity, "T.cklb").is_err());
    }

    #[test]
    fn test_concurrent_reservations_are_unique() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let namer = Arc::new(OutputNamer::new(dir.path()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let namer = Arc::clone(&namer);
                std::thread::spawn(move || {
                    let identity = HostIdentity::resolve(Some("h"), None, Path::new("o.cklb"));
                    namer.reserve(identity, "T.cklb").unwrap().path
                })
            })
            .collect();
        let paths: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(paths.len(), 8);
    }
}
