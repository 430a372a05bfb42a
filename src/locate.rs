//! Browser discovery: find the first usable candidate in a fixed list.
//!
//! A candidate matches when it exists as a file, or, for a bare command name,
//! when an executable of that name sits in a directory on the search path.
//! The list order is the priority order: installer paths come before bare
//! command names.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Browsers known to support `--headless --print-to-pdf`, in lookup order.
pub const DEFAULT_BROWSER_CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "google-chrome",
    "chromium-browser",
    "google-chrome-stable",
    "chromium",
];

/// Locate the first candidate using the process `PATH`.
pub fn locate<S: AsRef<str>>(candidates: &[S]) -> Option<PathBuf> {
    locate_in(candidates, std::env::var_os("PATH").as_deref())
}

/// Locate the first candidate, resolving bare names against `search_path`
/// (a `PATH`-style list). Returns `None` when nothing matches.
pub fn locate_in<S: AsRef<str>>(candidates: &[S], search_path: Option<&OsStr>) -> Option<PathBuf> {
    candidates.iter().find_map(|c| {
        let found = resolve(c.as_ref(), search_path);
        match &found {
            Some(p) => debug!("Candidate {:?} resolved to {}", c.as_ref(), p.display()),
            None => debug!("Candidate {:?} not found", c.as_ref()),
        }
        found
    })
}

fn resolve(candidate: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if candidate.is_empty() {
        return None;
    }
    let path = Path::new(candidate);
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if is_bare_name(path) {
        return search_path.and_then(|sp| which_in(candidate, sp));
    }
    None
}

fn is_bare_name(path: &Path) -> bool {
    path.components().count() == 1 && !path.is_absolute()
}

fn which_in(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| executable_names(name).into_iter().map(move |n| dir.join(n)))
        .find(|p| is_executable(p))
}

#[cfg(windows)]
fn executable_names(name: &str) -> Vec<OsString> {
    vec![OsString::from(name), OsString::from(format!("{name}.exe"))]
}

#[cfg(not(windows))]
fn executable_names(name: &str) -> Vec<OsString> {
    vec![OsString::from(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
