//! # pdfium-setup
//!
//! Finds and binds the [PDFium](https://pdfium.googlesource.com/pdfium/)
//! library that `doc2pdf` draws its fallback PDFs with, and fetches it on
//! demand when no copy is available.
//!
//! Binding and installing are separate calls:
//!
//! * [`bind`] never touches the network. It tries an explicit library path,
//!   then the versioned cache directory, then the system library.
//! * [`install`] downloads the platform archive from
//!   [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries)
//!   and extracts the library into the cache. It is a no-op when the cache
//!   already holds a copy.
//!
//! Callers that want "bind, install once, bind again" compose the two; doc2pdf
//! does exactly that and gives up after the second bind.
//!
//! ```rust,no_run
//! use pdfium_setup::{bind, install, SetupOptions};
//!
//! let opts = SetupOptions::from_env();
//! let pdfium = match bind(&opts) {
//!     Ok(p) => p,
//!     Err(_) => {
//!         install(&opts, None).expect("download failed");
//!         bind(&opts).expect("PDFium still unavailable")
//!     }
//! };
//! # drop(pdfium);
//! ```
//!
//! ## Environment variables
//!
//! - `DOC2PDF_PDFIUM_PATH`: path to an existing pdfium library.
//! - `DOC2PDF_CACHE_DIR`: override the default cache directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// The pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

/// Environment variable naming an existing pdfium library.
pub const ENV_LIBRARY_PATH: &str = "DOC2PDF_PDFIUM_PATH";

/// Environment variable overriding the cache root.
pub const ENV_CACHE_DIR: &str = "DOC2PDF_CACHE_DIR";

const BASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while locating, binding or installing PDFium.
#[derive(Error, Debug)]
pub enum SetupError {
    /// No prebuilt archive exists for this OS/architecture.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// Could not create the cache directory.
    #[error("Cache directory error: {0}")]
    CacheDir(#[source] std::io::Error),

    /// Network download failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// gzip/tar extraction failed.
    #[error("Archive extraction failed: {0}")]
    Extract(String),

    /// The library was found (or looked up system-wide) but could not be loaded.
    #[error("Failed to bind PDFium from {location}: {reason}")]
    Bind { location: String, reason: String },
}

// ── Platform metadata ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Platform {
    archive: &'static str,
    entry: &'static str,
    file_name: &'static str,
}

const fn layout(archive: &'static str, file_name: &'static str, entry: &'static str) -> Platform {
    Platform {
        archive,
        entry,
        file_name,
    }
}

fn current_platform() -> Result<Platform, SetupError> {
    platform_for(std::env::consts::OS, std::env::consts::ARCH)
}

fn platform_for(os: &str, arch: &str) -> Result<Platform, SetupError> {
    let p = match (os, arch) {
        ("macos", "aarch64") => layout("pdfium-mac-arm64.tgz", "libpdfium.dylib", "lib/libpdfium.dylib"),
        ("macos", "x86_64") => layout("pdfium-mac-x64.tgz", "libpdfium.dylib", "lib/libpdfium.dylib"),
        ("linux", "x86_64") => layout("pdfium-linux-x64.tgz", "libpdfium.so", "lib/libpdfium.so"),
        ("linux", "aarch64") => layout("pdfium-linux-arm64.tgz", "libpdfium.so", "lib/libpdfium.so"),
        ("windows", "x86_64") => layout("pdfium-win-x64.tgz", "pdfium.dll", "bin/pdfium.dll"),
        ("windows", "aarch64") => layout("pdfium-win-arm64.tgz", "pdfium.dll", "bin/pdfium.dll"),
        ("windows", "x86") => layout("pdfium-win-x86.tgz", "pdfium.dll", "bin/pdfium.dll"),
        (os, arch) => {
            return Err(SetupError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            })
        }
    };
    Ok(p)
}

// ── Options ──────────────────────────────────────────────────────────────────

/// Where to look for PDFium and where to put a downloaded copy.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// An existing library file. Checked before the cache.
    pub library_path: Option<PathBuf>,
    /// Cache root; the versioned `pdfium-{VERSION}` directory lives below it.
    /// `None` uses the platform cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Whole-request timeout for [`install`]. Default: 300 s.
    pub download_timeout: Duration,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            library_path: None,
            cache_dir: None,
            download_timeout: Duration::from_secs(300),
        }
    }
}

impl SetupOptions {
    /// Defaults, with `DOC2PDF_PDFIUM_PATH` and `DOC2PDF_CACHE_DIR` applied.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| {
            std::env::var_os(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            library_path: non_empty(ENV_LIBRARY_PATH),
            cache_dir: non_empty(ENV_CACHE_DIR),
            ..Self::default()
        }
    }

    /// The versioned directory a downloaded library is extracted into.
    ///
    /// - **macOS**: `~/Library/Caches/doc2pdf/pdfium-{VERSION}/`
    /// - **Linux**: `~/.cache/doc2pdf/pdfium-{VERSION}/`
    /// - **Windows**: `%LOCALAPPDATA%\doc2pdf\pdfium-{VERSION}\`
    pub fn versioned_cache_dir(&self) -> PathBuf {
        let root = match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir()
                .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
                .unwrap_or_else(std::env::temp_dir)
                .join("doc2pdf"),
        };
        root.join(format!("pdfium-{PDFIUM_VERSION}"))
    }

    /// Full path of the cached library for the current platform.
    pub fn cached_library_path(&self) -> Result<PathBuf, SetupError> {
        let platform = current_platform()?;
        Ok(self.versioned_cache_dir().join(platform.file_name))
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Returns the first PDFium library file that exists: the explicit
/// `library_path`, then the cached copy. `None` when neither is present.
pub fn locate_library(opts: &SetupOptions) -> Option<PathBuf> {
    if let Some(p) = opts.library_path.as_ref().filter(|p| p.is_file()) {
        return Some(p.clone());
    }
    opts.cached_library_path().ok().filter(|p| p.is_file())
}

/// Binds PDFium without downloading anything.
///
/// Uses [`locate_library`] and falls back to the system library.
pub fn bind(opts: &SetupOptions) -> Result<Pdfium, SetupError> {
    match locate_library(opts) {
        Some(path) => bind_from_path(&path),
        None => Pdfium::bind_to_system_library()
            .map(Pdfium::new)
            .map_err(|e| SetupError::Bind {
                location: "the system library path".to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Binds to a PDFium library at an explicit `path`.
pub fn bind_from_path(path: &Path) -> Result<Pdfium, SetupError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| SetupError::Bind {
            location: format!("'{}'", path.display()),
            reason: e.to_string(),
        })
}

/// Ensures the library is present in the cache, downloading it if needed.
///
/// `on_progress` receives `(bytes_downloaded, total_bytes)` while the archive
/// streams in. Returns the path of the cached library.
pub fn install(
    opts: &SetupOptions,
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<PathBuf, SetupError> {
    let platform = current_platform()?;
    let cache_dir = opts.versioned_cache_dir();
    let lib_path = cache_dir.join(platform.file_name);

    if lib_path.is_file() {
        return Ok(lib_path);
    }

    std::fs::create_dir_all(&cache_dir).map_err(SetupError::CacheDir)?;

    let url = format!(
        "{BASE_URL}/chromium%2F{PDFIUM_VERSION}/{}",
        platform.archive
    );
    let archive = download(&url, opts.download_timeout, on_progress)?;
    extract_entry(&archive, platform.entry, &lib_path)?;

    Ok(lib_path)
}

// ── Internal helpers ─────────────────────────────────────────────────────────

/// Counts bytes as they are written and reports them to `on_progress`.
struct Counting<'a> {
    buf: Vec<u8>,
    total: Option<u64>,
    on_progress: Option<&'a dyn Fn(u64, Option<u64>)>,
}

impl Write for Counting<'_> {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(data);
        if let Some(cb) = self.on_progress {
            cb(self.buf.len() as u64, self.total);
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn download(
    url: &str,
    timeout: Duration,
    on_progress: Option<&dyn Fn(u64, Option<u64>)>,
) -> Result<Vec<u8>, SetupError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdfium-setup/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .map_err(|e| SetupError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| SetupError::Download(format!("{url}: {e}")))?;

    let total = response.content_length();
    let mut sink = Counting {
        buf: Vec::with_capacity(total.unwrap_or(0) as usize),
        total,
        on_progress,
    };
    response
        .copy_to(&mut sink)
        .map_err(|e| SetupError::Download(format!("{url}: {e}")))?;

    Ok(sink.buf)
}

/// Unpacks the archive member named `entry` to `dest`.
///
/// The member is streamed into a temporary file next to `dest` and renamed
/// into place only once every byte is written; `dest` never holds a partial
/// library.
fn extract_entry(archive: &[u8], entry: &str, dest: &Path) -> Result<(), SetupError> {
    let io_err = |e: std::io::Error| SetupError::Extract(e.to_string());

    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(archive));
    let mut member = None;
    for item in tar.entries().map_err(io_err)? {
        let item = item.map_err(io_err)?;
        if item.path().map_err(io_err)?.as_os_str() == entry {
            member = Some(item);
            break;
        }
    }
    let mut member =
        member.ok_or_else(|| SetupError::Extract(format!("'{entry}' missing from archive")))?;

    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    let expected = member.size();
    let copied = std::io::copy(&mut member, &mut tmp).map_err(io_err)?;
    if copied != expected {
        return Err(SetupError::Extract(format!(
            "'{entry}' truncated: {copied} of {expected} bytes"
        )));
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(dest)
        .map_err(|e| SetupError::Extract(format!("cannot place '{}': {}", dest.display(), e.error)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn tgz_with(name: &str, body: &[u8]) -> Vec<u8> {
        let gz = GzEncoder::new(Vec::new(), Compression::fast());
        let mut builder = tar::Builder::new(gz);
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, body).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn current_platform_is_known() {
        let p = current_platform().expect("CI platforms are covered");
        assert!(p.archive.ends_with(".tgz"));
        assert!(p.entry.ends_with(p.file_name));
    }

    #[test]
    fn unknown_platform_is_rejected() {
        let err = platform_for("plan9", "mips").unwrap_err();
        assert!(err.to_string().contains("plan9/mips"));
    }

    #[test]
    fn cache_dir_honours_override_and_version() {
        let opts = SetupOptions {
            cache_dir: Some(PathBuf::from("/tmp/doc2pdf-cache")),
            ..SetupOptions::default()
        };
        let d = opts.versioned_cache_dir();
        assert!(d.starts_with("/tmp/doc2pdf-cache"));
        assert!(d.ends_with(format!("pdfium-{PDFIUM_VERSION}")));
    }

    #[test]
    fn locate_prefers_explicit_library_path() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("libpdfium-custom.so");
        std::fs::write(&lib, b"not really a library").unwrap();

        let opts = SetupOptions {
            library_path: Some(lib.clone()),
            cache_dir: Some(dir.path().join("cache")),
            ..SetupOptions::default()
        };
        assert_eq!(locate_library(&opts), Some(lib));
    }

    #[test]
    fn locate_skips_missing_explicit_path_and_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let opts = SetupOptions {
            library_path: Some(dir.path().join("missing.so")),
            cache_dir: Some(dir.path().to_path_buf()),
            ..SetupOptions::default()
        };
        assert_eq!(locate_library(&opts), None);
    }

    #[test]
    fn install_is_noop_when_cached() {
        let dir = tempfile::tempdir().unwrap();
        let opts = SetupOptions {
            cache_dir: Some(dir.path().to_path_buf()),
            ..SetupOptions::default()
        };
        let cached = opts.cached_library_path().unwrap();
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, b"cached").unwrap();

        let got = install(&opts, None).expect("no download needed");
        assert_eq!(got, cached);
        assert_eq!(locate_library(&opts), Some(cached));
    }

    #[test]
    fn extract_finds_named_entry() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("libpdfium.so");
        let archive = tgz_with("lib/libpdfium.so", b"ELF-ish");

        extract_entry(&archive, "lib/libpdfium.so", &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"ELF-ish");
    }

    #[test]
    fn truncated_archive_leaves_no_library() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("libpdfium.so");
        let body: Vec<u8> = (0..200_000u32).map(|i| (i * 7919 % 251) as u8).collect();
        let archive = tgz_with("lib/libpdfium.so", &body);
        let cut = &archive[..archive.len() / 2];

        assert!(extract_entry(cut, "lib/libpdfium.so", &dest).is_err());
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn extract_reports_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = tgz_with("include/fpdfview.h", b"/* header */");

        let err = extract_entry(&archive, "lib/libpdfium.so", &dir.path().join("x")).unwrap_err();
        assert!(matches!(err, SetupError::Extract(_)));
        assert!(err.to_string().contains("lib/libpdfium.so"));
    }
}
