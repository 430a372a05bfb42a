//! Built-in fallback: draw the Markdown source as plain text with PDFium.
//!
//! ## Engine availability
//!
//! PDFium is a dynamic library loaded at runtime, so it can be missing even
//! though the crate compiled. Binding is attempted once; if that fails and
//! installs are allowed, a single install step runs (download into the
//! cache) followed by exactly one more bind. There is no further retry.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a synchronous C++ library and the download is a blocking HTTP
//! request; both run on Tokio's blocking pool.

use crate::config::ConversionConfig;
use crate::error::AttemptFailure;
use crate::layout::{layout_document, FontFace, LaidOutPage, PageLayout};
use pdfium_render::prelude::*;
use std::fmt::Display;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Lay out `config.markdown_path` and write it to `config.output_path`.
pub async fn render_manually(config: &ConversionConfig) -> Result<(), AttemptFailure> {
    let source = tokio::fs::read_to_string(&config.markdown_path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AttemptFailure::SourceMissing {
                path: config.markdown_path.clone(),
            },
            _ => AttemptFailure::RenderFailed {
                detail: format!("cannot read '{}': {e}", config.markdown_path.display()),
            },
        })?;

    let pages = layout_document(&config.title, &source, &config.layout);
    info!(
        "Laid out {} pages from {}",
        pages.len(),
        config.markdown_path.display()
    );

    let config = config.clone();
    tokio::task::spawn_blocking(move || render_blocking(&config, &pages))
        .await
        .map_err(|e| AttemptFailure::RenderFailed {
            detail: format!("render task panicked: {e}"),
        })?
}

fn render_blocking(config: &ConversionConfig, pages: &[LaidOutPage]) -> Result<(), AttemptFailure> {
    let pdfium = bind_engine(config)?;
    let bytes = draw_pages(&pdfium, &config.layout, pages).map_err(|e| {
        AttemptFailure::RenderFailed {
            detail: format!("{e:?}"),
        }
    })?;
    debug!("Rendered {} bytes of PDF", bytes.len());
    write_atomically(&config.output_path, &bytes)
}

fn bind_engine(config: &ConversionConfig) -> Result<Pdfium, AttemptFailure> {
    let cb = config.progress_callback.as_deref();
    bind_with_setup(
        || pdfium_setup::bind(&config.engine),
        config.auto_install,
        || {
            if let Some(cb) = cb {
                cb.on_engine_install_start();
            }
            let progress = |downloaded: u64, total: Option<u64>| {
                if let Some(cb) = cb {
                    cb.on_engine_download_progress(downloaded, total);
                }
            };
            let result = pdfium_setup::install(&config.engine, Some(&progress));
            if let Some(cb) = cb {
                cb.on_engine_install_complete(result.is_ok());
            }
            result
        },
        |installed| {
            info!("PDF engine installed at {}", installed.display());
            pdfium_setup::bind_from_path(&installed)
        },
    )
}

/// Bind, and on failure run `setup` once and bind what it produced.
///
/// The retry goes through `rebind` with the setup result rather than
/// repeating `bind`, so a broken explicit library path cannot shadow the
/// freshly installed copy. With `allow_setup == false` the first failure is
/// final.
pub(crate) fn bind_with_setup<T, P, B, S, R, E1, E2>(
    bind: B,
    allow_setup: bool,
    setup: S,
    rebind: R,
) -> Result<T, AttemptFailure>
where
    B: FnOnce() -> Result<T, E1>,
    S: FnOnce() -> Result<P, E2>,
    R: FnOnce(P) -> Result<T, E1>,
    E1: Display,
    E2: Display,
{
    let first = match bind() {
        Ok(engine) => return Ok(engine),
        Err(e) => e,
    };

    if !allow_setup {
        return Err(AttemptFailure::LibraryUnavailable {
            detail: format!("{first} (automatic install disabled)"),
        });
    }

    warn!("PDF engine not available ({first}); installing");
    let installed = setup().map_err(|e| AttemptFailure::LibraryUnavailable {
        detail: format!("{first}; install failed: {e}"),
    })?;

    rebind(installed).map_err(|e| AttemptFailure::LibraryUnavailable {
        detail: format!("still unavailable after install: {e}"),
    })
}

/// Replay laid-out pages onto a new PDFium document.
fn draw_pages(
    pdfium: &Pdfium,
    layout: &PageLayout,
    pages: &[LaidOutPage],
) -> Result<Vec<u8>, PdfiumError> {
    let mut document = pdfium.create_new_pdf()?;
    let regular = document.fonts_mut().helvetica();
    let bold = document.fonts_mut().helvetica_bold();

    for laid_out in pages {
        let paper = PdfPagePaperSize::from_points(
            PdfPoints::new(layout.width),
            PdfPoints::new(layout.height),
        );
        let mut page = document.pages_mut().create_page_at_end(paper)?;

        for op in &laid_out.ops {
            let font = match op.face {
                FontFace::Regular => regular,
                FontFace::Bold => bold,
            };
            page.objects_mut().create_text_object(
                PdfPoints::new(op.x),
                PdfPoints::new(op.y),
                &op.text,
                font,
                PdfPoints::new(op.size),
            )?;
        }
    }

    document.save_to_bytes()
}

/// Temp file in the destination directory, then rename over `path`.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), AttemptFailure> {
    let fail = |detail: String| AttemptFailure::OutputWriteFailed {
        path: path.to_path_buf(),
        detail,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| fail(e.to_string()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| fail(e.to_string()))?;
    tmp.write_all(bytes).map_err(|e| fail(e.to_string()))?;
    tmp.persist(path).map_err(|e| fail(e.error.to_string()))?;
    Ok(())
}
