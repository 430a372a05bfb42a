//! Headless-browser conversion of the HTML source.

use crate::config::ConversionConfig;
use crate::error::AttemptFailure;
use crate::locate::locate;
use crate::strategy::process::run_tool;
use std::ffi::OsString;
use std::path::Path;
use tracing::info;
use url::Url;

/// Print `config.html_path` to `config.output_path` with the first browser
/// the locator finds.
///
/// Success is the browser's exit status alone; the written file is not
/// checked.
pub async fn convert_with_browser(config: &ConversionConfig) -> Result<(), AttemptFailure> {
    let browser = locate(&config.browser_search_list()).ok_or_else(|| AttemptFailure::NotFound {
        tool: "Chrome/Chromium".to_string(),
    })?;
    info!("Using browser {}", browser.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_browser_located(&browser);
    }

    // A browser handed a missing file prints its error page and exits 0.
    let html = std::fs::canonicalize(&config.html_path).map_err(|_| {
        AttemptFailure::SourceMissing {
            path: config.html_path.clone(),
        }
    })?;

    let tool = browser
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "browser".to_string());

    let args = print_to_pdf_args(&html, &config.output_path).ok_or_else(|| {
        AttemptFailure::SourceMissing {
            path: config.html_path.clone(),
        }
    })?;

    run_tool(&tool, &browser, args, config.process_timeout()).await
}

/// Command line for headless printing of a local page.
///
/// `html` must be absolute; the page is passed as a percent-encoded
/// `file://` URL. `None` when the path cannot be expressed as one.
pub fn print_to_pdf_args(html: &Path, output: &Path) -> Option<Vec<OsString>> {
    let page = Url::from_file_path(html).ok()?;

    let mut print_to = OsString::from("--print-to-pdf=");
    print_to.push(output);

    Some(vec![
        "--headless".into(),
        "--disable-gpu".into(),
        print_to,
        "--print-to-pdf-no-header".into(),
        page.as_str().into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;

    #[cfg(unix)]
    #[test]
    fn args_use_headless_print_flags_and_file_uri() {
        let args = print_to_pdf_args(Path::new("/work/page.html"), Path::new("out.pdf")).unwrap();
        assert_eq!(
            args,
            vec![
                OsString::from("--headless"),
                OsString::from("--disable-gpu"),
                OsString::from("--print-to-pdf=out.pdf"),
                OsString::from("--print-to-pdf-no-header"),
                OsString::from("file:///work/page.html"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn reserved_characters_in_page_path_are_encoded() {
        let html = Path::new("/work/C# notes/50% off?.html");
        let args = print_to_pdf_args(html, Path::new("out.pdf")).unwrap();
        let page = args[4].to_str().unwrap();

        assert_eq!(page, "file:///work/C%23%20notes/50%25%20off%3F.html");
        let parsed = Url::parse(page).unwrap();
        assert_eq!(parsed.fragment(), None);
        assert_eq!(parsed.to_file_path().unwrap(), html);
    }

    #[test]
    fn relative_page_path_is_rejected() {
        assert!(print_to_pdf_args(Path::new("page.html"), Path::new("out.pdf")).is_none());
    }

    #[tokio::test]
    async fn no_candidate_is_not_found() {
        let config = ConversionConfig::builder()
            .browser_candidates(["/nonexistent/doc2pdf/browser"])
            .build()
            .unwrap();
        let err = convert_with_browser(&config).await.unwrap_err();
        assert!(matches!(err, AttemptFailure::NotFound { .. }), "got {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_html_is_reported_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        // Any existing file counts as a located browser; it is never run.
        let fake = dir.path().join("chrome");
        std::fs::write(&fake, "").unwrap();

        let config = ConversionConfig::builder()
            .browser_candidates([fake.to_string_lossy().into_owned()])
            .html(dir.path().join("missing.html"))
            .output(dir.path().join("out.pdf"))
            .build()
            .unwrap();

        let err = convert_with_browser(&config).await.unwrap_err();
        assert!(matches!(err, AttemptFailure::SourceMissing { .. }), "got {err:?}");
    }
}
