//! Document-converter conversion of the Markdown source (`pandoc` by default).

use crate::config::ConversionConfig;
use crate::error::AttemptFailure;
use crate::strategy::process::run_tool;
use std::ffi::OsString;
use tracing::info;

/// Run `<doc_tool> <markdown> -o <output>`.
///
/// A tool that cannot be resolved fails with [`AttemptFailure::NotFound`];
/// one that runs and exits non-zero fails with
/// [`AttemptFailure::ToolFailed`] carrying its stderr. A missing Markdown
/// file is left for the tool to report.
pub async fn convert_with_doc_tool(config: &ConversionConfig) -> Result<(), AttemptFailure> {
    info!(
        "Running {} on {}",
        config.doc_tool,
        config.markdown_path.display()
    );
    let args: [OsString; 3] = [
        config.markdown_path.clone().into(),
        "-o".into(),
        config.output_path.clone().into(),
    ];
    run_tool(&config.doc_tool, &config.doc_tool, args, config.process_timeout()).await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unresolvable_tool_is_not_found() {
        let config = ConversionConfig::builder()
            .doc_tool("doc2pdf-test-no-such-pandoc")
            .build()
            .unwrap();
        let err = convert_with_doc_tool(&config).await.unwrap_err();
        assert_eq!(
            err,
            AttemptFailure::NotFound {
                tool: "doc2pdf-test-no-such-pandoc".into()
            }
        );
    }

    #[tokio::test]
    async fn failing_tool_surfaces_exit_status() {
        // `false` ignores its arguments and exits 1.
        let config = ConversionConfig::builder().doc_tool("false").build().unwrap();
        let err = convert_with_doc_tool(&config).await.unwrap_err();
        assert!(
            matches!(err, AttemptFailure::ToolFailed { status: Some(1), .. }),
            "got {err:?}"
        );
    }
}
