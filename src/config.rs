//! Configuration types for a conversion run.
//!
//! All behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. The defaults reproduce the fixed behaviour of
//! the tool when run without arguments: fixed input/output file names in the
//! working directory, the built-in browser candidate list and `pandoc`.

use crate::error::Doc2PdfError;
use crate::layout::PageLayout;
use crate::locate::DEFAULT_BROWSER_CANDIDATES;
use crate::progress::ProgressCallback;
use crate::strategy::Strategy;
use pdfium_setup::SetupOptions;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// HTML source read by the browser strategy.
pub const DEFAULT_HTML: &str = "Crisis_Companion_Updated_Overview.html";
/// Markdown source read by the document-tool and manual strategies.
pub const DEFAULT_MARKDOWN: &str = "Crisis_Companion_Updated_Overview.md";
/// PDF written by whichever strategy succeeds.
pub const DEFAULT_OUTPUT: &str = "Crisis_Companion_Updated_Overview.pdf";
/// Title line drawn at the top of the first page by the manual renderer.
pub const DEFAULT_TITLE: &str = "Crisis Companion - Solana Mobile Hackathon Submission";
/// Document converter invoked by the document-tool strategy.
pub const DEFAULT_DOC_TOOL: &str = "pandoc";

/// Configuration for a conversion run.
///
/// # Example
/// ```rust
/// use doc2pdf::{ConversionConfig, Strategy};
///
/// let config = ConversionConfig::builder()
///     .output("report.pdf")
///     .process_timeout_secs(30)
///     .skip(Strategy::Browser)
///     .build()
///     .unwrap();
/// assert_eq!(config.strategies(), vec![Strategy::DocTool, Strategy::Manual]);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    pub html_path: PathBuf,
    pub markdown_path: PathBuf,
    pub output_path: PathBuf,

    /// Title drawn by the manual renderer.
    pub title: String,

    /// Explicit browser; checked before [`Self::browser_candidates`].
    pub browser: Option<PathBuf>,

    /// Ordered browser candidates: absolute install paths first, then bare
    /// command names resolved on `PATH`.
    pub browser_candidates: Vec<String>,

    /// Document converter command. Default: `pandoc`.
    pub doc_tool: String,

    /// Wall-clock limit for each external process. Default: 120 s.
    ///
    /// A browser stuck on a network resource or a converter waiting on a
    /// LaTeX prompt would otherwise block the whole chain.
    pub process_timeout_secs: u64,

    /// Strategies left out of the chain. The remaining order never changes.
    pub skip: Vec<Strategy>,

    /// Download PDFium once if it cannot be bound. Default: true.
    pub auto_install: bool,

    /// Where the manual renderer looks for (and installs) PDFium.
    pub engine: SetupOptions,

    /// Page geometry and fonts used by the manual renderer.
    pub layout: PageLayout,

    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            html_path: PathBuf::from(DEFAULT_HTML),
            markdown_path: PathBuf::from(DEFAULT_MARKDOWN),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            title: DEFAULT_TITLE.to_string(),
            browser: None,
            browser_candidates: DEFAULT_BROWSER_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            doc_tool: DEFAULT_DOC_TOOL.to_string(),
            process_timeout_secs: 120,
            skip: Vec::new(),
            auto_install: true,
            engine: SetupOptions::from_env(),
            layout: PageLayout::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("html_path", &self.html_path)
            .field("markdown_path", &self.markdown_path)
            .field("output_path", &self.output_path)
            .field("title", &self.title)
            .field("browser", &self.browser)
            .field("browser_candidates", &self.browser_candidates)
            .field("doc_tool", &self.doc_tool)
            .field("process_timeout_secs", &self.process_timeout_secs)
            .field("skip", &self.skip)
            .field("auto_install", &self.auto_install)
            .field("engine", &self.engine)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Strategies that will run, in chain order.
    pub fn strategies(&self) -> Vec<Strategy> {
        Strategy::ORDER
            .into_iter()
            .filter(|s| !self.skip.contains(s))
            .collect()
    }

    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.process_timeout_secs)
    }

    /// Browser candidates with the explicit override, if any, in front.
    pub fn browser_search_list(&self) -> Vec<String> {
        let mut list = Vec::with_capacity(self.browser_candidates.len() + 1);
        if let Some(ref b) = self.browser {
            list.push(b.to_string_lossy().into_owned());
        }
        list.extend(self.browser_candidates.iter().cloned());
        list
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn html(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.html_path = path.into();
        self
    }

    pub fn markdown(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.markdown_path = path.into();
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn browser(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser = Some(path.into());
        self
    }

    /// Replace the built-in candidate list entirely.
    pub fn browser_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.browser_candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    pub fn doc_tool(mut self, command: impl Into<String>) -> Self {
        self.config.doc_tool = command.into();
        self
    }

    pub fn process_timeout_secs(mut self, secs: u64) -> Self {
        self.config.process_timeout_secs = secs;
        self
    }

    pub fn skip(mut self, strategy: Strategy) -> Self {
        if !self.config.skip.contains(&strategy) {
            self.config.skip.push(strategy);
        }
        self
    }

    pub fn auto_install(mut self, v: bool) -> Self {
        self.config.auto_install = v;
        self
    }

    pub fn engine(mut self, opts: SetupOptions) -> Self {
        self.config.engine = opts;
        self
    }

    pub fn layout(mut self, layout: PageLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Doc2PdfError> {
        let c = &self.config;
        if c.output_path.as_os_str().is_empty() {
            return Err(Doc2PdfError::InvalidConfig(
                "Output path must not be empty".into(),
            ));
        }
        if c.process_timeout_secs == 0 {
            return Err(Doc2PdfError::InvalidConfig(
                "Process timeout must be ≥ 1 second".into(),
            ));
        }
        if c.doc_tool.trim().is_empty() {
            return Err(Doc2PdfError::InvalidConfig(
                "Document tool command must not be empty".into(),
            ));
        }
        if c.strategies().is_empty() {
            return Err(Doc2PdfError::InvalidConfig(
                "Every strategy is skipped; nothing would run".into(),
            ));
        }
        c.layout.validate()?;
        Ok(self.config)
    }
}
