//! The three conversion strategies, in fallback order.
//!
//! ```text
//! browser ──fail──▶ doc-tool ──fail──▶ manual
//! (HTML, headless   (Markdown,         (Markdown, drawn
//!  print-to-pdf)     pandoc)            with PDFium)
//! ```
//!
//! Each strategy shares one capability: attempt the conversion and report
//! `Ok(())` or a typed [`AttemptFailure`]. The driver in [`crate::convert`]
//! walks [`Strategy::ORDER`] and stops at the first success.
//!
//! 1. [`browser`]: locate a Chromium-family browser, print the HTML page
//! 2. [`doc_tool`]: hand the Markdown to a document converter
//! 3. [`manual`]: lay the Markdown out line by line and draw it
//! 4. [`process`]: shared subprocess runner with timeout

pub mod browser;
pub mod doc_tool;
pub mod manual;
pub mod process;

use crate::config::ConversionConfig;
use crate::error::AttemptFailure;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A conversion strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Headless browser printing the HTML source.
    Browser,
    /// External document converter on the Markdown source.
    DocTool,
    /// Built-in line-by-line renderer on the Markdown source.
    Manual,
}

impl Strategy {
    /// Fixed fallback order.
    pub const ORDER: [Strategy; 3] = [Strategy::Browser, Strategy::DocTool, Strategy::Manual];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Browser => "browser",
            Strategy::DocTool => "doc-tool",
            Strategy::Manual => "manual",
        }
    }

    /// Run this strategy once.
    pub async fn attempt(self, config: &ConversionConfig) -> Result<(), AttemptFailure> {
        match self {
            Strategy::Browser => browser::convert_with_browser(config).await,
            Strategy::DocTool => doc_tool::convert_with_doc_tool(config).await,
            Strategy::Manual => manual::render_manually(config).await,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_browser_doc_tool_manual() {
        assert_eq!(
            Strategy::ORDER,
            [Strategy::Browser, Strategy::DocTool, Strategy::Manual]
        );
    }

    #[test]
    fn serde_names_match_display() {
        for s in Strategy::ORDER {
            let json = serde_json::to_string(&s).unwrap();
            assert_eq!(json, format!("\"{s}\""));
        }
    }
}
