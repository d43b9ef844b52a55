// ABOUTME: Configuration options for the outline engine including ContentType, FuzzyTieBreak, Options, and OutlinerBuilder.
// ABOUTME: OutlinerBuilder provides a fluent API for constructing Outliner instances with custom settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::outliner::Outliner;

/// The content type format for serialized records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Html,
    Markdown,
    Text,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentType::Html => "html",
            ContentType::Markdown => "markdown",
            ContentType::Text => "text",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => ContentType::Markdown,
            "text" | "txt" => ContentType::Text,
            _ => ContentType::Html,
        }
    }
}

/// How the fuzzy linker picks a key when several listing texts clear the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FuzzyTieBreak {
    /// Highest similarity wins.
    #[default]
    Highest,
    /// Lowest similarity that still cleared the threshold wins. Ties go to
    /// the earliest listing, and a spent exact key falls back to fuzzy search.
    Lowest,
}

/// Configuration options for the outliner.
#[derive(Debug, Clone)]
pub struct Options {
    /// URL prefix for generated page paths and page-index links.
    pub path_prefix: String,
    /// Similarity a listing text must strictly exceed to match a target text.
    pub fuzzy_threshold: f64,
    pub fuzzy_tie_break: FuzzyTieBreak,
    /// Adjacent h1 candidates closer than this many top-level nodes are one chapter.
    pub chapter_merge_distance: usize,
    /// Number of siblings scanned after the master table of contents marker.
    pub master_toc_window: usize,
    pub content_type: ContentType,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            path_prefix: String::new(),
            fuzzy_threshold: 0.97,
            fuzzy_tie_break: FuzzyTieBreak::Highest,
            chapter_merge_distance: 4,
            master_toc_window: 30,
            content_type: ContentType::Html,
        }
    }
}

/// Builder for constructing Outliner instances with custom configuration.
#[derive(Debug, Clone)]
pub struct OutlinerBuilder {
    opts: Options,
}

impl OutlinerBuilder {
    /// Create a new OutlinerBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the URL prefix used for page paths and page-index links.
    ///
    /// Trailing slashes are dropped so the prefix can be joined with `/`.
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.opts.path_prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    /// Set the fuzzy match threshold.
    pub fn fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.opts.fuzzy_threshold = threshold;
        self
    }

    /// Set the fuzzy tie-break rule.
    pub fn fuzzy_tie_break(mut self, tie_break: FuzzyTieBreak) -> Self {
        self.opts.fuzzy_tie_break = tie_break;
        self
    }

    /// Set the top-level distance under which adjacent chapter headings merge.
    pub fn chapter_merge_distance(mut self, distance: usize) -> Self {
        self.opts.chapter_merge_distance = distance;
        self
    }

    /// Set how many siblings after the master TOC marker are scanned.
    pub fn master_toc_window(mut self, window: usize) -> Self {
        self.opts.master_toc_window = window;
        self
    }

    /// Set the content type for serialized records.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.opts.content_type = content_type;
        self
    }

    /// Build the Outliner with the configured options.
    pub fn build(self) -> Outliner {
        Outliner::new(self.opts)
    }
}

impl Default for OutlinerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
