// ABOUTME: Error types for the outline engine including ErrorCode enum and OutlineError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of outline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Io,
    Parse,
    Render,
    Serialize,
    Assets,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Io => "i/o error",
            ErrorCode::Parse => "parse error",
            ErrorCode::Render => "render error",
            ErrorCode::Serialize => "serialization error",
            ErrorCode::Assets => "asset relocation error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for outline operations.
///
/// Reconstruction itself is best-effort and never fails on messy markup;
/// these errors come from the surrounding input, output and asset steps.
#[derive(Debug, thiserror::Error)]
pub struct OutlineError {
    pub code: ErrorCode,
    pub path: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for OutlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "roadmap: {}", self.op)?;
        if !self.path.is_empty() {
            write!(f, " {}", self.path)?;
        }
        write!(f, ": {}", self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl OutlineError {
    fn with_code(
        code: ErrorCode,
        path: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            path: path.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an Io error.
    pub fn io(path: impl Into<String>, op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::with_code(ErrorCode::Io, path, op, source)
    }

    /// Create a Parse error.
    pub fn parse(
        path: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Parse, path, op, source)
    }

    /// Create a Render error.
    pub fn render(
        path: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Render, path, op, source)
    }

    /// Create a Serialize error.
    pub fn serialize(
        path: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Serialize, path, op, source)
    }

    /// Create an Assets error.
    pub fn assets(
        path: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Assets, path, op, source)
    }

    /// Returns true if this is an Io error.
    pub fn is_io(&self) -> bool {
        self.code == ErrorCode::Io
    }

    /// Returns true if this is a Parse error.
    pub fn is_parse(&self) -> bool {
        self.code == ErrorCode::Parse
    }

    /// Returns true if this is a Render error.
    pub fn is_render(&self) -> bool {
        self.code == ErrorCode::Render
    }

    /// Returns true if this is a Serialize error.
    pub fn is_serialize(&self) -> bool {
        self.code == ErrorCode::Serialize
    }

    /// Returns true if this is an Assets error.
    pub fn is_assets(&self) -> bool {
        self.code == ErrorCode::Assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_op_path_and_code() {
        let err = OutlineError::io("out/index.html", "WritePage", None);
        assert_eq!(err.to_string(), "roadmap: WritePage out/index.html: i/o error");
    }

    #[test]
    fn display_appends_source() {
        let err = OutlineError::parse("", "OutlineHtml", Some(anyhow::anyhow!("empty HTML")));
        assert_eq!(err.to_string(), "roadmap: OutlineHtml: parse error: empty HTML");
        assert!(err.is_parse());
        assert!(!err.is_io());
    }
}
