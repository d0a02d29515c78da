//! Diagnostics produced while parsing and rewriting Razor documents.
//!
//! A [`Diagnostic`] never aborts a parse: it is attached to the narrowest
//! enclosing syntax node and the run completes with a full-fidelity tree.

pub mod catalog;
mod span;

use std::fmt::{self, Display};

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use line_index::LineIndex;
pub use span::SourceSpan;
pub use text_size::{TextRange, TextSize};

/// Stable identifier of a diagnostic, e.g. `RZ1006`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagnosticId(&'static str);

impl DiagnosticId {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for DiagnosticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

/// An out-of-band record attached to a syntax node.
///
/// The range is absolute while the diagnostic travels through the parser and
/// relative to the owning node while it sits in a green node's side table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    id: DiagnosticId,
    severity: Severity,
    message: Box<str>,
    range: TextRange,
}

impl Diagnostic {
    pub fn new(
        id: DiagnosticId,
        severity: Severity,
        message: impl Into<Box<str>>,
        range: TextRange,
    ) -> Self {
        Self { id, severity, message: message.into(), range }
    }

    pub fn error(id: DiagnosticId, message: impl Into<Box<str>>, range: TextRange) -> Self {
        Self::new(id, Severity::Error, message, range)
    }

    pub fn warning(id: DiagnosticId, message: impl Into<Box<str>>, range: TextRange) -> Self {
        Self::new(id, Severity::Warning, message, range)
    }

    pub fn id(&self) -> DiagnosticId {
        self.id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns a copy whose range is moved by `offset` to the right.
    pub fn shifted_right(&self, offset: TextSize) -> Self {
        Self { range: self.range + offset, ..self.clone() }
    }

    /// Returns a copy whose range is moved by `offset` to the left.
    ///
    /// Panics if the range starts before `offset`.
    #[track_caller]
    pub fn shifted_left(&self, offset: TextSize) -> Self {
        Self { range: self.range - offset, ..self.clone() }
    }

    pub fn source_span(&self, file_path: &str, line_index: &LineIndex) -> SourceSpan {
        SourceSpan::from_range(file_path, self.range, line_index)
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let level = match self.severity {
            Severity::Warning => Level::Warning,
            Severity::Error => Level::Error,
        };
        let message = level.title(&self.message).id(self.id.as_str()).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(level.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start: u32 = self.range.start().into();
        let len: u32 = self.range.len().into();
        write!(f, "{} ({start}+{len}): {}", self.id, self.message)
    }
}
