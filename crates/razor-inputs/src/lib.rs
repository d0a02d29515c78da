pub use razor_errors::LineIndex;
use razor_errors::{Diagnostic, SourceSpan};
use razor_parse::FileKind;

/// A Razor document on disk.
#[salsa::input(debug)]
pub struct File {
    #[returns(ref)]
    pub path: camino::Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
}

#[salsa::tracked]
impl File {
    #[salsa::tracked(returns(ref), no_eq)]
    pub fn line_index(self, db: &dyn salsa::Database) -> LineIndex {
        LineIndex::new(self.text(db))
    }

    /// `.razor` files are components, everything else is a legacy document.
    #[salsa::tracked]
    pub fn kind(self, db: &dyn salsa::Database) -> FileKind {
        self.path(db).extension().and_then(FileKind::from_extension).unwrap_or(FileKind::Legacy)
    }
}

impl File {
    pub fn source_span(self, db: &dyn salsa::Database, diagnostic: &Diagnostic) -> SourceSpan {
        diagnostic.source_span(self.path(db).as_str(), self.line_index(db))
    }
}

#[cfg(test)]
mod tests {
    use salsa::{DatabaseImpl, Setter};

    use super::*;

    #[test]
    fn kind_follows_the_extension() {
        let db = DatabaseImpl::default();
        let file = File::new(&db, "Pages/Index.cshtml".into(), String::new());
        assert_eq!(file.kind(&db), FileKind::Legacy);

        let file = File::new(&db, "Shared/Counter.razor".into(), String::new());
        assert_eq!(file.kind(&db), FileKind::Component);
    }

    #[test]
    fn spans_track_text_changes() {
        let mut db = DatabaseImpl::default();
        let file = File::new(&db, "a.cshtml".into(), "<p>\n@{".into());
        let diagnostic = Diagnostic::error(razor_errors::catalog::EXPECTED_BLOCK_END, "", text_range(5, 6));
        let span = file.source_span(&db, &diagnostic);
        assert_eq!((span.line_index, span.character_index), (1, 1));

        file.set_text(&mut db).to("<p>\n\n\n@{".into());
        let diagnostic = Diagnostic::error(razor_errors::catalog::EXPECTED_BLOCK_END, "", text_range(7, 8));
        let span = file.source_span(&db, &diagnostic);
        assert_eq!((span.line_index, span.character_index, span.length), (3, 1, 1));
    }

    fn text_range(start: u32, end: u32) -> razor_errors::TextRange {
        razor_errors::TextRange::new(start.into(), end.into())
    }
}
