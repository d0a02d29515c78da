use line_index::{LineIndex, WideEncoding};
use text_size::TextRange;

/// Location of a diagnostic in a source document.
///
/// `character_index` counts UTF-16 code units from the start of the line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub file_path: Box<str>,
    pub absolute_index: u32,
    pub line_index: u32,
    pub character_index: u32,
    pub length: u32,
}

impl SourceSpan {
    pub fn from_range(file_path: &str, range: TextRange, line_index: &LineIndex) -> Self {
        let line_col = line_index.line_col(range.start());
        let character_index = line_index
            .to_wide(WideEncoding::Utf16, line_col)
            .map_or(line_col.col, |wide| wide.col);

        Self {
            file_path: file_path.into(),
            absolute_index: range.start().into(),
            line_index: line_col.line,
            character_index,
            length: range.len().into(),
        }
    }
}

impl std::fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}:{},{} [{}] {})",
            self.absolute_index,
            self.line_index,
            self.character_index,
            self.length,
            self.file_path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_line_span() {
        let text = "<p>\n  @{\n";
        let index = LineIndex::new(text);
        let span = SourceSpan::from_range("a.cshtml", TextRange::at(6.into(), 2.into()), &index);

        assert_eq!(span.absolute_index, 6);
        assert_eq!(span.line_index, 1);
        assert_eq!(span.character_index, 2);
        assert_eq!(span.length, 2);
        assert_eq!(span.to_string(), "(6:1,2 [2] a.cshtml)");
    }
}
