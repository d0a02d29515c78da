//! `#if` regions inside code blocks.
//!
//! A region is resolved when its `#if` line is reached: every branch that is
//! not taken becomes one opaque range the parser hands out as
//! `CSHARP_DISABLED_TEXT`, whatever tokenizer is active. Braces and tags in
//! a disabled branch therefore never take part in balancing, and markup may
//! open in one branch and close after `#endif`.

use rustc_hash::FxHashSet;
use text_size::{TextRange, TextSize};

/// Name of the directive on a preprocessor line, without the `#`.
pub(crate) fn directive_name(line: &str) -> &str {
    let name = line.trim_start().trim_start_matches('#').trim_start();
    &name[..name.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(name.len())]
}

/// The text after the directive name, without a trailing `//` comment.
fn directive_argument(line: &str) -> &str {
    let name = directive_name(line);
    let rest = line.trim_start().trim_start_matches('#').trim_start();
    let rest = &rest[name.len()..];
    rest.split("//").next().unwrap_or("").trim()
}

/// The symbol a `#define` or `#undef` line names.
pub(crate) fn defined_symbol(line: &str) -> Option<&str> {
    let symbol = directive_argument(line);
    (!symbol.is_empty()).then_some(symbol)
}

/// The ranges of the branches not taken in the region whose `#if` directive
/// starts at `start`.
pub(crate) fn disabled_ranges(text: &str, start: TextSize, defines: &FxHashSet<&str>) -> Vec<TextRange> {
    let mut lines = Lines { text, offset: usize::from(start) };
    let Some(first) = lines.next() else { return Vec::new() };

    let mut disabled = Vec::new();
    let mut taken = evaluate(directive_argument(first.text), defines);
    let mut branch_active = taken;
    let mut body_start = first.next;
    let mut depth = 0u32;

    for line in lines {
        let Some(hash) = directive_start(line.text) else { continue };
        let name = directive_name(line.text);
        match name {
            "if" => depth += 1,
            "endif" if depth > 0 => depth -= 1,
            "elif" | "else" if depth == 0 => {
                close_branch(&mut disabled, branch_active, body_start, line.start + hash);
                branch_active = !taken && (name == "else" || evaluate(directive_argument(line.text), defines));
                taken |= branch_active;
                body_start = line.next;
            }
            "endif" => {
                close_branch(&mut disabled, branch_active, body_start, line.start + hash);
                return disabled;
            }
            _ => {}
        }
    }

    close_branch(&mut disabled, branch_active, body_start, text.len());
    disabled
}

fn close_branch(disabled: &mut Vec<TextRange>, active: bool, start: usize, end: usize) {
    if !active && end > start {
        disabled.push(range(start, end));
    }
}

fn range(start: usize, end: usize) -> TextRange {
    let to_size = |offset: usize| TextSize::try_from(offset).unwrap_or(TextSize::new(u32::MAX));
    TextRange::new(to_size(start), to_size(end))
}

/// Offset of the `#` when `line` is a preprocessor line.
fn directive_start(line: &str) -> Option<usize> {
    let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
    line[indent..].starts_with('#').then_some(indent)
}

struct Line<'a> {
    text: &'a str,
    start: usize,
    /// Start of the following line.
    next: usize,
}

struct Lines<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        if self.offset >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.offset..];
        let len = rest.find(['\r', '\n']).unwrap_or(rest.len());
        let newline = match rest[len..].as_bytes() {
            [b'\r', b'\n', ..] => 2,
            [] => 0,
            _ => 1,
        };
        let line = Line { text: &rest[..len], start: self.offset, next: self.offset + len + newline };
        self.offset = line.next;
        Some(line)
    }
}

/// Evaluates an `#if` condition. Unknown symbols are false and a malformed
/// condition is false as a whole.
pub(crate) fn evaluate(condition: &str, defines: &FxHashSet<&str>) -> bool {
    let mut parser = Condition { rest: condition, defines };
    let value = parser.or();
    match value {
        Some(value) if parser.rest.trim().is_empty() => value,
        _ => false,
    }
}

struct Condition<'a, 'd> {
    rest: &'a str,
    defines: &'d FxHashSet<&'d str>,
}

impl Condition<'_, '_> {
    fn eat(&mut self, token: &str) -> bool {
        self.rest = self.rest.trim_start();
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn or(&mut self) -> Option<bool> {
        let mut value = self.and()?;
        while self.eat("||") {
            value |= self.and()?;
        }
        Some(value)
    }

    fn and(&mut self) -> Option<bool> {
        let mut value = self.equality()?;
        while self.eat("&&") {
            value &= self.equality()?;
        }
        Some(value)
    }

    fn equality(&mut self) -> Option<bool> {
        let mut value = self.unary()?;
        loop {
            if self.eat("==") {
                value = value == self.unary()?;
            } else if self.eat("!=") {
                value = value != self.unary()?;
            } else {
                return Some(value);
            }
        }
    }

    fn unary(&mut self) -> Option<bool> {
        if self.eat("!") {
            return self.unary().map(|value| !value);
        }
        if self.eat("(") {
            let value = self.or()?;
            return self.eat(")").then_some(value);
        }
        self.rest = self.rest.trim_start();
        let len = self.rest.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(self.rest.len());
        if len == 0 {
            return None;
        }
        let (symbol, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(match symbol {
            "true" => true,
            "false" => false,
            _ => self.defines.contains(symbol),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defines<'a>(symbols: &[&'a str]) -> FxHashSet<&'a str> {
        symbols.iter().copied().collect()
    }

    fn disabled_text(text: &str, symbols: &[&str]) -> Vec<String> {
        let start = TextSize::try_from(text.find('#').unwrap()).unwrap();
        disabled_ranges(text, start, &defines(symbols)).into_iter().map(|range| text[range].to_owned()).collect()
    }

    #[test]
    fn conditions() {
        let symbols = defines(&["DEBUG", "TRACE"]);
        assert!(evaluate("DEBUG", &symbols));
        assert!(!evaluate("RELEASE", &symbols));
        assert!(evaluate("DEBUG && (TRACE || RELEASE)", &symbols));
        assert!(evaluate("!RELEASE", &symbols));
        assert!(evaluate("DEBUG == true", &symbols));
        assert!(evaluate("RELEASE != DEBUG", &symbols));
        assert!(!evaluate("false", &symbols));
        assert!(!evaluate("DEBUG &&", &symbols));
        assert!(!evaluate("(DEBUG", &symbols));
    }

    #[test]
    fn untaken_branches_are_disabled() {
        let text = "#if DEBUG\n  a {\n#elif TRACE\n  b\n#else\n  c\n#endif\nd";
        assert_eq!(disabled_text(text, &[]), ["  a {\n", "  b\n"]);
        assert_eq!(disabled_text(text, &["DEBUG"]), ["  b\n", "  c\n"]);
        assert_eq!(disabled_text(text, &["TRACE"]), ["  a {\n", "  c\n"]);
    }

    #[test]
    fn nested_regions_belong_to_their_branch() {
        let text = "#if false\n#if true\nx\n#endif\n#else\ny\n#endif\n";
        assert_eq!(disabled_text(text, &[]), ["#if true\nx\n#endif\n"]);
    }

    #[test]
    fn unterminated_region_runs_to_the_end() {
        assert_eq!(disabled_text("#if false\r\nx {", &[]), ["x {"]);
        assert!(disabled_text("#if true\nx {", &[]).is_empty());
    }

    #[test]
    fn directive_lines() {
        assert_eq!(directive_name("  #  elif X"), "elif");
        assert_eq!(defined_symbol("#define DEBUG // on"), Some("DEBUG"));
        assert_eq!(defined_symbol("#undef"), None);
    }
}
