use std::collections::VecDeque;

use drop_bomb::DropBomb;
use razor_errors::{Diagnostic, catalog};
use razor_syntax::{Annotation, GreenBuilder, RazorSyntaxTree, SyntaxKind, SyntaxSet};
use razor_tokenizer::{CSharpTokenizer, HtmlTokenizer, RazorCommentTokenizer, Token, Tokenizer};
use rustc_hash::FxHashSet;
use text_size::{TextRange, TextSize};

use crate::RazorParserOptions;
use crate::grammar::preprocessor;

/// The sub-grammar whose tokenizer currently feeds the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Markup,
    Code,
    Comment,
}

enum Lexer<'t> {
    Markup(HtmlTokenizer<'t>),
    Code(CSharpTokenizer<'t>),
    Comment(RazorCommentTokenizer<'t>),
}

impl<'t> Lexer<'t> {
    fn new(mode: Mode, text: &'t str, offset: TextSize, options: &RazorParserOptions) -> Self {
        match mode {
            Mode::Markup => Self::Markup(HtmlTokenizer::new(text, offset)),
            Mode::Code => Self::Code(CSharpTokenizer::new(text, offset, options.language_version())),
            Mode::Comment => Self::Comment(RazorCommentTokenizer::new(text, offset)),
        }
    }

    fn advance(&mut self) -> Token {
        match self {
            Self::Markup(tokenizer) => tokenizer.advance(),
            Self::Code(tokenizer) => tokenizer.advance(),
            Self::Comment(tokenizer) => tokenizer.advance(),
        }
    }
}

pub(crate) struct Parser<'t> {
    text: &'t str,
    options: &'t RazorParserOptions,
    mode: Mode,
    lexer: Lexer<'t>,
    lookahead: VecDeque<Token>,
    pos: TextSize,
    events: Vec<Event>,
    literal: Option<(Marker, SyntaxKind)>,
    depth: u32,
    depth_exceeded: bool,
    seen_directives: FxHashSet<&'t str>,
    /// Untaken `#if` branches ahead of the cursor, in source order.
    disabled: Vec<TextRange>,
    defines: FxHashSet<&'t str>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(text: &'t str, options: &'t RazorParserOptions) -> Self {
        let pos = TextSize::new(0);
        Self {
            text,
            options,
            mode: Mode::Markup,
            lexer: Lexer::new(Mode::Markup, text, pos, options),
            lookahead: VecDeque::new(),
            pos,
            events: Vec::new(),
            literal: None,
            depth: 0,
            depth_exceeded: false,
            seen_directives: FxHashSet::default(),
            disabled: Vec::new(),
            defines: FxHashSet::default(),
        }
    }

    pub(crate) fn options(&self) -> &'t RazorParserOptions {
        self.options
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    /// Hands the rest of the input to the tokenizer of `mode`.
    pub(crate) fn switch(&mut self, mode: Mode) {
        if self.mode != mode {
            self.mode = mode;
            self.relex();
        }
    }

    fn relex(&mut self) {
        self.lexer = Lexer::new(self.mode, self.text, self.pos, self.options);
        self.lookahead.clear();
    }

    pub(crate) fn pos(&self) -> TextSize {
        self.pos
    }

    /// Unconsumed source text.
    pub(crate) fn rest(&self) -> &'t str {
        &self.text[usize::from(self.pos)..]
    }

    pub(crate) fn prev_char(&self) -> Option<char> {
        self.text[..usize::from(self.pos)].chars().next_back()
    }

    pub(crate) fn nth_token(&mut self, n: usize) -> Token {
        while self.lookahead.len() <= n {
            let token = self.next_token();
            self.lookahead.push_back(token);
        }
        self.lookahead[n]
    }

    /// Lexes one token. An untaken `#if` branch comes out whole as
    /// `CSHARP_DISABLED_TEXT`, and no token runs into one.
    fn next_token(&mut self) -> Token {
        let offset = self.lookahead.back().map_or(self.pos, |token| token.range.end());
        let passed = self.disabled.partition_point(|range| range.end() <= offset);
        self.disabled.drain(..passed);

        let Some(&disabled) = self.disabled.first() else { return self.lexer.advance() };
        if disabled.start() <= offset {
            self.lexer = Lexer::new(self.mode, self.text, disabled.end(), self.options);
            let range = TextRange::new(offset, disabled.end());
            return Token { kind: SyntaxKind::CSHARP_DISABLED_TEXT, range, unterminated: false };
        }

        let token = self.lexer.advance();
        if token.range.start() < disabled.start() && disabled.start() < token.range.end() {
            self.lexer = Lexer::new(self.mode, self.text, disabled.start(), self.options);
            let range = TextRange::new(token.range.start(), disabled.start());
            return Token { range, unterminated: true, ..token };
        }
        token
    }

    /// Resolves the `#if` region whose directive is the current token.
    pub(crate) fn enter_conditional(&mut self) {
        let start = self.current_range().start();
        let ranges = preprocessor::disabled_ranges(self.text, start, &self.defines);
        if ranges.is_empty() {
            return;
        }
        log::trace!("disabled {} branch(es) of the region at {start:?}", ranges.len());
        self.disabled.extend(ranges);
        self.disabled.sort_by_key(|range| range.start());
        self.relex();
    }

    pub(crate) fn define(&mut self, symbol: &'t str) {
        self.defines.insert(symbol);
    }

    pub(crate) fn undefine(&mut self, symbol: &str) {
        self.defines.remove(symbol);
    }

    pub(crate) fn current(&mut self) -> Token {
        self.nth_token(0)
    }

    pub(crate) fn nth(&mut self, n: usize) -> SyntaxKind {
        self.nth_token(n).kind
    }

    pub(crate) fn kind(&mut self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn at(&mut self, kind: SyntaxKind) -> bool {
        self.kind() == kind
    }

    pub(crate) fn at_set(&mut self, set: SyntaxSet) -> bool {
        set.contains(self.kind())
    }

    pub(crate) fn at_eof(&mut self) -> bool {
        self.at(SyntaxKind::EOF)
    }

    pub(crate) fn nth_text(&mut self, n: usize) -> &'t str {
        let token = self.nth_token(n);
        &self.text[token.range]
    }

    pub(crate) fn current_text(&mut self) -> &'t str {
        self.nth_text(0)
    }

    pub(crate) fn current_range(&mut self) -> TextRange {
        self.current().range
    }

    pub(crate) fn text_of(&self, range: TextRange) -> &'t str {
        &self.text[range]
    }

    pub(crate) fn start(&mut self) -> Marker {
        self.flush_literal();
        self.start_raw()
    }

    fn start_raw(&mut self) -> Marker {
        let open = self.events.len() as u32;
        self.events.push(Event::PENDING);
        Marker::new(open)
    }

    /// Consumes the current token into the innermost open node.
    pub(crate) fn bump(&mut self) {
        self.flush_literal();
        self.consume();
    }

    /// Consumes the current token into a literal of `literal`, opening one if the
    /// literal being accumulated has a different kind.
    pub(crate) fn bump_literal(&mut self, literal: SyntaxKind) {
        if self.at_eof() {
            return;
        }
        self.open_literal(literal);
        self.consume();
    }

    /// Consumes the next `n` tokens as a single token of `kind`.
    pub(crate) fn bump_glued(&mut self, n: usize, kind: SyntaxKind) {
        self.flush_literal();
        self.glue(n, kind);
    }

    pub(crate) fn bump_glued_literal(&mut self, n: usize, kind: SyntaxKind, literal: SyntaxKind) {
        self.open_literal(literal);
        self.glue(n, kind);
    }

    /// Consumes the next `len` bytes as one token of `kind` inside a literal,
    /// regardless of how the active tokenizer would split them.
    pub(crate) fn bump_raw_literal(&mut self, len: TextSize, kind: SyntaxKind, literal: SyntaxKind) {
        if len == TextSize::new(0) {
            return;
        }
        self.open_literal(literal);
        self.events.push(Event::Token { kind, len });
        self.pos += len;
        self.relex();
    }

    pub(crate) fn bump_raw(&mut self, len: TextSize, kind: SyntaxKind) {
        self.flush_literal();
        self.events.push(Event::Token { kind, len });
        self.pos += len;
        self.relex();
    }

    /// Adds the zero-width end-of-file token.
    pub(crate) fn eof(&mut self) {
        self.flush_literal();
        debug_assert!(self.rest().is_empty(), "input left after the document");
        self.events.push(Event::Token { kind: SyntaxKind::EOF, len: TextSize::new(0) });
    }

    fn consume(&mut self) {
        let token = self.current();
        if token.kind == SyntaxKind::EOF {
            return;
        }
        self.lookahead.pop_front();
        self.pos = token.range.end();
        self.events.push(Event::Token { kind: token.kind, len: token.range.len() });
    }

    fn glue(&mut self, n: usize, kind: SyntaxKind) {
        debug_assert!(n > 0);
        let end = self.nth_token(n - 1).range.end();
        let len = end - self.pos;
        self.lookahead.drain(..n);
        self.pos = end;
        self.events.push(Event::Token { kind, len });
    }

    fn open_literal(&mut self, kind: SyntaxKind) {
        if matches!(&self.literal, Some((_, open)) if *open == kind) {
            return;
        }
        self.flush_literal();
        let marker = self.start_raw();
        self.literal = Some((marker, kind));
    }

    pub(crate) fn flush_literal(&mut self) {
        if let Some((marker, kind)) = self.literal.take() {
            marker.complete(self, kind);
        }
    }

    /// Consumes everything up to the end of input as one literal.
    pub(crate) fn eat_rest(&mut self, literal: SyntaxKind) {
        let len = TextSize::of(self.rest());
        let kind = if literal == SyntaxKind::MARKUP_TEXT_LITERAL { SyntaxKind::TEXT } else { SyntaxKind::UNKNOWN };
        self.bump_raw_literal(len, kind, literal);
    }

    pub(crate) fn missing(&mut self, kind: SyntaxKind) {
        self.flush_literal();
        self.events.push(Event::Missing(kind));
    }

    pub(crate) fn empty_slot(&mut self) {
        self.flush_literal();
        self.events.push(Event::EmptySlot);
    }

    pub(crate) fn error(&mut self, diagnostic: Diagnostic) {
        self.events.push(Event::Error(diagnostic));
    }

    pub(crate) fn annotate(&mut self, annotation: Annotation) {
        self.events.push(Event::Annotate(annotation));
    }

    /// Runs `f` one level deeper. Past the nesting limit the rest of the
    /// document becomes a flat `fallback` literal instead.
    pub(crate) fn nested(&mut self, fallback: SyntaxKind, f: impl FnOnce(&mut Self)) {
        let limit = self.options.max_nesting_depth();
        if self.depth >= limit {
            if !self.depth_exceeded {
                self.depth_exceeded = true;
                log::debug!("nesting limit of {limit} reached at offset {:?}", self.pos);
                let range = TextRange::new(self.pos, TextSize::of(self.text));
                self.error(catalog::maximum_nesting_depth(range, limit));
            }
            self.eat_rest(fallback);
            return;
        }

        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    /// Records a directive occurrence; `false` when it was already seen.
    pub(crate) fn record_directive(&mut self, name: &'t str) -> bool {
        self.seen_directives.insert(name)
    }

    /// Replays the recorded events into a green tree.
    pub(crate) fn build_tree(self) -> RazorSyntaxTree {
        let Parser { text, mut events, literal, .. } = self;
        debug_assert!(literal.is_none(), "a literal was left open");
        let mut builder = GreenBuilder::new(text);
        let mut enclosing = Vec::new();

        for index in 0..events.len() {
            match std::mem::replace(&mut events[index], Event::PENDING) {
                Event::Open { kind, outer } => {
                    // A node wrapped after it was finished opens inside the
                    // nodes that enclose it, so walk out to the outermost.
                    enclosing.push(kind);
                    let mut next = outer;
                    while let Some(at) = next {
                        let Event::Open { kind, outer } = std::mem::replace(&mut events[at as usize], Event::PENDING)
                        else {
                            unreachable!("an enclosing node must point at an open event")
                        };
                        enclosing.push(kind);
                        next = outer;
                    }
                    for kind in enclosing.drain(..).rev().filter(|&kind| kind != SyntaxKind::TOMBSTONE) {
                        builder.start_node(kind);
                    }
                }
                Event::Close => builder.finish_node(),
                Event::Token { kind, len } => builder.token(kind, len),
                Event::Missing(kind) => builder.missing(kind),
                Event::EmptySlot => builder.empty_slot(),
                Event::Error(diagnostic) => builder.error(diagnostic),
                Event::Annotate(annotation) => builder.annotate(annotation),
            }
        }

        RazorSyntaxTree::new(builder.finish(), text)
    }
}

enum Event {
    /// Starts a node. `outer` is the index of a node opened later that
    /// encloses this one, as when an `@` turns out to start an expression.
    Open { kind: SyntaxKind, outer: Option<u32> },
    Close,
    Token { kind: SyntaxKind, len: TextSize },
    Missing(SyntaxKind),
    EmptySlot,
    Error(Diagnostic),
    Annotate(Annotation),
}

impl Event {
    /// A node whose kind is decided later, or one that was dropped.
    const PENDING: Self = Event::Open { kind: SyntaxKind::TOMBSTONE, outer: None };
}

/// A node that is open in the event stream. It ends either as a node of a
/// known kind or dropped, leaving its children to the parent.
pub(crate) struct Marker {
    open: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(open: u32) -> Marker {
        Marker { open, bomb: DropBomb::new("a node was opened and never closed or dropped") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();
        p.flush_literal();
        if let Event::Open { kind: pending, .. } = &mut p.events[self.open as usize] {
            *pending = kind;
        }
        p.events.push(Event::Close);
        CompletedMarker { open: self.open }
    }

    /// Drops the node, as for an attribute value that turned out empty.
    /// Anything parsed since [`Parser::start`] goes to the parent.
    pub(crate) fn abandon(mut self, p: &mut Parser<'_>) {
        self.bomb.defuse();
        p.flush_literal();
        if p.events.len() == self.open as usize + 1 {
            p.events.pop();
        }
    }
}

/// A closed node that can still be enclosed by a new one.
pub(crate) struct CompletedMarker {
    open: u32,
}

impl CompletedMarker {
    /// Opens a node around this one. A transition becomes the first child of
    /// the block it starts once the parser knows which block that is.
    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let outer = p.start();
        if let Event::Open { outer: slot, .. } = &mut p.events[self.open as usize] {
            *slot = Some(outer.open);
        }
        outer
    }
}
