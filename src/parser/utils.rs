use std::fmt;

/// A reference to a character in an input source.
///
/// `line` and `column` are zero-based; response serialization converts them
/// to the one-based positions mandated by the GraphQL response format.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SourcePosition {
    index: usize,
    line: usize,
    col: usize,
}

impl SourcePosition {
    #[doc(hidden)]
    pub fn new(index: usize, line: usize, col: usize) -> Self {
        assert!(index >= line + col);

        Self { index, line, col }
    }

    #[doc(hidden)]
    pub fn new_origin() -> Self {
        Self::default()
    }

    #[doc(hidden)]
    pub fn advance_col(&mut self) {
        self.index += 1;
        self.col += 1;
    }

    #[doc(hidden)]
    pub fn advance_line(&mut self) {
        self.index += 1;
        self.line += 1;
        self.col = 0;
    }

    /// Advances past a character that is part of an already counted line
    /// terminator (the `\n` of a `\r\n` pair).
    #[doc(hidden)]
    pub fn advance_index(&mut self) {
        self.index += 1;
    }

    /// Byte-oriented index of the character in the input source.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Zero-based line of the character in the input source.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Zero-based column of the character in the input source.
    pub fn column(&self) -> usize {
        self.col
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A range of characters in the input source, from `start` up to (but not
/// including) `end`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Span {
    /// First position covered by the span.
    pub start: SourcePosition,

    /// First position _after_ the span.
    pub end: SourcePosition,
}

impl Span {
    #[doc(hidden)]
    pub fn new(start: &SourcePosition, end: &SourcePosition) -> Self {
        Self {
            start: *start,
            end: *end,
        }
    }

    #[doc(hidden)]
    pub fn zero_width(pos: &SourcePosition) -> Self {
        Self::new(pos, pos)
    }

    #[doc(hidden)]
    pub fn single_width(pos: &SourcePosition) -> Self {
        let mut end = *pos;
        end.advance_col();

        Self { start: *pos, end }
    }

    #[doc(hidden)]
    pub fn unlocated() -> Self {
        Self::zero_width(&SourcePosition::new_origin())
    }
}

/// An item paired with the source span it was parsed from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Spanning<T> {
    /// The wrapped item.
    pub item: T,

    /// Where `item` appeared in the source.
    pub span: Span,
}

impl<T> Spanning<T> {
    #[doc(hidden)]
    pub fn new(span: Span, item: T) -> Self {
        Self { item, span }
    }

    #[doc(hidden)]
    pub fn zero_width(pos: &SourcePosition, item: T) -> Self {
        Self::new(Span::zero_width(pos), item)
    }

    #[doc(hidden)]
    pub fn single_width(pos: &SourcePosition, item: T) -> Self {
        Self::new(Span::single_width(pos), item)
    }

    #[doc(hidden)]
    pub fn start_end(start: &SourcePosition, end: &SourcePosition, item: T) -> Self {
        Self::new(Span::new(start, end), item)
    }

    #[doc(hidden)]
    pub fn unlocated(item: T) -> Self {
        Self::new(Span::unlocated(), item)
    }

    /// Wraps a non-empty list of spanned items into a spanned list covering
    /// all of them.
    #[doc(hidden)]
    pub fn spanning(v: Vec<Spanning<T>>) -> Option<Spanning<Vec<Spanning<T>>>> {
        if let (Some(start), Some(end)) = (v.first().map(|s| s.span), v.last().map(|s| s.span)) {
            Some(Spanning::new(Span::new(&start.start, &end.end), v))
        } else {
            None
        }
    }

    #[doc(hidden)]
    pub fn start(&self) -> &SourcePosition {
        &self.span.start
    }

    #[doc(hidden)]
    pub fn end(&self) -> &SourcePosition {
        &self.span.end
    }

    /// Maps the wrapped item, keeping the span.
    pub fn map<O, F: FnOnce(T) -> O>(self, f: F) -> Spanning<O> {
        Spanning::new(self.span, f(self.item))
    }

    /// Maps the wrapped item if `f` returns [`Some`], dropping the span
    /// otherwise.
    pub fn and_then<O, F: FnOnce(T) -> Option<O>>(self, f: F) -> Option<Spanning<O>> {
        f(self.item).map(|item| Spanning::new(self.span, item))
    }
}

impl<T: fmt::Display> fmt::Display for Spanning<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. At {}", self.item, self.span.start)
    }
}

impl<T: std::error::Error> std::error::Error for Spanning<T> {}
