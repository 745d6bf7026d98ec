use std::{char, fmt, iter::Peekable, str::CharIndices};

use derive_more::with_trait::{Display, Error};

use crate::parser::{SourcePosition, Spanning};

#[doc(hidden)]
#[derive(Debug)]
pub struct Lexer<'a> {
    iterator: Peekable<CharIndices<'a>>,
    source: &'a str,
    length: usize,
    position: SourcePosition,
    has_reached_eof: bool,
    last_char: Option<char>,
}

/// A single token in the input source.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Token<'a> {
    Name(&'a str),
    Int(i32),
    Float(f64),
    String(String),
    BlockString(String),
    ExclamationMark,
    Dollar,
    Ampersand,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    CurlyOpen,
    CurlyClose,
    Ellipsis,
    Colon,
    Equals,
    At,
    Pipe,
    EndOfFile,
}

/// Error while tokenizing the input source.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum LexerError {
    /// A character that does not occur anywhere in the GraphQL language,
    /// such as `?` or `%`.
    #[display("Unknown character \"{_0}\"")]
    UnknownCharacter(#[error(not(source))] char),

    /// A character that exists in the language, but not at the current
    /// position in the document.
    #[display("Unexpected character \"{_0}\"")]
    UnexpectedCharacter(#[error(not(source))] char),

    /// A string literal missing its closing quote, terminated inside an
    /// escape sequence, or containing a bare line terminator.
    #[display("Unterminated string literal")]
    UnterminatedString,

    /// An invalid source character inside a string literal, such as an
    /// ASCII control character.
    #[display("Unknown character \"{_0}\" in string literal")]
    UnknownCharacterInString(#[error(not(source))] char),

    /// An escape sequence outside the supported set, e.g. `"\l"`.
    #[display("Unknown escape sequence \"{_0}\" in string")]
    UnknownEscapeSequence(#[error(not(source))] String),

    /// The source ended while the current token required more characters,
    /// e.g. when scanning `"1."`.
    #[display("Unexpected end of input")]
    UnexpectedEndOfFile,

    /// A malformed number literal, including `Int` literals outside the
    /// signed 32-bit range and non-finite `Float` literals.
    #[display("Invalid number literal")]
    InvalidNumber,
}

pub type LexerResult<'a> = Result<Spanning<Token<'a>>, Spanning<LexerError>>;

impl<'a> Lexer<'a> {
    #[doc(hidden)]
    pub fn new(source: &'a str) -> Self {
        Self {
            iterator: source.char_indices().peekable(),
            source,
            length: source.len(),
            position: SourcePosition::new_origin(),
            has_reached_eof: false,
            last_char: None,
        }
    }

    fn peek_char(&mut self) -> Option<(usize, char)> {
        assert!(self.position.index() <= self.length);
        assert!(!self.has_reached_eof);

        self.iterator.peek().copied()
    }

    fn next_char(&mut self) -> Option<(usize, char)> {
        assert!(self.position.index() <= self.length);
        assert!(!self.has_reached_eof);

        let next = self.iterator.next();

        if let Some((_, ch)) = next {
            match ch {
                // `\r\n` counts as a single line terminator: the `\n` only
                // advances the index.
                '\n' if self.last_char == Some('\r') => self.position.advance_index(),
                '\n' | '\r' => self.position.advance_line(),
                _ => self.position.advance_col(),
            }
            self.last_char = Some(ch);
        }

        next
    }

    fn emit_single_char(&mut self, t: Token<'a>) -> Spanning<Token<'a>> {
        assert!(self.position.index() <= self.length);

        let start_pos = self.position;

        self.next_char()
            .expect("internal error in GraphQL lexer: emit_single_char reached EOF");

        Spanning::single_width(&start_pos, t)
    }

    fn scan_over_whitespace(&mut self) {
        while let Some((_, ch)) = self.peek_char() {
            if ch == '\t' || ch == ' ' || ch == '\n' || ch == '\r' || ch == ',' || ch == '\u{feff}'
            {
                self.next_char();
            } else if ch == '#' {
                self.next_char();

                while let Some((_, ch)) = self.peek_char() {
                    if is_source_char(ch) && (ch == '\n' || ch == '\r') {
                        self.next_char();
                        break;
                    } else if is_source_char(ch) {
                        self.next_char();
                    } else {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn scan_ellipsis(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;

        for _ in 0..3 {
            let (_, ch) = self.next_char().ok_or_else(|| {
                Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
            })?;
            if ch != '.' {
                return Err(Spanning::zero_width(
                    &start_pos,
                    LexerError::UnexpectedCharacter('.'),
                ));
            }
        }

        Ok(Spanning::start_end(
            &start_pos,
            &self.position,
            Token::Ellipsis,
        ))
    }

    fn scan_name(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;
        let (start_idx, start_ch) = self.next_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
        })?;
        assert!(is_name_start(start_ch));

        let mut end_idx = start_idx;

        while let Some((idx, ch)) = self.peek_char() {
            if is_name_cont(ch) {
                self.next_char();
                end_idx = idx;
            } else {
                break;
            }
        }

        Ok(Spanning::start_end(
            &start_pos,
            &self.position,
            Token::Name(&self.source[start_idx..=end_idx]),
        ))
    }

    fn scan_string(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;
        let (_, start_ch) = self.next_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
        })?;
        assert!(start_ch == '"');

        if let Some((_, '"')) = self.peek_char() {
            self.next_char();

            if let Some((_, '"')) = self.peek_char() {
                self.next_char();
                return self.scan_block_string(&start_pos);
            }

            // An empty `""` literal.
            return Ok(Spanning::start_end(
                &start_pos,
                &self.position,
                Token::String(String::new()),
            ));
        }

        let mut acc = String::new();

        while let Some((_, ch)) = self.peek_char() {
            if ch == '"' {
                self.next_char();
                return Ok(Spanning::start_end(
                    &start_pos,
                    &self.position,
                    Token::String(acc),
                ));
            } else if ch == '\\' {
                self.next_char();

                match self.peek_char() {
                    Some((_, '"')) => {
                        self.next_char();
                        acc.push('"');
                    }
                    Some((_, '\\')) => {
                        self.next_char();
                        acc.push('\\');
                    }
                    Some((_, '/')) => {
                        self.next_char();
                        acc.push('/');
                    }
                    Some((_, 'b')) => {
                        self.next_char();
                        acc.push('\u{0008}');
                    }
                    Some((_, 'f')) => {
                        self.next_char();
                        acc.push('\u{000c}');
                    }
                    Some((_, 'n')) => {
                        self.next_char();
                        acc.push('\n');
                    }
                    Some((_, 'r')) => {
                        self.next_char();
                        acc.push('\r');
                    }
                    Some((_, 't')) => {
                        self.next_char();
                        acc.push('\t');
                    }
                    Some((_, 'u')) => {
                        let start_pos = self.position;
                        self.next_char();
                        acc.push(self.scan_escaped_unicode(&start_pos)?);
                    }
                    Some((_, ch)) => {
                        let mut s = String::from("\\");
                        s.push(ch);

                        return Err(Spanning::zero_width(
                            &self.position,
                            LexerError::UnknownEscapeSequence(s),
                        ));
                    }
                    None => {
                        return Err(Spanning::zero_width(
                            &self.position,
                            LexerError::UnterminatedString,
                        ));
                    }
                }
            } else if ch == '\n' || ch == '\r' {
                return Err(Spanning::zero_width(
                    &self.position,
                    LexerError::UnterminatedString,
                ));
            } else if !is_source_char(ch) {
                return Err(Spanning::zero_width(
                    &self.position,
                    LexerError::UnknownCharacterInString(ch),
                ));
            } else {
                self.next_char();
                acc.push(ch);
            }
        }

        Err(Spanning::zero_width(
            &self.position,
            LexerError::UnterminatedString,
        ))
    }

    /// Scans the remainder of a `"""…"""` literal, the opening quotes having
    /// been consumed already.
    fn scan_block_string(&mut self, start_pos: &SourcePosition) -> LexerResult<'a> {
        let mut raw = String::new();
        let mut quotes = 0;

        loop {
            let Some((_, ch)) = self.peek_char() else {
                return Err(Spanning::zero_width(
                    &self.position,
                    LexerError::UnterminatedString,
                ));
            };

            match ch {
                '"' => {
                    self.next_char();
                    quotes += 1;
                    if quotes == 3 {
                        return Ok(Spanning::start_end(
                            start_pos,
                            &self.position,
                            Token::BlockString(dedent_block_string(&raw)),
                        ));
                    }
                }
                '\\' => {
                    self.next_char();
                    raw.extend(std::iter::repeat('"').take(quotes));
                    quotes = 0;

                    // Only `\"""` is an escape inside block strings; any
                    // other backslash is literal.
                    if let Some((_, '"')) = self.peek_char() {
                        let mut escaped = 0;
                        while escaped < 3 {
                            match self.peek_char() {
                                Some((_, '"')) => {
                                    self.next_char();
                                    escaped += 1;
                                }
                                _ => break,
                            }
                        }
                        if escaped == 3 {
                            raw.push_str("\"\"\"");
                        } else {
                            raw.push('\\');
                            raw.extend(std::iter::repeat('"').take(escaped));
                        }
                    } else {
                        raw.push('\\');
                    }
                }
                ch if is_source_char(ch) || ch == '\n' || ch == '\r' => {
                    self.next_char();
                    raw.extend(std::iter::repeat('"').take(quotes));
                    quotes = 0;
                    raw.push(ch);
                }
                ch => {
                    return Err(Spanning::zero_width(
                        &self.position,
                        LexerError::UnknownCharacterInString(ch),
                    ));
                }
            }
        }
    }

    fn scan_escaped_unicode(
        &mut self,
        start_pos: &SourcePosition,
    ) -> Result<char, Spanning<LexerError>> {
        let (start_idx, _) = self.peek_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnterminatedString)
        })?;
        let mut end_idx = start_idx;
        let mut len = 0;

        for _ in 0..4 {
            let (idx, ch) = self.next_char().ok_or_else(|| {
                Spanning::zero_width(&self.position, LexerError::UnterminatedString)
            })?;

            if !ch.is_alphanumeric() {
                break;
            }

            end_idx = idx;
            len += 1;
        }

        let escape = &self.source[start_idx..=end_idx];

        if len != 4 {
            return Err(Spanning::zero_width(
                start_pos,
                LexerError::UnknownEscapeSequence(format!("\\u{escape}")),
            ));
        }

        let code_point = u32::from_str_radix(escape, 16).map_err(|_| {
            Spanning::zero_width(
                start_pos,
                LexerError::UnknownEscapeSequence(format!("\\u{escape}")),
            )
        })?;

        char::from_u32(code_point).ok_or_else(|| {
            Spanning::zero_width(
                start_pos,
                LexerError::UnknownEscapeSequence(format!("\\u{escape}")),
            )
        })
    }

    fn scan_number(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;
        let (start_idx, init_ch) = self.peek_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
        })?;

        if init_ch == '-' {
            self.next_char();
        }

        let mut end_idx = self.scan_integer_part()?;
        let mut is_float = false;

        if let Some((_, '.')) = self.peek_char() {
            self.next_char();
            is_float = true;
            end_idx = self.scan_digits()?;
        }

        if let Some((_, ch)) = self.peek_char() {
            if ch == 'e' || ch == 'E' {
                self.next_char();
                is_float = true;

                if let Some((_, ch)) = self.peek_char() {
                    if ch == '-' || ch == '+' {
                        self.next_char();
                    }
                }
                end_idx = self.scan_digits()?;
            }
        }

        let literal = &self.source[start_idx..=end_idx];

        let token = if is_float {
            let f: f64 = literal
                .parse()
                .map_err(|_| Spanning::zero_width(&start_pos, LexerError::InvalidNumber))?;
            if !f.is_finite() {
                return Err(Spanning::zero_width(&start_pos, LexerError::InvalidNumber));
            }
            Token::Float(f)
        } else {
            // `Int` literals are confined to signed 32-bit values.
            let i: i32 = literal
                .parse()
                .map_err(|_| Spanning::zero_width(&start_pos, LexerError::InvalidNumber))?;
            Token::Int(i)
        };

        Ok(Spanning::start_end(&start_pos, &self.position, token))
    }

    fn scan_integer_part(&mut self) -> Result<usize, Spanning<LexerError>> {
        let (idx, ch) = self.peek_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
        })?;

        if ch == '0' {
            self.next_char();

            match self.peek_char() {
                Some((_, next)) if next.is_ascii_digit() => Err(Spanning::zero_width(
                    &self.position,
                    LexerError::UnexpectedCharacter(next),
                )),
                _ => Ok(idx),
            }
        } else {
            self.scan_digits()
        }
    }

    /// Consumes one or more ASCII digits, returning the index of the last one.
    fn scan_digits(&mut self) -> Result<usize, Spanning<LexerError>> {
        let (start_idx, ch) = self.peek_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
        })?;
        let mut end_idx = start_idx;

        if !ch.is_ascii_digit() {
            return Err(Spanning::zero_width(
                &self.position,
                LexerError::UnexpectedCharacter(ch),
            ));
        }

        while let Some((idx, ch)) = self.peek_char() {
            if !ch.is_ascii_digit() {
                break;
            } else {
                self.next_char();
                end_idx = idx;
            }
        }

        Ok(end_idx)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexerResult<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_reached_eof {
            return None;
        }

        self.scan_over_whitespace();

        let ch = self.iterator.peek().map(|&(_, ch)| ch);

        Some(match ch {
            Some('!') => Ok(self.emit_single_char(Token::ExclamationMark)),
            Some('$') => Ok(self.emit_single_char(Token::Dollar)),
            Some('&') => Ok(self.emit_single_char(Token::Ampersand)),
            Some('(') => Ok(self.emit_single_char(Token::ParenOpen)),
            Some(')') => Ok(self.emit_single_char(Token::ParenClose)),
            Some('[') => Ok(self.emit_single_char(Token::BracketOpen)),
            Some(']') => Ok(self.emit_single_char(Token::BracketClose)),
            Some('{') => Ok(self.emit_single_char(Token::CurlyOpen)),
            Some('}') => Ok(self.emit_single_char(Token::CurlyClose)),
            Some(':') => Ok(self.emit_single_char(Token::Colon)),
            Some('=') => Ok(self.emit_single_char(Token::Equals)),
            Some('@') => Ok(self.emit_single_char(Token::At)),
            Some('|') => Ok(self.emit_single_char(Token::Pipe)),
            Some('.') => self.scan_ellipsis(),
            Some('"') => self.scan_string(),
            Some(ch) => {
                if is_number_start(ch) {
                    self.scan_number()
                } else if is_name_start(ch) {
                    self.scan_name()
                } else {
                    Err(Spanning::zero_width(
                        &self.position,
                        LexerError::UnknownCharacter(ch),
                    ))
                }
            }
            None => {
                self.has_reached_eof = true;
                Ok(Spanning::zero_width(&self.position, Token::EndOfFile))
            }
        })
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(name) => write!(f, "{name}"),
            Token::Int(i) => write!(f, "{i}"),
            Token::Float(v) => write!(f, "{v}"),
            Token::String(s) => {
                write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Token::BlockString(s) => write!(f, "\"\"\"{s}\"\"\""),
            Token::ExclamationMark => write!(f, "!"),
            Token::Dollar => write!(f, "$"),
            Token::Ampersand => write!(f, "&"),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
            Token::BracketOpen => write!(f, "["),
            Token::BracketClose => write!(f, "]"),
            Token::CurlyOpen => write!(f, "{{"),
            Token::CurlyClose => write!(f, "}}"),
            Token::Ellipsis => write!(f, "..."),
            Token::Colon => write!(f, ":"),
            Token::Equals => write!(f, "="),
            Token::At => write!(f, "@"),
            Token::Pipe => write!(f, "|"),
            Token::EndOfFile => write!(f, "End of file"),
        }
    }
}

/// Strips the common indentation and blank bounding lines from a raw block
/// string, per the `BlockStringValue` semantics of the GraphQL spec.
fn dedent_block_string(raw: &str) -> String {
    let lines = split_lines(raw);

    let mut common_indent: Option<usize> = None;
    for line in lines.iter().skip(1) {
        let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
        if indent < line.len() {
            common_indent = Some(match common_indent {
                Some(ci) => ci.min(indent),
                None => indent,
            });
            if common_indent == Some(0) {
                break;
            }
        }
    }

    let mut dedented: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(n, line)| {
            if n == 0 {
                *line
            } else {
                let ci = common_indent.unwrap_or(0).min(line.len());
                &line[ci..]
            }
        })
        .collect();

    while dedented
        .first()
        .is_some_and(|l| l.trim_matches([' ', '\t']).is_empty())
    {
        dedented.remove(0);
    }
    while dedented
        .last()
        .is_some_and(|l| l.trim_matches([' ', '\t']).is_empty())
    {
        dedented.pop();
    }

    dedented.join("\n")
}

fn split_lines(raw: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = raw.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(&raw[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&raw[start..]);

    lines
}

fn is_source_char(c: char) -> bool {
    c == '\t' || c == '\n' || c == '\r' || c >= ' '
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_cont(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit()
}

fn is_number_start(c: char) -> bool {
    c == '-' || c.is_ascii_digit()
}
