use crate::parser::{Lexer, LexerError, SourcePosition, Spanning, Token};

fn tokenize_to_vec(s: &str) -> Vec<Spanning<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut lexer = Lexer::new(s);

    loop {
        match lexer.next() {
            Some(Ok(t)) => {
                let at_eof = t.item == Token::EndOfFile;
                tokens.push(t);
                if at_eof {
                    break;
                }
            }
            Some(Err(e)) => panic!("parse error in lexer test: {e}"),
            None => panic!("premature EOF in lexer test"),
        }
    }

    tokens
}

fn tokenize_single(s: &str) -> Spanning<Token<'_>> {
    let mut tokens = tokenize_to_vec(s);

    assert_eq!(tokens.len(), 2, "expected exactly one token and EOF");
    assert_eq!(tokens[1].item, Token::EndOfFile);

    tokens.remove(0)
}

fn tokenize_error(s: &str) -> Spanning<LexerError> {
    let mut lexer = Lexer::new(s);

    loop {
        match lexer.next() {
            Some(Ok(t)) => {
                if t.item == Token::EndOfFile {
                    panic!("lexer error expected on input {s:#?}")
                }
            }
            Some(Err(e)) => return e,
            None => panic!("premature EOF in lexer test"),
        }
    }
}

#[test]
fn empty_source() {
    let tokens = tokenize_to_vec("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].item, Token::EndOfFile);
}

#[test]
fn disallows_control_codes() {
    assert_eq!(
        Lexer::new("\u{0007}").next(),
        Some(Err(Spanning::zero_width(
            &SourcePosition::new_origin(),
            LexerError::UnknownCharacter('\u{0007}')
        )))
    );
}

#[test]
fn skips_whitespace_and_comments() {
    assert_eq!(
        tokenize_single(
            r#"

            foo

"#
        )
        .item,
        Token::Name("foo"),
    );

    assert_eq!(
        tokenize_single(
            r#"
    #comment
    foo#comment
"#
        )
        .item,
        Token::Name("foo"),
    );

    assert_eq!(tokenize_single(",,,foo,,,").item, Token::Name("foo"));
}

#[test]
fn skips_byte_order_mark() {
    assert_eq!(tokenize_single("\u{feff} foo").item, Token::Name("foo"));
}

#[test]
fn tracks_line_breaks_uniformly() {
    // `\n`, `\r`, and `\r\n` each count as one line terminator.
    let foo = tokenize_single("\nfoo");
    assert_eq!(foo.span.start.line(), 1);
    assert_eq!(foo.span.start.column(), 0);

    let foo = tokenize_single("\rfoo");
    assert_eq!(foo.span.start.line(), 1);
    assert_eq!(foo.span.start.column(), 0);

    let foo = tokenize_single("\r\nfoo");
    assert_eq!(foo.span.start.line(), 1);
    assert_eq!(foo.span.start.column(), 0);

    let foo = tokenize_single("\r\r\n\nfoo");
    assert_eq!(foo.span.start.line(), 3);
    assert_eq!(foo.span.start.column(), 0);
}

#[test]
fn strings() {
    assert_eq!(
        tokenize_single(r#""simple""#).item,
        Token::String("simple".into())
    );
    assert_eq!(
        tokenize_single(r#"" white space ""#).item,
        Token::String(" white space ".into())
    );
    assert_eq!(
        tokenize_single(r#""quote \"""#).item,
        Token::String("quote \"".into())
    );
    assert_eq!(
        tokenize_single(r#""escaped \n\r\b\t\f""#).item,
        Token::String("escaped \n\r\u{0008}\t\u{000c}".into())
    );
    assert_eq!(
        tokenize_single(r#""slashes \\ \/""#).item,
        Token::String("slashes \\ /".into())
    );
    assert_eq!(
        tokenize_single(r#""unicode ሴ噸邫췯""#).item,
        Token::String("unicode \u{1234}\u{5678}\u{90ab}\u{cdef}".into())
    );
    assert_eq!(tokenize_single(r#""""#).item, Token::String(String::new()));
}

#[test]
fn string_errors() {
    assert_eq!(
        tokenize_error("\""),
        Spanning::zero_width(
            &SourcePosition::new(1, 0, 1),
            LexerError::UnterminatedString,
        )
    );

    assert_eq!(
        tokenize_error("\"multi\nline\""),
        Spanning::zero_width(
            &SourcePosition::new(6, 0, 6),
            LexerError::UnterminatedString,
        )
    );

    assert_eq!(
        tokenize_error(r#""bad \z esc""#),
        Spanning::zero_width(
            &SourcePosition::new(6, 0, 6),
            LexerError::UnknownEscapeSequence("\\z".into()),
        )
    );

    assert_eq!(
        tokenize_error(r#""bad \x esc""#),
        Spanning::zero_width(
            &SourcePosition::new(6, 0, 6),
            LexerError::UnknownEscapeSequence("\\x".into()),
        )
    );
}

#[test]
fn block_strings() {
    assert_eq!(
        tokenize_single(r#""""simple""""#).item,
        Token::BlockString("simple".into())
    );

    // Common indentation strips; blank first/last lines drop.
    assert_eq!(
        tokenize_single(
            "\"\"\"\n    Hello,\n      World!\n\n    Yours,\n      GraphQL.\n    \"\"\""
        )
        .item,
        Token::BlockString("Hello,\n  World!\n\nYours,\n  GraphQL.".into())
    );

    // Escaped triple-quote is literal.
    assert_eq!(
        tokenize_single(r#""""contains \""" quote""""#).item,
        Token::BlockString("contains \"\"\" quote".into())
    );
}

#[test]
fn numbers() {
    assert_eq!(tokenize_single("4").item, Token::Int(4));
    assert_eq!(tokenize_single("-4").item, Token::Int(-4));
    assert_eq!(tokenize_single("9").item, Token::Int(9));
    assert_eq!(tokenize_single("0").item, Token::Int(0));
    assert_eq!(tokenize_single("-0").item, Token::Int(0));

    assert_eq!(tokenize_single("4.123").item, Token::Float(4.123));
    assert_eq!(tokenize_single("-4.123").item, Token::Float(-4.123));
    assert_eq!(tokenize_single("0.123").item, Token::Float(0.123));
    assert_eq!(tokenize_single("123e4").item, Token::Float(123e4));
    assert_eq!(tokenize_single("123E4").item, Token::Float(123e4));
    assert_eq!(tokenize_single("123e-4").item, Token::Float(123e-4));
    assert_eq!(tokenize_single("123e+4").item, Token::Float(123e+4));

    // Overflowing to infinity is not a valid `Float`.
    assert_eq!(
        tokenize_error("-1.123e4567").item,
        LexerError::InvalidNumber,
    );
}

#[test]
fn int_literals_are_confined_to_32_bits() {
    assert_eq!(tokenize_single("2147483647").item, Token::Int(i32::MAX));
    assert_eq!(tokenize_single("-2147483648").item, Token::Int(i32::MIN));

    assert_eq!(
        tokenize_error("2147483648").item,
        LexerError::InvalidNumber,
    );
    assert_eq!(
        tokenize_error("-2147483649").item,
        LexerError::InvalidNumber,
    );
}

#[test]
fn number_errors() {
    assert_eq!(tokenize_error("00").item, LexerError::UnexpectedCharacter('0'));
    assert_eq!(tokenize_error("+1").item, LexerError::UnknownCharacter('+'));
    assert_eq!(tokenize_error("1.").item, LexerError::UnexpectedEndOfFile);
    assert_eq!(tokenize_error(".123").item, LexerError::UnexpectedCharacter('.'));
    assert_eq!(tokenize_error("1.A").item, LexerError::UnexpectedCharacter('A'));
    assert_eq!(tokenize_error("1.0e").item, LexerError::UnexpectedEndOfFile);
}

#[test]
fn punctuation() {
    assert_eq!(tokenize_single("!").item, Token::ExclamationMark);
    assert_eq!(tokenize_single("$").item, Token::Dollar);
    assert_eq!(tokenize_single("&").item, Token::Ampersand);
    assert_eq!(tokenize_single("(").item, Token::ParenOpen);
    assert_eq!(tokenize_single(")").item, Token::ParenClose);
    assert_eq!(tokenize_single("...").item, Token::Ellipsis);
    assert_eq!(tokenize_single(":").item, Token::Colon);
    assert_eq!(tokenize_single("=").item, Token::Equals);
    assert_eq!(tokenize_single("@").item, Token::At);
    assert_eq!(tokenize_single("[").item, Token::BracketOpen);
    assert_eq!(tokenize_single("]").item, Token::BracketClose);
    assert_eq!(tokenize_single("{").item, Token::CurlyOpen);
    assert_eq!(tokenize_single("|").item, Token::Pipe);
    assert_eq!(tokenize_single("}").item, Token::CurlyClose);
}

#[test]
fn punctuation_errors() {
    assert_eq!(tokenize_error("..").item, LexerError::UnexpectedCharacter('.'));
    assert_eq!(tokenize_error("?").item, LexerError::UnknownCharacter('?'));
    assert_eq!(
        tokenize_error("\u{203b}").item,
        LexerError::UnknownCharacter('\u{203b}')
    );
}

#[test]
fn display() {
    assert_eq!(Token::Name("foo").to_string(), "foo");
    assert_eq!(Token::Int(123).to_string(), "123");
    assert_eq!(Token::Float(4.5).to_string(), "4.5");
    assert_eq!(
        Token::String("hello \"world\"".into()).to_string(),
        r#""hello \"world\"""#
    );
    assert_eq!(Token::ExclamationMark.to_string(), "!");
    assert_eq!(Token::EndOfFile.to_string(), "End of file");
}
