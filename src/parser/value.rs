use crate::{
    ast::InputValue,
    parser::{ParseError, ParseResult, Parser, Spanning, Token},
};

pub fn parse_value_literal<'a>(parser: &mut Parser<'a>, is_const: bool) -> ParseResult<InputValue> {
    match parser.peek().item {
        Token::BracketOpen => parse_list_literal(parser, is_const),
        Token::CurlyOpen => parse_object_literal(parser, is_const),
        Token::Dollar if !is_const => parse_variable_literal(parser),
        Token::Int(i) => Ok(parser.next_token()?.map(|_| InputValue::Int(i))),
        Token::Float(f) => Ok(parser.next_token()?.map(|_| InputValue::Float(f))),
        Token::String(_) | Token::BlockString(_) => {
            Ok(parser.next_token()?.map(|t| match t {
                Token::String(s) | Token::BlockString(s) => InputValue::String(s),
                _ => unreachable!("string token was peeked"),
            }))
        }
        Token::Name("true") => Ok(parser.next_token()?.map(|_| InputValue::Boolean(true))),
        Token::Name("false") => Ok(parser.next_token()?.map(|_| InputValue::Boolean(false))),
        Token::Name("null") => Ok(parser.next_token()?.map(|_| InputValue::Null)),
        Token::Name(name) => Ok(parser
            .next_token()?
            .map(|_| InputValue::enum_value(name.to_owned()))),
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_list_literal<'a>(parser: &mut Parser<'a>, is_const: bool) -> ParseResult<InputValue> {
    Ok(parser
        .delimited_list(
            &Token::BracketOpen,
            |p| parse_value_literal(p, is_const),
            &Token::BracketClose,
        )?
        .map(InputValue::parsed_list))
}

fn parse_object_literal<'a>(parser: &mut Parser<'a>, is_const: bool) -> ParseResult<InputValue> {
    Ok(parser
        .delimited_list(
            &Token::CurlyOpen,
            |p| parse_object_field(p, is_const),
            &Token::CurlyClose,
        )?
        .map(|items| InputValue::parsed_object(items.into_iter().map(|s| s.item).collect())))
}

fn parse_object_field<'a>(
    parser: &mut Parser<'a>,
    is_const: bool,
) -> ParseResult<(Spanning<String>, Spanning<InputValue>)> {
    let key = parser.expect_name()?;

    parser.expect(&Token::Colon)?;

    let value = parse_value_literal(parser, is_const)?;

    let start = key.span.start.clone();
    let end = value.span.end.clone();

    Ok(Spanning::start_end(
        &start,
        &end,
        (key.map(String::from), value),
    ))
}

fn parse_variable_literal<'a>(parser: &mut Parser<'a>) -> ParseResult<InputValue> {
    let start_pos = parser.expect(&Token::Dollar)?.span.start;
    let var_name = parser.expect_name()?;

    Ok(Spanning::start_end(
        &start_pos,
        &var_name.span.end,
        InputValue::variable(var_name.item),
    ))
}
