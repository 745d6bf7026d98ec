//! Grammar for type-system definitions and extensions.
//!
//! Descriptions (a leading string literal) attach to the definition that
//! follows them; `extend` forms produce extension nodes retaining their
//! inner definition.

use crate::{
    ast::{
        DirectiveDefinition, DirectiveLocation, EnumTypeDefinition, EnumValueDefinition,
        FieldDefinition, InputObjectTypeDefinition, InputValueDefinition, InterfaceTypeDefinition,
        ObjectTypeDefinition, OperationType, OperationTypeDefinition, ScalarTypeDefinition,
        SchemaDefinition, TypeDefinition, TypeSystemDefinition, UnionTypeDefinition,
    },
    parser::{
        OptionParseResult, ParseError, ParseResult, Parser, Spanning, Token,
        UnlocatedParseResult,
        document::{parse_arguments, parse_directives, parse_type},
        value::parse_value_literal,
    },
};

pub(crate) fn parse_type_system_definition<'a>(
    parser: &mut Parser<'a>,
) -> UnlocatedParseResult<TypeSystemDefinition<'a>> {
    let description = parse_description(parser)?;

    match parser.peek().item {
        Token::Name("schema") => Ok(TypeSystemDefinition::Schema(parse_schema_definition(
            parser,
            description,
        )?)),
        Token::Name("directive") => Ok(TypeSystemDefinition::Directive(
            parse_directive_definition(parser, description)?,
        )),
        Token::Name("scalar" | "type" | "interface" | "union" | "enum" | "input") => Ok(
            TypeSystemDefinition::Type(parse_type_definition(parser, description)?),
        ),
        Token::Name("extend") => {
            if description.is_some() {
                // Descriptions are not allowed on extensions.
                return Err(parser.next_token()?.map(ParseError::unexpected_token));
            }
            parse_extension(parser)
        }
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_description<'a>(
    parser: &mut Parser<'a>,
) -> Result<Option<Spanning<String>>, Spanning<ParseError>> {
    match parser.peek().item {
        Token::String(_) | Token::BlockString(_) => {
            let token = parser.next_token()?;
            Ok(Some(token.map(|t| match t {
                Token::String(s) | Token::BlockString(s) => s,
                _ => unreachable!("string token was peeked"),
            })))
        }
        _ => Ok(None),
    }
}

fn parse_extension<'a>(parser: &mut Parser<'a>) -> UnlocatedParseResult<TypeSystemDefinition<'a>> {
    let start_pos = parser.expect(&Token::Name("extend"))?.span.start;

    match parser.peek().item {
        Token::Name("schema") => {
            let def = parse_schema_definition(parser, None)?;
            Ok(TypeSystemDefinition::SchemaExtension(Spanning::start_end(
                &start_pos,
                &def.span.end,
                def.item,
            )))
        }
        Token::Name("scalar" | "type" | "interface" | "union" | "enum" | "input") => {
            let def = parse_type_definition(parser, None)?;
            Ok(TypeSystemDefinition::TypeExtension(Spanning::start_end(
                &start_pos,
                &def.span.end,
                def.item,
            )))
        }
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_type_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition<'a>> {
    match parser.peek().item {
        Token::Name("scalar") => parse_scalar_type(parser, description),
        Token::Name("type") => parse_object_type(parser, description),
        Token::Name("interface") => parse_interface_type(parser, description),
        Token::Name("union") => parse_union_type(parser, description),
        Token::Name("enum") => parse_enum_type(parser, description),
        Token::Name("input") => parse_input_object_type(parser, description),
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_schema_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<SchemaDefinition<'a>> {
    let start_pos = parser.expect(&Token::Name("schema"))?.span.start;
    let directives = parse_directives(parser)?;

    let operation_types = if parser.peek().item == Token::CurlyOpen {
        parser.delimited_nonempty_list(
            &Token::CurlyOpen,
            parse_operation_type_definition,
            &Token::CurlyClose,
        )?
    } else {
        Spanning::start_end(&start_pos, &start_pos, Vec::new())
    };

    Ok(Spanning::start_end(
        &start_pos,
        &operation_types.span.end,
        SchemaDefinition {
            description,
            directives: directives.map(|s| s.item),
            operation_types: operation_types.item,
        },
    ))
}

fn parse_operation_type_definition<'a>(
    parser: &mut Parser<'a>,
) -> ParseResult<OperationTypeDefinition<'a>> {
    let op_name = parser.expect_name()?;
    let operation = match op_name.item {
        "query" => OperationType::Query,
        "mutation" => OperationType::Mutation,
        "subscription" => OperationType::Subscription,
        other => {
            return Err(op_name.map(|_| ParseError::unexpected_token(Token::Name(other))));
        }
    };
    parser.expect(&Token::Colon)?;
    let named_type = parser.expect_name()?;

    Ok(Spanning::start_end(
        &op_name.span.start,
        &named_type.span.end,
        OperationTypeDefinition {
            operation,
            named_type,
        },
    ))
}

fn parse_scalar_type<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition<'a>> {
    let start_pos = parser.expect(&Token::Name("scalar"))?.span.start;
    let name = parser.expect_name()?;
    let directives = parse_directives(parser)?;

    Ok(Spanning::start_end(
        &start_pos,
        &directives
            .as_ref()
            .map_or(&name.span.end, |s| &s.span.end)
            .clone(),
        TypeDefinition::Scalar(ScalarTypeDefinition {
            description,
            name,
            directives: directives.map(|s| s.item),
        }),
    ))
}

fn parse_object_type<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition<'a>> {
    let start_pos = parser.expect(&Token::Name("type"))?.span.start;
    let name = parser.expect_name()?;
    let interfaces = parse_implements_interfaces(parser)?;
    let directives = parse_directives(parser)?;
    let fields = parse_fields_definition(parser)?;

    let end_pos = fields
        .as_ref()
        .map(|s| s.span.end)
        .or(directives.as_ref().map(|s| s.span.end))
        .or(interfaces.last().map(|s| s.span.end))
        .unwrap_or(name.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::Object(ObjectTypeDefinition {
            description,
            name,
            interfaces,
            directives: directives.map(|s| s.item),
            fields: fields.map(|s| s.item).unwrap_or_default(),
        }),
    ))
}

fn parse_interface_type<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition<'a>> {
    let start_pos = parser.expect(&Token::Name("interface"))?.span.start;
    let name = parser.expect_name()?;
    let interfaces = parse_implements_interfaces(parser)?;
    let directives = parse_directives(parser)?;
    let fields = parse_fields_definition(parser)?;

    let end_pos = fields
        .as_ref()
        .map(|s| s.span.end)
        .or(directives.as_ref().map(|s| s.span.end))
        .or(interfaces.last().map(|s| s.span.end))
        .unwrap_or(name.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::Interface(InterfaceTypeDefinition {
            description,
            name,
            interfaces,
            directives: directives.map(|s| s.item),
            fields: fields.map(|s| s.item).unwrap_or_default(),
        }),
    ))
}

fn parse_implements_interfaces<'a>(
    parser: &mut Parser<'a>,
) -> Result<Vec<Spanning<&'a str>>, Spanning<ParseError>> {
    let mut interfaces = Vec::new();

    if parser.skip_keyword("implements")?.is_some() {
        parser.skip(&Token::Ampersand)?;
        interfaces.push(parser.expect_name()?);

        while parser.skip(&Token::Ampersand)?.is_some() {
            interfaces.push(parser.expect_name()?);
        }
    }

    Ok(interfaces)
}

fn parse_fields_definition<'a>(
    parser: &mut Parser<'a>,
) -> OptionParseResult<Vec<Spanning<FieldDefinition<'a>>>> {
    if parser.peek().item != Token::CurlyOpen {
        Ok(None)
    } else {
        Ok(Some(parser.delimited_nonempty_list(
            &Token::CurlyOpen,
            parse_field_definition,
            &Token::CurlyClose,
        )?))
    }
}

fn parse_field_definition<'a>(parser: &mut Parser<'a>) -> ParseResult<FieldDefinition<'a>> {
    let description = parse_description(parser)?;
    let name = parser.expect_name()?;
    let arguments = parse_arguments_definition(parser)?;
    parser.expect(&Token::Colon)?;
    let field_type = parse_type(parser)?;
    let directives = parse_directives(parser)?;

    let start_pos = description
        .as_ref()
        .map_or(name.span.start, |d| d.span.start);
    let end_pos = directives
        .as_ref()
        .map_or(field_type.span.end, |s| s.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        FieldDefinition {
            description,
            name,
            arguments,
            field_type,
            directives: directives.map(|s| s.item),
        },
    ))
}

fn parse_arguments_definition<'a>(
    parser: &mut Parser<'a>,
) -> Result<Vec<Spanning<InputValueDefinition<'a>>>, Spanning<ParseError>> {
    if parser.peek().item != Token::ParenOpen {
        Ok(Vec::new())
    } else {
        Ok(parser
            .delimited_nonempty_list(
                &Token::ParenOpen,
                parse_input_value_definition,
                &Token::ParenClose,
            )?
            .item)
    }
}

fn parse_input_value_definition<'a>(
    parser: &mut Parser<'a>,
) -> ParseResult<InputValueDefinition<'a>> {
    let description = parse_description(parser)?;
    let name = parser.expect_name()?;
    parser.expect(&Token::Colon)?;
    let value_type = parse_type(parser)?;

    let default_value = if parser.skip(&Token::Equals)?.is_some() {
        Some(parse_value_literal(parser, true)?)
    } else {
        None
    };
    let directives = parse_directives(parser)?;

    let start_pos = description
        .as_ref()
        .map_or(name.span.start, |d| d.span.start);
    let end_pos = directives
        .as_ref()
        .map(|s| s.span.end)
        .or(default_value.as_ref().map(|s| s.span.end))
        .unwrap_or(value_type.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        InputValueDefinition {
            description,
            name,
            value_type,
            default_value,
            directives: directives.map(|s| s.item),
        },
    ))
}

fn parse_union_type<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition<'a>> {
    let start_pos = parser.expect(&Token::Name("union"))?.span.start;
    let name = parser.expect_name()?;
    let directives = parse_directives(parser)?;

    let mut members = Vec::new();
    if parser.skip(&Token::Equals)?.is_some() {
        parser.skip(&Token::Pipe)?;
        members.push(parser.expect_name()?);

        while parser.skip(&Token::Pipe)?.is_some() {
            members.push(parser.expect_name()?);
        }
    }

    let end_pos = members
        .last()
        .map(|s| s.span.end)
        .or(directives.as_ref().map(|s| s.span.end))
        .unwrap_or(name.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::Union(UnionTypeDefinition {
            description,
            name,
            directives: directives.map(|s| s.item),
            members,
        }),
    ))
}

fn parse_enum_type<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition<'a>> {
    let start_pos = parser.expect(&Token::Name("enum"))?.span.start;
    let name = parser.expect_name()?;
    let directives = parse_directives(parser)?;

    let values = if parser.peek().item == Token::CurlyOpen {
        Some(parser.delimited_nonempty_list(
            &Token::CurlyOpen,
            parse_enum_value_definition,
            &Token::CurlyClose,
        )?)
    } else {
        None
    };

    let end_pos = values
        .as_ref()
        .map(|s| s.span.end)
        .or(directives.as_ref().map(|s| s.span.end))
        .unwrap_or(name.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::Enum(EnumTypeDefinition {
            description,
            name,
            directives: directives.map(|s| s.item),
            values: values.map(|s| s.item).unwrap_or_default(),
        }),
    ))
}

fn parse_enum_value_definition<'a>(
    parser: &mut Parser<'a>,
) -> ParseResult<EnumValueDefinition<'a>> {
    let description = parse_description(parser)?;
    let name = match parser.expect_name()? {
        n @ Spanning {
            item: "true" | "false" | "null",
            ..
        } => {
            return Err(n.map(|item| ParseError::unexpected_token(Token::Name(item))));
        }
        n => n,
    };
    let directives = parse_directives(parser)?;

    let start_pos = description
        .as_ref()
        .map_or(name.span.start, |d| d.span.start);
    let end_pos = directives.as_ref().map_or(name.span.end, |s| s.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        EnumValueDefinition {
            description,
            name,
            directives: directives.map(|s| s.item),
        },
    ))
}

fn parse_input_object_type<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition<'a>> {
    let start_pos = parser.expect(&Token::Name("input"))?.span.start;
    let name = parser.expect_name()?;
    let directives = parse_directives(parser)?;

    let fields = if parser.peek().item == Token::CurlyOpen {
        Some(parser.delimited_nonempty_list(
            &Token::CurlyOpen,
            parse_input_value_definition,
            &Token::CurlyClose,
        )?)
    } else {
        None
    };

    let end_pos = fields
        .as_ref()
        .map(|s| s.span.end)
        .or(directives.as_ref().map(|s| s.span.end))
        .unwrap_or(name.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::InputObject(InputObjectTypeDefinition {
            description,
            name,
            directives: directives.map(|s| s.item),
            fields: fields.map(|s| s.item).unwrap_or_default(),
        }),
    ))
}

fn parse_directive_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<DirectiveDefinition<'a>> {
    let start_pos = parser.expect(&Token::Name("directive"))?.span.start;
    parser.expect(&Token::At)?;
    let name = parser.expect_name()?;
    let arguments = parse_arguments_definition(parser)?;
    let repeatable = parser.skip_keyword("repeatable")?.is_some();
    parser.expect(&Token::Name("on"))?;

    parser.skip(&Token::Pipe)?;
    let mut locations = vec![parse_directive_location(parser)?];
    while parser.skip(&Token::Pipe)?.is_some() {
        locations.push(parse_directive_location(parser)?);
    }

    let end_pos = locations
        .last()
        .map(|s| s.span.end)
        .unwrap_or(name.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        DirectiveDefinition {
            description,
            name,
            arguments,
            repeatable,
            locations,
        },
    ))
}

fn parse_directive_location<'a>(parser: &mut Parser<'a>) -> ParseResult<DirectiveLocation> {
    let name = parser.expect_name()?;
    match DirectiveLocation::from_str(name.item) {
        Some(loc) => Ok(name.map(|_| loc)),
        None => Err(name.map(|item| ParseError::unexpected_token(Token::Name(item)))),
    }
}
