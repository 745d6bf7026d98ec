//! Shared fixtures for exercising single validation rules against a
//! representative menagerie schema.

use std::mem;

use crate::{
    parser::parse_document_source,
    schema::{SchemaBuilder, model::SchemaType},
    validation::{MultiVisitorNil, RuleError, ValidatorContext, Visitor, visit},
};

const TEST_SCHEMA: &str = r#"
schema {
  query: QueryRoot
  subscription: SubscriptionRoot
}

directive @onQuery on QUERY
directive @onMutation on MUTATION
directive @onSubscription on SUBSCRIPTION
directive @onField on FIELD
directive @onFragmentDefinition on FRAGMENT_DEFINITION
directive @onFragmentSpread on FRAGMENT_SPREAD
directive @onInlineFragment on INLINE_FRAGMENT
directive @onVariableDefinition on VARIABLE_DEFINITION
directive @repeatableDirective repeatable on FIELD

interface Being {
  name(surname: Boolean): String
}

interface Pet {
  name(surname: Boolean): String
}

interface Canine {
  name(surname: Boolean): String
}

enum DogCommand {
  SIT
  HEEL
  DOWN
}

type Dog implements Being & Pet & Canine {
  name(surname: Boolean): String
  nickname: String
  barkVolume: Int
  barks: Boolean
  doesKnowCommand(dogCommand: DogCommand): Boolean
  isHousetrained(atOtherHomes: Boolean = true): Boolean
  isAtLocation(x: Int, y: Int): Boolean
}

enum FurColor {
  BROWN
  BLACK
  TAN
  SPOTTED
}

type Cat implements Being & Pet {
  name(surname: Boolean): String
  nickname: String
  meows: Boolean
  meowVolume: Int
  furColor: FurColor
}

union CatOrDog = Cat | Dog

interface Intelligent {
  iq: Int
}

type Human implements Being & Intelligent {
  name(surname: Boolean): String
  pets: [Pet]
  relatives: [Human]
  iq: Int
}

type Alien implements Being & Intelligent {
  name(surname: Boolean): String
  iq: Int
  numEyes: Int
}

union DogOrHuman = Dog | Human

union HumanOrAlien = Human | Alien

input ComplexInput {
  requiredField: Boolean!
  intField: Int
  stringField: String
  booleanField: Boolean
  stringListField: [String]
}

type ComplicatedArgs {
  intArgField(intArg: Int): String
  nonNullIntArgField(nonNullIntArg: Int!): String
  stringArgField(stringArg: String): String
  booleanArgField(booleanArg: Boolean): String
  enumArgField(enumArg: FurColor): String
  floatArgField(floatArg: Float): String
  idArgField(idArg: ID): String
  stringListArgField(stringListArg: [String]): String
  complexArgField(complexArg: ComplexInput): String
  multipleReqs(req1: Int!, req2: Int!): String
  multipleOpts(opt1: Int = 0, opt2: Int = 0): String
  multipleOptAndReq(req1: Int!, req2: Int!, opt1: Int = 0, opt2: Int = 0): String
}

type QueryRoot {
  human(id: ID): Human
  alien: Alien
  dog: Dog
  cat: Cat
  pet: Pet
  catOrDog: CatOrDog
  dogOrHuman: DogOrHuman
  humanOrAlien: HumanOrAlien
  complicatedArgs: ComplicatedArgs
}

type SubscriptionRoot {
  importantEmails: [String]
  notImportantEmails: [String]
}
"#;

fn validate<'a, V, F>(schema_sdl: &str, q: &'a str, factory: F) -> Vec<RuleError>
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let schema_doc =
        parse_document_source(schema_sdl).expect("test schema definition language parses");
    let schema = SchemaBuilder::from_document(&schema_doc)
        .and_then(SchemaBuilder::finish)
        .expect("test schema builds");

    let doc = parse_document_source(q)
        .unwrap_or_else(|e| panic!("parse error on input {q:#?}: {e}"));

    // The schema and document live for the whole function while the
    // validation pass runs; stretch their borrows to the input lifetime.
    let schema_ref: &'a SchemaType = unsafe { mem::transmute(&schema.schema) };
    let doc_ref: &'a [_] = unsafe { mem::transmute(doc.as_slice()) };

    let mut ctx = ValidatorContext::new(schema_ref, doc_ref);
    let mut mv = MultiVisitorNil.with(factory());
    visit(&mut mv, &mut ctx, doc_ref);

    ctx.into_errors()
}

fn validate_sdl<'a, V, F>(q: &'a str, factory: F) -> Vec<RuleError>
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let schema = SchemaType::sdl_placeholder();
    let doc = parse_document_source(q)
        .unwrap_or_else(|e| panic!("parse error on input {q:#?}: {e}"));

    let schema_ref: &'a SchemaType = unsafe { mem::transmute(&schema) };
    let doc_ref: &'a [_] = unsafe { mem::transmute(doc.as_slice()) };

    let mut ctx = ValidatorContext::new(schema_ref, doc_ref);
    let mut mv = MultiVisitorNil.with(factory());
    visit(&mut mv, &mut ctx, doc_ref);

    ctx.into_errors()
}

pub(crate) fn expect_passes_rule<'a, V, F>(factory: F, q: &'a str)
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    expect_passes_rule_with_schema(TEST_SCHEMA, factory, q);
}

pub(crate) fn expect_fails_rule<'a, V, F>(factory: F, q: &'a str, expected_errors: &[RuleError])
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    expect_fails_rule_with_schema(TEST_SCHEMA, factory, q, expected_errors);
}

pub(crate) fn expect_passes_rule_with_schema<'a, V, F>(schema_sdl: &str, factory: F, q: &'a str)
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let errs = validate(schema_sdl, q, factory);
    if !errs.is_empty() {
        print_errors(&errs);
        panic!("expected rule to pass, but errors found");
    }
}

pub(crate) fn expect_fails_rule_with_schema<'a, V, F>(
    schema_sdl: &str,
    factory: F,
    q: &'a str,
    expected_errors: &[RuleError],
)
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let errs = validate(schema_sdl, q, factory);
    assert_errors(&errs, expected_errors);
}

pub(crate) fn expect_passes_sdl_rule<'a, V, F>(factory: F, q: &'a str)
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let errs = validate_sdl(q, factory);
    if !errs.is_empty() {
        print_errors(&errs);
        panic!("expected SDL rule to pass, but errors found");
    }
}

pub(crate) fn expect_fails_sdl_rule<'a, V, F>(factory: F, q: &'a str, expected_errors: &[RuleError])
where
    V: Visitor<'a> + 'a,
    F: FnOnce() -> V,
{
    let errs = validate_sdl(q, factory);
    assert_errors(&errs, expected_errors);
}

fn assert_errors(errs: &[RuleError], expected_errors: &[RuleError]) {
    if errs.is_empty() {
        panic!("expected rule to fail, but no errors were found");
    }

    // Collected errors come out sorted.
    let mut expected_errors = expected_errors.to_vec();
    expected_errors.sort();
    let expected_errors = &expected_errors[..];

    if errs != expected_errors {
        println!("expected:");
        print_errors(expected_errors);
        println!("actual:");
        print_errors(errs);
        panic!("expected rule to fail with specific errors");
    }
}

fn print_errors(errs: &[RuleError]) {
    for err in errs {
        for p in err.locations() {
            print!("[{:>3},{:>3},{:>3}]  ", p.index(), p.line(), p.column());
        }
        println!("{}", err.message());
    }
}
