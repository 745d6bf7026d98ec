use futures::{FutureExt as _, StreamExt as _, stream};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    FieldResult, Object, Resolver, ResolverContext, Schema, Subscriber, Value, ValueStream,
    Variables, parse, subscribe,
};

/// One source event, keyed by the subscription root field the way the
/// default property resolver expects.
fn email(from: &str, subject: &str) -> Value {
    Value::Object(Object::from_iter([(
        "importantEmail",
        Value::Object(Object::from_iter([
            (
                "email",
                Value::Object(Object::from_iter([
                    ("from", Value::from(from)),
                    ("subject", Value::from(subject)),
                ])),
            ),
            ("inbox", Value::from(1)),
        ])),
    )]))
}

fn important_email_stream<'a>(
    _: ResolverContext<'a>,
) -> futures::future::BoxFuture<'a, FieldResult<ValueStream>> {
    async {
        Ok(stream::iter(vec![
            email("yuzhi@graphql.org", "Alpha"),
            email("hyo@graphql.org", "Beta"),
        ])
        .boxed() as ValueStream)
    }
    .boxed()
}

fn subscription_schema() -> Schema {
    crate::build_schema(
        r#"
        schema {
          query: Query
          subscription: Subscription
        }

        type Query {
          inbox: Int
        }

        type Subscription {
          importantEmail: EmailEvent
        }

        type EmailEvent {
          email: Email
          inbox: Int
        }

        type Email {
          from: String
          subject: String
        }
      "#,
    )
    .unwrap()
    .subscriber(
        "Subscription",
        "importantEmail",
        Subscriber::new(important_email_stream),
    )
    .finish()
    .unwrap()
}

#[tokio::test]
async fn yields_one_response_per_source_event_in_emission_order() {
    let schema = subscription_schema();
    let document = parse("subscription { importantEmail { email { from } } }").unwrap();

    let stream = subscribe(
        &document,
        None,
        &schema,
        &Variables::new(),
        &Value::Null,
        &(),
    )
    .await
    .unwrap();

    let responses: Vec<_> = stream.collect().await;
    let serialized: Vec<_> = responses
        .iter()
        .map(|r| serde_json::to_value(r).unwrap())
        .collect();

    assert_eq!(
        serialized,
        vec![
            json!({"data": {"importantEmail": {"email": {"from": "yuzhi@graphql.org"}}}}),
            json!({"data": {"importantEmail": {"email": {"from": "hyo@graphql.org"}}}}),
        ],
    );
}

#[tokio::test]
async fn an_erroring_event_does_not_terminate_the_stream() {
    let schema = crate::build_schema(
        r#"
        schema {
          query: Query
          subscription: Subscription
        }

        type Query {
          inbox: Int
        }

        type Subscription {
          counter: Int
        }
      "#,
    )
    .unwrap()
    .subscriber(
        "Subscription",
        "counter",
        Subscriber::sync(|_: ResolverContext<'_>| {
            Ok(stream::iter(vec![
                Value::Object(Object::from_iter([("counter", Value::from(1))])),
                Value::Object(Object::from_iter([("counter", Value::from(2))])),
            ])
            .boxed() as ValueStream)
        }),
    )
    .resolver(
        "Subscription",
        "counter",
        Resolver::sync(|ctx: ResolverContext<'_>| {
            match ctx.source.as_object_value().and_then(|o| o.get_field_value("counter")) {
                Some(v) if v.as_int_value() == Some(1) => Err(crate::FieldError::from("skip one")),
                Some(v) => Ok(v.clone()),
                None => Ok(Value::Null),
            }
        }),
    )
    .finish()
    .unwrap();

    let document = parse("subscription { counter }").unwrap();
    let stream = subscribe(
        &document,
        None,
        &schema,
        &Variables::new(),
        &Value::Null,
        &(),
    )
    .await
    .unwrap();

    let responses: Vec<_> = stream.collect().await;
    assert_eq!(responses.len(), 2);

    let first = serde_json::to_value(&responses[0]).unwrap();
    assert_eq!(first["data"], json!({"counter": null}));
    assert_eq!(first["errors"][0]["message"], json!("skip one"));

    let second = serde_json::to_value(&responses[1]).unwrap();
    assert_eq!(second, json!({"data": {"counter": 2}}));
}

#[tokio::test]
async fn query_operations_cannot_subscribe() {
    let schema = subscription_schema();
    let document = parse("{ inbox }").unwrap();

    let result = subscribe(
        &document,
        None,
        &schema,
        &Variables::new(),
        &Value::Null,
        &(),
    )
    .await;

    assert!(matches!(result, Err(crate::GraphQLError::NotSubscription)));
}
