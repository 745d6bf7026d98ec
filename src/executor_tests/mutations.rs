use std::sync::Mutex;

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{Resolver, ResolverContext, Schema, Value, Variables, graphql};

#[derive(Default)]
struct Recorder {
    values: Mutex<Vec<i32>>,
}

fn mutation_schema() -> Schema {
    crate::build_schema(
        r#"
        schema {
          query: Query
          mutation: Mutation
        }

        type Query {
          recorded: [Int]
        }

        type Mutation {
          set(x: Int!): Int
        }
      "#,
    )
    .unwrap()
    .resolver(
        "Mutation",
        "set",
        Resolver::sync(|ctx: ResolverContext<'_>| {
            let recorder = ctx
                .context_as::<Recorder>()
                .expect("host context is a Recorder");
            let x = ctx.arg("x").as_int_value().expect("x is coerced to Int");
            recorder.values.lock().unwrap().push(x);
            Ok(Value::from(x))
        }),
    )
    .finish()
    .unwrap()
}

#[tokio::test]
async fn mutation_root_fields_run_in_document_order() {
    let schema = mutation_schema();
    let recorder = Recorder::default();

    let response = graphql(
        &schema,
        "mutation { a: set(x: 1) b: set(x: 2) }",
        &Value::Null,
        &recorder,
        &Variables::new(),
        None,
    )
    .await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"data": {"a": 1, "b": 2}}),
    );

    // Side effects of field `a` completed fully before field `b` began.
    assert_eq!(*recorder.values.lock().unwrap(), vec![1, 2]);
}

#[tokio::test]
async fn repeated_runs_are_stable_regardless_of_scheduling() {
    let schema = mutation_schema();

    for _ in 0..16 {
        let recorder = Recorder::default();
        graphql(
            &schema,
            "mutation { a: set(x: 1) b: set(x: 2) c: set(x: 3) }",
            &Value::Null,
            &recorder,
            &Variables::new(),
            None,
        )
        .await;
        assert_eq!(*recorder.values.lock().unwrap(), vec![1, 2, 3]);
    }
}
