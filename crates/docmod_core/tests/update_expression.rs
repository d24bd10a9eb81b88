//! Integration tests for the update builder and its session handoff.

use docmod_codec::{from_cbor, Value};
use docmod_core::{
    CoreError, Field, FloatType, IntType, ListType, Operator, RecordingSession, Selector,
    ServerVersion, Session, SessionError, SetType, StringType, UpdateExpression,
};
use proptest::prelude::*;

struct Schema {
    name: Field,
    count: Field,
    score: Field,
    tags: Field,
    labels: Field,
}

fn schema() -> Schema {
    Schema {
        name: Field::new("name", StringType::new().with_max_length(16)).unwrap(),
        count: Field::new("count", IntType).unwrap(),
        score: Field::new("stats.score", FloatType).unwrap(),
        tags: Field::new("tags", ListType::new(StringType::new())).unwrap(),
        labels: Field::new("labels", SetType::new(StringType::new())).unwrap(),
    }
}

#[test]
fn push_then_execute_hands_over_exact_document() {
    let s = schema();
    let session = RecordingSession::new();

    let mut update = session.update(Selector::all());
    update.push(&s.tags, "x").unwrap();
    update.execute().unwrap();

    let command = session.last_command().unwrap();
    assert_eq!(
        command.to_document(),
        Value::map([("$push", Value::map([("tags", Value::from("x"))]))])
    );
    assert!(!command.upsert());
    assert!(!command.multi());
}

#[test]
fn push_on_numeric_field_is_invalid_and_leaves_nothing() {
    let s = schema();
    let session = RecordingSession::new();

    let mut update = session.update(Selector::all());
    let err = update.push(&s.count, 1).unwrap_err();

    match err {
        CoreError::InvalidModifier {
            type_name,
            operator,
        } => {
            assert_eq!(type_name, "int");
            assert_eq!(operator, Operator::Push);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(update.operations().is_empty());
}

#[test]
fn same_operator_overwrites_previous_value() {
    let s = schema();
    let session = RecordingSession::new();

    let mut update = session.update(Selector::all());
    update.set(&s.name, "first").unwrap();
    update.set(&s.name, "second").unwrap();

    let ops = update.operations();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops.get(Operator::Set, "name"), Some(&Value::from("second")));
}

#[test]
fn conflicting_operator_is_rejected_without_side_effects() {
    let s = schema();
    let session = RecordingSession::new();

    let mut update = session.update(Selector::all());
    update.set(&s.count, 10).unwrap();
    let before = update.operations().clone();

    let err = update.increment(&s.count, 1).unwrap_err();
    match err {
        CoreError::ConflictingModifier {
            field,
            existing,
            attempted,
            ..
        } => {
            assert_eq!(field, "count");
            assert_eq!(existing, Operator::Set);
            assert_eq!(attempted, Operator::Inc);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(update.operations(), &before);

    // still usable afterwards
    update.set(&s.name, "ok").unwrap();
    assert_eq!(update.operations().len(), 2);
}

#[test]
fn nested_field_conflicts_with_its_parent() {
    let s = schema();
    let stats = Field::new("stats", IntType).unwrap();
    let session = RecordingSession::new();

    let mut update = session.update(Selector::all());
    update.increment(&s.score, 0.5).unwrap();
    assert!(matches!(
        update.unset(&stats),
        Err(CoreError::ConflictingModifier { .. })
    ));
}

#[test]
fn variadic_operators_encode_each_value() {
    let s = schema();
    let scores = Field::new("scores", ListType::new(FloatType)).unwrap();
    let session = RecordingSession::new();

    let mut update = session.update(Selector::all());
    update.push_all(&scores, [1, 2, 3]).unwrap();
    update.pull_all(&s.tags, Vec::<Value>::new()).unwrap();

    assert_eq!(
        update.operations().get(Operator::PushAll, "scores"),
        Some(&Value::Array(vec![
            Value::Float(1.0),
            Value::Float(2.0),
            Value::Float(3.0),
        ]))
    );
    assert_eq!(
        update.operations().get(Operator::PullAll, "tags"),
        Some(&Value::Array(vec![]))
    );
}

#[test]
fn full_update_round_trips_through_the_wire() {
    let s = schema();
    let session = RecordingSession::with_version(ServerVersion::new(2, 0, 0));
    let selector = Selector::new(Value::map([("name", Value::from("alice"))])).unwrap();

    let mut update = session.update(selector);
    update
        .set(&s.name, "bob")
        .unwrap()
        .increment_one(&s.count)
        .unwrap()
        .increment(&s.score, 2)
        .unwrap()
        .pull(&s.tags, "old")
        .unwrap()
        .add_to_set(&s.labels, "vip")
        .unwrap()
        .upsert()
        .multi();
    update.execute().unwrap();

    let command = session.last_command().unwrap();
    let wire = from_cbor(&command.encode().unwrap()).unwrap();
    assert_eq!(wire, command.to_wire());

    let doc = wire.get("u").unwrap();
    assert_eq!(doc.get("$set").and_then(|f| f.get("name")), Some(&Value::from("bob")));
    assert_eq!(doc.get("$inc").and_then(|f| f.get("count")), Some(&Value::Integer(1)));
    assert_eq!(
        doc.get("$inc").and_then(|f| f.get("stats.score")),
        Some(&Value::Float(2.0))
    );
    assert_eq!(doc.get("$pull").and_then(|f| f.get("tags")), Some(&Value::from("old")));
    assert_eq!(
        doc.get("$addToSet").and_then(|f| f.get("labels")),
        Some(&Value::from("vip"))
    );
    assert_eq!(wire.get("upsert"), Some(&Value::Bool(true)));
    assert_eq!(wire.get("multi"), Some(&Value::Bool(true)));
    assert_eq!(
        wire.get("q").and_then(|q| q.get("name")),
        Some(&Value::from("alice"))
    );
}

#[test]
fn version_gate_is_negotiated_at_construction() {
    let s = schema();
    let session = RecordingSession::with_version(ServerVersion::new(1, 3, 0));

    let mut update = session.update(Selector::all());
    update.unset(&s.name).unwrap();
    let err = update.add_to_set(&s.labels, "x").unwrap_err();
    assert_eq!(
        err.to_string(),
        "$addToSet requires server version 1.3.3, session reports 1.3.0"
    );
}

#[test]
fn session_errors_pass_through_untouched() {
    let s = schema();
    let session = RecordingSession::new();
    session.fail_next("write conflict");

    let mut update = session.update(Selector::all());
    update.set(&s.name, "x").unwrap();
    match update.execute() {
        Err(SessionError::Transport { message }) => assert_eq!(message, "write conflict"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn builder_works_through_a_trait_object() {
    let s = schema();
    let session = RecordingSession::new();
    let dynamic: &dyn Session<Output = (), Error = SessionError> = &session;

    let mut update = UpdateExpression::new(dynamic, Selector::all());
    update.set(&s.name, "dyn").unwrap();
    update.execute().unwrap();

    assert_eq!(session.commands().len(), 1);
}

#[derive(Debug, Clone)]
enum FlagCall {
    Upsert,
    Multi,
}

proptest! {
    #[test]
    fn flags_are_independent_of_operations(
        calls in prop::collection::vec(
            prop_oneof![Just(FlagCall::Upsert), Just(FlagCall::Multi)],
            0..8,
        ),
    ) {
        let s = schema();
        let session = RecordingSession::new();
        let mut update = session.update(Selector::all());
        update.set(&s.name, "fixed").unwrap();
        let before = update.operations().clone();

        for call in &calls {
            match call {
                FlagCall::Upsert => update.upsert(),
                FlagCall::Multi => update.multi(),
            };
        }

        prop_assert_eq!(update.is_upsert(), calls.iter().any(|c| matches!(c, FlagCall::Upsert)));
        prop_assert_eq!(update.is_multi(), calls.iter().any(|c| matches!(c, FlagCall::Multi)));
        prop_assert_eq!(update.operations(), &before);
    }

    #[test]
    fn push_all_keeps_every_item_in_order(items in prop::collection::vec("[a-z]{0,6}", 0..10)) {
        let s = schema();
        let session = RecordingSession::new();
        let mut update = session.update(Selector::all());
        update.push_all(&s.tags, items.clone()).unwrap();

        let expected: Vec<Value> = items.into_iter().map(Value::Text).collect();
        prop_assert_eq!(
            update.operations().get(Operator::PushAll, "tags"),
            Some(&Value::Array(expected))
        );
    }

    #[test]
    fn rejected_calls_never_change_state(delta in any::<i64>(), text in "[a-z]{1,8}") {
        let s = schema();
        let session = RecordingSession::new();
        let mut update = session.update(Selector::all());
        update.set(&s.count, delta).unwrap();
        let before = update.operations().clone();

        prop_assert!(update.increment(&s.count, delta).is_err());
        prop_assert!(update.push(&s.count, delta).is_err());
        prop_assert!(update.set(&s.tags, text.as_str()).is_err());
        prop_assert_eq!(update.operations(), &before);
    }
}
