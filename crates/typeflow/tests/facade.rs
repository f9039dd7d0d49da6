//! Integration tests for the facade crate.

use std::collections::HashMap;

use typeflow::prelude::*;
use typeflow_test::mappings::indexed_strings;
use typeflow_test::people;

#[derive(Debug, Clone, PartialEq, Record)]
struct Person {
    name: String,
    age: i64,
}

fn people_stream() -> SequenceStream {
    let people = people().into_iter().map(|p| Person {
        name: p.name,
        age: p.age,
    });
    SequenceStream::from_items(people)
}

#[test]
fn test_shorthand_constructors() {
    let out = typeflow::mapping(indexed_strings(5, &[99]))
        .filter(|_k: i64, v: String| v.len() > 1)
        .collect()
        .unwrap();
    assert_eq!(out, Value::Map(Map::from_entries(vec![(99i64, "99")])));

    let stream = typeflow::sequence(Value::Nil);
    assert!(matches!(stream.error(), Some(StreamError::Shape { .. })));
}

#[test]
fn test_config_from_toml() {
    let config = StreamConfig::from_toml_str(
        r#"
        reuse = "reject"
        initial_capacity = 2
        "#,
    )
    .unwrap();

    let mut stream = people_stream()
        .with_config(config)
        .filter(|p: Person| p.age > 18);
    assert_eq!(stream.config().reuse, ReusePolicy::Reject);

    let adults: Vec<Person> = stream.collect_as().unwrap();
    assert_eq!(adults.len(), 2);
    assert_eq!(adults[0].name, "Ada");
    assert_eq!(stream.collect(), Err(StreamError::Consumed));
}

#[test]
fn test_reject_after_collect() {
    let mut stream = people_stream()
        .with_config(StreamConfig::new().with_reuse(ReusePolicy::Reject))
        .map(|p: Person| p.age);
    let ages: Vec<i64> = stream.collect_as().unwrap();
    assert_eq!(ages, vec![36, 12, 19, 18]);
    assert_eq!(stream.collect(), Err(StreamError::Consumed));
}

#[test]
fn test_people_by_name() {
    let by_name: HashMap<String, i64> = people_stream()
        .to_entry_stream(|p: Person| (p.name, p.age))
        .filter_value(|age: i64| age >= 18)
        .collect_as()
        .unwrap();

    assert_eq!(by_name.len(), 3);
    assert_eq!(by_name.get("Zoe"), Some(&18));
}

#[test]
fn test_record_type_mismatch_is_reported_at_append() {
    #[derive(Debug, Clone, PartialEq, Record)]
    struct Pet {
        name: String,
    }

    let stream = people_stream().map(|p: Pet| p.name);
    assert!(matches!(
        stream.error(),
        Some(StreamError::StageShape { .. })
    ));
}
