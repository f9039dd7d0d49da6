//! `Person` record fixtures.

use typeflow_core::{List, Record, Value, ValueType};

/// Record name used by [`person`].
pub const PERSON: &str = "Person";

/// Plain struct mirror of the `Person` record.
#[derive(Clone, Debug, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: i64,
}

impl Person {
    pub fn new(name: &str, age: i64) -> Self {
        Self {
            name: name.to_string(),
            age,
        }
    }

    /// Builds the record form.
    pub fn to_record(&self) -> Record {
        person(&self.name, self.age)
    }
}

/// A `Person { name, age }` record.
pub fn person(name: &str, age: i64) -> Record {
    Record::builder(PERSON)
        .field("name", name)
        .field("age", age)
        .build()
}

/// Four people, two of them adults.
pub fn people() -> Vec<Person> {
    vec![
        Person::new("Ada", 36),
        Person::new("Tim", 12),
        Person::new("Lin", 19),
        Person::new("Zoe", 18),
    ]
}

/// [`people`] as a list of records.
pub fn people_list() -> Value {
    let mut list = List::new(ValueType::record(PERSON));
    for p in people() {
        list.push(Value::Record(p.to_record()));
    }
    Value::List(list)
}
