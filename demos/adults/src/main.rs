//! Adults Example
//!
//! Filters a list of people down to the adults and collects their names,
//! showing the pipeline events on the console.
//!
//! ```text
//! cargo run -p adults [config.toml]
//! ```

use typeflow::prelude::*;

/// A person, stored in the pipeline as a `Person` record.
#[derive(Debug, Clone, PartialEq, Record)]
pub struct Person {
    pub name: String,
    pub age: i64,
}

impl Person {
    pub fn new(name: &str, age: i64) -> Self {
        Person {
            name: name.to_string(),
            age,
        }
    }
}

fn people() -> Vec<Person> {
    vec![
        Person::new("Ada", 36),
        Person::new("Tim", 12),
        Person::new("Lin", 19),
        Person::new("Zoe", 18),
        Person::new("Max", 44),
    ]
}

fn load_config() -> StreamConfig {
    match std::env::args().nth(1) {
        Some(path) => StreamConfig::load(&path).unwrap_or_else(|err| {
            eprintln!("Ignoring {}: {}", path, err);
            StreamConfig::default()
        }),
        None => StreamConfig::default(),
    }
}

fn main() {
    typeflow::console::init();

    println!("typeflow Adults Example");
    println!("=======================\n");

    let people = people();
    println!("Input: {} people", people.len());

    let mut names: Vec<String> = Vec::new();
    let result = SequenceStream::from_items(people.clone())
        .with_config(load_config())
        .filter(|p: Person| p.age > 18)
        .map(|p: Person| p.name)
        .collect_into_typed(&mut names);

    match result {
        Ok(()) => {
            println!("\nAdults:");
            for name in &names {
                println!("  {}", name);
            }
        }
        Err(err) => {
            eprintln!("Pipeline failed: {}", err);
            std::process::exit(1);
        }
    }

    // The same predicate over the wrong type is caught before anything runs.
    let stream = SequenceStream::from_items(people).filter(|age: i64| age > 18);
    if let Some(err) = stream.error() {
        println!("\nRejected stage: {}", err);
    }
}
