//! Colorful console output for pipeline events.
//!
//! Provides a custom `tracing` layer that formats the structured events
//! emitted by `typeflow-stream`.
//!
//! ## Log Levels
//!
//! - **DEBUG**: Stage appends, rejected stages, collect start/end
//! - **TRACE**: Individual dropped elements (when `trace_elements` is on)

use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};


static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVE: &str = "typeflow_stream=debug";

/// Initializes console output for pipeline events.
///
/// Safe to call multiple times - only the first call has effect.
/// Respects `RUST_LOG`; falls back to [`DEFAULT_DIRECTIVE`].
pub fn init() {
    INIT.get_or_init(|| {
        EPOCH.get_or_init(Instant::now);

        let mut builder = EnvFilter::builder();
        if let Ok(directive) = DEFAULT_DIRECTIVE.parse::<Directive>() {
            builder = builder.with_default_directive(directive);
        }
        let filter = builder.from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(StreamConsoleLayer)
            .try_init();
    });
}

// Seconds since `init`.
fn elapsed_secs() -> f64 {
    EPOCH
        .get()
        .map_or(0.0, |epoch| epoch.elapsed().as_secs_f64())
}

/// A tracing layer that formats pipeline events with colors.
pub struct StreamConsoleLayer;

impl<S: Subscriber> Layer<S> for StreamConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        // Accept events from typeflow crates only
        if !metadata.target().starts_with("typeflow") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    stage: Option<String>,
    kind: Option<String>,
    out_type: Option<String>,
    out_key_type: Option<String>,
    out_value_type: Option<String>,
    error: Option<String>,
    depth: Option<u64>,
    stages: Option<u64>,
    emitted: Option<u64>,
    dropped: Option<u64>,
    duration_us: Option<u64>,
}

impl EventVisitor {
    fn set_text(&mut self, name: &str, text: String) {
        match name {
            "event" => self.event = Some(text),
            "stage" => self.stage = Some(text),
            "kind" => self.kind = Some(text),
            "out_type" => self.out_type = Some(text),
            "out_key_type" => self.out_key_type = Some(text),
            "out_value_type" => self.out_value_type = Some(text),
            "error" => self.error = Some(text),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_text(field.name(), s.trim_matches('"').to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "depth" => self.depth = Some(value),
            // Stage index on element_dropped; stage name everywhere else.
            "stage" => self.stage = Some(value.to_string()),
            "stages" => self.stages = Some(value),
            "emitted" => self.emitted = Some(value),
            "dropped" => self.dropped = Some(value),
            "duration_us" => self.duration_us = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_text(field.name(), value.to_string());
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "stage_append" => format_stage_append(v),
        "stage_rejected" => format_stage_rejected(v),
        "collect_start" => format_collect_start(v),
        "collect_end" => format_collect_end(v),
        "element_dropped" => format_element_dropped(v, level),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_stage_append(v: &EventVisitor) -> String {
    let stage = v.stage.as_deref().unwrap_or("stage");
    let out_type = v.out_type.as_deref().unwrap_or("?");

    format!(
        "{} {} {:<15} → {} │ depth {}",
        format_elapsed(),
        "+".bright_blue().bold(),
        stage.white().bold(),
        out_type.bright_magenta(),
        v.depth.unwrap_or(0).bright_yellow()
    )
}

fn format_stage_rejected(v: &EventVisitor) -> String {
    let stage = v.stage.as_deref().unwrap_or("stage");
    let error = v.error.as_deref().unwrap_or("unknown error");

    format!(
        "{} {} {} rejected │ {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        stage.white().bold(),
        error.bright_red()
    )
}

fn format_collect_start(v: &EventVisitor) -> String {
    let out_type = match (&v.out_type, &v.out_key_type, &v.out_value_type) {
        (Some(elem), _, _) => format!("list<{}>", elem),
        (None, Some(key), Some(value)) => format!("map<{}, {}>", key, value),
        _ => "?".to_string(),
    };

    format!(
        "{} {} Collecting {} │ {} stages",
        format_elapsed(),
        "▶".bright_green().bold(),
        out_type.bright_magenta(),
        v.stages.unwrap_or(0).bright_yellow()
    )
}

fn format_collect_end(v: &EventVisitor) -> String {
    let emitted = v.emitted.unwrap_or(0);
    let dropped = v.dropped.unwrap_or(0);

    format!(
        "{} {} Collected │ {} emitted │ {} dropped │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        emitted.bright_green(),
        if dropped > 0 {
            dropped.yellow().to_string()
        } else {
            dropped.white().to_string()
        },
        format_duration_us(v.duration_us.unwrap_or(0)).yellow()
    )
}

fn format_element_dropped(v: &EventVisitor, level: Level) -> String {
    if level != Level::TRACE {
        return String::new();
    }

    format!(
        "{} {} dropped at stage {} {}",
        format_elapsed(),
        "·".bright_black(),
        v.stage.as_deref().unwrap_or("?").bright_black(),
        v.kind.as_deref().unwrap_or("").bright_black()
    )
}

fn format_duration_us(us: u64) -> String {
    if us < 1000 {
        format!("{}µs", us)
    } else if us < 1_000_000 {
        format!("{:.2}ms", us as f64 / 1000.0)
    } else {
        format!("{:.2}s", us as f64 / 1_000_000.0)
    }
}
