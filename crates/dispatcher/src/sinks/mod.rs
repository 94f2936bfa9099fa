//! Sink implementations

mod json_lines;

pub use self::json_lines::JsonLinesSink;
