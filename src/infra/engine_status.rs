//! Heuristic scraping of `SHOW ENGINE INNODB STATUS` text.
//!
//! The report is free text meant for humans, so every counter is optional:
//! a counter that cannot be located is `None`, never a silent zero.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::EngineStatusSnapshot;

// Literal patterns; `patterns_compile` in the tests forces both.
// "Pages read 1204, created 3317, written 5120"
static PAGES_CREATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"created\s+(\d+)").expect("valid regex"));
// "Free buffers       8003"
static FREE_BUFFERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Free buffers\s+(\d+)").expect("valid regex"));

pub fn parse_engine_status(text: &str) -> EngineStatusSnapshot {
    EngineStatusSnapshot {
        pages_created: capture_u64(&PAGES_CREATED, text),
        free_buffers: capture_u64(&FREE_BUFFERS, text),
    }
}

fn capture_u64(pattern: &Regex, text: &str) -> Option<u64> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
