//! Line grammar of munin `config` and `fetch` responses
//!
//! Each response line is classified into a [`Line`] instead of being probed
//! with ad hoc pattern matches at the call site.

use std::sync::LazyLock;

use regex::Regex;

static CATEGORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"graph_category (.+)").expect("valid category pattern"));

static BASE_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"graph_args.*--base (\d+)").expect("valid base pattern"));

static VALUE_SAMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\.value\s+(.+)$").expect("valid sample pattern"));

/// Classified response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// `graph_category <value>`
    Category(String),

    /// `graph_args ... --base <digits>`
    BaseArg(u64),

    /// `<field>.value <value>`
    ValueSample { field: String, value: String },

    /// Line starting with `#`, an error reported by the agent
    CommentError(String),

    Unrecognized,
}

/// Classify one line of a `config <metric>` response
pub fn classify_config(line: &str) -> Line {
    if let Some(captures) = CATEGORY.captures(line) {
        return Line::Category(captures[1].to_string());
    }

    // digits only, but may still overflow
    if let Some(captures) = BASE_ARG.captures(line)
        && let Ok(base) = captures[1].parse()
    {
        return Line::BaseArg(base);
    }

    Line::Unrecognized
}

/// Classify one line of a `fetch <metric>` response
pub fn classify_fetch(line: &str) -> Line {
    if let Some(text) = line.strip_prefix('#') {
        return Line::CommentError(text.trim().to_string());
    }

    match VALUE_SAMPLE.captures(line) {
        Some(captures) => Line::ValueSample {
            field: captures[1].to_string(),
            value: captures[2].to_string(),
        },
        None => Line::Unrecognized,
    }
}
