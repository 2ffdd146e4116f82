//! Derivation of dotted graphite names from munin identities
//!
//! A point name is assembled as
//! `<prefix>.<reversed node>.<category or "other">.<metric>.<field>`.

use crate::grammar::{self, Line};

/// Segment used when a metric's config carries no `graph_category`
pub const FALLBACK_CATEGORY: &str = "other";

/// Replace every space with an underscore
pub fn sanitize(id: &str) -> String {
    id.replace(' ', "_")
}

/// Reverse the dot separated labels of `node` and put `prefix` in front
///
/// `web1.example.com` becomes `servers.com.example.web1`. The result is
/// computed from the node id alone, so names never leak from one node into
/// the next.
pub fn build_base_name(prefix: &str, node: &str) -> String {
    let reversed = node.split('.').rev().collect::<Vec<_>>().join(".");
    format!("{}.{}", prefix, sanitize(&reversed))
}

/// Outcome of scanning a metric's config response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizedName {
    pub name: String,
    pub had_category: bool,
    /// `--base` value from `graph_args`, informational only
    pub base: Option<u64>,
}

/// Append the category segment taken from `config_lines` to `base`
///
/// The first `graph_category` line wins. Without one, `.other` is appended.
pub fn apply_category<S: AsRef<str>>(base: &str, config_lines: &[S]) -> CategorizedName {
    let mut category = None;
    let mut base_arg = None;

    for line in config_lines {
        match grammar::classify_config(line.as_ref()) {
            Line::Category(value) if category.is_none() => category = Some(value),
            Line::BaseArg(value) => base_arg = Some(value),
            _ => {}
        }
    }

    let had_category = category.is_some();
    let segment = category
        .map(|c| sanitize(&c))
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

    CategorizedName {
        name: format!("{base}.{segment}"),
        had_category,
        base: base_arg,
    }
}

/// Full name of one sampled field
pub fn point_name(categorized: &str, metric: &str, field: &str) -> String {
    format!("{}.{}.{}", categorized, sanitize(metric), sanitize(field))
}
