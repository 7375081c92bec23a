//! Source preparation applied to every template before Tera compiles it.
//!
//! Tera has no global whitespace switches, so the environment rewrites the
//! template source instead. Two rules make block markup invisible:
//!
//! - **lstrip**: spaces and tabs between the start of a source line and a
//!   `{% … %}` or `{# … #}` tag are removed.
//! - **trim**: the first newline directly after such a tag is removed.
//!
//! `{{ … }}` expressions are never touched, nor is anything between
//! `{% raw %}` and `{% endraw %}`. A single trailing newline at the end of
//! the source is dropped.
//!
//! ```text
//! source:                      rendered (items = [a, b]):
//! <ul>                         <ul>
//!     {% for i in items %}         <li>a</li>
//!     <li>{{ i }}</li>             <li>b</li>
//!     {% endfor %}             </ul>
//! </ul>
//! ```
//!
//! While scanning, `extends`, `import`, and `include` tags are collected so
//! the environment can load those templates first. A `resource/` prefix on
//! the referenced name is stripped in the rewritten tag, matching the name
//! the template is loaded under.

use std::borrow::Cow;
use std::ops::Range;

use crate::resource::strip_resource;

/// A template name referenced from another template's source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Dependency {
    pub name: String,
    /// `include … ignore missing`: absence is not an error.
    pub optional: bool,
}

/// Template source after whitespace rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Prepared {
    pub source: String,
    pub dependencies: Vec<Dependency>,
}

/// Apply the block whitespace rules to `source`.
pub fn trim_blocks(source: &str) -> String {
    prepare(source).source
}

pub(crate) fn prepare(source: &str) -> Prepared {
    let mut rest = source.strip_suffix('\n').unwrap_or(source);
    let mut out = String::with_capacity(rest.len());
    let mut dependencies = Vec::new();
    // Byte offset in `out` where the current source line began.
    let mut line_start = 0;
    let mut in_raw = false;

    while let Some(pos) = rest.find(['{', '\n']) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if let Some(after) = rest.strip_prefix('\n') {
            out.push('\n');
            line_start = out.len();
            rest = after;
            continue;
        }

        if rest.starts_with("{{") && !in_raw {
            // Copied whole, so quoted `{%` or `{#` inside it is not a tag.
            let Some(len) = tag_len(rest, "}}") else {
                break;
            };
            out.push_str(&rest[..len]);
            rest = &rest[len..];
            continue;
        }

        let close = if rest.starts_with("{%") {
            "%}"
        } else if rest.starts_with("{#") {
            "#}"
        } else {
            out.push('{');
            rest = &rest[1..];
            continue;
        };

        // Unterminated tag: leave the remainder for Tera to report.
        let Some(len) = tag_len(rest, close) else {
            break;
        };
        let (tag, after) = rest.split_at(len);
        rest = after;
        let keyword = block_keyword(tag);

        if in_raw && keyword != Some("endraw") {
            out.push_str(tag);
            continue;
        }

        let mut tag = Cow::Borrowed(tag);
        match keyword {
            Some("raw") => in_raw = true,
            Some("endraw") => in_raw = false,
            Some("extends" | "import" | "include") => {
                if let Some((dep, span)) = dependency(&tag) {
                    let target = strip_resource(&dep.name);
                    if target.len() != dep.name.len() {
                        tag = Cow::Owned(format!("{}{target}{}", &tag[..span.start], &tag[span.end..]));
                    }
                    dependencies.push(dep);
                }
            }
            _ => {}
        }

        if out[line_start..].bytes().all(|b| b == b' ' || b == b'\t') {
            out.truncate(line_start);
        }
        out.push_str(&tag);
        if let Some(stripped) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
            rest = stripped;
            line_start = out.len();
        }
    }
    out.push_str(rest);

    Prepared {
        source: out,
        dependencies,
    }
}

/// Length of the tag starting at `rest[0]`, closing delimiter included.
///
/// Quoted strings inside `{% %}` tags and `{{ }}` expressions may contain
/// the closing delimiter.
fn tag_len(rest: &str, close: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices().skip(2) {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None if close != "#}" && matches!(c, '"' | '\'' | '`') => quote = Some(c),
            None if rest[i..].starts_with(close) => return Some(i + close.len()),
            None => {}
        }
    }
    None
}

/// First word of a `{% … %}` tag, ignoring whitespace-control dashes.
fn block_keyword(tag: &str) -> Option<&str> {
    tag.strip_prefix("{%")?
        .strip_suffix("%}")?
        .trim_matches('-')
        .split_whitespace()
        .next()
}

/// The first quoted string in an `extends`/`import`/`include` tag, with
/// the byte range of the name inside `tag`.
fn dependency(tag: &str) -> Option<(Dependency, Range<usize>)> {
    let body = tag.strip_prefix("{%")?.strip_suffix("%}")?;
    let start = body.find(['"', '\'', '`'])?;
    let quote = body[start..].chars().next()?;
    let inner = &body[start + 1..];
    let len = inner.find(quote)?;
    // "{%" plus the opening quote
    let name_start = 2 + start + 1;
    let dep = Dependency {
        name: inner[..len].to_string(),
        optional: body.contains("ignore missing"),
    };
    Some((dep, name_start..name_start + len))
}
