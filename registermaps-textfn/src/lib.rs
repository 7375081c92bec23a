//! # registermaps-textfn
//!
//! Plain-text helpers shared by the generators and the template layer.
//!
//! The main entry point is [`reflow`], which rewraps free text (register
//! descriptions, field notes) to a target column width. The template
//! environment exposes it as the `reflow` filter.
//!
//! ```rust
//! use registermaps_textfn::reflow;
//!
//! let text = "Enables the\n   output   driver.\n\nWrite 1 to clear.";
//! assert_eq!(
//!     reflow(text, 20).unwrap(),
//!     "Enables the output\ndriver.\n\nWrite 1 to clear."
//! );
//! ```

use thiserror::Error;
use unicode_width::UnicodeWidthStr;

/// Column width used when a caller does not ask for one.
pub const DEFAULT_WIDTH: usize = 78;

/// Errors from text reflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflowError {
    /// A width of zero leaves no room for any text.
    #[error("reflow width must be at least 1")]
    ZeroWidth,

    /// The line prefix consumes the entire width.
    #[error("line prefix {prefix:?} is {prefix_width} columns wide, leaving no room in {width}")]
    PrefixTooWide {
        prefix: String,
        prefix_width: usize,
        width: usize,
    },
}

/// Options for [`reflow_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflowOptions {
    /// Total line width in display columns, prefix included.
    pub width: usize,
    /// Pad inner gaps so every line but a paragraph's last fills `width`.
    pub justify: bool,
    /// Text placed at the start of every output line (e.g. `"-- "`).
    pub prefix: String,
}

impl Default for ReflowOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            justify: false,
            prefix: String::new(),
        }
    }
}

impl ReflowOptions {
    /// Options with the given width and no justification or prefix.
    pub fn width(width: usize) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn justified(mut self, justify: bool) -> Self {
        self.justify = justify;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rewrap `text` so no line exceeds `width` columns.
///
/// Shorthand for [`reflow_with`] with [`ReflowOptions::width`].
pub fn reflow(text: &str, width: usize) -> Result<String, ReflowError> {
    reflow_with(text, &ReflowOptions::width(width))
}

/// Rewrap `text` according to `opts`.
///
/// Paragraphs are separated by blank lines in the input and by exactly one
/// blank line in the output. Runs of whitespace inside a paragraph collapse
/// to single spaces. A word wider than the available width is placed alone
/// on its own line rather than split. The result has no trailing newline.
pub fn reflow_with(text: &str, opts: &ReflowOptions) -> Result<String, ReflowError> {
    if opts.width == 0 {
        return Err(ReflowError::ZeroWidth);
    }
    let prefix_width = opts.prefix.width();
    if prefix_width >= opts.width {
        return Err(ReflowError::PrefixTooWide {
            prefix: opts.prefix.clone(),
            prefix_width,
            width: opts.width,
        });
    }
    let available = opts.width - prefix_width;
    let blank_line = opts.prefix.trim_end();

    let mut out: Vec<String> = Vec::new();
    for paragraph in paragraphs(text) {
        if !out.is_empty() {
            out.push(blank_line.to_string());
        }
        let lines = fill(&paragraph, available);
        let last = lines.len().saturating_sub(1);
        for (i, line) in lines.iter().enumerate() {
            let body = if opts.justify && i < last {
                justify_line(line, available)
            } else {
                line.join(" ")
            };
            out.push(format!("{}{}", opts.prefix, body));
        }
    }
    Ok(out.join("\n"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split `text` into paragraphs of whitespace-separated words.
fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                result.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.extend(line.split_whitespace());
    }
    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Greedy line filling. Every returned line holds at least one word.
fn fill<'a>(words: &[&'a str], available: usize) -> Vec<Vec<&'a str>> {
    let mut lines: Vec<Vec<&'a str>> = Vec::new();
    let mut line: Vec<&'a str> = Vec::new();
    let mut line_width = 0;
    for &word in words {
        let w = word.width();
        if !line.is_empty() && line_width + 1 + w > available {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if !line.is_empty() {
            line_width += 1;
        }
        line_width += w;
        line.push(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Spread the slack of `words` over its gaps, leftmost gaps first.
fn justify_line(words: &[&str], available: usize) -> String {
    if words.len() < 2 {
        return words.join(" ");
    }
    let gaps = words.len() - 1;
    let text_width: usize = words.iter().map(|w| w.width()).sum();
    if text_width + gaps >= available {
        return words.join(" ");
    }
    let spaces = available - text_width;
    let base = spaces / gaps;
    let extra = spaces % gaps;

    let mut line = String::with_capacity(available);
    for (i, word) in words.iter().enumerate() {
        line.push_str(word);
        if i < gaps {
            let n = base + usize::from(i < extra);
            line.extend(std::iter::repeat(' ').take(n));
        }
    }
    line
}
