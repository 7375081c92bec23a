//! Reflow behaviour tests for `registermaps-textfn`.

use registermaps_textfn::{reflow, reflow_with, ReflowError, ReflowOptions, DEFAULT_WIDTH};
use rstest::rstest;

// ---------------------------------------------------------------------------
// 1. Wrapping
// ---------------------------------------------------------------------------

#[rstest]
#[case("", 10, "")]
#[case("   \n\n  ", 10, "")]
#[case("short", 10, "short")]
#[case("one two three four", 9, "one two\nthree\nfour")]
#[case("one\ntwo\nthree", 80, "one two three")]
#[case("tab\tseparated   words", 80, "tab separated words")]
fn wraps_to_width(#[case] input: &str, #[case] width: usize, #[case] expected: &str) {
    assert_eq!(reflow(input, width).unwrap(), expected);
}

#[test]
fn no_line_exceeds_width() {
    let text = "The interrupt status register latches every enabled source. \
                Writing a one to any bit clears that bit; writing zero has no effect. \
                Reads return the latched state regardless of the mask.";
    for width in [12, 20, 33, 60] {
        let out = reflow(text, width).unwrap();
        for line in out.lines() {
            assert!(line.len() <= width, "line {line:?} exceeds width {width}");
        }
        assert_eq!(
            out.split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>(),
            "reflow must not drop or reorder words"
        );
    }
}

#[test]
fn paragraphs_are_preserved_with_single_blank_line() {
    let text = "First paragraph\nstill first.\n\n\n\nSecond one.";
    assert_eq!(
        reflow(text, DEFAULT_WIDTH).unwrap(),
        "First paragraph still first.\n\nSecond one."
    );
}

#[test]
fn wide_characters_count_by_display_width() {
    // Each CJK character is two columns wide.
    let out = reflow("日本 語語 ab", 5).unwrap();
    assert_eq!(out, "日本\n語語\nab");
}

// ---------------------------------------------------------------------------
// 2. Justification and prefixes
// ---------------------------------------------------------------------------

#[test]
fn justified_lines_fill_width_except_last() {
    let opts = ReflowOptions::width(15).justified(true);
    let out = reflow_with("alpha beta gamma delta epsilon", &opts).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines, vec!["alpha      beta", "gamma     delta", "epsilon"]);
}

#[test]
fn prefix_is_applied_to_every_line() {
    let opts = ReflowOptions::width(14).with_prefix("-- ");
    let out = reflow_with("clears the fifo\n\nself clearing", &opts).unwrap();
    assert_eq!(out, "-- clears the\n-- fifo\n--\n-- self\n-- clearing");
}

// ---------------------------------------------------------------------------
// 3. Errors
// ---------------------------------------------------------------------------

#[test]
fn zero_width_is_rejected() {
    assert_eq!(reflow("x", 0).unwrap_err(), ReflowError::ZeroWidth);
}

#[test]
fn prefix_wider_than_width_is_rejected() {
    let opts = ReflowOptions::width(3).with_prefix("// ");
    let err = reflow_with("x", &opts).unwrap_err();
    assert!(matches!(err, ReflowError::PrefixTooWide { prefix_width: 3, width: 3, .. }));
    assert!(err.to_string().contains("no room"));
}
