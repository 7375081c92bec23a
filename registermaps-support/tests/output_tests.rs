use std::fs;
use std::io::Write;

use registermaps_support::{
    Destination, DirOutput, OpenMode, StdOutput, StreamOutput, StringOutput, SupportError,
};
use rstest::rstest;
use tempfile::TempDir;

fn write_all(dest: &mut dyn Destination, text: &str) {
    dest.stream().unwrap().write_all(text.as_bytes()).unwrap();
}

#[test]
fn dir_output_creates_files() {
    let dir = TempDir::new().unwrap();
    let out = DirOutput::new(dir.path());

    let mut regs = out.open("regs.vhd", OpenMode::Write).unwrap();
    write_all(regs.as_mut(), "entity regs is\n");
    write_all(regs.as_mut(), "end entity;\n");
    drop(regs);

    let written = fs::read_to_string(dir.path().join("regs.vhd")).unwrap();
    assert_eq!(written, "entity regs is\nend entity;\n");
}

#[test]
fn dir_output_truncates_or_appends() {
    let dir = TempDir::new().unwrap();
    let out = DirOutput::new(dir.path());
    let path = dir.path().join("log.txt");
    fs::write(&path, "old\n").unwrap();

    let mut appended = out.open_file("log.txt", OpenMode::Append).unwrap();
    write_all(&mut appended, "new\n");
    appended.finish().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");

    let mut truncated = out.open_file("log.txt", OpenMode::Write).unwrap();
    write_all(&mut truncated, "only\n");
    truncated.finish().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "only\n");
}

#[test]
fn create_new_refuses_existing_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("keep.h"), "x").unwrap();
    let out = DirOutput::new(dir.path());

    let err = out.open("keep.h", OpenMode::CreateNew).unwrap_err();
    match err {
        SupportError::Io { path, source } => {
            assert_eq!(path, dir.path().join("keep.h"));
            assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);
        }
        other => panic!("expected I/O error, got {other}"),
    }
}

#[test]
fn dir_output_missing_parent_is_io_error() {
    let dir = TempDir::new().unwrap();
    let out = DirOutput::new(dir.path().join("absent"));
    let err = out.open("x.c", OpenMode::Write).unwrap_err();
    assert!(matches!(err, SupportError::Io { .. }), "got: {err}");
}

#[test]
fn stream_output_writes_to_wrapped_writer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("single.rst");
    let file = fs::File::create(&path).unwrap();

    let mut out = StreamOutput::new(file);
    write_all(&mut out, "Registers\n=========\n");
    out.finish().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "Registers\n=========\n");
}

#[test]
fn string_output_collects_sequential_writes() {
    let mut out = StringOutput::new();
    write_all(&mut out, "abc");
    write_all(&mut out, "def");
    assert_eq!(out.contents(), "abcdef");
    assert_eq!(out.as_bytes(), b"abcdef");
}

#[rstest]
#[case("anything.txt", OpenMode::Write)]
#[case("", OpenMode::Append)]
#[case("../elsewhere/x.h", OpenMode::CreateNew)]
fn stdout_open_yields_a_writable_stdout_stream(#[case] name: &str, #[case] mode: OpenMode) {
    let out = StdOutput::new();
    let mut opened = out.open(name, mode).unwrap();
    assert_eq!(opened.kind(), "stdout");

    let stream = opened.stream().expect("stdout destination exposes a stream");
    stream.write_all(b"stdout destination check\n").unwrap();
    stream.flush().unwrap();

    // A second call reaches the same sink and stays usable.
    opened.stream().unwrap().flush().unwrap();
}

#[test]
fn unsupported_operations_name_the_variant() {
    let stream = StreamOutput::new(Vec::new());
    let strings = StringOutput::new();
    let mut dir = DirOutput::new(".");

    let messages = [
        stream.open("a", OpenMode::Write).unwrap_err().to_string(),
        strings.open("a", OpenMode::Write).unwrap_err().to_string(),
        match dir.stream() {
            Err(e) => e.to_string(),
            Ok(_) => panic!("directory output exposed a stream"),
        },
    ];
    assert_eq!(
        messages,
        [
            "stream output does not support open()",
            "string output does not support open()",
            "directory output does not support stream()",
        ]
    );
}
