//! Output destinations: where generators write.
//!
//! Every destination implements [`Destination`]:
//!
//! | Type             | `open(name, mode)`                     | `stream()`          |
//! |------------------|----------------------------------------|---------------------|
//! | [`StreamOutput`] | unsupported                            | the wrapped writer  |
//! | [`DirOutput`]    | opens `<dir>/<name>`, new StreamOutput | unsupported         |
//! | [`StdOutput`]    | returns an equivalent StdOutput        | process stdout      |
//! | [`StringOutput`] | unsupported                            | in-memory buffer    |
//!
//! A generator that emits one file per block calls `open` for each file;
//! one that emits a single document writes to `stream` directly. Handles
//! returned by [`DirOutput::open`] belong to the caller and close on drop;
//! use [`StreamOutput::finish`] to observe flush errors.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{io_err, SupportError};

/// How [`DirOutput::open`] treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Create the file, truncating it if it exists.
    #[default]
    Write,
    /// Create the file, appending if it exists.
    Append,
    /// Create the file; fail if it already exists.
    CreateNew,
}

impl OpenMode {
    fn options(self) -> OpenOptions {
        let mut opts = OpenOptions::new();
        match self {
            OpenMode::Write => opts.write(true).create(true).truncate(true),
            OpenMode::Append => opts.append(true).create(true),
            OpenMode::CreateNew => opts.write(true).create_new(true),
        };
        opts
    }
}

/// A place generated text can be written.
pub trait Destination: fmt::Debug {
    /// Open the named sub-output.
    fn open(&self, name: &str, mode: OpenMode) -> Result<Box<dyn Destination>, SupportError>;

    /// The writable sink. Repeated calls reach the same underlying sink.
    fn stream(&mut self) -> Result<&mut dyn Write, SupportError>;

    /// Short variant name for errors and logs.
    fn kind(&self) -> &'static str;
}

fn unsupported(operation: &'static str, destination: &'static str) -> SupportError {
    SupportError::Unsupported {
        operation,
        destination,
    }
}

// ---------------------------------------------------------------------------
// StreamOutput
// ---------------------------------------------------------------------------

/// Wraps an already-open writer.
pub struct StreamOutput {
    stream: Box<dyn Write>,
}

impl StreamOutput {
    pub fn new(stream: impl Write + 'static) -> Self {
        Self {
            stream: Box::new(stream),
        }
    }

    /// Flush and close the wrapped writer.
    pub fn finish(mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Destination for StreamOutput {
    fn open(&self, _name: &str, _mode: OpenMode) -> Result<Box<dyn Destination>, SupportError> {
        Err(unsupported("open", self.kind()))
    }

    fn stream(&mut self) -> Result<&mut dyn Write, SupportError> {
        Ok(self.stream.as_mut())
    }

    fn kind(&self) -> &'static str {
        "stream"
    }
}

impl fmt::Debug for StreamOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamOutput").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// DirOutput
// ---------------------------------------------------------------------------

/// A directory; each `open` creates a file inside it.
///
/// Parent directories are not created.
#[derive(Debug, Clone)]
pub struct DirOutput {
    dir: PathBuf,
}

impl DirOutput {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Like [`Destination::open`], but returns the concrete [`StreamOutput`].
    pub fn open_file(&self, filename: &str, mode: OpenMode) -> Result<StreamOutput, SupportError> {
        let path = self.dir.join(filename);
        let file: File = mode.options().open(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!(path = %path.display(), ?mode, "opened output file");
        Ok(StreamOutput::new(BufWriter::new(file)))
    }
}

impl Destination for DirOutput {
    fn open(&self, name: &str, mode: OpenMode) -> Result<Box<dyn Destination>, SupportError> {
        Ok(Box::new(self.open_file(name, mode)?))
    }

    fn stream(&mut self) -> Result<&mut dyn Write, SupportError> {
        Err(unsupported("stream", self.kind()))
    }

    fn kind(&self) -> &'static str {
        "directory"
    }
}

// ---------------------------------------------------------------------------
// StdOutput
// ---------------------------------------------------------------------------

/// Process standard output. Every named output collapses onto it.
#[derive(Debug)]
pub struct StdOutput {
    stdout: io::Stdout,
}

impl StdOutput {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Destination for StdOutput {
    fn open(&self, name: &str, _mode: OpenMode) -> Result<Box<dyn Destination>, SupportError> {
        tracing::debug!(name, "stdout output ignores file name");
        Ok(Box::new(StdOutput::new()))
    }

    fn stream(&mut self) -> Result<&mut dyn Write, SupportError> {
        Ok(&mut self.stdout)
    }

    fn kind(&self) -> &'static str {
        "stdout"
    }
}

// ---------------------------------------------------------------------------
// StringOutput
// ---------------------------------------------------------------------------

/// An in-memory buffer, for capturing output in tests.
#[derive(Debug, Default)]
pub struct StringOutput {
    buffer: Vec<u8>,
}

impl StringOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far. Invalid UTF-8 is replaced with U+FFFD.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl Destination for StringOutput {
    fn open(&self, _name: &str, _mode: OpenMode) -> Result<Box<dyn Destination>, SupportError> {
        Err(unsupported("open", self.kind()))
    }

    fn stream(&mut self) -> Result<&mut dyn Write, SupportError> {
        Ok(&mut self.buffer)
    }

    fn kind(&self) -> &'static str {
        "string"
    }
}
