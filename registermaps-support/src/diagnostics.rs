//! Verbose diagnostic messages for the person running the generator.
//!
//! This channel is separate from `tracing`: it prints human-readable
//! progress lines only when the user asked for verbose output, and it
//! never fails the caller.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::io::{self, Write};

/// The verbose flag plus the sink verbose messages go to.
pub struct Diagnostics<W: Write = io::Stderr> {
    verbose: Cell<bool>,
    sink: RefCell<W>,
}

impl Diagnostics<io::Stderr> {
    /// Diagnostics on standard error, verbose off.
    pub fn stderr() -> Self {
        Self::with_sink(io::stderr())
    }
}

impl Default for Diagnostics<io::Stderr> {
    fn default() -> Self {
        Self::stderr()
    }
}

impl<W: Write> Diagnostics<W> {
    pub fn with_sink(sink: W) -> Self {
        Self {
            verbose: Cell::new(false),
            sink: RefCell::new(sink),
        }
    }

    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.set(verbose);
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.get()
    }

    /// Write `args` and a newline to the sink when verbose is on.
    ///
    /// Sink errors are logged and otherwise ignored.
    pub fn printverbose(&self, args: fmt::Arguments<'_>) {
        if !self.verbose.get() {
            return;
        }
        let mut sink = self.sink.borrow_mut();
        if let Err(e) = writeln!(sink, "{args}").and_then(|()| sink.flush()) {
            tracing::warn!(error = %e, "failed to write verbose message");
        }
    }

    pub fn sink(&self) -> Ref<'_, W> {
        self.sink.borrow()
    }

    pub fn into_sink(self) -> W {
        self.sink.into_inner()
    }
}

impl<W: Write> fmt::Debug for Diagnostics<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("verbose", &self.verbose.get())
            .finish_non_exhaustive()
    }
}

/// `printverbose!(diag, "compiled {} templates", n)`
///
/// Formats only when `diag` is verbose.
#[macro_export]
macro_rules! printverbose {
    ($diag:expr, $($arg:tt)*) => {{
        let diag = &$diag;
        if diag.is_verbose() {
            diag.printverbose(::std::format_args!($($arg)*));
        }
    }};
}
