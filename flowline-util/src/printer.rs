//! Line-oriented text sink.

use std::fmt::{self, Display};
use std::future::Future;
use std::io::{self, Write};
use std::pin::Pin;

use flowline::component::{Component, ComponentError};
use flowline::context::Context;
use flowline::ports::Inbound;

/// A sink which writes each received value on its own line.
pub struct Printer<T> {
    /// Values to be printed.
    pub input: Inbound<T>,
    writer: Box<dyn Write + Send>,
}

impl<T: Display + Send + 'static> Printer<T> {
    /// Creates a printer writing to the standard output.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Creates a printer writing to the specified writer.
    ///
    /// The writer is flushed after each line.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            input: Inbound::new(),
            writer: Box::new(writer),
        }
    }

    async fn process(&mut self, cx: &Context) -> Result<(), ComponentError> {
        loop {
            let value = self.input.recv(cx).await?;
            writeln!(self.writer, "{}", value).map_err(ComponentError::failed)?;
            self.writer.flush().map_err(ComponentError::failed)?;
        }
    }
}

impl<T: Display + Send + 'static> Default for Printer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Display + Send + 'static> Component for Printer<T> {
    fn run<'a>(
        &'a mut self,
        cx: &'a Context,
    ) -> Pin<Box<dyn Future<Output = Result<(), ComponentError>> + Send + 'a>> {
        Box::pin(self.process(cx))
    }
}

impl<T> fmt::Debug for Printer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer")
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}
