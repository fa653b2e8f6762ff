use crate::value::{Mapping, Value};
use std::fmt::{Arguments, Result, Write};

/// Wraps some underlying buffer by providing methods that write to it
/// in different formats.
pub struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes to the given buffer.
    pub fn new(buffer: &'buffer mut String) -> Self {
        Self { buffer }
    }

    /// Write the given Value to the Pipe buffer.
    ///
    /// The Pipe will handle formatting the value.
    ///
    /// # Errors
    ///
    /// The Pipe supports all Value types, so the only error that will
    /// be returned is propagated from the underlying buffer.
    pub fn write_value(&mut self, value: &Value) -> Result {
        match value {
            Value::Scalar(text) => self.write_str(text),
            Value::List(list) => self.write_list(list),
            Value::Mapping(mapping) => self.write_mapping(mapping),
            // A callable has no text form of its own.
            Value::Callable(_) => Ok(()),
        }
    }

    /// Write the value to the buffer as a comma separated list surrounded
    /// by brackets.
    fn write_list(&mut self, value: &[Value]) -> Result {
        write!(self.buffer, "[")?;
        for (index, item) in value.iter().enumerate() {
            if index > 0 {
                write!(self.buffer, ", ")?;
            }
            self.write_value(item)?;
        }
        write!(self.buffer, "]")
    }

    /// Write the value to the buffer as key/value pairs surrounded by
    /// curly braces.
    fn write_mapping(&mut self, value: &Mapping) -> Result {
        write!(self.buffer, "{{")?;
        for (index, (key, value)) in value.iter().enumerate() {
            if index > 0 {
                write!(self.buffer, ", ")?;
            }
            write!(self.buffer, "{}: ", key)?;
            self.write_value(value)?;
        }
        write!(self.buffer, "}}")
    }
}

impl Write for Pipe<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> Result {
        Write::write_str(self.buffer, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> Result {
        Write::write_char(self.buffer, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments<'_>) -> Result {
        Write::write_fmt(self.buffer, args)
    }
}
