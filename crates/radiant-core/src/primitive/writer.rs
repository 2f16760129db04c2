//! Scene-language text output

use super::Primitive;
use crate::Result;
use std::fmt::{self, Write as _};
use std::path::Path;

/// Format a primitive in the scene language
///
/// Pure: the same primitive always yields the same bytes. Arguments are
/// written in the order they are stored; reals use the shortest
/// representation that round-trips.
pub fn format(primitive: &Primitive) -> String {
    primitive.to_string()
}

pub(super) fn write_primitive(out: &mut impl fmt::Write, p: &Primitive) -> fmt::Result {
    writeln!(out, "{} {} {}", p.modifier, p.kind, p.id)?;
    write_args(out, &p.string_args)?;
    write_args(out, &p.int_args)?;
    write_args(out, &p.float_args)
}

fn write_args<T: fmt::Display>(out: &mut impl fmt::Write, args: &[T]) -> fmt::Result {
    write!(out, "{}", args.len())?;
    for arg in args {
        write!(out, " {}", arg)?;
    }
    writeln!(out)
}

/// A scene-language document under construction
///
/// Records are separated by a blank line. A comment sticks to the record
/// that follows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneText {
    buf: String,
    after_comment: bool,
}

impl SceneText {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin_record(&mut self) {
        if !self.buf.is_empty() && !self.after_comment {
            self.buf.push('\n');
        }
        self.after_comment = false;
    }

    /// Append one primitive
    pub fn push_primitive(&mut self, primitive: &Primitive) -> &mut Self {
        self.begin_record();
        // Writing into a String cannot fail
        let _ = write_primitive(&mut self.buf, primitive);
        self
    }

    /// Append primitives in order
    pub fn push_primitives<'a>(
        &mut self,
        primitives: impl IntoIterator<Item = &'a Primitive>,
    ) -> &mut Self {
        for p in primitives {
            self.push_primitive(p);
        }
        self
    }

    /// Append an inline command (`!command args`), expanded by the loader
    pub fn push_command(&mut self, command: &str) -> &mut Self {
        self.begin_record();
        self.buf.push('!');
        self.buf.push_str(command);
        self.buf.push('\n');
        self
    }

    /// Append a `#` comment attached to the next record
    pub fn push_comment(&mut self, comment: &str) -> &mut Self {
        self.begin_record();
        for line in comment.lines() {
            let _ = writeln!(self.buf, "# {}", line);
        }
        self.after_comment = true;
        self
    }

    /// Append another document
    pub fn append(&mut self, other: &SceneText) -> &mut Self {
        if other.is_empty() {
            return self;
        }
        self.begin_record();
        self.buf.push_str(&other.buf);
        self.after_comment = other.after_comment;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    /// Write the document to a file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.buf)?;
        Ok(())
    }
}

impl fmt::Display for SceneText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}
