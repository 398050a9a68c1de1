//! Output buffer for generated source text.
//!
//! An append-only string with indentation tracking and position-addressed
//! insertion. Lowering passes write left-to-right, but helper declarations
//! discovered deep inside an expression must land *before* the statement
//! that uses them; [`OutputBuf::current_pos`] and [`OutputBuf::insert_at`]
//! make that possible.
//!
//! # Insertion ordering
//!
//! `insert_at` shifts every byte at or after the offset. Positions recorded
//! by other pending splices stay valid only when splices happen in
//! decreasing-offset order (innermost construct first). The deferred
//! placement stack in `lucid_lower` pops innermost-first, which preserves
//! the discipline.

use std::fmt::Write as _;

/// Number of spaces per scope level.
const SCOPE_INDENT: usize = 2;

/// Append-only text buffer with indentation bookkeeping.
#[derive(Default, Clone)]
pub struct OutputBuf {
    output: String,
    indent: usize,
}

impl OutputBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer starting at the indentation level of `other`, used for side
    /// buffers whose text is later spliced into `other`.
    pub fn with_indent_of(other: &OutputBuf) -> Self {
        OutputBuf {
            output: String::new(),
            indent: other.indent,
        }
    }

    /// Current length of the buffer; also the offset the next append lands
    /// at. Recorded by deferred-placement frames.
    #[inline]
    pub fn current_pos(&self) -> usize {
        self.output.len()
    }

    /// Current indentation level in scope steps.
    #[inline]
    pub fn indent_level(&self) -> usize {
        self.indent
    }

    /// Whether the buffer holds anything but whitespace.
    pub fn is_empty(&self) -> bool {
        self.output.chars().all(|c| c == ' ' || c == '\n')
    }

    /// Append text.
    pub fn append(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Append a single character.
    pub fn append_char(&mut self, c: char) {
        self.output.push(c);
    }

    /// Append text followed by a newline.
    pub fn append_line(&mut self, text: &str) {
        self.output.push_str(text);
        self.newline();
    }

    /// Append a `;` and a newline.
    pub fn append_semi_line(&mut self) {
        self.append_line(";");
    }

    /// Append a `/* ... */` comment.
    pub fn append_comment(&mut self, text: &str) {
        // write! to a String cannot fail.
        let _ = write!(self.output, "/* {text} */");
    }

    /// Append a `/* ... */` comment followed by a newline.
    pub fn append_comment_line(&mut self, text: &str) {
        self.append_comment(text);
        self.newline();
    }

    /// Newline plus indentation for the current level.
    pub fn newline(&mut self) {
        self.output.push('\n');
        for _ in 0..self.indent * SCOPE_INDENT {
            self.output.push(' ');
        }
    }

    /// Splice text at a previously recorded offset, shifting everything at
    /// or after it.
    pub fn insert_at(&mut self, pos: usize, text: &str) {
        if pos <= self.output.len() {
            self.output.insert_str(pos, text);
        } else {
            // A stale position past the end degrades to an append.
            self.output.push_str(text);
        }
    }

    /// Open a brace scope: `{`, one more indent level, newline.
    pub fn open_scope(&mut self) {
        self.append_char('{');
        self.indent += 1;
        self.newline();
    }

    /// Close a brace scope.
    ///
    /// With `newline_before`, a fresh line is started first. The indentation
    /// the preceding newline introduced is one level too deep for the
    /// closing brace; only that whitespace is trimmed, never content.
    pub fn close_scope(&mut self, newline_before: bool) {
        if newline_before {
            self.newline();
        }
        self.remove_indent();
        self.append_char('}');
        self.indent = self.indent.saturating_sub(1);
    }

    /// Close a brace scope and append `;`.
    pub fn close_scope_with_semi(&mut self) {
        self.close_scope(true);
        self.append_char(';');
    }

    /// Trim at most one indent step of trailing spaces.
    fn remove_indent(&mut self) {
        if self.indent == 0 {
            return;
        }
        for _ in 0..SCOPE_INDENT {
            if self.output.ends_with(' ') {
                self.output.pop();
            } else {
                break;
            }
        }
    }

    /// View of the accumulated text.
    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Consume the buffer, returning the accumulated text.
    pub fn into_string(self) -> String {
        self.output
    }

    /// Take the accumulated text, leaving the buffer empty at the same
    /// indentation level.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl std::fmt::Display for OutputBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scopes_indent_and_dedent() {
        let mut buf = OutputBuf::new();
        buf.append("void f()");
        buf.newline();
        buf.open_scope();
        buf.append_line("int x = 1;");
        buf.close_scope(false);
        assert_eq!(buf.as_str(), "void f()\n{\n  int x = 1;\n}");
    }

    #[test]
    fn nested_scopes() {
        let mut buf = OutputBuf::new();
        buf.open_scope();
        buf.open_scope();
        buf.append("inner");
        buf.close_scope(true);
        buf.close_scope(true);
        assert_eq!(buf.as_str(), "{\n  {\n    inner\n  }\n}");
    }

    #[test]
    fn close_scope_trims_only_whitespace() {
        let mut buf = OutputBuf::new();
        buf.open_scope();
        buf.append("x");
        // No newline before the close: nothing to trim, content untouched.
        buf.close_scope(false);
        assert_eq!(buf.as_str(), "{\n  x}");
    }

    #[test]
    fn insert_at_shifts_following_text() {
        let mut buf = OutputBuf::new();
        buf.append("AB");
        let pos = buf.current_pos();
        buf.append("CD");
        buf.insert_at(pos, "--");
        assert_eq!(buf.as_str(), "AB--CD");
    }

    #[test]
    fn decreasing_order_splices_land_logically() {
        // Two recorded positions; splicing the later one first keeps the
        // earlier recorded offset valid.
        let mut buf = OutputBuf::new();
        buf.append("one ");
        let outer = buf.current_pos();
        buf.append("two ");
        let inner = buf.current_pos();
        buf.append("three");

        buf.insert_at(inner, "[inner] ");
        buf.insert_at(outer, "[outer] ");
        assert_eq!(buf.as_str(), "one [outer] two [inner] three");
    }

    #[test]
    fn stale_position_degrades_to_append() {
        let mut buf = OutputBuf::new();
        buf.append("ab");
        buf.insert_at(10, "c");
        assert_eq!(buf.as_str(), "abc");
    }

    #[test]
    fn comment_helpers() {
        let mut buf = OutputBuf::new();
        buf.append_comment("note");
        assert_eq!(buf.as_str(), "/* note */");
    }

    #[test]
    fn side_buffer_inherits_indent() {
        let mut buf = OutputBuf::new();
        buf.open_scope();
        let mut side = OutputBuf::with_indent_of(&buf);
        side.append_line("hoisted;");
        assert_eq!(side.as_str(), "hoisted;\n  ");
    }
}

#[cfg(test)]
mod ordering_props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Splicing any set of recorded positions in decreasing order puts
        /// every fragment at its originally recorded logical location.
        #[test]
        fn decreasing_splices_preserve_positions(chunks in proptest::collection::vec("[a-z]{1,8}", 1..8)) {
            let mut buf = OutputBuf::new();
            let mut marks = Vec::new();
            for chunk in &chunks {
                marks.push((buf.current_pos(), chunk.clone()));
                buf.append(chunk);
                buf.append(" ");
            }

            let plain = buf.as_str().to_owned();
            for (pos, chunk) in marks.iter().rev() {
                buf.insert_at(*pos, &format!("<{chunk}>"));
            }

            // Removing the spliced markers must give back the original text,
            // and each marker must sit directly before its chunk.
            let mut rebuilt = buf.as_str().to_owned();
            for (_, chunk) in &marks {
                let marker = format!("<{chunk}>{chunk}");
                prop_assert!(rebuilt.contains(&marker));
                rebuilt = rebuilt.replacen(&format!("<{chunk}>"), "", 1);
            }
            prop_assert_eq!(rebuilt, plain);
        }
    }
}
