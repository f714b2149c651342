//! printf-style rendering of diagnostic messages.
//!
//! Templates understand four directives:
//!
//! | directive | substitutes                                  |
//! |-----------|----------------------------------------------|
//! | `%l`      | the current line number (not an argument)   |
//! | `%i`      | the next argument, an identifier             |
//! | `%d`      | the next argument, a decimal number          |
//! | `%s`      | the next argument, a raw string              |
//!
//! Any other `%` sequence is copied through unchanged. The rendered
//! message is capped at [`MAX_MESSAGE_LEN`] bytes.

use std::fmt::Write;

/// Capacity of the diagnostic buffer, in bytes.
pub const MAX_MESSAGE_LEN: usize = 256;

/// One positional argument for [`format_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageArg<'a> {
    Ident(&'a str),
    Int(i64),
    Str(&'a str),
}

/// Render `template` with `line` and `args`.
///
/// Arguments are consumed left to right by `%i`, `%d` and `%s`. A
/// directive whose argument is missing is emitted verbatim.
pub fn format_message(template: &str, line: u32, args: &[MessageArg<'_>]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut args = args.iter();
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('l') => {
                let _ = write!(out, "{line}");
            }
            Some(d @ ('i' | 'd' | 's')) => match args.next() {
                Some(MessageArg::Ident(s)) | Some(MessageArg::Str(s)) => out.push_str(s),
                Some(MessageArg::Int(n)) => {
                    let _ = write!(out, "{n}");
                }
                None => {
                    out.push('%');
                    out.push(d);
                }
            },
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }

    truncate(&mut out, MAX_MESSAGE_LEN);
    out
}

fn truncate(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_directive() {
        assert_eq!(
            format_message("Expected ';' on line: %l", 12, &[]),
            "Expected ';' on line: 12"
        );
    }

    #[test]
    fn test_positional_arguments() {
        let msg = format_message(
            "Function %i requires %d arguments, but %d were given",
            3,
            &[MessageArg::Ident("add"), MessageArg::Int(2), MessageArg::Int(1)],
        );
        assert_eq!(msg, "Function add requires 2 arguments, but 1 were given");
    }

    #[test]
    fn test_string_argument() {
        let msg = format_message("Expected %s, found %s", 1, &[MessageArg::Str("')'"), MessageArg::Str("';'")]);
        assert_eq!(msg, "Expected ')', found ';'");
    }

    #[test]
    fn test_missing_argument_is_verbatim() {
        assert_eq!(format_message("got %d", 1, &[]), "got %d");
    }

    #[test]
    fn test_unknown_directive_and_trailing_percent() {
        assert_eq!(format_message("100%x done %", 1, &[]), "100%x done %");
    }

    #[test]
    fn test_truncated_to_capacity() {
        let long = "x".repeat(MAX_MESSAGE_LEN * 2);
        let msg = format_message("%s", 1, &[MessageArg::Str(&long)]);
        assert_eq!(msg.len(), MAX_MESSAGE_LEN);
    }
}
