//! tinyc parser: token stream to a symbol-resolved, constant-folded AST.

mod fold;
mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser, MAX_NESTING_DEPTH};

/// Parse `source` in one call.
pub fn parse<'src>(source: &'src str, file_name: &str) -> ParseResult<'src> {
    Parser::new(source, file_name).parse()
}
