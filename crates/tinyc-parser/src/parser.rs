//! Core parser infrastructure: token cursor, symbol access, diagnostics.

use tinyc_lexer::{Lexer, Token, TokenKind};
use tinyc_types::ast::{Ast, NodeId, Node, Program};
use tinyc_types::symbols::{Function, FunctionId, FunctionTable};
use tinyc_types::{
    format_message, CompileErrors, ErrorCode, MessageArg, Result, SourceFile, Span, TinycError,
};

/// Deepest nesting the parser accepts. Statements, prefix operators,
/// parentheses, call arguments and binary operators each add a level.
pub const MAX_NESTING_DEPTH: u32 = 128;

/// The tinyc parser.
///
/// Pulls tokens from its own [`Lexer`], resolves symbols as it goes and
/// builds the AST in a per-compilation arena. Parsing stops at the first
/// error.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    /// Source file for error context.
    source_file: SourceFile,
    pub(crate) functions: FunctionTable<'src>,
    pub(crate) ast: Ast,
    /// The function whose header or body is being parsed.
    current: Option<FunctionId>,
    /// Current nesting level, bounded by [`MAX_NESTING_DEPTH`].
    pub(crate) depth: u32,
}

/// Result of parsing.
#[derive(Debug)]
pub struct ParseResult<'src> {
    pub program: Option<Program<'src>>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, file_name: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source_file: SourceFile::new(file_name, source),
            functions: FunctionTable::new(),
            ast: Ast::new(),
            current: None,
            depth: 0,
        }
    }

    /// Parse every function up to end of input.
    pub fn parse(mut self) -> ParseResult<'src> {
        match self.parse_program() {
            Ok(()) => ParseResult {
                program: Some(Program {
                    functions: self.functions,
                    ast: self.ast,
                }),
                errors: CompileErrors::empty(),
            },
            Err(error) => ParseResult {
                program: None,
                errors: error.into(),
            },
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token<'src> {
        self.lexer.current()
    }

    pub(crate) fn peek_kind(&self) -> TokenKind<'src> {
        self.lexer.current().kind
    }

    pub(crate) fn advance(&mut self) -> Token<'src> {
        self.lexer.advance()
    }

    pub(crate) fn check(&self, kind: TokenKind<'_>) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, consume it and return `true`.
    pub(crate) fn eat(&mut self, kind: TokenKind<'_>) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: TokenKind<'_>) -> Result<Token<'src>> {
        if self.check(expected) {
            return Ok(self.advance());
        }
        let expected = format!("'{expected}'");
        let found = self.found();
        Err(self.error_at_current(
            ErrorCode::UNEXPECTED_TOKEN,
            "Expected %s on line: %l, found %s",
            &[MessageArg::Str(&expected), MessageArg::Str(&found)],
        ))
    }

    /// Expect an identifier naming a `what` ("function", "variable", ...).
    pub(crate) fn expect_identifier(&mut self, what: &str) -> Result<(&'src str, Span)> {
        match self.peek_kind() {
            TokenKind::Identifier(name) => Ok((name, self.advance().span)),
            _ => {
                let found = self.found();
                Err(self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "Expected %s name on line: %l, found %s",
                    &[MessageArg::Str(what), MessageArg::Str(&found)],
                ))
            }
        }
    }

    /// Count a run of `*` tokens.
    pub(crate) fn parse_stars(&mut self) -> u32 {
        let mut count = 0;
        while self.eat(TokenKind::Star) {
            count += 1;
        }
        count
    }

    /// The current token, quoted for a diagnostic.
    pub(crate) fn found(&self) -> String {
        match self.peek_kind() {
            TokenKind::Eof => "end of input".to_string(),
            kind => format!("'{kind}'"),
        }
    }

    // ── Symbols & AST ─────────────────────────────────────────────────────────

    pub(crate) fn begin_function(&mut self, id: FunctionId) {
        self.current = Some(id);
    }

    /// The function being parsed.
    ///
    /// Statements and expressions are only parsed inside a function, after
    /// `begin_function`.
    pub(crate) fn function(&self) -> &Function<'src> {
        let id = self.current.unwrap_or(FunctionId(0));
        self.functions.get(id)
    }

    pub(crate) fn function_mut(&mut self) -> &mut Function<'src> {
        let id = self.current.unwrap_or(FunctionId(0));
        self.functions.get_mut(id)
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        self.ast.alloc(node)
    }

    // ── Nesting ───────────────────────────────────────────────────────────────

    /// Enter one more nesting level.
    pub(crate) fn descend(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_at_current(
                ErrorCode::STRUCTURAL_LIMIT_EXCEEDED,
                "Nesting too deep on line: %l, the limit is %d levels",
                &[MessageArg::Int(i64::from(MAX_NESTING_DEPTH))],
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `parse` one nesting level deeper.
    pub(crate) fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.descend()?;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Build a diagnostic at the current token. `%l` renders its line.
    pub(crate) fn error_at_current(
        &self,
        code: ErrorCode,
        template: &str,
        args: &[MessageArg<'_>],
    ) -> TinycError {
        self.error_at(code, template, args, self.peek().span)
    }

    /// Build a diagnostic at `span`. `%l` renders its start line.
    pub(crate) fn error_at(
        &self,
        code: ErrorCode,
        template: &str,
        args: &[MessageArg<'_>],
        span: Span,
    ) -> TinycError {
        let message = format_message(template, span.start_line, args);
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        TinycError::new(&self.source_file.name, code, message, span, source_line)
    }

    /// A `}` with nothing to close.
    pub(crate) fn stray_brace(&self) -> TinycError {
        self.error_at_current(
            ErrorCode::BRACKET_MISMATCH,
            "Bracket mismatch on line: %l, '}' has no matching '{'",
            &[],
        )
    }

    /// End of input while the block opened by `open` is still unclosed.
    pub(crate) fn unclosed_brace(&self, open: &Token<'_>) -> TinycError {
        self.error_at_current(
            ErrorCode::BRACKET_MISMATCH,
            "Bracket mismatch on line: %l, '{' opened on line %d is never closed",
            &[MessageArg::Int(i64::from(open.line()))],
        )
    }
}
