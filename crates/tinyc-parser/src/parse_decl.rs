//! Function definitions and variable declarations.

use tinyc_lexer::TokenKind;
use tinyc_types::ast::{Node, NodeId};
use tinyc_types::{ErrorCode, MessageArg, Result, Span};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Program
    // ══════════════════════════════════════════════════════════════════════════

    /// `{ Function } Eof`
    pub(crate) fn parse_program(&mut self) -> Result<()> {
        loop {
            match self.peek_kind() {
                TokenKind::Eof => return Ok(()),
                TokenKind::RBrace => return Err(self.stray_brace()),
                _ => self.parse_function()?,
            }
        }
    }

    /// `int {*} name ( [Param {, Param}] ) Block`
    ///
    /// The function is registered before its body is parsed, so it can call
    /// itself. The return type's pointer stars are accepted and ignored: every
    /// function returns one `i32`.
    fn parse_function(&mut self) -> Result<()> {
        self.expect(TokenKind::Int)?;
        self.parse_stars();
        let (name, span) = self.expect_identifier("function")?;
        let id = self.functions.declare_function(name).ok_or_else(|| {
            self.error_at(
                ErrorCode::FUNCTION_REDECLARED,
                "There's already a function with the name %i",
                &[MessageArg::Ident(name)],
                span,
            )
        })?;
        self.begin_function(id);

        self.expect(TokenKind::LParen)?;
        if !self.check(TokenKind::RParen) {
            loop {
                self.parse_param()?;
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let open = self.expect(TokenKind::LBrace)?;
        let body = self.parse_block_body(&open)?;
        self.function_mut().body = Some(body);
        Ok(())
    }

    /// `int {*} name`
    fn parse_param(&mut self) -> Result<()> {
        self.expect(TokenKind::Int)?;
        let indirection = self.parse_stars();
        let (name, span) = self.expect_identifier("parameter")?;
        match self.function_mut().declare_param(name, indirection) {
            Some(_) => Ok(()),
            None => Err(self.error_at(
                ErrorCode::PARAMETER_REDECLARED,
                "There's already a parameter with the name %i",
                &[MessageArg::Ident(name)],
                span,
            )),
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Declarations
    // ══════════════════════════════════════════════════════════════════════════

    /// `int Declarator {, Declarator}` where `Declarator = {*} name [= Expr]`.
    ///
    /// A single declarator yields one `Decl`; several yield a `Block` of them.
    /// The terminating `;` is left to the caller.
    pub(crate) fn parse_declaration(&mut self) -> Result<NodeId> {
        self.expect(TokenKind::Int)?;
        let mut decls = Vec::new();
        loop {
            let indirection = self.parse_stars();
            let (name, span) = self.expect_identifier("variable")?;
            let address = self.declare_local(name, indirection, span)?;
            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_expression()?.node)
            } else {
                None
            };
            decls.push(self.alloc(Node::Decl { address, init }));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(match decls.as_slice() {
            [single] => *single,
            _ => self.alloc(Node::Block(decls)),
        })
    }

    fn declare_local(&mut self, name: &'src str, indirection: u32, span: Span) -> Result<i32> {
        if let Some(address) = self.function_mut().declare_variable(name, indirection) {
            return Ok(address);
        }
        let (code, template) = if self.function().param(name).is_some() {
            (
                ErrorCode::PARAMETER_REDECLARED,
                "There's already a parameter with the name %i",
            )
        } else {
            (
                ErrorCode::VARIABLE_REDECLARED,
                "There's already a variable with the name %i",
            )
        };
        Err(self.error_at(code, template, &[MessageArg::Ident(name)], span))
    }
}
