//! Statement parsing.

use tinyc_lexer::{Token, TokenKind};
use tinyc_types::ast::{Node, NodeId};
use tinyc_types::Result;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse statements up to the `}` matching `open`, which the caller has
    /// already consumed.
    pub(crate) fn parse_block_body(&mut self, open: &Token<'_>) -> Result<NodeId> {
        let mut stmts = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => return Err(self.unclosed_brace(open)),
                _ => stmts.push(self.parse_statement()?),
            }
        }
        Ok(self.alloc(Node::Block(stmts)))
    }

    pub(crate) fn parse_statement(&mut self) -> Result<NodeId> {
        self.nested(Self::parse_statement_kind)
    }

    fn parse_statement_kind(&mut self) -> Result<NodeId> {
        match self.peek_kind() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(self.alloc(Node::Block(Vec::new())))
            }
            TokenKind::LBrace => {
                let open = self.advance();
                self.parse_block_body(&open)
            }
            TokenKind::RBrace => Err(self.stray_brace()),
            TokenKind::Int => {
                let decl = self.parse_declaration()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(decl)
            }
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::Return => {
                self.advance();
                let value = self.parse_expression()?.node;
                self.expect(TokenKind::Semicolon)?;
                Ok(self.alloc(Node::Return(value)))
            }
            _ => {
                let expr = self.parse_expression()?.node;
                self.expect(TokenKind::Semicolon)?;
                Ok(expr)
            }
        }
    }

    /// `( Expr )`
    fn parse_condition(&mut self) -> Result<NodeId> {
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?.node;
        self.expect(TokenKind::RParen)?;
        Ok(cond)
    }

    /// `if ( Expr ) Stmt [else Stmt]`
    fn parse_if(&mut self) -> Result<NodeId> {
        self.advance();
        let cond = self.parse_condition()?;
        let then = self.parse_statement()?;
        let otherwise = if self.eat(TokenKind::Else) {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(self.alloc(Node::If {
            cond,
            then,
            otherwise,
        }))
    }

    /// `for ( [Decl | Expr] ; [Expr] ; [Expr] ) Stmt`
    fn parse_for(&mut self) -> Result<NodeId> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let init = match self.peek_kind() {
            TokenKind::Semicolon => None,
            TokenKind::Int => Some(self.parse_declaration()?),
            _ => Some(self.parse_expression()?.node),
        };
        self.expect(TokenKind::Semicolon)?;
        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?.node)
        };
        self.expect(TokenKind::Semicolon)?;
        let step = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?.node)
        };
        self.expect(TokenKind::RParen)?;
        let body = self.parse_statement()?;
        Ok(self.alloc(Node::Loop {
            init,
            cond,
            step,
            body,
        }))
    }

    /// `while ( Expr ) Stmt`
    fn parse_while(&mut self) -> Result<NodeId> {
        self.advance();
        let cond = self.parse_condition()?;
        let body = self.parse_statement()?;
        Ok(self.alloc(Node::Loop {
            init: None,
            cond: Some(cond),
            step: None,
            body,
        }))
    }

    /// `do Stmt while ( Expr ) ;`
    fn parse_do_while(&mut self) -> Result<NodeId> {
        self.advance();
        let body = self.parse_statement()?;
        self.expect(TokenKind::While)?;
        let cond = self.parse_condition()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(self.alloc(Node::DoWhile { body, cond }))
    }
}
