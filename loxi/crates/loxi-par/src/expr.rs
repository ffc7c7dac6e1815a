//! Expression parsing using Pratt parsing (top-down operator precedence).
//!
//! Each infix operator has a left and right binding power; higher numbers
//! bind tighter. Left-associative operators use `(n, n + 1)`,
//! right-associative ones `(n, n)`. Assignment and the ternary conditional
//! are infix operators with special-cased right-hand sides.
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | comma | `,` | Left |
//! | assignment | `=` | Right |
//! | logic_or | `or` | Left |
//! | logic_and | `and` | Left |
//! | ternary | `? :` | Right |
//! | equality | `==`, `!=` | Left |
//! | comparison | `<`, `<=`, `>`, `>=` | Left |
//! | term | `+`, `-` | Left |
//! | factor | `*`, `/` | Left |

use loxi_lex::Token;

use crate::ast::*;
use crate::Parser;

/// Binding power levels for Pratt parsing.
/// Higher numbers = tighter binding (higher precedence).
pub(crate) mod bp {
    /// Minimum binding power (start of a full expression).
    pub const MIN: u8 = 0;

    /// Comma sequencing: `,`
    pub const COMMA: u8 = 2;

    /// Assignment: `=`
    pub const ASSIGN: u8 = 4;

    /// Logical OR: `or`
    pub const LOGICAL_OR: u8 = 6;

    /// Logical AND: `and`
    pub const LOGICAL_AND: u8 = 8;

    /// Ternary conditional: `? :`
    pub const TERNARY: u8 = 10;

    /// Equality: `==`, `!=`
    pub const EQUALITY: u8 = 12;

    /// Comparison: `<`, `<=`, `>`, `>=`
    pub const COMPARISON: u8 = 14;

    /// Additive: `+`, `-`
    pub const TERM: u8 = 16;

    /// Multiplicative: `*`, `/`
    pub const FACTOR: u8 = 18;
}

/// Binding powers for the token as an infix operator.
fn infix_binding_power(token: &Token) -> Option<(u8, u8)> {
    match token {
        Token::Comma => Some((bp::COMMA, bp::COMMA + 1)),
        Token::Eq => Some((bp::ASSIGN, bp::ASSIGN)),
        Token::Or => Some((bp::LOGICAL_OR, bp::LOGICAL_OR + 1)),
        Token::And => Some((bp::LOGICAL_AND, bp::LOGICAL_AND + 1)),
        Token::Question => Some((bp::TERNARY, bp::TERNARY)),
        Token::EqEq | Token::BangEq => Some((bp::EQUALITY, bp::EQUALITY + 1)),
        Token::Less | Token::LessEq | Token::Greater | Token::GreaterEq => {
            Some((bp::COMPARISON, bp::COMPARISON + 1))
        }
        Token::Plus | Token::Minus => Some((bp::TERM, bp::TERM + 1)),
        Token::Star | Token::Slash => Some((bp::FACTOR, bp::FACTOR + 1)),
        _ => None,
    }
}

/// The binary operator for an infix token.
fn token_to_binop(token: &Token) -> Option<BinOp> {
    match token {
        Token::Plus => Some(BinOp::Add),
        Token::Minus => Some(BinOp::Sub),
        Token::Star => Some(BinOp::Mul),
        Token::Slash => Some(BinOp::Div),
        Token::EqEq => Some(BinOp::Eq),
        Token::BangEq => Some(BinOp::Ne),
        Token::Less => Some(BinOp::Lt),
        Token::LessEq => Some(BinOp::Le),
        Token::Greater => Some(BinOp::Gt),
        Token::GreaterEq => Some(BinOp::Ge),
        Token::Comma => Some(BinOp::Comma),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    /// Parse a full expression (comma level and below).
    pub(crate) fn expression(&mut self) -> Option<Expr> {
        self.parse_expr_bp(bp::MIN)
    }

    /// Parse an expression with a minimum binding power (Pratt core).
    ///
    /// Only infix operators whose left binding power is at least `min_bp`
    /// are consumed; anything looser is left for the caller.
    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;

        loop {
            let token = self.peek();
            let Some((lbp, rbp)) = infix_binding_power(&token.token) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            self.advance();

            lhs = match token.token {
                Token::Eq => {
                    let value = self.parse_expr_bp(rbp)?;
                    match lhs {
                        Expr::Variable(var) => Expr::Assign(AssignExpr {
                            id: self.ids().next(),
                            name: var.name,
                            value: Box::new(value),
                        }),
                        Expr::Get(get) => Expr::Set(SetExpr {
                            object: get.object,
                            name: get.name,
                            value: Box::new(value),
                        }),
                        other => {
                            self.error_at(token, "Invalid assignment target.");
                            other
                        }
                    }
                }
                Token::Question => {
                    let then = self.parse_expr_bp(bp::EQUALITY)?;
                    if !self.match_token(Token::Colon) {
                        self.error_at_current(
                            "'?' only allowed as part of ternary operator, corresponding ':' not found",
                        );
                        return None;
                    }
                    let otherwise = self.parse_expr_bp(bp::TERNARY)?;
                    Expr::Ternary(TernaryExpr {
                        cond: Box::new(lhs),
                        then: Box::new(then),
                        otherwise: Box::new(otherwise),
                    })
                }
                Token::Or | Token::And => {
                    let op = if token.token == Token::Or {
                        LogicalOp::Or
                    } else {
                        LogicalOp::And
                    };
                    let right = self.parse_expr_bp(rbp)?;
                    Expr::Logical(LogicalExpr {
                        left: Box::new(lhs),
                        op,
                        right: Box::new(right),
                    })
                }
                ref infix => {
                    let op = token_to_binop(infix).expect("infix token has a binop");
                    let right = self.parse_expr_bp(rbp)?;
                    Expr::Binary(BinaryExpr {
                        left: Some(Box::new(lhs)),
                        op,
                        op_span: token.span,
                        right: Box::new(right),
                    })
                }
            };
        }

        Some(lhs)
    }

    /// Parse a unary expression or delegate to `call`.
    ///
    /// A binary operator in prefix position is a recovery case: the
    /// operand on its left is missing. The parser reports it, consumes the
    /// operator, parses the right operand at the operator's own precedence,
    /// and returns a placeholder `Binary` with an absent left so the
    /// resolver can still walk the right-hand side.
    fn parse_unary(&mut self) -> Option<Expr> {
        match self.current() {
            Token::Minus => {
                let token = self.advance();
                let operand = self.parse_unary()?;
                Some(Expr::Unary(UnaryExpr {
                    op: UnOp::Neg,
                    op_span: token.span,
                    operand: Box::new(operand),
                }))
            }
            Token::Bang => {
                let token = self.advance();
                let operand = self.parse_unary()?;
                Some(Expr::Unary(UnaryExpr {
                    op: UnOp::Not,
                    op_span: token.span,
                    operand: Box::new(operand),
                }))
            }
            Token::EqEq
            | Token::BangEq
            | Token::Less
            | Token::LessEq
            | Token::Greater
            | Token::GreaterEq
            | Token::Plus
            | Token::Star
            | Token::Slash => {
                let token = self.advance();
                self.error_at(token, "Binary operator needs left and right operand");
                let (lbp, _) = infix_binding_power(&token.token).expect("binary operator");
                let right = self.parse_expr_bp(lbp)?;
                Some(Expr::Binary(BinaryExpr {
                    left: None,
                    op: token_to_binop(&token.token).expect("binary operator"),
                    op_span: token.span,
                    right: Box::new(right),
                }))
            }
            _ => self.parse_call(),
        }
    }

    /// Parse a call chain: `primary ( "(" args? ")" | "." IDENT )*`.
    fn parse_call(&mut self) -> Option<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.match_token(Token::LParen) {
                expr = self.finish_call(expr)?;
            } else if self.match_token(Token::Dot) {
                let name = self.expect_ident("Expect property name after '.'.")?;
                expr = Expr::Get(GetExpr {
                    object: Box::new(expr),
                    name,
                });
            } else {
                break;
            }
        }

        Some(expr)
    }

    /// Parse a call's argument list after the opening parenthesis.
    ///
    /// Arguments parse at assignment level: the comma operator never
    /// appears inside an argument list. At most 255 arguments; more is a
    /// diagnostic but parsing continues.
    fn finish_call(&mut self, callee: Expr) -> Option<Expr> {
        let mut args = Vec::new();
        if !self.check(Token::RParen) {
            loop {
                if args.len() >= 255 {
                    self.error_at_current("Can't have more than 255 arguments.");
                }
                args.push(self.parse_expr_bp(bp::ASSIGN)?);
                if !self.match_token(Token::Comma) {
                    break;
                }
            }
        }
        let paren = self.expect(Token::RParen, "Expect ')' after arguments.")?;

        Some(Expr::Call(CallExpr {
            callee: Box::new(callee),
            paren_span: paren.span,
            args,
        }))
    }

    /// Parse a primary expression.
    fn primary(&mut self) -> Option<Expr> {
        match *self.current() {
            Token::False => {
                self.advance();
                Some(Expr::Literal(LitValue::Bool(false)))
            }
            Token::True => {
                self.advance();
                Some(Expr::Literal(LitValue::Bool(true)))
            }
            Token::Nil => {
                self.advance();
                Some(Expr::Literal(LitValue::Nil))
            }
            Token::Number(value) => {
                self.advance();
                Some(Expr::Literal(LitValue::Number(value)))
            }
            Token::Str(value) => {
                self.advance();
                Some(Expr::Literal(LitValue::Str(value)))
            }
            Token::Super => {
                let keyword = self.advance();
                self.expect(Token::Dot, "Expect '.' after 'super'.")?;
                let method = self.expect_ident("Expect superclass method name.")?;
                Some(Expr::Super(SuperExpr {
                    id: self.ids().next(),
                    span: keyword.span,
                    method,
                }))
            }
            Token::This => {
                let keyword = self.advance();
                Some(Expr::This(ThisExpr {
                    id: self.ids().next(),
                    span: keyword.span,
                }))
            }
            Token::Ident(name) => {
                let token = self.advance();
                Some(Expr::Variable(VariableExpr {
                    id: self.ids().next(),
                    name: Ident {
                        name,
                        span: token.span,
                    },
                }))
            }
            Token::Fun => {
                self.advance();
                let decl = self.finish_function(None, crate::items::FunctionKind::Lambda)?;
                Some(Expr::Lambda(decl))
            }
            Token::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(Token::RParen, "Expect ')' after expression.")?;
                Some(Expr::Grouping(Box::new(expr)))
            }
            _ => {
                self.error_at_current("Expect expression.");
                None
            }
        }
    }
}
