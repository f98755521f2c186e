use crate::ast::{constant, BinaryOp, Expr, Func, Var};
use crate::error::ExprError;
use crate::lexer::{lex, Span, Token, TokenKind};

/// Deepest expression tree the parser builds. Evaluation and drop both
/// recurse once per level.
pub const MAX_DEPTH: usize = 100;

/// Parse one expression, resolving variables, constants and function names.
///
/// Unknown identifiers and calls with the wrong number of arguments are
/// rejected here, so a parsed [`Expr`] always evaluates.
pub fn parse_expr(src: &str) -> Result<Expr, ExprError> {
    let tokens = lex(src)?;
    if tokens.len() == 1 {
        return Err(ExprError::new(0, "empty expression"));
    }
    let mut p = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = p.parse_sum()?;
    p.expect(TokenKind::Eof)?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        // Eof is never consumed past.
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ExprError> {
        if self.peek().kind == kind {
            self.bump();
            Ok(())
        } else {
            Err(ExprError::new(
                self.span().start,
                format!("expected {kind:?}, found {:?}", self.peek().kind),
            ))
        }
    }

    /// Run `f` one level deeper, failing once the tree would exceed
    /// [`MAX_DEPTH`].
    fn nested<T>(
        &mut self,
        offset: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        self.descend(offset)?;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn descend(&mut self, offset: usize) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::new(offset, "expression nested too deeply"));
        }
        Ok(())
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    // Each operator in a chain adds a level to the left-leaning tree.
    fn parse_sum(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut e = self.parse_product()?;
        loop {
            let offset = self.span().start;
            let op = if self.consume(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.consume(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            self.descend(offset)?;
            let r = self.parse_product()?;
            e = binary(op, e, r);
        }
        self.depth = depth;
        Ok(e)
    }

    fn parse_product(&mut self) -> Result<Expr, ExprError> {
        let depth = self.depth;
        let mut e = self.parse_unary()?;
        loop {
            let offset = self.span().start;
            let op = if self.consume(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.consume(TokenKind::Slash) {
                BinaryOp::Div
            } else {
                break;
            };
            self.descend(offset)?;
            let r = self.parse_unary()?;
            e = binary(op, e, r);
        }
        self.depth = depth;
        Ok(e)
    }

    // Unary minus binds looser than `^`: `-2^2` is `-(2^2)`.
    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        let offset = self.span().start;
        if self.consume(TokenKind::Minus) {
            let e = self.nested(offset, Self::parse_unary)?;
            return Ok(Expr::Neg(Box::new(e)));
        }
        if self.consume(TokenKind::Plus) {
            return self.nested(offset, Self::parse_unary);
        }
        self.parse_power()
    }

    // Right associative, and the exponent may carry its own sign.
    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_primary()?;
        let offset = self.span().start;
        if self.consume(TokenKind::Caret) {
            let exponent = self.nested(offset, Self::parse_unary)?;
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ExprError> {
        let mut args = Vec::new();
        if self.consume(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_sum()?);
            if self.consume(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            return Ok(args);
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let t = self.bump();
        match t.kind {
            TokenKind::Number(v) => Ok(Expr::Num(v)),
            TokenKind::Ident(name) => {
                if self.consume(TokenKind::LParen) {
                    return self.finish_call(&name, t.span);
                }
                if let Some(var) = Var::from_name(&name) {
                    return Ok(Expr::Var(var));
                }
                if let Some(value) = constant(&name) {
                    return Ok(Expr::Num(value));
                }
                Err(ExprError::new(
                    t.span.start,
                    format!("unknown identifier '{name}'"),
                ))
            }
            TokenKind::LParen => self.nested(t.span.start, |p| {
                let e = p.parse_sum()?;
                p.expect(TokenKind::RParen)?;
                Ok(e)
            }),
            other => Err(ExprError::new(
                t.span.start,
                format!("unexpected token {other:?}"),
            )),
        }
    }

    fn finish_call(&mut self, name: &str, span: Span) -> Result<Expr, ExprError> {
        let func = Func::from_name(name)
            .ok_or_else(|| ExprError::new(span.start, format!("unknown function '{name}'")))?;
        let args = self.nested(span.start, Self::parse_args)?;
        let (min, max) = func.arity();
        if args.len() < min || args.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min} to {max}")
            };
            return Err(ExprError::new(
                span.start,
                format!(
                    "function '{name}' takes {expected} argument(s), got {}",
                    args.len()
                ),
            ));
        }
        Ok(Expr::Call { func, args })
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
