//! Expression parsing
//!
//! Precedence climbs from loosest to tightest:
//!
//!     assignment   a = b, a += b
//!     conditional  c ? a : b
//!     logical      && || !
//!     comparison   == != < <= > >=
//!     additive     + -
//!     multiplicative  * / %
//!     accessors    call, .member, [index], postfix ++ --
//!     primary
//!
//! All binary levels are left-associative. A conditional takes everything after
//! its `:` as the false branch.

use super::{finished, split_commas, Parser};
use crate::ast::{BinaryOperator, Node, NodeId};
use crate::error::ParseError;
use crate::token::{Token, TokenKind, TokenStream};

const LOGICAL: &[TokenKind] = &[TokenKind::OpAnd, TokenKind::OpOr, TokenKind::OpNot];
const COMPARISON: &[TokenKind] = &[
    TokenKind::OpEqual,
    TokenKind::OpNotEqual,
    TokenKind::OpLess,
    TokenKind::OpLessEqual,
    TokenKind::OpGreater,
    TokenKind::OpGreaterEqual,
];
const ADDITIVE: &[TokenKind] = &[TokenKind::OpAdd, TokenKind::OpSubtract];
const MULTIPLICATIVE: &[TokenKind] = &[TokenKind::OpMultiply, TokenKind::OpDivide, TokenKind::OpMod];

impl<'a> Parser<'a> {
    /// Parse `tokens` as one expression with nothing left over.
    pub(super) fn full_expression(&mut self, mut tokens: TokenStream) -> Result<NodeId, ParseError> {
        let expression = self.expression(&mut tokens)?;
        finished(&tokens)?;
        Ok(expression)
    }

    fn expression(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        self.assignment(input)
    }

    fn assignment(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        let mut left = self.conditional(input)?;

        while let Some(kind) = input.front().map(|t| t.kind) {
            let compound = match kind {
                TokenKind::Assign => None,
                TokenKind::OpAddAssign => Some(BinaryOperator::Add),
                TokenKind::OpSubtractAssign => Some(BinaryOperator::Subtract),
                TokenKind::OpMultiplyAssign => Some(BinaryOperator::Multiply),
                TokenKind::OpDivideAssign => Some(BinaryOperator::Divide),
                _ => break,
            };
            input.pop_front();

            let right = self.conditional(input)?;
            let value = match compound {
                // a op= b is stored as a = a op b, with its own copy of a
                Some(op) => {
                    let current = self.ast.duplicate(left);
                    self.ast.alloc(Node::BinaryOp {
                        op,
                        left: current,
                        right,
                    })
                }
                None => right,
            };
            left = self.ast.alloc(Node::Assign {
                target: left,
                value,
            });
        }

        Ok(left)
    }

    fn conditional(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        let condition = self.binary(input, 0)?;
        if !input.front_is(TokenKind::Conditional) {
            return Ok(condition);
        }
        input.pop_front();

        let if_true = input.slice_until(TokenKind::Colon);
        input.take_front(TokenKind::Colon)?;
        let if_true = self.full_expression(if_true)?;
        let if_false = self.expression(input)?;

        Ok(self.ast.alloc(Node::Conditional {
            condition,
            if_true,
            if_false,
        }))
    }

    /// Binary levels, `level` indexing from loosest (logical) to tightest.
    fn binary(&mut self, input: &mut TokenStream, level: usize) -> Result<NodeId, ParseError> {
        const LEVELS: [&[TokenKind]; 4] = [LOGICAL, COMPARISON, ADDITIVE, MULTIPLICATIVE];

        let Some(operators) = LEVELS.get(level) else {
            return self.accessors(input, None);
        };

        let mut left = self.binary(input, level + 1)?;
        while let Some(op) = input
            .front()
            .filter(|token| operators.contains(&token.kind))
            .and_then(|token| BinaryOperator::from_token(token.kind))
        {
            input.pop_front();
            let right = self.binary(input, level + 1)?;
            left = self.ast.alloc(Node::BinaryOp { op, left, right });
        }
        Ok(left)
    }

    /// Postfix chain on `initial`, or on a freshly parsed primary.
    fn accessors(
        &mut self,
        input: &mut TokenStream,
        initial: Option<NodeId>,
    ) -> Result<NodeId, ParseError> {
        let mut left = match initial {
            Some(id) => id,
            None => self.primary(input)?,
        };

        while let Some(kind) = input.front().map(|t| t.kind) {
            left = match kind {
                TokenKind::OpenParen => {
                    if !matches!(self.ast[left], Node::Identifier(_) | Node::Access { .. }) {
                        break;
                    }
                    input.pop_front();
                    let tokens = input.slice_scoped(&[TokenKind::CloseParen], 1, false);
                    input.take_front(TokenKind::CloseParen)?;
                    let arguments = self.expression_list(tokens)?;
                    self.ast.alloc(Node::Call {
                        callee: left,
                        arguments,
                    })
                }
                TokenKind::Access => {
                    input.pop_front();
                    let right = self.primary(input)?;
                    self.ast.alloc(Node::Access { left, right })
                }
                TokenKind::OpenBracket => {
                    input.pop_front();
                    let tokens = input.slice_scoped(&[TokenKind::CloseBracket], 1, false);
                    input.take_front(TokenKind::CloseBracket)?;
                    let index = self.full_expression(tokens)?;
                    self.ast.alloc(Node::Index {
                        target: left,
                        index,
                    })
                }
                TokenKind::OpIncrement => {
                    input.pop_front();
                    self.ast.alloc(Node::Increment {
                        target: left,
                        prefix: false,
                    })
                }
                TokenKind::OpDecrement => {
                    input.pop_front();
                    self.ast.alloc(Node::Decrement {
                        target: left,
                        prefix: false,
                    })
                }
                _ => break,
            };
        }

        Ok(left)
    }

    fn primary(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        let front = input.next_token()?;

        match front.kind {
            TokenKind::Const => {
                let declaration = self.declaration(input)?;
                Ok(self.ast.alloc(Node::Const(declaration)))
            }
            TokenKind::Numeric => Ok(self.literal(&front)),
            TokenKind::Unknown => {
                if input.front_is(TokenKind::Unknown) {
                    input.push_front(front);
                    self.declaration(input)
                } else {
                    Ok(self.literal(&front))
                }
            }
            kind if super::is_return_type(kind) => {
                if input.front_is_any(&[TokenKind::Unknown, TokenKind::OpenBracket]) {
                    input.push_front(front);
                    self.declaration(input)
                } else {
                    // constructor calls such as float4(...) complete here so a
                    // leading `-` negates the whole call
                    let constructor = self.ast.alloc(Node::Identifier(front.text));
                    self.accessors(input, Some(constructor))
                }
            }
            // `--x` is read as an increment as well.
            TokenKind::OpIncrement | TokenKind::OpDecrement => {
                let target = self.accessors(input, None)?;
                Ok(self.ast.alloc(Node::Increment {
                    target,
                    prefix: true,
                }))
            }
            TokenKind::OpenParen => {
                let mut tokens = input.slice_scoped(&[TokenKind::CloseParen], 1, false);
                input.take_front(TokenKind::CloseParen)?;
                let inner = self.expression(&mut tokens)?;
                finished(&tokens)?;
                Ok(self.ast.alloc(Node::Precedence(inner)))
            }
            TokenKind::OpenBrace => {
                let tokens = input.slice_scoped(&[TokenKind::CloseBrace], 1, false);
                input.take_front(TokenKind::CloseBrace)?;
                let items = self.expression_list(tokens)?;
                Ok(self.ast.alloc(Node::ArrayLiteral(items)))
            }
            // binds to the next primary only: `-a.b` is `(-a).b`
            TokenKind::OpSubtract => {
                let operand = self.primary(input)?;
                Ok(self.ast.alloc(Node::Negate(operand)))
            }
            TokenKind::PushConstant => Ok(self.ast.alloc(Node::Identifier(front.text))),
            TokenKind::Discard => Ok(self.ast.alloc(Node::Discard)),
            _ => Err(ParseError::unknown_primary(&front)),
        }
    }

    fn expression_list(&mut self, tokens: TokenStream) -> Result<Vec<NodeId>, ParseError> {
        split_commas(tokens)?
            .into_iter()
            .map(|item| self.full_expression(item))
            .collect()
    }

    /// Literal for numeric-looking text, identifier otherwise.
    fn literal(&mut self, token: &Token) -> NodeId {
        self.ast.alloc(resolve_literal(&token.text))
    }
}

pub(crate) fn resolve_literal(text: &str) -> Node {
    match text {
        "true" => return Node::BoolLiteral(true),
        "false" => return Node::BoolLiteral(false),
        _ => {}
    }

    if looks_numeric(text) {
        if !text.contains('.') {
            if let Ok(value) = text.parse::<i32>() {
                return Node::IntLiteral(value);
            }
        }
        if let Ok(value) = text.parse::<f32>() {
            return Node::FloatLiteral(value);
        }
    }

    Node::Identifier(text.to_string())
}

/// Digit first, or `-`/`.` followed by a digit. Keeps `inf` and `nan` as names.
fn looks_numeric(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-') | Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit() || c == '.'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast;
    use crate::lexer::lex;
    use crate::profile::LanguageProfile;

    fn expr(source: &str) -> (Ast, NodeId) {
        let mut ast = Ast::new();
        let id = Parser::new(&mut ast, LanguageProfile::default())
            .parse_expression(lex("e", source))
            .expect("expression parses");
        (ast, id)
    }

    #[test]
    fn test_resolve_literal() {
        assert_eq!(resolve_literal("true"), Node::BoolLiteral(true));
        assert_eq!(resolve_literal("12"), Node::IntLiteral(12));
        assert_eq!(resolve_literal("-3"), Node::IntLiteral(-3));
        assert_eq!(resolve_literal("1.5"), Node::FloatLiteral(1.5));
        assert_eq!(resolve_literal(".5"), Node::FloatLiteral(0.5));
        assert_eq!(resolve_literal("3000000000"), Node::FloatLiteral(3.0e9));
        assert_eq!(resolve_literal("inf"), Node::Identifier("inf".into()));
        assert_eq!(resolve_literal("gl_Position"), Node::Identifier("gl_Position".into()));
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        let (ast, id) = expr("a + b * c");
        let Node::BinaryOp { op, right, .. } = &ast[id] else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinaryOperator::Add);
        assert!(matches!(ast[*right], Node::BinaryOp { op: BinaryOperator::Multiply, .. }));
    }

    #[test]
    fn test_left_associative() {
        let (ast, id) = expr("a - b - c");
        let Node::BinaryOp { left, .. } = &ast[id] else {
            panic!("expected binary op");
        };
        assert!(matches!(ast[*left], Node::BinaryOp { op: BinaryOperator::Subtract, .. }));
    }

    #[test]
    fn test_accessor_chain() {
        let (ast, id) = expr("batch_info.quads[i]");
        let Node::Index { target, index } = &ast[id] else {
            panic!("expected index");
        };
        assert!(matches!(ast[*target], Node::Access { .. }));
        assert_eq!(ast[*index], Node::Identifier("i".into()));
    }

    #[test]
    fn test_call_arguments() {
        let (ast, id) = expr("float4(0.0, f(a, b), 1)");
        let Node::Call { callee, arguments } = &ast[id] else {
            panic!("expected call");
        };
        assert_eq!(ast[*callee], Node::Identifier("float4".into()));
        assert_eq!(arguments.len(), 3);
        assert!(matches!(&ast[arguments[1]], Node::Call { arguments, .. } if arguments.len() == 2));
    }

    #[test]
    fn test_declaration_assignment() {
        let (ast, id) = expr("float2 vertex[] = { a, b }");
        let Node::Assign { target, value } = &ast[id] else {
            panic!("expected assignment");
        };
        let decl = ast.declaration(*target).unwrap();
        assert_eq!((decl.name.as_str(), decl.count), ("vertex", -1));
        assert!(matches!(&ast[*value], Node::ArrayLiteral(items) if items.len() == 2));
    }

    #[test]
    fn test_conditional() {
        let (ast, id) = expr("x = c ? a : b + 1");
        let Node::Assign { value, .. } = &ast[id] else {
            panic!("expected assignment");
        };
        let Node::Conditional { if_false, .. } = &ast[*value] else {
            panic!("expected conditional");
        };
        assert!(matches!(ast[*if_false], Node::BinaryOp { op: BinaryOperator::Add, .. }));
    }

    #[test]
    fn test_increment_forms() {
        let (ast, id) = expr("++i");
        assert!(matches!(ast[id], Node::Increment { prefix: true, .. }));
        let (ast, id) = expr("--i");
        assert!(matches!(ast[id], Node::Increment { prefix: true, .. }));
        let (ast, id) = expr("i--");
        assert!(matches!(ast[id], Node::Decrement { prefix: false, .. }));
    }

    #[test]
    fn test_compound_assignment_expands() {
        let (ast, id) = expr("x += 2");
        let Node::Assign { target, value } = &ast[id] else {
            panic!("expected assignment");
        };
        let Node::BinaryOp { op, left, .. } = &ast[*value] else {
            panic!("expected binary op");
        };
        assert_eq!(*op, BinaryOperator::Add);
        assert_ne!(left, target);
        assert_eq!(ast[*left], ast[*target]);
    }

    #[test]
    fn test_compound_assignment_target_is_not_shared() {
        let (ast, id) = expr("a.b[i] *= 2");
        let Node::Assign { target, value } = &ast[id] else {
            panic!("expected assignment");
        };
        let Node::BinaryOp { left, .. } = &ast[*value] else {
            panic!("expected binary op");
        };
        assert!(matches!(ast[*target], Node::Index { .. }));
        assert_eq!(ast.structural_hash(*left), ast.structural_hash(*target));

        let mut owners = std::collections::HashMap::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            for child in ast.children(node) {
                assert!(
                    owners.insert(child, node).is_none(),
                    "{:?} has two parents",
                    child
                );
                stack.push(child);
            }
        }
    }

    #[test]
    fn test_negate_and_grouping() {
        let (ast, id) = expr("-(a + b) * c");
        let Node::BinaryOp { left, .. } = &ast[id] else {
            panic!("expected binary op");
        };
        let Node::Negate(inner) = &ast[*left] else {
            panic!("expected negate");
        };
        assert!(matches!(ast[*inner], Node::Precedence(_)));
    }

    #[test]
    fn test_negate_binds_to_primary() {
        let (ast, id) = expr("-a.b");
        let Node::Access { left, right } = &ast[id] else {
            panic!("expected access, got {}", ast[id].kind_name());
        };
        assert!(matches!(&ast[*left], Node::Negate(inner) if ast[*inner] == Node::Identifier("a".into())));
        assert_eq!(ast[*right], Node::Identifier("b".into()));

        let (ast, id) = expr("-v[2]");
        assert!(matches!(ast[id], Node::Index { .. }));
    }

    #[test]
    fn test_negated_constructor_call() {
        let (ast, id) = expr("-float2(1.0, x)");
        let Node::Negate(inner) = &ast[id] else {
            panic!("expected negate");
        };
        assert!(matches!(&ast[*inner], Node::Call { arguments, .. } if arguments.len() == 2));
    }

    #[test]
    fn test_negated_identifier_cannot_be_called() {
        let mut ast = Ast::new();
        let result = Parser::new(&mut ast, LanguageProfile::default()).parse_expression(lex("e", "-f(x)"));
        assert!(result.is_err());
    }

    #[test]
    fn test_leftover_tokens_fail() {
        let mut ast = Ast::new();
        let result = Parser::new(&mut ast, LanguageProfile::default()).parse_expression(lex("e", "a b c"));
        assert!(result.is_err());
    }
}
