//! Parser
//!
//!     Recursive descent over a [`TokenStream`], allocating nodes into an
//!     [`Ast`]. Every construct with an extent (argument lists, bracket groups,
//!     `if`/`for` headers, statements up to `;`) is first cut off the front of the
//!     stream with [`TokenStream::slice_scoped`] and then parsed as a stream of its
//!     own. Sub-parsers therefore never share a cursor, and a sub-stream that is
//!     not fully consumed is an error.
//!
//! Statements
//!
//!     Module level and named scopes accept includes, defines, layouts, structs,
//!     push blocks, `const` statements and functions. Named scopes additionally
//!     accept bare expression statements. Function bodies accept `if`, `for`,
//!     `return` and expression statements.
//!
//! Declarations
//!
//!     `type [name] [ '[' N ']' ]`, or `type '[' N ']' name` in argument position.
//!     An identifier type is a struct reference, bound later by
//!     [`bind_references`](crate::passes::bind_references). `buffer Name {...}` and
//!     `Name {...}` are inline aggregates.
//!
//!     Expression parsing lives in [expression](expression).
//!
//! Errors are never recovered from. The first failed expectation aborts the
//! parse of the whole file.

mod expression;

use crate::ast::{
    Ast, Declaration, DeclarationType, Direction, LayoutKind, Node, NodeId, PrimitiveType, Stage,
    Tag,
};
use crate::error::ParseError;
use crate::profile::LanguageProfile;
use crate::token::{Token, TokenKind, TokenStream};
use log::debug;

/// Parse `tokens` into a module node allocated in `ast`, using the default profile.
pub fn parse(ast: &mut Ast, tokens: TokenStream) -> Result<NodeId, ParseError> {
    Parser::new(ast, LanguageProfile::default()).parse_module(tokens)
}

pub struct Parser<'a> {
    ast: &'a mut Ast,
    profile: LanguageProfile,
}

impl<'a> Parser<'a> {
    pub fn new(ast: &'a mut Ast, profile: LanguageProfile) -> Self {
        Self { ast, profile }
    }

    /// Parse a whole file.
    pub fn parse_module(&mut self, mut input: TokenStream) -> Result<NodeId, ParseError> {
        let mut statements = Vec::new();
        while let Some(kind) = input.front().map(|t| t.kind) {
            let statement = match kind {
                TokenKind::VertexScope | TokenKind::FragmentScope => self.named_scope(&mut input)?,
                _ => self.global_statement(&mut input, false)?,
            };
            statements.push(statement);
        }

        debug!("parsed module with {} top-level statements", statements.len());
        Ok(self.ast.alloc(Node::Module { statements }))
    }

    /// Parse one expression and require it to use up all of `tokens`.
    pub fn parse_expression(&mut self, tokens: TokenStream) -> Result<NodeId, ParseError> {
        self.full_expression(tokens)
    }

    fn global_statement(
        &mut self,
        input: &mut TokenStream,
        in_named_scope: bool,
    ) -> Result<NodeId, ParseError> {
        let front = input.front().cloned().ok_or_else(|| ParseError::end(&[]))?;
        match front.kind {
            TokenKind::Include => self.include(input),
            TokenKind::Define => self.define(input),
            TokenKind::Layout => self.layout(input),
            TokenKind::Struct => self.struct_definition(input),
            TokenKind::PushConstant => self.push_constant(input),
            TokenKind::Const => self.expression_statement(input),
            kind if kind == TokenKind::Unknown || is_return_type(kind) => self.function(input),
            _ if in_named_scope => self.expression_statement(input),
            _ => Err(ParseError::unexpected_statement(&front)),
        }
    }

    fn named_scope(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        let marker = input.take_front_any(&[TokenKind::VertexScope, TokenKind::FragmentScope])?;
        let stage = if marker.is(TokenKind::VertexScope) {
            Stage::Vertex
        } else {
            Stage::Fragment
        };

        input.take_front(TokenKind::OpenBrace)?;
        let mut statements = Vec::new();
        while !at_close(input, TokenKind::CloseBrace)? {
            statements.push(self.global_statement(input, true)?);
        }
        input.take_front(TokenKind::CloseBrace)?;

        let scope = self.ast.alloc(Node::Scope { statements });
        Ok(self.ast.alloc(Node::NamedScope { stage, scope }))
    }

    fn include(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        input.take_front(TokenKind::Include)?;
        let path = input.take_front(TokenKind::StringLiteral)?;
        Ok(self.ast.alloc(Node::Include {
            source_file: path.span.file.to_string(),
            target: path.text,
        }))
    }

    fn define(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        input.take_front(TokenKind::Define)?;
        let name = input.take_front(TokenKind::Unknown)?;
        let value = input.slice_until(TokenKind::StatementEnd);
        input.take_front(TokenKind::StatementEnd)?;
        let value = self.full_expression(value)?;
        Ok(self.ast.alloc(Node::Define {
            name: name.text,
            value,
        }))
    }

    fn layout(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        input.take_front(TokenKind::Layout)?;
        let tags = self.tag_list(input)?;

        let kind = match input.front().map(|t| t.kind) {
            Some(TokenKind::DataIn) => Some(LayoutKind::In),
            Some(TokenKind::DataOut) => Some(LayoutKind::Out),
            Some(TokenKind::Uniform) => Some(LayoutKind::Uniform),
            Some(TokenKind::ReadOnly) => Some(LayoutKind::ReadOnly),
            _ => None,
        };
        if kind.is_some() {
            input.pop_front();
        }

        let declaration = self.declaration(input)?;
        input.take_front(TokenKind::StatementEnd)?;

        Ok(self.ast.alloc(Node::Layout {
            kind: kind.unwrap_or(LayoutKind::In),
            tags,
            declaration,
        }))
    }

    fn push_constant(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        input.take_front(TokenKind::PushConstant)?;
        let tags = self.tag_list(input)?;
        let members = self.struct_body(input)?;
        input.take_front(TokenKind::StatementEnd)?;
        Ok(self.ast.alloc(Node::PushConstant { tags, members }))
    }

    /// `( key [= value] , ... )`. Later duplicates of a key are ignored.
    fn tag_list(&mut self, input: &mut TokenStream) -> Result<Vec<Tag>, ParseError> {
        input.take_front(TokenKind::OpenParen)?;
        let mut tokens = input.slice_scoped(&[TokenKind::CloseParen], 1, false);
        input.take_front(TokenKind::CloseParen)?;

        let mut tags: Vec<Tag> = Vec::new();
        while !tokens.is_empty() {
            let key = tokens.next_token()?;
            let value = if tokens.front_is(TokenKind::Assign) {
                tokens.pop_front();
                tokens.next_token()?.text
            } else {
                String::new()
            };

            if !tags.iter().any(|tag| tag.key == key.text) {
                tags.push(Tag {
                    key: key.text,
                    value,
                });
            }

            if !tokens.is_empty() {
                tokens.take_front(TokenKind::Comma)?;
            }
        }

        Ok(tags)
    }

    fn struct_definition(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        input.take_front(TokenKind::Struct)?;
        let name = input.take_front(TokenKind::Unknown)?;
        let members = self.struct_body(input)?;
        input.take_front(TokenKind::StatementEnd)?;
        Ok(self.ast.alloc(Node::Struct {
            name: name.text,
            members,
        }))
    }

    /// `{ declaration; ... }`
    fn struct_body(&mut self, input: &mut TokenStream) -> Result<Vec<NodeId>, ParseError> {
        input.take_front(TokenKind::OpenBrace)?;
        let mut members = Vec::new();
        while !at_close(input, TokenKind::CloseBrace)? {
            let mut tokens = input.slice_until(TokenKind::StatementEnd);
            input.take_front(TokenKind::StatementEnd)?;
            members.push(self.declaration(&mut tokens)?);
            finished(&tokens)?;
        }
        input.take_front(TokenKind::CloseBrace)?;
        Ok(members)
    }

    pub(crate) fn declaration(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        let ty = input.next_token()?;

        if ty.is(TokenKind::TypeBuffer) {
            let name = input.take_front(TokenKind::Unknown)?;
            let members = self.struct_body(input)?;
            return Ok(self.alloc_declaration(DeclarationType::Buffer { members }, name.text, 1));
        }

        if ty.is(TokenKind::Unknown) && input.front_is(TokenKind::OpenBrace) {
            let members = self.struct_body(input)?;
            return Ok(self.alloc_declaration(DeclarationType::Block { members }, ty.text, 1));
        }

        let mut count = None;
        if input.front_is(TokenKind::OpenBracket) {
            count = Some(array_count(input)?);
        }
        let name = if input.front_is(TokenKind::Unknown) {
            input.next_token()?.text
        } else {
            String::new()
        };
        if count.is_none() && input.front_is(TokenKind::OpenBracket) {
            count = Some(array_count(input)?);
        }

        let decl_type = declaration_type(&ty)?;
        Ok(self.alloc_declaration(decl_type, name, count.unwrap_or(1)))
    }

    fn alloc_declaration(&mut self, ty: DeclarationType, name: String, count: i32) -> NodeId {
        self.ast
            .alloc(Node::Declaration(Declaration { ty, name, count }))
    }

    fn function(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        let ty = input.next_token()?;
        let count = if input.front_is(TokenKind::OpenBracket) {
            array_count(input)?
        } else {
            1
        };
        let name = input.take_front(TokenKind::Unknown)?;

        input.take_front(TokenKind::OpenParen)?;
        let argument_tokens = input.slice_scoped(&[TokenKind::CloseParen], 1, false);
        input.take_front(TokenKind::CloseParen)?;

        let mut arguments = Vec::new();
        for mut tokens in split_commas(argument_tokens)? {
            arguments.push(self.function_argument(&mut tokens)?);
            finished(&tokens)?;
        }

        let return_declaration =
            self.alloc_declaration(declaration_type(&ty)?, String::new(), count);

        let body = if self.profile.arrow_functions && input.front_is(TokenKind::Arrow) {
            input.pop_front();
            let tokens = input.slice_until(TokenKind::StatementEnd);
            input.take_front(TokenKind::StatementEnd)?;
            let value = self.full_expression(tokens)?;
            let ret = self.ast.alloc(Node::Return(value));
            self.ast.alloc(Node::Scope {
                statements: vec![ret],
            })
        } else {
            self.scope(input)?
        };

        Ok(self.ast.alloc(Node::Function {
            return_declaration,
            name: name.text,
            arguments,
            body,
        }))
    }

    fn function_argument(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        let direction = match input.front().map(|t| t.kind) {
            Some(TokenKind::DataOut) => {
                input.pop_front();
                Direction::Out
            }
            Some(TokenKind::DataIn) => {
                input.pop_front();
                Direction::In
            }
            _ => Direction::In,
        };
        let declaration = self.declaration(input)?;
        Ok(self.ast.alloc(Node::FunctionArgument {
            direction,
            declaration,
        }))
    }

    /// `{ statement* }` inside a function body.
    fn scope(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        input.take_front(TokenKind::OpenBrace)?;
        let mut statements = Vec::new();

        while !at_close(input, TokenKind::CloseBrace)? {
            let kind = input.front().map(|t| t.kind);
            let statement = match kind {
                Some(TokenKind::If) => self.if_statement(input)?,
                Some(TokenKind::For) => self.for_statement(input)?,
                Some(TokenKind::Return) => {
                    input.pop_front();
                    let tokens = input.slice_until(TokenKind::StatementEnd);
                    input.take_front(TokenKind::StatementEnd)?;
                    let value = self.full_expression(tokens)?;
                    self.ast.alloc(Node::Return(value))
                }
                _ => self.expression_statement(input)?,
            };
            statements.push(statement);
        }

        input.take_front(TokenKind::CloseBrace)?;
        Ok(self.ast.alloc(Node::Scope { statements }))
    }

    /// Expression up to `;`. A lone `;` is a no-op.
    fn expression_statement(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        let tokens = input.slice_until(TokenKind::StatementEnd);
        input.take_front(TokenKind::StatementEnd)?;
        if tokens.is_empty() {
            return Ok(self.ast.alloc(Node::NoOp));
        }
        self.full_expression(tokens)
    }

    fn if_statement(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        input.take_front(TokenKind::If)?;
        let mut header = input.slice_until(TokenKind::CloseParen);
        header.take_front(TokenKind::OpenParen)?;
        input.take_front(TokenKind::CloseParen)?;

        let condition = self.full_expression(header)?;
        let then_scope = self.scope(input)?;

        let else_branch = if input.front_is(TokenKind::Else) {
            input.pop_front();
            if input.front_is(TokenKind::If) {
                Some(self.if_statement(input)?)
            } else {
                Some(self.scope(input)?)
            }
        } else {
            None
        };

        Ok(self.ast.alloc(Node::If {
            condition,
            then_scope,
            else_branch,
        }))
    }

    /// `for ( init : condition : update ) scope`; empty clauses are no-ops.
    fn for_statement(&mut self, input: &mut TokenStream) -> Result<NodeId, ParseError> {
        input.take_front(TokenKind::For)?;
        let mut header = input.slice_until(TokenKind::CloseParen);
        header.take_front(TokenKind::OpenParen)?;
        input.take_front(TokenKind::CloseParen)?;

        let init = header.slice_until(TokenKind::Colon);
        header.take_front(TokenKind::Colon)?;
        let condition = header.slice_until(TokenKind::Colon);
        header.take_front(TokenKind::Colon)?;
        let update = header;

        let init = self.optional_expression(init)?;
        let condition = self.optional_expression(condition)?;
        let update = self.optional_expression(update)?;
        let body = self.scope(input)?;

        Ok(self.ast.alloc(Node::For {
            init,
            condition,
            update,
            body,
        }))
    }

    fn optional_expression(&mut self, tokens: TokenStream) -> Result<NodeId, ParseError> {
        if tokens.is_empty() {
            Ok(self.ast.alloc(Node::NoOp))
        } else {
            self.full_expression(tokens)
        }
    }
}

fn is_return_type(kind: TokenKind) -> bool {
    PrimitiveType::from_token(kind).is_some()
}

fn declaration_type(token: &Token) -> Result<DeclarationType, ParseError> {
    if token.is(TokenKind::Unknown) {
        return Ok(DeclarationType::Struct {
            struct_name: token.text.clone(),
            binding: None,
        });
    }
    PrimitiveType::from_token(token.kind)
        .map(DeclarationType::Primitive)
        .ok_or_else(|| ParseError::unexpected(&[TokenKind::Unknown], token))
}

/// `[N]` or `[]`, returning `N` or -1.
fn array_count(input: &mut TokenStream) -> Result<i32, ParseError> {
    input.take_front(TokenKind::OpenBracket)?;
    let count = if input.front_is(TokenKind::Numeric) {
        let token = input.next_token()?;
        token.text.parse::<i32>().map_err(|_| ParseError::InvalidCount {
            text: token.text.clone(),
            span: token.span.clone(),
        })?
    } else {
        Declaration::UNSIZED
    };
    input.take_front(TokenKind::CloseBracket)?;
    Ok(count)
}

/// Split a stream on top-level commas.
pub(crate) fn split_commas(mut tokens: TokenStream) -> Result<Vec<TokenStream>, ParseError> {
    let mut parts = Vec::new();
    while !tokens.is_empty() {
        let part = tokens.slice_until(TokenKind::Comma);
        if !tokens.is_empty() {
            tokens.take_front(TokenKind::Comma)?;
        }
        parts.push(part);
    }
    Ok(parts)
}

/// Whether the front token is `close`; running out of input is an error.
fn at_close(input: &TokenStream, close: TokenKind) -> Result<bool, ParseError> {
    match input.front() {
        Some(token) => Ok(token.is(close)),
        None => Err(ParseError::end(&[close])),
    }
}

/// Fail on whatever a sub-parser left behind.
pub(crate) fn finished(tokens: &TokenStream) -> Result<(), ParseError> {
    match tokens.front() {
        Some(token) => Err(ParseError::unexpected_statement(token)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_source(source: &str) -> (Ast, NodeId) {
        let mut ast = Ast::new();
        let module = parse(&mut ast, lex("test.ash", source)).expect("source parses");
        (ast, module)
    }

    fn only_statement(ast: &Ast, module: NodeId) -> &Node {
        let statements = ast.statements(module);
        assert_eq!(statements.len(), 1);
        &ast[statements[0]]
    }

    #[test]
    fn test_struct_and_layout() {
        let (ast, module) = parse_source("struct S { float a; }; layout(location=0) uniform S v;");
        let statements = ast.statements(module);
        assert_eq!(statements.len(), 2);
        assert!(matches!(&ast[statements[0]], Node::Struct { name, members } if name == "S" && members.len() == 1));
        match &ast[statements[1]] {
            Node::Layout {
                kind,
                tags,
                declaration,
            } => {
                assert_eq!(*kind, LayoutKind::Uniform);
                assert_eq!(
                    tags,
                    &vec![Tag {
                        key: "location".into(),
                        value: "0".into()
                    }]
                );
                let decl = ast.declaration(*declaration).unwrap();
                assert_eq!(decl.name, "v");
                assert!(matches!(&decl.ty, DeclarationType::Struct { struct_name, binding: None } if struct_name == "S"));
            }
            other => panic!("expected layout, got {:?}", other),
        }
    }

    #[test]
    fn test_arrow_function_becomes_return_scope() {
        let (ast, module) = parse_source("int foo(float x) -> 2;");
        let Node::Function {
            name,
            arguments,
            body,
            return_declaration,
        } = only_statement(&ast, module)
        else {
            panic!("expected function");
        };
        assert_eq!(name, "foo");
        assert_eq!(arguments.len(), 1);
        assert_eq!(
            ast.declaration(*return_declaration).unwrap().ty,
            DeclarationType::Primitive(PrimitiveType::Int)
        );
        let statements = ast.statements(*body);
        assert_eq!(statements.len(), 1);
        let Node::Return(value) = &ast[statements[0]] else {
            panic!("expected return");
        };
        assert_eq!(ast[*value], Node::IntLiteral(2));
    }

    #[test]
    fn test_argument_with_array_before_name() {
        let (ast, module) = parse_source("int foo(float[20] x, out float4 y) -> 20;");
        let Node::Function { arguments, .. } = only_statement(&ast, module) else {
            panic!("expected function");
        };
        let Node::FunctionArgument {
            direction,
            declaration,
        } = &ast[arguments[0]]
        else {
            panic!("expected argument");
        };
        assert_eq!(*direction, Direction::In);
        let decl = ast.declaration(*declaration).unwrap();
        assert_eq!((decl.name.as_str(), decl.count), ("x", 20));

        let Node::FunctionArgument { direction, .. } = &ast[arguments[1]] else {
            panic!("expected argument");
        };
        assert_eq!(*direction, Direction::Out);
    }

    #[test]
    fn test_declaration_counts() {
        let (ast, module) = parse_source("struct S { float a[4]; float b[]; float c; };");
        let Node::Struct { members, .. } = only_statement(&ast, module) else {
            panic!("expected struct");
        };
        let counts: Vec<_> = members
            .iter()
            .map(|m| ast.declaration(*m).unwrap().count)
            .collect();
        assert_eq!(counts, vec![4, -1, 1]);
    }

    #[test]
    fn test_uniform_block_and_buffer() {
        let (ast, module) = parse_source(
            "layout(set = 1, binding = 0, scalar) uniform batch_info { float time; mat4 projection; };\n\
             layout(set = 0) readonly buffer Lights { float4 colors[]; };",
        );
        let statements = ast.statements(module);
        let Node::Layout { tags, declaration, .. } = &ast[statements[0]] else {
            panic!("expected layout");
        };
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[2].value, "");
        let decl = ast.declaration(*declaration).unwrap();
        assert_eq!(decl.name, "batch_info");
        assert!(matches!(&decl.ty, DeclarationType::Block { members } if members.len() == 2));

        let Node::Layout { kind, declaration, .. } = &ast[statements[1]] else {
            panic!("expected layout");
        };
        assert_eq!(*kind, LayoutKind::ReadOnly);
        assert!(matches!(
            &ast.declaration(*declaration).unwrap().ty,
            DeclarationType::Buffer { .. }
        ));
    }

    #[test]
    fn test_named_scopes() {
        let (ast, module) = parse_source(
            "@Vertex { layout(location = 0) out float2 uv; }\n@Fragment { void main() { discard; } }",
        );
        let statements = ast.statements(module);
        assert_eq!(statements.len(), 2);
        assert!(matches!(ast[statements[0]], Node::NamedScope { stage: Stage::Vertex, .. }));
        assert!(matches!(ast[statements[1]], Node::NamedScope { stage: Stage::Fragment, .. }));
    }

    #[test]
    fn test_include_records_source_file() {
        let (ast, module) = parse_source("#include \"common.ash\"");
        assert_eq!(
            only_statement(&ast, module),
            &Node::Include {
                source_file: "test.ash".into(),
                target: "common.ash".into()
            }
        );
    }

    #[test]
    fn test_define_and_push_constant() {
        let (ast, module) = parse_source("#define COUNT 4;\npush(scalar) { float time; float4 tint; };");
        let statements = ast.statements(module);
        assert!(matches!(&ast[statements[0]], Node::Define { name, .. } if name == "COUNT"));
        let Node::PushConstant { tags, members } = &ast[statements[1]] else {
            panic!("expected push block");
        };
        assert_eq!(tags[0].key, "scalar");
        assert_eq!(members.len(), 2);
        assert_eq!(ast.size_of(statements[1]), Ok(20));
    }

    #[test]
    fn test_if_else_chain_and_for() {
        let (ast, module) = parse_source(
            "void main() { if(a) { b = 1; } else if(c) { b = 2; } else { b = 3; } for(int i = 0 : i < 4 : i++) { } for( : : ) { } }",
        );
        let Node::Function { body, .. } = only_statement(&ast, module) else {
            panic!("expected function");
        };
        let statements = ast.statements(*body);
        assert_eq!(statements.len(), 3);
        let Node::If {
            else_branch: Some(else_if),
            ..
        } = &ast[statements[0]]
        else {
            panic!("expected if/else");
        };
        assert!(matches!(ast[*else_if], Node::If { else_branch: Some(_), .. }));

        let Node::For { init, update, .. } = &ast[statements[1]] else {
            panic!("expected for");
        };
        assert!(matches!(ast[*init], Node::Assign { .. }));
        assert!(matches!(ast[*update], Node::Increment { prefix: false, .. }));

        let Node::For { init, condition, update, .. } = &ast[statements[2]] else {
            panic!("expected for");
        };
        for clause in [init, condition, update] {
            assert_eq!(ast[*clause], Node::NoOp);
        }
    }

    #[test]
    fn test_errors_are_reported() {
        let mut ast = Ast::new();
        let err = parse(&mut ast, lex("t.ash", "return 1;")).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedStatement { ref text, .. } if text == "return"));

        let err = parse(&mut ast, lex("t.ash", "struct S { float a; }")).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { .. }));

        let err = parse(&mut ast, lex("t.ash", "void main() { , ; }")).unwrap_err();
        assert!(matches!(err, ParseError::UnknownPrimary { .. }));
    }

    #[test]
    fn test_arrow_needs_profile() {
        let mut ast = Ast::new();
        let tokens = crate::lexer::Lexer::new(LanguageProfile::core()).tokenize("t", "int foo() -> 2;");
        let result = Parser::new(&mut ast, LanguageProfile::core()).parse_module(tokens);
        assert!(result.is_err());
    }
}
