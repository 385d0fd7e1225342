//! Recursive-descent/Pratt parser: `Vec<token::Token>` to `ast::Ast`.
//!
//! A plain token-cursor recursive descent, with a standard precedence-climbing
//! expression grammar and a speculative-parse-then-backtrack step for the one
//! genuinely ambiguous construct Ember's grammar has: `f<T>(x)` (a generic
//! call) versus `a < b` (a relational comparison) both start with `ident <`.

use std::mem::discriminant;

use crate::{
    ast::{Ast, BinOp, CatchClause, ClassDef, EnumDef, FunctionDef, Literal, NodeId, NodeKind, UnOp},
    token::{CodeRange, Token, TokenKind},
};

use super::lexer::{LexError, Lexer};

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub range: CodeRange,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.range)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            message: err.message,
            range: err.range,
        }
    }
}

/// Lexes and parses `source` into a complete `Ast`.
pub fn parse(source: &str) -> Result<Ast, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_program()
}

/// A saved cursor position, used to backtrack out of a failed speculative
/// parse (the `f<T>(...)` vs. `a < b` ambiguity below).
struct Checkpoint {
    pos: usize,
    pending_gt: u32,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    ast: Ast,
    /// Set to 1 after a `>>` token is split to close one nested generic
    /// argument list; the next `close_angle` call consumes the held-back `>`
    /// without advancing the cursor.
    pending_gt: u32,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            ast: Ast::new(),
            pending_gt: 0,
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            pending_gt: self.pending_gt,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.pending_gt = checkpoint.pending_gt;
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_range(&self) -> CodeRange {
        self.tokens[self.pos].range
    }

    fn at(&self, kind: &TokenKind) -> bool {
        discriminant(self.peek()) == discriminant(kind)
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected {what}, found {:?}", self.peek())))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, CodeRange), ParseError> {
        let range = self.peek_range();
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Ok((name, range))
            }
            other => Err(self.error(format!("expected an identifier, found {other:?}"))),
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            range: self.peek_range(),
        }
    }

    /// Closes a `<...>` argument list, splitting a lexed `>>` into two `>`s
    /// when the list is nested (`vector<vector<int>>`). See the struct docs
    /// on `pending_gt`.
    fn close_angle(&mut self) -> Result<(), ParseError> {
        if self.pending_gt > 0 {
            self.pending_gt -= 1;
            return Ok(());
        }
        match self.peek() {
            TokenKind::Gt => {
                self.bump();
                Ok(())
            }
            TokenKind::RShift => {
                self.bump();
                self.pending_gt += 1;
                Ok(())
            }
            _ => Err(self.error("expected `>` to close a type argument list")),
        }
    }

    // ---- top level -----------------------------------------------------

    fn parse_program(mut self) -> Result<Ast, ParseError> {
        while !self.at_eof() {
            let item = self.parse_item()?;
            self.ast.top_level.push(item);
        }
        Ok(self.ast)
    }

    fn parse_item(&mut self) -> Result<NodeId, ParseError> {
        match self.peek() {
            TokenKind::KwFn => self.parse_fn_decl(None),
            TokenKind::KwClass => self.parse_class_decl(),
            TokenKind::KwEnum => self.parse_enum_decl(),
            _ => self.parse_stmt(),
        }
    }

    fn parse_template_params(&mut self) -> Result<Vec<String>, ParseError> {
        if !self.eat(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        let mut params = Vec::new();
        loop {
            let (name, _) = self.expect_ident()?;
            params.push(name);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.close_angle()?;
        Ok(params)
    }

    fn parse_fn_decl(&mut self, owner_class: Option<crate::ast::ClassId>) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        self.expect(&TokenKind::KwFn, "`fn`")?;
        let (name, _) = self.expect_ident()?;
        let template_params = self.parse_template_params()?;
        self.expect(&TokenKind::LParen, "`(`")?;
        let is_member_func = owner_class.is_some();
        let mut args = Vec::new();
        while !self.at(&TokenKind::RParen) {
            args.push(self.parse_argument()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "`)`")?;
        let return_type = if self.eat(&TokenKind::Arrow) { Some(self.parse_type()?) } else { None };
        let body = self.parse_block()?;
        let end = self.ast.node(body).range;
        let def = FunctionDef {
            name,
            template_params,
            args,
            return_type,
            body,
            is_member_func,
            owner_class,
            instantiated_from: None,
        };
        let function = self.ast.push_function(def);
        Ok(self.ast.push_node(start.merge(end), NodeKind::Function(function)))
    }

    fn parse_argument(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        let (name, _) = self.expect_ident()?;
        self.expect(&TokenKind::Colon, "`:`")?;
        let type_expr = self.parse_type()?;
        let end = self.ast.node(type_expr).range;
        Ok(self.ast.push_node(start.merge(end), NodeKind::Argument { name, type_expr }))
    }

    fn parse_class_decl(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        self.expect(&TokenKind::KwClass, "`class`")?;
        let (name, _) = self.expect_ident()?;
        let template_params = self.parse_template_params()?;
        self.expect(&TokenKind::LBrace, "`{`")?;

        let class_id = self.ast.push_class(ClassDef {
            name,
            template_params,
            members: Vec::new(),
            methods: Vec::new(),
            instantiated_from: None,
        });

        let mut members = Vec::new();
        let mut methods = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            if self.at(&TokenKind::KwFn) {
                let method_node = self.parse_fn_decl(Some(class_id))?;
                if let NodeKind::Function(id) = self.ast.node(method_node).kind {
                    methods.push(id);
                }
                self.ast.top_level.push(method_node);
            } else {
                members.push(self.parse_member_field()?);
            }
        }
        let end = self.peek_range();
        self.expect(&TokenKind::RBrace, "`}`")?;

        let class = self.ast.class_mut(class_id);
        class.members = members;
        class.methods = methods;

        Ok(self.ast.push_node(start.merge(end), NodeKind::Class(class_id)))
    }

    /// `name: Type;`, a class member-variable declaration. Reuses the
    /// `VarDef` node shape with no initializer, matching `ast::ClassDef`'s
    /// expectation that `members` holds `VarDef` nodes.
    fn parse_member_field(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        let (name, _) = self.expect_ident()?;
        self.expect(&TokenKind::Colon, "`:`")?;
        let type_expr = self.parse_type()?;
        let end = self.peek_range();
        self.expect(&TokenKind::Semi, "`;`")?;
        Ok(self.ast.push_node(
            start.merge(end),
            NodeKind::VarDef {
                name,
                type_expr: Some(type_expr),
                init: None,
            },
        ))
    }

    fn parse_enum_decl(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        self.expect(&TokenKind::KwEnum, "`enum`")?;
        let (name, _) = self.expect_ident()?;
        self.expect(&TokenKind::LBrace, "`{`")?;
        let mut variants = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            let (variant, _) = self.expect_ident()?;
            variants.push(variant);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.peek_range();
        self.expect(&TokenKind::RBrace, "`}`")?;
        let enum_id = self.ast.push_enum(EnumDef { name, variants });
        Ok(self.ast.push_node(start.merge(end), NodeKind::Enum(enum_id)))
    }

    // ---- types -----------------------------------------------------------

    fn parse_type(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        let (name, _) = self.expect_ident()?;
        let mut params = Vec::new();
        let mut end = start;
        if self.eat(&TokenKind::Lt) {
            loop {
                let param = self.parse_type()?;
                end = self.ast.node(param).range;
                params.push(param);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.close_angle()?;
        }
        Ok(self.ast.push_node(start.merge(end), NodeKind::TypeName { name, params }))
    }

    // ---- statements --------------------------------------------------------

    fn parse_block(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        self.expect(&TokenKind::LBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at_eof() {
            stmts.push(self.parse_stmt()?);
        }
        let end = self.peek_range();
        self.expect(&TokenKind::RBrace, "`}`")?;
        Ok(self.ast.push_node(start.merge(end), NodeKind::Block(stmts)))
    }

    fn parse_stmt(&mut self) -> Result<NodeId, ParseError> {
        match self.peek() {
            TokenKind::KwLet => self.parse_var_def(),
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwFor => self.parse_for(),
            TokenKind::KwTry => self.parse_try_catch(),
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::KwBreak => {
                let start = self.peek_range();
                self.bump();
                let end = self.peek_range();
                self.expect(&TokenKind::Semi, "`;`")?;
                Ok(self.ast.push_node(start.merge(end), NodeKind::Break))
            }
            TokenKind::KwContinue => {
                let start = self.peek_range();
                self.bump();
                let end = self.peek_range();
                self.expect(&TokenKind::Semi, "`;`")?;
                Ok(self.ast.push_node(start.merge(end), NodeKind::Continue))
            }
            TokenKind::KwThrow => {
                let start = self.peek_range();
                self.bump();
                let value = self.parse_expr()?;
                let end = self.peek_range();
                self.expect(&TokenKind::Semi, "`;`")?;
                Ok(self.ast.push_node(start.merge(end), NodeKind::Throw(value)))
            }
            TokenKind::LBrace => self.parse_block(),
            _ => {
                let start = self.peek_range();
                let expr = self.parse_expr()?;
                let end = self.peek_range();
                self.expect(&TokenKind::Semi, "`;`")?;
                Ok(self.ast.push_node(start.merge(end), NodeKind::ExprStmt(expr)))
            }
        }
    }

    fn parse_var_def(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        self.expect(&TokenKind::KwLet, "`let`")?;
        let (name, _) = self.expect_ident()?;
        let type_expr = if self.eat(&TokenKind::Colon) { Some(self.parse_type()?) } else { None };
        let init = if self.eat(&TokenKind::Eq) { Some(self.parse_expr()?) } else { None };
        let end = self.peek_range();
        self.expect(&TokenKind::Semi, "`;`")?;
        Ok(self.ast.push_node(start.merge(end), NodeKind::VarDef { name, type_expr, init }))
    }

    fn parse_if(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        self.expect(&TokenKind::KwIf, "`if`")?;
        let cond = self.parse_expr()?;
        let then_block = self.parse_block()?;
        let mut end = self.ast.node(then_block).range;
        let else_block = if self.eat(&TokenKind::KwElse) {
            let branch = if self.at(&TokenKind::KwIf) { self.parse_if()? } else { self.parse_block()? };
            end = self.ast.node(branch).range;
            Some(branch)
        } else {
            None
        };
        Ok(self.ast.push_node(
            start.merge(end),
            NodeKind::If {
                cond,
                then_block,
                else_block,
            },
        ))
    }

    fn parse_while(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        self.expect(&TokenKind::KwWhile, "`while`")?;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        let end = self.ast.node(body).range;
        Ok(self.ast.push_node(start.merge(end), NodeKind::While { cond, body }))
    }

    fn parse_for(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        self.expect(&TokenKind::KwFor, "`for`")?;
        let (var_name, _) = self.expect_ident()?;
        self.expect(&TokenKind::KwIn, "`in`")?;
        let iterable = self.parse_expr()?;
        let body = self.parse_block()?;
        let end = self.ast.node(body).range;
        Ok(self.ast.push_node(
            start.merge(end),
            NodeKind::For {
                var_name,
                iterable,
                body,
            },
        ))
    }

    fn parse_try_catch(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        self.expect(&TokenKind::KwTry, "`try`")?;
        let try_block = self.parse_block()?;
        let mut catches = Vec::new();
        let mut end = self.ast.node(try_block).range;
        while self.eat(&TokenKind::KwCatch) {
            self.expect(&TokenKind::LParen, "`(`")?;
            let exc_type = self.parse_type()?;
            let binding = if let TokenKind::Ident(_) = self.peek() {
                Some(self.expect_ident()?.0)
            } else {
                None
            };
            self.expect(&TokenKind::RParen, "`)`")?;
            let body = self.parse_block()?;
            end = self.ast.node(body).range;
            catches.push(CatchClause { exc_type, binding, body });
        }
        if catches.is_empty() {
            return Err(self.error("`try` requires at least one `catch` clause"));
        }
        Ok(self.ast.push_node(start.merge(end), NodeKind::TryCatch { try_block, catches }))
    }

    fn parse_return(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        self.expect(&TokenKind::KwReturn, "`return`")?;
        let value = if self.at(&TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
        let end = self.peek_range();
        self.expect(&TokenKind::Semi, "`;`")?;
        Ok(self.ast.push_node(start.merge(end), NodeKind::Return(value)))
    }

    // ---- expressions -------------------------------------------------------

    fn parse_expr(&mut self) -> Result<NodeId, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<NodeId, ParseError> {
        let target = self.parse_or()?;
        if self.eat(&TokenKind::Eq) {
            let start = self.ast.node(target).range;
            let value = self.parse_assignment()?;
            let end = self.ast.node(value).range;
            return Ok(self.ast.push_node(start.merge(end), NodeKind::Assign { target, value }));
        }
        Ok(target)
    }

    /// Generates one left-associative binary-operator precedence level.
    /// `ops` pairs a token kind to match against the current position's
    /// discriminant with the `BinOp` it produces.
    fn parse_binary_level(
        &mut self,
        next: impl Fn(&mut Self) -> Result<NodeId, ParseError>,
        ops: &[(TokenKind, BinOp)],
    ) -> Result<NodeId, ParseError> {
        let mut lhs = next(self)?;
        'outer: loop {
            for (tok, op) in ops {
                if self.at(tok) {
                    self.bump();
                    let rhs = next(self)?;
                    let start = self.ast.node(lhs).range;
                    let end = self.ast.node(rhs).range;
                    lhs = self.ast.push_node(start.merge(end), NodeKind::BinaryOp { op: *op, lhs, rhs });
                    continue 'outer;
                }
            }
            break;
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<NodeId, ParseError> {
        self.parse_binary_level(Self::parse_and, &[(TokenKind::PipePipe, BinOp::LogOr)])
    }

    fn parse_and(&mut self) -> Result<NodeId, ParseError> {
        self.parse_binary_level(Self::parse_equality, &[(TokenKind::AmpAmp, BinOp::LogAnd)])
    }

    fn parse_equality(&mut self) -> Result<NodeId, ParseError> {
        self.parse_binary_level(
            Self::parse_relational,
            &[(TokenKind::EqEq, BinOp::Eq), (TokenKind::NotEq, BinOp::NotEq)],
        )
    }

    fn parse_relational(&mut self) -> Result<NodeId, ParseError> {
        self.parse_binary_level(
            Self::parse_shift,
            &[
                (TokenKind::LtEq, BinOp::LtEq),
                (TokenKind::GtEq, BinOp::GtEq),
                (TokenKind::Lt, BinOp::Lt),
                (TokenKind::Gt, BinOp::Gt),
            ],
        )
    }

    fn parse_shift(&mut self) -> Result<NodeId, ParseError> {
        self.parse_binary_level(
            Self::parse_additive,
            &[(TokenKind::LShift, BinOp::LShift), (TokenKind::RShift, BinOp::RShift)],
        )
    }

    fn parse_additive(&mut self) -> Result<NodeId, ParseError> {
        self.parse_binary_level(
            Self::parse_multiplicative,
            &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)],
        )
    }

    fn parse_multiplicative(&mut self) -> Result<NodeId, ParseError> {
        self.parse_binary_level(
            Self::parse_unary,
            &[
                (TokenKind::Star, BinOp::Mul),
                (TokenKind::Slash, BinOp::Div),
                (TokenKind::Percent, BinOp::Mod),
            ],
        )
    }

    fn parse_unary(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        let op = match self.peek() {
            TokenKind::Bang => Some(UnOp::Not),
            TokenKind::Minus => Some(UnOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.parse_unary()?;
            let end = self.ast.node(operand).range;
            return Ok(self.ast.push_node(start.merge(end), NodeKind::UnaryOp { op, operand }));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<NodeId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            let start = self.ast.node(expr).range;
            match self.peek() {
                TokenKind::Dot => {
                    self.bump();
                    let (name, name_range) = self.expect_ident()?;
                    expr = self.ast.push_node(start.merge(name_range), NodeKind::MemberAccess { base: expr, name });
                }
                TokenKind::ColonColon => {
                    self.bump();
                    let (name, name_range) = self.expect_ident()?;
                    expr = self.ast.push_node(start.merge(name_range), NodeKind::ScopeResol { base: expr, name });
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.parse_expr()?;
                    let end = self.peek_range();
                    self.expect(&TokenKind::RBracket, "`]`")?;
                    expr = self.ast.push_node(start.merge(end), NodeKind::IndexRef { base: expr, index });
                }
                TokenKind::LParen => {
                    let (args, end) = self.parse_call_args()?;
                    expr = self.ast.push_node(
                        start.merge(end),
                        NodeKind::CallFunc {
                            callee: expr,
                            template_args: Vec::new(),
                            args,
                        },
                    );
                }
                TokenKind::Lt => match self.try_parse_template_call(expr)? {
                    Some(call) => expr = call,
                    None => break,
                },
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Speculatively parses `<T, ...>(args)` after `callee`. Only a genuine
    /// generic call commits; anything else (ordinary `a < b`) restores the
    /// cursor so the relational-operator level above sees the `<` untouched.
    fn try_parse_template_call(&mut self, callee: NodeId) -> Result<Option<NodeId>, ParseError> {
        let checkpoint = self.checkpoint();
        let attempt = (|| -> Result<NodeId, ParseError> {
            self.bump(); // `<`
            let mut template_args = Vec::new();
            if !self.at(&TokenKind::Gt) {
                loop {
                    template_args.push(self.parse_type()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.close_angle()?;
            if !self.at(&TokenKind::LParen) {
                return Err(self.error("not a generic call"));
            }
            let start = self.ast.node(callee).range;
            let (args, end) = self.parse_call_args()?;
            Ok(self.ast.push_node(start.merge(end), NodeKind::CallFunc { callee, template_args, args }))
        })();
        match attempt {
            Ok(node) => Ok(Some(node)),
            Err(_) => {
                self.restore(checkpoint);
                Ok(None)
            }
        }
    }

    fn parse_call_args(&mut self) -> Result<(Vec<NodeId>, CodeRange), ParseError> {
        self.expect(&TokenKind::LParen, "`(`")?;
        let mut args = Vec::new();
        while !self.at(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.peek_range();
        self.expect(&TokenKind::RParen, "`)`")?;
        Ok((args, end))
    }

    fn parse_primary(&mut self) -> Result<NodeId, ParseError> {
        let start = self.peek_range();
        match self.peek().clone() {
            TokenKind::Int(v) => {
                self.bump();
                Ok(self.ast.push_node(start, NodeKind::Value(Literal::Int(v))))
            }
            TokenKind::Float(bits) => {
                self.bump();
                Ok(self.ast.push_node(start, NodeKind::Value(Literal::Float(f64::from_bits(bits)))))
            }
            TokenKind::Str(s) => {
                self.bump();
                Ok(self.ast.push_node(start, NodeKind::Value(Literal::Str(s))))
            }
            TokenKind::Char(c) => {
                self.bump();
                Ok(self.ast.push_node(start, NodeKind::Value(Literal::Char(c))))
            }
            TokenKind::KwTrue => {
                self.bump();
                Ok(self.ast.push_node(start, NodeKind::Value(Literal::Bool(true))))
            }
            TokenKind::KwFalse => {
                self.bump();
                Ok(self.ast.push_node(start, NodeKind::Value(Literal::Bool(false))))
            }
            TokenKind::KwNone => {
                self.bump();
                Ok(self.ast.push_node(start, NodeKind::Value(Literal::None)))
            }
            TokenKind::KwNew => {
                self.bump();
                let (name, name_range) = self.expect_ident()?;
                let class_name = self.ast.push_node(name_range, NodeKind::Identifier(name));
                let (args, end) = self.parse_call_args()?;
                Ok(self.ast.push_node(start.merge(end), NodeKind::CallFuncCtor { class_name, args }))
            }
            TokenKind::Ident(name) => {
                self.bump();
                Ok(self.ast.push_node(start, NodeKind::Identifier(name)))
            }
            TokenKind::LParen => {
                self.bump();
                if self.at(&TokenKind::RParen) {
                    let end = self.peek_range();
                    self.bump();
                    return Ok(self.ast.push_node(start.merge(end), NodeKind::TupleLit(Vec::new())));
                }
                let first = self.parse_expr()?;
                if self.eat(&TokenKind::Comma) {
                    let mut elements = vec![first];
                    while !self.at(&TokenKind::RParen) {
                        elements.push(self.parse_expr()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    let end = self.peek_range();
                    self.expect(&TokenKind::RParen, "`)`")?;
                    Ok(self.ast.push_node(start.merge(end), NodeKind::TupleLit(elements)))
                } else {
                    self.expect(&TokenKind::RParen, "`)`")?;
                    Ok(first)
                }
            }
            TokenKind::LBracket => {
                self.bump();
                let mut elements = Vec::new();
                while !self.at(&TokenKind::RBracket) {
                    elements.push(self.parse_expr()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                let end = self.peek_range();
                self.expect(&TokenKind::RBracket, "`]`")?;
                Ok(self.ast.push_node(start.merge(end), NodeKind::Array(elements)))
            }
            other => Err(self.error(format!("expected an expression, found {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Ast {
        parse(src).unwrap_or_else(|e| panic!("parse error: {e}"))
    }

    #[test]
    fn parses_function_and_call() {
        let ast = parse_ok("fn f(x: int) -> int { return x * 2; } f(21);");
        assert_eq!(ast.top_level.len(), 2);
        assert!(matches!(ast.node(ast.top_level[0]).kind, NodeKind::Function(_)));
    }

    #[test]
    fn parses_generic_call_distinct_from_relational() {
        let ast = parse_ok("let a = id<int>(1); let b = x < y;");
        let NodeKind::VarDef { init: Some(init), .. } = &ast.node(ast.top_level[0]).kind else {
            panic!("expected var def")
        };
        assert!(matches!(ast.node(*init).kind, NodeKind::CallFunc { .. }));
        let NodeKind::VarDef { init: Some(init), .. } = &ast.node(ast.top_level[1]).kind else {
            panic!("expected var def")
        };
        assert!(matches!(
            ast.node(*init).kind,
            NodeKind::BinaryOp { op: BinOp::Lt, .. }
        ));
    }

    #[test]
    fn parses_nested_generic_closing_brackets() {
        let ast = parse_ok("let v: vector<vector<int>> = [];");
        let NodeKind::VarDef {
            type_expr: Some(type_expr), ..
        } = &ast.node(ast.top_level[0]).kind
        else {
            panic!("expected var def with a type annotation")
        };
        let NodeKind::TypeName { params, .. } = &ast.node(*type_expr).kind else {
            panic!("expected a type name")
        };
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn parses_explicit_constructor_call() {
        let ast = parse_ok("let p = new Point(1, 2);");
        let NodeKind::VarDef { init: Some(init), .. } = &ast.node(ast.top_level[0]).kind else {
            panic!("expected var def")
        };
        assert!(matches!(ast.node(*init).kind, NodeKind::CallFuncCtor { .. }));
    }

    #[test]
    fn rejects_try_without_catch() {
        assert!(parse("try { 1; }").is_err());
    }

    #[test]
    fn parses_class_with_method() {
        // `self` is an implicit receiver (see `scope::ScopeTree::build_stmt`'s
        // `Function` arm), not a declared parameter.
        let ast = parse_ok("class Point { x: int; fn len() -> int { return self.x; } }");
        assert_eq!(ast.top_level.len(), 1);
    }
}
