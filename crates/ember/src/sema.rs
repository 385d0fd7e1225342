//! Semantic analysis: scope resolution, overload resolution, generic
//! function instantiation, class-member lookup, and type deduction.
//!
//! Covers statement checking (`check`) and expression typing (`eval_type`).
//! Rather than mutating each AST node in place once it is resolved, this
//! writes into `Resolutions`, a side table
//! keyed by `(Ctx, NodeId)` rather than by `NodeId` alone. The `Ctx` half of
//! the key is the `FunctionId` of the function body currently being
//! checked (`None` for top-level code): a generic function's body is the
//! same set of AST nodes for every instantiation, so a plain `NodeId` key
//! would let one instantiation's resolution stomp another's. Keying by the
//! instantiation's own (fresh) `FunctionId` instead keeps them distinct
//! without requiring the body to be duplicated per instantiation.

use ahash::AHashMap;
use std::collections::VecDeque;

use crate::{
    ast::{Ast, BinOp, ClassId, EnumId, FunctionDef, FunctionId, Literal, NodeId, NodeKind, UnOp},
    builtins,
    diagnostics::{Diagnostic, DiagnosticSink},
    resource::RecursionGuard,
    scope::{ScopeId, ScopeTree},
    token::CodeRange,
    types::{TypeInfo, TypeKind},
};

/// `None` identifies top-level code; `Some(f)` identifies the body of
/// function (or function instantiation) `f`.
pub type Ctx = Option<FunctionId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentResolution {
    LocalVar { depth: u32, index: usize },
    Function(FunctionId),
    BuiltinFunction(&'static str),
    ClassName(ClassId),
    EnumName(EnumId),
    EnumVariant { enum_id: EnumId, variant: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberResolution {
    MemberVariable { index: usize },
    MemberFunction(FunctionId),
    BuiltinMemberFunction(&'static str),
}

/// What a `CallFunc`/`CallFuncCtor` node resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallResolution {
    Function(FunctionId),
    BuiltinFunction(&'static str),
    Constructor(ClassId),
    MemberFunction(FunctionId),
    BuiltinMemberFunction(&'static str),
    /// Call-via-functor: the callee is an arbitrary expression (typically a
    /// local variable) whose type is `Function`, not a bare name.
    Functor(FunctionId),
}

/// The full set of facts Sema records about a checked program, consumed by
/// the evaluator. See the module doc for why every map is keyed by `(Ctx,
/// NodeId)`/`(Ctx, ScopeId, usize)` instead of just `NodeId`/`usize`.
#[derive(Debug, Default)]
pub struct Resolutions {
    idents: AHashMap<(Ctx, NodeId), IdentResolution>,
    members: AHashMap<(Ctx, NodeId), MemberResolution>,
    calls: AHashMap<(Ctx, NodeId), CallResolution>,
    expr_types: AHashMap<(Ctx, NodeId), TypeInfo>,
    var_types: AHashMap<(Ctx, ScopeId, usize), TypeInfo>,
}

impl Resolutions {
    #[must_use]
    pub fn ident(&self, ctx: Ctx, node: NodeId) -> Option<IdentResolution> {
        self.idents.get(&(ctx, node)).copied()
    }

    #[must_use]
    pub fn member(&self, ctx: Ctx, node: NodeId) -> Option<MemberResolution> {
        self.members.get(&(ctx, node)).copied()
    }

    #[must_use]
    pub fn call(&self, ctx: Ctx, node: NodeId) -> Option<CallResolution> {
        self.calls.get(&(ctx, node)).copied()
    }

    #[must_use]
    pub fn expr_type(&self, ctx: Ctx, node: NodeId) -> Option<&TypeInfo> {
        self.expr_types.get(&(ctx, node))
    }

    #[must_use]
    pub fn var_type(&self, ctx: Ctx, scope: ScopeId, index: usize) -> Option<&TypeInfo> {
        self.var_types.get(&(ctx, scope, index))
    }
}

/// One deferred generic instantiation: a template `FunctionId` paired with
/// the concrete argument types inferred at a call site. Drained after the
/// main top-down pass, mirroring the original's queue-then-drain structure
/// (instantiation checking happens out of the normal top-down order because
/// a call site can be reached before, or much later than, the generic
/// function's own declaration is otherwise revisited).
struct InstantiationRequest {
    template: FunctionId,
    template_args: Vec<TypeInfo>,
    call_ctx: Ctx,
    call_node: NodeId,
}

pub struct Sema<'a> {
    ast: &'a mut Ast,
    scopes: &'a mut ScopeTree,
    sink: &'a mut DiagnosticSink,
    resolutions: Resolutions,
    functions_by_name: AHashMap<String, Vec<FunctionId>>,
    classes_by_name: AHashMap<String, ClassId>,
    enums_by_name: AHashMap<String, EnumId>,
    global_scope: ScopeId,
    scope_stack: Vec<ScopeId>,
    ctx_stack: Vec<Ctx>,
    loop_depth: u32,
    current_class: Option<ClassId>,
    /// Template parameter name -> concrete type, active while checking the
    /// body of the instantiation currently on top of `ctx_stack`.
    template_bindings: AHashMap<String, TypeInfo>,
    instantiation_queue: VecDeque<InstantiationRequest>,
    /// Already-performed instantiations, keyed by (template, concrete args),
    /// so two call sites instantiating `id<int>` share one `FunctionId`
    /// rather than each minting their own.
    instantiation_cache: AHashMap<(FunctionId, Vec<TypeInfo>), FunctionId>,
    recursion: RecursionGuard,
    depth: usize,
}

impl<'a> Sema<'a> {
    fn current_scope(&self) -> ScopeId {
        *self.scope_stack.last().unwrap_or(&self.global_scope)
    }

    fn current_ctx(&self) -> Ctx {
        self.ctx_stack.last().copied().flatten()
    }

    fn enter_scope(&mut self, owner: NodeId) {
        let child = self
            .scopes
            .find_child_scope(self.current_scope(), owner)
            .unwrap_or(self.global_scope);
        self.scope_stack.push(child);
    }

    fn exit_scope(&mut self) {
        self.scope_stack.pop();
    }

    fn record_ident(&mut self, node: NodeId, resolution: IdentResolution) {
        self.resolutions.idents.insert((self.current_ctx(), node), resolution);
    }

    fn record_member(&mut self, node: NodeId, resolution: MemberResolution) {
        self.resolutions.members.insert((self.current_ctx(), node), resolution);
    }

    fn record_call(&mut self, node: NodeId, resolution: CallResolution) {
        self.resolutions.calls.insert((self.current_ctx(), node), resolution);
    }

    fn record_type(&mut self, node: NodeId, ty: TypeInfo) -> TypeInfo {
        self.resolutions.expr_types.insert((self.current_ctx(), node), ty.clone());
        ty
    }

    fn error(&mut self, range: CodeRange, message: impl Into<String>) {
        self.sink.emit(Diagnostic::error(range, message));
    }
}

/// Checks an entire program, returning the `Resolutions` table the
/// evaluator needs. `ast` gains one new `FunctionDef` per generic
/// instantiation actually used; `scopes` is left as built (instantiations
/// reuse the template's scope tree, since slot layout is identical across
/// instantiations and only declared *types* differ).
pub fn check_program(ast: &mut Ast, scopes: &mut ScopeTree, sink: &mut DiagnosticSink) -> Resolutions {
    let global_scope = scopes.build_program(ast, &ast.top_level.clone());

    let mut sema = Sema {
        ast,
        scopes,
        sink,
        resolutions: Resolutions::default(),
        functions_by_name: AHashMap::new(),
        classes_by_name: AHashMap::new(),
        enums_by_name: AHashMap::new(),
        global_scope,
        scope_stack: Vec::new(),
        ctx_stack: Vec::new(),
        loop_depth: 0,
        current_class: None,
        template_bindings: AHashMap::new(),
        instantiation_queue: VecDeque::new(),
        instantiation_cache: AHashMap::new(),
        recursion: RecursionGuard::default(),
        depth: 0,
    };

    sema.collect_globals();

    let top_level = sema.ast.top_level.clone();
    for stmt in top_level {
        sema.check(stmt);
    }

    while let Some(request) = sema.instantiation_queue.pop_front() {
        sema.drain_instantiation(request);
    }

    sema.resolutions
}

impl<'a> Sema<'a> {
    fn collect_globals(&mut self) {
        let top_level = self.ast.top_level.clone();
        for node in top_level {
            match self.ast.node(node).kind.clone() {
                // Methods get their own top-level `Function` node purely so
                // `function_decl_node`/`find_child_scope` can locate their
                // scope (see `scope::ScopeTree::build_stmt`'s `Function`
                // arm); they must NOT be registered as free-function
                // candidates here, or a bare `bump()` call (no receiver)
                // would resolve to a method whose scope reserved slot 0 for
                // `self`, misaligning every argument slot by one.
                NodeKind::Function(id) if self.ast.function(id).owner_class.is_none() => {
                    let name = self.ast.function(id).name.clone();
                    self.functions_by_name.entry(name).or_default().push(id);
                }
                NodeKind::Function(_) => {}
                NodeKind::Class(id) => {
                    let def = self.ast.class(id).clone();
                    self.classes_by_name.insert(def.name.clone(), id);
                }
                NodeKind::Enum(id) => {
                    let name = self.ast.enum_def(id).name.clone();
                    self.enums_by_name.insert(name, id);
                }
                _ => {}
            }
        }
    }

    /// Statement-level checking. Grounded in `SemaCheck.cpp`'s `check`
    /// dispatch over every statement kind.
    fn check(&mut self, node: NodeId) {
        let range = self.ast.node(node).range;
        match self.ast.node(node).kind.clone() {
            // A method's top-level `Function` node exists only so its scope
            // can be found by `function_decl_node`/`find_child_scope`; it is
            // checked (with its owning class in context, for `self`'s type)
            // exclusively from `check_class`, never from this generic
            // top-level dispatch.
            NodeKind::Function(id) if self.ast.function(id).owner_class.is_none() => self.check_function(id),
            NodeKind::Function(_) => {}
            NodeKind::Class(id) => self.check_class(id),
            NodeKind::Enum(_) => {}
            NodeKind::Block(stmts) => {
                self.enter_scope(node);
                for stmt in stmts {
                    self.check(stmt);
                }
                self.exit_scope();
            }
            NodeKind::VarDef { name, type_expr, init } => self.check_vardef(node, &name, type_expr, init),
            NodeKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond_ty = self.eval_type(cond);
                if !matches!(cond_ty.kind, TypeKind::Bool) {
                    self.error(range, format!("if condition must be bool, found {cond_ty}"));
                }
                self.check(then_block);
                if let Some(else_block) = else_block {
                    self.check(else_block);
                }
            }
            NodeKind::While { cond, body } => {
                let cond_ty = self.eval_type(cond);
                if !matches!(cond_ty.kind, TypeKind::Bool) {
                    self.error(range, format!("while condition must be bool, found {cond_ty}"));
                }
                self.loop_depth += 1;
                self.check(body);
                self.loop_depth -= 1;
            }
            NodeKind::For {
                var_name,
                iterable,
                body,
            } => self.check_for(node, &var_name, iterable, body),
            NodeKind::TryCatch { try_block, catches } => {
                self.check(try_block);
                let mut seen_types: Vec<(TypeInfo, CodeRange)> = Vec::new();
                for clause in &catches {
                    let exc_ty = self.eval_type(clause.exc_type);
                    if let Some((_, first_range)) = seen_types.iter().find(|(t, _)| t.type_equal(&exc_ty)) {
                        self.error(
                            self.ast.node(clause.exc_type).range,
                            format!("duplicate catch clause for type {exc_ty}"),
                        );
                        self.sink.emit(
                            Diagnostic::error(self.ast.node(clause.exc_type).range, "duplicate catch")
                                .with_note(Diagnostic::error(*first_range, "first handled here")),
                        );
                    }
                    seen_types.push((exc_ty, self.ast.node(clause.exc_type).range));
                    self.enter_scope(clause.body);
                    if let NodeKind::Block(stmts) = self.ast.node(clause.body).kind.clone() {
                        for stmt in stmts {
                            self.check(stmt);
                        }
                    }
                    self.exit_scope();
                }
            }
            NodeKind::Return(value) => {
                if let Some(value) = value {
                    self.eval_type(value);
                }
            }
            NodeKind::Break => {
                if self.loop_depth == 0 {
                    self.error(range, "break outside of a loop");
                }
            }
            NodeKind::Continue => {
                if self.loop_depth == 0 {
                    self.error(range, "continue outside of a loop");
                }
            }
            NodeKind::Throw(value) => {
                self.eval_type(value);
            }
            NodeKind::ExprStmt(expr) => {
                self.eval_type(expr);
            }
            NodeKind::Assign { target, value } => {
                self.check_assign(node, target, value);
            }
            _ => {
                self.eval_type(node);
            }
        }
    }

    fn check_vardef(&mut self, node: NodeId, name: &str, type_expr: Option<NodeId>, init: Option<NodeId>) {
        let range = self.ast.node(node).range;
        let declared = type_expr.map(|t| self.eval_type(t));
        let init_ty = init.map(|v| self.eval_type(v));
        let ty = match (declared, init_ty) {
            (Some(declared), Some(init_ty)) => {
                if !declared.type_equal(&init_ty) {
                    self.error(
                        range,
                        format!("cannot assign {init_ty} to variable `{name}` declared as {declared}"),
                    );
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(init_ty)) => init_ty,
            (None, None) => {
                self.error(range, format!("variable `{name}` needs either a type or an initializer"));
                TypeInfo::none()
            }
        };
        let scope = self.current_scope();
        let index = self
            .scopes
            .scope(scope)
            .vars
            .iter()
            .position(|v| v.def_node == node)
            .expect("scope was built from the same AST, the slot must exist");
        let ctx = self.current_ctx();
        self.resolutions.var_types.insert((ctx, scope, index), ty);
    }

    fn check_for(&mut self, node: NodeId, var_name: &str, iterable: NodeId, body: NodeId) {
        let range = self.ast.node(node).range;
        let iter_ty = self.eval_type(iterable);
        let element_ty = match iter_ty.kind {
            TypeKind::Vector => iter_ty.element_type().clone(),
            TypeKind::String => TypeInfo::char_(),
            _ => {
                self.error(range, format!("cannot iterate over {iter_ty}"));
                TypeInfo::none()
            }
        };
        self.enter_scope(body);
        let scope = self.current_scope();
        let index = self
            .scopes
            .scope(scope)
            .vars
            .iter()
            .position(|v| v.name == var_name)
            .expect("for-loop scope always declares its own loop variable");
        let ctx = self.current_ctx();
        self.resolutions.var_types.insert((ctx, scope, index), element_ty);
        if let NodeKind::Block(stmts) = self.ast.node(body).kind.clone() {
            self.loop_depth += 1;
            for stmt in stmts {
                self.check(stmt);
            }
            self.loop_depth -= 1;
        }
        self.exit_scope();
    }

    fn check_assign(&mut self, node: NodeId, target: NodeId, value: NodeId) -> TypeInfo {
        let range = self.ast.node(node).range;
        let value_ty = self.eval_type(value);
        let target_ty = self.eval_type(target);
        if !self.is_writable(target) {
            self.error(range, "left-hand side of assignment is not writable");
        }
        if target_ty.is_none() {
            // Undeclared-looking identifier target: deduce its type from
            // the RHS, matching `SemaEvalType.cpp`'s `Assign` handling of an
            // LHS local variable with no declared type yet.
            if let NodeKind::Identifier(name) = &self.ast.node(target).kind {
                let name = name.clone();
                if let Some((scope, _, index)) = self.scopes.find_var_scope(self.current_scope(), &name) {
                    let ctx = self.current_ctx();
                    self.resolutions.var_types.entry((ctx, scope, index)).or_insert_with(|| value_ty.clone());
                }
            }
        } else if !target_ty.type_equal(&value_ty) {
            self.error(range, format!("cannot assign {value_ty} to target of type {target_ty}"));
        }
        self.record_type(node, TypeInfo::none())
    }

    fn is_writable(&self, node: NodeId) -> bool {
        matches!(
            self.ast.node(node).kind,
            NodeKind::Identifier(_) | NodeKind::MemberAccess { .. } | NodeKind::IndexRef { .. }
        )
    }

    fn check_function(&mut self, id: FunctionId) {
        let def = self.ast.function(id).clone();
        if !def.template_params.is_empty() {
            // Generic templates are only checked once instantiated; see
            // `drain_instantiation`.
            return;
        }
        self.check_function_body(id, &def, None);
    }

    fn check_function_body(&mut self, id: FunctionId, def: &FunctionDef, owner_class: Option<ClassId>) {
        self.depth += 1;
        if let Err(e) = self.recursion.check(self.depth) {
            self.error(self.ast.node(def.body).range, e.to_string());
            self.depth -= 1;
            return;
        }
        self.ctx_stack.push(Some(id));
        self.current_class = owner_class;
        self.enter_scope(self.function_decl_node(id));

        if let Some(class_id) = owner_class {
            let scope = self.current_scope();
            if let Some(index) = self.scopes.scope(scope).vars.iter().position(|v| v.name == "self") {
                let ctx = self.current_ctx();
                let class_name = self.ast.class(class_id).name.clone();
                self.resolutions
                    .var_types
                    .insert((ctx, scope, index), TypeInfo::instance(class_id, class_name));
            }
        }

        for arg in &def.args {
            if let NodeKind::Argument { type_expr, .. } = self.ast.node(*arg).kind.clone() {
                let ty = self.eval_type(type_expr);
                let scope = self.current_scope();
                if let Some(index) = self.scopes.scope(scope).vars.iter().position(|v| v.def_node == *arg) {
                    let ctx = self.current_ctx();
                    self.resolutions.var_types.insert((ctx, scope, index), ty);
                }
            }
        }

        let declared_return = def.return_type.map(|t| self.eval_type(t)).unwrap_or_else(TypeInfo::none);
        let mut returns = Vec::new();
        collect_returns(self.ast, def.body, &mut returns);
        // `self.check(def.body)` (not a manual statement loop) so the body's
        // own `Block` scope — a child of this function's scope in the tree
        // `scope.rs` built, one level deeper, exactly like any nested
        // if/while body — is actually entered. Skipping that `enter_scope`
        // would leave every nested block inside the body looking up its
        // child scope against the wrong parent and falling back to the
        // global scope, corrupting every variable depth/index resolved
        // inside it.
        self.check(def.body);
        let ctx = self.current_ctx();
        for ret in returns {
            if let NodeKind::Return(value) = self.ast.node(ret).kind.clone() {
                let range = self.ast.node(ret).range;
                // The type was already computed (in the correct scope) while
                // `check(def.body)` walked this `Return` node; re-running
                // `eval_type` here, after the body's scopes have all exited,
                // would resolve identifiers against the wrong scope.
                let ret_ty = match value {
                    Some(v) => self.resolutions.expr_type(ctx, v).cloned().unwrap_or_else(TypeInfo::none),
                    None => TypeInfo::none(),
                };
                if !ret_ty.type_equal(&declared_return) {
                    self.error(
                        range,
                        format!("return type {ret_ty} does not match declared return type {declared_return}"),
                    );
                }
            }
        }
        if !declared_return.is_none() && returns.is_empty() {
            self.error(
                self.ast.node(def.body).range,
                format!("function `{}` must return a value of type {declared_return}", def.name),
            );
        } else if !declared_return.is_none() {
            let last_is_return = match self.ast.node(def.body).kind.clone() {
                NodeKind::Block(stmts) => stmts.last().is_some_and(|&s| matches!(self.ast.node(s).kind, NodeKind::Return(_))),
                _ => false,
            };
            if !last_is_return {
                self.error(self.ast.node(def.body).range, "expected return-statement");
            }
        }

        self.exit_scope();
        self.current_class = None;
        self.ctx_stack.pop();
        self.depth -= 1;
    }

    /// The AST node declaring function `id`, used to look up its scope via
    /// `find_child_scope`. Functions are always declared at the top level
    /// (including methods, whose `Function` node also lives in
    /// `ast.top_level`), so this is a plain linear search.
    fn function_decl_node(&self, id: FunctionId) -> NodeId {
        self.ast
            .top_level
            .iter()
            .copied()
            .find(|&n| matches!(&self.ast.node(n).kind, NodeKind::Function(f) if *f == id))
            .expect("every checked function has a top-level declaration node")
    }

    fn check_class(&mut self, id: ClassId) {
        let def = self.ast.class(id).clone();
        for member in &def.members {
            if let NodeKind::VarDef { type_expr: Some(t), .. } = self.ast.node(*member).kind.clone() {
                self.eval_type(t);
            }
        }
        for method in def.methods.clone() {
            let method_def = self.ast.function(method).clone();
            if method_def.template_params.is_empty() {
                self.check_function_body(method, &method_def, Some(id));
            }
        }
    }

    /// Expression-level typing. Grounded in `SemaEvalType.cpp`'s `eval_type`
    /// dispatch over every expression kind.
    fn eval_type(&mut self, node: NodeId) -> TypeInfo {
        let range = self.ast.node(node).range;
        let ty = match self.ast.node(node).kind.clone() {
            NodeKind::Value(literal) => match literal {
                Literal::Int(_) => TypeInfo::int(),
                Literal::Float(_) => TypeInfo::float(),
                Literal::Bool(_) => TypeInfo::boolean(),
                Literal::Char(_) => TypeInfo::char_(),
                Literal::Str(_) => TypeInfo::string(),
                Literal::None => TypeInfo::none(),
            },
            NodeKind::Identifier(name) => self.eval_identifier(node, &name, range),
            NodeKind::ScopeResol { base, name } => self.eval_scope_resol(node, base, &name, range),
            NodeKind::MemberAccess { base, name } => self.eval_member_access(node, base, &name, range),
            NodeKind::Array(elements) => self.eval_array(&elements, range),
            NodeKind::TupleLit(elements) => {
                let tys = elements.iter().map(|&e| self.eval_type(e)).collect();
                TypeInfo::tuple(tys)
            }
            NodeKind::IndexRef { base, index } => self.eval_index(base, index, range),
            NodeKind::CallFunc {
                callee,
                template_args,
                args,
            } => self.eval_call(node, callee, &template_args, &args, range),
            NodeKind::CallFuncCtor { class_name, args } => self.eval_ctor_call(node, class_name, &args, range),
            NodeKind::BinaryOp { op, lhs, rhs } => self.eval_binary(op, lhs, rhs, range),
            NodeKind::UnaryOp { op, operand } => self.eval_unary(op, operand, range),
            NodeKind::Assign { target, value } => self.check_assign(node, target, value),
            NodeKind::TypeName { name, params } => self.eval_type_name(&name, &params, range),
            _ => {
                self.error(range, "expression required here");
                TypeInfo::none()
            }
        };
        self.record_type(node, ty)
    }

    fn eval_identifier(&mut self, node: NodeId, name: &str, range: CodeRange) -> TypeInfo {
        if let Some(bound) = self.template_bindings.get(name).cloned() {
            return bound;
        }
        if let Some((scope, depth, index)) = self.scopes.find_var_scope(self.current_scope(), name) {
            self.record_ident(node, IdentResolution::LocalVar { depth, index });
            let ctx = self.current_ctx();
            return self.resolutions.var_type(ctx, scope, index).cloned().unwrap_or_else(TypeInfo::none);
        }
        if let Some(candidates) = self.functions_by_name.get(name).cloned() {
            if candidates.len() == 1 {
                let id = candidates[0];
                self.record_ident(node, IdentResolution::Function(id));
                let def = self.ast.function(id).clone();
                let params = self.function_signature_params(&def);
                return TypeInfo::function(id, params, false, def.is_member_func);
            }
            // Ambiguous without call-site argument types; `eval_call`
            // re-resolves the specific overload directly against the
            // callee identifier instead of relying on this type.
            self.record_ident(node, IdentResolution::Function(candidates[0]));
            return TypeInfo::none();
        }
        if let Some(builtin) = static_builtin_name(name) {
            self.record_ident(node, IdentResolution::BuiltinFunction(builtin));
            return TypeInfo::none();
        }
        if let Some(&class_id) = self.classes_by_name.get(name) {
            self.record_ident(node, IdentResolution::ClassName(class_id));
            return TypeInfo::instance(class_id, name.to_owned());
        }
        if let Some(&enum_id) = self.enums_by_name.get(name) {
            self.record_ident(node, IdentResolution::EnumName(enum_id));
            return TypeInfo::enumerator(enum_id, name.to_owned());
        }
        self.error(range, format!("`{name}` is not defined"));
        TypeInfo::none()
    }

    fn function_param_types(&mut self, def: &FunctionDef) -> Vec<TypeInfo> {
        def.args
            .iter()
            .map(|&arg| {
                if let NodeKind::Argument { type_expr, .. } = self.ast.node(arg).kind.clone() {
                    self.eval_type(type_expr)
                } else {
                    TypeInfo::none()
                }
            })
            .collect()
    }

    /// A `Function` `TypeInfo`'s `params` is `[return_type, arg1, arg2, …]`,
    /// used wherever a function name or call-via-functor
    /// value needs its full signature (not just its formal argument types).
    fn function_signature_params(&mut self, def: &FunctionDef) -> Vec<TypeInfo> {
        let ret = def.return_type.map(|t| self.eval_type(t)).unwrap_or_else(TypeInfo::none);
        let mut params = vec![ret];
        params.extend(self.function_param_types(def));
        params
    }

    fn eval_scope_resol(&mut self, node: NodeId, base: NodeId, name: &str, range: CodeRange) -> TypeInfo {
        let NodeKind::Identifier(base_name) = self.ast.node(base).kind.clone() else {
            self.error(range, "scope resolution requires a name on the left");
            return TypeInfo::none();
        };
        if let Some(&enum_id) = self.enums_by_name.get(&base_name) {
            let variants = self.ast.enum_def(enum_id).variants.clone();
            if let Some(index) = variants.iter().position(|v| v == name) {
                self.record_ident(node, IdentResolution::EnumVariant { enum_id, variant: index });
                return TypeInfo::enumerator(enum_id, base_name);
            }
            self.error(range, format!("enum `{base_name}` has no variant `{name}`"));
            return TypeInfo::none();
        }
        self.error(range, format!("`{base_name}` does not define a member `{name}`"));
        TypeInfo::none()
    }

    fn eval_member_access(&mut self, node: NodeId, base: NodeId, name: &str, range: CodeRange) -> TypeInfo {
        let base_ty = self.eval_type(base);
        match base_ty.kind {
            TypeKind::Instance => {
                let Some(class_id) = base_ty.class else {
                    self.error(range, "instance type missing its class handle");
                    return TypeInfo::none();
                };
                let def = self.ast.class(class_id).clone();
                if let Some(index) = def.members.iter().position(|&m| {
                    matches!(&self.ast.node(m).kind, NodeKind::VarDef { name: n, .. } if n == name)
                }) {
                    self.record_member(node, MemberResolution::MemberVariable { index });
                    let member_node = def.members[index];
                    let NodeKind::VarDef { type_expr: Some(t), .. } = self.ast.node(member_node).kind.clone() else {
                        return TypeInfo::none();
                    };
                    return self.eval_type(t);
                }
                if let Some(&method_id) = def.methods.iter().find(|&&m| self.ast.function(m).name == name) {
                    self.record_member(node, MemberResolution::MemberFunction(method_id));
                    let method_def = self.ast.function(method_id).clone();
                    let params = self.function_signature_params(&method_def);
                    return TypeInfo::function(method_id, params, false, true);
                }
                self.error(range, format!("`{}` has no member `{name}`", def.name));
                TypeInfo::none()
            }
            TypeKind::Vector | TypeKind::String => {
                let sig = match base_ty.kind {
                    TypeKind::Vector => builtins::vector_member_signature(base_ty.element_type(), name),
                    _ => builtins::string_member_signature(name),
                };
                match sig {
                    Some(sig) => {
                        let builtin_name = builtins::member_builtin_name(name).unwrap_or("push");
                        self.record_member(node, MemberResolution::BuiltinMemberFunction(builtin_name));
                        let mut params = vec![sig.ret.clone()];
                        params.extend(sig.params);
                        TypeInfo::function(FunctionId(u32::MAX), params, sig.variadic, true)
                    }
                    None => {
                        self.error(range, format!("{base_ty} has no member `{name}`"));
                        TypeInfo::none()
                    }
                }
            }
            TypeKind::Enumerator => {
                self.error(range, "member access on an enumerator is not yet supported");
                TypeInfo::none()
            }
            _ => {
                self.error(range, format!("{base_ty} has no member `{name}`"));
                TypeInfo::none()
            }
        }
    }

    fn eval_array(&mut self, elements: &[NodeId], range: CodeRange) -> TypeInfo {
        let Some((&first, rest)) = elements.split_first() else {
            self.error(range, "empty array literal needs an explicit element type");
            return TypeInfo::vector(TypeInfo::none());
        };
        let first_ty = self.eval_type(first);
        for &el in rest {
            let el_ty = self.eval_type(el);
            if !el_ty.type_equal(&first_ty) {
                self.error(
                    self.ast.node(el).range,
                    format!("array element type {el_ty} does not match {first_ty}"),
                );
            }
        }
        TypeInfo::vector(first_ty)
    }

    fn eval_index(&mut self, base: NodeId, index: NodeId, range: CodeRange) -> TypeInfo {
        let base_ty = self.eval_type(base);
        let index_ty = self.eval_type(index);
        match base_ty.kind {
            TypeKind::Vector => {
                if index_ty.kind != TypeKind::Int {
                    self.error(range, format!("vector index must be int, found {index_ty}"));
                }
                base_ty.element_type().clone()
            }
            TypeKind::Dict => {
                if !index_ty.type_equal(base_ty.dict_key_type()) {
                    self.error(range, format!("dict key type mismatch: expected {}, found {index_ty}", base_ty.dict_key_type()));
                }
                base_ty.dict_value_type().clone()
            }
            TypeKind::Tuple => {
                if index_ty.kind != TypeKind::Int {
                    self.error(range, "tuple index must be a constant int");
                }
                base_ty.params.first().cloned().unwrap_or_else(TypeInfo::none)
            }
            _ => {
                self.error(range, format!("{base_ty} is not indexable"));
                TypeInfo::none()
            }
        }
    }

    fn eval_binary(&mut self, op: BinOp, lhs: NodeId, rhs: NodeId, range: CodeRange) -> TypeInfo {
        let lhs_ty = self.eval_type(lhs);
        let rhs_ty = self.eval_type(rhs);
        match op {
            BinOp::LogAnd | BinOp::LogOr => {
                self.error(range, "logical `&&`/`||` are not yet implemented");
                TypeInfo::none()
            }
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq | BinOp::Eq | BinOp::NotEq => {
                if !lhs_ty.type_equal(&rhs_ty) && !(lhs_ty.is_numeric() && rhs_ty.is_numeric()) {
                    self.error(range, format!("cannot compare {lhs_ty} with {rhs_ty}"));
                }
                TypeInfo::boolean()
            }
            BinOp::Add if lhs_ty.kind == TypeKind::Vector => {
                if !lhs_ty.element_type().type_equal(&rhs_ty) {
                    self.error(range, format!("cannot append {rhs_ty} to {lhs_ty}"));
                }
                lhs_ty
            }
            BinOp::Add if lhs_ty.kind == TypeKind::String || rhs_ty.kind == TypeKind::String => {
                if lhs_ty.kind != TypeKind::String || rhs_ty.kind != TypeKind::String {
                    self.error(range, format!("cannot add {lhs_ty} and {rhs_ty}"));
                }
                TypeInfo::string()
            }
            BinOp::Mul if lhs_ty.kind == TypeKind::String && rhs_ty.kind == TypeKind::Int => TypeInfo::string(),
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                if !lhs_ty.is_numeric() || !rhs_ty.is_numeric() {
                    self.error(range, format!("arithmetic requires numeric operands, found {lhs_ty} and {rhs_ty}"));
                    return TypeInfo::none();
                }
                if lhs_ty.kind == TypeKind::Float || rhs_ty.kind == TypeKind::Float {
                    TypeInfo::float()
                } else {
                    TypeInfo::int()
                }
            }
            BinOp::LShift | BinOp::RShift => {
                if lhs_ty.kind != TypeKind::Int || rhs_ty.kind != TypeKind::Int {
                    self.error(range, "bit shifts require int operands");
                }
                TypeInfo::int()
            }
        }
    }

    fn eval_unary(&mut self, op: UnOp, operand: NodeId, range: CodeRange) -> TypeInfo {
        let ty = self.eval_type(operand);
        match op {
            UnOp::Not => {
                if ty.kind != TypeKind::Bool {
                    self.error(range, format!("`!` requires a bool operand, found {ty}"));
                }
                TypeInfo::boolean()
            }
            UnOp::Neg => {
                if !ty.is_numeric() {
                    self.error(range, format!("unary `-` requires a numeric operand, found {ty}"));
                }
                ty
            }
        }
    }

    fn eval_type_name(&mut self, name: &str, params: &[NodeId], range: CodeRange) -> TypeInfo {
        if let Some(bound) = self.template_bindings.get(name).cloned() {
            return bound;
        }
        let kind = match name {
            "none" => TypeKind::None,
            "int" => TypeKind::Int,
            "float" => TypeKind::Float,
            "bool" => TypeKind::Bool,
            "char" => TypeKind::Char,
            "string" => TypeKind::String,
            "vector" => TypeKind::Vector,
            "tuple" => TypeKind::Tuple,
            "dict" => TypeKind::Dict,
            _ => {
                if let Some(&class_id) = self.classes_by_name.get(name) {
                    return TypeInfo::instance(class_id, name.to_owned());
                }
                if let Some(&enum_id) = self.enums_by_name.get(name) {
                    return TypeInfo::enumerator(enum_id, name.to_owned());
                }
                self.error(range, format!("unknown type `{name}`"));
                return TypeInfo::none();
            }
        };
        if let Some(needed) = kind.needed_param_count()
            && needed != params.len()
        {
            self.error(range, format!("type `{name}` needs {needed} parameter(s), found {}", params.len()));
        }
        let param_types: Vec<TypeInfo> = params.iter().map(|&p| self.eval_type(p)).collect();
        TypeInfo {
            kind,
            params: param_types,
            ..TypeInfo::none()
        }
    }

    fn eval_call(&mut self, node: NodeId, callee: NodeId, template_args: &[NodeId], args: &[NodeId], range: CodeRange) -> TypeInfo {
        let arg_types: Vec<TypeInfo> = args.iter().map(|&a| self.eval_type(a)).collect();

        match self.ast.node(callee).kind.clone() {
            NodeKind::Identifier(name) => {
                // A bare name can be a local variable holding a callable
                // value (`let f = id; f(7);`) rather than a function/class
                // name; local variables take priority, matching
                // `eval_identifier`'s own lookup order.
                if let Some((scope, depth, index)) = self.scopes.find_var_scope(self.current_scope(), &name) {
                    self.record_ident(callee, IdentResolution::LocalVar { depth, index });
                    let ctx = self.current_ctx();
                    let fn_ty = self.resolutions.var_type(ctx, scope, index).cloned().unwrap_or_else(TypeInfo::none);
                    self.record_type(callee, fn_ty.clone());
                    return self.eval_call_via_functor(node, &fn_ty, &arg_types, range);
                }
                self.eval_call_by_name(node, &name, template_args, &arg_types, range)
            }
            NodeKind::MemberAccess { base, name } => {
                let base_ty = self.eval_type(base);
                self.eval_member_call(node, base, &base_ty, &name, &arg_types, range)
            }
            _ => {
                let callee_ty = self.eval_type(callee);
                self.eval_call_via_functor(node, &callee_ty, &arg_types, range)
            }
        }
    }

    /// Call-via-functor: handles a callee that
    /// is neither a name nor a member access but whose evaluated type is
    /// `Function` — e.g. calling through a local variable that holds a
    /// function value. Non-`Function` callees are rejected with "expected
    /// callable".
    fn eval_call_via_functor(&mut self, node: NodeId, callee_ty: &TypeInfo, arg_types: &[TypeInfo], range: CodeRange) -> TypeInfo {
        if callee_ty.kind != TypeKind::Function {
            self.error(range, "expected callable");
            return TypeInfo::none();
        }
        // `callee_ty.params` is `[return_type, arg1, arg2, …]`;
        // the formal argument list for matching is everything after
        // the return slot.
        let formals = &callee_ty.params[1..];
        self.check_arity(range, "<functor>", formals, callee_ty.is_free_args, arg_types.len());
        for (formal, actual) in formals.iter().zip(arg_types) {
            if !formal.type_equal(actual) {
                self.error(range, format!("functor argument type mismatch: expected {formal}, found {actual}"));
            }
        }
        // The sentinel id built-in member-function values carry (see
        // `eval_member_access`) has no backing `FunctionDef`; calling one as
        // a functor isn't supported, only calling it directly as `v.push(x)`.
        let Some(id) = callee_ty.function.filter(|id| id.0 != u32::MAX) else {
            self.error(range, "expected callable");
            return TypeInfo::none();
        };
        self.record_call(node, CallResolution::Functor(id));
        callee_ty.params.first().cloned().unwrap_or_else(TypeInfo::none)
    }

    fn eval_call_by_name(
        &mut self,
        node: NodeId,
        name: &str,
        template_args: &[NodeId],
        arg_types: &[TypeInfo],
        range: CodeRange,
    ) -> TypeInfo {
        if let Some(&class_id) = self.classes_by_name.get(name) {
            return self.eval_ctor(node, class_id, arg_types, range);
        }
        if let Some(sig) = builtins::free_function_signature(name) {
            if name == "len" {
                if arg_types.len() == 1 && builtins::accepts_len(&arg_types[0]) {
                    self.record_call(node, CallResolution::BuiltinFunction("len"));
                    return sig.ret;
                }
                self.error(range, "len() requires one iterable argument");
                return TypeInfo::none();
            }
            self.check_arity(range, name, &sig.params, sig.variadic, arg_types.len());
            self.record_call(node, CallResolution::BuiltinFunction(static_builtin_name(name).unwrap_or("print")));
            return sig.ret;
        }
        let Some(candidates) = self.functions_by_name.get(name).cloned() else {
            self.error(range, format!("`{name}` is not defined"));
            return TypeInfo::none();
        };
        self.resolve_overload(node, name, &candidates, template_args, arg_types, range)
    }

    fn eval_member_call(
        &mut self,
        node: NodeId,
        base: NodeId,
        base_ty: &TypeInfo,
        name: &str,
        arg_types: &[TypeInfo],
        range: CodeRange,
    ) -> TypeInfo {
        let _ = base;
        match base_ty.kind {
            TypeKind::Instance => {
                let Some(class_id) = base_ty.class else {
                    return TypeInfo::none();
                };
                let def = self.ast.class(class_id).clone();
                let Some(&method_id) = def.methods.iter().find(|&&m| self.ast.function(m).name == name) else {
                    self.error(range, format!("`{}` has no method `{name}`", def.name));
                    return TypeInfo::none();
                };
                let method_def = self.ast.function(method_id).clone();
                let params = self.function_param_types(&method_def);
                self.check_arity(range, name, &params, false, arg_types.len());
                self.record_call(node, CallResolution::MemberFunction(method_id));
                method_def.return_type.map(|t| self.eval_type(t)).unwrap_or_else(TypeInfo::none)
            }
            TypeKind::Vector | TypeKind::String => {
                let sig = match base_ty.kind {
                    TypeKind::Vector => builtins::vector_member_signature(base_ty.element_type(), name),
                    _ => builtins::string_member_signature(name),
                };
                match sig {
                    Some(sig) => {
                        self.check_arity(range, name, &sig.params, sig.variadic, arg_types.len());
                        let builtin_name = builtins::member_builtin_name(name).unwrap_or("push");
                        self.record_call(node, CallResolution::BuiltinMemberFunction(builtin_name));
                        sig.ret
                    }
                    None => {
                        self.error(range, format!("{base_ty} has no method `{name}`"));
                        TypeInfo::none()
                    }
                }
            }
            _ => {
                self.error(range, format!("{base_ty} has no method `{name}`"));
                TypeInfo::none()
            }
        }
    }

    fn check_arity(&mut self, range: CodeRange, name: &str, params: &[TypeInfo], variadic: bool, got: usize) {
        if variadic {
            return;
        }
        if params.len() != got {
            self.error(range, format!("`{name}` expects {} argument(s), found {got}", params.len()));
        }
    }

    fn eval_ctor(&mut self, node: NodeId, class_id: ClassId, arg_types: &[TypeInfo], range: CodeRange) -> TypeInfo {
        let def = self.ast.class(class_id).clone();
        let member_types: Vec<TypeInfo> = def
            .members
            .iter()
            .map(|&m| match self.ast.node(m).kind.clone() {
                NodeKind::VarDef { type_expr: Some(t), .. } => self.eval_type(t),
                _ => TypeInfo::none(),
            })
            .collect();
        if member_types.len() != arg_types.len() {
            self.error(
                range,
                format!("constructor for `{}` expects {} argument(s), found {}", def.name, member_types.len(), arg_types.len()),
            );
        } else {
            for (expected, got) in member_types.iter().zip(arg_types) {
                if !expected.type_equal(got) {
                    self.error(range, format!("constructor argument type mismatch: expected {expected}, found {got}"));
                }
            }
        }
        self.record_call(node, CallResolution::Constructor(class_id));
        TypeInfo::instance(class_id, def.name)
    }

    fn eval_ctor_call(&mut self, node: NodeId, class_name: NodeId, args: &[NodeId], range: CodeRange) -> TypeInfo {
        let NodeKind::Identifier(name) = self.ast.node(class_name).kind.clone() else {
            self.error(range, "constructor call requires a class name");
            return TypeInfo::none();
        };
        let arg_types: Vec<TypeInfo> = args.iter().map(|&a| self.eval_type(a)).collect();
        let Some(&class_id) = self.classes_by_name.get(&name) else {
            self.error(range, format!("`{name}` is not a class"));
            return TypeInfo::none();
        };
        self.eval_ctor(node, class_id, &arg_types, range)
    }

    /// Positional template-argument inference plus overload filtering,
    /// grounded in `SemaEvalType.cpp`'s `OverloadResolutionGuide`/`Identifier`
    /// handling: candidates are filtered by arity and (for generics) by
    /// whether the call's concrete argument types can be paired against the
    /// formal parameter type expressions to produce a consistent
    /// substitution. Ambiguity after filtering is an error with one note per
    /// remaining candidate.
    fn resolve_overload(
        &mut self,
        node: NodeId,
        name: &str,
        candidates: &[FunctionId],
        template_args: &[NodeId],
        arg_types: &[TypeInfo],
        range: CodeRange,
    ) -> TypeInfo {
        let mut matches = Vec::new();
        for &id in candidates {
            let def = self.ast.function(id).clone();
            if def.args.len() != arg_types.len() {
                continue;
            }
            if def.template_params.is_empty() {
                let params = self.function_param_types(&def);
                if params.iter().zip(arg_types).all(|(p, a)| p.type_equal(a)) {
                    matches.push((id, None));
                }
            } else if let Some(bindings) = self.infer_template_bindings(&def, arg_types, template_args) {
                matches.push((id, Some(bindings)));
            }
        }

        match matches.len() {
            0 => {
                self.error(range, format!("no overload of `{name}` matches the given arguments"));
                TypeInfo::none()
            }
            1 => {
                let (id, bindings) = matches.into_iter().next().unwrap();
                if let Some(bindings) = bindings {
                    let template_types: Vec<TypeInfo> = {
                        let def = self.ast.function(id).clone();
                        def.template_params.iter().map(|p| bindings.get(p).cloned().unwrap_or_else(TypeInfo::none)).collect()
                    };
                    let instantiated = self.request_instantiation(id, template_types, node);
                    self.record_call(node, CallResolution::Function(instantiated));
                    let def = self.ast.function(instantiated).clone();
                    def.return_type.map(|t| self.eval_type(t)).unwrap_or_else(TypeInfo::none)
                } else {
                    self.record_call(node, CallResolution::Function(id));
                    let def = self.ast.function(id).clone();
                    def.return_type.map(|t| self.eval_type(t)).unwrap_or_else(TypeInfo::none)
                }
            }
            _ => {
                let mut diag = Diagnostic::error(range, format!("call to `{name}` is ambiguous"));
                for (id, _) in &matches {
                    diag = diag.with_note(Diagnostic::error(self.ast.node(self.function_decl_node(*id)).range, "candidate here"));
                }
                self.sink.emit(diag);
                TypeInfo::none()
            }
        }
    }

    /// Pairs each formal argument's type *expression* against the concrete
    /// argument type to infer a binding for every template parameter,
    /// rejecting the candidate if two arguments would bind the same
    /// template parameter to different concrete types.
    fn infer_template_bindings(
        &mut self,
        def: &FunctionDef,
        arg_types: &[TypeInfo],
        explicit_template_args: &[NodeId],
    ) -> Option<AHashMap<String, TypeInfo>> {
        let mut bindings = AHashMap::new();
        if !explicit_template_args.is_empty() {
            if explicit_template_args.len() != def.template_params.len() {
                return None;
            }
            for (param, &arg_node) in def.template_params.iter().zip(explicit_template_args) {
                bindings.insert(param.clone(), self.eval_type(arg_node));
            }
            return Some(bindings);
        }
        for (&arg_node, arg_ty) in def.args.iter().zip(arg_types) {
            let NodeKind::Argument { type_expr, .. } = self.ast.node(arg_node).kind.clone() else {
                continue;
            };
            self.pair_template_param(type_expr, arg_ty, &def.template_params, &mut bindings)?;
        }
        if bindings.len() == def.template_params.len() {
            Some(bindings)
        } else {
            None
        }
    }

    fn pair_template_param(
        &mut self,
        type_expr: NodeId,
        concrete: &TypeInfo,
        template_params: &[String],
        bindings: &mut AHashMap<String, TypeInfo>,
    ) -> Option<()> {
        let NodeKind::TypeName { name, params } = self.ast.node(type_expr).kind.clone() else {
            return Some(());
        };
        if template_params.contains(&name) {
            if let Some(existing) = bindings.get(&name) {
                return if existing.type_equal(concrete) { Some(()) } else { None };
            }
            bindings.insert(name, concrete.clone());
            return Some(());
        }
        // e.g. `vector<T>` paired against a concrete `vector<int>`.
        if let Some(inner) = concrete.params.first() {
            if let Some(&param_expr) = params.first() {
                return self.pair_template_param(param_expr, inner, template_params, bindings);
            }
        }
        Some(())
    }

    fn request_instantiation(&mut self, template: FunctionId, template_types: Vec<TypeInfo>, call_node: NodeId) -> FunctionId {
        if let Some(&existing) = self.instantiation_cache.get(&(template, template_types.clone())) {
            return existing;
        }
        let def = self.ast.function(template).clone();
        let instantiated = FunctionDef {
            template_params: Vec::new(),
            instantiated_from: Some(template),
            ..def
        };
        let id = self.ast.push_function(instantiated);
        self.instantiation_cache.insert((template, template_types.clone()), id);
        self.instantiation_queue.push_back(InstantiationRequest {
            template,
            template_args: template_types,
            call_ctx: self.current_ctx(),
            call_node,
        });
        id
    }

    fn drain_instantiation(&mut self, request: InstantiationRequest) {
        let Some(&instantiated) = self
            .instantiation_cache
            .get(&(request.template, request.template_args.clone()))
        else {
            return;
        };
        let def = self.ast.function(request.template).clone();
        let saved_bindings = std::mem::take(&mut self.template_bindings);
        for (param, ty) in def.template_params.iter().zip(&request.template_args) {
            self.template_bindings.insert(param.clone(), ty.clone());
        }
        let saved_scope_stack = std::mem::take(&mut self.scope_stack);
        let location = self.scopes.location_of(self.global_scope);
        self.scope_stack = location;

        let bindings = def
            .template_params
            .iter()
            .zip(&request.template_args)
            .map(|(p, t)| format!("{p}={t}"))
            .collect::<Vec<_>>()
            .join(", ");
        let args = match self.ast.node(request.call_node).kind.clone() {
            NodeKind::CallFunc { args, .. } => args
                .iter()
                .map(|&a| {
                    self.resolutions
                        .expr_type(request.call_ctx, a)
                        .cloned()
                        .unwrap_or_else(TypeInfo::none)
                        .to_string()
                })
                .collect::<Vec<_>>()
                .join(", "),
            _ => String::new(),
        };
        let signature = format!("{}@<{bindings}>({args})", def.name);
        let call_range = self.ast.node(request.call_node).range;

        let mark = self.sink.len();
        self.check_function_body(instantiated, &def, def.owner_class);
        let note = Diagnostic::error(call_range, format!("in instantiation of '{signature}'"));
        self.sink.annotate_since(mark, &note);

        self.scope_stack = saved_scope_stack;
        self.template_bindings = saved_bindings;
    }
}

/// Recursively collects every `Return` node reachable from `node` without
/// descending into nested function declarations (there are none at
/// statement-checking depth, since nested `fn` is out of scope —
/// functions are only declared at the top level or as class
/// methods).
fn collect_returns(ast: &Ast, node: NodeId, out: &mut Vec<NodeId>) {
    match &ast.node(node).kind {
        NodeKind::Return(_) => out.push(node),
        NodeKind::Block(stmts) => {
            for &stmt in stmts {
                collect_returns(ast, stmt, out);
            }
        }
        NodeKind::If {
            then_block,
            else_block,
            ..
        } => {
            collect_returns(ast, *then_block, out);
            if let Some(else_block) = else_block {
                collect_returns(ast, *else_block, out);
            }
        }
        NodeKind::While { body, .. } | NodeKind::For { body, .. } => collect_returns(ast, *body, out),
        NodeKind::TryCatch { try_block, catches } => {
            collect_returns(ast, *try_block, out);
            for clause in catches {
                collect_returns(ast, clause.body, out);
            }
        }
        _ => {}
    }
}

fn static_builtin_name(name: &str) -> Option<&'static str> {
    match name {
        "print" => Some("print"),
        "len" => Some("len"),
        "int" => Some("int"),
        "float" => Some("float"),
        "str" => Some("str"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_sema<'a>(ast: &'a mut Ast, scopes: &'a mut ScopeTree, sink: &'a mut DiagnosticSink) -> Sema<'a> {
        let global_scope = scopes.build_program(ast, &ast.top_level.clone());
        Sema {
            ast,
            scopes,
            sink,
            resolutions: Resolutions::default(),
            functions_by_name: AHashMap::new(),
            classes_by_name: AHashMap::new(),
            enums_by_name: AHashMap::new(),
            global_scope,
            scope_stack: Vec::new(),
            ctx_stack: Vec::new(),
            loop_depth: 0,
            current_class: None,
            template_bindings: AHashMap::new(),
            instantiation_queue: VecDeque::new(),
            instantiation_cache: AHashMap::new(),
            recursion: RecursionGuard::default(),
            depth: 0,
        }
    }

    fn find_function(ast: &Ast, name: &str) -> FunctionDef {
        for &node in &ast.top_level {
            if let NodeKind::Function(id) = ast.node(node).kind.clone() {
                if ast.function(id).name == name {
                    return ast.function(id).clone();
                }
            }
        }
        panic!("function `{name}` not found");
    }

    #[test]
    fn check_arity_accepts_exact_match_and_rejects_mismatch() {
        let mut ast = Ast::new();
        let mut scopes = ScopeTree::new();
        let mut sink = DiagnosticSink::new();
        let mut sema = make_sema(&mut ast, &mut scopes, &mut sink);
        let params = vec![TypeInfo::int(), TypeInfo::string()];
        sema.check_arity(CodeRange::default(), "f", &params, false, 2);
        sema.check_arity(CodeRange::default(), "f", &params, false, 1);
        assert_eq!(sink.diagnostics().len(), 1);
        assert!(sink.diagnostics()[0].message.contains("expects 2 argument"));
    }

    #[test]
    fn check_arity_skips_variadic_functions_regardless_of_count() {
        let mut ast = Ast::new();
        let mut scopes = ScopeTree::new();
        let mut sink = DiagnosticSink::new();
        let mut sema = make_sema(&mut ast, &mut scopes, &mut sink);
        sema.check_arity(CodeRange::default(), "f", &[TypeInfo::int()], true, 0);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn infer_template_bindings_pins_each_type_parameter_from_its_argument() {
        let mut ast = crate::syntax::parse("fn pair<T>(x: T, y: T) -> T { return x; }").unwrap();
        let def = find_function(&ast, "pair");
        let mut scopes = ScopeTree::new();
        let mut sink = DiagnosticSink::new();
        let mut sema = make_sema(&mut ast, &mut scopes, &mut sink);
        let bindings = sema
            .infer_template_bindings(&def, &[TypeInfo::int(), TypeInfo::int()], &[])
            .expect("consistent argument types should bind");
        assert_eq!(bindings.get("T"), Some(&TypeInfo::int()));
    }

    #[test]
    fn infer_template_bindings_rejects_inconsistent_argument_types() {
        let mut ast = crate::syntax::parse("fn pair<T>(x: T, y: T) -> T { return x; }").unwrap();
        let def = find_function(&ast, "pair");
        let mut scopes = ScopeTree::new();
        let mut sink = DiagnosticSink::new();
        let mut sema = make_sema(&mut ast, &mut scopes, &mut sink);
        let bindings = sema.infer_template_bindings(&def, &[TypeInfo::int(), TypeInfo::string()], &[]);
        assert!(bindings.is_none());
    }

    #[test]
    fn resolve_overload_picks_the_arity_matching_candidate() {
        let mut ast = crate::syntax::parse(
            "
            fn f(x: int) -> int { return x; }
            fn f(x: int, y: int) -> int { return x + y; }
            ",
        )
        .unwrap();
        let ids: Vec<FunctionId> = ast
            .top_level
            .iter()
            .filter_map(|&n| match ast.node(n).kind.clone() {
                NodeKind::Function(id) if ast.function(id).name == "f" => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(ids.len(), 2);
        let mut scopes = ScopeTree::new();
        let mut sink = DiagnosticSink::new();
        let mut sema = make_sema(&mut ast, &mut scopes, &mut sink);
        let call_node = sema.ast.push_node(CodeRange::default(), NodeKind::Value(Literal::Int(0)));
        let ret = sema.resolve_overload(call_node, "f", &ids, &[], &[TypeInfo::int()], CodeRange::default());
        assert!(sink.diagnostics().is_empty());
        assert_eq!(ret, TypeInfo::int());
    }
}
