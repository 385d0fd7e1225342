//! The tree-walking evaluator: executes a Sema-checked AST directly against
//! a stack of call/variable frames.
//!
//! A frame stack indexed by distance-from-top (`push_stack`/`pop_stack`/
//! `get_stack(distance)`), an `evaluate()` dispatch over every AST kind, and
//! an `eval_expr()` operator dispatch where division/modulo by zero is the
//! only runtime fault. `Frames` (a `Vec<Frame>` indexed by position) is
//! paired with `Evaluator`, which owns the frame stack and the loop/call
//! control markers, and dispatches one AST node at a time.

use crate::{
    ast::{Ast, BinOp, Literal, NodeId, NodeKind, UnOp},
    builtins,
    diagnostics::RuntimeError,
    io::PrintWriter,
    object::{Callable, DictKey, Instance, Object},
    resource::RecursionGuard,
    sema::{CallResolution, IdentResolution, MemberResolution, Resolutions},
};

/// One activation: the runtime counterpart of a `scope::Scope`. Slot `i`
/// here corresponds to `scope::LocalVar` slot `i` in the scope that was
/// built for this block/function.
#[derive(Debug, Default)]
struct Frame {
    slots: Vec<Object>,
}

/// The live call/block stack, indexed from the top down exactly like the
/// original's `get_stack(distance)`.
#[derive(Debug, Default)]
struct Frames(Vec<Frame>);

impl Frames {
    fn push(&mut self) {
        self.0.push(Frame::default());
    }

    fn pop(&mut self) {
        self.0.pop();
    }

    fn get(&self, depth: u32, index: usize) -> &Object {
        let frame = &self.0[self.0.len() - 1 - depth as usize];
        &frame.slots[index]
    }

    fn set(&mut self, depth: u32, index: usize, value: Object) {
        let len = self.0.len();
        let frame = &mut self.0[len - 1 - depth as usize];
        if index >= frame.slots.len() {
            frame.slots.resize(index + 1, Object::None);
        }
        frame.slots[index] = value;
    }
}

/// Non-local control flow unwinding out of a statement: `return`, `break`,
/// `continue`, a user-level `throw` (catchable by `try`/`catch`), or a
/// `Fault` (division/modulo by zero, the recursion limit) that no `catch`
/// clause can intercept. Mirrors the original's frame-flag based unwinding,
/// translated into Rust's `?`-propagated `Result`/enum idiom instead of
/// mutable flags checked after every statement.
#[derive(Debug)]
enum Flow {
    Return(Object),
    Break,
    Continue,
    Throw(Object),
    Fault(RuntimeError),
}

type StmtResult = Result<(), Flow>;
type ExprResult = Result<Object, Flow>;

pub struct Evaluator<'a, W: PrintWriter> {
    ast: &'a Ast,
    resolutions: &'a Resolutions,
    writer: &'a mut W,
    frames: Frames,
    recursion: RecursionGuard,
    depth: usize,
    /// The `FunctionId` context of the function body currently executing;
    /// `None` at top level. Used to key lookups into `Resolutions`, which
    /// are recorded per-instantiation (see `sema`'s module doc).
    ctx: Option<crate::ast::FunctionId>,
}

impl<'a, W: PrintWriter> Evaluator<'a, W> {
    #[must_use]
    pub fn new(ast: &'a Ast, resolutions: &'a Resolutions, writer: &'a mut W, recursion: RecursionGuard) -> Self {
        Self {
            ast,
            resolutions,
            writer,
            frames: Frames::default(),
            recursion,
            depth: 0,
            ctx: None,
        }
    }

    /// Runs every top-level statement of `program` in order, returning the
    /// value of the last expression statement (or `Object::None` if the
    /// program ends on something else), matching end-to-end scenarios that
    /// evaluate `fn f(...) {...} f(21)` to `42`. A `throw` that escapes
    /// every `try`/`catch` simply ends the
    /// program with the thrown value, since Ember has no top-level exception
    /// reporting channel beyond `Runner`'s diagnostics; a `Fault` (division
    /// by zero, recursion limit) is the only condition that surfaces as an
    /// `Err`.
    pub fn run(&mut self, top_level: &[NodeId]) -> Result<Object, RuntimeError> {
        self.frames.push();
        let mut last = Object::None;
        for &stmt in top_level {
            let result = if let NodeKind::ExprStmt(expr) = self.ast.node(stmt).kind {
                self.eval(expr).map(|value| last = value)
            } else {
                self.exec(stmt)
            };
            match result {
                Ok(()) => {}
                Err(Flow::Return(_) | Flow::Break | Flow::Continue) => break,
                Err(Flow::Throw(value)) => {
                    self.frames.pop();
                    return Ok(value);
                }
                Err(Flow::Fault(err)) => {
                    self.frames.pop();
                    return Err(err);
                }
            }
        }
        self.frames.pop();
        Ok(last)
    }

    fn exec(&mut self, node: NodeId) -> StmtResult {
        match self.ast.node(node).kind.clone() {
            NodeKind::Function(_) | NodeKind::Class(_) | NodeKind::Enum(_) => Ok(()),
            NodeKind::Block(stmts) => {
                self.frames.push();
                let result = self.exec_all(&stmts);
                self.frames.pop();
                result
            }
            NodeKind::VarDef { init, .. } => {
                let value = match init {
                    Some(init) => self.eval(init)?,
                    None => Object::None,
                };
                self.frames.set(0, self.next_local_slot(node), value);
                Ok(())
            }
            NodeKind::If {
                cond,
                then_block,
                else_block,
            } => {
                if self.eval(cond)?.truthy() {
                    self.exec(then_block)
                } else if let Some(else_block) = else_block {
                    self.exec(else_block)
                } else {
                    Ok(())
                }
            }
            NodeKind::While { cond, body } => {
                while self.eval(cond)?.truthy() {
                    match self.exec(body) {
                        Err(Flow::Break) => break,
                        Err(Flow::Continue) | Ok(()) => {}
                        other => return other,
                    }
                }
                Ok(())
            }
            NodeKind::For { iterable, body, .. } => self.exec_for(node, iterable, body),
            NodeKind::TryCatch { try_block, catches } => match self.exec(try_block) {
                Err(Flow::Throw(value)) => {
                    for clause in &catches {
                        // A real exception-type hierarchy is out of scope;
                        // catches are tried in declaration order and the
                        // first one runs.
                        let _ = clause.exc_type;
                        self.frames.push();
                        if clause.binding.is_some() {
                            self.frames.set(0, 0, value.clone());
                        }
                        let result = if let NodeKind::Block(stmts) = &self.ast.node(clause.body).kind {
                            self.exec_all(&stmts.clone())
                        } else {
                            Ok(())
                        };
                        self.frames.pop();
                        return result;
                    }
                    Err(Flow::Throw(value))
                }
                other => other,
            },
            NodeKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(value)?,
                    None => Object::None,
                };
                Err(Flow::Return(value))
            }
            NodeKind::Break => Err(Flow::Break),
            NodeKind::Continue => Err(Flow::Continue),
            NodeKind::Throw(value) => {
                let value = self.eval(value)?;
                Err(Flow::Throw(value))
            }
            NodeKind::ExprStmt(expr) => {
                self.eval(expr)?;
                Ok(())
            }
            NodeKind::Assign { target, value } => {
                let value = self.eval(value)?;
                self.assign(target, value)
            }
            _ => Ok(()),
        }
    }

    fn exec_all(&mut self, stmts: &[NodeId]) -> StmtResult {
        for &stmt in stmts {
            self.exec(stmt)?;
        }
        Ok(())
    }

    fn exec_for(&mut self, node: NodeId, iterable: NodeId, body: NodeId) -> StmtResult {
        let iterable = self.eval(iterable)?;
        let items: Vec<Object> = match &iterable {
            Object::Vector(v) => v.borrow().clone(),
            Object::String(s) => s.borrow().chars().map(Object::Char).collect(),
            _ => Vec::new(),
        };
        for item in items {
            self.frames.push();
            self.frames.set(0, 0, item);
            let result = if let NodeKind::Block(stmts) = &self.ast.node(body).kind {
                self.exec_all(&stmts.clone())
            } else {
                Ok(())
            };
            self.frames.pop();
            match result {
                Err(Flow::Break) => break,
                Err(Flow::Continue) | Ok(()) => {}
                other => {
                    let _ = node;
                    return other;
                }
            }
        }
        Ok(())
    }

    /// Finds the slot a `VarDef`/for-loop-variable node was assigned by
    /// Sema. Since the evaluator trusts a fully checked program, this is a
    /// linear scan over the current frame rather than a scope-tree lookup
    /// (the frame doesn't know variable names at all, only slots) — slot
    /// assignment order matches declaration order 1:1, so the Nth `VarDef`
    /// executed in a block is always slot N.
    fn next_local_slot(&self, _node: NodeId) -> usize {
        self.frames.0.last().map_or(0, |f| f.slots.len())
    }

    fn assign(&mut self, target: NodeId, value: Object) -> StmtResult {
        match self.ast.node(target).kind.clone() {
            NodeKind::Identifier(_) => {
                if let Some(IdentResolution::LocalVar { depth, index }) = self.resolutions.ident(self.ctx, target) {
                    self.frames.set(depth, index, value);
                }
                Ok(())
            }
            NodeKind::MemberAccess { base, .. } => {
                let base_val = self.eval(base)?;
                if let (Object::Instance(inst), Some(MemberResolution::MemberVariable { index })) =
                    (&base_val, self.resolutions.member(self.ctx, target))
                {
                    let mut inst = inst.borrow_mut();
                    if index >= inst.members.len() {
                        inst.members.resize(index + 1, Object::None);
                    }
                    inst.members[index] = value;
                }
                Ok(())
            }
            NodeKind::IndexRef { base, index } => {
                let base_val = self.eval(base)?;
                let index_val = self.eval(index)?;
                match (&base_val, &index_val) {
                    (Object::Vector(v), Object::Int(i)) => {
                        let i = usize::try_from(*i).unwrap_or(usize::MAX);
                        let mut v = v.borrow_mut();
                        if i < v.len() {
                            v[i] = value;
                        }
                    }
                    (Object::Dict(d), key) => {
                        if let Ok(key) = DictKey::try_from(key) {
                            d.borrow_mut().insert(key, value);
                        }
                    }
                    _ => {}
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Expression evaluation. Grounded in `Evaluator.cpp`'s `evaluate()`/
    /// `eval_expr()` dispatch.
    fn eval(&mut self, node: NodeId) -> ExprResult {
        match self.ast.node(node).kind.clone() {
            NodeKind::Value(lit) => Ok(literal_to_object(&lit)),
            NodeKind::Identifier(_) => self.eval_identifier(node),
            NodeKind::ScopeResol { .. } => self.eval_scope_resol(node),
            NodeKind::MemberAccess { base, .. } => self.eval_member_access(node, base),
            NodeKind::Array(elements) => {
                let items = elements.iter().map(|&e| self.eval(e)).collect::<Result<_, _>>()?;
                Ok(Object::vector(items))
            }
            NodeKind::TupleLit(elements) => {
                let items = elements.iter().map(|&e| self.eval(e)).collect::<Result<_, _>>()?;
                Ok(Object::tuple(items))
            }
            NodeKind::IndexRef { base, index } => self.eval_index(base, index),
            NodeKind::CallFunc { callee, args, .. } => self.eval_call(node, callee, &args),
            NodeKind::CallFuncCtor { class_name: _, args } => self.eval_ctor_call(node, &args),
            NodeKind::BinaryOp { op, lhs, rhs } => self.eval_binary(node, op, lhs, rhs),
            NodeKind::UnaryOp { op, operand } => self.eval_unary(op, operand),
            NodeKind::Assign { target, value } => {
                let value = self.eval(value)?;
                self.assign(target, value.clone())?;
                Ok(value)
            }
            _ => Ok(Object::None),
        }
    }

    fn eval_identifier(&mut self, node: NodeId) -> ExprResult {
        match self.resolutions.ident(self.ctx, node) {
            Some(IdentResolution::LocalVar { depth, index }) => Ok(self.frames.get(depth, index).clone()),
            Some(IdentResolution::Function(id)) => Ok(Object::Function(Callable::Function(id))),
            Some(IdentResolution::BuiltinFunction(name)) => Ok(Object::Function(Callable::Builtin(name))),
            Some(IdentResolution::EnumVariant { enum_id, variant }) => Ok(self.make_enumerator(enum_id, variant)),
            _ => Ok(Object::None),
        }
    }

    fn eval_scope_resol(&mut self, node: NodeId) -> ExprResult {
        if let Some(IdentResolution::EnumVariant { enum_id, variant }) = self.resolutions.ident(self.ctx, node) {
            return Ok(self.make_enumerator(enum_id, variant));
        }
        Ok(Object::None)
    }

    fn make_enumerator(&self, enum_id: crate::ast::EnumId, variant: usize) -> Object {
        let name: std::rc::Rc<str> = self.ast.enum_def(enum_id).variants[variant].as_str().into();
        Object::Enumerator { id: enum_id, variant, name }
    }

    fn eval_member_access(&mut self, node: NodeId, base: NodeId) -> ExprResult {
        let base_val = self.eval(base)?;
        match (&base_val, self.resolutions.member(self.ctx, node)) {
            (Object::Instance(inst), Some(MemberResolution::MemberVariable { index })) => {
                Ok(inst.borrow().members[index].clone())
            }
            (Object::Instance(inst), Some(MemberResolution::MemberFunction(id))) => {
                Ok(Object::Function(Callable::BoundMethod {
                    receiver: inst.clone(),
                    function: id,
                }))
            }
            // A builtin method referenced but not immediately called (e.g.
            // passed as a value rather than written `v.push(x)`) has no
            // receiver-carrying `Callable` shape to bind to; Ember programs
            // only ever use builtin members in direct-call position, so this
            // just yields the unbound builtin.
            (_, Some(MemberResolution::BuiltinMemberFunction(name))) => Ok(Object::Function(Callable::Builtin(name))),
            _ => Ok(Object::None),
        }
    }

    fn eval_index(&mut self, base: NodeId, index: NodeId) -> ExprResult {
        let base_val = self.eval(base)?;
        let index_val = self.eval(index)?;
        match (&base_val, &index_val) {
            (Object::Vector(v), Object::Int(i)) => {
                let i = usize::try_from(*i).unwrap_or(usize::MAX);
                Ok(v.borrow().get(i).cloned().unwrap_or(Object::None))
            }
            (Object::Tuple(t), Object::Int(i)) => {
                let i = usize::try_from(*i).unwrap_or(usize::MAX);
                Ok(t.get(i).cloned().unwrap_or(Object::None))
            }
            (Object::Dict(d), key) => {
                let key = DictKey::try_from(key).unwrap_or(DictKey::Int(0));
                Ok(d.borrow().get(&key).cloned().unwrap_or(Object::None))
            }
            (Object::String(s), Object::Int(i)) => {
                let i = usize::try_from(*i).unwrap_or(usize::MAX);
                Ok(s.borrow().chars().nth(i).map_or(Object::None, Object::Char))
            }
            _ => Ok(Object::None),
        }
    }

    fn eval_call(&mut self, node: NodeId, callee: NodeId, args: &[NodeId]) -> ExprResult {
        let values: Vec<Object> = args.iter().map(|&a| self.eval(a)).collect::<Result<_, _>>()?;
        match self.resolutions.call(self.ctx, node) {
            Some(CallResolution::Function(id)) => self.call_function(id, values, None),
            Some(CallResolution::BuiltinFunction(name)) => Ok(builtins::call_free_function(name, &values, &mut *self.writer)),
            Some(CallResolution::Constructor(class_id)) => Ok(self.construct(class_id, values)),
            Some(CallResolution::MemberFunction(id)) => self.eval_member_call(callee, id, values),
            Some(CallResolution::BuiltinMemberFunction(name)) => self.eval_builtin_member_call(callee, name, &values),
            Some(CallResolution::Functor(id)) => self.call_function(id, values, None),
            None => Ok(Object::None),
        }
    }

    /// Member calls written as `obj.method(args)` are parsed as a `CallFunc`
    /// whose callee is the `MemberAccess` node; Sema resolves the call
    /// itself (recorded against the outer `CallFunc` node, not the
    /// `MemberAccess` callee, since the callee is never independently
    /// type-evaluated in call position), so the method id comes from the
    /// caller and only the receiver still needs evaluating here.
    fn eval_member_call(&mut self, callee: NodeId, id: crate::ast::FunctionId, values: Vec<Object>) -> ExprResult {
        let NodeKind::MemberAccess { base, name: _ } = self.ast.node(callee).kind.clone() else {
            return Ok(Object::None);
        };
        match self.eval(base)? {
            Object::Instance(inst) => self.call_function(id, values, Some(inst)),
            _ => Ok(Object::None),
        }
    }

    fn eval_builtin_member_call(&mut self, callee: NodeId, name: &'static str, values: &[Object]) -> ExprResult {
        let NodeKind::MemberAccess { base, name: _ } = self.ast.node(callee).kind.clone() else {
            return Ok(Object::None);
        };
        let receiver = self.eval(base)?;
        Ok(builtins::call_member_builtin(&receiver, name, values))
    }

    /// `new ClassName(args)`, Ember's explicit-construction spelling; plain
    /// `ClassName(args)` is parsed as an ordinary `CallFunc` and resolved to
    /// the same `CallResolution::Constructor` by `sema::eval_call_by_name`.
    fn eval_ctor_call(&mut self, node: NodeId, args: &[NodeId]) -> ExprResult {
        let values: Vec<Object> = args.iter().map(|&a| self.eval(a)).collect::<Result<_, _>>()?;
        match self.resolutions.call(self.ctx, node) {
            Some(CallResolution::Constructor(class_id)) => Ok(self.construct(class_id, values)),
            _ => Ok(Object::None),
        }
    }

    fn construct(&mut self, class_id: crate::ast::ClassId, values: Vec<Object>) -> Object {
        Object::Instance(std::rc::Rc::new(std::cell::RefCell::new(Instance {
            class: class_id,
            members: values,
        })))
    }

    /// Pushes one frame for the function's own scope (the implicit `self`
    /// slot for member functions, followed by its arguments — matching
    /// `scope::ScopeTree`'s `Function` scope layout exactly) and then
    /// executes the body via `exec`, which pushes the body block's own
    /// nested frame just like any other `Block` — the function scope and
    /// its body scope are two distinct scopes in `scope.rs`, so they need
    /// two distinct frames here too, or argument lookups one scope deeper
    /// than a local `let` would read the wrong frame.
    fn call_function(&mut self, id: crate::ast::FunctionId, args: Vec<Object>, receiver: Option<crate::object::InstanceRef>) -> ExprResult {
        self.depth += 1;
        if let Err(e) = self.recursion.check(self.depth) {
            self.depth -= 1;
            let range = self.ast.node(self.ast.function(id).body).range;
            return Err(Flow::Fault(RuntimeError::RecursionLimit { range, limit: e.limit }));
        }
        let def = self.ast.function(id).clone();
        let saved_ctx = self.ctx;
        self.ctx = Some(id);
        self.frames.push();
        let mut slot = 0;
        if let Some(receiver) = receiver {
            self.frames.set(0, slot, Object::Instance(receiver));
            slot += 1;
        }
        for (arg_value, _arg_node) in args.into_iter().zip(&def.args) {
            self.frames.set(0, slot, arg_value);
            slot += 1;
        }
        let result = self.exec(def.body);
        self.frames.pop();
        self.ctx = saved_ctx;
        self.depth -= 1;
        match result {
            Ok(()) => Ok(Object::None),
            Err(Flow::Return(value)) => Ok(value),
            Err(other) => Err(other),
        }
    }

    fn eval_binary(&mut self, node: NodeId, op: BinOp, lhs: NodeId, rhs: NodeId) -> ExprResult {
        let lhs_val = self.eval(lhs)?;
        let rhs_val = self.eval(rhs)?;
        let range = self.ast.node(node).range;
        match op {
            BinOp::Add => Ok(add(&lhs_val, &rhs_val)),
            BinOp::Sub => Ok(numeric(&lhs_val, &rhs_val, |a, b| a - b, |a, b| a - b)),
            BinOp::Mul => Ok(mul(&lhs_val, &rhs_val)),
            BinOp::Div => div(&lhs_val, &rhs_val, range),
            BinOp::Mod => rem(&lhs_val, &rhs_val, range),
            BinOp::LShift => Ok(Object::Int(as_int(&lhs_val) << as_int(&rhs_val))),
            BinOp::RShift => Ok(Object::Int(as_int(&lhs_val) >> as_int(&rhs_val))),
            BinOp::Lt => Ok(Object::Bool(compare(&lhs_val, &rhs_val) == std::cmp::Ordering::Less)),
            BinOp::LtEq => Ok(Object::Bool(compare(&lhs_val, &rhs_val) != std::cmp::Ordering::Greater)),
            BinOp::Gt => Ok(Object::Bool(compare(&lhs_val, &rhs_val) == std::cmp::Ordering::Greater)),
            BinOp::GtEq => Ok(Object::Bool(compare(&lhs_val, &rhs_val) != std::cmp::Ordering::Less)),
            BinOp::Eq => Ok(Object::Bool(compare(&lhs_val, &rhs_val) == std::cmp::Ordering::Equal)),
            BinOp::NotEq => Ok(Object::Bool(compare(&lhs_val, &rhs_val) != std::cmp::Ordering::Equal)),
            BinOp::LogAnd | BinOp::LogOr => {
                // Sema rejects these before the evaluator ever sees one;
                // reached only if that invariant is somehow violated.
                Ok(Object::None)
            }
        }
    }

    fn eval_unary(&mut self, op: UnOp, operand: NodeId) -> ExprResult {
        let value = self.eval(operand)?;
        Ok(match op {
            UnOp::Not => Object::Bool(!value.truthy()),
            UnOp::Neg => match value {
                Object::Int(v) => Object::Int(-v),
                Object::Float(v) => Object::Float(-v),
                other => other,
            },
        })
    }
}

fn literal_to_object(lit: &Literal) -> Object {
    match lit {
        Literal::Int(v) => Object::Int(*v),
        Literal::Float(v) => Object::Float(*v),
        Literal::Bool(v) => Object::Bool(*v),
        Literal::Char(v) => Object::Char(*v),
        Literal::Str(v) => Object::string(v.clone()),
        Literal::None => Object::None,
    }
}

fn as_int(obj: &Object) -> i64 {
    match obj {
        Object::Int(v) => *v,
        Object::Float(v) => *v as i64,
        _ => 0,
    }
}

fn as_float(obj: &Object) -> f64 {
    match obj {
        Object::Int(v) => *v as f64,
        Object::Float(v) => *v,
        _ => 0.0,
    }
}

fn is_float(obj: &Object) -> bool {
    matches!(obj, Object::Float(_))
}

fn numeric(lhs: &Object, rhs: &Object, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> Object {
    if is_float(lhs) || is_float(rhs) {
        Object::Float(float_op(as_float(lhs), as_float(rhs)))
    } else {
        Object::Int(int_op(as_int(lhs), as_int(rhs)))
    }
}

/// Vector append: `int + vector<int>`/
/// `vector<int> + int` appends the scalar rather than erroring, accepted
/// symmetrically per the resolved Open Question in `DESIGN.md`.
fn add(lhs: &Object, rhs: &Object) -> Object {
    match (lhs, rhs) {
        (Object::String(a), Object::String(b)) => {
            let mut s = a.borrow().clone();
            s.push_str(&b.borrow());
            Object::string(s)
        }
        (Object::Vector(a), _) => {
            let mut items = a.borrow().clone();
            items.push(rhs.deep_clone());
            Object::vector(items)
        }
        (_, Object::Vector(b)) => {
            let mut items = vec![lhs.deep_clone()];
            items.extend(b.borrow().iter().cloned());
            Object::vector(items)
        }
        _ => numeric(lhs, rhs, |a, b| a + b, |a, b| a + b),
    }
}

fn mul(lhs: &Object, rhs: &Object) -> Object {
    match (lhs, rhs) {
        (Object::String(s), Object::Int(n)) | (Object::Int(n), Object::String(s)) => {
            Object::string(s.borrow().repeat(usize::try_from(*n).unwrap_or(0)))
        }
        _ => numeric(lhs, rhs, |a, b| a * b, |a, b| a * b),
    }
}

fn div(lhs: &Object, rhs: &Object, range: crate::token::CodeRange) -> ExprResult {
    if is_float(lhs) || is_float(rhs) {
        let rhs_f = as_float(rhs);
        if rhs_f == 0.0 {
            return Err(Flow::Fault(RuntimeError::DivisionByZero(range)));
        }
        Ok(Object::Float(as_float(lhs) / rhs_f))
    } else {
        let rhs_i = as_int(rhs);
        if rhs_i == 0 {
            return Err(Flow::Fault(RuntimeError::DivisionByZero(range)));
        }
        Ok(Object::Int(as_int(lhs) / rhs_i))
    }
}

fn rem(lhs: &Object, rhs: &Object, range: crate::token::CodeRange) -> ExprResult {
    let rhs_i = as_int(rhs);
    if rhs_i == 0 {
        return Err(Flow::Fault(RuntimeError::DivisionByZero(range)));
    }
    Ok(Object::Int(as_int(lhs) % rhs_i))
}

fn compare(lhs: &Object, rhs: &Object) -> std::cmp::Ordering {
    match (lhs, rhs) {
        (Object::Int(_) | Object::Float(_), Object::Int(_) | Object::Float(_)) => {
            as_float(lhs).partial_cmp(&as_float(rhs)).unwrap_or(std::cmp::Ordering::Equal)
        }
        (Object::String(a), Object::String(b)) => a.borrow().cmp(&b.borrow()),
        (Object::Char(a), Object::Char(b)) => a.cmp(b),
        (Object::Bool(a), Object::Bool(b)) => a.cmp(b),
        _ => std::cmp::Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ast::FunctionId, io::CollectStringPrint, scope::ScopeTree, sema, syntax};

    fn prepare(source: &str) -> (Ast, Resolutions) {
        let mut ast = syntax::parse(source).unwrap();
        let mut scopes = ScopeTree::new();
        let mut sink = crate::diagnostics::DiagnosticSink::new();
        let resolutions = sema::check_program(&mut ast, &mut scopes, &mut sink);
        assert!(!sink.had_errors(), "unexpected sema errors: {:?}", sink.diagnostics());
        (ast, resolutions)
    }

    fn find_function(ast: &Ast, name: &str) -> FunctionId {
        for &node in &ast.top_level {
            if let NodeKind::Function(id) = ast.node(node).kind.clone() {
                if ast.function(id).name == name {
                    return id;
                }
            }
        }
        panic!("function `{name}` not found");
    }

    #[test]
    fn call_function_returns_the_value_carried_by_a_return_flow() {
        let (ast, resolutions) = prepare("fn f(x: int) -> int { return x + 1; }");
        let id = find_function(&ast, "f");
        let mut writer = CollectStringPrint::new();
        let mut evaluator = Evaluator::new(&ast, &resolutions, &mut writer, RecursionGuard::default());
        let result = evaluator.call_function(id, vec![Object::Int(41)], None);
        assert!(matches!(result, Ok(Object::Int(42))));
    }

    #[test]
    fn call_function_yields_none_when_the_body_falls_off_the_end() {
        let (ast, resolutions) = prepare("fn f() { let x = 1; }");
        let id = find_function(&ast, "f");
        let mut writer = CollectStringPrint::new();
        let mut evaluator = Evaluator::new(&ast, &resolutions, &mut writer, RecursionGuard::default());
        let result = evaluator.call_function(id, vec![], None);
        assert!(matches!(result, Ok(Object::None)));
    }

    #[test]
    fn call_function_propagates_a_throw_past_its_own_body() {
        let (ast, resolutions) = prepare(r#"fn f() { throw "boom"; }"#);
        let id = find_function(&ast, "f");
        let mut writer = CollectStringPrint::new();
        let mut evaluator = Evaluator::new(&ast, &resolutions, &mut writer, RecursionGuard::default());
        let result = evaluator.call_function(id, vec![], None);
        match result {
            Err(Flow::Throw(Object::String(s))) => assert_eq!(&*s.borrow(), "boom"),
            other => panic!("expected a propagated throw, got {other:?}"),
        }
    }

    #[test]
    fn call_function_surfaces_the_recursion_limit_as_a_fault() {
        let (ast, resolutions) = prepare("fn f(n: int) -> int { return f(n + 1); }");
        let id = find_function(&ast, "f");
        let mut writer = CollectStringPrint::new();
        let mut evaluator = Evaluator::new(&ast, &resolutions, &mut writer, RecursionGuard::new(3));
        let result = evaluator.call_function(id, vec![Object::Int(0)], None);
        assert!(matches!(result, Err(Flow::Fault(RuntimeError::RecursionLimit { .. }))));
    }

    #[test]
    fn call_function_restores_the_caller_frame_and_ctx_after_returning() {
        let (ast, resolutions) = prepare("fn f(x: int) -> int { return x; }");
        let id = find_function(&ast, "f");
        let mut writer = CollectStringPrint::new();
        let mut evaluator = Evaluator::new(&ast, &resolutions, &mut writer, RecursionGuard::default());
        let before_depth = evaluator.depth;
        let before_ctx = evaluator.ctx;
        evaluator.call_function(id, vec![Object::Int(1)], None).unwrap();
        assert_eq!(evaluator.depth, before_depth);
        assert_eq!(evaluator.ctx, before_ctx);
    }
}
