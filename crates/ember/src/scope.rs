//! The lexical scope tree, built once from the AST before Sema runs over it.
//!
//! A `BlockScope` holds its own ordered local-variable slots plus child
//! scopes, a `FunctionScope` holds its argument slots (0..N-1) followed by
//! its body's `BlockScope`, and lookups walk the parent chain counting
//! depth. Rather than a tree of owned `Scope` objects found by walking back
//! up `parent` pointers, the tree here is a flat arena (`Vec<Scope>` keyed
//! by `ScopeId`) representing a stack of frames by index rather than by
//! pointer.

use crate::{
    ast::{Ast, NodeId, NodeKind},
    types::TypeInfo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single named local: a function argument or a `let` binding.
///
/// `ty` starts out `None` for `let` bindings whose type Sema must deduce
/// from the initializer (the LHS type is deduced from the RHS
/// when undeclared); it is filled in once `sema::check` resolves it.
#[derive(Debug, Clone)]
pub struct LocalVar {
    pub name: String,
    pub ty: Option<TypeInfo>,
    pub def_node: NodeId,
}

#[derive(Debug, Clone)]
pub enum ScopeKind {
    Block,
    /// The scope introduced by a function body; `vars` holds the arguments,
    /// slots `0..N-1`, with the body's own `Block` scope as a child.
    Function,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub depth: u32,
    pub vars: Vec<LocalVar>,
    pub children: Vec<ScopeId>,
    /// The `Block`/`Function` AST node this scope was built for, used by
    /// `find_child_scope` to recover a scope from the node that introduced
    /// it.
    pub owner: NodeId,
}

/// The scope tree for one `Ast`. Built once, up front, by `build`.
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

/// A saved path from the tree root down to some scope, used to restore
/// Sema's "current scope" when checking a generic instantiation pulls it
/// away from the normal top-down walk order (see `sema::instantiate`).
pub type ScopeLocation = Vec<ScopeId>;

impl ScopeTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    fn push(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(u32::try_from(self.scopes.len()).expect("scope tree exceeds u32 capacity"));
        self.scopes.push(scope);
        id
    }

    /// Allocates a new child `Block` scope under `parent` for `owner`.
    pub fn new_block(&mut self, parent: Option<ScopeId>, owner: NodeId) -> ScopeId {
        let depth = parent.map_or(0, |p| self.scope(p).depth + 1);
        let id = self.push(Scope {
            kind: ScopeKind::Block,
            parent,
            depth,
            vars: Vec::new(),
            children: Vec::new(),
            owner,
        });
        if let Some(parent) = parent {
            self.scope_mut(parent).children.push(id);
        }
        id
    }

    /// Allocates a new `Function` scope under `parent` for `owner`.
    pub fn new_function(&mut self, parent: Option<ScopeId>, owner: NodeId) -> ScopeId {
        let depth = parent.map_or(0, |p| self.scope(p).depth + 1);
        let id = self.push(Scope {
            kind: ScopeKind::Function,
            parent,
            depth,
            vars: Vec::new(),
            children: Vec::new(),
            owner,
        });
        if let Some(parent) = parent {
            self.scope_mut(parent).children.push(id);
        }
        id
    }

    pub fn add_var(&mut self, scope: ScopeId, name: String, def_node: NodeId, ty: Option<TypeInfo>) -> usize {
        let slots = &mut self.scope_mut(scope).vars;
        let index = slots.len();
        slots.push(LocalVar { name, ty, def_node });
        index
    }

    /// Looks up `name` starting at `scope`, walking up through parents.
    ///
    /// Returns `(depth, index)`: `depth` is how many scopes up the chain the
    /// binding lives (0 = `scope` itself), `index` is its slot within that
    /// scope's `vars`. This is exactly the pair the evaluator's frame stack
    /// needs to fetch the matching runtime slot (`evaluator::Frames::get`).
    #[must_use]
    pub fn find_var(&self, scope: ScopeId, name: &str) -> Option<(u32, usize)> {
        self.find_var_scope(scope, name).map(|(_, depth, index)| (depth, index))
    }

    /// Same as `find_var`, but also returns the `ScopeId` the binding lives
    /// in (needed to key the per-instantiation declared-type side table in
    /// `sema::Resolutions::var_types`, since a `LocalVar`'s slot is shared
    /// across every instantiation of a generic function but its declared
    /// type is not).
    #[must_use]
    pub fn find_var_scope(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, u32, usize)> {
        let mut depth = 0;
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            if let Some(index) = s.vars.iter().position(|v| v.name == name) {
                return Some((id, depth, index));
            }
            depth += 1;
            current = s.parent;
        }
        None
    }

    /// Finds the child scope of `scope` whose owner node is `node`.
    #[must_use]
    pub fn find_child_scope(&self, scope: ScopeId, node: NodeId) -> Option<ScopeId> {
        self.scope(scope)
            .children
            .iter()
            .copied()
            .find(|&child| self.scope(child).owner.0 == node.0)
    }

    /// Path from the root scope down to `scope`, inclusive, used as a
    /// bookmark to restore Sema's scope-location stack.
    #[must_use]
    pub fn location_of(&self, scope: ScopeId) -> ScopeLocation {
        let mut path = vec![scope];
        let mut current = self.scope(scope).parent;
        while let Some(id) = current {
            path.push(id);
            current = self.scope(id).parent;
        }
        path.reverse();
        path
    }

    /// Builds the single global scope covering every top-level statement,
    /// returning its `ScopeId`. Ember programs have no module system
    /// (cross-file linking is out of scope), so there is
    /// exactly one such scope per program.
    pub fn build_program(&mut self, ast: &Ast, top_level: &[NodeId]) -> ScopeId {
        let root = self.new_block(None, NodeId(u32::MAX));
        for &stmt in top_level {
            self.build_stmt(ast, stmt, root);
        }
        root
    }

    /// Recursively builds scopes for every `Block`/`Function` node reachable
    /// from `root`, mirroring `SemaScope.cpp`'s construction pass. Returns
    /// the root scope created for `root` itself.
    pub fn build(&mut self, ast: &Ast, root: NodeId, parent: Option<ScopeId>) -> ScopeId {
        match &ast.node(root).kind {
            NodeKind::Block(stmts) => {
                let scope = self.new_block(parent, root);
                let stmts = stmts.clone();
                for stmt in stmts {
                    self.build_stmt(ast, stmt, scope);
                }
                scope
            }
            _ => self.build_stmt(ast, root, parent.unwrap_or_else(|| self.new_block(None, root))),
        }
    }

    fn build_stmt(&mut self, ast: &Ast, node: NodeId, scope: ScopeId) -> ScopeId {
        match &ast.node(node).kind {
            NodeKind::VarDef { name, .. } => {
                self.add_var(scope, name.clone(), node, None);
                scope
            }
            NodeKind::Block(_) => self.build(ast, node, Some(scope)),
            NodeKind::If {
                then_block,
                else_block,
                ..
            } => {
                self.build(ast, *then_block, Some(scope));
                if let Some(else_block) = else_block {
                    self.build(ast, *else_block, Some(scope));
                }
                scope
            }
            NodeKind::While { body, .. } => {
                self.build(ast, *body, Some(scope));
                scope
            }
            NodeKind::For { var_name, body, .. } => {
                let loop_scope = self.new_block(Some(scope), *body);
                self.add_var(loop_scope, var_name.clone(), node, None);
                if let NodeKind::Block(stmts) = &ast.node(*body).kind {
                    let stmts = stmts.clone();
                    for stmt in stmts {
                        self.build_stmt(ast, stmt, loop_scope);
                    }
                }
                scope
            }
            NodeKind::TryCatch { try_block, catches } => {
                self.build(ast, *try_block, Some(scope));
                for clause in catches.clone() {
                    let catch_scope = self.new_block(Some(scope), clause.body);
                    if let Some(binding) = clause.binding.clone() {
                        self.add_var(catch_scope, binding, node, None);
                    }
                    if let NodeKind::Block(stmts) = &ast.node(clause.body).kind {
                        let stmts = stmts.clone();
                        for stmt in stmts {
                            self.build_stmt(ast, stmt, catch_scope);
                        }
                    }
                }
                scope
            }
            NodeKind::Function(func_id) => {
                let func = ast.function(*func_id).clone();
                let func_scope = self.new_function(Some(scope), node);
                if func.is_member_func {
                    // Slot 0 of a member function's scope is always the
                    // implicit receiver, referenced in the body as a bare
                    // `self`. There is no dedicated AST node for it, so its
                    // `def_node` just points back at the `Function` node.
                    self.add_var(func_scope, "self".to_owned(), node, None);
                }
                for arg in &func.args {
                    if let NodeKind::Argument { name, .. } = &ast.node(*arg).kind {
                        self.add_var(func_scope, name.clone(), *arg, None);
                    }
                }
                self.build(ast, func.body, Some(func_scope));
                scope
            }
            NodeKind::Class(class_id) => {
                let methods = ast.class(*class_id).methods.clone();
                for method in methods {
                    let method_node = ast
                        .top_level
                        .iter()
                        .copied()
                        .find(|&n| matches!(&ast.node(n).kind, NodeKind::Function(f) if *f == method));
                    if let Some(method_node) = method_node {
                        self.build_stmt(ast, method_node, scope);
                    }
                }
                scope
            }
            _ => scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::CodeRange;

    fn dummy_vardef(ast: &mut Ast, name: &str) -> NodeId {
        ast.push_node(
            CodeRange::default(),
            NodeKind::VarDef {
                name: name.to_owned(),
                type_expr: None,
                init: None,
            },
        )
    }

    #[test]
    fn find_var_scope_reports_increasing_depth_up_the_chain() {
        let mut ast = Ast::new();
        let mut tree = ScopeTree::new();
        let root = tree.new_block(None, NodeId(u32::MAX));
        let outer_def = dummy_vardef(&mut ast, "x");
        tree.add_var(root, "x".to_owned(), outer_def, None);

        let child = tree.new_block(Some(root), NodeId(1));
        let inner_def = dummy_vardef(&mut ast, "y");
        tree.add_var(child, "y".to_owned(), inner_def, None);

        let (depth_y, index_y) = tree.find_var(child, "y").expect("y declared in child scope");
        assert_eq!((depth_y, index_y), (0, 0));

        let (depth_x, index_x) = tree.find_var(child, "x").expect("x visible from enclosing scope");
        assert_eq!((depth_x, index_x), (1, 0));

        assert!(tree.find_var(child, "z").is_none());
    }

    #[test]
    fn function_scope_reserves_slot_zero_for_implicit_receiver() {
        let mut tree = ScopeTree::new();
        let root = tree.new_block(None, NodeId(u32::MAX));
        let func_scope = tree.new_function(Some(root), NodeId(1));
        tree.add_var(func_scope, "self".to_owned(), NodeId(1), None);
        tree.add_var(func_scope, "other".to_owned(), NodeId(2), None);

        assert_eq!(tree.find_var(func_scope, "self"), Some((0, 0)));
        assert_eq!(tree.find_var(func_scope, "other"), Some((0, 1)));
    }

    #[test]
    fn location_of_returns_root_to_leaf_path() {
        let mut tree = ScopeTree::new();
        let root = tree.new_block(None, NodeId(u32::MAX));
        let mid = tree.new_block(Some(root), NodeId(1));
        let leaf = tree.new_block(Some(mid), NodeId(2));

        let path = tree.location_of(leaf);
        assert_eq!(path, vec![root, mid, leaf]);
    }

    #[test]
    fn find_child_scope_locates_by_owner_node() {
        let mut tree = ScopeTree::new();
        let root = tree.new_block(None, NodeId(u32::MAX));
        let child = tree.new_block(Some(root), NodeId(42));

        assert_eq!(tree.find_child_scope(root, NodeId(42)), Some(child));
        assert_eq!(tree.find_child_scope(root, NodeId(7)), None);
    }
}
