//! The AST arena.
//!
//! A tree of `Node*` mutated in place once each node is resolved (writing a
//! resolved kind/depth/index/candidate list directly onto the node) is
//! awkward under Rust's ownership rules, so here the AST is an index-only
//! arena (`Vec<Node>` keyed by `NodeId`) and every piece of information Sema
//! discovers about a node is written into a side table instead
//! (`sema::Resolutions`) keyed by the same `NodeId`. The shapes below cover
//! every node kind the parser produces; nothing here performs resolution, that is
//! `sema`'s job.

use crate::token::CodeRange;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

id_type!(NodeId);
id_type!(ClassId);
id_type!(EnumId);
id_type!(FunctionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    LShift,
    RShift,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    LogAnd,
    LogOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    None,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub exc_type: NodeId,
    pub binding: Option<String>,
    pub body: NodeId,
}

/// One entry of an AST arena slot: the range every node carries, plus the
/// node-kind-specific payload.
#[derive(Debug, Clone)]
pub struct Node {
    pub range: CodeRange,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Value(Literal),

    /// A bare name reference (`x`, `f`, `Point`, a module name, ...). What it
    /// resolves to is filled in by Sema into `Resolutions::idents`.
    Identifier(String),

    /// `base::name`, used for explicit scope qualification (`Module::func`,
    /// `Enum::Variant`).
    ScopeResol { base: NodeId, name: String },

    /// `base.name`, a member variable or member function access on an
    /// instance.
    MemberAccess { base: NodeId, name: String },

    Array(Vec<NodeId>),
    TupleLit(Vec<NodeId>),

    IndexRef { base: NodeId, index: NodeId },

    /// `callee(template_args)(args)`. `callee` is usually an `Identifier` or
    /// `MemberAccess`; `template_args` is empty for non-generic calls.
    CallFunc {
        callee: NodeId,
        template_args: Vec<NodeId>,
        args: Vec<NodeId>,
    },

    /// `ClassName(args)`, a constructor call. Kept distinct from `CallFunc`
    /// because the callee is a type name, not a value.
    CallFuncCtor { class_name: NodeId, args: Vec<NodeId> },

    BinaryOp { op: BinOp, lhs: NodeId, rhs: NodeId },
    UnaryOp { op: UnOp, operand: NodeId },

    Assign { target: NodeId, value: NodeId },

    /// `int`, `vector<int>`, `Point`, `T` (a template parameter) ...
    TypeName { name: String, params: Vec<NodeId> },

    VarDef {
        name: String,
        type_expr: Option<NodeId>,
        init: Option<NodeId>,
    },

    Argument { name: String, type_expr: NodeId },

    Block(Vec<NodeId>),

    If {
        cond: NodeId,
        then_block: NodeId,
        else_block: Option<NodeId>,
    },

    While { cond: NodeId, body: NodeId },

    For {
        var_name: String,
        iterable: NodeId,
        body: NodeId,
    },

    TryCatch { try_block: NodeId, catches: Vec<CatchClause> },

    Return(Option<NodeId>),
    Break,
    Continue,
    Throw(NodeId),

    ExprStmt(NodeId),

    Function(FunctionId),
    Class(ClassId),
    Enum(EnumId),
}

/// A function or method declaration. Template (generic) functions carry one
/// or more `template_params`; each concrete instantiation gets its own
/// `FunctionDef` appended to the table by Sema (see `sema::instantiate`),
/// mirroring the original's per-instantiation scope clone in
/// `SemaScope.cpp`.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub template_params: Vec<String>,
    pub args: Vec<NodeId>,
    pub return_type: Option<NodeId>,
    pub body: NodeId,
    pub is_member_func: bool,
    pub owner_class: Option<ClassId>,
    /// Set on instantiations produced from a generic `FunctionDef`; points at
    /// the template this one was instantiated from.
    pub instantiated_from: Option<FunctionId>,
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub template_params: Vec<String>,
    pub members: Vec<NodeId>, // VarDef nodes
    pub methods: Vec<FunctionId>,
    pub instantiated_from: Option<ClassId>,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<String>,
}

/// Owns every node, function, class, and enum definition produced by
/// parsing. `NodeId`/`FunctionId`/`ClassId`/`EnumId` are indices into the
/// corresponding `Vec` here and stay valid for the life of the `Ast`.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    functions: Vec<FunctionDef>,
    classes: Vec<ClassDef>,
    enums: Vec<EnumDef>,
    pub top_level: Vec<NodeId>,
}

impl Ast {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_node(&mut self, range: CodeRange, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("AST exceeds u32 node capacity"));
        self.nodes.push(Node { range, kind });
        id
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn push_function(&mut self, def: FunctionDef) -> FunctionId {
        let id = FunctionId(u32::try_from(self.functions.len()).expect("too many functions"));
        self.functions.push(def);
        id
    }

    #[must_use]
    pub fn function(&self, id: FunctionId) -> &FunctionDef {
        &self.functions[id.index()]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut FunctionDef {
        &mut self.functions[id.index()]
    }

    pub fn push_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId(u32::try_from(self.classes.len()).expect("too many classes"));
        self.classes.push(def);
        id
    }

    #[must_use]
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDef {
        &mut self.classes[id.index()]
    }

    pub fn push_enum(&mut self, def: EnumDef) -> EnumId {
        let id = EnumId(u32::try_from(self.enums.len()).expect("too many enums"));
        self.enums.push(def);
        id
    }

    #[must_use]
    pub fn enum_def(&self, id: EnumId) -> &EnumDef {
        &self.enums[id.index()]
    }

    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}
