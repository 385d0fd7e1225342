//! The type model shared by Sema and the evaluator.
//!
//! The `kind`/`params`/name-or-handle shape recurs throughout every
//! `eval_type` branch, expressed as a closed Rust enum rather than an open
//! integer tag, so unhandled kinds are a compile error rather than a silent
//! fallthrough.

use std::fmt;

use crate::ast::{ClassId, EnumId, FunctionId};

/// The closed set of type kinds a `TypeInfo` can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    None,
    Int,
    Float,
    Bool,
    Char,
    String,
    Vector,
    Tuple,
    Dict,
    Instance,
    Enumerator,
    Function,
    TypeName,
    Module,
}

impl TypeKind {
    /// Number of type parameters this kind is expected to carry.
    ///
    /// `Tuple` is unbounded (validated against the actual parameter count at
    /// the `TypeName` call site rather than here); everything else is fixed.
    #[must_use]
    pub const fn needed_param_count(self) -> Option<usize> {
        match self {
            Self::None
            | Self::Int
            | Self::Float
            | Self::Bool
            | Self::Char
            | Self::String
            | Self::Instance
            | Self::Enumerator
            | Self::TypeName
            | Self::Module => Some(0),
            Self::Vector => Some(1),
            Self::Dict => Some(2),
            Self::Function | Self::Tuple => None,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::String => "string",
            Self::Vector => "vector",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            Self::Instance => "instance",
            Self::Enumerator => "enumerator",
            Self::Function => "function",
            Self::TypeName => "type",
            Self::Module => "module",
        };
        f.write_str(name)
    }
}

/// A fully resolved type: a kind plus whatever parameters/handles that kind
/// needs to be meaningful (element type for `Vector`, key/value types for
/// `Dict`, a `ClassId` for `Instance`, and so on).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    pub kind: TypeKind,
    pub params: Vec<TypeInfo>,
    pub name: Option<String>,
    pub class: Option<ClassId>,
    pub enum_id: Option<EnumId>,
    pub function: Option<FunctionId>,
    /// True for a function type accepting a variadic/free argument list.
    pub is_free_args: bool,
    /// True for a function type that is a class member (implicit `self`).
    pub is_member_func: bool,
}

impl TypeInfo {
    #[must_use]
    pub const fn scalar(kind: TypeKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
            name: None,
            class: None,
            enum_id: None,
            function: None,
            is_free_args: false,
            is_member_func: false,
        }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::scalar(TypeKind::None)
    }

    #[must_use]
    pub fn int() -> Self {
        Self::scalar(TypeKind::Int)
    }

    #[must_use]
    pub fn float() -> Self {
        Self::scalar(TypeKind::Float)
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::scalar(TypeKind::Bool)
    }

    #[must_use]
    pub fn char_() -> Self {
        Self::scalar(TypeKind::Char)
    }

    #[must_use]
    pub fn string() -> Self {
        Self::scalar(TypeKind::String)
    }

    #[must_use]
    pub fn vector(element: Self) -> Self {
        Self {
            kind: TypeKind::Vector,
            params: vec![element],
            ..Self::none()
        }
    }

    #[must_use]
    pub fn tuple(elements: Vec<Self>) -> Self {
        Self {
            kind: TypeKind::Tuple,
            params: elements,
            ..Self::none()
        }
    }

    #[must_use]
    pub fn dict(key: Self, value: Self) -> Self {
        Self {
            kind: TypeKind::Dict,
            params: vec![key, value],
            ..Self::none()
        }
    }

    #[must_use]
    pub fn instance(class: ClassId, name: String) -> Self {
        Self {
            kind: TypeKind::Instance,
            class: Some(class),
            name: Some(name),
            ..Self::none()
        }
    }

    #[must_use]
    pub fn enumerator(id: EnumId, name: String) -> Self {
        Self {
            kind: TypeKind::Enumerator,
            enum_id: Some(id),
            name: Some(name),
            ..Self::none()
        }
    }

    #[must_use]
    pub fn function(function: FunctionId, params: Vec<Self>, is_free_args: bool, is_member_func: bool) -> Self {
        Self {
            kind: TypeKind::Function,
            function: Some(function),
            params,
            is_free_args,
            is_member_func,
            ..Self::none()
        }
    }

    /// `element_type` returns the element type of a `Vector`, panics otherwise.
    ///
    /// Call sites only reach here after `eval_type` has already confirmed the
    /// kind, mirroring the original's unchecked `params[0]` access.
    #[must_use]
    pub fn element_type(&self) -> &Self {
        assert_eq!(self.kind, TypeKind::Vector, "element_type called on non-vector");
        &self.params[0]
    }

    #[must_use]
    pub fn dict_key_type(&self) -> &Self {
        assert_eq!(self.kind, TypeKind::Dict, "dict_key_type called on non-dict");
        &self.params[0]
    }

    #[must_use]
    pub fn dict_value_type(&self) -> &Self {
        assert_eq!(self.kind, TypeKind::Dict, "dict_value_type called on non-dict");
        &self.params[1]
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.kind == TypeKind::None
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, TypeKind::Int | TypeKind::Float)
    }

    /// Structural equality for scalar/aggregate kinds, nominal equality (by
    /// handle) for `Instance`/`Enumerator`, matching the original's equality
    /// rules where two generic instantiations of the same class with
    /// different template arguments are distinct types.
    #[must_use]
    pub fn type_equal(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match self.kind {
            TypeKind::Instance => self.class == other.class,
            TypeKind::Enumerator => self.enum_id == other.enum_id,
            TypeKind::Vector | TypeKind::Dict | TypeKind::Tuple => {
                self.params.len() == other.params.len()
                    && self.params.iter().zip(&other.params).all(|(a, b)| a.type_equal(b))
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ClassId;

    #[test]
    fn vector_equality_is_structural_on_element_type() {
        let v_int = TypeInfo::vector(TypeInfo::int());
        let v_int2 = TypeInfo::vector(TypeInfo::int());
        let v_float = TypeInfo::vector(TypeInfo::float());
        assert!(v_int.type_equal(&v_int2));
        assert!(!v_int.type_equal(&v_float));
    }

    #[test]
    fn instance_equality_is_by_class_identity_not_structure() {
        let a = TypeInfo::instance(ClassId(0), "Point".to_owned());
        let b = TypeInfo::instance(ClassId(0), "Point".to_owned());
        let c = TypeInfo::instance(ClassId(1), "Other".to_owned());
        assert!(a.type_equal(&b));
        assert!(!a.type_equal(&c));
    }

    #[test]
    fn needed_param_count_is_fixed_per_kind() {
        assert_eq!(TypeKind::Vector.needed_param_count(), Some(1));
        assert_eq!(TypeKind::Dict.needed_param_count(), Some(2));
        assert_eq!(TypeKind::Int.needed_param_count(), Some(0));
        assert_eq!(TypeKind::Tuple.needed_param_count(), None);
    }

    #[test]
    fn display_disambiguates_nested_vector_types() {
        let nested = TypeInfo::vector(TypeInfo::vector(TypeInfo::int()));
        assert_eq!(nested.to_string(), "vector<vector<int>>");
    }

    #[test]
    fn display_renders_function_signature() {
        // `params` is `[return_type, arg1, arg2, …]`.
        let f = TypeInfo::function(crate::ast::FunctionId(0), vec![TypeInfo::boolean(), TypeInfo::int(), TypeInfo::string()], false, false);
        assert_eq!(f.to_string(), "(int, string) -> bool");
    }

    #[test]
    fn is_numeric_covers_int_and_float_only() {
        assert!(TypeInfo::int().is_numeric());
        assert!(TypeInfo::float().is_numeric());
        assert!(!TypeInfo::boolean().is_numeric());
        assert!(!TypeInfo::string().is_numeric());
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::Vector => write!(f, "vector<{}>", self.params[0]),
            TypeKind::Dict => write!(f, "dict<{}, {}>", self.params[0], self.params[1]),
            TypeKind::Tuple => {
                f.write_str("tuple<")?;
                for (i, p) in self.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                f.write_str(">")
            }
            TypeKind::Instance | TypeKind::Enumerator => {
                f.write_str(self.name.as_deref().unwrap_or("<anonymous>"))
            }
            TypeKind::Function => {
                // `params` is `[return_type, arg1, arg2, …]`; rendered as
                // `(arg1, arg2) -> return` for readability in diagnostics.
                f.write_str("(")?;
                for (i, p) in self.params.iter().skip(1).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {}", self.params.first().unwrap_or(&TypeInfo::none()))
            }
            _ => write!(f, "{}", self.kind),
        }
    }
}
