//! Runtime values produced and consumed by the evaluator.
//!
//! A tagged enum, not a payload-plus-discriminant struct, where
//! vectors/strings/dicts are reference-counted heap values that get
//! deep-cloned on mutating operations (`+`, `*`) so value semantics hold at
//! the language level even though the representation is shared underneath.
//! Ember has no closures over mutable parent frames, so
//! unlike a general heap arena (which exists to break reference cycles
//! for a GC), a plain `Rc<RefCell<_>>` per iterable is enough here: nothing
//! in the object graph can point back to a frame that outlives it.

use std::{cell::RefCell, fmt, rc::Rc};

use indexmap::IndexMap;

use crate::ast::{ClassId, EnumId, FunctionId};

pub type VectorRef = Rc<RefCell<Vec<Object>>>;
pub type DictRef = Rc<RefCell<IndexMap<DictKey, Object>>>;
pub type StringRef = Rc<RefCell<String>>;
pub type InstanceRef = Rc<RefCell<Instance>>;

/// A value restricted to the subset of `Object` that can be hashed, used as
/// `Dict` keys. Constructing one from an un-hashable `Object` is a checked
/// error surfaced by Sema (dict key types are validated against this set
/// before a `Dict` type is ever formed), so `TryFrom` failing at evaluation
/// time would indicate a Sema bug rather than a user error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DictKey {
    Int(i64),
    Bool(bool),
    Char(char),
    String(String),
}

impl fmt::Display for DictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
        }
    }
}

impl TryFrom<&Object> for DictKey {
    type Error = ();

    fn try_from(value: &Object) -> Result<Self, Self::Error> {
        match value {
            Object::Int(v) => Ok(Self::Int(*v)),
            Object::Bool(v) => Ok(Self::Bool(*v)),
            Object::Char(v) => Ok(Self::Char(*v)),
            Object::String(s) => Ok(Self::String(s.borrow().clone())),
            _ => Err(()),
        }
    }
}

/// A class instance: ordered member slots matching `ClassDef::members`.
#[derive(Debug, Clone)]
pub struct Instance {
    pub class: ClassId,
    pub members: Vec<Object>,
}

/// A callable value: either a free function/instantiation, or a method bound
/// to a receiver instance.
#[derive(Debug, Clone)]
pub enum Callable {
    Function(FunctionId),
    BoundMethod { receiver: InstanceRef, function: FunctionId },
    Builtin(&'static str),
}

#[derive(Debug, Clone)]
pub enum Object {
    None,
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    String(StringRef),
    Vector(VectorRef),
    Tuple(Rc<Vec<Object>>),
    Dict(DictRef),
    Instance(InstanceRef),
    Enumerator { id: EnumId, variant: usize, name: Rc<str> },
    Function(Callable),
}

impl Object {
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(Rc::new(RefCell::new(s.into())))
    }

    #[must_use]
    pub fn vector(items: Vec<Self>) -> Self {
        Self::Vector(Rc::new(RefCell::new(items)))
    }

    #[must_use]
    pub fn tuple(items: Vec<Self>) -> Self {
        Self::Tuple(Rc::new(items))
    }

    #[must_use]
    pub fn dict(pairs: IndexMap<DictKey, Self>) -> Self {
        Self::Dict(Rc::new(RefCell::new(pairs)))
    }

    /// Deep-clones iterables so `+`/`*` on vectors and strings produce a
    /// fresh value rather than aliasing the operands, matching value
    /// semantics for those operators.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        match self {
            Self::String(s) => Self::string(s.borrow().clone()),
            Self::Vector(v) => Self::vector(v.borrow().iter().map(Self::deep_clone).collect()),
            Self::Tuple(t) => Self::tuple(t.iter().map(Self::deep_clone).collect()),
            Self::Dict(d) => Self::dict(d.borrow().iter().map(|(k, v)| (k.clone(), v.deep_clone())).collect()),
            other => other.clone(),
        }
    }

    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Char(_) => true,
            Self::String(s) => !s.borrow().is_empty(),
            Self::Vector(v) => !v.borrow().is_empty(),
            Self::Tuple(t) => !t.is_empty(),
            Self::Dict(d) => !d.borrow().is_empty(),
            Self::Instance(_) | Self::Enumerator { .. } | Self::Function(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_clone_of_vector_does_not_alias_the_original() {
        let original = Object::vector(vec![Object::Int(1), Object::Int(2)]);
        let clone = original.deep_clone();
        if let Object::Vector(v) = &clone {
            v.borrow_mut().push(Object::Int(3));
        }
        let Object::Vector(orig) = &original else { unreachable!() };
        assert_eq!(orig.borrow().len(), 2, "mutating the clone must not affect the original");
    }

    #[test]
    fn deep_clone_of_string_does_not_alias_the_original() {
        let original = Object::string("ab");
        let clone = original.deep_clone();
        if let Object::String(s) = &clone {
            s.borrow_mut().push('c');
        }
        let Object::String(orig) = &original else { unreachable!() };
        assert_eq!(&*orig.borrow(), "ab");
    }

    #[test]
    fn truthy_matches_language_rules() {
        assert!(!Object::None.truthy());
        assert!(!Object::Int(0).truthy());
        assert!(Object::Int(1).truthy());
        assert!(!Object::string("").truthy());
        assert!(Object::string("x").truthy());
        assert!(!Object::vector(Vec::new()).truthy());
        assert!(Object::vector(vec![Object::Int(1)]).truthy());
    }

    #[test]
    fn dict_key_round_trips_through_try_from() {
        let key = DictKey::try_from(&Object::Int(7)).unwrap();
        assert_eq!(key, DictKey::Int(7));
        assert!(DictKey::try_from(&Object::None).is_err());
    }

    #[test]
    fn display_renders_vector_and_string_contents() {
        let v = Object::vector(vec![Object::Int(1), Object::Int(2), Object::Int(3)]);
        assert_eq!(v.to_string(), "[1, 2, 3]");
        assert_eq!(Object::string("hi").to_string(), "hi");
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(&v.borrow()),
            Self::Vector(v) => {
                f.write_str("[")?;
                for (i, item) in v.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Tuple(v) => {
                f.write_str("(")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Self::Dict(v) => {
                f.write_str("{")?;
                for (i, (k, val)) in v.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {val}")?;
                }
                f.write_str("}")
            }
            Self::Instance(inst) => write!(f, "<instance {:?}>", inst.borrow().class),
            Self::Enumerator { name, .. } => f.write_str(name),
            Self::Function(_) => f.write_str("<function>"),
        }
    }
}
