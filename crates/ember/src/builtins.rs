//! The small fixed built-in surface: a handful of free functions plus a
//! handful of member functions on `Vector`/`String` receivers.
//!
//! A table-of-functions pattern (one entry per builtin, looked up by name
//! into a fixed table) sized down to the bound Ember's standard library
//! actually needs: no
//! Python-stdlib surface, just enough to write typical example programs
//! (`len`, `print`, numeric conversions, vector/string member
//! accessors).

use crate::{
    io::PrintWriter,
    object::Object,
    types::{TypeInfo, TypeKind},
};

/// The signature Sema checks a builtin call against.
pub struct BuiltinSignature {
    pub params: Vec<TypeInfo>,
    pub variadic: bool,
    pub ret: TypeInfo,
}

/// Looks up a free function builtin by name.
#[must_use]
pub fn free_function_signature(name: &str) -> Option<BuiltinSignature> {
    match name {
        "print" => Some(BuiltinSignature {
            params: Vec::new(),
            variadic: true,
            ret: TypeInfo::none(),
        }),
        "len" => Some(BuiltinSignature {
            params: vec![TypeInfo::string()],
            variadic: false,
            ret: TypeInfo::int(),
        }),
        "int" => Some(BuiltinSignature {
            params: vec![TypeInfo::float()],
            variadic: false,
            ret: TypeInfo::int(),
        }),
        "float" => Some(BuiltinSignature {
            params: vec![TypeInfo::int()],
            variadic: false,
            ret: TypeInfo::float(),
        }),
        "str" => Some(BuiltinSignature {
            params: vec![TypeInfo::int()],
            variadic: false,
            ret: TypeInfo::string(),
        }),
        _ => None,
    }
}

/// `len` also accepts a `Vector<_>` receiver; Sema special-cases this
/// because the free-function table above only covers the fixed-arity shape
/// for `string`. Vector's element type is generic, so this helper is
/// checked directly against the argument's resolved type instead of being
/// expressible in the static table above.
#[must_use]
pub fn accepts_len(arg: &TypeInfo) -> bool {
    matches!(arg.kind, TypeKind::String | TypeKind::Vector | TypeKind::Dict | TypeKind::Tuple)
}

/// Member builtins available on a `Vector<T>` receiver, keyed by name.
/// `push`/`pop`'s element type is the receiver's own element type, so these
/// are resolved against the concrete receiver rather than a static table.
#[must_use]
pub fn vector_member_signature(element: &TypeInfo, name: &str) -> Option<BuiltinSignature> {
    match name {
        "push" => Some(BuiltinSignature {
            params: vec![element.clone()],
            variadic: false,
            ret: TypeInfo::none(),
        }),
        "pop" => Some(BuiltinSignature {
            params: Vec::new(),
            variadic: false,
            ret: element.clone(),
        }),
        "len" => Some(BuiltinSignature {
            params: Vec::new(),
            variadic: false,
            ret: TypeInfo::int(),
        }),
        _ => None,
    }
}

#[must_use]
pub fn string_member_signature(name: &str) -> Option<BuiltinSignature> {
    match name {
        "len" => Some(BuiltinSignature {
            params: Vec::new(),
            variadic: false,
            ret: TypeInfo::int(),
        }),
        "upper" | "lower" => Some(BuiltinSignature {
            params: Vec::new(),
            variadic: false,
            ret: TypeInfo::string(),
        }),
        _ => None,
    }
}

/// Interns a member-builtin name against the fixed set this module knows
/// about, so call sites can record a `&'static str` without leaking a fresh
/// allocation per occurrence.
#[must_use]
pub fn member_builtin_name(name: &str) -> Option<&'static str> {
    match name {
        "push" => Some("push"),
        "pop" => Some("pop"),
        "len" => Some("len"),
        "upper" => Some("upper"),
        "lower" => Some("lower"),
        _ => None,
    }
}

/// Executes a free function builtin against already-evaluated arguments.
pub fn call_free_function(name: &str, args: &[Object], writer: &mut dyn PrintWriter) -> Object {
    match name {
        "print" => {
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    writer.push(' ');
                }
                writer.write(arg.to_string().into());
            }
            writer.push('\n');
            Object::None
        }
        "len" => call_len(&args[0]),
        "int" => match &args[0] {
            Object::Float(v) => Object::Int(*v as i64),
            other => other.clone(),
        },
        "float" => match &args[0] {
            Object::Int(v) => Object::Float(*v as f64),
            other => other.clone(),
        },
        "str" => Object::string(args[0].to_string()),
        _ => unreachable!("sema only resolves calls to known builtins"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CollectStringPrint;

    #[test]
    fn print_joins_multiple_arguments_with_a_space() {
        let mut writer = CollectStringPrint::new();
        call_free_function("print", &[Object::Int(1), Object::string("a")], &mut writer);
        assert_eq!(writer.into_output(), "1 a\n");
    }

    #[test]
    fn len_reports_vector_element_count() {
        let v = Object::vector(vec![Object::Int(1), Object::Int(2), Object::Int(3)]);
        assert!(matches!(call_free_function("len", &[v], &mut CollectStringPrint::new()), Object::Int(3)));
    }

    #[test]
    fn int_conversion_truncates_toward_zero() {
        let out = call_free_function("int", &[Object::Float(3.9)], &mut CollectStringPrint::new());
        assert!(matches!(out, Object::Int(3)));
    }

    #[test]
    fn vector_push_deep_clones_its_argument() {
        let inner = Object::vector(vec![Object::Int(1)]);
        let outer = Object::vector(Vec::new());
        call_member_builtin(&outer, "push", &[inner.clone()]);
        if let (Object::Vector(inner_vec), Object::Vector(outer_vec)) = (&inner, &outer) {
            inner_vec.borrow_mut().push(Object::Int(99));
            assert_eq!(outer_vec.borrow()[0].to_string(), "[1]", "pushed value must be a deep clone, not an alias");
        } else {
            unreachable!();
        }
    }

    #[test]
    fn string_upper_and_lower_member_builtins() {
        let s = Object::string("Hello");
        assert!(matches!(&call_member_builtin(&s, "upper", &[]), Object::String(v) if &*v.borrow() == "HELLO"));
        assert!(matches!(&call_member_builtin(&s, "lower", &[]), Object::String(v) if &*v.borrow() == "hello"));
    }

    #[test]
    fn vector_member_signature_uses_element_type_for_push_and_pop() {
        let sig = vector_member_signature(&TypeInfo::int(), "push").unwrap();
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0], TypeInfo::int());
        let pop_sig = vector_member_signature(&TypeInfo::int(), "pop").unwrap();
        assert_eq!(pop_sig.ret, TypeInfo::int());
    }
}

fn call_len(receiver: &Object) -> Object {
    let len = match receiver {
        Object::String(s) => s.borrow().len(),
        Object::Vector(v) => v.borrow().len(),
        Object::Tuple(t) => t.len(),
        Object::Dict(d) => d.borrow().len(),
        _ => unreachable!("sema only resolves len() against an iterable"),
    };
    Object::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

/// Executes a member builtin against an already-resolved receiver.
pub fn call_member_builtin(receiver: &Object, name: &str, args: &[Object]) -> Object {
    match (receiver, name) {
        (Object::Vector(v), "push") => {
            v.borrow_mut().push(args[0].deep_clone());
            Object::None
        }
        (Object::Vector(v), "pop") => v.borrow_mut().pop().unwrap_or(Object::None),
        (Object::Vector(v), "len") => Object::Int(i64::try_from(v.borrow().len()).unwrap_or(i64::MAX)),
        (Object::String(s), "len") => Object::Int(i64::try_from(s.borrow().len()).unwrap_or(i64::MAX)),
        (Object::String(s), "upper") => Object::string(s.borrow().to_uppercase()),
        (Object::String(s), "lower") => Object::string(s.borrow().to_lowercase()),
        _ => unreachable!("sema only resolves member builtins that exist for the receiver's type"),
    }
}
