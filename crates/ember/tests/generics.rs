use ember::{Object, Runner};

#[test]
fn generic_function_is_instantiated_per_concrete_argument_type() {
    let runner = Runner::new("fn id<T>(x: T) -> T { return x; } id(7) + id(8);").unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(15)));
}

#[test]
fn generic_function_rejects_inconsistent_template_argument_types() {
    let diags = Runner::new("fn h<T>(x: T, y: T) -> T { return x; } h(1, \"s\");").unwrap_err();
    assert!(!diags.is_empty());
}

#[test]
fn generic_instantiation_error_is_wrapped_with_an_instantiation_note() {
    let source = "
        fn inc<T>(x: T) -> T {
            return x + true;
        }
        inc(1);
    ";
    let diags = Runner::new(source).unwrap_err();
    assert!(
        diags.iter().any(|d| d.notes.iter().any(|n| n.message.contains("in instantiation of"))),
        "expected an 'in instantiation of' note, got: {diags:?}"
    );
}
