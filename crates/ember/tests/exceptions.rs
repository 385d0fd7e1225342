use ember::{Object, Runner};

#[test]
fn throw_inside_try_is_caught_and_handled() {
    let source = r#"
        fn risky() {
            throw "boom";
        }
        try {
            risky();
        } catch (string e) {
            42;
        }
    "#;
    let runner = Runner::new(source).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(42)));
}

#[test]
fn duplicate_catch_clause_types_are_a_sema_error() {
    let source = r#"
        try {
            throw "x";
        } catch (string e) {
        } catch (string f) {
        }
    "#;
    let diags = Runner::new(source).unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("duplicate catch")));
}
