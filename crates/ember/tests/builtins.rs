use ember::{Object, Runner};

#[test]
fn print_builtin_writes_through_the_collecting_writer() {
    let runner = Runner::new(r#"print("hello", 42);"#).unwrap();
    let (_, output) = runner.run_collecting_output().unwrap();
    assert_eq!(output, "hello 42\n");
}

#[test]
fn vector_push_member_call_mutates_the_receiver_in_place() {
    let source = "
        let v = [1, 2, 3];
        v.push(4);
        len(v);
    ";
    let runner = Runner::new(source).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(4)));
}

#[test]
fn string_member_call_upper_returns_the_transformed_string() {
    let runner = Runner::new(r#"let s = "hi"; s.upper();"#).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::String(ref s) if &*s.borrow() == "HI"));
}

#[test]
fn vector_plus_scalar_appends_without_mutating_the_original() {
    let runner = Runner::new("let v = [1, 2, 3]; let w = v + 4; len(w);").unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(4)));
}

#[test]
fn string_times_int_repeats_the_string() {
    let runner = Runner::new(r#"let s = "ab" * 3; s;"#).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::String(ref s) if &*s.borrow() == "ababab"));
}
