use ember::{Object, Runner};

#[test]
fn runs_a_simple_function_call() {
    let runner = Runner::new("fn f(x: int) -> int { return x * 2; } f(21);").unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(42)));
}

#[test]
fn reports_sema_errors_for_missing_return() {
    let diags = Runner::new("fn f() -> int { }").unwrap_err();
    assert!(!diags.is_empty());
}

#[test]
fn missing_return_in_non_none_function_is_a_sema_error() {
    let diags = Runner::new("fn g() -> int { }").unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("must return a value of type")));
}

#[test]
fn recursive_function_computes_factorial() {
    let source = "
        fn fact(n: int) -> int {
            if n <= 1 { return 1; }
            return n * fact(n - 1);
        }
        fact(5);
    ";
    let runner = Runner::new(source).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(120)));
}

#[test]
fn local_variable_declared_in_a_function_body_resolves_correctly() {
    let source = "
        fn double_plus_one(x: int) -> int {
            let doubled = x * 2;
            return doubled + 1;
        }
        double_plus_one(10);
    ";
    let runner = Runner::new(source).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(21)));
}

#[test]
fn nested_block_in_a_function_body_sees_the_enclosing_argument() {
    let source = "
        fn classify(n: int) -> int {
            if n > 0 {
                let adjusted = n + 100;
                return adjusted;
            }
            return 0;
        }
        classify(5);
    ";
    let runner = Runner::new(source).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(105)));
}

#[test]
fn while_loop_in_a_function_body_mutates_a_local_declared_in_the_body() {
    let source = "
        fn sum_to(n: int) -> int {
            let total = 0;
            let i = 1;
            while i <= n {
                total = total + i;
                i = i + 1;
            }
            return total;
        }
        sum_to(4);
    ";
    let runner = Runner::new(source).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(10)));
}

#[test]
fn a_function_that_only_returns_on_one_branch_is_a_sema_error() {
    let source = "
        fn classify(n: int) -> int {
            if n > 0 {
                return 1;
            }
            n;
        }
    ";
    let diags = Runner::new(source).unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("expected return-statement")));
}

#[test]
fn calling_a_function_value_stored_in_a_local_variable_works() {
    let source = "
        fn double(x: int) -> int { return x * 2; }
        let f = double;
        f(21);
    ";
    let runner = Runner::new(source).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(42)));
}

#[test]
fn calling_a_non_function_value_is_a_sema_error() {
    let diags = Runner::new("let n = 5; n(1);").unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("expected callable")));
}

#[test]
fn a_method_name_is_not_callable_as_a_free_function() {
    let source = "
        class Counter {
            count: int;
            fn bump() -> int {
                self.count = self.count + 1;
                return self.count;
            }
        }
        bump();
    ";
    let diags = Runner::new(source).unwrap_err();
    assert!(diags.iter().any(|d| d.message.contains("is not defined")));
}
