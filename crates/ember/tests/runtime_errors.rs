use ember::Runner;

#[test]
fn division_by_zero_is_a_runtime_error() {
    let runner = Runner::new("let n = 0; 10 / n;").unwrap();
    assert!(runner.run_collecting_output().is_err());
}
