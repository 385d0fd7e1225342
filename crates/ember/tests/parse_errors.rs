use ember::Runner;

#[test]
fn reports_parse_errors() {
    assert!(Runner::new("fn f( {").is_err());
}
