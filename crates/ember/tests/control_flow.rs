use ember::{Object, Runner};

#[test]
fn for_loop_sums_a_vector() {
    let source = "
        let total = 0;
        for x in [1, 2, 3, 4] {
            total = total + x;
        }
        total;
    ";
    let runner = Runner::new(source).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(10)));
}

#[test]
fn break_exits_the_enclosing_loop_early() {
    let source = "
        let total = 0;
        let i = 0;
        while i < 10 {
            if i == 3 { break; }
            total = total + i;
            i = i + 1;
        }
        total;
    ";
    let runner = Runner::new(source).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(3)));
}
