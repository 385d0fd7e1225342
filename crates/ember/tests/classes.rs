use ember::{Object, Runner};

#[test]
fn class_methods_see_their_own_members_through_self() {
    let source = "
        class Counter {
            count: int;
            fn bump() -> int {
                self.count = self.count + 1;
                return self.count;
            }
        }
        let c = new Counter(0);
        c.bump();
        c.bump();
    ";
    let runner = Runner::new(source).unwrap();
    let (value, _) = runner.run_collecting_output().unwrap();
    assert!(matches!(value, Object::Int(2)));
}
