use guwen::core::{compile, Runtime, RuntimeErrorKind, Value};

fn run(code: &str) -> Result<Value, guwen::core::RuntimeError> {
    let program = compile(code).expect("parse should succeed");
    Runtime::new().execute(&program)
}

#[test]
fn imported_conversion_parses_text_into_a_number() {
    let code = "《春秋》曰：为数。\n为数，已知【值】为 “42”。\n";
    assert_eq!(run(code).expect("run"), Value::Number(42.0));
}

#[test]
fn conversion_to_text_renders_whole_numbers_plainly() {
    let code = "《春秋》曰：为文言。\n为文言，已知【值】为 7。\n";
    assert_eq!(run(code).expect("run"), Value::Text("7".to_string()));
}

#[test]
fn polarize_reads_zero_as_false() {
    let code = "《春秋》曰：极化。\n极化，已知【值】为 0。\n";
    assert_eq!(run(code).expect("run"), Value::Boolean(false));
}

#[test]
fn missing_symbol_names_the_module_and_symbol() {
    let err = run("《春秋》曰：不存在。\n").expect_err("should fail");
    assert_eq!(err.kind, RuntimeErrorKind::Lookup);
    let message = err.to_string();
    assert!(message.contains("春秋"), "unexpected message: {message}");
    assert!(message.contains("不存在"), "unexpected message: {message}");
}

#[test]
fn unknown_module_is_a_lookup_error() {
    let err = run("《无名》曰：某。\n").expect_err("should fail");
    assert_eq!(err.kind, RuntimeErrorKind::Lookup);
    assert!(err.to_string().contains("无名"));
}

#[test]
fn speak_returns_the_printed_line() {
    let code = "《志者》曰：曰。\n曰，已知【言】为 “好”。\n";
    assert_eq!(run(code).expect("run"), Value::Text("好".to_string()));
}

#[test]
fn unimported_builtin_stays_unknown() {
    let err = run("曰，已知【言】为 “好”。\n").expect_err("should fail");
    assert_eq!(err.kind, RuntimeErrorKind::Lookup);
}

#[test]
fn random_pick_from_a_single_point_range() {
    let code = "《天命》曰：随缘。\n随缘，已知【始】为 2，【终】为 2。\n";
    assert_eq!(run(code).expect("run"), Value::Number(2.0));
}

#[test]
fn coin_flip_extremes_are_deterministic() {
    let always = "《天命》曰：掷币。\n掷币，已知【势】为 100。\n";
    assert_eq!(run(always).expect("run"), Value::Boolean(true));
    let never = "《天命》曰：掷币。\n掷币，已知【势】为 0。\n";
    assert_eq!(run(never).expect("run"), Value::Boolean(false));
}

#[test]
fn load_module_exposes_the_registry() {
    use guwen::core::environment::ModuleLibrary;

    let runtime = Runtime::new();
    let library = runtime.load_module("春秋").expect("春秋 should be registered");
    assert!(library.functions.contains_key("为数"));
    assert!(runtime.load_module("无名").is_none());

    runtime.register_module("外库", ModuleLibrary::default());
    assert!(runtime.load_module("外库").is_some());
}

#[test]
fn imports_in_a_call_frame_do_not_leak_out() {
    let code = concat!(
        "涵义【借】，需知 数【值】：\n",
        "  《春秋》曰：为数。\n",
        "  求 为数 已知【值】为 值。\n",
        "借，已知【值】为 1。\n",
        "为数，已知【值】为 2。\n",
    );
    // The callee imported 为数 into its own frame; the root never saw it.
    let err = run(code).expect_err("import should stay in the frame");
    assert_eq!(err.kind, RuntimeErrorKind::Lookup);
}
