use guwen::core::{compile, Runtime, Value};

fn run(code: &str) -> Value {
    let program = compile(code).expect("parse should succeed");
    Runtime::new().execute(&program).expect("run should succeed")
}

#[test]
fn falsy_while_never_enters_its_body() {
    let code = "令【计】为 数：0。\n当 阴：\n  令 计 为 计 加 1。\n求 计。\n";
    assert_eq!(run(code), Value::Number(0.0));
}

#[test]
fn zero_condition_counts_as_falsy() {
    let code = "令【计】为 数：0。\n当 0：\n  令 计 为 计 加 1。\n求 计。\n";
    assert_eq!(run(code), Value::Number(0.0));
}

#[test]
fn while_loops_until_the_condition_turns() {
    let code = "令【计】为 数：0。\n当 计 至多 4：\n  令 计 为 计 加 1。\n求 计。\n";
    assert_eq!(run(code), Value::Number(5.0));
}

#[test]
fn repeat_counter_is_one_based() {
    let code = "令【和】为 数：0。\n重复【序】3 次：\n  令 和 为 和 加 序。\n求 和。\n";
    // 1 + 2 + 3
    assert_eq!(run(code), Value::Number(6.0));
}

#[test]
fn repeat_without_counter_still_iterates() {
    let code = "令【计】为 数：0。\n重复 4 次：\n  令 计 为 计 加 1。\n求 计。\n";
    assert_eq!(run(code), Value::Number(4.0));
}

#[test]
fn negative_repeat_count_runs_zero_times() {
    let code = "令【计】为 数：0。\n重复 0 减 3 次：\n  令 计 为 计 加 1。\n求 计。\n";
    assert_eq!(run(code), Value::Number(0.0));
}

#[test]
fn branches_pick_the_first_truthy_condition() {
    let code = "令【甲】为 数：2。\n若 甲 是 1：\n  求 “一”。\n或若 甲 是 2：\n  求 “二”。\n不然：\n  求 “多”。\n";
    assert_eq!(run(code), Value::Text("二".to_string()));
}

#[test]
fn else_runs_when_every_branch_misses() {
    let code = "令【甲】为 数：9。\n若 甲 是 1：\n  求 “一”。\n不然：\n  求 “多”。\n";
    assert_eq!(run(code), Value::Text("多".to_string()));
}

#[test]
fn return_escapes_nested_blocks() {
    let code = concat!(
        "涵义【找】，需知 数【上】：\n",
        "  令【候】为 数：1。\n",
        "  当 阳：\n",
        "    若 候 至少 上：\n",
        "      求 候。\n",
        "    令 候 为 候 加 1。\n",
        "\n",
        "找，已知【上】为 5。\n",
    );
    assert_eq!(run(code), Value::Number(5.0));
}

#[test]
fn top_level_return_stops_the_program() {
    let code = "求 1。\n求 2。\n";
    assert_eq!(run(code), Value::Number(1.0));
}
