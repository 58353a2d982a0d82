use std::fs;
use std::process::{Command, Stdio};

#[test]
fn run_subcommand_executes_a_script() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("hello.gw");
    fs::write(&script, "《志者》曰：曰。\n曰，已知【言】为 “你好”。\n").expect("write script");

    let output = Command::new(env!("CARGO_BIN_EXE_guwen"))
        .arg("run")
        .arg(&script)
        .output()
        .expect("spawn guwen run");
    assert!(output.status.success(), "run should succeed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("你好"), "stdout missing output: {stdout}");
}

#[test]
fn bare_file_argument_behaves_like_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("hello.gw");
    fs::write(&script, "《志者》曰：曰。\n曰，已知【言】为 “直行”。\n").expect("write script");

    let output = Command::new(env!("CARGO_BIN_EXE_guwen"))
        .arg(&script)
        .output()
        .expect("spawn guwen");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("直行"));
}

#[test]
fn run_reports_compile_errors_and_exits_nonzero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("broken.gw");
    fs::write(&script, "令 甲 为 “未完\n").expect("write script");

    let output = Command::new(env!("CARGO_BIN_EXE_guwen"))
        .arg("run")
        .arg(&script)
        .output()
        .expect("spawn guwen run");
    assert!(!output.status.success(), "broken script should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("译毕，有误："), "stderr missing prefix: {stderr}");
}

#[test]
fn run_reports_runtime_errors_with_their_own_prefix() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("missing.gw");
    fs::write(&script, "求 未见。\n").expect("write script");

    let output = Command::new(env!("CARGO_BIN_EXE_guwen"))
        .arg("run")
        .arg(&script)
        .output()
        .expect("spawn guwen run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("行毕，有误："), "stderr missing prefix: {stderr}");
}

#[test]
fn translate_writes_token_and_tree_dumps() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("prog.gw");
    fs::write(&script, "令【甲】为 数：3。\n求 甲 加 4。\n").expect("write script");

    let output = Command::new(env!("CARGO_BIN_EXE_guwen"))
        .arg("translate")
        .arg(&script)
        .output()
        .expect("spawn guwen translate");
    assert!(output.status.success(), "translate should succeed: {:?}", output);

    let tokens = fs::read_to_string(dir.path().join("prog.tokens.json")).expect("tokens dump");
    assert!(tokens.contains("\"kind\""), "tokens dump missing kinds: {tokens}");

    let ast = fs::read_to_string(dir.path().join("prog.ast.json")).expect("ast dump");
    assert!(ast.contains("\"kind\": \"Program\""), "ast dump missing root: {ast}");
    assert!(ast.contains("VariableDeclaration"));
}

#[test]
fn translate_honors_explicit_output_paths() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("prog.gw");
    fs::write(&script, "求 1。\n").expect("write script");
    let tokens_out = dir.path().join("t.json");
    let ast_out = dir.path().join("a.json");

    let status = Command::new(env!("CARGO_BIN_EXE_guwen"))
        .arg("translate")
        .arg(&script)
        .arg("--tokens-out")
        .arg(&tokens_out)
        .arg("--ast-out")
        .arg(&ast_out)
        .status()
        .expect("spawn guwen translate");
    assert!(status.success());
    assert!(tokens_out.exists());
    assert!(ast_out.exists());
}

#[test]
fn repl_runs_a_pending_block_when_stdin_ends() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_guwen"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn repl");
    {
        use std::io::Write;
        let stdin = child.stdin.as_mut().expect("stdin");
        // No blank line before EOF: the open block must still run.
        writeln!(stdin, "若 阳：").ok();
        writeln!(stdin, "  求 6。").ok();
    }
    let out = child.wait_with_output().expect("wait repl");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains('6'), "repl should run the buffered block: {stdout}");
}

#[test]
fn repl_exits_on_the_closing_word() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_guwen"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn repl");
    {
        use std::io::Write;
        let stdin = child.stdin.as_mut().expect("stdin");
        writeln!(stdin, "求 1 加 2。").ok();
        writeln!(stdin, "致知").ok();
    }
    let out = child.wait_with_output().expect("wait repl");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains('3'), "repl should echo the result: {stdout}");
}
