use guwen::core::{compile, AstNode};

#[test]
fn block_extent_follows_indentation() {
    let code = "当 阳：\n  令 甲 为 1。\n  令 乙 为 2。\n令 丙 为 3。\n";
    let program = compile(code).expect("parse should succeed");
    let AstNode::Program { body, .. } = &program else { panic!("not a program") };
    assert_eq!(body.len(), 2, "the while block should absorb only the indented lines");
    let AstNode::WhileStatement { body: loop_body, .. } = &body[0] else {
        panic!("expected while, got {}", body[0].kind_name())
    };
    assert_eq!(loop_body.len(), 2);
}

#[test]
fn else_attaches_at_the_matching_column() {
    let code = "若 阳：\n  令 甲 为 1。\n不然：\n  令 甲 为 2。\n";
    let program = compile(code).expect("parse should succeed");
    let AstNode::Program { body, .. } = &program else { panic!("not a program") };
    assert_eq!(body.len(), 1);
    let AstNode::IfStatement { branches, else_body, .. } = &body[0] else {
        panic!("expected if, got {}", body[0].kind_name())
    };
    assert_eq!(branches.len(), 1);
    assert!(else_body.is_some());
}

#[test]
fn elseif_chains_collect_into_one_statement() {
    let code = "若 甲 是 1：\n  求 1。\n或若 甲 是 2：\n  求 2。\n或若 甲 是 3：\n  求 3。\n";
    let program = compile(code).expect("parse should succeed");
    let AstNode::Program { body, .. } = &program else { panic!("not a program") };
    assert_eq!(body.len(), 1);
    let AstNode::IfStatement { branches, else_body, .. } = &body[0] else {
        panic!("expected if, got {}", body[0].kind_name())
    };
    assert_eq!(branches.len(), 3);
    assert!(else_body.is_none());
}

#[test]
fn power_is_right_associative() {
    let program = compile("求 2 幂 3 幂 2。").expect("parse should succeed");
    let json = serde_json::to_string(&program).expect("serialize");
    // 2 幂 (3 幂 2): the right operand is itself a power expression.
    let AstNode::Program { body, .. } = &program else { panic!("not a program") };
    let AstNode::ReturnStatement { expression, .. } = &body[0] else { panic!("expected return") };
    let AstNode::BinaryExpression { operator, right, .. } = expression.as_ref() else {
        panic!("expected binary expression")
    };
    assert_eq!(operator, "幂");
    assert!(matches!(right.as_ref(), AstNode::BinaryExpression { operator, .. } if operator == "幂"));
    assert!(json.contains("\"kind\":\"ReturnStatement\""));
}

#[test]
fn syntax_tree_dump_is_deterministic() {
    let code = "涵义【并】，需知 数【左】，数【右】：\n  求 左 加 右。\n并，已知【左】为 1，【右】为 2。\n";
    let first = serde_json::to_string(&compile(code).expect("parse")).expect("serialize");
    let second = serde_json::to_string(&compile(code).expect("parse")).expect("serialize");
    assert_eq!(first, second);
    assert!(first.contains("\"kind\":\"FunctionDeclaration\""));
    assert!(first.contains("\"kind\":\"FunctionCall\""));
}

#[test]
fn number_literal_without_digits_is_rejected() {
    let err = compile("求 十。").expect_err("unit-only numeral should fail");
    assert!(err.to_string().contains("no digits"), "unexpected message: {err}");
}

#[test]
fn missing_period_is_a_parse_error() {
    let err = compile("令 甲 为 1").expect_err("missing 。 should fail");
    assert!(err.to_string().contains("。"), "unexpected message: {err}");
}
