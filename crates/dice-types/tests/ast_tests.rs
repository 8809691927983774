//! AST serialization tests: a front end in another process hands the
//! evaluator its tree as JSON, so the serde shape is part of the contract.

use dice_types::{BinOp, Node};

#[test]
fn node_json_round_trip() {
    let program = Node::Program(vec![
        Node::Assign {
            name: "x".into(),
            value: Box::new(Node::Binary {
                left: Box::new(Node::NumberLit(1.0)),
                op: BinOp::Add,
                right: Box::new(Node::NumberLit(2.0)),
            }),
        },
        Node::Call {
            callee: Box::new(Node::Identifier("print".into())),
            args: vec![Node::Identifier("x".into())],
        },
    ]);

    let json = serde_json::to_string(&program).expect("serialize");
    let back: Node = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, program);
}

#[test]
fn program_parses_from_external_json() {
    // The shape an external parser would emit.
    let json = r#"
    {
      "Program": [
        { "Loop": {
            "var": "i",
            "range": { "Range": {
                "start": { "NumberLit": 0.0 },
                "end": { "NumberLit": 3.0 },
                "inclusive": false
            } },
            "body": { "Block": [
                { "Call": {
                    "callee": { "Identifier": "print" },
                    "args": [ { "Identifier": "i" } ]
                } }
            ] }
        } }
      ]
    }
    "#;
    let node: Node = serde_json::from_str(json).expect("deserialize");
    let Node::Program(stmts) = &node else {
        panic!("expected a program");
    };
    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].kind_name(), "loop");
}

#[test]
fn kind_names() {
    assert_eq!(Node::Parallel(vec![]).kind_name(), "parallel");
    assert_eq!(
        Node::If {
            condition: Box::new(Node::BoolLit(true)),
            then_block: Box::new(Node::Block(vec![])),
            else_block: None,
        }
        .kind_name(),
        "if"
    );
    assert_eq!(BinOp::LessEq.symbol(), "<=");
}
