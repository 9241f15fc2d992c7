use crate::{
    ast::{
        node::{
            Call, Declaration, FormalParameter, FunctionDecl, GetConstField, Node, Return,
            StatementList, VarDeclList,
        },
        op::NumOp,
        Const,
    },
    Context, JsValue,
};

fn eval(statements: Vec<Node>) -> JsValue {
    let mut context = Context::new();
    context
        .evaluate(&StatementList::from(statements))
        .expect("program should not throw")
}

fn adder_decl() -> Node {
    FunctionDecl::new(
        Some("add".into()),
        vec![
            FormalParameter::new(Declaration::new("a", None), false),
            FormalParameter::new(Declaration::new("b", None), false),
        ],
        vec![Return::new(crate::ast::node::BinOp::new(
            NumOp::Add,
            Node::identifier("a"),
            Node::identifier("b"),
        ))
        .into()],
    )
    .into()
}

#[test]
fn call_with_explicit_this_and_arguments() {
    let result = eval(vec![
        adder_decl(),
        Call::new(
            GetConstField::new(Node::identifier("add"), "call"),
            vec![
                Const::Null.into(),
                Const::from(20).into(),
                Const::from(22).into(),
            ],
        )
        .into(),
    ]);
    assert_eq!(result.as_number(), Some(42.0));
}

#[test]
fn apply_spreads_an_array_like() {
    let result = eval(vec![
        adder_decl(),
        Call::new(
            GetConstField::new(Node::identifier("add"), "apply"),
            vec![
                Const::Null.into(),
                crate::ast::node::ArrayDecl::from(vec![
                    Const::from(1).into(),
                    Const::from(2).into(),
                ])
                .into(),
            ],
        )
        .into(),
    ]);
    assert_eq!(result.as_number(), Some(3.0));
}

#[test]
fn bound_functions_prepend_their_arguments() {
    let result = eval(vec![
        adder_decl(),
        VarDeclList::new(vec![Declaration::new(
            "add5",
            Some(
                Call::new(
                    GetConstField::new(Node::identifier("add"), "bind"),
                    vec![Const::Null.into(), Const::from(5).into()],
                )
                .into(),
            ),
        )])
        .into(),
        Call::new(Node::identifier("add5"), vec![Const::from(37).into()]).into(),
    ]);
    assert_eq!(result.as_number(), Some(42.0));
}

#[test]
fn missing_arguments_are_undefined() {
    let result = eval(vec![
        FunctionDecl::new(
            Some("probe".into()),
            vec![FormalParameter::new(Declaration::new("x", None), false)],
            vec![Return::new(crate::ast::node::BinOp::new(
                crate::ast::op::CompOp::StrictEqual,
                Node::identifier("x"),
                Const::Undefined,
            ))
            .into()],
        )
        .into(),
        Call::new(Node::identifier("probe"), vec![]).into(),
    ]);
    assert_eq!(result.as_boolean(), Some(true));
}

#[test]
fn function_length_counts_simple_parameters() {
    let result = eval(vec![
        adder_decl(),
        GetConstField::new(Node::identifier("add"), "length").into(),
    ]);
    assert_eq!(result.as_number(), Some(2.0));
}

#[test]
fn arguments_object_length_is_actual_argument_count() {
    let result = eval(vec![
        FunctionDecl::new(
            Some("count".into()),
            vec![FormalParameter::new(Declaration::new("a", None), false)],
            vec![Return::new(GetConstField::new(
                Node::identifier("arguments"),
                "length",
            ))
            .into()],
        )
        .into(),
        Call::new(
            Node::identifier("count"),
            vec![
                Const::from(1).into(),
                Const::from(2).into(),
                Const::from(3).into(),
            ],
        )
        .into(),
    ]);
    assert_eq!(result.as_number(), Some(3.0));
}

#[test]
fn arguments_callee_is_poisoned() {
    let mut context = Context::new();
    let program = StatementList::from(vec![
        FunctionDecl::new(
            Some("f".into()),
            vec![],
            vec![Return::new(GetConstField::new(
                Node::identifier("arguments"),
                "callee",
            ))
            .into()],
        )
        .into(),
        Call::new(Node::identifier("f"), vec![]).into(),
    ]);
    let error = context
        .evaluate(&program)
        .expect_err("arguments.callee must throw");
    assert_eq!(
        error.as_native().map(|native| native.kind),
        Some(crate::NativeErrorKind::Type)
    );
}
