use crate::{
    ast::{
        node::{
            ArrayDecl, ArrowFunctionDecl, Assign, AssignTarget, AsyncFunctionDecl, AwaitExpr,
            BinOp, BindingPatternTypeArray, Block, Break, Call, Case, Catch, Class,
            ClassConstructor, ClassElement, ClassElementName, ConstDeclList, Declaration,
            DeclarationPattern, DeclarationPatternArray, ForLoop, FormalParameter, FunctionDecl,
            FunctionExpr, GeneratorDecl, GetConstField, GetField, GetPrivateField, Identifier,
            If, Labelled, LetDeclList, MethodDefinitionKind, New, Object as ObjectLiteral,
            PropertyDefinition, Return, Spread, StatementList, Switch, Throw, Try, UnaryOp,
            VarDeclList, WhileLoop, Yield,
        },
        op::{AssignOp, CompOp, LogOp, NumOp, UnaryOp as UnaryOpKind},
        Const, Node,
    },
    builtins::promise::PromiseState,
    object::ObjectData,
    Context, JsValue,
};

fn eval_program(statements: Vec<Node>) -> Result<JsValue, crate::JsError> {
    let mut context = Context::new();
    context.evaluate(&StatementList::from(statements))
}

fn eval_ok(statements: Vec<Node>) -> JsValue {
    eval_program(statements).expect("program should not throw")
}

fn number_binop(op: NumOp, lhs: Node, rhs: Node) -> Node {
    BinOp::new(op, lhs, rhs).into()
}

#[test]
fn literals_and_arithmetic() {
    let result = eval_ok(vec![number_binop(
        NumOp::Add,
        Const::from(40).into(),
        Const::from(2).into(),
    )]);
    assert_eq!(result.as_number(), Some(42.0));

    let concat = eval_ok(vec![number_binop(
        NumOp::Add,
        Const::from("foo").into(),
        Const::from(1).into(),
    )]);
    assert_eq!(concat.as_string().map(|s| s.as_str()), Some("foo1"));
}

#[test]
fn var_declarations_and_references() {
    let result = eval_ok(vec![
        VarDeclList::new(vec![Declaration::new("a", Some(Const::from(5).into()))]).into(),
        number_binop(NumOp::Mul, Node::identifier("a"), Const::from(3).into()),
    ]);
    assert_eq!(result.as_number(), Some(15.0));
}

#[test]
fn tdz_read_throws_reference_error_with_catchable_constructor_name() {
    // Reading a `let` before its declaration statement throws a catchable
    // ReferenceError.
    let function = FunctionExpr::new(
        None,
        vec![],
        vec![
            Try::new(
                vec![Node::identifier("x")],
                Some(Catch::new(
                    Declaration::new("e", None),
                    vec![Return::new(GetConstField::new(
                        GetConstField::new(Node::identifier("e"), "constructor"),
                        "name",
                    ))
                    .into()],
                )),
                None,
            )
            .into(),
            LetDeclList::new(vec![Declaration::new("x", None)]).into(),
        ],
    );
    let result = eval_ok(vec![Call::new(function, vec![]).into()]);
    assert_eq!(
        result.as_string().map(|s| s.as_str()),
        Some("ReferenceError")
    );
}

#[test]
fn const_assignment_throws_type_error() {
    let result = eval_program(vec![
        ConstDeclList::new(vec![Declaration::new("c", Some(Const::from(1).into()))]).into(),
        Assign::new(AssignTarget::Identifier("c".into()), Const::from(2)).into(),
    ]);
    let error = result.expect_err("const assignment must throw");
    assert_eq!(
        error.as_native().map(|native| native.kind),
        Some(crate::NativeErrorKind::Type)
    );
}

#[test]
fn function_hoisting_allows_early_calls() {
    let result = eval_ok(vec![
        VarDeclList::new(vec![Declaration::new(
            "result",
            Some(Call::new(Node::identifier("f"), vec![]).into()),
        )])
        .into(),
        FunctionDecl::new(
            Some("f".into()),
            vec![],
            vec![Return::new(Const::from(7)).into()],
        )
        .into(),
        Node::identifier("result"),
    ]);
    assert_eq!(result.as_number(), Some(7.0));
}

#[test]
fn closures_capture_their_environment() {
    // function make(n) { return function() { return n; } }
    let result = eval_ok(vec![
        FunctionDecl::new(
            Some("make".into()),
            vec![FormalParameter::new(Declaration::new("n", None), false)],
            vec![Return::new(FunctionExpr::new(
                None,
                vec![],
                vec![Return::new(Node::identifier("n")).into()],
            ))
            .into()],
        )
        .into(),
        Call::new(
            Call::new(Node::identifier("make"), vec![Const::from(11).into()]),
            vec![],
        )
        .into(),
    ]);
    assert_eq!(result.as_number(), Some(11.0));
}

#[test]
fn parameter_defaults_and_rest() {
    // function f(a, b = a + 1, ...rest) { return b * 10 + rest.length; }
    let result = eval_ok(vec![
        FunctionDecl::new(
            Some("f".into()),
            vec![
                FormalParameter::new(Declaration::new("a", None), false),
                FormalParameter::new(
                    Declaration::new(
                        "b",
                        Some(number_binop(
                            NumOp::Add,
                            Node::identifier("a"),
                            Const::from(1).into(),
                        )),
                    ),
                    false,
                ),
                FormalParameter::new(Declaration::new("rest", None), true),
            ],
            vec![Return::new(number_binop(
                NumOp::Add,
                number_binop(
                    NumOp::Mul,
                    Node::identifier("b"),
                    Const::from(10).into(),
                ),
                GetConstField::new(Node::identifier("rest"), "length").into(),
            ))
            .into()],
        )
        .into(),
        Call::new(
            Node::identifier("f"),
            vec![
                Const::from(2).into(),
                Const::from(Const::Undefined).into(),
                Const::from(8).into(),
                Const::from(9).into(),
            ],
        )
        .into(),
    ]);
    // b defaults to a + 1 = 3, rest = [8, 9].
    assert_eq!(result.as_number(), Some(32.0));
}

#[test]
fn mapped_arguments_alias_parameters_both_ways() {
    // function f(a) { arguments[0] = 9; return a; }
    let result = eval_ok(vec![
        FunctionDecl::new(
            Some("f".into()),
            vec![FormalParameter::new(Declaration::new("a", None), false)],
            vec![
                Assign::new(
                    AssignTarget::IndexedField(GetField::new(
                        Node::identifier("arguments"),
                        Const::from(0),
                    )),
                    Const::from(9),
                )
                .into(),
                Return::new(Node::identifier("a")).into(),
            ],
        )
        .into(),
        Call::new(Node::identifier("f"), vec![Const::from(1).into()]).into(),
    ]);
    assert_eq!(result.as_number(), Some(9.0));
}

#[test]
fn arrow_functions_capture_this() {
    // var o = { v: 3, m: function() { var f = () => this.v; return f(); } };
    let result = eval_ok(vec![
        VarDeclList::new(vec![Declaration::new(
            "o",
            Some(
                ObjectLiteral::from(vec![
                    PropertyDefinition::property("v", Const::from(3)),
                    PropertyDefinition::method_definition(
                        MethodDefinitionKind::Ordinary,
                        "m",
                        FunctionExpr::new(
                            None,
                            vec![],
                            vec![
                                VarDeclList::new(vec![Declaration::new(
                                    "f",
                                    Some(
                                        ArrowFunctionDecl::new(
                                            vec![],
                                            vec![Return::new(GetConstField::new(
                                                Node::This,
                                                "v",
                                            ))
                                            .into()],
                                        )
                                        .into(),
                                    ),
                                )])
                                .into(),
                                Return::new(Call::new(Node::identifier("f"), vec![]))
                                    .into(),
                            ],
                        ),
                    ),
                ])
                .into(),
            ),
        )])
        .into(),
        Call::new(GetConstField::new(Node::identifier("o"), "m"), vec![]).into(),
    ]);
    assert_eq!(result.as_number(), Some(3.0));
}

#[test]
fn switch_falls_through_until_break() {
    let program = |discriminant: i32| {
        vec![
            VarDeclList::new(vec![Declaration::new("r", Some(Const::from(0).into()))]).into(),
            Switch::new(
                Const::from(discriminant),
                vec![
                    Case::new(
                        Const::from(1),
                        vec![Assign::new(
                            AssignTarget::Identifier("r".into()),
                            number_binop(
                                NumOp::Add,
                                Node::identifier("r"),
                                Const::from(1).into(),
                            ),
                        )
                        .into()],
                    ),
                    Case::new(
                        Const::from(2),
                        vec![
                            Assign::new(
                                AssignTarget::Identifier("r".into()),
                                number_binop(
                                    NumOp::Add,
                                    Node::identifier("r"),
                                    Const::from(10).into(),
                                ),
                            )
                            .into(),
                            Break::new::<&str, Option<&str>>(None).into(),
                        ],
                    ),
                ],
                StatementList::from(vec![Assign::new(
                    AssignTarget::Identifier("r".into()),
                    Const::from(100),
                )
                .into()]),
            )
            .into(),
            Node::identifier("r"),
        ]
    };
    assert_eq!(eval_ok(program(1)).as_number(), Some(11.0));
    assert_eq!(eval_ok(program(2)).as_number(), Some(10.0));
    assert_eq!(eval_ok(program(7)).as_number(), Some(100.0));
}

#[test]
fn labelled_break_exits_outer_loop() {
    // outer: while (true) { while (true) { break outer; } } ; 1
    let result = eval_ok(vec![
        Labelled::new(
            "outer",
            WhileLoop::new(
                Const::from(true),
                Block::from(vec![WhileLoop::new(
                    Const::from(true),
                    Block::from(vec![Break::new("outer").into()]),
                )
                .into()]),
            ),
        )
        .into(),
        Const::from(1).into(),
    ]);
    assert_eq!(result.as_number(), Some(1.0));
}

#[test]
fn try_finally_runs_on_return_paths() {
    // function f() { try { return 1; } finally { sideEffect = 2; } }
    let result = eval_ok(vec![
        FunctionDecl::new(
            Some("f".into()),
            vec![],
            vec![Try::new(
                vec![Return::new(Const::from(1)).into()],
                None,
                Some(
                    vec![Assign::new(
                        AssignTarget::Identifier("sideEffect".into()),
                        Const::from(2),
                    )
                    .into()]
                    .into(),
                ),
            )
            .into()],
        )
        .into(),
        number_binop(
            NumOp::Add,
            Call::new(Node::identifier("f"), vec![]).into(),
            Node::identifier("sideEffect"),
        ),
    ]);
    assert_eq!(result.as_number(), Some(3.0));
}

#[test]
fn thrown_values_are_caught_by_matching_catch() {
    let result = eval_ok(vec![Try::new(
        vec![Throw::new(Const::from("boom")).into()],
        Some(Catch::new(
            Declaration::new("e", None),
            vec![Node::identifier("e")],
        )),
        None,
    )
    .into()]);
    assert_eq!(result.as_string().map(|s| s.as_str()), Some("boom"));
}

#[test]
fn classes_with_inheritance_and_super() {
    // class A { constructor() { this.x = 1; } }
    // class B extends A { constructor() { super(); this.y = 2; } }
    // new B().x + new B().y === 3
    let class_a = Class::new(
        Some("A".into()),
        None::<Node>,
        Some(ClassConstructor::new(
            vec![],
            vec![Assign::new(
                AssignTarget::Field(GetConstField::new(Node::This, "x")),
                Const::from(1),
            )
            .into()],
        )),
        vec![],
    );
    let class_b = Class::new(
        Some("B".into()),
        Some(Node::identifier("A")),
        Some(ClassConstructor::new(
            vec![],
            vec![
                crate::ast::node::SuperCall::new(vec![]).into(),
                Assign::new(
                    AssignTarget::Field(GetConstField::new(Node::This, "y")),
                    Const::from(2),
                )
                .into(),
            ],
        )),
        vec![],
    );
    let result = eval_ok(vec![
        Node::ClassDecl(class_a),
        Node::ClassDecl(class_b),
        number_binop(
            NumOp::Add,
            GetConstField::new(New::from(Call::new(Node::identifier("B"), vec![])), "x")
                .into(),
            GetConstField::new(New::from(Call::new(Node::identifier("B"), vec![])), "y")
                .into(),
        ),
    ]);
    assert_eq!(result.as_number(), Some(3.0));
}

#[test]
fn this_before_super_throws_reference_error() {
    let class_a = Class::new(Some("A".into()), None::<Node>, None, vec![]);
    let class_b = Class::new(
        Some("B".into()),
        Some(Node::identifier("A")),
        Some(ClassConstructor::new(
            vec![],
            vec![Assign::new(
                AssignTarget::Field(GetConstField::new(Node::This, "y")),
                Const::from(2),
            )
            .into()],
        )),
        vec![],
    );
    let error = eval_program(vec![
        Node::ClassDecl(class_a),
        Node::ClassDecl(class_b),
        New::from(Call::new(Node::identifier("B"), vec![])).into(),
    ])
    .expect_err("accessing this before super must throw");
    assert_eq!(
        error.as_native().map(|native| native.kind),
        Some(crate::NativeErrorKind::Reference)
    );
}

#[test]
fn instance_field_initializers_run_base_first() {
    // class A { a = 1; } class B extends A { b = 2; }
    let class_a = Class::new(
        Some("A".into()),
        None::<Node>,
        None,
        vec![ClassElement::Field {
            name: ClassElementName::from("a"),
            init: Some(Const::from(1).into()),
            is_static: false,
        }],
    );
    let class_b = Class::new(
        Some("B".into()),
        Some(Node::identifier("A")),
        None,
        vec![ClassElement::Field {
            name: ClassElementName::from("b"),
            init: Some(Const::from(2).into()),
            is_static: false,
        }],
    );
    let result = eval_ok(vec![
        Node::ClassDecl(class_a),
        Node::ClassDecl(class_b),
        VarDeclList::new(vec![Declaration::new(
            "o",
            Some(New::from(Call::new(Node::identifier("B"), vec![])).into()),
        )])
        .into(),
        number_binop(
            NumOp::Add,
            GetConstField::new(Node::identifier("o"), "a").into(),
            GetConstField::new(Node::identifier("o"), "b").into(),
        ),
    ]);
    assert_eq!(result.as_number(), Some(3.0));
}

#[test]
fn private_fields_are_scoped_to_the_class_body() {
    // class C { #x = 41; get() { return this.#x + 1; } }
    let class_c = Class::new(
        Some("C".into()),
        None::<Node>,
        None,
        vec![
            ClassElement::Field {
                name: ClassElementName::Private("x".into()),
                init: Some(Const::from(41).into()),
                is_static: false,
            },
            ClassElement::Method {
                name: ClassElementName::from("get"),
                kind: MethodDefinitionKind::Ordinary,
                parameters: vec![].into(),
                body: vec![Return::new(number_binop(
                    NumOp::Add,
                    GetPrivateField::new(Node::This, "x").into(),
                    Const::from(1).into(),
                ))
                .into()]
                .into(),
                is_static: false,
            },
        ],
    );
    let result = eval_ok(vec![
        Node::ClassDecl(class_c),
        Call::new(
            GetConstField::new(
                New::from(Call::new(Node::identifier("C"), vec![])),
                "get",
            ),
            vec![],
        )
        .into(),
    ]);
    assert_eq!(result.as_number(), Some(42.0));

    // Accessing a private member outside any class body is a SyntaxError.
    let error = eval_program(vec![
        VarDeclList::new(vec![Declaration::new(
            "o",
            Some(ObjectLiteral::from(vec![]).into()),
        )])
        .into(),
        GetPrivateField::new(Node::identifier("o"), "x").into(),
    ])
    .expect_err("private access outside a class must throw");
    assert_eq!(
        error.as_native().map(|native| native.kind),
        Some(crate::NativeErrorKind::Syntax)
    );
}

#[test]
fn generators_yield_in_sequence() {
    // function* g() { yield 1; yield 2; yield 3; } [...g()]
    let result = eval_ok(vec![
        GeneratorDecl::new(
            Some("g".into()),
            vec![],
            vec![
                Yield::new(Node::from(Const::from(1)), false).into(),
                Yield::new(Node::from(Const::from(2)), false).into(),
                Yield::new(Node::from(Const::from(3)), false).into(),
            ],
        )
        .into(),
        ArrayDecl::from(vec![Spread::new(Call::new(Node::identifier("g"), vec![]))
            .into()])
        .into(),
        Call::new(
            GetConstField::new(
                ArrayDecl::from(vec![Spread::new(Call::new(
                    Node::identifier("g"),
                    vec![],
                ))
                .into()]),
                "join",
            ),
            vec![Const::from(",").into()],
        )
        .into(),
    ]);
    assert_eq!(result.as_string().map(|s| s.as_str()), Some("1,2,3"));
}

#[test]
fn generators_resume_loops_without_replaying_iterations() {
    // function* g() { for (let i = 0; i < 3; i = i + 1) { yield i; } }
    let result = eval_ok(vec![
        GeneratorDecl::new(
            Some("g".into()),
            vec![],
            vec![ForLoop::new(
                Some(
                    LetDeclList::new(vec![Declaration::new(
                        "i",
                        Some(Const::from(0).into()),
                    )])
                    .into(),
                ),
                Some(
                    BinOp::new(
                        CompOp::LessThan,
                        Node::identifier("i"),
                        Const::from(3),
                    )
                    .into(),
                ),
                Some(
                    Assign::new(
                        AssignTarget::Identifier("i".into()),
                        number_binop(
                            NumOp::Add,
                            Node::identifier("i"),
                            Const::from(1).into(),
                        ),
                    )
                    .into(),
                ),
                Block::from(vec![Yield::new(Node::identifier("i"), false).into()]),
            )
            .into()],
        )
        .into(),
        Call::new(
            GetConstField::new(
                ArrayDecl::from(vec![Spread::new(Call::new(
                    Node::identifier("g"),
                    vec![],
                ))
                .into()]),
                "join",
            ),
            vec![Const::from(",").into()],
        )
        .into(),
    ]);
    assert_eq!(result.as_string().map(|s| s.as_str()), Some("0,1,2"));
}

#[test]
fn generator_next_receives_sent_values() {
    // function* g() { const a = yield 1; yield a * 2; }
    // const it = g(); it.next(); it.next(21).value === 42
    let result = eval_ok(vec![
        GeneratorDecl::new(
            Some("g".into()),
            vec![],
            vec![
                ConstDeclList::new(vec![Declaration::new(
                    "a",
                    Some(Yield::new(Node::from(Const::from(1)), false).into()),
                )])
                .into(),
                Yield::new(
                    number_binop(NumOp::Mul, Node::identifier("a"), Const::from(2).into()),
                    false,
                )
                .into(),
            ],
        )
        .into(),
        ConstDeclList::new(vec![Declaration::new(
            "it",
            Some(Call::new(Node::identifier("g"), vec![]).into()),
        )])
        .into(),
        Call::new(GetConstField::new(Node::identifier("it"), "next"), vec![]).into(),
        GetConstField::new(
            Call::new(
                GetConstField::new(Node::identifier("it"), "next"),
                vec![Const::from(21).into()],
            ),
            "value",
        )
        .into(),
    ]);
    assert_eq!(result.as_number(), Some(42.0));
}

#[test]
fn async_functions_settle_their_promise() {
    // async function f() { return 1 + await Promise.resolve(2); }
    let mut context = Context::new();
    let program = StatementList::from(vec![
        AsyncFunctionDecl::new(
            Some("f".into()),
            vec![],
            vec![Return::new(number_binop(
                NumOp::Add,
                Const::from(1).into(),
                AwaitExpr::new(Call::new(
                    GetConstField::new(Node::identifier("Promise"), "resolve"),
                    vec![Const::from(2).into()],
                ))
                .into(),
            ))
            .into()],
        )
        .into(),
        VarDeclList::new(vec![Declaration::new(
            "p",
            Some(Call::new(Node::identifier("f"), vec![]).into()),
        )])
        .into(),
    ]);
    context.evaluate(&program).unwrap();
    context.run_pending_async_tasks().unwrap();

    let promise = context.get_global_variable("p");
    let object = promise.as_object().expect("async call returns a promise");
    match &object.borrow().data {
        ObjectData::Promise(promise) => match promise.state() {
            PromiseState::Fulfilled(value) => assert_eq!(value.as_number(), Some(3.0)),
            state => panic!("promise should be fulfilled, got {:?}", state),
        },
        _ => panic!("expected a promise"),
    }
}

#[test]
fn await_rethrows_rejections_into_catch() {
    // async function f() {
    //   try { await Promise.reject("nope"); } catch (e) { return e; }
    // }
    let mut context = Context::new();
    let program = StatementList::from(vec![
        AsyncFunctionDecl::new(
            Some("f".into()),
            vec![],
            vec![Try::new(
                vec![AwaitExpr::new(Call::new(
                    GetConstField::new(Node::identifier("Promise"), "reject"),
                    vec![Const::from("nope").into()],
                ))
                .into()],
                Some(Catch::new(
                    Declaration::new("e", None),
                    vec![Return::new(Node::identifier("e")).into()],
                )),
                None,
            )
            .into()],
        )
        .into(),
        VarDeclList::new(vec![Declaration::new(
            "p",
            Some(Call::new(Node::identifier("f"), vec![]).into()),
        )])
        .into(),
    ]);
    context.evaluate(&program).unwrap();
    context.run_pending_async_tasks().unwrap();

    let promise = context.get_global_variable("p");
    let object = promise.as_object().expect("async call returns a promise");
    match &object.borrow().data {
        ObjectData::Promise(promise) => match promise.state() {
            PromiseState::Fulfilled(value) => {
                assert_eq!(value.as_string().map(|s| s.as_str()), Some("nope"));
            }
            state => panic!("promise should be fulfilled, got {:?}", state),
        },
        _ => panic!("expected a promise"),
    }
}

#[test]
fn proxy_get_trap_intercepts_member_access() {
    // const p = new Proxy({}, { get: (_, k) => k.toUpperCase() }); p.hello
    let handler = ObjectLiteral::from(vec![PropertyDefinition::property(
        "get",
        ArrowFunctionDecl::new(
            vec![
                FormalParameter::new(Declaration::new("_t", None), false),
                FormalParameter::new(Declaration::new("k", None), false),
            ],
            vec![Return::new(Call::new(
                GetConstField::new(Node::identifier("k"), "toUpperCase"),
                vec![],
            ))
            .into()],
        ),
    )]);
    let result = eval_ok(vec![
        ConstDeclList::new(vec![Declaration::new(
            "p",
            Some(
                New::from(Call::new(
                    Node::identifier("Proxy"),
                    vec![ObjectLiteral::from(vec![]).into(), handler.into()],
                ))
                .into(),
            ),
        )])
        .into(),
        GetConstField::new(Node::identifier("p"), "hello").into(),
    ]);
    assert_eq!(result.as_string().map(|s| s.as_str()), Some("HELLO"));
}

#[test]
fn destructuring_assignment_with_elision_and_rest() {
    // [a, , b, ...r] = [1, 2, 3, 4, 5];
    let pattern = DeclarationPattern::Array(DeclarationPatternArray::new(vec![
        BindingPatternTypeArray::SingleName {
            ident: "a".into(),
            default_init: None,
        },
        BindingPatternTypeArray::Elision,
        BindingPatternTypeArray::SingleName {
            ident: "b".into(),
            default_init: None,
        },
        BindingPatternTypeArray::SingleNameRest { ident: "r".into() },
    ]));
    let array = ArrayDecl::from(vec![
        Const::from(1).into(),
        Const::from(2).into(),
        Const::from(3).into(),
        Const::from(4).into(),
        Const::from(5).into(),
    ]);
    let mut context = Context::new();
    context
        .evaluate(&StatementList::from(vec![Assign::new(
            AssignTarget::Pattern(pattern),
            array,
        )
        .into()]))
        .unwrap();

    assert_eq!(context.get_global_variable("a").as_number(), Some(1.0));
    assert_eq!(context.get_global_variable("b").as_number(), Some(3.0));
    let r = context.get_global_variable("r");
    let joined = context
        .evaluate(&StatementList::from(vec![Call::new(
            GetConstField::new(Node::identifier("r"), "join"),
            vec![Const::from(",").into()],
        )
        .into()]))
        .unwrap();
    assert!(r.is_object());
    assert_eq!(joined.as_string().map(|s| s.as_str()), Some("4,5"));
}

#[test]
fn array_length_assignment_truncates() {
    // var a = [1, 2, 3, 4]; a.length = 2; a.length + (a[2] === undefined ? 10 : 0)
    let result = eval_ok(vec![
        VarDeclList::new(vec![Declaration::new(
            "a",
            Some(
                ArrayDecl::from(vec![
                    Const::from(1).into(),
                    Const::from(2).into(),
                    Const::from(3).into(),
                    Const::from(4).into(),
                ])
                .into(),
            ),
        )])
        .into(),
        Assign::new(
            AssignTarget::Field(GetConstField::new(Node::identifier("a"), "length")),
            Const::from(2),
        )
        .into(),
        If::new::<_, _, Node, _>(
            BinOp::new(
                CompOp::StrictEqual,
                GetField::new(Node::identifier("a"), Const::from(2)),
                Const::from(Const::Undefined),
            ),
            number_binop(
                NumOp::Add,
                GetConstField::new(Node::identifier("a"), "length").into(),
                Const::from(10).into(),
            ),
            None::<Node>,
        )
        .into(),
    ]);
    assert_eq!(result.as_number(), Some(12.0));
}

#[test]
fn typeof_and_logical_operators() {
    let result = eval_ok(vec![BinOp::new(
        LogOp::And,
        BinOp::new(
            CompOp::StrictEqual,
            UnaryOp::new(UnaryOpKind::TypeOf, Node::identifier("missing")),
            Const::from("undefined"),
        ),
        BinOp::new(
            CompOp::StrictEqual,
            UnaryOp::new(UnaryOpKind::TypeOf, Const::from(1)),
            Const::from("number"),
        ),
    )
    .into()]);
    assert_eq!(result.as_boolean(), Some(true));
}

#[test]
fn compound_and_logical_assignment() {
    let result = eval_ok(vec![
        VarDeclList::new(vec![
            Declaration::new("a", Some(Const::from(5).into())),
            Declaration::new("b", Some(Const::Null.into())),
        ])
        .into(),
        BinOp::new(AssignOp::Add, Node::identifier("a"), Const::from(2)).into(),
        BinOp::new(AssignOp::Coalesce, Node::identifier("b"), Const::from(3)).into(),
        number_binop(NumOp::Add, Node::identifier("a"), Node::identifier("b")),
    ]);
    assert_eq!(result.as_number(), Some(10.0));
}

#[test]
fn instanceof_walks_the_prototype_chain() {
    let class_a = Class::new(Some("A".into()), None::<Node>, None, vec![]);
    let class_b = Class::new(Some("B".into()), Some(Node::identifier("A")), None, vec![]);
    let result = eval_ok(vec![
        Node::ClassDecl(class_a),
        Node::ClassDecl(class_b),
        BinOp::new(
            CompOp::InstanceOf,
            New::from(Call::new(Node::identifier("B"), vec![])),
            Node::identifier("A"),
        )
        .into(),
    ]);
    assert_eq!(result.as_boolean(), Some(true));
}

#[test]
fn getters_and_setters_execute() {
    // var o = { get v() { return 10; } }; o.v
    let result = eval_ok(vec![
        VarDeclList::new(vec![Declaration::new(
            "o",
            Some(
                ObjectLiteral::from(vec![PropertyDefinition::method_definition(
                    MethodDefinitionKind::Get,
                    "v",
                    FunctionExpr::new(None, vec![], vec![Return::new(Const::from(10)).into()]),
                )])
                .into(),
            ),
        )])
        .into(),
        GetConstField::new(Node::identifier("o"), "v").into(),
    ]);
    assert_eq!(result.as_number(), Some(10.0));
}

#[test]
fn strict_mode_makes_undeclared_assignment_throw() {
    let error = eval_program(vec![
        Const::from("use strict").into(),
        Assign::new(AssignTarget::Identifier("ghost".into()), Const::from(1)).into(),
    ])
    .expect_err("strict undeclared assignment must throw");
    assert_eq!(
        error.as_native().map(|native| native.kind),
        Some(crate::NativeErrorKind::Reference)
    );
}

#[test]
fn sloppy_undeclared_assignment_creates_a_global() {
    let mut context = Context::new();
    context
        .evaluate(&StatementList::from(vec![Assign::new(
            AssignTarget::Identifier("ghost".into()),
            Const::from(8),
        )
        .into()]))
        .unwrap();
    assert!(context.has_global_variable("ghost"));
    assert_eq!(context.get_global_variable("ghost").as_number(), Some(8.0));
}
