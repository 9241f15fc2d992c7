use super::ModuleStatus;
use crate::{
    ast::{
        node::{
            Assign, AssignTarget, AwaitExpr, BinOp, Call, ConditionalOp, ConstDeclList,
            Declaration, ExportDecl, FormalParameter, FunctionDecl, GetConstField, ImportDecl,
            ImportSpecifier, ModuleItem, ModuleItemList, Node, Return,
        },
        op::{CompOp, NumOp},
        Const,
    },
    Context,
};

fn import_named(specifier: &str, names: &[&str]) -> ModuleItem {
    let specifiers: Vec<ImportSpecifier> = names
        .iter()
        .map(|name| ImportSpecifier::new(*name, *name))
        .collect();
    ImportDecl::new(specifier, None, None, specifiers).into()
}

// Module code is always strict, so results are published as properties of
// `globalThis` rather than through sloppy implicit globals.
fn set_global(name: &str, value: Node) -> ModuleItem {
    ModuleItem::Statement(
        Assign::new(
            AssignTarget::Field(GetConstField::new(Node::identifier("globalThis"), name)),
            value,
        )
        .into(),
    )
}

fn install_loader(context: &mut Context, modules: Vec<(&'static str, ModuleItemList)>) {
    let modules: std::collections::HashMap<&'static str, ModuleItemList> =
        modules.into_iter().collect();
    context.set_module_loader(Box::new(move |id, context| match modules.get(id) {
        Some(module) => Ok(module.clone()),
        None => context.throw_error(format!("unknown module '{}'", id)),
    }));
}

#[test]
fn named_exports_are_importable() {
    let mut context = Context::new();
    install_loader(
        &mut context,
        vec![
            (
                "a",
                ModuleItemList::from(vec![ModuleItem::Export(ExportDecl::Declaration(
                    ConstDeclList::new(vec![Declaration::new(
                        "x",
                        Some(Const::from(41).into()),
                    )])
                    .into(),
                ))]),
            ),
            (
                "main",
                ModuleItemList::from(vec![
                    import_named("a", &["x"]),
                    set_global(
                        "result",
                        BinOp::new(NumOp::Add, Node::identifier("x"), Const::from(1)).into(),
                    ),
                ]),
            ),
        ],
    );

    context.evaluate_module("main").unwrap();
    assert_eq!(context.get_global_variable("result").as_number(), Some(42.0));
}

#[test]
fn cyclic_modules_evaluate_once_with_live_bindings() {
    // even/odd mutually recurse through their imports.
    let even_module = ModuleItemList::from(vec![
        import_named("odd", &["odd"]),
        ModuleItem::Export(ExportDecl::Declaration(
            FunctionDecl::new(
                Some("even".into()),
                vec![FormalParameter::new(Declaration::new("n", None), false)],
                vec![Return::new(ConditionalOp::new(
                    BinOp::new(CompOp::StrictEqual, Node::identifier("n"), Const::from(0)),
                    Const::from(true),
                    Call::new(
                        Node::identifier("odd"),
                        vec![BinOp::new(
                            NumOp::Sub,
                            Node::identifier("n"),
                            Const::from(1),
                        )
                        .into()],
                    ),
                ))
                .into()],
            )
            .into(),
        )),
        set_global(
            "evenEvaluations",
            BinOp::new(
                NumOp::Add,
                // `undefined + 1` on the first (and only) evaluation is
                // NaN, so seed through coalescing logic instead.
                ConditionalOp::new(
                    BinOp::new(
                        CompOp::StrictEqual,
                        crate::ast::node::UnaryOp::new(
                            crate::ast::op::UnaryOp::TypeOf,
                            Node::identifier("evenEvaluations"),
                        ),
                        Const::from("undefined"),
                    ),
                    Const::from(0),
                    Node::identifier("evenEvaluations"),
                ),
                Const::from(1),
            )
            .into(),
        ),
    ]);
    let odd_module = ModuleItemList::from(vec![
        import_named("even", &["even"]),
        ModuleItem::Export(ExportDecl::Declaration(
            FunctionDecl::new(
                Some("odd".into()),
                vec![FormalParameter::new(Declaration::new("n", None), false)],
                vec![Return::new(ConditionalOp::new(
                    BinOp::new(CompOp::StrictEqual, Node::identifier("n"), Const::from(0)),
                    Const::from(false),
                    Call::new(
                        Node::identifier("even"),
                        vec![BinOp::new(
                            NumOp::Sub,
                            Node::identifier("n"),
                            Const::from(1),
                        )
                        .into()],
                    ),
                ))
                .into()],
            )
            .into(),
        )),
    ]);
    let main_module = ModuleItemList::from(vec![
        import_named("even", &["even"]),
        set_global(
            "result",
            Call::new(Node::identifier("even"), vec![Const::from(4).into()]).into(),
        ),
    ]);

    let mut context = Context::new();
    install_loader(
        &mut context,
        vec![
            ("even", even_module),
            ("odd", odd_module),
            ("main", main_module),
        ],
    );

    context.evaluate_module("main").unwrap();
    assert_eq!(context.get_global_variable("result").as_boolean(), Some(true));
    // Each cycle member ran exactly once.
    assert_eq!(
        context.get_global_variable("evenEvaluations").as_number(),
        Some(1.0)
    );
}

#[test]
fn default_exports_resolve() {
    let mut context = Context::new();
    install_loader(
        &mut context,
        vec![
            (
                "lib",
                ModuleItemList::from(vec![ModuleItem::Export(ExportDecl::Default(
                    Const::from(7).into(),
                ))]),
            ),
            (
                "main",
                ModuleItemList::from(vec![
                    ImportDecl::new("lib", Some("seven".into()), None, vec![]).into(),
                    set_global("result", Node::identifier("seven")),
                ]),
            ),
        ],
    );

    context.evaluate_module("main").unwrap();
    assert_eq!(context.get_global_variable("result").as_number(), Some(7.0));
}

#[test]
fn namespace_objects_expose_exports() {
    let mut context = Context::new();
    install_loader(
        &mut context,
        vec![(
            "lib",
            ModuleItemList::from(vec![ModuleItem::Export(ExportDecl::Declaration(
                ConstDeclList::new(vec![Declaration::new(
                    "value",
                    Some(Const::from(3).into()),
                )])
                .into(),
            ))]),
        )],
    );

    let namespace = context.evaluate_module("lib").unwrap();
    let value = namespace
        .get_field("value", &mut context)
        .expect("namespace read");
    assert_eq!(value.as_number(), Some(3.0));
}

#[test]
fn top_level_await_defers_importers() {
    // tla: export const v = await Promise.resolve(5);
    // main: import { v } from "tla"; result = v;
    let tla_module = ModuleItemList::from(vec![ModuleItem::Export(ExportDecl::Declaration(
        ConstDeclList::new(vec![Declaration::new(
            "v",
            Some(
                AwaitExpr::new(Call::new(
                    GetConstField::new(Node::identifier("Promise"), "resolve"),
                    vec![Const::from(5).into()],
                ))
                .into(),
            ),
        )])
        .into(),
    ))]);
    let main_module = ModuleItemList::from(vec![
        import_named("tla", &["v"]),
        set_global("result", Node::identifier("v")),
    ]);

    let mut context = Context::new();
    install_loader(&mut context, vec![("tla", tla_module), ("main", main_module)]);

    context.evaluate_module("main").unwrap();
    // Nothing ran yet: the graph is parked on the async dependency.
    assert!(context.get_global_variable("result").is_undefined());

    context.run_pending_async_tasks().unwrap();
    assert_eq!(context.get_global_variable("result").as_number(), Some(5.0));

    let record = context.realm().module("tla").expect("registered");
    assert_eq!(record.borrow().status(), ModuleStatus::Evaluated);
}
