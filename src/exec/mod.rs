//! Execution of the AST: statements produce completions, expressions
//! produce values, and every abrupt completion travels as a [`Flow`]
//! signal through the `Err` side of [`JsResult`].

pub mod class;
pub(crate) mod declaration;
mod expression;
pub mod generator;
pub(crate) mod hoisting;
mod iteration;
mod operator;
mod statement;

#[cfg(test)]
mod tests;

use crate::{
    ast::{node::StatementList, Const, Node},
    environment::{self, EnvironmentError, ThisBinding},
    string::JsString,
    value::JsValue,
    Context, JsResult, Profiler,
};

/// A structured unwind signal.
///
/// `Throw` is the only signal a JavaScript program can observe directly;
/// the others are consumed by the construct they belong to: loops eat
/// `Break`/`Continue`, function calls eat `Return`, the generator engine
/// eats `Yield` and the async scheduler eats `Await`. `finally` blocks run
/// for every variant. A signal escaping past its owner is an engine bug
/// and is reported as such at the embedder boundary.
#[derive(Debug, Clone)]
pub enum Flow {
    /// A thrown value, which can be any value at all.
    Throw(JsValue),
    /// `return` from the nearest function.
    Return(JsValue),
    /// `break`, with optional label.
    Break(Option<JsString>),
    /// `continue`, with optional label.
    Continue(Option<JsString>),
    /// A generator suspension carrying the yielded value. The suspension
    /// point identity has already been recorded in the generator state.
    Yield(JsValue),
    /// An async suspension. The task has already been parked against its
    /// promise; only the async runner catches this.
    Await,
}

impl Flow {
    /// Does this signal target the given (possibly unlabelled) loop?
    pub(crate) fn matches_loop_label(label: Option<&str>, stmt_label: Option<&str>) -> bool {
        match label {
            None => true,
            Some(label) => stmt_label == Some(label),
        }
    }
}

/// Converts a binding-table error into the matching JavaScript error.
pub(crate) fn environment_error(err: EnvironmentError, context: &mut Context) -> Flow {
    let message = err.to_string();
    match err {
        EnvironmentError::NotDeclared(_) | EnvironmentError::Uninitialized(_) => {
            Flow::Throw(context.construct_reference_error(message))
        }
        EnvironmentError::AlreadyDeclared(_) => {
            Flow::Throw(context.construct_syntax_error(message))
        }
        EnvironmentError::ImmutableAssignment(_) => {
            Flow::Throw(context.construct_type_error(message))
        }
    }
}

/// The trait every executable AST node implements.
pub trait Executable {
    /// Runs this node.
    fn run(&self, context: &mut Context) -> JsResult<JsValue>;
}

impl Executable for Node {
    fn run(&self, context: &mut Context) -> JsResult<JsValue> {
        let _timer = Profiler::global().start_event("Executable::run", "exec");
        match *self {
            Node::Const(Const::Null) => Ok(JsValue::null()),
            Node::Const(Const::Num(num)) => Ok(JsValue::rational(num)),
            Node::Const(Const::Int(num)) => Ok(JsValue::integer(num)),
            Node::Const(Const::BigInt(ref num)) => Ok(JsValue::bigint(num.clone())),
            Node::Const(Const::Undefined) => Ok(JsValue::undefined()),
            Node::Const(Const::String(ref string)) => Ok(JsValue::string(string.to_string())),
            Node::Const(Const::Bool(value)) => Ok(JsValue::boolean(value)),
            Node::Empty => Ok(JsValue::undefined()),
            Node::This => expression::this(context),
            Node::NewTarget => {
                Ok(environment::new_target(&context.lexical_environment()))
            }
            Node::Identifier(ref identifier) => expression::identifier(identifier, context),
            Node::ArrayDecl(ref array) => expression::array_literal(array, context),
            Node::Object(ref object) => expression::object_literal(object, context),
            Node::TemplateLit(ref template) => expression::template_literal(template, context),
            Node::Spread(ref spread) => spread.val().run(context),
            Node::GetConstField(ref get_const_field) => {
                expression::get_const_field(get_const_field, context)
            }
            Node::GetField(ref get_field) => expression::get_field(get_field, context),
            Node::GetPrivateField(ref get_private_field) => {
                expression::get_private_field(get_private_field, context)
            }
            Node::GetSuperField(ref get_super_field) => {
                expression::get_super_field(get_super_field, context)
            }
            Node::Optional(ref optional) => expression::optional_chain(optional, context),
            Node::Call(ref call) => expression::call(call, context),
            Node::New(ref new) => expression::new(new, context),
            Node::SuperCall(ref super_call) => class::super_call(super_call, context),
            Node::ImportCall(ref import_call) => {
                crate::module::dynamic_import(import_call, context)
            }
            Node::ImportMeta => crate::module::import_meta(context),
            Node::ConditionalOp(ref op) => {
                if op.cond().run(context)?.to_boolean() {
                    op.if_true().run(context)
                } else {
                    op.if_false().run(context)
                }
            }
            Node::BinOp(ref op) => operator::bin_op(op, context),
            Node::UnaryOp(ref op) => operator::unary_op(op, context),
            Node::Assign(ref assign) => operator::assign(assign, context),
            Node::VarDeclList(ref list) => declaration::var_decl_list(list, context),
            Node::LetDeclList(ref list) => declaration::let_decl_list(list, context),
            Node::ConstDeclList(ref list) => declaration::const_decl_list(list, context),
            Node::FunctionDecl(ref decl) => declaration::function_decl(decl, context),
            Node::FunctionExpr(ref expr) => declaration::function_expr(expr, context),
            Node::ArrowFunctionDecl(ref decl) => declaration::arrow_function(decl, context),
            Node::GeneratorDecl(ref decl) => declaration::generator_decl(decl, context),
            Node::GeneratorExpr(ref expr) => declaration::generator_expr(expr, context),
            Node::AsyncFunctionDecl(ref decl) => declaration::async_function_decl(decl, context),
            Node::AsyncFunctionExpr(ref expr) => declaration::async_function_expr(expr, context),
            Node::AsyncGeneratorDecl(ref decl) => {
                declaration::async_generator_decl(decl, context)
            }
            Node::AsyncGeneratorExpr(ref expr) => {
                declaration::async_generator_expr(expr, context)
            }
            Node::ClassDecl(ref class) => class::class_decl(class, context),
            Node::ClassExpr(ref class) => class::class_expr(class, context),
            Node::Block(ref block) => statement::block(block, context),
            Node::If(ref if_smt) => statement::if_statement(if_smt, context),
            Node::Switch(ref switch) => statement::switch(switch, context),
            Node::WhileLoop(ref while_loop) => {
                iteration::while_loop(while_loop, None, context)
            }
            Node::DoWhileLoop(ref do_while) => iteration::do_while_loop(do_while, None, context),
            Node::ForLoop(ref for_loop) => iteration::for_loop(for_loop, None, context),
            Node::ForInLoop(ref for_in) => iteration::for_in_loop(for_in, None, context),
            Node::ForOfLoop(ref for_of) => iteration::for_of_loop(for_of, None, context),
            Node::Labelled(ref labelled) => statement::labelled(labelled, context),
            Node::Continue(ref node) => {
                Err(Flow::Continue(node.label().map(JsString::from)))
            }
            Node::Break(ref node) => Err(Flow::Break(node.label().map(JsString::from))),
            Node::Return(ref node) => {
                let value = match node.expr() {
                    Some(expr) => expr.run(context)?,
                    None => JsValue::undefined(),
                };
                Err(Flow::Return(value))
            }
            Node::Throw(ref node) => {
                let value = node.expr().run(context)?;
                Err(Flow::Throw(value))
            }
            Node::Try(ref try_node) => statement::try_statement(try_node, context),
            Node::With(ref with) => statement::with_statement(with, context),
            Node::Yield(ref node) => generator::yield_expression(node, context),
            Node::AwaitExpr(ref node) => crate::job::await_expression(node, context),
        }
    }
}

impl Executable for StatementList {
    fn run(&self, context: &mut Context) -> JsResult<JsValue> {
        let _timer = Profiler::global().start_event("StatementList", "exec");

        let mut obj = JsValue::undefined();
        for item in self.items() {
            let value = item.run(context)?;
            // The completion value of a list is the value of its last
            // value-producing statement; declarations yield empty.
            if statement_produces_value(item) {
                obj = value;
            }
        }
        Ok(obj)
    }
}

fn statement_produces_value(node: &Node) -> bool {
    !matches!(
        node,
        Node::VarDeclList(_)
            | Node::LetDeclList(_)
            | Node::ConstDeclList(_)
            | Node::FunctionDecl(_)
            | Node::ClassDecl(_)
            | Node::Empty
    )
}

/// Resolves the `this` binding, raising the derived-constructor
/// `ReferenceError` for uninitialized frames.
pub(crate) fn resolve_this(context: &mut Context) -> JsResult<JsValue> {
    match environment::this_binding(&context.lexical_environment()) {
        ThisBinding::Value(ref value) => Ok(value.clone()),
        ThisBinding::Uninitialized => context.throw_reference_error(
            "must call super constructor before accessing 'this' in a derived constructor",
        ),
        ThisBinding::None => Ok(context.global_object().into()),
    }
}
