//! Operator execution: binary and unary operators, assignment and the
//! compound assignment family.

use super::{declaration, expression, Executable};
use crate::{
    ast::{
        node::{Assign, AssignTarget, BinOp, Node, UnaryOp},
        op,
    },
    bigint::JsBigInt,
    environment,
    value::{JsValue, Numeric},
    Context, JsResult, Profiler,
};

pub(super) fn bin_op(bin_op: &BinOp, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("BinOp", "exec");
    match bin_op.op() {
        op::BinOp::Num(op) => {
            let x = bin_op.lhs().run(context)?;
            let y = bin_op.rhs().run(context)?;
            numeric_op(op, &x, &y, context)
        }
        op::BinOp::Bit(op) => {
            let x = bin_op.lhs().run(context)?;
            let y = bin_op.rhs().run(context)?;
            bitwise_op(op, &x, &y, context)
        }
        op::BinOp::Comp(op) => comparison_op(op, bin_op.lhs(), bin_op.rhs(), context),
        op::BinOp::Log(op) => {
            // Logical operators short-circuit on the left operand.
            let x = bin_op.lhs().run(context)?;
            Ok(match op {
                op::LogOp::And => {
                    if x.to_boolean() {
                        bin_op.rhs().run(context)?
                    } else {
                        x
                    }
                }
                op::LogOp::Or => {
                    if x.to_boolean() {
                        x
                    } else {
                        bin_op.rhs().run(context)?
                    }
                }
                op::LogOp::Coalesce => {
                    if x.is_null_or_undefined() {
                        bin_op.rhs().run(context)?
                    } else {
                        x
                    }
                }
            })
        }
        op::BinOp::Assign(op) => compound_assign(op, bin_op.lhs(), bin_op.rhs(), context),
        op::BinOp::Comma => {
            bin_op.lhs().run(context)?;
            bin_op.rhs().run(context)
        }
    }
}

fn numeric_op(
    op: op::NumOp,
    x: &JsValue,
    y: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    match op {
        op::NumOp::Add => x.add(y, context),
        op::NumOp::Sub => x.sub(y, context),
        op::NumOp::Mul => x.mul(y, context),
        op::NumOp::Div => x.div(y, context),
        op::NumOp::Mod => x.rem(y, context),
        op::NumOp::Exp => x.pow(y, context),
    }
}

fn bitwise_op(
    op: op::BitOp,
    x: &JsValue,
    y: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    match op {
        op::BitOp::And => x.bitand(y, context),
        op::BitOp::Or => x.bitor(y, context),
        op::BitOp::Xor => x.bitxor(y, context),
        op::BitOp::Shl => x.shl(y, context),
        op::BitOp::Shr => x.shr(y, context),
        op::BitOp::UShr => x.ushr(y, context),
    }
}

fn comparison_op(
    op: op::CompOp,
    lhs: &Node,
    rhs: &Node,
    context: &mut Context,
) -> JsResult<JsValue> {
    let x = lhs.run(context)?;
    let y = rhs.run(context)?;
    Ok(JsValue::boolean(match op {
        op::CompOp::Equal => x.equals(&y, context)?,
        op::CompOp::NotEqual => !x.equals(&y, context)?,
        op::CompOp::StrictEqual => x.strict_equals(&y),
        op::CompOp::StrictNotEqual => !x.strict_equals(&y),
        op::CompOp::GreaterThan => x.gt(&y, context)?,
        op::CompOp::GreaterThanOrEqual => x.ge(&y, context)?,
        op::CompOp::LessThan => x.lt(&y, context)?,
        op::CompOp::LessThanOrEqual => x.le(&y, context)?,
        op::CompOp::In => {
            let object = match y.as_object() {
                Some(object) => object.clone(),
                None => {
                    return context.throw_type_error(format!(
                        "right-hand side of 'in' should be an object, got {}",
                        y.type_of()
                    ))
                }
            };
            let key = x.to_property_key(context)?;
            object.has_property(&key, context)?
        }
        op::CompOp::InstanceOf => {
            let constructor = match y.as_object() {
                Some(object) => object.clone(),
                None => {
                    return context.throw_type_error(format!(
                        "right-hand side of 'instanceof' is not an object, got {}",
                        y.type_of()
                    ))
                }
            };
            // `Symbol.hasInstance` overrides the ordinary walk.
            let has_instance_key =
                crate::property::PropertyKey::from(context.well_known_symbols().has_instance_symbol());
            let handler = constructor.get_method(&has_instance_key, context)?;
            match handler {
                Some(handler) => handler
                    .call(&y, &[x.clone()], context)?
                    .to_boolean(),
                None => constructor.ordinary_has_instance(&x, context)?,
            }
        }
    }))
}

fn compound_assign(
    op: op::AssignOp,
    lhs: &Node,
    rhs: &Node,
    context: &mut Context,
) -> JsResult<JsValue> {
    let target = node_as_assign_target(lhs, context)?;

    // The logical assignment operators only evaluate (and only assign)
    // when the short-circuit lets them.
    match op {
        op::AssignOp::BoolAnd => {
            let current = read_target(&target, context)?;
            if !current.to_boolean() {
                return Ok(current);
            }
            let value = rhs.run(context)?;
            write_target(&target, value.clone(), context)?;
            return Ok(value);
        }
        op::AssignOp::BoolOr => {
            let current = read_target(&target, context)?;
            if current.to_boolean() {
                return Ok(current);
            }
            let value = rhs.run(context)?;
            write_target(&target, value.clone(), context)?;
            return Ok(value);
        }
        op::AssignOp::Coalesce => {
            let current = read_target(&target, context)?;
            if !current.is_null_or_undefined() {
                return Ok(current);
            }
            let value = rhs.run(context)?;
            write_target(&target, value.clone(), context)?;
            return Ok(value);
        }
        _ => {}
    }

    let x = read_target(&target, context)?;
    let y = rhs.run(context)?;
    let value = match op {
        op::AssignOp::Add => x.add(&y, context)?,
        op::AssignOp::Sub => x.sub(&y, context)?,
        op::AssignOp::Mul => x.mul(&y, context)?,
        op::AssignOp::Div => x.div(&y, context)?,
        op::AssignOp::Mod => x.rem(&y, context)?,
        op::AssignOp::Exp => x.pow(&y, context)?,
        op::AssignOp::And => x.bitand(&y, context)?,
        op::AssignOp::Or => x.bitor(&y, context)?,
        op::AssignOp::Xor => x.bitxor(&y, context)?,
        op::AssignOp::Shl => x.shl(&y, context)?,
        op::AssignOp::Shr => x.shr(&y, context)?,
        op::AssignOp::UShr => x.ushr(&y, context)?,
        op::AssignOp::BoolAnd | op::AssignOp::BoolOr | op::AssignOp::Coalesce => {
            unreachable!("logical assignment handled above")
        }
    };
    write_target(&target, value.clone(), context)?;
    Ok(value)
}

/// Reinterprets an expression node as an assignment target, for compound
/// assignment and increment/decrement.
fn node_as_assign_target<'a>(
    node: &'a Node,
    context: &mut Context,
) -> JsResult<AssignTargetRef<'a>> {
    match node {
        Node::Identifier(identifier) => Ok(AssignTargetRef::Identifier(identifier.as_ref())),
        Node::GetConstField(access) => Ok(AssignTargetRef::Field(access)),
        Node::GetField(access) => Ok(AssignTargetRef::IndexedField(access)),
        Node::GetPrivateField(access) => Ok(AssignTargetRef::PrivateField(access)),
        _ => context.throw_reference_error("invalid assignment target"),
    }
}

enum AssignTargetRef<'a> {
    Identifier(&'a str),
    Field(&'a crate::ast::node::GetConstField),
    IndexedField(&'a crate::ast::node::GetField),
    PrivateField(&'a crate::ast::node::GetPrivateField),
}

fn read_target(target: &AssignTargetRef<'_>, context: &mut Context) -> JsResult<JsValue> {
    match target {
        AssignTargetRef::Identifier(name) => {
            expression::identifier(&crate::ast::node::Identifier::from(*name), context)
        }
        AssignTargetRef::Field(access) => {
            let object = access.obj().run(context)?;
            object.get_field(access.field(), context)
        }
        AssignTargetRef::IndexedField(access) => {
            let object = access.obj().run(context)?;
            let key = access.field().run(context)?.to_property_key(context)?;
            object.get_field(key, context)
        }
        AssignTargetRef::PrivateField(access) => {
            let object = access.obj().run(context)?;
            object.get_field(expression::private_field_key(access.field()), context)
        }
    }
}

fn write_target(
    target: &AssignTargetRef<'_>,
    value: JsValue,
    context: &mut Context,
) -> JsResult<()> {
    let strict = context.strict();
    match target {
        AssignTargetRef::Identifier(name) => {
            expression::assign_identifier(name, value, context)
        }
        AssignTargetRef::Field(access) => {
            let object = access.obj().run(context)?;
            object.set_field(access.field(), value, strict, context)?;
            Ok(())
        }
        AssignTargetRef::IndexedField(access) => {
            let object = access.obj().run(context)?;
            let key = access.field().run(context)?.to_property_key(context)?;
            object.set_field(key, value, strict, context)?;
            Ok(())
        }
        AssignTargetRef::PrivateField(access) => {
            let object = access.obj().run(context)?;
            object.set_field(
                expression::private_field_key(access.field()),
                value,
                strict,
                context,
            )?;
            Ok(())
        }
    }
}

pub(super) fn assign(assign: &Assign, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("Assign", "exec");
    let value = assign.rhs().run(context)?;
    let strict = context.strict();

    match assign.lhs() {
        AssignTarget::Identifier(name) => {
            expression::assign_identifier(name, value.clone(), context)?;
        }
        AssignTarget::Field(access) => {
            let object = access.obj().run(context)?;
            object.set_field(access.field(), value.clone(), strict, context)?;
        }
        AssignTarget::IndexedField(access) => {
            let object = access.obj().run(context)?;
            let key = access.field().run(context)?.to_property_key(context)?;
            object.set_field(key, value.clone(), strict, context)?;
        }
        AssignTarget::PrivateField(access) => {
            if !context.in_class_context() {
                return context.throw_syntax_error(format!(
                    "private field '#{}' must be used inside a class body",
                    access.field()
                ));
            }
            let object = access.obj().run(context)?;
            object.set_field(
                expression::private_field_key(access.field()),
                value.clone(),
                strict,
                context,
            )?;
        }
        AssignTarget::SuperField(access) => {
            let (home, this) = expression::super_reference(context)?;
            let key = match access {
                crate::ast::node::GetSuperField::Const(field) => {
                    crate::property::PropertyKey::from(field.as_ref())
                }
                crate::ast::node::GetSuperField::Expr(node) => {
                    node.run(context)?.to_property_key(context)?
                }
            };
            let parent = home.get_prototype_of(context)?;
            if let Some(parent) = parent.as_object() {
                parent.clone().set(key, value.clone(), this, context)?;
            }
        }
        AssignTarget::Pattern(pattern) => {
            declaration::assign_pattern(pattern, value.clone(), context)?;
        }
    }
    Ok(value)
}

pub(super) fn unary_op(unary_op: &UnaryOp, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("UnaryOp", "exec");

    match unary_op.op() {
        op::UnaryOp::TypeOf => {
            // `typeof unresolved` is "undefined", not a ReferenceError.
            if let Node::Identifier(ref identifier) = unary_op.target() {
                let name = identifier.as_ref();
                if environment::lookup(&context.lexical_environment(), name).is_none() {
                    return Ok(JsValue::string("undefined"));
                }
            }
            let value = unary_op.target().run(context)?;
            Ok(JsValue::String(value.type_of()))
        }
        op::UnaryOp::Delete => expression::delete(unary_op.target(), context),
        op::UnaryOp::Void => {
            unary_op.target().run(context)?;
            Ok(JsValue::undefined())
        }
        op::UnaryOp::Minus => {
            let value = unary_op.target().run(context)?;
            value.neg(context)
        }
        op::UnaryOp::Plus => {
            let value = unary_op.target().run(context)?;
            Ok(JsValue::rational(value.to_number(context)?))
        }
        op::UnaryOp::Not => {
            let value = unary_op.target().run(context)?;
            Ok(JsValue::boolean(!value.to_boolean()))
        }
        op::UnaryOp::Tilde => {
            let value = unary_op.target().run(context)?;
            value.not(context)
        }
        op::UnaryOp::IncrementPre => increment(unary_op.target(), 1, true, context),
        op::UnaryOp::IncrementPost => increment(unary_op.target(), 1, false, context),
        op::UnaryOp::DecrementPre => increment(unary_op.target(), -1, true, context),
        op::UnaryOp::DecrementPost => increment(unary_op.target(), -1, false, context),
    }
}

fn increment(
    target: &Node,
    delta: i32,
    prefix: bool,
    context: &mut Context,
) -> JsResult<JsValue> {
    let target = node_as_assign_target(target, context)?;
    let old = read_target(&target, context)?;
    let (old_value, new_value) = match old.to_numeric(context)? {
        Numeric::Number(number) => (
            JsValue::rational(number),
            JsValue::rational(number + f64::from(delta)),
        ),
        Numeric::BigInt(ref bigint) => {
            let delta = JsBigInt::from(i64::from(delta));
            (
                JsValue::bigint(bigint.clone()),
                JsValue::bigint(JsBigInt::add(bigint, &delta)),
            )
        }
    };
    write_target(&target, new_value.clone(), context)?;
    Ok(if prefix { new_value } else { old_value })
}
