//! Constant folding over parsed programs
//!
//! Folding collapses operator applications whose operands are literals
//! into the literal they evaluate to, using the same coercion rules the
//! evaluator applies at run time. Anything it cannot prove constant is
//! left untouched, so a folded program is observationally identical to
//! the original. Array and object literals are never folded away:
//! each evaluation must still allocate a fresh collection.

use core_types::{js_number_to_string, js_string_to_number, SourcePosition};
use parser::{BinaryOp, Expression, MemberProperty, Program, UnaryOp};

/// Fold every statement of a program.
pub fn fold_program(program: &Program) -> Program {
    Program {
        body: program.body.iter().map(fold_expression).collect(),
    }
}

fn fold_expression(expr: &Expression) -> Expression {
    match expr {
        Expression::NumberLiteral { .. }
        | Expression::StringLiteral { .. }
        | Expression::BooleanLiteral { .. }
        | Expression::NullLiteral { .. }
        | Expression::Identifier { .. } => expr.clone(),

        Expression::ArrayLiteral { elements, position } => Expression::ArrayLiteral {
            elements: elements.iter().map(fold_expression).collect(),
            position: *position,
        },

        Expression::ObjectLiteral {
            properties,
            position,
        } => Expression::ObjectLiteral {
            properties: properties
                .iter()
                .map(|(key, value)| (key.clone(), fold_expression(value)))
                .collect(),
            position: *position,
        },

        Expression::Unary {
            op,
            operand,
            position,
        } => {
            let operand = fold_expression(operand);
            match as_literal(&operand) {
                Some(lit) => fold_unary(*op, &lit, *position),
                None => Expression::Unary {
                    op: *op,
                    operand: Box::new(operand),
                    position: *position,
                },
            }
        }

        Expression::Binary {
            op,
            left,
            right,
            position,
        } => {
            let left = fold_expression(left);
            let right = fold_expression(right);
            match (as_literal(&left), as_literal(&right)) {
                (Some(a), Some(b)) => fold_binary(*op, &a, &b, *position),
                _ => Expression::Binary {
                    op: *op,
                    left: Box::new(left),
                    right: Box::new(right),
                    position: *position,
                },
            }
        }

        Expression::Member {
            object,
            property,
            position,
        } => Expression::Member {
            object: Box::new(fold_expression(object)),
            property: match property {
                MemberProperty::Static(name) => MemberProperty::Static(name.clone()),
                MemberProperty::Computed(key) => {
                    MemberProperty::Computed(Box::new(fold_expression(key)))
                }
            },
            position: *position,
        },
    }
}

/// A literal operand, borrowed from the expression it came from.
enum Literal<'a> {
    Num(f64),
    Str(&'a str),
    Bool(bool),
    Null,
}

fn as_literal(expr: &Expression) -> Option<Literal<'_>> {
    match expr {
        Expression::NumberLiteral { value, .. } => Some(Literal::Num(*value)),
        Expression::StringLiteral { value, .. } => Some(Literal::Str(value)),
        Expression::BooleanLiteral { value, .. } => Some(Literal::Bool(*value)),
        Expression::NullLiteral { .. } => Some(Literal::Null),
        _ => None,
    }
}

fn literal_number(lit: &Literal<'_>) -> f64 {
    match lit {
        Literal::Num(n) => *n,
        Literal::Str(s) => js_string_to_number(s),
        Literal::Bool(true) => 1.0,
        Literal::Bool(false) => 0.0,
        Literal::Null => 0.0,
    }
}

fn literal_text(lit: &Literal<'_>) -> String {
    match lit {
        Literal::Num(n) => js_number_to_string(*n),
        Literal::Str(s) => (*s).to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "null".to_string(),
    }
}

fn literal_truthy(lit: &Literal<'_>) -> bool {
    match lit {
        Literal::Num(n) => *n != 0.0 && !n.is_nan(),
        Literal::Str(s) => !s.is_empty(),
        Literal::Bool(b) => *b,
        Literal::Null => false,
    }
}

fn fold_unary(op: UnaryOp, operand: &Literal<'_>, position: SourcePosition) -> Expression {
    match op {
        UnaryOp::Negate => number(-literal_number(operand), position),
        UnaryOp::Plus => number(literal_number(operand), position),
        UnaryOp::Not => boolean(!literal_truthy(operand), position),
    }
}

fn fold_binary(
    op: BinaryOp,
    a: &Literal<'_>,
    b: &Literal<'_>,
    position: SourcePosition,
) -> Expression {
    match op {
        BinaryOp::Add => {
            if matches!(a, Literal::Str(_)) || matches!(b, Literal::Str(_)) {
                let mut text = literal_text(a);
                text.push_str(&literal_text(b));
                string(text, position)
            } else {
                number(literal_number(a) + literal_number(b), position)
            }
        }
        BinaryOp::Subtract => number(literal_number(a) - literal_number(b), position),
        BinaryOp::Multiply => number(literal_number(a) * literal_number(b), position),
        BinaryOp::Divide => number(literal_number(a) / literal_number(b), position),
        BinaryOp::Remainder => number(literal_number(a) % literal_number(b), position),
        BinaryOp::Equals => boolean(loose_equals(a, b), position),
        BinaryOp::NotEquals => boolean(!loose_equals(a, b), position),
        BinaryOp::StrictEquals => boolean(strict_equals(a, b), position),
        BinaryOp::StrictNotEquals => boolean(!strict_equals(a, b), position),
        BinaryOp::Less => boolean(relational(a, b, |o| o == Order::Less), position),
        BinaryOp::LessEqual => boolean(relational(a, b, |o| o != Order::Greater), position),
        BinaryOp::Greater => boolean(relational(a, b, |o| o == Order::Greater), position),
        BinaryOp::GreaterEqual => boolean(relational(a, b, |o| o != Order::Less), position),
    }
}

fn loose_equals(a: &Literal<'_>, b: &Literal<'_>) -> bool {
    match (a, b) {
        (Literal::Null, Literal::Null) => true,
        (Literal::Null, _) | (_, Literal::Null) => false,
        (Literal::Bool(_), _) | (_, Literal::Bool(_)) => literal_number(a) == literal_number(b),
        (Literal::Num(x), Literal::Num(y)) => x == y,
        (Literal::Str(x), Literal::Str(y)) => x == y,
        (Literal::Num(x), Literal::Str(s)) => *x == js_string_to_number(s),
        (Literal::Str(s), Literal::Num(y)) => js_string_to_number(s) == *y,
    }
}

fn strict_equals(a: &Literal<'_>, b: &Literal<'_>) -> bool {
    match (a, b) {
        (Literal::Null, Literal::Null) => true,
        (Literal::Num(x), Literal::Num(y)) => x == y,
        (Literal::Str(x), Literal::Str(y)) => x == y,
        (Literal::Bool(x), Literal::Bool(y)) => x == y,
        _ => false,
    }
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum Order {
    Less,
    Equal,
    Greater,
    Unordered,
}

/// Relational comparison outcome. Comparisons touching NaN are
/// `Unordered`, for which every relational operator answers false.
fn relational(a: &Literal<'_>, b: &Literal<'_>, accept: impl Fn(Order) -> bool) -> bool {
    let order = match (a, b) {
        (Literal::Str(x), Literal::Str(y)) => match x.cmp(y) {
            std::cmp::Ordering::Less => Order::Less,
            std::cmp::Ordering::Equal => Order::Equal,
            std::cmp::Ordering::Greater => Order::Greater,
        },
        _ => {
            let x = literal_number(a);
            let y = literal_number(b);
            match x.partial_cmp(&y) {
                Some(std::cmp::Ordering::Less) => Order::Less,
                Some(std::cmp::Ordering::Equal) => Order::Equal,
                Some(std::cmp::Ordering::Greater) => Order::Greater,
                None => Order::Unordered,
            }
        }
    };
    order != Order::Unordered && accept(order)
}

fn number(value: f64, position: SourcePosition) -> Expression {
    Expression::NumberLiteral { value, position }
}

fn string(value: String, position: SourcePosition) -> Expression {
    Expression::StringLiteral { value, position }
}

fn boolean(value: bool, position: SourcePosition) -> Expression {
    Expression::BooleanLiteral { value, position }
}
