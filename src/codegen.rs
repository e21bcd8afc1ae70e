//! Renders an AST into its intermediate-code form: the expression tree as a
//! fully parenthesized string. This is the whole backend, since the language
//! has no executable target.

use crate::parser::{Expression, Statement};

/// Render the intermediate code for one parsed statement. Only the
/// right-hand expression tree is rendered; the assignment target is shown
/// separately by the caller.
pub fn render(statement: &Statement) -> String {
    match statement {
        Statement::Assign { value, .. } => render_expression(value),
    }
}

fn render_expression(expr: &Expression) -> String {
    match expr {
        Expression::Number(value) => value.to_string(),
        // Variables were resolved at parse time; the embedded value is
        // rendered, never the name.
        Expression::Variable { value, .. } => value.to_string(),
        Expression::BinaryOp {
            op, left, right, ..
        } => format!(
            "({} {} {})",
            render_expression(left),
            op,
            render_expression(right)
        ),
    }
}
