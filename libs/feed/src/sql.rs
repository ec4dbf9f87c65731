//! PostgreSQL lowering of [`Predicate`] trees
//!
//! Expected tables (aliases in parentheses):
//! - `recipes` (`r`): `id`, `title`, `procedure`, `total_price`, one
//!   column per [`Nutrient`](crate::Nutrient), `created_at`, `user_id`
//! - `ingredients` (`i`): `id`, `recipe_id`, `name`, `price`
//!
//! Every user-supplied value is bound, never spliced into the SQL text.

use sqlx::{Postgres, QueryBuilder};

use crate::{
    predicate::{NumericField, Predicate, TextField},
    store::{OrderBy, OrderField, SortDirection},
};

/// Append `predicate` as a boolean SQL expression over `recipes r`
pub fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::TextContains { field, needle } => {
            builder.push(text_column(*field));
            push_ilike(builder, needle);
        }
        Predicate::NumericCompare { field, op, value } => {
            builder
                .push(numeric_column(*field))
                .push(" ")
                .push(op.as_sql())
                .push(" ")
                .push_bind(*value);
        }
        Predicate::SetContainsAny { needles } => {
            if needles.is_empty() {
                builder.push("FALSE");
            } else {
                builder.push("EXISTS ");
                push_ingredient_match(builder, needles);
            }
        }
        Predicate::SetContainsNone { needles } => {
            if needles.is_empty() {
                builder.push("TRUE");
            } else {
                builder.push("NOT EXISTS ");
                push_ingredient_match(builder, needles);
            }
        }
        Predicate::And(clauses) => push_joined(builder, clauses, " AND ", "TRUE"),
        Predicate::Or(clauses) => push_joined(builder, clauses, " OR ", "FALSE"),
    }
}

/// Append `ORDER BY ...` for `order`
pub fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, order: &[OrderBy]) {
    if order.is_empty() {
        return;
    }

    builder.push(" ORDER BY ");
    for (index, spec) in order.iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        let column = match spec.field {
            OrderField::CreatedAt => "r.created_at",
            OrderField::Id => "r.id",
        };
        let direction = match spec.direction {
            SortDirection::Asc => " ASC",
            SortDirection::Desc => " DESC",
        };
        builder.push(column).push(direction);
    }
}

fn push_joined(
    builder: &mut QueryBuilder<'_, Postgres>,
    clauses: &[Predicate],
    separator: &str,
    identity: &str,
) {
    if clauses.is_empty() {
        builder.push(identity);
        return;
    }

    builder.push("(");
    for (index, clause) in clauses.iter().enumerate() {
        if index > 0 {
            builder.push(separator);
        }
        push_predicate(builder, clause);
    }
    builder.push(")");
}

fn push_ingredient_match(builder: &mut QueryBuilder<'_, Postgres>, needles: &[String]) {
    builder.push("(SELECT 1 FROM ingredients i WHERE i.recipe_id = r.id AND (");
    for (index, needle) in needles.iter().enumerate() {
        if index > 0 {
            builder.push(" OR ");
        }
        builder.push("i.name");
        push_ilike(builder, needle);
    }
    builder.push("))");
}

fn push_ilike(builder: &mut QueryBuilder<'_, Postgres>, needle: &str) {
    builder
        .push(" ILIKE ")
        .push_bind(format!("%{}%", escape_like(needle)))
        .push(" ESCAPE '\\'");
}

fn text_column(field: TextField) -> &'static str {
    match field {
        TextField::Title => "r.title",
    }
}

fn numeric_column(field: NumericField) -> String {
    match field {
        NumericField::TotalPrice => "r.total_price".to_string(),
        NumericField::Nutrient(nutrient) => format!("r.{}", nutrient.column()),
    }
}

/// Escape `LIKE` wildcards so the needle matches literally
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
