//! Human-readable renderings of a syntax tree.
//!
//! Pure functions over a [`Node`]: an indented text dump for terminals,
//! a `serde_json::Value` for tooling, and a pre-order visitor for
//! callers that want to walk the tree themselves.

use std::fmt::Write;

use serde_json::{json, Value};

use crate::ast::{Literal, Node, NodeKind, OrderKey};

/// Render the tree as an indented text dump, two spaces per level.
pub fn to_text(node: &Node) -> String {
    let mut out = String::new();
    write_text(&mut out, node, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn labeled(out: &mut String, depth: usize, label: &str, node: &Node) {
    indent(out, depth);
    out.push_str(label);
    out.push('\n');
    write_text(out, node, depth + 1);
}

fn labeled_opt(out: &mut String, depth: usize, label: &str, node: &Option<Box<Node>>) {
    if let Some(node) = node {
        labeled(out, depth, label, node);
    }
}

fn write_text(out: &mut String, node: &Node, depth: usize) {
    indent(out, depth);

    match &node.kind {
        NodeKind::Ask {
            source,
            fields,
            condition,
            group_by,
            order_by,
            limit,
        }
        | NodeKind::Show {
            source,
            fields,
            condition,
            group_by,
            order_by,
            limit,
        }
        | NodeKind::Get {
            source,
            fields,
            condition,
            group_by,
            order_by,
            limit,
        } => {
            let heading = match node.kind {
                NodeKind::Ask { .. } => "ASK QUERY:",
                NodeKind::Show { .. } => "SHOW QUERY:",
                _ => "GET QUERY:",
            };
            out.push_str(heading);
            out.push('\n');
            labeled(out, depth + 1, "Source:", source);
            labeled(out, depth + 1, "Fields:", fields);
            labeled_opt(out, depth + 1, "Condition:", condition);
            labeled_opt(out, depth + 1, "Group By:", group_by);
            labeled_opt(out, depth + 1, "Order By:", order_by);
            labeled_opt(out, depth + 1, "Limit:", limit);
        }

        NodeKind::Tell {
            source,
            action,
            condition,
        } => {
            out.push_str("TELL QUERY:\n");
            labeled(out, depth + 1, "Source:", source);
            labeled(out, depth + 1, "Action:", action);
            labeled_opt(out, depth + 1, "Condition:", condition);
        }

        NodeKind::Find {
            source,
            condition,
            group_by,
            order_by,
            limit,
        } => {
            out.push_str("FIND QUERY:\n");
            labeled(out, depth + 1, "Source:", source);
            labeled_opt(out, depth + 1, "Condition:", condition);
            labeled_opt(out, depth + 1, "Group By:", group_by);
            labeled_opt(out, depth + 1, "Order By:", order_by);
            labeled_opt(out, depth + 1, "Limit:", limit);
        }

        NodeKind::FieldList(fields) => {
            let _ = writeln!(out, "FIELD LIST ({} fields):", fields.len());
            for field in fields {
                write_text(out, field, depth + 1);
            }
        }

        NodeKind::Source { name, join } => {
            let _ = writeln!(out, "SOURCE: {name}");
            if let Some(join) = join {
                labeled(out, depth + 1, "Join:", join);
            }
        }

        NodeKind::Join { source, condition } => {
            out.push_str("JOIN:\n");
            labeled(out, depth + 1, "Source:", source);
            labeled(out, depth + 1, "Condition:", condition);
        }

        NodeKind::GroupBy { fields, having } => {
            out.push_str("GROUP BY:\n");
            labeled(out, depth + 1, "Fields:", fields);
            labeled_opt(out, depth + 1, "Having:", having);
        }

        NodeKind::OrderBy(keys) => {
            let _ = writeln!(out, "ORDER BY ({} fields):", keys.len());
            for (i, OrderKey { field, ascending }) in keys.iter().enumerate() {
                indent(out, depth + 1);
                let _ = writeln!(
                    out,
                    "Field {} ({}):",
                    i + 1,
                    if *ascending { "ASC" } else { "DESC" }
                );
                write_text(out, field, depth + 2);
            }
        }

        NodeKind::Limit { limit, offset } => {
            let _ = write!(out, "LIMIT: {limit}");
            if *offset > 0 {
                let _ = write!(out, " OFFSET: {offset}");
            }
            out.push('\n');
        }

        NodeKind::Add { value, record_spec } => {
            out.push_str("ADD ACTION:\n");
            labeled(out, depth + 1, "Value:", value);
            labeled_opt(out, depth + 1, "Record Spec:", record_spec);
        }

        NodeKind::Remove { condition } => {
            out.push_str("REMOVE ACTION:\n");
            match condition {
                Some(condition) => labeled(out, depth + 1, "Condition:", condition),
                None => {
                    indent(out, depth + 1);
                    out.push_str("(Remove all)\n");
                }
            }
        }

        NodeKind::Update { assignments } => {
            let _ = writeln!(out, "UPDATE ACTION ({} fields):", assignments.len());
            for (i, (field, value)) in assignments.iter().enumerate() {
                indent(out, depth + 1);
                let _ = writeln!(out, "Field {}:", i + 1);
                write_text(out, field, depth + 2);
                indent(out, depth + 1);
                let _ = writeln!(out, "Value {}:", i + 1);
                write_text(out, value, depth + 2);
            }
        }

        NodeKind::Create { field_defs } => {
            let _ = writeln!(out, "CREATE ACTION ({} fields):", field_defs.len());
            for def in field_defs {
                write_text(out, def, depth + 1);
            }
        }

        NodeKind::Binary { op, left, right } => {
            out.push_str("BINARY EXPRESSION:\n");
            indent(out, depth + 1);
            let _ = writeln!(out, "Operator: {}", op.as_str());
            labeled(out, depth + 1, "Left:", left);
            labeled(out, depth + 1, "Right:", right);
        }

        NodeKind::Unary { op, operand } => {
            out.push_str("UNARY EXPRESSION:\n");
            indent(out, depth + 1);
            let _ = writeln!(out, "Operator: {}", op.as_str());
            labeled(out, depth + 1, "Operand:", operand);
        }

        NodeKind::Identifier(name) => {
            let _ = writeln!(out, "IDENTIFIER: {name}");
        }

        NodeKind::Literal(literal) => match literal {
            Literal::String(s) => {
                let _ = writeln!(out, "STRING: \"{s}\"");
            }
            Literal::Integer(i) => {
                let _ = writeln!(out, "INTEGER: {i}");
            }
            Literal::Decimal(d) => {
                let _ = writeln!(out, "DECIMAL: {d}");
            }
        },

        NodeKind::FieldDef {
            name,
            type_name,
            constraints,
        } => {
            out.push_str("FIELD DEFINITION:\n");
            labeled(out, depth + 1, "Name:", name);
            if let Some(type_name) = type_name {
                indent(out, depth + 1);
                let _ = writeln!(out, "Type: {type_name}");
            }
            if !constraints.is_empty() {
                indent(out, depth + 1);
                let _ = writeln!(out, "Constraints ({}):", constraints.len());
                for constraint in constraints {
                    write_text(out, constraint, depth + 2);
                }
            }
        }

        NodeKind::Constraint {
            kind,
            default_value,
        } => {
            let _ = writeln!(out, "CONSTRAINT: {}", kind.as_str());
            labeled_opt(out, depth + 1, "Value:", default_value);
        }

        NodeKind::FunctionCall { name, args } => {
            let _ = writeln!(out, "FUNCTION CALL: {} ({} args)", name, args.len());
            for (i, arg) in args.iter().enumerate() {
                indent(out, depth + 1);
                let _ = writeln!(out, "Arg {}:", i + 1);
                write_text(out, arg, depth + 2);
            }
        }

        NodeKind::Error(message) => {
            let _ = writeln!(out, "ERROR: {message}");
        }

        NodeKind::Program(statements) => {
            let _ = writeln!(out, "PROGRAM ({} statements):", statements.len());
            for statement in statements {
                write_text(out, statement, depth + 1);
            }
        }
    }
}

/// Render the tree as JSON. Absent optional clauses become `null`.
pub fn to_json(node: &Node) -> Value {
    let mut value = match &node.kind {
        NodeKind::Ask {
            source,
            fields,
            condition,
            group_by,
            order_by,
            limit,
        }
        | NodeKind::Show {
            source,
            fields,
            condition,
            group_by,
            order_by,
            limit,
        }
        | NodeKind::Get {
            source,
            fields,
            condition,
            group_by,
            order_by,
            limit,
        } => json!({
            "source": to_json(source),
            "fields": to_json(fields),
            "condition": opt_json(condition),
            "group_by": opt_json(group_by),
            "order_by": opt_json(order_by),
            "limit": opt_json(limit),
        }),

        NodeKind::Tell {
            source,
            action,
            condition,
        } => json!({
            "source": to_json(source),
            "action": to_json(action),
            "condition": opt_json(condition),
        }),

        NodeKind::Find {
            source,
            condition,
            group_by,
            order_by,
            limit,
        } => json!({
            "source": to_json(source),
            "condition": opt_json(condition),
            "group_by": opt_json(group_by),
            "order_by": opt_json(order_by),
            "limit": opt_json(limit),
        }),

        NodeKind::FieldList(fields) => json!({
            "fields": fields.iter().map(to_json).collect::<Vec<_>>(),
        }),

        NodeKind::Source { name, join } => json!({
            "name": name,
            "join": opt_json(join),
        }),

        NodeKind::Join { source, condition } => json!({
            "source": to_json(source),
            "condition": to_json(condition),
        }),

        NodeKind::GroupBy { fields, having } => json!({
            "fields": to_json(fields),
            "having": opt_json(having),
        }),

        NodeKind::OrderBy(keys) => json!({
            "keys": keys
                .iter()
                .map(|k| json!({
                    "field": to_json(&k.field),
                    "ascending": k.ascending,
                }))
                .collect::<Vec<_>>(),
        }),

        NodeKind::Limit { limit, offset } => json!({
            "limit": limit,
            "offset": offset,
        }),

        NodeKind::Add { value, record_spec } => json!({
            "value": to_json(value),
            "record_spec": opt_json(record_spec),
        }),

        NodeKind::Remove { condition } => json!({
            "condition": opt_json(condition),
        }),

        NodeKind::Update { assignments } => json!({
            "assignments": assignments
                .iter()
                .map(|(f, v)| json!({ "field": to_json(f), "value": to_json(v) }))
                .collect::<Vec<_>>(),
        }),

        NodeKind::Create { field_defs } => json!({
            "field_defs": field_defs.iter().map(to_json).collect::<Vec<_>>(),
        }),

        NodeKind::Binary { op, left, right } => json!({
            "op": op.as_str(),
            "left": to_json(left),
            "right": to_json(right),
        }),

        NodeKind::Unary { op, operand } => json!({
            "op": op.as_str(),
            "operand": to_json(operand),
        }),

        NodeKind::Identifier(name) => json!({ "name": name }),

        NodeKind::Literal(literal) => match literal {
            Literal::String(s) => json!({ "value": s, "literal": "string" }),
            Literal::Integer(i) => json!({ "value": i, "literal": "integer" }),
            Literal::Decimal(d) => json!({ "value": d, "literal": "decimal" }),
        },

        NodeKind::FieldDef {
            name,
            type_name,
            constraints,
        } => json!({
            "name": to_json(name),
            "field_type": type_name,
            "constraints": constraints.iter().map(to_json).collect::<Vec<_>>(),
        }),

        NodeKind::Constraint {
            kind,
            default_value,
        } => json!({
            "constraint": kind.as_str(),
            "default": opt_json(default_value),
        }),

        NodeKind::FunctionCall { name, args } => json!({
            "name": name,
            "args": args.iter().map(to_json).collect::<Vec<_>>(),
        }),

        NodeKind::Error(message) => json!({ "message": message }),

        NodeKind::Program(statements) => json!({
            "statements": statements.iter().map(to_json).collect::<Vec<_>>(),
        }),
    };

    if let Value::Object(map) = &mut value {
        map.insert("type".to_string(), json!(node.kind.name()));
        map.insert("line".to_string(), json!(node.line));
    }
    value
}

fn opt_json(node: &Option<Box<Node>>) -> Value {
    match node {
        Some(node) => to_json(node),
        None => Value::Null,
    }
}

/// Pre-order traversal. The callback receives each node with its depth;
/// returning `false` aborts the walk. Returns whether the walk ran to
/// completion.
pub fn walk(node: &Node, visit: &mut impl FnMut(&Node, usize) -> bool) -> bool {
    walk_at(node, 0, visit)
}

fn walk_at(node: &Node, depth: usize, visit: &mut impl FnMut(&Node, usize) -> bool) -> bool {
    if !visit(node, depth) {
        return false;
    }
    for child in children(node) {
        if !walk_at(child, depth + 1, visit) {
            return false;
        }
    }
    true
}

fn push_opt<'n>(out: &mut Vec<&'n Node>, child: &'n Option<Box<Node>>) {
    if let Some(c) = child.as_deref() {
        out.push(c);
    }
}

fn children(node: &Node) -> Vec<&Node> {
    let mut out: Vec<&Node> = Vec::new();

    match &node.kind {
        NodeKind::Ask {
            source,
            fields,
            condition,
            group_by,
            order_by,
            limit,
        }
        | NodeKind::Show {
            source,
            fields,
            condition,
            group_by,
            order_by,
            limit,
        }
        | NodeKind::Get {
            source,
            fields,
            condition,
            group_by,
            order_by,
            limit,
        } => {
            out.push(source);
            out.push(fields);
            push_opt(&mut out, condition);
            push_opt(&mut out, group_by);
            push_opt(&mut out, order_by);
            push_opt(&mut out, limit);
        }
        NodeKind::Tell {
            source,
            action,
            condition,
        } => {
            out.push(source);
            out.push(action);
            push_opt(&mut out, condition);
        }
        NodeKind::Find {
            source,
            condition,
            group_by,
            order_by,
            limit,
        } => {
            out.push(source);
            push_opt(&mut out, condition);
            push_opt(&mut out, group_by);
            push_opt(&mut out, order_by);
            push_opt(&mut out, limit);
        }
        NodeKind::FieldList(fields) => out.extend(fields.iter()),
        NodeKind::Source { join, .. } => push_opt(&mut out, join),
        NodeKind::Join { source, condition } => {
            out.push(source);
            out.push(condition);
        }
        NodeKind::GroupBy { fields, having } => {
            out.push(fields);
            push_opt(&mut out, having);
        }
        NodeKind::OrderBy(keys) => out.extend(keys.iter().map(|k| &k.field)),
        NodeKind::Limit { .. } => {}
        NodeKind::Add { value, record_spec } => {
            out.push(value);
            push_opt(&mut out, record_spec);
        }
        NodeKind::Remove { condition } => push_opt(&mut out, condition),
        NodeKind::Update { assignments } => {
            for (field, value) in assignments {
                out.push(field);
                out.push(value);
            }
        }
        NodeKind::Create { field_defs } => out.extend(field_defs.iter()),
        NodeKind::Binary { left, right, .. } => {
            out.push(left);
            out.push(right);
        }
        NodeKind::Unary { operand, .. } => out.push(operand),
        NodeKind::Identifier(_) | NodeKind::Literal(_) | NodeKind::Error(_) => {}
        NodeKind::FieldDef {
            name, constraints, ..
        } => {
            out.push(name);
            out.extend(constraints.iter());
        }
        NodeKind::Constraint { default_value, .. } => push_opt(&mut out, default_value),
        NodeKind::FunctionCall { args, .. } => out.extend(args.iter()),
        NodeKind::Program(statements) => out.extend(statements.iter()),
    }

    out
}

#[cfg(test)]
fn parsed(src: &str) -> Node {
    let mut parser = crate::parser::Parser::new(crate::lexer::Lexer::new(src));
    let node = parser.parse_query();
    assert!(!parser.had_error(), "parse failed: {src}");
    node
}

#[test]
fn test_text_dump_shape() {
    let text = to_text(&parsed("ASK users FOR name, email WHEN age > 18"));
    assert!(text.starts_with("ASK QUERY:\n"));
    assert!(text.contains("SOURCE: users"));
    assert!(text.contains("FIELD LIST (2 fields):"));
    assert!(text.contains("IDENTIFIER: email"));
    assert!(text.contains("Operator: >"));
    assert!(text.contains("INTEGER: 18"));
}

#[test]
fn test_text_limit_with_offset() {
    let text = to_text(&parsed("FIND orders LIMIT 10 OFFSET 20"));
    assert!(text.contains("LIMIT: 10 OFFSET: 20"));
}

#[test]
fn test_json_carries_type_and_line() {
    let value = to_json(&parsed("GET name FROM users"));
    assert_eq!(value["type"], "GetQuery");
    assert_eq!(value["line"], 1);
    assert_eq!(value["source"]["name"], "users");
    assert!(value["condition"].is_null());
}

#[test]
fn test_walk_visits_preorder_and_aborts() {
    let node = parsed("ASK users FOR name");
    let mut names = Vec::new();
    let finished = walk(&node, &mut |n, depth| {
        names.push((n.kind.name(), depth));
        true
    });
    assert!(finished);
    assert_eq!(names[0], ("AskQuery", 0));
    assert!(names.contains(&("Source", 1)));
    assert!(names.contains(&("Identifier", 2)));

    let mut count = 0;
    let finished = walk(&node, &mut |_, _| {
        count += 1;
        false
    });
    assert!(!finished);
    assert_eq!(count, 1);
}
