#![allow(dead_code)]

use std::sync::Arc;

use compact_str::CompactString;
use templar::{
    expression::{Expression, InfixOperator},
    interpreter::{error::RenderError, output::BufferedOutput, TemplateRenderer},
    statement::{
        ElseBranchStatement, ExtendsStatement, ForStatement, IfStatement, ParentBlockStatement,
        SetStatement, Statement, StatementList,
    },
    template::{MemoryLoader, RenderSettings, Template},
    value::Value,
};

pub fn render(
    template: &Template,
    loader: MemoryLoader,
    globals: Vec<(&str, Value)>,
) -> Result<String, RenderError> {
    render_with(template, loader, globals, RenderSettings::default())
}

pub fn render_with(
    template: &Template,
    loader: MemoryLoader,
    globals: Vec<(&str, Value)>,
    settings: RenderSettings,
) -> Result<String, RenderError> {
    let output = TemplateRenderer::new(BufferedOutput::new(), Arc::new(loader), globals)
        .with_settings(settings)
        .run(template)?;
    Ok(output.into_data())
}

pub fn render_body(body: Vec<Statement>, globals: Vec<(&str, Value)>) -> Result<String, RenderError> {
    let template = Template::new("main", StatementList::new(body));
    render(&template, MemoryLoader::new(), globals)
}

pub fn text(text: &str) -> Statement {
    Statement::Text(text.into())
}

pub fn output(expr: Expression) -> Statement {
    Statement::Output(expr)
}

pub fn var(name: &str) -> Expression {
    Expression::variable(name)
}

pub fn attr(object: &str, name: &str) -> Expression {
    Expression::attribute(Expression::variable(object), name)
}

pub fn constant(value: impl Into<Value>) -> Expression {
    Expression::constant(value)
}

pub fn infix(operator: InfixOperator, lhs: Expression, rhs: Expression) -> Expression {
    Expression::infix(operator, lhs, rhs)
}

pub fn strings(items: &[&str]) -> Value {
    Value::list(items.iter().map(|item| Value::from(*item)))
}

pub fn ints(items: &[i64]) -> Value {
    Value::list(items.iter().map(|item| Value::from(*item)))
}

pub fn for_each(vars: &[&str], value: Expression, body: Vec<Statement>) -> ForStatement {
    ForStatement {
        vars: vars.iter().map(|v| CompactString::from(*v)).collect(),
        value,
        if_expr: None,
        body: StatementList::new(body),
        else_body: None,
    }
}

pub fn if_chain(
    condition: Expression,
    body: Vec<Statement>,
    else_branches: Vec<(Option<Expression>, Vec<Statement>)>,
) -> Statement {
    Statement::If(IfStatement {
        condition,
        body: StatementList::new(body),
        else_branches: else_branches
            .into_iter()
            .map(|(condition, body)| ElseBranchStatement {
                condition,
                body: StatementList::new(body),
            })
            .collect(),
    })
}

pub fn set(fields: &[&str], expr: Expression) -> Statement {
    Statement::Set(SetStatement {
        fields: fields.iter().map(|f| CompactString::from(*f)).collect(),
        expr: Some(expr),
    })
}

pub fn block(name: &str, body: Vec<Statement>) -> Statement {
    scoped_block(name, false, body)
}

pub fn scoped_block(name: &str, is_scoped: bool, body: Vec<Statement>) -> Statement {
    Statement::ParentBlock(ParentBlockStatement {
        name: name.into(),
        is_scoped,
        body: Arc::new(StatementList::new(body)),
    })
}

pub fn extends(target: &str, blocks: Vec<(&str, Vec<Statement>)>) -> Statement {
    Statement::Extends(ExtendsStatement::new(
        target,
        blocks
            .into_iter()
            .map(|(name, body)| (CompactString::from(name), StatementList::new(body))),
    ))
}

pub fn template(name: &str, body: Vec<Statement>) -> Template {
    Template::new(name, StatementList::new(body))
}
