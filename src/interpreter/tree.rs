use std::collections::BTreeMap;

use compact_str::CompactString;
use tracing::{debug, trace};

use super::{error::RenderError, OutputSink, Render, RenderContext, RenderState, Scope};
use crate::{
    expression::Expression,
    statement::{
        BlockStatement, ElseBranchStatement, ForStatement, IfStatement, SetStatement, Statement,
        StatementList,
    },
    value::{ListAdapter, MapAdapter, Value},
};

impl Render for Statement {
    fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError> {
        match self {
            Statement::Text(text) => {
                out.write_str(text);
                Ok(RenderState::Continue)
            }
            Statement::Output(expr) => {
                let value = expr.evaluate(&*context)?;
                out.write_str(&value.to_string());
                Ok(RenderState::Continue)
            }
            Statement::For(stmt) => stmt.render(out, context),
            Statement::If(stmt) => stmt.render(out, context),
            Statement::Set(stmt) => stmt.render(out, context),
            Statement::Block(stmt) => stmt.render(out, context),
            Statement::ParentBlock(stmt) => stmt.render(out, context),
            Statement::Extends(stmt) => stmt.render(out, context),
            Statement::Super => super::inheritance::render_super(out, context),
        }
    }
}

impl Render for StatementList {
    fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError> {
        for stmt in self.iter() {
            match stmt.render(out, context)? {
                RenderState::Continue => {}
                state => return Ok(state),
            }
        }
        Ok(RenderState::Continue)
    }
}

impl ForStatement {
    fn bind_vars(&self, scope: &mut Scope, item: &Value) {
        match self.vars.as_slice() {
            [name] => scope.insert(name, item.clone()),
            names => {
                for name in names {
                    scope.insert(name, item.subscript(name));
                }
            }
        }
    }

    fn filter_items(
        &self,
        items: &ListAdapter,
        filter: &Expression,
        context: &mut RenderContext,
    ) -> Result<ListAdapter, RenderError> {
        context.enter_scope();
        let retained = self.collect_matching(items, filter, context);
        context.exit_scope();
        Ok(retained?.into_iter().collect())
    }

    fn collect_matching(
        &self,
        items: &ListAdapter,
        filter: &Expression,
        context: &mut RenderContext,
    ) -> Result<Vec<Value>, RenderError> {
        let mut retained = Vec::new();
        for item in items.iter() {
            self.bind_vars(context.current_scope(), &item);
            if filter.evaluate(&*context)?.is_truthy() {
                retained.push(item);
            }
        }
        Ok(retained)
    }

    /// Returns the state of the last body render and the number of items that survived the filter.
    fn render_loop(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
        items: ListAdapter,
    ) -> Result<(RenderState, usize), RenderError> {
        let items = match &self.if_expr {
            Some(filter) => self.filter_items(&items, filter, context)?,
            None => items,
        };
        let state = self.render_items(out, context, &items)?;
        Ok((state, items.size()))
    }

    fn render_items(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
        items: &ListAdapter,
    ) -> Result<RenderState, RenderError> {
        let length = items.size();
        for (index, item) in items.iter().enumerate() {
            let scope = context.current_scope();
            scope.insert("loop", loop_metadata(items, index, length));
            self.bind_vars(scope, &item);

            match self.body.render(out, context)? {
                RenderState::Continue => {}
                state => return Ok(state),
            }
        }
        Ok(RenderState::Continue)
    }
}

fn loop_metadata(items: &ListAdapter, index: usize, length: usize) -> Value {
    let mut entries = BTreeMap::<CompactString, Value>::new();
    entries.insert("length".into(), Value::Int(length as i64));
    entries.insert("index".into(), Value::Int(index as i64 + 1));
    entries.insert("index0".into(), Value::Int(index as i64));
    entries.insert("first".into(), Value::Bool(index == 0));
    entries.insert("last".into(), Value::Bool(index + 1 == length));
    // Absent rather than empty at the edges; templates test these with `is defined`.
    if index > 0 {
        if let Some(previous) = items.get(index - 1) {
            entries.insert("previtem".into(), previous);
        }
    }
    if index + 1 < length {
        if let Some(next) = items.get(index + 1) {
            entries.insert("nextitem".into(), next);
        }
    }
    Value::Map(MapAdapter::from(entries))
}

impl Render for ForStatement {
    fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError> {
        let loop_value = self.value.evaluate(&*context)?;
        let Some(items) = loop_value.to_list() else {
            debug!(value = %loop_value, "loop source is not iterable, skipping");
            return Ok(RenderState::Continue);
        };

        context.enter_scope();
        let result = self.render_loop(out, context, items);
        context.exit_scope();

        let (state, length) = result?;
        if state != RenderState::Continue {
            return Ok(state);
        }
        match &self.else_body {
            Some(else_body) if length == 0 => else_body.render(out, context),
            _ => Ok(RenderState::Continue),
        }
    }
}

impl ElseBranchStatement {
    pub fn should_render(&self, context: &RenderContext) -> Result<bool, RenderError> {
        match &self.condition {
            Some(condition) => Ok(condition.evaluate(context)?.is_truthy()),
            None => Ok(true),
        }
    }
}

impl Render for ElseBranchStatement {
    fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError> {
        self.body.render(out, context)
    }
}

impl Render for IfStatement {
    fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError> {
        if self.condition.evaluate(&*context)?.is_truthy() {
            return self.body.render(out, context);
        }

        for branch in self.else_branches.iter() {
            if branch.should_render(context)? {
                return branch.render(out, context);
            }
        }
        Ok(RenderState::Continue)
    }
}

impl Render for SetStatement {
    fn render(
        &self,
        _out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError> {
        let Some(expr) = &self.expr else {
            return Ok(RenderState::Continue);
        };

        let value = expr.evaluate(&*context)?;
        let scope = context.current_scope();
        match self.fields.as_slice() {
            [name] => scope.insert(name, value),
            names => {
                for name in names {
                    scope.insert(name, value.subscript(name));
                }
            }
        }
        Ok(RenderState::Continue)
    }
}

impl Render for BlockStatement {
    fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError> {
        trace!(block = %self.name, "rendering plain block");
        self.body.render(out, context)
    }
}
