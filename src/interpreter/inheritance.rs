//! Template inheritance: `extends`, overridable blocks and `super()`.
//!
//! An `extends` statement wraps the loaded ancestor in a [`ParentTemplateRenderer`] and renders
//! the ancestor's statements with that renderer installed on the context. Each
//! [`ParentBlockStatement`] the ancestor reaches asks the installed renderer for overrides of
//! its name, most-derived template first. Every rendered level gets a [`SuperBlock`] pointing at
//! the next level up, ending at the ancestor's own default content.

use std::{rc::Rc, sync::Arc};

use tracing::{debug, trace, warn};

use super::{error::RenderError, OutputSink, Render, RenderContext, RenderState};
use crate::{
    statement::{BlocksCollection, ExtendsStatement, ParentBlockStatement, StatementList},
    template::Template,
};

pub trait BlocksRenderer {
    /// Bodies registered for `name` along the extends chain, most-derived template first.
    fn block_overrides(&self, name: &str) -> Vec<Arc<StatementList>>;

    /// Renders the most-derived override of `name`, or returns `None` when no template in the
    /// chain overrides it. The super block installed on `context` becomes the fallback for the
    /// least-derived override's `super()`.
    fn render_block(
        &self,
        name: &str,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<Option<RenderState>, RenderError> {
        let overrides = self.block_overrides(name);
        trace!(block = name, levels = overrides.len(), "dispatching block");
        if overrides.is_empty() {
            return Ok(None);
        }

        let fallback = context.super_block();
        let top = overrides
            .into_iter()
            .rev()
            .fold(fallback, |parent, body| {
                Some(Rc::new(SuperBlock::new(body, parent)))
            });
        match top {
            Some(block) => block.render(out, context).map(Some),
            None => Ok(None),
        }
    }
}

/// One level of a block's content together with the level `super()` renders from inside it.
#[derive(Debug)]
pub struct SuperBlock {
    body: Arc<StatementList>,
    parent: Option<Rc<SuperBlock>>,
}

impl SuperBlock {
    pub fn new(body: Arc<StatementList>, parent: Option<Rc<SuperBlock>>) -> Self {
        Self { body, parent }
    }

    pub fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError> {
        let previous = context.replace_super_block(self.parent.clone());
        let result = self.body.render(out, context);
        context.replace_super_block(previous);
        result
    }
}

pub struct ParentTemplateRenderer {
    template: Arc<Template>,
    blocks: Arc<BlocksCollection>,
    derived: Option<Rc<dyn BlocksRenderer>>,
}

impl ParentTemplateRenderer {
    pub fn new(
        template: Arc<Template>,
        blocks: Arc<BlocksCollection>,
        derived: Option<Rc<dyn BlocksRenderer>>,
    ) -> Self {
        Self {
            template,
            blocks,
            derived,
        }
    }

    pub fn render(
        self: Rc<Self>,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<(), RenderError> {
        let template = Arc::clone(&self.template);
        let previous = context.replace_parent_template(Some(self as Rc<dyn BlocksRenderer>));
        let result = template.render(out, context);
        context.replace_parent_template(previous);
        result
    }
}

impl BlocksRenderer for ParentTemplateRenderer {
    fn block_overrides(&self, name: &str) -> Vec<Arc<StatementList>> {
        let mut overrides = self
            .derived
            .as_ref()
            .map(|derived| derived.block_overrides(name))
            .unwrap_or_default();
        overrides.extend(self.blocks.get(name).cloned());
        overrides
    }
}

impl Render for ParentBlockStatement {
    fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError> {
        let Some(parent) = context.parent_template() else {
            debug!(block = %self.name, "no ancestor dispatch installed, block skipped");
            return Ok(RenderState::Continue);
        };

        let mut inner = context.clone_context(self.is_scoped);
        inner.enter_scope();
        let own = Rc::new(SuperBlock::new(Arc::clone(&self.body), None));
        let previous = inner.replace_super_block(Some(Rc::clone(&own)));
        let result = match parent.render_block(&self.name, out, &mut inner) {
            Ok(Some(state)) => Ok(state),
            Ok(None) => own.render(out, &mut inner),
            Err(error) => Err(error),
        };
        inner.replace_super_block(previous);
        inner.exit_scope();
        result
    }
}

impl Render for ExtendsStatement {
    fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError> {
        if !self.is_path {
            warn!(
                target_expr = %self.template_name,
                "extends with a computed template name is not supported yet"
            );
            return Ok(RenderState::Continue);
        }

        let Some(template) = context.load_template(&self.template_name) else {
            debug!(template = %self.template_name, "extends target could not be loaded");
            return Ok(RenderState::Delegated);
        };

        let renderer = Rc::new(ParentTemplateRenderer::new(
            template,
            Arc::clone(&self.blocks),
            context.parent_template(),
        ));
        renderer.render(out, context)?;
        Ok(RenderState::Delegated)
    }
}

pub(super) fn render_super(
    out: &mut dyn OutputSink,
    context: &mut RenderContext,
) -> Result<RenderState, RenderError> {
    match context.super_block() {
        Some(block) => block.render(out, context),
        None => {
            debug!("super() called outside of a block override");
            Ok(RenderState::Continue)
        }
    }
}
