pub mod environment;
pub mod error;
pub mod inheritance;
pub mod output;
mod tree;

use crate::{
    template::{RenderSettings, Template, TemplateLoader},
    value::Value,
};
pub use environment::{ContextClone, RenderContext, Scope};
use error::RenderError;
use std::sync::Arc;

/// Append-only text sink. Statements write to it and never read back.
pub trait OutputSink {
    fn write_str(&mut self, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Continue,
    /// An `extends` took over; nothing else at this level may produce output.
    Delegated,
}

pub trait Render {
    fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<RenderState, RenderError>;
}

pub struct TemplateRenderer<C: OutputSink> {
    context: RenderContext,
    output: C,
}

impl<C> TemplateRenderer<C>
where
    C: OutputSink,
{
    pub fn new<K: AsRef<str>>(
        output: C,
        loader: Arc<dyn TemplateLoader>,
        globals: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Self {
            context: RenderContext::new(loader, globals.into_iter().collect()),
            output,
        }
    }

    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.context = self.context.with_settings(settings);
        self
    }

    pub fn run(mut self, template: &Template) -> Result<C, RenderError> {
        template.render(&mut self.output, &mut self.context)?;
        Ok(self.output)
    }
}
