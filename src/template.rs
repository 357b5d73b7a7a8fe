use crate::{
    interpreter::{error::RenderError, OutputSink, Render, RenderContext},
    statement::StatementList,
};
use compact_str::CompactString;
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    /// Longest `extends` chain a render may follow, counting the template rendered first.
    pub max_inheritance_depth: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_inheritance_depth: 32,
        }
    }
}

#[derive(Debug)]
pub struct Template {
    name: CompactString,
    body: StatementList,
}

impl Template {
    pub fn new(name: &str, body: StatementList) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &StatementList {
        &self.body
    }

    /// Renders the top-level statements. Used both for a direct render and by `extends`
    /// when this template is someone's ancestor.
    #[tracing::instrument(level = "debug", skip_all, fields(template = %self.name))]
    pub fn render(
        &self,
        out: &mut dyn OutputSink,
        context: &mut RenderContext,
    ) -> Result<(), RenderError> {
        context.enter_template(&self.name)?;
        context.enter_scope();
        let result = self.body.render(out, context);
        context.exit_scope();
        context.exit_template();
        result.map(|_| ())
    }
}

pub trait TemplateLoader: Send + Sync {
    /// Returns `None` when the name does not resolve to a template.
    fn load_template(&self, name: &str) -> Option<Arc<Template>>;
}

#[derive(Debug, Default)]
pub struct MemoryLoader {
    templates: HashMap<CompactString, Arc<Template>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: Template) -> Arc<Template> {
        let template = Arc::new(template);
        self.templates
            .insert(template.name.clone(), Arc::clone(&template));
        template
    }

    pub fn with(mut self, template: Template) -> Self {
        self.insert(template);
        self
    }
}

impl TemplateLoader for MemoryLoader {
    fn load_template(&self, name: &str) -> Option<Arc<Template>> {
        self.templates.get(name).cloned()
    }
}
