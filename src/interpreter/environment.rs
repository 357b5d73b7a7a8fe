use super::{
    error::RenderError,
    inheritance::{BlocksRenderer, SuperBlock},
};
use crate::{
    expression::Bindings,
    template::{RenderSettings, Template, TemplateLoader},
    value::Value,
};
use compact_str::{CompactString, ToCompactString};
use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
    rc::Rc,
    sync::Arc,
};

#[derive(Debug, Clone, Default)]
pub struct Scope {
    values: HashMap<CompactString, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_compact_string(), value);
    }
}

impl<K: AsRef<str>> FromIterator<(K, Value)> for Scope {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_compact_string(), value))
                .collect(),
        }
    }
}

/// The scope chain of a single render, innermost scope last.
///
/// Besides user bindings it carries the engine's inheritance state: the dispatch object
/// installed by the nearest `extends`, the super block of the block being rendered and the
/// stack of templates currently being rendered.
pub struct RenderContext {
    globals: Arc<Scope>,
    scopes: Vec<Scope>,
    loader: Arc<dyn TemplateLoader>,
    settings: RenderSettings,
    parent_template: Option<Rc<dyn BlocksRenderer>>,
    super_block: Option<Rc<SuperBlock>>,
    templates: Vec<CompactString>,
}

impl RenderContext {
    pub fn new(loader: Arc<dyn TemplateLoader>, globals: Scope) -> Self {
        Self {
            globals: Arc::new(globals),
            scopes: vec![Scope::new()],
            loader,
            settings: RenderSettings::default(),
            parent_template: None,
            super_block: None,
            templates: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn enter_scope(&mut self) -> &mut Scope {
        self.scopes.push(Scope::new());
        self.current_scope()
    }

    /// Pops the innermost scope. The root scope is never popped.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn current_scope(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::new());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Shares this chain when `include_current` is set; otherwise starts a fresh chain that only
    /// sees the globals. Engine state travels with both.
    pub fn clone_context(&mut self, include_current: bool) -> ContextClone<'_> {
        if include_current {
            ContextClone::Linked(self)
        } else {
            ContextClone::Isolated(RenderContext {
                globals: Arc::clone(&self.globals),
                scopes: vec![Scope::new()],
                loader: Arc::clone(&self.loader),
                settings: self.settings,
                parent_template: self.parent_template.clone(),
                super_block: self.super_block.clone(),
                templates: self.templates.clone(),
            })
        }
    }

    pub fn load_template(&self, name: &str) -> Option<Arc<Template>> {
        self.loader.load_template(name)
    }

    pub fn parent_template(&self) -> Option<Rc<dyn BlocksRenderer>> {
        self.parent_template.clone()
    }

    pub fn replace_parent_template(
        &mut self,
        renderer: Option<Rc<dyn BlocksRenderer>>,
    ) -> Option<Rc<dyn BlocksRenderer>> {
        std::mem::replace(&mut self.parent_template, renderer)
    }

    pub fn super_block(&self) -> Option<Rc<SuperBlock>> {
        self.super_block.clone()
    }

    pub fn replace_super_block(&mut self, block: Option<Rc<SuperBlock>>) -> Option<Rc<SuperBlock>> {
        std::mem::replace(&mut self.super_block, block)
    }

    /// Records that `name` is being rendered, failing on a repeated name or an over-long chain.
    pub fn enter_template(&mut self, name: &str) -> Result<(), RenderError> {
        if self.templates.iter().any(|t| t.as_str() == name) {
            let mut chain = self.templates.clone();
            chain.push(name.to_compact_string());
            return Err(RenderError::InheritanceCycle { chain });
        }
        if self.templates.len() >= self.settings.max_inheritance_depth {
            return Err(RenderError::InheritanceTooDeep {
                depth: self.templates.len() + 1,
                limit: self.settings.max_inheritance_depth,
            });
        }
        self.templates.push(name.to_compact_string());
        Ok(())
    }

    pub fn exit_template(&mut self) {
        self.templates.pop();
    }
}

impl Bindings for RenderContext {
    fn find_value(&self, name: &str) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.globals.get(name))
            .cloned()
    }
}

pub enum ContextClone<'a> {
    Linked(&'a mut RenderContext),
    Isolated(RenderContext),
}

impl Deref for ContextClone<'_> {
    type Target = RenderContext;

    fn deref(&self) -> &Self::Target {
        match self {
            ContextClone::Linked(context) => context,
            ContextClone::Isolated(context) => context,
        }
    }
}

impl DerefMut for ContextClone<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            ContextClone::Linked(context) => context,
            ContextClone::Isolated(context) => context,
        }
    }
}
