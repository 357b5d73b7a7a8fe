use crate::expression::Expression;
use compact_str::CompactString;
use std::{collections::HashMap, sync::Arc};

/// Statements produced by the parser. Nodes are immutable and shared read-only between renders.
#[derive(Debug, Clone)]
pub enum Statement {
    Text(CompactString),
    Output(Expression),
    For(ForStatement),
    If(IfStatement),
    Set(SetStatement),
    Block(BlockStatement),
    ParentBlock(ParentBlockStatement),
    Extends(ExtendsStatement),
    /// `{{ super() }}` inside a block override.
    Super,
}

#[derive(Debug, Clone, Default)]
pub struct StatementList {
    pub statements: Vec<Statement>,
}

impl StatementList {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }
}

impl FromIterator<Statement> for StatementList {
    fn from_iter<T: IntoIterator<Item = Statement>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone)]
pub struct ForStatement {
    pub vars: Vec<CompactString>,
    pub value: Expression,
    pub if_expr: Option<Expression>,
    pub body: StatementList,
    pub else_body: Option<StatementList>,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub condition: Expression,
    pub body: StatementList,
    pub else_branches: Vec<ElseBranchStatement>,
}

/// An `elif` when `condition` is present, a plain `else` otherwise.
#[derive(Debug, Clone)]
pub struct ElseBranchStatement {
    pub condition: Option<Expression>,
    pub body: StatementList,
}

#[derive(Debug, Clone)]
pub struct SetStatement {
    pub fields: Vec<CompactString>,
    pub expr: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
    pub name: CompactString,
    pub body: Arc<StatementList>,
}

/// A block in a template that may be rendered as somebody's ancestor. Its body is the
/// default content used when no descendant overrides the block.
#[derive(Debug, Clone)]
pub struct ParentBlockStatement {
    pub name: CompactString,
    pub is_scoped: bool,
    pub body: Arc<StatementList>,
}

pub type BlocksCollection = HashMap<CompactString, Arc<StatementList>>;

#[derive(Debug, Clone)]
pub struct ExtendsStatement {
    pub template_name: CompactString,
    /// False when the target is computed at render time rather than written as a literal path.
    pub is_path: bool,
    pub blocks: Arc<BlocksCollection>,
}

impl ExtendsStatement {
    pub fn new(
        template_name: &str,
        blocks: impl IntoIterator<Item = (CompactString, StatementList)>,
    ) -> Self {
        Self {
            template_name: template_name.into(),
            is_path: true,
            blocks: Arc::new(
                blocks
                    .into_iter()
                    .map(|(name, body)| (name, Arc::new(body)))
                    .collect(),
            ),
        }
    }
}
