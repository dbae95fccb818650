//! Concrete parse-tree data model.
//!
//! The tree preserves delimiter tokens as nodes so the concrete shape of
//! the source can be re-rendered; an abstract syntax tree would drop
//! them. Nodes exclusively own their children and the tree is a pure
//! DAG downward.

use std::fmt;

/// Closed label taxonomy for parse-tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLabel {
    Program,
    IfStatement,
    ElifClause,
    ElseClause,
    WhileStatement,
    ForStatement,
    FunctionDefinition,
    ClassDefinition,
    ReturnStatement,
    PassStatement,
    BreakStatement,
    ContinueStatement,
    ImportStatement,
    Assignment,
    ExpressionStatement,
    FunctionCallStatement,
    Suite,
    IdentifierList,
    ExpressionList,
    AssignOp,
    Keyword,
    Identifier,
    Parameter,
    Parameters,
    Arguments,
    Delimiter,
    DottedName,
    NamePart,
    Alias,
    ImportName,
    ImportAll,
    TernaryOp,
    BinaryOp,
    UnaryOp,
    Comparison,
    ComparisonOp,
    FunctionCall,
    AttributeAccess,
    Tuple,
    ParenExpr,
    List,
    Dict,
    KeyValuePair,
    Literal,
}

impl NodeLabel {
    pub fn name(self) -> &'static str {
        match self {
            NodeLabel::Program => "Program",
            NodeLabel::IfStatement => "IfStatement",
            NodeLabel::ElifClause => "ElifClause",
            NodeLabel::ElseClause => "ElseClause",
            NodeLabel::WhileStatement => "WhileStatement",
            NodeLabel::ForStatement => "ForStatement",
            NodeLabel::FunctionDefinition => "FunctionDefinition",
            NodeLabel::ClassDefinition => "ClassDefinition",
            NodeLabel::ReturnStatement => "ReturnStatement",
            NodeLabel::PassStatement => "PassStatement",
            NodeLabel::BreakStatement => "BreakStatement",
            NodeLabel::ContinueStatement => "ContinueStatement",
            NodeLabel::ImportStatement => "ImportStatement",
            NodeLabel::Assignment => "Assignment",
            NodeLabel::ExpressionStatement => "ExpressionStatement",
            NodeLabel::FunctionCallStatement => "FunctionCallStatement",
            NodeLabel::Suite => "Suite",
            NodeLabel::IdentifierList => "IdentifierList",
            NodeLabel::ExpressionList => "ExpressionList",
            NodeLabel::AssignOp => "AssignOp",
            NodeLabel::Keyword => "Keyword",
            NodeLabel::Identifier => "Identifier",
            NodeLabel::Parameter => "Parameter",
            NodeLabel::Parameters => "Parameters",
            NodeLabel::Arguments => "Arguments",
            NodeLabel::Delimiter => "Delimiter",
            NodeLabel::DottedName => "DottedName",
            NodeLabel::NamePart => "NamePart",
            NodeLabel::Alias => "Alias",
            NodeLabel::ImportName => "ImportName",
            NodeLabel::ImportAll => "ImportAll",
            NodeLabel::TernaryOp => "TernaryOp",
            NodeLabel::BinaryOp => "BinaryOp",
            NodeLabel::UnaryOp => "UnaryOp",
            NodeLabel::Comparison => "Comparison",
            NodeLabel::ComparisonOp => "ComparisonOp",
            NodeLabel::FunctionCall => "FunctionCall",
            NodeLabel::AttributeAccess => "AttributeAccess",
            NodeLabel::Tuple => "Tuple",
            NodeLabel::ParenExpr => "ParenExpr",
            NodeLabel::List => "List",
            NodeLabel::Dict => "Dict",
            NodeLabel::KeyValuePair => "KeyValuePair",
            NodeLabel::Literal => "Literal",
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    pub label: NodeLabel,
    pub value: String,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn new(label: NodeLabel) -> Self {
        Self {
            label,
            value: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_value(label: NodeLabel, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: ParseNode) {
        self.children.push(child);
    }

    /// Depth-first preorder dump, two spaces per level.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(0, &mut out);
        out
    }

    fn dump_into(&self, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(self.label.name());
        if !self.value.is_empty() {
            out.push_str(": ");
            out.push_str(&self.value);
        }
        out.push('\n');
        for child in &self.children {
            child.dump_into(depth + 1, out);
        }
    }
}
