//! Generic parse-tree interface.
//!
//! The grammar front end is an external collaborator: whatever parser
//! produces module syntax hands the semantic builder a generic visitable
//! tree of [`ParseNode`]s. Nothing here knows the grammar itself — only the
//! rule vocabulary the builder understands and the shapes it expects.
//!
//! # Expected shapes
//!
//! ```text
//! Module
//! ├── ModuleName("TEST-MIB")
//! ├── ImportGroup
//! │   ├── ImportSymbol("DisplayString")
//! │   └── ImportFrom("SNMPv2-TC")
//! ├── TypeAssignment
//! │   ├── TypeName("MyString")
//! │   └── BuiltinType("OCTET STRING")
//! │       └── Constraint("SIZE") └── Range ├── Bound("0") └── Bound("32")
//! ├── ValueAssignment
//! │   ├── ValueName("myRoot")
//! │   └── OidValue ├── OidArc("enterprises") └── OidArc("4242")
//! └── MacroAssignment
//!     ├── ValueName("myObject")
//!     ├── MacroKeyword("OBJECT-TYPE")
//!     ├── Clause ├── ClauseName("SYNTAX") └── <type node>
//!     ├── Clause ├── ClauseName("INDEX") └── ValueName*
//!     └── OidValue …
//! ```
//!
//! Rules carrying source text put it in [`ParseNode::text`]; interior rules
//! leave it `None`.

use std::fmt;

/// Rule kinds of the visitable tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rule {
    /// One module; the tree root handed to the builder.
    Module,
    /// Module name token.
    ModuleName,
    /// One `FROM` group of an IMPORTS section.
    ImportGroup,
    /// An imported identifier.
    ImportSymbol,
    /// The module an import group pulls from.
    ImportFrom,
    /// `Name ::= <type>`.
    TypeAssignment,
    /// Uppercase type name token.
    TypeName,
    /// `name OBJECT IDENTIFIER ::= { … }`.
    ValueAssignment,
    /// Lowercase value/object name token.
    ValueName,
    /// `name MACRO-NAME … ::= value`.
    MacroAssignment,
    /// The macro keyword (`OBJECT-TYPE`, `TRAP-TYPE`, …).
    MacroKeyword,
    /// One macro attribute clause.
    Clause,
    /// Clause keyword (`SYNTAX`, `INDEX`, `DESCRIPTION`, …).
    ClauseName,
    /// A built-in type keyword, optionally with named numbers and a
    /// constraint as children.
    BuiltinType,
    /// A reference to a declared type, optionally constrained.
    TypeReference,
    /// `SEQUENCE { … }`; children are `NamedType`s.
    SequenceType,
    /// `SEQUENCE OF <type>`.
    SequenceOfType,
    /// `CHOICE { … }`; children are `NamedType`s.
    ChoiceType,
    /// `BITS { … }`; children are `NamedNumber`s.
    BitsType,
    /// A named member of a SEQUENCE/CHOICE.
    NamedType,
    /// `name(number)` inside enumerations, BITS, or OID values.
    NamedNumber,
    /// A SIZE/VALUE/FROM constraint; text is the kind keyword.
    Constraint,
    /// One range of a constraint.
    Range,
    /// A range bound: a number, `MIN`, or `MAX`.
    Bound,
    /// An integer token.
    Number,
    /// A quoted text body.
    QuotedString,
    /// An OID component list.
    OidValue,
    /// One OID component: a name, a number, or a named number.
    OidArc,
}

/// A node of the generic parse tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseNode {
    /// The rule this node represents.
    pub rule: Rule,
    /// Token text, for terminal-bearing rules.
    pub text: Option<String>,
    /// Child nodes in source order.
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    /// The token text, or `""` when absent.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// First child with the given rule.
    #[must_use]
    pub fn child(&self, rule: Rule) -> Option<&ParseNode> {
        self.children.iter().find(|c| c.rule == rule)
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(t) => write!(f, "{:?}({t})", self.rule),
            None => write!(f, "{:?}", self.rule),
        }
    }
}

/// Callbacks fired while walking a tree.
///
/// Both callbacks default to no-ops so visitors implement only the side
/// they need.
pub trait Visitor {
    /// Called before a node's children.
    fn enter(&mut self, _node: &ParseNode) {}
    /// Called after a node's children.
    fn leave(&mut self, _node: &ParseNode) {}
}

/// Depth-first walk firing `enter`/`leave` around every node.
pub fn walk<V: Visitor>(node: &ParseNode, visitor: &mut V) {
    visitor.enter(node);
    for child in &node.children {
        walk(child, visitor);
    }
    visitor.leave(node);
}

/// An interior node.
#[must_use]
pub fn rule(rule: Rule, children: Vec<ParseNode>) -> ParseNode {
    ParseNode {
        rule,
        text: None,
        children,
    }
}

/// A terminal-bearing node.
#[must_use]
pub fn token(rule: Rule, text: impl Into<String>) -> ParseNode {
    ParseNode {
        rule,
        text: Some(text.into()),
        children: Vec::new(),
    }
}

/// A node with both token text and children (`BuiltinType`,
/// `TypeReference`, `NamedNumber`, `OidArc`, `Constraint`).
#[must_use]
pub fn token_with(rule: Rule, text: impl Into<String>, children: Vec<ParseNode>) -> ParseNode {
    ParseNode {
        rule,
        text: Some(text.into()),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Trace {
        entered: Vec<Rule>,
        left: Vec<Rule>,
    }

    impl Visitor for Trace {
        fn enter(&mut self, node: &ParseNode) {
            self.entered.push(node.rule);
        }
        fn leave(&mut self, node: &ParseNode) {
            self.left.push(node.rule);
        }
    }

    #[test]
    fn test_walk_order() {
        let tree = rule(
            Rule::Module,
            vec![
                token(Rule::ModuleName, "M"),
                rule(Rule::ValueAssignment, vec![token(Rule::ValueName, "x")]),
            ],
        );

        let mut trace = Trace {
            entered: Vec::new(),
            left: Vec::new(),
        };
        walk(&tree, &mut trace);

        assert_eq!(
            trace.entered,
            vec![
                Rule::Module,
                Rule::ModuleName,
                Rule::ValueAssignment,
                Rule::ValueName
            ]
        );
        // Leave fires children-first.
        assert_eq!(trace.left.last(), Some(&Rule::Module));
        assert_eq!(trace.left[0], Rule::ModuleName);
    }

    #[test]
    fn test_child_lookup() {
        let tree = rule(
            Rule::Module,
            vec![token(Rule::ModuleName, "TEST-MIB")],
        );
        assert_eq!(tree.child(Rule::ModuleName).unwrap().text(), "TEST-MIB");
        assert!(tree.child(Rule::OidValue).is_none());
    }
}
