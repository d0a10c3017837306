//! The per-module semantic builder.
//!
//! One [`ModuleWalker`] visits one module's parse tree and assembles its
//! declarations on an explicit value stack — no shared mutable state, one
//! walker per module. Entering a composite construct pushes a sentinel
//! marker; leaving it pops back to the marker and collects whatever the
//! children produced, in declaration order. Macro bodies push an attribute
//! bag that the clause handlers fill in.
//!
//! The output is a [`ModuleDecls`]: structure only, nothing resolved.
//! Free-text clauses (`DESCRIPTION`, `CONTACT-INFO`, …) are recognized and
//! dropped; they have no bearing on codec behavior.

use crate::ast::{self, ParseNode, Rule, Visitor};
use crate::decl::{
    Constraint, ConstraintKind, ConstraintRange, DeclaredKind, DeclaredType, ScalarKind,
};
use crate::error::MibError;
use crate::model::Symbol;
use crate::report::{LoadEvent, LoadReporter, Severity};
use std::collections::{BTreeMap, BTreeSet};

/// One component of an unresolved OID value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OidArcExpr {
    /// A symbolic reference, resolved against the module scope.
    Name(String),
    /// A literal arc.
    Number(u32),
    /// `name(number)` — the number decides, the name decorates.
    NamedNumber(String, u32),
}

/// An unresolved OID value: components in source order.
pub type OidExpr = Vec<OidArcExpr>;

/// `Name ::= <type>`.
#[derive(Clone, Debug)]
pub struct TypeDecl {
    /// Declared type name.
    pub name: String,
    /// The declared structure.
    pub ty: DeclaredType,
}

/// `name OBJECT IDENTIFIER ::= { … }` (and macro values without object
/// semantics).
#[derive(Clone, Debug)]
pub struct ValueDecl {
    /// Declared value name.
    pub name: String,
    /// Unresolved OID components.
    pub oid: OidExpr,
}

/// An `OBJECT-TYPE` assignment.
#[derive(Clone, Debug)]
pub struct ObjectDecl {
    /// Object name.
    pub name: String,
    /// The `SYNTAX` clause.
    pub syntax: DeclaredType,
    /// `INDEX` column names, when this is a row.
    pub index: Option<Vec<String>>,
    /// `AUGMENTS` target row, when this row borrows another's index.
    pub augments: Option<String>,
    /// Unresolved OID components.
    pub oid: OidExpr,
}

/// A `TRAP-TYPE` assignment.
#[derive(Clone, Debug)]
pub struct TrapDecl {
    /// Trap name.
    pub name: String,
    /// `ENTERPRISE` symbol.
    pub enterprise: String,
    /// `VARIABLES` names in declaration order.
    pub variables: Vec<String>,
    /// The specific trap number.
    pub number: i64,
}

/// Everything one module declares.
#[derive(Clone, Debug, Default)]
pub struct ModuleDecls {
    /// Module name.
    pub name: String,
    /// Import table: identifier → originating module.
    pub imports: BTreeMap<String, String>,
    /// Type assignments, textual conventions included.
    pub types: Vec<TypeDecl>,
    /// Plain value assignments and opaque macro values.
    pub values: Vec<ValueDecl>,
    /// `OBJECT-TYPE` assignments.
    pub objects: Vec<ObjectDecl>,
    /// `TRAP-TYPE` assignments.
    pub traps: Vec<TrapDecl>,
}

impl ModuleDecls {
    /// Resolve a bare identifier to a qualified symbol: the import table
    /// first, the module itself as fallback.
    #[must_use]
    pub fn qualify(&self, name: &str) -> Symbol {
        match self.imports.get(name) {
            Some(source) => Symbol::qualified(source.clone(), name),
            None => Symbol::qualified(self.name.clone(), name),
        }
    }

    /// Total number of collected declarations.
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.types.len() + self.values.len() + self.objects.len() + self.traps.len()
    }
}

/// Walk one module tree into its declarations.
///
/// Fails only on structural impossibilities (no module name); everything
/// else degrades per-assignment and is reported.
pub fn walk_module<R: LoadReporter>(
    tree: &ParseNode,
    reporter: &mut R,
) -> Result<ModuleDecls, MibError> {
    let mut walker = ModuleWalker {
        decls: ModuleDecls::default(),
        stack: Vec::new(),
        declared: BTreeSet::new(),
        reporter,
    };
    ast::walk(tree, &mut walker);

    if walker.decls.name.is_empty() {
        return Err(MibError::MissingModuleName);
    }
    Ok(walker.decls)
}

/// Values living on the walker's stack.
#[derive(Debug)]
enum StackValue {
    /// Sentinel pushed when entering a composite construct.
    Marker,
    /// An identifier.
    Name(String),
    /// Free text.
    Text(String),
    /// An integer token.
    Number(i64),
    /// A range bound; `None` is MIN/MAX.
    Bound(Option<i64>),
    /// A completed range.
    Range(ConstraintRange),
    /// A completed constraint.
    Constraint(Constraint),
    /// A completed type.
    Type(DeclaredType),
    /// A named SEQUENCE/CHOICE member.
    Member(String, DeclaredType),
    /// A `name(number)` pair.
    NamedNumber(String, i64),
    /// One OID component.
    Arc(OidArcExpr),
    /// A completed OID value.
    Oid(OidExpr),
    /// A macro body being filled in.
    Bag(AttributeBag),
}

/// Attribute bag for one macro body.
#[derive(Debug)]
struct AttributeBag {
    keyword: String,
    clauses: BTreeMap<String, ClauseValue>,
}

#[derive(Debug)]
enum ClauseValue {
    Type(DeclaredType),
    Text(String),
    Name(String),
    Names(Vec<String>),
}

struct ModuleWalker<'r, R: LoadReporter> {
    decls: ModuleDecls,
    stack: Vec<StackValue>,
    declared: BTreeSet<String>,
    reporter: &'r mut R,
}

impl<R: LoadReporter> ModuleWalker<'_, R> {
    fn pop_to_marker(&mut self) -> Vec<StackValue> {
        let mut items = Vec::new();
        while let Some(v) = self.stack.pop() {
            match v {
                StackValue::Marker => break,
                other => items.push(other),
            }
        }
        items.reverse();
        items
    }

    fn problem(&mut self, severity: Severity, error: &MibError) {
        self.reporter.report(
            severity,
            LoadEvent::Problem {
                module: (!self.decls.name.is_empty()).then_some(self.decls.name.as_str()),
                error,
            },
        );
    }

    /// First declaration of a name wins; later ones are reported and
    /// dropped.
    fn claim(&mut self, name: &str) -> bool {
        if self.declared.insert(name.to_owned()) {
            return true;
        }
        let err = MibError::DuplicatedSymbol(Symbol::qualified(self.decls.name.clone(), name));
        self.problem(Severity::Debug, &err);
        false
    }

    fn add_type(&mut self, name: String, ty: DeclaredType) {
        if self.claim(&name) {
            self.decls.types.push(TypeDecl { name, ty });
        }
    }

    fn add_value(&mut self, name: String, oid: OidExpr) {
        if self.claim(&name) {
            self.decls.values.push(ValueDecl { name, oid });
        }
    }

    fn bad_assignment(&mut self, name: &str, reason: &str) {
        let err = MibError::BadAssignment {
            symbol: Symbol::qualified(self.decls.name.clone(), name),
            reason: reason.to_owned(),
        };
        self.problem(Severity::Warn, &err);
    }

    fn finish_import_group(&mut self) {
        let items = self.pop_to_marker();
        let mut symbols = Vec::new();
        let mut source = None;
        for item in items {
            match item {
                StackValue::Name(n) => symbols.push(n),
                StackValue::Text(m) => source = Some(m),
                _ => {}
            }
        }
        if let Some(source) = source {
            for symbol in symbols {
                self.decls.imports.entry(symbol).or_insert_with(|| source.clone());
            }
        }
    }

    fn finish_constraint(&mut self, node: &ParseNode) {
        let items = self.pop_to_marker();
        let kind = match node.text() {
            "SIZE" => ConstraintKind::Size,
            "FROM" => ConstraintKind::From,
            "" | "VALUE" => ConstraintKind::Value,
            other => {
                let err = MibError::InvalidConstraint(format!("unknown kind {other:?}"));
                self.problem(Severity::Warn, &err);
                return;
            }
        };
        let ranges: Vec<ConstraintRange> = items
            .into_iter()
            .filter_map(|v| match v {
                StackValue::Range(r) => Some(r),
                _ => None,
            })
            .collect();
        match Constraint::new(kind, ranges) {
            Ok(c) => self.stack.push(StackValue::Constraint(c)),
            Err(err) => self.problem(Severity::Warn, &err),
        }
    }

    fn finish_range(&mut self) {
        let bounds: Vec<Option<i64>> = self
            .pop_to_marker()
            .into_iter()
            .filter_map(|v| match v {
                StackValue::Bound(b) => Some(b),
                StackValue::Number(n) => Some(Some(n)),
                _ => None,
            })
            .collect();
        let range = match bounds.as_slice() {
            [Some(v)] => ConstraintRange::single(*v),
            [None] => ConstraintRange { min: None, max: None },
            [lo, hi] => ConstraintRange { min: *lo, max: *hi },
            _ => return,
        };
        self.stack.push(StackValue::Range(range));
    }

    /// Collect named numbers and an optional constraint from a type body.
    fn collect_type_body(items: Vec<StackValue>) -> (Vec<(i64, String)>, Option<Constraint>) {
        let mut named = Vec::new();
        let mut constraint = None;
        for item in items {
            match item {
                StackValue::NamedNumber(name, n) => named.push((n, name)),
                StackValue::Constraint(c) => constraint = Some(c),
                _ => {}
            }
        }
        (named, constraint)
    }

    fn finish_builtin_type(&mut self, node: &ParseNode) {
        let (named, constraint) = Self::collect_type_body(self.pop_to_marker());
        let kind = match ScalarKind::from_keyword(node.text()) {
            Some(kind) => DeclaredKind::Scalar(kind),
            // ENUMERATED, SET, class fields: deliberately the null codec.
            None => DeclaredKind::Unsupported,
        };
        let mut ty = DeclaredType::new(kind).with_named_values(named);
        ty.constraint = constraint;
        self.stack.push(StackValue::Type(ty));
    }

    fn finish_type_reference(&mut self, node: &ParseNode) {
        let (named, constraint) = Self::collect_type_body(self.pop_to_marker());
        let mut ty = DeclaredType::reference(Symbol::unqualified(node.text()))
            .with_named_values(named);
        ty.constraint = constraint;
        self.stack.push(StackValue::Type(ty));
    }

    fn finish_members(&mut self, choice: bool) {
        let members: Vec<(String, DeclaredType)> = self
            .pop_to_marker()
            .into_iter()
            .filter_map(|v| match v {
                StackValue::Member(name, ty) => Some((name, ty)),
                _ => None,
            })
            .collect();
        let kind = if choice {
            DeclaredKind::Choice(members)
        } else {
            DeclaredKind::Sequence(members)
        };
        self.stack.push(StackValue::Type(DeclaredType::new(kind)));
    }

    fn finish_oid_arc(&mut self, node: &ParseNode) {
        let items = self.pop_to_marker();
        let text = node.text();
        let arc = if let Some(StackValue::Number(n)) = items.first() {
            OidArcExpr::NamedNumber(text.to_owned(), *n as u32)
        } else if let Ok(n) = text.parse::<u32>() {
            OidArcExpr::Number(n)
        } else {
            OidArcExpr::Name(text.to_owned())
        };
        self.stack.push(StackValue::Arc(arc));
    }

    fn finish_clause(&mut self) {
        let mut items = self.pop_to_marker();
        if items.is_empty() {
            return;
        }
        let clause_name = match items.remove(0) {
            StackValue::Name(n) => n,
            _ => return,
        };

        let value = match clause_name.as_str() {
            "SYNTAX" => items.into_iter().find_map(|v| match v {
                StackValue::Type(t) => Some(ClauseValue::Type(t)),
                _ => None,
            }),
            "DISPLAY-HINT" => items.into_iter().find_map(|v| match v {
                StackValue::Text(t) => Some(ClauseValue::Text(t)),
                _ => None,
            }),
            "INDEX" | "VARIABLES" | "OBJECTS" => {
                let names: Vec<String> = items
                    .into_iter()
                    .filter_map(|v| match v {
                        StackValue::Name(n) => Some(n),
                        _ => None,
                    })
                    .collect();
                Some(ClauseValue::Names(names))
            }
            "AUGMENTS" | "ENTERPRISE" => items.into_iter().find_map(|v| match v {
                StackValue::Name(n) => Some(ClauseValue::Name(n)),
                _ => None,
            }),
            "STATUS" | "ACCESS" | "MAX-ACCESS" | "UNITS" => {
                items.into_iter().find_map(|v| match v {
                    StackValue::Name(n) | StackValue::Text(n) => Some(ClauseValue::Text(n)),
                    _ => None,
                })
            }
            // Free text and defaults carry no codec behavior.
            _ => None,
        };

        if let (Some(value), Some(StackValue::Bag(bag))) = (value, self.stack.last_mut()) {
            bag.clauses.insert(clause_name, value);
        }
    }

    fn finish_type_assignment(&mut self) {
        let items = self.pop_to_marker();
        let mut name = None;
        let mut ty = None;
        for item in items {
            match item {
                StackValue::Name(n) => name = Some(n),
                StackValue::Type(t) => ty = Some(t),
                _ => {}
            }
        }
        if let (Some(name), Some(ty)) = (name, ty) {
            self.add_type(name, ty);
        }
    }

    fn finish_value_assignment(&mut self) {
        let items = self.pop_to_marker();
        let mut name = None;
        let mut oid = None;
        for item in items {
            match item {
                StackValue::Name(n) => name = Some(n),
                StackValue::Oid(o) => oid = Some(o),
                _ => {}
            }
        }
        if let (Some(name), Some(oid)) = (name, oid) {
            self.add_value(name, oid);
        }
    }

    fn finish_macro_assignment(&mut self) {
        let items = self.pop_to_marker();
        let mut name = None;
        let mut bag = None;
        let mut oid = None;
        let mut number = None;
        for item in items {
            match item {
                StackValue::Name(n) => name = Some(n),
                StackValue::Bag(b) => bag = Some(b),
                StackValue::Oid(o) => oid = Some(o),
                StackValue::Number(n) => number = Some(n),
                _ => {}
            }
        }
        let (Some(name), Some(mut bag)) = (name, bag) else {
            return;
        };

        match bag.keyword.as_str() {
            "OBJECT-TYPE" => {
                let Some(ClauseValue::Type(syntax)) = bag.clauses.remove("SYNTAX") else {
                    self.bad_assignment(&name, "OBJECT-TYPE without SYNTAX");
                    return;
                };
                let Some(oid) = oid else {
                    self.bad_assignment(&name, "OBJECT-TYPE without OID value");
                    return;
                };
                let index = match bag.clauses.remove("INDEX") {
                    Some(ClauseValue::Names(names)) => Some(names),
                    _ => None,
                };
                let augments = match bag.clauses.remove("AUGMENTS") {
                    Some(ClauseValue::Name(n)) => Some(n),
                    _ => None,
                };
                if self.claim(&name) {
                    self.decls.objects.push(ObjectDecl {
                        name,
                        syntax,
                        index,
                        augments,
                        oid,
                    });
                }
            }
            "TEXTUAL-CONVENTION" => {
                let Some(ClauseValue::Type(base)) = bag.clauses.remove("SYNTAX") else {
                    self.bad_assignment(&name, "TEXTUAL-CONVENTION without SYNTAX");
                    return;
                };
                let hint = match bag.clauses.remove("DISPLAY-HINT") {
                    Some(ClauseValue::Text(h)) => Some(h),
                    _ => None,
                };
                let ty = DeclaredType::new(DeclaredKind::TextualConvention {
                    base: Box::new(base),
                    hint,
                });
                self.add_type(name, ty);
            }
            "TRAP-TYPE" => {
                let Some(ClauseValue::Name(enterprise)) = bag.clauses.remove("ENTERPRISE") else {
                    self.bad_assignment(&name, "TRAP-TYPE without ENTERPRISE");
                    return;
                };
                let Some(number) = number else {
                    self.bad_assignment(&name, "TRAP-TYPE without a trap number");
                    return;
                };
                let variables = match bag.clauses.remove("VARIABLES") {
                    Some(ClauseValue::Names(names)) => names,
                    _ => Vec::new(),
                };
                if self.claim(&name) {
                    self.decls.traps.push(TrapDecl {
                        name,
                        enterprise,
                        variables,
                        number,
                    });
                }
            }
            // MODULE-IDENTITY, OBJECT-IDENTITY, NOTIFICATION-TYPE and
            // anything unrecognized: opaque macro values. Their OID still
            // names a node.
            _ => {
                if let Some(oid) = oid {
                    self.add_value(name, oid);
                }
            }
        }
    }
}

impl<R: LoadReporter> Visitor for ModuleWalker<'_, R> {
    fn enter(&mut self, node: &ParseNode) {
        match node.rule {
            Rule::ImportGroup
            | Rule::TypeAssignment
            | Rule::ValueAssignment
            | Rule::MacroAssignment
            | Rule::Clause
            | Rule::BuiltinType
            | Rule::TypeReference
            | Rule::SequenceType
            | Rule::SequenceOfType
            | Rule::ChoiceType
            | Rule::BitsType
            | Rule::NamedType
            | Rule::NamedNumber
            | Rule::Constraint
            | Rule::Range
            | Rule::OidValue
            | Rule::OidArc => self.stack.push(StackValue::Marker),
            _ => {}
        }
    }

    fn leave(&mut self, node: &ParseNode) {
        match node.rule {
            Rule::ModuleName => {
                if self.decls.name.is_empty() {
                    self.decls.name = node.text().to_owned();
                }
            }
            Rule::ImportSymbol | Rule::TypeName | Rule::ValueName | Rule::ClauseName => {
                self.stack.push(StackValue::Name(node.text().to_owned()));
            }
            Rule::ImportFrom | Rule::QuotedString => {
                self.stack.push(StackValue::Text(node.text().to_owned()));
            }
            Rule::MacroKeyword => {
                self.stack.push(StackValue::Bag(AttributeBag {
                    keyword: node.text().to_owned(),
                    clauses: BTreeMap::new(),
                }));
            }
            Rule::Number => {
                self.stack
                    .push(StackValue::Number(node.text().parse().unwrap_or_default()));
            }
            Rule::Bound => {
                let bound = match node.text() {
                    "MIN" | "MAX" => None,
                    other => other.parse().ok(),
                };
                self.stack.push(StackValue::Bound(bound));
            }
            Rule::ImportGroup => self.finish_import_group(),
            Rule::Range => self.finish_range(),
            Rule::Constraint => self.finish_constraint(node),
            Rule::NamedNumber => {
                let items = self.pop_to_marker();
                let number = items
                    .into_iter()
                    .find_map(|v| match v {
                        StackValue::Number(n) => Some(n),
                        _ => None,
                    })
                    .unwrap_or_default();
                self.stack
                    .push(StackValue::NamedNumber(node.text().to_owned(), number));
            }
            Rule::BuiltinType => self.finish_builtin_type(node),
            Rule::TypeReference => self.finish_type_reference(node),
            Rule::SequenceOfType => {
                let inner = self.pop_to_marker().into_iter().find_map(|v| match v {
                    StackValue::Type(t) => Some(t),
                    _ => None,
                });
                if let Some(inner) = inner {
                    self.stack.push(StackValue::Type(DeclaredType::new(
                        DeclaredKind::SequenceOf(Box::new(inner)),
                    )));
                }
            }
            Rule::NamedType => {
                let items = self.pop_to_marker();
                let mut name = None;
                let mut ty = None;
                for item in items {
                    match item {
                        StackValue::Name(n) => name = Some(n),
                        StackValue::Type(t) => ty = Some(t),
                        _ => {}
                    }
                }
                if let (Some(name), Some(ty)) = (name, ty) {
                    self.stack.push(StackValue::Member(name, ty));
                }
            }
            Rule::SequenceType => self.finish_members(false),
            Rule::ChoiceType => self.finish_members(true),
            Rule::BitsType => {
                let bits: Vec<(String, u32)> = self
                    .pop_to_marker()
                    .into_iter()
                    .filter_map(|v| match v {
                        StackValue::NamedNumber(name, n) => {
                            u32::try_from(n).ok().map(|pos| (name, pos))
                        }
                        _ => None,
                    })
                    .collect();
                self.stack
                    .push(StackValue::Type(DeclaredType::new(DeclaredKind::Bits(bits))));
            }
            Rule::OidArc => self.finish_oid_arc(node),
            Rule::OidValue => {
                let arcs: OidExpr = self
                    .pop_to_marker()
                    .into_iter()
                    .filter_map(|v| match v {
                        StackValue::Arc(a) => Some(a),
                        _ => None,
                    })
                    .collect();
                self.stack.push(StackValue::Oid(arcs));
            }
            Rule::Clause => self.finish_clause(),
            Rule::TypeAssignment => self.finish_type_assignment(),
            Rule::ValueAssignment => self.finish_value_assignment(),
            Rule::MacroAssignment => self.finish_macro_assignment(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{rule, token, token_with};
    use crate::report::NullReporter;

    fn module(name: &str, body: Vec<ParseNode>) -> ParseNode {
        let mut children = vec![token(Rule::ModuleName, name)];
        children.extend(body);
        rule(Rule::Module, children)
    }

    fn oid_value(arcs: &[&str]) -> ParseNode {
        rule(
            Rule::OidValue,
            arcs.iter().map(|a| token(Rule::OidArc, *a)).collect(),
        )
    }

    #[test]
    fn test_missing_module_name() {
        let tree = rule(Rule::Module, vec![]);
        let mut reporter = NullReporter;
        assert!(matches!(
            walk_module(&tree, &mut reporter),
            Err(MibError::MissingModuleName)
        ));
    }

    #[test]
    fn test_imports_collected() {
        let tree = module(
            "TEST-MIB",
            vec![rule(
                Rule::ImportGroup,
                vec![
                    token(Rule::ImportSymbol, "DisplayString"),
                    token(Rule::ImportSymbol, "TruthValue"),
                    token(Rule::ImportFrom, "SNMPv2-TC"),
                ],
            )],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert_eq!(decls.imports.get("DisplayString").unwrap(), "SNMPv2-TC");
        assert_eq!(decls.imports.get("TruthValue").unwrap(), "SNMPv2-TC");
    }

    #[test]
    fn test_qualify_falls_back_to_module() {
        let tree = module("TEST-MIB", vec![]);
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert_eq!(
            decls.qualify("localThing"),
            Symbol::qualified("TEST-MIB", "localThing")
        );
    }

    #[test]
    fn test_value_assignment() {
        let tree = module(
            "TEST-MIB",
            vec![rule(
                Rule::ValueAssignment,
                vec![
                    token(Rule::ValueName, "myRoot"),
                    oid_value(&["enterprises", "4242"]),
                ],
            )],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert_eq!(decls.values.len(), 1);
        assert_eq!(decls.values[0].name, "myRoot");
        assert_eq!(
            decls.values[0].oid,
            vec![
                OidArcExpr::Name("enterprises".into()),
                OidArcExpr::Number(4242)
            ]
        );
    }

    #[test]
    fn test_named_oid_arc() {
        let tree = module(
            "TEST-MIB",
            vec![rule(
                Rule::ValueAssignment,
                vec![
                    token(Rule::ValueName, "dod"),
                    rule(
                        Rule::OidValue,
                        vec![
                            token(Rule::OidArc, "org"),
                            token_with(Rule::OidArc, "dod", vec![token(Rule::Number, "6")]),
                        ],
                    ),
                ],
            )],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert_eq!(
            decls.values[0].oid[1],
            OidArcExpr::NamedNumber("dod".into(), 6)
        );
    }

    #[test]
    fn test_type_assignment_with_constraint() {
        let tree = module(
            "TEST-MIB",
            vec![rule(
                Rule::TypeAssignment,
                vec![
                    token(Rule::TypeName, "AdminString"),
                    token_with(
                        Rule::BuiltinType,
                        "OCTET STRING",
                        vec![token_with(
                            Rule::Constraint,
                            "SIZE",
                            vec![rule(
                                Rule::Range,
                                vec![token(Rule::Bound, "0"), token(Rule::Bound, "32")],
                            )],
                        )],
                    ),
                ],
            )],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert_eq!(decls.types.len(), 1);
        let ty = &decls.types[0].ty;
        assert!(matches!(ty.kind, DeclaredKind::Scalar(ScalarKind::OctetString)));
        assert!(ty.constraint.as_ref().unwrap().is_variable_size());
    }

    #[test]
    fn test_enumerated_integer() {
        let tree = module(
            "TEST-MIB",
            vec![rule(
                Rule::TypeAssignment,
                vec![
                    token(Rule::TypeName, "Status"),
                    token_with(
                        Rule::BuiltinType,
                        "INTEGER",
                        vec![
                            token_with(Rule::NamedNumber, "up", vec![token(Rule::Number, "1")]),
                            token_with(Rule::NamedNumber, "down", vec![token(Rule::Number, "2")]),
                        ],
                    ),
                ],
            )],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert_eq!(
            decls.types[0].ty.named_values,
            vec![(1, "up".into()), (2, "down".into())]
        );
    }

    #[test]
    fn test_object_type_with_index() {
        let tree = module(
            "TEST-MIB",
            vec![rule(
                Rule::MacroAssignment,
                vec![
                    token(Rule::ValueName, "fooEntry"),
                    token(Rule::MacroKeyword, "OBJECT-TYPE"),
                    rule(
                        Rule::Clause,
                        vec![
                            token(Rule::ClauseName, "SYNTAX"),
                            token(Rule::TypeReference, "FooEntry"),
                        ],
                    ),
                    rule(
                        Rule::Clause,
                        vec![
                            token(Rule::ClauseName, "INDEX"),
                            token(Rule::ValueName, "fooIndex"),
                            token(Rule::ValueName, "fooName"),
                        ],
                    ),
                    oid_value(&["fooTable", "1"]),
                ],
            )],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert_eq!(decls.objects.len(), 1);
        let obj = &decls.objects[0];
        assert_eq!(obj.index.as_deref().unwrap(), ["fooIndex", "fooName"]);
        assert!(obj.augments.is_none());
    }

    #[test]
    fn test_object_type_without_syntax_is_dropped() {
        let tree = module(
            "TEST-MIB",
            vec![rule(
                Rule::MacroAssignment,
                vec![
                    token(Rule::ValueName, "broken"),
                    token(Rule::MacroKeyword, "OBJECT-TYPE"),
                    oid_value(&["enterprises", "1"]),
                ],
            )],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert!(decls.objects.is_empty());
    }

    #[test]
    fn test_trap_type() {
        let tree = module(
            "TEST-MIB",
            vec![rule(
                Rule::MacroAssignment,
                vec![
                    token(Rule::ValueName, "linkFlap"),
                    token(Rule::MacroKeyword, "TRAP-TYPE"),
                    rule(
                        Rule::Clause,
                        vec![
                            token(Rule::ClauseName, "ENTERPRISE"),
                            token(Rule::ValueName, "myRoot"),
                        ],
                    ),
                    rule(
                        Rule::Clause,
                        vec![
                            token(Rule::ClauseName, "VARIABLES"),
                            token(Rule::ValueName, "ifIndex"),
                        ],
                    ),
                    token(Rule::Number, "7"),
                ],
            )],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert_eq!(decls.traps.len(), 1);
        let trap = &decls.traps[0];
        assert_eq!(trap.enterprise, "myRoot");
        assert_eq!(trap.number, 7);
        assert_eq!(trap.variables, ["ifIndex"]);
    }

    #[test]
    fn test_textual_convention() {
        let tree = module(
            "TEST-MIB",
            vec![rule(
                Rule::MacroAssignment,
                vec![
                    token(Rule::TypeName, "MacAddress"),
                    token(Rule::MacroKeyword, "TEXTUAL-CONVENTION"),
                    rule(
                        Rule::Clause,
                        vec![
                            token(Rule::ClauseName, "DISPLAY-HINT"),
                            token(Rule::QuotedString, "1x:"),
                        ],
                    ),
                    rule(
                        Rule::Clause,
                        vec![
                            token(Rule::ClauseName, "SYNTAX"),
                            token_with(
                                Rule::BuiltinType,
                                "OCTET STRING",
                                vec![token_with(
                                    Rule::Constraint,
                                    "SIZE",
                                    vec![rule(Rule::Range, vec![token(Rule::Bound, "6")])],
                                )],
                            ),
                        ],
                    ),
                ],
            )],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert_eq!(decls.types.len(), 1);
        match &decls.types[0].ty.kind {
            DeclaredKind::TextualConvention { hint, .. } => {
                assert_eq!(hint.as_deref(), Some("1x:"));
            }
            other => panic!("expected textual convention, got {other:?}"),
        }
    }

    #[test]
    fn test_description_not_retained() {
        let tree = module(
            "TEST-MIB",
            vec![rule(
                Rule::MacroAssignment,
                vec![
                    token(Rule::ValueName, "thing"),
                    token(Rule::MacroKeyword, "MODULE-IDENTITY"),
                    rule(
                        Rule::Clause,
                        vec![
                            token(Rule::ClauseName, "DESCRIPTION"),
                            token(Rule::QuotedString, "a very long description body"),
                        ],
                    ),
                    oid_value(&["enterprises", "1"]),
                ],
            )],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        // The macro value still lands as a named node...
        assert_eq!(decls.values.len(), 1);
        // ...with nothing else retained (structure only).
        assert_eq!(decls.definition_count(), 1);
    }

    #[test]
    fn test_duplicate_symbol_first_wins() {
        let tree = module(
            "TEST-MIB",
            vec![
                rule(
                    Rule::ValueAssignment,
                    vec![token(Rule::ValueName, "thing"), oid_value(&["1", "2"])],
                ),
                rule(
                    Rule::ValueAssignment,
                    vec![token(Rule::ValueName, "thing"), oid_value(&["1", "3"])],
                ),
            ],
        );
        let mut reporter = NullReporter;
        let decls = walk_module(&tree, &mut reporter).unwrap();
        assert_eq!(decls.values.len(), 1);
        assert_eq!(decls.values[0].oid[1], OidArcExpr::Number(2));
    }
}
