//! The batch loader and resolution pass.
//!
//! A [`Loader`] collects walked modules (seeded with the base declarations)
//! and, on [`build`](Loader::build), runs the resolution pass that turns
//! declarations into the immutable [`MibStore`]:
//!
//! 1. **Types** — declared types become codec registry entries; references
//!    stay symbolic and forward at call time.
//! 2. **OIDs** — value paths resolve against module scopes in multiple
//!    passes so forward references and import chains converge; every
//!    resolved path lands in the trie.
//! 3. **Objects** — `OBJECT-TYPE` nodes get their codec, effective
//!    constraint and (for rows) resolved index columns; `AUGMENTS` rows
//!    borrow the augmented row's index.
//! 4. **Traps** — `TRAP-TYPE` declarations key into the per-enterprise
//!    trap tables.
//!
//! Modules load sequentially; duplicate module names are skipped, broken
//! declarations are reported and dropped, and whatever resolved still makes
//! it into the store.

pub mod builtins;

use crate::ast::{ParseNode, Rule};
use crate::builder::{walk_module, ModuleDecls, OidArcExpr, OidExpr};
use crate::codec::{hint::DisplayHint, NamedValues, ResolvedSyntax, Syntax, SyntaxRegistry};
use crate::decl::{Constraint, DeclaredKind, DeclaredType, ScalarKind};
use crate::error::MibError;
use crate::model::{
    Index, MibStore, NodeId, ObjectInfo, OidTree, OrphanPolicy, StringInterner, Symbol, Trap,
};
use crate::report::{LoadEvent, LoadReporter, NullReporter, Phase, Severity};
use std::collections::{BTreeMap, BTreeSet};

/// Batch loader. One per load; consumed by [`build`](Self::build).
pub struct Loader<R: LoadReporter = NullReporter> {
    modules: Vec<ModuleDecls>,
    seen: BTreeSet<String>,
    orphan_policy: OrphanPolicy,
    reporter: R,
}

impl Default for Loader<NullReporter> {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader<NullReporter> {
    /// A loader with no reporting.
    #[must_use]
    pub fn new() -> Self {
        Self::with_reporter(NullReporter)
    }
}

impl<R: LoadReporter> Loader<R> {
    /// A loader reporting into `reporter`, pre-seeded with the base
    /// declarations.
    pub fn with_reporter(reporter: R) -> Self {
        let mut loader = Self {
            modules: Vec::new(),
            seen: BTreeSet::new(),
            orphan_policy: OrphanPolicy::Synthesize,
            reporter,
        };
        for module in builtins::base_declarations() {
            loader.seen.insert(module.name.clone());
            loader.modules.push(module);
        }
        loader
    }

    /// Override the orphan-insertion policy (default: synthesize
    /// placeholders).
    #[must_use]
    pub fn orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    /// Walk one module tree into the batch.
    ///
    /// A duplicate module name skips the module and succeeds — duplicates
    /// are not batch failures. A missing module name fails this module
    /// only; the loader stays usable.
    pub fn add_tree(&mut self, tree: &ParseNode) -> Result<(), MibError> {
        let peeked = tree
            .child(Rule::ModuleName)
            .map(ParseNode::text)
            .unwrap_or_default();
        if !peeked.is_empty() && self.seen.contains(peeked) {
            let err = MibError::DuplicatedModule(peeked.to_owned());
            self.reporter.report(
                Severity::Warn,
                LoadEvent::Problem {
                    module: Some(peeked),
                    error: &err,
                },
            );
            return Ok(());
        }

        self.reporter
            .report(Severity::Info, LoadEvent::ModuleStart { name: peeked });
        let decls = walk_module(tree, &mut self.reporter)?;
        self.add_decls(decls)
    }

    /// Add pre-walked declarations (front ends that bypass the tree).
    pub fn add_decls(&mut self, decls: ModuleDecls) -> Result<(), MibError> {
        if !self.seen.insert(decls.name.clone()) {
            let err = MibError::DuplicatedModule(decls.name.clone());
            self.reporter.report(
                Severity::Warn,
                LoadEvent::Problem {
                    module: Some(&decls.name),
                    error: &err,
                },
            );
            return Ok(());
        }
        self.reporter.report(
            Severity::Info,
            LoadEvent::ModuleLoaded {
                name: &decls.name,
                definitions: decls.definition_count(),
            },
        );
        self.modules.push(decls);
        Ok(())
    }

    /// Module names in the batch so far, base modules included.
    #[must_use]
    pub fn module_names(&self) -> &BTreeSet<String> {
        &self.seen
    }

    /// Run the resolution pass and produce the store.
    #[must_use]
    pub fn build(self) -> MibStore {
        let Loader {
            modules,
            seen,
            orphan_policy,
            mut reporter,
        } = self;

        let mut strings = StringInterner::new();
        let mut trie = OidTree::new();
        let mut registry = SyntaxRegistry::new();
        let mut unresolved: Vec<Symbol> = Vec::new();

        let module_index: BTreeMap<&str, usize> = modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.as_str(), i))
            .collect();

        // Phase: types.
        reporter.report(Severity::Info, LoadEvent::PhaseStart { phase: Phase::Types });
        for module in &modules {
            for t in &module.types {
                let (syntax, constraint) =
                    resolve_declared(&t.ty, module, &mut registry, &mut reporter);
                let id = registry.add(ResolvedSyntax::constrained(syntax, constraint));
                registry.bind(Symbol::qualified(module.name.clone(), t.name.clone()), id);
            }
        }
        reporter.report(Severity::Info, LoadEvent::PhaseEnd { phase: Phase::Types });

        // Phase: OIDs. Multiple passes until no more paths resolve, so
        // forward references and import chains converge regardless of
        // declaration order.
        reporter.report(Severity::Info, LoadEvent::PhaseStart { phase: Phase::Oids });
        let mut symbols: BTreeMap<Symbol, NodeId> = BTreeMap::new();
        let mut pending: Vec<PendingNode> = Vec::new();
        for (mi, module) in modules.iter().enumerate() {
            for v in &module.values {
                pending.push(PendingNode {
                    module: mi,
                    name: v.name.clone(),
                    oid: v.oid.clone(),
                    table_entry: false,
                });
            }
            for o in &module.objects {
                pending.push(PendingNode {
                    module: mi,
                    name: o.name.clone(),
                    oid: o.oid.clone(),
                    table_entry: o.index.is_some() || o.augments.is_some(),
                });
            }
        }

        loop {
            if pending.is_empty() {
                break;
            }
            let before = pending.len();
            let mut still = Vec::new();

            for p in pending {
                let module = &modules[p.module];
                match try_resolve_path(&modules, &module_index, &symbols, &trie, module, &p.oid) {
                    PathOutcome::Resolved(path) => {
                        let name_id = strings.intern(&p.name);
                        match trie.insert(&path, Some(name_id), p.table_entry, orphan_policy) {
                            Ok(node) => {
                                symbols.insert(
                                    Symbol::qualified(module.name.clone(), p.name.clone()),
                                    node,
                                );
                            }
                            Err(err) => reporter.report(
                                Severity::Warn,
                                LoadEvent::Problem {
                                    module: Some(&module.name),
                                    error: &err,
                                },
                            ),
                        }
                    }
                    PathOutcome::Retry => still.push(p),
                    PathOutcome::Dead(symbol) => {
                        reporter.report(Severity::Warn, LoadEvent::Unresolved { symbol: &symbol });
                        unresolved.push(symbol);
                    }
                }
            }

            // Stagnation: everything left references symbols nobody
            // declares.
            if still.len() == before {
                for p in still {
                    let module = &modules[p.module];
                    let symbol = first_name(&p.oid)
                        .map(|n| module.qualify(n))
                        .unwrap_or_else(|| Symbol::qualified(module.name.clone(), p.name.clone()));
                    reporter.report(Severity::Warn, LoadEvent::Unresolved { symbol: &symbol });
                    unresolved.push(symbol);
                }
                break;
            }
            pending = still;
        }
        reporter.report(Severity::Info, LoadEvent::PhaseEnd { phase: Phase::Oids });

        // Phase: objects.
        reporter.report(
            Severity::Info,
            LoadEvent::PhaseStart { phase: Phase::Objects },
        );
        let mut node_syntax: BTreeMap<NodeId, crate::model::SyntaxId> = BTreeMap::new();
        let mut objects: BTreeMap<NodeId, ObjectInfo> = BTreeMap::new();
        for module in &modules {
            for obj in &module.objects {
                let key = Symbol::qualified(module.name.clone(), obj.name.clone());
                let Some(&node) = symbols.get(&key) else {
                    continue;
                };
                let (syntax, constraint) =
                    resolve_declared(&obj.syntax, module, &mut registry, &mut reporter);
                let id = registry.add(ResolvedSyntax::constrained(syntax, constraint));
                let effective = registry.effective_constraint(id).cloned();
                node_syntax.insert(node, id);
                objects.insert(
                    node,
                    ObjectInfo {
                        syntax: id,
                        constraint: effective,
                        indexed: obj.index.is_some() || obj.augments.is_some(),
                        index: None,
                        augments: None,
                    },
                );
            }
        }

        // Index columns, declared rows first.
        for module in &modules {
            for obj in &module.objects {
                let Some(index_names) = &obj.index else {
                    continue;
                };
                let key = Symbol::qualified(module.name.clone(), obj.name.clone());
                let Some(&node) = symbols.get(&key) else {
                    continue;
                };
                let mut columns = Vec::new();
                for col in index_names {
                    match lookup_node(&modules, &module_index, &symbols, &module.name, col) {
                        Some(id) => columns.push(id),
                        None => {
                            let symbol = module.qualify(col);
                            reporter
                                .report(Severity::Warn, LoadEvent::Unresolved { symbol: &symbol });
                            unresolved.push(symbol);
                        }
                    }
                }
                if let Some(info) = objects.get_mut(&node) {
                    info.index = Some(Index::new(columns));
                }
            }
        }

        // AUGMENTS rows borrow the augmented row's index.
        for module in &modules {
            for obj in &module.objects {
                let Some(target_name) = &obj.augments else {
                    continue;
                };
                if obj.index.is_some() {
                    continue;
                }
                let key = Symbol::qualified(module.name.clone(), obj.name.clone());
                let Some(&node) = symbols.get(&key) else {
                    continue;
                };
                let Some(target) =
                    lookup_node(&modules, &module_index, &symbols, &module.name, target_name)
                else {
                    let symbol = module.qualify(target_name);
                    reporter.report(Severity::Warn, LoadEvent::Unresolved { symbol: &symbol });
                    unresolved.push(symbol);
                    continue;
                };
                let borrowed = objects.get(&target).and_then(|info| info.index.clone());
                if let Some(info) = objects.get_mut(&node) {
                    info.augments = Some(target);
                    info.index = borrowed;
                }
            }
        }
        reporter.report(
            Severity::Info,
            LoadEvent::PhaseEnd { phase: Phase::Objects },
        );

        // Phase: traps.
        reporter.report(Severity::Info, LoadEvent::PhaseStart { phase: Phase::Traps });
        let mut traps: BTreeMap<NodeId, BTreeMap<i64, Trap>> = BTreeMap::new();
        for module in &modules {
            for trap in &module.traps {
                match lookup_node(&modules, &module_index, &symbols, &module.name, &trap.enterprise)
                {
                    Some(enterprise) => {
                        traps.entry(enterprise).or_default().insert(
                            trap.number,
                            Trap {
                                name: trap.name.clone(),
                                variables: trap.variables.clone(),
                            },
                        );
                    }
                    None => {
                        let symbol = module.qualify(&trap.enterprise);
                        reporter.report(Severity::Warn, LoadEvent::Unresolved { symbol: &symbol });
                        unresolved.push(symbol);
                    }
                }
            }
        }
        reporter.report(Severity::Info, LoadEvent::PhaseEnd { phase: Phase::Traps });

        let mut store = MibStore {
            trie,
            strings,
            registry,
            name_index: BTreeMap::new(),
            node_syntax,
            objects,
            traps,
            modules: seen,
            unresolved,
        };
        store.rebuild_name_index();
        store
    }
}

struct PendingNode {
    module: usize,
    name: String,
    oid: OidExpr,
    table_entry: bool,
}

enum PathOutcome {
    Resolved(Vec<u32>),
    Retry,
    Dead(Symbol),
}

fn first_name(oid: &OidExpr) -> Option<&str> {
    oid.iter().find_map(|arc| match arc {
        OidArcExpr::Name(n) => Some(n.as_str()),
        _ => None,
    })
}

/// Resolve one OID value against the module scope. Only the first
/// component may be a bare symbol; later bare names can never resolve and
/// are dead on arrival.
fn try_resolve_path(
    modules: &[ModuleDecls],
    module_index: &BTreeMap<&str, usize>,
    symbols: &BTreeMap<Symbol, NodeId>,
    trie: &OidTree,
    module: &ModuleDecls,
    oid: &OidExpr,
) -> PathOutcome {
    let mut path: Vec<u32> = Vec::new();
    for (i, arc) in oid.iter().enumerate() {
        match arc {
            OidArcExpr::Number(n) | OidArcExpr::NamedNumber(_, n) => path.push(*n),
            OidArcExpr::Name(name) => {
                if i != 0 {
                    return PathOutcome::Dead(module.qualify(name));
                }
                match lookup_node(modules, module_index, symbols, &module.name, name) {
                    Some(id) => path.extend(trie.node(id).path.arcs()),
                    None => return PathOutcome::Retry,
                }
            }
        }
    }
    if path.is_empty() {
        PathOutcome::Dead(Symbol::qualified(module.name.clone(), String::new()))
    } else {
        PathOutcome::Resolved(path)
    }
}

/// Scope lookup: the import table first, the module's own declarations as
/// the end of the chain. Import chains are followed across modules;
/// cycles terminate the walk.
fn lookup_node<'a>(
    modules: &'a [ModuleDecls],
    module_index: &BTreeMap<&str, usize>,
    symbols: &BTreeMap<Symbol, NodeId>,
    module: &'a str,
    name: &str,
) -> Option<NodeId> {
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut current: &str = module;
    loop {
        if !visited.insert(current) {
            return None;
        }
        let Some(&idx) = module_index.get(current) else {
            // Imported from a module outside the batch; the symbol may
            // still have been declared under that name elsewhere.
            return symbols.get(&Symbol::qualified(current, name)).copied();
        };
        if let Some(next) = modules[idx].imports.get(name) {
            current = next;
            continue;
        }
        return symbols.get(&Symbol::qualified(current, name)).copied();
    }
}

/// Map a declared type onto its concrete codec and effective constraint.
fn resolve_declared<R: LoadReporter>(
    ty: &DeclaredType,
    module: &ModuleDecls,
    registry: &mut SyntaxRegistry,
    reporter: &mut R,
) -> (Syntax, Option<Constraint>) {
    let mut constraint = ty.constraint.clone();
    let base = match &ty.kind {
        DeclaredKind::Scalar(kind) => scalar_syntax(*kind),
        DeclaredKind::Reference(symbol) => {
            let qualified = if symbol.is_qualified() {
                symbol.clone()
            } else {
                module.qualify(symbol.name())
            };
            Syntax::Reference(qualified)
        }
        DeclaredKind::Sequence(members) => {
            let columns = members
                .iter()
                .map(|(name, member)| {
                    let (syntax, member_constraint) =
                        resolve_declared(member, module, registry, reporter);
                    let id = registry.add(ResolvedSyntax::constrained(syntax, member_constraint));
                    (name.clone(), id)
                })
                .collect();
            Syntax::Row { columns }
        }
        DeclaredKind::SequenceOf(_) => Syntax::Table,
        DeclaredKind::Bits(names) => Syntax::Bits {
            names: names.clone(),
        },
        DeclaredKind::TextualConvention { base, hint } => {
            let (base_syntax, base_constraint) =
                resolve_declared(base, module, registry, reporter);
            if constraint.is_none() {
                constraint = base_constraint;
            }
            let compiled = hint.as_ref().and_then(|h| match DisplayHint::parse(h) {
                Ok(compiled) => Some(compiled),
                Err(err) => {
                    reporter.report(
                        Severity::Warn,
                        LoadEvent::Problem {
                            module: Some(&module.name),
                            error: &err,
                        },
                    );
                    None
                }
            });
            Syntax::TextualConvention {
                base: Box::new(base_syntax),
                hint: compiled,
            }
        }
        DeclaredKind::Choice(_) | DeclaredKind::Unsupported => Syntax::Unsupported,
    };

    let syntax = if ty.named_values.is_empty() {
        base
    } else {
        Syntax::Enumerated {
            base: Box::new(base),
            names: NamedValues::new(ty.named_values.clone()),
        }
    };
    (syntax, constraint)
}

fn scalar_syntax(kind: ScalarKind) -> Syntax {
    match kind {
        ScalarKind::Integer => Syntax::Integer,
        ScalarKind::OctetString => Syntax::OctetString,
        ScalarKind::ObjectIdentifier => Syntax::ObjectIdentifier,
        ScalarKind::Null => Syntax::Null,
        ScalarKind::IpAddress => Syntax::IpAddress,
        ScalarKind::Counter32 => Syntax::Counter32,
        ScalarKind::Gauge32 => Syntax::Gauge32,
        ScalarKind::Counter64 => Syntax::Counter64,
        ScalarKind::TimeTicks => Syntax::TimeTicks,
        ScalarKind::Opaque => Syntax::Opaque,
    }
}
