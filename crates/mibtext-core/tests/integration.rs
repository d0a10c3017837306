//! End-to-end pipeline tests: parse trees through the builder and loader
//! into a store, then query it the way an embedding adapter would.

use mibtext_core::ast::{rule, token, token_with, ParseNode, Rule};
use mibtext_core::model::{OrphanPolicy, Value};
use mibtext_core::report::MemoryReporter;
use mibtext_core::{Loader, MibError};
use pretty_assertions::assert_eq;

// === tree construction helpers ===

fn import_group(from: &str, symbols: &[&str]) -> ParseNode {
    let mut children: Vec<ParseNode> = symbols
        .iter()
        .map(|s| token(Rule::ImportSymbol, *s))
        .collect();
    children.push(token(Rule::ImportFrom, from));
    rule(Rule::ImportGroup, children)
}

fn module_tree(name: &str, body: Vec<ParseNode>) -> ParseNode {
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

fn value_assignment(name: &str, arcs: &[&str]) -> ParseNode {
    rule(
        Rule::ValueAssignment,
        vec![token(Rule::ValueName, name), oid_value(arcs)],
    )
}

fn size_constraint(lo: &str, hi: Option<&str>) -> ParseNode {
    let bounds = match hi {
        Some(hi) => vec![token(Rule::Bound, lo), token(Rule::Bound, hi)],
        None => vec![token(Rule::Bound, lo)],
    };
    token_with(Rule::Constraint, "SIZE", vec![rule(Rule::Range, bounds)])
}

fn value_constraint(lo: &str, hi: &str) -> ParseNode {
    token_with(
        Rule::Constraint,
        "VALUE",
        vec![rule(
            Rule::Range,
            vec![token(Rule::Bound, lo), token(Rule::Bound, hi)],
        )],
    )
}

fn named_numbers(pairs: &[(&str, &str)]) -> Vec<ParseNode> {
    pairs
        .iter()
        .map(|(name, num)| token_with(Rule::NamedNumber, *name, vec![token(Rule::Number, *num)]))
        .collect()
}

fn syntax_clause(ty: ParseNode) -> ParseNode {
    rule(Rule::Clause, vec![token(Rule::ClauseName, "SYNTAX"), ty])
}

fn index_clause(columns: &[&str]) -> ParseNode {
    let mut children = vec![token(Rule::ClauseName, "INDEX")];
    children.extend(columns.iter().map(|c| token(Rule::ValueName, *c)));
    rule(Rule::Clause, children)
}

fn object_type(name: &str, syntax: ParseNode, clauses: Vec<ParseNode>, arcs: &[&str]) -> ParseNode {
    let mut children = vec![
        token(Rule::ValueName, name),
        token(Rule::MacroKeyword, "OBJECT-TYPE"),
        syntax_clause(syntax),
    ];
    children.extend(clauses);
    children.push(oid_value(arcs));
    rule(Rule::MacroAssignment, children)
}

/// The access-control module of RFC 3415, trimmed to what the tests
/// exercise: two tables, one of which is indexed by a column of the other.
fn vacm_module() -> ParseNode {
    module_tree(
        "VACM-TEST-MIB",
        vec![
            import_group("SNMPv2-SMI", &["snmpModules"]),
            // Local stand-in for SNMP-FRAMEWORK-MIB's SnmpAdminString.
            rule(
                Rule::TypeAssignment,
                vec![
                    token(Rule::TypeName, "SnmpAdminString"),
                    token_with(
                        Rule::BuiltinType,
                        "OCTET STRING",
                        vec![size_constraint("0", Some("255"))],
                    ),
                ],
            ),
            value_assignment("vacmMIB", &["snmpModules", "16"]),
            value_assignment("vacmMIBObjects", &["vacmMIB", "1"]),
            // vacmSecurityToGroupTable: contributes vacmGroupName.
            object_type(
                "vacmSecurityToGroupTable",
                rule(
                    Rule::SequenceOfType,
                    vec![token(Rule::TypeReference, "VacmSecurityToGroupEntry")],
                ),
                vec![],
                &["vacmMIBObjects", "2"],
            ),
            object_type(
                "vacmSecurityToGroupEntry",
                token(Rule::TypeReference, "VacmSecurityToGroupEntry"),
                vec![index_clause(&["vacmSecurityModel", "vacmSecurityName"])],
                &["vacmSecurityToGroupTable", "1"],
            ),
            object_type(
                "vacmSecurityModel",
                token_with(
                    Rule::BuiltinType,
                    "INTEGER",
                    vec![value_constraint("0", "2147483647")],
                ),
                vec![],
                &["vacmSecurityToGroupEntry", "1"],
            ),
            object_type(
                "vacmSecurityName",
                token_with(
                    Rule::TypeReference,
                    "SnmpAdminString",
                    vec![size_constraint("1", Some("32"))],
                ),
                vec![],
                &["vacmSecurityToGroupEntry", "2"],
            ),
            object_type(
                "vacmGroupName",
                token_with(
                    Rule::TypeReference,
                    "SnmpAdminString",
                    vec![size_constraint("1", Some("32"))],
                ),
                vec![],
                &["vacmSecurityToGroupEntry", "3"],
            ),
            // vacmAccessTable: the row the §index tests decompose.
            object_type(
                "vacmAccessTable",
                rule(
                    Rule::SequenceOfType,
                    vec![token(Rule::TypeReference, "VacmAccessEntry")],
                ),
                vec![],
                &["vacmMIBObjects", "4"],
            ),
            object_type(
                "vacmAccessEntry",
                token(Rule::TypeReference, "VacmAccessEntry"),
                vec![index_clause(&[
                    "vacmGroupName",
                    "vacmAccessContextPrefix",
                    "vacmAccessSecurityModel",
                    "vacmAccessSecurityLevel",
                ])],
                &["vacmAccessTable", "1"],
            ),
            object_type(
                "vacmAccessContextPrefix",
                token_with(
                    Rule::TypeReference,
                    "SnmpAdminString",
                    vec![size_constraint("0", Some("32"))],
                ),
                vec![],
                &["vacmAccessEntry", "1"],
            ),
            object_type(
                "vacmAccessSecurityModel",
                token_with(
                    Rule::BuiltinType,
                    "INTEGER",
                    vec![value_constraint("0", "2147483647")],
                ),
                vec![],
                &["vacmAccessEntry", "2"],
            ),
            object_type(
                "vacmAccessSecurityLevel",
                token_with(
                    Rule::BuiltinType,
                    "INTEGER",
                    named_numbers(&[
                        ("noAuthNoPriv", "1"),
                        ("authNoPriv", "2"),
                        ("authPriv", "3"),
                    ]),
                ),
                vec![],
                &["vacmAccessEntry", "3"],
            ),
            object_type(
                "vacmAccessContextMatch",
                token_with(
                    Rule::BuiltinType,
                    "INTEGER",
                    named_numbers(&[("exact", "1"), ("prefix", "2")]),
                ),
                vec![],
                &["vacmAccessEntry", "4"],
            ),
        ],
    )
}

fn vacm_store() -> mibtext_core::MibStore {
    let mut loader = Loader::new();
    loader.add_tree(&vacm_module()).unwrap();
    loader.build()
}

const VACM_ENTRY: [u32; 10] = [1, 3, 6, 1, 6, 3, 16, 1, 4, 1];

fn instance_oid(tail: &[u32]) -> Vec<u32> {
    let mut oid = VACM_ENTRY.to_vec();
    oid.extend_from_slice(tail);
    oid
}

// === index decomposition ===

#[test]
fn test_vacm_index_decomposition() {
    let store = vacm_store();
    // Tail relative to the entry: column arc 4, then
    // vacmGroupName "v3group" (length-prefixed), empty context prefix,
    // security model 3, security level noAuthNoPriv.
    let oid = instance_oid(&[4, 7, 118, 51, 103, 114, 111, 117, 112, 0, 3, 1]);

    let columns = store.resolve_index(&oid).unwrap();
    let rendered: Vec<(&str, &str)> = columns
        .iter()
        .map(|c| (c.name.as_str(), c.text.as_str()))
        .collect();

    assert_eq!(
        rendered,
        vec![
            ("vacmGroupName", "v3group"),
            ("vacmAccessContextPrefix", ""),
            ("vacmAccessSecurityModel", "3"),
            ("vacmAccessSecurityLevel", "noAuthNoPriv"),
        ]
    );

    // Native values come along with the renderings.
    assert_eq!(columns[0].value, Value::OctetString(b"v3group".to_vec()));
    assert_eq!(columns[2].value, Value::Integer(3));
}

#[test]
fn test_index_trailing_elements_rejected() {
    let store = vacm_store();
    let oid = instance_oid(&[4, 7, 118, 51, 103, 114, 111, 117, 112, 0, 3, 1, 99]);

    match store.resolve_index(&oid) {
        Err(MibError::TrailingIndexElements { left, resolved }) => {
            assert_eq!(left, 1);
            assert_eq!(resolved, 4);
        }
        other => panic!("expected trailing-elements error, got {other:?}"),
    }
}

#[test]
fn test_index_partial_result_on_truncated_tail() {
    let store = vacm_store();
    // Length prefix 7 but only two string bytes present: the first column
    // cannot be sliced, so decomposition stops with what it has.
    let oid = instance_oid(&[4, 7, 118]);
    let columns = store.resolve_index(&oid).unwrap();
    assert!(columns.is_empty());

    // Enough for the group name only.
    let oid = instance_oid(&[4, 2, 118, 51]);
    let columns = store.resolve_index(&oid).unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].text, "v3");

    let entry_node = store.tree().find(&VACM_ENTRY).unwrap();
    let declared = store.index_of(entry_node).unwrap().len();
    assert!(columns.len() < declared, "strict callers can detect the gap");
}

// === OID text ===

#[test]
fn test_oid_text_round_trip() {
    let store = vacm_store();

    let parsed = store.parse_oid("vacmAccessEntry").unwrap();
    assert_eq!(parsed, VACM_ENTRY.to_vec());

    let text = store.format_oid(&instance_oid(&[4, 0])).unwrap();
    assert_eq!(text, "vacmAccessContextMatch.0");

    assert_eq!(
        store.parse_oid("vacmAccessContextMatch.0").unwrap(),
        instance_oid(&[4, 0])
    );

    // Unknown roots have no answer; the adapter falls back.
    assert!(store.format_oid(&[2, 99]).is_none());
    assert!(store.parse_oid("noSuchName.1").is_none());
}

// === value text ===

#[test]
fn test_value_text_uses_node_syntax() {
    let store = vacm_store();
    let level_oid = instance_oid(&[3, 0]);

    assert_eq!(
        store
            .format_value(&level_oid, &Value::Integer(1))
            .unwrap(),
        "noAuthNoPriv(1)"
    );
    assert_eq!(
        store.parse_value(&level_oid, "authPriv").unwrap(),
        Value::Integer(3)
    );
    assert_eq!(
        store.parse_value(&level_oid, "2").unwrap(),
        Value::Integer(2)
    );

    // Unknown OID: no answer.
    assert!(store.format_value(&[2, 1], &Value::Integer(1)).is_none());
}

#[test]
fn test_value_text_through_textual_convention() {
    // A module leaning on the seeded SNMPv2-TC DisplayString.
    let tree = module_tree(
        "DISP-MIB",
        vec![
            import_group("SNMPv2-SMI", &["enterprises"]),
            import_group("SNMPv2-TC", &["DisplayString"]),
            value_assignment("disp", &["enterprises", "4242"]),
            object_type(
                "dispName",
                token(Rule::TypeReference, "DisplayString"),
                vec![],
                &["disp", "1"],
            ),
        ],
    );
    let mut loader = Loader::new();
    loader.add_tree(&tree).unwrap();
    let store = loader.build();

    let oid = store.parse_oid("dispName.0").unwrap();
    assert_eq!(
        store
            .format_value(&oid, &Value::OctetString(b"edge-router-7".to_vec()))
            .unwrap(),
        "edge-router-7"
    );
}

// === duplicate modules ===

#[test]
fn test_duplicate_module_loads_once() {
    let mut loader = Loader::new();
    loader.add_tree(&vacm_module()).unwrap();
    let nodes_before = {
        // Duplicate is skipped without disturbing the batch.
        loader.add_tree(&vacm_module()).unwrap();
        loader
            .module_names()
            .iter()
            .filter(|m| m.as_str() == "VACM-TEST-MIB")
            .count()
    };
    assert_eq!(nodes_before, 1);

    let store = loader.build();
    assert!(store.modules().contains("VACM-TEST-MIB"));
    assert_eq!(store.nodes_by_name("vacmAccessEntry").len(), 1);
}

// === error scoping ===

#[test]
fn test_nameless_module_aborts_only_itself() {
    let mut loader = Loader::new();
    let bad = rule(Rule::Module, vec![]);
    assert!(matches!(
        loader.add_tree(&bad),
        Err(MibError::MissingModuleName)
    ));

    // The loader is still usable.
    loader.add_tree(&vacm_module()).unwrap();
    let store = loader.build();
    assert!(store.parse_oid("vacmMIB").is_some());
}

#[test]
fn test_reporting_surfaces_unresolved() {
    let tree = module_tree(
        "HALF-MIB",
        vec![value_assignment("dangling", &["notDeclaredAnywhere", "1"])],
    );
    let mut loader = Loader::with_reporter(MemoryReporter::default());
    loader.add_tree(&tree).unwrap();
    let store = loader.build();

    assert_eq!(store.unresolved().len(), 1);
    assert_eq!(store.unresolved()[0].name(), "notDeclaredAnywhere");
}

// === orphan policies ===

#[test]
fn test_orphan_policies_cover_both_behaviors() {
    // Synthesize (the default): an absolute path with unloaded
    // intermediate arcs still lands, placeholders filling the gaps.
    let tree = module_tree(
        "ABS-MIB",
        vec![value_assignment("deep", &["1", "3", "6", "1", "4", "1", "9", "9", "9"])],
    );
    let mut loader = Loader::new();
    loader.add_tree(&tree).unwrap();
    let store = loader.build();
    assert!(store.tree().find(&[1, 3, 6, 1, 4, 1, 9, 9, 9]).is_some());

    // Reject: the same path fails when its parent is absent.
    let tree = module_tree(
        "ABS2-MIB",
        vec![value_assignment("deep", &["1", "3", "9", "9", "1"])],
    );
    let mut loader = Loader::new().orphan_policy(OrphanPolicy::Reject);
    loader.add_tree(&tree).unwrap();
    let store = loader.build();
    assert!(store.tree().find(&[1, 3, 9, 9, 1]).is_none());
}

// === trie properties through the pipeline ===

#[test]
fn test_search_beyond_deepest_returns_ancestor() {
    let store = vacm_store();
    let deep = instance_oid(&[4, 1, 2, 3, 4, 5, 6, 7, 8]);
    let hit = store.tree().search(&deep).unwrap();
    assert_eq!(store.node_name(hit), Some("vacmAccessContextMatch"));
}
