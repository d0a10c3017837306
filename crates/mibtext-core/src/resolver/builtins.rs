//! Seeded base declarations.
//!
//! The loader pre-seeds every batch with the definitions of the SMI base
//! modules, so user modules resolve their standard imports without base
//! module files being present: the well-known OID roots, the SNMPv2-SMI
//! base types, the common SNMPv2-TC textual conventions, and the SMIv1
//! spellings of RFC1155-SMI / RFC1213-MIB.

use crate::builder::{ModuleDecls, OidArcExpr, TypeDecl, ValueDecl};
use crate::decl::{Constraint, DeclaredKind, DeclaredType, ScalarKind};

/// Module names seeded into every batch.
pub const BASE_MODULES: [&str; 4] = ["SNMPv2-SMI", "SNMPv2-TC", "RFC1155-SMI", "RFC1213-MIB"];

/// Whether a module name is one of the seeded base modules.
#[must_use]
pub fn is_base_module(name: &str) -> bool {
    BASE_MODULES.contains(&name)
}

fn value(name: &str, arcs: &[OidArcExpr]) -> ValueDecl {
    ValueDecl {
        name: name.to_owned(),
        oid: arcs.to_vec(),
    }
}

fn num(n: u32) -> OidArcExpr {
    OidArcExpr::Number(n)
}

fn sym(name: &str) -> OidArcExpr {
    OidArcExpr::Name(name.to_owned())
}

fn ty(name: &str, ty: DeclaredType) -> TypeDecl {
    TypeDecl {
        name: name.to_owned(),
        ty,
    }
}

fn scalar(kind: ScalarKind) -> DeclaredType {
    DeclaredType::scalar(kind)
}

fn tc(base: DeclaredType, hint: &str) -> DeclaredType {
    DeclaredType::new(DeclaredKind::TextualConvention {
        base: Box::new(base),
        hint: Some(hint.to_owned()),
    })
}

fn named(kind: ScalarKind, pairs: &[(i64, &str)]) -> DeclaredType {
    DeclaredType::scalar(kind)
        .with_named_values(pairs.iter().map(|(v, l)| (*v, (*l).to_owned())).collect())
}

/// The full set of seeded modules.
#[must_use]
pub fn base_declarations() -> Vec<ModuleDecls> {
    vec![snmpv2_smi(), snmpv2_tc(), rfc1155_smi(), rfc1213_mib()]
}

/// The well-known OID roots shared by SNMPv2-SMI and RFC1155-SMI.
fn standard_roots() -> Vec<ValueDecl> {
    vec![
        value("ccitt", &[num(0)]),
        value("iso", &[num(1)]),
        value("joint-iso-ccitt", &[num(2)]),
        value("org", &[sym("iso"), num(3)]),
        value("dod", &[sym("org"), num(6)]),
        value("internet", &[sym("dod"), num(1)]),
        value("directory", &[sym("internet"), num(1)]),
        value("mgmt", &[sym("internet"), num(2)]),
        value("mib-2", &[sym("mgmt"), num(1)]),
        value("transmission", &[sym("mib-2"), num(10)]),
        value("experimental", &[sym("internet"), num(3)]),
        value("private", &[sym("internet"), num(4)]),
        value("enterprises", &[sym("private"), num(1)]),
        value("security", &[sym("internet"), num(5)]),
        value("snmpV2", &[sym("internet"), num(6)]),
        value("snmpDomains", &[sym("snmpV2"), num(1)]),
        value("snmpProxys", &[sym("snmpV2"), num(2)]),
        value("snmpModules", &[sym("snmpV2"), num(3)]),
        value("zeroDotZero", &[num(0), num(0)]),
    ]
}

fn snmpv2_smi() -> ModuleDecls {
    let mut m = ModuleDecls {
        name: "SNMPv2-SMI".to_owned(),
        ..Default::default()
    };
    m.values = standard_roots();
    m.types = vec![
        ty(
            "Integer32",
            scalar(ScalarKind::Integer)
                .with_constraint(Constraint::value_range(-2_147_483_648, 2_147_483_647)),
        ),
        ty("Counter32", scalar(ScalarKind::Counter32)),
        ty("Gauge32", scalar(ScalarKind::Gauge32)),
        ty(
            "Unsigned32",
            scalar(ScalarKind::Gauge32).with_constraint(Constraint::value_range(0, 4_294_967_295)),
        ),
        ty("TimeTicks", scalar(ScalarKind::TimeTicks)),
        ty("IpAddress", scalar(ScalarKind::IpAddress)),
        ty("Opaque", scalar(ScalarKind::Opaque)),
        ty("Counter64", scalar(ScalarKind::Counter64)),
    ];
    m
}

fn snmpv2_tc() -> ModuleDecls {
    let octets = || scalar(ScalarKind::OctetString);
    let mut m = ModuleDecls {
        name: "SNMPv2-TC".to_owned(),
        ..Default::default()
    };
    m.types = vec![
        ty(
            "DisplayString",
            tc(octets().with_constraint(Constraint::size_range(0, 255)), "255a"),
        ),
        ty("PhysAddress", tc(octets(), "1x:")),
        ty(
            "MacAddress",
            tc(octets().with_constraint(Constraint::fixed_size(6)), "1x:"),
        ),
        ty(
            "TruthValue",
            named(ScalarKind::Integer, &[(1, "true"), (2, "false")]),
        ),
        ty(
            "TestAndIncr",
            scalar(ScalarKind::Integer).with_constraint(Constraint::value_range(0, 2_147_483_647)),
        ),
        ty("AutonomousType", scalar(ScalarKind::ObjectIdentifier)),
        ty("InstancePointer", scalar(ScalarKind::ObjectIdentifier)),
        ty("VariablePointer", scalar(ScalarKind::ObjectIdentifier)),
        ty("RowPointer", scalar(ScalarKind::ObjectIdentifier)),
        ty(
            "RowStatus",
            named(
                ScalarKind::Integer,
                &[
                    (1, "active"),
                    (2, "notInService"),
                    (3, "notReady"),
                    (4, "createAndGo"),
                    (5, "createAndWait"),
                    (6, "destroy"),
                ],
            ),
        ),
        ty("TimeStamp", scalar(ScalarKind::TimeTicks)),
        ty(
            "TimeInterval",
            scalar(ScalarKind::Integer).with_constraint(Constraint::value_range(0, 2_147_483_647)),
        ),
        ty(
            "DateAndTime",
            tc(
                octets(),
                "2d-1d-1d,1d:1d:1d.1d,1a1d:1d",
            ),
        ),
        ty(
            "StorageType",
            named(
                ScalarKind::Integer,
                &[
                    (1, "other"),
                    (2, "volatile"),
                    (3, "nonVolatile"),
                    (4, "permanent"),
                    (5, "readOnly"),
                ],
            ),
        ),
        ty("TDomain", scalar(ScalarKind::ObjectIdentifier)),
        ty(
            "TAddress",
            octets().with_constraint(Constraint::size_range(1, 255)),
        ),
    ];
    m
}

/// SMIv1 spellings map onto the same roots and scalars.
fn rfc1155_smi() -> ModuleDecls {
    let mut m = ModuleDecls {
        name: "RFC1155-SMI".to_owned(),
        ..Default::default()
    };
    m.values = standard_roots();
    m.types = vec![
        ty("Counter", scalar(ScalarKind::Counter32)),
        ty("Gauge", scalar(ScalarKind::Gauge32)),
        ty("TimeTicks", scalar(ScalarKind::TimeTicks)),
        ty("Opaque", scalar(ScalarKind::Opaque)),
        ty("IpAddress", scalar(ScalarKind::IpAddress)),
        ty("NetworkAddress", scalar(ScalarKind::IpAddress)),
    ];
    m
}

fn rfc1213_mib() -> ModuleDecls {
    let mut m = ModuleDecls {
        name: "RFC1213-MIB".to_owned(),
        ..Default::default()
    };
    m.imports.insert("mgmt".to_owned(), "RFC1155-SMI".to_owned());
    m.values = vec![value("mib-2", &[sym("mgmt"), num(1)])];
    m.types = vec![
        ty(
            "DisplayString",
            tc(
                scalar(ScalarKind::OctetString)
                    .with_constraint(Constraint::size_range(0, 255)),
                "255a",
            ),
        ),
        ty("PhysAddress", tc(scalar(ScalarKind::OctetString), "1x:")),
    ];
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_module_names() {
        assert!(is_base_module("SNMPv2-SMI"));
        assert!(is_base_module("RFC1213-MIB"));
        assert!(!is_base_module("IF-MIB"));
    }

    #[test]
    fn test_roots_resolve_from_iso() {
        let smi = snmpv2_smi();
        let enterprises = smi
            .values
            .iter()
            .find(|v| v.name == "enterprises")
            .unwrap();
        assert_eq!(
            enterprises.oid,
            vec![OidArcExpr::Name("private".into()), OidArcExpr::Number(1)]
        );
    }

    #[test]
    fn test_tc_hints_compile() {
        for module in base_declarations() {
            for t in &module.types {
                if let DeclaredKind::TextualConvention { hint: Some(h), .. } = &t.ty.kind {
                    assert!(
                        crate::codec::hint::DisplayHint::parse(h).is_ok(),
                        "builtin hint {h:?} must compile"
                    );
                }
            }
        }
    }
}
