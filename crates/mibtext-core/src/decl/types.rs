//! The declared-type graph.
//!
//! Declared types are what the semantic builder collects while walking a
//! module: structure without resolution. References to other symbols stay
//! symbolic here and are turned into concrete codecs by the resolver's
//! second pass.

use super::constraint::Constraint;
use crate::model::{Symbol, SyntaxTag};

/// The native scalar kinds a declaration can bottom out in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Signed 32-bit integer (`INTEGER`, `Integer32`).
    Integer,
    /// `OCTET STRING`.
    OctetString,
    /// `OBJECT IDENTIFIER`.
    ObjectIdentifier,
    /// `NULL`.
    Null,
    /// `IpAddress` / `NetworkAddress`.
    IpAddress,
    /// `Counter` / `Counter32`.
    Counter32,
    /// `Gauge` / `Gauge32` / `Unsigned32`.
    Gauge32,
    /// `Counter64`.
    Counter64,
    /// `TimeTicks`.
    TimeTicks,
    /// `Opaque`.
    Opaque,
}

impl ScalarKind {
    /// Map a type keyword from module text onto a scalar kind.
    #[must_use]
    pub fn from_keyword(kw: &str) -> Option<Self> {
        match kw {
            "INTEGER" | "Integer32" => Some(Self::Integer),
            "OCTET STRING" | "OCTET" => Some(Self::OctetString),
            "OBJECT IDENTIFIER" => Some(Self::ObjectIdentifier),
            "NULL" => Some(Self::Null),
            "IpAddress" | "NetworkAddress" => Some(Self::IpAddress),
            "Counter" | "Counter32" => Some(Self::Counter32),
            "Gauge" | "Gauge32" | "Unsigned32" => Some(Self::Gauge32),
            "Counter64" => Some(Self::Counter64),
            "TimeTicks" => Some(Self::TimeTicks),
            "Opaque" => Some(Self::Opaque),
            _ => None,
        }
    }

    /// The protocol tag values of this kind carry.
    #[must_use]
    pub fn tag(&self) -> SyntaxTag {
        match self {
            Self::Integer => SyntaxTag::Integer,
            Self::OctetString => SyntaxTag::OctetString,
            Self::ObjectIdentifier => SyntaxTag::ObjectIdentifier,
            Self::Null => SyntaxTag::Null,
            Self::IpAddress => SyntaxTag::IpAddress,
            Self::Counter32 => SyntaxTag::Counter32,
            Self::Gauge32 => SyntaxTag::Gauge32,
            Self::Counter64 => SyntaxTag::Counter64,
            Self::TimeTicks => SyntaxTag::TimeTicks,
            Self::Opaque => SyntaxTag::Opaque,
        }
    }
}

/// Structure of a declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum DeclaredKind {
    /// A native scalar.
    Scalar(ScalarKind),
    /// `SEQUENCE { … }` — a table row template; members in declaration
    /// order. Names columns, never formats values.
    Sequence(Vec<(String, DeclaredType)>),
    /// `SEQUENCE OF X` — marks a table whose rows have type `X`.
    SequenceOf(Box<DeclaredType>),
    /// General `CHOICE { … }`. Members are kept for completeness; the
    /// resolved codec is the null codec.
    Choice(Vec<(String, DeclaredType)>),
    /// `BITS { … }` — named bit positions.
    Bits(Vec<(String, u32)>),
    /// A reference to another declared type, possibly in another module.
    Reference(Symbol),
    /// `TEXTUAL-CONVENTION` wrapper.
    TextualConvention {
        /// The underlying syntax.
        base: Box<DeclaredType>,
        /// Raw `DISPLAY-HINT` string, compiled during resolution.
        hint: Option<String>,
    },
    /// Constructs the codec layer deliberately does not model
    /// (`ENUMERATED`, `SET`, class fields, …).
    Unsupported,
}

/// A declared type with its optional constraint and named numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclaredType {
    /// The structural kind.
    pub kind: DeclaredKind,
    /// Inline SIZE/VALUE/FROM constraint, if declared.
    pub constraint: Option<Constraint>,
    /// Named numbers for enumerated integers, in declaration order.
    pub named_values: Vec<(i64, String)>,
}

impl DeclaredType {
    /// A bare declared type of the given kind.
    #[must_use]
    pub fn new(kind: DeclaredKind) -> Self {
        Self {
            kind,
            constraint: None,
            named_values: Vec::new(),
        }
    }

    /// A native scalar.
    #[must_use]
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::new(DeclaredKind::Scalar(kind))
    }

    /// A symbolic reference.
    #[must_use]
    pub fn reference(symbol: Symbol) -> Self {
        Self::new(DeclaredKind::Reference(symbol))
    }

    /// Attach a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Attach named numbers.
    #[must_use]
    pub fn with_named_values(mut self, named: Vec<(i64, String)>) -> Self {
        self.named_values = named;
        self
    }

    /// Whether this is a `SEQUENCE OF` (table) declaration.
    #[must_use]
    pub fn is_sequence_of(&self) -> bool {
        matches!(self.kind, DeclaredKind::SequenceOf(_))
    }
}
