//! Per-type value codecs.
//!
//! Every resolved declaration ends up as a [`Syntax`], which knows how to
//! render a [`Value`] as text, parse text back, and coerce a raw value into
//! its native tag. Codecs for references look their target up in the
//! [`SyntaxRegistry`] at call time, so forward references and circular
//! module imports cost nothing at resolution time.

pub mod hint;

use crate::decl::Constraint;
use crate::error::MibError;
use crate::model::{Oid, Symbol, SyntaxId, SyntaxTag, Value};
use hint::DisplayHint;
use std::collections::BTreeMap;

/// Reference chains longer than this are treated as unresolvable. Guards
/// against cyclic type references between modules.
const REFERENCE_DEPTH_LIMIT: usize = 16;

/// Named numbers of an enumerated integer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedValues {
    values: Vec<(i64, String)>,
}

impl NamedValues {
    /// Build from `(value, label)` pairs in declaration order.
    #[must_use]
    pub fn new(values: Vec<(i64, String)>) -> Self {
        Self { values }
    }

    /// The label for a numeric value. Numbers match literally.
    #[must_use]
    pub fn label(&self, value: i64) -> Option<&str> {
        self.values
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, l)| l.as_str())
    }

    /// The numeric value for a label. Names match case-sensitively.
    #[must_use]
    pub fn value(&self, label: &str) -> Option<i64> {
        self.values
            .iter()
            .find(|(_, l)| l == label)
            .map(|(v, _)| *v)
    }

    /// The raw pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(i64, String)] {
        &self.values
    }
}

/// Host name lookup capability for the IP address codec.
///
/// The core performs no network I/O; the default implementation knows
/// nothing. Embedders wire in a real resolver to get reverse-resolved
/// names on format and hostname acceptance on parse.
pub trait HostResolver {
    /// Name for an address, if known.
    fn reverse(&self, _addr: [u8; 4]) -> Option<String> {
        None
    }

    /// Address for a name, if resolvable.
    fn forward(&self, _host: &str) -> Option<[u8; 4]> {
        None
    }
}

/// The do-nothing resolver.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResolver;

impl HostResolver for NoResolver {}

static NO_RESOLVER: NoResolver = NoResolver;

/// Everything a codec call needs besides the value.
#[derive(Clone, Copy)]
pub struct CodecContext<'a> {
    /// Registry for resolving reference codecs.
    pub registry: &'a SyntaxRegistry,
    /// Host lookup capability.
    pub hosts: &'a dyn HostResolver,
}

impl<'a> CodecContext<'a> {
    /// A context with no host resolution.
    #[must_use]
    pub fn new(registry: &'a SyntaxRegistry) -> Self {
        Self {
            registry,
            hosts: &NO_RESOLVER,
        }
    }

    /// A context with an injected host resolver.
    #[must_use]
    pub fn with_hosts(registry: &'a SyntaxRegistry, hosts: &'a dyn HostResolver) -> Self {
        Self { registry, hosts }
    }
}

/// A concrete, resolved syntax.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Syntax {
    /// Signed 32-bit integer.
    Integer,
    /// 32-bit counter.
    Counter32,
    /// 32-bit gauge / Unsigned32.
    Gauge32,
    /// 64-bit counter.
    Counter64,
    /// Hundredths of a second; renders as a duration.
    TimeTicks,
    /// IPv4 address.
    IpAddress,
    /// Raw octets.
    OctetString,
    /// OID-valued variable.
    ObjectIdentifier,
    /// NULL.
    Null,
    /// Double-wrapped bytes.
    Opaque,
    /// A base codec annotated with named numbers.
    Enumerated {
        /// The underlying codec.
        base: Box<Syntax>,
        /// The name table.
        names: NamedValues,
    },
    /// Named bit positions over an octet string.
    Bits {
        /// `(label, bit position)` pairs; bit 0 is the high bit of the
        /// first byte.
        names: Vec<(String, u32)>,
    },
    /// A textual convention wrapping its base with a display hint.
    TextualConvention {
        /// The underlying codec.
        base: Box<Syntax>,
        /// Compiled hint, when the convention declared one.
        hint: Option<DisplayHint>,
    },
    /// Forwarding codec: the symbol is looked up in the registry at
    /// format/parse time.
    Reference(Symbol),
    /// A table row descriptor. Names columns; never formats values.
    Row {
        /// `(column name, syntax)` in declaration order.
        columns: Vec<(String, SyntaxId)>,
    },
    /// A table marker (`SEQUENCE OF`).
    Table,
    /// The null codec: formats as empty string, never parses.
    Unsupported,
}

impl Syntax {
    /// Render a value as text. `None` means this codec has no answer
    /// (unresolvable reference); callers fall back.
    #[must_use]
    pub fn format(&self, value: &Value, ctx: &CodecContext<'_>) -> Option<String> {
        self.format_at(value, ctx, 0)
    }

    fn format_at(&self, value: &Value, ctx: &CodecContext<'_>, depth: usize) -> Option<String> {
        if depth > REFERENCE_DEPTH_LIMIT {
            return None;
        }
        match self {
            Self::Integer => Some(value.as_i64()?.to_string()),
            Self::Counter32 | Self::Gauge32 | Self::Counter64 => {
                Some(value.as_u64()?.to_string())
            }
            Self::TimeTicks => Some(format_ticks(value.as_u64()?)),
            Self::IpAddress => {
                let bytes = value.as_bytes()?;
                let octets: [u8; 4] = bytes.try_into().ok()?;
                Some(
                    ctx.hosts
                        .reverse(octets)
                        .unwrap_or_else(|| format_quad(octets)),
                )
            }
            Self::OctetString => Some(format_octets(value.as_bytes()?)),
            Self::Opaque => Some(format_hex(value.as_bytes()?)),
            Self::ObjectIdentifier => match value {
                Value::ObjectIdentifier(oid) => Some(oid.to_dotted()),
                _ => None,
            },
            Self::Null => Some(String::new()),
            Self::Enumerated { base, names } => {
                if let Some(v) = value.as_i64() {
                    if let Some(label) = names.label(v) {
                        return Some(format!("{label}({v})"));
                    }
                }
                base.format_at(value, ctx, depth + 1)
            }
            Self::Bits { names } => Some(format_bits(value.as_bytes()?, names)),
            Self::TextualConvention { base, hint } => match hint {
                Some(hint) => {
                    if let Some(bytes) = value.as_bytes() {
                        Some(hint.format_bytes(bytes))
                    } else if let Some(v) = value.as_i64() {
                        Some(hint.format_int(v))
                    } else {
                        base.format_at(value, ctx, depth + 1)
                    }
                }
                None => base.format_at(value, ctx, depth + 1),
            },
            Self::Reference(symbol) => {
                let id = ctx.registry.lookup(symbol)?;
                ctx.registry.entry(id).syntax.format_at(value, ctx, depth + 1)
            }
            Self::Row { .. } | Self::Table | Self::Unsupported => Some(String::new()),
        }
    }

    /// Parse text into a value of this syntax.
    pub fn parse(&self, text: &str, ctx: &CodecContext<'_>) -> Result<Value, MibError> {
        self.parse_at(text, ctx, 0)
    }

    fn parse_at(
        &self,
        text: &str,
        ctx: &CodecContext<'_>,
        depth: usize,
    ) -> Result<Value, MibError> {
        let bad = |expected: &'static str| MibError::BadValue {
            text: text.to_owned(),
            expected,
        };
        if depth > REFERENCE_DEPTH_LIMIT {
            return Err(bad("resolvable reference"));
        }
        match self {
            Self::Integer => text
                .trim()
                .parse()
                .map(Value::Integer)
                .map_err(|_| bad("integer")),
            Self::Counter32 => text
                .trim()
                .parse()
                .map(Value::Counter32)
                .map_err(|_| bad("counter")),
            Self::Gauge32 => text
                .trim()
                .parse()
                .map(Value::Gauge32)
                .map_err(|_| bad("gauge")),
            Self::Counter64 => text
                .trim()
                .parse()
                .map(Value::Counter64)
                .map_err(|_| bad("64-bit counter")),
            Self::TimeTicks => parse_ticks(text.trim())
                .map(Value::TimeTicks)
                .ok_or_else(|| bad("time ticks")),
            Self::IpAddress => {
                let t = text.trim();
                if let Some(octets) = parse_quad(t) {
                    return Ok(Value::IpAddress(octets));
                }
                ctx.hosts
                    .forward(t)
                    .map(Value::IpAddress)
                    .ok_or_else(|| bad("IP address or resolvable host"))
            }
            Self::OctetString => Ok(Value::OctetString(parse_octets(text))),
            Self::Opaque => parse_hex(text.trim())
                .map(Value::Opaque)
                .ok_or_else(|| bad("hex octets")),
            Self::ObjectIdentifier => text
                .trim()
                .parse::<Oid>()
                .map(Value::ObjectIdentifier)
                .map_err(|_| bad("object identifier")),
            Self::Null => {
                let t = text.trim();
                if t.is_empty() || t.eq_ignore_ascii_case("null") {
                    Ok(Value::Null)
                } else {
                    Err(bad("null"))
                }
            }
            Self::Enumerated { base, names } => {
                let t = text.trim();
                if let Some(v) = names.value(t) {
                    return Ok(coerce_int(base, v, ctx, depth));
                }
                // `label(N)` form.
                if let Some((label, num)) = split_name_number(t) {
                    if names.value(label) == Some(num) {
                        return Ok(coerce_int(base, num, ctx, depth));
                    }
                }
                if let Ok(v) = t.parse::<i64>() {
                    return Ok(coerce_int(base, v, ctx, depth));
                }
                base.parse_at(text, ctx, depth + 1)
            }
            Self::Bits { names } => parse_bits(text, names)
                .map(Value::OctetString)
                .ok_or_else(|| bad("bit labels")),
            Self::TextualConvention { base, hint } => {
                let tag = base.tag_at(ctx, depth + 1);
                match (hint, tag) {
                    (Some(hint), Some(SyntaxTag::OctetString | SyntaxTag::Opaque)) => {
                        let bytes = hint.parse_bytes(text)?;
                        Ok(Value::OctetString(bytes))
                    }
                    (Some(hint), Some(tag)) if is_integer_tag(tag) => {
                        let v = hint.parse_int(text)?;
                        Value::from_i64(tag, v).ok_or_else(|| bad("value in range"))
                    }
                    _ => base.parse_at(text, ctx, depth + 1),
                }
            }
            Self::Reference(symbol) => {
                let id = ctx
                    .registry
                    .lookup(symbol)
                    .ok_or_else(|| MibError::UnresolvedSymbol(symbol.clone()))?;
                ctx.registry.entry(id).syntax.parse_at(text, ctx, depth + 1)
            }
            Self::Row { .. } | Self::Table | Self::Unsupported => Err(bad("supported syntax")),
        }
    }

    /// Coerce a raw protocol value into this codec's native tag. Values
    /// that do not fit come back unchanged.
    #[must_use]
    pub fn convert(&self, value: Value, ctx: &CodecContext<'_>) -> Value {
        let Some(tag) = self.tag(ctx) else {
            return value;
        };
        if value.tag() == tag {
            return value;
        }
        if is_integer_tag(tag) {
            if let Some(v) = value.as_i64() {
                if let Some(out) = Value::from_i64(tag, v) {
                    return out;
                }
            }
        } else if matches!(
            tag,
            SyntaxTag::OctetString | SyntaxTag::Opaque | SyntaxTag::IpAddress
        ) {
            if let Some(bytes) = value.as_bytes() {
                if let Some(out) = Value::from_bytes(tag, bytes.to_vec()) {
                    return out;
                }
            }
        }
        value
    }

    /// The native tag this codec bottoms out in, following wrappers and
    /// references. `None` for rows, tables and unsupported constructs.
    #[must_use]
    pub fn tag(&self, ctx: &CodecContext<'_>) -> Option<SyntaxTag> {
        self.tag_at(ctx, 0)
    }

    fn tag_at(&self, ctx: &CodecContext<'_>, depth: usize) -> Option<SyntaxTag> {
        if depth > REFERENCE_DEPTH_LIMIT {
            return None;
        }
        match self {
            Self::Integer => Some(SyntaxTag::Integer),
            Self::Counter32 => Some(SyntaxTag::Counter32),
            Self::Gauge32 => Some(SyntaxTag::Gauge32),
            Self::Counter64 => Some(SyntaxTag::Counter64),
            Self::TimeTicks => Some(SyntaxTag::TimeTicks),
            Self::IpAddress => Some(SyntaxTag::IpAddress),
            Self::OctetString | Self::Bits { .. } => Some(SyntaxTag::OctetString),
            Self::ObjectIdentifier => Some(SyntaxTag::ObjectIdentifier),
            Self::Null => Some(SyntaxTag::Null),
            Self::Opaque => Some(SyntaxTag::Opaque),
            Self::Enumerated { base, .. } | Self::TextualConvention { base, .. } => {
                base.tag_at(ctx, depth + 1)
            }
            Self::Reference(symbol) => {
                let id = ctx.registry.lookup(symbol)?;
                ctx.registry.entry(id).syntax.tag_at(ctx, depth + 1)
            }
            Self::Row { .. } | Self::Table | Self::Unsupported => None,
        }
    }

    /// The name table in effect, following wrappers and references.
    #[must_use]
    pub fn named_values<'a>(&'a self, ctx: &CodecContext<'a>) -> Option<&'a NamedValues> {
        self.named_values_at(ctx, 0)
    }

    fn named_values_at<'a>(
        &'a self,
        ctx: &CodecContext<'a>,
        depth: usize,
    ) -> Option<&'a NamedValues> {
        if depth > REFERENCE_DEPTH_LIMIT {
            return None;
        }
        match self {
            Self::Enumerated { names, .. } => Some(names),
            Self::TextualConvention { base, .. } => base.named_values_at(ctx, depth + 1),
            Self::Reference(symbol) => {
                let id = ctx.registry.lookup(symbol)?;
                ctx.registry
                    .entry(id)
                    .syntax
                    .named_values_at(ctx, depth + 1)
            }
            _ => None,
        }
    }

    /// Build a native value from extracted index-tail elements.
    #[must_use]
    pub fn value_from_arcs(&self, content: &[u32], ctx: &CodecContext<'_>) -> Option<Value> {
        let tag = self.tag(ctx)?;
        match tag {
            SyntaxTag::Integer
            | SyntaxTag::Counter32
            | SyntaxTag::Gauge32
            | SyntaxTag::Counter64
            | SyntaxTag::TimeTicks => {
                let &arc = content.first()?;
                Value::from_i64(tag, i64::from(arc))
            }
            SyntaxTag::OctetString | SyntaxTag::Opaque => {
                let bytes: Option<Vec<u8>> =
                    content.iter().map(|&a| u8::try_from(a).ok()).collect();
                Value::from_bytes(tag, bytes?)
            }
            SyntaxTag::IpAddress => {
                let bytes: Option<Vec<u8>> =
                    content.iter().map(|&a| u8::try_from(a).ok()).collect();
                Value::from_bytes(tag, bytes?)
            }
            SyntaxTag::ObjectIdentifier => {
                Some(Value::ObjectIdentifier(Oid::from_slice(content)))
            }
            SyntaxTag::Null => Some(Value::Null),
        }
    }
}

fn is_integer_tag(tag: SyntaxTag) -> bool {
    matches!(
        tag,
        SyntaxTag::Integer
            | SyntaxTag::Counter32
            | SyntaxTag::Gauge32
            | SyntaxTag::Counter64
            | SyntaxTag::TimeTicks
    )
}

fn coerce_int(base: &Syntax, v: i64, ctx: &CodecContext<'_>, depth: usize) -> Value {
    let tag = base.tag_at(ctx, depth + 1).unwrap_or(SyntaxTag::Integer);
    Value::from_i64(tag, v).unwrap_or(Value::Integer(v))
}

/// Split `label(123)` into its parts.
fn split_name_number(text: &str) -> Option<(&str, i64)> {
    let open = text.find('(')?;
    let inner = text.get(open + 1..text.len().checked_sub(1)?)?;
    if !text.ends_with(')') {
        return None;
    }
    Some((&text[..open], inner.parse().ok()?))
}

// === native renderings ===

fn format_quad(octets: [u8; 4]) -> String {
    format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
}

fn parse_quad(text: &str) -> Option<[u8; 4]> {
    let mut out = [0u8; 4];
    let mut parts = text.split('.');
    for slot in &mut out {
        *slot = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

fn is_printable(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| (0x20..0x7F).contains(&b))
}

fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn parse_hex(text: &str) -> Option<Vec<u8>> {
    if text.is_empty() {
        return Some(Vec::new());
    }
    text.split(':')
        .map(|p| {
            if p.len() == 2 {
                u8::from_str_radix(p, 16).ok()
            } else {
                None
            }
        })
        .collect()
}

/// Printable octets render verbatim, everything else as hex pairs.
fn format_octets(bytes: &[u8]) -> String {
    if is_printable(bytes) {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        format_hex(bytes)
    }
}

/// Inverse of [`format_octets`]: hex-pair text becomes bytes, everything
/// else is taken literally.
fn parse_octets(text: &str) -> Vec<u8> {
    match parse_hex(text) {
        Some(bytes) if !text.is_empty() => bytes,
        _ => text.as_bytes().to_vec(),
    }
}

fn format_bits(bytes: &[u8], names: &[(String, u32)]) -> String {
    let mut out = Vec::new();
    for (i, &byte) in bytes.iter().enumerate() {
        for bit in 0..8u32 {
            if byte & (0x80 >> bit) != 0 {
                let pos = i as u32 * 8 + bit;
                match names.iter().find(|(_, p)| *p == pos) {
                    Some((label, _)) => out.push(label.clone()),
                    None => out.push(pos.to_string()),
                }
            }
        }
    }
    out.join(" ")
}

fn parse_bits(text: &str, names: &[(String, u32)]) -> Option<Vec<u8>> {
    let mut positions = Vec::new();
    for word in text.split_whitespace() {
        let pos = match names.iter().find(|(l, _)| l == word) {
            Some((_, p)) => *p,
            None => word.parse().ok()?,
        };
        positions.push(pos);
    }
    let width = positions
        .iter()
        .max()
        .map_or(0, |&max| (max / 8 + 1) as usize);
    let mut bytes = vec![0u8; width];
    for pos in positions {
        bytes[(pos / 8) as usize] |= 0x80 >> (pos % 8);
    }
    Some(bytes)
}

/// Duration rendering: `D days, HH:MM:SS.cc`.
fn format_ticks(ticks: u64) -> String {
    let centis = ticks % 100;
    let seconds = (ticks / 100) % 60;
    let minutes = (ticks / 6_000) % 60;
    let hours = (ticks / 360_000) % 24;
    let days = ticks / 8_640_000;
    format!("{days} days, {hours:02}:{minutes:02}:{seconds:02}.{centis:02}")
}

/// Accepts the duration rendering or a bare tick count.
fn parse_ticks(text: &str) -> Option<u32> {
    if let Ok(raw) = text.parse::<u32>() {
        return Some(raw);
    }
    let (days_part, clock) = text.split_once(" days, ")?;
    let days: u64 = days_part.trim().parse().ok()?;
    let mut fields = clock.split(':');
    let hours: u64 = fields.next()?.parse().ok()?;
    let minutes: u64 = fields.next()?.parse().ok()?;
    let (sec_part, centi_part) = fields.next()?.split_once('.')?;
    if fields.next().is_some() {
        return None;
    }
    let seconds: u64 = sec_part.parse().ok()?;
    let centis: u64 = centi_part.parse().ok()?;
    let total = days * 8_640_000 + hours * 360_000 + minutes * 6_000 + seconds * 100 + centis;
    u32::try_from(total).ok()
}

/// A registry entry: the codec plus the effective constraint of the
/// declaration it came from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedSyntax {
    /// The codec.
    pub syntax: Syntax,
    /// Constraint attached to the declaration, if any.
    pub constraint: Option<Constraint>,
}

impl ResolvedSyntax {
    /// An unconstrained entry.
    #[must_use]
    pub fn new(syntax: Syntax) -> Self {
        Self {
            syntax,
            constraint: None,
        }
    }

    /// A constrained entry.
    #[must_use]
    pub fn constrained(syntax: Syntax, constraint: Option<Constraint>) -> Self {
        Self { syntax, constraint }
    }
}

/// Arena of resolved syntaxes plus the symbol bindings reference codecs
/// resolve through.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyntaxRegistry {
    entries: Vec<ResolvedSyntax>,
    by_symbol: BTreeMap<Symbol, SyntaxId>,
}

impl SyntaxRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    pub fn add(&mut self, entry: ResolvedSyntax) -> SyntaxId {
        let id = SyntaxId::from_index(self.entries.len()).expect("syntax registry full");
        self.entries.push(entry);
        id
    }

    /// Bind a symbol to an entry. First binding wins.
    pub fn bind(&mut self, symbol: Symbol, id: SyntaxId) {
        self.by_symbol.entry(symbol).or_insert(id);
    }

    /// Fetch an entry.
    ///
    /// # Panics
    ///
    /// Panics when `id` did not come from this registry.
    #[must_use]
    pub fn entry(&self, id: SyntaxId) -> &ResolvedSyntax {
        &self.entries[id.to_index()]
    }

    /// Look a symbol up.
    #[must_use]
    pub fn lookup(&self, symbol: &Symbol) -> Option<SyntaxId> {
        self.by_symbol.get(symbol).copied()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The constraint in effect for an entry, following the reference
    /// chain until one is found.
    #[must_use]
    pub fn effective_constraint(&self, id: SyntaxId) -> Option<&Constraint> {
        let mut current = id;
        for _ in 0..REFERENCE_DEPTH_LIMIT {
            let entry = self.entry(current);
            if let Some(c) = &entry.constraint {
                return Some(c);
            }
            match &entry.syntax {
                Syntax::Reference(symbol) => current = self.lookup(symbol)?,
                _ => return None,
            }
        }
        None
    }
}
