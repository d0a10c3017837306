//! Table index decomposition.
//!
//! An [`Index`] is the ordered column list of a table row template. Given
//! the OID tail beyond a matched node, it slices the tail into per-column
//! values using each column's effective constraint: fixed-width scalars
//! consume one element, fixed-size strings consume N, variable-size
//! strings are length-prefixed.

use super::ids::NodeId;
use super::store::MibStore;
use super::value::Value;
use crate::codec::{CodecContext, Syntax};
use crate::error::MibError;

/// Ordered index-column references of one table entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Index {
    columns: Vec<NodeId>,
}

/// One resolved index column.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexColumnValue {
    /// The column node.
    pub column: NodeId,
    /// Column name.
    pub name: String,
    /// The native value built from the extracted tail elements.
    pub value: Value,
    /// Display text: the enumerated name when the column carries one,
    /// otherwise the codec rendering.
    pub text: String,
}

impl Index {
    /// Build from columns in INDEX-clause declaration order.
    #[must_use]
    pub fn new(columns: Vec<NodeId>) -> Self {
        Self { columns }
    }

    /// The columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[NodeId] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the index has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Decompose an OID tail into column values, in declaration order.
    ///
    /// Decomposition is best-effort: a column whose constraint cannot slice
    /// the remaining tail, or that has no usable codec, stops the walk and
    /// whatever was already resolved is returned. Callers needing strict
    /// validation compare the result length against [`len`](Self::len).
    ///
    /// When every column resolved but tail elements remain, the OID claims
    /// index structure it does not have:
    /// [`MibError::TrailingIndexElements`].
    pub fn resolve(
        &self,
        store: &MibStore,
        tail: &[u32],
    ) -> Result<Vec<IndexColumnValue>, MibError> {
        let ctx = CodecContext::new(store.registry());
        let mut rest = tail;
        let mut out = Vec::new();

        for &column in &self.columns {
            if rest.is_empty() {
                break;
            }
            let Some(info) = store.object(column) else {
                break;
            };

            let extracted = match &info.constraint {
                Some(constraint) => constraint.extract(rest),
                // No constraint: one element.
                None => Some((vec![rest[0]], &rest[1..])),
            };
            let Some((content, remainder)) = extracted else {
                break;
            };

            let syntax = &store.registry().entry(info.syntax).syntax;
            let Some(value) = syntax.value_from_arcs(&content, &ctx) else {
                break;
            };
            let text = column_text(syntax, &value, &ctx);

            out.push(IndexColumnValue {
                column,
                name: store.node_name(column).unwrap_or_default().to_owned(),
                value,
                text,
            });
            rest = remainder;
        }

        if out.len() == self.columns.len() && !rest.is_empty() {
            return Err(MibError::TrailingIndexElements {
                left: rest.len(),
                resolved: out.len(),
            });
        }
        Ok(out)
    }
}

/// Index columns substitute the bare enumerated name; everything else uses
/// the codec rendering.
fn column_text(syntax: &Syntax, value: &Value, ctx: &CodecContext<'_>) -> String {
    if let (Some(names), Some(v)) = (syntax.named_values(ctx), value.as_i64()) {
        if let Some(label) = names.label(v) {
            return label.to_owned();
        }
    }
    syntax.format(value, ctx).unwrap_or_default()
}
