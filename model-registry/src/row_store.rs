use std::fmt;

use serde::Serialize;

/// One encoded training row: the label followed by the feature values in schema order.
/// Categorical values are already replaced by their code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row(Vec<String>);

impl Row {
    pub(crate) fn new(label: String, values: Vec<String>) -> Self {
        let mut row = Vec::with_capacity(values.len() + 1);
        row.push(label);
        row.extend(values);

        Self(row)
    }

    #[inline(always)]
    pub fn label(&self) -> &str {
        &self.0[0]
    }

    /// The feature values in schema order
    #[inline(always)]
    pub fn values(&self) -> &[String] {
        &self.0[1..]
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Append-only sequence of the rows added to a model
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, row: Row) -> &Row {
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}
