use std::fmt;

use crate::spotify::FeatureRecord;

pub const LABEL_COLUMN: &str = "like?";

/// Feature records of one playlist, in page order then within-page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRecord>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FeatureRecord] {
        &self.rows
    }

    pub fn push(&mut self, record: FeatureRecord) {
        self.rows.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = FeatureRecord>) {
        self.rows.extend(records);
    }

    /// Tag every row with the same label.
    pub fn label(self, label: Label) -> LabeledTable {
        LabeledTable {
            rows: self.rows.into_iter().map(|r| (r, label)).collect(),
        }
    }
}

impl FromIterator<FeatureRecord> for FeatureTable {
    fn from_iter<I: IntoIterator<Item = FeatureRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Yes,
    No,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Yes => "yes",
            Label::No => "no",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature rows tagged with a preference label, ready to be written out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledTable {
    rows: Vec<(FeatureRecord, Label)>,
}

impl LabeledTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[(FeatureRecord, Label)] {
        &self.rows
    }

    /// Append `other` below `self`; each row keeps its own label.
    pub fn concat(mut self, other: LabeledTable) -> LabeledTable {
        self.rows.extend(other.rows);
        self
    }

    /// Feature names in first-seen order across all rows, then the label column.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for (record, _) in &self.rows {
            for key in record.keys() {
                if key != LABEL_COLUMN && !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        columns.push(LABEL_COLUMN.to_string());
        columns
    }
}
