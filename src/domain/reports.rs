use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub year: String,
    pub total_rows: i64,
    pub unique_ids: i64,
    pub duplicate_percentage: f64,
}

impl SummaryStats {
    pub fn from_counts(year: &str, total_rows: i64, unique_ids: i64) -> Self {
        let duplicate_percentage = if total_rows > 0 {
            (total_rows - unique_ids) as f64 / total_rows as f64 * 100.0
        } else {
            0.0
        };
        Self {
            year: year.to_string(),
            total_rows,
            unique_ids,
            duplicate_percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: Option<String>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTally {
    pub state: Option<String>,
    pub total: i64,
    pub unique_ids: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyReport {
    pub year: String,
    pub states: i64,
    pub municipalities: i64,
    pub parishes: i64,
    pub by_state: Vec<StateTally>,
}

/// One leaf combination of the four category levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub levels: [Option<String>; 4],
    pub total: i64,
    pub unique_ids: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLeaf {
    pub label: Option<String>,
    pub total: i64,
    pub unique_ids: i64,
}

/// A level 1–3 group; `span` counts the leaves underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBranch {
    pub label: Option<String>,
    pub span: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<CategoryBranch>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub leaves: Vec<CategoryLeaf>,
}

impl CategoryBranch {
    pub fn new(label: Option<String>) -> Self {
        Self {
            label,
            span: 0,
            children: Vec::new(),
            leaves: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub year: String,
    pub rows: Vec<CategoryRow>,
    pub tree: Vec<CategoryBranch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTally {
    pub area: String,
    pub count: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadHistoryEntry {
    pub source_file: String,
    pub load_timestamp: String,
    pub rows: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearTotal {
    pub year: Option<String>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIngestion {
    pub source_file: String,
    pub rows: u64,
    pub table_created: bool,
    pub columns_added: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub load_timestamp: String,
    pub files: Vec<FileIngestion>,
}

impl IngestionReport {
    pub fn total_rows(&self) -> u64 {
        self.files.iter().map(|f| f.rows).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub source_file: String,
    pub rows_deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_percentage() {
        let stats = SummaryStats::from_counts("Todos", 100, 80);
        assert!((stats.duplicate_percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_percentage_without_rows() {
        let stats = SummaryStats::from_counts("2023", 0, 0);
        assert_eq!(stats.duplicate_percentage, 0.0);
    }
}
