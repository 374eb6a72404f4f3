//! Response payloads: raw numbers next to their regional rendering.

use crate::domain::reports::{
    CategoryBranch, CategoryReport, CategoryRow, DeletionReport, GeographyReport,
    IngestionReport, LabelCount, StateTally, SummaryStats, TopicTally, UploadHistoryEntry,
    YearTotal,
};
use crate::shared::number_format::{format_integer, format_percentage};
use serde::Serialize;

pub const NO_DATA_MESSAGE: &str = "Sin datos todavía";

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
    pub message: String,
}

impl StatusMessage {
    pub fn no_data() -> Self {
        Self {
            status: "no_data",
            message: NO_DATA_MESSAGE.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryView {
    pub year: String,
    pub total_rows: i64,
    pub total_rows_display: String,
    pub unique_ids: i64,
    pub unique_ids_display: String,
    pub duplicate_percentage: f64,
    pub duplicate_percentage_display: String,
}

impl From<SummaryStats> for SummaryView {
    fn from(stats: SummaryStats) -> Self {
        Self {
            total_rows_display: format_integer(&stats.total_rows),
            unique_ids_display: format_integer(&stats.unique_ids),
            duplicate_percentage_display: format_percentage(stats.duplicate_percentage),
            year: stats.year,
            total_rows: stats.total_rows,
            unique_ids: stats.unique_ids,
            duplicate_percentage: stats.duplicate_percentage,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LabelCountView {
    pub label: Option<String>,
    pub total: i64,
    pub total_display: String,
}

impl From<LabelCount> for LabelCountView {
    fn from(count: LabelCount) -> Self {
        Self {
            total_display: format_integer(&count.total),
            label: count.label,
            total: count.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StateTallyView {
    pub state: Option<String>,
    pub total: i64,
    pub total_display: String,
    pub unique_ids: i64,
    pub unique_ids_display: String,
}

impl From<StateTally> for StateTallyView {
    fn from(tally: StateTally) -> Self {
        Self {
            total_display: format_integer(&tally.total),
            unique_ids_display: format_integer(&tally.unique_ids),
            state: tally.state,
            total: tally.total,
            unique_ids: tally.unique_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GeographyView {
    pub year: String,
    pub states: i64,
    pub states_display: String,
    pub municipalities: i64,
    pub municipalities_display: String,
    pub parishes: i64,
    pub parishes_display: String,
    pub by_state: Vec<StateTallyView>,
}

impl From<GeographyReport> for GeographyView {
    fn from(report: GeographyReport) -> Self {
        Self {
            year: report.year,
            states: report.states,
            states_display: format_integer(&report.states),
            municipalities: report.municipalities,
            municipalities_display: format_integer(&report.municipalities),
            parishes: report.parishes,
            parishes_display: format_integer(&report.parishes),
            by_state: report.by_state.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryRowView {
    pub levels: [Option<String>; 4],
    pub total: i64,
    pub total_display: String,
    pub unique_ids: i64,
    pub unique_ids_display: String,
}

impl From<CategoryRow> for CategoryRowView {
    fn from(row: CategoryRow) -> Self {
        Self {
            total_display: format_integer(&row.total),
            unique_ids_display: format_integer(&row.unique_ids),
            levels: row.levels,
            total: row.total,
            unique_ids: row.unique_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub year: String,
    pub rows: Vec<CategoryRowView>,
    pub tree: Vec<CategoryBranch>,
}

impl From<CategoryReport> for CategoryView {
    fn from(report: CategoryReport) -> Self {
        Self {
            year: report.year,
            rows: report.rows.into_iter().map(Into::into).collect(),
            tree: report.tree,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TopicView {
    pub area: String,
    pub count: i64,
    pub count_display: String,
    pub description: String,
}

impl From<TopicTally> for TopicView {
    fn from(topic: TopicTally) -> Self {
        Self {
            count_display: format_integer(&topic.count),
            area: topic.area,
            count: topic.count,
            description: topic.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct YearTotalView {
    pub year: Option<String>,
    pub total: i64,
    pub total_display: String,
}

impl From<YearTotal> for YearTotalView {
    fn from(total: YearTotal) -> Self {
        Self {
            total_display: format_integer(&total.total),
            year: total.year,
            total: total.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadHistoryView {
    pub source_file: String,
    pub load_timestamp: String,
    pub rows: i64,
    pub rows_display: String,
}

impl From<UploadHistoryEntry> for UploadHistoryView {
    fn from(entry: UploadHistoryEntry) -> Self {
        Self {
            rows_display: format_integer(&entry.rows),
            source_file: entry.source_file,
            load_timestamp: entry.load_timestamp,
            rows: entry.rows,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngestionView {
    #[serde(flatten)]
    pub report: IngestionReport,
    pub total_rows: u64,
    pub total_rows_display: String,
}

impl From<IngestionReport> for IngestionView {
    fn from(report: IngestionReport) -> Self {
        let total_rows = report.total_rows();
        Self {
            total_rows_display: format_integer(&total_rows),
            total_rows,
            report,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletionView {
    #[serde(flatten)]
    pub report: DeletionReport,
    pub rows_deleted_display: String,
}

impl From<DeletionReport> for DeletionView {
    fn from(report: DeletionReport) -> Self {
        Self {
            rows_deleted_display: format_integer(&report.rows_deleted),
            report,
        }
    }
}

pub fn collect_views<T, V: From<T>>(items: Vec<T>) -> Vec<V> {
    items.into_iter().map(V::from).collect()
}
