pub mod category_tree;
pub mod ingestion;
pub mod reporting;
pub mod topic_classifier;
