pub mod item_store;

pub use item_store::{ItemStore, MergeReport, PartitionSummary, RemoveOutcome, SharedStore};
