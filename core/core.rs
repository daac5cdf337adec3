pub mod aggregate;
pub mod config;
pub mod context;
pub mod error;
pub mod filters;
pub mod patterns;
pub mod python;
pub mod reduce;
pub mod relpath;
pub mod report;
pub mod stats;
pub mod tree;
pub mod walk;

pub use aggregate::{Aggregator, Artifact, file_block, read_lossy};
pub use config::{Config, log_path_for, timestamped_output_path};
pub use context::ProjectContext;
pub use error::{AppError, Result};
pub use filters::{FilterSet, Filters, Selection};
pub use patterns::PatternMatcher;
pub use reduce::{ContentReducer, NameFilter, ReducerRegistry, ReductionOptions};
pub use relpath::RelativePath;
pub use report::{CollectingReporter, LogReporter, Reporter};
pub use stats::ContentStats;
pub use tree::{ProjectTree, render_tree};
pub use walk::{EntryKind, VisibleSet, WalkOptions, Walker};
