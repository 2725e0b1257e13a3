//! ソースファイルと翻訳先ファイルの同期

pub mod orchestrator;
pub mod synchronizer;

pub use orchestrator::{
    LanguageOutcome,
    SyncError,
    SyncOrchestrator,
    SyncReport,
};
pub use synchronizer::{
    SyncOutcome,
    TreeSynchronizer,
};
