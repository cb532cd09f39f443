pub mod evidence;
pub mod file;
pub mod report;
pub mod tool;

pub use evidence::{EvidenceHit, Transport, TransportVerdict};
pub use file::{FileContent, FileRecord, SourceLanguage};
pub use report::{AnalysisReport, ReportMetadata, RunTemplate, ToolEntry};
pub use tool::{ParamInfo, ParamSchema, SchemaDescriptor, SyscallHint, ToolCandidate};
