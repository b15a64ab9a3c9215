pub mod job;
pub mod orchestrator;
pub mod output_dir;
pub mod report;
pub mod request;
pub mod steps;

pub use job::{JobDescriptor, JobFile, JobOutput};
pub use orchestrator::{ExportPreview, ExportSettings, Orchestrator, StepPhase, StepProgress};
pub use output_dir::{DirectoryState, ExistingDirectoryPolicy, OutputDirectory};
pub use report::{discover_artifacts, ArtifactRecord, ArtifactSnapshot, ExportReport};
pub use request::{output_directory_for, ExportRequest};
pub use steps::{AudioMode, ExportPlan, ExportStep, InvocationMode, MetadataMode};
