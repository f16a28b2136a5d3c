//! Tubely media ingestion pipeline
//!
//! Inbound stream → validation → staging → probe/remux → key derivation →
//! upload → metadata update, plus playback URL signing for stored objects.
//!
//! External tools (ffprobe, ffmpeg) are reached through [`process::ProcessRunner`]
//! so every stage can be exercised without them installed.

pub mod inspector;
pub mod keys;
pub mod pipeline;
pub mod process;
pub mod remux;
pub mod signer;
pub mod stager;
pub mod validator;

pub use inspector::ContainerInspector;
pub use keys::{KeyDerivation, KeyDeriver, KeySource, OsRandom, RandomSource};
pub use pipeline::{IngestOutcome, IngestPipeline, PipelineSettings, UploadRequest};
pub use process::{ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use remux::FastStartRemuxer;
pub use signer::PlaybackUrlSigner;
pub use stager::{StagedFile, StreamStager};
pub use validator::{UploadValidator, ValidationError};
