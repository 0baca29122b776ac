#![forbid(unsafe_code)]

pub mod assets;
pub mod batch;
pub mod config;
pub mod export;
pub mod foundation;
pub mod logging;
pub mod progress;
pub mod render;

pub use foundation::{error, geometry, handle};

pub use assets::{FrameAsset, ImageState, ImageStatus, InputFile, SourceImage};
pub use batch::{Batch, BatchStats, RunReport};
pub use config::{BatchConfig, LoggingConfig};
pub use error::{FailureCause, FramerError, FramerResult};
pub use export::{archive_file_name, build_archive, entry_name, write_archive, write_archive_at};
pub use geometry::{Band, BandLayout, fit_within};
pub use handle::{HandleKind, HandleRegistry, RenderHandle};
pub use progress::{ItemOutcome, NullSink, ProgressEvent, ProgressSink};
pub use render::{FramedImage, LoadedFrame, Surface, compose, render_framed};
