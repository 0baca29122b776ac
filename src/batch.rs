use crate::{
    assets::{FrameAsset, ImageState, ImageStatus, InputFile, SourceImage},
    config::BatchConfig,
    error::{FramerError, FramerResult},
    handle::HandleRegistry,
    progress::{ItemOutcome, ProgressEvent, ProgressSink, progress_percent},
    render::{FramedImage, LoadedFrame, compose},
};

/// Counts derived from the current image statuses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub completed: usize,
    pub processing: usize,
    pub pending: usize,
    pub failed: usize,
}

/// Summary of one call to [`Batch::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunReport {
    pub total: usize,
    /// Photos that went through the compositor this run.
    pub attempted: usize,
    pub completed: usize,
    pub failed: usize,
    /// Photos already completed before the run started.
    pub skipped: usize,
}

/// The photos, frame and settings processed together.
///
/// [`Batch::run`] holds `&mut self` until every photo has been visited, so
/// photos and the frame cannot change under a running batch.
#[derive(Debug)]
pub struct Batch {
    config: BatchConfig,
    registry: HandleRegistry,
    frame: Option<FrameAsset>,
    images: Vec<SourceImage>,
    next_id: u64,
}

impl Batch {
    pub fn new(config: BatchConfig) -> FramerResult<Self> {
        Self::with_registry(config, HandleRegistry::new())
    }

    pub fn with_registry(config: BatchConfig, registry: HandleRegistry) -> FramerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            frame: None,
            images: Vec::new(),
            next_id: 0,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: BatchConfig) -> FramerResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// Adds every file whose MIME type starts with `image/`, in order.
    /// Returns how many were accepted.
    pub fn add_images(&mut self, files: impl IntoIterator<Item = InputFile>) -> usize {
        let mut accepted = 0;
        for file in files {
            if !file.is_image() {
                tracing::warn!(name = %file.name, mime = %file.mime, "skipping non-image file");
                continue;
            }
            self.next_id += 1;
            let id = format!("img-{}", self.next_id);
            tracing::debug!(%id, name = %file.name, bytes = file.bytes.len(), "added image");
            self.images.push(SourceImage::new(id, file, &self.registry));
            accepted += 1;
        }
        accepted
    }

    /// Installs the frame, releasing the previous one.
    pub fn set_frame(&mut self, file: InputFile) -> FramerResult<()> {
        if !file.is_image() {
            return Err(FramerError::validation(format!(
                "frame '{}' has non-image type '{}'",
                file.name, file.mime
            )));
        }
        tracing::debug!(name = %file.name, bytes = file.bytes.len(), "frame selected");
        self.frame = Some(FrameAsset::new(file, &self.registry));
        Ok(())
    }

    pub fn frame(&self) -> Option<&FrameAsset> {
        self.frame.as_ref()
    }

    pub fn images(&self) -> &[SourceImage] {
        &self.images
    }

    pub fn image(&self, id: &str) -> Option<&SourceImage> {
        self.images.iter().find(|img| img.id() == id)
    }

    /// Removes one photo and its handles. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|img| img.id() != id);
        before != self.images.len()
    }

    /// Drops every photo, releasing previews and outputs. The frame stays.
    pub fn clear(&mut self) {
        tracing::debug!(images = self.images.len(), "clearing batch");
        self.images.clear();
    }

    pub fn stats(&self) -> BatchStats {
        let mut stats = BatchStats {
            total: self.images.len(),
            ..BatchStats::default()
        };
        for img in &self.images {
            match img.status() {
                ImageStatus::Pending => stats.pending += 1,
                ImageStatus::Processing => stats.processing += 1,
                ImageStatus::Completed => stats.completed += 1,
                ImageStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }

    pub fn can_run(&self) -> bool {
        self.frame.is_some() && !self.images.is_empty()
    }

    /// Completed photos with their framed output, in batch order.
    pub fn completed(&self) -> impl Iterator<Item = (&SourceImage, &FramedImage)> {
        self.images
            .iter()
            .filter_map(|img| img.output().map(|out| (img, out)))
    }

    /// Frames every photo not yet completed, one at a time, in order.
    ///
    /// Returns `Ok(None)` without touching anything when there is no frame
    /// or no photo. A frame that fails to decode aborts before any photo is
    /// visited. Per-photo failures are recorded on the photo and the run
    /// moves on.
    #[tracing::instrument(skip_all, fields(images = self.images.len()))]
    pub fn run(&mut self, sink: &mut dyn ProgressSink) -> FramerResult<Option<RunReport>> {
        let Some(frame) = self.frame.as_ref() else {
            tracing::debug!("no frame selected; nothing to run");
            return Ok(None);
        };
        if self.images.is_empty() {
            tracing::debug!("no images; nothing to run");
            return Ok(None);
        }

        let frame = LoadedFrame::load(frame)?;
        let total = self.images.len();
        let mut report = RunReport {
            total,
            ..RunReport::default()
        };

        tracing::info!(
            total,
            frame_w = frame.width(),
            frame_h = frame.height(),
            "batch run started"
        );
        sink.on_event(&ProgressEvent::RunStarted { total });

        for index in 0..total {
            let (id, outcome) = self.visit(index, &frame, &mut report, sink);
            sink.on_event(&ProgressEvent::ItemFinished {
                index,
                id,
                outcome,
                percent: progress_percent(index + 1, total),
                stats: self.stats(),
            });
        }

        let stats = self.stats();
        tracing::info!(
            attempted = report.attempted,
            completed = report.completed,
            failed = report.failed,
            skipped = report.skipped,
            "batch run finished"
        );
        sink.on_event(&ProgressEvent::RunFinished { report, stats });
        Ok(Some(report))
    }

    fn visit(
        &mut self,
        index: usize,
        frame: &LoadedFrame,
        report: &mut RunReport,
        sink: &mut dyn ProgressSink,
    ) -> (String, ItemOutcome) {
        let image = &mut self.images[index];
        let id = image.id().to_string();

        if image.status() == ImageStatus::Completed {
            report.skipped += 1;
            return (id, ItemOutcome::Skipped);
        }

        image.set_state(ImageState::Processing);
        report.attempted += 1;
        sink.on_event(&ProgressEvent::ItemStarted {
            index,
            id: id.clone(),
            name: image.name().to_string(),
        });

        match compose(image.bytes(), frame, &self.config, &self.registry) {
            Ok(out) => {
                report.completed += 1;
                let outcome = ItemOutcome::Completed {
                    width: out.width,
                    height: out.height,
                };
                image.set_state(ImageState::Completed(out));
                (id, outcome)
            }
            Err(cause) => {
                tracing::warn!(%id, name = image.name(), %cause, "image failed");
                report.failed += 1;
                image.set_state(ImageState::Failed(cause.clone()));
                (id, ItemOutcome::Failed { cause })
            }
        }
    }
}
