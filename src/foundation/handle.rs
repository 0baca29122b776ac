use std::sync::{
    Arc,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    Preview,
    Frame,
    Output,
}

impl HandleKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Frame => "frame",
            Self::Output => "output",
        }
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: AtomicU64,
    live: AtomicUsize,
}

/// Issues render handles and tracks how many are still held.
///
/// A handle is released when it is dropped, so discarding an image or
/// replacing the frame frees its handles immediately.
#[derive(Clone, Debug, Default)]
pub struct HandleRegistry {
    inner: Arc<RegistryInner>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, kind: HandleKind) -> RenderHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.live.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(id, kind = kind.as_str(), "acquire handle");
        RenderHandle {
            id,
            kind,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Number of handles acquired and not yet dropped.
    pub fn live(&self) -> usize {
        self.inner.live.load(Ordering::Acquire)
    }
}

/// Opaque, uniquely owned reference to a displayable image.
#[derive(Debug)]
pub struct RenderHandle {
    id: u64,
    kind: HandleKind,
    registry: Arc<RegistryInner>,
}

impl RenderHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn uri(&self) -> String {
        format!("blob:batchframe/{}/{}", self.kind.as_str(), self.id)
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        self.registry.live.fetch_sub(1, Ordering::AcqRel);
        tracing::trace!(id = self.id, kind = self.kind.as_str(), "release handle");
    }
}
