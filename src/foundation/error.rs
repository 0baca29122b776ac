pub type FramerResult<T> = Result<T, FramerError>;

#[derive(thiserror::Error, Debug)]
pub enum FramerError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("io error: {0}")]
    Io(String),

    #[error(transparent)]
    Failure(#[from] FailureCause),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

/// Why a single photo could not be framed.
///
/// Kept on the image after a failed attempt, so callers can tell a corrupt
/// upload apart from an oversized one without re-running the batch.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureCause {
    #[error("image could not be decoded: {0}")]
    Decode(String),

    #[error("drawing surface unavailable: {0}")]
    Surface(String),

    #[error("image could not be encoded: {0}")]
    Encode(String),
}

impl FailureCause {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            FramerError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(FramerError::decode("x").to_string().contains("decode error:"));
        assert!(
            FramerError::archive("x")
                .to_string()
                .contains("archive error:")
        );
        assert!(FramerError::io("x").to_string().contains("io error:"));
    }

    #[test]
    fn failure_cause_is_transparent() {
        let err = FramerError::from(FailureCause::surface("0x0"));
        assert_eq!(err.to_string(), "drawing surface unavailable: 0x0");
    }

    #[test]
    fn failure_cause_serializes_as_tagged_variant() {
        let json = serde_json::to_value(FailureCause::encode("empty")).unwrap();
        assert_eq!(json["kind"], "encode");
        assert_eq!(json["message"], "empty");
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = FramerError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
