use crate::GeoFloat;
use geo_types::Coord;

use std::fmt;

/// A failure of an internal noding or labeling invariant.
///
/// Topology errors are ordinarily not seen by callers: the buffer driver
/// catches them and retries the operation under a coarser precision model.
/// One surfaces (wrapped in [`BufferError::Topology`]) only after every
/// fallback precision has been exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyError<F: GeoFloat> {
    message: String,
    location: Option<Coord<F>>,
}

impl<F: GeoFloat> TopologyError<F> {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        TopologyError {
            message: message.into(),
            location: None,
        }
    }

    pub(crate) fn at(message: impl Into<String>, location: Coord<F>) -> Self {
        TopologyError {
            message: message.into(),
            location: Some(location),
        }
    }

    /// The coordinate at which the invariant failed, when known.
    pub fn location(&self) -> Option<Coord<F>> {
        self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<F: GeoFloat> fmt::Display for TopologyError<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(c) => write!(
                f,
                "topology error: {} at ({:?}, {:?})",
                self.message, c.x, c.y
            ),
            None => write!(f, "topology error: {}", self.message),
        }
    }
}

impl<F: GeoFloat + fmt::Debug> std::error::Error for TopologyError<F> {}

/// Errors surfaced by [`Buffer`](crate::Buffer) operations.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferError<F: GeoFloat> {
    /// The input was malformed: non-finite ordinates, a non-finite distance,
    /// or invalid parameters.
    InvalidInput(String),
    /// Noding or labeling failed under every precision model tried.
    Topology(TopologyError<F>),
}

impl<F: GeoFloat> fmt::Display for BufferError<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            BufferError::Topology(err) => err.fmt(f),
        }
    }
}

impl<F: GeoFloat + fmt::Debug> std::error::Error for BufferError<F> {}

impl<F: GeoFloat> From<TopologyError<F>> for BufferError<F> {
    fn from(err: TopologyError<F>) -> Self {
        BufferError::Topology(err)
    }
}
