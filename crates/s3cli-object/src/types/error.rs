//! Error type for data-transfer operations.

use std::fmt;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// A transfer error carrying a message, an optional source, and a retryable
/// flag.
pub struct Error {
    message: String,
    source: Option<BoxedError>,
    retryable: bool,
}

impl Error {
    /// The store could not be built from the resolved configuration.
    pub fn configuration(msg: impl fmt::Display) -> Self {
        Self {
            message: format!("[configuration] {msg}"),
            source: None,
            retryable: false,
        }
    }

    /// A request against the object store failed.
    pub fn transfer(msg: impl fmt::Display, retryable: bool) -> Self {
        Self {
            message: format!("[object-store] {msg}"),
            source: None,
            retryable,
        }
    }

    /// Reading the local source or writing the local destination failed.
    pub fn local_io(msg: impl fmt::Display) -> Self {
        Self {
            message: format!("[local-io] {msg}"),
            source: None,
            retryable: false,
        }
    }

    /// Attach a source error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Whether a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Self {
        let retryable = !matches!(
            err,
            object_store::Error::NotFound { .. }
                | object_store::Error::PermissionDenied { .. }
                | object_store::Error::Unauthenticated { .. }
                | object_store::Error::Precondition { .. }
                | object_store::Error::NotSupported { .. }
                | object_store::Error::NotImplemented
        );
        Self::transfer(&err, retryable).with_source(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::local_io(&err).with_source(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("message", &self.message)
            .field("retryable", &self.retryable)
            .field("source", &self.source)
            .finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn not_found_is_not_retryable() {
        let err = Error::from(object_store::Error::NotFound {
            path: "missing".into(),
            source: "gone".into(),
        });
        assert!(!err.is_retryable());
        assert!(err.to_string().starts_with("[object-store]"));
        assert!(err.source().is_some());
    }

    #[test]
    fn generic_store_errors_are_retryable() {
        let err = Error::from(object_store::Error::Generic {
            store: "S3",
            source: "connection reset".into(),
        });
        assert!(err.is_retryable());
    }

    #[test]
    fn local_io_errors() {
        let err = Error::from(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "[local-io] disk full");
        assert!(!err.is_retryable());
    }
}
