//! Derived mirroring operations

use bytes::Bytes;

/// Kind of storage object an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    File,
    Directory,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::File => "file",
            ObjectKind::Directory => "directory",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single remote action derived from one notification.
///
/// Computed from a normalized event, executed exactly once, never retried or
/// queued locally.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorOperation {
    /// Write `content` at `path`, overwriting any existing object
    Upload { path: String, content: Bytes },
    /// Rename an object from `source` to `destination`
    Rename {
        kind: ObjectKind,
        source: String,
        destination: String,
    },
    /// Remove the object at `path`; a missing object is not an error
    Delete { kind: ObjectKind, path: String },
    /// Create a directory at `path`
    CreateDirectory { path: String },
}

impl MirrorOperation {
    /// Primary destination path of the operation
    pub fn path(&self) -> &str {
        match self {
            MirrorOperation::Upload { path, .. }
            | MirrorOperation::Delete { path, .. }
            | MirrorOperation::CreateDirectory { path } => path,
            MirrorOperation::Rename { destination, .. } => destination,
        }
    }
}

impl std::fmt::Display for MirrorOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MirrorOperation::Upload { path, content } => {
                write!(f, "upload {} ({} bytes)", path, content.len())
            }
            MirrorOperation::Rename {
                kind,
                source,
                destination,
            } => write!(f, "rename {} {} -> {}", kind, source, destination),
            MirrorOperation::Delete { kind, path } => write!(f, "delete {} {}", kind, path),
            MirrorOperation::CreateDirectory { path } => write!(f, "mkdir {}", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let op = MirrorOperation::Upload {
            path: "/c/a.txt".into(),
            content: Bytes::from_static(b"hello"),
        };
        assert_eq!(op.to_string(), "upload /c/a.txt (5 bytes)");

        let op = MirrorOperation::Rename {
            kind: ObjectKind::Directory,
            source: "/c/old".into(),
            destination: "/c/new".into(),
        };
        assert_eq!(op.to_string(), "rename directory /c/old -> /c/new");
    }

    #[test]
    fn test_primary_path() {
        let op = MirrorOperation::Rename {
            kind: ObjectKind::File,
            source: "/c/old".into(),
            destination: "/c/new".into(),
        };
        assert_eq!(op.path(), "/c/new");
    }
}
