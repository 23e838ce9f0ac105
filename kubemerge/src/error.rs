//! Error types for kubemerge

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// The three kinds of named entries a kubeconfig holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Cluster,
    User,
    Context,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Cluster => "cluster",
            EntityKind::User => "user",
            EntityKind::Context => "context",
        })
    }
}

/// Everything that can stop a merge.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot parse {} as a kubeconfig: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("exactly one {entity} can be merged into a kubeconfig, found {count}")]
    Cardinality { entity: EntityKind, count: usize },

    #[error("a {entity} entry named {name} already exists in kubeconfig, merge failed")]
    Collision { entity: EntityKind, name: String },

    #[error("cannot serialize kubeconfig: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot back up {}: {source}", path.display())]
    Backup { path: PathBuf, source: io::Error },

    #[error("cannot locate the home directory for the default kubeconfig path")]
    NoHomeDir,

    #[error("the file {} must have an extension", path.display())]
    MissingExtension { path: PathBuf },

    #[error("cannot derive an entry name from {}", path.display())]
    InvalidFileName { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_names_entity_and_name() {
        let err = Error::Collision {
            entity: EntityKind::User,
            name: "prod".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "a user entry named prod already exists in kubeconfig, merge failed"
        );
    }

    #[test]
    fn cardinality_reports_count() {
        let err = Error::Cardinality {
            entity: EntityKind::Context,
            count: 0,
        };
        let display = err.to_string();
        assert!(display.contains("context"));
        assert!(display.contains("found 0"));
    }

    #[test]
    fn read_error_keeps_io_source() {
        use std::error::Error as _;

        let err = Error::Read {
            path: PathBuf::from("/nope/config"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/nope/config"));
        assert!(err.source().is_some());
    }
}
