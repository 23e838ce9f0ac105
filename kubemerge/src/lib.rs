pub mod cli;
pub mod error;
pub mod kubeconfig;
pub mod merge;
pub mod paths;

pub use error::{EntityKind, Error, Result};
pub use kubeconfig::{backup_config, write_config, KubeConfig};
pub use merge::{merge, Merged};
pub use paths::{resolve_kubeconfig_path, resolve_name};
