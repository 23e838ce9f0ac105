//! Where the target kubeconfig lives and what the merged entries are called.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::error::{Error, Result};

pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

pub fn kube_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
    Ok(home.join(".kube"))
}

/// `$HOME/.kube/config`, computed on demand.
pub fn default_kubeconfig_path() -> Result<PathBuf> {
    Ok(kube_dir()?.join("config"))
}

/// Picks the target kubeconfig: the flag (with whitespace removed), then the
/// first entry of `KUBECONFIG`, then the default path.
pub fn resolve_kubeconfig_path(flag: Option<&str>) -> Result<PathBuf> {
    resolve_kubeconfig_path_with(flag, env::var_os(KUBECONFIG_ENV), default_kubeconfig_path)
}

pub(crate) fn resolve_kubeconfig_path_with(
    flag: Option<&str>,
    env_value: Option<OsString>,
    default: impl FnOnce() -> Result<PathBuf>,
) -> Result<PathBuf> {
    let flag: String = flag
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if !flag.is_empty() {
        return Ok(PathBuf::from(flag));
    }
    info!("--kubeconfig was not passed, looking at the {KUBECONFIG_ENV} environment variable");

    if let Some(path) = env_value
        .as_deref()
        .and_then(|value| env::split_paths(value).find(|p| !p.as_os_str().is_empty()))
    {
        return Ok(path);
    }

    let path = default()?;
    info!(
        "{KUBECONFIG_ENV} is not set, using the default path {}",
        path.display()
    );
    Ok(path)
}

pub fn require_extension(file: &Path) -> Result<()> {
    match file.extension() {
        Some(_) => Ok(()),
        None => Err(Error::MissingExtension {
            path: file.to_owned(),
        }),
    }
}

/// The file name without its extension, lower-cased. The file must have an extension.
pub fn derive_name(file: &Path) -> Result<String> {
    require_extension(file)?;

    file.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_lowercase)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::InvalidFileName {
            path: file.to_owned(),
        })
}

/// An explicit, non-blank name wins; otherwise the name comes from `file`.
/// Either way `file` must have an extension.
pub fn resolve_name(explicit: Option<&str>, file: &Path) -> Result<String> {
    require_extension(file)?;

    match explicit.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => Ok(name.to_string()),
        None => derive_name(file),
    }
}
