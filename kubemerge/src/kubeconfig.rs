use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::*;
use serde_yaml::Value as YamlValue;
use tracing::debug;

use crate::error::{Error, Result};

/// Keys this model does not name, kept so a rewrite does not lose them.
pub type Passthrough = BTreeMap<String, YamlValue>;

/// An explicit `null` reads the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list entry keyed by its `name`.
pub trait Named {
    fn name(&self) -> &str;

    /// Renames the entry along with anything inside it that refers to sibling entries.
    fn rename(&mut self, name: &str);
}

impl Named for Cluster {
    fn name(&self) -> &str {
        &self.name
    }

    fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

impl Named for User {
    fn name(&self) -> &str {
        &self.name
    }

    fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

impl Named for Context {
    fn name(&self) -> &str {
        &self.name
    }

    fn rename(&mut self, name: &str) {
        self.name = name.to_string();
        self.context.cluster = name.to_string();
        self.context.user = name.to_string();
    }
}

// region: Context
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ContextSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cluster: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: Passthrough,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: ContextSpec,
}
// endregion

// region: Cluster
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: Passthrough,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Cluster {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cluster: ClusterSpec,
}
// endregion

// region: User
/// Credentials are independent of each other; any combination is kept as is.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct UserSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: Passthrough,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct User {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: UserSpec,
}
// endregion

// region: Common
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct KubeConfig {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(
        rename = "apiVersion",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub api_version: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub current_context: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clusters: Vec<Cluster>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contexts: Vec<Context>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub other: Passthrough,
}

impl KubeConfig {
    /// Parses a kubeconfig document. Blank input is an empty config.
    pub fn from_yaml(yaml: &str) -> std::result::Result<KubeConfig, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(KubeConfig::default());
        }
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::Serialize)
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<KubeConfig> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading kubeconfig");

        let contents = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;

        KubeConfig::from_yaml(&contents).map_err(|source| Error::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// Overwrites `path` with the serialized config.
pub fn write_config(kc: &KubeConfig, path: &Path) -> Result<()> {
    let yaml = kc.to_yaml()?;
    debug!(path = %path.display(), bytes = yaml.len(), "writing kubeconfig");

    fs::write(path, yaml).map_err(|source| Error::Write {
        path: path.to_owned(),
        source,
    })
}

/// Copies `path` to a sibling named `<file name>_<stamp>` and returns the copy's path.
pub fn backup_config(path: &Path, stamp: &str) -> Result<PathBuf> {
    let mut file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "config".into());
    file_name.push(format!("_{stamp}"));
    let backup = path.with_file_name(file_name);

    fs::copy(path, &backup).map_err(|source| Error::Backup {
        path: path.to_owned(),
        source,
    })?;
    debug!(from = %path.display(), to = %backup.display(), "backed up kubeconfig");

    Ok(backup)
}
// endregion

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
apiVersion: v1
kind: Config
current-context: prod
preferences: {}
clusters:
- name: prod
  cluster:
    server: https://prod.example.com:6443
    certificate-authority-data: Q0FEQVRB
    insecure-skip-tls-verify: false
contexts:
- name: prod
  context:
    cluster: prod
    user: prod
    namespace: web
users:
- name: prod
  user:
    client-certificate-data: Q0VSVA==
    client-key-data: S0VZ
    token: abc
"#;

    #[test]
    fn parses_known_fields() {
        let kc = KubeConfig::from_yaml(FULL).unwrap();

        assert_eq!(kc.kind, "Config");
        assert_eq!(kc.api_version, "v1");
        assert_eq!(kc.current_context, "prod");
        assert_eq!(kc.clusters[0].cluster.server, "https://prod.example.com:6443");
        assert_eq!(
            kc.clusters[0].cluster.certificate_authority_data.as_deref(),
            Some("Q0FEQVRB")
        );
        assert_eq!(kc.contexts[0].context.cluster, "prod");
        assert_eq!(kc.contexts[0].context.user, "prod");
        assert_eq!(kc.users[0].user.token.as_deref(), Some("abc"));
        assert_eq!(kc.users[0].user.password, None);
    }

    #[test]
    fn keeps_unmodelled_fields() {
        let kc = KubeConfig::from_yaml(FULL).unwrap();

        assert!(kc.other.contains_key("preferences"));
        assert_eq!(
            kc.contexts[0].context.other.get("namespace"),
            Some(&YamlValue::String("web".to_string()))
        );
        assert_eq!(
            kc.clusters[0].cluster.other.get("insecure-skip-tls-verify"),
            Some(&YamlValue::Bool(false))
        );
    }

    #[test]
    fn serialization_is_stable() {
        let kc = KubeConfig::from_yaml(FULL).unwrap();
        let reparsed = KubeConfig::from_yaml(&kc.to_yaml().unwrap()).unwrap();

        assert_eq!(kc, reparsed);
    }

    #[test]
    fn writes_kebab_case_keys_and_skips_unset_credentials() {
        let kc = KubeConfig::from_yaml(FULL).unwrap();
        let yaml = kc.to_yaml().unwrap();

        assert!(yaml.contains("current-context: prod"));
        assert!(yaml.contains("certificate-authority-data: Q0FEQVRB"));
        assert!(yaml.contains("client-certificate-data: Q0VSVA=="));
        assert!(!yaml.contains("password"));
        assert!(!yaml.contains("username"));
    }

    #[test]
    fn blank_document_is_empty_config() {
        let kc = KubeConfig::from_yaml("  \n").unwrap();

        assert_eq!(kc, KubeConfig::default());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let kc = KubeConfig::from_yaml("kind: Config\n").unwrap();

        assert!(kc.clusters.is_empty());
        assert!(kc.contexts.is_empty());
        assert!(kc.users.is_empty());
    }

    #[test]
    fn null_lists_and_specs_read_as_empty() {
        let kc = KubeConfig::from_yaml(
            "apiVersion: v1\nkind: Config\nclusters: null\ncontexts: null\nusers: null\ncurrent-context: \"\"\npreferences: {}\n",
        )
        .unwrap();

        assert!(kc.clusters.is_empty());
        assert!(kc.contexts.is_empty());
        assert!(kc.users.is_empty());

        let kc = KubeConfig::from_yaml(
            "clusters:\n- name: a\n  cluster: ~\nusers:\n- name: a\n  user: null\ncontexts:\n- name: a\n  context:\n",
        )
        .unwrap();

        assert_eq!(kc.clusters[0].cluster, ClusterSpec::default());
        assert_eq!(kc.users[0].user, UserSpec::default());
        assert_eq!(kc.contexts[0].context, ContextSpec::default());
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(KubeConfig::from_yaml("clusters: [name: {").is_err());
        assert!(KubeConfig::from_yaml("clusters: 7").is_err());
    }
}
