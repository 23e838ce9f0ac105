//! Validation and merging of a single cluster/user/context triple.

use tracing::{debug, info};

use crate::{
    error::{EntityKind, Error, Result},
    kubeconfig::{KubeConfig, Named},
};

/// Result of a successful [`merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub config: KubeConfig,
    /// Entity kinds whose existing same-named entry was evicted under override.
    pub replaced: Vec<EntityKind>,
}

/// Case-insensitive name comparison used for every collision rule.
pub fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Checks that `source` holds exactly one cluster, one user and one context.
pub fn validate_cardinality(source: &KubeConfig) -> Result<()> {
    for (entity, count) in [
        (EntityKind::Cluster, source.clusters.len()),
        (EntityKind::User, source.users.len()),
        (EntityKind::Context, source.contexts.len()),
    ] {
        if count != 1 {
            return Err(Error::Cardinality { entity, count });
        }
    }
    Ok(())
}

/// Reports the first target entry sharing a name with a `source` entry of the
/// same kind. Clusters are scanned first, then users, then contexts.
pub fn validate_collisions(target: &KubeConfig, source: &KubeConfig) -> Result<()> {
    find_collision(EntityKind::Cluster, &target.clusters, &source.clusters)?;
    find_collision(EntityKind::User, &target.users, &source.users)?;
    find_collision(EntityKind::Context, &target.contexts, &source.contexts)
}

fn find_collision<T: Named>(entity: EntityKind, existing: &[T], incoming: &[T]) -> Result<()> {
    let collision = existing
        .iter()
        .find(|old| incoming.iter().any(|new| names_match(old.name(), new.name())));

    match collision {
        Some(old) => Err(Error::Collision {
            entity,
            name: old.name().to_string(),
        }),
        None => Ok(()),
    }
}

/// Removes the first entry named `name`. Later duplicates are left in place.
fn evict_first<T: Named>(entries: &mut Vec<T>, name: &str) -> bool {
    match entries.iter().position(|e| names_match(e.name(), name)) {
        Some(index) => {
            entries.remove(index);
            true
        }
        None => false,
    }
}

fn rename_all<T: Named>(entries: &mut [T], name: &str) {
    for entry in entries {
        entry.rename(name);
    }
}

/// Renames the single triple in `source` to `name` and appends it to `target`.
///
/// With `allow_override`, a collision evicts the first same-named cluster, user
/// and context of `target` instead of failing. On error nothing is returned.
pub fn merge(
    mut target: KubeConfig,
    mut source: KubeConfig,
    name: &str,
    allow_override: bool,
) -> Result<Merged> {
    validate_cardinality(&source)?;

    rename_all(&mut source.clusters, name);
    rename_all(&mut source.users, name);
    rename_all(&mut source.contexts, name);

    let mut replaced = Vec::new();
    if let Err(collision) = validate_collisions(&target, &source) {
        if !allow_override {
            return Err(collision);
        }
        debug!(%collision, "overriding existing entries");

        if evict_first(&mut target.clusters, name) {
            replaced.push(EntityKind::Cluster);
        }
        if evict_first(&mut target.users, name) {
            replaced.push(EntityKind::User);
        }
        if evict_first(&mut target.contexts, name) {
            replaced.push(EntityKind::Context);
        }
        info!(name, ?replaced, "removed existing entries because of override");
    }

    target.clusters.append(&mut source.clusters);
    target.users.append(&mut source.users);
    target.contexts.append(&mut source.contexts);
    info!(name, "added cluster, user and context");

    Ok(Merged {
        config: target,
        replaced,
    })
}
