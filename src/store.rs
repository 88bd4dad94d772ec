//! Actor flag storage
//!
//! The host owns per-actor key/value flags, scoped by module id. This module
//! defines the seams the gate reads through (`ActorDirectory`, `FlagStore`)
//! and a YAML-file implementation used by the CLI.
//!
//! File layout:
//! ```yaml
//! actors:
//!   abc123:
//!     name: Sir Stutters
//!     flags:
//!       eventide-speech-mannerisms:
//!         mannerism: d
//!         position: start
//! ```

use eyre::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::mannerism::{FLAG_MANNERISM, FLAG_POSITION, MODULE_ID, MannerismRule, Position};

/// A resolved speaking entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

/// Resolves a speaker reference to the owning actor
pub trait ActorDirectory {
    fn resolve(&self, actor_id: &str) -> Option<Actor>;
}

/// Per-actor flags, namespaced by scope
pub trait FlagStore {
    fn get_flag(&self, actor_id: &str, scope: &str, key: &str) -> Option<String>;
    fn set_flag(&mut self, actor_id: &str, scope: &str, key: &str, value: &str) -> Result<()>;
    fn unset_flag(&mut self, actor_id: &str, scope: &str, key: &str) -> Result<()>;
}

/// Read an actor's active rule, if any
pub fn load_rule(store: &dyn FlagStore, actor_id: &str) -> Option<MannerismRule> {
    let mannerism = store.get_flag(actor_id, MODULE_ID, FLAG_MANNERISM);
    let position = store.get_flag(actor_id, MODULE_ID, FLAG_POSITION);
    MannerismRule::from_flags(mannerism.as_deref(), position.as_deref())
}

/// Store a rule; an empty mannerism clears it instead
pub fn save_rule(store: &mut dyn FlagStore, actor_id: &str, mannerism: &str, position: Position) -> Result<()> {
    if mannerism.is_empty() {
        return clear_rule(store, actor_id);
    }
    store.set_flag(actor_id, MODULE_ID, FLAG_MANNERISM, mannerism)?;
    store.set_flag(actor_id, MODULE_ID, FLAG_POSITION, position.as_str())?;
    Ok(())
}

/// Remove both rule flags
pub fn clear_rule(store: &mut dyn FlagStore, actor_id: &str) -> Result<()> {
    store.unset_flag(actor_id, MODULE_ID, FLAG_MANNERISM)?;
    store.unset_flag(actor_id, MODULE_ID, FLAG_POSITION)?;
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ActorRecord {
    pub name: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub flags: IndexMap<String, IndexMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct StoreData {
    #[serde(default)]
    actors: IndexMap<String, ActorRecord>,
}

/// Actors and their flags persisted in one YAML file
pub struct YamlStore {
    path: PathBuf,
    data: StoreData,
}

impl YamlStore {
    /// Open the store; a missing file is an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let data = if path.exists() {
            let content = fs::read_to_string(&path).context(format!("Failed to read store {}", path.display()))?;
            if content.trim().is_empty() {
                StoreData::default()
            } else {
                serde_yaml::from_str(&content).context(format!("Failed to parse store {}", path.display()))?
            }
        } else {
            log::debug!("Store {} does not exist yet", path.display());
            StoreData::default()
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the store back, replacing the file atomically
    pub fn save(&self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).context("Failed to create store directory")?;

        let yaml = serde_yaml::to_string(&self.data).context("Failed to serialize store")?;
        let mut tmp = tempfile::NamedTempFile::new_in(&parent).context("Failed to create temp file")?;
        tmp.write_all(yaml.as_bytes()).context("Failed to write store")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .context(format!("Failed to replace {}", self.path.display()))?;

        log::info!("Saved store to {}", self.path.display());
        Ok(())
    }

    /// Add an actor, or rename an existing one
    pub fn upsert_actor(&mut self, actor_id: &str, name: &str) {
        self.data
            .actors
            .entry(actor_id.to_string())
            .and_modify(|a| a.name = name.to_string())
            .or_insert_with(|| ActorRecord {
                name: name.to_string(),
                flags: IndexMap::new(),
            });
    }

    pub fn actors(&self) -> impl Iterator<Item = (&str, &ActorRecord)> {
        self.data.actors.iter().map(|(id, record)| (id.as_str(), record))
    }
}

impl ActorDirectory for YamlStore {
    fn resolve(&self, actor_id: &str) -> Option<Actor> {
        self.data.actors.get(actor_id).map(|record| Actor {
            id: actor_id.to_string(),
            name: record.name.clone(),
        })
    }
}

impl FlagStore for YamlStore {
    fn get_flag(&self, actor_id: &str, scope: &str, key: &str) -> Option<String> {
        self.data.actors.get(actor_id)?.flags.get(scope)?.get(key).cloned()
    }

    fn set_flag(&mut self, actor_id: &str, scope: &str, key: &str, value: &str) -> Result<()> {
        let Some(record) = self.data.actors.get_mut(actor_id) else {
            eyre::bail!("Unknown actor: {}", actor_id);
        };
        record
            .flags
            .entry(scope.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn unset_flag(&mut self, actor_id: &str, scope: &str, key: &str) -> Result<()> {
        let Some(record) = self.data.actors.get_mut(actor_id) else {
            eyre::bail!("Unknown actor: {}", actor_id);
        };
        if let Some(flags) = record.flags.get_mut(scope) {
            flags.shift_remove(key);
            if flags.is_empty() {
                record.flags.shift_remove(scope);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> YamlStore {
        YamlStore::open(dir.path().join("actors.yaml")).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.actors().count(), 0);
        assert!(store.resolve("nobody").is_none());
    }

    #[test]
    fn test_resolve_actor() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.upsert_actor("a1", "Sir Stutters");
        let actor = store.resolve("a1").unwrap();
        assert_eq!(actor.name, "Sir Stutters");

        store.upsert_actor("a1", "Lady Stutters");
        assert_eq!(store.resolve("a1").unwrap().name, "Lady Stutters");
    }

    #[test]
    fn test_flags_are_scoped() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.upsert_actor("a1", "A");
        store.set_flag("a1", MODULE_ID, "mannerism", "heh").unwrap();
        store.set_flag("a1", "other-module", "mannerism", "nope").unwrap();

        assert_eq!(store.get_flag("a1", MODULE_ID, "mannerism").as_deref(), Some("heh"));
        assert_eq!(store.get_flag("a1", "other-module", "mannerism").as_deref(), Some("nope"));

        store.unset_flag("a1", MODULE_ID, "mannerism").unwrap();
        assert!(store.get_flag("a1", MODULE_ID, "mannerism").is_none());
        assert!(store.get_flag("a1", "other-module", "mannerism").is_some());
    }

    #[test]
    fn test_set_flag_unknown_actor_fails() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert!(store.set_flag("ghost", MODULE_ID, "mannerism", "x").is_err());
    }

    #[test]
    fn test_rule_helpers() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.upsert_actor("a1", "A");

        save_rule(&mut store, "a1", "heh", Position::End).unwrap();
        let rule = load_rule(&store, "a1").unwrap();
        assert_eq!(rule.pattern(), "heh");
        assert_eq!(rule.position(), Position::End);

        save_rule(&mut store, "a1", "", Position::Start).unwrap();
        assert!(load_rule(&store, "a1").is_none());
        assert!(store.get_flag("a1", MODULE_ID, FLAG_POSITION).is_none());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.upsert_actor("a1", "Sir Stutters");
        save_rule(&mut store, "a1", "d", Position::Start).unwrap();
        store.save().unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.resolve("a1").unwrap().name, "Sir Stutters");
        let rule = load_rule(&reopened, "a1").unwrap();
        assert_eq!(rule.pattern(), "d");
        assert_eq!(rule.position(), Position::Start);
    }

    #[test]
    fn test_hand_written_file_with_bad_position() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("actors.yaml");
        fs::write(
            &path,
            "actors:\n  a1:\n    name: A\n    flags:\n      eventide-speech-mannerisms:\n        mannerism: nya\n        position: diagonal\n",
        )
        .unwrap();

        let store = YamlStore::open(&path).unwrap();
        let rule = load_rule(&store, "a1").unwrap();
        assert_eq!(rule.position(), Position::Middle);
    }
}
