//! The group store: every group record keyed by name.
//!
//! Same lifecycle as the passwd store: the tools mutate, the file is the
//! truth, every successful mutation reloads.

use crate::constants::{GPASSWD, GROUPADD, GROUPDEL, GROUP_FILE};
use crate::core::parse;
use crate::error::{Error, Result};
use crate::models::group::{Group, GroupChange, GroupChanges, NewGroup};
use crate::util::system::{HostTools, ToolRunner};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct Groups {
    file: PathBuf,
    entries: BTreeMap<String, Group>,
    tools: Arc<dyn ToolRunner>,
}

impl Default for Groups {
    fn default() -> Self {
        Self::new()
    }
}

impl Groups {
    /// Store over the system database at `/etc/group`.
    pub fn new() -> Self {
        Self::at(GROUP_FILE)
    }

    /// Store over a database at a custom location.
    pub fn at(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            entries: BTreeMap::new(),
            tools: Arc::new(HostTools),
        }
    }

    /// Replace the tool runner, e.g. to wrap invocations in sudo or to
    /// stub them out in tests.
    pub fn with_tools(mut self, tools: Arc<dyn ToolRunner>) -> Self {
        self.tools = tools;
        self
    }

    /// Re-read the group file, fully replacing in-memory entries. The
    /// previous contents survive if the file cannot be read.
    pub fn load(&mut self) -> Result<()> {
        let text = fs::read_to_string(&self.file).map_err(|source| Error::Io {
            path: self.file.clone(),
            source,
        })?;
        let mut entries: BTreeMap<String, Group> = BTreeMap::new();
        for group in parse::groups(&text) {
            entries.insert(group.name().to_string(), group);
        }
        self.entries = entries;
        Ok(())
    }

    /// Create a group with `groupadd`; members, when given, are applied
    /// with `gpasswd -M` afterwards. Reloads on success.
    pub fn add(&mut self, spec: &NewGroup) -> Result<()> {
        self.require_privilege("add a group")?;
        spec.validate()?;

        let mut args: Vec<String> = Vec::new();
        if let Some(gid) = spec.gid {
            args.push("-g".into());
            args.push(gid.to_string());
        }
        args.push(spec.name.clone());
        self.tools.run(GROUPADD, &args)?;

        if !spec.members.is_empty() {
            let args = vec!["-M".to_string(), spec.members.join(","), spec.name.clone()];
            self.tools.run(GPASSWD, &args)?;
        }

        self.load()
    }

    /// Delete a group with `groupdel` and reload.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.require_privilege("delete a group")?;
        if name.is_empty() {
            return Err(Error::MissingName);
        }
        self.tools.run(GROUPDEL, &[name.to_string()])?;
        self.load()
    }

    /// Mutation handle for a loaded record.
    pub fn entry(&mut self, name: &str) -> Option<GroupEntry<'_>> {
        if !self.entries.contains_key(name) {
            return None;
        }
        Some(GroupEntry {
            name: name.to_string(),
            store: self,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain name→record clone with no store bookkeeping.
    pub fn snapshot(&self) -> BTreeMap<String, Group> {
        self.entries.clone()
    }

    /// The group file backing this store.
    pub fn file(&self) -> &Path {
        &self.file
    }

    fn require_privilege(&self, action: &'static str) -> Result<()> {
        if !self.tools.is_privileged() {
            return Err(Error::PermissionDenied { action });
        }
        Ok(())
    }

    fn set_group(&mut self, name: &str, change: GroupChange) -> Result<()> {
        self.require_privilege("modify a group")?;
        change.validate()?;
        let current = self.entries.get(name).ok_or_else(|| Error::UnknownEntry {
            name: name.to_string(),
        })?;
        if change.matches(current) {
            // Nothing changed; do not spawn anything.
            return Ok(());
        }
        let args = vec![
            change.flag().to_string(),
            change.value_string(),
            name.to_string(),
        ];
        self.tools.run(change.program(), &args)?;
        self.load()
    }
}

/// Borrowing handle for mutating one group record.
pub struct GroupEntry<'a> {
    store: &'a mut Groups,
    name: String,
}

impl GroupEntry<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current record, if it survived the most recent reload.
    pub fn record(&self) -> Option<&Group> {
        self.store.entries.get(&self.name)
    }

    /// Apply one field change, a no-op when the value already matches.
    pub fn set(&mut self, change: GroupChange) -> Result<()> {
        self.store.set_group(&self.name, change)
    }

    /// Apply a change named by a string field.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        self.store.require_privilege("modify a group")?;
        let change = GroupChange::from_field(field, value)?;
        self.store.set_group(&self.name, change)
    }

    /// Apply every present field of `changes` in order (gid, members),
    /// stopping at the first failure.
    pub fn apply(&mut self, changes: &GroupChanges) -> Result<()> {
        for change in changes.to_list() {
            let field = change.field();
            self.set(change).map_err(|source| Error::SetField {
                field,
                source: Box::new(source),
            })?;
        }
        Ok(())
    }

    /// Delete this record through the owning store.
    pub fn delete(self) -> Result<()> {
        let name = self.name;
        self.store.delete(&name)
    }
}
