//! The passwd store: every user record keyed by name, with mutations
//! delegated to the shadow-utils tools.
//!
//! The tools are the single source of truth, so every successful mutation
//! ends with a full [`Passwd::load`] before returning. All mutating
//! methods take `&mut self`, which serializes mutations per store — a
//! reload can never race a reader of pre-reload state.

use crate::constants::{CHPASSWD, PASSWD_FILE, SHADOW_FILE, USERADD, USERDEL};
use crate::core::parse;
use crate::error::{Error, Result};
use crate::models::user::{NewUser, User, UserChange, UserChanges};
use crate::util::system::{HostTools, ToolRunner};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

pub struct Passwd {
    file: PathBuf,
    shadow_file: Option<PathBuf>,
    entries: BTreeMap<String, User>,
    tools: Arc<dyn ToolRunner>,
}

impl Default for Passwd {
    fn default() -> Self {
        Self::new()
    }
}

impl Passwd {
    /// Store over the system databases, `/etc/passwd` joined with
    /// `/etc/shadow` where readable.
    pub fn new() -> Self {
        Self::at(PASSWD_FILE, Some(PathBuf::from(SHADOW_FILE)))
    }

    /// Store over databases at custom locations. `shadow` is optional;
    /// without it records simply carry no aging attributes.
    pub fn at(file: impl Into<PathBuf>, shadow: Option<PathBuf>) -> Self {
        Self {
            file: file.into(),
            shadow_file: shadow,
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

    /// Re-read the database files, fully replacing in-memory entries.
    ///
    /// The previous contents survive if the passwd file cannot be read.
    /// An unreadable shadow file is only a warning: read-only loads must
    /// work without privilege.
    pub fn load(&mut self) -> Result<()> {
        let text = fs::read_to_string(&self.file).map_err(|source| Error::Io {
            path: self.file.clone(),
            source,
        })?;
        let mut entries: BTreeMap<String, User> = BTreeMap::new();
        for user in parse::users(&text) {
            entries.insert(user.name().to_string(), user);
        }

        if let Some(shadow_path) = &self.shadow_file {
            match fs::read_to_string(shadow_path) {
                Ok(shadow_text) => {
                    for (name, info) in parse::shadow_entries(&shadow_text) {
                        match entries.get_mut(&name) {
                            Some(user) => user.shadow = Some(info),
                            None => {
                                warn!(name = %name, "shadow entry without passwd entry, skipped");
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        path = %shadow_path.display(),
                        %err,
                        "shadow file unreadable, aging attributes unavailable"
                    );
                }
            }
        }

        self.entries = entries;
        Ok(())
    }

    /// Create a user with `useradd`, flags built from only the fields the
    /// caller set. A supplied pre-encrypted password is applied through
    /// `chpasswd -e` afterwards. Reloads on success.
    pub fn add(&mut self, spec: &NewUser) -> Result<()> {
        self.require_privilege("add a user")?;
        spec.validate()?;

        let mut args: Vec<String> = Vec::new();
        if let Some(uid) = spec.uid {
            args.push("-u".into());
            args.push(uid.to_string());
        }
        if let Some(gid) = spec.gid {
            args.push("-g".into());
            args.push(gid.to_string());
        }
        if let Some(gecos) = &spec.gecos {
            args.push("-c".into());
            args.push(gecos.clone());
        }
        if let Some(dir) = &spec.dir {
            args.push("-d".into());
            args.push(dir.clone());
        }
        if let Some(shell) = &spec.shell {
            args.push("-s".into());
            args.push(shell.clone());
        }
        args.push(spec.name.clone());
        self.tools.run(USERADD, &args)?;

        if let Some(encrypted) = &spec.password {
            // Never on the command line: argv is world-readable in /proc.
            let line = format!("{}:{}\n", spec.name, encrypted);
            self.tools
                .run_with_stdin(CHPASSWD, &["-e".to_string()], &line)?;
        }

        self.load()
    }

    /// Delete a user with `userdel` and reload. A loaded record deletes
    /// itself through [`UserEntry::delete`].
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.require_privilege("delete a user")?;
        if name.is_empty() {
            return Err(Error::MissingName);
        }
        self.tools.run(USERDEL, &[name.to_string()])?;
        self.load()
    }

    /// Mutation handle for a loaded record.
    pub fn entry(&mut self, name: &str) -> Option<UserEntry<'_>> {
        if !self.entries.contains_key(name) {
            return None;
        }
        Some(UserEntry {
            name: name.to_string(),
            store: self,
        })
    }

    pub fn get(&self, name: &str) -> Option<&User> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain name→record clone with no store bookkeeping, for callers
    /// that serialize the database.
    pub fn snapshot(&self) -> BTreeMap<String, User> {
        self.entries.clone()
    }

    /// The passwd file backing this store.
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub(crate) fn require_privilege(&self, action: &'static str) -> Result<()> {
        if !self.tools.is_privileged() {
            return Err(Error::PermissionDenied { action });
        }
        Ok(())
    }

    /// One field change: validate, skip if already current, run the one
    /// mapped tool invocation, reload.
    fn set_user(&mut self, name: &str, change: UserChange) -> Result<()> {
        self.require_privilege("modify a user")?;
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

/// Borrowing handle for mutating one user record.
///
/// Holding the handle borrows the store mutably, so only one mutation
/// chain can exist per store at a time, and the handle can never outlive
/// a reload that drops its record.
pub struct UserEntry<'a> {
    store: &'a mut Passwd,
    name: String,
}

impl UserEntry<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current record, if it survived the most recent reload.
    pub fn record(&self) -> Option<&User> {
        self.store.entries.get(&self.name)
    }

    /// Apply one field change. A no-op when the value already matches the
    /// in-memory record, so convergent re-runs do not re-invoke tools.
    pub fn set(&mut self, change: UserChange) -> Result<()> {
        self.store.set_user(&self.name, change)
    }

    /// Apply a change named by a string field, for dynamically-typed
    /// callers. The privilege gate comes first, matching `set`.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        self.store.require_privilege("modify a user")?;
        let change = UserChange::from_field(field, value)?;
        self.store.set_user(&self.name, change)
    }

    /// Apply every present field of `changes` in a fixed order, one tool
    /// invocation at a time, stopping at the first failure. Fields applied
    /// before a failure stay applied; the error names the failing field.
    pub fn apply(&mut self, changes: &UserChanges) -> Result<()> {
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
