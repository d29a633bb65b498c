//! Records from the passwd and shadow databases.

use crate::constants::{CHAGE, USERMOD};
use crate::error::{Error, Result};
use crate::models::{check_colon, parse_num};
use serde::{Deserialize, Serialize};

/// State of the encrypted-password column of a shadow entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordState {
    /// Empty column: anyone can log in without a password.
    #[default]
    NoPassword,
    /// Leading `!`: the password is locked.
    Locked,
    /// `*`: password login is disabled.
    Disabled,
    /// A password hash is set.
    Set,
}

impl PasswordState {
    pub(crate) fn classify(column: &str) -> Self {
        if column.is_empty() {
            PasswordState::NoPassword
        } else if column.starts_with('!') {
            PasswordState::Locked
        } else if column == "*" {
            PasswordState::Disabled
        } else {
            PasswordState::Set
        }
    }
}

/// Password-aging attributes joined from the shadow database by name.
///
/// Day counts are days since the epoch (`last_change`, `expire_date`) or
/// plain day intervals; empty columns stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowInfo {
    pub state: PasswordState,
    pub last_change: Option<i64>,
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
    pub warn_days: Option<i64>,
    pub inactive_days: Option<i64>,
    pub expire_date: Option<i64>,
    /// Reserved trailing column, kept verbatim.
    pub reserved: Option<String>,
}

/// One record of the passwd database, with shadow attributes joined on
/// load when the shadow file was readable.
///
/// Records are plain snapshots: the owning store replaces them wholesale
/// on every reload, and mutations go through [`crate::UserEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    name: String,
    /// Password placeholder column, normally `x`.
    pub password: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: String,
    pub dir: String,
    pub shell: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowInfo>,
}

impl User {
    pub(crate) fn from_columns(
        name: String,
        password: String,
        uid: u32,
        gid: u32,
        gecos: String,
        dir: String,
        shell: String,
    ) -> Self {
        Self {
            name,
            password,
            uid,
            gid,
            gecos,
            dir,
            shell,
            shadow: None,
        }
    }

    /// The login name. Immutable: renaming is not supported.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Fields for a user to be created with `useradd`.
///
/// Only fields actually set become command-line flags; everything left
/// `None` falls to the tool's own defaults.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    /// Pre-encrypted password, applied via `chpasswd -e` over stdin.
    pub password: Option<String>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub gecos: Option<String>,
    pub dir: Option<String>,
    pub shell: Option<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::MissingName);
        }
        check_colon("name", &self.name)?;
        if let Some(password) = &self.password {
            check_colon("password", password)?;
        }
        if let Some(gecos) = &self.gecos {
            check_colon("gecos", gecos)?;
        }
        if let Some(dir) = &self.dir {
            check_colon("dir", dir)?;
        }
        if let Some(shell) = &self.shell {
            check_colon("shell", shell)?;
        }
        Ok(())
    }
}

/// A single mutable field of a user record.
///
/// The enum is closed: anything outside it is rejected at compile time,
/// and each variant maps to exactly one flag of `usermod` or `chage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserChange {
    Uid(u32),
    Gid(u32),
    Gecos(String),
    Shell(String),
    LastChange(i64),
    MinDays(i64),
    MaxDays(i64),
    WarnDays(i64),
    InactiveDays(i64),
    ExpireDate(i64),
}

impl UserChange {
    /// Resolve a change from a string field name, for callers that carry
    /// field names dynamically (e.g. deserialized desired state).
    pub fn from_field(field: &str, value: &str) -> Result<Self> {
        match field {
            "uid" => Ok(UserChange::Uid(parse_num("uid", value)?)),
            "gid" => Ok(UserChange::Gid(parse_num("gid", value)?)),
            "gecos" => Ok(UserChange::Gecos(value.to_string())),
            "shell" => Ok(UserChange::Shell(value.to_string())),
            "last_change" => Ok(UserChange::LastChange(parse_num("last_change", value)?)),
            "min_days" => Ok(UserChange::MinDays(parse_num("min_days", value)?)),
            "max_days" => Ok(UserChange::MaxDays(parse_num("max_days", value)?)),
            "warn_days" => Ok(UserChange::WarnDays(parse_num("warn_days", value)?)),
            "inactive_days" => Ok(UserChange::InactiveDays(parse_num("inactive_days", value)?)),
            "expire_date" => Ok(UserChange::ExpireDate(parse_num("expire_date", value)?)),
            // Recognized columns with no corresponding tool flag.
            "name" => Err(Error::UnsupportedField { field: "name" }),
            "password" => Err(Error::UnsupportedField { field: "password" }),
            "dir" => Err(Error::UnsupportedField { field: "dir" }),
            _ => Err(Error::UnknownField {
                kind: "user",
                field: field.to_string(),
            }),
        }
    }

    pub(crate) fn field(&self) -> &'static str {
        match self {
            UserChange::Uid(_) => "uid",
            UserChange::Gid(_) => "gid",
            UserChange::Gecos(_) => "gecos",
            UserChange::Shell(_) => "shell",
            UserChange::LastChange(_) => "last_change",
            UserChange::MinDays(_) => "min_days",
            UserChange::MaxDays(_) => "max_days",
            UserChange::WarnDays(_) => "warn_days",
            UserChange::InactiveDays(_) => "inactive_days",
            UserChange::ExpireDate(_) => "expire_date",
        }
    }

    /// The tool that applies this change.
    pub(crate) fn program(&self) -> &'static str {
        match self {
            UserChange::Uid(_)
            | UserChange::Gid(_)
            | UserChange::Gecos(_)
            | UserChange::Shell(_) => USERMOD,
            _ => CHAGE,
        }
    }

    pub(crate) fn flag(&self) -> &'static str {
        match self {
            UserChange::Uid(_) => "-u",
            UserChange::Gid(_) => "-g",
            UserChange::Gecos(_) => "-c",
            UserChange::Shell(_) => "-s",
            UserChange::LastChange(_) => "-d",
            UserChange::MinDays(_) => "-m",
            UserChange::MaxDays(_) => "-M",
            UserChange::WarnDays(_) => "-W",
            UserChange::InactiveDays(_) => "-I",
            UserChange::ExpireDate(_) => "-E",
        }
    }

    pub(crate) fn value_string(&self) -> String {
        match self {
            UserChange::Uid(v) | UserChange::Gid(v) => v.to_string(),
            UserChange::Gecos(v) | UserChange::Shell(v) => v.clone(),
            UserChange::LastChange(v)
            | UserChange::MinDays(v)
            | UserChange::MaxDays(v)
            | UserChange::WarnDays(v)
            | UserChange::InactiveDays(v)
            | UserChange::ExpireDate(v) => v.to_string(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            UserChange::Gecos(v) => check_colon("gecos", v),
            UserChange::Shell(v) => check_colon("shell", v),
            _ => Ok(()),
        }
    }

    /// Whether the record already carries this value (the no-op case).
    pub(crate) fn matches(&self, user: &User) -> bool {
        let aging = |get: fn(&ShadowInfo) -> Option<i64>| user.shadow.as_ref().and_then(get);
        match self {
            UserChange::Uid(v) => user.uid == *v,
            UserChange::Gid(v) => user.gid == *v,
            UserChange::Gecos(v) => user.gecos == *v,
            UserChange::Shell(v) => user.shell == *v,
            UserChange::LastChange(v) => aging(|s| s.last_change) == Some(*v),
            UserChange::MinDays(v) => aging(|s| s.min_days) == Some(*v),
            UserChange::MaxDays(v) => aging(|s| s.max_days) == Some(*v),
            UserChange::WarnDays(v) => aging(|s| s.warn_days) == Some(*v),
            UserChange::InactiveDays(v) => aging(|s| s.inactive_days) == Some(*v),
            UserChange::ExpireDate(v) => aging(|s| s.expire_date) == Some(*v),
        }
    }
}

/// An object-style change set, applied field by field in a fixed order
/// (uid, gid, gecos, shell, then the aging fields) with a stop at the
/// first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub gecos: Option<String>,
    pub shell: Option<String>,
    pub last_change: Option<i64>,
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
    pub warn_days: Option<i64>,
    pub inactive_days: Option<i64>,
    pub expire_date: Option<i64>,
}

impl UserChanges {
    /// The changes present, in application order.
    pub(crate) fn to_list(&self) -> Vec<UserChange> {
        let mut list = Vec::new();
        if let Some(v) = self.uid {
            list.push(UserChange::Uid(v));
        }
        if let Some(v) = self.gid {
            list.push(UserChange::Gid(v));
        }
        if let Some(v) = &self.gecos {
            list.push(UserChange::Gecos(v.clone()));
        }
        if let Some(v) = &self.shell {
            list.push(UserChange::Shell(v.clone()));
        }
        if let Some(v) = self.last_change {
            list.push(UserChange::LastChange(v));
        }
        if let Some(v) = self.min_days {
            list.push(UserChange::MinDays(v));
        }
        if let Some(v) = self.max_days {
            list.push(UserChange::MaxDays(v));
        }
        if let Some(v) = self.warn_days {
            list.push(UserChange::WarnDays(v));
        }
        if let Some(v) = self.inactive_days {
            list.push(UserChange::InactiveDays(v));
        }
        if let Some(v) = self.expire_date {
            list.push(UserChange::ExpireDate(v));
        }
        list
    }
}

impl From<&User> for UserChanges {
    /// Every settable field of an existing record, e.g. to converge one
    /// account onto the state of another.
    fn from(user: &User) -> Self {
        let shadow = user.shadow.as_ref();
        Self {
            uid: Some(user.uid),
            gid: Some(user.gid),
            gecos: Some(user.gecos.clone()),
            shell: Some(user.shell.clone()),
            last_change: shadow.and_then(|s| s.last_change),
            min_days: shadow.and_then(|s| s.min_days),
            max_days: shadow.and_then(|s| s.max_days),
            warn_days: shadow.and_then(|s| s.warn_days),
            inactive_days: shadow.and_then(|s| s.inactive_days),
            expire_date: shadow.and_then(|s| s.expire_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_state_classify() {
        assert_eq!(PasswordState::classify(""), PasswordState::NoPassword);
        assert_eq!(PasswordState::classify("!"), PasswordState::Locked);
        assert_eq!(PasswordState::classify("!$6$abc"), PasswordState::Locked);
        assert_eq!(PasswordState::classify("*"), PasswordState::Disabled);
        assert_eq!(PasswordState::classify("$6$abc"), PasswordState::Set);
    }

    #[test]
    fn test_from_field_unknown() {
        let err = UserChange::from_field("nickname", "x").unwrap_err();
        assert!(matches!(err, Error::UnknownField { kind: "user", .. }));
    }

    #[test]
    fn test_from_field_unsupported() {
        for field in ["name", "password", "dir"] {
            let err = UserChange::from_field(field, "x").unwrap_err();
            assert!(matches!(err, Error::UnsupportedField { .. }), "{field}");
        }
    }

    #[test]
    fn test_from_field_bad_number() {
        let err = UserChange::from_field("uid", "forty-two").unwrap_err();
        assert!(matches!(err, Error::InvalidNumber { field: "uid", .. }));
    }

    #[test]
    fn test_changes_application_order() {
        let changes = UserChanges {
            shell: Some("/bin/zsh".into()),
            uid: Some(1000),
            max_days: Some(90),
            ..Default::default()
        };
        let fields: Vec<&str> = changes.to_list().iter().map(|c| c.field()).collect();
        assert_eq!(fields, vec!["uid", "shell", "max_days"]);
    }

    #[test]
    fn test_new_user_rejects_colon() {
        let mut spec = NewUser::new("foo");
        spec.gecos = Some("Foo: bar".into());
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, Error::ColonInValue { field: "gecos", .. }));
    }

    #[test]
    fn test_new_user_requires_name() {
        let spec = NewUser::default();
        assert!(matches!(spec.validate().unwrap_err(), Error::MissingName));
    }
}
