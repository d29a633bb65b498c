//! Records from the group database.

use crate::constants::{GPASSWD, GROUPMOD};
use crate::error::{Error, Result};
use crate::models::{check_colon, parse_num};
use serde::{Deserialize, Serialize};

/// One record of the group database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    name: String,
    /// Password placeholder column, normally `x`.
    pub password: String,
    pub gid: u32,
    /// Member user names, in file order.
    pub members: Vec<String>,
}

impl Group {
    pub(crate) fn from_columns(
        name: String,
        password: String,
        gid: u32,
        members: Vec<String>,
    ) -> Self {
        Self {
            name,
            password,
            gid,
            members,
        }
    }

    /// The group name. Immutable: renaming is not supported.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Fields for a group to be created with `groupadd`.
///
/// A `None` gid is left to the tool; members are applied with
/// `gpasswd -M` after creation.
#[derive(Debug, Clone, Default)]
pub struct NewGroup {
    pub name: String,
    pub gid: Option<u32>,
    pub members: Vec<String>,
}

impl NewGroup {
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
        for member in &self.members {
            check_colon("members", member)?;
        }
        Ok(())
    }
}

/// A single mutable field of a group record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupChange {
    Gid(u32),
    /// Full replacement of the member list.
    Members(Vec<String>),
}

impl GroupChange {
    /// Resolve a change from a string field name; member lists are given
    /// comma-separated.
    pub fn from_field(field: &str, value: &str) -> Result<Self> {
        match field {
            "gid" => Ok(GroupChange::Gid(parse_num("gid", value)?)),
            "members" => {
                let members = if value.is_empty() {
                    Vec::new()
                } else {
                    value.split(',').map(str::to_string).collect()
                };
                Ok(GroupChange::Members(members))
            }
            "name" => Err(Error::UnsupportedField { field: "name" }),
            "password" => Err(Error::UnsupportedField { field: "password" }),
            _ => Err(Error::UnknownField {
                kind: "group",
                field: field.to_string(),
            }),
        }
    }

    pub(crate) fn field(&self) -> &'static str {
        match self {
            GroupChange::Gid(_) => "gid",
            GroupChange::Members(_) => "members",
        }
    }

    pub(crate) fn program(&self) -> &'static str {
        match self {
            GroupChange::Gid(_) => GROUPMOD,
            GroupChange::Members(_) => GPASSWD,
        }
    }

    pub(crate) fn flag(&self) -> &'static str {
        match self {
            GroupChange::Gid(_) => "-g",
            GroupChange::Members(_) => "-M",
        }
    }

    pub(crate) fn value_string(&self) -> String {
        match self {
            GroupChange::Gid(v) => v.to_string(),
            GroupChange::Members(list) => list.join(","),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            GroupChange::Members(list) => {
                for member in list {
                    check_colon("members", member)?;
                }
                Ok(())
            }
            GroupChange::Gid(_) => Ok(()),
        }
    }

    pub(crate) fn matches(&self, group: &Group) -> bool {
        match self {
            GroupChange::Gid(v) => group.gid == *v,
            GroupChange::Members(list) => &group.members == list,
        }
    }
}

/// Object-style change set for a group: gid first, then members, stopping
/// at the first failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupChanges {
    pub gid: Option<u32>,
    pub members: Option<Vec<String>>,
}

impl GroupChanges {
    pub(crate) fn to_list(&self) -> Vec<GroupChange> {
        let mut list = Vec::new();
        if let Some(v) = self.gid {
            list.push(GroupChange::Gid(v));
        }
        if let Some(v) = &self.members {
            list.push(GroupChange::Members(v.clone()));
        }
        list
    }
}

impl From<&Group> for GroupChanges {
    fn from(group: &Group) -> Self {
        Self {
            gid: Some(group.gid),
            members: Some(group.members.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_field_members_split() {
        let change = GroupChange::from_field("members", "root,admin").unwrap();
        assert_eq!(
            change,
            GroupChange::Members(vec!["root".into(), "admin".into()])
        );
    }

    #[test]
    fn test_from_field_members_empty() {
        let change = GroupChange::from_field("members", "").unwrap();
        assert_eq!(change, GroupChange::Members(Vec::new()));
    }

    #[test]
    fn test_from_field_unsupported_and_unknown() {
        assert!(matches!(
            GroupChange::from_field("name", "x").unwrap_err(),
            Error::UnsupportedField { field: "name" }
        ));
        assert!(matches!(
            GroupChange::from_field("color", "x").unwrap_err(),
            Error::UnknownField { kind: "group", .. }
        ));
    }

    #[test]
    fn test_member_colon_rejected() {
        let change = GroupChange::Members(vec!["ro:ot".into()]);
        assert!(matches!(
            change.validate().unwrap_err(),
            Error::ColonInValue { field: "members", .. }
        ));
    }
}
