//! Colon-delimited record parsing for passwd, group and shadow files.
//!
//! One record per non-empty line; lines are never rejected. Missing
//! trailing columns default to empty, and numeric columns that do not
//! parse are coerced to 0 with a warning — a malformed line must not
//! block the rest of the file.

use crate::models::group::Group;
use crate::models::user::{PasswordState, ShadowInfo, User};
use tracing::warn;

/// All user records in `text`, in file order.
pub fn users(text: &str) -> impl Iterator<Item = User> + '_ {
    records(text).map(|cols| {
        User::from_columns(
            cols.get(0),
            cols.get(1),
            cols.id(2, "uid"),
            cols.id(3, "gid"),
            cols.get(4),
            cols.get(5),
            cols.get(6),
        )
    })
}

/// All group records in `text`, in file order.
pub fn groups(text: &str) -> impl Iterator<Item = Group> + '_ {
    records(text).map(|cols| {
        let members = match cols.raw(3) {
            Some("") | None => Vec::new(),
            Some(list) => list.split(',').map(str::to_string).collect(),
        };
        Group::from_columns(cols.get(0), cols.get(1), cols.id(2, "gid"), members)
    })
}

/// All shadow entries in `text` as `(name, attributes)` pairs. Joining
/// onto user records is the store's job.
pub fn shadow_entries(text: &str) -> impl Iterator<Item = (String, ShadowInfo)> + '_ {
    records(text).map(|cols| {
        let info = ShadowInfo {
            state: PasswordState::classify(cols.raw(1).unwrap_or("")),
            last_change: cols.day(2),
            min_days: cols.day(3),
            max_days: cols.day(4),
            warn_days: cols.day(5),
            inactive_days: cols.day(6),
            expire_date: cols.day(7),
            reserved: cols.raw(8).filter(|s| !s.is_empty()).map(str::to_string),
        };
        (cols.get(0), info)
    })
}

fn records(text: &str) -> impl Iterator<Item = Columns<'_>> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| Columns(line.split(':').collect()))
}

struct Columns<'a>(Vec<&'a str>);

impl Columns<'_> {
    fn raw(&self, index: usize) -> Option<&str> {
        self.0.get(index).copied()
    }

    fn get(&self, index: usize) -> String {
        self.raw(index).unwrap_or("").to_string()
    }

    /// Lenient uid/gid column: junk reads as 0, as it always has for
    /// tools consuming these files.
    fn id(&self, index: usize, column: &str) -> u32 {
        let raw = self.raw(index).unwrap_or("");
        match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                warn!(column, value = raw, "non-numeric column coerced to 0");
                0
            }
        }
    }

    /// Optional day-count column: empty is absent, junk is absent with a
    /// warning.
    fn day(&self, index: usize) -> Option<i64> {
        let raw = self.raw(index)?;
        if raw.is_empty() {
            return None;
        }
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(value = raw, "non-numeric shadow column ignored");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_line() {
        let text = "root:x:0:0:root:/root:/bin/bash\n";
        let all: Vec<User> = users(text).collect();
        assert_eq!(all.len(), 1);
        let root = &all[0];
        assert_eq!(root.name(), "root");
        assert_eq!(root.password, "x");
        assert_eq!(root.uid, 0);
        assert_eq!(root.gid, 0);
        assert_eq!(root.gecos, "root");
        assert_eq!(root.dir, "/root");
        assert_eq!(root.shell, "/bin/bash");
        assert!(root.shadow.is_none());
    }

    #[test]
    fn test_parse_skips_empty_lines_and_crlf() {
        let text = "root:x:0:0:root:/root:/bin/bash\r\n\r\nbin:x:1:1:bin:/bin:/sbin/nologin\n\n";
        let names: Vec<String> = users(text).map(|u| u.name().to_string()).collect();
        assert_eq!(names, vec!["root", "bin"]);
    }

    #[test]
    fn test_parse_is_restartable() {
        let text = "root:x:0:0:root:/root:/bin/bash\n";
        assert_eq!(users(text).count(), 1);
        assert_eq!(users(text).count(), 1);
    }

    #[test]
    fn test_parse_nonnumeric_uid_coerced_to_zero() {
        let text = "odd:x:abc::odd user:/home/odd:/bin/sh\n";
        let user = users(text).next().unwrap();
        assert_eq!(user.uid, 0);
        assert_eq!(user.gid, 0);
    }

    #[test]
    fn test_parse_short_line_pads_empty() {
        let text = "stub:x:5:5\n";
        let user = users(text).next().unwrap();
        assert_eq!(user.uid, 5);
        assert_eq!(user.gecos, "");
        assert_eq!(user.shell, "");
    }

    #[test]
    fn test_parse_wheel_group() {
        let text = "wheel:x:10:root,admin\n";
        let group = groups(text).next().unwrap();
        assert_eq!(group.name(), "wheel");
        assert_eq!(group.gid, 10);
        assert_eq!(group.members, vec!["root", "admin"]);
    }

    #[test]
    fn test_parse_group_without_members() {
        let text = "nobody:x:65534:\n";
        let group = groups(text).next().unwrap();
        assert!(group.members.is_empty());
    }

    #[test]
    fn test_parse_shadow_states() {
        let text = "\
alice:$6$salt$hash:19000:0:99999:7:::
locked:!$6$salt$hash:19000::::::
disabled:*:19000::::::
fresh::19000::::::
";
        let entries: Vec<(String, ShadowInfo)> = shadow_entries(text).collect();
        assert_eq!(entries[0].1.state, PasswordState::Set);
        assert_eq!(entries[1].1.state, PasswordState::Locked);
        assert_eq!(entries[2].1.state, PasswordState::Disabled);
        assert_eq!(entries[3].1.state, PasswordState::NoPassword);
    }

    #[test]
    fn test_parse_shadow_aging_columns() {
        let text = "alice:$6$x:19000:1:90:7:30:20000:\n";
        let (name, info) = shadow_entries(text).next().unwrap();
        assert_eq!(name, "alice");
        assert_eq!(info.last_change, Some(19000));
        assert_eq!(info.min_days, Some(1));
        assert_eq!(info.max_days, Some(90));
        assert_eq!(info.warn_days, Some(7));
        assert_eq!(info.inactive_days, Some(30));
        assert_eq!(info.expire_date, Some(20000));
        assert!(info.reserved.is_none());
    }

    #[test]
    fn test_parse_shadow_empty_columns_absent() {
        let text = "bob:*:::::::\n";
        let (_, info) = shadow_entries(text).next().unwrap();
        assert_eq!(info.last_change, None);
        assert_eq!(info.max_days, None);
        assert_eq!(info.expire_date, None);
    }
}
