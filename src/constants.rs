//! Centralized constants for database locations and tool names.

/// Default location of the passwd database.
pub const PASSWD_FILE: &str = "/etc/passwd";

/// Default location of the shadow database (readable by root only).
pub const SHADOW_FILE: &str = "/etc/shadow";

/// Default location of the group database.
pub const GROUP_FILE: &str = "/etc/group";

/// Tool for creating users.
pub const USERADD: &str = "useradd";

/// Tool for modifying passwd fields of an existing user.
pub const USERMOD: &str = "usermod";

/// Tool for deleting users.
pub const USERDEL: &str = "userdel";

/// Tool for creating groups.
pub const GROUPADD: &str = "groupadd";

/// Tool for modifying an existing group.
pub const GROUPMOD: &str = "groupmod";

/// Tool for deleting groups.
pub const GROUPDEL: &str = "groupdel";

/// Tool for administering group membership.
pub const GPASSWD: &str = "gpasswd";

/// Tool for changing password-aging attributes.
pub const CHAGE: &str = "chage";

/// Tool for setting passwords in batch over stdin.
pub const CHPASSWD: &str = "chpasswd";
