//! Domain primitive types used across the nscaps workspace.

use std::fmt;

use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::{alpha1, char, digit1},
    combinator::{all_consuming, map, map_res},
    sequence::{delimited, terminated},
};
use serde::{Deserialize, Serialize};

use crate::error::{NscapsError, Result};

/// Process identifier as seen from the initial PID namespace.
pub type Pid = u32;

/// User identifier.
pub type Uid = u32;

/// Stable identity of a namespace: its inode number on the nsfs filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceId(u64);

impl NamespaceId {
    /// Creates a namespace ID from an inode number.
    #[must_use]
    pub const fn new(ino: u64) -> Self {
        Self(ino)
    }

    /// Returns the inode number.
    #[must_use]
    pub const fn ino(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of Linux kernel namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceKind {
    /// Mount namespace (`CLONE_NEWNS`).
    Mnt,
    /// Control group namespace.
    Cgroup,
    /// Hostname and domain name namespace.
    Uts,
    /// System V IPC and POSIX message queue namespace.
    Ipc,
    /// User namespace; owns all other namespaces and forms its own hierarchy.
    User,
    /// PID namespace.
    Pid,
    /// Network namespace.
    Net,
    /// Time namespace.
    Time,
}

impl NamespaceKind {
    /// All namespace kinds in their canonical order.
    pub const ALL: [Self; 8] = [
        Self::Mnt,
        Self::Cgroup,
        Self::Uts,
        Self::Ipc,
        Self::User,
        Self::Pid,
        Self::Net,
        Self::Time,
    ];

    /// Returns the short name used in `/proc/<pid>/ns/` and in references
    /// such as `net:[4026531905]`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mnt => "mnt",
            Self::Cgroup => "cgroup",
            Self::Uts => "uts",
            Self::Ipc => "ipc",
            Self::User => "user",
            Self::Pid => "pid",
            Self::Net => "net",
            Self::Time => "time",
        }
    }

    /// Looks up a kind by its short name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Returns `true` for the user namespace kind.
    #[must_use]
    pub const fn is_user(self) -> bool {
        matches!(self, Self::User)
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A textual reference to a namespace, as accepted on the command line.
///
/// Either the kernel's `kind:[inode]` form or a bare inode number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceRef {
    /// Kind, if the reference named one.
    pub kind: Option<NamespaceKind>,
    /// Namespace identity.
    pub id: NamespaceId,
}

fn inode(input: &str) -> IResult<&str, u64> {
    map_res(digit1, str::parse::<u64>).parse(input)
}

fn typed_reference(input: &str) -> IResult<&str, (&str, u64)> {
    (terminated(alpha1, char(':')), delimited(char('['), inode, char(']'))).parse(input)
}

fn reference(input: &str) -> IResult<&str, (Option<&str>, u64)> {
    alt((
        map(typed_reference, |(name, ino)| (Some(name), ino)),
        map(inode, |ino| (None, ino)),
    ))
    .parse(input)
}

impl NamespaceRef {
    /// Parses `kind:[inode]` or a bare inode number.
    ///
    /// # Errors
    ///
    /// Returns [`NscapsError::InvalidReference`] for malformed input or an
    /// unknown namespace kind.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || NscapsError::InvalidReference {
            input: input.to_string(),
        };
        let (_, (name, ino)) = all_consuming(reference)
            .parse(input.trim())
            .map_err(|_| invalid())?;
        let kind = match name {
            Some(name) => Some(NamespaceKind::from_name(name).ok_or_else(invalid)?),
            None => None,
        };
        Ok(Self {
            kind,
            id: NamespaceId::new(ino),
        })
    }
}

impl fmt::Display for NamespaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "{kind}:[{}]", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// How far a process' capabilities reach into a target namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityLevel {
    /// No capabilities at all.
    #[default]
    None,
    /// The process' own effective capabilities.
    Effective,
    /// All capabilities.
    Full,
}

impl fmt::Display for CapabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "no capabilities"),
            Self::Effective => write!(f, "effective capabilities"),
            Self::Full => write!(f, "all capabilities"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_reference() {
        let r = NamespaceRef::parse("net:[4026531905]").expect("should parse");
        assert_eq!(r.kind, Some(NamespaceKind::Net));
        assert_eq!(r.id, NamespaceId::new(4_026_531_905));
        assert_eq!(r.to_string(), "net:[4026531905]");
    }

    #[test]
    fn parses_bare_inode() {
        let r = NamespaceRef::parse(" 4026531837 ").expect("should parse");
        assert_eq!(r.kind, None);
        assert_eq!(r.id.ino(), 4_026_531_837);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = NamespaceRef::parse("foo:[1]").expect_err("should fail");
        assert!(matches!(err, NscapsError::InvalidReference { .. }));
    }

    #[test]
    fn rejects_malformed_references() {
        for input in ["", "net:", "net:[]", "net:[12", "net[12]", "12x", "user:[-1]"] {
            assert!(NamespaceRef::parse(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in NamespaceKind::ALL {
            assert_eq!(NamespaceKind::from_name(kind.name()), Some(kind));
        }
        assert!(NamespaceKind::User.is_user());
        assert!(!NamespaceKind::Net.is_user());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&NamespaceKind::Cgroup).expect("should serialize");
        assert_eq!(json, r#""cgroup""#);
    }
}
