use std::{fmt, ops::BitOr};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::exception::{ExcType, RunResult};

/// Access checks requested from [`FsContext::access`](super::FsContext::access).
///
/// `F_OK` is the empty mask and only tests existence; the others combine with `|`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessMode(u8);

impl AccessMode {
    pub const F_OK: Self = Self(0);
    pub const X_OK: Self = Self(1);
    pub const W_OK: Self = Self(2);
    pub const R_OK: Self = Self(4);

    /// Builds a mask from the guest's integer form.
    pub fn from_bits(bits: i64) -> RunResult<Self> {
        u8::try_from(bits)
            .ok()
            .filter(|b| b & !0b111 == 0)
            .map(Self)
            .ok_or_else(|| ExcType::value_error(format!("invalid access mode: {bits}")))
    }

    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag in `flag` is requested. `F_OK` is never "contained".
    #[must_use]
    pub fn contains(self, flag: Self) -> bool {
        flag.0 != 0 && self.0 & flag.0 == flag.0
    }

    #[must_use]
    pub fn is_existence_only(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AccessMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One named POSIX permission bit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PosixPermission {
    OwnerRead,
    OwnerWrite,
    OwnerExecute,
    GroupRead,
    GroupWrite,
    GroupExecute,
    OthersRead,
    OthersWrite,
    OthersExecute,
}

impl PosixPermission {
    #[must_use]
    pub fn bit(self) -> u32 {
        match self {
            Self::OwnerRead => 0o400,
            Self::OwnerWrite => 0o200,
            Self::OwnerExecute => 0o100,
            Self::GroupRead => 0o040,
            Self::GroupWrite => 0o020,
            Self::GroupExecute => 0o010,
            Self::OthersRead => 0o004,
            Self::OthersWrite => 0o002,
            Self::OthersExecute => 0o001,
        }
    }
}

/// Numeric POSIX permission bits, e.g. `Mode(0o644)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mode(pub u32);

impl Mode {
    /// Default for `mkdir`/`makedirs`, before the host umask applies.
    pub const DIR_DEFAULT: Self = Self(0o777);

    /// Read/write/execute masks across owner, group and others.
    const READ_ANY: u32 = 0o444;
    const WRITE_ANY: u32 = 0o222;
    const EXEC_ANY: u32 = 0o111;

    pub fn from_permissions(permissions: impl IntoIterator<Item = PosixPermission>) -> Self {
        Self(permissions.into_iter().fold(0, |bits, p| bits | p.bit()))
    }

    /// Named permissions set in this mode, owner first.
    #[must_use]
    pub fn permissions(self) -> Vec<PosixPermission> {
        PosixPermission::iter().filter(|p| self.0 & p.bit() != 0).collect()
    }

    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Whether each requested flag is granted to at least one of owner, group or others.
    ///
    /// `F_OK` alone is always granted.
    #[must_use]
    pub fn grants(self, access: AccessMode) -> bool {
        [
            (AccessMode::R_OK, Self::READ_ANY),
            (AccessMode::W_OK, Self::WRITE_ANY),
            (AccessMode::X_OK, Self::EXEC_ANY),
        ]
        .into_iter()
        .all(|(flag, mask)| !access.contains(flag) || self.0 & mask != 0)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0o{:03o}", self.0)
    }
}

impl From<PosixPermission> for Mode {
    fn from(permission: PosixPermission) -> Self {
        Self(permission.bit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_names_match_posix_spelling() {
        assert_eq!(PosixPermission::OthersExecute.to_string(), "OTHERS_EXECUTE");
        assert_eq!("GROUP_WRITE".parse::<PosixPermission>().unwrap(), PosixPermission::GroupWrite);
    }

    #[test]
    fn named_permissions_compose_to_bits() {
        let mode = Mode::from_permissions([
            PosixPermission::OwnerRead,
            PosixPermission::OwnerWrite,
            PosixPermission::GroupRead,
            PosixPermission::OthersRead,
        ]);
        assert_eq!(mode, Mode(0o644));
        assert_eq!(mode.permissions().len(), 4);
    }

    #[test]
    fn any_class_grants_a_flag() {
        assert!(Mode(0o004).grants(AccessMode::R_OK));
        assert!(Mode(0o020).grants(AccessMode::W_OK));
        assert!(!Mode(0o644).grants(AccessMode::X_OK));
        assert!(!Mode(0o444).grants(AccessMode::R_OK | AccessMode::W_OK));
        assert!(Mode(0).grants(AccessMode::F_OK));
    }

    #[test]
    fn access_bits_are_validated() {
        assert_eq!(AccessMode::from_bits(6).unwrap(), AccessMode::R_OK | AccessMode::W_OK);
        assert!(AccessMode::from_bits(8).is_err());
        assert!(AccessMode::from_bits(-1).is_err());
    }
}
