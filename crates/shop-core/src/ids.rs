//! Platform Identifier Newtypes
//!
//! Snowflake-style numeric ids for the chat platform. Wrapped so a user id
//! can never be passed where a role id is expected.

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }
    };
}

id_type!(
    /// A platform member (purchaser) id
    UserId
);
id_type!(
    /// An entitlement role id
    RoleId
);
id_type!(
    /// A guild (server) id
    GuildId
);
id_type!(
    /// A text channel id
    ChannelId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parse_roundtrip() {
        let id: UserId = "123456789012345678".parse().unwrap();
        assert_eq!(id.get(), 123_456_789_012_345_678);
        assert_eq!(id.to_string(), "123456789012345678");
    }

    #[test]
    fn test_id_serde_transparent() {
        let json = serde_json::to_string(&RoleId(42)).unwrap();
        assert_eq!(json, "42");
        let back: RoleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RoleId(42));
    }
}
