//! Operation keys and the API areas they are published under.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SandboxError;

/// URL area an operation's template is served from (`/api/<area>/template/<key>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiArea {
    /// Token pool and transfer operations.
    Tokens,
    /// Broadcast and private messaging.
    Simple,
}

impl ApiArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tokens => "tokens",
            Self::Simple => "simple",
        }
    }

    /// Resolve an area by its path segment.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tokens" => Some(Self::Tokens),
            "simple" => Some(Self::Simple),
            _ => None,
        }
    }
}

impl fmt::Display for ApiArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One supported platform operation. Each key maps to exactly one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKey {
    /// Token pool creation.
    Pools,
    Mint,
    Burn,
    Transfer,
    /// Public message.
    Broadcast,
    /// Private send.
    Private,
}

impl OperationKey {
    pub const ALL: [OperationKey; 6] = [
        Self::Pools,
        Self::Mint,
        Self::Burn,
        Self::Transfer,
        Self::Broadcast,
        Self::Private,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pools => "pools",
            Self::Mint => "mint",
            Self::Burn => "burn",
            Self::Transfer => "transfer",
            Self::Broadcast => "broadcast",
            Self::Private => "private",
        }
    }

    pub fn area(&self) -> ApiArea {
        match self {
            Self::Pools | Self::Mint | Self::Burn | Self::Transfer => ApiArea::Tokens,
            Self::Broadcast | Self::Private => ApiArea::Simple,
        }
    }

    /// Path the delivery boundary serves this operation's template at.
    pub fn template_path(&self) -> String {
        format!("/api/{}/template/{}", self.area(), self.as_str())
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKey {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SandboxError::UnknownOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_keys() {
        for key in OperationKey::ALL {
            assert_eq!(key.as_str().parse::<OperationKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "nonexistent".parse::<OperationKey>().unwrap_err();
        assert_eq!(err, SandboxError::UnknownOperation("nonexistent".into()));
        assert!("".parse::<OperationKey>().is_err());
        assert!("Mint".parse::<OperationKey>().is_err());
    }

    #[test]
    fn test_template_paths() {
        assert_eq!(OperationKey::Pools.template_path(), "/api/tokens/template/pools");
        assert_eq!(OperationKey::Burn.template_path(), "/api/tokens/template/burn");
        assert_eq!(OperationKey::Broadcast.template_path(), "/api/simple/template/broadcast");
        assert_eq!(OperationKey::Private.template_path(), "/api/simple/template/private");
    }

    #[test]
    fn test_area_from_name() {
        assert_eq!(ApiArea::from_name("tokens"), Some(ApiArea::Tokens));
        assert_eq!(ApiArea::from_name("simple"), Some(ApiArea::Simple));
        assert_eq!(ApiArea::from_name("common"), None);
    }
}
