//! Supported cloud vendors.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Cloud vendor tag.
///
/// The tag selects a facade implementation once, at lookup time; nothing in
/// the engine or the pipelines switches on it per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    TCloud,
    Aws,
    Azure,
    Gcp,
    HuaWei,
}

impl Vendor {
    /// All vendors, in the order pipelines and registries enumerate them.
    pub const ALL: [Vendor; 5] = [
        Vendor::TCloud,
        Vendor::Aws,
        Vendor::Azure,
        Vendor::Gcp,
        Vendor::HuaWei,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::TCloud => "tcloud",
            Vendor::Aws => "aws",
            Vendor::Azure => "azure",
            Vendor::Gcp => "gcp",
            Vendor::HuaWei => "huawei",
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcloud" => Ok(Vendor::TCloud),
            "aws" => Ok(Vendor::Aws),
            "azure" => Ok(Vendor::Azure),
            "gcp" => Ok(Vendor::Gcp),
            "huawei" => Ok(Vendor::HuaWei),
            other => Err(Error::invalid(format!("unknown vendor: {other}"))),
        }
    }
}
