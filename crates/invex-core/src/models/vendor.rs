//! Supplier identities known to the extraction engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A supplier with a known invoice layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    /// Klingspor Schleifsysteme GmbH & Co. KG.
    Klingspor,
    /// August Rüggeberg GmbH & Co. KG (PFERD).
    Pferd,
    /// Mirka Ltd (Finland).
    Mirka,
    /// Adolf Würth GmbH & Co. KG.
    Wuerth,
    /// Würth Industrie Service GmbH & Co. KG.
    WuerthIndustrie,
    /// Hoffmann GmbH Qualitätswerkzeuge.
    Hoffmann,
    /// RHODIUS Schleifwerkzeuge GmbH & Co. KG.
    Rhodius,
    /// sia Abrasives Deutschland GmbH.
    Sia,
}

impl Vendor {
    /// All known vendors.
    pub const ALL: [Vendor; 8] = [
        Vendor::Klingspor,
        Vendor::Pferd,
        Vendor::Mirka,
        Vendor::Wuerth,
        Vendor::WuerthIndustrie,
        Vendor::Hoffmann,
        Vendor::Rhodius,
        Vendor::Sia,
    ];

    /// Stable lowercase key used in logs, config and file names.
    pub fn key(&self) -> &'static str {
        match self {
            Vendor::Klingspor => "klingspor",
            Vendor::Pferd => "pferd",
            Vendor::Mirka => "mirka",
            Vendor::Wuerth => "wuerth",
            Vendor::WuerthIndustrie => "wuerth_industrie",
            Vendor::Hoffmann => "hoffmann",
            Vendor::Rhodius => "rhodius",
            Vendor::Sia => "sia",
        }
    }

    /// Name written into the `vendor_name` column of every row.
    pub fn display_name(&self) -> &'static str {
        match self {
            Vendor::Klingspor => "Klingspor",
            Vendor::Pferd => "PFERD",
            Vendor::Mirka => "Mirka",
            Vendor::Wuerth => "Würth",
            Vendor::WuerthIndustrie => "Würth Industrie Service",
            Vendor::Hoffmann => "Hoffmann",
            Vendor::Rhodius => "Rhodius",
            Vendor::Sia => "sia Abrasives",
        }
    }

    /// Creditor account in the accounting system.
    pub fn creditor_number(&self) -> u32 {
        match self {
            Vendor::Klingspor => 70_010,
            Vendor::Pferd => 70_020,
            Vendor::Mirka => 70_030,
            Vendor::Wuerth => 70_040,
            Vendor::WuerthIndustrie => 70_041,
            Vendor::Hoffmann => 70_050,
            Vendor::Rhodius => 70_060,
            Vendor::Sia => 70_070,
        }
    }

    /// Look up a vendor by its key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.key() == key.trim().to_lowercase())
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        for vendor in Vendor::ALL {
            assert_eq!(Vendor::from_key(vendor.key()), Some(vendor));
        }
        assert_eq!(Vendor::from_key("Klingspor "), Some(Vendor::Klingspor));
        assert_eq!(Vendor::from_key("acme"), None);
    }

    #[test]
    fn test_creditor_numbers_unique() {
        let mut numbers: Vec<u32> = Vendor::ALL.iter().map(|v| v.creditor_number()).collect();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), Vendor::ALL.len());
    }
}
