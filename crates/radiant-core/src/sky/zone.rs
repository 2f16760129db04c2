//! Time zones understood by gensky

use serde::{Deserialize, Serialize};

/// A time zone with a standard and a daylight-saving code
///
/// Serialized by its standard-time code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeZone {
    #[serde(rename = "YST")]
    Yukon,
    #[serde(rename = "PST")]
    Pacific,
    #[serde(rename = "MST")]
    Mountain,
    #[serde(rename = "CST")]
    Central,
    #[serde(rename = "EST")]
    Eastern,
    #[serde(rename = "GMT")]
    Greenwich,
    #[serde(rename = "CET")]
    CentralEuropean,
    #[serde(rename = "EET")]
    EasternEuropean,
    #[serde(rename = "AST")]
    Atlantic,
    #[serde(rename = "GST")]
    Gulf,
    #[serde(rename = "IST")]
    India,
    #[serde(rename = "JST")]
    Japan,
    #[serde(rename = "NZST")]
    NewZealand,
}

impl TimeZone {
    pub const ALL: [TimeZone; 13] = [
        Self::Yukon,
        Self::Pacific,
        Self::Mountain,
        Self::Central,
        Self::Eastern,
        Self::Greenwich,
        Self::CentralEuropean,
        Self::EasternEuropean,
        Self::Atlantic,
        Self::Gulf,
        Self::India,
        Self::Japan,
        Self::NewZealand,
    ];

    /// Local standard time code
    pub fn standard_code(&self) -> &'static str {
        match self {
            Self::Yukon => "YST",
            Self::Pacific => "PST",
            Self::Mountain => "MST",
            Self::Central => "CST",
            Self::Eastern => "EST",
            Self::Greenwich => "GMT",
            Self::CentralEuropean => "CET",
            Self::EasternEuropean => "EET",
            Self::Atlantic => "AST",
            Self::Gulf => "GST",
            Self::India => "IST",
            Self::Japan => "JST",
            Self::NewZealand => "NZST",
        }
    }

    /// Daylight saving time code
    pub fn daylight_code(&self) -> &'static str {
        match self {
            Self::Yukon => "YDT",
            Self::Pacific => "PDT",
            Self::Mountain => "MDT",
            Self::Central => "CDT",
            Self::Eastern => "EDT",
            Self::Greenwich => "BST",
            Self::CentralEuropean => "CEST",
            Self::EasternEuropean => "EEST",
            Self::Atlantic => "ADT",
            Self::Gulf => "GDT",
            Self::India => "IDT",
            Self::Japan => "JDT",
            Self::NewZealand => "NZDT",
        }
    }

    /// The code for one of the two tables, never both
    pub fn code(&self, is_dst: bool) -> &'static str {
        if is_dst {
            self.daylight_code()
        } else {
            self.standard_code()
        }
    }

    /// Look up a code in either table; the flag tells which one matched
    pub fn from_code(code: &str) -> Option<(TimeZone, bool)> {
        Self::ALL.iter().find_map(|zone| {
            if zone.standard_code() == code {
                Some((*zone, false))
            } else if zone.daylight_code() == code {
                Some((*zone, true))
            } else {
                None
            }
        })
    }
}
