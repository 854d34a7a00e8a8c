//! Breach catalog entries.

use serde::{Deserialize, Serialize};

/// One breach in the catalog.
///
/// Accepts the catalog's PascalCase keys (`Name`, `BreachDate`,
/// `DataClasses`, ...) as well as the camelCase and short keys some backends
/// emit (`breachDate`, `date`, `accounts`, `verified`). Serializes as
/// snake_case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachSummary {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Title")]
    pub title: Option<String>,
    #[serde(default, alias = "Domain")]
    pub domain: Option<String>,
    #[serde(default, alias = "BreachDate", alias = "breachDate", alias = "date")]
    pub breach_date: Option<String>,
    #[serde(default, alias = "PwnCount", alias = "pwnCount", alias = "accounts")]
    pub pwn_count: Option<u64>,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default, alias = "DataClasses", alias = "dataClasses")]
    pub data_classes: Vec<String>,
    #[serde(default, alias = "IsVerified", alias = "isVerified", alias = "verified")]
    pub is_verified: bool,
    #[serde(default, alias = "IsSensitive", alias = "isSensitive")]
    pub is_sensitive: bool,
    #[serde(default, alias = "IsSpamList", alias = "isSpamList")]
    pub is_spam_list: bool,
    #[serde(default, alias = "LogoPath", alias = "logoPath")]
    pub logo_path: Option<String>,
}

impl BreachSummary {
    /// Title when present, otherwise the catalog name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let json = r#"{
            "Name": "Adobe",
            "Title": "Adobe",
            "Domain": "adobe.com",
            "BreachDate": "2013-10-04",
            "PwnCount": 152445165,
            "DataClasses": ["Email addresses", "Password hints", "Passwords", "Usernames"],
            "IsVerified": true,
            "IsSensitive": false,
            "IsSpamList": false,
            "LogoPath": "https://example.com/Adobe.png"
        }"#;
        let breach: BreachSummary = serde_json::from_str(json).unwrap();
        assert_eq!(breach.name, "Adobe");
        assert_eq!(breach.pwn_count, Some(152_445_165));
        assert_eq!(breach.data_classes.len(), 4);
        assert!(breach.is_verified);
    }

    #[test]
    fn test_backend_sample_shape() {
        let json = r#"{
            "name": "LinkedIn",
            "date": "2012-06-05",
            "accounts": 164000000,
            "description": "Professional networking platform breach",
            "verified": true
        }"#;
        let breach: BreachSummary = serde_json::from_str(json).unwrap();
        assert_eq!(breach.display_title(), "LinkedIn");
        assert_eq!(breach.breach_date.as_deref(), Some("2012-06-05"));
        assert_eq!(breach.pwn_count, Some(164_000_000));
        assert!(breach.data_classes.is_empty());
    }
}
