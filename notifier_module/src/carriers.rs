//! Carrier gateway routing for SMS-as-email.
//!
//! SMS delivery rides the carriers' email-to-SMS bridges: the message is
//! mailed to `<digits>@<gateway-domain>` and the carrier forwards it as a
//! text. No SMS provider account is involved.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// US carriers the product has shipped with. Deployments can extend or
/// override the table with a TOML file (`[gateways]` section).
const BUILTIN_GATEWAYS: &[(&str, &str)] = &[
    ("att", "txt.att.net"),
    ("tmobile", "tmomail.net"),
    ("verizon", "vtext.com"),
    ("sprint", "messaging.sprintpcs.com"),
];

static NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9]").unwrap());

#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("gateway file parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unknown carrier: {0}")]
    UnknownCarrier(String),
    #[error("phone number contains no digits: {0:?}")]
    EmptyPhone(String),
}

#[derive(Debug, Deserialize)]
struct GatewayFile {
    #[serde(default)]
    gateways: HashMap<String, String>,
}

/// Maps carrier names to their email-to-SMS gateway domains.
#[derive(Debug, Clone)]
pub struct CarrierGateways {
    domains: HashMap<String, String>,
}

impl CarrierGateways {
    pub fn builtin() -> Self {
        let domains = BUILTIN_GATEWAYS
            .iter()
            .map(|(carrier, domain)| (carrier.to_string(), domain.to_string()))
            .collect();
        Self { domains }
    }

    /// Builtin table plus the entries from a TOML file; file entries win
    /// on carrier-name collisions.
    pub fn load(path: &Path) -> Result<Self, CarrierError> {
        let contents = fs::read_to_string(path)?;
        let file: GatewayFile = toml::from_str(&contents)?;
        let mut table = Self::builtin();
        for (carrier, domain) in file.gateways {
            table
                .domains
                .insert(normalize_carrier(&carrier), domain.trim().to_string());
        }
        Ok(table)
    }

    pub fn domain(&self, carrier: &str) -> Option<&str> {
        self.domains
            .get(&normalize_carrier(carrier))
            .map(String::as_str)
    }

    /// Full gateway address for a phone/carrier pair, e.g.
    /// `5551234567@txt.att.net`.
    pub fn gateway_address(&self, phone: &str, carrier: &str) -> Result<String, CarrierError> {
        let digits = normalize_phone(phone);
        if digits.is_empty() {
            return Err(CarrierError::EmptyPhone(phone.to_string()));
        }
        let domain = self
            .domain(carrier)
            .ok_or_else(|| CarrierError::UnknownCarrier(carrier.trim().to_string()))?;
        Ok(format!("{}@{}", digits, domain))
    }
}

impl Default for CarrierGateways {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Strips formatting from a phone number, keeping digits only.
pub fn normalize_phone(phone: &str) -> String {
    NON_DIGITS.replace_all(phone, "").into_owned()
}

fn normalize_carrier(carrier: &str) -> String {
    carrier.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builtin_covers_shipped_carriers() {
        let gateways = CarrierGateways::builtin();
        assert_eq!(gateways.domain("att"), Some("txt.att.net"));
        assert_eq!(gateways.domain("tmobile"), Some("tmomail.net"));
        assert_eq!(gateways.domain("verizon"), Some("vtext.com"));
        assert_eq!(gateways.domain("sprint"), Some("messaging.sprintpcs.com"));
    }

    #[test]
    fn gateway_address_strips_phone_formatting() {
        let gateways = CarrierGateways::builtin();
        let address = gateways.gateway_address("(555) 123-4567", "att").unwrap();
        assert_eq!(address, "5551234567@txt.att.net");
    }

    #[test]
    fn carrier_lookup_is_case_insensitive() {
        let gateways = CarrierGateways::builtin();
        assert_eq!(
            gateways.gateway_address("5551234567", " Verizon ").unwrap(),
            "5551234567@vtext.com"
        );
    }

    #[test]
    fn unknown_carrier_is_an_error() {
        let gateways = CarrierGateways::builtin();
        let err = gateways.gateway_address("5551234567", "pigeon").unwrap_err();
        assert!(matches!(err, CarrierError::UnknownCarrier(name) if name == "pigeon"));
    }

    #[test]
    fn digitless_phone_is_an_error() {
        let gateways = CarrierGateways::builtin();
        let err = gateways.gateway_address("n/a", "att").unwrap_err();
        assert!(matches!(err, CarrierError::EmptyPhone(_)));
    }

    #[test]
    fn file_entries_extend_and_override_builtin() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gateways.toml");
        std::fs::write(
            &path,
            r#"[gateways]
boost = "sms.myboostmobile.com"
att = "mms.att.net"
"#,
        )
        .unwrap();

        let gateways = CarrierGateways::load(&path).unwrap();
        assert_eq!(gateways.domain("boost"), Some("sms.myboostmobile.com"));
        assert_eq!(gateways.domain("att"), Some("mms.att.net"));
        assert_eq!(gateways.domain("verizon"), Some("vtext.com"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let err = CarrierGateways::load(&temp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CarrierError::Io(_)));
    }
}
