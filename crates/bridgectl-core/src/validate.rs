// ── Pre-submission validation ──
//
// Rules run in a fixed order and the first failure wins: WiFi mode rules,
// then the slot 4 target address.

use thiserror::Error;

use crate::role::RoleValue;
use crate::settings::Settings;

/// Minimum WPA2 passphrase length.
const MIN_PASSWORD_LEN: usize = 8;

/// The first rule a configuration breaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Device name (hostname) required for AP mode")]
    HostnameRequired,

    #[error("AP password: min 8 chars")]
    ApPasswordTooShort,

    #[error("Primary SSID required")]
    PrimarySsidRequired,

    /// `network` is 1-based.
    #[error("Network {network} password: min 8 chars")]
    NetworkPasswordTooShort { network: usize },

    #[error("Target IP required")]
    TargetIpRequired,

    #[error("Invalid IP: {token}")]
    InvalidIp { token: String },
}

/// Set but shorter than a WPA2 passphrase.
fn too_short(password: &str) -> bool {
    let len = password.chars().count();
    len > 0 && len < MIN_PASSWORD_LEN
}

/// Dotted quad with 1–3 digit octets, each at most 255.
fn is_ipv4(token: &str) -> bool {
    let octets: Vec<&str> = token.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|o| {
            (1..=3).contains(&o.len())
                && o.bytes().all(|b| b.is_ascii_digit())
                && o.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

/// Check `s` against every rule, in order.
pub fn validate(s: &Settings) -> Result<(), ValidationError> {
    match s.wifi_mode.as_str() {
        "0" => {
            if s.mdns_hostname.trim().is_empty() {
                return Err(ValidationError::HostnameRequired);
            }
            if too_short(&s.password) {
                return Err(ValidationError::ApPasswordTooShort);
            }
        }
        "1" => {
            if s.wifi_networks[0].ssid.trim().is_empty() {
                return Err(ValidationError::PrimarySsidRequired);
            }
            if let Some(i) = s.wifi_networks.iter().position(|n| too_short(&n.password)) {
                return Err(ValidationError::NetworkPasswordTooShort { network: i + 1 });
            }
        }
        _ => {}
    }

    // Transmit roles need a destination unless they broadcast.
    let d4 = RoleValue::decode(&s.device4_role);
    if !d4.is_disabled() && !d4.has_base("4") && !s.device4_auto_broadcast {
        let target = s.device4_target_ip.trim();
        if target.is_empty() {
            return Err(ValidationError::TargetIpRequired);
        }
        if let Some(bad) = target.split(',').map(str::trim).find(|t| !is_ipv4(t)) {
            return Err(ValidationError::InvalidIp {
                token: bad.to_owned(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ap_mode() -> Settings {
        Settings {
            wifi_mode: "0".into(),
            mdns_hostname: "uart-bridge".into(),
            ..Settings::default()
        }
    }

    fn client_mode() -> Settings {
        let mut s = Settings {
            wifi_mode: "1".into(),
            ..Settings::default()
        };
        s.wifi_networks[0].ssid = "home".into();
        s.wifi_networks[0].password = "correct horse".into();
        s
    }

    #[test]
    fn ap_mode_requires_hostname() {
        let s = Settings {
            mdns_hostname: "   ".into(),
            ..ap_mode()
        };
        assert_eq!(validate(&s), Err(ValidationError::HostnameRequired));
    }

    #[test]
    fn ap_password_min_length() {
        let s = Settings {
            password: "12345".into(),
            ..ap_mode()
        };
        let err = validate(&s).unwrap_err();
        assert_eq!(err.to_string(), "AP password: min 8 chars");

        // Empty means an open network.
        assert!(validate(&ap_mode()).is_ok());
    }

    #[test]
    fn client_mode_requires_primary_ssid() {
        let mut s = client_mode();
        s.wifi_networks[0].ssid = String::new();
        assert_eq!(validate(&s), Err(ValidationError::PrimarySsidRequired));
    }

    #[test]
    fn network_password_index_is_one_based() {
        let mut s = client_mode();
        s.wifi_networks[1].password = "abcd".into();
        let err = validate(&s).unwrap_err();
        assert_eq!(err.to_string(), "Network 2 password: min 8 chars");
    }

    #[test]
    fn invalid_ip_names_first_bad_token() {
        let s = Settings {
            device4_role: "1".into(),
            device4_target_ip: "10.0.0.1,999.1.1.1".into(),
            ..ap_mode()
        };
        let err = validate(&s).unwrap_err();
        assert_eq!(err.to_string(), "Invalid IP: 999.1.1.1");
    }

    #[test]
    fn target_ip_rules() {
        let s = Settings {
            device4_role: "3_1".into(),
            device4_target_ip: "  ".into(),
            ..ap_mode()
        };
        assert_eq!(validate(&s), Err(ValidationError::TargetIpRequired));

        // Auto-broadcast and the receive role need no target.
        let s = Settings {
            device4_auto_broadcast: true,
            device4_role: "1".into(),
            device4_target_ip: String::new(),
            ..ap_mode()
        };
        assert!(validate(&s).is_ok());
        let s = Settings {
            device4_role: "4".into(),
            device4_target_ip: String::new(),
            ..ap_mode()
        };
        assert!(validate(&s).is_ok());

        // Tokens are trimmed.
        let s = Settings {
            device4_role: "2".into(),
            device4_target_ip: " 192.168.4.2 , 192.168.4.3".into(),
            ..ap_mode()
        };
        assert!(validate(&s).is_ok());
    }

    #[test]
    fn all_rules_satisfied() {
        let mut s = client_mode();
        s.device4_role = "1".into();
        s.device4_target_ip = "192.168.1.50".into();
        assert_eq!(validate(&s), Ok(()));
    }

    #[test]
    fn ipv4_shape() {
        assert!(is_ipv4("0.0.0.0"));
        assert!(is_ipv4("255.255.255.255"));
        assert!(!is_ipv4("256.1.1.1"));
        assert!(!is_ipv4("1.1.1"));
        assert!(!is_ipv4("1.1.1.1.1"));
        assert!(!is_ipv4("a.b.c.d"));
        assert!(!is_ipv4("1..1.1"));
        assert!(!is_ipv4("1000.1.1.1"));
    }
}
