// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Ethernet MAC addresses as found in pipeline specs

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// A 48-bit MAC address, parsed from and displayed as `aa:bb:cc:dd:ee:ff`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mac(pub [u8; 6]);

impl FromStr for Mac {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::BadMac(s.to_string());
        let mut octets = [0u8; 6];
        let mut parts = s.split([':', '-']);
        for octet in &mut octets {
            let part = parts.next().ok_or_else(bad)?;
            if part.len() != 2 {
                return Err(bad());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| bad())?;
        }
        if parts.next().is_some() {
            return Err(bad());
        }
        Ok(Mac(octets))
    }
}

impl TryFrom<String> for Mac {
    type Error = ConfigError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Mac::from_str(&value)
    }
}

impl From<Mac> for String {
    fn from(mac: Mac) -> Self {
        mac.to_string()
    }
}

impl Display for Mac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::Mac;
    use std::str::FromStr;

    #[test]
    fn parse_and_display() {
        let mac = Mac::from_str("AA:bb:0c:00:01:ff").unwrap();
        assert_eq!(mac.0, [0xaa, 0xbb, 0x0c, 0x00, 0x01, 0xff]);
        assert_eq!(mac.to_string(), "aa:bb:0c:00:01:ff");
        assert_eq!(Mac::from_str("aa-bb-0c-00-01-ff").unwrap(), mac);
    }

    #[test]
    fn reject_malformed() {
        assert!(Mac::from_str("aa:bb:cc:dd:ee").is_err());
        assert!(Mac::from_str("aa:bb:cc:dd:ee:ff:00").is_err());
        assert!(Mac::from_str("aa:bb:cc:dd:ee:fg").is_err());
        assert!(Mac::from_str("a:bb:cc:dd:ee:ff").is_err());
    }
}
