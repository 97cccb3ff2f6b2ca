//! Ethereum Address Handling
//! Mission: One canonical identity per voter regardless of input hex case

use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// A 20-byte Ethereum address. Parsing is case-insensitive; `Display`
/// renders the EIP-55 checksummed form, which is the canonical string
/// used for every database lookup and token claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 checksummed rendering: a hex letter is uppercased when the
    /// matching nibble of `keccak256(lowercase_hex)` is >= 8.
    pub fn checksummed(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                digest[i / 2] >> 4
            } else {
                digest[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed())
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s
            .trim()
            .strip_prefix("0x")
            .or_else(|| s.trim().strip_prefix("0X"))
            .ok_or(ParseAddressError)?;
        if hex_part.len() != 40 {
            return Err(ParseAddressError);
        }
        let bytes = hex::decode(hex_part).map_err(|_| ParseAddressError)?;
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&bytes);
        Ok(Address(addr))
    }
}

/// Rejected address input (wrong prefix, length, or non-hex characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseAddressError;

impl fmt::Display for ParseAddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid Ethereum address format")
    }
}

impl std::error::Error for ParseAddressError {}

#[cfg(test)]
mod tests {
    use super::*;

    // Checksum vectors published with EIP-55.
    const VECTORS: &[&str] = &[
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksum_vectors() {
        for vector in VECTORS {
            let parsed: Address = vector.to_lowercase().parse().unwrap();
            assert_eq!(parsed.to_string(), *vector);
        }
    }

    #[test]
    fn test_case_insensitive_identity() {
        let lower: Address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        let upper: Address = "0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED".parse().unwrap();
        let mixed: Address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap();

        assert_eq!(lower, upper);
        assert_eq!(lower, mixed);
        assert_eq!(lower.to_string(), mixed.to_string());
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!("".parse::<Address>().is_err());
        assert!("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse::<Address>().is_err());
        assert!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAe".parse::<Address>().is_err());
        assert!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed00".parse::<Address>().is_err());
        assert!("0xZZZeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse::<Address>().is_err());
    }

    #[test]
    fn test_roundtrip_through_display() {
        let addr: Address = "0xd1220a0cf47c7b9be7a2e6ba89f429762e7b9adb".parse().unwrap();
        let rendered = addr.to_string();
        let reparsed: Address = rendered.parse().unwrap();
        assert_eq!(addr, reparsed);
    }
}
