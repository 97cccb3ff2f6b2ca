//! Contract ABI Helpers
//! Mission: Build call data and decode return data for the voting contract

use anyhow::{anyhow, bail, Result};
use sha3::{Digest, Keccak256};

/// A call parameter. Only the types the voting contract uses.
#[derive(Debug, Clone)]
pub enum Token {
    Uint(u64),
    Address([u8; 20]),
    Str(String),
}

/// First four bytes of the Keccak-256 hash of the canonical signature,
/// e.g. `balanceOf(address)` -> `0x70a08231`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

fn u64_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn address_word(addr: &[u8; 20]) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(addr);
    word
}

/// Encode a contract call as `0x`-prefixed hex: selector followed by the
/// head/tail parameter layout (dynamic values referenced by offset).
pub fn encode_call(signature: &str, tokens: &[Token]) -> String {
    let head_len = 32 * tokens.len();
    let mut head: Vec<u8> = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for token in tokens {
        match token {
            Token::Uint(v) => head.extend_from_slice(&u64_word(*v)),
            Token::Address(a) => head.extend_from_slice(&address_word(a)),
            Token::Str(s) => {
                let offset = (head_len + tail.len()) as u64;
                head.extend_from_slice(&u64_word(offset));

                let bytes = s.as_bytes();
                tail.extend_from_slice(&u64_word(bytes.len() as u64));
                tail.extend_from_slice(bytes);
                let padding = (32 - bytes.len() % 32) % 32;
                tail.extend(std::iter::repeat(0u8).take(padding));
            }
        }
    }

    let mut data = Vec::with_capacity(4 + head.len() + tail.len());
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(&head);
    data.extend_from_slice(&tail);

    format!("0x{}", hex::encode(data))
}

/// Decode an `eth_call` result (`0x`-prefixed hex) into raw bytes.
pub fn strip_result(result: &str) -> Result<Vec<u8>> {
    let trimmed = result.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(hex_part).map_err(|e| anyhow!("Return data is not valid hex: {}", e))
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8]> {
    data.get(offset..offset + 32)
        .ok_or_else(|| anyhow!("Return data truncated at offset {}", offset))
}

fn u64_at(data: &[u8], offset: usize) -> Result<u64> {
    let word = word_at(data, offset)?;
    if word[..24].iter().any(|&b| b != 0) {
        bail!("Integer at offset {} overflows u64", offset);
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(bytes))
}

fn string_at(data: &[u8], offset: usize) -> Result<String> {
    let len = u64_at(data, offset)? as usize;
    let bytes = data
        .get(offset + 32..offset + 32 + len)
        .ok_or_else(|| anyhow!("String at offset {} runs past return data", offset))?;
    String::from_utf8(bytes.to_vec()).map_err(|_| anyhow!("String at offset {} is not UTF-8", offset))
}

pub fn decode_bool(data: &[u8]) -> Result<bool> {
    let word = word_at(data, 0)?;
    Ok(word.iter().any(|&b| b != 0))
}

pub fn decode_u64(data: &[u8]) -> Result<u64> {
    u64_at(data, 0)
}

pub fn decode_u64_pair(data: &[u8]) -> Result<(u64, u64)> {
    Ok((u64_at(data, 0)?, u64_at(data, 32)?))
}

/// Decode `(uint256 id, string name, string party, uint256 voteCount)[]`
/// as returned by `getAllCandidates()`.
pub fn decode_candidates(data: &[u8]) -> Result<Vec<(u64, String, String, u64)>> {
    let array_offset = u64_at(data, 0)? as usize;
    let count = u64_at(data, array_offset)? as usize;
    if count > 10_000 {
        bail!("Implausible candidate count: {}", count);
    }

    let elements = array_offset + 32;
    let mut candidates = Vec::with_capacity(count);
    for i in 0..count {
        // Dynamic tuples are referenced by offset relative to the start
        // of the element area.
        let element_offset = u64_at(data, elements + 32 * i)? as usize;
        let base = elements + element_offset;

        let id = u64_at(data, base)?;
        let name_offset = u64_at(data, base + 32)? as usize;
        let party_offset = u64_at(data, base + 64)? as usize;
        let vote_count = u64_at(data, base + 96)?;

        let name = string_at(data, base + name_offset)?;
        let party = string_at(data, base + party_offset)?;

        candidates.push((id, name, party, vote_count));
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
    }

    #[test]
    fn test_encode_uint_call() {
        let data = encode_call("vote(uint256)", &[Token::Uint(5)]);
        // selector + one 32-byte word
        assert_eq!(data.len(), 2 + 8 + 64);
        assert!(data.ends_with(&format!("{:0>64}", "5")));
    }

    #[test]
    fn test_encode_address_call() {
        let mut addr = [0u8; 20];
        addr[19] = 0xab;
        let data = encode_call("balanceOf(address)", &[Token::Address(addr)]);
        assert_eq!(data, format!("0x70a08231{:0>64}", hex::encode(addr)));
    }

    #[test]
    fn test_encode_string_call_layout() {
        let data = encode_call(
            "addCandidate(string,string)",
            &[Token::Str("Alice".to_string()), Token::Str("Unity".to_string())],
        );
        let bytes = strip_result(&data[10..]).unwrap(); // drop "0x" + selector

        // Head: offsets to the two string tails
        assert_eq!(u64_at(&bytes, 0).unwrap(), 64);
        assert_eq!(u64_at(&bytes, 32).unwrap(), 128);
        // Tails: length-prefixed, padded to 32 bytes
        assert_eq!(string_at(&bytes, 64).unwrap(), "Alice");
        assert_eq!(string_at(&bytes, 128).unwrap(), "Unity");
        assert_eq!(bytes.len(), 192);
    }

    #[test]
    fn test_decode_bool_and_uint() {
        let mut data = vec![0u8; 32];
        assert!(!decode_bool(&data).unwrap());
        data[31] = 1;
        assert!(decode_bool(&data).unwrap());
        assert_eq!(decode_u64(&data).unwrap(), 1);

        let mut pair = vec![0u8; 64];
        pair[31] = 10;
        pair[63] = 20;
        assert_eq!(decode_u64_pair(&pair).unwrap(), (10, 20));
    }

    #[test]
    fn test_decode_rejects_truncated_data() {
        assert!(decode_bool(&[0u8; 16]).is_err());
        assert!(decode_u64_pair(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_decode_candidates() {
        // Hand-built return data for one candidate:
        // (id=1, name="Alice", party="Unity", voteCount=5)
        let mut data = Vec::new();
        let w = |data: &mut Vec<u8>, v: u64| data.extend_from_slice(&u64_word(v));
        let s = |data: &mut Vec<u8>, text: &str| {
            w(data, text.len() as u64);
            let mut padded = text.as_bytes().to_vec();
            padded.resize(32, 0);
            data.extend_from_slice(&padded);
        };

        w(&mut data, 0x20); // offset to array
        w(&mut data, 1); // length
        w(&mut data, 0x20); // element 0 offset (relative to element area)
        w(&mut data, 1); // id
        w(&mut data, 0x80); // name offset (relative to tuple base)
        w(&mut data, 0xc0); // party offset
        w(&mut data, 5); // voteCount
        s(&mut data, "Alice");
        s(&mut data, "Unity");

        let candidates = decode_candidates(&data).unwrap();
        assert_eq!(
            candidates,
            vec![(1, "Alice".to_string(), "Unity".to_string(), 5)]
        );
    }

    #[test]
    fn test_decode_candidates_empty() {
        let mut data = Vec::new();
        data.extend_from_slice(&u64_word(0x20));
        data.extend_from_slice(&u64_word(0));
        assert!(decode_candidates(&data).unwrap().is_empty());
    }
}
