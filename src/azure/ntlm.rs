//! NTLMv2 message construction for HTTP authentication against Azure DevOps Server.
//!
//! Only the pieces needed by a client are implemented: the NEGOTIATE message,
//! parsing of the server CHALLENGE and the AUTHENTICATE message with an
//! NTLMv2 response. No signing or sealing is negotiated.

use hmac::{Hmac, Mac};
use md4::{Digest, Md4};
use md5::Md5;

type HmacMd5 = Hmac<Md5>;

const SIGNATURE: &[u8; 8] = b"NTLMSSP\0";

const NEGOTIATE_UNICODE: u32 = 0x0000_0001;
const REQUEST_TARGET: u32 = 0x0000_0004;
const NEGOTIATE_NTLM: u32 = 0x0000_0200;
const NEGOTIATE_ALWAYS_SIGN: u32 = 0x0000_8000;
const NEGOTIATE_EXTENDED_SESSIONSECURITY: u32 = 0x0008_0000;
const NEGOTIATE_TARGET_INFO: u32 = 0x0080_0000;
const NEGOTIATE_128: u32 = 0x2000_0000;
const NEGOTIATE_56: u32 = 0x8000_0000;

const NEGOTIATE_FLAGS: u32 = NEGOTIATE_UNICODE
    | REQUEST_TARGET
    | NEGOTIATE_NTLM
    | NEGOTIATE_ALWAYS_SIGN
    | NEGOTIATE_EXTENDED_SESSIONSECURITY
    | NEGOTIATE_128
    | NEGOTIATE_56;

const AV_EOL: u16 = 0;
const AV_TIMESTAMP: u16 = 7;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_EPOCH_OFFSET: i64 = 11_644_473_600;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub domain: String,
    pub workstation: String,
}

/// Parsed CHALLENGE message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub flags: u32,
    pub server_challenge: [u8; 8],
    pub target_info: Vec<u8>,
}

impl Challenge {
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < 32 || &bytes[..8] != SIGNATURE {
            return Err("missing NTLMSSP signature".to_string());
        }
        if read_u32(bytes, 8) != 2 {
            return Err(format!("expected message type 2, got {}", read_u32(bytes, 8)));
        }

        let flags = read_u32(bytes, 20);
        let mut server_challenge = [0u8; 8];
        server_challenge.copy_from_slice(&bytes[24..32]);

        let target_info = if flags & NEGOTIATE_TARGET_INFO != 0 && bytes.len() >= 48 {
            let len = read_u16(bytes, 40) as usize;
            let offset = read_u32(bytes, 44) as usize;
            bytes
                .get(offset..offset + len)
                .ok_or_else(|| "target info out of bounds".to_string())?
                .to_vec()
        } else {
            Vec::new()
        };

        Ok(Self {
            flags,
            server_challenge,
            target_info,
        })
    }

    /// Server timestamp (`MsvAvTimestamp`) from the target info, if present.
    pub fn timestamp(&self) -> Option<u64> {
        let mut pos = 0;
        while pos + 4 <= self.target_info.len() {
            let id = read_u16(&self.target_info, pos);
            let len = read_u16(&self.target_info, pos + 2) as usize;
            let value = self.target_info.get(pos + 4..pos + 4 + len)?;
            match id {
                AV_EOL => return None,
                AV_TIMESTAMP if len == 8 => {
                    return Some(u64::from_le_bytes(value.try_into().ok()?));
                }
                _ => pos += 4 + len,
            }
        }
        None
    }
}

pub fn negotiate_message() -> Vec<u8> {
    let mut message = Vec::with_capacity(32);
    message.extend_from_slice(SIGNATURE);
    message.extend_from_slice(&1u32.to_le_bytes());
    message.extend_from_slice(&NEGOTIATE_FLAGS.to_le_bytes());
    // Empty domain and workstation security buffers.
    message.extend_from_slice(&[0u8; 16]);
    message
}

/// Builds the AUTHENTICATE message answering `challenge`.
///
/// `timestamp` is a Windows FILETIME; it is replaced by the server timestamp
/// when the challenge carries one.
pub fn authenticate_message(
    credentials: &Credentials,
    challenge: &Challenge,
    client_challenge: [u8; 8],
    timestamp: u64,
) -> Vec<u8> {
    let response_key = ntowf_v2(
        &credentials.password,
        &credentials.username,
        &credentials.domain,
    );

    let server_timestamp = challenge.timestamp();
    let temp = ntlm_v2_temp(
        server_timestamp.unwrap_or(timestamp),
        client_challenge,
        &challenge.target_info,
    );
    let nt_proof = hmac_md5(&response_key, &[&challenge.server_challenge[..], temp.as_slice()]);
    let mut nt_response = nt_proof.to_vec();
    nt_response.extend_from_slice(&temp);

    // With a server timestamp the LM response must be zeroed.
    let lm_response = if server_timestamp.is_some() {
        vec![0u8; 24]
    } else {
        lm_v2_response(&response_key, &challenge.server_challenge, client_challenge)
    };

    let domain = utf16le(&credentials.domain);
    let user = utf16le(&credentials.username);
    let workstation = utf16le(&credentials.workstation);

    let header_len = 64u32;
    let mut payload = Vec::new();
    let mut buffers = Vec::new();
    for field in [&lm_response, &nt_response, &domain, &user, &workstation] {
        buffers.push((field.len() as u16, header_len + payload.len() as u32));
        payload.extend_from_slice(field);
    }

    let mut message = Vec::with_capacity(header_len as usize + payload.len());
    message.extend_from_slice(SIGNATURE);
    message.extend_from_slice(&3u32.to_le_bytes());
    for (len, offset) in buffers {
        write_security_buffer(&mut message, len, offset);
    }
    // Empty encrypted random session key.
    write_security_buffer(&mut message, 0, header_len + payload.len() as u32);
    message.extend_from_slice(&(challenge.flags & NEGOTIATE_FLAGS).to_le_bytes());
    message.extend_from_slice(&payload);
    message
}

pub fn current_filetime() -> u64 {
    let now = chrono::Utc::now();
    let seconds = (now.timestamp() + FILETIME_EPOCH_OFFSET) as u64;
    seconds * 10_000_000 + u64::from(now.timestamp_subsec_nanos() / 100)
}

fn nt_hash(password: &str) -> [u8; 16] {
    Md4::digest(utf16le(password)).into()
}

fn ntowf_v2(password: &str, username: &str, domain: &str) -> [u8; 16] {
    let identity = utf16le(&format!("{}{}", username.to_uppercase(), domain));
    hmac_md5(&nt_hash(password), &[identity.as_slice()])
}

fn lm_v2_response(
    response_key: &[u8; 16],
    server_challenge: &[u8; 8],
    client_challenge: [u8; 8],
) -> Vec<u8> {
    let mut response =
        hmac_md5(response_key, &[&server_challenge[..], &client_challenge[..]]).to_vec();
    response.extend_from_slice(&client_challenge);
    response
}

fn ntlm_v2_temp(timestamp: u64, client_challenge: [u8; 8], target_info: &[u8]) -> Vec<u8> {
    let mut temp = vec![0x01, 0x01, 0, 0, 0, 0, 0, 0];
    temp.extend_from_slice(&timestamp.to_le_bytes());
    temp.extend_from_slice(&client_challenge);
    temp.extend_from_slice(&[0u8; 4]);
    temp.extend_from_slice(target_info);
    temp.extend_from_slice(&[0u8; 4]);
    temp
}

fn hmac_md5(key: &[u8], parts: &[&[u8]]) -> [u8; 16] {
    let mut mac = HmacMd5::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

fn utf16le(value: &str) -> Vec<u8> {
    value.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn write_security_buffer(message: &mut Vec<u8>, len: u16, offset: u32) {
    message.extend_from_slice(&len.to_le_bytes());
    message.extend_from_slice(&len.to_le_bytes());
    message.extend_from_slice(&offset.to_le_bytes());
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Builds a CHALLENGE message carrying `target_info`.
    pub(crate) fn challenge_bytes(server_challenge: [u8; 8], target_info: &[u8]) -> Vec<u8> {
        let mut message = Vec::new();
        message.extend_from_slice(SIGNATURE);
        message.extend_from_slice(&2u32.to_le_bytes());
        write_security_buffer(&mut message, 0, 48);
        message.extend_from_slice(&(NEGOTIATE_FLAGS | NEGOTIATE_TARGET_INFO).to_le_bytes());
        message.extend_from_slice(&server_challenge);
        message.extend_from_slice(&[0u8; 8]);
        write_security_buffer(&mut message, target_info.len() as u16, 48);
        message.extend_from_slice(target_info);
        message
    }

    fn credentials() -> Credentials {
        Credentials {
            username: "User".into(),
            password: "Password".into(),
            domain: "Domain".into(),
            workstation: "COMPUTER".into(),
        }
    }

    #[test]
    fn nt_hash_matches_reference() {
        assert_eq!(hex(&nt_hash("Password")), "a4f49c406510bdcab6824ee7c30fd852");
    }

    #[test]
    fn ntowf_v2_matches_reference() {
        assert_eq!(
            hex(&ntowf_v2("Password", "User", "Domain")),
            "0c868a403bfd7a93a3001ef22ef02e3f"
        );
    }

    #[test]
    fn lm_v2_matches_reference() {
        let key = ntowf_v2("Password", "User", "Domain");
        let response = lm_v2_response(
            &key,
            &[0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef],
            [0xaa; 8],
        );
        assert_eq!(
            hex(&response),
            "86c35097ac9cec102554764a57cccc19aaaaaaaaaaaaaaaa"
        );
    }

    #[test]
    fn negotiate_message_layout() {
        let message = negotiate_message();
        assert_eq!(message.len(), 32);
        assert_eq!(&message[..8], SIGNATURE);
        assert_eq!(read_u32(&message, 8), 1);
        assert_eq!(read_u32(&message, 12), NEGOTIATE_FLAGS);
    }

    #[test]
    fn parses_challenge_and_target_info() {
        let target_info = [
            0x02, 0x00, 0x0c, 0x00, b'D', 0, b'o', 0, b'm', 0, b'a', 0, b'i', 0, b'n', 0, 0x00,
            0x00, 0x00, 0x00,
        ];
        let challenge = Challenge::parse(&challenge_bytes([9; 8], &target_info)).unwrap();
        assert_eq!(challenge.server_challenge, [9; 8]);
        assert_eq!(challenge.target_info, target_info);
        assert_eq!(challenge.timestamp(), None);
    }

    #[test]
    fn reads_server_timestamp() {
        let mut target_info = vec![0x07, 0x00, 0x08, 0x00];
        target_info.extend_from_slice(&42u64.to_le_bytes());
        target_info.extend_from_slice(&[0, 0, 0, 0]);
        let challenge = Challenge::parse(&challenge_bytes([1; 8], &target_info)).unwrap();
        assert_eq!(challenge.timestamp(), Some(42));
    }

    #[test]
    fn rejects_wrong_message_type() {
        let mut bytes = challenge_bytes([1; 8], &[]);
        bytes[8] = 1;
        assert!(Challenge::parse(&bytes).is_err());
        assert!(Challenge::parse(b"garbage").is_err());
    }

    #[test]
    fn authenticate_message_points_at_payload() {
        let challenge = Challenge::parse(&challenge_bytes([1; 8], &[0, 0, 0, 0])).unwrap();
        let message = authenticate_message(&credentials(), &challenge, [0xaa; 8], 0);

        assert_eq!(&message[..8], SIGNATURE);
        assert_eq!(read_u32(&message, 8), 3);

        // LM response: 24 bytes at the start of the payload.
        assert_eq!(read_u16(&message, 12), 24);
        assert_eq!(read_u32(&message, 16), 64);

        // User name buffer (fourth security buffer).
        let user_len = read_u16(&message, 36) as usize;
        let user_offset = read_u32(&message, 40) as usize;
        assert_eq!(
            &message[user_offset..user_offset + user_len],
            utf16le("User").as_slice()
        );

        // NT response = 16 byte proof + temp blob (28 bytes + target info + 4).
        assert_eq!(read_u16(&message, 20) as usize, 16 + 28 + 4 + 4);
    }

    #[test]
    fn server_timestamp_zeroes_lm_response() {
        let mut target_info = vec![0x07, 0x00, 0x08, 0x00];
        target_info.extend_from_slice(&7u64.to_le_bytes());
        target_info.extend_from_slice(&[0, 0, 0, 0]);
        let challenge = Challenge::parse(&challenge_bytes([1; 8], &target_info)).unwrap();
        let message = authenticate_message(&credentials(), &challenge, [0xaa; 8], 99);

        let lm_offset = read_u32(&message, 16) as usize;
        assert_eq!(&message[lm_offset..lm_offset + 24], &[0u8; 24]);
    }
}
