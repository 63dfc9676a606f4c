//jetstake-protocol/src/payload.rs
//! Forward payload codec
//!
//! A token transfer carries an opaque forward payload end to end. The router
//! recognizes two shapes: a `StakeJetton` intent (4-byte tag followed by a
//! bincode body) and a plain text comment (zero tag followed by UTF-8 bytes).
//! Anything else is malformed and triggers the full-refund path.

use crate::messages::StakeJetton;
use jetstake_common::prelude::*;
use thiserror::Error;

/// Tag prefixing an embedded StakeJetton intent
pub const STAKE_JETTON_TAG: u32 = 0x4a53_544b;

/// Tag prefixing a plain text comment
pub const COMMENT_TAG: u32 = 0x0000_0000;

/// Errors produced while encoding or parsing a forward payload
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Payload truncated: {0} bytes")]
    Truncated(usize),

    #[error("Unknown payload tag: {0:#010x}")]
    UnknownTag(u32),

    #[error("Codec error: {0}")]
    Codec(String),
}

impl From<PayloadError> for LedgerError {
    fn from(err: PayloadError) -> Self {
        LedgerError::malformed(err.to_string())
    }
}

/// Encode a StakeJetton intent for embedding in a token transfer
pub fn encode_stake_jetton(intent: &StakeJetton) -> Result<Vec<u8>, PayloadError> {
    let body = bincode::serialize(intent).map_err(|e| PayloadError::Codec(e.to_string()))?;
    let mut payload = Vec::with_capacity(4 + body.len());
    payload.extend_from_slice(&STAKE_JETTON_TAG.to_be_bytes());
    payload.extend_from_slice(&body);
    Ok(payload)
}

/// Parse a forward payload as a StakeJetton intent
pub fn parse_stake_jetton(payload: &[u8]) -> Result<StakeJetton, PayloadError> {
    let tag = read_tag(payload)?;
    if tag != STAKE_JETTON_TAG {
        return Err(PayloadError::UnknownTag(tag));
    }
    bincode::deserialize(&payload[4..]).map_err(|e| PayloadError::Codec(e.to_string()))
}

/// Encode a plain text comment payload
pub fn comment(text: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + text.len());
    payload.extend_from_slice(&COMMENT_TAG.to_be_bytes());
    payload.extend_from_slice(text.as_bytes());
    payload
}

/// Parse a plain text comment payload
pub fn parse_comment(payload: &[u8]) -> Result<String, PayloadError> {
    let tag = read_tag(payload)?;
    if tag != COMMENT_TAG {
        return Err(PayloadError::UnknownTag(tag));
    }
    String::from_utf8(payload[4..].to_vec()).map_err(|e| PayloadError::Codec(e.to_string()))
}

fn read_tag(payload: &[u8]) -> Result<u32, PayloadError> {
    if payload.len() < 4 {
        return Err(PayloadError::Truncated(payload.len()));
    }
    Ok(u32::from_be_bytes([
        payload[0], payload[1], payload[2], payload[3],
    ]))
}
