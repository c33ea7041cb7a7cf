//! Wire format for `impu` and `impi_mapping` blob values.
//!
//! `0x00 | varbyte(payload_len) | deflate(utf8_json_object)`
//!
//! `varbyte` is little-endian base-128: each byte carries 7 payload bits in
//! its low bits, the high bit set on every byte but the last. The codec
//! never produces a payload whose length does not fit in an `i32` and never
//! accepts one on decode either.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::record::{AssociatedImpu, CasToken, DefaultImpu, Expiry, ImpiMapping, ImpuRecord};
use crate::types::{ChargingAddresses, RegistrationState};

const VERSION: u8 = 0x00;
const MAX_PAYLOAD_LEN: u64 = i32::MAX as u64;

/// Every way decoding a stored blob can fail. A decoder error means the
/// caller should treat the value as corrupt, not as absent -- callers must
/// not collapse these into `NOT_FOUND`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty input")]
    Empty,
    #[error("unsupported version byte {0:#04x}")]
    BadVersion(u8),
    #[error("payload length exceeds i32::MAX")]
    BadLength,
    #[error("input truncated before declared payload length")]
    Truncated,
    #[error("failed to inflate payload")]
    DecompressFailed,
    #[error("payload is not valid UTF-8 JSON")]
    BadJson,
    #[error("decoded JSON is not an object")]
    NotObject,
}

fn encode_varbyte(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

fn decode_varbyte(input: &[u8]) -> Result<(u64, usize), CodecError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    for (i, &byte) in input.iter().enumerate() {
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
        if shift >= 64 {
            return Err(CodecError::BadLength);
        }
    }
    Err(CodecError::Truncated)
}

fn compress(payload: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(payload)
        .expect("writing to an in-memory Vec cannot fail");
    encoder.finish().expect("finishing an in-memory Vec cannot fail")
}

fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|_| CodecError::DecompressFailed)?;
    Ok(out)
}

fn encode_bytes(json: &Json) -> Vec<u8> {
    let payload = serde_json::to_vec(json).expect("canonical JSON values always serialize");
    let compressed = compress(&payload);

    let mut out = Vec::with_capacity(compressed.len() + 6);
    out.push(VERSION);
    encode_varbyte(compressed.len() as u64, &mut out);
    out.extend_from_slice(&compressed);
    out
}

fn decode_bytes(input: &[u8]) -> Result<Json, CodecError> {
    if input.is_empty() {
        return Err(CodecError::Empty);
    }
    let version = input[0];
    if version != VERSION {
        return Err(CodecError::BadVersion(version));
    }

    let (len, header_len) = decode_varbyte(&input[1..])?;
    if len > MAX_PAYLOAD_LEN {
        return Err(CodecError::BadLength);
    }
    #[allow(clippy::cast_possible_truncation)]
    let len = len as usize;

    let body_start = 1 + header_len;
    let body = input
        .get(body_start..body_start + len)
        .ok_or(CodecError::Truncated)?;

    let decompressed = decompress(body)?;
    let text = std::str::from_utf8(&decompressed).map_err(|_| CodecError::BadJson)?;
    let value: Json = serde_json::from_str(text).map_err(|_| CodecError::BadJson)?;
    if !value.is_object() {
        return Err(CodecError::NotObject);
    }
    Ok(value)
}

#[derive(Serialize, Deserialize)]
struct DefaultImpuPayload {
    associated_impus: Vec<String>,
    impis: Vec<String>,
    reg_state: RegistrationState,
    ccfs: Vec<String>,
    ecfs: Vec<String>,
    service_profile: String,
    cas: CasToken,
    expiry: Expiry,
}

#[derive(Serialize, Deserialize)]
struct AssociatedImpuPayload {
    default_impu: String,
    cas: CasToken,
    expiry: Expiry,
}

#[derive(Serialize, Deserialize)]
struct ImpiMappingPayload {
    default_impus: Vec<String>,
    cas: CasToken,
    expiry: Expiry,
}

/// Encodes a default or associated IMPU record for the `impu` table.
#[must_use]
pub fn encode_impu(record: &ImpuRecord) -> Vec<u8> {
    let json = match record {
        ImpuRecord::Default(d) => {
            let mut associated: Vec<String> = d.associated_impus.iter().cloned().collect();
            associated.sort();
            let mut impis: Vec<String> = d.impis.iter().cloned().collect();
            impis.sort();
            let mut ccfs = d.charging_addresses.ccfs.clone();
            ccfs.sort();
            let mut ecfs = d.charging_addresses.ecfs.clone();
            ecfs.sort();
            serde_json::to_value(DefaultImpuPayload {
                associated_impus: associated,
                impis,
                reg_state: d.registration_state,
                ccfs,
                ecfs,
                service_profile: d.service_profile.clone(),
                cas: d.cas_token,
                expiry: d.expiry,
            })
        }
        ImpuRecord::Associated(a) => serde_json::to_value(AssociatedImpuPayload {
            default_impu: a.default_impu.clone(),
            cas: a.cas_token,
            expiry: a.expiry,
        }),
    }
    .expect("record payloads always serialize to a JSON object");
    encode_bytes(&json)
}

/// Decodes a blob from the `impu` table, discriminating Default vs
/// Associated by presence of `default_impu`.
pub fn decode_impu(impu: &str, input: &[u8]) -> Result<ImpuRecord, CodecError> {
    let json = decode_bytes(input)?;
    if json.get("default_impu").is_some() {
        let payload: AssociatedImpuPayload =
            serde_json::from_value(json).map_err(|_| CodecError::BadJson)?;
        Ok(ImpuRecord::Associated(AssociatedImpu {
            impu: impu.to_string(),
            default_impu: payload.default_impu,
            cas_token: payload.cas,
            expiry: payload.expiry,
        }))
    } else {
        let payload: DefaultImpuPayload =
            serde_json::from_value(json).map_err(|_| CodecError::BadJson)?;
        Ok(ImpuRecord::Default(DefaultImpu {
            impu: impu.to_string(),
            associated_impus: payload.associated_impus.into_iter().collect(),
            impis: payload.impis.into_iter().collect(),
            registration_state: payload.reg_state,
            charging_addresses: ChargingAddresses {
                ccfs: payload.ccfs,
                ecfs: payload.ecfs,
            },
            service_profile: payload.service_profile,
            cas_token: payload.cas,
            expiry: payload.expiry,
        }))
    }
}

/// Encodes an IMPI-mapping record for the `impi_mapping` table.
#[must_use]
pub fn encode_impi_mapping(record: &ImpiMapping) -> Vec<u8> {
    let mut default_impus: Vec<String> = record.default_impus.iter().cloned().collect();
    default_impus.sort();
    let json = serde_json::to_value(ImpiMappingPayload {
        default_impus,
        cas: record.cas_token,
        expiry: record.expiry,
    })
    .expect("record payloads always serialize to a JSON object");
    encode_bytes(&json)
}

pub fn decode_impi_mapping(impi: &str, input: &[u8]) -> Result<ImpiMapping, CodecError> {
    let json = decode_bytes(input)?;
    let payload: ImpiMappingPayload =
        serde_json::from_value(json).map_err(|_| CodecError::BadJson)?;
    Ok(ImpiMapping {
        impi: impi.to_string(),
        default_impus: payload.default_impus.into_iter().collect::<BTreeSet<_>>(),
        cas_token: payload.cas,
        expiry: payload.expiry,
    })
}
