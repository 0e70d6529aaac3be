//! Message codec: deterministic, lossless translation between domain values
//! and wire bytes.
//!
//! Message shapes:
//! - `BET`: tag + u32 BE length + six concatenated field TLVs
//!   (Agency, Name, Surname, Document, BirthDate, Number, in that order).
//! - `BATCH`: tag + u32 BE bet count + N × BET messages.
//! - `POLL`: tag + i32 BE agency id.
//! - `FINISH`, `OK`, `AWAIT`: bare status bytes, no payload.
//! - `WINNERS`: tag + u32 BE count + N × Document field TLVs.
//!
//! Encoding is pure; decoding validates every tag and every declared length
//! against the bytes actually present and fails with a protocol error on any
//! mismatch.

use bytes::BufMut;

use super::bet::Bet;
use super::wire::{field_len, put_field, tags, Decoder, LEN_SIZE, TAG_SIZE};
use crate::error::{Result, TombolaError};

/// Smallest possible encoding of one list entry (bare tag + length prefix).
///
/// A count prefix claiming more entries than the remaining bytes could hold
/// is structurally invalid; checking against this floor rejects it before
/// any allocation sized from wire input.
const MIN_ENTRY_SIZE: usize = TAG_SIZE + LEN_SIZE;

/// Outcome of a decoded poll response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Drawing has not happened yet; retry later.
    Wait,
    /// Drawing done; winning documents for the polled agency, in wire order.
    Winners(Vec<String>),
}

/// Encode one bet as a BET message, embedding the submitting agency id.
pub fn encode_bet(agency_id: &str, bet: &Bet) -> Vec<u8> {
    let body_len = field_len(agency_id)
        + field_len(&bet.name)
        + field_len(&bet.surname)
        + field_len(&bet.document)
        + field_len(&bet.birth_date)
        + field_len(&bet.number);

    let mut buf = Vec::with_capacity(1 + 4 + body_len);
    buf.put_u8(tags::BET);
    buf.put_u32(body_len as u32);
    put_field(&mut buf, tags::AGENCY, agency_id);
    put_field(&mut buf, tags::NAME, &bet.name);
    put_field(&mut buf, tags::SURNAME, &bet.surname);
    put_field(&mut buf, tags::DOCUMENT, &bet.document);
    put_field(&mut buf, tags::BIRTHDATE, &bet.birth_date);
    put_field(&mut buf, tags::NUMBER, &bet.number);
    buf
}

/// Encode a batch of bets as one BATCH message.
///
/// The count prefix is the number of BET messages that follow. An empty
/// batch (count 0, no payload) is legal and encodable.
pub fn encode_batch(agency_id: &str, batch: &[Bet]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.put_u8(tags::BATCH);
    buf.put_u32(batch.len() as u32);
    for bet in batch {
        buf.extend_from_slice(&encode_bet(agency_id, bet));
    }
    buf
}

/// Encode a poll request: POLL tag + i32 BE agency id.
///
/// Fails with [`TombolaError::Identifier`] before producing any bytes if the
/// agency id is not representable as a 32-bit integer.
pub fn encode_poll(agency_id: &str) -> Result<Vec<u8>> {
    let id: i32 = agency_id
        .parse()
        .map_err(|_| TombolaError::Identifier(agency_id.to_string()))?;

    let mut buf = Vec::with_capacity(5);
    buf.put_u8(tags::POLL);
    buf.put_i32(id);
    Ok(buf)
}

/// Encode the end-of-submission marker.
pub fn encode_finish() -> [u8; 1] {
    [tags::FINISH]
}

/// Decode one BET message, returning the embedded agency id and the bet.
///
/// The declared body length must exactly cover the six field TLVs; leftover
/// or missing bytes inside the body are a protocol error.
pub fn decode_bet(dec: &mut Decoder<'_>) -> Result<(String, Bet)> {
    let tag = dec.get_tag()?;
    if tag != tags::BET {
        return Err(TombolaError::Protocol(format!(
            "Unexpected tag {:#04x}, expected BET",
            tag
        )));
    }

    let body_len = dec.get_u32()? as usize;
    let before = dec.remaining();
    if before < body_len {
        return Err(TombolaError::Protocol(format!(
            "BET body length {} exceeds remaining {} bytes",
            body_len, before
        )));
    }

    let agency = dec.get_field(tags::AGENCY)?;
    let name = dec.get_field(tags::NAME)?;
    let surname = dec.get_field(tags::SURNAME)?;
    let document = dec.get_field(tags::DOCUMENT)?;
    let birth_date = dec.get_field(tags::BIRTHDATE)?;
    let number = dec.get_field(tags::NUMBER)?;

    let consumed = before - dec.remaining();
    if consumed != body_len {
        return Err(TombolaError::Protocol(format!(
            "BET body declared {} bytes but fields consumed {}",
            body_len, consumed
        )));
    }

    Ok((agency, Bet::new(name, surname, document, birth_date, number)))
}

/// Decode one BATCH message, returning the agency id of the first bet (if
/// any) and all bets in wire order.
pub fn decode_batch(buf: &[u8]) -> Result<(Option<String>, Vec<Bet>)> {
    let mut dec = Decoder::new(buf);

    let tag = dec.get_tag()?;
    if tag != tags::BATCH {
        return Err(TombolaError::Protocol(format!(
            "Unexpected tag {:#04x}, expected BATCH",
            tag
        )));
    }

    let count = dec.get_u32()?;
    if count as usize > dec.remaining() / MIN_ENTRY_SIZE {
        return Err(TombolaError::Protocol(format!(
            "BATCH count {} cannot fit in remaining {} bytes",
            count,
            dec.remaining()
        )));
    }

    let mut agency = None;
    let mut bets = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (bet_agency, bet) = decode_bet(&mut dec)?;
        agency.get_or_insert(bet_agency);
        bets.push(bet);
    }

    if !dec.is_empty() {
        return Err(TombolaError::Protocol(format!(
            "BATCH declared {} bets but {} trailing bytes remain",
            count,
            dec.remaining()
        )));
    }

    Ok((agency, bets))
}

/// Decode a winner list: u32 BE count + N × Document fields.
///
/// Any field whose tag is not DOCUMENT is a protocol error. Order is
/// preserved.
pub fn decode_winner_list(dec: &mut Decoder<'_>) -> Result<Vec<String>> {
    let count = dec.get_u32()?;
    if count as usize > dec.remaining() / MIN_ENTRY_SIZE {
        return Err(TombolaError::Protocol(format!(
            "Winner count {} cannot fit in remaining {} bytes",
            count,
            dec.remaining()
        )));
    }

    let mut winners = Vec::with_capacity(count as usize);
    for _ in 0..count {
        winners.push(dec.get_field(tags::DOCUMENT)?);
    }
    Ok(winners)
}

/// Decode a complete poll response buffer (status byte + optional payload).
pub fn decode_poll_response(buf: &[u8]) -> Result<PollOutcome> {
    let mut dec = Decoder::new(buf);
    let outcome = match dec.get_tag()? {
        tags::AWAIT => PollOutcome::Wait,
        tags::WINNERS => PollOutcome::Winners(decode_winner_list(&mut dec)?),
        other => {
            return Err(TombolaError::Protocol(format!(
                "Unknown poll status byte {:#04x}",
                other
            )))
        }
    };

    if !dec.is_empty() {
        return Err(TombolaError::Protocol(format!(
            "Poll response has {} trailing bytes",
            dec.remaining()
        )));
    }

    Ok(outcome)
}
