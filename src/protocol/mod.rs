//! Protocol module - TLV wire primitives, the bet value type, and the
//! message codec.
//!
//! This module is pure: it translates between domain values and wire bytes
//! without touching a socket. The transport layer is responsible for moving
//! exact byte counts.

mod bet;
mod codec;
mod wire;

pub use bet::Bet;
pub use codec::{
    decode_batch, decode_bet, decode_poll_response, decode_winner_list, encode_batch, encode_bet,
    encode_finish, encode_poll, PollOutcome,
};
pub use wire::{field_len, put_field, tags, Decoder, LEN_SIZE, MAX_FIELD_SIZE, TAG_SIZE};
