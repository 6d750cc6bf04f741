//! Pure field extractors over a classified row. Upstream classifier
//! versions have used different key spellings (camelCase, snake_case, and
//! the Spanish labels of the original sheets), so each extractor probes a
//! fixed ordered key list and takes the first non-blank hit. Missing or
//! invalid input always yields `None`, never an error — a scope that can't
//! find its field is simply unavailable for that row.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::TxRow;

const SIGNATURE_KEYS: &[&str] = &["signature", "txSignature", "tx_signature", "firma"];
const SIGNER_KEYS: &[&str] = &["signer", "feePayer", "fee_payer", "firmante"];
const SENDER_KEYS: &[&str] = &["sender", "from", "fromAddress", "from_address", "remitente"];
const RECIPIENT_KEYS: &[&str] = &["recipient", "to", "toAddress", "to_address", "destinatario"];
const PROGRAM_KEYS: &[&str] = &["programId", "program_id", "program", "programa"];

fn base58_address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").unwrap())
}

fn note_signature_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"sig:([1-9A-HJ-NP-Za-km-z]{32,88})").unwrap())
}

/// Base58 address shape: the Bitcoin/Solana alphabet (no 0, O, I, l) at
/// public-key length.
pub fn is_base58_address(s: &str) -> bool {
    base58_address_re().is_match(s)
}

fn probe<'a>(row: &'a TxRow, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| {
        row.extra
            .get(*k)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    })
}

/// Explicit signature field if present, else one embedded in the note via
/// the `sig:<base58>` marker older classifier versions wrote there.
pub fn extract_signature(row: &TxRow) -> Option<&str> {
    if let Some(sig) = probe(row, SIGNATURE_KEYS) {
        return Some(sig);
    }
    note_signature_re()
        .captures(&row.note)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn extract_signer(row: &TxRow) -> Option<&str> {
    probe(row, SIGNER_KEYS)
}

/// For an inbound transfer the sender is the on-chain counterparty, not
/// the wallet owner who signed nothing; every other row type treats the
/// signer as the sender.
pub fn extract_sender(row: &TxRow) -> Option<&str> {
    if is_inbound_transfer(row) {
        probe(row, SENDER_KEYS)
    } else {
        extract_signer(row)
    }
}

pub fn extract_recipient(row: &TxRow) -> Option<&str> {
    probe(row, RECIPIENT_KEYS)
}

/// Program id, only if the candidate actually looks like an address —
/// upstream has put program *names* under these keys before.
pub fn extract_program_address(row: &TxRow) -> Option<&str> {
    probe(row, PROGRAM_KEYS).filter(|v| is_base58_address(v))
}

fn is_inbound_transfer(row: &TxRow) -> bool {
    row.tx_type.trim().eq_ignore_ascii_case("deposit")
}
