//! Text decoding of error-corrected code payloads.
//!
//! Decoding is total: a payload that is not text under its symbology's
//! rules yields `None`, which is ordinary data (a QR code may carry raw
//! binary), never an error.

use super::object_type::Symbology;

/// Code 39 alphabet; a character's index is its mod 43 check value.
const CODE39_ALPHABET: &[u8; 43] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Control characters that legitimately appear in 2D text payloads:
/// tab, LF, CR, and the ISO/IEC 15434 envelope separators EOT, GS, RS.
const ALLOWED_CONTROLS: [char; 6] = ['\t', '\n', '\r', '\u{04}', '\u{1D}', '\u{1E}'];

const GS: u8 = 0x1D;

pub fn decode_payload(payload: &[u8], symbology: Symbology) -> Option<String> {
    if payload.is_empty() {
        return None;
    }
    let decoded = match symbology {
        Symbology::Ean13 => decode_gs1_digits(payload, 13),
        Symbology::Ean8 => decode_gs1_digits(payload, 8),
        Symbology::UpcE => decode_upce(payload),
        Symbology::Code39 => decode_code39(payload),
        Symbology::Code39Mod43 => decode_code39_mod43(payload),
        Symbology::Code93 => decode_ascii(payload),
        Symbology::Code128 => decode_latin1(payload),
        Symbology::Pdf417 | Symbology::Qr | Symbology::Aztec => decode_utf8_text(payload),
    };
    if decoded.is_none() {
        if symbology.is_two_dimensional() {
            log::trace!("{symbology} payload of {} bytes is binary", payload.len());
        } else {
            log::debug!(
                "{symbology} payload of {} bytes breaks the symbology's character rules",
                payload.len()
            );
        }
    }
    decoded
}

/// GS1 mod-10 check digit over the data digits (all but the last).
///
/// Weights alternate 3, 1 starting from the rightmost data digit. `None`
/// when any byte is not an ASCII digit.
pub fn gs1_check_digit(data_digits: &[u8]) -> Option<u8> {
    let mut sum = 0;
    for (i, &b) in data_digits.iter().rev().enumerate() {
        let digit = char::from(b).to_digit(10)?;
        sum += if i % 2 == 0 { digit * 3 } else { digit };
    }
    Some(((10 - sum % 10) % 10) as u8)
}

fn ascii_string(payload: &[u8]) -> String {
    payload.iter().map(|&b| b as char).collect()
}

fn decode_gs1_digits(payload: &[u8], len: usize) -> Option<String> {
    if payload.len() != len || !payload.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let (data, check) = payload.split_at(len - 1);
    if gs1_check_digit(data)? != check[0] - b'0' {
        return None;
    }
    Some(ascii_string(payload))
}

fn decode_upce(payload: &[u8]) -> Option<String> {
    let ok = (6..=8).contains(&payload.len()) && payload.iter().all(u8::is_ascii_digit);
    ok.then(|| ascii_string(payload))
}

fn code39_value(b: u8) -> Option<usize> {
    CODE39_ALPHABET.iter().position(|&c| c == b)
}

fn decode_code39(payload: &[u8]) -> Option<String> {
    payload
        .iter()
        .all(|&b| code39_value(b).is_some())
        .then(|| ascii_string(payload))
}

/// The trailing check character is verified and stripped.
fn decode_code39_mod43(payload: &[u8]) -> Option<String> {
    let (check, data) = payload.split_last()?;
    if data.is_empty() {
        return None;
    }
    let mut sum = 0;
    for &b in data {
        sum += code39_value(b)?;
    }
    if code39_value(*check)? != sum % 43 {
        return None;
    }
    Some(ascii_string(data))
}

fn decode_ascii(payload: &[u8]) -> Option<String> {
    payload
        .iter()
        .all(|&b| b.is_ascii() && b != 0)
        .then(|| ascii_string(payload))
}

/// ISO-8859-1 covers the FNC4 extended range; DEL and C0/C1 controls other
/// than tab and the FNC1 group separator are not text.
fn decode_latin1(payload: &[u8]) -> Option<String> {
    let text = payload
        .iter()
        .all(|&b| !(0x7F..=0x9F).contains(&b) && (b >= 0x20 || b == GS || b == b'\t'));
    text.then(|| ascii_string(payload))
}

fn decode_utf8_text(payload: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(payload).ok()?;
    let printable = text
        .chars()
        .all(|c| !c.is_control() || ALLOWED_CONTROLS.contains(&c));
    printable.then(|| text.to_string())
}
