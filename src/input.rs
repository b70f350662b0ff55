use crate::config::InputEncoding;
use anyhow::{Context, Result};
use std::io::Read;

fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == ',' || c == ':'
}

fn looks_like_hex(raw: &[u8]) -> bool {
    raw.iter().any(u8::is_ascii_hexdigit)
        && raw
            .iter()
            .all(|&b| b.is_ascii_hexdigit() || b == b'x' || b == b'X' || is_separator(char::from(b)))
}

/// Parses a hex dump such as `10 27 00 00`, `0x1,0x27` or `10270000`.
///
/// Every separated token is decoded on its own, so byte boundaries follow the separators.
/// A single digit token is one byte (`0x1` is `01`).
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for token in text.split(is_separator).filter(|token| !token.is_empty()) {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        let decoded = if digits.len() == 1 {
            hex::decode(format!("0{digits}"))
        } else {
            hex::decode(digits)
        }
        .with_context(|| format!("Cannot decode hex dump token '{token}'"))?;
        if decoded.is_empty() {
            anyhow::bail!("Empty hex dump token '{token}'");
        }
        bytes.extend_from_slice(&decoded);
    }
    Ok(bytes)
}

fn decode_input(raw: Vec<u8>, encoding: InputEncoding) -> Result<Vec<u8>> {
    let hex_dump = match encoding {
        InputEncoding::Binary => false,
        InputEncoding::Hex => true,
        InputEncoding::Auto => looks_like_hex(&raw),
    };
    if !hex_dump {
        return Ok(raw);
    }
    let text = String::from_utf8(raw).with_context(|| "Hex dump is not valid text")?;
    parse_hex(&text)
}

/// Reads one captured frame from `input`, a file path or "-" for standard input.
pub fn read_frame(input: &str, encoding: InputEncoding) -> Result<Vec<u8>> {
    let raw = if input == "-" {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .with_context(|| "Cannot read frame from standard input")?;
        buffer
    } else {
        std::fs::read(input).with_context(|| format!("Cannot read frame file '{}'", input))?
    };
    log::trace!("read_frame: {} bytes from '{}'", raw.len(), input);

    let frame = decode_input(raw, encoding)?;
    log::debug!("Frame of {} bytes: {:02X?}", frame.len(), frame);
    Ok(frame)
}
