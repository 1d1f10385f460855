//! GTIN-13 padding, checksum and composition.

use crate::error::PipelineError;

/// Left-pads `s` with `'0'` up to `width` characters. A longer `s` is returned
/// unchanged (never truncated).
pub fn pad(width: usize, s: &str) -> String {
    if s.len() >= width {
        s.to_string()
    } else {
        let mut out = String::with_capacity(width);
        for _ in 0..(width - s.len()) {
            out.push('0');
        }
        out.push_str(s);
        out
    }
}

/// Computes the EAN-13 check digit for a 12-digit payload.
pub fn checksum(digits12: &str) -> Result<char, PipelineError> {
    if digits12.len() != 12 || !digits12.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PipelineError::BadIdentifier {
            value: digits12.to_string(),
        });
    }

    let mut sum = 0u32;
    for (i, b) in digits12.bytes().enumerate() {
        let d = (b - b'0') as u32;
        let weight = if i % 2 == 0 { 1 } else { 3 };
        sum += d * weight;
    }

    let check = (10 - (sum % 10)) % 10;
    Ok(char::from_digit(check, 10).expect("0..=9 always maps to a digit char"))
}

/// Composes a GTIN-13 from a padded registration number and a padded packing code.
///
/// `rn5` and `pack3` are expected already padded to 5 and 3 digits respectively;
/// callers that have raw values should run them through [`pad`] first.
pub fn gtin13(rn5: &str, pack3: &str) -> Result<String, PipelineError> {
    let gtin12 = format!("7680{rn5}{pack3}");
    let check = checksum(&gtin12)?;
    Ok(format!("{gtin12}{check}"))
}

/// Returns the first 12 digits of a GTIN-13, used when only a loose match
/// against another source's computed GTIN-12 is required (see Swissmedic's
/// `findGtin`, which compares without the check digit).
pub fn gtin12_prefix(gtin13: &str) -> &str {
    &gtin13[..12.min(gtin13.len())]
}
