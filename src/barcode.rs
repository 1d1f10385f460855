//! EAN-13 bar-pattern rendering, emitted as an inline SVG string.

use crate::error::PipelineError;

const ENCODING_LEFT_A: [[u8; 7]; 10] = [
    [0, 0, 0, 1, 1, 0, 1],
    [0, 0, 1, 1, 0, 0, 1],
    [0, 0, 1, 0, 0, 1, 1],
    [0, 1, 1, 1, 1, 0, 1],
    [0, 1, 0, 0, 0, 1, 1],
    [0, 1, 1, 0, 0, 0, 1],
    [0, 1, 0, 1, 1, 1, 1],
    [0, 1, 1, 1, 0, 1, 1],
    [0, 1, 1, 0, 1, 1, 1],
    [0, 0, 0, 1, 0, 1, 1],
];
const ENCODING_LEFT_B: [[u8; 7]; 10] = [
    [0, 1, 0, 0, 1, 1, 1],
    [0, 1, 1, 0, 0, 1, 1],
    [0, 0, 1, 1, 0, 1, 1],
    [0, 1, 0, 0, 0, 0, 1],
    [0, 0, 1, 1, 1, 0, 1],
    [0, 1, 1, 1, 0, 0, 1],
    [0, 0, 0, 0, 1, 0, 1],
    [0, 0, 1, 0, 0, 0, 1],
    [0, 0, 0, 1, 0, 0, 1],
    [0, 0, 1, 0, 1, 1, 1],
];
const ENCODING_RIGHT: [[u8; 7]; 10] = [
    [1, 1, 1, 0, 0, 1, 0],
    [1, 1, 0, 0, 1, 1, 0],
    [1, 1, 0, 1, 1, 0, 0],
    [1, 0, 0, 0, 0, 1, 0],
    [1, 0, 1, 1, 1, 0, 0],
    [1, 0, 0, 1, 1, 1, 0],
    [1, 0, 1, 0, 0, 0, 0],
    [1, 0, 0, 0, 1, 0, 0],
    [1, 0, 0, 1, 0, 0, 0],
    [1, 1, 1, 0, 1, 0, 0],
];

/// Parity pattern for the left-hand six digits, indexed by the barcode's
/// leading (13th, implied) digit.
const PARITY: [[usize; 5]; 10] = [
    [0, 0, 0, 0, 0],
    [0, 1, 0, 1, 1],
    [0, 1, 1, 0, 1],
    [0, 1, 1, 1, 0],
    [1, 0, 0, 1, 1],
    [1, 1, 0, 0, 1],
    [1, 1, 1, 0, 0],
    [1, 0, 1, 0, 1],
    [1, 0, 1, 1, 0],
    [1, 1, 0, 1, 0],
];

const LEFT_GUARD: [u8; 3] = [1, 0, 1];
const MIDDLE_GUARD: [u8; 5] = [0, 1, 0, 1, 0];
const RIGHT_GUARD: [u8; 3] = [1, 0, 1];

const BAR_WIDTH: u32 = 2;
const BAR_HEIGHT: u32 = 60;

fn digit(b: u8) -> usize {
    (b - b'0') as usize
}

/// Renders the bar pattern (0/1 per module) for a 13-digit GTIN, 95 modules wide.
fn modules(gtin: &str) -> Result<Vec<u8>, PipelineError> {
    if gtin.len() != 13 || !gtin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PipelineError::BadIdentifier {
            value: gtin.to_string(),
        });
    }
    let digits: Vec<usize> = gtin.bytes().map(digit).collect();
    let parity = PARITY[digits[0]];

    let mut out = Vec::with_capacity(95);
    out.extend_from_slice(&LEFT_GUARD);
    for i in 0..6 {
        let d = digits[1 + i];
        let pattern = if parity[i] == 0 {
            ENCODING_LEFT_A[d]
        } else {
            ENCODING_LEFT_B[d]
        };
        out.extend_from_slice(&pattern);
    }
    out.extend_from_slice(&MIDDLE_GUARD);
    for i in 0..6 {
        let d = digits[7 + i];
        out.extend_from_slice(&ENCODING_RIGHT[d]);
    }
    out.extend_from_slice(&RIGHT_GUARD);
    Ok(out)
}

/// Renders a GTIN-13 as an inline `<svg>` barcode, with the code printed
/// beneath the bars.
pub fn create_svg(gtin: &str) -> Result<String, PipelineError> {
    let bars = modules(gtin)?;
    let width = bars.len() as u32 * BAR_WIDTH;

    let mut rects = String::new();
    for (i, m) in bars.iter().enumerate() {
        if *m == 1 {
            let x = i as u32 * BAR_WIDTH;
            rects.push_str(&format!(
                "<rect x=\"{x}\" y=\"0\" width=\"{BAR_WIDTH}\" height=\"{BAR_HEIGHT}\" fill=\"black\"/>"
            ));
        }
    }

    Ok(format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{}\" viewBox=\"0 0 {width} {}\">{rects}<text x=\"{}\" y=\"{}\" font-size=\"10\" text-anchor=\"middle\">{gtin}</text></svg>",
        BAR_HEIGHT + 14,
        BAR_HEIGHT + 14,
        width / 2,
        BAR_HEIGHT + 12,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_svg_for_valid_gtin() {
        let svg = create_svg("7680123450005").unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("7680123450005"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(create_svg("123").is_err());
    }

    #[test]
    fn module_count_is_95() {
        let bars = modules("7680123450005").unwrap();
        assert_eq!(bars.len(), 95);
    }
}
