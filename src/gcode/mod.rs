//! G-code rewriting
//!
//! The input program is read one line at a time. Each line is split by a
//! small lexer ([`lexer`]) into its G codes, X/Y/F words and the literal text
//! around them; the engine ([`engine`]) then corrects the coordinates for the
//! sun's drift, advances its estimate of machine time and writes the line
//! back out with bookkeeping comments.

use thiserror::Error;

pub mod engine;
pub mod lexer;

pub use engine::{Bounds, MotionState, Rewriter, RunSummary};
pub use lexer::{parse_line, LexState, ParsedLine};

/// Errors raised while rewriting a program
#[derive(Debug, Error)]
pub enum GcodeError {
    #[error("line {line}: malformed number '{token}'")]
    MalformedNumber { line: usize, token: String },

    #[error("line {line}: feed rate is zero for a move of {distance} m")]
    ZeroFeedRate { line: usize, distance: f64 },

    #[error("line {line}: sun offset is unavailable and there is no earlier offset to reuse")]
    OffsetUnavailable { line: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for G-code operations
pub type Result<T> = std::result::Result<T, GcodeError>;

/// Fixed-point form used for rewritten coordinates
///
/// Values that round to zero print as `0.000000`, never `-0.000000`.
pub fn format_coordinate(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0.000000".to_string();
    }
    format!("{:.6}", rounded)
}

/// Shortest of fixed or exponent form with six significant digits
///
/// Renders like C's `%g`: trailing zeros are dropped and the exponent form
/// (`1e-05`, `1.23457e+08`) is used below `1e-4` or from `1e6` up.
pub fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;

    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // Round to the significant digits first; that fixes the exponent
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
