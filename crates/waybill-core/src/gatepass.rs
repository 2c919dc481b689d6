//! Gate pass serial numbers.
//!
//! Serials follow `RAPL-[RGP|NRGP]-[FY]/[SEQ]`:
//!
//! - `RAPL`: company code
//! - `RGP` / `NRGP`: returnable / non-returnable gate pass
//! - `FY`: financial year, April-anchored (`2526` for 2025-26)
//! - `SEQ`: 3-digit sequence, resetting each financial year
//!
//! The substrate owns the persistent sequence; this module provides the
//! format so local substrates can issue serials and callers can validate
//! scanned ones.

use jiff::civil::Date;

/// Company code prefix on every serial.
pub const COMPANY_CODE: &str = "RAPL";

/// A parsed gate pass serial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePassSerial {
    pub returnable: bool,
    pub financial_year: String,
    pub sequence: u32,
}

/// Financial-year token for a date. The year starts in April: March 2026
/// still belongs to `2526`, April 2026 opens `2627`.
pub fn financial_year(date: Date) -> String {
    let year = i32::from(date.year());
    let start = if date.month() >= 4 { year } else { year - 1 };
    format!("{:02}{:02}", start % 100, (start + 1) % 100)
}

/// Formats a serial for the given date and per-year sequence number.
pub fn format_serial(returnable: bool, date: Date, sequence: u32) -> String {
    let pass_type = if returnable { "RGP" } else { "NRGP" };
    format!(
        "{COMPANY_CODE}-{pass_type}-{}/{:03}",
        financial_year(date),
        sequence
    )
}

/// Parses a serial, returning `None` when the format does not match.
pub fn parse_serial(serial: &str) -> Option<GatePassSerial> {
    let rest = serial.strip_prefix(COMPANY_CODE)?.strip_prefix('-')?;
    let (pass_type, rest) = rest.split_once('-')?;
    let returnable = match pass_type {
        "RGP" => true,
        "NRGP" => false,
        _ => return None,
    };

    let (fy, seq) = rest.split_once('/')?;
    if fy.len() != 4 || !fy.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if seq.len() != 3 || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(GatePassSerial {
        returnable,
        financial_year: fy.to_string(),
        sequence: seq.parse().ok()?,
    })
}

/// Whether a serial follows the expected format.
pub fn is_valid_serial(serial: &str) -> bool {
    parse_serial(serial).is_some()
}
