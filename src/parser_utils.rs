//! Shared winnow-based parsing utilities used across the header and record parsers.

use winnow::Parser;
use winnow::binary::le_f32;
use winnow::token::take;

/// Common result type for winnow parsers.
pub type WResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

/// Parse a fixed-width name field of `len` bytes, truncated at the first NUL.
///
/// Studio model files store names as NUL-padded byte arrays of a fixed width.
/// Bytes after the first NUL are padding (often uninitialized garbage from the
/// original compiler) and are discarded. Non-UTF-8 bytes are replaced.
pub fn parse_fixed_string(input: &mut &[u8], len: usize) -> WResult<String> {
    let bytes: &[u8] = take(len).parse_next(input)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}

/// Parse three consecutive little-endian f32s.
pub fn parse_vec3(input: &mut &[u8]) -> WResult<[f32; 3]> {
    let x = le_f32.parse_next(input)?;
    let y = le_f32.parse_next(input)?;
    let z = le_f32.parse_next(input)?;
    Ok([x, y, z])
}
