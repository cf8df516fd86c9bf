//! Small helpers shared across modules.

use std::convert::Infallible;

/// Unwrap a result that cannot fail.
pub fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Render bytes as lowercase hex, sixteen per line, inside brackets.
///
/// Lines after the first start with a space so columns line up.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len() * 3 + 4);
    text.push('\n');
    text.push('[');
    for (index, byte) in bytes.iter().enumerate() {
        if index % 16 == 0 && index > 0 {
            text.push_str("\n ");
        } else if index > 0 {
            text.push(' ');
        }
        text.push_str(&format!("{byte:02x}"));
    }
    text.push(']');
    text
}
