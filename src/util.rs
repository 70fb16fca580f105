use std::fmt::Write;

/// Formats bytes as an offset / hex / ASCII dump, sixteen bytes per row.
pub(crate) fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", row * 16);
        for column in 0..16 {
            match chunk.get(column) {
                Some(byte) => {
                    let _ = write!(out, "{byte:02x} ");
                }
                None => out.push_str("   "),
            }
            if column == 7 {
                out.push(' ');
            }
        }
        out.push(' ');
        for &byte in chunk {
            out.push(if (0x20..0x7f).contains(&byte) { byte as char } else { '.' });
        }
        out.push('\n');
    }
    out
}
