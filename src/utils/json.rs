use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io::{self, Write};

/// Single-line JSON with `", "` and `": "` separators. Anything outside
/// printable ASCII is written as `\uXXXX` (UTF-16 units, lowercase hex).
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Renders `value` as one JSON line terminated by `\n`.
pub fn to_json_line<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let mut serializer = Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spaced_separators() {
        let line = to_json_line(&json!({"a": 1})).unwrap();
        assert_eq!(line, b"{\"a\": 1}\n");
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let line = to_json_line(&json!({"message": "café 🚀 \u{7f}ok"})).unwrap();
        assert_eq!(
            String::from_utf8(line).unwrap(),
            "{\"message\": \"caf\\u00e9 \\ud83d\\ude80 \\u007fok\"}\n"
        );
    }

    #[test]
    fn test_quotes_and_control_characters_keep_standard_escapes() {
        let line = to_json_line(&json!({"m": "a\"b\\c\nd"})).unwrap();
        assert_eq!(line, b"{\"m\": \"a\\\"b\\\\c\\nd\"}\n");
    }

    #[test]
    fn test_nested_values_keep_separators() {
        #[derive(Serialize)]
        struct Sample {
            name: &'static str,
            values: Vec<u8>,
            delay: f64,
        }

        let line = to_json_line(&Sample {
            name: "x",
            values: vec![1, 2],
            delay: 0.0,
        })
        .unwrap();
        assert_eq!(
            String::from_utf8(line).unwrap(),
            "{\"name\": \"x\", \"values\": [1, 2], \"delay\": 0.0}\n"
        );
    }
}
