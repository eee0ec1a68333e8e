// Tests for output formatting
//
// The writer is backed by a shared buffer so the produced text can be
// inspected after each call.

use super::*;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// A writer without colors whose output can be read back
pub(crate) fn capture(format: OutputFormat) -> (OutputWriter, SharedBuffer) {
    writer(format, false)
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

#[test]
fn test_data_in_each_format() {
    let value = serde_json::json!({"b": [1, 2], "a": "x"});

    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.data(&value).unwrap();
    assert_eq!(buffer.contents(), "{\"b\":[1,2],\"a\":\"x\"}\n");

    let (mut out, buffer) = writer(OutputFormat::Yaml, false);
    out.data(&value).unwrap();
    assert_eq!(buffer.contents(), "b:\n- 1\n- 2\na: x\n");

    let (mut out, buffer) = writer(OutputFormat::JsonPretty, false);
    out.data(&value).unwrap();
    assert!(buffer.contents().contains("\n  \"b\": [\n"));
}

#[test]
fn test_messages_only_in_human_format() {
    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.info("converting").unwrap();
    out.success("done").unwrap();
    out.section("Result").unwrap();
    assert_eq!(buffer.contents(), "INFO: converting\ndone\n\n=== Result ===\n");

    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.info("converting").unwrap();
    out.success("done").unwrap();
    assert!(buffer.contents().is_empty());
}

#[test]
fn test_quiet_suppresses_messages_but_not_data() {
    let (mut out, buffer) = writer(OutputFormat::Human, true);
    out.info("converting").unwrap();
    out.table(&[("target", "int".to_string())]).unwrap();
    out.data(&serde_json::json!(1)).unwrap();
    assert_eq!(buffer.contents(), "1\n");
}

#[test]
fn test_table_aligns_keys() {
    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.table(&[("target", "int".to_string()), ("converter", "int".to_string())])
        .unwrap();
    assert_eq!(buffer.contents(), "target    │ int\nconverter │ int\n");
}

#[test]
fn test_format_value_compact() {
    assert_eq!(format_value_compact(&serde_json::json!("abc")), "\"abc\"");
    assert_eq!(format_value_compact(&serde_json::json!([1, 2, 3])), "[3 items]");
    assert_eq!(format_value_compact(&serde_json::json!({"a": 1})), "{1 fields}");

    let long = "x".repeat(100);
    let compact = format_value_compact(&serde_json::json!(long));
    assert!(compact.ends_with("..."));
    assert_eq!(compact.chars().count(), 63);
}
