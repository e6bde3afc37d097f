#![no_main]

use libfuzzer_sys::fuzz_target;
use vx_store::LogEntry;

// One line of the JSON-lines audit log.
fuzz_target!(|data: &[u8]| {
    if let Ok(LogEntry::Round(record)) = serde_json::from_slice::<LogEntry>(data) {
        let _ = record.message_context();
    }
});
