#![no_main]
use battcurve_protocol::response::{is_acknowledged, last_meaningful_line, parse_voltage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever the daemon sends, filtering and parsing must not panic.
    if let Ok(line) = last_meaningful_line(data, &["single", "double", "long"]) {
        assert!(!line.trim().is_empty());
        let _ = parse_voltage(&line);
        let _ = is_acknowledged(&line);
    }
});
