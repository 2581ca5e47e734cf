#![no_main]
use battcurve_core::SocTable;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Anything the loader accepts must satisfy the table invariants and
    // survive a write/read cycle unchanged.
    if let Ok(table) = SocTable::from_json(data) {
        assert!(table.validate().is_ok());
        let _ = table.level_at(3.7);
        if let Ok(json) = table.to_json() {
            assert_eq!(SocTable::from_json(&json).ok(), Some(table));
        }
    }
});
