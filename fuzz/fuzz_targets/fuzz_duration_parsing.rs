#![no_main]

use envar::coerce::duration;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // === Parsing should never panic, including on overflow ===
    match duration::parse(data) {
        Ok(parsed) => {
            // An explicit plus sign parses the same
            if !data.starts_with(['+', '-']) {
                assert_eq!(duration::parse(&format!("+{data}")).ok(), Some(parsed));
            }
        }
        Err(err) => {
            let _ = err.to_string();
        }
    }
});
