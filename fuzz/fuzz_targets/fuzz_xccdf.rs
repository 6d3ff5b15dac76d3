#![no_main]
use chrono::{TimeZone, Utc};
use cklb_sync::parsers::{BenchmarkSource, XccdfParser};
use libfuzzer_sys::fuzz_target;

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the XCCDF benchmark parser.
///
/// Also wraps the input in a Benchmark root so rule extraction is reached
/// rather than failing at the root element check.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let parser = XccdfParser::new();
        let source = BenchmarkSource::new("fuzz-xccdf.xml", Utc.timestamp_opt(0, 0).unwrap());

        let _ = parser.parse_str(s, &source);

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                r#"<Benchmark xmlns="http://checklists.nist.gov/xccdf/1.1" id="Fuzz_STIG"><Group id="V-1">{s}</Group></Benchmark>"#,
            );
            let _ = parser.parse_str(&wrapped, &source);
        }
    }
});
