#![no_main]
use cklb_sync::{store, DiffEngine};
use libfuzzer_sys::fuzz_target;

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz checklist loading, then diff anything that loads against itself.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(checklist) = store::load_str(s) {
            let report = DiffEngine::new().diff(&checklist, &checklist);
            assert!(report.status_diffs.is_empty());
        }

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                r#"{{"title":"t","id":"i","stigs":[{{"stig_id":"S","stig_name":"S","rules":[{s}]}}]}}"#,
            );
            let _ = store::load_str(&wrapped);
        }
    }
});
