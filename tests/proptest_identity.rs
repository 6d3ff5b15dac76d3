//! Property-based tests for rule identity and the document readers.
//!
//! Keys must be stable across revision suffixes, and neither reader may
//! panic on arbitrary input.

use chrono::{TimeZone, Utc};
use cklb_sync::identity::normalize_key;
use cklb_sync::model::{Rule, RuleStatus};
use cklb_sync::parsers::{parse_benchmark_str, BenchmarkSource};
use cklb_sync::{resolve_key, store};
use proptest::prelude::*;

fn source() -> BenchmarkSource {
    BenchmarkSource::new(
        "fuzz-xccdf.xml",
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn revision_suffix_does_not_change_key(
        number in 1u32..10_000_000,
        rev_a in 1u32..1_000_000,
        rev_b in 1u32..1_000_000,
    ) {
        let a = normalize_key(&format!("SV-{number}r{rev_a}_rule"));
        let b = normalize_key(&format!("SV-{number}r{rev_b}"));
        prop_assert_eq!(&a, &format!("SV-{number}"));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn normalize_is_idempotent(raw in "\\PC{0,40}") {
        let once = normalize_key(&raw);
        prop_assert_eq!(normalize_key(&once), once);
    }

    #[test]
    fn non_sv_ids_are_kept_verbatim(raw in "[A-RT-Z][A-Za-z0-9_-]{0,30}") {
        prop_assert_eq!(normalize_key(&raw), raw);
    }

    #[test]
    fn rule_id_wins_over_group_id(
        rule_id in "SV-[0-9]{1,7}r[0-9]{1,6}",
        group_id in "V-[0-9]{1,7}",
    ) {
        let rule = Rule {
            rule_id: rule_id.clone(),
            group_id_src: group_id.clone(),
            ..Rule::default()
        };
        prop_assert_eq!(resolve_key(&rule), normalize_key(&rule_id));

        let group_only = Rule {
            group_id_src: group_id.clone(),
            ..Rule::default()
        };
        prop_assert_eq!(resolve_key(&group_only), group_id);
    }

    #[test]
    fn status_strings_survive_round_trip(status in "[a-z_]{1,20}") {
        let parsed = RuleStatus::from(status.clone());
        prop_assert_eq!(String::from(parsed), status);
    }

    #[test]
    fn load_str_doesnt_panic(s in "\\PC{0,2000}") {
        let _ = store::load_str(&s);
    }

    #[test]
    fn json_like_checklists_dont_panic(
        s in prop::string::string_regex(r#"\{"title":"t","id":"i","stigs":\[[^\]]{0,300}\]\}"#).unwrap()
    ) {
        let _ = store::load_str(&s);
    }

    #[test]
    fn benchmark_parser_doesnt_panic(s in "\\PC{0,2000}") {
        let result = parse_benchmark_str(&s, &source());
        prop_assert!(result.is_err(), "Random input should not parse as a benchmark: {:?}", s);
    }

    #[test]
    fn xml_like_input_doesnt_panic(
        s in prop::string::string_regex(r#"<[A-Za-z]{1,20}( id="[^"]{0,10}")?>[^<]{0,200}</[A-Za-z]{1,20}>"#).unwrap()
    ) {
        let _ = parse_benchmark_str(&s, &source());
    }
}
