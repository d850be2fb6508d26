use crate::engine::{ExtractionOptions, run_extraction};
use crate::extractors::array_join::join_through;
use crate::report::{Provenance, Strategy};
use crate::tables::LiteralValue;
use crate::tests::sample_key;

fn exhaustive() -> ExtractionOptions {
    ExtractionOptions { exhaustive: true }
}

#[test]
fn scenario_a_short_join_is_wrong_length() {
    let code = r#"
        var IDX = [3, 1, 0, 2];
        var STR = ["a", "b", "c", "d"];
        var key = IDX.map(i => STR[i]).join('');
    "#;
    let report = run_extraction(code, &exhaustive()).unwrap();

    assert!(report.keys.is_empty());
    assert_eq!(report.wrong_length.len(), 1);
    let candidate = &report.wrong_length[0];
    assert_eq!(candidate.value, "dbac");
    assert_eq!(candidate.length, 4);
    assert_eq!(candidate.strategy, Strategy::ArrayJoin);
    match &candidate.provenance {
        Provenance::ArrayJoin {
            index_array,
            string_array,
            ..
        } => {
            assert_eq!(index_array, "IDX");
            assert_eq!(string_array, "STR");
        }
        other => panic!("unexpected provenance {other:?}"),
    }
}

#[test]
fn recovers_a_full_key_through_map_join() {
    let key = sample_key();
    let pool: Vec<String> = "0123456789abcdef".chars().map(String::from).collect();
    let indexes: Vec<String> = key
        .chars()
        .map(|c| pool.iter().position(|p| p == &c.to_string()).unwrap())
        .map(|i| i.to_string())
        .collect();
    let code = format!(
        "var POOL = [{}];\nvar IDX = [{}];\nvar out = IDX.map(i => POOL[i]).join('');\n",
        pool.iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", "),
        indexes.join(", ")
    );
    let report = run_extraction(&code, &ExtractionOptions::default()).unwrap();

    assert_eq!(report.keys.len(), 1);
    assert_eq!(report.keys[0].key, key);
    assert_eq!(report.keys[0].strategy, Strategy::ArrayJoin);
}

#[test]
fn out_of_range_indexes_contribute_nothing() {
    let code = r#"
        var IDX = [0, 9, 1];
        var STR = ["a", "b"];
        var key = IDX.map(i => STR[i]).join('');
    "#;
    let report = run_extraction(code, &exhaustive()).unwrap();

    assert_eq!(report.wrong_length.len(), 1);
    assert_eq!(report.wrong_length[0].value, "ab");
}

#[test]
fn block_body_callback_matches() {
    let code = r#"
        var IDX = [1, 0];
        var STR = ["x", "y"];
        var key = IDX.map(function (i) { return STR[i]; }).join("");
    "#;
    let report = run_extraction(code, &exhaustive()).unwrap();

    assert_eq!(report.wrong_length.len(), 1);
    assert_eq!(report.wrong_length[0].value, "yx");
}

#[test]
fn numeric_pool_elements_join_like_javascript() {
    let code = r#"
        var IDX = [1, 0];
        var NUMS = [10, 20];
        var key = IDX.map(i => NUMS[i]).join('');
    "#;
    let report = run_extraction(code, &exhaustive()).unwrap();

    assert_eq!(report.wrong_length.len(), 1);
    assert_eq!(report.wrong_length[0].value, "2010");
}

#[test]
fn non_empty_separator_is_not_the_pattern() {
    let code = r#"
        var IDX = [0, 1];
        var STR = ["a", "b"];
        var key = IDX.map(i => STR[i]).join('-');
    "#;
    let report = run_extraction(code, &exhaustive()).unwrap();

    assert!(report.keys.is_empty());
    assert!(report.non_hex.is_empty());
    assert!(report.wrong_length.is_empty());
}

#[test]
fn uncollected_arrays_do_not_match() {
    let code = r#"
        var STR = ["a", "b"];
        var key = MYSTERY.map(i => STR[i]).join('');
        var other = STR.map(i => MYSTERY[i]).join('');
    "#;
    let report = run_extraction(code, &exhaustive()).unwrap();

    assert!(report.keys.is_empty());
    assert!(report.wrong_length.is_empty());
}

#[test]
fn scenario_d_extraction_sees_the_final_table() {
    // The join sits between two definitions of STR; whole-program
    // collection means the later one is what resolves.
    let code = r#"
        var IDX = [1, 0];
        var STR = ["x", "y"];
        var key = IDX.map(i => STR[i]).join('');
        var STR = ["a", "b"];
    "#;
    let report = run_extraction(code, &exhaustive()).unwrap();

    assert_eq!(report.wrong_length.len(), 1);
    assert_eq!(report.wrong_length[0].value, "ba");
}

#[test]
fn canonical_numeric_string_indexes_coerce_like_subscripts() {
    // JS coerces "1" to an index; "02" is not canonical and misses.
    let code = r#"
        var IDX = ["1", 0, "02"];
        var STR = ["a", "b", "c"];
        var key = IDX.map(i => STR[i]).join('');
    "#;
    let report = run_extraction(code, &exhaustive()).unwrap();

    assert_eq!(report.wrong_length.len(), 1);
    assert_eq!(report.wrong_length[0].value, "ba");
}

#[test]
fn join_through_skips_unusable_indexes() {
    let pool = vec![
        LiteralValue::Str("a".to_string()),
        LiteralValue::Str("b".to_string()),
    ];
    let index = vec![
        LiteralValue::Num(1.0),
        LiteralValue::Num(-1.0),
        LiteralValue::Num(0.5),
        LiteralValue::Str("00".to_string()),
        LiteralValue::Str("-1".to_string()),
        LiteralValue::Str("1.0".to_string()),
        LiteralValue::Num(2.0),
        LiteralValue::Num(0.0),
    ];
    assert_eq!(join_through(&index, &pool), "ba");
}

#[test]
fn join_through_equals_manual_mapping() {
    let pool: Vec<LiteralValue> = ["q", "w", "e", "r"]
        .iter()
        .map(|s| LiteralValue::Str(s.to_string()))
        .collect();
    let index: Vec<LiteralValue> = [2.0, 0.0, 3.0, 1.0, 2.0]
        .iter()
        .map(|&n| LiteralValue::Num(n))
        .collect();

    let expected: String = [2usize, 0, 3, 1, 2]
        .iter()
        .map(|&i| pool[i].join_piece())
        .collect();
    assert_eq!(join_through(&index, &pool), expected);
    assert_eq!(join_through(&index, &pool), "eqrwe");
}
