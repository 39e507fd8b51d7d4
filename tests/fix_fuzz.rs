use proptest::prelude::*;
use syncable_yamlfix::analyzer::yamlfix::{FixOptions, Severity, ValidateOptions, fix, validate};

/// Lines that look like manifest content: indents, list markers, keys with
/// and without colons, quotes, comments and block-scalar markers.
fn manifest_line() -> impl Strategy<Value = String> {
    "[ \t]{0,6}(- ?|-)?[a-zA-Z]{0,12}(:|: | |:\"|: '|: \\|)?[a-zA-Z0-9 \"'#|>:.-]{0,16}"
}

fn manifest() -> impl Strategy<Value = String> {
    prop::collection::vec(manifest_line(), 0..24).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn fix_never_panics_on_manifest_like_input(
        content in manifest(),
        aggressive in any::<bool>(),
        step in 1usize..=8,
    ) {
        let options = FixOptions::new().with_aggressive(aggressive).with_indent_step(step);
        let result = fix(&content, &options);

        prop_assert!((0.0..=1.0).contains(&result.confidence));
        prop_assert!(result.iterations >= 1);
        let partitioned = result.accepted().len() + result.needs_review().len();
        prop_assert_eq!(partitioned, result.changes.len());
        if result.is_valid {
            prop_assert!(result.errors.iter().all(|e| e.severity < Severity::Error));
        }
    }

    #[test]
    fn validate_never_panics_on_manifest_like_input(content in manifest(), step in 1usize..=8) {
        let report = validate(&content, &ValidateOptions::default().with_indent_step(step));
        prop_assert_eq!(report.valid, report.error_count() == 0);
    }

    #[test]
    fn fix_never_panics_on_arbitrary_text(content in ".*") {
        let result = fix(&content, &FixOptions::default());
        prop_assert!((0.0..=1.0).contains(&result.confidence));
        let _ = validate(&content, &ValidateOptions::default());
    }
}
