use super::alias::resolve_label;
use super::types::{ParameterRecord, ParameterValue};

/// Values the model uses to say "nothing found". Compared case-insensitively.
const NO_INFORMATION: &[&str] = &[
    "NA",
    "N/A",
    "NOT SPECIFIED",
    "NONE",
    "NOT FOUND",
    "UNKNOWN",
    "",
];

/// Marks a reasoning line in the answer; a colon inside its prose is not a value.
const REASONING_SEPARATOR: &str = "->";

/// Parse the recognition service's free-text answer into a record.
///
/// Each `LABEL: VALUE` line (split at the first colon) whose label resolves
/// to a canonical key overwrites that key; later lines win, so a final
/// summary block supersedes the reasoning block above it. Lines without a
/// colon, reasoning lines (`LABEL -> ...`), unresolved labels and "no
/// information" values are skipped.
/// Total over any input: empty or garbage text yields an all-`NA` record.
pub fn parse_recognition_response(response: &str) -> ParameterRecord {
    let mut record = ParameterRecord::new();
    let mut assigned = 0usize;

    for line in response.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        if label.contains(REASONING_SEPARATOR) {
            continue;
        }
        let Some(key) = resolve_label(label) else {
            continue;
        };
        let Some(value) = clean_value(value) else {
            continue;
        };
        record.set(key, ParameterValue::Text(value));
        assigned += 1;
    }

    tracing::debug!(
        lines = response.lines().count(),
        assigned,
        resolved = record.resolved_count(),
        "Parsed recognition response"
    );

    record
}

/// Strip brackets and edge markup from a raw value. `None` when what remains
/// carries no information.
pub fn clean_value(raw: &str) -> Option<String> {
    let without_brackets: String = raw.chars().filter(|c| *c != '[' && *c != ']').collect();
    let cleaned = without_brackets
        .trim()
        .trim_matches(|c: char| c == '*' || c == '`')
        .trim();

    if is_no_information(cleaned) {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// True for the model's "nothing found" phrases, ignoring case.
pub fn is_no_information(value: &str) -> bool {
    let upper = value.trim().to_uppercase();
    NO_INFORMATION.iter().any(|phrase| *phrase == upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::types::ParameterKey;
    use proptest::prelude::*;

    fn sample_response() -> String {
        r#"Scratchpad:
BORE DIAMETER : spec table row 2 lists BORE 110, confirmed by the section view
FLUID : title block says "Medium: Mineral oil HLP46"

CYLINDER ACTION: DOUBLE ACTING
BORE DIAMETER: 110 mm
ROD DIAMETER: 70 mm
STROKE LENGTH: 500 mm
CLOSE LENGTH: 845 mm
OPERATING PRESSURE: 210 bar
OPERATING TEMPERATURE: -20 to +80 °C
MOUNTING: Clevis
ROD END: Rod eye
FLUID: Mineral oil HLP46
DRAWING NUMBER: HC-110-70-500
REVISION: C
"#
        .to_string()
    }

    #[test]
    fn parse_full_response() {
        let record = parse_recognition_response(&sample_response());

        assert_eq!(record.get(ParameterKey::CylinderAction).as_str(), "DOUBLE ACTING");
        assert_eq!(record.get(ParameterKey::BoreDiameter).as_str(), "110 mm");
        assert_eq!(record.get(ParameterKey::RodDiameter).as_str(), "70 mm");
        assert_eq!(record.get(ParameterKey::StrokeLength).as_str(), "500 mm");
        assert_eq!(record.get(ParameterKey::CloseLength).as_str(), "845 mm");
        assert_eq!(record.get(ParameterKey::OperatingPressure).as_str(), "210 bar");
        assert_eq!(
            record.get(ParameterKey::OperatingTemperature).as_str(),
            "-20 to +80 °C"
        );
        assert_eq!(record.get(ParameterKey::Mounting).as_str(), "Clevis");
        assert_eq!(record.get(ParameterKey::RodEnd).as_str(), "Rod eye");
        assert_eq!(record.get(ParameterKey::Fluid).as_str(), "Mineral oil HLP46");
        assert_eq!(record.get(ParameterKey::DrawingNumber).as_str(), "HC-110-70-500");
        assert_eq!(record.get(ParameterKey::Revision).as_str(), "C");
    }

    #[test]
    fn final_block_overrides_reasoning_block() {
        let record = parse_recognition_response(&sample_response());
        assert_eq!(record.get(ParameterKey::BoreDiameter).as_str(), "110 mm");
    }

    #[test]
    fn aliases_resolve_in_lines() {
        let record = parse_recognition_response("BORE: 110mm\nDRG NO: XYZ-100");
        assert_eq!(record.get(ParameterKey::BoreDiameter).as_str(), "110mm");
        assert_eq!(record.get(ParameterKey::DrawingNumber).as_str(), "XYZ-100");
        assert_eq!(record.resolved_count(), 2);
    }

    #[test]
    fn splits_on_first_colon_only() {
        let record = parse_recognition_response("REVISION: B (2024-01-05 10:30)");
        assert_eq!(record.get(ParameterKey::Revision).as_str(), "B (2024-01-05 10:30)");
    }

    #[test]
    fn brackets_are_removed() {
        let record = parse_recognition_response("STROKE LENGTH: [250]");
        assert_eq!(record.get(ParameterKey::StrokeLength).as_str(), "250");
    }

    #[test]
    fn bold_markdown_output_block() {
        let record = parse_recognition_response("**BORE DIAMETER:** 63\n**MOUNTING**: `Flange`");
        assert_eq!(record.get(ParameterKey::BoreDiameter).as_str(), "63");
        assert_eq!(record.get(ParameterKey::Mounting).as_str(), "Flange");
    }

    #[test]
    fn no_information_values_stay_na() {
        let text = "BORE DIAMETER: N/A\nROD DIAMETER: not specified\nSTROKE LENGTH: [NA]\n\
                    CLOSE LENGTH: Unknown\nMOUNTING: none\nFLUID: NOT FOUND\nREVISION:";
        let record = parse_recognition_response(text);
        assert_eq!(record.resolved_count(), 0);
    }

    #[test]
    fn no_information_does_not_erase_earlier_value() {
        let record = parse_recognition_response("MOUNTING: Flange\nMOUNTING: NA");
        assert_eq!(record.get(ParameterKey::Mounting).as_str(), "Flange");
    }

    #[test]
    fn test_pressure_does_not_overwrite_operating_pressure() {
        let record =
            parse_recognition_response("OPERATING PRESSURE: 160 bar\nTEST PRESSURE: 240 bar");
        assert_eq!(record.get(ParameterKey::OperatingPressure).as_str(), "160 bar");
    }

    #[test]
    fn reasoning_lines_never_become_values() {
        let text = "MOUNTING -> end view: two ears with pin bore\nFLUID -> not stated: NA\nMOUNTING: NA";
        let record = parse_recognition_response(text);
        assert!(record.is_na(ParameterKey::Mounting));
        assert!(record.is_na(ParameterKey::Fluid));
    }

    #[test]
    fn lines_without_colon_are_ignored() {
        let record = parse_recognition_response("BORE 110\nThe drawing shows a clevis mount");
        assert_eq!(record.resolved_count(), 0);
    }

    #[test]
    fn unresolved_labels_are_dropped() {
        let record = parse_recognition_response("SCALE: 1:5\nMATERIAL: CK45\nSTROKE: 300");
        assert_eq!(record.resolved_count(), 1);
        assert_eq!(record.get(ParameterKey::StrokeLength).as_str(), "300");
    }

    #[test]
    fn bore_is_not_gated_on_table_keywords() {
        let record = parse_recognition_response("BORE DIAMETER: 80");
        assert_eq!(record.get(ParameterKey::BoreDiameter).as_str(), "80");
    }

    #[test]
    fn empty_and_garbage_input_is_all_na() {
        assert_eq!(parse_recognition_response(""), ParameterRecord::new());
        assert_eq!(
            parse_recognition_response(":::\n\u{0}\n]]]:[[[\n: : :"),
            ParameterRecord::new()
        );
    }

    #[test]
    fn crlf_line_endings() {
        let record = parse_recognition_response("BORE: 50\r\nROD: 20\r\n");
        assert_eq!(record.get(ParameterKey::BoreDiameter).as_str(), "50");
        assert_eq!(record.get(ParameterKey::RodDiameter).as_str(), "20");
    }

    #[test]
    fn clean_value_examples() {
        assert_eq!(clean_value("  [Clevis] ").as_deref(), Some("Clevis"));
        assert_eq!(clean_value(" n/a "), None);
        assert_eq!(clean_value(""), None);
    }

    fn value_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9 .,/+x-]{0,20}[A-Za-z0-9]"
            .prop_filter("no-information phrase", |v| !is_no_information(v))
    }

    proptest! {
        #[test]
        fn canonical_lines_roundtrip(values in proptest::collection::vec(proptest::option::of(value_strategy()), 12)) {
            let mut text = String::new();
            for (key, value) in ParameterKey::ALL.iter().zip(&values) {
                if let Some(v) = value {
                    text.push_str(&format!("{}: {}\n", key.as_str(), v));
                }
            }
            let record = parse_recognition_response(&text);
            for (key, value) in ParameterKey::ALL.iter().zip(&values) {
                match value {
                    Some(v) => prop_assert_eq!(record.get(*key).as_str(), v.as_str()),
                    None => prop_assert!(record.is_na(*key)),
                }
            }
        }

        #[test]
        fn parsing_is_idempotent(text in "\\PC{0,400}") {
            prop_assert_eq!(parse_recognition_response(&text), parse_recognition_response(&text));
        }
    }
}
