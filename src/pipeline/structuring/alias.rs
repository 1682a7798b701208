//! Label alias resolution.
//!
//! Vision models rarely reproduce parameter names verbatim: a drawing's data
//! table says "BORE", a title block says "DWG NO.", the model echoes either.
//! Every surface spelling is folded onto one [`ParameterKey`] here.
//!
//! Matching is case-insensitive and ignores punctuation. Resolution order:
//! 1. exact match of the normalized label against an alias
//! 2. longest alias that is a whole-word prefix of the label
//! 3. longest alias found inside the label as whole words (aliases of at
//!    least [`MIN_CONTAINED_ALIAS_LEN`] characters only)
//!
//! Whole-word matching keeps "ID" out of "FLUID" and lets "ROD END" beat "ROD".
//! Labels qualified as test, proof, burst or peak ratings never resolve, so they
//! cannot overwrite the operating values.

use std::sync::LazyLock;

use super::types::ParameterKey;

/// Surface spelling → canonical key. Entries are written pre-normalized
/// (uppercase, no punctuation, single spaces).
const ALIASES: &[(&str, ParameterKey)] = &[
    // CYLINDER ACTION
    ("CYLINDER ACTION", ParameterKey::CylinderAction),
    ("CYL ACTION", ParameterKey::CylinderAction),
    ("ACTION", ParameterKey::CylinderAction),
    // BORE DIAMETER
    ("BORE DIAMETER", ParameterKey::BoreDiameter),
    ("BORE DIA", ParameterKey::BoreDiameter),
    ("CYLINDER BORE", ParameterKey::BoreDiameter),
    ("BORE", ParameterKey::BoreDiameter),
    ("ID", ParameterKey::BoreDiameter),
    // ROD DIAMETER
    ("ROD DIAMETER", ParameterKey::RodDiameter),
    ("ROD DIA", ParameterKey::RodDiameter),
    ("PISTON ROD", ParameterKey::RodDiameter),
    ("ROD", ParameterKey::RodDiameter),
    ("RD", ParameterKey::RodDiameter),
    // STROKE LENGTH
    ("STROKE LENGTH", ParameterKey::StrokeLength),
    ("STROKE", ParameterKey::StrokeLength),
    ("SL", ParameterKey::StrokeLength),
    // CLOSE LENGTH
    ("CLOSE LENGTH", ParameterKey::CloseLength),
    ("CLOSED LENGTH", ParameterKey::CloseLength),
    ("RETRACTED LENGTH", ParameterKey::CloseLength),
    ("CLOSE", ParameterKey::CloseLength),
    ("CLOSED", ParameterKey::CloseLength),
    // OPERATING PRESSURE
    ("OPERATING PRESSURE", ParameterKey::OperatingPressure),
    ("WORKING PRESSURE", ParameterKey::OperatingPressure),
    ("PRESSURE", ParameterKey::OperatingPressure),
    // OPERATING TEMPERATURE
    ("OPERATING TEMPERATURE", ParameterKey::OperatingTemperature),
    ("TEMPERATURE", ParameterKey::OperatingTemperature),
    ("TEMP", ParameterKey::OperatingTemperature),
    // MOUNTING
    ("MOUNTING", ParameterKey::Mounting),
    ("MOUNTING TYPE", ParameterKey::Mounting),
    ("MOUNTING STYLE", ParameterKey::Mounting),
    ("MOUNT", ParameterKey::Mounting),
    // ROD END
    ("ROD END", ParameterKey::RodEnd),
    ("ROD END STYLE", ParameterKey::RodEnd),
    // FLUID
    ("FLUID", ParameterKey::Fluid),
    ("MEDIUM", ParameterKey::Fluid),
    ("OPERATING MEDIUM", ParameterKey::Fluid),
    // DRAWING NUMBER
    ("DRAWING NUMBER", ParameterKey::DrawingNumber),
    ("DRAWING NO", ParameterKey::DrawingNumber),
    ("DWG NO", ParameterKey::DrawingNumber),
    ("DRG NO", ParameterKey::DrawingNumber),
    ("PART NO", ParameterKey::DrawingNumber),
    ("PART NUMBER", ParameterKey::DrawingNumber),
    // REVISION
    ("REVISION", ParameterKey::Revision),
    ("REV", ParameterKey::Revision),
];

/// Words marking a rating other than the operating point ("TEST PRESSURE",
/// "BURST PRESSURE"). Such labels resolve to nothing.
const NON_OPERATING_QUALIFIERS: &[&str] = &["TEST", "PROOF", "BURST", "PEAK"];

/// Short abbreviations ("ID", "RD", "REV") only count at the start of a label.
const MIN_CONTAINED_ALIAS_LEN: usize = 4;

/// Aliases sorted longest first so prefix and containment passes prefer the
/// most specific spelling.
static ALIASES_BY_LENGTH: LazyLock<Vec<(&'static str, ParameterKey)>> = LazyLock::new(|| {
    let mut sorted = ALIASES.to_vec();
    sorted.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    sorted
});

/// Resolve a free-form label to its canonical key. `None` when nothing matches.
pub fn resolve_label(label: &str) -> Option<ParameterKey> {
    let normalized = normalize_label(label);
    if normalized.is_empty() {
        return None;
    }

    if let Some(&(_, key)) = ALIASES.iter().find(|(alias, _)| *alias == normalized) {
        return Some(key);
    }
    if normalized
        .split(' ')
        .any(|word| NON_OPERATING_QUALIFIERS.contains(&word))
    {
        return None;
    }

    let prefixed = ALIASES_BY_LENGTH.iter().find(|(alias, _)| {
        normalized
            .strip_prefix(alias)
            .is_some_and(|rest| rest.starts_with(' '))
    });
    if let Some(&(_, key)) = prefixed {
        return Some(key);
    }

    let padded = format!(" {normalized} ");
    ALIASES_BY_LENGTH
        .iter()
        .filter(|(alias, _)| alias.len() >= MIN_CONTAINED_ALIAS_LEN)
        .find(|(alias, _)| padded.contains(&format!(" {alias} ")))
        .map(|&(_, key)| key)
}

/// Uppercase, drop punctuation, collapse whitespace, strip list numbering.
///
/// `"**Dwg. No.**"` → `"DWG NO"`, `"3. Stroke"` → `"STROKE"`, `"S.L."` → `"SL"`.
pub fn normalize_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c.to_ascii_uppercase())
            } else if c.is_whitespace() || c == '_' || c == '-' || c == '/' {
                Some(' ')
            } else {
                None
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .skip_while(|word| word.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ")
}
