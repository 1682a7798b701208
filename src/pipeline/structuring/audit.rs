use super::types::{ParameterKey, ParameterRecord, CRITICAL_SET};

/// Critical parameters still `NA`, in [`CRITICAL_SET`] order.
///
/// A non-empty result means a focused re-query is warranted for each listed
/// key. No network call happens here; acting on the result is the caller's choice.
pub fn audit_critical_fields(record: &ParameterRecord) -> Vec<ParameterKey> {
    let missing: Vec<ParameterKey> = CRITICAL_SET
        .iter()
        .copied()
        .filter(|&key| record.is_na(key))
        .collect();

    if !missing.is_empty() {
        tracing::debug!(missing = ?missing, "Critical parameters unresolved");
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::types::ParameterValue;

    #[test]
    fn empty_record_misses_full_critical_set() {
        assert_eq!(
            audit_critical_fields(&ParameterRecord::new()),
            CRITICAL_SET.to_vec()
        );
    }

    #[test]
    fn mounting_resolved_leaves_bore_and_fluid() {
        let mut record = ParameterRecord::new();
        record.set(ParameterKey::Mounting, ParameterValue::from_text("Flange"));
        assert_eq!(
            audit_critical_fields(&record),
            vec![ParameterKey::BoreDiameter, ParameterKey::Fluid]
        );
    }

    #[test]
    fn fully_resolved_is_empty() {
        let mut record = ParameterRecord::new();
        for key in CRITICAL_SET {
            record.set(key, ParameterValue::from_text("x"));
        }
        assert!(audit_critical_fields(&record).is_empty());
    }

    #[test]
    fn non_critical_gaps_are_ignored() {
        let mut record = ParameterRecord::new();
        record.set(ParameterKey::BoreDiameter, ParameterValue::from_text("50"));
        record.set(ParameterKey::Fluid, ParameterValue::from_text("AIR"));
        record.set(ParameterKey::Mounting, ParameterValue::from_text("Trunnion"));
        assert!(record.is_na(ParameterKey::Revision));
        assert!(audit_critical_fields(&record).is_empty());
    }
}
