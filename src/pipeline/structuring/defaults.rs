use super::types::{ParameterKey, ParameterRecord, ParameterValue, FLUID_AIR, FLUID_HYDRAULIC};

pub const ACTION_DOUBLE: &str = "DOUBLE ACTING";
pub const ACTION_SINGLE: &str = "SINGLE ACTING";
pub const ROD_END_CLEVIS: &str = "clevis";
pub const ROD_END_THREAD: &str = "thread";

/// Mounting value that implies a clevis rod end. Matched exactly.
const MOUNTING_CLEVIS: &str = "Clevis";

/// Fill the non-critical fields that follow from already resolved ones.
///
/// Only CYLINDER ACTION and ROD END are ever written, and only while `NA`:
/// - CYLINDER ACTION from FLUID (hydraulic → double acting, air → single acting)
/// - ROD END from MOUNTING (`Clevis` → clevis, anything else → thread)
///
/// ROD END always ends up resolved. Returns the keys that were filled.
pub fn apply_conservative_defaults(record: &mut ParameterRecord) -> Vec<ParameterKey> {
    let mut filled = Vec::new();

    if record.is_na(ParameterKey::CylinderAction) {
        if let Some(action) = infer_action(record.get(ParameterKey::Fluid)) {
            record.set(
                ParameterKey::CylinderAction,
                ParameterValue::Text(action.to_string()),
            );
            filled.push(ParameterKey::CylinderAction);
        }
    }

    if record.is_na(ParameterKey::RodEnd) {
        let rod_end = match record.text(ParameterKey::Mounting) {
            Some(MOUNTING_CLEVIS) => ROD_END_CLEVIS,
            _ => ROD_END_THREAD,
        };
        record.set(ParameterKey::RodEnd, ParameterValue::Text(rod_end.to_string()));
        filled.push(ParameterKey::RodEnd);
    }

    tracing::debug!(filled = ?filled, "Applied conservative defaults");
    filled
}

/// Recompute the defaults after later merges may have resolved their sources.
///
/// Only `synthesized` keys (those a previous [`apply_conservative_defaults`]
/// filled) are cleared and derived again; values read from the drawing are
/// never touched. Returns the keys now holding a synthesized value.
pub fn rederive_defaults(
    record: &mut ParameterRecord,
    synthesized: &[ParameterKey],
) -> Vec<ParameterKey> {
    for &key in synthesized {
        record.set(key, ParameterValue::Na);
    }
    apply_conservative_defaults(record)
}

fn infer_action(fluid: &ParameterValue) -> Option<&'static str> {
    let fluid = fluid.text()?;
    let lower = fluid.to_lowercase();
    if fluid == FLUID_HYDRAULIC || lower.contains("hydraulic") {
        Some(ACTION_DOUBLE)
    } else if fluid == FLUID_AIR || lower.contains("air") {
        Some(ACTION_SINGLE)
    } else {
        None
    }
}
