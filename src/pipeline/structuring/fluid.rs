//! Fluid classification: hydraulic oil vs compressed air.
//!
//! Two stages:
//! 1. **Direct statement**: a stated FLUID value is canonicalized
//!    ("mineral oil" → `HYD. OIL MINERAL`, air/pneumatic → `AIR`) or kept verbatim.
//! 2. **Scored inference**: when FLUID is `NA`, weighted evidence from the
//!    answer text and the other parsed fields is accumulated per side.
//!
//! | Signal                     | Weight |
//! |----------------------------|--------|
//! | Explicit fluid terms       | 5      |
//! | Pressure magnitude         | 5      |
//! | Thread / port callouts     | 3      |
//! | Bore/rod ratio             | 2      |
//! | Construction cues          | 2      |
//!
//! The strictly higher side wins; a tie (including 0–0) leaves `NA`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::types::{ParameterKey, ParameterRecord, ParameterValue, FLUID_AIR, FLUID_HYDRAULIC};

pub const WEIGHT_EXPLICIT_TERM: u32 = 5;
pub const WEIGHT_PRESSURE: u32 = 5;
pub const WEIGHT_THREAD: u32 = 3;
pub const WEIGHT_BORE_ROD_RATIO: u32 = 2;
pub const WEIGHT_CONSTRUCTION: u32 = 2;

/// Above this, only hydraulics are plausible.
const HYDRAULIC_MIN_PRESSURE_BAR: f64 = 60.0;
/// At or below this, shop-air pneumatics.
const PNEUMATIC_MAX_PRESSURE_BAR: f64 = 12.0;

const PSI_TO_BAR: f64 = 0.068_947_6;

/// Large bore with a thick rod (e.g. Ø160/Ø110).
const HYDRAULIC_MIN_BORE_MM: f64 = 100.0;
const HYDRAULIC_MIN_ROD_RATIO: f64 = 0.5;
/// Medium bore with a thin rod (e.g. Ø80/Ø25).
const PNEUMATIC_MAX_BORE_MM: f64 = 125.0;
const PNEUMATIC_MAX_ROD_RATIO: f64 = 0.35;

/// Metric pitch at or above which a thread counts as coarse (M64x3).
const COARSE_PITCH_MM: f64 = 2.0;
/// Metric pitch at or below which a thread counts as fine (M16x1).
const FINE_PITCH_MM: f64 = 1.0;

static HYDRAULIC_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:hydraulic|mineral\s+oil|hlp\s?\d*|vg\s?32|atf)\b").unwrap()
});

static PNEUMATIC_TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:pneumatic|compressed\s+air|air|iso\s?8573)\b").unwrap()
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)*").unwrap());

/// A number and the unit written right after it, if any.
static PRESSURE_READING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)*)\s*(?:(mpa|kpa|psi|bar)\b)?").unwrap()
});

static METRIC_THREAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bM\s?(\d{1,3})\s?[x×]\s?(\d+(?:[.,]\d+)?)").unwrap()
});

static BSP_INCH_THREAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b\d+(?:\s?\d/\d+)?\s?(?:"|''|in(?:ch)?\b)\s?BSP"#).unwrap()
});

static PNEUMATIC_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bG\s?(?:1/8|1/4|3/8)\b|\b(?:1/8|1/4)\s?(?:-\s?\d+\s?)?NPT\b").unwrap()
});

static HYDRAULIC_CONSTRUCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:spherical\s+(?:plain\s+)?bearings?|welded\s+(?:housing|body|construction|cylinder)|heavy(?:[\s-]+duty)?\s+tie[\s-]?rods?)\b",
    )
    .unwrap()
});

static PNEUMATIC_CONSTRUCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:magnetic\s+piston|light\s+alloy|iso\s+pattern|iso\s?15552|iso\s?6432|iso\s?6431)\b",
    )
    .unwrap()
});

/// Which side a signal points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidLean {
    Hydraulic,
    Pneumatic,
}

/// Evidence gathered for one classification call. Each field is one row of
/// the scoring table; a row may point to both sides when the text is mixed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FluidSignals {
    pub hydraulic_terms: bool,
    pub pneumatic_terms: bool,
    /// Stated operating pressure normalized to bar.
    pub pressure_bar: Option<f64>,
    pub hydraulic_thread: bool,
    pub pneumatic_thread: bool,
    /// Bore and rod diameters in millimetres.
    pub bore_rod_mm: Option<(f64, f64)>,
    pub hydraulic_construction: bool,
    pub pneumatic_construction: bool,
}

impl FluidSignals {
    /// Collect signals from the raw answer text and the fields already parsed from it.
    pub fn collect(raw_text: &str, record: &ParameterRecord) -> Self {
        let bore = record.text(ParameterKey::BoreDiameter).and_then(leading_number);
        let rod = record.text(ParameterKey::RodDiameter).and_then(leading_number);

        let (hydraulic_thread, pneumatic_thread) = thread_signals(raw_text);

        Self {
            hydraulic_terms: HYDRAULIC_TERMS.is_match(raw_text),
            pneumatic_terms: PNEUMATIC_TERMS.is_match(raw_text),
            pressure_bar: record
                .text(ParameterKey::OperatingPressure)
                .and_then(pressure_in_bar),
            hydraulic_thread,
            pneumatic_thread,
            bore_rod_mm: bore.zip(rod),
            hydraulic_construction: HYDRAULIC_CONSTRUCTION.is_match(raw_text),
            pneumatic_construction: PNEUMATIC_CONSTRUCTION.is_match(raw_text),
        }
    }

    /// Pressure row verdict.
    pub fn pressure_lean(&self) -> Option<FluidLean> {
        let bar = self.pressure_bar?;
        if bar > HYDRAULIC_MIN_PRESSURE_BAR {
            Some(FluidLean::Hydraulic)
        } else if bar <= PNEUMATIC_MAX_PRESSURE_BAR {
            Some(FluidLean::Pneumatic)
        } else {
            None
        }
    }

    /// Bore/rod row verdict.
    pub fn ratio_lean(&self) -> Option<FluidLean> {
        let (bore, rod) = self.bore_rod_mm?;
        if bore <= 0.0 || rod <= 0.0 || rod >= bore {
            return None;
        }
        let ratio = rod / bore;
        if bore >= HYDRAULIC_MIN_BORE_MM && ratio >= HYDRAULIC_MIN_ROD_RATIO {
            Some(FluidLean::Hydraulic)
        } else if bore <= PNEUMATIC_MAX_BORE_MM && ratio <= PNEUMATIC_MAX_ROD_RATIO {
            Some(FluidLean::Pneumatic)
        } else {
            None
        }
    }
}

/// Per-side evidence totals for one classification call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FluidScore {
    pub hydraulic: u32,
    pub pneumatic: u32,
}

impl FluidScore {
    pub fn from_signals(signals: &FluidSignals) -> Self {
        let mut score = Self::default();

        if signals.hydraulic_terms {
            score.hydraulic += WEIGHT_EXPLICIT_TERM;
        }
        if signals.pneumatic_terms {
            score.pneumatic += WEIGHT_EXPLICIT_TERM;
        }
        score.add(signals.pressure_lean(), WEIGHT_PRESSURE);
        if signals.hydraulic_thread {
            score.hydraulic += WEIGHT_THREAD;
        }
        if signals.pneumatic_thread {
            score.pneumatic += WEIGHT_THREAD;
        }
        score.add(signals.ratio_lean(), WEIGHT_BORE_ROD_RATIO);
        if signals.hydraulic_construction {
            score.hydraulic += WEIGHT_CONSTRUCTION;
        }
        if signals.pneumatic_construction {
            score.pneumatic += WEIGHT_CONSTRUCTION;
        }

        score
    }

    fn add(&mut self, lean: Option<FluidLean>, weight: u32) {
        match lean {
            Some(FluidLean::Hydraulic) => self.hydraulic += weight,
            Some(FluidLean::Pneumatic) => self.pneumatic += weight,
            None => {}
        }
    }

    /// The winning side, or `None` on a tie.
    pub fn verdict(&self) -> Option<FluidLean> {
        match self.hydraulic.cmp(&self.pneumatic) {
            std::cmp::Ordering::Greater => Some(FluidLean::Hydraulic),
            std::cmp::Ordering::Less => Some(FluidLean::Pneumatic),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Canonicalize a stated fluid name. Unrecognized names are kept verbatim.
pub fn canonicalize_fluid(stated: &str) -> String {
    let lower = stated.to_lowercase();
    if lower.contains("mineral oil") {
        FLUID_HYDRAULIC.to_string()
    } else if ["air", "pneumatic", "compressed air"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        FLUID_AIR.to_string()
    } else {
        stated.to_string()
    }
}

/// Resolve the FLUID value of a freshly parsed record.
///
/// Returns the value to store: the canonical form of a stated fluid, the
/// scored verdict when nothing was stated, or `Na` when the evidence ties.
pub fn classify_fluid(raw_text: &str, record: &ParameterRecord) -> ParameterValue {
    if let Some(stated) = record.text(ParameterKey::Fluid) {
        let canonical = canonicalize_fluid(stated);
        tracing::debug!(stated, canonical = %canonical, "Fluid stated directly");
        return ParameterValue::Text(canonical);
    }

    let signals = FluidSignals::collect(raw_text, record);
    let score = FluidScore::from_signals(&signals);
    let verdict = score.verdict();
    tracing::debug!(
        hydraulic = score.hydraulic,
        pneumatic = score.pneumatic,
        verdict = ?verdict,
        "Fluid inferred from scored signals"
    );

    match verdict {
        Some(FluidLean::Hydraulic) => ParameterValue::Text(FLUID_HYDRAULIC.to_string()),
        Some(FluidLean::Pneumatic) => ParameterValue::Text(FLUID_AIR.to_string()),
        None => ParameterValue::Na,
    }
}

/// Highest reading in a pressure value, in bar.
///
/// Each number takes the unit written after it. A bare number takes the next
/// stated unit ("4-10 bar"), else the previous one, else bar. Dual-unit
/// values such as "6 bar (87 psi)" therefore agree with themselves.
fn pressure_in_bar(value: &str) -> Option<f64> {
    let readings: Vec<(f64, Option<String>)> = PRESSURE_READING
        .captures_iter(value)
        .filter_map(|caps| {
            let magnitude = parse_number(&caps[1])?;
            Some((magnitude, caps.get(2).map(|u| u.as_str().to_lowercase())))
        })
        .collect();

    readings
        .iter()
        .enumerate()
        .map(|(i, (magnitude, unit))| {
            let unit = unit
                .as_deref()
                .or_else(|| readings[i + 1..].iter().find_map(|(_, u)| u.as_deref()))
                .or_else(|| readings[..i].iter().rev().find_map(|(_, u)| u.as_deref()))
                .unwrap_or("bar");
            to_bar(*magnitude, unit)
        })
        .fold(None, |acc: Option<f64>, bar| Some(acc.map_or(bar, |a| a.max(bar))))
}

fn to_bar(magnitude: f64, unit: &str) -> f64 {
    match unit {
        "mpa" => magnitude * 10.0,
        "kpa" => magnitude / 100.0,
        "psi" => magnitude * PSI_TO_BAR,
        _ => magnitude,
    }
}

/// First number in a dimension value ("Ø110 mm" → 110).
fn leading_number(value: &str) -> Option<f64> {
    NUMBER.find(value).and_then(|m| parse_number(m.as_str()))
}

/// Comma groups of exactly three digits after a short non-zero head are
/// thousands ("3,000", "1,250.5"); any other comma is a decimal point ("10,5").
fn parse_number(s: &str) -> Option<f64> {
    let mut groups = s.split(',');
    let head = groups.next()?;
    let tail: Vec<&str> = groups.collect();

    let last = tail.len().saturating_sub(1);
    let thousands = !tail.is_empty()
        && (1..=3).contains(&head.len())
        && !head.starts_with('0')
        && !head.contains('.')
        && tail.iter().enumerate().all(|(i, group)| {
            let digits = if i == last {
                group.split('.').next().unwrap_or(group)
            } else {
                group
            };
            digits.len() == 3 && digits.chars().all(|c| c.is_ascii_digit())
        });

    let normalized = if thousands {
        s.replace(',', "")
    } else {
        s.replace(',', ".")
    };
    normalized.parse().ok()
}

/// (coarse/BSP present, fine/small-port present)
fn thread_signals(text: &str) -> (bool, bool) {
    let mut hydraulic = BSP_INCH_THREAD.is_match(text);
    let mut pneumatic = PNEUMATIC_PORT.is_match(text);

    for caps in METRIC_THREAD.captures_iter(text) {
        let Some(pitch) = parse_number(&caps[2]) else {
            continue;
        };
        if pitch >= COARSE_PITCH_MM {
            hydraulic = true;
        } else if pitch <= FINE_PITCH_MM {
            pneumatic = true;
        }
    }

    (hydraulic, pneumatic)
}
