use crate::pipeline::structuring::{ParameterKey, CRITICAL_SET};

pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"
You are a senior hydraulic and pneumatic cylinder engineer reading 2D technical
drawings. You extract design values from specification tables, title blocks,
dimension lines, balloons and notes, and you cross-check them against each other.
When a value is not written explicitly, use established engineering practice and
the inference rules you are given. Answer "NA" only when a parameter cannot be
determined from the drawing at all.
"#;

/// Build the twelve-parameter extraction instruction.
///
/// The final output block is what the response parser consumes; everything
/// above it steers the model toward values the parser and fluid classifier
/// can use.
pub fn build_extraction_prompt() -> String {
    let output_block: String = ParameterKey::ALL
        .iter()
        .map(|key| format!("{}: \n", key.as_str()))
        .collect();

    format!(
        r#"Extract exactly these 12 parameters from the cylinder drawing, and nothing else:
{parameter_list}
EXTRACTION RULES
1. Prefer values written in specification or technical data tables, then the title block, then dimensions and notes.
2. Keep units as written (mm, bar, °C). Drop complex symbols such as Ø or ⌀ and keep the number.
3. Use "NA" only after every inference possibility is exhausted.

LABEL EQUIVALENCES
- "BORE:", "BORE DIA:", "ID:" → BORE DIAMETER
- "ROD:", "RD:" → ROD DIAMETER
- "STROKE:", "S.L." → STROKE LENGTH
- "CLOSE:", "CLOSED LENGTH:" → CLOSE LENGTH
- "PRESSURE:", "WORKING PRESSURE:" → OPERATING PRESSURE
- "TEMP:" → OPERATING TEMPERATURE
- "DWG NO:", "DRG NO:", "PART NO:" → DRAWING NUMBER
- "REV" → REVISION
- "FLUID:", "MEDIUM:" → FLUID
- "ACTION:" → CYLINDER ACTION

MOUNTING: one of Clevis, Flange, Lug, Trunnion, Rod Eye, Foot, judged from the end views and labels.
ROD END: thread (male or female), clevis (U-shaped fork with pin hole) or rod eye (looped end, often with a spherical bearing).
CYLINDER ACTION: two working ports suggest DOUBLE ACTING, one port SINGLE ACTING.

FLUID RULES
- "Mineral Oil" → HYD. OIL MINERAL
- "HLP68", "ISO VG46", "Synthetic Oil" and other named oils → keep as written
- "Compressed Air", "Pneumatic", "Air" → AIR
- If no fluid is written, decide hydraulic vs pneumatic from the evidence below.

FLUID EVIDENCE (score each side)
| Evidence | Hydraulic | Pneumatic |
| Explicit terms | HYDRAULIC, MINERAL OIL, HLP, VG32, ATF (+5) | PNEUMATIC, AIR, COMPRESSED AIR, ISO 8573 (+5) |
| Pressure | above 60 bar (+5) | 12 bar or less (+5) |
| Threads and ports | M64x3, 1" BSP (+3) | G1/8, 1/4 NPT, M16x1 (+3) |
| Bore / rod | large bore, thick rod e.g. 160/110 (+2) | medium bore, thin rod e.g. 80/25 (+2) |
| Construction | spherical bearings, welded housing, heavy tie rods (+2) | magnetic piston, light alloy, ISO pattern (+2) |

OUTPUT
First write one reasoning line per parameter as "<PARAMETER> -> <reasoning>".
Then write the final block below with one value per line and no extra words:

{output_block}"#,
        parameter_list = ParameterKey::ALL
            .iter()
            .enumerate()
            .map(|(i, key)| format!("{}. {}\n", i + 1, key.as_str()))
            .collect::<String>(),
    )
}

/// System prompt for a single-parameter re-query.
pub fn focused_system_prompt(key: ParameterKey) -> String {
    format!(
        "You are a specialist in reading {} from cylinder technical drawings. \
         Report only what the drawing supports.",
        key.as_str()
    )
}

/// Narrow instruction for one critical parameter. `None` for keys outside the critical set.
pub fn focused_prompt(key: ParameterKey) -> Option<&'static str> {
    if !CRITICAL_SET.contains(&key) {
        return None;
    }
    let prompt = match key {
        ParameterKey::BoreDiameter => FOCUSED_BORE_PROMPT,
        ParameterKey::Fluid => FOCUSED_FLUID_PROMPT,
        ParameterKey::Mounting => FOCUSED_MOUNTING_PROMPT,
        _ => return None,
    };
    Some(prompt)
}

const FOCUSED_BORE_PROMPT: &str = r#"
TASK: find the BORE DIAMETER written in a specification table or an explicit label.

- Accept only labels such as "BORE:", "BORE DIA:", "BORE DIAMETER:" or "ID:".
- Do not derive it from dimension lines or by measuring the view.
- Look in specification tables and technical data boxes first.
- If it is not written, answer NA.

Output on the last line: BORE DIAMETER: <number> or BORE DIAMETER: NA
"#;

const FOCUSED_FLUID_PROMPT: &str = r#"
TASK: find the FLUID exactly as the drawing writes it.

Look at the title block, operating conditions, the technical data table and any
"Fluid:" or "Medium:" label.

- "Hydraulic oil HLP68" stays "Hydraulic oil HLP68"
- "ISO VG46" stays "ISO VG46"
- "Mineral Oil" may be given as HYD. OIL MINERAL
- "Air" is given as AIR

Output on the last line: FLUID: <fluid as written> or FLUID: NA
"#;

const FOCUSED_MOUNTING_PROMPT: &str = r#"
TASK: identify the MOUNTING type from the drawing's structure and labels.

- CLEVIS: two parallel ears with a pin bore, often a spherical bearing
- FLANGE: round or square plate with a bolt pattern
- LUG: brackets on the side of the barrel
- TRUNNION: pivot pins through the barrel
- ROD EYE: a single eye at the cap end

Output on the last line: MOUNTING: <Clevis|Flange|Lug|Trunnion|Rod Eye> or MOUNTING: NA
"#;
