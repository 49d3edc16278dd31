use crate::core_modules::region::Region;
use serde::{Deserialize, Serialize};

/// Fragments whose tops are closer than this share a reading row.
pub const ROW_TOLERANCE: u32 = 50;

/// Text recognized inside one marked region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedFragment {
    pub text: String,
    pub region: Region,
    #[serde(default)]
    pub confidence: f32,
}

impl RecognizedFragment {
    pub fn new(text: impl Into<String>, region: Region, confidence: f32) -> Self {
        Self {
            text: text.into(),
            region,
            confidence,
        }
    }
}

/// Reading order: top-to-bottom in bands of `ROW_TOLERANCE`, left-to-right within a band.
///
/// A band is anchored at its first (topmost) fragment, so a long diagonal run of
/// fragments cannot chain into a single row.
pub fn canonical_order(mut fragments: Vec<RecognizedFragment>) -> Vec<RecognizedFragment> {
    fragments.sort_by_key(|fragment| (fragment.region.y, fragment.region.x));

    let mut ordered = Vec::with_capacity(fragments.len());
    let mut band: Vec<RecognizedFragment> = Vec::new();
    let mut band_top = 0;

    for fragment in fragments {
        if !band.is_empty() && fragment.region.y - band_top >= ROW_TOLERANCE {
            band.sort_by_key(|fragment| fragment.region.x);
            ordered.append(&mut band);
        }
        if band.is_empty() {
            band_top = fragment.region.y;
        }
        band.push(fragment);
    }
    band.sort_by_key(|fragment| fragment.region.x);
    ordered.append(&mut band);

    ordered
}
