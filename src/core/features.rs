use crate::models::TasteProfile;

/// Width of the encoder input
pub const FEATURE_DIM: usize = 64;

/// Cuisines with a dedicated one-hot slot
pub const CUISINE_TYPES: [&str; 16] = [
    "italian",
    "japanese",
    "mexican",
    "chinese",
    "indian",
    "thai",
    "french",
    "mediterranean",
    "korean",
    "vietnamese",
    "american",
    "middle_eastern",
    "greek",
    "spanish",
    "ethiopian",
    "brazilian",
];

pub const AMBIANCE_TYPES: [&str; 5] = ["casual", "upscale", "cozy", "trendy", "lively"];

const CORE_OFFSET: usize = 0;
const CUISINE_OFFSET: usize = 4;
const AMBIANCE_OFFSET: usize = CUISINE_OFFSET + CUISINE_TYPES.len();

/// Normalize a cuisine label to its vocabulary form: lowercase, spaces to underscores
pub fn normalize_cuisine(cuisine: &str) -> String {
    cuisine.trim().to_lowercase().replace(' ', "_")
}

/// Build the fixed-length encoder input for a taste profile.
///
/// Layout:
/// - `[0..4)`   adventure, spice, price sensitivity, cuisine diversity
/// - `[4..20)`  cuisine one-hot (unknown cuisines are ignored)
/// - `[20..25)` ambiance one-hot (missing ambiance counts as casual)
/// - `[25..64)` zero padding
pub fn feature_vector(profile: &TasteProfile) -> [f32; FEATURE_DIM] {
    let mut features = [0.0f32; FEATURE_DIM];

    features[CORE_OFFSET] = profile.adventure_score as f32;
    features[CORE_OFFSET + 1] = profile.spice_tolerance as f32;
    features[CORE_OFFSET + 2] = profile.price_sensitivity as f32;
    features[CORE_OFFSET + 3] = profile.cuisine_diversity as f32;

    for cuisine in &profile.preferred_cuisines {
        let normalized = normalize_cuisine(cuisine);
        if let Some(idx) = CUISINE_TYPES.iter().position(|c| *c == normalized) {
            features[CUISINE_OFFSET + idx] = 1.0;
        }
    }

    let ambiance = profile
        .ambiance_preference
        .as_deref()
        .unwrap_or("casual")
        .to_lowercase();
    if let Some(idx) = AMBIANCE_TYPES.iter().position(|a| *a == ambiance) {
        features[AMBIANCE_OFFSET + idx] = 1.0;
    }

    features
}
