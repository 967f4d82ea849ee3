//! Dish detection for uploaded food photos.
//!
//! There is no vision model behind this: the dish is guessed from keywords
//! in the uploaded file name.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedFood {
    pub dish: &'static str,
    pub cuisine: &'static str,
    /// Yelp category alias used for the follow-up search
    pub category: &'static str,
    pub confidence: f64,
}

const KEYWORD_CONFIDENCE: f64 = 0.85;
const FALLBACK_CONFIDENCE: f64 = 0.6;

/// Checked in order; the first keyword found wins
const FOOD_KEYWORDS: [(&str, &str, &str, &str); 10] = [
    ("pizza", "Pizza", "Italian", "pizza"),
    ("sushi", "Sushi", "Japanese", "sushi"),
    ("burger", "Burger", "American", "burgers"),
    ("taco", "Tacos", "Mexican", "mexican"),
    ("curry", "Curry", "Indian", "indpak"),
    ("ramen", "Ramen", "Japanese", "ramen"),
    ("pasta", "Pasta", "Italian", "italian"),
    ("pho", "Pho", "Vietnamese", "vietnamese"),
    ("dim sum", "Dim Sum", "Chinese", "dimsum"),
    ("pad thai", "Pad Thai", "Thai", "thai"),
];

pub fn detect_food(filename: Option<&str>) -> DetectedFood {
    let name = filename.unwrap_or_default().to_lowercase();

    FOOD_KEYWORDS
        .iter()
        .find(|(keyword, ..)| name.contains(keyword))
        .map(|&(_, dish, cuisine, category)| DetectedFood {
            dish,
            cuisine,
            category,
            confidence: KEYWORD_CONFIDENCE,
        })
        .unwrap_or(DetectedFood {
            dish: "Restaurant Food",
            cuisine: "Various",
            category: "restaurants",
            confidence: FALLBACK_CONFIDENCE,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_detection() {
        let found = detect_food(Some("My_Sushi_Night.JPG"));
        assert_eq!(found.dish, "Sushi");
        assert_eq!(found.category, "sushi");
        assert_eq!(found.confidence, 0.85);
    }

    #[test]
    fn test_multiword_keyword() {
        assert_eq!(detect_food(Some("best pad thai.png")).cuisine, "Thai");
    }

    #[test]
    fn test_unknown_or_missing_name() {
        let found = detect_food(Some("IMG_0001.jpg"));
        assert_eq!(found.dish, "Restaurant Food");
        assert_eq!(found.confidence, 0.6);
        assert_eq!(detect_food(None).category, "restaurants");
    }
}
