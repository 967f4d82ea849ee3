use serde::Serialize;

use crate::models::TasteProfile;

/// Points credited per earned achievement
pub const POINTS_PER_ACHIEVEMENT: i64 = 25;

/// Leaderboard that challenge rewards are credited to
pub const REWARD_BOARD: &str = "adventure";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub challenge_type: &'static str,
    pub target_count: i32,
    pub points_reward: i32,
}

/// Challenges seeded when the catalogue is empty
pub const DEFAULT_CHALLENGES: [ChallengeTemplate; 4] = [
    ChallengeTemplate {
        title: "Twin Explorer",
        description: "Try 5 restaurants loved by your Taste Twins",
        challenge_type: "twin_picks",
        target_count: 5,
        points_reward: 100,
    },
    ChallengeTemplate {
        title: "Cuisine Adventurer",
        description: "Try 3 different cuisine types this week",
        challenge_type: "cuisine_explore",
        target_count: 3,
        points_reward: 75,
    },
    ChallengeTemplate {
        title: "Spice Pioneer",
        description: "Visit 3 restaurants known for spicy food",
        challenge_type: "spice_challenge",
        target_count: 3,
        points_reward: 50,
    },
    ChallengeTemplate {
        title: "Social Foodie",
        description: "Share your TasteDNA card 3 times",
        challenge_type: "social_share",
        target_count: 3,
        points_reward: 30,
    },
];

/// Share of the target reached, capped at 100
pub fn challenge_percentage(progress: i32, target: i32) -> f64 {
    if target <= 0 {
        return 100.0;
    }
    (progress as f64 / target as f64 * 100.0).min(100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

const ACHIEVEMENTS: [(&str, AchievementInfo); 10] = [
    ("first_quiz", AchievementInfo { title: "Taste Pioneer", description: "Completed your first Taste DNA quiz", icon: "🧬" }),
    ("first_twin", AchievementInfo { title: "Twin Found", description: "Found your first Taste Twin", icon: "👯" }),
    ("adventurer", AchievementInfo { title: "Food Adventurer", description: "Tried 10 different restaurants", icon: "🗺️" }),
    ("social_butterfly", AchievementInfo { title: "Social Butterfly", description: "Shared your TasteDNA card", icon: "🦋" }),
    ("spice_master", AchievementInfo { title: "Spice Master", description: "Visited 5 spicy restaurants", icon: "🌶️" }),
    ("first_visit", AchievementInfo { title: "First Step", description: "Marked your first restaurant as visited", icon: "🎯" }),
    ("explorer_5", AchievementInfo { title: "Explorer", description: "Visited 5 restaurants", icon: "🗺️" }),
    ("explorer_10", AchievementInfo { title: "Food Tourist", description: "Visited 10 restaurants", icon: "✈️" }),
    ("explorer_25", AchievementInfo { title: "Gastronome", description: "Visited 25 restaurants", icon: "👨‍🍳" }),
    ("explorer_50", AchievementInfo { title: "Culinary Legend", description: "Visited 50 restaurants", icon: "🏆" }),
];

/// Catalogue entry for an achievement type, if it is a known one
pub fn achievement_info(achievement_type: &str) -> Option<AchievementInfo> {
    ACHIEVEMENTS
        .iter()
        .find(|(kind, _)| *kind == achievement_type)
        .map(|(_, info)| *info)
}

/// Achievement unlocked by reaching exactly `visits` visited restaurants
pub fn visit_milestone(visits: i64) -> Option<&'static str> {
    match visits {
        1 => Some("first_visit"),
        5 => Some("explorer_5"),
        10 => Some("explorer_10"),
        25 => Some("explorer_25"),
        50 => Some("explorer_50"),
        _ => None,
    }
}

pub fn share_text(profile: Option<&TasteProfile>, twin_count: i64) -> String {
    let Some(profile) = profile else {
        return "I haven't discovered my TasteDNA yet! Try TasteSync to find yours.".to_string();
    };

    let adventure = if profile.adventure_score > 0.7 { "adventurous" } else { "classic" };
    let spice = if profile.spice_tolerance > 0.7 { "spice lover" } else { "mild fan" };

    format!(
        "🧬 My TasteDNA: I'm a {} {} with {} Taste Twins! \
         Discover your food personality with TasteSync! #TasteDNA #TasteSync",
        adventure, spice, twin_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_challenges() {
        let social = DEFAULT_CHALLENGES
            .iter()
            .find(|c| c.challenge_type == "social_share")
            .unwrap();
        assert_eq!(social.target_count, 3);
        assert_eq!(social.points_reward, 30);
    }

    #[test]
    fn test_percentage_caps() {
        assert_eq!(challenge_percentage(0, 5), 0.0);
        assert_eq!(challenge_percentage(2, 5), 40.0);
        assert_eq!(challenge_percentage(9, 3), 100.0);
    }

    #[test]
    fn test_visit_milestones_fire_on_exact_counts() {
        assert_eq!(visit_milestone(1), Some("first_visit"));
        assert_eq!(visit_milestone(25), Some("explorer_25"));
        assert_eq!(visit_milestone(6), None);
        assert_eq!(visit_milestone(51), None);
    }

    #[test]
    fn test_achievement_catalogue() {
        assert_eq!(achievement_info("explorer_50").map(|a| a.title), Some("Culinary Legend"));
        assert!(achievement_info("mystery").is_none());
    }

    #[test]
    fn test_share_text() {
        let profile = TasteProfile {
            adventure_score: 0.8,
            spice_tolerance: 0.3,
            ..TasteProfile::default()
        };
        let text = share_text(Some(&profile), 4);
        assert!(text.starts_with("🧬 My TasteDNA: I'm a adventurous mild fan with 4 Taste Twins!"));
        assert!(share_text(None, 0).contains("haven't discovered"));
    }
}
