// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ActionType, Category, Challenge, DateNightPairing, ImageSearch, InteractionLog, Restaurant, SavedRestaurant,
    TasteDna, TasteProfile, TwinMatch, TwinRelationship, User, UserAchievement, UserChallenge,
};
pub use requests::*;
pub use responses::*;
