//! The fixed skill vocabulary.
//!
//! Any category outside this list is an activity (boss, minigame, clue
//! scroll tier). The order is the in-game skill panel order and is used
//! for presentation only.

pub const SKILL_NAMES: [&str; 24] = [
    "Overall",
    "Attack",
    "Defence",
    "Strength",
    "Hitpoints",
    "Ranged",
    "Prayer",
    "Magic",
    "Cooking",
    "Woodcutting",
    "Fletching",
    "Fishing",
    "Firemaking",
    "Crafting",
    "Smithing",
    "Mining",
    "Herblore",
    "Agility",
    "Thieving",
    "Slayer",
    "Farming",
    "Runecraft",
    "Hunter",
    "Construction",
];

/// Category that aggregates every skill.
pub const OVERALL: &str = "Overall";

pub fn is_skill(category: &str) -> bool {
    SKILL_NAMES.contains(&category)
}

/// Position of a skill in the presentation order.
pub fn skill_order(category: &str) -> Option<usize> {
    SKILL_NAMES.iter().position(|s| *s == category)
}
