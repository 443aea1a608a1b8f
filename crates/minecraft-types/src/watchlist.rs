//! Allow-lists for notification-worthy entities, items, and blocks

use serde::{Deserialize, Serialize};

/// Name allow-lists used by the normalizer.
///
/// Matching is case-insensitive substring containment, so `"diamond"`
/// covers `diamond_ore`, `deepslate_diamond_ore`, and `diamond_sword`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchLists {
    #[serde(default = "default_rare_entities")]
    pub rare_entities: Vec<String>,
    #[serde(default = "default_valuable_items")]
    pub valuable_items: Vec<String>,
    #[serde(default = "default_notable_blocks")]
    pub notable_blocks: Vec<String>,
}

fn default_rare_entities() -> Vec<String> {
    ["ender_dragon", "wither", "warden", "elder_guardian", "shulker"]
        .map(String::from)
        .to_vec()
}

fn default_valuable_items() -> Vec<String> {
    ["diamond", "emerald", "gold", "iron", "netherite", "enchanted", "totem"]
        .map(String::from)
        .to_vec()
}

fn default_notable_blocks() -> Vec<String> {
    ["diamond", "emerald", "gold_ore", "iron_ore", "ancient_debris", "spawner"]
        .map(String::from)
        .to_vec()
}

impl Default for WatchLists {
    fn default() -> Self {
        Self {
            rare_entities: default_rare_entities(),
            valuable_items: default_valuable_items(),
            notable_blocks: default_notable_blocks(),
        }
    }
}

fn contains_entry(list: &[String], name: &str) -> bool {
    let name = name.to_lowercase();
    list.iter().any(|entry| name.contains(&entry.to_lowercase()))
}

impl WatchLists {
    pub fn is_rare_entity(&self, name: &str) -> bool {
        contains_entry(&self.rare_entities, name)
    }

    pub fn is_valuable_item(&self, name: &str) -> bool {
        contains_entry(&self.valuable_items, name)
    }

    pub fn is_notable_block(&self, name: &str) -> bool {
        contains_entry(&self.notable_blocks, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rare_entity_substring_match() {
        let lists = WatchLists::default();
        assert!(lists.is_rare_entity("Warden"));
        assert!(lists.is_rare_entity("elder_guardian"));
        assert!(!lists.is_rare_entity("zombie"));
        assert!(!lists.is_rare_entity("creeper"));
    }

    #[test]
    fn test_valuable_item_covers_variants() {
        let lists = WatchLists::default();
        assert!(lists.is_valuable_item("diamond_sword"));
        assert!(lists.is_valuable_item("enchanted_golden_apple"));
        assert!(lists.is_valuable_item("totem_of_undying"));
        assert!(!lists.is_valuable_item("cobblestone"));
    }

    #[test]
    fn test_notable_block_match() {
        let lists = WatchLists::default();
        assert!(lists.is_notable_block("deepslate_diamond_ore"));
        assert!(lists.is_notable_block("spawner"));
        assert!(!lists.is_notable_block("dirt"));
    }

    #[test]
    fn test_custom_lists_replace_defaults() {
        let lists = WatchLists {
            rare_entities: vec!["phantom".to_string()],
            valuable_items: vec![],
            notable_blocks: vec![],
        };
        assert!(lists.is_rare_entity("phantom"));
        assert!(!lists.is_rare_entity("warden"));
        assert!(!lists.is_valuable_item("diamond"));
    }

    #[test]
    fn test_deserialization_fills_defaults() {
        let lists: WatchLists = serde_json::from_str("{}").unwrap();
        assert!(lists.is_rare_entity("wither"));
        assert!(lists.is_valuable_item("netherite_ingot"));
    }
}
