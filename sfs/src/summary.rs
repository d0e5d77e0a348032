//! The headline facts of a save: its title, when it was saved and with which game version.

use serde::Serialize;

use crate::node::Block;
use crate::path::Section;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SaveSummary {
    pub title: Option<String>,
    /// `persistentTimestamp` cut to minutes, e.g. `2024-04-26 18:42`.
    pub saved_at: Option<String>,
    pub version: Option<String>,
    /// Version including build number and platform.
    pub version_full: Option<String>,
}

impl SaveSummary {
    pub fn from_root(root: &Block) -> Self {
        let Some(game) = root.block(Section::Game.name()) else {
            return SaveSummary::default();
        };
        let raw = |key: &str| game.leaf(key).map(|leaf| leaf.raw.clone());

        SaveSummary {
            title: raw("Title"),
            saved_at: game
                .leaf("persistentTimestamp")
                .map(|leaf| leaf.raw.chars().take(16).collect::<String>().replace('T', " ")),
            version: raw("version"),
            version_full: raw("versionFull"),
        }
    }

    /// The short version, or the full one when `full` is set.
    pub fn version(&self, full: bool) -> Option<&str> {
        if full {
            self.version_full.as_deref()
        } else {
            self.version.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Leaf;

    #[test]
    fn reads_game_header() {
        let root = Block::new("").with_child(
            Block::new("GAME")
                .with_child(Leaf::new("version", "1.12.5"))
                .with_child(Leaf::new("Title", "Jeb's Career (CAREER)"))
                .with_child(Leaf::new("versionFull", "1.12.5.3190 (WindowsPlayer x64)"))
                .with_child(Leaf::new(
                    "persistentTimestamp",
                    "2024-04-26T18:42:07.1234567+02:00",
                )),
        );
        let summary = SaveSummary::from_root(&root);
        assert_eq!(summary.title.as_deref(), Some("Jeb's Career (CAREER)"));
        assert_eq!(summary.saved_at.as_deref(), Some("2024-04-26 18:42"));
        assert_eq!(summary.version(false), Some("1.12.5"));
        assert_eq!(summary.version(true), Some("1.12.5.3190 (WindowsPlayer x64)"));
    }

    #[test]
    fn missing_game_block() {
        assert_eq!(SaveSummary::from_root(&Block::new("")), SaveSummary::default());
    }
}
