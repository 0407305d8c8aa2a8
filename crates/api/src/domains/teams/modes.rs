use serde::{Deserialize, Serialize};

/// A competition mode. Modes without individual statistics (production or
/// cosmetic categories) have nothing to aggregate into a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeDivision {
    pub id: i32,
    pub name: String,
    pub has_individual_statistics: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTable {
    modes: Vec<ModeDivision>,
}

impl Default for ModeTable {
    fn default() -> Self {
        let mode = |id, name: &str, has_individual_statistics| ModeDivision {
            id,
            name: name.to_string(),
            has_individual_statistics,
        };

        Self {
            modes: vec![
                mode(1, "standard", true),
                mode(2, "taiko", true),
                mode(3, "catch", true),
                mode(4, "mania", true),
                mode(5, "storyboard", false),
            ],
        }
    }
}

impl ModeTable {
    pub fn new(modes: Vec<ModeDivision>) -> Self {
        Self { modes }
    }

    /// Parse a JSON array of `{id, name, hasIndividualStatistics}`.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn get(&self, id: i32) -> Option<&ModeDivision> {
        self.modes.iter().find(|m| m.id == id)
    }

    /// Unknown modes are assumed to carry statistics.
    pub fn has_individual_statistics(&self, id: i32) -> bool {
        self.get(id).map_or(true, |m| m.has_individual_statistics)
    }

    pub fn modes(&self) -> &[ModeDivision] {
        &self.modes
    }
}
