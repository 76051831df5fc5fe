use serde::{Deserialize, Serialize};

/// how many polygons a color/position/replacement mutation touches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// one randomly chosen polygon
    Single,
    /// every polygon of the canvas
    All,
}

/// z-order mutation flavor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZOrder {
    /// move one random polygon to the front of the draw list
    MoveToFront,
    /// Fisher-Yates shuffle of the whole draw list
    Shuffle,
}

/// the single branch a candidate takes in one mutation pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
    Color,
    Position,
    Index,
    Replace,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutateConfig {
    // relative weights, normalized by their sum
    pub weight_color: f64,
    pub weight_position: f64,
    pub weight_index: f64,
    pub weight_random: f64,

    /// max per-channel change for color mutation (±)
    pub color_delta: u8,
    /// max per-axis change in pixels for position mutation (±)
    pub position_delta: i32,

    pub color_scope: Scope,
    pub position_scope: Scope,
    pub replace_scope: Scope,
    pub z_order: ZOrder,
}

impl Default for MutateConfig {
    fn default() -> Self {
        Self {
            weight_color: 1.0,
            weight_position: 1.0,
            weight_index: 1.0,
            weight_random: 1.0,

            color_delta: 10,
            position_delta: 10,

            color_scope: Scope::Single,
            position_scope: Scope::Single,
            replace_scope: Scope::Single,
            z_order: ZOrder::MoveToFront,
        }
    }
}

impl MutateConfig {
    #[inline]
    pub fn weight_total(&self) -> f64 {
        self.weight_color + self.weight_position + self.weight_index + self.weight_random
    }

    /// walk the cumulative weight table with one draw from `[0, 1)`.
    /// exactly one kind is returned for any draw.
    pub fn pick(&self, dice: f64) -> MutationKind {
        let total = self.weight_total();
        let table = [
            (MutationKind::Color, self.weight_color),
            (MutationKind::Position, self.weight_position),
            (MutationKind::Index, self.weight_index),
            (MutationKind::Replace, self.weight_random),
        ];

        let mut cumulative = 0.0;
        let mut last = MutationKind::Replace;
        for (kind, weight) in table {
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight / total;
            last = kind;
            if dice < cumulative {
                return kind;
            }
        }
        // float rounding can leave the final edge just below 1.0
        last
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let weights = [self.weight_color, self.weight_position, self.weight_index, self.weight_random];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("mutation weights must be finite and non-negative".into());
        }
        if self.weight_total() <= 0.0 {
            return Err("mutation weights must not all be zero".into());
        }
        if self.position_delta < 0 {
            return Err("position_delta must be non-negative".into());
        }
        Ok(())
    }
}
