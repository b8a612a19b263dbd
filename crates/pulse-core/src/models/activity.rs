// ABOUTME: Activity level enumeration driving the heart-rate resting point
// ABOUTME: Parses free-form labels with graceful fallback for unrecognized activities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical exertion state of a simulated subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// At rest
    #[default]
    Resting,
    /// Walking pace
    Walking,
    /// Easy running
    Jogging,
    /// Hard running
    Running,
    /// Post-exercise recovery
    Cooldown,
    /// Any label outside the known set
    #[serde(other)]
    Unknown,
}

impl ActivityLevel {
    /// Every recognized activity, in session order
    pub const KNOWN: [Self; 5] = [
        Self::Resting,
        Self::Walking,
        Self::Jogging,
        Self::Running,
        Self::Cooldown,
    ];

    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Resting => "resting",
            Self::Walking => "walking",
            Self::Jogging => "jogging",
            Self::Running => "running",
            Self::Cooldown => "cooldown",
            Self::Unknown => "unknown",
        }
    }

    /// Parse from a free-form label
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "resting" => Self::Resting,
            "walking" => Self::Walking,
            "jogging" => Self::Jogging,
            "running" => Self::Running,
            "cooldown" => Self::Cooldown,
            // Unrecognized labels fall back to the default base rate downstream
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
