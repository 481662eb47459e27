//! Periodic threat assessment.
//!
//! Summarizes the threat components of all visible hostiles into a top-N list
//! and an aggregate [`ThreatLevel`].

use broadside_core::enums::ThreatLevel;

/// One hostile contact as seen by the assessing holder.
#[derive(Debug, Clone, Copy)]
pub struct ThreatContact<K> {
    pub id: K,
    /// Threat component from the scorer.
    pub threat: f64,
    pub distance: f64,
}

/// Result of one reassessment.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatAssessment<K> {
    /// Highest threats first, at most `top_n` entries.
    pub top: Vec<(K, f64)>,
    /// Sum of all contact threats.
    pub aggregate: f64,
    pub level: ThreatLevel,
}

impl<K> Default for ThreatAssessment<K> {
    fn default() -> Self {
        Self {
            top: Vec::new(),
            aggregate: 0.0,
            level: ThreatLevel::None,
        }
    }
}

/// Assess a set of contacts. Closer contacts win ties.
pub fn assess<K: Copy>(contacts: &[ThreatContact<K>], top_n: usize) -> ThreatAssessment<K> {
    let mut sorted: Vec<&ThreatContact<K>> = contacts.iter().collect();
    sorted.sort_by(|a, b| {
        b.threat
            .total_cmp(&a.threat)
            .then(a.distance.total_cmp(&b.distance))
    });

    let aggregate: f64 = contacts.iter().map(|c| c.threat.max(0.0)).sum();
    ThreatAssessment {
        top: sorted.iter().take(top_n).map(|c| (c.id, c.threat)).collect(),
        aggregate,
        level: level_for(aggregate),
    }
}

/// Map an aggregate threat to a level.
pub fn level_for(aggregate: f64) -> ThreatLevel {
    if aggregate <= 0.0 {
        ThreatLevel::None
    } else if aggregate < 40.0 {
        ThreatLevel::Low
    } else if aggregate < 100.0 {
        ThreatLevel::Moderate
    } else if aggregate < 180.0 {
        ThreatLevel::High
    } else {
        ThreatLevel::Critical
    }
}
