use std::cmp::Ordering;

use super::scoring::{score, ScoreBreakdown};
use crate::models::{Ambulance, EmergencyCall};

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate<'a> {
    pub ambulance: &'a Ambulance,
    pub score: ScoreBreakdown,
}

/// Picks the highest-scoring eligible ambulance. Ties go to the one that
/// appears first in `fleet`. Returns `None` when nothing is eligible.
pub fn select_best<'a>(fleet: &'a [Ambulance], call: &EmergencyCall) -> Option<Candidate<'a>> {
    let mut best: Option<Candidate<'a>> = None;

    for candidate in eligible(fleet, call) {
        let better = match &best {
            Some(current) => candidate.score.total > current.score.total,
            None => true,
        };
        if better {
            best = Some(candidate);
        }
    }

    best
}

/// Every eligible ambulance with its breakdown, best first. Equal totals
/// keep fleet order, so the head always matches `select_best`.
pub fn rank_candidates<'a>(fleet: &'a [Ambulance], call: &EmergencyCall) -> Vec<Candidate<'a>> {
    let mut ranked = eligible(fleet, call);
    ranked.sort_by(|a, b| {
        b.score
            .total
            .partial_cmp(&a.score.total)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

fn eligible<'a>(fleet: &'a [Ambulance], call: &EmergencyCall) -> Vec<Candidate<'a>> {
    fleet
        .iter()
        .filter(|ambulance| ambulance.status.is_eligible())
        .map(|ambulance| Candidate {
            ambulance,
            score: score(ambulance, call.location, call.severity_level),
        })
        .collect()
}
