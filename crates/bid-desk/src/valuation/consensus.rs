use serde::{Deserialize, Serialize};

use super::domain::{MechanicReview, Recommendation};

/// Vote counts across all mechanic reviews of a vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consensus {
    pub green: usize,
    pub orange: usize,
    pub red: usize,
    pub total: usize,
    pub dominant: Option<Recommendation>,
}

impl Consensus {
    pub fn count(&self, recommendation: Recommendation) -> usize {
        match recommendation {
            Recommendation::Green => self.green,
            Recommendation::Orange => self.orange,
            Recommendation::Red => self.red,
        }
    }
}

/// Counts recommendations and picks the strictly largest; ties keep the
/// earlier color in green, orange, red order.
pub fn aggregate_reviews(reviews: &[MechanicReview]) -> Consensus {
    let mut consensus = Consensus {
        total: reviews.len(),
        ..Consensus::default()
    };

    for recommendation in reviews.iter().filter_map(|review| review.recommendation) {
        match recommendation {
            Recommendation::Green => consensus.green += 1,
            Recommendation::Orange => consensus.orange += 1,
            Recommendation::Red => consensus.red += 1,
        }
    }

    let mut best = 0;
    for recommendation in Recommendation::ordered() {
        let count = consensus.count(recommendation);
        if count > best {
            best = count;
            consensus.dominant = Some(recommendation);
        }
    }

    consensus
}
