//! Claim verdict statistics.
//!
//! Always computed from a claim list on demand; never stored alongside it.

use serde::Serialize;

use crate::analysis::{ClaimStatus, ClaimVerdict};

/// Verdict counts over a set of claims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClaimStats {
    pub total: usize,
    pub verified: usize,
    pub contradicted: usize,
    pub unsubstantiated: usize,
    pub errored: usize,
}

impl ClaimStats {
    pub fn from_claims(claims: &[ClaimVerdict]) -> Self {
        claims.iter().fold(Self::default(), |mut stats, verdict| {
            stats.total += 1;
            match verdict.status {
                ClaimStatus::Verified => stats.verified += 1,
                ClaimStatus::Contradicted => stats.contradicted += 1,
                ClaimStatus::Unsubstantiated => stats.unsubstantiated += 1,
                ClaimStatus::Error => stats.errored += 1,
            }
            stats
        })
    }

    /// Number of claims with the given verdict.
    pub fn count(&self, status: ClaimStatus) -> usize {
        match status {
            ClaimStatus::Verified => self.verified,
            ClaimStatus::Contradicted => self.contradicted,
            ClaimStatus::Unsubstantiated => self.unsubstantiated,
            ClaimStatus::Error => self.errored,
        }
    }

    /// Claims the backend could not back up: contradicted plus unsubstantiated.
    pub fn flagged(&self) -> usize {
        self.contradicted + self.unsubstantiated
    }
}
