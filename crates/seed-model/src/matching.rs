//! Match relationship between raw buildings and their co-parents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{BuildingId, FileId};

/// Position of a row in the match/unmatch state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    Unmatched,
    PendingMatch,
    Matched,
    PendingUnmatch,
}

/// A raw (duplicate-candidate) building row of the matching list.
///
/// `matched` is the pending decision the operator asked for; `acknowledged`
/// is what the reconciliation backend last confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRow {
    pub id: BuildingId,
    /// Merged child snapshots; `children[0]` is the current match child.
    #[serde(default)]
    pub children: Vec<BuildingId>,
    /// Primary co-parent.
    #[serde(default)]
    pub coparent: Option<BuildingId>,
    /// Additional many-to-many links beyond the primary co-parent.
    #[serde(default)]
    pub extra_matches: Vec<BuildingId>,
    #[serde(default)]
    pub matched: bool,
    #[serde(skip)]
    pub acknowledged: bool,
}

impl MatchRow {
    /// A row as loaded from the backend: the pending decision equals the
    /// persisted state.
    pub fn loaded(id: BuildingId, matched: bool) -> Self {
        Self {
            id,
            matched,
            acknowledged: matched,
            ..Self::default()
        }
    }

    pub fn state(&self) -> MatchState {
        match (self.acknowledged, self.matched) {
            (false, false) => MatchState::Unmatched,
            (false, true) => MatchState::PendingMatch,
            (true, true) => MatchState::Matched,
            (true, false) => MatchState::PendingUnmatch,
        }
    }

    /// No pending match, no co-parent and no extra links.
    pub fn is_fully_unmatched(&self) -> bool {
        !self.matched && self.coparent.is_none() && self.extra_matches.is_empty()
    }

    pub fn child(&self) -> Option<BuildingId> {
        self.children.first().copied()
    }
}

/// A building offered as a match for the row being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub id: BuildingId,
    /// Operator's selection for this candidate.
    pub matched: bool,
}

/// Reply of a create/remove match request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Merged child snapshot; only present when a match was created.
    pub child_id: Option<BuildingId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    pub matched: u64,
    pub unmatched: u64,
}

/// Restricts a building search by match status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchFilter {
    #[default]
    All,
    Matched,
    Unmatched,
}

/// Building search sent to the collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingQuery {
    pub q: String,
    /// 1-based page.
    pub page: u32,
    pub page_size: u32,
    pub order_by: Option<String>,
    pub sort_reverse: bool,
    pub import_file: Option<FileId>,
    pub match_filter: MatchFilter,
    /// Building excluded from the results.
    pub exclude: Option<BuildingId>,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl BuildingQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingPage {
    pub buildings: Vec<MatchRow>,
    pub number_matching: u64,
    pub number_returned: u64,
}

impl BuildingPage {
    /// Rows with their persisted state settled from the loaded `matched` flag.
    pub fn into_rows(self) -> Vec<MatchRow> {
        self.buildings
            .into_iter()
            .map(|mut row| {
                row.acknowledged = row.matched;
                row
            })
            .collect()
    }

    pub fn page_count(&self, page_size: u32) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.number_matching.div_ceil(u64::from(page_size))
    }
}
