//! Match graph between raw buildings and their co-parents.
//!
//! `MatchRow::matched` is the decision the operator asked for. It only
//! becomes fact once the reconciliation backend acknowledges the request;
//! a failed request rolls it back to the last acknowledged value.

use std::sync::Arc;

use async_trait::async_trait;
use seed_model::{
    BuildingId, BuildingQuery, FileId, MatchCandidate, MatchCounts, MatchFilter, MatchOutcome,
    MatchRow, OrgContext, TransportError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Reconciliation backend operations the match graph depends on.
#[async_trait]
pub trait MatchService: Send + Sync {
    /// Creates (or removes) the match between `source_id` and `target_id`.
    /// The outcome carries the merged child only when a match was created.
    async fn create_or_remove_match(
        &self,
        ctx: &OrgContext,
        source_id: BuildingId,
        target_id: BuildingId,
        create: bool,
    ) -> Result<MatchOutcome, TransportError>;

    async fn fetch_match_counts(
        &self,
        ctx: &OrgContext,
        file_id: FileId,
    ) -> Result<MatchCounts, TransportError>;
}

#[async_trait]
impl<T: MatchService + ?Sized> MatchService for Arc<T> {
    async fn create_or_remove_match(
        &self,
        ctx: &OrgContext,
        source_id: BuildingId,
        target_id: BuildingId,
        create: bool,
    ) -> Result<MatchOutcome, TransportError> {
        (**self)
            .create_or_remove_match(ctx, source_id, target_id, create)
            .await
    }

    async fn fetch_match_counts(
        &self,
        ctx: &OrgContext,
        file_id: FileId,
    ) -> Result<MatchCounts, TransportError> {
        (**self).fetch_match_counts(ctx, file_id).await
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("building {0} has no match child to remove")]
    NoChild(BuildingId),
    #[error("building {0} has no co-parent to match against")]
    NoTarget(BuildingId),
    #[error("match request failed")]
    Operation {
        #[source]
        source: TransportError,
    },
}

/// Applies an operator's selection of `candidate` to the row locally.
///
/// A newly selected candidate becomes the primary co-parent unless another
/// primary exists, in which case it joins the extra matches. Deselecting the
/// last link leaves the row fully unmatched.
pub fn link(row: &mut MatchRow, candidate: &MatchCandidate) {
    if candidate.matched {
        match row.coparent {
            Some(primary) if primary != candidate.id => {
                if !row.extra_matches.contains(&candidate.id) {
                    row.extra_matches.push(candidate.id);
                }
            }
            _ => row.coparent = Some(candidate.id),
        }
        row.matched = true;
    } else {
        if row.coparent == Some(candidate.id) {
            row.coparent = None;
        }
        row.extra_matches.retain(|id| *id != candidate.id);
        if row.coparent.is_none() && row.extra_matches.is_empty() {
            row.matched = false;
        }
    }
}

/// Search listing the candidates for `row`, excluding its own match child
/// (or the row itself when it has none).
pub fn candidate_query(row: &MatchRow, page_size: u32) -> BuildingQuery {
    let mut query = BuildingQuery::new(page_size);
    query.exclude = Some(row.child().unwrap_or(row.id));
    query.match_filter = MatchFilter::All;
    query
}

/// Drives match/unmatch requests for the rows of one import file.
///
/// Rows are borrowed mutably per call, so two toggles on the same row can
/// never overlap.
#[derive(Debug)]
pub struct MatchGraph<S> {
    service: S,
    ctx: OrgContext,
    file_id: Option<FileId>,
    counts: Option<MatchCounts>,
}

impl<S: MatchService> MatchGraph<S> {
    pub fn new(service: S, ctx: OrgContext) -> Self {
        Self {
            service,
            ctx,
            file_id: None,
            counts: None,
        }
    }

    /// Import file whose match counts are refreshed after each toggle.
    pub fn with_file(mut self, file_id: FileId) -> Self {
        self.file_id = Some(file_id);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Match counts as of the last refresh.
    pub fn counts(&self) -> Option<MatchCounts> {
        self.counts
    }

    /// Submits the row's pending decision to the backend.
    ///
    /// `create` defaults to `row.matched`. The source is the row itself when
    /// creating and its current child when removing; the target is `target`
    /// or the row's co-parent. On failure `row.matched` is rolled back.
    pub async fn toggle_match(
        &mut self,
        row: &mut MatchRow,
        target: Option<BuildingId>,
        create: Option<bool>,
    ) -> Result<MatchOutcome, MatchError> {
        let create = create.unwrap_or(row.matched);
        let source_id = if create {
            row.id
        } else {
            match row.child() {
                Some(child) => child,
                None => {
                    row.matched = row.acknowledged;
                    return Err(MatchError::NoChild(row.id));
                }
            }
        };
        let Some(target_id) = target.or(row.coparent) else {
            row.matched = row.acknowledged;
            return Err(MatchError::NoTarget(row.id));
        };

        debug!(
            building = %row.id,
            source = %source_id,
            target = %target_id,
            create,
            "submitting match request"
        );
        match self
            .service
            .create_or_remove_match(&self.ctx, source_id, target_id, create)
            .await
        {
            Ok(outcome) => {
                if create && let Some(child_id) = outcome.child_id {
                    match row.children.first_mut() {
                        Some(first) => *first = child_id,
                        None => row.children.push(child_id),
                    }
                }
                row.acknowledged = row.matched;
                info!(
                    building = %row.id,
                    target = %target_id,
                    create,
                    "match request acknowledged"
                );
                self.refresh_counts().await;
                Ok(outcome)
            }
            Err(source) => {
                warn!(
                    building = %row.id,
                    target = %target_id,
                    create,
                    error = %source,
                    "match request failed, rolling back"
                );
                row.matched = row.acknowledged;
                Err(MatchError::Operation { source })
            }
        }
    }

    /// Links `candidate` to the row and submits the change.
    ///
    /// If the request fails the row's links are restored as they were
    /// before the selection.
    pub async fn select_candidate(
        &mut self,
        row: &mut MatchRow,
        candidate: &MatchCandidate,
    ) -> Result<MatchOutcome, MatchError> {
        let snapshot = (row.matched, row.coparent, row.extra_matches.clone());
        link(row, candidate);
        match self
            .toggle_match(row, Some(candidate.id), Some(candidate.matched))
            .await
        {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                (row.matched, row.coparent, row.extra_matches) = snapshot;
                Err(err)
            }
        }
    }

    /// Reloads the match counts of the import file, if one is set.
    ///
    /// A failure is logged and the previous counts are kept.
    pub async fn refresh_counts(&mut self) -> Option<MatchCounts> {
        let file_id = self.file_id?;
        match self.service.fetch_match_counts(&self.ctx, file_id).await {
            Ok(counts) => {
                debug!(
                    file = %file_id,
                    matched = counts.matched,
                    unmatched = counts.unmatched,
                    "refreshed match counts"
                );
                self.counts = Some(counts);
            }
            Err(err) => warn!(file = %file_id, error = %err, "failed to refresh match counts"),
        }
        self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, matched: bool) -> MatchCandidate {
        MatchCandidate {
            id: BuildingId::new(id),
            matched,
        }
    }

    #[test]
    fn link_is_idempotent_for_extra_matches() {
        let mut row = MatchRow::loaded(BuildingId::new(1), false);
        link(&mut row, &candidate(10, true));
        link(&mut row, &candidate(11, true));
        link(&mut row, &candidate(11, true));
        assert_eq!(row.coparent, Some(BuildingId::new(10)));
        assert_eq!(row.extra_matches, vec![BuildingId::new(11)]);
    }

    #[test]
    fn unlinking_extra_keeps_primary() {
        let mut row = MatchRow::loaded(BuildingId::new(1), false);
        link(&mut row, &candidate(10, true));
        link(&mut row, &candidate(11, true));
        link(&mut row, &candidate(11, false));
        assert!(row.matched);
        assert_eq!(row.coparent, Some(BuildingId::new(10)));
        assert!(row.extra_matches.is_empty());
    }

    #[test]
    fn unlinking_primary_with_extras_stays_matched() {
        let mut row = MatchRow::loaded(BuildingId::new(1), false);
        link(&mut row, &candidate(10, true));
        link(&mut row, &candidate(11, true));
        link(&mut row, &candidate(10, false));
        assert!(row.matched);
        assert_eq!(row.coparent, None);
        assert_eq!(row.extra_matches, vec![BuildingId::new(11)]);
    }

    #[test]
    fn candidate_query_excludes_child_or_self() {
        let mut row = MatchRow::loaded(BuildingId::new(5), false);
        assert_eq!(candidate_query(&row, 10).exclude, Some(BuildingId::new(5)));
        row.children.push(BuildingId::new(9));
        let query = candidate_query(&row, 10);
        assert_eq!(query.exclude, Some(BuildingId::new(9)));
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
    }
}
