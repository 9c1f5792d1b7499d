use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use seed_model::{
    BuildingId, FileId, MatchCandidate, MatchCounts, MatchOutcome, MatchRow, MatchState,
    OrgContext, OrgId, TransportError,
};
use seed_reconcile::{MatchError, MatchGraph, MatchService, link};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Request {
    source_id: BuildingId,
    target_id: BuildingId,
    create: bool,
}

#[derive(Default)]
struct FakeBackend {
    requests: Mutex<Vec<Request>>,
    replies: Mutex<VecDeque<Result<MatchOutcome, TransportError>>>,
    counts: Mutex<Option<MatchCounts>>,
}

impl FakeBackend {
    fn reply(&self, reply: Result<MatchOutcome, TransportError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MatchService for FakeBackend {
    async fn create_or_remove_match(
        &self,
        _ctx: &OrgContext,
        source_id: BuildingId,
        target_id: BuildingId,
        create: bool,
    ) -> Result<MatchOutcome, TransportError> {
        self.requests.lock().unwrap().push(Request {
            source_id,
            target_id,
            create,
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(MatchOutcome::default()))
    }

    async fn fetch_match_counts(
        &self,
        _ctx: &OrgContext,
        _file_id: FileId,
    ) -> Result<MatchCounts, TransportError> {
        self.counts
            .lock()
            .unwrap()
            .ok_or_else(|| TransportError::new("fetch_match_counts", "unavailable"))
    }
}

fn id(value: i64) -> BuildingId {
    BuildingId::new(value)
}

fn graph(backend: &Arc<FakeBackend>) -> MatchGraph<Arc<FakeBackend>> {
    MatchGraph::new(Arc::clone(backend), OrgContext::new(OrgId::new(1))).with_file(FileId::new(8))
}

fn created(child: i64) -> Result<MatchOutcome, TransportError> {
    Ok(MatchOutcome {
        child_id: Some(id(child)),
    })
}

fn candidate(value: i64, matched: bool) -> MatchCandidate {
    MatchCandidate {
        id: id(value),
        matched,
    }
}

#[test]
fn linking_primary_then_extra() {
    let mut a = MatchRow::loaded(id(1), false);
    link(&mut a, &candidate(3, true));
    assert_eq!(a.coparent, Some(id(3)));
    assert!(a.matched);

    link(&mut a, &candidate(4, true));
    assert_eq!(a.coparent, Some(id(3)));
    assert_eq!(a.extra_matches, vec![id(4)]);
}

#[test]
fn unlinking_only_coparent_fully_unmatches() {
    let mut a = MatchRow::loaded(id(1), true);
    a.coparent = Some(id(3));
    link(&mut a, &candidate(3, false));
    assert_eq!(a.coparent, None);
    assert!(a.extra_matches.is_empty());
    assert!(!a.matched);
    assert!(a.is_fully_unmatched());
}

#[tokio::test]
async fn selecting_second_candidate_adds_extra_match() {
    let backend = Arc::new(FakeBackend::default());
    backend.reply(created(50));
    backend.reply(created(50));
    let mut graph = graph(&backend);
    let mut a = MatchRow::loaded(id(1), false);

    graph
        .select_candidate(&mut a, &candidate(3, true))
        .await
        .expect("create primary");
    assert_eq!(a.coparent, Some(id(3)));
    assert_eq!(a.state(), MatchState::Matched);

    graph
        .select_candidate(&mut a, &candidate(4, true))
        .await
        .expect("create extra");
    assert_eq!(a.coparent, Some(id(3)));
    assert_eq!(a.extra_matches, vec![id(4)]);
    assert_eq!(a.state(), MatchState::Matched);
    assert_eq!(
        backend.requests().last().copied(),
        Some(Request {
            source_id: id(1),
            target_id: id(4),
            create: true,
        })
    );
}

#[tokio::test]
async fn deselecting_only_coparent_unmatches_the_row() {
    let backend = Arc::new(FakeBackend::default());
    let mut graph = graph(&backend);
    let mut a = MatchRow::loaded(id(1), true);
    a.coparent = Some(id(3));
    a.children.push(id(50));

    graph
        .select_candidate(&mut a, &candidate(3, false))
        .await
        .expect("remove");
    assert_eq!(a.coparent, None);
    assert!(a.extra_matches.is_empty());
    assert!(!a.matched);
    assert_eq!(a.state(), MatchState::Unmatched);
    assert_eq!(
        backend.requests(),
        vec![Request {
            source_id: id(50),
            target_id: id(3),
            create: false,
        }]
    );
}

#[tokio::test]
async fn toggle_there_and_back_restores_links() {
    let backend = Arc::new(FakeBackend::default());
    backend.reply(created(50));
    let mut graph = graph(&backend);
    let mut a = MatchRow::loaded(id(1), false);
    let before = (a.matched, a.coparent, a.extra_matches.clone());

    graph
        .select_candidate(&mut a, &candidate(3, true))
        .await
        .expect("create");
    assert_eq!(a.state(), MatchState::Matched);
    assert_eq!(a.children, vec![id(50)]);

    graph
        .select_candidate(&mut a, &candidate(3, false))
        .await
        .expect("remove");
    assert_eq!((a.matched, a.coparent, a.extra_matches.clone()), before);
    assert_eq!(a.state(), MatchState::Unmatched);

    assert_eq!(
        backend.requests(),
        vec![
            Request {
                source_id: id(1),
                target_id: id(3),
                create: true,
            },
            Request {
                source_id: id(50),
                target_id: id(3),
                create: false,
            },
        ]
    );
}

#[tokio::test]
async fn failed_create_rolls_back_matched() {
    let backend = Arc::new(FakeBackend::default());
    backend.reply(Err(TransportError::new("create_or_remove_match", "boom")));
    let mut graph = graph(&backend);
    let mut a = MatchRow::loaded(id(1), false);
    a.coparent = Some(id(3));
    a.matched = true;
    assert_eq!(a.state(), MatchState::PendingMatch);

    let err = graph
        .toggle_match(&mut a, None, None)
        .await
        .expect_err("backend failure");
    assert!(matches!(err, MatchError::Operation { .. }));
    assert!(!a.matched);
    assert!(a.children.is_empty());
    assert_eq!(graph.counts(), None);
}

#[tokio::test]
async fn failed_selection_restores_snapshot() {
    let backend = Arc::new(FakeBackend::default());
    backend.reply(Err(TransportError::new("create_or_remove_match", "timeout")));
    let mut graph = graph(&backend);
    let mut a = MatchRow::loaded(id(1), true);
    a.coparent = Some(id(3));
    a.children.push(id(50));

    let result = graph.select_candidate(&mut a, &candidate(4, true)).await;
    assert!(result.is_err());
    assert!(a.matched);
    assert_eq!(a.coparent, Some(id(3)));
    assert!(a.extra_matches.is_empty());
}

#[tokio::test]
async fn removing_without_child_is_refused() {
    let backend = Arc::new(FakeBackend::default());
    let mut graph = graph(&backend);
    let mut a = MatchRow::loaded(id(1), true);
    a.coparent = Some(id(3));
    a.matched = false;

    let err = graph
        .toggle_match(&mut a, None, None)
        .await
        .expect_err("no child");
    assert!(matches!(err, MatchError::NoChild(b) if b == id(1)));
    assert!(a.matched);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn counts_refresh_after_success_and_survive_failure() {
    let backend = Arc::new(FakeBackend::default());
    *backend.counts.lock().unwrap() = Some(MatchCounts {
        matched: 4,
        unmatched: 6,
    });
    backend.reply(created(51));
    let mut graph = graph(&backend);
    let mut a = MatchRow::loaded(id(1), false);
    a.matched = true;

    graph
        .toggle_match(&mut a, Some(id(9)), None)
        .await
        .expect("create");
    assert_eq!(
        graph.counts(),
        Some(MatchCounts {
            matched: 4,
            unmatched: 6,
        })
    );

    *backend.counts.lock().unwrap() = None;
    let mut b = MatchRow::loaded(id(2), false);
    b.matched = true;
    graph
        .toggle_match(&mut b, Some(id(9)), None)
        .await
        .expect("counts failure is not a match failure");
    assert_eq!(graph.counts().map(|c| c.matched), Some(4));
    assert_eq!(b.state(), MatchState::Matched);
}
