#![deny(unsafe_code)]

//! Reconciliation of raw buildings into canonical buildings: per-field
//! provenance and the match/unmatch graph.

pub mod graph;
pub mod provenance;

pub use graph::{MatchError, MatchGraph, MatchService, candidate_query, link};
pub use provenance::{
    EXCLUDED_KEYS, ProvenanceError, ProvenanceSession, adopt_field, extra_data_keys,
    is_copyable_key,
};
