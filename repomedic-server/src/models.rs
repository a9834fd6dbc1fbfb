//! In-memory analysis history for RepoMedic server.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use repomedic_core::{RepoRef, ScoreReport};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One recorded `/api/analyze` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSession {
    /// Session identifier.
    pub id: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// URL as submitted.
    pub repo_url: String,
    /// Repository name.
    pub repo_name: String,
    /// Repository owner.
    pub owner: String,
    /// Overall health score.
    pub overall_score: u8,
    /// Documentation score.
    pub documentation_score: u8,
    /// Structure score.
    pub structure_score: u8,
}

impl AnalysisSession {
    /// Record a new session for a scored repository.
    pub fn new(repo_url: impl Into<String>, repo: &RepoRef, health: &ScoreReport) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339(),
            repo_url: repo_url.into(),
            repo_name: repo.repo.clone(),
            owner: repo.owner.clone(),
            overall_score: health.scores.overall,
            documentation_score: health.scores.documentation,
            structure_score: health.scores.structure,
        }
    }
}

/// Bounded, newest-first list of analysis sessions.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    sessions: Arc<RwLock<VecDeque<AnalysisSession>>>,
    limit: usize,
}

impl HistoryStore {
    /// Keep at most `limit` sessions (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(VecDeque::new())),
            limit: limit.max(1),
        }
    }

    /// Store a session, evicting the oldest when full.
    pub fn record(&self, session: AnalysisSession) {
        let Ok(mut sessions) = self.sessions.write() else {
            log::warn!("history lock poisoned; dropping session {}", session.id);
            return;
        };
        sessions.push_front(session);
        sessions.truncate(self.limit);
    }

    /// Sessions, newest first.
    pub fn recent(&self) -> Result<Vec<AnalysisSession>, String> {
        self.sessions
            .read()
            .map(|sessions| sessions.iter().cloned().collect())
            .map_err(|_| "history lock poisoned".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomedic_core::Scores;

    fn health(overall: u8) -> ScoreReport {
        ScoreReport {
            scores: Scores {
                overall,
                documentation: overall,
                structure: overall,
            },
            issues: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn session_copies_repo_and_scores() {
        let repo = RepoRef::new("octo", "demo");
        let session = AnalysisSession::new("https://github.com/octo/demo", &repo, &health(80));

        assert_eq!(session.owner, "octo");
        assert_eq!(session.repo_name, "demo");
        assert_eq!(session.overall_score, 80);
        assert!(Uuid::parse_str(&session.id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&session.created_at).is_ok());
    }

    #[test]
    fn store_is_newest_first_and_bounded() {
        let store = HistoryStore::new(2);
        let repo = RepoRef::new("octo", "demo");
        for score in [10, 20, 30] {
            store.record(AnalysisSession::new("url", &repo, &health(score)));
        }

        let recent = store.recent().expect("recent");
        let scores: Vec<u8> = recent.iter().map(|s| s.overall_score).collect();
        assert_eq!(scores, vec![30, 20]);
    }

    #[test]
    fn zero_limit_still_keeps_latest() {
        let store = HistoryStore::new(0);
        let repo = RepoRef::new("o", "r");
        store.record(AnalysisSession::new("url", &repo, &health(1)));
        assert_eq!(store.recent().expect("recent").len(), 1);
    }
}
