//! Recently served questions
//!
//! The device remembers which questions it has served lately so the next
//! game prefers questions the player has not seen. The history is a short
//! list of ids, most recent first, persisted as JSON in local storage.

use std::collections::HashSet;

use itertools::Itertools;

use crate::{
    constants::history::STORAGE_KEY,
    question::{Question, QuestionId},
    storage::Storage,
};

/// Bounded list of recently served question ids, most recent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentlyServed {
    ids: Vec<QuestionId>,
    limit: usize,
}

impl RecentlyServed {
    /// Creates an empty history holding at most `limit` ids
    pub fn new(limit: usize) -> Self {
        Self {
            ids: Vec::new(),
            limit,
        }
    }

    /// Loads the history from `storage`
    ///
    /// A missing or malformed entry yields an empty history.
    pub fn load<S: Storage + ?Sized>(storage: &S, limit: usize) -> Self {
        let ids = storage
            .get(STORAGE_KEY)
            .and_then(|raw| {
                serde_json::from_str::<Vec<QuestionId>>(&raw)
                    .map_err(|e| log::warn!("discarding malformed question history: {e}"))
                    .ok()
            })
            .unwrap_or_default();

        let mut history = Self::new(limit);
        history.ids = ids.into_iter().unique().take(limit).collect_vec();
        history
    }

    /// Writes the history to `storage`
    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) {
        match serde_json::to_string(&self.ids) {
            Ok(raw) => storage.set(STORAGE_KEY, raw),
            Err(e) => log::error!("cannot serialize question history: {e}"),
        }
    }

    /// Returns the remembered ids, most recent first
    pub fn ids(&self) -> &[QuestionId] {
        &self.ids
    }

    /// Returns whether `id` was served recently
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.ids.contains(id)
    }

    /// Picks exactly `count` questions from `pool`
    ///
    /// Questions not served recently come first, in pool order, followed by
    /// recently served ones. If the pool is still too small the selection
    /// is repeated until it reaches `count`. An empty pool gives an empty
    /// selection.
    pub fn select(&self, pool: Vec<Question>, count: usize) -> Vec<Question> {
        let recent: HashSet<&QuestionId> = self.ids.iter().collect();
        let (unseen, seen): (Vec<_>, Vec<_>) = pool
            .into_iter()
            .unique_by(|question| question.id.clone())
            .partition(|question| !recent.contains(&question.id));

        let ordered = unseen.into_iter().chain(seen).collect_vec();
        if ordered.is_empty() {
            return ordered;
        }
        if ordered.len() < count {
            log::warn!(
                "question pool has only {} distinct questions, repeating to fill {count}",
                ordered.len()
            );
        }

        ordered.iter().cycle().take(count).cloned().collect_vec()
    }

    /// Records the questions of a new game as the most recent
    pub fn record(&mut self, served: &[Question]) {
        let previous = std::mem::take(&mut self.ids);
        self.ids = served
            .iter()
            .map(|question| question.id.clone())
            .chain(previous)
            .unique()
            .take(self.limit)
            .collect_vec();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{question::Label, storage::MemoryStorage};
    use enum_map::EnumMap;

    fn question(id: &str) -> Question {
        Question {
            id: id.into(),
            prompt: format!("Question {id}"),
            options: EnumMap::from_array(["1".into(), "2".into(), "3".into(), "4".into()]),
            correct: Label::A,
        }
    }

    fn pool(range: std::ops::Range<usize>) -> Vec<Question> {
        range.map(|i| question(&format!("q{i}"))).collect()
    }

    fn ids(questions: &[Question]) -> Vec<String> {
        questions.iter().map(|q| q.id.to_string()).collect()
    }

    #[test]
    fn test_select_prefers_unseen() {
        let mut history = RecentlyServed::new(40);
        history.record(&pool(0..5));

        let selected = history.select(pool(0..15), 10);

        assert_eq!(selected.len(), 10);
        assert_eq!(
            ids(&selected),
            vec!["q5", "q6", "q7", "q8", "q9", "q10", "q11", "q12", "q13", "q14"]
        );
    }

    #[test]
    fn test_select_backfills_from_seen() {
        let mut history = RecentlyServed::new(40);
        history.record(&pool(0..8));

        let selected = history.select(pool(0..12), 10);

        assert_eq!(selected.len(), 10);
        assert_eq!(&ids(&selected)[..4], &["q8", "q9", "q10", "q11"]);
        assert_eq!(&ids(&selected)[4..], &["q0", "q1", "q2", "q3", "q4", "q5"]);
    }

    #[test]
    fn test_select_exact_pool() {
        let history = RecentlyServed::new(40);
        assert_eq!(history.select(pool(0..10), 10).len(), 10);
    }

    #[test]
    fn test_select_pads_small_pool() {
        let history = RecentlyServed::new(40);
        let selected = history.select(pool(0..4), 10);
        assert_eq!(selected.len(), 10);
        assert_eq!(
            ids(&selected),
            vec!["q0", "q1", "q2", "q3", "q0", "q1", "q2", "q3", "q0", "q1"]
        );
    }

    #[test]
    fn test_select_empty_pool() {
        let history = RecentlyServed::new(40);
        assert!(history.select(Vec::new(), 10).is_empty());
    }

    #[test]
    fn test_select_ignores_duplicate_pool_entries() {
        let history = RecentlyServed::new(40);
        let mut duplicated = pool(0..10);
        duplicated.insert(1, question("q0"));
        let selected = history.select(duplicated, 10);
        assert_eq!(ids(&selected), ids(&pool(0..10)));
    }

    #[test]
    fn test_history_capped_after_five_games() {
        let mut history = RecentlyServed::new(40);
        for game in 0..5 {
            history.record(&pool(game * 10..game * 10 + 10));
        }

        assert_eq!(history.ids().len(), 40);
        assert_eq!(history.ids()[0].as_str(), "q40");
        assert!(history.contains(&"q10".into()));
        assert!(!history.contains(&"q9".into()));
        assert!(!history.contains(&"q0".into()));
    }

    #[test]
    fn test_record_moves_repeats_to_front() {
        let mut history = RecentlyServed::new(40);
        history.record(&pool(0..3));
        history.record(&[question("q1")]);
        assert_eq!(
            history.ids().iter().map(QuestionId::as_str).collect_vec(),
            vec!["q1", "q0", "q2"]
        );
    }

    #[test]
    fn test_save_and_load() {
        let mut storage = MemoryStorage::default();
        let mut history = RecentlyServed::new(40);
        history.record(&pool(0..10));
        history.save(&mut storage);

        let loaded = RecentlyServed::load(&storage, 40);
        assert_eq!(loaded, history);
    }

    #[test]
    fn test_load_truncates_to_limit() {
        let mut storage = MemoryStorage::default();
        let mut history = RecentlyServed::new(40);
        history.record(&pool(0..30));
        history.save(&mut storage);

        let loaded = RecentlyServed::load(&storage, 20);
        assert_eq!(loaded.ids().len(), 20);
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let mut storage = MemoryStorage::default();
        storage.set(STORAGE_KEY, "{broken".to_owned());
        assert!(RecentlyServed::load(&storage, 40).ids().is_empty());
    }

    #[test]
    fn test_load_numeric_ids() {
        let mut storage = MemoryStorage::default();
        storage.set(STORAGE_KEY, "[3, \"q1\"]".to_owned());
        let loaded = RecentlyServed::load(&storage, 40);
        assert!(loaded.contains(&"3".into()));
        assert!(loaded.contains(&"q1".into()));
    }
}
