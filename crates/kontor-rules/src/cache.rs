use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use kontor_core::ContractId;

use crate::resolver::ResolvedRuleSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleSetKey {
    pub contract_id: ContractId,
    pub on: NaiveDate,
}

struct Slot {
    value: ResolvedRuleSet,
    created_at: Instant,
}

/// TTL- and capacity-bounded memo of resolved rule sets. Invalidation
/// is coarse: an override mutation evicts every cached date for that
/// contract, trading hit rate for never serving a stale set after a
/// mutation completes.
pub struct RuleSetCache {
    ttl: Duration,
    max_entries: usize,
    entries: HashMap<RuleSetKey, Slot>,
}

impl RuleSetCache {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &RuleSetKey) -> Option<ResolvedRuleSet> {
        self.prune_expired();
        self.entries.get(key).map(|slot| slot.value.clone())
    }

    pub fn insert(&mut self, key: RuleSetKey, value: ResolvedRuleSet) {
        self.prune_expired();
        if self.entries.len() >= self.max_entries {
            if let Some(victim) = self
                .entries
                .iter()
                .min_by_key(|(_, slot)| slot.created_at)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&victim);
            }
        }
        self.entries.insert(
            key,
            Slot {
                value,
                created_at: Instant::now(),
            },
        );
    }

    /// Evict every cached date for the contract; returns the count.
    pub fn invalidate_contract(&mut self, contract_id: &ContractId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| &key.contract_id != contract_id);
        before - self.entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn prune_expired(&mut self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, slot| slot.created_at.elapsed() <= ttl);
    }
}
