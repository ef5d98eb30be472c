// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;

use kontor_core::canonical::stable_sort_by_key;
use kontor_core::RuleId;
use kontor_model::{
    BaseRule, EffectiveRule, Overlay, OverrideAction, RuleOrigin, RuleOverride, SemanticTyped,
};

/// Merge base rules and contract overrides into the effective list for
/// one category on one date.
///
/// With overrides disabled the result is the active, date-applicable
/// base rules sorted by priority; overrides are never consulted. With
/// overrides enabled, each applicable override is applied in store
/// order against an insertion-ordered map keyed by rule id:
///
/// - DISABLE removes the entry (no-op when absent).
/// - REPLACE rewrites the entry from the override alone, then removes
///   every other entry of the same semantic kind, so the override wins
///   even when the superseded base rule carries a different rule id.
/// - MODIFY overlays the override's set fields onto the existing entry,
///   or inserts the override's own fields when no entry exists.
///
/// The final stable sort is by ascending priority; equal priorities
/// keep map insertion order (base rules first, in store order).
#[must_use]
pub fn merge_category<P>(
    base: &[BaseRule<P>],
    overrides: &[RuleOverride<P>],
    on: NaiveDate,
    overrides_enabled: bool,
) -> Vec<EffectiveRule<P>>
where
    P: Clone + Overlay + SemanticTyped,
{
    let seeded: Vec<EffectiveRule<P>> = base
        .iter()
        .filter(|rule| rule.is_effective_on(on))
        .map(effective_from_base)
        .collect();

    if !overrides_enabled {
        return stable_sort_by_key(seeded, |rule| rule.priority);
    }

    let mut map = OrderedRuleMap { entries: seeded };
    for ov in overrides.iter().filter(|ov| ov.is_applicable_on(on)) {
        apply_override(&mut map, ov);
    }

    stable_sort_by_key(map.entries, |rule| rule.priority)
}

fn apply_override<P>(map: &mut OrderedRuleMap<P>, ov: &RuleOverride<P>)
where
    P: Clone + Overlay + SemanticTyped,
{
    match ov.action {
        OverrideAction::Disable => {
            if !map.remove(&ov.rule_id) {
                tracing::debug!(rule_id = %ov.rule_id, "disable override matched no effective entry");
            }
        }
        OverrideAction::Replace => {
            let merged = materialize(ov);
            let kind = merged.payload.semantic_kind();
            map.upsert(merged);
            if let Some(kind) = kind {
                map.suppress_kind_except(kind, &ov.rule_id);
            }
        }
        OverrideAction::Modify => {
            let merged = match map.position(&ov.rule_id) {
                Some(pos) => overlay_entry(&map.entries[pos], ov),
                None => {
                    tracing::debug!(rule_id = %ov.rule_id, "modify override matched no effective entry, inserting partial rule");
                    materialize(ov)
                }
            };
            map.upsert(merged);
        }
    }
}

fn effective_from_base<P: Clone>(rule: &BaseRule<P>) -> EffectiveRule<P> {
    EffectiveRule {
        rule_id: rule.rule_id.clone(),
        label: rule.label.clone(),
        priority: rule.priority,
        payload: rule.payload.clone(),
        origin: RuleOrigin::Base,
    }
}

/// Effective entry determined by the override alone (REPLACE, or
/// MODIFY with no target). Unset fields fall back to the empty label
/// and priority 0; the base is not blended in.
fn materialize<P: Clone>(ov: &RuleOverride<P>) -> EffectiveRule<P> {
    EffectiveRule {
        rule_id: ov.rule_id.clone(),
        label: ov.label.clone().unwrap_or_default(),
        priority: ov.priority.unwrap_or(0),
        payload: ov.payload.clone(),
        origin: RuleOrigin::Override,
    }
}

fn overlay_entry<P>(existing: &EffectiveRule<P>, ov: &RuleOverride<P>) -> EffectiveRule<P>
where
    P: Clone + Overlay,
{
    EffectiveRule {
        rule_id: existing.rule_id.clone(),
        label: ov.label.clone().unwrap_or_else(|| existing.label.clone()),
        priority: ov.priority.unwrap_or(existing.priority),
        payload: Overlay::overlay(&existing.payload, &ov.payload),
        origin: RuleOrigin::Override,
    }
}

/// Insertion-ordered map over effective rules. Rule counts per
/// contract and category are small, so key lookup is a linear scan;
/// upsert keeps the original slot to preserve tie-break order.
struct OrderedRuleMap<P> {
    entries: Vec<EffectiveRule<P>>,
}

impl<P> OrderedRuleMap<P> {
    fn position(&self, rule_id: &RuleId) -> Option<usize> {
        self.entries.iter().position(|e| &e.rule_id == rule_id)
    }

    fn remove(&mut self, rule_id: &RuleId) -> bool {
        match self.position(rule_id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    fn upsert(&mut self, rule: EffectiveRule<P>) {
        match self.position(&rule.rule_id) {
            Some(pos) => self.entries[pos] = rule,
            None => self.entries.push(rule),
        }
    }
}

impl<P: SemanticTyped> OrderedRuleMap<P> {
    /// Drop every entry of the given semantic kind except `keep`.
    fn suppress_kind_except(&mut self, kind: P::Kind, keep: &RuleId) {
        self.entries
            .retain(|e| &e.rule_id == keep || e.payload.semantic_kind() != Some(kind));
    }
}

#[cfg(test)]
mod tests {
    use super::OrderedRuleMap;
    use kontor_core::RuleId;
    use kontor_model::{EffectiveRule, RuleOrigin, ValidationPayload};

    fn entry(id: &str, priority: i32) -> EffectiveRule<ValidationPayload> {
        EffectiveRule {
            rule_id: RuleId::new(id).expect("valid rule id"),
            label: id.to_string(),
            priority,
            payload: ValidationPayload::default(),
            origin: RuleOrigin::Base,
        }
    }

    #[test]
    fn upsert_of_known_id_keeps_the_slot() {
        let mut map = OrderedRuleMap {
            entries: vec![entry("a", 1), entry("b", 2), entry("c", 3)],
        };
        map.upsert(entry("b", 99));

        let order: Vec<&str> = map.entries.iter().map(|e| e.rule_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(map.entries[1].priority, 99);
    }

    #[test]
    fn upsert_of_new_id_appends() {
        let mut map = OrderedRuleMap {
            entries: vec![entry("a", 1)],
        };
        map.upsert(entry("z", 0));
        let order: Vec<&str> = map.entries.iter().map(|e| e.rule_id.as_str()).collect();
        assert_eq!(order, vec!["a", "z"]);
    }

    #[test]
    fn remove_reports_absence() {
        let mut map = OrderedRuleMap {
            entries: vec![entry("a", 1)],
        };
        assert!(map.remove(&RuleId::new("a").expect("valid rule id")));
        assert!(!map.remove(&RuleId::new("a").expect("valid rule id")));
    }
}
