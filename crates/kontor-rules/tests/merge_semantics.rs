// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use kontor_core::RuleId;
use kontor_model::{
    AdjustmentFrequency, AdjustmentKind, BaseRule, OverrideAction, RateAdjustmentPayload,
    RuleOrigin, RuleOverride, ValidationKind, ValidationPayload, ValidityWindow,
};
use kontor_rules::merge_category;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn today() -> NaiveDate {
    date(2025, 6, 15)
}

fn always() -> ValidityWindow {
    ValidityWindow::open_ended(date(2020, 1, 1))
}

fn rule_id(id: &str) -> RuleId {
    RuleId::new(id).expect("valid rule id")
}

fn base_validation(id: &str, kind: ValidationKind, priority: i32) -> BaseRule<ValidationPayload> {
    BaseRule {
        rule_id: rule_id(id),
        label: format!("base {id}"),
        priority,
        active: true,
        window: always(),
        payload: ValidationPayload {
            kind: Some(kind),
            required: Some(true),
            threshold_hours: None,
        },
    }
}

fn override_validation(
    id: &str,
    action: OverrideAction,
    payload: ValidationPayload,
) -> RuleOverride<ValidationPayload> {
    RuleOverride {
        rule_id: rule_id(id),
        action,
        label: None,
        priority: None,
        window: always(),
        payload,
    }
}

#[test]
fn disabled_gate_returns_sorted_base_and_ignores_overrides() {
    let base = vec![
        base_validation("v-2", ValidationKind::AttachmentRequired, 20),
        base_validation("v-1", ValidationKind::NotesRequired, 10),
    ];
    let overrides = vec![override_validation(
        "v-1",
        OverrideAction::Disable,
        ValidationPayload::default(),
    )];

    let effective = merge_category(&base, &overrides, today(), false);

    let ids: Vec<&str> = effective.iter().map(|r| r.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["v-1", "v-2"]);
    assert!(effective.iter().all(|r| r.origin == RuleOrigin::Base));
}

#[test]
fn disable_removes_entry_with_base_present() {
    let base = vec![
        base_validation("v-1", ValidationKind::NotesRequired, 10),
        base_validation("v-2", ValidationKind::AttachmentRequired, 20),
    ];
    let overrides = vec![override_validation(
        "v-1",
        OverrideAction::Disable,
        ValidationPayload::default(),
    )];

    let effective = merge_category(&base, &overrides, today(), true);
    assert_eq!(effective.len(), 1);
    assert_eq!(effective[0].rule_id.as_str(), "v-2");
}

#[test]
fn disable_without_base_is_a_silent_noop() {
    let base = vec![base_validation("v-1", ValidationKind::NotesRequired, 10)];
    let overrides = vec![override_validation(
        "ghost",
        OverrideAction::Disable,
        ValidationPayload::default(),
    )];

    let effective = merge_category(&base, &overrides, today(), true);
    assert_eq!(effective.len(), 1);
    assert_eq!(effective[0].rule_id.as_str(), "v-1");
}

#[test]
fn replace_suppresses_other_rules_of_the_same_kind() {
    // Base rule `v-notes` and override `c-notes` carry different rule
    // ids but the same semantic kind; the override must win alone.
    let base = vec![
        base_validation("v-notes", ValidationKind::NotesRequired, 10),
        base_validation("v-attach", ValidationKind::AttachmentRequired, 20),
    ];
    let overrides = vec![RuleOverride {
        rule_id: rule_id("c-notes"),
        action: OverrideAction::Replace,
        label: Some("contract notes rule".to_string()),
        priority: Some(5),
        window: always(),
        payload: ValidationPayload {
            kind: Some(ValidationKind::NotesRequired),
            required: Some(false),
            threshold_hours: None,
        },
    }];

    let effective = merge_category(&base, &overrides, today(), true);

    let ids: Vec<&str> = effective.iter().map(|r| r.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["c-notes", "v-attach"]);
    assert_eq!(effective[0].origin, RuleOrigin::Override);
    assert_eq!(effective[0].payload.required, Some(false));
}

#[test]
fn replace_without_kind_suppresses_nothing_else() {
    let base = vec![
        base_validation("v-notes", ValidationKind::NotesRequired, 10),
        base_validation("v-attach", ValidationKind::AttachmentRequired, 20),
    ];
    // Kindless REPLACE payloads do not pass admin validation, but the
    // engine must still degrade gracefully if one reaches it.
    let overrides = vec![override_validation(
        "c-x",
        OverrideAction::Replace,
        ValidationPayload::default(),
    )];

    let effective = merge_category(&base, &overrides, today(), true);
    assert_eq!(effective.len(), 3);
}

#[test]
fn replace_also_suppresses_earlier_override_entries_of_the_kind() {
    let base = vec![base_validation("v-notes", ValidationKind::NotesRequired, 10)];
    let first = RuleOverride {
        rule_id: rule_id("c-notes-a"),
        action: OverrideAction::Replace,
        label: None,
        priority: Some(1),
        window: always(),
        payload: ValidationPayload {
            kind: Some(ValidationKind::NotesRequired),
            required: Some(true),
            threshold_hours: None,
        },
    };
    let second = RuleOverride {
        rule_id: rule_id("c-notes-b"),
        action: OverrideAction::Replace,
        label: None,
        priority: Some(2),
        window: always(),
        payload: ValidationPayload {
            kind: Some(ValidationKind::NotesRequired),
            required: Some(false),
            threshold_hours: None,
        },
    };

    let effective = merge_category(&base, &[first, second], today(), true);
    assert_eq!(effective.len(), 1);
    assert_eq!(effective[0].rule_id.as_str(), "c-notes-b");
}

#[test]
fn modify_overlays_set_fields_and_inherits_the_rest() {
    let base = vec![BaseRule {
        rule_id: rule_id("r-index"),
        label: "yearly indexation".to_string(),
        priority: 10,
        active: true,
        window: always(),
        payload: RateAdjustmentPayload {
            kind: Some(AdjustmentKind::Indexation),
            percent: Some(5.0),
            frequency: Some(AdjustmentFrequency::Monthly),
        },
    }];
    let overrides = vec![RuleOverride {
        rule_id: rule_id("r-index"),
        action: OverrideAction::Modify,
        label: None,
        priority: None,
        window: always(),
        payload: RateAdjustmentPayload {
            kind: None,
            percent: Some(7.0),
            frequency: None,
        },
    }];

    let effective = merge_category(&base, &overrides, today(), true);
    assert_eq!(effective.len(), 1);
    let merged = &effective[0];
    assert_eq!(merged.label, "yearly indexation");
    assert_eq!(merged.priority, 10);
    assert_eq!(merged.payload.percent, Some(7.0));
    assert_eq!(merged.payload.frequency, Some(AdjustmentFrequency::Monthly));
    assert_eq!(merged.origin, RuleOrigin::Override);
}

#[test]
fn modify_without_base_inserts_a_partial_rule() {
    let overrides = vec![RuleOverride {
        rule_id: rule_id("fresh"),
        action: OverrideAction::Modify,
        label: Some("contract-only rule".to_string()),
        priority: Some(3),
        window: always(),
        payload: ValidationPayload {
            kind: Some(ValidationKind::ApprovalRequired),
            required: Some(true),
            threshold_hours: None,
        },
    }];

    let effective = merge_category::<ValidationPayload>(&[], &overrides, today(), true);
    assert_eq!(effective.len(), 1);
    assert_eq!(effective[0].rule_id.as_str(), "fresh");
    assert_eq!(effective[0].label, "contract-only rule");
    assert_eq!(effective[0].priority, 3);
}

#[test]
fn out_of_window_rules_and_overrides_never_apply() {
    let expired = BaseRule {
        window: ValidityWindow {
            starts_on: date(2024, 1, 1),
            ends_on: Some(date(2024, 12, 31)),
        },
        ..base_validation("v-old", ValidationKind::NotesRequired, 10)
    };
    let future_override = RuleOverride {
        window: ValidityWindow::open_ended(date(2026, 1, 1)),
        ..override_validation("v-live", OverrideAction::Disable, ValidationPayload::default())
    };
    let base = vec![
        expired,
        base_validation("v-live", ValidationKind::AttachmentRequired, 20),
    ];

    let effective = merge_category(&base, &[future_override], today(), true);
    assert_eq!(effective.len(), 1);
    assert_eq!(effective[0].rule_id.as_str(), "v-live");
}

#[test]
fn inactive_base_rules_are_excluded() {
    let mut inactive = base_validation("v-1", ValidationKind::NotesRequired, 10);
    inactive.active = false;
    let base = vec![
        inactive,
        base_validation("v-2", ValidationKind::AttachmentRequired, 20),
    ];

    let effective = merge_category::<ValidationPayload>(&base, &[], today(), true);
    assert_eq!(effective.len(), 1);
    assert_eq!(effective[0].rule_id.as_str(), "v-2");
}

#[test]
fn equal_priorities_keep_base_store_order_then_override_insertion_order() {
    let base = vec![
        base_validation("b-1", ValidationKind::NotesRequired, 10),
        base_validation("b-2", ValidationKind::AttachmentRequired, 10),
    ];
    let added = RuleOverride {
        rule_id: rule_id("c-1"),
        action: OverrideAction::Replace,
        label: None,
        priority: Some(10),
        window: always(),
        payload: ValidationPayload {
            kind: Some(ValidationKind::ApprovalRequired),
            required: Some(true),
            threshold_hours: None,
        },
    };

    let effective = merge_category(&base, &[added], today(), true);
    let ids: Vec<&str> = effective.iter().map(|r| r.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["b-1", "b-2", "c-1"]);
}

#[test]
fn modify_keeps_the_original_map_slot_for_tie_breaks() {
    let base = vec![
        base_validation("b-1", ValidationKind::NotesRequired, 10),
        base_validation("b-2", ValidationKind::AttachmentRequired, 10),
    ];
    let touch_first = RuleOverride {
        rule_id: rule_id("b-1"),
        action: OverrideAction::Modify,
        label: None,
        priority: None,
        window: always(),
        payload: ValidationPayload {
            kind: None,
            required: Some(false),
            threshold_hours: None,
        },
    };

    let effective = merge_category(&base, &[touch_first], today(), true);
    let ids: Vec<&str> = effective.iter().map(|r| r.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["b-1", "b-2"]);
    assert_eq!(effective[0].payload.required, Some(false));
}
