// SPDX-License-Identifier: Apache-2.0

use kontor_model::{
    AdjustmentKind, PayloadMode, PricingStepKind, PricingStepPayload, RateAdjustmentPayload,
    RuleValidationError, ValidatePayload, ValidationKind, ValidationPayload,
};

fn assert_missing(result: Result<(), RuleValidationError>, field: &str) {
    match result {
        Err(RuleValidationError::MissingField { field: f, .. }) => assert_eq!(f, field),
        other => panic!("expected missing `{field}`, got {other:?}"),
    }
}

#[test]
fn validation_flag_kinds_need_required() {
    let payload = ValidationPayload {
        kind: Some(ValidationKind::NotesRequired),
        required: None,
        threshold_hours: None,
    };
    assert_missing(payload.validate(PayloadMode::Full), "required");

    let complete = ValidationPayload {
        required: Some(true),
        ..payload
    };
    assert!(complete.validate(PayloadMode::Full).is_ok());
}

#[test]
fn validation_threshold_kinds_need_positive_threshold() {
    let payload = ValidationPayload {
        kind: Some(ValidationKind::MaxHoursPerEntry),
        required: None,
        threshold_hours: None,
    };
    assert_missing(payload.validate(PayloadMode::Full), "threshold_hours");

    let zero = ValidationPayload {
        threshold_hours: Some(0.0),
        ..payload.clone()
    };
    assert!(matches!(
        zero.validate(PayloadMode::Full),
        Err(RuleValidationError::NonPositive { .. })
    ));

    let nan = ValidationPayload {
        threshold_hours: Some(f64::NAN),
        ..payload.clone()
    };
    assert!(matches!(
        nan.validate(PayloadMode::Partial),
        Err(RuleValidationError::NonFinite { .. })
    ));

    let complete = ValidationPayload {
        threshold_hours: Some(10.0),
        ..payload
    };
    assert!(complete.validate(PayloadMode::Full).is_ok());
}

#[test]
fn rate_adjustment_needs_kind_and_percent() {
    let empty = RateAdjustmentPayload::default();
    assert_missing(empty.validate(PayloadMode::Full), "adjustment_type");

    let without_percent = RateAdjustmentPayload {
        kind: Some(AdjustmentKind::Indexation),
        ..RateAdjustmentPayload::default()
    };
    assert_missing(without_percent.validate(PayloadMode::Full), "percent");

    // A patch carrying only percent is a legal MODIFY payload.
    let patch = RateAdjustmentPayload {
        percent: Some(7.0),
        ..RateAdjustmentPayload::default()
    };
    assert!(patch.validate(PayloadMode::Partial).is_ok());
}

#[test]
fn pricing_step_companion_fields_follow_the_kind() {
    let admin_fee = PricingStepPayload {
        kind: Some(PricingStepKind::AdminFeePercent),
        ..PricingStepPayload::default()
    };
    assert_missing(admin_fee.validate(PayloadMode::Full), "percent");

    let deduction = PricingStepPayload {
        kind: Some(PricingStepKind::FixedDeduction),
        ..PricingStepPayload::default()
    };
    assert_missing(deduction.validate(PayloadMode::Full), "amount_minor");

    let discount = PricingStepPayload {
        kind: Some(PricingStepKind::PercentDiscountOnSum),
        ..PricingStepPayload::default()
    };
    assert_missing(
        discount.validate(PayloadMode::Full),
        "percent or parameter_key",
    );

    let discount_by_key = PricingStepPayload {
        kind: Some(PricingStepKind::PercentDiscountOnSum),
        parameter_key: Some("project.discount".to_string()),
        ..PricingStepPayload::default()
    };
    assert!(discount_by_key.validate(PayloadMode::Full).is_ok());

    let rounding = PricingStepPayload {
        kind: Some(PricingStepKind::Rounding),
        ..PricingStepPayload::default()
    };
    assert!(rounding.validate(PayloadMode::Full).is_ok());
}

#[test]
fn enum_wire_names_are_screaming_snake() {
    let json = serde_json::to_string(&PricingStepKind::AdminFeePercent).expect("encode");
    assert_eq!(json, "\"ADMIN_FEE_PERCENT\"");
    let json = serde_json::to_string(&ValidationKind::NotesRequired).expect("encode");
    assert_eq!(json, "\"NOTES_REQUIRED\"");
}
