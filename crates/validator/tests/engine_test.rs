//! End-to-end evaluation through the public API.

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use vigil_validator::prelude::*;

fn check(validator: &Validator, data: Value) -> Verdict {
    validator.check(&data, &CheckOptions::new()).unwrap()
}

fn message(verdict: &Verdict) -> String {
    verdict.message().expect("a failure").to_string()
}

// ============================================================================
// CHAINS
// ============================================================================

#[test]
fn test_required_then_comparison() {
    let v = Validator::builder().rule("age", "require|gt:5").build();

    let verdict = check(&v, json!({"age": 3}));
    assert_eq!(message(&verdict), "age must be greater than 5");
    assert_eq!(verdict.error_for("age").unwrap().rule.as_deref(), Some("gt"));

    let verdict = check(&v, json!({"age": null}));
    assert_eq!(message(&verdict), "age is required");
    assert_eq!(verdict.error_for("age").unwrap().rule.as_deref(), Some("require"));

    assert!(check(&v, json!({"age": 6})).is_valid());
}

#[test]
fn test_optional_checks_skip_absent_values() {
    let v = Validator::builder()
        .rule("email", "email")
        .rule("age", "number|between:1,120")
        .build();
    assert!(check(&v, json!({})).is_valid());
    assert!(check(&v, json!({"email": "", "age": null})).is_valid());
    assert!(!check(&v, json!({"email": "nope"})).is_valid());
}

#[test]
fn test_no_rules_is_valid() {
    let v = Validator::builder().build();
    assert!(check(&v, json!({"anything": "goes"})).is_valid());

    let v = Validator::builder().rule("note", "").build();
    assert!(check(&v, json!({"note": ""})).is_valid());
}

#[rstest]
#[case(json!(3), true)]
#[case(json!(5), true)]
#[case(json!(7), true)]
#[case(json!("6"), true)]
#[case(json!(2), false)]
#[case(json!(8), false)]
fn test_between(#[case] value: Value, #[case] ok: bool) {
    let v = Validator::builder().rule("n", "between:3,7").build();
    assert_eq!(check(&v, json!({"n": value})).is_valid(), ok);
}

#[test]
fn test_title_sources() {
    let v = Validator::builder()
        .rule("name|Full name", "require")
        .rule("age", "require")
        .rule("city", "require")
        .title("age", "Age")
        .build();
    let verdict = v
        .check(&json!({}), &CheckOptions::new().batch(true))
        .unwrap();
    assert_eq!(verdict.error_for("name").unwrap().message, "Full name is required");
    assert_eq!(verdict.error_for("age").unwrap().message, "Age is required");
    assert_eq!(verdict.error_for("city").unwrap().message, "city is required");
}

#[test]
fn test_aliases_and_keyed_entries() {
    let v = Validator::builder()
        .rule("age", ">=:18")
        .rule("score", [RuleEntry::keyed("lt", 100), RuleEntry::from("number")])
        .alias("atLeast", "egt")
        .rule("level", "atLeast:2")
        .build();
    assert!(check(&v, json!({"age": 18, "score": 99, "level": 2})).is_valid());
    assert_eq!(
        message(&check(&v, json!({"age": 17}))),
        "age must be greater than or equal to 18"
    );
    assert_eq!(
        message(&check(&v, json!({"score": 100}))),
        "score must be less than 100"
    );
    assert!(!check(&v, json!({"level": 1})).is_valid());
}

#[test]
fn test_cross_field_operands() {
    let v = Validator::builder()
        .rule("max_price", "gt:min_price")
        .rule("password", "require|confirm")
        .rule("new_email", "different:email")
        .build();
    assert!(
        check(
            &v,
            json!({
                "min_price": 10, "max_price": 20,
                "password": "s3cret", "password_confirm": "s3cret",
                "email": "a@b.c", "new_email": "d@e.f"
            })
        )
        .is_valid()
    );
    let verdict = check(&v, json!({"min_price": 30, "max_price": 20}));
    assert_eq!(verdict.error_for("max_price").unwrap().rule.as_deref(), Some("gt"));

    let verdict = check(&v, json!({"password": "a", "password_confirm": "b"}));
    assert_eq!(verdict.error_for("password").unwrap().rule.as_deref(), Some("confirm"));
}

#[test]
fn test_dotted_paths() {
    let v = Validator::builder()
        .rule("user.age", "require|egt:18")
        .build();
    assert!(check(&v, json!({"user": {"age": 30}})).is_valid());
    assert_eq!(
        message(&check(&v, json!({"user": {}}))),
        "user.age is required"
    );
    assert_eq!(message(&check(&v, json!({}))), "user.age is required");
}

#[test]
fn test_conditional_requirements() {
    let v = Validator::builder()
        .rule("vat", "requireIf:kind,company")
        .rule("fax", "requireWithout:phone")
        .rule("reason", "requireCallback:is_refund")
        .condition("is_refund", |_, data| data["type"] == "refund")
        .build();
    assert!(check(&v, json!({"kind": "person", "phone": "1"})).is_valid());
    assert_eq!(
        check(&v, json!({"kind": "company", "phone": "1"}))
            .error_for("vat")
            .unwrap()
            .message,
        "vat is required"
    );
    assert!(!check(&v, json!({"kind": "person"})).is_valid());
    assert!(!check(&v, json!({"phone": "1", "type": "refund"})).is_valid());
}

// ============================================================================
// MODES
// ============================================================================

#[test]
fn test_batch_keeps_one_message_per_failing_field() {
    let v = Validator::builder()
        .rule("a", "require")
        .rule("b", "require|alpha")
        .build();
    let verdict = v
        .check(&json!({"a": "", "b": "x"}), &CheckOptions::new().batch(true))
        .unwrap();
    let Verdict::Batch(errors) = verdict else {
        panic!("expected batch verdict");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.message("a").unwrap(), "a is required");
    assert!(errors.get("b").is_none());
}

#[test]
fn test_chain_is_fail_fast_inside_batch() {
    let v = Validator::builder().rule("code", "require|alpha|max:3").build();
    let verdict = v
        .check(&json!({"code": "12345"}), &CheckOptions::new().batch(true))
        .unwrap();
    assert_eq!(verdict.error_for("code").unwrap().rule.as_deref(), Some("alpha"));
}

#[test]
fn test_fail_exception_in_batch_raises_all() {
    let v = Validator::builder()
        .rule("a", "require")
        .rule("b", "require")
        .build();
    let err = v
        .check(
            &json!({}),
            &CheckOptions::new().batch(true).fail_exception(true),
        )
        .unwrap_err();
    let ValidationError::Fields(errors) = err else {
        panic!("expected batch error");
    };
    assert_eq!(errors.fields().collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
fn test_verdict_into_result() {
    let v = Validator::builder().rule("a", "require").build();
    let err = check(&v, json!({})).into_result().unwrap_err();
    assert_eq!(err.to_string(), "a is required");
    assert!(check(&v, json!({"a": 1})).into_result().is_ok());
}

#[test]
fn test_security_mode_rejects_unknown_keys() {
    let v = Validator::builder().rule("name", "require").build();
    let err = v
        .validate(
            &json!({"name": "A", "extra": "B"}),
            Target::Base,
            &ValidateOptions::new().security(true),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "extra invalid");
}

#[test]
fn test_validate_with_explicit_rules() {
    let v = Validator::builder().rule("name", "require").build();
    let table = RuleTable::new().field("code", "require|alphaNum");
    let cleaned = v
        .validate(&json!({"code": "A1"}), Target::Rules(&table), &ValidateOptions::new())
        .unwrap();
    assert_eq!(cleaned, json!({"code": "A1"}));
}

// ============================================================================
// NESTED
// ============================================================================

#[test]
fn test_nested_reports_first_failing_record() {
    let v = Validator::builder()
        .rule("items", RuleTable::new().field("*.qty", "require|gt:0"))
        .build();
    let verdict = check(&v, json!({"items": [{"qty": 1}, {"qty": -1}, {"qty": 0}]}));
    let error = verdict.error_for("items").unwrap();
    assert_eq!(error.path.as_deref(), Some("items.1.qty"));
    assert_eq!(error.rule.as_deref(), Some("gt"));
    assert_eq!(error.message, "items.qty must be greater than 0");

    assert!(check(&v, json!({"items": [{"qty": 2}]})).is_valid());
}

#[test]
fn test_nested_structure_mismatch() {
    let v = Validator::builder()
        .rule("items", RuleTable::new().field("*.qty", "require"))
        .title("items", "Items")
        .build();
    for data in [json!({"items": "x"}), json!({"items": [1, 2]}), json!({})] {
        let verdict = check(&v, data);
        assert_eq!(message(&verdict), "Items must be a list of records");
    }
}

#[test]
fn test_nested_item_titles() {
    let v = Validator::builder()
        .rule("lines", RuleTable::new().field("*.sku", "require"))
        .title("lines.sku", "SKU")
        .build();
    let verdict = check(&v, json!({"lines": [{"sku": ""}]}));
    assert_eq!(message(&verdict), "SKU is required");
}

// ============================================================================
// MESSAGES
// ============================================================================

#[test]
fn test_message_precedence() {
    let v = Validator::builder()
        .rule("age", "require|number|gt:17")
        .rule("name", "require|max:3")
        .rule("city", "require")
        .message("age.gt", ":attribute must be an adult")
        .message("name", Template::from_iter([("max", "name too long")]))
        .message("city", "where do you live?")
        .type_message("number", ":attribute wants digits")
        .build();

    let batch = CheckOptions::new().batch(true);
    let verdict = v
        .check(&json!({"age": 10, "name": "Alexander"}), &batch)
        .unwrap();
    assert_eq!(verdict.error_for("age").unwrap().message, "age must be an adult");
    assert_eq!(verdict.error_for("name").unwrap().message, "name too long");
    assert_eq!(verdict.error_for("city").unwrap().message, "where do you live?");

    let verdict = v.check(&json!({"age": "ten"}), &batch).unwrap();
    assert_eq!(verdict.error_for("age").unwrap().message, "age wants digits");
}

#[test]
fn test_unknown_rule_message_falls_back() {
    let v = Validator::builder().rule("code", "noSuchRule").build();
    assert_eq!(message(&check(&v, json!({"code": "x"}))), "code is invalid");
}

#[test]
fn test_keyed_format_tags() {
    let v = Validator::builder()
        .rule(
            "email",
            vec![RuleEntry::keyed("require", true), RuleEntry::keyed("email", true)],
        )
        .build();
    assert!(check(&v, json!({"email": "ada@example.com"})).is_valid());
    assert_eq!(message(&check(&v, json!({}))), "email is required");
    assert_eq!(
        message(&check(&v, json!({"email": "nope"}))),
        "email is not a valid email address"
    );
}

#[test]
fn test_keyed_format_tags_from_schema() {
    let schema = Schema::from_json_str(
        r#"{"rules": {"email": {"require": true, "email": true}, "terms": {"accepted": true}}}"#,
    )
    .unwrap();
    let v = Validator::builder().schema(schema).build();
    assert!(check(&v, json!({"email": "ada@example.com", "terms": "yes"})).is_valid());

    let verdict = v
        .check(&json!({"email": "nope", "terms": "no"}), &CheckOptions::new().batch(true))
        .unwrap();
    assert_eq!(verdict.error_for("email").unwrap().rule.as_deref(), Some("email"));
    assert_eq!(verdict.error_for("terms").unwrap().rule.as_deref(), Some("accepted"));
}

#[rstest]
#[case(json!(["1", "2.5", 3]), "arrayHasOnlyInts", true)]
#[case(json!([1, "x"]), "arrayHasOnlyInts", false)]
#[case(json!("5"), "intOrArrayInt", true)]
#[case(json!(2.5), "intOrArrayInt", true)]
#[case(json!(["7", 8]), "intOrArrayInt", true)]
#[case(json!("five"), "intOrArrayInt", false)]
fn test_numeric_lists(#[case] value: Value, #[case] rule: &str, #[case] ok: bool) {
    let v = Validator::builder().build();
    assert_eq!(v.check_value(&value, rule).unwrap().is_pass(), ok);
}

#[test]
fn test_described_rules() {
    let rules = Rules::new()
        .rule("require")
        .message("tell us your age")
        .keyed("between", "18,120")
        .title("Age");
    let v = Validator::builder().rule("age", rules).build();
    assert_eq!(message(&check(&v, json!({}))), "tell us your age");
    assert_eq!(
        message(&check(&v, json!({"age": 12}))),
        "Age must be between 18 and 120"
    );
}

#[test]
fn test_map_message_renders_every_value() {
    let v = Validator::builder()
        .rule("age", "require")
        .message(
            "age",
            Template::from_iter([("en", ":attribute is missing"), ("fr", ":attribute manque")]),
        )
        .build();
    let verdict = check(&v, json!({}));
    let Message::Map(map) = &verdict.error_for("age").unwrap().message else {
        panic!("expected a structured message");
    };
    assert_eq!(map["en"], "age is missing");
    assert_eq!(map["fr"], "age manque");
}

// ============================================================================
// CLOSURES AND EXTENSIONS
// ============================================================================

#[test]
fn test_closure_field_rule() {
    let v = Validator::builder()
        .rule(
            "code",
            FieldRule::closure(|value, _| {
                if value.as_str().is_some_and(|s| s.starts_with("X-")) {
                    Outcome::Pass
                } else {
                    Outcome::fail_with(":attribute needs the X- prefix")
                }
            }),
        )
        .build();
    assert!(check(&v, json!({"code": "X-1"})).is_valid());
    assert_eq!(
        message(&check(&v, json!({"code": "Y-1"}))),
        "code needs the X- prefix"
    );
}

#[test]
fn test_closure_step_with_data() {
    let rules = Rules::new().rule("require").closure("matches_plan", |value, data| {
        Outcome::from(value == &data["plan"])
    });
    let v = Validator::builder()
        .rule("plan_confirm", rules)
        .message("plan_confirm", "plans differ")
        .build();
    assert!(check(&v, json!({"plan": "pro", "plan_confirm": "pro"})).is_valid());
    assert_eq!(
        message(&check(&v, json!({"plan": "pro", "plan_confirm": "free"}))),
        "plans differ"
    );
}

#[test]
fn test_extension_overrides_builtin_and_format() {
    let even = |input: &CheckInput<'_>| {
        Outcome::from(input.value.as_i64().is_some_and(|n| n % 2 == 0))
    };
    let v = Validator::builder()
        .extend_with_message("evenNumber", even, ":attribute must be even")
        .rule("n", "evenNumber")
        .build();
    assert!(check(&v, json!({"n": 4})).is_valid());
    assert_eq!(message(&check(&v, json!({"n": 3}))), "n must be even");

    let always = |_: &CheckInput<'_>| Outcome::Pass;
    let v = Validator::builder()
        .extend("max", always)
        .rule("name", "max:1")
        .build();
    assert!(check(&v, json!({"name": "long"})).is_valid());
}

#[test]
fn test_extension_last_registration_wins() {
    let v = Validator::builder()
        .extend("flag", |_: &CheckInput<'_>| Outcome::Fail)
        .extend("flag", |_: &CheckInput<'_>| Outcome::Pass)
        .rule("x", "flag")
        .build();
    assert!(check(&v, json!({"x": 1})).is_valid());
}

#[test]
fn test_extension_runs_on_absent_values() {
    let v = Validator::builder()
        .extend("present", |input: &CheckInput<'_>| {
            Outcome::from(!input.value.is_null())
        })
        .rule("x", "present")
        .build();
    assert!(!check(&v, json!({})).is_valid());
}

#[test]
fn test_extension_soft_failure_substitutes_placeholders() {
    let v = Validator::builder()
        .extend("vowel", |input: &CheckInput<'_>| {
            let ok = input
                .value
                .as_str()
                .is_some_and(|s| s.starts_with(['a', 'e', 'i', 'o', 'u']));
            if ok {
                Outcome::Pass
            } else {
                Outcome::fail_with(":attribute must start with :rule")
            }
        })
        .rule("word", [RuleEntry::keyed("vowel", "a vowel")])
        .build();
    assert_eq!(
        message(&check(&v, json!({"word": "tree"}))),
        "word must start with a vowel"
    );
}

#[test]
fn test_custom_patterns() {
    let v = Validator::builder()
        .pattern("sku", r"/^[A-Z]{3}-\d+$/")
        .rule("sku", "regex:sku")
        .rule("alt", "sku")
        .rule("zip", "zip")
        .build();
    assert!(check(&v, json!({"sku": "ABC-12", "alt": "XYZ-1", "zip": "100000"})).is_valid());
    assert!(!check(&v, json!({"sku": "abc-12"})).is_valid());
    assert!(!check(&v, json!({"alt": "AB-1"})).is_valid());
}

#[test]
fn test_check_value_standalone() {
    let v = Validator::builder().build();
    assert_eq!(v.check_value(&json!("a@b.co"), "require|email").unwrap(), Outcome::Pass);
    assert_eq!(v.check_value(&json!(""), "require|email").unwrap(), Outcome::Fail);
    assert_eq!(
        v.check_value(&json!(5), FieldRule::closure(|v, _| Outcome::from(v == 5)))
            .unwrap(),
        Outcome::Pass
    );
}
