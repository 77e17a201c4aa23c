//! Scene selection: allow-lists, appended and removed steps.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use serde_json::json;
use vigil_validator::prelude::*;

fn user_validator() -> ValidatorBuilder {
    Validator::builder()
        .rule("name", "require|max:25")
        .rule("age", "number|between:1,120")
        .rule("email", "email")
}

#[test]
fn test_static_scene_narrows_fields() {
    let v = user_validator().scene("edit", ["name", "age"]).build();
    let data = json!({"name": "Ann", "age": 30, "email": "not-an-email"});

    assert!(!v.check(&data, &CheckOptions::new()).unwrap().is_valid());
    assert!(
        v.check(&data, &CheckOptions::new().scene("edit"))
            .unwrap()
            .is_valid()
    );
    assert_eq!(v.scene_fields("edit"), ["name", "age"]);
    assert!(v.has_scene("edit"));
    assert!(!v.has_scene("create"));
}

#[test]
fn test_scene_removes_and_appends_steps() {
    let v = user_validator()
        .scene_delta(
            "adult",
            SceneDelta::new().remove("age", "between").append("age", "require|egt:18"),
        )
        .build();
    let opts = CheckOptions::new().scene("adult").batch(true);

    let verdict = v.check(&json!({"name": "Ann", "age": 200}), &opts).unwrap();
    assert!(verdict.is_valid());

    let verdict = v.check(&json!({"name": "Ann", "age": 16}), &opts).unwrap();
    assert_eq!(
        verdict.error_for("age").unwrap().message,
        "age must be greater than or equal to 18"
    );

    let verdict = v.check(&json!({"name": "Ann"}), &opts).unwrap();
    assert_eq!(verdict.error_for("age").unwrap().message, "age is required");
}

#[test]
fn test_remove_matches_names_with_parameters() {
    let v = user_validator()
        .scene_delta("loose", SceneDelta::new().remove("name", "max:25"))
        .build();
    let data = json!({"name": "a name far longer than twenty five characters"});
    assert!(
        v.check(&data, &CheckOptions::new().scene("loose"))
            .unwrap()
            .is_valid()
    );
    assert!(!v.check(&data, &CheckOptions::new()).unwrap().is_valid());
}

#[test]
fn test_remove_all_skips_field() {
    let v = user_validator()
        .scene_delta("anonymous", SceneDelta::new().remove_all("name"))
        .build();
    assert!(
        v.check(&json!({}), &CheckOptions::new().scene("anonymous"))
            .unwrap()
            .is_valid()
    );
}

#[test]
fn test_appended_field_outside_base_rules() {
    let v = user_validator()
        .scene_delta("signup", SceneDelta::new().append("password", "require|min:8"))
        .build();
    let opts = CheckOptions::new().scene("signup");
    let verdict = v
        .check(&json!({"name": "Ann", "password": "short"}), &opts)
        .unwrap();
    assert_eq!(verdict.error_for("password").unwrap().rule.as_deref(), Some("min"));

    let cleaned = v
        .validate(
            &json!({"name": "Ann", "password": "long enough"}),
            Target::Scene("signup"),
            &ValidateOptions::new().security(true),
        )
        .unwrap();
    assert_eq!(cleaned["password"], "long enough");
}

#[test]
fn test_selector_runs_on_each_selection() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let v = user_validator()
        .scene_with("short_names", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            SceneDelta::new().only(["name"]).append("name", "max:3")
        })
        .build();
    let opts = CheckOptions::new().scene("short_names");

    let verdict = v.check(&json!({"name": "Alexander", "age": "x"}), &opts).unwrap();
    assert_eq!(verdict.error_for("name").unwrap().rule.as_deref(), Some("max"));
    assert!(v.check(&json!({"name": "Al", "age": "x"}), &opts).unwrap().is_valid());
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    assert!(!v.check(&json!({"name": "Al", "age": "x"}), &CheckOptions::new())
        .unwrap()
        .is_valid());
}

#[test]
fn test_unknown_scene_uses_base_rules() {
    let v = user_validator().build();
    let verdict = v
        .check(&json!({"age": 500}), &CheckOptions::new().scene("missing"))
        .unwrap();
    assert!(!verdict.is_valid());
}

#[test]
fn test_validate_with_static_scene_and_null_filter() {
    let v = user_validator().scene("edit", ["name", "email"]).build();
    let cleaned = v
        .validate(
            &json!({"name": "Ann", "email": null, "age": null}),
            Target::Scene("edit"),
            &ValidateOptions::new().filter_nulls(true),
        )
        .unwrap();
    assert_eq!(cleaned, json!({"name": "Ann", "age": null}));
}

#[test]
fn test_scene_names_keep_definition_order() {
    let v = user_validator()
        .scene("b", ["name"])
        .scene("a", ["age"])
        .build();
    assert_eq!(v.scene_names().collect::<Vec<_>>(), ["b", "a"]);
}
