//! Rules backed by external capabilities.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use vigil_validator::foundation::Capability;
use vigil_validator::prelude::*;

// ============================================================================
// FIXTURES
// ============================================================================

/// In-memory `users` table that records every query it answers.
#[derive(Clone, Default)]
struct Users {
    rows: Vec<Value>,
    seen: Arc<Mutex<Vec<UniqueQuery>>>,
}

impl Users {
    fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            rows,
            seen: Arc::default(),
        }
    }

    fn queries(&self) -> Vec<UniqueQuery> {
        self.seen.lock().unwrap().clone()
    }
}

impl RowCounter for Users {
    fn count(&self, query: &UniqueQuery) -> Result<u64, CollaboratorError> {
        self.seen.lock().unwrap().push(query.clone());
        let hits = self
            .rows
            .iter()
            .filter(|row| query.conditions.iter().all(|(col, v)| &row[col] == v))
            .filter(|row| {
                query
                    .exclude
                    .as_ref()
                    .is_none_or(|(pk, own)| &row[pk] != own)
            })
            .count();
        Ok(hits as u64)
    }
}

struct BrokenStore;

impl RowCounter for BrokenStore {
    fn count(&self, _: &UniqueQuery) -> Result<u64, CollaboratorError> {
        Err(CollaboratorError::new(Capability::Store, "connection refused"))
    }
}

struct SessionTokens;

impl TokenChecker for SessionTokens {
    fn verify(&self, name: &str, data: &Value) -> Result<bool, CollaboratorError> {
        Ok(data[name] == "t0k3n")
    }
}

struct French;

impl TextCatalog for French {
    fn lookup(&self, key: &str) -> Result<String, CollaboratorError> {
        match key {
            "name_required" => Ok(":attribute est obligatoire".to_owned()),
            other => Err(CollaboratorError::new(
                Capability::Catalog,
                format!("missing key {other}"),
            )),
        }
    }
}

fn users() -> Users {
    Users::with_rows(vec![
        json!({"id": 1, "email": "ann@example.com", "team": "a"}),
        json!({"id": 2, "email": "bob@example.com", "team": "b"}),
    ])
}

// ============================================================================
// UNIQUE
// ============================================================================

#[test]
fn test_unique_against_store() {
    let store = users();
    let v = Validator::builder()
        .rule("email", "require|unique:users")
        .collaborators(Collaborators::new().with_store(store.clone()))
        .build();

    let verdict = v
        .check(&json!({"email": "ann@example.com"}), &CheckOptions::new())
        .unwrap();
    assert_eq!(verdict.message().unwrap(), "email already exists");

    let verdict = v
        .check(&json!({"email": "new@example.com"}), &CheckOptions::new())
        .unwrap();
    assert!(verdict.is_valid());

    let queries = store.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].table, "users");
    assert_eq!(
        queries[0].conditions,
        vec![("email".to_owned(), json!("ann@example.com"))]
    );
}

#[test]
fn test_unique_excludes_own_record() {
    let v = Validator::builder()
        .rule("email", "unique:users")
        .collaborators(Collaborators::new().with_store(users()))
        .build();
    let verdict = v
        .check(&json!({"id": 1, "email": "ann@example.com"}), &CheckOptions::new())
        .unwrap();
    assert!(verdict.is_valid());
}

#[test]
fn test_unique_over_several_columns() {
    let store = users();
    let v = Validator::builder()
        .rule("email", "unique:users,email^team")
        .collaborators(Collaborators::new().with_store(store.clone()))
        .build();
    let data = json!({"email": "ann@example.com", "team": "b"});
    assert!(v.check(&data, &CheckOptions::new()).unwrap().is_valid());
    assert_eq!(store.queries()[0].conditions.len(), 2);
}

#[test]
fn test_missing_store_fails_the_rule() {
    let v = Validator::builder().rule("email", "unique:users").build();
    let verdict = v
        .check(&json!({"email": "ann@example.com"}), &CheckOptions::new())
        .unwrap();
    assert!(!verdict.is_valid());
}

#[test]
fn test_store_failure_is_an_error_not_a_verdict() {
    let v = Validator::builder()
        .rule("email", "unique:users")
        .collaborators(Collaborators::new().with_store(BrokenStore))
        .build();
    let err = v
        .check(&json!({"email": "x@y.z"}), &CheckOptions::new().batch(true))
        .unwrap_err();
    let ValidationError::Collaborator(source) = &err else {
        panic!("expected a collaborator error, got {err:?}");
    };
    assert_eq!(source.capability, Capability::Store);
    assert_eq!(err.to_string(), "record store failed: connection refused");
}

// ============================================================================
// TOKENS, FILES, MESSAGES
// ============================================================================

#[test]
fn test_token() {
    let v = Validator::builder()
        .rule("__token__", "token")
        .collaborators(Collaborators::new().with_tokens(SessionTokens))
        .build();
    let opts = CheckOptions::new();
    assert!(v.check(&json!({"__token__": "t0k3n"}), &opts).unwrap().is_valid());
    assert_eq!(
        v.check(&json!({"__token__": "forged"}), &opts)
            .unwrap()
            .message()
            .unwrap(),
        "invalid token"
    );
}

#[test]
fn test_inline_file_rules() {
    let v = Validator::builder()
        .rule("avatar", "fileExt:png,jpg|fileSize:4096|image:10,20")
        .rule("gallery", "fileMime:image/png")
        .rule("photo", "image")
        .collaborators(Collaborators::new().with_files(InlineFiles))
        .build();
    let png = json!({
        "extension": "PNG",
        "mime": "image/png",
        "size": 2048,
        "image": {"width": 10, "height": 20, "kind": "png"}
    });
    let tiff = json!({
        "extension": "tiff",
        "mime": "image/tiff",
        "size": 100,
        "image": {"width": 1, "height": 1, "kind": "tiff"}
    });

    let opts = CheckOptions::new().batch(true);
    let verdict = v
        .check(
            &json!({"avatar": png.clone(), "photo": png.clone(), "gallery": [png.clone(), png]}),
            &opts,
        )
        .unwrap();
    assert!(verdict.is_valid());

    let verdict = v
        .check(
            &json!({"avatar": tiff.clone(), "photo": tiff.clone(), "gallery": [tiff]}),
            &opts,
        )
        .unwrap();
    assert_eq!(
        verdict.error_for("avatar").unwrap().message,
        "uploaded file extension is not allowed"
    );
    assert_eq!(
        verdict.error_for("photo").unwrap().message,
        "photo is not a valid image"
    );
    assert_eq!(
        verdict.error_for("gallery").unwrap().message,
        "uploaded file type is not allowed"
    );
}

#[test]
fn test_message_from_text_catalog() {
    let v = Validator::builder()
        .rule("name|Nom", "require")
        .message("name.require", "{%name_required}")
        .collaborators(Collaborators::new().with_catalog(French))
        .build();
    let verdict = v.check(&json!({}), &CheckOptions::new()).unwrap();
    assert_eq!(verdict.message().unwrap(), "Nom est obligatoire");
}

#[test]
fn test_catalog_failure_propagates() {
    let v = Validator::builder()
        .rule("name", "require")
        .message("name", "{%unknown}")
        .collaborators(Collaborators::new().with_catalog(French))
        .build();
    let err = v.check(&json!({}), &CheckOptions::new()).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::Collaborator(CollaboratorError {
            capability: Capability::Catalog,
            ..
        })
    ));
}

#[test]
fn test_catalog_reference_without_catalog_uses_key() {
    let v = Validator::builder()
        .rule("name", "require")
        .message("name", "{%name_required}")
        .build();
    let verdict = v.check(&json!({}), &CheckOptions::new()).unwrap();
    assert_eq!(verdict.message().unwrap(), "name_required");
}

#[test]
fn test_active_url_with_custom_resolver() {
    struct OnlyExample;

    impl DnsResolver for OnlyExample {
        fn has_record(&self, host: &str, record: RecordType) -> Result<bool, CollaboratorError> {
            Ok(host == "example.com" && record == RecordType::Mx)
        }
    }

    let v = Validator::builder()
        .rule("domain", "activeUrl")
        .collaborators(Collaborators::new().with_dns(OnlyExample))
        .build();
    let opts = CheckOptions::new();
    assert!(v.check(&json!({"domain": "example.com"}), &opts).unwrap().is_valid());
    assert!(!v.check(&json!({"domain": "example.org"}), &opts).unwrap().is_valid());
}
