//! Validators backed by application state: `unique` and `token`

use serde_json::Value;
use tracing::warn;

use crate::collaborators::UniqueQuery;
use crate::foundation::{CheckInput, CollaboratorError, lookup};

use super::Env;

/// Token field name used when `token` has no parameter.
pub const DEFAULT_TOKEN: &str = "__token__";

/// Primary key used when `unique` names none.
pub const DEFAULT_PK: &str = "id";

/// Builds the query for `unique:table[,field[,except[,pk]]]`.
///
/// `field` defaults to the rule's own field and may join several columns
/// with `^` (`unique:users,email^tenant`). The record's own primary key is
/// excluded when present in the data, else the explicit `except` value.
#[must_use]
pub fn unique_query(input: &CheckInput<'_>) -> Option<UniqueQuery> {
    let table = input.param.part(0)?.to_owned();
    let columns = input.param.part(1).unwrap_or(input.field);

    let conditions = if columns.contains('^') {
        columns
            .split('^')
            .filter_map(|column| {
                let value = lookup(input.data, column);
                (!value.is_null()).then(|| (column.to_owned(), value.clone()))
            })
            .collect()
    } else {
        let value = lookup(input.data, input.field);
        let value = if value.is_null() { input.value } else { value };
        vec![(columns.to_owned(), value.clone())]
    };

    let pk = input.param.part(3).unwrap_or(DEFAULT_PK);
    let own = lookup(input.data, pk);
    let exclude = if own.is_null() {
        input
            .param
            .part(2)
            .map(|except| (pk.to_owned(), Value::String(except.to_owned())))
    } else {
        Some((pk.to_owned(), own.clone()))
    };

    Some(UniqueQuery {
        table,
        conditions,
        exclude,
    })
}

/// `unique`: no other record holds the value.
pub fn unique(input: &CheckInput<'_>, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    let Some(query) = unique_query(input) else {
        warn!(field = input.field, "unique rule without a table");
        return Ok(false);
    };
    let Some(store) = env.collaborators.store() else {
        warn!(field = input.field, table = %query.table, "unique rule needs a record store but none is configured");
        return Ok(false);
    };
    Ok(store.count(&query)? == 0)
}

/// `token[:name]`: the request token is valid.
pub fn token(input: &CheckInput<'_>, name: &str, env: &Env<'_>) -> Result<bool, CollaboratorError> {
    let Some(tokens) = env.collaborators.tokens() else {
        warn!(field = input.field, "token rule needs a token checker but none is configured");
        return Ok(false);
    };
    tokens.verify(name, input.data)
}
