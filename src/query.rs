//! Query entry point.
//!
//! An `Evaluator` pairs a store provider with a catalog and evaluates
//! parameter sets against named stores. The same evaluator runs over an
//! embedded backend on the client and over the in-memory emulation on
//! the server, returning identical answers for identical parameters.

use std::collections::HashMap;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::errors::{QueryError, QueryResult};
use crate::exec::{materialize, CursorDriver, MergeJoin, QueryOutput, ResultWindow};
use crate::params::{parse_pairs, parse_query_string, ParsedQuery};
use crate::plan::classify;
use crate::schema::{Catalog, StoreSchema};
use crate::store::{StoreHandle, StoreProvider};

/// Query parameters, as a pre-decoded bag or a URL-encoded string.
#[derive(Debug, Clone)]
pub enum ParamInput {
    /// Decoded `(key, value)` pairs; later duplicates win.
    Pairs(Vec<(String, String)>),
    /// A URL-encoded query string, with or without a leading `?`.
    Encoded(String),
}

impl From<&str> for ParamInput {
    fn from(raw: &str) -> Self {
        ParamInput::Encoded(raw.to_string())
    }
}

impl From<String> for ParamInput {
    fn from(raw: String) -> Self {
        ParamInput::Encoded(raw)
    }
}

impl From<Vec<(String, String)>> for ParamInput {
    fn from(pairs: Vec<(String, String)>) -> Self {
        ParamInput::Pairs(pairs)
    }
}

impl From<Vec<(&str, &str)>> for ParamInput {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        ParamInput::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl From<HashMap<String, String>> for ParamInput {
    fn from(map: HashMap<String, String>) -> Self {
        ParamInput::Pairs(map.into_iter().collect())
    }
}

impl From<crate::params::ParamSet> for ParamInput {
    fn from(set: crate::params::ParamSet) -> Self {
        ParamInput::Pairs(set.into_pairs())
    }
}

impl ParamInput {
    fn parse(self) -> QueryResult<ParsedQuery> {
        let parsed = match self {
            ParamInput::Encoded(raw) => parse_query_string(&raw)?,
            ParamInput::Pairs(pairs) => parse_pairs(pairs)?,
        };
        Ok(parsed)
    }
}

/// Evaluates queries against the stores of one catalog.
pub struct Evaluator<P> {
    provider: P,
    catalog: Catalog,
}

impl<P: StoreProvider> Evaluator<P> {
    /// Creates an evaluator over a provider and its catalog.
    pub fn new(provider: P, catalog: Catalog) -> Self {
        Self { provider, catalog }
    }

    /// The catalog this evaluator resolves store names against.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Evaluates a query without external cancellation.
    pub async fn query(
        &self,
        store: &str,
        params: impl Into<ParamInput>,
    ) -> QueryResult<QueryOutput> {
        self.query_with(store, params.into(), &CancelToken::new())
            .await
    }

    /// Evaluates a query, observing the token at every suspension point.
    ///
    /// All exit paths release the opened cursors and close the handle.
    pub async fn query_with(
        &self,
        store: &str,
        params: ParamInput,
        cancel: &CancelToken,
    ) -> QueryResult<QueryOutput> {
        let schema = self
            .catalog
            .get(store)
            .ok_or_else(|| QueryError::SchemaMismatch(store.to_string()))?;

        QueryError::guard(cancel)?;
        let handle = self.provider.open(store).await?;
        let result = run_query(&handle, schema, params, cancel).await;
        let closed = handle.close().await;

        let output = result?;
        closed.map_err(QueryError::from)?;
        Ok(output)
    }
}

async fn run_query<H>(
    handle: &H,
    schema: &StoreSchema,
    params: ParamInput,
    cancel: &CancelToken,
) -> QueryResult<QueryOutput>
where
    H: StoreHandle + ?Sized,
{
    let parsed = params.parse()?;
    if parsed.is_null_query() {
        return Ok(QueryOutput::empty(parsed.controls.format));
    }

    let plan = classify(schema, &parsed.predicates);
    debug!(
        store = schema.name.as_str(),
        cursors = plan.cursors.len(),
        join = parsed.controls.join.as_str(),
        "executing query"
    );

    let mut drivers = Vec::with_capacity(plan.cursors.len());
    for cursor_plan in &plan.cursors {
        QueryError::guard(cancel)?;
        drivers.push(CursorDriver::open(handle, cursor_plan).await?);
    }

    let join = MergeJoin::new(
        drivers,
        parsed.controls.join,
        ResultWindow::from(&parsed.controls),
    );
    let keys = join.run(cancel).await?;

    materialize(handle, keys, &parsed.controls, cancel).await
}
