use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Object, Schema, SimpleObject};
use codeviz_core::{CoreError, ExecutionResult, USER_PROGRESS_STUB};

use crate::ops::{run_blocking, Operations};

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Caller identity attached to each GraphQL request by the transport.
#[derive(Clone, Debug, Default)]
pub struct UserContext {
    pub user_id: Option<String>,
}

#[derive(SimpleObject)]
#[graphql(name = "ExecutionResultType")]
pub struct ExecutionResultObject {
    pub trace: Vec<String>,
    pub variables: String,
}

impl From<ExecutionResult> for ExecutionResultObject {
    fn from(r: ExecutionResult) -> Self {
        Self {
            trace: r.trace,
            variables: r.variables,
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn user_progress(&self) -> String {
        USER_PROGRESS_STUB.to_string()
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn execute_code(
        &self,
        ctx: &Context<'_>,
        code: String,
        lang: String,
    ) -> async_graphql::Result<ExecutionResultObject> {
        operations(ctx)?
            .execute_code(&code, &lang)
            .map(Into::into)
            .map_err(to_graphql_error)
    }

    async fn explain_code(&self, ctx: &Context<'_>, code: String) -> async_graphql::Result<String> {
        operations(ctx)?
            .explain_code(&code)
            .map(str::to_owned)
            .map_err(to_graphql_error)
    }

    async fn link_github(&self, ctx: &Context<'_>, token: String) -> async_graphql::Result<String> {
        let ops = operations(ctx)?;
        let user = user_id(ctx);
        run_blocking(ops, move |ops| ops.link_github(user.as_deref(), &token))
            .await
            .map(str::to_owned)
            .map_err(to_graphql_error)
    }

    async fn save_progress(&self, ctx: &Context<'_>, data: String) -> async_graphql::Result<String> {
        let ops = operations(ctx)?;
        let user = user_id(ctx);
        run_blocking(ops, move |ops| ops.save_progress(user.as_deref(), &data))
            .await
            .map(str::to_owned)
            .map_err(to_graphql_error)
    }
}

fn operations(ctx: &Context<'_>) -> async_graphql::Result<Arc<dyn Operations>> {
    Ok(Arc::clone(ctx.data::<Arc<dyn Operations>>()?))
}

fn user_id(ctx: &Context<'_>) -> Option<String> {
    ctx.data_opt::<UserContext>()
        .and_then(|u| u.user_id.clone())
}

fn to_graphql_error(err: CoreError) -> async_graphql::Error {
    if err.is_client_error() {
        async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", "VALIDATION"))
    } else {
        async_graphql::Error::new("Internal error").extend_with(|_, e| e.set("code", "INTERNAL"))
    }
}

pub fn build_schema(ops: Arc<dyn Operations>) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(ops)
        .finish()
}
