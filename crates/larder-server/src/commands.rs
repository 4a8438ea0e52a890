//! Command execution.
//!
//! Every command produces one JSON document. Reads carry a `source` field
//! saying whether the cache or the database answered.

use crate::cli::Command;
use crate::di::{DatabaseResolver, ServiceResolver};
use larder_core::{LarderResult, PageRequest};
use larder_service::{CreateUserRequest, SourcedResponse, UpdateUserRequest};
use serde::Serialize;
use serde_json::{json, Value};

fn to_json<T: Serialize>(value: &T) -> LarderResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Runs one command against the wired application.
pub async fn execute<C>(command: Command, ctx: &C) -> LarderResult<Value>
where
    C: ServiceResolver + DatabaseResolver + Sync,
{
    let users = ctx.user_service();

    match command {
        Command::Migrate => {
            ctx.database_pool().run_migrations().await?;
            Ok(json!({ "migrated": true }))
        }
        Command::Seed => {
            let seeded = users.seed_users().await?;
            Ok(json!({ "seeded": seeded }))
        }
        Command::Count => {
            let count = users.count_users().await?;
            to_json(&SourcedResponse::from(count))
        }
        Command::List { all: true, .. } => {
            let list = users.list_all_users().await?;
            to_json(&SourcedResponse::from(list))
        }
        Command::List { page, size, .. } => {
            let list = users.list_users(PageRequest::new(page, size)).await?;
            to_json(&SourcedResponse::from(list))
        }
        Command::Get { id } => {
            let user = users.get_user(id).await?;
            to_json(&SourcedResponse::from(user))
        }
        Command::Create {
            name,
            username,
            email,
        } => {
            let created = users
                .create_user(CreateUserRequest {
                    name,
                    username,
                    email,
                })
                .await?;
            to_json(&created)
        }
        Command::Update {
            id,
            name,
            username,
            email,
        } => {
            let updated = users
                .update_user(
                    id,
                    UpdateUserRequest {
                        name,
                        username,
                        email,
                    },
                )
                .await?;
            to_json(&updated)
        }
        Command::Delete { id } => {
            users.delete_user(id).await?;
            Ok(json!({ "deleted": id }))
        }
        Command::Reset { seed } => {
            let summary = users.reset_users(seed).await?;
            to_json(&summary)
        }
        Command::FlushCache => {
            let summary = users.flush_cache().await;
            to_json(&summary)
        }
    }
}
