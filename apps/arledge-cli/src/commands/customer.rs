//! Customer commands.

use arledge_core::schema::SchemaName;
use arledge_core::validation::NewCustomer;

use super::{load_model, Loaded, ModelSource, Output};
use crate::error::CliResult;
use crate::state::AppState;

pub async fn create(state: &AppState, source: ModelSource) -> CliResult<Output> {
    let model: NewCustomer = match load_model("customer", SchemaName::Customer, source).await? {
        Loaded::Model(model) => model,
        Loaded::Schema(schema) => return Ok(Output::json(schema)),
    };

    let customer = state.db().await?.customers().create(&model).await?;
    Ok(Output::document(&customer))
}

pub async fn list(state: &AppState) -> CliResult<Output> {
    let customers = state.db().await?.customers().list().await?;
    Ok(Output::list(&customers, "No customers"))
}
