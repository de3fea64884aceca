//! Creditor and payment account commands.

use arledge_core::schema::SchemaName;
use arledge_core::validation::{NewCreditor, NewPaymentAccount};

use super::{load_model, Loaded, ModelSource, Output};
use crate::error::CliResult;
use crate::state::AppState;

pub async fn create(state: &AppState, source: ModelSource) -> CliResult<Output> {
    let model: NewCreditor = match load_model("creditor", SchemaName::Creditor, source).await? {
        Loaded::Model(model) => model,
        Loaded::Schema(schema) => return Ok(Output::json(schema)),
    };

    let creditor = state.db().await?.creditors().create(&model).await?;
    Ok(Output::document(&creditor))
}

pub async fn list(state: &AppState) -> CliResult<Output> {
    let creditors = state.db().await?.creditors().list().await?;
    Ok(Output::list(&creditors, "No creditors"))
}

pub async fn view(state: &AppState, creditor_id: i64) -> CliResult<Output> {
    let creditor = state.db().await?.creditors().get(creditor_id).await?;
    Ok(Output::document(&creditor))
}

/// Creates a payment account. A default account replaces the creditor's
/// previous default.
pub async fn account_create(state: &AppState, source: ModelSource) -> CliResult<Output> {
    let model: NewPaymentAccount =
        match load_model("payment account", SchemaName::PaymentAccount, source).await? {
            Loaded::Model(model) => model,
            Loaded::Schema(schema) => return Ok(Output::json(schema)),
        };

    let account = state.db().await?.payment_accounts().create(&model).await?;
    Ok(Output::document(&account))
}

pub async fn account_list(state: &AppState, creditor_id: Option<i64>) -> CliResult<Output> {
    let accounts = state
        .db()
        .await?
        .payment_accounts()
        .list(creditor_id)
        .await?;
    Ok(Output::list(&accounts, "No payment accounts"))
}
