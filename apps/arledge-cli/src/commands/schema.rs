//! `schema NAME` and `instructions`.

use arledge_core::schema::{schema_for, SchemaName};

use super::Output;
use crate::error::{CliError, CliResult};

/// Usage notes for agents driving the CLI or the MCP tools.
pub const INSTRUCTIONS: &str = "\
Instructions for agentic systems

Machine-actionable output is JSON on stdout; notices and errors go to stderr
and failures exit non-zero. Create commands take the model as inline JSON
(--model '{...}') or from a file (--model-file PATH); --json-schema prints the
model's JSON Schema instead. `arledge schema NAME` prints the same schema for
customer, creditor, account, invoice or invoice-line.

Money is exchanged as strings with two decimals (\"25.00\"); quantities and
VAT rates (percent) as plain decimal strings (\"2.5\", \"25\"). Timestamps are
ISO-8601; values without a zone are read as UTC and always returned with Z.

Invoice lines derive net = quantity * unit_price and vat = net * vat_rate / 100,
each rounded half-up to cents. Invoice totals add the rounded line values.

The MCP server (`arledge mcp start`) exposes the same operations as tools:
customer_create, invoice_view, invoice_export and so on.";

pub fn schema(name: &str) -> CliResult<Output> {
    let name: SchemaName = name
        .parse()
        .map_err(|_| CliError::validation("Unknown schema name"))?;
    Ok(Output::json(schema_for(name)))
}

pub fn instructions() -> Output {
    Output::notice(INSTRUCTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names() {
        for name in ["customer", "creditor", "account", "payment-account", "invoice", "invoice-line"] {
            let output = schema(name).unwrap();
            assert!(output.data.unwrap().get("properties").is_some(), "{name}");
        }
    }

    #[test]
    fn test_unknown_schema() {
        let err = schema("widget").unwrap_err();
        assert_eq!(err.message, "Unknown schema name");
    }

    #[test]
    fn test_instructions_heading() {
        assert!(instructions().text().starts_with("Instructions for agentic systems"));
    }
}
