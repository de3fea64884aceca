use arledge_core::validation::{parse_model, NewCreditor, NewCustomer, NewInvoice, NewPaymentAccount};
use arledge_core::{serialize_deep, InvoiceStatus, ToDocument};
use arledge_db::{Database, DbConfig, DbError, TablePrefix};
use rust_decimal_macros::dec;
use tempfile::TempDir;

async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

async fn file_db(dir: &TempDir) -> Database {
    Database::new(DbConfig::new(dir.path().join("ledger.db")))
        .await
        .unwrap()
}

fn invoice_model(json: &str) -> NewInvoice {
    parse_model("invoice", json).unwrap()
}

#[tokio::test]
async fn customer_create_list_get() {
    let db = memory_db().await;
    assert!(db.customers().list().await.unwrap().is_empty());

    let model: NewCustomer =
        parse_model("customer", r#"{"name": "ACME AB", "email": "billing@acme.se"}"#).unwrap();
    let created = db.customers().create(&model).await.unwrap();
    assert_eq!(created.id, 1);

    let listed = db.customers().list().await.unwrap();
    assert_eq!(listed, vec![created.clone()]);
    assert_eq!(db.customers().get(1).await.unwrap(), created);

    let err = db.customers().get(99).await.unwrap_err();
    assert_eq!(err.to_string(), "Customer not found");
}

#[tokio::test]
async fn creditor_round_trip() {
    let db = memory_db().await;
    let model: NewCreditor = parse_model(
        "creditor",
        r#"{"name": "Me Consulting", "tax_id": "SE5566", "created_at": "2024-03-01T10:00:00+01:00"}"#,
    )
    .unwrap();

    let created = db.creditors().create(&model).await.unwrap();
    assert_eq!(created.default_currency, "SEK");
    assert_eq!(
        serialize_deep(&created.to_document())["created_at"],
        "2024-03-01T09:00:00Z"
    );

    assert_eq!(db.creditors().get(created.id).await.unwrap(), created);
    assert_eq!(db.creditors().list().await.unwrap().len(), 1);
    assert!(matches!(
        db.creditors().get(5).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test]
async fn single_default_payment_account() {
    let db = memory_db().await;
    let creditor: NewCreditor = parse_model("creditor", r#"{"name": "Me"}"#).unwrap();
    let creditor = db.creditors().create(&creditor).await.unwrap();

    let first: NewPaymentAccount = parse_model(
        "payment account",
        &format!(r#"{{"creditor_id": {}, "type": "bankgiro", "is_default": true}}"#, creditor.id),
    )
    .unwrap();
    let second: NewPaymentAccount = parse_model(
        "payment account",
        &format!(
            r#"{{"creditor_id": {}, "type": "iban", "is_default": true, "metadata": {{"bic": "ESSESESS"}}}}"#,
            creditor.id
        ),
    )
    .unwrap();

    let first = db.payment_accounts().create(&first).await.unwrap();
    let second = db.payment_accounts().create(&second).await.unwrap();

    let accounts = db.payment_accounts().list(Some(creditor.id)).await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts.iter().filter(|a| a.is_default).count(), 1);
    assert_eq!(accounts[0].id, first.id);
    assert!(!accounts[0].is_default);

    let default = db.payment_accounts().default_for(creditor.id).await.unwrap();
    assert_eq!(default.map(|a| a.id), Some(second.id));
    assert_eq!(second.metadata.get("bic").and_then(|v| v.as_str()), Some("ESSESESS"));

    assert!(db.payment_accounts().list(Some(999)).await.unwrap().is_empty());
    assert_eq!(db.payment_accounts().list(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn corrupt_metadata_reads_as_empty_object() {
    let db = memory_db().await;
    let model: NewPaymentAccount =
        parse_model("payment account", r#"{"creditor_id": 1, "type": "paypal"}"#).unwrap();
    let account = db.payment_accounts().create(&model).await.unwrap();

    sqlx::query(&format!(
        "UPDATE {} SET metadata = 'not json' WHERE id = ?1",
        db.tables().payment_account
    ))
    .bind(account.id)
    .execute(db.pool())
    .await
    .unwrap();

    let reread = db.payment_accounts().get(account.id).await.unwrap();
    assert!(reread.metadata.is_empty());
}

#[tokio::test]
async fn invoice_create_matches_view() {
    let db = memory_db().await;
    let model = invoice_model(
        r#"{
            "customer_id": 1,
            "status": "issued",
            "created_at": "2024-01-15T09:00:00Z",
            "due_at": "2024-02-14",
            "lines": [
                {"description": "Consulting", "quantity": "2", "unit_price": "10.00", "vat_rate": "25"},
                {"description": "Rounded", "quantity": 1, "unit_price": "19.995", "vat_rate": 12.5}
            ]
        }"#,
    );

    let created = db.invoices().create(&model).await.unwrap();
    let viewed = db.invoices().get(created.id()).await.unwrap();
    assert_eq!(created, viewed);

    assert_eq!(viewed.header.status, InvoiceStatus::Issued);
    assert_eq!(viewed.lines()[1].unit_price().to_string(), "20.00");
    assert_eq!(viewed.lines()[1].vat_rate(), dec!(12.5));
    assert_eq!(viewed.subtotal(), dec!(40.00));
    assert_eq!(viewed.total_vat(), dec!(7.50));
    assert_eq!(viewed.total(), dec!(47.50));

    let doc = serialize_deep(&viewed.to_document());
    assert_eq!(doc["invoice_number"], "INV-0001");
    assert_eq!(doc["due_at"], "2024-02-14T00:00:00Z");
    assert_eq!(doc["lines"][0]["quantity"], "2");
}

#[tokio::test]
async fn unit_price_stored_as_minor_units() {
    let db = memory_db().await;
    let model = invoice_model(
        r#"{"customer_id": 1, "lines": [{"description": "Big", "unit_price": "1000.00"}]}"#,
    );
    let invoice = db.invoices().create(&model).await.unwrap();

    let (quantity, unit_price, vat_rate): (String, i64, String) = sqlx::query_as(&format!(
        "SELECT quantity, unit_price, vat_rate FROM {} WHERE invoice_id = ?1",
        db.tables().invoice_line
    ))
    .bind(invoice.id())
    .fetch_one(db.pool())
    .await
    .unwrap();

    assert_eq!(unit_price, 100000);
    assert_eq!(quantity, "1");
    assert_eq!(vat_rate, "0");
}

#[tokio::test]
async fn invoice_list_newest_first_with_lines() {
    let db = memory_db().await;
    let empty = invoice_model(r#"{"customer_id": 1}"#);
    let with_line = invoice_model(
        r#"{"customer_id": 2, "lines": [{"description": "x", "unit_price": 5, "vat_rate": 25}]}"#,
    );
    db.invoices().create(&empty).await.unwrap();
    db.invoices().create(&with_line).await.unwrap();

    let invoices = db.invoices().list().await.unwrap();
    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[0].id(), 2);
    assert_eq!(invoices[0].lines().len(), 1);
    assert_eq!(invoices[0].total(), dec!(6.25));
    assert_eq!(invoices[1].total().to_string(), "0.00");

    assert_eq!(
        db.invoices().get(42).await.unwrap_err().to_string(),
        "Invoice not found"
    );
}

#[tokio::test]
async fn corrupt_quantity_is_reported() {
    let db = memory_db().await;
    let model = invoice_model(r#"{"customer_id": 1, "lines": [{"description": "x", "unit_price": 1}]}"#);
    let invoice = db.invoices().create(&model).await.unwrap();

    sqlx::query(&format!(
        "UPDATE {} SET quantity = '1,5'",
        db.tables().invoice_line
    ))
    .execute(db.pool())
    .await
    .unwrap();

    assert!(matches!(
        db.invoices().get(invoice.id()).await,
        Err(DbError::CorruptRow { .. })
    ));
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let db = file_db(&dir).await;
        let model: NewCustomer = parse_model("customer", r#"{"name": "Kept"}"#).unwrap();
        db.customers().create(&model).await.unwrap();
        db.close().await;
    }

    let db = file_db(&dir).await;
    db.initialize().await.unwrap();
    assert_eq!(db.customers().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn development_initialize_is_destructive() {
    let dir = TempDir::new().unwrap();
    let config = DbConfig::new(dir.path().join("dev.db")).development(true);
    let db = Database::new(config).await.unwrap();

    let model: NewCustomer = parse_model("customer", r#"{"name": "Temp"}"#).unwrap();
    db.customers().create(&model).await.unwrap();
    assert_eq!(db.customers().list().await.unwrap().len(), 1);

    db.initialize().await.unwrap();
    assert!(db.customers().list().await.unwrap().is_empty());
    assert!(db.schema_status().await.unwrap().is_complete());
}

#[tokio::test]
async fn prefixes_isolate_ledgers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shared.db");
    let a = Database::new(DbConfig::new(&path).table_prefix(TablePrefix::new("a_").unwrap()))
        .await
        .unwrap();
    let b = Database::new(DbConfig::new(&path).table_prefix(TablePrefix::new("b_").unwrap()))
        .await
        .unwrap();

    let model: NewCustomer = parse_model("customer", r#"{"name": "Only in A"}"#).unwrap();
    a.customers().create(&model).await.unwrap();

    assert_eq!(a.customers().list().await.unwrap().len(), 1);
    assert!(b.customers().list().await.unwrap().is_empty());
    assert_eq!(a.tables().customer, "a_customer");
}

#[tokio::test]
async fn orphan_invoice_line_is_a_foreign_key_violation() {
    let db = memory_db().await;
    let sql = format!(
        "INSERT INTO {} (invoice_id, description, quantity, unit_price, vat_rate) VALUES (?, ?, ?, ?, ?)",
        db.tables().invoice_line
    );
    let err: DbError = sqlx::query(&sql)
        .bind(42_i64)
        .bind("Orphan")
        .bind("1")
        .bind(100_i64)
        .bind("0")
        .execute(db.pool())
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }), "{err:?}");
}
