mod common;

use anyhow::Result;
use common::{balance_of, funded_account, record_count, swallow_ledger_inserts, test_service};
use saldo::application::AppError;

#[tokio::test]
async fn test_debit_within_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 10000).await?;

    let balance = service.debit(account, 2550).await?;
    assert_eq!(balance, 7450);
    assert_eq!(balance_of(&service, account).await, 7450);

    // One record for the funding top-up, one for the debit
    let records = service.get_all_transactions(account).await?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].amount, 2550);
    assert_eq!(records[1].operation, "Debit by purchase 25.50");
    assert_eq!(records[1].account_id, account);

    Ok(())
}

#[tokio::test]
async fn test_debit_entire_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 1234).await?;

    assert_eq!(service.debit(account, 1234).await?, 0);
    assert_eq!(balance_of(&service, account).await, 0);

    Ok(())
}

#[tokio::test]
async fn test_insufficient_funds_changes_nothing() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 1000).await?;

    let err = service.debit(account, 1001).await.unwrap_err();
    match err {
        AppError::InsufficientFunds {
            account_id,
            balance,
            required,
        } => {
            assert_eq!(account_id, account);
            assert_eq!(balance, 1000);
            assert_eq!(required, 1001);
        }
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }

    assert_eq!(balance_of(&service, account).await, 1000);
    assert_eq!(record_count(&service, account).await, 1);

    Ok(())
}

#[tokio::test]
async fn test_debit_from_empty_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = service.open_account().await?;

    let err = service.debit(account, 1).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { .. }));
    assert_eq!(record_count(&service, account).await, 0);

    Ok(())
}

#[tokio::test]
async fn test_unknown_account() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.top_up(999, 100).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(999)));

    let err = service.debit(999, 100).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(999)));

    Ok(())
}

#[tokio::test]
async fn test_top_up_then_debit_restores_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 5000).await?;

    service.top_up(account, 1999).await?;
    assert_eq!(balance_of(&service, account).await, 6999);
    service.debit(account, 1999).await?;
    assert_eq!(balance_of(&service, account).await, 5000);

    let operations: Vec<String> = service
        .get_all_transactions(account)
        .await?
        .into_iter()
        .map(|r| r.operation)
        .collect();
    assert_eq!(
        operations,
        vec![
            "Top-up by bank_card 50.00",
            "Top-up by bank_card 19.99",
            "Debit by purchase 19.99",
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_invalid_inputs_are_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 1000).await?;

    assert!(matches!(
        service.top_up(account, 0).await.unwrap_err(),
        AppError::InvalidAmount(_)
    ));
    assert!(matches!(
        service.debit(account, -5).await.unwrap_err(),
        AppError::InvalidAmount(_)
    ));
    assert!(matches!(
        service.top_up(0, 100).await.unwrap_err(),
        AppError::InvalidAccountId(0)
    ));
    assert!(matches!(
        service.debit(-3, 100).await.unwrap_err(),
        AppError::InvalidAccountId(-3)
    ));

    assert_eq!(balance_of(&service, account).await, 1000);
    assert_eq!(record_count(&service, account).await, 1);

    Ok(())
}

#[tokio::test]
async fn test_top_up_overflow_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, i64::MAX - 10).await?;

    let err = service.top_up(account, 11).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));
    assert_eq!(balance_of(&service, account).await, i64::MAX - 10);

    Ok(())
}

#[tokio::test]
async fn test_failed_ledger_write_rolls_back_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 1000).await?;
    swallow_ledger_inserts(&service, "Top-up").await?;

    let err = service.top_up(account, 500).await.unwrap_err();
    assert!(matches!(err, AppError::LedgerWriteFailed(id) if id == account));
    assert!(!err.is_client_error());

    assert_eq!(balance_of(&service, account).await, 1000);
    assert_eq!(record_count(&service, account).await, 1);

    // Debits are unaffected by the trigger
    assert_eq!(service.debit(account, 400).await?, 600);

    Ok(())
}

#[tokio::test]
async fn test_records_are_immutable() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 1000).await?;
    let pool = service.store().pool();

    let update = sqlx::query("UPDATE transactions SET amount = 1 WHERE account_id = ?")
        .bind(account)
        .execute(pool)
        .await;
    assert!(update.is_err());

    let delete = sqlx::query("DELETE FROM transactions WHERE account_id = ?")
        .bind(account)
        .execute(pool)
        .await;
    assert!(delete.is_err());

    assert_eq!(record_count(&service, account).await, 1);

    Ok(())
}

#[tokio::test]
async fn test_balance_cannot_go_negative_in_storage() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 100).await?;

    let result = sqlx::query("UPDATE accounts SET balance = -1 WHERE id = ?")
        .bind(account)
        .execute(service.store().pool())
        .await;
    assert!(result.is_err());
    assert_eq!(balance_of(&service, account).await, 100);

    Ok(())
}
