mod common;

use std::str::FromStr;

use anyhow::Result;
use common::{funded_account, test_service};
use rust_decimal::Decimal;
use saldo::application::{AppError, BalanceService};
use saldo::domain::{AccountId, PageRequest, Sort, SortField};
use saldo::rates::RateError;

/// Account with five top-ups of 1.00, 2.00, ... 5.00 (no funding record).
async fn account_with_five_records(service: &BalanceService) -> Result<AccountId> {
    let account = service.open_account().await?;
    for i in 1..=5 {
        service.top_up(account, i * 100).await?;
    }
    Ok(account)
}

#[tokio::test]
async fn test_second_page() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = account_with_five_records(&service).await?;

    let records = service
        .get_transactions(account, PageRequest::new(2, 2, Sort::asc(SortField::Date)))
        .await?;
    let amounts: Vec<i64> = records.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![300, 400]);

    let records = service
        .get_transactions(account, PageRequest::new(3, 2, "id".parse()?))
        .await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].amount, 500);

    Ok(())
}

#[tokio::test]
async fn test_descending_sort() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = account_with_five_records(&service).await?;

    let records = service
        .get_transactions(account, PageRequest::new(1, 3, "-amount".parse()?))
        .await?;
    let amounts: Vec<i64> = records.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![500, 400, 300]);

    let records = service
        .get_transactions(account, PageRequest::new(1, 10, "-id".parse()?))
        .await?;
    assert_eq!(records.len(), 5);
    assert!(records.windows(2).all(|w| w[0].id > w[1].id));

    Ok(())
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = account_with_five_records(&service).await?;

    let records = service
        .get_transactions(account, PageRequest::new(4, 2, Sort::default()))
        .await?;
    assert!(records.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_account_without_history() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = service.open_account().await?;

    let records = service
        .get_transactions(account, PageRequest::default())
        .await?;
    assert!(records.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_history_is_scoped_to_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let first = funded_account(&service, 100).await?;
    let second = funded_account(&service, 200).await?;
    service.debit(second, 50).await?;

    let records = service
        .get_transactions(first, PageRequest::default())
        .await?;
    assert_eq!(records.len(), 1);
    assert!(records.iter().all(|r| r.account_id == first));

    Ok(())
}

#[tokio::test]
async fn test_unknown_account_history() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .get_transactions(77, PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(77)));

    Ok(())
}

#[tokio::test]
async fn test_invalid_page_requests() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = account_with_five_records(&service).await?;

    for (page, limit) in [(0, 10), (1, 0), (1, 101)] {
        let err = service
            .get_transactions(account, PageRequest::new(page, limit, Sort::default()))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::InvalidPage(_)),
            "page={page} limit={limit}: {err:?}"
        );
    }

    Ok(())
}

#[test]
fn test_unsupported_sort_field() {
    assert!("operation".parse::<Sort>().is_err());
    assert!("amount; DROP TABLE accounts".parse::<Sort>().is_err());
    let err: AppError = "name".parse::<Sort>().unwrap_err().into();
    assert!(matches!(err, AppError::InvalidSort(_)));
}

#[tokio::test]
async fn test_balance_in_base_currency() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 12345).await?;

    let view = service.get_balance(account, None).await?;
    assert_eq!(view.balance, Decimal::from_str("123.45")?);
    assert_eq!(view.currency, "EUR");

    let view = service.get_balance(account, Some("")).await?;
    assert_eq!(view.balance, Decimal::from_str("123.45")?);

    Ok(())
}

#[tokio::test]
async fn test_balance_in_other_currency() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 10000).await?;

    let view = service.get_balance(account, Some("usd")).await?;
    assert_eq!(view.currency, "USD");
    assert_eq!(view.balance, Decimal::from_str("110.00")?);

    let view = service.get_balance(account, Some("UAH")).await?;
    assert_eq!(view.balance, Decimal::from_str("4050.00")?);

    Ok(())
}

#[tokio::test]
async fn test_balance_conversion_errors() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = funded_account(&service, 100).await?;

    let err = service.get_balance(account, Some("JPY")).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::RateLookup(RateError::UnsupportedCurrency(_))
    ));

    for code in ["dollars", "US", "U$D"] {
        let err = service.get_balance(account, Some(code)).await.unwrap_err();
        assert!(
            matches!(&err, AppError::InvalidCurrency(c) if c == code),
            "{code}: {err:?}"
        );
        assert!(err.is_client_error());
    }

    let err = service.get_balance(999, None).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(999)));

    Ok(())
}
