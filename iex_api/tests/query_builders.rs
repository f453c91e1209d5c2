use iex_api::types::ChartRange;
use iex_api::{ChartQuery, CryptoEndpoint, MoverList, Query, QuotaType, Resource};
use url::Url;

fn base_url() -> Url {
    Url::parse("https://example.com").unwrap()
}

#[test]
fn chart_query_params() {
    let query = ChartQuery::new(ChartRange::FiveYears).with_symbol("amzn");
    let url = query.add_to_url(&base_url());
    insta::assert_snapshot!(url.query().unwrap(), @"symbols=AMZN&types=chart&range=5y&chartCloseOnly=false");
    assert_eq!(query.path(), "stock/market/batch");
}

#[test]
fn chart_query_close_only() {
    let url = ChartQuery::new(ChartRange::OneYear)
        .with_symbol("aapl")
        .with_close_only(true)
        .add_to_url(&base_url());
    insta::assert_snapshot!(url.query().unwrap(), @"symbols=AAPL&types=chart&range=1y&chartCloseOnly=true");
}

#[test]
fn chart_query_multiple_symbols() {
    let url = ChartQuery::new(ChartRange::OneYear)
        .with_symbols(&["aapl", "msft"])
        .add_to_url(&base_url());
    let query = url.query().unwrap();
    assert!(query.contains("symbols=AAPL%2CMSFT"));
    assert!(query.contains("range=1y"));
}

#[test]
fn quote_display_percent_is_lower_case() {
    let resource = Resource::Quote {
        symbol: "AAPL".to_string(),
        display_percent: true,
    };
    assert_eq!(resource.path(), "stock/AAPL/quote");
    let url = resource.add_to_url(&base_url());
    insta::assert_snapshot!(url.query().unwrap(), @"displayPercent=true");
}

#[test]
fn quote_helper_uppercases() {
    let resource = Resource::quote("tsla");
    assert_eq!(resource.path(), "stock/TSLA/quote");
    assert_eq!(resource.params().get("displayPercent").as_deref(), Some("false"));
}

#[test]
fn crypto_paths() {
    assert_eq!(
        Resource::crypto("btcusd", CryptoEndpoint::Book).path(),
        "crypto/BTCUSD/book"
    );
    assert_eq!(
        Resource::crypto("ethusd", CryptoEndpoint::Price).path(),
        "crypto/ETHUSD/price"
    );
    assert_eq!("QUOTE".parse::<CryptoEndpoint>(), Ok(CryptoEndpoint::Quote));
    assert!("ticker".parse::<CryptoEndpoint>().is_err());
}

#[test]
fn mover_lists() {
    assert_eq!(
        Resource::Movers(MoverList::Gainers).path(),
        "stock/market/list/gainers"
    );
    for mover in MoverList::ALL {
        assert_eq!(mover.to_string().parse::<MoverList>(), Ok(mover));
    }
    assert_eq!("MostActive".parse::<MoverList>(), Ok(MoverList::MostActive));
    assert!("winners".parse::<MoverList>().is_err());
}

#[test]
fn reference_data_paths() {
    assert_eq!(Resource::Symbols.path(), "ref-data/symbols");
    assert_eq!(Resource::IexSymbols.path(), "ref-data/iex/symbols");
    assert_eq!(Resource::Sectors.path(), "ref-data/sectors");
    assert_eq!(
        Resource::RegionSymbols("CA".to_string()).path(),
        "ref-data/region/ca/symbols"
    );
    assert_eq!(
        Resource::ExchangeSymbols("TSX".to_string()).path(),
        "ref-data/exchange/tsx/symbols"
    );
    assert!(Resource::Symbols.params().is_empty());
}

#[test]
fn account_paths() {
    assert_eq!(
        Resource::AccountUsage(QuotaType::default()).path(),
        "account/usage/messages"
    );
    assert_eq!(
        Resource::AccountUsage(QuotaType::AlertRecords).path(),
        "account/usage/alert-records"
    );
    assert_eq!("rule-records".parse::<QuotaType>(), Ok(QuotaType::RuleRecords));
    assert!("credits".parse::<QuotaType>().is_err());

    let url = Resource::PayAsYouGo { allow: false }.add_to_url(&base_url());
    assert_eq!(url.path(), "/");
    assert_eq!(url.query(), Some("allow=false"));
    assert_eq!(Resource::AccountMetadata.path(), "account/metadata");
}
