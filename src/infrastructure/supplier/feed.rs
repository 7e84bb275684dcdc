use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::domain::ports::SupplierSource;
use crate::domain::pricing::RetailPricing;
use crate::domain::records::SupplierRecord;
use crate::domain::snapshot::Snapshot;
use crate::domain::value_objects::{ProductKey, SyncField};
use crate::error::SyncError;
use crate::infrastructure::config::{PricingConfig, SupplierConfig};

const SOURCE: &str = "supplier feed";

/// Column layout of the supplier CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedFormat {
    pub delimiter: u8,
    pub sku_column: String,
    pub stock_column: String,
    /// Wholesale price column, read only for price runs.
    pub price_column: String,
}

impl Default for FeedFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            sku_column: "SKU".to_string(),
            stock_column: "Stock".to_string(),
            price_column: "B2B price".to_string(),
        }
    }
}

impl FeedFormat {
    pub fn from_config(cfg: &SupplierConfig) -> Result<Self, SyncError> {
        let delimiter = u8::try_from(cfg.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                SyncError::Configuration(format!(
                    "supplier.delimiter must be a single ASCII character, got {:?}",
                    cfg.delimiter
                ))
            })?;

        Ok(Self {
            delimiter,
            sku_column: cfg.sku_column.clone(),
            stock_column: cfg.stock_column.clone(),
            price_column: cfg.price_column.clone(),
        })
    }
}

/// Downloads the whole supplier feed in one GET and parses it.
pub struct HttpSupplierFeed {
    client: Client,
    url: String,
    format: FeedFormat,
    pricing: RetailPricing,
}

impl HttpSupplierFeed {
    pub fn new(
        url: impl Into<String>,
        format: FeedFormat,
        pricing: RetailPricing,
        timeout: Duration,
    ) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("shopsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| SyncError::Transport {
                source_name: SOURCE.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            url: url.into(),
            format,
            pricing,
        })
    }

    pub fn from_config(supplier: &SupplierConfig, pricing: &PricingConfig) -> Result<Self, SyncError> {
        Self::new(
            supplier.feed_url.clone().unwrap_or_default(),
            FeedFormat::from_config(supplier)?,
            RetailPricing::new(pricing.markup, pricing.rounding_step),
            Duration::from_secs(supplier.timeout_secs),
        )
    }
}

#[async_trait]
impl SupplierSource for HttpSupplierFeed {
    async fn fetch_catalog(&self, field: SyncField) -> Result<Snapshot<SupplierRecord>, SyncError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| SyncError::Transport {
                source_name: SOURCE.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::upstream(SOURCE, format!("HTTP {}", status.as_u16())));
        }

        let body = response.bytes().await.map_err(|source| SyncError::Transport {
            source_name: SOURCE.to_string(),
            source,
        })?;
        debug!(bytes = body.len(), "supplier feed downloaded");

        parse_feed(&body, &self.format, field, &self.pricing)
    }
}

/// Parse a feed body into supplier records.
///
/// Stock must be a non-negative integer. The price column is only required
/// and parsed when `field` is [`SyncField::Price`]; parsed wholesale prices
/// are converted to retail with `pricing`.
pub fn parse_feed(
    body: &[u8],
    format: &FeedFormat,
    field: SyncField,
    pricing: &RetailPricing,
) -> Result<Snapshot<SupplierRecord>, SyncError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter)
        .trim(csv::Trim::All)
        .from_reader(body);

    let headers = reader
        .headers()
        .map_err(|e| SyncError::parse("supplier feed header", e.to_string()))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| {
                SyncError::parse("supplier feed header", format!("missing column \"{name}\""))
            })
    };

    let sku_idx = column(&format.sku_column)?;
    let stock_idx = column(&format.stock_column)?;
    let price_idx = match field {
        SyncField::Price => Some(column(&format.price_column)?),
        SyncField::Quantity => None,
    };

    let mut snapshot = Snapshot::new("supplier");
    let mut dropped = 0usize;

    for (i, row) in reader.records().enumerate() {
        // header is line 1
        let context = format!("supplier feed line {}", i + 2);
        let row = row.map_err(|e| SyncError::parse(&context, e.to_string()))?;

        let Some(key) = row.get(sku_idx).and_then(ProductKey::parse) else {
            dropped += 1;
            continue;
        };

        let raw_stock = row.get(stock_idx).unwrap_or_default();
        let quantity: i64 = raw_stock.parse().map_err(|_| {
            SyncError::parse(&context, format!("stock \"{raw_stock}\" for {key} is not an integer"))
        })?;
        if quantity < 0 {
            return Err(SyncError::parse(
                &context,
                format!("stock {quantity} for {key} is negative"),
            ));
        }

        let price = match price_idx {
            Some(idx) => {
                let raw = row.get(idx).unwrap_or_default();
                let b2b = Decimal::from_str(raw).map_err(|_| {
                    SyncError::parse(&context, format!("price \"{raw}\" for {key} is not a decimal"))
                })?;
                if b2b.is_sign_negative() && !b2b.is_zero() {
                    return Err(SyncError::parse(
                        &context,
                        format!("price {b2b} for {key} is negative"),
                    ));
                }
                let retail = pricing.retail_price(b2b).ok_or_else(|| {
                    SyncError::parse(&context, format!("price {b2b} for {key} is out of range"))
                })?;
                Some(retail)
            }
            None => None,
        };

        snapshot.insert(SupplierRecord {
            key,
            quantity,
            price,
        })?;
    }

    if dropped > 0 {
        debug!(dropped, "supplier rows without a SKU were skipped");
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::Record;

    fn parse(body: &str, field: SyncField) -> Result<Snapshot<SupplierRecord>, SyncError> {
        parse_feed(body.as_bytes(), &FeedFormat::default(), field, &RetailPricing::default())
    }

    #[test]
    fn parses_quantities_and_ignores_price_column_for_inventory() {
        let body = "SKU,Title,Stock,B2B price\nA, Lamp ,5,not-a-price\n B ,Chair,0,\n";
        let snap = parse(body, SyncField::Quantity).unwrap();

        assert_eq!(snap.len(), 2);
        let b = snap.get(&ProductKey::from("B")).unwrap();
        assert_eq!(b.quantity, 0);
        assert_eq!(b.price, None);
    }

    #[test]
    fn price_runs_convert_wholesale_to_retail() {
        let body = "SKU,Stock,B2B price\nA,1,50.00\nB,2,0\n";
        let snap = parse(body, SyncField::Price).unwrap();

        assert_eq!(
            snap.get(&ProductKey::from("A")).unwrap().field_value(SyncField::Price),
            Some(Decimal::from(79))
        );
        assert_eq!(snap.get(&ProductKey::from("B")).unwrap().price, Some(Decimal::ZERO));
    }

    #[test]
    fn blank_sku_rows_are_dropped() {
        let snap = parse("SKU,Stock\n,3\n  ,4\nA,1\n", SyncField::Quantity).unwrap();
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn missing_column_is_a_parse_error() {
        let err = parse("SKU,Qty\nA,1\n", SyncField::Quantity).unwrap_err();
        assert!(matches!(err, SyncError::Parse { .. }));
        assert!(err.to_string().contains("Stock"));

        let err = parse("SKU,Stock\nA,1\n", SyncField::Price).unwrap_err();
        assert!(err.to_string().contains("B2B price"));
    }

    #[test]
    fn bad_stock_values_are_rejected() {
        assert!(matches!(
            parse("SKU,Stock\nA,-1\n", SyncField::Quantity),
            Err(SyncError::Parse { .. })
        ));
        let err = parse("SKU,Stock\nA,1\nB,2.5\n", SyncField::Quantity).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(matches!(
            parse("SKU,Stock,B2B price\nA,1,-3\n", SyncField::Price),
            Err(SyncError::Parse { .. })
        ));
    }

    #[test]
    fn price_too_large_to_mark_up_is_a_parse_error() {
        let body = format!("SKU,Stock,B2B price\nA,1,{}\n", Decimal::MAX);
        let err = parse(&body, SyncField::Price).unwrap_err();

        assert!(matches!(err, SyncError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn duplicate_sku_is_rejected() {
        assert!(matches!(
            parse("SKU,Stock\nA,1\nA,2\n", SyncField::Quantity),
            Err(SyncError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn honours_custom_delimiter_and_columns() {
        let format = FeedFormat {
            delimiter: b';',
            sku_column: "ean".into(),
            stock_column: "qty".into(),
            price_column: "cost".into(),
        };
        let snap = parse_feed(
            "\u{feff}ean;qty;cost\nX;7;10\n".as_bytes(),
            &format,
            SyncField::Price,
            &RetailPricing::default(),
        )
        .unwrap();
        let x = snap.get(&ProductKey::from("X")).unwrap();
        assert_eq!(x.quantity, 7);
        assert_eq!(x.price, Some(Decimal::from(19)));
    }

    #[test]
    fn non_ascii_delimiter_is_a_configuration_error() {
        let cfg = SupplierConfig {
            delimiter: '§',
            ..SupplierConfig::default()
        };
        assert!(matches!(
            FeedFormat::from_config(&cfg),
            Err(SyncError::Configuration(_))
        ));
    }
}
