use crate::domain::account::Amount;
use crate::domain::identity::AccountId;
use crate::domain::product::Product;
use crate::error::{OrderError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::Read;

/// One row of the wallet seed file: `owner,balance`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WalletSeed {
    pub owner: AccountId,
    pub balance: Amount,
}

/// Reads seed records (catalog rows or opening wallet balances) from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths, and
/// yields one `Result` per row so a bad row does not stop the rest of the file.
pub struct SeedReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> SeedReader<R> {
    /// Creates a new `SeedReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Catalog rows with header `id,name,price,quantity`.
    pub fn products(self) -> impl Iterator<Item = Result<Product>> {
        self.records()
    }

    /// Opening balances with header `owner,balance`.
    pub fn wallets(self) -> impl Iterator<Item = Result<WalletSeed>> {
        self.records()
    }

    fn records<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(OrderError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_catalog() {
        let data = "id, name, price, quantity\np1, Teapot, 1000, 5\np2, Cup, 250.50, 12";
        let products: Vec<Product> = SeedReader::new(data.as_bytes())
            .products()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id.0, "p1");
        assert_eq!(products[0].name, "Teapot");
        assert_eq!(products[0].price, Amount::new(dec!(1000)).unwrap());
        assert_eq!(products[1].price, Amount::new(dec!(250.50)).unwrap());
        assert_eq!(products[1].quantity, 12);
    }

    #[test]
    fn test_reader_wallets() {
        let data = "owner,balance\nalice,5000\nbob,0";
        let wallets: Vec<WalletSeed> = SeedReader::new(data.as_bytes())
            .wallets()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(wallets[0].owner, AccountId::from("alice"));
        assert_eq!(wallets[0].balance, Amount::new(dec!(5000)).unwrap());
        assert_eq!(wallets[1].balance, Amount::ZERO);
    }

    #[test]
    fn test_reader_malformed_rows() {
        let data = "owner,balance\nalice,-10\nbob,lots\ncarol,7";
        let results: Vec<Result<WalletSeed>> = SeedReader::new(data.as_bytes()).wallets().collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_err());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
