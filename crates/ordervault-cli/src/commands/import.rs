//! Order import command
//!
//! Usage: ordervault import <PATH>
//!
//! PATH is a JSON file holding one order or an array of orders, or a
//! directory whose `*.json` files are imported in name order.

use clap::Args;
use ordervault_core::core_types::OpContext;
use ordervault_core::{Order, OrderError, OrderStore};
use ordervault_engine::OrderRepository;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to an order JSON file or a directory of them
    pub path: PathBuf,
}

/// One decoded (or undecodable) order and where it came from
#[derive(Debug)]
pub struct Decoded {
    pub source: String,
    pub order: Result<Order, OrderError>,
}

/// Execute import
///
/// Every order is attempted; the command fails if any of them did.
pub fn execute<S: OrderStore>(
    repo: &OrderRepository<S>,
    ctx: &OpContext,
    args: ImportArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let decoded = load_orders(&args.path)?;

    let mut imported = 0usize;
    let mut failed = 0usize;
    for Decoded { source, order } in decoded {
        let outcome = order
            .map_err(Into::into)
            .and_then(|order| repo.insert(ctx, order));
        match outcome {
            Ok(()) => imported += 1,
            Err(e) => {
                failed += 1;
                eprintln!("✗ {}: {}", source, e);
            }
        }
    }

    println!("Imported {} order(s), {} failed", imported, failed);
    if failed > 0 {
        return Err(format!("{} order(s) failed to import", failed).into());
    }
    Ok(())
}

/// Decode every order under `path`
///
/// # Errors
///
/// Only I/O errors reading `path` itself; a malformed document becomes a
/// failed entry.
pub fn load_orders(path: &Path) -> std::io::Result<Vec<Decoded>> {
    if !path.is_dir() {
        return Ok(decode_file(path, &std::fs::read(path)?));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();
    files.sort();

    let mut decoded = Vec::new();
    for file in files {
        decoded.extend(decode_file(&file, &std::fs::read(&file)?));
    }
    Ok(decoded)
}

fn decode_file(path: &Path, bytes: &[u8]) -> Vec<Decoded> {
    let source = path.display().to_string();

    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(serde_json::Value::Array(values)) => values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Decoded {
                source: format!("{}[{}]", source, i),
                order: serde_json::from_value(value).map_err(OrderError::from),
            })
            .collect(),
        Ok(_) => vec![Decoded {
            order: Order::from_json_slice(bytes),
            source,
        }],
        Err(e) => vec![Decoded {
            source,
            order: Err(OrderError::from(e)),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "order_uid": "b563feb7b2b84b6test",
        "track_number": "WBILMTESTTRACK",
        "entry": "WBIL",
        "delivery": {
            "name": "Test Testov", "phone": "+9720000000", "zip": "2639809",
            "city": "Kiryat Mozkin", "address": "Ploshad Mira 15",
            "region": "Kraiot", "email": "test@gmail.com"
        },
        "payment": {
            "transaction": "b563feb7b2b84b6test", "request_id": "", "currency": "USD",
            "provider": "wbpay", "amount": 1817, "payment_dt": 1637907727,
            "bank": "alpha", "delivery_cost": 1500, "goods_total": 317, "custom_fee": 0
        },
        "items": [{
            "chrt_id": 9934930, "track_number": "WBILMTESTTRACK", "price": 453,
            "rid": "ab4219087a764ae0btest", "name": "Mascaras", "sale": 30, "size": "0",
            "total_price": 317, "nm_id": 2389212, "brand": "Vivienne Sabo", "status": 202
        }],
        "locale": "en",
        "internal_signature": "",
        "customer_id": "test",
        "delivery_service": "meest",
        "shardkey": "9",
        "sm_id": 99,
        "date_created": "2021-11-26T06:22:19Z",
        "oof_shard": "1"
    }"#;

    #[test]
    fn test_single_order_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.json");
        std::fs::write(&path, ORDER_JSON).unwrap();

        let decoded = load_orders(&path).unwrap();

        assert_eq!(decoded.len(), 1);
        let order = decoded[0].order.as_ref().unwrap();
        assert_eq!(order.order_uid, "b563feb7b2b84b6test");
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn test_array_file_reports_each_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(&path, format!("[{}, {{\"order_uid\": 7}}]", ORDER_JSON)).unwrap();

        let decoded = load_orders(&path).unwrap();

        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].order.is_ok());
        assert!(matches!(
            decoded[1].order,
            Err(OrderError::Serialization { .. })
        ));
        assert!(decoded[1].source.ends_with("batch.json[1]"));
    }

    #[test]
    fn test_directory_is_read_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), ORDER_JSON).unwrap();
        std::fs::write(dir.path().join("a.json"), "not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let decoded = load_orders(dir.path()).unwrap();

        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].source.ends_with("a.json"));
        assert!(decoded[0].order.is_err());
        assert!(decoded[1].source.ends_with("b.json"));
        assert!(decoded[1].order.is_ok());
    }
}
