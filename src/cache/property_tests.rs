//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check round-trip and consistency properties of the
//! facade over an in-memory store.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{Map, Value};

use crate::cache::Cache;
use crate::codec;
use crate::config::{CacheConfig, StoreConfig};
use crate::store::{MemoryStore, Store};

// == Test Configuration ==
const TEST_TTL_MS: u64 = 60_000;

fn test_cache() -> Cache {
    let config = CacheConfig::new(
        TEST_TTL_MS,
        StoreConfig::supplied(|| Arc::new(MemoryStore::new()) as Arc<dyn Store>),
    );
    Cache::new(config).unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// == Strategies ==
/// Generates valid cache keys (non-empty)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,64}"
}

/// Generates JSON values without floats, which do not round-trip exactly
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        ".{0,32}".prop_map(Value::String),
    ];

    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..8)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Sequence of cache operations for consistency testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // Small key space so operations collide
    let key = "[a-c]";
    prop_oneof![
        (key, json_value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // decode(encode(v)) == v for every value in the supported domain
    #[test]
    fn prop_codec_round_trip(value in json_value_strategy()) {
        let payload = codec::encode(&value).unwrap();
        let decoded: Option<Value> = codec::decode(Some(&payload)).unwrap();
        prop_assert_eq!(decoded, Some(value));
    }

    // Encoding the same value twice yields the same payload
    #[test]
    fn prop_encode_deterministic(value in json_value_strategy()) {
        prop_assert_eq!(codec::encode(&value).unwrap(), codec::encode(&value).unwrap());
    }

    // set(k, v) followed by get(k) returns v
    #[test]
    fn prop_set_then_get(key in valid_key_strategy(), value in json_value_strategy()) {
        let cache = test_cache();
        let retrieved: Option<Value> = runtime().block_on(async {
            cache.set(&key, &value).await.unwrap();
            cache.get(&key).await.unwrap()
        });
        prop_assert_eq!(retrieved, Some(value));
    }

    // delete(k) after set(k, v) makes get(k) return nothing
    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in json_value_strategy()) {
        let cache = test_cache();
        let retrieved: Option<Value> = runtime().block_on(async {
            cache.set(&key, &value).await.unwrap();
            cache.delete(&key).await.unwrap();
            cache.get(&key).await.unwrap()
        });
        prop_assert!(retrieved.is_none());
    }

    // The cache behaves like a map under any interleaving of operations
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..40)) {
        let cache = test_cache();
        let mut model = std::collections::HashMap::new();

        let rt = runtime();
        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    rt.block_on(cache.set(&key, &value)).unwrap();
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    let retrieved: Option<Value> = rt.block_on(cache.get(&key)).unwrap();
                    prop_assert_eq!(retrieved.as_ref(), model.get(&key));
                }
                CacheOp::Delete { key } => {
                    rt.block_on(cache.delete(&key)).unwrap();
                    model.remove(&key);
                }
            }
        }
    }
}
