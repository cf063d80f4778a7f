use serde::{Deserialize, Serialize};
use serde_json::Value;

const CTX_LIST_INDEX: u8 = 0x10;
const CTX_LIST_RANK: u8 = 0x11;
const CTX_LIST_VALUE: u8 = 0x13;
const CTX_MAP_INDEX: u8 = 0x20;
const CTX_MAP_RANK: u8 = 0x21;
const CTX_MAP_KEY: u8 = 0x22;
const CTX_MAP_VALUE: u8 = 0x23;

/// One step of descent into a nested CDT.
///
/// List and map operations apply to the bin's top-level container by
/// default. To address a container nested inside another CDT, builders
/// accept an ordered path of context steps and the server walks the path
/// before applying the operation. Each step selects one child, either by
/// position (index, rank) or by content (value, map key).
///
/// Example: `vec![map_key("users"), list_index(0)]` addresses the first
/// element of the list stored under the `users` key of a map bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdtContext {
    /// Step kind, one of the fixed context identifiers
    pub id: u8,
    /// Selector payload for the step
    #[serde(rename = "val")]
    pub value: Value,
}

/// Step into the list element at `index`.
///
/// Negative values index from the end of the list.
pub fn list_index(index: i64) -> CdtContext {
    CdtContext {
        id: CTX_LIST_INDEX,
        value: Value::from(index),
    }
}

/// Step into the list element with the given rank.
pub fn list_rank(rank: i64) -> CdtContext {
    CdtContext {
        id: CTX_LIST_RANK,
        value: Value::from(rank),
    }
}

/// Step into the list element equal to `value`.
pub fn list_value(value: impl Into<Value>) -> CdtContext {
    CdtContext {
        id: CTX_LIST_VALUE,
        value: value.into(),
    }
}

/// Step into the map entry at `index`.
pub fn map_index(index: i64) -> CdtContext {
    CdtContext {
        id: CTX_MAP_INDEX,
        value: Value::from(index),
    }
}

/// Step into the map entry with the given rank.
pub fn map_rank(rank: i64) -> CdtContext {
    CdtContext {
        id: CTX_MAP_RANK,
        value: Value::from(rank),
    }
}

/// Step into the map entry stored under `key`.
pub fn map_key(key: impl Into<Value>) -> CdtContext {
    CdtContext {
        id: CTX_MAP_KEY,
        value: key.into(),
    }
}

/// Step into the map entry whose value equals `value`.
pub fn map_value(value: impl Into<Value>) -> CdtContext {
    CdtContext {
        id: CTX_MAP_VALUE,
        value: value.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_steps_carry_their_identifiers() {
        assert_eq!(list_index(3).id, 0x10);
        assert_eq!(list_rank(-1).id, 0x11);
        assert_eq!(list_value(json!("x")).id, 0x13);
        assert_eq!(map_index(0).id, 0x20);
        assert_eq!(map_rank(2).id, 0x21);
        assert_eq!(map_key("k").id, 0x22);
        assert_eq!(map_value(7).id, 0x23);
    }

    #[test]
    fn test_step_serializes_id_and_val() {
        let step = map_key("users");
        let serialized = serde_json::to_value(&step).unwrap();
        assert_eq!(serialized, json!({"id": 0x22, "val": "users"}));
    }

    #[test]
    fn test_path_serializes_in_order() {
        let path = vec![map_key("users"), list_index(0)];
        let serialized = serde_json::to_value(&path).unwrap();
        assert_eq!(
            serialized,
            json!([{"id": 0x22, "val": "users"}, {"id": 0x10, "val": 0}])
        );
    }
}
