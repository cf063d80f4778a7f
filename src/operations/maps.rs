use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::BitOr;

use crate::ctx::CdtContext;
use crate::descriptor::{OpCode, Operation, ReturnType};

/// Ordering mode of a map bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapOrder(pub u8);

impl MapOrder {
    /// Entries keep insertion order.
    pub const UNORDERED: MapOrder = MapOrder(0);
    /// Entries are kept sorted by key.
    pub const KEY_ORDERED: MapOrder = MapOrder(1);
    /// Entries are kept sorted by key, with an additional value index.
    pub const KEY_VALUE_ORDERED: MapOrder = MapOrder(3);
}

/// Flags controlling how map writes behave, combined with `|`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapWriteFlags(pub u8);

impl MapWriteFlags {
    pub const DEFAULT: MapWriteFlags = MapWriteFlags(0);
    /// Only write keys not already present.
    pub const CREATE_ONLY: MapWriteFlags = MapWriteFlags(1);
    /// Only write keys that already exist.
    pub const UPDATE_ONLY: MapWriteFlags = MapWriteFlags(2);
    /// Turn policy violations into no-ops instead of failures.
    pub const NO_FAIL: MapWriteFlags = MapWriteFlags(4);
    /// Write the entries that pass the policy even when others do not.
    pub const PARTIAL: MapWriteFlags = MapWriteFlags(8);
}

impl BitOr for MapWriteFlags {
    type Output = MapWriteFlags;

    fn bitor(self, rhs: MapWriteFlags) -> MapWriteFlags {
        MapWriteFlags(self.0 | rhs.0)
    }
}

/// Write policy attached to map modification operations.
///
/// Also dictates the ordering of a map the operation creates. Serialized
/// form:
/// ```json
/// {"map_order": 1, "map_write_flags": 0}
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPolicy {
    /// Ordering to give the map when the operation creates it
    #[serde(rename = "map_order")]
    pub order: MapOrder,
    /// Write behavior flags
    #[serde(rename = "map_write_flags")]
    pub flags: MapWriteFlags,
}

impl MapPolicy {
    pub fn new(order: MapOrder, flags: MapWriteFlags) -> Self {
        Self { order, flags }
    }
}

/// Create a map set policy operation, applying `policy` to the map in `bin`.
pub fn set_policy(bin: &str, policy: MapPolicy, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        map_policy: Some(policy),
        ctx,
        ..Operation::new(OpCode::MAP_SET_POLICY, bin)
    }
}

/// Create a map put operation.
///
/// The server stores `value` under `key`, creating the map when the bin
/// does not exist yet.
pub fn put(
    bin: &str,
    key: impl Into<Value>,
    value: impl Into<Value>,
    policy: Option<MapPolicy>,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        key: Some(key.into()),
        value: Some(value.into()),
        map_policy: policy,
        ctx,
        ..Operation::new(OpCode::MAP_PUT, bin)
    }
}

/// Create a map put items operation.
///
/// The server adds or updates every entry of `items` in one operation.
pub fn put_items(
    bin: &str,
    items: Map<String, Value>,
    policy: Option<MapPolicy>,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(Value::Object(items)),
        map_policy: policy,
        ctx,
        ..Operation::new(OpCode::MAP_PUT_ITEMS, bin)
    }
}

/// Create a map increment operation.
///
/// The server adds `delta` to the numeric value stored under `key`.
pub fn increment(
    bin: &str,
    key: impl Into<Value>,
    delta: impl Into<Value>,
    policy: Option<MapPolicy>,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        key: Some(key.into()),
        value: Some(delta.into()),
        map_policy: policy,
        ctx,
        ..Operation::new(OpCode::MAP_INCREMENT, bin)
    }
}

/// Create a map decrement operation.
///
/// The server subtracts `delta` from the numeric value stored under `key`.
pub fn decrement(
    bin: &str,
    key: impl Into<Value>,
    delta: impl Into<Value>,
    policy: Option<MapPolicy>,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        key: Some(key.into()),
        value: Some(delta.into()),
        map_policy: policy,
        ctx,
        ..Operation::new(OpCode::MAP_DECREMENT, bin)
    }
}

/// Create a map size operation, returning the number of entries.
pub fn size(bin: &str, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        ctx,
        ..Operation::new(OpCode::MAP_SIZE, bin)
    }
}

/// Create a map clear operation, removing all entries from the map.
pub fn clear(bin: &str, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        ctx,
        ..Operation::new(OpCode::MAP_CLEAR, bin)
    }
}

/// Create a map remove by key operation.
pub fn remove_by_key(
    bin: &str,
    key: impl Into<Value>,
    return_type: ReturnType,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        key: Some(key.into()),
        return_type: Some(return_type),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_KEY, bin)
    }
}

/// Create a map remove by key list operation.
///
/// The server removes every entry whose key appears in `keys`, or keeps
/// exactly those and removes the rest when `inverted`.
pub fn remove_by_key_list(
    bin: &str,
    keys: Vec<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(Value::Array(keys)),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_KEY_LIST, bin)
    }
}

/// Create a map remove by key range operation.
///
/// The server removes entries with keys in `[begin, end)`.
pub fn remove_by_key_range(
    bin: &str,
    begin: impl Into<Value>,
    end: impl Into<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    // this removal variant carries the range end under val, not range
    Operation {
        key: Some(begin.into()),
        value: Some(end.into()),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_KEY_RANGE, bin)
    }
}

/// Create a map remove by value operation.
pub fn remove_by_value(
    bin: &str,
    value: impl Into<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(value.into()),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_VALUE, bin)
    }
}

/// Create a map remove by value list operation.
pub fn remove_by_value_list(
    bin: &str,
    values: Vec<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(Value::Array(values)),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_VALUE_LIST, bin)
    }
}

/// Create a map remove by value range operation.
///
/// The server removes entries with values in `[begin, end)`.
pub fn remove_by_value_range(
    bin: &str,
    begin: impl Into<Value>,
    end: impl Into<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(begin.into()),
        range_end: Some(end.into()),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_VALUE_RANGE, bin)
    }
}

/// Create a map remove by index operation.
pub fn remove_by_index(
    bin: &str,
    index: i64,
    return_type: ReturnType,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(index),
        return_type: Some(return_type),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_INDEX, bin)
    }
}

/// Create a map remove by index range operation.
///
/// The server removes `count` entries starting at `index`.
pub fn remove_by_index_range(
    bin: &str,
    index: i64,
    count: i64,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(index),
        value: Some(Value::from(count)),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_INDEX_RANGE, bin)
    }
}

/// Create a map remove by rank operation.
pub fn remove_by_rank(
    bin: &str,
    rank: i64,
    return_type: ReturnType,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    // map rank selectors carry the rank under the index key
    Operation {
        index: Some(rank),
        return_type: Some(return_type),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_RANK, bin)
    }
}

/// Create a map remove by rank range operation.
///
/// The server removes `count` entries beginning with the entry at `rank`.
pub fn remove_by_rank_range(
    bin: &str,
    rank: i64,
    count: i64,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(rank),
        value: Some(Value::from(count)),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_RANK_RANGE, bin)
    }
}

/// Create a map get by key operation.
pub fn get_by_key(
    bin: &str,
    key: impl Into<Value>,
    return_type: ReturnType,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        key: Some(key.into()),
        return_type: Some(return_type),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_KEY, bin)
    }
}

/// Create a map get by key range operation.
///
/// The server returns entries with keys in `[begin, end)`.
pub fn get_by_key_range(
    bin: &str,
    begin: impl Into<Value>,
    end: impl Into<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        key: Some(begin.into()),
        range_end: Some(end.into()),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_KEY_RANGE, bin)
    }
}

/// Create a map get by key list operation.
pub fn get_by_key_list(
    bin: &str,
    keys: Vec<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(Value::Array(keys)),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_KEY_LIST, bin)
    }
}

/// Create a map get by value operation.
pub fn get_by_value(
    bin: &str,
    value: impl Into<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(value.into()),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_VALUE, bin)
    }
}

/// Create a map get by value range operation.
///
/// The server returns entries with values in `[begin, end)`.
pub fn get_by_value_range(
    bin: &str,
    begin: impl Into<Value>,
    end: impl Into<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(begin.into()),
        range_end: Some(end.into()),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_VALUE_RANGE, bin)
    }
}

/// Create a map get by value list operation.
pub fn get_by_value_list(
    bin: &str,
    values: Vec<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(Value::Array(values)),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_VALUE_LIST, bin)
    }
}

/// Create a map get by index operation.
pub fn get_by_index(
    bin: &str,
    index: i64,
    return_type: ReturnType,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(index),
        return_type: Some(return_type),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_INDEX, bin)
    }
}

/// Create a map get by index range operation.
///
/// The server returns `count` entries starting at `index`.
pub fn get_by_index_range(
    bin: &str,
    index: i64,
    count: i64,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(index),
        value: Some(Value::from(count)),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_INDEX_RANGE, bin)
    }
}

/// Create a map get by rank operation.
pub fn get_by_rank(
    bin: &str,
    rank: i64,
    return_type: ReturnType,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(rank),
        return_type: Some(return_type),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_RANK, bin)
    }
}

/// Create a map get by rank range operation.
///
/// The server returns `count` entries beginning with the entry at `rank`.
pub fn get_by_rank_range(
    bin: &str,
    rank: i64,
    count: i64,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(rank),
        value: Some(Value::from(count)),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_RANK_RANGE, bin)
    }
}

/// Create a map remove by value relative rank range operation.
///
/// The server finds the entry whose value is nearest to `value`, removes
/// entries whose rank is at least `rank(found) + offset`, either `count` of
/// them or everything above when `count` is `None`, and returns the
/// representation picked by `return_type`.
///
/// For the map `{0: 6, 6: 12, 10: 18, 15: 24}` with
/// [`ReturnType::KEY`]:
///
/// ```text
/// (value, offset, count) -> removed keys
/// (6, 0, None) -> [0, 6, 10, 15]
/// (5, 0, 2)    -> [0, 6]
/// (7, -1, 1)   -> [0]
/// (7, -1, 3)   -> [0, 6, 10]
/// ```
pub fn remove_by_value_rank_range_relative(
    bin: &str,
    value: impl Into<Value>,
    offset: i64,
    return_type: ReturnType,
    count: Option<i64>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    // the relative selectors only write inverted when it is set
    Operation {
        value: Some(value.into()),
        rank: Some(offset),
        return_type: Some(return_type),
        count,
        inverted: inverted.then_some(true),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_VALUE_RANK_RANGE_REL, bin)
    }
}

/// Create a map get by value relative rank range operation.
///
/// Read-only counterpart of [`remove_by_value_rank_range_relative`], same
/// selection rules.
pub fn get_by_value_rank_range_relative(
    bin: &str,
    value: impl Into<Value>,
    offset: i64,
    return_type: ReturnType,
    count: Option<i64>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(value.into()),
        rank: Some(offset),
        return_type: Some(return_type),
        count,
        inverted: inverted.then_some(true),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_VALUE_RANK_RANGE_REL, bin)
    }
}

/// Create a map remove by key relative index range operation.
///
/// The server finds the entry whose key is nearest to `key`, then removes
/// entries whose index is at least `index(found) + offset`, either `count`
/// of them or everything above when `count` is `None`.
///
/// For the key-ordered map `{0: 6, 6: 12, 10: 18, 15: 24}` with
/// [`ReturnType::KEY`]:
///
/// ```text
/// (key, offset, count) -> removed keys
/// (5,  0, None) -> [6, 10, 15]
/// (5,  0, 2)    -> [6, 10]
/// (5, -1, None) -> [0, 6, 10, 15]
/// (5, -1, 3)    -> [0, 6, 10]
/// (3,  2, None) -> [15]
/// (3,  5, None) -> []
/// ```
pub fn remove_by_key_index_range_relative(
    bin: &str,
    key: impl Into<Value>,
    offset: i64,
    return_type: ReturnType,
    count: Option<i64>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        key: Some(key.into()),
        index: Some(offset),
        return_type: Some(return_type),
        count,
        inverted: inverted.then_some(true),
        ctx,
        ..Operation::new(OpCode::MAP_REMOVE_BY_KEY_INDEX_RANGE_REL, bin)
    }
}

/// Create a map get by key relative index range operation.
///
/// Read-only counterpart of [`remove_by_key_index_range_relative`], same
/// selection rules.
pub fn get_by_key_index_range_relative(
    bin: &str,
    key: impl Into<Value>,
    offset: i64,
    return_type: ReturnType,
    count: Option<i64>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        key: Some(key.into()),
        index: Some(offset),
        return_type: Some(return_type),
        count,
        inverted: inverted.then_some(true),
        ctx,
        ..Operation::new(OpCode::MAP_GET_BY_KEY_INDEX_RANGE_REL, bin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx;
    use serde_json::json;

    #[test]
    fn test_put_minimal_shape() {
        let op = put("m", "name", "ada", None, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({"op": 1102, "bin": "m", "key": "name", "val": "ada"})
        );
    }

    #[test]
    fn test_put_with_policy() {
        let policy = MapPolicy::new(MapOrder::KEY_ORDERED, MapWriteFlags::CREATE_ONLY);
        let op = put("m", 3, 9, Some(policy), None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized["map_policy"],
            json!({"map_order": 1, "map_write_flags": 1})
        );
    }

    #[test]
    fn test_put_items_carries_mapping_under_val() {
        let items = json!({"a": 1, "b": 2}).as_object().unwrap().clone();
        let op = put_items("m", items, None, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({"op": 1103, "bin": "m", "val": {"a": 1, "b": 2}})
        );
    }

    #[test]
    fn test_set_policy_shape() {
        let op = set_policy("m", MapPolicy::default(), None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({
                "op": 1101,
                "bin": "m",
                "map_policy": {"map_order": 0, "map_write_flags": 0}
            })
        );
    }

    #[test]
    fn test_key_range_end_key_differs_between_remove_and_get() {
        let removed = remove_by_key_range("m", 1, 5, ReturnType::KEY, false, None);
        let serialized = serde_json::to_value(&removed).unwrap();
        assert_eq!(serialized["key"], json!(1));
        assert_eq!(serialized["val"], json!(5));
        assert!(serialized.get("range").is_none());

        let fetched = get_by_key_range("m", 1, 5, ReturnType::KEY, false, None);
        let serialized = serde_json::to_value(&fetched).unwrap();
        assert_eq!(serialized["key"], json!(1));
        assert_eq!(serialized["range"], json!(5));
        assert!(serialized.get("val").is_none());
    }

    #[test]
    fn test_value_range_carries_begin_under_val_and_end_under_range() {
        let op = get_by_value_range("m", 10, 20, ReturnType::KEY_VALUE, true, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({
                "op": 1122,
                "bin": "m",
                "val": 10,
                "range": 20,
                "return_type": 8,
                "inverted": true
            })
        );
    }

    #[test]
    fn test_rank_selectors_carry_rank_under_index() {
        let op = get_by_rank("m", -1, ReturnType::VALUE, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({"op": 1126, "bin": "m", "index": -1, "return_type": 7})
        );

        let op = remove_by_rank_range("m", 2, 3, ReturnType::COUNT, false, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized["index"], json!(2));
        assert_eq!(serialized["val"], json!(3));
        assert_eq!(serialized["inverted"], json!(false));
        assert!(serialized.get("rank").is_none());
    }

    #[test]
    fn test_key_list_travels_under_val() {
        let op = get_by_key_list("m", vec![json!("a"), json!("b")], ReturnType::VALUE, false, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized["val"], json!(["a", "b"]));
        assert!(serialized.get("key").is_none());
    }

    #[test]
    fn test_relative_selector_omits_inverted_when_unset() {
        let op = get_by_value_rank_range_relative("m", 6, 0, ReturnType::KEY, None, false, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({"op": 1129, "bin": "m", "val": 6, "rank": 0, "return_type": 6})
        );
    }

    #[test]
    fn test_relative_selector_writes_inverted_only_as_true() {
        let op = remove_by_key_index_range_relative("m", 5, -1, ReturnType::KEY, Some(3), true, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({
                "op": 1130,
                "bin": "m",
                "key": 5,
                "index": -1,
                "count": 3,
                "return_type": 6,
                "inverted": true
            })
        );
    }

    #[test]
    fn test_ctx_path_attaches_to_map_operations() {
        let op = increment("m", "hits", 1, None, Some(vec![ctx::map_key("stats")]));
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized["ctx"], json!([{"id": 0x22, "val": "stats"}]));
    }
}
