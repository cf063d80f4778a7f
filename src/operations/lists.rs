use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::BitOr;

use crate::ctx::CdtContext;
use crate::descriptor::{OpCode, Operation, ReturnType};

/// Ordering mode of a list bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOrder(pub u8);

impl ListOrder {
    /// Items keep insertion order.
    pub const UNORDERED: ListOrder = ListOrder(0);
    /// Items are kept sorted by value.
    pub const ORDERED: ListOrder = ListOrder(1);
}

/// Flags for [`sort`], combined with `|`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSortFlags(pub u8);

impl ListSortFlags {
    pub const DEFAULT: ListSortFlags = ListSortFlags(0);
    /// Discard duplicate values while sorting.
    pub const DROP_DUPLICATES: ListSortFlags = ListSortFlags(2);
}

impl BitOr for ListSortFlags {
    type Output = ListSortFlags;

    fn bitor(self, rhs: ListSortFlags) -> ListSortFlags {
        ListSortFlags(self.0 | rhs.0)
    }
}

/// Flags controlling how list writes behave, combined with `|`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWriteFlags(pub u8);

impl ListWriteFlags {
    pub const DEFAULT: ListWriteFlags = ListWriteFlags(0);
    /// Only add items not already present.
    pub const ADD_UNIQUE: ListWriteFlags = ListWriteFlags(1);
    /// Only allow inserts inside the current bounds of the list.
    pub const INSERT_BOUNDED: ListWriteFlags = ListWriteFlags(2);
    /// Turn policy violations into no-ops instead of failures.
    pub const NO_FAIL: ListWriteFlags = ListWriteFlags(4);
    /// Write the items that pass the policy even when others do not.
    pub const PARTIAL: ListWriteFlags = ListWriteFlags(8);
}

impl BitOr for ListWriteFlags {
    type Output = ListWriteFlags;

    fn bitor(self, rhs: ListWriteFlags) -> ListWriteFlags {
        ListWriteFlags(self.0 | rhs.0)
    }
}

/// Write policy attached to list modification operations.
///
/// Serialized form:
/// ```json
/// {"list_order": 1, "write_flags": 5}
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPolicy {
    /// Ordering to give the list when the operation creates it
    #[serde(rename = "list_order")]
    pub order: ListOrder,
    /// Write behavior flags
    #[serde(rename = "write_flags")]
    pub flags: ListWriteFlags,
}

impl ListPolicy {
    pub fn new(order: ListOrder, flags: ListWriteFlags) -> Self {
        Self { order, flags }
    }
}

/// Create a list append operation.
///
/// The server appends `value` to the end of the list in `bin`.
pub fn append(
    bin: &str,
    value: impl Into<Value>,
    policy: Option<ListPolicy>,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(value.into()),
        list_policy: policy,
        ctx,
        ..Operation::new(OpCode::LIST_APPEND, bin)
    }
}

/// Create a list append items operation.
///
/// The server appends every item of `values` to the end of the list in
/// `bin`.
pub fn append_items(
    bin: &str,
    values: Vec<Value>,
    policy: Option<ListPolicy>,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value: Some(Value::Array(values)),
        list_policy: policy,
        ctx,
        ..Operation::new(OpCode::LIST_APPEND_ITEMS, bin)
    }
}

/// Create a list insert operation.
///
/// The server inserts `value` at `index`. The index may be negative to
/// count from the end of the list.
pub fn insert(
    bin: &str,
    index: i64,
    value: impl Into<Value>,
    policy: Option<ListPolicy>,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(index),
        value: Some(value.into()),
        list_policy: policy,
        ctx,
        ..Operation::new(OpCode::LIST_INSERT, bin)
    }
}

/// Create a list insert items operation.
///
/// The server inserts every item of `values` starting at `index`.
pub fn insert_items(
    bin: &str,
    index: i64,
    values: Vec<Value>,
    policy: Option<ListPolicy>,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(index),
        value: Some(Value::Array(values)),
        list_policy: policy,
        ctx,
        ..Operation::new(OpCode::LIST_INSERT_ITEMS, bin)
    }
}

/// Create a list increment operation.
///
/// The server adds `delta` to the numeric item at `index`.
pub fn increment(
    bin: &str,
    index: i64,
    delta: impl Into<Value>,
    policy: Option<ListPolicy>,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(index),
        value: Some(delta.into()),
        list_policy: policy,
        ctx,
        ..Operation::new(OpCode::LIST_INCREMENT, bin)
    }
}

/// Create a list pop operation.
///
/// The server removes the item at `index` and returns it.
pub fn pop(bin: &str, index: i64, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        index: Some(index),
        ctx,
        ..Operation::new(OpCode::LIST_POP, bin)
    }
}

/// Create a list pop range operation.
///
/// The server removes `count` items starting at `index` and returns them.
pub fn pop_range(bin: &str, index: i64, count: i64, ctx: Option<Vec<CdtContext>>) -> Operation {
    // range counts travel under the val key
    Operation {
        index: Some(index),
        value: Some(Value::from(count)),
        ctx,
        ..Operation::new(OpCode::LIST_POP_RANGE, bin)
    }
}

/// Create a list remove operation.
pub fn remove(bin: &str, index: i64, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        index: Some(index),
        ctx,
        ..Operation::new(OpCode::LIST_REMOVE, bin)
    }
}

/// Create a list remove range operation.
///
/// The server removes `count` items starting at `index`.
pub fn remove_range(bin: &str, index: i64, count: i64, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        index: Some(index),
        value: Some(Value::from(count)),
        ctx,
        ..Operation::new(OpCode::LIST_REMOVE_RANGE, bin)
    }
}

/// Create a list clear operation, removing all items from the list.
pub fn clear(bin: &str, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        ctx,
        ..Operation::new(OpCode::LIST_CLEAR, bin)
    }
}

/// Create a list set operation.
///
/// The server overwrites the item at `index` with `value`.
pub fn set(
    bin: &str,
    index: i64,
    value: impl Into<Value>,
    policy: Option<ListPolicy>,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(index),
        value: Some(value.into()),
        list_policy: policy,
        ctx,
        ..Operation::new(OpCode::LIST_SET, bin)
    }
}

/// Create a list get operation, returning the item at `index`.
pub fn get(bin: &str, index: i64, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        index: Some(index),
        ctx,
        ..Operation::new(OpCode::LIST_GET, bin)
    }
}

/// Create a list get range operation, returning `count` items starting at
/// `index`.
pub fn get_range(bin: &str, index: i64, count: i64, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        index: Some(index),
        value: Some(Value::from(count)),
        ctx,
        ..Operation::new(OpCode::LIST_GET_RANGE, bin)
    }
}

/// Create a list trim operation.
///
/// The server removes every item outside the window of `count` items
/// starting at `index`.
pub fn trim(bin: &str, index: i64, count: i64, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        index: Some(index),
        value: Some(Value::from(count)),
        ctx,
        ..Operation::new(OpCode::LIST_TRIM, bin)
    }
}

/// Create a list size operation, returning the number of items.
pub fn size(bin: &str, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        ctx,
        ..Operation::new(OpCode::LIST_SIZE, bin)
    }
}

/// Create a list get by index operation.
///
/// The server selects the item at `index` and returns the representation
/// picked by `return_type`.
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
        ..Operation::new(OpCode::LIST_GET_BY_INDEX, bin)
    }
}

/// Create a list get by index range operation.
///
/// The server selects items starting at `index`, either `count` of them or
/// everything to the end of the list when `count` is `None`. With
/// `inverted`, everything outside that window is selected instead.
pub fn get_by_index_range(
    bin: &str,
    index: i64,
    return_type: ReturnType,
    count: Option<i64>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(index),
        return_type: Some(return_type),
        inverted: Some(inverted),
        count,
        ctx,
        ..Operation::new(OpCode::LIST_GET_BY_INDEX_RANGE, bin)
    }
}

/// Create a list get by rank operation.
pub fn get_by_rank(
    bin: &str,
    rank: i64,
    return_type: ReturnType,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        rank: Some(rank),
        return_type: Some(return_type),
        ctx,
        ..Operation::new(OpCode::LIST_GET_BY_RANK, bin)
    }
}

/// Create a list get by rank range operation.
///
/// The server selects items starting at `rank`, either `count` of them or
/// everything above when `count` is `None`.
pub fn get_by_rank_range(
    bin: &str,
    rank: i64,
    return_type: ReturnType,
    count: Option<i64>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        rank: Some(rank),
        return_type: Some(return_type),
        inverted: Some(inverted),
        count,
        ctx,
        ..Operation::new(OpCode::LIST_GET_BY_RANK_RANGE, bin)
    }
}

/// Create a list get by value operation.
///
/// The server selects every item equal to `value`, or every other item when
/// `inverted`.
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
        ..Operation::new(OpCode::LIST_GET_BY_VALUE, bin)
    }
}

/// Create a list get by value list operation.
///
/// The server selects every item matching an entry of `values`.
pub fn get_by_value_list(
    bin: &str,
    values: Vec<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value_list: Some(values),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::LIST_GET_BY_VALUE_LIST, bin)
    }
}

/// Create a list get by value range operation.
///
/// The server selects items with values in `[begin, end)`. A missing bound
/// leaves that side of the range open.
pub fn get_by_value_range(
    bin: &str,
    return_type: ReturnType,
    begin: Option<Value>,
    end: Option<Value>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        return_type: Some(return_type),
        inverted: Some(inverted),
        value_begin: begin,
        value_end: end,
        ctx,
        ..Operation::new(OpCode::LIST_GET_BY_VALUE_RANGE, bin)
    }
}

/// Create a list remove by index operation.
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
        ..Operation::new(OpCode::LIST_REMOVE_BY_INDEX, bin)
    }
}

/// Create a list remove by index range operation.
///
/// Removal counterpart of [`get_by_index_range`], same selection rules.
pub fn remove_by_index_range(
    bin: &str,
    index: i64,
    return_type: ReturnType,
    count: Option<i64>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        index: Some(index),
        return_type: Some(return_type),
        inverted: Some(inverted),
        count,
        ctx,
        ..Operation::new(OpCode::LIST_REMOVE_BY_INDEX_RANGE, bin)
    }
}

/// Create a list remove by rank operation.
pub fn remove_by_rank(
    bin: &str,
    rank: i64,
    return_type: ReturnType,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        rank: Some(rank),
        return_type: Some(return_type),
        ctx,
        ..Operation::new(OpCode::LIST_REMOVE_BY_RANK, bin)
    }
}

/// Create a list remove by rank range operation.
///
/// Removal counterpart of [`get_by_rank_range`], same selection rules.
pub fn remove_by_rank_range(
    bin: &str,
    rank: i64,
    return_type: ReturnType,
    count: Option<i64>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        rank: Some(rank),
        return_type: Some(return_type),
        inverted: Some(inverted),
        count,
        ctx,
        ..Operation::new(OpCode::LIST_REMOVE_BY_RANK_RANGE, bin)
    }
}

/// Create a list remove by value operation.
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
        ..Operation::new(OpCode::LIST_REMOVE_BY_VALUE, bin)
    }
}

/// Create a list remove by value list operation.
pub fn remove_by_value_list(
    bin: &str,
    values: Vec<Value>,
    return_type: ReturnType,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        value_list: Some(values),
        return_type: Some(return_type),
        inverted: Some(inverted),
        ctx,
        ..Operation::new(OpCode::LIST_REMOVE_BY_VALUE_LIST, bin)
    }
}

/// Create a list remove by value range operation.
///
/// Removal counterpart of [`get_by_value_range`], same selection rules.
pub fn remove_by_value_range(
    bin: &str,
    return_type: ReturnType,
    begin: Option<Value>,
    end: Option<Value>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    Operation {
        return_type: Some(return_type),
        inverted: Some(inverted),
        value_begin: begin,
        value_end: end,
        ctx,
        ..Operation::new(OpCode::LIST_REMOVE_BY_VALUE_RANGE, bin)
    }
}

/// Create a list set order operation, giving the list bin the requested
/// ordering mode.
pub fn set_order(bin: &str, order: ListOrder, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        list_order: Some(order),
        ctx,
        ..Operation::new(OpCode::LIST_SET_ORDER, bin)
    }
}

/// Create a list sort operation.
///
/// Pass [`ListSortFlags::DEFAULT`] for a plain ascending sort.
pub fn sort(bin: &str, sort_flags: ListSortFlags, ctx: Option<Vec<CdtContext>>) -> Operation {
    Operation {
        sort_flags: Some(sort_flags),
        ctx,
        ..Operation::new(OpCode::LIST_SORT, bin)
    }
}

/// Create a list get by value relative rank range operation.
///
/// The server finds the item nearest to `value`, then selects items whose
/// rank is at least `rank(found) + offset`, either `count` of them or
/// everything above when `count` is `None`.
///
/// For the ordered list `[0, 4, 5, 9, 11, 15]`:
///
/// ```text
/// (value, offset, count) -> selected items
/// (5,  0, None) -> [5, 9, 11, 15]
/// (5,  0, 2)    -> [5, 9]
/// (5, -1, None) -> [4, 5, 9, 11, 15]
/// (5, -1, 3)    -> [4, 5, 9]
/// (3,  3, None) -> [11, 15]
/// (3, -3, None) -> [0, 4, 5, 9, 11, 15]
/// (3,  0, None) -> [4, 5, 9, 11, 15]
/// ```
pub fn get_by_value_rank_range_relative(
    bin: &str,
    value: impl Into<Value>,
    offset: i64,
    return_type: ReturnType,
    count: Option<i64>,
    inverted: bool,
    ctx: Option<Vec<CdtContext>>,
) -> Operation {
    // the relative offset travels under the rank key
    Operation {
        value: Some(value.into()),
        rank: Some(offset),
        return_type: Some(return_type),
        inverted: Some(inverted),
        count,
        ctx,
        ..Operation::new(OpCode::LIST_GET_BY_VALUE_RANK_RANGE_REL, bin)
    }
}

/// Create a list remove by value relative rank range operation.
///
/// Removal counterpart of [`get_by_value_rank_range_relative`]; the selected
/// items are removed and returned.
pub fn remove_by_value_rank_range_relative(
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
        inverted: Some(inverted),
        count,
        ctx,
        ..Operation::new(OpCode::LIST_REMOVE_BY_VALUE_RANK_RANGE_REL, bin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx;
    use serde_json::json;

    #[test]
    fn test_append_minimal_shape() {
        let op = append("l", "a", None, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized, json!({"op": 1001, "bin": "l", "val": "a"}));
    }

    #[test]
    fn test_append_with_policy_and_ctx() {
        let policy = ListPolicy::new(ListOrder::ORDERED, ListWriteFlags::ADD_UNIQUE);
        let op = append("l", 7, Some(policy), Some(vec![ctx::map_key("inner")]));
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({
                "op": 1001,
                "bin": "l",
                "val": 7,
                "list_policy": {"list_order": 1, "write_flags": 1},
                "ctx": [{"id": 0x22, "val": "inner"}]
            })
        );
    }

    #[test]
    fn test_write_flags_compose_with_bitor() {
        let flags = ListWriteFlags::NO_FAIL | ListWriteFlags::PARTIAL;
        assert_eq!(flags, ListWriteFlags(12));
    }

    #[test]
    fn test_pop_range_count_travels_under_val() {
        let op = pop_range("l", 2, 3, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({"op": 1006, "bin": "l", "index": 2, "val": 3})
        );
    }

    #[test]
    fn test_insert_items_wraps_values_in_a_list() {
        let op = insert_items("l", 0, vec![json!(1), json!("b")], None, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({"op": 1004, "bin": "l", "index": 0, "val": [1, "b"]})
        );
    }

    #[test]
    fn test_get_by_index_range_keeps_inverted_false_and_omits_count() {
        let op = get_by_index_range("l", 1, ReturnType::VALUE, None, false, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({
                "op": 1017,
                "bin": "l",
                "index": 1,
                "return_type": 7,
                "inverted": false
            })
        );
    }

    #[test]
    fn test_get_by_index_range_with_count() {
        let op = get_by_index_range("l", 1, ReturnType::COUNT, Some(4), true, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized["count"], json!(4));
        assert_eq!(serialized["inverted"], json!(true));
    }

    #[test]
    fn test_get_by_value_range_with_open_end() {
        let op = get_by_value_range("l", ReturnType::VALUE, Some(json!(3)), None, false, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized["value_begin"], json!(3));
        assert!(serialized.get("value_end").is_none());
    }

    #[test]
    fn test_remove_by_value_list_shape() {
        let op = remove_by_value_list("l", vec![json!(1), json!(2)], ReturnType::COUNT, false, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({
                "op": 1028,
                "bin": "l",
                "value_list": [1, 2],
                "return_type": 5,
                "inverted": false
            })
        );
    }

    #[test]
    fn test_set_order_and_sort_shapes() {
        let order_op = set_order("l", ListOrder::ORDERED, None);
        let serialized = serde_json::to_value(&order_op).unwrap();
        assert_eq!(serialized, json!({"op": 1030, "bin": "l", "list_order": 1}));

        let sort_op = sort("l", ListSortFlags::DEFAULT, None);
        let serialized = serde_json::to_value(&sort_op).unwrap();
        assert_eq!(serialized, json!({"op": 1031, "bin": "l", "sort_flags": 0}));
    }

    #[test]
    fn test_relative_rank_range_offset_travels_under_rank() {
        let op = get_by_value_rank_range_relative("l", 5, -1, ReturnType::VALUE, Some(3), false, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({
                "op": 1032,
                "bin": "l",
                "val": 5,
                "rank": -1,
                "count": 3,
                "return_type": 7,
                "inverted": false
            })
        );
    }

    #[test]
    fn test_clear_and_size_carry_no_extra_keys() {
        for op in [clear("l", None), size("l", None)] {
            let serialized = serde_json::to_value(&op).unwrap();
            assert_eq!(serialized.as_object().unwrap().len(), 2);
        }
    }

    #[test]
    fn test_negative_count_is_passed_through() {
        // range checks belong to the server, not this layer
        let op = get_range("l", 0, -4, None);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized["val"], json!(-4));
    }
}
