use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ctx::CdtContext;
use crate::operations::lists::{ListOrder, ListPolicy, ListSortFlags};
use crate::operations::maps::MapPolicy;

/// Code identifying which server-side primitive an operation runs.
///
/// Codes are opaque to this layer; the consuming runtime maps them onto the
/// wire protocol. Scalar record operations occupy the low block, list
/// operations the 1001+ block, and map operations the 1101+ block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpCode(pub u16);

impl OpCode {
    pub const READ: OpCode = OpCode(1);
    pub const WRITE: OpCode = OpCode(2);
    pub const INCR: OpCode = OpCode(3);
    pub const APPEND: OpCode = OpCode(4);
    pub const PREPEND: OpCode = OpCode(5);

    pub const LIST_APPEND: OpCode = OpCode(1001);
    pub const LIST_APPEND_ITEMS: OpCode = OpCode(1002);
    pub const LIST_INSERT: OpCode = OpCode(1003);
    pub const LIST_INSERT_ITEMS: OpCode = OpCode(1004);
    pub const LIST_POP: OpCode = OpCode(1005);
    pub const LIST_POP_RANGE: OpCode = OpCode(1006);
    pub const LIST_REMOVE: OpCode = OpCode(1007);
    pub const LIST_REMOVE_RANGE: OpCode = OpCode(1008);
    pub const LIST_CLEAR: OpCode = OpCode(1009);
    pub const LIST_SET: OpCode = OpCode(1010);
    pub const LIST_GET: OpCode = OpCode(1011);
    pub const LIST_GET_RANGE: OpCode = OpCode(1012);
    pub const LIST_TRIM: OpCode = OpCode(1013);
    pub const LIST_SIZE: OpCode = OpCode(1014);
    pub const LIST_INCREMENT: OpCode = OpCode(1015);
    pub const LIST_GET_BY_INDEX: OpCode = OpCode(1016);
    pub const LIST_GET_BY_INDEX_RANGE: OpCode = OpCode(1017);
    pub const LIST_GET_BY_RANK: OpCode = OpCode(1018);
    pub const LIST_GET_BY_RANK_RANGE: OpCode = OpCode(1019);
    pub const LIST_GET_BY_VALUE: OpCode = OpCode(1020);
    pub const LIST_GET_BY_VALUE_LIST: OpCode = OpCode(1021);
    pub const LIST_GET_BY_VALUE_RANGE: OpCode = OpCode(1022);
    pub const LIST_REMOVE_BY_INDEX: OpCode = OpCode(1023);
    pub const LIST_REMOVE_BY_INDEX_RANGE: OpCode = OpCode(1024);
    pub const LIST_REMOVE_BY_RANK: OpCode = OpCode(1025);
    pub const LIST_REMOVE_BY_RANK_RANGE: OpCode = OpCode(1026);
    pub const LIST_REMOVE_BY_VALUE: OpCode = OpCode(1027);
    pub const LIST_REMOVE_BY_VALUE_LIST: OpCode = OpCode(1028);
    pub const LIST_REMOVE_BY_VALUE_RANGE: OpCode = OpCode(1029);
    pub const LIST_SET_ORDER: OpCode = OpCode(1030);
    pub const LIST_SORT: OpCode = OpCode(1031);
    pub const LIST_GET_BY_VALUE_RANK_RANGE_REL: OpCode = OpCode(1032);
    pub const LIST_REMOVE_BY_VALUE_RANK_RANGE_REL: OpCode = OpCode(1033);

    pub const MAP_SET_POLICY: OpCode = OpCode(1101);
    pub const MAP_PUT: OpCode = OpCode(1102);
    pub const MAP_PUT_ITEMS: OpCode = OpCode(1103);
    pub const MAP_INCREMENT: OpCode = OpCode(1104);
    pub const MAP_DECREMENT: OpCode = OpCode(1105);
    pub const MAP_SIZE: OpCode = OpCode(1106);
    pub const MAP_CLEAR: OpCode = OpCode(1107);
    pub const MAP_REMOVE_BY_KEY: OpCode = OpCode(1108);
    pub const MAP_REMOVE_BY_KEY_LIST: OpCode = OpCode(1109);
    pub const MAP_REMOVE_BY_KEY_RANGE: OpCode = OpCode(1110);
    pub const MAP_REMOVE_BY_VALUE: OpCode = OpCode(1111);
    pub const MAP_REMOVE_BY_VALUE_LIST: OpCode = OpCode(1112);
    pub const MAP_REMOVE_BY_VALUE_RANGE: OpCode = OpCode(1113);
    pub const MAP_REMOVE_BY_INDEX: OpCode = OpCode(1114);
    pub const MAP_REMOVE_BY_INDEX_RANGE: OpCode = OpCode(1115);
    pub const MAP_REMOVE_BY_RANK: OpCode = OpCode(1116);
    pub const MAP_REMOVE_BY_RANK_RANGE: OpCode = OpCode(1117);
    pub const MAP_GET_BY_KEY: OpCode = OpCode(1118);
    pub const MAP_GET_BY_KEY_RANGE: OpCode = OpCode(1119);
    pub const MAP_GET_BY_KEY_LIST: OpCode = OpCode(1120);
    pub const MAP_GET_BY_VALUE: OpCode = OpCode(1121);
    pub const MAP_GET_BY_VALUE_RANGE: OpCode = OpCode(1122);
    pub const MAP_GET_BY_VALUE_LIST: OpCode = OpCode(1123);
    pub const MAP_GET_BY_INDEX: OpCode = OpCode(1124);
    pub const MAP_GET_BY_INDEX_RANGE: OpCode = OpCode(1125);
    pub const MAP_GET_BY_RANK: OpCode = OpCode(1126);
    pub const MAP_GET_BY_RANK_RANGE: OpCode = OpCode(1127);
    pub const MAP_REMOVE_BY_VALUE_RANK_RANGE_REL: OpCode = OpCode(1128);
    pub const MAP_GET_BY_VALUE_RANK_RANGE_REL: OpCode = OpCode(1129);
    pub const MAP_REMOVE_BY_KEY_INDEX_RANGE_REL: OpCode = OpCode(1130);
    pub const MAP_GET_BY_KEY_INDEX_RANGE_REL: OpCode = OpCode(1131);
}

/// Selector telling the server which representation to return from a
/// selection operation.
///
/// List and map selectors share one numeric namespace. Key-flavored
/// selectors sent against a list bin are not rejected here; the server
/// rejects them at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnType(pub u8);

impl ReturnType {
    /// Return nothing.
    pub const NONE: ReturnType = ReturnType(0);
    /// Index of the selected items, counted from the front.
    pub const INDEX: ReturnType = ReturnType(1);
    /// Index of the selected items, counted from the back.
    pub const REVERSE_INDEX: ReturnType = ReturnType(2);
    /// Rank of the selected items, lowest value first.
    pub const RANK: ReturnType = ReturnType(3);
    /// Rank of the selected items, highest value first.
    pub const REVERSE_RANK: ReturnType = ReturnType(4);
    /// Number of selected items.
    pub const COUNT: ReturnType = ReturnType(5);
    /// Keys of the selected map entries.
    pub const KEY: ReturnType = ReturnType(6);
    /// Values of the selected items.
    pub const VALUE: ReturnType = ReturnType(7);
    /// Key and value of the selected map entries.
    pub const KEY_VALUE: ReturnType = ReturnType(8);
    /// Whether anything was selected.
    pub const EXISTS: ReturnType = ReturnType(13);
}

/// A single operation descriptor, usable in an operate call.
///
/// The one record type every builder in this crate produces. Serialized, it
/// is a mapping from a fixed set of well-known keys to values, and that
/// layout is the contract with the client runtime that consumes it. `op` and
/// `bin` are always present. Every other field is written only when the
/// builder received the corresponding argument; omitted arguments are
/// omitted keys, never nulls.
///
/// Example (serialized form of a list append with a write policy):
/// ```json
/// {
///   "op": 1001,
///   "bin": "scores",
///   "val": 42,
///   "list_policy": {"list_order": 1, "write_flags": 0}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Which server-side primitive to run
    pub op: OpCode,
    /// Name of the bin the operation addresses
    pub bin: String,
    /// Map key, or key-range start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,
    /// Value payload; also carries counts and range bounds for the
    /// operations whose wire contract places them here
    #[serde(rename = "val", skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Signed index, or relative-index offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    /// Signed rank, or relative-rank offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    /// Window size for range selectors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    /// Start of a list value range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_begin: Option<Value>,
    /// End of a list value range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_end: Option<Value>,
    /// Candidate values for list-membership selectors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_list: Option<Vec<Value>>,
    /// End of a map key or value range
    #[serde(rename = "range", skip_serializing_if = "Option::is_none")]
    pub range_end: Option<Value>,
    /// What the server should return for selection operations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<ReturnType>,
    /// Select everything outside the described range instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverted: Option<bool>,
    /// Ordering mode for list set-order operations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_order: Option<ListOrder>,
    /// Flags for list sort operations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_flags: Option<ListSortFlags>,
    /// Write policy for list modifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_policy: Option<ListPolicy>,
    /// Write policy for map modifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_policy: Option<MapPolicy>,
    /// Path of context steps descending into a nested CDT
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Vec<CdtContext>>,
}

impl Operation {
    /// Create a descriptor carrying only the operation code and bin name.
    ///
    /// Builders start from this and fill in the fields their operation uses.
    pub fn new(op: OpCode, bin: &str) -> Self {
        Self {
            op,
            bin: bin.to_string(),
            key: None,
            value: None,
            index: None,
            rank: None,
            count: None,
            value_begin: None,
            value_end: None,
            value_list: None,
            range_end: None,
            return_type: None,
            inverted: None,
            list_order: None,
            sort_flags: None,
            list_policy: None,
            map_policy: None,
            ctx: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_descriptor_serializes_to_op_and_bin_only() {
        let op = Operation::new(OpCode::LIST_CLEAR, "l");
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized, json!({"op": 1009, "bin": "l"}));
    }

    #[test]
    fn test_codes_serialize_as_bare_integers() {
        assert_eq!(serde_json::to_value(OpCode::MAP_PUT).unwrap(), json!(1102));
        assert_eq!(serde_json::to_value(ReturnType::KEY_VALUE).unwrap(), json!(8));
    }

    #[test]
    fn test_supplied_fields_appear_under_their_wire_keys() {
        let mut op = Operation::new(OpCode::LIST_GET_BY_VALUE_RANGE, "l");
        op.return_type = Some(ReturnType::VALUE);
        op.inverted = Some(false);
        op.value_begin = Some(json!(1));
        op.value_end = Some(json!(10));
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(
            serialized,
            json!({
                "op": 1022,
                "bin": "l",
                "value_begin": 1,
                "value_end": 10,
                "return_type": 7,
                "inverted": false
            })
        );
    }

    #[test]
    fn test_roundtrip_preserves_descriptor() {
        let mut op = Operation::new(OpCode::MAP_GET_BY_KEY, "m");
        op.key = Some(json!("user"));
        op.return_type = Some(ReturnType::VALUE);
        let text = serde_json::to_string(&op).unwrap();
        let back: Operation = serde_json::from_str(&text).unwrap();
        assert_eq!(op, back);
    }
}
