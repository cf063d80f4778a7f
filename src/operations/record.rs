use serde_json::Value;

use crate::descriptor::{OpCode, Operation};

/// Create a read operation returning the value of `bin`.
pub fn read(bin: &str) -> Operation {
    Operation::new(OpCode::READ, bin)
}

/// Create a write operation storing `value` in `bin`.
pub fn write(bin: &str, value: impl Into<Value>) -> Operation {
    Operation {
        value: Some(value.into()),
        ..Operation::new(OpCode::WRITE, bin)
    }
}

/// Create an append operation, extending the string or bytes in `bin`.
pub fn append(bin: &str, value: impl Into<Value>) -> Operation {
    Operation {
        value: Some(value.into()),
        ..Operation::new(OpCode::APPEND, bin)
    }
}

/// Create a prepend operation, prefixing the string or bytes in `bin`.
pub fn prepend(bin: &str, value: impl Into<Value>) -> Operation {
    Operation {
        value: Some(value.into()),
        ..Operation::new(OpCode::PREPEND, bin)
    }
}

/// Create an increment operation, adding `delta` to the number in `bin`.
pub fn increment(bin: &str, delta: impl Into<Value>) -> Operation {
    Operation {
        value: Some(delta.into()),
        ..Operation::new(OpCode::INCR, bin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_carries_only_op_and_bin() {
        let op = read("b");
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized, json!({"op": 1, "bin": "b"}));
    }

    #[test]
    fn test_write_and_increment_shapes() {
        let op = write("b", "hello");
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized, json!({"op": 2, "bin": "b", "val": "hello"}));

        let op = increment("b", 5);
        let serialized = serde_json::to_value(&op).unwrap();
        assert_eq!(serialized, json!({"op": 3, "bin": "b", "val": 5}));
    }

    #[test]
    fn test_scalar_ops_mix_with_container_ops_in_one_batch() {
        let batch = vec![
            write("b", 1),
            crate::operations::lists::append("l", 2, None, None),
            read("b"),
        ];
        let codes: Vec<u16> = batch.iter().map(|op| op.op.0).collect();
        assert_eq!(codes, vec![2, 1001, 1]);
    }
}
