/// cdt-ops - Operation descriptor builders for record operate commands
///
/// This library provides typed builder functions that assemble the operation
/// descriptors consumed by a key-value client's `operate` and
/// `operate_ordered` calls. Each builder describes one server-side primitive
/// applied to a record bin (scalar, list, or map), packages its arguments
/// under the well-known descriptor keys, and returns the descriptor.
/// Serialization to the wire protocol and execution of the operation belong
/// to the client runtime and the server.

pub mod ctx;
pub mod descriptor;
pub mod operations;

// Re-export commonly used types
pub use ctx::CdtContext;
pub use descriptor::{OpCode, Operation, ReturnType};
pub use operations::lists::{ListOrder, ListPolicy, ListSortFlags, ListWriteFlags};
pub use operations::maps::{MapOrder, MapPolicy, MapWriteFlags};
