/// Operation builders grouped by the kind of bin they address
///
/// Each builder assembles one [`crate::descriptor::Operation`] and returns
/// it; callers collect descriptors into the batch handed to an operate
/// call. Builders take the bin name first and an optional nested-context
/// path last (see [`crate::ctx`]), never touch the network, and never
/// validate argument ranges. A descriptor the server considers malformed (a
/// negative count, a key-flavored selector against a list bin) is sent
/// as-is and rejected at execution time.
///
/// `lists` and `maps` cover the container primitives, `record` the scalar
/// bin operations; all three produce the same descriptor type and mix
/// freely in one batch.

pub mod lists;
pub mod maps;
pub mod record;
