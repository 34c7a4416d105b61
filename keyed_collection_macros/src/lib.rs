mod record;

use proc_macro::TokenStream;

/// Derive macro implementing `keyed_collection::Record` for a struct with
/// named fields.
///
/// Each field is exposed under its own name unless renamed. Field types must
/// implement `Serialize` and `DeserializeOwned`; `Option` fields accept a
/// missing body entry.
///
/// # Usage
///
/// ```ignore
/// #[derive(Debug, Record)]
/// struct Todo {
///     id: u64,
///     #[record(rename = "text")]
///     title: String,
///     done: Option<bool>,
///     #[record(skip)]
///     cached_len: usize,
/// }
/// ```
///
/// Field attributes:
/// - `rename = "name"`: body field name used for this struct field
/// - `skip`: never read from or written to bodies; built with `Default`
///
/// Body fields that name no struct field are ignored by `assign`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
