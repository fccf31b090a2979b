use gammarpc_common::{validate_name, Result};

/// Opaque token for a remote function name resolved via
/// [`Client::find`](crate::Client::find).
///
/// Holds the resolved name (bounded at 1000 bytes on construction) and
/// nothing else; in particular it does not borrow from the client, so it can
/// outlive the connection that produced it and be used with a reconnected
/// client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    name: String,
}

impl Handle {
    /// Wraps a validated name. Only `find` constructs handles.
    pub(crate) fn new(name: &str) -> Result<Self> {
        validate_name(name)?;
        Ok(Handle {
            name: name.to_owned(),
        })
    }

    /// The resolved name, replayed on `CALL`.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}
