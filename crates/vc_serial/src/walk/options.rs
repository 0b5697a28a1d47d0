/// Runtime settings of a [`Walker`](crate::walk::Walker).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Fail with [`ErrorKind::UnknownKey`](crate::error::ErrorKind::UnknownKey)
    /// when an input mapping has a key that matches no included field.
    ///
    /// Such keys are ignored by default.
    pub deny_unknown_keys: bool,
}

impl WalkOptions {
    /// Rejects unknown keys instead of ignoring them.
    #[inline]
    pub const fn deny_unknown_keys(mut self) -> Self {
        self.deny_unknown_keys = true;
        self
    }
}
