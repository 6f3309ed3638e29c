/// Marker for types a World can store: owned and Send + Sync
pub trait Component: 'static + Send + Sync {}
