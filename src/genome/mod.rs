pub(crate) mod columns;
pub(crate) mod doc;
pub(crate) mod export;
pub(crate) mod fingerprint;
pub(crate) mod handles;
pub(crate) mod lerp;
pub(crate) mod presets;
pub(crate) mod store;
