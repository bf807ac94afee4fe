//! Flamegenome is a columnar store for fractal-flame genomes.
//!
//! A genome is an ordered set of transforms (selection weight, color, pre/post affine) plus a
//! weighted blend of nonlinear variations per transform. Instead of one object per transform,
//! every per-transform quantity lives in a dense row-major array, so a render kernel can read
//! it without any pointer chasing.
//!
//! # Overview
//!
//! 1. **Catalog**: [`VariationCatalog`] registers variation kinds with an ordered parameter
//!    schema. [`builtin_catalog`] provides the classic set, with `linear` as identity kind.
//! 2. **Store**: [`Genome`] owns the packed arrays. Variation columns appear when a kind is
//!    first attached and disappear when nothing references it; columns stay sorted by name.
//! 3. **Handles**: [`TransformHandle`], [`AffineHandle`], [`ColorHandle`] and
//!    [`VariationUsageHandle`] are index values that read and write through a `&Genome`.
//! 4. **Interpolation**: [`lerp`] blends two genomes with different schemas.
//! 5. **Export**: [`Genome::export_snapshot`] flattens a genome into [`FlatBuffers`] for a
//!    render kernel.
//!
//! The design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **All-or-nothing mutation**: a failed call leaves the genome untouched.
//! - **Deterministic layout**: column order depends only on the set of active kind names.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod genome;
mod variation;

pub use foundation::core::{
    Affine, AffineCoeffs, Background, Coloration, Point, Rgb, Vec2, ViewParams,
};
pub use foundation::error::{GenomeError, GenomeResult};
pub use foundation::math::{Lerp, lerp_f32};
pub use genome::doc::{GenomeDoc, TransformDoc, VariationDoc};
pub use genome::export::{AFFINE_PAIR_STRIDE, ExportLayout, ExportSnapshot, FlatBuffers};
pub use genome::fingerprint::GenomeFingerprint;
pub use genome::handles::{
    AffineHandle, AffineSlot, ColorHandle, TransformHandle, VariationUsageHandle,
};
pub use genome::lerp::lerp;
pub use genome::presets::{barnsley_fern, heighway_dragon, sierpinski_triangle};
pub use genome::store::Genome;
pub use variation::builtin::{LINEAR, builtin, builtin_catalog};
pub use variation::catalog::{CatalogId, KindRef, VariationCatalog, VariationFn, VariationKind};
