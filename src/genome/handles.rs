//! Index-bound views over a [`Genome`].
//!
//! Handles hold indices, never references, so they survive structural mutation. Every
//! accessor re-reads the packed arrays and fails with [`GenomeError::InvalidIndex`] once the
//! referenced row or column is gone; `is_valid` checks the same condition up front.

use std::collections::BTreeMap;

use crate::foundation::{
    core::{AffineCoeffs, Point, Rgb, ensure_finite, ensure_non_negative, ensure_unit},
    error::{GenomeError, GenomeResult},
};
use crate::genome::store::{AFFINE_STRIDE, COLOR_STRIDE, Genome};
use crate::variation::catalog::KindRef;

/// View of one transform row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformHandle {
    index: usize,
}

impl TransformHandle {
    pub(crate) fn new(index: usize) -> Self {
        Self { index }
    }

    /// Row index.
    pub fn index(self) -> usize {
        self.index
    }

    /// Whether this is the final transform.
    pub fn is_final(self) -> bool {
        self.index == 0
    }

    /// Whether the row still exists in `genome`.
    pub fn is_valid(self, genome: &Genome) -> bool {
        self.index < genome.transform_count
    }

    /// Selection weight.
    pub fn weight(self, genome: &Genome) -> GenomeResult<f32> {
        genome.ensure_transform(self.index)?;
        Ok(genome.weight[self.index])
    }

    /// Set the selection weight (finite, >= 0).
    pub fn set_weight(self, genome: &mut Genome, weight: f32) -> GenomeResult<()> {
        genome.ensure_transform(self.index)?;
        genome.weight[self.index] = ensure_non_negative("weight", weight)?;
        Ok(())
    }

    /// How strongly this transform pulls the running color toward its own, `[0, 1]`.
    pub fn color_weight(self, genome: &Genome) -> GenomeResult<f32> {
        genome.ensure_transform(self.index)?;
        Ok(genome.color_weight[self.index])
    }

    /// Set the color weight (`[0, 1]`).
    pub fn set_color_weight(self, genome: &mut Genome, color_weight: f32) -> GenomeResult<()> {
        genome.ensure_transform(self.index)?;
        genome.color_weight[self.index] = ensure_unit("color_weight", color_weight)?;
        Ok(())
    }

    /// Color view.
    pub fn color(self) -> ColorHandle {
        ColorHandle {
            transform: self.index,
        }
    }

    /// Pre-affine view (applied before the variations).
    pub fn pre_affine(self) -> AffineHandle {
        AffineHandle {
            transform: self.index,
            slot: AffineSlot::Pre,
        }
    }

    /// Post-affine view (applied after the variations).
    pub fn post_affine(self) -> AffineHandle {
        AffineHandle {
            transform: self.index,
            slot: AffineSlot::Post,
        }
    }

    /// Attach `kind`; see [`Genome::attach_variation`].
    pub fn attach(self, genome: &mut Genome, kind: &KindRef) -> GenomeResult<VariationUsageHandle> {
        genome.attach_variation(self.index, kind)
    }

    /// Detach `kind`; see [`Genome::detach_variation`].
    pub fn detach(self, genome: &mut Genome, kind: &KindRef) -> GenomeResult<bool> {
        genome.detach_variation(self.index, kind)
    }

    /// Usage view for `kind`, if this transform references it.
    pub fn variation(self, genome: &Genome, kind: &KindRef) -> Option<VariationUsageHandle> {
        genome
            .uses_variation(self.index, kind)
            .then(|| VariationUsageHandle::new(self.index, kind.clone()))
    }

    /// Usage views for every kind this transform references, in column order.
    pub fn variations(self, genome: &Genome) -> GenomeResult<Vec<VariationUsageHandle>> {
        let row = genome.variation_row(self.index)?;
        Ok(genome
            .active
            .iter()
            .zip(row)
            .filter(|&(_, &has)| has)
            .map(|(k, _)| VariationUsageHandle::new(self.index, k.clone()))
            .collect())
    }
}

/// View of one transform's RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorHandle {
    transform: usize,
}

impl ColorHandle {
    /// Owning transform.
    pub fn transform(self) -> TransformHandle {
        TransformHandle::new(self.transform)
    }

    /// Whether the owning row still exists.
    pub fn is_valid(self, genome: &Genome) -> bool {
        self.transform < genome.transform_count
    }

    /// Current color.
    pub fn get(self, genome: &Genome) -> GenomeResult<Rgb> {
        genome.ensure_transform(self.transform)?;
        let s = self.transform * COLOR_STRIDE;
        let c = &genome.color[s..s + COLOR_STRIDE];
        Ok(Rgb::new(c[0], c[1], c[2]))
    }

    /// Replace the color; every channel must be in `[0, 1]`.
    pub fn set(self, genome: &mut Genome, rgb: Rgb) -> GenomeResult<()> {
        genome.ensure_transform(self.transform)?;
        rgb.validate()?;
        let s = self.transform * COLOR_STRIDE;
        genome.color[s..s + COLOR_STRIDE].copy_from_slice(&rgb.to_array());
        Ok(())
    }
}

/// Which of a transform's two affines a handle addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AffineSlot {
    /// Applied to the input point before the variations.
    Pre,
    /// Applied to the variations' summed output.
    Post,
}

/// View of one transform's pre or post affine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AffineHandle {
    transform: usize,
    slot: AffineSlot,
}

impl AffineHandle {
    /// Owning transform.
    pub fn transform(self) -> TransformHandle {
        TransformHandle::new(self.transform)
    }

    /// Pre or post.
    pub fn slot(self) -> AffineSlot {
        self.slot
    }

    /// Whether the owning row still exists.
    pub fn is_valid(self, genome: &Genome) -> bool {
        self.transform < genome.transform_count
    }

    fn column(self, genome: &Genome) -> &[f32] {
        match self.slot {
            AffineSlot::Pre => &genome.affine_pre,
            AffineSlot::Post => &genome.affine_post,
        }
    }

    fn column_mut(self, genome: &mut Genome) -> &mut [f32] {
        match self.slot {
            AffineSlot::Pre => &mut genome.affine_pre,
            AffineSlot::Post => &mut genome.affine_post,
        }
    }

    /// Current coefficients.
    pub fn get(self, genome: &Genome) -> GenomeResult<AffineCoeffs> {
        genome.ensure_transform(self.transform)?;
        let s = self.transform * AFFINE_STRIDE;
        let mut out = [0.0; AFFINE_STRIDE];
        out.copy_from_slice(&self.column(genome)[s..s + AFFINE_STRIDE]);
        Ok(AffineCoeffs(out))
    }

    /// Replace all six coefficients (each must be finite).
    pub fn set(self, genome: &mut Genome, coeffs: AffineCoeffs) -> GenomeResult<()> {
        genome.ensure_transform(self.transform)?;
        coeffs.validate()?;
        let s = self.transform * AFFINE_STRIDE;
        self.column_mut(genome)[s..s + AFFINE_STRIDE].copy_from_slice(&coeffs.0);
        Ok(())
    }

    /// Replace one coefficient, `i` in `0..6` (kurbo order `a b c d e f`).
    pub fn set_coeff(self, genome: &mut Genome, i: usize, value: f32) -> GenomeResult<()> {
        genome.ensure_transform(self.transform)?;
        if i >= AFFINE_STRIDE {
            return Err(GenomeError::invalid_index(format!(
                "affine coefficient {i} out of range"
            )));
        }
        let value = ensure_finite("affine coefficient", value)?;
        let s = self.transform * AFFINE_STRIDE;
        self.column_mut(genome)[s + i] = value;
        Ok(())
    }

    /// Map a point through the current coefficients.
    pub fn apply(self, genome: &Genome, p: Point) -> GenomeResult<Point> {
        Ok(self.get(genome)?.apply(p))
    }
}

/// View of one (transform, variation kind) usage.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariationUsageHandle {
    transform: usize,
    kind: KindRef,
}

impl VariationUsageHandle {
    pub(crate) fn new(transform: usize, kind: KindRef) -> Self {
        Self { transform, kind }
    }

    /// Owning transform.
    pub fn transform(&self) -> TransformHandle {
        TransformHandle::new(self.transform)
    }

    /// Variation kind.
    pub fn kind(&self) -> &KindRef {
        &self.kind
    }

    /// Whether the row exists, the kind is active, and the row still references it.
    pub fn is_valid(&self, genome: &Genome) -> bool {
        genome.uses_variation(self.transform, &self.kind)
    }

    // (coefficient cell, first parameter cell)
    fn cells(&self, genome: &Genome) -> GenomeResult<(usize, usize)> {
        genome.ensure_transform(self.transform)?;
        let (column, offset) = genome.locate(&self.kind).ok_or_else(|| {
            GenomeError::invalid_index(format!(
                "variation '{}' is no longer active",
                self.kind.name()
            ))
        })?;
        let cell = self.transform * genome.active.len() + column;
        if !genome.has_variation[cell] {
            return Err(GenomeError::invalid_index(format!(
                "transform {} no longer uses variation '{}'",
                self.transform,
                self.kind.name()
            )));
        }
        Ok((cell, self.transform * genome.param_width + offset))
    }

    /// Blend coefficient.
    pub fn coef(&self, genome: &Genome) -> GenomeResult<f32> {
        let (cell, _) = self.cells(genome)?;
        Ok(genome.variation_coef[cell])
    }

    /// Set the blend coefficient (finite).
    pub fn set_coef(&self, genome: &mut Genome, coef: f32) -> GenomeResult<()> {
        let (cell, _) = self.cells(genome)?;
        genome.variation_coef[cell] = ensure_finite("variation coefficient", coef)?;
        Ok(())
    }

    /// Parameter values in schema order.
    pub fn params<'g>(&self, genome: &'g Genome) -> GenomeResult<&'g [f32]> {
        let (_, start) = self.cells(genome)?;
        Ok(&genome.param_value[start..start + self.kind.param_count()])
    }

    /// One parameter by name.
    pub fn param(&self, genome: &Genome, name: &str) -> GenomeResult<f32> {
        let i = self.param_rank(name)?;
        Ok(self.params(genome)?[i])
    }

    /// Set one parameter by name (finite).
    pub fn set_param(&self, genome: &mut Genome, name: &str, value: f32) -> GenomeResult<()> {
        let i = self.param_rank(name)?;
        let (_, start) = self.cells(genome)?;
        genome.param_value[start + i] = ensure_finite(name, value)?;
        Ok(())
    }

    /// Set every parameter at once. The key set must equal the kind's schema.
    pub fn set_params(
        &self,
        genome: &mut Genome,
        values: &BTreeMap<String, f32>,
    ) -> GenomeResult<()> {
        let names = self.kind.param_names();
        if values.len() != names.len() || !names.iter().all(|n| values.contains_key(n)) {
            return Err(GenomeError::schema(format!(
                "variation '{}' expects parameters {:?}, got {:?}",
                self.kind.name(),
                names,
                values.keys().collect::<Vec<_>>()
            )));
        }
        for (name, &value) in values {
            ensure_finite(name, value)?;
        }

        let (_, start) = self.cells(genome)?;
        // BTreeMap iterates sorted, matching schema order.
        for (i, &value) in values.values().enumerate() {
            genome.param_value[start + i] = value;
        }
        Ok(())
    }

    fn param_rank(&self, name: &str) -> GenomeResult<usize> {
        self.kind.param_index(name).ok_or_else(|| {
            GenomeError::schema(format!(
                "variation '{}' has no parameter '{name}'",
                self.kind.name()
            ))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/genome/handles.rs"]
mod tests;
