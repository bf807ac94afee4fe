use smallvec::SmallVec;

use crate::foundation::{
    core::{AffineCoeffs, Background, Coloration, Rgb, ViewParams},
    error::{GenomeError, GenomeResult},
};
use crate::genome::{
    columns::{grow_exact, insert_columns, remove_columns, remove_row},
    handles::{TransformHandle, VariationUsageHandle},
};
use crate::variation::{
    builtin::builtin_catalog,
    catalog::{KindRef, VariationCatalog},
};

pub(crate) const COLOR_STRIDE: usize = 3;
pub(crate) const AFFINE_STRIDE: usize = 6;

pub(crate) const DEFAULT_WEIGHT: f32 = 1.0;
pub(crate) const DEFAULT_COLOR_WEIGHT: f32 = 0.5;

#[derive(Clone, Debug)]
/// Columnar flame genome.
///
/// Per-transform data lives in dense row-major arrays: `weight[T]`, `color_weight[T]`,
/// `color[T*3]`, `affine_pre[T*6]`, `affine_post[T*6]`, `has_variation[T*V]`,
/// `variation_coef[T*V]` and `param_value[T*P]`, where `V` is the number of active
/// variation kinds and `P` the sum of their parameter counts. Column order follows the
/// active kinds sorted by name.
///
/// Transform 0, once added, is the final transform: it is never removed and its weight is
/// excluded from selection at export time.
///
/// Mutation is single-writer and synchronous. Share an [`crate::ExportSnapshot`] (or a
/// clone) with concurrent consumers instead of the genome itself.
pub struct Genome {
    pub(crate) identity: Option<KindRef>,
    pub(crate) transform_count: usize,
    pub(crate) active: Vec<KindRef>,
    pub(crate) param_width: usize,

    pub(crate) weight: Vec<f32>,
    pub(crate) color_weight: Vec<f32>,
    pub(crate) color: Vec<f32>,
    pub(crate) affine_pre: Vec<f32>,
    pub(crate) affine_post: Vec<f32>,
    pub(crate) has_variation: Vec<bool>,
    pub(crate) variation_coef: Vec<f32>,
    pub(crate) param_value: Vec<f32>,

    pub(crate) view: ViewParams,
    pub(crate) coloration: Coloration,
    pub(crate) background: Background,
}

impl Default for Genome {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Genome {
    /// Logical equality: same shape, same kinds (by identity), same values. Backing
    /// capacity and the auto-attached identity kind are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.transform_count == other.transform_count
            && self.active == other.active
            && self.param_width == other.param_width
            && self.weight == other.weight
            && self.color_weight == other.color_weight
            && self.color == other.color
            && self.affine_pre == other.affine_pre
            && self.affine_post == other.affine_post
            && self.has_variation == other.has_variation
            && self.variation_coef == other.variation_coef
            && self.param_value == other.param_value
            && self.view == other.view
            && self.coloration == other.coloration
            && self.background == other.background
    }
}

impl Genome {
    /// Empty genome whose transforms start with the built-in `linear` variation.
    pub fn new() -> Self {
        Self::with_catalog(builtin_catalog())
    }

    /// Empty genome whose transforms start with `catalog`'s identity kind (if designated).
    pub fn with_catalog(catalog: &VariationCatalog) -> Self {
        Self::empty(catalog.identity().cloned())
    }

    pub(crate) fn empty(identity: Option<KindRef>) -> Self {
        Self {
            identity,
            transform_count: 0,
            active: Vec::new(),
            param_width: 0,
            weight: Vec::new(),
            color_weight: Vec::new(),
            color: Vec::new(),
            affine_pre: Vec::new(),
            affine_post: Vec::new(),
            has_variation: Vec::new(),
            variation_coef: Vec::new(),
            param_value: Vec::new(),
            view: ViewParams::default(),
            coloration: Coloration::default(),
            background: Background::default(),
        }
    }

    /// Kind auto-attached by [`Self::add_transform`].
    pub fn identity_kind(&self) -> Option<&KindRef> {
        self.identity.as_ref()
    }

    /// Number of transforms, including the final transform.
    pub fn transform_count(&self) -> usize {
        self.transform_count
    }

    /// Whether there are no transforms at all.
    pub fn is_empty(&self) -> bool {
        self.transform_count == 0
    }

    /// Number of active variation columns (`V`).
    pub fn variation_count(&self) -> usize {
        self.active.len()
    }

    /// Number of parameter columns (`P`).
    pub fn param_width(&self) -> usize {
        self.param_width
    }

    /// Kinds referenced by at least one transform, sorted by name.
    pub fn active_variations(&self) -> &[KindRef] {
        &self.active
    }

    /// Active kind with the given name.
    pub fn active_variation(&self, name: &str) -> Option<&KindRef> {
        self.active
            .binary_search_by(|k| k.name().cmp(name))
            .ok()
            .map(|i| &self.active[i])
    }

    /// Variation column of `kind`, if active.
    pub fn column_of(&self, kind: &KindRef) -> Option<usize> {
        self.active.iter().position(|k| k == kind)
    }

    /// First parameter column of `kind`, if active.
    pub fn param_offset_of(&self, kind: &KindRef) -> Option<usize> {
        self.locate(kind).map(|(_, offset)| offset)
    }

    // (column, parameter offset) in one scan.
    pub(crate) fn locate(&self, kind: &KindRef) -> Option<(usize, usize)> {
        let mut offset = 0;
        for (column, k) in self.active.iter().enumerate() {
            if k == kind {
                return Some((column, offset));
            }
            offset += k.param_count();
        }
        None
    }

    /// Whether transform `t` references `kind`.
    pub fn uses_variation(&self, t: usize, kind: &KindRef) -> bool {
        if t >= self.transform_count {
            return false;
        }
        self.column_of(kind)
            .is_some_and(|c| self.has_variation[t * self.active.len() + c])
    }

    /// Camera placement.
    pub fn view(&self) -> ViewParams {
        self.view
    }

    /// Replace the camera placement. Rotation is wrapped into `[0, 360)`; every other field
    /// must be in range or nothing is written.
    pub fn set_view(&mut self, view: ViewParams) -> GenomeResult<()> {
        let view = view.normalized();
        view.validate()?;
        self.view = view;
        Ok(())
    }

    /// Tone-mapping parameters.
    pub fn coloration(&self) -> Coloration {
        self.coloration
    }

    /// Replace tone-mapping parameters (all-or-nothing).
    pub fn set_coloration(&mut self, coloration: Coloration) -> GenomeResult<()> {
        coloration.validate()?;
        self.coloration = coloration;
        Ok(())
    }

    /// Background color.
    pub fn background(&self) -> Background {
        self.background
    }

    /// Replace the background color (all-or-nothing).
    pub fn set_background(&mut self, background: Background) -> GenomeResult<()> {
        background.validate()?;
        self.background = background;
        Ok(())
    }

    /// Handle for transform `index`, if it exists.
    pub fn transform(&self, index: usize) -> Option<TransformHandle> {
        (index < self.transform_count).then(|| TransformHandle::new(index))
    }

    /// The final transform (index 0), if it exists.
    pub fn final_transform(&self) -> Option<TransformHandle> {
        self.transform(0)
    }

    /// Handles for every transform in index order.
    pub fn transforms(&self) -> impl Iterator<Item = TransformHandle> + use<> {
        (0..self.transform_count).map(TransformHandle::new)
    }

    /// Raw per-transform weights (`T`).
    pub fn weights(&self) -> &[f32] {
        &self.weight
    }

    /// Raw per-transform color mix (`T`).
    pub fn color_weights(&self) -> &[f32] {
        &self.color_weight
    }

    /// Raw RGB triples (`T*3`).
    pub fn colors(&self) -> &[f32] {
        &self.color
    }

    /// Raw pre-affine coefficients (`T*6`).
    pub fn pre_affines(&self) -> &[f32] {
        &self.affine_pre
    }

    /// Raw post-affine coefficients (`T*6`).
    pub fn post_affines(&self) -> &[f32] {
        &self.affine_post
    }

    /// Raw presence flags (`T*V`).
    pub fn variation_presence(&self) -> &[bool] {
        &self.has_variation
    }

    /// Raw variation coefficients (`T*V`).
    pub fn variation_coefs(&self) -> &[f32] {
        &self.variation_coef
    }

    /// Raw parameter values (`T*P`).
    pub fn param_values(&self) -> &[f32] {
        &self.param_value
    }

    /// Presence flags of transform `t`.
    pub fn variation_row(&self, t: usize) -> GenomeResult<&[bool]> {
        self.ensure_transform(t)?;
        let v = self.active.len();
        Ok(&self.has_variation[t * v..(t + 1) * v])
    }

    /// Variation coefficients of transform `t`.
    pub fn coef_row(&self, t: usize) -> GenomeResult<&[f32]> {
        self.ensure_transform(t)?;
        let v = self.active.len();
        Ok(&self.variation_coef[t * v..(t + 1) * v])
    }

    /// Parameter values of transform `t`.
    pub fn param_row(&self, t: usize) -> GenomeResult<&[f32]> {
        self.ensure_transform(t)?;
        let p = self.param_width;
        Ok(&self.param_value[t * p..(t + 1) * p])
    }

    pub(crate) fn ensure_transform(&self, t: usize) -> GenomeResult<()> {
        if t >= self.transform_count {
            return Err(GenomeError::invalid_index(format!(
                "transform {t} out of range (count {})",
                self.transform_count
            )));
        }
        Ok(())
    }

    /// Append a transform: weight 1 (0 for the final transform), color weight 0.5, white,
    /// identity affines, then the identity variation kind attached with coefficient 1.
    pub fn add_transform(&mut self) -> GenomeResult<TransformHandle> {
        // Reject a same-named foreign identity kind before touching any array.
        if let Some(identity) = &self.identity {
            if self.column_of(identity).is_none() {
                self.insertion_rank(identity)?;
            }
        }

        let t = self.transform_count;
        let rows = t + 1;
        let v = self.active.len();

        grow_exact(&mut self.weight, rows);
        grow_exact(&mut self.color_weight, rows);
        grow_exact(&mut self.color, rows * COLOR_STRIDE);
        grow_exact(&mut self.affine_pre, rows * AFFINE_STRIDE);
        grow_exact(&mut self.affine_post, rows * AFFINE_STRIDE);
        grow_exact(&mut self.has_variation, rows * v);
        grow_exact(&mut self.variation_coef, rows * v);
        grow_exact(&mut self.param_value, rows * self.param_width);

        self.weight
            .push(if t == 0 { 0.0 } else { DEFAULT_WEIGHT });
        self.color_weight.push(DEFAULT_COLOR_WEIGHT);
        self.color.extend_from_slice(&Rgb::white().to_array());
        self.affine_pre.extend_from_slice(&AffineCoeffs::IDENTITY.0);
        self.affine_post.extend_from_slice(&AffineCoeffs::IDENTITY.0);
        self.has_variation.resize(rows * v, false);
        self.variation_coef.resize(rows * v, 0.0);
        for kind in &self.active {
            self.param_value.extend_from_slice(kind.param_defaults());
        }
        self.transform_count = rows;

        if let Some(identity) = self.identity.clone() {
            self.attach_variation(t, &identity)?;
        }
        Ok(TransformHandle::new(t))
    }

    /// Remove transform `index`, compacting later rows. Returns `false` for the final
    /// transform or an out-of-range index.
    pub fn remove_transform(&mut self, index: usize) -> bool {
        self.try_remove_transform(index).is_ok()
    }

    /// Like [`Self::remove_transform`] but reports why nothing was removed.
    pub fn try_remove_transform(&mut self, index: usize) -> GenomeResult<()> {
        if index == 0 {
            return Err(GenomeError::invalid_index(
                "the final transform cannot be removed",
            ));
        }
        self.ensure_transform(index)?;

        let v = self.active.len();
        let used: SmallVec<[KindRef; 4]> = self
            .active
            .iter()
            .enumerate()
            .filter(|&(c, _)| self.has_variation[index * v + c])
            .map(|(_, k)| k.clone())
            .collect();

        remove_row(&mut self.weight, index, 1);
        remove_row(&mut self.color_weight, index, 1);
        remove_row(&mut self.color, index, COLOR_STRIDE);
        remove_row(&mut self.affine_pre, index, AFFINE_STRIDE);
        remove_row(&mut self.affine_post, index, AFFINE_STRIDE);
        remove_row(&mut self.has_variation, index, v);
        remove_row(&mut self.variation_coef, index, v);
        remove_row(&mut self.param_value, index, self.param_width);
        self.transform_count -= 1;

        for kind in &used {
            if let Some(column) = self.column_of(kind) {
                if !self.column_referenced(column) {
                    self.evict_column(column);
                }
            }
        }
        Ok(())
    }

    /// Make transform `t` reference `kind` with coefficient 1 and default parameters.
    /// Inserts the kind's columns if it was not active. Idempotent: a second call leaves the
    /// existing coefficient and parameters alone.
    pub fn attach_variation(
        &mut self,
        t: usize,
        kind: &KindRef,
    ) -> GenomeResult<VariationUsageHandle> {
        self.ensure_transform(t)?;

        let column = match self.column_of(kind) {
            Some(column) => {
                if self.has_variation[t * self.active.len() + column] {
                    return Ok(VariationUsageHandle::new(t, kind.clone()));
                }
                column
            }
            None => self.insert_kind(kind)?,
        };

        let v = self.active.len();
        self.has_variation[t * v + column] = true;
        self.variation_coef[t * v + column] = 1.0;

        let offset: usize = self.active[..column]
            .iter()
            .map(|k| k.param_count())
            .sum();
        let start = t * self.param_width + offset;
        self.param_value[start..start + kind.param_count()]
            .copy_from_slice(kind.param_defaults());

        Ok(VariationUsageHandle::new(t, kind.clone()))
    }

    /// Stop transform `t` from referencing `kind`. Evicts the kind's columns when no
    /// transform references it anymore. Returns whether anything changed.
    ///
    /// Detaching a transform's last variation leaves it with none; the identity kind is
    /// only auto-attached by [`Self::add_transform`].
    pub fn detach_variation(&mut self, t: usize, kind: &KindRef) -> GenomeResult<bool> {
        self.ensure_transform(t)?;
        let Some(column) = self.column_of(kind) else {
            return Ok(false);
        };
        let cell = t * self.active.len() + column;
        if !self.has_variation[cell] {
            return Ok(false);
        }

        self.has_variation[cell] = false;
        self.variation_coef[cell] = 0.0;
        if self.column_referenced(column) {
            // Unused cells hold the kind's defaults.
            let offset: usize = self.active[..column]
                .iter()
                .map(|k| k.param_count())
                .sum();
            let start = t * self.param_width + offset;
            self.param_value[start..start + kind.param_count()]
                .copy_from_slice(kind.param_defaults());
        } else {
            self.evict_column(column);
        }
        Ok(true)
    }

    // Sorted rank for a kind that is not yet active.
    fn insertion_rank(&self, kind: &KindRef) -> GenomeResult<usize> {
        let rank = self.active.partition_point(|k| k.name() < kind.name());
        if let Some(existing) = self.active.get(rank) {
            if existing.name() == kind.name() && existing != kind {
                return Err(GenomeError::duplicate(format!(
                    "variation '{}' from another catalog is already active",
                    kind.name()
                )));
            }
        }
        Ok(rank)
    }

    fn insert_kind(&mut self, kind: &KindRef) -> GenomeResult<usize> {
        let rank = self.insertion_rank(kind)?;
        let offset: usize = self.active[..rank].iter().map(|k| k.param_count()).sum();
        let rows = self.transform_count;
        let v = self.active.len();
        let defaults = kind.param_defaults();

        insert_columns(&mut self.has_variation, rows, v, rank, 1, |_, _| false);
        insert_columns(&mut self.variation_coef, rows, v, rank, 1, |_, _| 0.0);
        insert_columns(
            &mut self.param_value,
            rows,
            self.param_width,
            offset,
            defaults.len(),
            |_, k| defaults[k],
        );
        self.param_width += defaults.len();
        self.active.insert(rank, kind.clone());

        tracing::debug!(
            kind = kind.name(),
            rank,
            columns = self.active.len(),
            params = self.param_width,
            "variation column inserted"
        );
        Ok(rank)
    }

    fn column_referenced(&self, column: usize) -> bool {
        let v = self.active.len();
        (0..self.transform_count).any(|t| self.has_variation[t * v + column])
    }

    fn evict_column(&mut self, column: usize) {
        let rows = self.transform_count;
        let v = self.active.len();
        let offset: usize = self.active[..column]
            .iter()
            .map(|k| k.param_count())
            .sum();
        let count = self.active[column].param_count();

        remove_columns(&mut self.has_variation, rows, v, column, 1);
        remove_columns(&mut self.variation_coef, rows, v, column, 1);
        remove_columns(&mut self.param_value, rows, self.param_width, offset, count);
        self.param_width -= count;
        let kind = self.active.remove(column);

        tracing::debug!(
            kind = kind.name(),
            column,
            columns = self.active.len(),
            params = self.param_width,
            "variation column evicted"
        );
    }

    /// Re-derive every structural invariant from scratch.
    pub fn check_invariants(&self) -> GenomeResult<()> {
        let t = self.transform_count;
        let v = self.active.len();
        let p = self.param_width;

        let expected: usize = self.active.iter().map(|k| k.param_count()).sum();
        if expected != p {
            return Err(GenomeError::schema(format!(
                "parameter width {p} does not match active schemas ({expected})"
            )));
        }

        let lengths = [
            ("weight", self.weight.len(), t),
            ("color_weight", self.color_weight.len(), t),
            ("color", self.color.len(), t * COLOR_STRIDE),
            ("affine_pre", self.affine_pre.len(), t * AFFINE_STRIDE),
            ("affine_post", self.affine_post.len(), t * AFFINE_STRIDE),
            ("has_variation", self.has_variation.len(), t * v),
            ("variation_coef", self.variation_coef.len(), t * v),
            ("param_value", self.param_value.len(), t * p),
        ];
        for (name, len, want) in lengths {
            if len != want {
                return Err(GenomeError::invalid_index(format!(
                    "{name} has {len} entries, expected {want}"
                )));
            }
        }

        if let Some(w) = self.active.windows(2).find(|w| w[0].name() >= w[1].name()) {
            return Err(GenomeError::schema(format!(
                "active variations out of order at '{}' / '{}'",
                w[0].name(),
                w[1].name()
            )));
        }

        for (i, (&has, &coef)) in self
            .has_variation
            .iter()
            .zip(&self.variation_coef)
            .enumerate()
        {
            if !has && coef != 0.0 {
                return Err(GenomeError::schema(format!(
                    "transform {} has coefficient {coef} for absent variation '{}'",
                    i / v,
                    self.active[i % v].name()
                )));
            }
        }

        for (column, kind) in self.active.iter().enumerate() {
            if !self.column_referenced(column) {
                return Err(GenomeError::schema(format!(
                    "variation '{}' is active but unreferenced",
                    kind.name()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/genome/store.rs"]
mod tests;
