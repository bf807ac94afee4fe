//! Name-keyed document model for persisting genomes.
//!
//! The packed arrays are an in-memory layout; documents refer to variation kinds by name and
//! are resolved against a catalog on load. Loading goes through the public mutation API, so
//! a loaded genome satisfies every store invariant.

use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::{
    core::{AffineCoeffs, Background, Coloration, Rgb, ViewParams},
    error::{GenomeError, GenomeResult},
};
use crate::genome::store::{AFFINE_STRIDE, COLOR_STRIDE, DEFAULT_COLOR_WEIGHT, DEFAULT_WEIGHT, Genome};
use crate::variation::catalog::VariationCatalog;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Serializable genome. Transform 0 is the final transform.
pub struct GenomeDoc {
    /// Camera placement.
    #[serde(default)]
    pub view: ViewParams,
    /// Tone-mapping parameters.
    #[serde(default)]
    pub coloration: Coloration,
    /// Background color.
    #[serde(default)]
    pub background: Background,
    /// Transforms in index order.
    #[serde(default)]
    pub transforms: Vec<TransformDoc>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One transform row.
pub struct TransformDoc {
    /// Selection weight.
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Color mix.
    #[serde(default = "default_color_weight")]
    pub color_weight: f32,
    /// Transform color.
    #[serde(default = "Rgb::white")]
    pub color: Rgb,
    /// Affine applied before the variations.
    #[serde(default)]
    pub pre_affine: AffineCoeffs,
    /// Affine applied after the variations.
    #[serde(default)]
    pub post_affine: AffineCoeffs,
    /// Referenced variations. An empty list means none, not the identity kind.
    #[serde(default)]
    pub variations: Vec<VariationDoc>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One (transform, kind) usage.
pub struct VariationDoc {
    /// Kind name, resolved against the loading catalog.
    pub name: String,
    /// Blend coefficient.
    #[serde(default = "default_coef")]
    pub coef: f32,
    /// Parameter values by name; omitted names take the kind's defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f32>,
}

fn default_weight() -> f32 {
    DEFAULT_WEIGHT
}

fn default_color_weight() -> f32 {
    DEFAULT_COLOR_WEIGHT
}

fn default_coef() -> f32 {
    1.0
}

impl Genome {
    /// Snapshot into the document model.
    pub fn to_doc(&self) -> GenomeDoc {
        let v = self.active.len();
        let p = self.param_width;

        let transforms = (0..self.transform_count)
            .map(|t| {
                let mut variations = Vec::new();
                let mut offset = 0;
                for (column, kind) in self.active.iter().enumerate() {
                    let n = kind.param_count();
                    if self.has_variation[t * v + column] {
                        let start = t * p + offset;
                        variations.push(VariationDoc {
                            name: kind.name().to_string(),
                            coef: self.variation_coef[t * v + column],
                            params: kind
                                .param_names()
                                .iter()
                                .cloned()
                                .zip(self.param_value[start..start + n].iter().copied())
                                .collect(),
                        });
                    }
                    offset += n;
                }

                let c = &self.color[t * COLOR_STRIDE..(t + 1) * COLOR_STRIDE];
                TransformDoc {
                    weight: self.weight[t],
                    color_weight: self.color_weight[t],
                    color: Rgb::new(c[0], c[1], c[2]),
                    pre_affine: affine_row(&self.affine_pre, t),
                    post_affine: affine_row(&self.affine_post, t),
                    variations,
                }
            })
            .collect();

        GenomeDoc {
            view: self.view,
            coloration: self.coloration,
            background: self.background,
            transforms,
        }
    }

    /// Build a genome from `doc`, resolving kind names in `catalog`.
    ///
    /// Unknown kind or parameter names fail with [`GenomeError::SchemaMismatch`]; a kind
    /// listed twice on one transform fails with [`GenomeError::DuplicateName`]; out-of-domain
    /// values fail with [`GenomeError::RangeViolation`].
    #[tracing::instrument(skip(doc, catalog), fields(transforms = doc.transforms.len()))]
    pub fn from_doc(doc: &GenomeDoc, catalog: &VariationCatalog) -> GenomeResult<Genome> {
        let mut g = Genome::with_catalog(catalog);
        g.set_view(doc.view)?;
        g.set_coloration(doc.coloration)?;
        g.set_background(doc.background)?;

        for (index, td) in doc.transforms.iter().enumerate() {
            let t = g.add_transform()?;
            t.set_weight(&mut g, td.weight)?;
            t.set_color_weight(&mut g, td.color_weight)?;
            t.color().set(&mut g, td.color)?;
            t.pre_affine().set(&mut g, td.pre_affine)?;
            t.post_affine().set(&mut g, td.post_affine)?;

            let mut seen = BTreeSet::new();
            for vd in &td.variations {
                if !seen.insert(vd.name.as_str()) {
                    return Err(GenomeError::duplicate(format!(
                        "transform {index} lists variation '{}' twice",
                        vd.name
                    )));
                }
                let kind = catalog.get(&vd.name).ok_or_else(|| {
                    GenomeError::schema(format!("unknown variation '{}'", vd.name))
                })?;
                let usage = t.attach(&mut g, kind)?;
                usage.set_coef(&mut g, vd.coef)?;
                for (name, &value) in &vd.params {
                    usage.set_param(&mut g, name, value)?;
                }
            }

            if let Some(identity) = catalog.identity() {
                if !seen.contains(identity.name()) {
                    t.detach(&mut g, identity)?;
                }
            }
        }
        Ok(g)
    }

    /// Pretty-printed JSON form of [`Self::to_doc`].
    pub fn to_json(&self) -> GenomeResult<String> {
        serde_json::to_string_pretty(&self.to_doc()).map_err(|e| GenomeError::serde(e.to_string()))
    }

    /// Parse JSON and load it with [`Self::from_doc`].
    pub fn from_json(json: &str, catalog: &VariationCatalog) -> GenomeResult<Genome> {
        let doc: GenomeDoc =
            serde_json::from_str(json).map_err(|e| GenomeError::serde(e.to_string()))?;
        Self::from_doc(&doc, catalog)
    }
}

fn affine_row(buf: &[f32], t: usize) -> AffineCoeffs {
    let mut out = [0.0; AFFINE_STRIDE];
    out.copy_from_slice(&buf[t * AFFINE_STRIDE..(t + 1) * AFFINE_STRIDE]);
    AffineCoeffs(out)
}

#[cfg(test)]
#[path = "../../tests/unit/genome/doc.rs"]
mod tests;
