use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    sync::{
        Arc,
        atomic::{self, AtomicU64},
    },
};

use crate::foundation::{
    core::{AffineCoeffs, Point},
    error::{GenomeError, GenomeResult},
};

/// Evaluation capability attached to a variation kind at registration time.
///
/// Arguments are the input point, the variation coefficient, the kind's parameter values (in
/// schema order), and the owning transform's pre-affine coefficients.
pub type VariationFn = Arc<dyn Fn(Point, f32, &[f32], &AffineCoeffs) -> Point + Send + Sync>;

/// Process-unique catalog identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogId(u64);

static NEXT_CATALOG_ID: AtomicU64 = AtomicU64::new(1);

/// A named nonlinear point-transformation family with an ordered parameter schema.
pub struct VariationKind {
    name: String,
    param_names: Vec<String>, // sorted
    param_defaults: Vec<f32>, // parallel to param_names
    catalog: CatalogId,
    index: u32,
    apply: VariationFn,
}

impl VariationKind {
    /// Unique name; also the canonical sort key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of parameters in the schema.
    pub fn param_count(&self) -> usize {
        self.param_names.len()
    }

    /// Parameter names, sorted.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Default values, parallel to [`Self::param_names`].
    pub fn param_defaults(&self) -> &[f32] {
        &self.param_defaults
    }

    /// Rank of `name` within this kind's schema.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.param_names
            .binary_search_by(|p| p.as_str().cmp(name))
            .ok()
    }

    /// Catalog that issued this kind.
    pub fn catalog_id(&self) -> CatalogId {
        self.catalog
    }

    /// Evaluate the variation for one point.
    pub fn apply(&self, p: Point, coef: f32, params: &[f32], pre: &AffineCoeffs) -> Point {
        (self.apply)(p, coef, params, pre)
    }
}

/// Shared, catalog-issued reference to a [`VariationKind`].
///
/// Equality and hashing use catalog identity, never the name. Ordering is by name so column
/// order is reproducible; identity only breaks ties between same-named kinds.
#[derive(Clone)]
pub struct KindRef(Arc<VariationKind>);

impl Deref for KindRef {
    type Target = VariationKind;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl KindRef {
    fn identity_key(&self) -> (CatalogId, u32) {
        (self.0.catalog, self.0.index)
    }
}

impl PartialEq for KindRef {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for KindRef {}

impl Hash for KindRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}

impl PartialOrd for KindRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KindRef {
    fn cmp(&self, other: &Self) -> Ordering {
        VariationCatalog::compare(self, other)
            .then_with(|| self.identity_key().cmp(&other.identity_key()))
    }
}

impl fmt::Debug for KindRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindRef")
            .field("name", &self.0.name)
            .field("params", &self.0.param_names)
            .field("catalog", &self.0.catalog)
            .finish()
    }
}

/// Registry of variation kinds with unique names.
pub struct VariationCatalog {
    id: CatalogId,
    kinds: Vec<KindRef>,
    by_name: BTreeMap<String, usize>,
    identity: Option<KindRef>,
}

impl Default for VariationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VariationCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariationCatalog")
            .field("id", &self.id)
            .field("kinds", &self.by_name.keys().collect::<Vec<_>>())
            .field("identity", &self.identity.as_ref().map(|k| k.name()))
            .finish()
    }
}

impl VariationCatalog {
    /// Create an empty catalog with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: CatalogId(NEXT_CATALOG_ID.fetch_add(1, atomic::Ordering::Relaxed)),
            kinds: Vec::new(),
            by_name: BTreeMap::new(),
            identity: None,
        }
    }

    /// This catalog's identity.
    pub fn id(&self) -> CatalogId {
        self.id
    }

    /// Canonical order over kinds: lexicographic by name.
    pub fn compare(a: &KindRef, b: &KindRef) -> Ordering {
        a.name().cmp(b.name())
    }

    /// Register a kind. `defaults` fixes the schema; its key order (sorted) is the
    /// parameter order for the lifetime of the kind.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        defaults: BTreeMap<String, f32>,
        apply: F,
    ) -> GenomeResult<KindRef>
    where
        F: Fn(Point, f32, &[f32], &AffineCoeffs) -> Point + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GenomeError::schema("variation name must be non-empty"));
        }
        if self.by_name.contains_key(&name) {
            return Err(GenomeError::duplicate(format!(
                "variation '{name}' is already registered"
            )));
        }
        for (param, &value) in &defaults {
            if param.trim().is_empty() {
                return Err(GenomeError::schema(format!(
                    "variation '{name}' has an empty parameter name"
                )));
            }
            if !value.is_finite() {
                return Err(GenomeError::range(format!(
                    "default for '{name}.{param}' must be finite, got {value}"
                )));
            }
        }

        let index = u32::try_from(self.kinds.len())
            .map_err(|_| GenomeError::invalid_index("catalog is full"))?;
        let (param_names, param_defaults): (Vec<String>, Vec<f32>) =
            defaults.into_iter().unzip();
        let kind = KindRef(Arc::new(VariationKind {
            name: name.clone(),
            param_names,
            param_defaults,
            catalog: self.id,
            index,
            apply: Arc::new(apply),
        }));

        self.by_name.insert(name, self.kinds.len());
        self.kinds.push(kind.clone());
        Ok(kind)
    }

    /// Designate the kind auto-attached to every new transform.
    pub fn set_identity(&mut self, name: &str) -> GenomeResult<KindRef> {
        let kind = self
            .get(name)
            .cloned()
            .ok_or_else(|| GenomeError::schema(format!("unknown variation '{name}'")))?;
        self.identity = Some(kind.clone());
        Ok(kind)
    }

    /// The designated identity kind, if any.
    pub fn identity(&self) -> Option<&KindRef> {
        self.identity.as_ref()
    }

    /// Look up a kind by name.
    pub fn get(&self, name: &str) -> Option<&KindRef> {
        self.by_name.get(name).map(|&i| &self.kinds[i])
    }

    /// Whether `kind` was issued by this catalog.
    pub fn contains(&self, kind: &KindRef) -> bool {
        kind.catalog_id() == self.id
    }

    /// All kinds in name order.
    pub fn iter(&self) -> impl Iterator<Item = &KindRef> {
        self.by_name.values().map(|&i| &self.kinds[i])
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variation/catalog.rs"]
mod tests;
