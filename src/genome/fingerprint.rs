use std::fmt;

use xxhash_rust::xxh3::Xxh3;

use crate::genome::store::Genome;

const XXH3_SEED: u64 = 0x5f1a_3e9c_d02b_7741;

/// Stable 128-bit digest of a genome's logical contents.
///
/// Equal genomes fingerprint equally. Kinds contribute by name and schema, so the digest is
/// reproducible across processes and usable as a render-cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenomeFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl fmt::Display for GenomeFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

impl Genome {
    /// Digest of transforms, active schema, scalar groups and every packed value.
    pub fn fingerprint(&self) -> GenomeFingerprint {
        let mut h = StableHasher::new();

        h.write_len(self.transform_count);
        h.write_len(self.active.len());
        for kind in &self.active {
            h.write_str(kind.name());
            h.write_len(kind.param_count());
            for name in kind.param_names() {
                h.write_str(name);
            }
        }

        for buf in [
            &self.weight,
            &self.color_weight,
            &self.color,
            &self.affine_pre,
            &self.affine_post,
            &self.variation_coef,
            &self.param_value,
        ] {
            h.write_f32s(buf);
        }
        for &has in &self.has_variation {
            h.write_bool(has);
        }

        let view = self.view;
        h.write_f32s(&[view.translate_x, view.translate_y, view.rotation_deg, view.scale]);
        h.write_f32s(&self.coloration.to_array());
        h.write_f32s(&self.background.to_array());
        h.finish()
    }
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_len(&mut self, v: usize) {
        self.write_u64(v as u64);
    }

    fn write_str(&mut self, s: &str) {
        self.write_len(s.len());
        self.write_bytes(s.as_bytes());
    }

    // -0.0 hashes as 0.0 so the digest agrees with float equality.
    fn write_f32(&mut self, v: f32) {
        let bits = if v == 0.0 { 0 } else { v.to_bits() };
        self.write_bytes(&bits.to_le_bytes());
    }

    fn write_f32s(&mut self, vs: &[f32]) {
        self.write_len(vs.len());
        for &v in vs {
            self.write_f32(v);
        }
    }

    fn finish(self) -> GenomeFingerprint {
        let v = self.inner.digest128();
        GenomeFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/genome/fingerprint.rs"]
mod tests;
