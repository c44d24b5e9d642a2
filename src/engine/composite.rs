//! Folding the ordered effect list into one output grid.

use crate::effect::{Blend, Effect};
use crate::grid::{Grid, BLACK};

impl Blend {
    /// Combine `layer` into the running composite `out`.
    pub fn apply(self, out: &mut Grid, layer: &Grid) {
        if self == Blend::Fill {
            *out = *layer;
            return;
        }

        for (out_row, layer_row) in out.rows_mut().iter_mut().zip(layer.rows()) {
            for (dst, &src) in out_row.iter_mut().zip(layer_row) {
                match self {
                    Blend::Add => {
                        for ch in 0..3 {
                            dst[ch] = (dst[ch] + src[ch]).min(1.0);
                        }
                    }
                    Blend::Multiply => {
                        for ch in 0..3 {
                            dst[ch] = (dst[ch] * src[ch]).min(1.0);
                        }
                    }
                    Blend::FillEmpty => {
                        if *dst == BLACK {
                            *dst = src;
                        }
                    }
                    Blend::FillNoZero => {
                        if src != BLACK {
                            *dst = src;
                        }
                    }
                    Blend::Fill => *dst = src,
                }
            }
        }
    }
}

/// Fold `effects` in order over a blank grid.
///
/// Multiply against the blank base stays blank; it only shows once an
/// earlier Add/Fill layer has written something.
pub fn composite<'a>(effects: impl IntoIterator<Item = &'a Effect>) -> Grid {
    let mut out = Grid::blank();
    for effect in effects {
        effect.blend().apply(&mut out, effect.colors());
    }
    out
}
