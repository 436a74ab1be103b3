//! Bounding boxes and the affine-matrix arithmetic used to compute a text
//! object's origin (§3, §4.2).
//!
//! `combine_matrix` is ported from the teacher's `matrix.rs`/`ctm.rs`
//! (`CurTransMat::combine_matrix`), which multiplies two PDF 6-element
//! affine matrices by embedding them in 4x4 homogeneous form. Everything
//! else there (the `CurTransMat`/`TextMatrix` enums, CSS serialization,
//! `cm`/`Tm` operator round-tripping) belonged to the writer side and has
//! no reader-side counterpart.

/// `{x_min, y_min, width, height}` with integer ceiling on construction
/// (§3). Derived: `x_max = x_min + width`, `x_center = ceil(x_min + width/2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct BoundingBox {
    pub x_min: i64,
    pub y_min: i64,
    pub width: i64,
    pub height: i64,
}

impl BoundingBox {
    /// Constructs from raw floats, applying ceiling as required by §3.
    pub fn new(x_min: f64, y_min: f64, width: f64, height: f64) -> Self {
        BoundingBox {
            x_min: x_min.ceil() as i64,
            y_min: y_min.ceil() as i64,
            width: width.ceil() as i64,
            height: height.ceil() as i64,
        }
    }

    pub fn x_max(&self) -> i64 {
        self.x_min + self.width
    }

    pub fn x_center(&self) -> i64 {
        ((self.x_min as f64) + (self.width as f64) / 2.0).ceil() as i64
    }
}

/// Multiplies two PDF 6-element affine matrices `[a, b, c, d, e, f]`
/// (representing the 3x3 matrix `[[a,b,0],[c,d,0],[e,f,1]]`) and returns
/// the product in the same 6-element form.
pub fn combine_matrix(a: [f64; 6], b: [f64; 6]) -> [f64; 6] {
    let a = [
        [a[0], a[1], 0.0, 0.0],
        [a[2], a[3], 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [a[4], a[5], 0.0, 1.0],
    ];
    let b = [
        [b[0], b[1], 0.0, 0.0],
        [b[2], b[3], 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [b[4], b[5], 0.0, 1.0],
    ];

    let mut result = [[0.0f64; 4]; 4];
    for (i, row) in result.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }

    [result[0][0], result[0][1], result[1][0], result[1][1], result[3][0], result[3][1]]
}

/// Computes a text object's origin as `tm · cm`, taking the translation row
/// (§4.2 "Origin computation").
pub fn text_origin(tm: [f64; 6], cm: [f64; 6]) -> (f64, f64) {
    let product = combine_matrix(tm, cm);
    (product[4], product[5])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_ceiling_and_derived_fields() {
        let bb = BoundingBox::new(10.2, 5.0, 20.4, 8.0);
        assert_eq!(bb.x_min, 11);
        assert_eq!(bb.width, 21);
        assert_eq!(bb.x_max(), 32);
        assert_eq!(bb.x_center(), ((11.0 + 21.0 / 2.0) as f64).ceil() as i64);
    }

    #[test]
    fn combine_identity_is_noop() {
        let identity = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let m = [2.0, 0.0, 0.0, 2.0, 5.0, 7.0];
        assert_eq!(combine_matrix(identity, m), m);
        assert_eq!(combine_matrix(m, identity), m);
    }

    #[test]
    fn text_origin_takes_translation_row() {
        let tm = [1.0, 0.0, 0.0, 1.0, 12.0, 34.0];
        let cm = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let (x, y) = text_origin(tm, cm);
        assert_eq!((x, y), (13.0, 35.0));
    }
}
