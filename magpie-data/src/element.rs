//! Element types and cell encoding for the bundle format.
//!
//! Every dataset in a bundle stores its cells in logical row-major order.
//! Numeric cells are fixed-width little-endian; string cells are a `u32`
//! little-endian byte length followed by UTF-8 bytes.
//!
//! Padding cells written by the storer hold a dtype-driven sentinel so that
//! padding stays distinguishable from real data:
//!
//! | dtype | sentinel |
//! |-------|----------|
//! | `f32`, `f64` | NaN |
//! | `i32`, `i64` | -2 |
//! | `str` | empty string |

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

/// Integer padding sentinel for `i32`/`i64` datasets.
pub const INT_FILL: i64 = -2;

/// Element data types a bundle dataset can hold.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    F32,
    F64,
    I32,
    I64,
    Str,
}

impl DType {
    /// Manifest tag for this dtype.
    pub fn name(self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::Str => "str",
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Rust element types storable in a bundle dataset.
///
/// Binds an element type to its dtype tag, padding sentinel, and cell
/// encoding. Implemented for `f32`, `f64`, `i32`, `i64`, and `String`.
pub trait Element: Clone {
    /// Dtype tag recorded in the bundle manifest.
    const DTYPE: DType;

    /// Padding sentinel written into unoccupied cells.
    fn fill() -> Self;

    /// Append the array's cells to `out` in logical row-major order.
    fn encode(arr: &ArrayD<Self>, out: &mut Vec<u8>);

    /// Decode a data block back into an array of the given shape.
    ///
    /// Returns `None` if the block is truncated, malformed, or does not
    /// contain exactly `shape` worth of cells.
    fn decode(bytes: &[u8], shape: &[usize]) -> Option<ArrayD<Self>>;
}

macro_rules! numeric_element {
    ($ty:ty, $dtype:expr, $fill:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            fn fill() -> Self {
                $fill
            }

            fn encode(arr: &ArrayD<Self>, out: &mut Vec<u8>) {
                out.reserve(arr.len() * size_of::<$ty>());
                for cell in arr.iter() {
                    out.extend_from_slice(&cell.to_le_bytes());
                }
            }

            fn decode(bytes: &[u8], shape: &[usize]) -> Option<ArrayD<Self>> {
                let volume: usize = shape.iter().product();
                if bytes.len() != volume * size_of::<$ty>() {
                    return None;
                }
                let cells: Vec<$ty> = bytes
                    .chunks_exact(size_of::<$ty>())
                    .map(|chunk| <$ty>::from_le_bytes(chunk.try_into().unwrap()))
                    .collect();
                ArrayD::from_shape_vec(IxDyn(shape), cells).ok()
            }
        }
    };
}

numeric_element!(f32, DType::F32, f32::NAN);
numeric_element!(f64, DType::F64, f64::NAN);
numeric_element!(i32, DType::I32, INT_FILL as i32);
numeric_element!(i64, DType::I64, INT_FILL);

impl Element for String {
    const DTYPE: DType = DType::Str;

    fn fill() -> Self {
        String::new()
    }

    fn encode(arr: &ArrayD<Self>, out: &mut Vec<u8>) {
        for cell in arr.iter() {
            out.extend_from_slice(&(cell.len() as u32).to_le_bytes());
            out.extend_from_slice(cell.as_bytes());
        }
    }

    fn decode(bytes: &[u8], shape: &[usize]) -> Option<ArrayD<Self>> {
        let volume: usize = shape.iter().product();
        let mut cells = Vec::with_capacity(volume);
        let mut rest = bytes;

        for _ in 0..volume {
            let (len_bytes, tail) = rest.split_at_checked(4)?;
            let len = u32::from_le_bytes(len_bytes.try_into().unwrap()) as usize;
            let (text, tail) = tail.split_at_checked(len)?;
            cells.push(String::from_utf8(text.to_vec()).ok()?);
            rest = tail;
        }

        if !rest.is_empty() {
            return None;
        }
        ArrayD::from_shape_vec(IxDyn(shape), cells).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn numeric_round_trip() {
        let arr = array![[1i64, 2, 3], [4, 5, 6]].into_dyn();

        let mut buf = Vec::new();
        i64::encode(&arr, &mut buf);
        assert_eq!(buf.len(), 6 * 8);

        let back = i64::decode(&buf, &[2, 3]).unwrap();
        assert_eq!(back, arr);
    }

    #[test]
    fn string_round_trip() {
        let arr = array![["a".to_string(), "".to_string()], ["longer".to_string(), "κ".to_string()]]
            .into_dyn();

        let mut buf = Vec::new();
        String::encode(&arr, &mut buf);

        let back = String::decode(&buf, &[2, 2]).unwrap();
        assert_eq!(back, arr);
    }

    #[test]
    fn rejects_truncated_block() {
        let arr = array![[1.0f32, 2.0]].into_dyn();
        let mut buf = Vec::new();
        f32::encode(&arr, &mut buf);

        assert!(f32::decode(&buf[..buf.len() - 1], &[1, 2]).is_none());
        assert!(f32::decode(&buf, &[2, 2]).is_none());
    }

    #[test]
    fn fill_sentinels() {
        assert!(f32::fill().is_nan());
        assert!(f64::fill().is_nan());
        assert_eq!(i32::fill(), -2);
        assert_eq!(i64::fill(), -2);
        assert_eq!(String::fill(), "");
    }
}
