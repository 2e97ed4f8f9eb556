//! Reed-Solomon codec façade
//!
//! A [`ReedSolomon`] instance fixes `k` data shards and `m` parity shards,
//! builds the systematic generator matrix once, and then encodes, checks,
//! and reconstructs caller-owned shard buffers in place. Instances are
//! immutable after construction and can be shared freely across threads.
//!
//! Shards are any buffers exposing `AsRef<[u8]>`/`AsMut<[u8]>`, ordered
//! data-first then parity, all of identical length. Every operation works
//! on a caller-chosen byte range common to all shards, so large shards can
//! be processed in slices.

use crate::coding_loop::CodingLoop;
use crate::error::{CodecError, Result};
use crate::galois;
use crate::matrix::Matrix;
use log::debug;

/// Maximum total shard count; more would duplicate Vandermonde rows and
/// make survivor submatrices singular.
pub const MAX_TOTAL_SHARDS: usize = 256;

/// Reed-Solomon encoder/decoder over GF(2^8)
pub struct ReedSolomon {
    data_shard_count: usize,
    parity_shard_count: usize,
    total_shard_count: usize,
    /// Systematic generator matrix: identity on top, parity rows below
    matrix: Matrix,
    /// The bottom rows of the generator matrix, copied out flat for the
    /// coding loops
    parity_rows: Vec<Vec<u8>>,
    coding_loop: CodingLoop,
}

impl ReedSolomon {
    /// Create a codec with the default coding loop
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<ReedSolomon> {
        ReedSolomon::with_coding_loop(data_shards, parity_shards, CodingLoop::DEFAULT)
    }

    /// Create a codec with an explicit coding loop
    pub fn with_coding_loop(
        data_shards: usize,
        parity_shards: usize,
        coding_loop: CodingLoop,
    ) -> Result<ReedSolomon> {
        if data_shards < 1 || parity_shards < 1 {
            return Err(CodecError::ShapeMismatch(format!(
                "need at least one data and one parity shard, got {} and {}",
                data_shards, parity_shards
            )));
        }
        if data_shards + parity_shards > MAX_TOTAL_SHARDS {
            return Err(CodecError::TooManyShards {
                data: data_shards,
                parity: parity_shards,
            });
        }

        let total_shards = data_shards + parity_shards;
        let matrix = build_matrix(data_shards, total_shards)?;
        let parity_rows = (0..parity_shards)
            .map(|i| matrix.get_row(data_shards + i))
            .collect();

        debug!(
            "built generator matrix for {} data + {} parity shards, coding loop {}",
            data_shards, parity_shards, coding_loop
        );

        Ok(ReedSolomon {
            data_shard_count: data_shards,
            parity_shard_count: parity_shards,
            total_shard_count: total_shards,
            matrix,
            parity_rows,
            coding_loop,
        })
    }

    pub fn data_shard_count(&self) -> usize {
        self.data_shard_count
    }

    pub fn parity_shard_count(&self) -> usize {
        self.parity_shard_count
    }

    pub fn total_shard_count(&self) -> usize {
        self.total_shard_count
    }

    /// Compute the parity shards from the data shards
    ///
    /// Reads `shards[0..k]` and overwrites `shards[k..k+m]` in the byte
    /// range `offset..offset + byte_count`. Data shards are left untouched.
    pub fn encode_parity<T>(&self, shards: &mut [T], offset: usize, byte_count: usize) -> Result<()>
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.check_buffers_and_sizes(shards, offset, byte_count)?;

        let (data, parity) = shards.split_at_mut(self.data_shard_count);
        let inputs: Vec<&[u8]> = data.iter().map(|s| s.as_ref()).collect();
        let mut outputs: Vec<&mut [u8]> = parity.iter_mut().map(|s| s.as_mut()).collect();
        let rows: Vec<&[u8]> = self.parity_rows.iter().map(|r| r.as_slice()).collect();

        self.coding_loop
            .code_some_shards(&rows, &inputs, &mut outputs, offset, byte_count);
        Ok(())
    }

    /// Return `true` if the parity shards match the data shards
    ///
    /// Recomputes the parity products over the byte range and compares them
    /// byte by byte against the stored parity. No shard is modified.
    pub fn is_parity_correct<T: AsRef<[u8]>>(
        &self,
        shards: &[T],
        offset: usize,
        byte_count: usize,
    ) -> Result<bool> {
        self.check_buffers_and_sizes(shards, offset, byte_count)?;
        Ok(self.run_parity_check(shards, offset, byte_count, None))
    }

    /// Like [`is_parity_correct`](Self::is_parity_correct), with a caller
    /// scratch buffer
    ///
    /// Computing whole parity strips into `temp` and comparing afterwards
    /// avoids the per-byte branch of the plain check and can be noticeably
    /// faster. `temp.len()` must be at least `offset + byte_count`.
    pub fn is_parity_correct_with_temp<T: AsRef<[u8]>>(
        &self,
        shards: &[T],
        offset: usize,
        byte_count: usize,
        temp: &mut [u8],
    ) -> Result<bool> {
        self.check_buffers_and_sizes(shards, offset, byte_count)?;
        // checked_add cannot fail here: check_buffers_and_sizes verified it
        let end = offset + byte_count;
        if temp.len() < end {
            return Err(CodecError::RangeError(format!(
                "temp buffer holds {} bytes, need {}",
                temp.len(),
                end
            )));
        }
        Ok(self.run_parity_check(shards, offset, byte_count, Some(temp)))
    }

    fn run_parity_check<T: AsRef<[u8]>>(
        &self,
        shards: &[T],
        offset: usize,
        byte_count: usize,
        temp: Option<&mut [u8]>,
    ) -> bool {
        let inputs: Vec<&[u8]> = shards[..self.data_shard_count]
            .iter()
            .map(|s| s.as_ref())
            .collect();
        let to_check: Vec<&[u8]> = shards[self.data_shard_count..]
            .iter()
            .map(|s| s.as_ref())
            .collect();
        let rows: Vec<&[u8]> = self.parity_rows.iter().map(|r| r.as_slice()).collect();
        self.coding_loop
            .check_some_shards(&rows, &inputs, &to_check, offset, byte_count, temp)
    }

    /// Rebuild the shards flagged absent in `present`
    ///
    /// Buffers for missing shards must be allocated at full shard length;
    /// their contents in the byte range are overwritten. Does nothing when
    /// every shard is present. Fails with
    /// [`CodecError::NotEnoughShards`] when fewer than `k` survive.
    pub fn decode_missing<T>(
        &self,
        shards: &mut [T],
        present: &[bool],
        offset: usize,
        byte_count: usize,
    ) -> Result<()>
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.check_buffers_and_sizes(shards, offset, byte_count)?;
        if present.len() != self.total_shard_count {
            return Err(CodecError::ShapeMismatch(format!(
                "present flags: expected {}, got {}",
                self.total_shard_count,
                present.len()
            )));
        }

        let number_present = present.iter().filter(|&&p| p).count();
        if number_present == self.total_shard_count {
            return Ok(());
        }
        if number_present < self.data_shard_count {
            return Err(CodecError::NotEnoughShards {
                present: number_present,
                needed: self.data_shard_count,
            });
        }

        let k = self.data_shard_count;
        debug!(
            "decoding with {} of {} shards present, rebuilding {} data and {} parity shards",
            number_present,
            self.total_shard_count,
            present[..k].iter().filter(|&&p| !p).count(),
            present[k..].iter().filter(|&&p| !p).count(),
        );

        // The generator rows of the first k surviving shards form a square
        // matrix mapping the original data onto those survivors; its
        // inverse maps the survivors back onto the data.
        let mut sub_matrix = Matrix::new(k, k);
        let mut sub_inputs: Vec<&[u8]> = Vec::with_capacity(k);
        let mut missing_data: Vec<&mut [u8]> = Vec::new();
        let mut missing_data_indices: Vec<usize> = Vec::new();

        for (idx, shard) in shards.iter_mut().enumerate() {
            if present[idx] {
                if sub_inputs.len() < k {
                    for c in 0..k {
                        sub_matrix.set(sub_inputs.len(), c, self.matrix.get(idx, c));
                    }
                    // Deref so as_ref resolves on T, not on the &mut itself.
                    sub_inputs.push((*shard).as_ref());
                }
            } else if idx < k {
                missing_data_indices.push(idx);
                missing_data.push(shard.as_mut());
            }
        }

        // MDS property: any k generator rows are independent, so this
        // cannot be singular unless the matrix was tampered with.
        let data_decode_matrix = sub_matrix.invert()?;

        if !missing_data.is_empty() {
            let decode_rows: Vec<&[u8]> = missing_data_indices
                .iter()
                .map(|&i| data_decode_matrix.row(i))
                .collect();
            self.coding_loop.code_some_shards(
                &decode_rows,
                &sub_inputs,
                &mut missing_data,
                offset,
                byte_count,
            );
        }

        // With all data shards intact again, re-encode whichever parity
        // shards are missing.
        let (data, parity) = shards.split_at_mut(k);
        let inputs: Vec<&[u8]> = data.iter().map(|s| s.as_ref()).collect();
        let mut parity_outputs: Vec<&mut [u8]> = Vec::new();
        let mut parity_out_rows: Vec<&[u8]> = Vec::new();
        for (j, shard) in parity.iter_mut().enumerate() {
            if !present[k + j] {
                parity_out_rows.push(self.parity_rows[j].as_slice());
                parity_outputs.push(shard.as_mut());
            }
        }
        if !parity_outputs.is_empty() {
            self.coding_loop.code_some_shards(
                &parity_out_rows,
                &inputs,
                &mut parity_outputs,
                offset,
                byte_count,
            );
        }

        Ok(())
    }

    /// Validate the shard array shape and the byte range before any write
    fn check_buffers_and_sizes<T: AsRef<[u8]>>(
        &self,
        shards: &[T],
        offset: usize,
        byte_count: usize,
    ) -> Result<()> {
        if shards.len() != self.total_shard_count {
            return Err(CodecError::ShapeMismatch(format!(
                "wrong number of shards: expected {}, got {}",
                self.total_shard_count,
                shards.len()
            )));
        }
        let shard_length = shards[0].as_ref().len();
        for shard in &shards[1..] {
            if shard.as_ref().len() != shard_length {
                return Err(CodecError::ShapeMismatch(
                    "shards are different sizes".to_string(),
                ));
            }
        }
        let end = offset
            .checked_add(byte_count)
            .ok_or_else(|| CodecError::RangeError("offset + byte_count overflows".to_string()))?;
        if end > shard_length {
            return Err(CodecError::RangeError(format!(
                "byte range {}..{} exceeds shard length {}",
                offset, end, shard_length
            )));
        }
        Ok(())
    }
}

/// Build the systematic generator matrix for `data_shards` data rows out
/// of `total_shards` total rows
///
/// Start from a Vandermonde matrix, whose every square row-subset is
/// invertible, then multiply by the inverse of its top square so the top
/// block becomes the identity without losing that property.
fn build_matrix(data_shards: usize, total_shards: usize) -> Result<Matrix> {
    let vandermonde = vandermonde(total_shards, data_shards);
    let top = vandermonde.submatrix(0, 0, data_shards, data_shards);
    vandermonde.times(&top.invert()?)
}

/// The Vandermonde matrix with `V[r][c] = r^c`, the row index taken as a
/// field element
fn vandermonde(rows: usize, cols: usize) -> Matrix {
    let mut result = Matrix::new(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            result.set(r, c, galois::exp(r as u8, c));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_matrix_is_systematic() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let top = rs.matrix.submatrix(0, 0, 4, 4);
        assert_eq!(top, Matrix::identity(4));
        assert_eq!(rs.parity_rows.len(), 2);
        assert_eq!(rs.parity_rows[0], rs.matrix.get_row(4));
        assert_eq!(rs.parity_rows[1], rs.matrix.get_row(5));
    }

    #[test]
    fn test_parity_rows_have_no_zero_entries() {
        // Zero coefficients would let data bytes slip past the parity check.
        for (k, m) in [(4, 2), (10, 4), (17, 3)] {
            let rs = ReedSolomon::new(k, m).unwrap();
            for row in &rs.parity_rows {
                assert!(row.iter().all(|&c| c != 0), "k={} m={}", k, m);
            }
        }
    }

    #[test]
    fn test_counts() {
        let rs = ReedSolomon::new(15, 5).unwrap();
        assert_eq!(rs.data_shard_count(), 15);
        assert_eq!(rs.parity_shard_count(), 5);
        assert_eq!(rs.total_shard_count(), 20);
    }

    #[test]
    fn test_construction_limits() {
        assert!(matches!(
            ReedSolomon::new(200, 100),
            Err(CodecError::TooManyShards {
                data: 200,
                parity: 100
            })
        ));
        assert!(matches!(
            ReedSolomon::new(0, 2),
            Err(CodecError::ShapeMismatch(_))
        ));
        assert!(matches!(
            ReedSolomon::new(2, 0),
            Err(CodecError::ShapeMismatch(_))
        ));
        assert!(ReedSolomon::new(255, 1).is_ok());
        assert!(ReedSolomon::new(1, 255).is_ok());
    }

    #[test]
    fn test_shape_validation() {
        let rs = ReedSolomon::new(2, 2).unwrap();
        let mut short = vec![vec![0u8; 8]; 3];
        assert!(matches!(
            rs.encode_parity(&mut short, 0, 8),
            Err(CodecError::ShapeMismatch(_))
        ));

        let mut ragged = vec![vec![0u8; 8], vec![0u8; 8], vec![0u8; 7], vec![0u8; 8]];
        assert!(matches!(
            rs.encode_parity(&mut ragged, 0, 8),
            Err(CodecError::ShapeMismatch(_))
        ));

        let mut shards = vec![vec![0u8; 8]; 4];
        assert!(matches!(
            rs.encode_parity(&mut shards, 4, 5),
            Err(CodecError::RangeError(_))
        ));
        assert!(matches!(
            rs.encode_parity(&mut shards, usize::MAX, 2),
            Err(CodecError::RangeError(_))
        ));
        assert!(rs.encode_parity(&mut shards, 4, 4).is_ok());
    }

    #[test]
    fn test_temp_buffer_too_small() {
        let rs = ReedSolomon::new(2, 1).unwrap();
        let mut shards = vec![vec![1u8, 2], vec![3, 4], vec![0, 0]];
        rs.encode_parity(&mut shards, 0, 2).unwrap();
        let mut temp = vec![0u8; 1];
        assert!(matches!(
            rs.is_parity_correct_with_temp(&shards, 0, 2, &mut temp),
            Err(CodecError::RangeError(_))
        ));
    }

    #[test]
    fn test_decode_present_flag_length() {
        let rs = ReedSolomon::new(2, 2).unwrap();
        let mut shards = vec![vec![0u8; 4]; 4];
        assert!(matches!(
            rs.decode_missing(&mut shards, &[true; 3], 0, 4),
            Err(CodecError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_decode_all_present_is_noop() {
        let rs = ReedSolomon::new(2, 2).unwrap();
        // Parity deliberately wrong: decode must not touch anything.
        let mut shards = vec![vec![9u8; 4]; 4];
        rs.decode_missing(&mut shards, &[true; 4], 0, 4).unwrap();
        assert!(shards.iter().all(|s| s.iter().all(|&b| b == 9)));
    }

    #[test]
    fn test_decode_not_enough_shards() {
        let rs = ReedSolomon::new(3, 2).unwrap();
        let mut shards = vec![vec![0u8; 4]; 5];
        let present = [true, true, false, false, false];
        assert_eq!(
            rs.decode_missing(&mut shards, &present, 0, 4),
            Err(CodecError::NotEnoughShards {
                present: 2,
                needed: 3
            })
        );
    }
}
