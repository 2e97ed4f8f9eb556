//! The hot inner kernels: matrix rows × input shards → output shards
//!
//! Encoding, checking, and reconstruction all reduce to the same product:
//! for every output `o` and byte position `b`,
//!
//! ```text
//! outputs[o][b] = XOR over i of mul(matrix_rows[o][i], inputs[i][b])
//! ```
//!
//! XOR is associative and commutative, so the three loops over bytes,
//! inputs, and outputs can nest in any of the six orders and produce
//! identical bytes; they differ only in cache behavior. Combined with two
//! ways to multiply (log/exp lookups per product, or a hoisted row of the
//! 256×256 product table) that gives twelve interchangeable strategies.
//! Each loop order is written once and monomorphized over the multiply
//! method, rather than spelling out twelve bodies.
//!
//! The first input contribution assigns into the output byte and later
//! contributions XOR-accumulate, so outputs never need pre-zeroing.

use crate::galois::GaloisTable;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Nesting order of the byte / input / output loops, outermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopOrder {
    ByteInputOutput,
    ByteOutputInput,
    InputByteOutput,
    InputOutputByte,
    OutputByteInput,
    OutputInputByte,
}

/// How a single GF(2^8) product is computed inside the kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MulMethod {
    /// Two log lookups and one exp lookup per product
    Exp,
    /// Index into the 256×256 product table, one row hoisted per coefficient
    /// where the loop order allows it
    Table,
}

/// One coding-loop strategy: a loop nesting plus a multiply method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodingLoop {
    pub order: LoopOrder,
    pub method: MulMethod,
}

/// Whether a strip multiply overwrites the output or XORs into it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOp {
    Assign,
    Accumulate,
}

/// A multiply method, monomorphized into the kernels
trait MulStrategy {
    fn mul(gf: &GaloisTable, c: u8, x: u8) -> u8;

    /// Multiply a strip of input bytes by one coefficient
    fn mul_strip(gf: &GaloisTable, c: u8, input: &[u8], output: &mut [u8], op: WriteOp) {
        match op {
            WriteOp::Assign => {
                for (out, &x) in output.iter_mut().zip(input) {
                    *out = Self::mul(gf, c, x);
                }
            }
            WriteOp::Accumulate => {
                for (out, &x) in output.iter_mut().zip(input) {
                    *out ^= Self::mul(gf, c, x);
                }
            }
        }
    }
}

struct ExpMul;

impl MulStrategy for ExpMul {
    #[inline(always)]
    fn mul(gf: &GaloisTable, c: u8, x: u8) -> u8 {
        gf.mul(c, x)
    }
}

struct TableMul;

impl MulStrategy for TableMul {
    #[inline(always)]
    fn mul(gf: &GaloisTable, c: u8, x: u8) -> u8 {
        gf.mul_table(c, x)
    }

    // The coefficient is loop-invariant across the strip, so one table row
    // serves the whole run of bytes.
    fn mul_strip(gf: &GaloisTable, c: u8, input: &[u8], output: &mut [u8], op: WriteOp) {
        let row = gf.mul_row(c);
        match op {
            WriteOp::Assign => {
                for (out, &x) in output.iter_mut().zip(input) {
                    *out = row[x as usize];
                }
            }
            WriteOp::Accumulate => {
                for (out, &x) in output.iter_mut().zip(input) {
                    *out ^= row[x as usize];
                }
            }
        }
    }
}

fn code_byte_input_output<M: MulStrategy>(
    gf: &GaloisTable,
    matrix_rows: &[&[u8]],
    inputs: &[&[u8]],
    outputs: &mut [&mut [u8]],
    offset: usize,
    byte_count: usize,
) {
    for b in offset..offset + byte_count {
        for (i, input) in inputs.iter().enumerate() {
            let x = input[b];
            if i == 0 {
                for (row, out) in matrix_rows.iter().zip(outputs.iter_mut()) {
                    out[b] = M::mul(gf, row[i], x);
                }
            } else {
                for (row, out) in matrix_rows.iter().zip(outputs.iter_mut()) {
                    out[b] ^= M::mul(gf, row[i], x);
                }
            }
        }
    }
}

fn code_byte_output_input<M: MulStrategy>(
    gf: &GaloisTable,
    matrix_rows: &[&[u8]],
    inputs: &[&[u8]],
    outputs: &mut [&mut [u8]],
    offset: usize,
    byte_count: usize,
) {
    for b in offset..offset + byte_count {
        for (row, out) in matrix_rows.iter().zip(outputs.iter_mut()) {
            let mut value = 0u8;
            for (i, input) in inputs.iter().enumerate() {
                value ^= M::mul(gf, row[i], input[b]);
            }
            out[b] = value;
        }
    }
}

fn code_input_byte_output<M: MulStrategy>(
    gf: &GaloisTable,
    matrix_rows: &[&[u8]],
    inputs: &[&[u8]],
    outputs: &mut [&mut [u8]],
    offset: usize,
    byte_count: usize,
) {
    for (i, input) in inputs.iter().enumerate() {
        for b in offset..offset + byte_count {
            let x = input[b];
            if i == 0 {
                for (row, out) in matrix_rows.iter().zip(outputs.iter_mut()) {
                    out[b] = M::mul(gf, row[i], x);
                }
            } else {
                for (row, out) in matrix_rows.iter().zip(outputs.iter_mut()) {
                    out[b] ^= M::mul(gf, row[i], x);
                }
            }
        }
    }
}

fn code_input_output_byte<M: MulStrategy>(
    gf: &GaloisTable,
    matrix_rows: &[&[u8]],
    inputs: &[&[u8]],
    outputs: &mut [&mut [u8]],
    offset: usize,
    byte_count: usize,
) {
    let end = offset + byte_count;
    for (i, input) in inputs.iter().enumerate() {
        let op = if i == 0 {
            WriteOp::Assign
        } else {
            WriteOp::Accumulate
        };
        let strip = &input[offset..end];
        for (row, out) in matrix_rows.iter().zip(outputs.iter_mut()) {
            M::mul_strip(gf, row[i], strip, &mut out[offset..end], op);
        }
    }
}

fn code_output_byte_input<M: MulStrategy>(
    gf: &GaloisTable,
    matrix_rows: &[&[u8]],
    inputs: &[&[u8]],
    outputs: &mut [&mut [u8]],
    offset: usize,
    byte_count: usize,
) {
    for (row, out) in matrix_rows.iter().zip(outputs.iter_mut()) {
        for b in offset..offset + byte_count {
            let mut value = 0u8;
            for (i, input) in inputs.iter().enumerate() {
                value ^= M::mul(gf, row[i], input[b]);
            }
            out[b] = value;
        }
    }
}

fn code_output_input_byte<M: MulStrategy>(
    gf: &GaloisTable,
    matrix_rows: &[&[u8]],
    inputs: &[&[u8]],
    outputs: &mut [&mut [u8]],
    offset: usize,
    byte_count: usize,
) {
    let end = offset + byte_count;
    for (row, out) in matrix_rows.iter().zip(outputs.iter_mut()) {
        let strip = &mut out[offset..end];
        for (i, input) in inputs.iter().enumerate() {
            let op = if i == 0 {
                WriteOp::Assign
            } else {
                WriteOp::Accumulate
            };
            M::mul_strip(gf, row[i], &input[offset..end], strip, op);
        }
    }
}

fn check_with_temp<M: MulStrategy>(
    gf: &GaloisTable,
    matrix_rows: &[&[u8]],
    inputs: &[&[u8]],
    to_check: &[&[u8]],
    offset: usize,
    byte_count: usize,
    temp: &mut [u8],
) -> bool {
    let end = offset + byte_count;
    for (row, check) in matrix_rows.iter().zip(to_check.iter()) {
        for (i, input) in inputs.iter().enumerate() {
            let op = if i == 0 {
                WriteOp::Assign
            } else {
                WriteOp::Accumulate
            };
            M::mul_strip(gf, row[i], &input[offset..end], &mut temp[offset..end], op);
        }
        if temp[offset..end] != check[offset..end] {
            return false;
        }
    }
    true
}

fn check_bytewise<M: MulStrategy>(
    gf: &GaloisTable,
    matrix_rows: &[&[u8]],
    inputs: &[&[u8]],
    to_check: &[&[u8]],
    offset: usize,
    byte_count: usize,
) -> bool {
    for (row, check) in matrix_rows.iter().zip(to_check.iter()) {
        for b in offset..offset + byte_count {
            let mut value = 0u8;
            for (i, input) in inputs.iter().enumerate() {
                value ^= M::mul(gf, row[i], input[b]);
            }
            if value != check[b] {
                return false;
            }
        }
    }
    true
}

impl CodingLoop {
    /// The strategy the façade selects when none is given: visit inputs
    /// outermost and bytes innermost, multiplying through hoisted table
    /// rows. Strong on CPUs with large L1 data caches.
    pub const DEFAULT: CodingLoop = CodingLoop {
        order: LoopOrder::InputOutputByte,
        method: MulMethod::Table,
    };

    /// Every available strategy
    pub const ALL: [CodingLoop; 12] = [
        CodingLoop::new(LoopOrder::ByteInputOutput, MulMethod::Exp),
        CodingLoop::new(LoopOrder::ByteInputOutput, MulMethod::Table),
        CodingLoop::new(LoopOrder::ByteOutputInput, MulMethod::Exp),
        CodingLoop::new(LoopOrder::ByteOutputInput, MulMethod::Table),
        CodingLoop::new(LoopOrder::InputByteOutput, MulMethod::Exp),
        CodingLoop::new(LoopOrder::InputByteOutput, MulMethod::Table),
        CodingLoop::new(LoopOrder::InputOutputByte, MulMethod::Exp),
        CodingLoop::new(LoopOrder::InputOutputByte, MulMethod::Table),
        CodingLoop::new(LoopOrder::OutputByteInput, MulMethod::Exp),
        CodingLoop::new(LoopOrder::OutputByteInput, MulMethod::Table),
        CodingLoop::new(LoopOrder::OutputInputByte, MulMethod::Exp),
        CodingLoop::new(LoopOrder::OutputInputByte, MulMethod::Table),
    ];

    pub const fn new(order: LoopOrder, method: MulMethod) -> CodingLoop {
        CodingLoop { order, method }
    }

    /// Stable name of this strategy, loop axes outermost-first
    pub fn name(&self) -> &'static str {
        match (self.order, self.method) {
            (LoopOrder::ByteInputOutput, MulMethod::Exp) => "byte_input_output_exp",
            (LoopOrder::ByteInputOutput, MulMethod::Table) => "byte_input_output_table",
            (LoopOrder::ByteOutputInput, MulMethod::Exp) => "byte_output_input_exp",
            (LoopOrder::ByteOutputInput, MulMethod::Table) => "byte_output_input_table",
            (LoopOrder::InputByteOutput, MulMethod::Exp) => "input_byte_output_exp",
            (LoopOrder::InputByteOutput, MulMethod::Table) => "input_byte_output_table",
            (LoopOrder::InputOutputByte, MulMethod::Exp) => "input_output_byte_exp",
            (LoopOrder::InputOutputByte, MulMethod::Table) => "input_output_byte_table",
            (LoopOrder::OutputByteInput, MulMethod::Exp) => "output_byte_input_exp",
            (LoopOrder::OutputByteInput, MulMethod::Table) => "output_byte_input_table",
            (LoopOrder::OutputInputByte, MulMethod::Exp) => "output_input_byte_exp",
            (LoopOrder::OutputInputByte, MulMethod::Table) => "output_input_byte_table",
        }
    }

    /// Look a strategy up by its stable name
    pub fn from_name(name: &str) -> Option<CodingLoop> {
        static REGISTRY: OnceLock<FxHashMap<&'static str, CodingLoop>> = OnceLock::new();
        let registry = REGISTRY
            .get_or_init(|| CodingLoop::ALL.iter().map(|l| (l.name(), *l)).collect());
        registry.get(name).copied()
    }

    /// Multiply matrix rows by input shards, writing the products into the
    /// output shards over the byte range `offset..offset + byte_count`.
    ///
    /// `matrix_rows` and `outputs` run in parallel: `matrix_rows[o]` holds
    /// the coefficients that produce `outputs[o]`, one per input. Outputs
    /// are overwritten, not merged; callers must keep inputs and outputs
    /// disjoint.
    ///
    /// # Panics
    ///
    /// Panics if the byte range exceeds any shard, or any matrix row is
    /// shorter than `inputs`. The façade validates both before calling.
    pub fn code_some_shards(
        &self,
        matrix_rows: &[&[u8]],
        inputs: &[&[u8]],
        outputs: &mut [&mut [u8]],
        offset: usize,
        byte_count: usize,
    ) {
        debug_assert!(matrix_rows.len() >= outputs.len());
        let gf = GaloisTable::get();
        match (self.order, self.method) {
            (LoopOrder::ByteInputOutput, MulMethod::Exp) => {
                code_byte_input_output::<ExpMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::ByteInputOutput, MulMethod::Table) => {
                code_byte_input_output::<TableMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::ByteOutputInput, MulMethod::Exp) => {
                code_byte_output_input::<ExpMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::ByteOutputInput, MulMethod::Table) => {
                code_byte_output_input::<TableMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::InputByteOutput, MulMethod::Exp) => {
                code_input_byte_output::<ExpMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::InputByteOutput, MulMethod::Table) => {
                code_input_byte_output::<TableMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::InputOutputByte, MulMethod::Exp) => {
                code_input_output_byte::<ExpMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::InputOutputByte, MulMethod::Table) => {
                code_input_output_byte::<TableMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::OutputByteInput, MulMethod::Exp) => {
                code_output_byte_input::<ExpMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::OutputByteInput, MulMethod::Table) => {
                code_output_byte_input::<TableMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::OutputInputByte, MulMethod::Exp) => {
                code_output_input_byte::<ExpMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
            (LoopOrder::OutputInputByte, MulMethod::Table) => {
                code_output_input_byte::<TableMul>(gf, matrix_rows, inputs, outputs, offset, byte_count)
            }
        }
    }

    /// Run the same products as [`code_some_shards`](Self::code_some_shards)
    /// but compare against the bytes already in `to_check` instead of
    /// writing. Returns `true` iff every byte matches.
    ///
    /// With a scratch buffer (`temp.len() >= offset + byte_count`) whole
    /// output strips are computed and compared at once; without one the
    /// comparison runs byte by byte and exits on the first mismatch.
    pub fn check_some_shards(
        &self,
        matrix_rows: &[&[u8]],
        inputs: &[&[u8]],
        to_check: &[&[u8]],
        offset: usize,
        byte_count: usize,
        temp: Option<&mut [u8]>,
    ) -> bool {
        debug_assert!(matrix_rows.len() >= to_check.len());
        let gf = GaloisTable::get();
        match temp {
            Some(temp) => match self.method {
                MulMethod::Exp => check_with_temp::<ExpMul>(
                    gf, matrix_rows, inputs, to_check, offset, byte_count, temp,
                ),
                MulMethod::Table => check_with_temp::<TableMul>(
                    gf, matrix_rows, inputs, to_check, offset, byte_count, temp,
                ),
            },
            None => match self.method {
                MulMethod::Exp => {
                    check_bytewise::<ExpMul>(gf, matrix_rows, inputs, to_check, offset, byte_count)
                }
                MulMethod::Table => {
                    check_bytewise::<TableMul>(gf, matrix_rows, inputs, to_check, offset, byte_count)
                }
            },
        }
    }
}

impl std::fmt::Display for CodingLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
