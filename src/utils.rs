use candle_core::{D, DType, Device, Result, Tensor};
use candle_nn::ops::log_softmax;

use crate::vocab::Vocab;

/// Pack variable-length rows into one `(B, max_len)` I64 tensor, filling the
/// tail of short rows with `fill`.
pub fn to_tensor(rows: &[Vec<i64>], fill: i64, device: &Device) -> Result<Tensor> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut flat = Vec::with_capacity(rows.len() * width);
    for row in rows {
        flat.extend_from_slice(row);
        flat.resize(flat.len() + width - row.len(), fill);
    }
    Tensor::from_vec(flat, (rows.len(), width), device)
}

/// `[0, 1, ..., k-1]` on the device of `x`, expanded to `dims` (or to the
/// shape of `x` when `dims` is empty), where `k` is the last dimension.
pub fn new_arange(x: &Tensor, dims: &[usize]) -> Result<Tensor> {
    let dims = if dims.is_empty() { x.dims() } else { dims };
    let k = dims.last().copied().unwrap_or(0);
    Tensor::arange(0i64, k as i64, x.device())?
        .expand(dims)?
        .contiguous()
}

/// Per-position cross entropy, no reduction. `pred` is `(..., V)` logits,
/// `gold` the matching label tensor; positions labelled `pad` contribute 0.
pub fn seq_cross_entropy(pred: &Tensor, gold: &Tensor, pad: i64) -> Result<Tensor> {
    let lp = log_softmax(&pred.flatten_to(D::Minus2)?, D::Minus1)?;
    let gold_flat = gold.flatten_all()?.to_dtype(DType::I64)?;
    let loss = lp
        .gather(&gold_flat.unsqueeze(1)?, 1)?
        .squeeze(1)?
        .neg()?;
    let not_pad = gold_flat.ne(pad)?.to_dtype(loss.dtype())?;
    (loss * not_pad)?.reshape(gold.shape())
}

/// Sample one integer per batch element, uniform over `[start, end_i]`
/// (both inclusive), where `end_i` is read from `batch_end`.
pub fn batch_randint(start: i64, batch_end: &Tensor) -> Result<Tensor> {
    // end - start + 1 possible outcomes per element
    let span = batch_end
        .to_dtype(DType::F32)?
        .affine(1.0, (1 - start) as f64)?;
    let r = Tensor::rand(0f32, 1f32, batch_end.shape(), batch_end.device())?;
    (r * span)?.floor()?.to_dtype(DType::I64)?.affine(1.0, start as f64)
}

/// Rank every position of each sequence under a random permutation in which
/// `pad` always sorts last and `first`/`last`/`missing` always sort first.
///
/// Returns, per position, its 0-indexed rank as an I64 tensor shaped like
/// `seq`. The rank of a permutation is the argsort of its argsort.
pub fn sample_permutation(seq: &Tensor, vocab: &Vocab) -> Result<Tensor> {
    let score = Tensor::rand(0f32, 1f32, seq.shape(), seq.device())?;
    let score = masked_fill(&score, &seq.eq(vocab.pad)?, 1.0)?;
    let score = masked_fill(&score, &seq.eq(vocab.first)?, -1.0)?;
    let score = masked_fill(&score, &seq.eq(vocab.last)?, -1.0)?;
    let score = masked_fill(&score, &seq.eq(vocab.missing)?, -1.0)?;
    let indices = score.arg_sort_last_dim(true)?;
    indices.arg_sort_last_dim(true)?.to_dtype(DType::I64)
}

fn masked_fill(t: &Tensor, mask: &Tensor, value: f32) -> Result<Tensor> {
    mask.where_cond(&Tensor::full(value, t.shape(), t.device())?, t)
}

/// Batched index select with a padding row.
///
/// `input` is `(B, T1, d2, ...)`, `index` is `(B, T2)` with values in
/// `[-1, T1 - 1]`; the result is `(B, T2, d2, ...)`. A padding row filled
/// with `padding_idx` is prepended to each batch element and indices are
/// shifted by one, so the raw index -1 transparently fetches padding.
pub fn collect(input: &Tensor, index: &Tensor, padding_idx: i64) -> Result<Tensor> {
    let mut view = input.dims().to_vec();
    view[1] = 1;
    let padding_row = (Tensor::ones(view, input.dtype(), input.device())? * padding_idx as f64)?;
    let input = Tensor::cat(&[&padding_row, input], 1)?;

    let one = Tensor::new(1i64, input.device())?;
    let mut index = index.to_dtype(DType::I64)?.broadcast_add(&one)?;
    for i in 2..input.rank() {
        index = index.unsqueeze(i)?;
    }
    let mut target = input.dims().to_vec();
    target[0] = index.dim(0)?;
    target[1] = index.dim(1)?;
    input.gather(&index.expand(target)?.contiguous()?, 1)
}
