use candle_core::{DType, Result, Tensor};
use itertools::izip;

use super::compact::{blank_canvas, insertion_canvas, known_length_canvas};
use crate::utils::to_tensor;
use crate::vocab::Vocab;

//
// Batch drivers: run the per-sequence compactor over every row of a padded
// batch, then re-pad each output stream independently. Streams have
// different natural lengths per row, so each one gets its own batch-wide
// width: token streams are filled with `pad`, index streams with -1
// (-1 is never a valid index).
//

/// Batched output of [`get_known_length_canvas`].
#[derive(Debug, Clone)]
pub struct KnownLengthCanvasBatch {
    pub canvas: Tensor,
    pub blanks: Tensor,
    pub rest: Tensor,
    pub loc: Tensor,
    pub lb: Tensor,
}

/// Batched output of [`get_insertion_canvas`].
#[derive(Debug, Clone)]
pub struct InsertionCanvasBatch {
    pub canvas: Tensor,
    pub rest: Tensor,
    pub loc: Tensor,
}

/// Batched output of [`get_canvas`].
#[derive(Debug, Clone)]
pub struct BlankCanvasBatch {
    pub canvas: Tensor,
    pub blanks: Tensor,
    pub rest: Tensor,
    pub loc: Tensor,
    pub lb: Tensor,
    pub rb: Tensor,
}

fn rows(t: &Tensor) -> Result<Vec<Vec<i64>>> {
    t.to_dtype(DType::I64)?.to_vec2::<i64>()
}

/// Canvas with length-encoding blanks for a whole batch. `seq`, `keep` and
/// `n` are rectangular `(B, T)` batches; the true length of each row ends
/// at its first `pad` token.
pub fn get_known_length_canvas(
    seq: &Tensor,
    keep: &Tensor,
    n: &Tensor,
    vocab: &Vocab,
) -> Result<KnownLengthCanvasBatch> {
    let device = seq.device();
    let first_blank = vocab.first_blank();
    let (mut canvas, mut blanks, mut rest, mut loc, mut lb) =
        (Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for (s, k, n) in izip!(rows(seq)?, rows(keep)?, rows(n)?) {
        let c = known_length_canvas(&s, &k, &n, first_blank, vocab.pad);
        canvas.push(c.canvas);
        blanks.push(c.blanks);
        rest.push(c.rest);
        loc.push(c.loc);
        lb.push(c.lb);
    }
    Ok(KnownLengthCanvasBatch {
        canvas: to_tensor(&canvas, vocab.pad, device)?,
        blanks: to_tensor(&blanks, -1, device)?,
        rest: to_tensor(&rest, -1, device)?,
        loc: to_tensor(&loc, -1, device)?,
        lb: to_tensor(&lb, -1, device)?,
    })
}

/// Insertion canvas for a whole batch.
pub fn get_insertion_canvas(
    seq: &Tensor,
    keep: &Tensor,
    vocab: &Vocab,
) -> Result<InsertionCanvasBatch> {
    let device = seq.device();
    let (mut canvas, mut rest, mut loc) = (Vec::new(), Vec::new(), Vec::new());
    for (s, k) in izip!(rows(seq)?, rows(keep)?) {
        let c = insertion_canvas(&s, &k, vocab.pad);
        canvas.push(c.canvas);
        rest.push(c.rest);
        loc.push(c.loc);
    }
    Ok(InsertionCanvasBatch {
        canvas: to_tensor(&canvas, vocab.pad, device)?,
        rest: to_tensor(&rest, -1, device)?,
        loc: to_tensor(&loc, -1, device)?,
    })
}

/// Canvas with the generic blank for a whole batch.
pub fn get_canvas(seq: &Tensor, keep: &Tensor, vocab: &Vocab) -> Result<BlankCanvasBatch> {
    let device = seq.device();
    let (mut canvas, mut blanks, mut rest, mut loc, mut lb, mut rb) = (
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
        Vec::new(),
    );
    for (s, k) in izip!(rows(seq)?, rows(keep)?) {
        let c = blank_canvas(&s, &k, vocab.blank, vocab.pad);
        canvas.push(c.canvas);
        blanks.push(c.blanks);
        rest.push(c.rest);
        loc.push(c.loc);
        lb.push(c.lb);
        rb.push(c.rb);
    }
    Ok(BlankCanvasBatch {
        canvas: to_tensor(&canvas, vocab.pad, device)?,
        blanks: to_tensor(&blanks, -1, device)?,
        rest: to_tensor(&rest, -1, device)?,
        loc: to_tensor(&loc, -1, device)?,
        lb: to_tensor(&lb, -1, device)?,
        rb: to_tensor(&rb, -1, device)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    const PAD: i64 = 0;
    const BLANK: i64 = 4;

    fn vocab() -> Vocab {
        Vocab::new(PAD, 1, 2, 3, BLANK, 5, 8)
    }

    #[test]
    fn canvas_stream_is_padded_to_batch_max() -> Result<()> {
        let vocab = vocab();
        // row 0 compacts to length 3, row 1 stays at length 5
        let seq = Tensor::new(&[[10i64, 11, 12, 13, 14], [20, 21, 22, 23, 24]], &Device::Cpu)?;
        let keep = Tensor::new(&[[1i64, 0, 0, 0, 1], [1, 1, 1, 1, 1]], &Device::Cpu)?;
        let out = get_canvas(&seq, &keep, &vocab)?;
        assert_eq!(out.canvas.dims(), &[2, 5]);
        assert_eq!(
            out.canvas.to_vec2::<i64>()?,
            vec![vec![10, BLANK, 14, PAD, PAD], vec![20, 21, 22, 23, 24]]
        );
        Ok(())
    }

    #[test]
    fn index_streams_use_minus_one_fill() -> Result<()> {
        let vocab = vocab();
        let seq = Tensor::new(&[[10i64, 11, 12], [20, 21, 22]], &Device::Cpu)?;
        let keep = Tensor::new(&[[1i64, 0, 1], [1, 1, 1]], &Device::Cpu)?;
        let out = get_canvas(&seq, &keep, &vocab)?;
        assert_eq!(out.blanks.to_vec2::<i64>()?, vec![vec![1], vec![-1]]);
        assert_eq!(out.rest.to_vec2::<i64>()?, vec![vec![1], vec![-1]]);
        assert_eq!(out.loc.to_vec2::<i64>()?, vec![vec![0], vec![-1]]);
        Ok(())
    }

    #[test]
    fn boolean_keep_masks_are_accepted() -> Result<()> {
        let vocab = vocab();
        let seq = Tensor::new(&[[10i64, 11, 12]], &Device::Cpu)?;
        // comparisons produce U8 masks; the driver coerces them
        let rank = Tensor::new(&[[0i64, 2, 1]], &Device::Cpu)?;
        let keep = rank.lt(2i64)?;
        let out = get_canvas(&seq, &keep, &vocab)?;
        assert_eq!(out.canvas.to_vec2::<i64>()?, vec![vec![10, BLANK, 12]]);
        Ok(())
    }

    #[test]
    fn known_length_batch_selects_length_indexed_blanks() -> Result<()> {
        let vocab = vocab();
        let b0 = vocab.first_blank();
        let seq = Tensor::new(&[[10i64, 11, 12, 13, PAD], [20, 21, 22, 23, 24]], &Device::Cpu)?;
        let keep = Tensor::new(&[[1i64, 0, 0, 1, 0], [0, 0, 0, 1, 1]], &Device::Cpu)?;
        let n = Tensor::ones((2, 5), DType::I64, &Device::Cpu)?;
        let out = get_known_length_canvas(&seq, &keep, &n, &vocab)?;
        assert_eq!(
            out.canvas.to_vec2::<i64>()?,
            vec![vec![10, b0 + 1, 13], vec![b0 + 2, 23, 24]]
        );
        assert_eq!(
            out.lb.to_vec2::<i64>()?,
            vec![vec![0, 1, -1], vec![0, 1, 2]]
        );
        Ok(())
    }

    #[test]
    fn insertion_batch_drops_tokens_entirely() -> Result<()> {
        let vocab = vocab();
        let seq = Tensor::new(&[[10i64, 11, 12, PAD]], &Device::Cpu)?;
        let keep = Tensor::new(&[[0i64, 1, 1, 0]], &Device::Cpu)?;
        let out = get_insertion_canvas(&seq, &keep, &vocab)?;
        assert_eq!(out.canvas.to_vec2::<i64>()?, vec![vec![11, 12]]);
        assert_eq!(out.rest.to_vec2::<i64>()?, vec![vec![0]]);
        assert_eq!(out.loc.to_vec2::<i64>()?, vec![vec![-1]]);
        Ok(())
    }

    #[test]
    fn empty_batch_produces_empty_tensors() -> Result<()> {
        let vocab = vocab();
        let seq = Tensor::zeros((0, 4), DType::I64, &Device::Cpu)?;
        let keep = Tensor::zeros((0, 4), DType::I64, &Device::Cpu)?;
        let out = get_canvas(&seq, &keep, &vocab)?;
        assert_eq!(out.canvas.dims(), &[0, 0]);
        Ok(())
    }
}
