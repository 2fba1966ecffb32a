use candle_core::{DType, Device, Tensor};

use candle_canvas::canvas::{get_canvas, get_insertion_canvas, get_known_length_canvas};
use candle_canvas::utils::{batch_randint, sample_permutation};
use candle_canvas::vocab::Vocab;

// cargo run --example infill
//
// Replays the data preparation of one training step: sample a permutation
// over each sequence, keep a random-sized prefix of it, and build the three
// canvas variants from the resulting mask.
fn main() -> anyhow::Result<()> {
    let device = Device::Cpu;
    let vocab = Vocab::new(0, 1, 2, 3, 4, 5, 16);

    // two sequences of true lengths 6 and 4, batch-padded to 6
    let seq = Tensor::new(
        &[[30i64, 31, 32, 33, 34, 35], [40, 41, 42, 43, 0, 0]],
        &device,
    )?;
    let lengths = Tensor::new(&[6i64, 4], &device)?;

    let rank = sample_permutation(&seq, &vocab)?;
    let k = batch_randint(0, &lengths.affine(1.0, -1.0)?)?;
    let keep = rank.lt(&k.unsqueeze(1)?.broadcast_as(rank.shape())?)?;
    let n = Tensor::ones(seq.shape(), DType::I64, &device)?;

    println!("seq:    {}", seq);
    println!("keep:   {}", keep.to_dtype(DType::I64)?);

    let blm = get_canvas(&seq, &keep, &vocab)?;
    println!("blank canvas:  {}", blm.canvas);
    println!("  blanks {} rest {} loc {}", blm.blanks, blm.rest, blm.loc);

    let lblm = get_known_length_canvas(&seq, &keep, &n, &vocab)?;
    println!("length canvas: {}", lblm.canvas);
    println!("  lb {}", lblm.lb);

    let inst = get_insertion_canvas(&seq, &keep, &vocab)?;
    println!("insertion canvas: {}", inst.canvas);
    println!("  rest {} loc {}", inst.rest, inst.loc);

    Ok(())
}
