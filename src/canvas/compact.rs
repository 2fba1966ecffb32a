//
// Run-length compaction of a single sequence.
//
// A canvas is the sequence with every maximal run of dropped positions
// collapsed into one blank placeholder. Alongside the canvas we record,
// per run, where the placeholder sits (`blanks`) and, per absorbed
// position, its original index (`rest`) and the run it belongs to (`loc`).
// The three builders differ only in what the placeholder encodes.
//
// Inputs are one row of a padded batch: trailing `pad` tokens are batch
// padding and are excluded by scanning only the prefix before the first
// `pad`. `keep` is a 0/1 mask; nonzero keeps the token verbatim.

/// Output of [`known_length_canvas`]. All fields are parallel per-run or
/// per-absorbed-position streams, see the field docs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KnownLengthCanvas {
    /// Kept tokens in order, with each run replaced by `blank_(L-1)` where
    /// `L` is the number of tokens the run stands for.
    pub canvas: Vec<i64>,
    /// Canvas positions holding a blank placeholder, one per run.
    pub blanks: Vec<i64>,
    /// Original indices of dropped positions, in scan order.
    pub rest: Vec<i64>,
    /// For each `rest` entry, the index into `blanks` of its run.
    pub loc: Vec<i64>,
    /// For each `rest` entry, the size of the blank that has to be opened
    /// on its left when a token is placed there.
    pub lb: Vec<i64>,
}

/// Output of [`insertion_canvas`]: kept tokens only, no placeholders.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InsertionCanvas {
    pub canvas: Vec<i64>,
    pub rest: Vec<i64>,
    /// For each `rest` entry, the canvas index of the closest kept token on
    /// its left, or -1 when the insertion point is before the first token.
    pub loc: Vec<i64>,
}

/// Output of [`blank_canvas`]: one fixed blank id per run, plus 0/1 flags
/// telling, per absorbed position, whether the run continues to its left
/// (`lb`) and right (`rb`).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlankCanvas {
    pub canvas: Vec<i64>,
    pub blanks: Vec<i64>,
    pub rest: Vec<i64>,
    pub loc: Vec<i64>,
    pub lb: Vec<i64>,
    pub rb: Vec<i64>,
}

// Batch padding starts at the first `pad`; positions from there on are not
// part of the sequence.
fn content_len(seq: &[i64], pad: i64) -> usize {
    seq.iter().position(|&t| t == pad).unwrap_or(seq.len())
}

/// Build a canvas whose blanks encode the number of tokens they hide.
///
/// `n[k]` is the number of original tokens position `k` stands for (1 for a
/// plain token; larger when `seq` is itself a canvas being re-blanked). A
/// run is mapped to the id `first_blank + L - 1` where `L` is the sum of
/// `n` over the run; `n` is trusted as given. `lb` counts dropped positions,
/// not `n` weights, since it indexes a split point inside the run.
pub fn known_length_canvas(
    seq: &[i64],
    keep: &[i64],
    n: &[i64],
    first_blank: i64,
    pad: i64,
) -> KnownLengthCanvas {
    let len = content_len(seq, pad);
    let mut out = KnownLengthCanvas::default();
    let mut i = 0;
    while i < len {
        if keep[i] != 0 {
            out.canvas.push(seq[i]);
            i += 1;
            continue;
        }
        // Maximal run of dropped positions [i, j).
        let mut j = i + 1;
        while j < len && keep[j] == 0 {
            j += 1;
        }
        let total: i64 = n[i..j].iter().sum();
        out.blanks.push(out.canvas.len() as i64);
        out.canvas.push(first_blank + total - 1);
        for k in i..j {
            out.rest.push(k as i64);
            out.loc.push(out.blanks.len() as i64 - 1);
            out.lb.push((k - i) as i64);
        }
        i = j;
    }
    out
}

/// Build an insertion canvas: dropped tokens vanish entirely and `loc`
/// records after which kept token each of them re-enters.
pub fn insertion_canvas(seq: &[i64], keep: &[i64], pad: i64) -> InsertionCanvas {
    let len = content_len(seq, pad);
    let mut out = InsertionCanvas::default();
    let mut last_kept = -1i64;
    for i in 0..len {
        if keep[i] != 0 {
            out.canvas.push(seq[i]);
            last_kept += 1;
        } else {
            out.rest.push(i as i64);
            out.loc.push(last_kept);
        }
    }
    out
}

/// Build a canvas with a single generic `blank` id for every run.
pub fn blank_canvas(seq: &[i64], keep: &[i64], blank: i64, pad: i64) -> BlankCanvas {
    let len = content_len(seq, pad);
    let mut out = BlankCanvas::default();
    let mut i = 0;
    while i < len {
        if keep[i] != 0 {
            out.canvas.push(seq[i]);
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < len && keep[j] == 0 {
            j += 1;
        }
        out.blanks.push(out.canvas.len() as i64);
        out.canvas.push(blank);
        for k in i..j {
            out.rest.push(k as i64);
            out.loc.push(out.blanks.len() as i64 - 1);
            out.lb.push((k > i) as i64);
            out.rb.push((k + 1 < j) as i64);
        }
        i = j;
    }
    out
}
