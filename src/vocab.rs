/// Special-token contract shared by the canvas builders.
///
/// `blanks` holds the length-indexed family: `blanks[l]` stands for a blank
/// covering `l + 1` tokens, and the ids are consecutive so that the id of a
/// blank can be recovered from its length by a single offset.
#[derive(Debug, Clone)]
pub struct Vocab {
    pub pad: i64,
    pub first: i64,
    pub last: i64,
    pub missing: i64,
    /// Generic blank, used when run length is not encoded.
    pub blank: i64,
    /// Length-indexed blanks, consecutive ids starting at `blanks[0]`.
    pub blanks: Vec<i64>,
}

impl Vocab {
    pub fn new(
        pad: i64,
        first: i64,
        last: i64,
        missing: i64,
        blank: i64,
        first_blank: i64,
        max_blank_len: usize,
    ) -> Self {
        Self {
            pad,
            first,
            last,
            missing,
            blank,
            blanks: (0..max_blank_len as i64).map(|l| first_blank + l).collect(),
        }
    }

    /// Base id of the length-indexed family. The family must be non-empty
    /// when the known-length canvas is used.
    pub fn first_blank(&self) -> i64 {
        self.blanks[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_family_is_consecutive() {
        let vocab = Vocab::new(0, 1, 2, 3, 4, 5, 4);
        assert_eq!(vocab.blanks, vec![5, 6, 7, 8]);
        assert_eq!(vocab.first_blank(), 5);
    }
}
