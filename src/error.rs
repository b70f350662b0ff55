#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The frame ends before a field that has to be decoded.
    #[error(
        "Invalid or incomplete device response: cannot read {length} byte(s) at offset {offset}, frame has {frame_length}"
    )]
    TruncatedFrame {
        offset: usize,
        length: usize,
        frame_length: usize,
    },
    /// A bit-field value has no entry in its lookup table.
    #[error("Unrecognized code {code} for {table}")]
    UnrecognizedCode { table: &'static str, code: u8 },
}
