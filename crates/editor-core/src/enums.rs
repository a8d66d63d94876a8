/// Which way an index shift moves the affected break offsets:
/// forward for inserted bytes, backward for removed ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftDirection {
    Forward,
    Backward,
}
