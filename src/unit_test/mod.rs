mod sequences;
pub(crate) use sequences::{absolute_ground_truth, sample_sequence, sequence_input, step};
