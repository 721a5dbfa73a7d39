use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Pad rows of ids to a specific length with `fill`, typically to line targets up with a padded
/// batch of tokenized sequences. Rows longer than `seq_length` are cut.
pub fn pad_to<B: Backend>(
    fill: i64,
    rows: Vec<Vec<i64>>,
    seq_length: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let batch_size = rows.len();

    let mut tensor = Tensor::zeros([batch_size, seq_length], device);
    tensor = tensor.add_scalar(fill);

    for (index, row) in rows.into_iter().enumerate() {
        let row_length = row.len().min(seq_length);

        if row_length == 0 {
            continue;
        }

        tensor = tensor.slice_assign(
            [index..index + 1, 0..row_length],
            Tensor::from_data(
                Data::new(
                    row.into_iter().take(row_length).map(|e| e.elem()).collect(),
                    Shape::new([1, row_length]),
                ),
                device,
            ),
        );
    }

    tensor
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_pad_to() {
        let device = Default::default();

        let tensor = pad_to::<NdArray>(-100, vec![vec![1, 2, 3], vec![4]], 4, &device);

        assert_eq!(tensor.dims(), [2, 4]);
        assert_eq!(
            tensor.into_data().convert::<i64>().value,
            vec![1, 2, 3, -100, 4, -100, -100, -100]
        );
    }
}
