use crate::core::codec::CodecError;

/// Replace every value but the first by its distance to the predecessor.
pub(super) fn to_gaps(values: &[u32]) -> Result<Vec<u32>, CodecError> {
    let mut gaps = Vec::with_capacity(values.len());
    let mut previous = 0u32;
    for (index, &value) in values.iter().enumerate() {
        if value < previous {
            return Err(CodecError::NotSorted { index });
        }
        gaps.push(value - previous);
        previous = value;
    }
    Ok(gaps)
}

pub(super) fn from_gaps(gaps: &mut [u32]) -> Result<(), CodecError> {
    let mut previous = 0u32;
    for gap in gaps.iter_mut() {
        previous = previous.checked_add(*gap).ok_or(CodecError::Overflow)?;
        *gap = previous;
    }
    Ok(())
}

/// Gap encoding that restarts whenever the sequence does not increase.
///
/// The first value and every restart value are stored as `value + 1`; each
/// restart is announced by a `0` marker. A value strictly greater than its
/// predecessor is stored as `1 + delta`. Zero therefore only ever appears as a
/// marker, and the encoded sequence may be longer than the input.
pub(super) fn to_gaps_with_boundaries(values: &[u32]) -> Result<Vec<u32>, CodecError> {
    let mut codes = Vec::with_capacity(values.len() + values.len() / 4);
    let mut previous: Option<u32> = None;
    for &value in values {
        match previous {
            Some(last) if value > last => codes.push(value - last + 1),
            Some(_) => {
                codes.push(0);
                codes.push(value.checked_add(1).ok_or(CodecError::Overflow)?);
            }
            None => codes.push(value.checked_add(1).ok_or(CodecError::Overflow)?),
        }
        previous = Some(value);
    }
    Ok(codes)
}

pub(super) fn from_gaps_with_boundaries(codes: &[u32], count: usize) -> Result<Vec<u32>, CodecError> {
    let mut values = Vec::with_capacity(count.min(codes.len()));
    let mut restart = true;
    let mut last = 0u32;
    for &code in codes {
        if restart {
            // A marker can't follow a marker.
            last = code.checked_sub(1).ok_or(CodecError::Overflow)?;
            values.push(last);
            restart = false;
        } else if code == 0 {
            restart = true;
        } else {
            last = last.checked_add(code - 1).ok_or(CodecError::Overflow)?;
            values.push(last);
        }
    }
    if values.len() != count || (restart && !codes.is_empty()) {
        return Err(CodecError::CountMismatch { expected: count, actual: values.len() });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaps() {
        let values = vec![3, 3, 10, 11, 100];
        let mut gaps = to_gaps(&values).unwrap();
        assert_eq!(gaps, vec![3, 0, 7, 1, 89]);
        from_gaps(&mut gaps).unwrap();
        assert_eq!(gaps, values);

        assert_eq!(to_gaps(&[4, 2]), Err(CodecError::NotSorted { index: 1 }));
        assert_eq!(from_gaps(&mut [u32::MAX, 1]), Err(CodecError::Overflow));
    }

    #[test]
    fn test_boundaries_reset_gap_base() {
        let values = vec![1, 5, 12, 1, 3];
        let codes = to_gaps_with_boundaries(&values).unwrap();
        assert_eq!(codes, vec![2, 5, 8, 0, 2, 3]);
        assert_eq!(from_gaps_with_boundaries(&codes, values.len()).unwrap(), values);
    }

    #[test]
    fn test_repeated_values_restart() {
        let values = vec![0, 0, 7, 7, 2];
        let codes = to_gaps_with_boundaries(&values).unwrap();
        assert_eq!(codes, vec![1, 0, 1, 8, 0, 8, 0, 3]);
        assert_eq!(from_gaps_with_boundaries(&codes, values.len()).unwrap(), values);
    }

    #[test]
    fn test_bad_boundary_streams() {
        assert!(to_gaps_with_boundaries(&[u32::MAX]).is_err());
        assert_eq!(from_gaps_with_boundaries(&[0], 1), Err(CodecError::Overflow));
        assert_eq!(
            from_gaps_with_boundaries(&[2, 0], 1),
            Err(CodecError::CountMismatch { expected: 1, actual: 1 })
        );
        assert_eq!(from_gaps_with_boundaries(&[2, 3], 3), Err(CodecError::CountMismatch { expected: 3, actual: 2 }));
        assert_eq!(from_gaps_with_boundaries(&[], 0), Ok(vec![]));
    }
}
