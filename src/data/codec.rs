// ============================================================
// Layer 4 — Category Encoder / Decoder
// ============================================================
// Encoding:  value id 4 of 5   →  [0, 0, 0, 1, 0]
// Decoding:  [0.1, 0.7, 0.2]   →  arg-max index 1 → id 2 → value
//
// Ties in the arg-max go to the lowest index, so
// [0.5, 0.5, 0.2] decodes to the value with id 1.

use crate::domain::characteristic::{Characteristic, CharacteristicValue};
use crate::domain::error::{ClassifierError, Result};
use crate::domain::incoming_call::IncomingCall;

/// Encodes and decodes values of one characteristic.
#[derive(Debug, Clone, Copy)]
pub struct CategoryCodec<'a> {
    characteristic: &'a Characteristic,
}

impl<'a> CategoryCodec<'a> {
    pub fn new(characteristic: &'a Characteristic) -> Self {
        Self { characteristic }
    }

    pub fn width(&self) -> usize {
        self.characteristic.arity()
    }

    /// One-hot vector with 1.0 at `value.id - 1`.
    pub fn encode(&self, value: &CharacteristicValue) -> Result<Vec<f32>> {
        let width = self.width();
        if value.id == 0 || value.id as usize > width {
            return Err(ClassifierError::InvalidArgument(format!(
                "value '{}' has id {} outside 1..={} of characteristic '{}'",
                value.value, value.id, width, self.characteristic.name
            )));
        }

        let mut vector = vec![0.0f32; width];
        vector[value.id as usize - 1] = 1.0;
        Ok(vector)
    }

    /// Ideal output vector for a labeled call.
    pub fn encode_call(&self, call: &IncomingCall) -> Result<Vec<f32>> {
        let value = call.value_for(self.characteristic).ok_or_else(|| {
            ClassifierError::InvalidArgument(format!(
                "call '{}' has no label for characteristic '{}'",
                call.text, self.characteristic.name
            ))
        })?;
        self.encode(value)
    }

    /// Value whose id matches the arg-max coordinate of `output`.
    pub fn decode(&self, output: &[f32]) -> Result<&'a CharacteristicValue> {
        let index = arg_max(output).ok_or_else(|| {
            ClassifierError::InvalidArgument("cannot decode an empty output vector".to_string())
        })?;
        let id = index as u32 + 1;

        match self.characteristic.value_by_id(id) {
            Some(value) => Ok(value),
            None => {
                tracing::error!(
                    characteristic = %self.characteristic.name,
                    id,
                    "network output has no matching characteristic value"
                );
                Err(ClassifierError::DecodeMismatch {
                    characteristic: self.characteristic.name.clone(),
                    id,
                })
            }
        }
    }
}

/// Index of the largest element; the first one wins on ties.
/// NaN entries never win.
pub fn arg_max(values: &[f32]) -> Option<usize> {
    if values.is_empty() {
        return None;
    }

    let mut index = 0;
    let mut max   = f32::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > max {
            max   = v;
            index = i;
        }
    }

    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> Characteristic {
        Characteristic::new(
            "topic",
            vec![
                CharacteristicValue::new(1, "billing"),
                CharacteristicValue::new(2, "delivery"),
                CharacteristicValue::new(3, "returns"),
            ],
        )
    }

    #[test]
    fn test_encode_is_one_hot() {
        let c = topic();
        let codec = CategoryCodec::new(&c);
        assert_eq!(codec.encode(&c.possible_values[2]).unwrap(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_round_trip_every_value() {
        let c = topic();
        let codec = CategoryCodec::new(&c);
        for value in &c.possible_values {
            let vector = codec.encode(value).unwrap();
            assert_eq!(codec.decode(&vector).unwrap(), value);
        }
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let c = topic();
        let codec = CategoryCodec::new(&c);
        assert_eq!(codec.decode(&[0.5, 0.5, 0.2]).unwrap().value, "billing");
        assert_eq!(arg_max(&[0.2, 0.9, 0.9]), Some(1));
    }

    #[test]
    fn test_arg_max_skips_nan() {
        assert_eq!(arg_max(&[f32::NAN, 0.3, 0.1]), Some(1));
        assert_eq!(arg_max(&[]), None);
    }

    #[test]
    fn test_decode_mismatch_when_id_missing() {
        let c = Characteristic::new(
            "gappy",
            vec![CharacteristicValue::new(1, "a"), CharacteristicValue::new(3, "c")],
        );
        let err = CategoryCodec::new(&c).decode(&[0.1, 0.8]).unwrap_err();
        assert!(matches!(err, ClassifierError::DecodeMismatch { id: 2, .. }));
    }

    #[test]
    fn test_encode_rejects_foreign_value() {
        let c = topic();
        let err = CategoryCodec::new(&c)
            .encode(&CharacteristicValue::new(9, "other"))
            .unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidArgument(_)));
    }

    #[test]
    fn test_encode_call_requires_label() {
        let c = topic();
        let err = CategoryCodec::new(&c)
            .encode_call(&IncomingCall::new("where is my parcel"))
            .unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidArgument(_)));
    }
}
