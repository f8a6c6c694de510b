//! Flat byte persistence for [`EngineConfig`].
//!
//! Field order is fixed and all multi-byte values are little-endian:
//!
//! | field             | encoding                                  |
//! |-------------------|-------------------------------------------|
//! | num_classes       | u32                                       |
//! | background_class  | i32, -1 when absent                       |
//! | keep_topk         | u32                                       |
//! | pre_nms_top_k     | u32                                       |
//! | score_threshold   | f32                                       |
//! | iou_threshold     | f32                                       |
//! | image width       | u32                                       |
//! | image height      | u32                                       |
//! | image channels    | u32                                       |
//! | precision         | u8 (0 = fp32, 1 = fp16)                   |
//! | score_bits        | i8, -1 when absent                        |
//! | has_reg_weights   | u8 (0 or 1)                               |
//! | reg_weights       | 4 x f32, present only when the flag is 1  |
//!
//! Deserialization re-validates the decoded configuration so a byte buffer
//! can never smuggle in parameters that construction would have rejected.

use super::{EngineConfig, ImageSize, Precision};
use crate::util::{DetPostError, DetPostResult};

/// Byte length of the fixed (weight-free) prefix.
const FIXED_LEN: usize = 4 * 9 + 3;

/// Bounds-checked little-endian reader over a serialized config buffer.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> DetPostResult<&'a [u8]> {
        let end = self.pos + len;
        if end > self.data.len() {
            return Err(DetPostError::TruncatedBuffer {
                needed: end,
                got: self.data.len(),
            });
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> DetPostResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> DetPostResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i32(&mut self) -> DetPostResult<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_f32(&mut self) -> DetPostResult<f32> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl EngineConfig {
    /// Exact byte length of [`EngineConfig::to_bytes`] for this config.
    pub fn serialized_len(&self) -> usize {
        FIXED_LEN + if self.reg_weights.is_some() { 16 } else { 0 }
    }

    /// Serializes the configuration in the documented field order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        out.extend_from_slice(&(self.num_classes as u32).to_le_bytes());
        let background = match self.background_class {
            Some(index) => index as i32,
            None => -1,
        };
        out.extend_from_slice(&background.to_le_bytes());
        out.extend_from_slice(&(self.keep_topk as u32).to_le_bytes());
        out.extend_from_slice(&(self.pre_nms_top_k as u32).to_le_bytes());
        out.extend_from_slice(&self.score_threshold.to_le_bytes());
        out.extend_from_slice(&self.iou_threshold.to_le_bytes());
        out.extend_from_slice(&self.image_size.width.to_le_bytes());
        out.extend_from_slice(&self.image_size.height.to_le_bytes());
        out.extend_from_slice(&self.image_size.channels.to_le_bytes());
        out.push(match self.precision {
            Precision::Fp32 => 0,
            Precision::Fp16 => 1,
        });
        out.push(match self.score_bits {
            Some(bits) => bits,
            None => u8::MAX,
        });
        match self.reg_weights {
            Some(weights) => {
                out.push(1);
                for w in weights {
                    out.extend_from_slice(&w.to_le_bytes());
                }
            }
            None => out.push(0),
        }
        out
    }

    /// Restores a configuration serialized by [`EngineConfig::to_bytes`].
    ///
    /// The decoded configuration is validated before being returned.
    pub fn from_bytes(data: &[u8]) -> DetPostResult<Self> {
        let mut reader = ByteReader::new(data);
        let num_classes = reader.read_u32()? as usize;
        let background = reader.read_i32()?;
        let background_class = if background < 0 { None } else { Some(background as usize) };
        let keep_topk = reader.read_u32()? as usize;
        let pre_nms_top_k = reader.read_u32()? as usize;
        let score_threshold = reader.read_f32()?;
        let iou_threshold = reader.read_f32()?;
        let image_size = ImageSize {
            width: reader.read_u32()?,
            height: reader.read_u32()?,
            channels: reader.read_u32()?,
        };
        let precision = match reader.read_u8()? {
            0 => Precision::Fp32,
            1 => Precision::Fp16,
            tag => return Err(DetPostError::UnknownTag { context: "precision", tag }),
        };
        let score_bits = match reader.read_u8()? {
            u8::MAX => None,
            bits => Some(bits),
        };
        let reg_weights = match reader.read_u8()? {
            0 => None,
            1 => {
                let mut weights = [0.0f32; 4];
                for w in weights.iter_mut() {
                    *w = reader.read_f32()?;
                }
                Some(weights)
            }
            tag => return Err(DetPostError::UnknownTag { context: "reg_weights", tag }),
        };

        let config = Self {
            num_classes,
            background_class,
            keep_topk,
            pre_nms_top_k,
            score_threshold,
            iou_threshold,
            image_size,
            precision,
            score_bits,
            reg_weights,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{EngineConfig, ImageSize, Precision};
    use crate::util::DetPostError;

    #[test]
    fn serialized_len_matches_buffer() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.to_bytes().len(), cfg.serialized_len());

        let with_weights = EngineConfig {
            reg_weights: Some([10.0, 10.0, 5.0, 5.0]),
            ..EngineConfig::default()
        };
        assert_eq!(with_weights.to_bytes().len(), with_weights.serialized_len());
        assert_eq!(
            with_weights.serialized_len(),
            EngineConfig::default().serialized_len() + 16
        );
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let cfg = EngineConfig {
            num_classes: 91,
            background_class: Some(0),
            keep_topk: 100,
            pre_nms_top_k: 1000,
            score_threshold: 0.05,
            iou_threshold: 0.5,
            image_size: ImageSize { width: 1344, height: 832, channels: 3 },
            precision: Precision::Fp16,
            score_bits: Some(10),
            reg_weights: Some([10.0, 10.0, 5.0, 5.0]),
        };
        let restored = EngineConfig::from_bytes(&cfg.to_bytes()).unwrap();
        assert_eq!(restored, cfg);
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let bytes = EngineConfig::default().to_bytes();
        let err = EngineConfig::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, DetPostError::TruncatedBuffer { .. }));
    }

    #[test]
    fn unknown_precision_tag_is_rejected() {
        let mut bytes = EngineConfig::default().to_bytes();
        // precision byte sits right after nine u32/f32 fields
        bytes[36] = 7;
        let err = EngineConfig::from_bytes(&bytes).unwrap_err();
        assert_eq!(err, DetPostError::UnknownTag { context: "precision", tag: 7 });
    }

    #[test]
    fn deserialization_revalidates_fields() {
        let mut cfg = EngineConfig::default();
        cfg.iou_threshold = 0.5;
        let mut bytes = cfg.to_bytes();
        // overwrite iou_threshold with an out-of-range value
        bytes[20..24].copy_from_slice(&2.0f32.to_le_bytes());
        let err = EngineConfig::from_bytes(&bytes).unwrap_err();
        assert_eq!(
            err,
            DetPostError::InvalidThreshold { name: "iou_threshold", value: 2.0 }
        );
    }
}
